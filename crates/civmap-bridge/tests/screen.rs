use std::time::{Duration, Instant};

use civmap_bridge::{
    Detent, FilterKey, HostAction, Linear, MapScreen, MapType, OutboundCall, Phase,
    RecordingSink, ScreenConfig, SheetPhase, Tab,
};
use civmap_core::{Contact, Coordinates, Facility, FacilityId, FacilityType};

fn facility(id: i64, name: &str, facility_type: FacilityType) -> Facility {
    Facility {
        id: FacilityId(id),
        name: name.to_string(),
        facility_type,
        coordinates: Coordinates::new(41.99 + id as f64 * 0.001, 21.43),
        address: None,
        contact: Contact::default(),
    }
}

fn sample() -> Vec<Facility> {
    vec![
        facility(1, "Old Bazaar Grill", FacilityType::Restaurant),
        facility(2, "Hotel Centar", FacilityType::Hotel),
        facility(3, "Vardar Books", FacilityType::Shop),
        facility(4, "Skopje Kebap House", FacilityType::Restaurant),
        facility(5, "Riverside Hostel", FacilityType::Other),
    ]
}

fn screen(authenticated: bool) -> MapScreen<RecordingSink, Linear> {
    MapScreen::with_easing(
        RecordingSink::default(),
        ScreenConfig::default(),
        authenticated,
        Linear,
    )
}

fn loaded_screen() -> MapScreen<RecordingSink, Linear> {
    let mut screen = screen(false);
    screen.load_facilities(Ok::<_, String>(sample()));
    screen.handle_surface_message(r#"{"type":"mapLoaded"}"#, Instant::now());
    screen
}

fn view(id: i64) -> String {
    format!(r#"{{"type":"viewFacility","facilityId":{id}}}"#)
}

fn pushed_ids(screen: &MapScreen<RecordingSink, Linear>) -> Vec<i64> {
    screen
        .bridge()
        .sink()
        .last_markers()
        .unwrap_or_default()
        .iter()
        .map(|m| m.id.0)
        .collect()
}

#[test]
fn markers_held_until_map_loaded_then_pushed_once() {
    let mut screen = screen(false);
    screen.load_facilities(Ok::<_, String>(sample()));
    screen.toggle_filter(FilterKey::Hotel);
    assert!(screen.bridge().sink().calls.is_empty());

    screen.handle_surface_message(r#"{"type":"mapLoaded"}"#, Instant::now());

    let pushes = screen.bridge().sink().marker_pushes();
    assert_eq!(pushes.len(), 1, "exactly one flush expected");
    assert_eq!(pushed_ids(&screen), vec![1, 3, 4]);
}

#[test]
fn map_loaded_with_nothing_held_pushes_current_state() {
    let mut screen = screen(false);
    screen.handle_surface_message(r#"{"type":"mapLoaded"}"#, Instant::now());
    assert_eq!(screen.bridge().sink().marker_pushes().len(), 1);
    assert!(pushed_ids(&screen).is_empty());

    screen.load_facilities(Ok::<_, String>(sample()));
    assert_eq!(screen.bridge().sink().marker_pushes().len(), 2);

    // Surface reload: a second mapLoaded re-syncs.
    screen.handle_surface_message(r#"{"type":"mapLoaded"}"#, Instant::now());
    assert_eq!(screen.bridge().sink().marker_pushes().len(), 3);
    assert_eq!(pushed_ids(&screen), vec![1, 2, 3, 4]);
}

#[test]
fn other_type_never_reaches_the_surface() {
    let screen = loaded_screen();
    assert_eq!(pushed_ids(&screen), vec![1, 2, 3, 4]);
}

#[test]
fn zoom_below_threshold_clears_markers() {
    let mut screen = loaded_screen();
    let now = Instant::now();
    screen.handle_surface_message(r#"{"type":"zoomChanged","zoom":9}"#, now);
    assert!(pushed_ids(&screen).is_empty());

    screen.handle_surface_message(r#"{"type":"zoomChanged","zoom":10}"#, now);
    assert_eq!(pushed_ids(&screen), vec![1, 2, 3, 4]);
    assert_eq!(screen.zoom(), 10);
}

#[test]
fn view_facility_selects_and_retap_is_idempotent() {
    let mut screen = loaded_screen();
    let now = Instant::now();

    assert_eq!(screen.handle_surface_message(&view(3), now), None);
    assert_eq!(screen.selection().phase(), Phase::Selected);
    assert_eq!(screen.selection().selected(), Some(FacilityId(3)));
    let state = screen.sheet_state();
    assert!(state.visible);
    assert!(!state.expanded);
    assert_eq!(state.active_tab, Tab::Overview);

    let pushes_before = screen.bridge().sink().marker_pushes().len();
    screen.handle_surface_message(&view(3), now);
    assert_eq!(screen.selection().phase(), Phase::Selected);
    assert_eq!(screen.bridge().sink().marker_pushes().len(), pushes_before);
}

#[test]
fn selected_marker_is_restyled() {
    let mut screen = loaded_screen();
    screen.handle_surface_message(&view(2), Instant::now());

    let markers = screen.bridge().sink().last_markers().unwrap_or_default();
    let selected: Vec<_> = markers.iter().filter(|m| m.selected).collect();
    assert_eq!(selected.len(), 1);
    assert_eq!(selected[0].id, FacilityId(2));
    let other = markers.iter().find(|m| m.id == FacilityId(1)).unwrap();
    assert!(selected[0].icon_size > other.icon_size);
}

#[test]
fn view_reviews_opens_reviews_tab() {
    let mut screen = loaded_screen();
    screen.handle_surface_message(
        r#"{"type":"viewReviews","facilityId":"4"}"#,
        Instant::now(),
    );
    assert_eq!(screen.selection().selected(), Some(FacilityId(4)));
    assert_eq!(screen.sheet_state().active_tab, Tab::Reviews);
}

#[test]
fn switching_facility_collapses_panel() {
    let mut screen = loaded_screen();
    let start = Instant::now();
    screen.handle_surface_message(&view(1), start);
    screen.tap_handle(start);
    screen.tick(start + Duration::from_secs(1));
    assert_eq!(screen.selection().phase(), Phase::Expanded);

    let later = start + Duration::from_secs(2);
    screen.handle_surface_message(&view(2), later);
    assert_eq!(screen.selection().phase(), Phase::Selected);
    assert_eq!(screen.sheet().target(), Detent::Collapsed);
    let height = screen.tick(later + Duration::from_secs(1));
    assert!((height - screen.sheet().config().min_height).abs() < f32::EPSILON);
}

#[test]
fn switching_facility_resets_tab_scroll() {
    let mut screen = loaded_screen();
    let start = Instant::now();
    screen.handle_surface_message(r#"{"type":"viewReviews","facilityId":1}"#, start);
    screen.tap_handle(start);
    screen.tick(start + Duration::from_secs(1));
    screen.set_scroll(Tab::Reviews, 150.0);
    assert!((screen.scroll_offset(Tab::Reviews) - 150.0).abs() < f32::EPSILON);

    screen.handle_surface_message(&view(2), start + Duration::from_secs(2));
    assert_eq!(screen.selection().selected(), Some(FacilityId(2)));
    assert!(screen.scroll_offset(Tab::Reviews).abs() < f32::EPSILON);

    // Re-tapping the same facility keeps the position.
    screen.set_scroll(Tab::Overview, 30.0);
    screen.handle_surface_message(&view(2), start + Duration::from_secs(3));
    assert!((screen.scroll_offset(Tab::Overview) - 30.0).abs() < f32::EPSILON);
}

#[test]
fn focus_request_before_map_loaded_is_clamped_and_flushed_after_markers() {
    let mut screen = screen(false);
    screen.load_facilities(Ok::<_, String>(sample()));
    screen.handle_surface_message(
        r#"{"type":"focusRequest","latitude":42.0,"longitude":21.4,"zoom":25}"#,
        Instant::now(),
    );
    assert!(screen.bridge().sink().calls.is_empty());

    screen.handle_surface_message(r#"{"type":"mapLoaded"}"#, Instant::now());
    let calls = &screen.bridge().sink().calls;
    assert_eq!(calls.len(), 2);
    assert!(matches!(calls[0], OutboundCall::AddMarkers(_)));
    assert_eq!(
        calls[1],
        OutboundCall::FocusOnFacility {
            lat: 42.0,
            lng: 21.4,
            zoom: 19
        }
    );
}

#[test]
fn focus_request_without_zoom_uses_current_zoom() {
    let mut screen = loaded_screen();
    let now = Instant::now();
    let request = r#"{"type":"focusRequest","latitude":41.99,"longitude":21.43}"#;

    screen.handle_surface_message(request, now);
    match screen.bridge().sink().calls.last() {
        Some(OutboundCall::FocusOnFacility { zoom, .. }) => assert_eq!(*zoom, 13),
        other => panic!("expected focus call, got {other:?}"),
    }

    screen.handle_surface_message(r#"{"type":"zoomChanged","zoom":15}"#, now);
    screen.handle_surface_message(request, now);
    match screen.bridge().sink().calls.last() {
        Some(OutboundCall::FocusOnFacility { zoom, .. }) => assert_eq!(*zoom, 15),
        other => panic!("expected focus call, got {other:?}"),
    }
}

#[test]
fn reload_without_selected_facility_returns_to_idle() {
    let mut screen = loaded_screen();
    screen.handle_surface_message(&view(3), Instant::now());

    let reloaded: Vec<_> = sample().into_iter().filter(|f| f.id.0 != 3).collect();
    screen.load_facilities(Ok::<_, String>(reloaded));

    assert_eq!(screen.selection().phase(), Phase::Idle);
    assert_eq!(screen.selection().selected(), None);
    assert!(!screen.sheet_state().visible);
    assert_eq!(screen.sheet().phase(), SheetPhase::Hidden);
    let markers = screen.bridge().sink().last_markers().unwrap_or_default();
    assert!(markers.iter().all(|m| !m.selected));
}

#[test]
fn unknown_facility_id_is_ignored() {
    let mut screen = loaded_screen();
    let calls_before = screen.bridge().sink().calls.len();

    assert_eq!(screen.handle_surface_message(&view(999), Instant::now()), None);
    assert_eq!(screen.selection().phase(), Phase::Idle);
    assert_eq!(screen.bridge().sink().calls.len(), calls_before);
}

#[test]
fn malformed_and_unknown_messages_are_dropped() {
    let mut screen = loaded_screen();
    let now = Instant::now();
    assert_eq!(screen.handle_surface_message("not json", now), None);
    assert_eq!(screen.handle_surface_message(r#"{"facilityId":3}"#, now), None);
    assert_eq!(
        screen.handle_surface_message(r#"{"type":"viewFacility"}"#, now),
        None
    );
    assert_eq!(
        screen.handle_surface_message(r#"{"type":"somethingNew","x":1}"#, now),
        None
    );
    assert_eq!(screen.selection().phase(), Phase::Idle);
}

#[test]
fn review_request_depends_on_session() {
    let msg = r#"{"type":"reviewFacility","facilityId":2}"#;

    let mut guest = screen(false);
    guest.load_facilities(Ok::<_, String>(sample()));
    assert_eq!(
        guest.handle_surface_message(msg, Instant::now()),
        Some(HostAction::SignInRequired(FacilityId(2)))
    );

    let mut member = screen(true);
    member.load_facilities(Ok::<_, String>(sample()));
    assert_eq!(
        member.handle_surface_message(msg, Instant::now()),
        Some(HostAction::OpenReviewComposer(FacilityId(2)))
    );
}

#[test]
fn map_click_is_reported_without_dismissing() {
    let mut screen = loaded_screen();
    let now = Instant::now();
    screen.handle_surface_message(&view(1), now);
    let action = screen.handle_surface_message(
        r#"{"type":"mapClick","latitude":42.0,"longitude":21.4}"#,
        now,
    );
    assert_eq!(
        action,
        Some(HostAction::MapTapped(Coordinates::new(42.0, 21.4)))
    );
    assert_eq!(screen.selection().phase(), Phase::Selected);
}

#[test]
fn provider_failure_leaves_empty_map() {
    let mut screen = screen(false);
    screen.handle_surface_message(r#"{"type":"mapLoaded"}"#, Instant::now());
    screen.load_facilities(Err::<Vec<Facility>, _>("connection refused"));
    assert!(screen.facilities().is_empty());
    assert_eq!(screen.bridge().sink().marker_pushes().len(), 2);
    assert!(pushed_ids(&screen).is_empty());
}

#[test]
fn search_results_ignore_filters() {
    let mut screen = loaded_screen();
    screen.toggle_filter(FilterKey::Restaurant);
    screen.apply_search("kebap");

    let results: Vec<_> = screen.search_results().iter().map(|f| f.id.0).collect();
    assert_eq!(results, vec![4]);
    assert!(pushed_ids(&screen).is_empty());

    screen.apply_search("  ");
    assert!(screen.search_results().is_empty());
}

#[test]
fn search_result_tap_selects_and_focuses() {
    let mut screen = loaded_screen();
    assert!(screen.select_search_result(FacilityId(2), Instant::now()));

    assert_eq!(screen.selection().selected(), Some(FacilityId(2)));
    match screen.bridge().sink().calls.last() {
        Some(OutboundCall::FocusOnFacility { zoom, .. }) => assert_eq!(*zoom, 16),
        other => panic!("expected focus call, got {other:?}"),
    }
}

#[test]
fn close_panel_returns_to_idle() {
    let mut screen = loaded_screen();
    screen.handle_surface_message(&view(1), Instant::now());
    screen.set_tab(Tab::About);
    screen.close_panel();

    assert_eq!(screen.selection().phase(), Phase::Idle);
    assert_eq!(screen.sheet_state().active_tab, Tab::Overview);
    assert!(!screen.sheet().is_visible());
}

#[test]
fn collapse_interrupting_expand_settles_at_collapsed_height() {
    let mut screen = loaded_screen();
    let start = Instant::now();
    screen.handle_surface_message(&view(1), start);

    screen.tap_handle(start);
    assert_eq!(screen.selection().phase(), Phase::Expanded);
    screen.tap_handle(start + Duration::from_millis(10));
    assert_eq!(screen.selection().phase(), Phase::Selected);

    let height = screen.tick(start + Duration::from_secs(2));
    assert!((height - screen.sheet().config().min_height).abs() < f32::EPSILON);
    assert_eq!(screen.sheet().phase(), SheetPhase::Collapsed);
}

#[test]
fn drag_past_threshold_expands_selection() {
    let mut screen = loaded_screen();
    let start = Instant::now();
    screen.handle_surface_message(&view(3), start);

    assert!(screen.drag_begin(start));
    assert!(screen.drag_move(2.0, -60.0));
    assert_eq!(screen.drag_end(-60.0, start), Some(Detent::Expanded));
    assert_eq!(screen.selection().phase(), Phase::Expanded);
}

#[test]
fn map_type_waits_for_surface() {
    let mut screen = screen(false);
    screen.set_map_type(MapType::Satellite);
    assert!(screen.bridge().sink().calls.is_empty());
    screen.handle_surface_message(r#"{"type":"mapLoaded"}"#, Instant::now());
    assert_eq!(
        screen.bridge().sink().calls.first(),
        Some(&OutboundCall::ChangeMapType(MapType::Satellite))
    );
}

#[test]
fn disposed_screen_ignores_everything() {
    let mut screen = loaded_screen();
    let calls_before = screen.bridge().sink().calls.len();
    screen.dispose();

    let now = Instant::now();
    screen.handle_surface_message(&view(1), now);
    screen.toggle_filter(FilterKey::Shop);
    screen.load_facilities(Ok::<_, String>(sample()));
    screen.set_map_type(MapType::Terrain);
    screen.set_scroll(Tab::Reviews, 80.0);

    assert!(screen.is_disposed());
    assert!(screen.scroll_offset(Tab::Reviews).abs() < f32::EPSILON);
    assert_eq!(screen.selection().phase(), Phase::Idle);
    assert_eq!(screen.bridge().sink().calls.len(), calls_before);
}

#[tokio::test(start_paused = true)]
async fn debounced_search_applies_last_keyword_once() {
    let mut screen = loaded_screen();
    let mut keywords = screen.debounce_search();
    let pushes_before = screen.bridge().sink().marker_pushes().len();

    for keyword in ["v", "va", "var", "vard", "vardar"] {
        screen.set_search_keyword(keyword);
        tokio::time::sleep(Duration::from_millis(40)).await;
    }
    assert_eq!(screen.bridge().sink().marker_pushes().len(), pushes_before);

    let keyword = keywords.recv().await.expect("debounced keyword");
    screen.apply_search(keyword);
    assert_eq!(screen.keyword(), "vardar");
    assert_eq!(pushed_ids(&screen), vec![3]);
    assert_eq!(screen.bridge().sink().marker_pushes().len(), pushes_before + 1);

    tokio::time::sleep(Duration::from_secs(1)).await;
    assert!(keywords.try_recv().is_err());
}

#[tokio::test(start_paused = true)]
async fn dispose_drops_pending_search() {
    let mut screen = loaded_screen();
    let mut keywords = screen.debounce_search();

    screen.set_search_keyword("hotel");
    screen.dispose();
    tokio::time::sleep(Duration::from_secs(1)).await;

    assert!(keywords.try_recv().is_err());
}
