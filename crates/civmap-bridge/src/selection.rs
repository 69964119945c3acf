use civmap_core::{FacilityId, FacilitySet};

/// Where the user is in the select/inspect/dismiss cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Nothing selected, panel hidden.
    Idle,
    /// Facility chosen, panel visible and collapsed.
    Selected,
    /// Panel visible and expanded.
    Expanded,
}

/// Detail panel tab.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tab {
    #[default]
    Overview,
    Reviews,
    About,
}

impl Tab {
    pub const ALL: [Tab; 3] = [Tab::Overview, Tab::Reviews, Tab::About];

    #[must_use]
    pub fn index(self) -> usize {
        match self {
            Tab::Overview => 0,
            Tab::Reviews => 1,
            Tab::About => 2,
        }
    }
}

impl std::str::FromStr for Tab {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "overview" => Ok(Tab::Overview),
            "reviews" => Ok(Tab::Reviews),
            "about" => Ok(Tab::About),
            other => Err(format!("unknown tab '{other}'")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectOutcome {
    /// Came from `Idle`.
    Entered,
    /// Replaced another selection; the panel drops back to collapsed.
    Switched { previous: FacilityId },
    /// The facility was already selected.
    Unchanged,
}

impl SelectOutcome {
    /// Whether the marker set needs restyling.
    #[must_use]
    pub fn changed(self) -> bool {
        !matches!(self, SelectOutcome::Unchanged)
    }
}

#[derive(Debug, Clone)]
pub struct Selection {
    phase: Phase,
    facility_id: Option<FacilityId>,
    active_tab: Tab,
}

impl Default for Selection {
    fn default() -> Self {
        Self::new()
    }
}

impl Selection {
    #[must_use]
    pub fn new() -> Self {
        Self {
            phase: Phase::Idle,
            facility_id: None,
            active_tab: Tab::Overview,
        }
    }

    #[must_use]
    pub fn phase(&self) -> Phase {
        self.phase
    }

    #[must_use]
    pub fn selected(&self) -> Option<FacilityId> {
        self.facility_id
    }

    #[must_use]
    pub fn active_tab(&self) -> Tab {
        self.active_tab
    }

    #[must_use]
    pub fn is_panel_visible(&self) -> bool {
        self.phase != Phase::Idle
    }

    /// Select `facility_id`. The caller resolves the id against the live
    /// facility set first.
    ///
    /// A new selection always lands in `Selected` with the tab reset to
    /// `tab` or [`Tab::Overview`]. Re-selecting the current facility keeps the
    /// phase; only an explicit `tab` is applied.
    pub fn select(&mut self, facility_id: FacilityId, tab: Option<Tab>) -> SelectOutcome {
        if self.facility_id == Some(facility_id) {
            if let Some(tab) = tab {
                self.active_tab = tab;
            }
            return SelectOutcome::Unchanged;
        }

        let previous = self.facility_id.replace(facility_id);
        self.phase = Phase::Selected;
        self.active_tab = tab.unwrap_or_default();
        tracing::debug!(%facility_id, tab = ?self.active_tab, "facility selected");

        match previous {
            Some(previous) => SelectOutcome::Switched { previous },
            None => SelectOutcome::Entered,
        }
    }

    /// `Selected -> Expanded`. Returns whether the phase changed.
    pub fn expand(&mut self) -> bool {
        if self.phase == Phase::Selected {
            self.phase = Phase::Expanded;
            true
        } else {
            false
        }
    }

    /// `Expanded -> Selected`. Returns whether the phase changed.
    pub fn collapse(&mut self) -> bool {
        if self.phase == Phase::Expanded {
            self.phase = Phase::Selected;
            true
        } else {
            false
        }
    }

    /// Back to `Idle`, returning the facility that was selected.
    pub fn dismiss(&mut self) -> Option<FacilityId> {
        self.phase = Phase::Idle;
        self.active_tab = Tab::Overview;
        self.facility_id.take()
    }

    /// Switch tabs. Ignored while nothing is selected.
    pub fn set_tab(&mut self, tab: Tab) -> bool {
        if self.phase == Phase::Idle {
            return false;
        }
        self.active_tab = tab;
        true
    }

    /// Drop the selection if its facility is no longer in `facilities`.
    /// Returns `true` if the selection was cleared.
    pub fn retain(&mut self, facilities: &FacilitySet) -> bool {
        match self.facility_id {
            Some(id) if !facilities.contains(id) => {
                tracing::debug!(facility_id = %id, "selected facility gone after reload");
                self.dismiss();
                true
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use civmap_core::{Contact, Coordinates, Facility, FacilityType};

    use super::*;

    fn set_of(ids: &[i64]) -> FacilitySet {
        FacilitySet::new(
            ids.iter()
                .map(|&id| Facility {
                    id: FacilityId(id),
                    name: format!("F{id}"),
                    facility_type: FacilityType::Shop,
                    coordinates: Coordinates::new(0.0, 0.0),
                    address: None,
                    contact: Contact::default(),
                })
                .collect(),
        )
    }

    #[test]
    fn select_from_idle_enters_selected_on_overview() {
        let mut selection = Selection::new();
        assert_eq!(
            selection.select(FacilityId(3), None),
            SelectOutcome::Entered
        );
        assert_eq!(selection.phase(), Phase::Selected);
        assert_eq!(selection.selected(), Some(FacilityId(3)));
        assert_eq!(selection.active_tab(), Tab::Overview);
        assert!(selection.is_panel_visible());
    }

    #[test]
    fn reselecting_same_facility_is_idempotent() {
        let mut selection = Selection::new();
        selection.select(FacilityId(3), None);
        assert_eq!(
            selection.select(FacilityId(3), None),
            SelectOutcome::Unchanged
        );
        assert_eq!(selection.phase(), Phase::Selected);

        selection.expand();
        assert_eq!(
            selection.select(FacilityId(3), None),
            SelectOutcome::Unchanged
        );
        assert_eq!(selection.phase(), Phase::Expanded);
    }

    #[test]
    fn reselecting_with_tab_override_switches_tab_only() {
        let mut selection = Selection::new();
        selection.select(FacilityId(3), None);
        selection.select(FacilityId(3), Some(Tab::Reviews));
        assert_eq!(selection.active_tab(), Tab::Reviews);
        assert_eq!(selection.phase(), Phase::Selected);
    }

    #[test]
    fn switching_facility_collapses_and_resets_tab() {
        let mut selection = Selection::new();
        selection.select(FacilityId(1), Some(Tab::About));
        selection.expand();
        assert_eq!(
            selection.select(FacilityId(2), None),
            SelectOutcome::Switched {
                previous: FacilityId(1)
            }
        );
        assert_eq!(selection.phase(), Phase::Selected);
        assert_eq!(selection.active_tab(), Tab::Overview);
    }

    #[test]
    fn view_reviews_presets_tab() {
        let mut selection = Selection::new();
        selection.select(FacilityId(5), Some(Tab::Reviews));
        assert_eq!(selection.active_tab(), Tab::Reviews);
    }

    #[test]
    fn expand_and_collapse_only_from_matching_phase() {
        let mut selection = Selection::new();
        assert!(!selection.expand());
        selection.select(FacilityId(1), None);
        assert!(!selection.collapse());
        assert!(selection.expand());
        assert!(!selection.expand());
        assert!(selection.collapse());
        assert_eq!(selection.phase(), Phase::Selected);
    }

    #[test]
    fn dismiss_returns_previous_and_goes_idle() {
        let mut selection = Selection::new();
        selection.select(FacilityId(4), Some(Tab::Reviews));
        selection.expand();
        assert_eq!(selection.dismiss(), Some(FacilityId(4)));
        assert_eq!(selection.phase(), Phase::Idle);
        assert_eq!(selection.active_tab(), Tab::Overview);
        assert_eq!(selection.dismiss(), None);
    }

    #[test]
    fn set_tab_ignored_when_idle() {
        let mut selection = Selection::new();
        assert!(!selection.set_tab(Tab::About));
        assert_eq!(selection.active_tab(), Tab::Overview);
    }

    #[test]
    fn retain_clears_stale_selection() {
        let mut selection = Selection::new();
        selection.select(FacilityId(3), None);
        assert!(!selection.retain(&set_of(&[1, 2, 3])));
        assert_eq!(selection.selected(), Some(FacilityId(3)));
        assert!(selection.retain(&set_of(&[1, 2])));
        assert_eq!(selection.phase(), Phase::Idle);
        assert_eq!(selection.selected(), None);
    }
}
