//! Detail panel (bottom sheet) height controller.
//!
//! The panel rests at one of two detents. Drags move it freely between them,
//! and on release it commits to one detent and tweens there. Every new
//! animation or drag replaces whatever was in flight; nothing queues.
//!
//! Time is passed in by the caller, so the controller is deterministic and
//! has no timers of its own.

use std::time::{Duration, Instant};

use civmap_core::AppConfig;

use crate::selection::Tab;

/// Maps linear progress `t` in `[0, 1]` to eased progress in `[0, 1]`.
pub trait Easing {
    fn ease(&self, t: f32) -> f32;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Linear;

impl Easing for Linear {
    fn ease(&self, t: f32) -> f32 {
        t
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct EaseOutCubic;

impl Easing for EaseOutCubic {
    fn ease(&self, t: f32) -> f32 {
        let inv = 1.0 - t;
        1.0 - inv * inv * inv
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SheetConfig {
    pub min_height: f32,
    pub max_height: f32,
    pub animation: Duration,
    /// Vertical movement below this is not a drag.
    pub dead_zone: f32,
    /// Release displacement needed to switch detents.
    pub commit_threshold: f32,
}

impl Default for SheetConfig {
    fn default() -> Self {
        Self {
            min_height: 180.0,
            max_height: 680.0,
            animation: Duration::from_millis(300),
            dead_zone: 10.0,
            commit_threshold: 20.0,
        }
    }
}

impl From<&AppConfig> for SheetConfig {
    fn from(config: &AppConfig) -> Self {
        Self {
            min_height: config.sheet_min_height,
            max_height: config.sheet_max_height(),
            animation: Duration::from_millis(config.sheet_animation_ms),
            dead_zone: config.drag_dead_zone_px,
            commit_threshold: config.drag_commit_px,
        }
    }
}

/// Resting position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Detent {
    Collapsed,
    Expanded,
}

impl Detent {
    fn opposite(self) -> Self {
        match self {
            Detent::Collapsed => Detent::Expanded,
            Detent::Expanded => Detent::Collapsed,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SheetPhase {
    Hidden,
    Collapsed,
    Expanding,
    Expanded,
    Collapsing,
    /// Following the user's finger.
    Dragging,
}

#[derive(Debug, Clone, Copy)]
struct Tween {
    from: f32,
    to: Detent,
    started: Instant,
}

#[derive(Debug, Clone, Copy)]
struct Drag {
    origin_height: f32,
    /// Detent the sheet was at or heading to when the finger went down.
    origin_detent: Detent,
    recognized: bool,
}

pub struct BottomSheet<E = EaseOutCubic> {
    config: SheetConfig,
    easing: E,
    phase: SheetPhase,
    height: f32,
    resting: Detent,
    tween: Option<Tween>,
    drag: Option<Drag>,
    scroll: [f32; 3],
}

impl BottomSheet<EaseOutCubic> {
    #[must_use]
    pub fn new(config: SheetConfig) -> Self {
        Self::with_easing(config, EaseOutCubic)
    }
}

impl<E: Easing> BottomSheet<E> {
    #[must_use]
    pub fn with_easing(config: SheetConfig, easing: E) -> Self {
        Self {
            config,
            easing,
            phase: SheetPhase::Hidden,
            height: 0.0,
            resting: Detent::Collapsed,
            tween: None,
            drag: None,
            scroll: [0.0; 3],
        }
    }

    #[must_use]
    pub fn phase(&self) -> SheetPhase {
        self.phase
    }

    #[must_use]
    pub fn is_visible(&self) -> bool {
        self.phase != SheetPhase::Hidden
    }

    /// Height as of the last [`BottomSheet::tick`] or gesture update.
    #[must_use]
    pub fn height(&self) -> f32 {
        self.height
    }

    #[must_use]
    pub fn config(&self) -> &SheetConfig {
        &self.config
    }

    /// The detent the sheet is at or moving towards.
    #[must_use]
    pub fn target(&self) -> Detent {
        self.tween.map_or(self.resting, |t| t.to)
    }

    fn detent_height(&self, detent: Detent) -> f32 {
        match detent {
            Detent::Collapsed => self.config.min_height,
            Detent::Expanded => self.config.max_height,
        }
    }

    /// Show the panel at its collapsed detent, discarding any motion.
    pub fn show(&mut self) {
        self.tween = None;
        self.drag = None;
        self.resting = Detent::Collapsed;
        self.height = self.config.min_height;
        self.phase = SheetPhase::Collapsed;
        self.reset_scroll();
    }

    pub fn hide(&mut self) {
        self.cancel();
        self.phase = SheetPhase::Hidden;
        self.height = 0.0;
        self.resting = Detent::Collapsed;
    }

    /// Drop any in-flight tween or drag where it stands.
    pub fn cancel(&mut self) {
        self.tween = None;
        self.drag = None;
        if self.is_visible() {
            self.phase = match self.resting {
                Detent::Collapsed => SheetPhase::Collapsed,
                Detent::Expanded => SheetPhase::Expanded,
            };
        }
    }

    /// Advance the animation clock and return the current height.
    pub fn tick(&mut self, now: Instant) -> f32 {
        if let Some(tween) = self.tween {
            let target = self.detent_height(tween.to);
            let elapsed = now.saturating_duration_since(tween.started);
            if self.config.animation.is_zero() || elapsed >= self.config.animation {
                self.settle(tween.to);
            } else {
                let t = elapsed.as_secs_f32() / self.config.animation.as_secs_f32();
                let eased = self.easing.ease(t.clamp(0.0, 1.0));
                self.height = tween.from + (target - tween.from) * eased;
            }
        }
        self.height
    }

    fn settle(&mut self, detent: Detent) {
        self.tween = None;
        self.resting = detent;
        self.height = self.detent_height(detent);
        self.phase = match detent {
            Detent::Collapsed => SheetPhase::Collapsed,
            Detent::Expanded => SheetPhase::Expanded,
        };
    }

    /// Start tweening toward `to` from wherever the sheet is at `now`.
    fn animate_to(&mut self, to: Detent, now: Instant) -> bool {
        if !self.is_visible() {
            return false;
        }
        let from = self.tick(now);
        self.drag = None;
        if self.tween.is_none() && self.resting == to && self.phase != SheetPhase::Dragging {
            return false;
        }
        self.tween = Some(Tween {
            from,
            to,
            started: now,
        });
        self.phase = match to {
            Detent::Collapsed => SheetPhase::Collapsing,
            Detent::Expanded => SheetPhase::Expanding,
        };
        true
    }

    /// Animate to the expanded detent. Returns `false` if there was nothing to do.
    pub fn expand(&mut self, now: Instant) -> bool {
        self.animate_to(Detent::Expanded, now)
    }

    /// Animate to the collapsed detent. Returns `false` if there was nothing to do.
    pub fn collapse(&mut self, now: Instant) -> bool {
        self.animate_to(Detent::Collapsed, now)
    }

    /// Handle tap: head for the other detent.
    pub fn toggle(&mut self, now: Instant) -> Option<Detent> {
        if !self.is_visible() {
            return None;
        }
        let to = self.target().opposite();
        self.animate_to(to, now);
        Some(to)
    }

    /// Finger down on the panel. Freezes any running tween at its current
    /// height.
    pub fn drag_begin(&mut self, now: Instant) -> bool {
        if !self.is_visible() {
            return false;
        }
        let origin_detent = self.target();
        let origin_height = self.tick(now);
        self.tween = None;
        self.drag = Some(Drag {
            origin_height,
            origin_detent,
            recognized: false,
        });
        true
    }

    /// Finger moved by (`dx`, `dy`) since [`BottomSheet::drag_begin`]; screen
    /// coordinates, so negative `dy` is upward. Returns `true` once the
    /// gesture has been recognized as a vertical drag.
    pub fn drag_move(&mut self, dx: f32, dy: f32) -> bool {
        let Some(drag) = self.drag.as_mut() else {
            return false;
        };
        if !drag.recognized {
            drag.recognized = dy.abs() > self.config.dead_zone && dy.abs() > dx.abs();
            if !drag.recognized {
                return false;
            }
        }
        let origin = drag.origin_height;
        self.phase = SheetPhase::Dragging;
        self.height = (origin - dy).clamp(self.config.min_height, self.config.max_height);
        true
    }

    /// Finger up. Commits to a detent when the release displacement crosses
    /// the threshold, otherwise returns to where the drag started. Returns
    /// the committed detent for recognized drags, `None` for taps.
    pub fn drag_end(&mut self, dy: f32, now: Instant) -> Option<Detent> {
        let drag = self.drag.take()?;
        if !drag.recognized {
            self.animate_or_settle(drag.origin_detent, now);
            return None;
        }
        let to = if dy < -self.config.commit_threshold {
            Detent::Expanded
        } else if dy > self.config.commit_threshold {
            Detent::Collapsed
        } else {
            drag.origin_detent
        };
        self.animate_or_settle(to, now);
        Some(to)
    }

    fn animate_or_settle(&mut self, to: Detent, now: Instant) {
        if (self.height - self.detent_height(to)).abs() < f32::EPSILON {
            self.settle(to);
        } else {
            self.tween = Some(Tween {
                from: self.height,
                to,
                started: now,
            });
            self.phase = match to {
                Detent::Collapsed => SheetPhase::Collapsing,
                Detent::Expanded => SheetPhase::Expanding,
            };
        }
    }

    /// Each tab pane scrolls on its own.
    pub fn set_scroll(&mut self, tab: Tab, offset: f32) {
        self.scroll[tab.index()] = offset.max(0.0);
    }

    #[must_use]
    pub fn scroll_offset(&self, tab: Tab) -> f32 {
        self.scroll[tab.index()]
    }

    /// Put every tab pane back at its top.
    pub fn reset_scroll(&mut self) {
        self.scroll = [0.0; 3];
    }
}
