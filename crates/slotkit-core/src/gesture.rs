#![forbid(unsafe_code)]

//! Gesture primitives: drag sessions and the manual double-click window.
//!
//! Slot widgets run a tiny pointer state machine per slot. These types hold
//! the two pieces of state that machine needs, keyed by whatever target the
//! widget cares about (a strength channel, a zone, ...).
//!
//! # State Machine
//!
//! - **Drag session**: armed on press, becomes "dragged" once horizontal
//!   displacement exceeds the threshold, consumed on release.
//! - **Click window**: remembers the last click target and time; a second
//!   click on the same target inside the window completes a double click.
//!
//! # Invariants
//!
//! 1. Drag and click never both fire for the same press → release pair.
//!    If a session was dragged, [`DragSession::finish`] reports
//!    [`ReleaseOutcome::Consumed`].
//! 2. A completed double click clears the click window, so a third click
//!    starts a fresh window instead of re-triggering.
//! 3. After `reset()`, no session and no pending click remain.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use web_time::Instant;

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Thresholds and timeouts for slot pointer handling.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GestureConfig {
    /// Window for the widget's own double-click detection (default: 500ms).
    pub double_click_window_ms: u64,
    /// Horizontal displacement (pixels) before a press becomes a drag (default: 3).
    pub drag_threshold: f32,
    /// Strength change per pixel of horizontal drag (default: 0.01).
    pub drag_scale: f32,
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self {
            double_click_window_ms: 500,
            drag_threshold: 3.0,
            drag_scale: 0.01,
        }
    }
}

impl GestureConfig {
    /// The double-click window as a [`Duration`].
    #[inline]
    #[must_use]
    pub fn double_click_window(&self) -> Duration {
        Duration::from_millis(self.double_click_window_ms)
    }
}

// ---------------------------------------------------------------------------
// Drag session
// ---------------------------------------------------------------------------

/// What a release means for an armed session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReleaseOutcome {
    /// The pointer moved past the threshold; the release is swallowed.
    Consumed,
    /// The press never became a drag; treat press + release as a click.
    Click,
}

/// A press-armed drag over one numeric target.
#[derive(Debug, Clone, PartialEq)]
pub struct DragSession<K> {
    target: K,
    start_x: f32,
    start_value: f32,
    dragged: bool,
}

impl<K: Copy + PartialEq> DragSession<K> {
    /// Arm a session at the press position with the target's current value.
    #[must_use]
    pub fn arm(target: K, start_x: f32, start_value: f32) -> Self {
        Self {
            target,
            start_x,
            start_value,
            dragged: false,
        }
    }

    /// The target this session was armed on.
    #[inline]
    pub fn target(&self) -> K {
        self.target
    }

    /// Value captured when the session was armed.
    #[inline]
    pub fn start_value(&self) -> f32 {
        self.start_value
    }

    /// Whether the threshold has been crossed.
    #[inline]
    pub fn is_dragged(&self) -> bool {
        self.dragged
    }

    /// Feed a pointer move. Returns the unclamped value the target should
    /// take, or `None` while the displacement is still within the threshold.
    ///
    /// Once dragged, every subsequent move yields a value, even if the
    /// pointer comes back inside the threshold.
    pub fn update(&mut self, x: f32, config: &GestureConfig) -> Option<f32> {
        let dx = x - self.start_x;
        if !self.dragged && dx.abs() <= config.drag_threshold {
            return None;
        }
        self.dragged = true;
        Some(self.start_value + dx * config.drag_scale)
    }

    /// Close the session on release.
    pub fn finish(self) -> ReleaseOutcome {
        if self.dragged {
            ReleaseOutcome::Consumed
        } else {
            ReleaseOutcome::Click
        }
    }
}

// ---------------------------------------------------------------------------
// Click window
// ---------------------------------------------------------------------------

/// Manual double-click detector keyed by target.
#[derive(Debug, Clone, Default)]
pub struct ClickWindow<K> {
    last: Option<(K, Instant)>,
}

impl<K: Copy + PartialEq> ClickWindow<K> {
    /// Create an idle window.
    #[must_use]
    pub fn new() -> Self {
        Self { last: None }
    }

    /// Register a click. Returns `true` when it completes a double click
    /// (same target, inside `window`), which also clears the window.
    pub fn register(&mut self, target: K, now: Instant, window: Duration) -> bool {
        if let Some((last_target, at)) = self.last
            && last_target == target
            && now.duration_since(at) <= window
        {
            self.last = None;
            return true;
        }
        self.last = Some((target, now));
        false
    }

    /// Whether a first click on `target` is waiting for its second click.
    #[must_use]
    pub fn is_armed_for(&self, target: K, now: Instant, window: Duration) -> bool {
        self.last
            .is_some_and(|(t, at)| t == target && now.duration_since(at) <= window)
    }

    /// Target of the pending first click, if any (ignores expiry).
    #[must_use]
    pub fn pending(&self) -> Option<K> {
        self.last.map(|(t, _)| t)
    }

    /// Forget any pending click.
    pub fn reset(&mut self) {
        self.last = None;
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
