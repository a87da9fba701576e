//! Repaint scheduling
//!
//! egui only runs a frame when something happens. Overlays and the status
//! bar tick once per second, so between input events the app has to ask for
//! the next frame itself.
//!
//! `RepaintController` collects those requests during a frame and issues a
//! single `request_repaint_after` for the earliest one at the end. Input
//! events wake egui on their own and need nothing here.
//!
//! Apps call [`RepaintController::begin_frame`] at the top of `update()` and
//! [`RepaintController::end_frame`] at the bottom.

use std::time::Duration;

/// Controls when the egui context should request repaints.
pub struct RepaintController {
    /// Earliest requested wake-up for the next frame.
    next_wake: Option<Duration>,
}

impl Default for RepaintController {
    fn default() -> Self {
        Self::new()
    }
}

impl RepaintController {
    pub fn new() -> Self {
        Self { next_wake: None }
    }

    /// Ask for a frame no later than `after` from now. Multiple requests in
    /// the same frame keep the earliest.
    pub fn schedule(&mut self, after: Duration) {
        self.next_wake = Some(match self.next_wake {
            Some(current) => current.min(after),
            None => after,
        });
    }

    /// Request a repaint as soon as possible.
    pub fn mark_needs_repaint(&mut self) {
        self.schedule(Duration::ZERO);
    }

    /// Delay that [`end_frame`](Self::end_frame) will request, if any.
    pub fn pending(&self) -> Option<Duration> {
        self.next_wake
    }

    /// Call at the **start** of your `update()` method. Drops requests left
    /// over from a frame that never reached `end_frame`.
    pub fn begin_frame(&mut self) {
        self.next_wake = None;
    }

    /// Call at the **end** of your `update()` method.
    pub fn end_frame(&mut self, ctx: &egui::Context) {
        match self.next_wake.take() {
            Some(Duration::ZERO) => ctx.request_repaint(),
            Some(after) => ctx.request_repaint_after(after),
            // nothing scheduled, egui sleeps until the next input event
            None => {}
        }
    }
}
