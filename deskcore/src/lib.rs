//! deskcore — shared library for the deskwidgets manager and its overlays

pub mod dither;
pub mod logging;
pub mod repaint;
pub mod safety;
pub mod storage;
pub mod theme;
pub mod widgets;

pub use repaint::RepaintController;
pub use theme::DeskTheme;

/// Offset applied per cascaded window.
const CASCADE_STEP: f32 = 30.0;

/// Initial position for the `n`th cascaded window.
/// Used for staggering overlays so new ones don't stack exactly on top of
/// each other.
pub fn cascade_position(n: usize) -> egui::Pos2 {
    let offset = (n % 10) as f32 * CASCADE_STEP;
    egui::Pos2::new(100.0 + offset, 100.0 + offset)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cascade_staggers_and_wraps() {
        assert_eq!(cascade_position(0), egui::Pos2::new(100.0, 100.0));
        assert_eq!(cascade_position(2), egui::Pos2::new(160.0, 160.0));
        assert_eq!(cascade_position(10), cascade_position(0));
    }
}
