//! Zoom and pan state: a granularity index and a horizontal scroll offset.

#[derive(Debug, Clone, PartialEq)]
pub struct ZoomPanController {
    index: usize,
    len: usize,
    pan_offset: f64,
    zoomable: bool,
    moveable: bool,
}

impl ZoomPanController {
    /// `index` is clamped into the table; an empty table pins it at zero.
    pub fn new(len: usize, index: usize, zoomable: bool, moveable: bool) -> Self {
        Self {
            index: index.min(len.saturating_sub(1)),
            len,
            pan_offset: 0.0,
            zoomable,
            moveable,
        }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn pan_offset(&self) -> f64 {
        self.pan_offset
    }

    /// One wheel step. Positive deltas move one entry coarser, negative ones
    /// finer; both ends clamp. Returns whether the index moved.
    pub fn on_zoom(&mut self, delta_y: f64) -> bool {
        if !self.zoomable || delta_y == 0.0 || delta_y.is_nan() || self.len == 0 {
            return false;
        }
        let next = if delta_y > 0.0 {
            (self.index + 1).min(self.len - 1)
        } else {
            self.index.saturating_sub(1)
        };
        let moved = next != self.index;
        if moved {
            tracing::debug!(from = self.index, to = next, "granularity step");
        }
        self.index = next;
        moved
    }

    /// Shifts the display scroll offset. The offset is not bounded here.
    pub fn on_pan_move(&mut self, dx: f64) -> bool {
        if !self.moveable || dx == 0.0 || !dx.is_finite() {
            return false;
        }
        self.pan_offset += dx;
        true
    }

    /// Jumps straight to `index` (clamped). Used when a window is requested
    /// explicitly rather than by wheel input.
    pub fn set_index(&mut self, index: usize) -> bool {
        let next = index.min(self.len.saturating_sub(1));
        let moved = next != self.index;
        self.index = next;
        moved
    }

    pub fn set_pan_offset(&mut self, offset: f64) {
        if offset.is_finite() {
            self.pan_offset = offset;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zoom_steps_one_entry_and_clamps() {
        let mut controller = ZoomPanController::new(3, 1, true, true);
        assert!(controller.on_zoom(120.0));
        assert_eq!(controller.index(), 2);
        assert!(!controller.on_zoom(500.0));
        assert_eq!(controller.index(), 2);
        assert!(controller.on_zoom(-1.0));
        assert!(controller.on_zoom(-1.0));
        assert!(!controller.on_zoom(-1.0));
        assert_eq!(controller.index(), 0);
    }

    #[test]
    fn zero_delta_is_ignored() {
        let mut controller = ZoomPanController::new(12, 5, true, true);
        assert!(!controller.on_zoom(0.0));
        assert!(!controller.on_pan_move(0.0));
        assert_eq!(controller.index(), 5);
        assert_eq!(controller.pan_offset(), 0.0);
    }

    #[test]
    fn disabled_controls_ignore_input() {
        let mut controller = ZoomPanController::new(12, 5, false, false);
        assert!(!controller.on_zoom(1.0));
        assert!(!controller.on_pan_move(40.0));
        assert_eq!(controller.index(), 5);
        assert_eq!(controller.pan_offset(), 0.0);
    }

    #[test]
    fn pan_accumulates_without_bounds() {
        let mut controller = ZoomPanController::new(12, 5, true, true);
        controller.on_pan_move(-30.0);
        controller.on_pan_move(-30.0);
        assert_eq!(controller.pan_offset(), -60.0);
    }

    #[test]
    fn initial_index_is_clamped() {
        assert_eq!(ZoomPanController::new(4, 99, true, true).index(), 3);
        assert_eq!(ZoomPanController::new(0, 3, true, true).index(), 0);
    }
}
