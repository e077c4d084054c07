use std::cell::Cell;
use std::rc::Rc;

/// Bounding box of an element in client (viewport) coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClientRect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl ClientRect {
    pub fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    /// Maps a client-space point to `[0, 1]` coordinates with a bottom-left
    /// origin, matching `gl_FragCoord`. `None` when the point lies outside.
    pub fn normalize(&self, client_x: f64, client_y: f64) -> Option<[f32; 2]> {
        if !(self.width > 0.0 && self.height > 0.0) {
            return None;
        }
        let x = (client_x - self.left) / self.width;
        let y = 1.0 - (client_y - self.top) / self.height;
        let inside = (0.0..=1.0).contains(&x) && (0.0..=1.0).contains(&y);
        inside.then_some([x as f32, y as f32])
    }
}

/// Last known pointer position over one canvas.
///
/// Event handlers write, the next frame reads; there is no queue, the latest
/// write wins. Clones share the same cell.
#[derive(Debug, Clone, Default)]
pub struct PointerTracker {
    position: Rc<Cell<[f32; 2]>>,
    moves: Rc<Cell<u64>>,
}

impl PointerTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a pointer event. Positions outside `rect` leave the last known
    /// value in place.
    pub fn record_client(&self, client_x: f64, client_y: f64, rect: ClientRect) {
        if let Some(position) = rect.normalize(client_x, client_y) {
            self.position.set(position);
            self.moves.set(self.moves.get().saturating_add(1));
        }
    }

    pub fn position(&self) -> [f32; 2] {
        self.position.get()
    }

    /// Number of in-bounds moves recorded so far.
    pub fn moves(&self) -> u64 {
        self.moves.get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_with_bottom_left_origin() {
        let rect = ClientRect::new(100.0, 50.0, 200.0, 100.0);
        assert_eq!(rect.normalize(100.0, 150.0), Some([0.0, 0.0]));
        assert_eq!(rect.normalize(300.0, 50.0), Some([1.0, 1.0]));
        assert_eq!(rect.normalize(200.0, 100.0), Some([0.5, 0.5]));
    }

    #[test]
    fn outside_points_keep_last_position() {
        let rect = ClientRect::new(0.0, 0.0, 100.0, 100.0);
        let tracker = PointerTracker::new();
        tracker.record_client(25.0, 75.0, rect);
        assert_eq!(tracker.position(), [0.25, 0.25]);

        tracker.record_client(150.0, 75.0, rect);
        tracker.record_client(25.0, -3.0, rect);
        assert_eq!(tracker.position(), [0.25, 0.25]);
        assert_eq!(tracker.moves(), 1);
    }

    #[test]
    fn degenerate_rect_is_ignored() {
        let tracker = PointerTracker::new();
        tracker.record_client(0.0, 0.0, ClientRect::new(0.0, 0.0, 0.0, 10.0));
        assert_eq!(tracker.position(), [0.0, 0.0]);
        assert_eq!(tracker.moves(), 0);
    }

    #[test]
    fn clones_share_state() {
        let tracker = PointerTracker::new();
        let writer = tracker.clone();
        writer.record_client(5.0, 5.0, ClientRect::new(0.0, 0.0, 10.0, 10.0));
        assert_eq!(tracker.position(), [0.5, 0.5]);
    }
}
