use tracing::debug;

use super::viewport::Viewport;
use crate::watermark::{BoundingBox, RelativePosition, relative_from_origin, travel};

/// An in-progress drag of the watermark
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragSession {
    viewport: Viewport,
    start_pointer: (f64, f64),
    start_position: RelativePosition,
    start_origin: (f64, f64),
    travel: (u32, u32),
    live_position: RelativePosition,
}

impl DragSession {
    pub fn start_position(&self) -> RelativePosition {
        self.start_position
    }

    pub fn live_position(&self) -> RelativePosition {
        self.live_position
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum DragState {
    #[default]
    Idle,
    Dragging(DragSession),
}

/// Turns pointer events on the letterboxed preview into relative positions.
///
/// Only the position reached at pointer-up is meant to be committed; every
/// intermediate position is a live preview.
#[derive(Debug, Clone, Default)]
pub struct DragController {
    state: DragState,
}

impl DragController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &DragState {
        &self.state
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.state, DragState::Dragging(_))
    }

    /// The uncommitted position of the current drag
    pub fn live_position(&self) -> Option<RelativePosition> {
        match &self.state {
            DragState::Dragging(session) => Some(session.live_position),
            DragState::Idle => None,
        }
    }

    /// Start dragging if `pointer` (display coordinates) hits the watermark.
    ///
    /// `committed` is the position currently stored for the image. Returns
    /// whether a drag started.
    pub fn pointer_down(
        &mut self,
        pointer: (f64, f64),
        viewport: Viewport,
        bounding_box: Option<BoundingBox>,
        committed: RelativePosition,
    ) -> bool {
        self.state = DragState::Idle;

        let Some(bounding_box) = bounding_box else {
            return false;
        };

        let (canvas_x, canvas_y) = viewport.to_canvas(pointer);
        if !bounding_box.contains(canvas_x, canvas_y) {
            return false;
        }

        let travel = travel(viewport.canvas_size(), bounding_box.size());
        let start_position = committed.clamped();
        let start_origin = (
            start_position.x * travel.0 as f64,
            start_position.y * travel.1 as f64,
        );

        debug!(
            "Drag started at canvas ({:.1}, {:.1}), travel {:?}",
            canvas_x, canvas_y, travel
        );
        self.state = DragState::Dragging(DragSession {
            viewport,
            start_pointer: pointer,
            start_position,
            start_origin,
            travel,
            live_position: start_position,
        });
        true
    }

    /// Follow the pointer and return the new live position.
    ///
    /// A changed viewport or a missing bounding box aborts the drag and
    /// returns `None`; the committed position is left alone.
    pub fn pointer_move(
        &mut self,
        pointer: (f64, f64),
        viewport: Viewport,
        bounding_box: Option<BoundingBox>,
    ) -> Option<RelativePosition> {
        let DragState::Dragging(session) = &mut self.state else {
            return None;
        };

        if session.viewport != viewport || bounding_box.is_none() {
            debug!("Drag aborted: viewport changed or watermark cleared");
            self.state = DragState::Idle;
            return None;
        }

        let scale = session.viewport.scale();
        let delta = (
            (pointer.0 - session.start_pointer.0) / scale,
            (pointer.1 - session.start_pointer.1) / scale,
        );
        let origin = (
            (session.start_origin.0 + delta.0).clamp(0.0, session.travel.0 as f64),
            (session.start_origin.1 + delta.1).clamp(0.0, session.travel.1 as f64),
        );

        session.live_position = relative_from_origin(origin, session.travel, session.start_position);
        Some(session.live_position)
    }

    /// Finish the drag, returning the position to commit
    pub fn pointer_up(&mut self) -> Option<RelativePosition> {
        match std::mem::take(&mut self.state) {
            DragState::Dragging(session) => {
                debug!("Drag committed at {:?}", session.live_position);
                Some(session.live_position)
            }
            DragState::Idle => None,
        }
    }

    /// Drop the drag without committing anything
    pub fn abort(&mut self) -> bool {
        let was_dragging = self.is_dragging();
        self.state = DragState::Idle;
        was_dragging
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::watermark::resolve_origin;

    fn viewport() -> Viewport {
        // 1000x800 canvas in a 500x500 widget: scale 0.5, 50px bars top and bottom
        Viewport::fit((1000, 800), (500, 500)).unwrap()
    }

    fn bbox_for(position: RelativePosition) -> BoundingBox {
        let (x, y) = resolve_origin((1000, 800), (200, 50), position);
        BoundingBox::new(x, y, 200, 50)
    }

    #[test]
    fn test_pointer_down_outside_box_stays_idle() {
        let mut drag = DragController::new();
        let position = RelativePosition::new(0.0, 0.0);

        // Canvas (300, 300) is far from the box at (0, 0, 200, 50)
        assert!(!drag.pointer_down((150.0, 200.0), viewport(), Some(bbox_for(position)), position));
        assert_eq!(drag.state(), &DragState::Idle);

        assert!(!drag.pointer_down((10.0, 60.0), viewport(), None, position));
        assert!(!drag.is_dragging());
    }

    #[test]
    fn test_pointer_down_accounts_for_letterbox() {
        let mut drag = DragController::new();
        let position = RelativePosition::new(0.0, 0.0);

        // Display (10, 10) is inside the top bar, canvas y = -80
        assert!(!drag.pointer_down((10.0, 10.0), viewport(), Some(bbox_for(position)), position));
        // Display (10, 60) maps to canvas (20, 20)
        assert!(drag.pointer_down((10.0, 60.0), viewport(), Some(bbox_for(position)), position));
    }

    #[test]
    fn test_drag_round_trip() {
        let mut drag = DragController::new();
        let position = RelativePosition::new(0.25, 0.5);
        let bbox = bbox_for(position);
        assert_eq!(bbox, BoundingBox::new(200, 375, 200, 50));
        let press = viewport().to_display((bbox.x as f64 + 10.0, bbox.y as f64 + 10.0));

        assert!(drag.pointer_down(press, viewport(), Some(bbox), position));

        let (dx, dy) = (40.0, -30.0);
        let live = drag
            .pointer_move((press.0 + dx, press.1 + dy), viewport(), Some(bbox))
            .unwrap();
        assert_eq!(drag.pointer_up(), Some(live));
        assert!(!drag.is_dragging());

        let before = resolve_origin((1000, 800), (200, 50), position);
        let after = resolve_origin((1000, 800), (200, 50), live);
        let expected = (
            before.0 as f64 + dx / viewport().scale(),
            before.1 as f64 + dy / viewport().scale(),
        );
        assert!((after.0 as f64 - expected.0).abs() <= 1.0);
        assert!((after.1 as f64 - expected.1).abs() <= 1.0);
    }

    #[test]
    fn test_drag_clamps_each_axis() {
        let mut drag = DragController::new();
        let position = RelativePosition::new(0.5, 0.5);
        let bbox = bbox_for(position);
        let press = viewport().to_display((bbox.x as f64 + 5.0, bbox.y as f64 + 5.0));

        assert!(drag.pointer_down(press, viewport(), Some(bbox), position));
        let live = drag
            .pointer_move((press.0 + 10_000.0, press.1 - 10_000.0), viewport(), Some(bbox))
            .unwrap();
        assert_eq!(live, RelativePosition::new(1.0, 0.0));
    }

    #[test]
    fn test_axis_without_travel_never_moves() {
        let mut drag = DragController::new();
        let viewport = Viewport::fit((300, 300), (300, 300)).unwrap();
        let position = RelativePosition::new(0.4, 0.6);
        // Layer as wide as the canvas: no horizontal travel
        let (x, y) = resolve_origin((300, 300), (300, 40), position);
        let bbox = BoundingBox::new(x, y, 300, 40);

        assert!(drag.pointer_down((150.0, y as f64 + 5.0), viewport, Some(bbox), position));
        let live = drag
            .pointer_move((250.0, y as f64 + 55.0), viewport, Some(bbox))
            .unwrap();
        assert_eq!(live.x, 0.4);
        assert!(live.y > 0.6);
    }

    #[test]
    fn test_viewport_change_aborts_drag() {
        let mut drag = DragController::new();
        let position = RelativePosition::new(0.0, 0.0);
        assert!(drag.pointer_down((10.0, 60.0), viewport(), Some(bbox_for(position)), position));

        let resized = Viewport::fit((1000, 800), (600, 600)).unwrap();
        assert_eq!(drag.pointer_move((40.0, 80.0), resized, Some(bbox_for(position))), None);
        assert!(!drag.is_dragging());
        assert_eq!(drag.pointer_up(), None);
    }

    #[test]
    fn test_cleared_watermark_aborts_drag() {
        let mut drag = DragController::new();
        let position = RelativePosition::new(0.0, 0.0);
        assert!(drag.pointer_down((10.0, 60.0), viewport(), Some(bbox_for(position)), position));

        assert_eq!(drag.pointer_move((40.0, 80.0), viewport(), None), None);
        assert_eq!(drag.pointer_up(), None);
    }

    #[test]
    fn test_abort_discards_live_position() {
        let mut drag = DragController::new();
        let position = RelativePosition::new(0.0, 0.0);
        assert!(drag.pointer_down((10.0, 60.0), viewport(), Some(bbox_for(position)), position));
        assert!(drag.pointer_move((60.0, 90.0), viewport(), Some(bbox_for(position))).is_some());

        assert!(drag.abort());
        assert!(!drag.abort());
        assert_eq!(drag.live_position(), None);
    }
}
