use super::settings::RelativePosition;

/// Relative coordinate of the three grid stops on each axis
pub const GRID_STOPS: [f64; 3] = [0.05, 0.5, 0.95];

const GRID_TOLERANCE: f64 = 0.01;

/// How far the layer can move on each axis: canvas size minus layer size, never negative
pub fn travel(canvas: (u32, u32), layer: (u32, u32)) -> (u32, u32) {
    (
        canvas.0.saturating_sub(layer.0),
        canvas.1.saturating_sub(layer.1),
    )
}

/// Map a relative position to the layer's top-left pixel on the canvas.
///
/// An axis where the layer is at least as large as the canvas has no travel
/// and pins the layer to 0; compositing crops whatever overhangs.
pub fn resolve_origin(
    canvas: (u32, u32),
    layer: (u32, u32),
    position: RelativePosition,
) -> (u32, u32) {
    let (travel_x, travel_y) = travel(canvas, layer);
    (
        axis_origin(position.x, travel_x),
        axis_origin(position.y, travel_y),
    )
}

fn axis_origin(relative: f64, travel: u32) -> u32 {
    if !relative.is_finite() {
        return 0;
    }
    (relative * travel as f64).round().clamp(0.0, travel as f64) as u32
}

/// Inverse of [`resolve_origin`] for a continuous origin.
///
/// Axes without travel report `fallback` unchanged.
pub fn relative_from_origin(
    origin: (f64, f64),
    travel: (u32, u32),
    fallback: RelativePosition,
) -> RelativePosition {
    let axis = |value: f64, travel: u32, fallback: f64| {
        if travel == 0 {
            fallback
        } else {
            (value / travel as f64).clamp(0.0, 1.0)
        }
    };
    RelativePosition::new(
        axis(origin.0, travel.0, fallback.x),
        axis(origin.1, travel.1, fallback.y),
    )
}

/// One cell of the 3×3 placement grid.
///
/// The grid only quantizes: every anchor maps to a fixed relative position
/// that goes through [`resolve_origin`] like any other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GridAnchor {
    column: usize,
    row: usize,
}

impl GridAnchor {
    /// `column` and `row` must each be 0, 1 or 2
    pub fn new(column: usize, row: usize) -> Option<Self> {
        (column < 3 && row < 3).then_some(Self { column, row })
    }

    pub fn column(&self) -> usize {
        self.column
    }

    pub fn row(&self) -> usize {
        self.row
    }

    pub fn position(&self) -> RelativePosition {
        RelativePosition::new(GRID_STOPS[self.column], GRID_STOPS[self.row])
    }

    /// The anchor whose stops match `position` on both axes, if any
    pub fn from_relative(position: RelativePosition) -> Option<Self> {
        let stop = |value: f64| {
            GRID_STOPS
                .iter()
                .position(|stop| (value - stop).abs() < GRID_TOLERANCE)
        };
        Some(Self {
            column: stop(position.x)?,
            row: stop(position.y)?,
        })
    }

    /// All nine anchors in row-major order
    pub fn all() -> impl Iterator<Item = GridAnchor> {
        (0..3).flat_map(|row| (0..3).map(move |column| GridAnchor { column, row }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_origin_corners() {
        let canvas = (1000, 800);
        let layer = (200, 50);
        assert_eq!(
            resolve_origin(canvas, layer, RelativePosition::new(0.0, 0.0)),
            (0, 0)
        );
        assert_eq!(
            resolve_origin(canvas, layer, RelativePosition::new(1.0, 1.0)),
            (800, 750)
        );
        assert_eq!(
            resolve_origin(canvas, layer, RelativePosition::new(0.5, 0.5)),
            (400, 375)
        );
    }

    #[test]
    fn test_resolve_origin_stays_in_travel_range() {
        let canvas = (640, 480);
        let layers = [(1, 1), (100, 40), (639, 479), (640, 480)];
        for layer in layers {
            let (travel_x, travel_y) = travel(canvas, layer);
            for step in 0..=20 {
                let r = step as f64 / 20.0;
                for position in [
                    RelativePosition::new(r, 1.0 - r),
                    RelativePosition::new(r, r),
                ] {
                    let (x, y) = resolve_origin(canvas, layer, position);
                    assert!(x <= travel_x, "x={} travel={}", x, travel_x);
                    assert!(y <= travel_y, "y={} travel={}", y, travel_y);
                    assert!(x + layer.0 <= canvas.0);
                    assert!(y + layer.1 <= canvas.1);
                }
            }
        }
    }

    #[test]
    fn test_resolve_origin_clamps_out_of_range_input() {
        let canvas = (100, 100);
        let layer = (10, 10);
        assert_eq!(
            resolve_origin(canvas, layer, RelativePosition::new(-0.5, 2.0)),
            (0, 90)
        );
        assert_eq!(
            resolve_origin(canvas, layer, RelativePosition::new(f64::NAN, f64::INFINITY)),
            (0, 0)
        );
    }

    #[test]
    fn test_oversized_layer_is_pinned() {
        let canvas = (100, 100);
        let layer = (150, 40);
        let (x, y) = resolve_origin(canvas, layer, RelativePosition::new(0.9, 1.0));
        assert_eq!(x, 0);
        assert_eq!(y, 60);
    }

    #[test]
    fn test_relative_from_origin_round_trips() {
        let canvas = (1000, 800);
        let layer = (200, 50);
        let travel = travel(canvas, layer);
        let position = relative_from_origin((400.0, 375.0), travel, RelativePosition::default());
        assert_eq!(resolve_origin(canvas, layer, position), (400, 375));
    }

    #[test]
    fn test_relative_from_origin_keeps_pinned_axis() {
        let fallback = RelativePosition::new(0.3, 0.7);
        let position = relative_from_origin((50.0, 20.0), (0, 40), fallback);
        assert_eq!(position.x, 0.3);
        assert_eq!(position.y, 0.5);
    }

    #[test]
    fn test_grid_anchor_positions() {
        let top_left = GridAnchor::new(0, 0).unwrap();
        assert_eq!(top_left.position(), RelativePosition::new(0.05, 0.05));

        let center = GridAnchor::new(1, 1).unwrap();
        assert_eq!(center.position(), RelativePosition::new(0.5, 0.5));

        let bottom_right = GridAnchor::new(2, 2).unwrap();
        assert_eq!(bottom_right.position(), RelativePosition::new(0.95, 0.95));

        assert!(GridAnchor::new(3, 0).is_none());
        assert!(GridAnchor::new(0, 3).is_none());
    }

    #[test]
    fn test_grid_anchor_from_relative() {
        for anchor in GridAnchor::all() {
            assert_eq!(GridAnchor::from_relative(anchor.position()), Some(anchor));
        }
        assert_eq!(
            GridAnchor::from_relative(RelativePosition::new(0.955, 0.045)),
            GridAnchor::new(2, 0)
        );
        assert_eq!(
            GridAnchor::from_relative(RelativePosition::new(0.3, 0.5)),
            None
        );
        assert_eq!(GridAnchor::all().count(), 9);
    }

    #[test]
    fn test_grid_goes_through_resolver() {
        let canvas = (1000, 800);
        let layer = (200, 50);
        let anchor = GridAnchor::new(2, 1).unwrap();
        assert_eq!(resolve_origin(canvas, layer, anchor.position()), (760, 375));
    }
}
