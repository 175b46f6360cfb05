/// How the canvas is letterboxed into the preview widget.
///
/// The canvas is scaled uniformly to fit the widget and centered, leaving
/// bars on one axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    canvas: (u32, u32),
    widget: (u32, u32),
    scale: f64,
    offset: (f64, f64),
}

impl Viewport {
    /// Fit `canvas` inside `widget`; `None` when either has a zero dimension
    pub fn fit(canvas: (u32, u32), widget: (u32, u32)) -> Option<Self> {
        if canvas.0 == 0 || canvas.1 == 0 || widget.0 == 0 || widget.1 == 0 {
            return None;
        }

        let scale = (widget.0 as f64 / canvas.0 as f64).min(widget.1 as f64 / canvas.1 as f64);
        let displayed = (canvas.0 as f64 * scale, canvas.1 as f64 * scale);
        let offset = (
            (widget.0 as f64 - displayed.0) / 2.0,
            (widget.1 as f64 - displayed.1) / 2.0,
        );

        Some(Self {
            canvas,
            widget,
            scale,
            offset,
        })
    }

    pub fn canvas_size(&self) -> (u32, u32) {
        self.canvas
    }

    pub fn widget_size(&self) -> (u32, u32) {
        self.widget
    }

    /// Displayed size divided by canvas size
    pub fn scale(&self) -> f64 {
        self.scale
    }

    /// Top-left corner of the displayed image inside the widget
    pub fn offset(&self) -> (f64, f64) {
        self.offset
    }

    pub fn displayed_size(&self) -> (f64, f64) {
        (
            self.canvas.0 as f64 * self.scale,
            self.canvas.1 as f64 * self.scale,
        )
    }

    pub fn to_canvas(&self, point: (f64, f64)) -> (f64, f64) {
        (
            (point.0 - self.offset.0) / self.scale,
            (point.1 - self.offset.1) / self.scale,
        )
    }

    pub fn to_display(&self, point: (f64, f64)) -> (f64, f64) {
        (
            point.0 * self.scale + self.offset.0,
            point.1 * self.scale + self.offset.1,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fit_wide_canvas_letterboxes_vertically() {
        let viewport = Viewport::fit((1000, 500), (400, 300)).unwrap();
        assert_eq!(viewport.scale(), 0.4);
        assert_eq!(viewport.displayed_size(), (400.0, 200.0));
        assert_eq!(viewport.offset(), (0.0, 50.0));
    }

    #[test]
    fn test_fit_tall_canvas_letterboxes_horizontally() {
        let viewport = Viewport::fit((500, 1000), (400, 300)).unwrap();
        assert_eq!(viewport.scale(), 0.3);
        assert_eq!(viewport.offset(), (125.0, 0.0));
    }

    #[test]
    fn test_fit_rejects_empty_sizes() {
        assert!(Viewport::fit((0, 10), (100, 100)).is_none());
        assert!(Viewport::fit((10, 10), (100, 0)).is_none());
    }

    #[test]
    fn test_point_conversion_round_trip() {
        let viewport = Viewport::fit((1000, 800), (500, 500)).unwrap();
        let display = viewport.to_display((250.0, 400.0));
        assert_eq!(display, (125.0, 250.0));
        assert_eq!(viewport.to_canvas(display), (250.0, 400.0));

        // Clicking the top letterbox bar lands above the canvas
        let (_, y) = viewport.to_canvas((250.0, 10.0));
        assert!(y < 0.0);
    }
}
