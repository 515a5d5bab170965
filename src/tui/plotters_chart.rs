//! Plotters-powered price sensitivity chart for Ratatui.
//!
//! We render Plotters output into the Ratatui buffer using `plotters-ratatui-backend`.

use plotters::prelude::*;
use plotters_ratatui_backend::widget_fn;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    widgets::Widget,
};

/// A render-only chart description. All series and bounds are computed
/// outside the render call.
pub struct PriceCurveChart<'a> {
    /// Predicted price across the swept field.
    pub curve: &'a [(f64, f64)],
    /// The form's current value and its price.
    pub current: Option<(f64, f64)>,
    pub x_bounds: [f64; 2],
    pub y_bounds: [f64; 2],
    pub x_label: &'a str,
    pub fmt_x: fn(f64) -> String,
    pub fmt_y: fn(f64) -> String,
}

impl<'a> PriceCurveChart<'a> {
    /// Bounds covering the curve (and the current point), with 5% vertical padding.
    pub fn bounds_for(curve: &[(f64, f64)], current: Option<(f64, f64)>) -> Option<([f64; 2], [f64; 2])> {
        let points = curve.iter().copied().chain(current);
        let (mut x0, mut x1, mut y0, mut y1) = (f64::INFINITY, f64::NEG_INFINITY, f64::INFINITY, f64::NEG_INFINITY);
        for (x, y) in points {
            x0 = x0.min(x);
            x1 = x1.max(x);
            y0 = y0.min(y);
            y1 = y1.max(y);
        }
        if !(x0.is_finite() && x1.is_finite() && y0.is_finite() && y1.is_finite()) || x1 <= x0 {
            return None;
        }
        let pad = ((y1 - y0).abs() * 0.05).max(1.0);
        Some(([x0, x1], [y0 - pad, y1 + pad]))
    }
}

impl<'a> Widget for PriceCurveChart<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        // When the available area is too small, Plotters may fail to build a chart.
        if area.width < 20 || area.height < 8 {
            buf.set_string(
                area.x,
                area.y,
                "Chart area too small (resize terminal).",
                Style::default().fg(Color::Yellow),
            );
            return;
        }

        let [x0, x1] = self.x_bounds;
        let [y0, y1] = self.y_bounds;
        if !(x0.is_finite() && x1.is_finite() && y0.is_finite() && y1.is_finite()) || x1 <= x0 || y1 <= y0 {
            return;
        }

        let widget = widget_fn(move |root| {
            let mut chart = ChartBuilder::on(&root)
                .margin(1)
                // Terminal cells are low-res, so keep label areas compact.
                .set_label_area_size(LabelAreaPosition::Left, 9)
                .set_label_area_size(LabelAreaPosition::Bottom, 3)
                .build_cartesian_2d(x0..x1, y0..y1)?;

            chart
                .configure_mesh()
                .disable_x_mesh()
                .disable_y_mesh()
                .x_desc(self.x_label)
                .y_desc("price")
                .x_labels(5)
                .y_labels(4)
                .x_label_formatter(&|v| (self.fmt_x)(*v))
                .y_label_formatter(&|v| (self.fmt_y)(*v))
                .label_style(("sans-serif", 10).into_font().color(&WHITE))
                .axis_style(&WHITE)
                .bold_line_style(&WHITE)
                .draw()?;

            let curve_color = RGBColor(0, 255, 255);
            let current_color = RGBColor(255, 255, 0);

            chart.draw_series(LineSeries::new(self.curve.iter().copied(), &curve_color))?;

            // Vertical guide at the current value, plus the point itself.
            //
            // `Circle` markers are avoided: the backend maps their radius in
            // normalized canvas units and draws them far too large.
            if let Some((x, y)) = self.current {
                chart.draw_series(LineSeries::new([(x, y0), (x, y1)], &current_color))?;
                chart.draw_series(std::iter::once(Pixel::new((x, y), RGBColor(255, 0, 0))))?;
            }

            Ok(())
        });

        widget.render(area, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bounds_include_current_point() {
        let curve = [(1.0, 100.0), (2.0, 200.0)];
        let (x, y) = PriceCurveChart::bounds_for(&curve, Some((1.5, 400.0))).unwrap();
        assert_eq!(x, [1.0, 2.0]);
        assert!(y[0] < 100.0 && y[1] > 400.0);
    }

    #[test]
    fn degenerate_curve_has_no_bounds() {
        assert!(PriceCurveChart::bounds_for(&[], None).is_none());
        assert!(PriceCurveChart::bounds_for(&[(1.0, 5.0)], None).is_none());
    }
}
