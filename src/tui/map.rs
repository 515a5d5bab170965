//! World map panel with a location marker.
//!
//! The view is a lat/lng window rendered with Ratatui's canvas `Map`. Mouse
//! clicks are converted back into coordinates with the same cell mapping the
//! canvas uses for printed labels, so a click lands where the marker is drawn.

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::Span,
    widgets::{
        Block, Borders, Widget,
        canvas::{Canvas, Line as CanvasLine, Map, MapResolution},
    },
};

use crate::domain::Coordinate;

const MAX_ZOOM: f64 = 64.0;

/// Visible lat/lng window.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MapView {
    center: Coordinate,
    zoom: f64,
}

impl Default for MapView {
    fn default() -> Self {
        Self::world()
    }
}

impl MapView {
    pub fn world() -> Self {
        Self {
            center: Coordinate::new(0.0, 0.0),
            zoom: 1.0,
        }
    }

    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    pub fn zoom_in(&mut self, around: Coordinate) {
        self.zoom = (self.zoom * 2.0).min(MAX_ZOOM);
        self.center = around;
        self.center = self.fit_center();
    }

    pub fn zoom_out(&mut self) {
        self.zoom = (self.zoom / 2.0).max(1.0);
        self.center = self.fit_center();
    }

    /// Recenter if `c` has scrolled out of view.
    pub fn follow(&mut self, c: Coordinate) {
        let (x, y) = self.bounds();
        if !(x[0]..=x[1]).contains(&c.longitude) || !(y[0]..=y[1]).contains(&c.latitude) {
            self.center = c;
            self.center = self.fit_center();
        }
    }

    /// `([lng_min, lng_max], [lat_min, lat_max])`.
    pub fn bounds(&self) -> ([f64; 2], [f64; 2]) {
        let half_w = 180.0 / self.zoom;
        let half_h = 90.0 / self.zoom;
        let c = self.fit_center();
        (
            [c.longitude - half_w, c.longitude + half_w],
            [c.latitude - half_h, c.latitude + half_h],
        )
    }

    /// Degrees covered by one terminal cell `(lng, lat)` in `area`.
    pub fn cell_size(&self, area: Rect) -> (f64, f64) {
        let (x, y) = self.bounds();
        (
            (x[1] - x[0]) / f64::from(area.width.saturating_sub(1).max(1)),
            (y[1] - y[0]) / f64::from(area.height.saturating_sub(1).max(1)),
        )
    }

    /// Coordinate under a terminal cell, or `None` when the cell is outside `area`.
    pub fn coordinate_at(&self, area: Rect, column: u16, row: u16) -> Option<Coordinate> {
        if area.width < 2 || area.height < 2 {
            return None;
        }
        if column < area.x || column >= area.x + area.width || row < area.y || row >= area.y + area.height {
            return None;
        }
        let (x, y) = self.bounds();
        let (dx, dy) = self.cell_size(area);
        // Centre of the cell.
        let lng = x[0] + (f64::from(column - area.x) + 0.5) * dx;
        let lat = y[1] - (f64::from(row - area.y) + 0.5) * dy;
        Some(Coordinate::new(lat, lng).clamped())
    }

    /// Cell where the canvas prints a label at `c` (matches `Canvas` label placement).
    #[cfg(test)]
    fn cell_of(&self, area: Rect, c: Coordinate) -> Option<(u16, u16)> {
        let (x, y) = self.bounds();
        if !(x[0]..=x[1]).contains(&c.longitude) || !(y[0]..=y[1]).contains(&c.latitude) {
            return None;
        }
        let col = ((c.longitude - x[0]) * f64::from(area.width.saturating_sub(1)) / (x[1] - x[0])) as u16;
        let row = ((y[1] - c.latitude) * f64::from(area.height.saturating_sub(1)) / (y[1] - y[0])) as u16;
        Some((area.x + col, area.y + row))
    }

    // Keep the window inside [-180, 180] x [-90, 90].
    fn fit_center(&self) -> Coordinate {
        let half_w = 180.0 / self.zoom;
        let half_h = 90.0 / self.zoom;
        Coordinate::new(
            self.center.latitude.clamp(-90.0 + half_h, 90.0 - half_h),
            self.center.longitude.clamp(-180.0 + half_w, 180.0 - half_w),
        )
    }
}

/// Map panel: border, world outline and the marker.
pub struct MapWidget<'a> {
    pub view: &'a MapView,
    pub marker: Coordinate,
    pub focused: bool,
    pub title: String,
}

impl MapWidget<'_> {
    /// Inner area the canvas draws into (where clicks are accepted).
    pub fn inner(area: Rect) -> Rect {
        Block::default().borders(Borders::ALL).inner(area)
    }
}

impl Widget for MapWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let border = if self.focused {
            Style::default().fg(Color::Cyan)
        } else {
            Style::default()
        };
        let block = Block::default()
            .title(self.title)
            .borders(Borders::ALL)
            .border_style(border);

        let (x_bounds, y_bounds) = self.view.bounds();
        let marker = self.marker;
        let (dx, dy) = self.view.cell_size(Self::inner(area));

        Canvas::default()
            .block(block)
            .x_bounds(x_bounds)
            .y_bounds(y_bounds)
            .paint(move |ctx| {
                ctx.draw(&Map {
                    resolution: MapResolution::High,
                    color: Color::DarkGray,
                });
                ctx.layer();
                // Short crosshair arms around the marker.
                ctx.draw(&CanvasLine {
                    x1: marker.longitude - 2.0 * dx,
                    y1: marker.latitude,
                    x2: marker.longitude + 2.0 * dx,
                    y2: marker.latitude,
                    color: Color::Red,
                });
                ctx.draw(&CanvasLine {
                    x1: marker.longitude,
                    y1: marker.latitude - dy,
                    x2: marker.longitude,
                    y2: marker.latitude + dy,
                    color: Color::Red,
                });
                ctx.print(
                    marker.longitude,
                    marker.latitude,
                    Span::styled("●", Style::default().fg(Color::Red).add_modifier(Modifier::BOLD)),
                );
            })
            .render(area, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn area() -> Rect {
        Rect::new(10, 5, 81, 41)
    }

    #[test]
    fn world_view_covers_globe() {
        let (x, y) = MapView::world().bounds();
        assert_eq!(x, [-180.0, 180.0]);
        assert_eq!(y, [-90.0, 90.0]);
    }

    #[test]
    fn click_then_place_returns_same_cell() {
        let view = MapView::world();
        let area = area();
        for (col, row) in [(10, 5), (50, 25), (89, 44), (33, 12)] {
            let c = view.coordinate_at(area, col, row).unwrap();
            assert_eq!(view.cell_of(area, c), Some((col, row)), "cell ({col}, {row})");
        }
    }

    #[test]
    fn marker_cell_maps_back_near_marker() {
        let mut view = MapView::world();
        view.zoom_in(Coordinate::new(40.7128, -74.0060));
        let area = area();
        let nyc = Coordinate::new(40.7128, -74.0060);
        let (col, row) = view.cell_of(area, nyc).unwrap();
        let back = view.coordinate_at(area, col, row).unwrap();
        let (dx, dy) = view.cell_size(area);
        assert!((back.longitude - nyc.longitude).abs() <= dx);
        assert!((back.latitude - nyc.latitude).abs() <= dy);
    }

    #[test]
    fn clicks_outside_area_are_ignored() {
        let view = MapView::world();
        assert!(view.coordinate_at(area(), 9, 10).is_none());
        assert!(view.coordinate_at(area(), 20, 46).is_none());
    }

    #[test]
    fn zoomed_window_stays_on_globe() {
        let mut view = MapView::world();
        view.zoom_in(Coordinate::new(89.0, 179.0));
        let (x, y) = view.bounds();
        assert!(x[1] <= 180.0 && y[1] <= 90.0);
        assert_eq!(view.zoom(), 2.0);
        view.zoom_out();
        assert_eq!(view.bounds(), MapView::world().bounds());
    }
}
