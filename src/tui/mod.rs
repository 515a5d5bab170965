//! Ratatui-based terminal UI.
//!
//! The TUI is the prediction form: a field list on the left, a clickable world
//! map on the right, the predicted price under the form and a price
//! sensitivity chart for the selected numeric field.

use std::io;
use std::path::PathBuf;
use std::time::Duration;

use crossterm::{
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind, MouseButton, MouseEvent,
        MouseEventKind,
    },
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Terminal,
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap},
};
use tracing::{info, warn};

use crate::app::pipeline::{Engine, PredictionOutcome};
use crate::debug::{DebugContext, write_debug_snapshot};
use crate::domain::{Coordinate, Field, HouseInputs, SessionState, WidgetKind};
use crate::error::AppError;
use crate::report::{format_aligned_row, format_prediction, format_price};

mod map;
mod plotters_chart;

pub use map::{MapView, MapWidget};
use plotters_chart::PriceCurveChart;

/// Index of the "Predict" button in the form list (after the fields).
const PREDICT_ROW: usize = Field::FORM.len();
const CURVE_POINTS: usize = 60;

/// Start the TUI.
pub fn run(engine: &Engine, start: Coordinate, debug_dir: PathBuf) -> Result<(), AppError> {
    let _guard = TerminalGuard::new()?;

    let backend = CrosstermBackend::new(io::stdout());
    let mut terminal = Terminal::new(backend)
        .map_err(|e| AppError::new(4, format!("Failed to initialize terminal: {e}")))?;

    let mut app = App::new(engine, start, debug_dir);
    app.event_loop(&mut terminal)
}

/// Ensures the terminal is restored (raw mode, alternate screen, mouse) on exit.
struct TerminalGuard;

impl TerminalGuard {
    fn new() -> Result<Self, AppError> {
        enable_raw_mode().map_err(|e| AppError::new(4, format!("Failed to enable raw mode: {e}")))?;
        if let Err(e) = execute!(io::stdout(), EnterAlternateScreen, EnableMouseCapture) {
            let _ = disable_raw_mode();
            return Err(AppError::new(4, format!("Failed to enter alternate screen: {e}")));
        }
        Ok(Self)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), DisableMouseCapture, LeaveAlternateScreen);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Focus {
    Form,
    Map,
}

struct App<'e> {
    engine: &'e Engine,
    inputs: HouseInputs,
    session: SessionState,
    start: Coordinate,
    selected: usize,
    focus: Focus,
    /// Text buffer while a number field is being typed into.
    editing: Option<String>,
    outcome: Option<PredictionOutcome>,
    /// Inputs or location changed since `outcome` was computed.
    stale: bool,
    error: Option<String>,
    status: String,
    map: MapView,
    /// Canvas area of the map from the last draw (mouse hit-testing).
    map_area: Rect,
    show_row: bool,
    curve: Vec<(f64, f64)>,
    debug_dir: PathBuf,
}

impl<'e> App<'e> {
    fn new(engine: &'e Engine, start: Coordinate, debug_dir: PathBuf) -> Self {
        let session = SessionState::new(start);
        let mut map = MapView::world();
        map.zoom_in(session.coordinate());

        let mut app = Self {
            engine,
            inputs: HouseInputs::default(),
            session,
            start,
            selected: 0,
            focus: Focus::Form,
            editing: None,
            outcome: None,
            stale: false,
            error: None,
            status: "Fill in the form, pick a location, then press p to predict.".to_string(),
            map,
            map_area: Rect::default(),
            show_row: false,
            curve: Vec::new(),
            debug_dir,
        };
        app.refresh_curve();
        app
    }

    fn event_loop<B: ratatui::backend::Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<(), AppError> {
        let mut needs_redraw = true;
        loop {
            if needs_redraw {
                terminal
                    .draw(|f| self.draw(f))
                    .map_err(|e| AppError::new(4, format!("Terminal draw error: {e}")))?;
                needs_redraw = false;
            }

            if !event::poll(Duration::from_millis(100))
                .map_err(|e| AppError::new(4, format!("Event poll error: {e}")))?
            {
                continue;
            }

            match event::read().map_err(|e| AppError::new(4, format!("Event read error: {e}")))? {
                Event::Key(key) => {
                    if key.kind != KeyEventKind::Press {
                        continue;
                    }
                    if self.handle_key(key.code) {
                        break;
                    }
                    needs_redraw = true;
                }
                Event::Mouse(mouse) => {
                    needs_redraw = self.handle_mouse(mouse);
                }
                Event::Resize(_, _) => {
                    needs_redraw = true;
                }
                _ => {}
            }
        }
        Ok(())
    }

    /// Returns `true` when the app should quit.
    fn handle_key(&mut self, code: KeyCode) -> bool {
        if self.editing.is_some() {
            self.handle_number_edit(code);
            return false;
        }

        match code {
            KeyCode::Char('q') => return true,
            KeyCode::Esc => {
                if self.show_row {
                    self.show_row = false;
                } else {
                    return true;
                }
            }
            KeyCode::Tab | KeyCode::BackTab => {
                self.focus = match self.focus {
                    Focus::Form => Focus::Map,
                    Focus::Map => Focus::Form,
                };
                self.status = match self.focus {
                    Focus::Map => "Map: arrows move the marker, +/- zoom, click to place.".to_string(),
                    Focus::Form => "Form: arrows select/adjust, Enter to edit.".to_string(),
                };
            }
            KeyCode::Char('p') => self.predict(),
            KeyCode::Char('i') => self.show_row = !self.show_row,
            KeyCode::Char('d') => self.write_debug(),
            KeyCode::Char('r') => self.reset(),
            KeyCode::Char('+') | KeyCode::Char('=') => {
                self.map.zoom_in(self.session.coordinate());
                self.status = format!("zoom: {}x", self.map.zoom());
            }
            KeyCode::Char('-') => {
                self.map.zoom_out();
                self.status = format!("zoom: {}x", self.map.zoom());
            }
            _ => match self.focus {
                Focus::Form => self.handle_form_key(code),
                Focus::Map => self.handle_map_key(code),
            },
        }

        false
    }

    fn handle_form_key(&mut self, code: KeyCode) {
        match code {
            KeyCode::Up => {
                self.selected = self.selected.saturating_sub(1);
                self.refresh_curve();
            }
            KeyCode::Down => {
                if self.selected < PREDICT_ROW {
                    self.selected += 1;
                }
                self.refresh_curve();
            }
            KeyCode::Left => self.adjust(-1),
            KeyCode::Right => self.adjust(1),
            KeyCode::Enter => match self.selected_field() {
                None => self.predict(),
                Some(field) if field.widget() == WidgetKind::Number => {
                    self.editing = Some(self.inputs.display_value(field));
                    self.status = format!("Editing {}. Enter to apply, Esc to cancel.", field.label());
                }
                Some(_) => self.adjust(1),
            },
            _ => {}
        }
    }

    fn handle_map_key(&mut self, code: KeyCode) {
        let (dx, dy) = if self.map_area.width > 1 && self.map_area.height > 1 {
            self.map.cell_size(self.map_area)
        } else {
            (1.0, 1.0)
        };
        let c = self.session.coordinate();
        let moved = match code {
            KeyCode::Up => Coordinate::new(c.latitude + dy, c.longitude),
            KeyCode::Down => Coordinate::new(c.latitude - dy, c.longitude),
            KeyCode::Left => Coordinate::new(c.latitude, c.longitude - dx),
            KeyCode::Right => Coordinate::new(c.latitude, c.longitude + dx),
            KeyCode::Enter => {
                self.predict();
                return;
            }
            _ => return,
        };
        self.select_location(moved);
    }

    fn handle_number_edit(&mut self, code: KeyCode) {
        let Some(buffer) = self.editing.as_mut() else {
            return;
        };
        match code {
            KeyCode::Esc => {
                self.editing = None;
                self.status = "Edit canceled.".to_string();
            }
            KeyCode::Backspace => {
                buffer.pop();
            }
            KeyCode::Char(c) if c.is_ascii_digit() => buffer.push(c),
            KeyCode::Enter => {
                let text = buffer.trim().to_string();
                self.editing = None;
                let Some(field) = self.selected_field() else {
                    return;
                };
                match text.parse::<f64>() {
                    Ok(v) if v.is_finite() => {
                        self.inputs.set_numeric(field, v);
                        let applied = self.inputs.display_value(field);
                        self.status = format!("{} = {applied}", field.label());
                        self.inputs_changed();
                    }
                    _ => self.status = format!("'{text}' is not a number."),
                }
            }
            _ => {}
        }
    }

    fn handle_mouse(&mut self, mouse: MouseEvent) -> bool {
        if !matches!(mouse.kind, MouseEventKind::Down(MouseButton::Left)) {
            return false;
        }
        let Some(c) = self.map.coordinate_at(self.map_area, mouse.column, mouse.row) else {
            return false;
        };
        self.focus = Focus::Map;
        self.select_location(c);
        true
    }

    fn selected_field(&self) -> Option<Field> {
        Field::FORM.get(self.selected).copied()
    }

    fn adjust(&mut self, delta: i32) {
        let Some(field) = self.selected_field() else {
            return;
        };
        self.inputs.step(field, delta);
        self.status = format!("{}: {}", field.label(), self.inputs.display_value(field));
        self.inputs_changed();
    }

    fn select_location(&mut self, c: Coordinate) {
        self.session.select(c);
        let c = self.session.coordinate();
        self.map.follow(c);
        self.status = format!("Location: {:.4}, {:.4}", c.latitude, c.longitude);
        self.inputs_changed();
    }

    fn inputs_changed(&mut self) {
        if self.outcome.is_some() {
            self.stale = true;
        }
        self.refresh_curve();
    }

    fn refresh_curve(&mut self) {
        self.curve = match self.selected_field() {
            Some(field) if field.is_numeric() => {
                self.engine
                    .price_curve(&self.inputs, &self.session, field, CURVE_POINTS)
            }
            _ => Vec::new(),
        };
    }

    fn predict(&mut self) {
        match self.engine.predict_once(&self.inputs, &self.session) {
            Ok(outcome) => {
                info!(price = outcome.price, "prediction shown");
                self.status = format_prediction(outcome.price);
                self.outcome = Some(outcome);
                self.error = None;
                self.stale = false;
            }
            Err(err) => {
                warn!(error = %err, "prediction failed");
                self.status = "Prediction failed.".to_string();
                self.error = Some(err.message().to_string());
                self.outcome = None;
                self.stale = false;
            }
        }
    }

    fn reset(&mut self) {
        self.inputs = HouseInputs::default();
        self.session = SessionState::new(self.start);
        self.map.follow(self.session.coordinate());
        self.outcome = None;
        self.error = None;
        self.stale = false;
        self.refresh_curve();
        self.status = "Form reset to defaults.".to_string();
    }

    fn write_debug(&mut self) {
        let ctx = DebugContext {
            model_id: self.engine.model_id(),
            inputs: &self.inputs,
            session: &self.session,
            outcome: self.outcome.as_ref(),
            error: self.error.as_deref(),
        };
        self.status = match write_debug_snapshot(&self.debug_dir, &ctx) {
            Ok(path) => format!("Wrote debug snapshot: {}", path.display()),
            Err(err) => format!("Debug write failed: {err}"),
        };
    }

    fn draw(&mut self, frame: &mut ratatui::Frame<'_>) {
        let size = frame.area();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(4), Constraint::Min(0), Constraint::Length(3)])
            .split(size);

        self.draw_header(frame, chunks[0]);
        self.draw_body(frame, chunks[1]);
        self.draw_footer(frame, chunks[2]);

        if self.show_row {
            self.draw_row_popup(frame, size);
        }
    }

    fn draw_header(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let c = self.session.coordinate();
        let lines = vec![
            Line::from(vec![
                Span::styled("hpp", Style::default().fg(Color::Cyan)),
                Span::raw(" - house price predictor"),
            ]),
            Line::from(Span::styled(
                format!(
                    "model: {} | features: {} | location: {:.4}, {:.4} | zoom: {}x",
                    self.engine.model_id(),
                    self.engine.schema().len(),
                    c.latitude,
                    c.longitude,
                    self.map.zoom(),
                ),
                Style::default().fg(Color::Gray),
            )),
        ];
        let p = Paragraph::new(Text::from(lines)).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }

    fn draw_body(&mut self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(42), Constraint::Percentage(58)])
            .split(area);

        let left = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(PREDICT_ROW as u16 + 3), Constraint::Min(0)])
            .split(columns[0]);
        let right = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
            .split(columns[1]);

        self.draw_form(frame, left[0]);
        self.draw_result(frame, left[1]);
        self.draw_map(frame, right[0]);
        self.draw_chart(frame, right[1]);
    }

    fn draw_form(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let mut items: Vec<ListItem> = Field::FORM
            .iter()
            .enumerate()
            .map(|(i, field)| {
                let value = match (&self.editing, i == self.selected) {
                    (Some(buffer), true) => format!("{buffer}_"),
                    _ => match field.widget() {
                        WidgetKind::Slider | WidgetKind::Choice => {
                            format!("◀ {} ▶", self.inputs.display_value(*field))
                        }
                        _ => self.inputs.display_value(*field),
                    },
                };
                ListItem::new(format!("{:<33} {value}", field.label()))
            })
            .collect();
        items.push(ListItem::new(Span::styled(
            "[ Predict ]",
            Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
        )));

        let border = if self.focus == Focus::Form {
            Style::default().fg(Color::Cyan)
        } else {
            Style::default()
        };
        let list = List::new(items)
            .block(Block::default().title("House").borders(Borders::ALL).border_style(border))
            .highlight_style(Style::default().fg(Color::Black).bg(Color::White))
            .highlight_symbol("» ");

        let mut state = ListState::default();
        state.select(Some(self.selected));
        frame.render_stateful_widget(list, area, &mut state);
    }

    fn draw_result(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let mut lines: Vec<Line> = Vec::new();

        if let Some(error) = &self.error {
            lines.push(Line::from(Span::styled(
                error.clone(),
                Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
            )));
        } else if let Some(outcome) = &self.outcome {
            lines.push(Line::from(Span::styled(
                format_prediction(outcome.price),
                Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
            )));
            if self.stale {
                lines.push(Line::from(Span::styled(
                    "(inputs changed; press p to update)",
                    Style::default().fg(Color::Gray),
                )));
            }
            for warning in outcome.reconciled.report.warnings() {
                lines.push(Line::from(Span::styled(
                    format!("warning: {warning}"),
                    Style::default().fg(Color::Yellow),
                )));
            }
            lines.push(Line::from(Span::styled(
                "i: show model input",
                Style::default().fg(Color::Gray),
            )));
        } else {
            lines.push(Line::from("Press p (or Enter on Predict) to estimate the price."));
        }

        let p = Paragraph::new(Text::from(lines))
            .wrap(Wrap { trim: true })
            .block(Block::default().title("Result").borders(Borders::ALL));
        frame.render_widget(p, area);
    }

    fn draw_map(&mut self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        self.map_area = MapWidget::inner(area);
        let c = self.session.coordinate();
        let widget = MapWidget {
            view: &self.map,
            marker: c,
            focused: self.focus == Focus::Map,
            title: format!("Location {:.4}, {:.4}", c.latitude, c.longitude),
        };
        frame.render_widget(widget, area);
    }

    fn draw_chart(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let field = self.selected_field().filter(|f| f.is_numeric());
        let title = match field {
            Some(f) => format!("Price vs {}", f.label()),
            None => "Price sensitivity".to_string(),
        };
        let block = Block::default().title(title).borders(Borders::ALL);
        let inner = block.inner(area);
        frame.render_widget(block, area);
        frame.render_widget(Clear, inner);

        let Some(field) = field else {
            let msg = Paragraph::new("Select a numeric field to see how it moves the price.")
                .style(Style::default().fg(Color::Gray));
            frame.render_widget(msg, inner);
            return;
        };

        let current = self.inputs.numeric(field).and_then(|x| {
            self.curve
                .iter()
                .min_by(|a, b| (a.0 - x).abs().total_cmp(&(b.0 - x).abs()))
                .map(|&(_, y)| (x, y))
        });
        let Some((x_bounds, y_bounds)) = PriceCurveChart::bounds_for(&self.curve, current) else {
            let msg = Paragraph::new("No prices available for this field.").style(Style::default().fg(Color::Yellow));
            frame.render_widget(msg, inner);
            return;
        };

        let widget = PriceCurveChart {
            curve: &self.curve,
            current,
            x_bounds,
            y_bounds,
            x_label: field.as_str(),
            fmt_x: fmt_axis_x,
            fmt_y: fmt_axis_price,
        };
        frame.render_widget(widget, inner);
    }

    fn draw_row_popup(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let body = match &self.outcome {
            Some(outcome) => format_aligned_row(&outcome.reconciled.row),
            None => "No prediction yet.".to_string(),
        };
        let rect = centered(area, 60, 80);
        frame.render_widget(Clear, rect);
        let p = Paragraph::new(body).block(
            Block::default()
                .title("Model input (schema order) - Esc/i to close")
                .borders(Borders::ALL),
        );
        frame.render_widget(p, rect);
    }

    fn draw_footer(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let help = "↑/↓ select  ←/→ adjust  Enter edit  Tab map  +/- zoom  p predict  i input  d debug  r reset  q quit";
        let line = Line::from(vec![
            Span::styled(help, Style::default().fg(Color::Gray)),
            Span::raw(" | "),
            Span::styled(&self.status, Style::default().fg(Color::Yellow)),
        ]);
        let p = Paragraph::new(line).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }
}

fn centered(area: Rect, percent_x: u16, percent_y: u16) -> Rect {
    let width = area.width * percent_x / 100;
    let height = area.height * percent_y / 100;
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}

fn fmt_axis_x(v: f64) -> String {
    format!("{v:.0}")
}

fn fmt_axis_price(v: f64) -> String {
    if v.abs() >= 1000.0 {
        format!("{:.0}k", v / 1000.0)
    } else {
        format_price(v)
    }
}
