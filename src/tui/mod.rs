//! Ratatui-based terminal UI.
//!
//! The TUI renders the day's KPI strip, a per-dimension breakdown, the daily
//! history and forecast charts, and a free-text question box, all driven by
//! the same pipeline as `pulse report`.

use std::io;
use std::time::Duration;

use chrono::NaiveDate;
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, Paragraph},
    Terminal,
};

use crate::app::pipeline::{run_dashboard, DashboardView};
use crate::cli::ReportArgs;
use crate::data::{DatasetCache, LoadOutcome, SalesStore};
use crate::domain::{DashboardConfig, SalesDataset};
use crate::error::AppError;
use crate::forecast::ForecastError;
use crate::report::{format_currency, format_pct};

mod plotters_chart;

use plotters_chart::TrendChart;

/// Start the TUI.
pub fn run(args: ReportArgs) -> Result<(), AppError> {
    // Resolve the database path before taking over the terminal; the picker
    // is a plain stdin prompt.
    let db_path = crate::app::resolve_db_path(&args.db, true)?;
    let config = crate::app::dashboard_config(&args, db_path);

    let _guard = TerminalGuard::new()?;

    let backend = CrosstermBackend::new(io::stdout());
    let mut terminal = Terminal::new(backend)
        .map_err(|e| AppError::new(4, format!("Failed to initialize terminal: {e}")))?;

    let mut app = App::new(config);
    app.reload();
    app.event_loop(&mut terminal)
}

/// Ensures the terminal is restored (raw mode, alternate screen) on exit.
struct TerminalGuard;

impl TerminalGuard {
    fn new() -> Result<Self, AppError> {
        enable_raw_mode().map_err(|e| AppError::new(4, format!("Failed to enable raw mode: {e}")))?;
        if let Err(e) = execute!(io::stdout(), EnterAlternateScreen) {
            let _ = disable_raw_mode();
            return Err(AppError::new(4, format!("Failed to enter alternate screen: {e}")));
        }
        Ok(Self)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Tab {
    Breakdown,
    History,
    Forecast,
}

impl Tab {
    fn next(self) -> Self {
        match self {
            Tab::Breakdown => Tab::History,
            Tab::History => Tab::Forecast,
            Tab::Forecast => Tab::Breakdown,
        }
    }

    fn title(self) -> &'static str {
        match self {
            Tab::Breakdown => "Breakdown",
            Tab::History => "History",
            Tab::Forecast => "Forecast",
        }
    }
}

struct App {
    config: DashboardConfig,
    store: SalesStore,
    cache: DatasetCache,
    dataset: Option<SalesDataset>,
    view: Option<DashboardView>,
    tab: Tab,
    query_input: String,
    editing_query: bool,
    last_answer: Option<String>,
    status: String,
}

impl App {
    fn new(config: DashboardConfig) -> Self {
        let store = SalesStore::open(&config.db_path);
        let cache = DatasetCache::new(config.cache_ttl);
        Self {
            config,
            store,
            cache,
            dataset: None,
            view: None,
            tab: Tab::Breakdown,
            query_input: String::new(),
            editing_query: false,
            last_answer: None,
            status: "Loading sales data...".to_string(),
        }
    }

    /// Load through the TTL cache and rebuild the view.
    fn reload(&mut self) {
        let outcome = {
            let store = &self.store;
            self.cache.get_or_refresh(|| store.load()).map(|o| o.clone())
        };

        match outcome {
            Ok(LoadOutcome::Loaded(dataset)) => {
                self.status = format!(
                    "Loaded {} record(s) from {}",
                    dataset.stats.n_records,
                    self.store.path().display()
                );
                self.dataset = Some(dataset);
            }
            Ok(LoadOutcome::Empty) => {
                self.dataset = None;
                self.view = None;
                self.status =
                    "The sales table has no rows. Run `pulse seed` to add demo data.".to_string();
            }
            Err(err) => {
                self.dataset = None;
                self.view = None;
                self.status = err.to_string();
            }
        }

        self.recompute();
    }

    fn recompute(&mut self) {
        self.view = self
            .dataset
            .as_ref()
            .map(|ds| run_dashboard(&self.config, ds));
    }

    /// Move the selected day by `delta` days, clamped to the observed range.
    fn step_date(&mut self, delta: i64) {
        let Some(dataset) = &self.dataset else {
            return;
        };
        let current = dataset.resolve_date(self.config.target_date);
        let requested = current + chrono::Duration::days(delta);
        let resolved = dataset.resolve_date(Some(requested));
        self.config.target_date = Some(resolved);
        self.recompute();
        self.status = format!("Day: {resolved}");
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
                .map_err(|e| AppError::new(4, format!("Event poll error: {e}")))? {
                // A stale cache refreshes on the next tick, matching the
                // one-shot commands' "fresh within the TTL" behavior.
                if self.cache.is_stale() && self.dataset.is_some() {
                    self.reload();
                    needs_redraw = true;
                }
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
                Event::Resize(_, _) => {
                    needs_redraw = true;
                }
                _ => {}
            }
        }
        Ok(())
    }

    /// Returns `true` when the app should exit.
    fn handle_key(&mut self, code: KeyCode) -> bool {
        if self.editing_query {
            self.handle_query_edit(code);
            return false;
        }

        match code {
            KeyCode::Char('q') => return true,
            KeyCode::Left => self.step_date(-1),
            KeyCode::Right => self.step_date(1),
            KeyCode::Tab => self.tab = self.tab.next(),
            KeyCode::Char('1') => self.tab = Tab::Breakdown,
            KeyCode::Char('2') => self.tab = Tab::History,
            KeyCode::Char('3') => self.tab = Tab::Forecast,
            KeyCode::Char('b') => {
                self.config.dimension = self.config.dimension.next();
                self.recompute();
                self.status = format!("Breakdown by {}", self.config.dimension.display_name());
            }
            KeyCode::Char('r') => {
                self.cache.force_refresh();
                self.reload();
            }
            KeyCode::Enter => {
                self.editing_query = true;
                self.status = "Type a question. Enter to ask, Esc to cancel.".to_string();
            }
            _ => {}
        }

        false
    }

    fn handle_query_edit(&mut self, code: KeyCode) {
        match code {
            KeyCode::Esc => {
                self.editing_query = false;
                self.status = "Question canceled.".to_string();
            }
            KeyCode::Enter => {
                self.editing_query = false;
                self.submit_query();
            }
            KeyCode::Backspace => {
                self.query_input.pop();
            }
            KeyCode::Char(c) => {
                self.query_input.push(c);
            }
            _ => {}
        }
    }

    fn submit_query(&mut self) {
        let question = self.query_input.trim().to_string();
        if question.is_empty() {
            self.status = "Empty question.".to_string();
            return;
        }
        match &self.dataset {
            Some(dataset) => {
                self.last_answer = Some(crate::query::answer(&question, dataset));
                self.status = format!("Asked: {question}");
            }
            None => {
                self.status = "No data loaded; cannot answer questions.".to_string();
            }
        }
    }

    fn draw(&mut self, frame: &mut ratatui::Frame<'_>) {
        let size = frame.area();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(5),
                Constraint::Min(0),
                Constraint::Length(4),
                Constraint::Length(3),
            ])
            .split(size);

        self.draw_header(frame, chunks[0]);
        self.draw_body(frame, chunks[1]);
        self.draw_query(frame, chunks[2]);
        self.draw_footer(frame, chunks[3]);
    }

    fn draw_header(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let mut lines: Vec<Line> = Vec::new();
        lines.push(Line::from(vec![
            Span::styled("pulse", Style::default().fg(Color::Cyan)),
            Span::raw(" — sales KPI dashboard"),
        ]));

        match &self.view {
            Some(view) => {
                let s = &view.summary;
                let average = s
                    .average
                    .map(format_currency)
                    .unwrap_or_else(|| "-".to_string());
                lines.push(Line::from(Span::styled(
                    format!(
                        "day: {} | total: {} | orders: {} | avg: {average} | growth: {}",
                        s.date,
                        format_currency(s.total),
                        s.order_count,
                        format_pct(s.growth_pct),
                    ),
                    Style::default().fg(Color::Gray),
                )));
            }
            None => {
                lines.push(Line::from(Span::styled(
                    "day: - | total: - | orders: - | avg: - | growth: -",
                    Style::default().fg(Color::Gray),
                )));
            }
        }

        if let Some(dataset) = &self.dataset {
            let age = self
                .cache
                .age()
                .map(|a| format!("{}s", a.as_secs()))
                .unwrap_or_else(|| "-".to_string());
            lines.push(Line::from(Span::styled(
                format!(
                    "data: {} record(s), {} .. {} | by: {} | cache age: {age}",
                    dataset.stats.n_records,
                    dataset.stats.min_date,
                    dataset.stats.max_date,
                    self.config.dimension.display_name(),
                ),
                Style::default().fg(Color::Gray),
            )));
        }

        let p = Paragraph::new(Text::from(lines)).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }

    fn draw_body(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let title = format!(
            "[1] Breakdown  [2] History  [3] Forecast — {}",
            self.tab.title()
        );
        let block = Block::default().title(title).borders(Borders::ALL);
        let inner = block.inner(area);
        frame.render_widget(block, area);
        frame.render_widget(Clear, inner);

        let Some(view) = &self.view else {
            let msg = Paragraph::new(self.status.as_str())
                .style(Style::default().fg(Color::Yellow));
            frame.render_widget(msg, inner);
            return;
        };

        match self.tab {
            Tab::Breakdown => self.draw_breakdown(frame, inner, view),
            Tab::History => self.draw_history(frame, inner, view),
            Tab::Forecast => self.draw_forecast(frame, inner, view),
        }
    }

    fn draw_breakdown(&self, frame: &mut ratatui::Frame<'_>, area: Rect, view: &DashboardView) {
        if view.day_is_empty() {
            let msg = Paragraph::new(format!("No sales found on {}.", view.as_of))
                .style(Style::default().fg(Color::Yellow));
            frame.render_widget(msg, area);
            return;
        }

        let max_total = view
            .breakdown
            .iter()
            .map(|(_, t)| *t)
            .fold(0.0_f64, f64::max);

        let mut lines: Vec<Line> = Vec::new();
        lines.push(Line::from(Span::styled(
            format!(
                "Sales by {} on {}",
                view.dimension.display_name(),
                view.as_of
            ),
            Style::default().add_modifier(Modifier::BOLD),
        )));
        for (name, total) in &view.breakdown {
            lines.push(Line::from(format!(
                "{:<14} {:>16}  {}",
                name,
                format_currency(*total),
                bar(*total, max_total, 30),
            )));
        }

        lines.push(Line::raw(""));
        lines.push(Line::from(Span::styled(
            "Top reps",
            Style::default().add_modifier(Modifier::BOLD),
        )));
        for (name, total) in &view.top_reps {
            lines.push(Line::from(format!(
                "{:<14} {:>16}",
                name,
                format_currency(*total)
            )));
        }

        lines.push(Line::raw(""));
        lines.push(Line::from(Span::styled(
            "Top products",
            Style::default().add_modifier(Modifier::BOLD),
        )));
        for (name, total) in &view.top_products {
            lines.push(Line::from(format!(
                "{:<14} {:>16}",
                name,
                format_currency(*total)
            )));
        }

        frame.render_widget(Paragraph::new(Text::from(lines)), area);
    }

    fn draw_history(&self, frame: &mut ratatui::Frame<'_>, area: Rect, view: &DashboardView) {
        let Some(origin) = view.history.first().map(|d| d.date) else {
            return;
        };
        let history = offset_series(origin, view.history.iter().map(|d| (d.date, d.total)));
        let (x_bounds, y_bounds) = series_bounds(&[&history]);

        let widget = TrendChart {
            history: &history,
            forecast: &[],
            x_bounds,
            y_bounds,
            x_label: "day",
            y_label: "sales (¥)".to_string(),
            fmt_x: fmt_axis_day,
            fmt_y: fmt_axis_amount,
        };
        frame.render_widget(widget, area);
    }

    fn draw_forecast(&self, frame: &mut ratatui::Frame<'_>, area: Rect, view: &DashboardView) {
        let (fit, points) = match &view.forecast {
            Ok(out) => out,
            Err(ForecastError::InsufficientHistory { have, need }) => {
                let msg = Paragraph::new(format!(
                    "Not enough history to forecast: {have} day(s) available, {need} required.\n\
                     Add more days of data (or `pulse seed --days {need}`)."
                ))
                .style(Style::default().fg(Color::Yellow));
                frame.render_widget(msg, area);
                return;
            }
            Err(err) => {
                let msg = Paragraph::new(err.to_string()).style(Style::default().fg(Color::Red));
                frame.render_widget(msg, area);
                return;
            }
        };

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(1), Constraint::Min(0)])
            .split(area);

        let model = Paragraph::new(format!(
            "daily total = {:.2} + {:.2} × day_index (over {} day(s))",
            fit.intercept, fit.slope, fit.n_days
        ))
        .style(Style::default().fg(Color::Gray));
        frame.render_widget(model, chunks[0]);

        let Some(origin) = view.history.first().map(|d| d.date) else {
            return;
        };
        let history = offset_series(origin, view.history.iter().map(|d| (d.date, d.total)));
        let forecast = offset_series(origin, points.iter().map(|p| (p.date, p.predicted_total)));
        let (x_bounds, y_bounds) = series_bounds(&[&history, &forecast]);

        let widget = TrendChart {
            history: &history,
            forecast: &forecast,
            x_bounds,
            y_bounds,
            x_label: "day",
            y_label: "sales (¥)".to_string(),
            fmt_x: fmt_axis_day,
            fmt_y: fmt_axis_amount,
        };
        frame.render_widget(widget, chunks[1]);
    }

    fn draw_query(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let input_style = if self.editing_query {
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::Gray)
        };
        let cursor = if self.editing_query { "_" } else { "" };

        let mut lines = vec![Line::from(vec![
            Span::raw("Q: "),
            Span::styled(format!("{}{cursor}", self.query_input), input_style),
        ])];
        if let Some(answer) = &self.last_answer {
            lines.push(Line::from(vec![
                Span::raw("A: "),
                Span::styled(answer.as_str(), Style::default().fg(Color::Green)),
            ]));
        }

        let p = Paragraph::new(Text::from(lines))
            .block(Block::default().title("Ask").borders(Borders::ALL));
        frame.render_widget(p, area);
    }

    fn draw_footer(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let help = "←/→ day  Tab/1/2/3 view  b dimension  Enter ask  r reload  q quit";
        let line = Line::from(vec![
            Span::styled(help, Style::default().fg(Color::Gray)),
            Span::raw(" | "),
            Span::styled(&self.status, Style::default().fg(Color::Yellow)),
        ]);
        let p = Paragraph::new(line).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }
}

/// Map dated values to `(day_offset, value)` pairs for plotting.
fn offset_series(
    origin: NaiveDate,
    values: impl Iterator<Item = (NaiveDate, f64)>,
) -> Vec<(f64, f64)> {
    values
        .map(|(date, v)| ((date - origin).num_days() as f64, v))
        .collect()
}

/// Padded chart bounds over one or more series.
fn series_bounds(series: &[&[(f64, f64)]]) -> ([f64; 2], [f64; 2]) {
    let (mut x_min, mut x_max) = (f64::INFINITY, f64::NEG_INFINITY);
    let (mut y_min, mut y_max) = (f64::INFINITY, f64::NEG_INFINITY);
    for s in series {
        for &(x, y) in *s {
            x_min = x_min.min(x);
            x_max = x_max.max(x);
            y_min = y_min.min(y);
            y_max = y_max.max(y);
        }
    }

    if !x_min.is_finite() || !x_max.is_finite() || x_max <= x_min {
        x_min = 0.0;
        x_max = 1.0;
    }
    if !y_min.is_finite() || !y_max.is_finite() || y_max <= y_min {
        y_min = 0.0;
        y_max = 1.0;
    }

    let pad = ((y_max - y_min).abs() * 0.05).max(1e-12);
    ([x_min, x_max], [y_min - pad, y_max + pad])
}

/// Proportional text bar for the breakdown table.
fn bar(value: f64, max: f64, width: usize) -> String {
    if max <= 0.0 || value <= 0.0 {
        return String::new();
    }
    let n = ((value / max) * width as f64).round() as usize;
    "█".repeat(n.clamp(1, width))
}

fn fmt_axis_day(v: f64) -> String {
    format!("{v:.0}")
}

fn fmt_axis_amount(v: f64) -> String {
    if v.abs() >= 1000.0 {
        format!("{:.1}k", v / 1000.0)
    } else {
        format!("{v:.0}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offset_series_keeps_calendar_spacing() {
        let origin: NaiveDate = "2024-01-01".parse().unwrap();
        let series = offset_series(
            origin,
            vec![
                ("2024-01-01".parse().unwrap(), 10.0),
                ("2024-01-02".parse().unwrap(), 20.0),
                ("2024-01-05".parse().unwrap(), 30.0),
            ]
            .into_iter(),
        );
        assert_eq!(series, vec![(0.0, 10.0), (1.0, 20.0), (4.0, 30.0)]);
    }

    #[test]
    fn bounds_are_padded_and_never_degenerate() {
        let ([x0, x1], [y0, y1]) = series_bounds(&[&[(0.0, 5.0), (3.0, 10.0)]]);
        assert_eq!([x0, x1], [0.0, 3.0]);
        assert!(y0 < 5.0 && y1 > 10.0);

        let (_, [y0, y1]) = series_bounds(&[&[]]);
        assert!(y1 > y0);
    }

    #[test]
    fn bar_scales_with_value() {
        assert_eq!(bar(0.0, 100.0, 10), "");
        assert_eq!(bar(100.0, 100.0, 10).chars().count(), 10);
        assert_eq!(bar(50.0, 100.0, 10).chars().count(), 5);
        assert_eq!(bar(1.0, 100.0, 10).chars().count(), 1);
    }
}
