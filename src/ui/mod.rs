mod components;

use std::sync::OnceLock;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    symbols,
    text::{Line, Span},
    widgets::{Axis, Block, Borders, Chart, Clear, Dataset, GraphType, Paragraph, Wrap},
    Frame,
};

use crate::app::{App, Field, Popup};
use crate::report::{self, Report};
use crate::theme::Theme;

// Resolved once at startup from the config file
static THEME: OnceLock<Theme> = OnceLock::new();

/// Install the theme; later calls are ignored
pub fn init_theme(theme: Theme) {
    if THEME.set(theme).is_err() {
        tracing::debug!("Theme already initialised");
    }
}

fn theme() -> &'static Theme {
    THEME.get_or_init(Theme::default)
}

// Helper functions to get theme colors
fn accent() -> Color { theme().accent }
fn success() -> Color { theme().success }
fn warning() -> Color { theme().warning }
fn danger() -> Color { theme().danger }
fn text() -> Color { theme().text }
fn text_dim() -> Color { theme().text_dim }
fn inactive() -> Color { theme().inactive }
fn header() -> Color { theme().header }
fn curve() -> Color { theme().curve }

pub fn draw(f: &mut Frame, app: &App) {
    let area = f.area();

    // Shrink the form row on short terminals so the chart keeps some room
    let form_height = if area.height < 24 { 7 } else { 9 };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),           // Title
            Constraint::Length(1),           // Info line
            Constraint::Length(form_height), // Form + result
            Constraint::Min(6),              // Chart
            Constraint::Length(1),           // Footer
        ])
        .split(area);

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(42), Constraint::Percentage(58)])
        .split(chunks[2]);

    draw_title(f, chunks[0]);
    draw_info_line(f, app, chunks[1]);
    draw_form_box(f, app, columns[0]);
    draw_result_box(f, app, columns[1]);
    draw_chart_box(f, app, chunks[3]);
    draw_footer(f, app, chunks[4]);

    if app.popup == Popup::Help {
        draw_help_popup(f);
    }
}

fn draw_title(f: &mut Frame, area: Rect) {
    let title = Paragraph::new(Line::from(Span::styled(
        report::TITLE,
        Style::default().fg(header()).add_modifier(Modifier::BOLD),
    )))
    .alignment(Alignment::Center);
    f.render_widget(title, area);
}

fn draw_info_line(f: &mut Frame, app: &App, area: Rect) {
    // Priority: status message > input error > calculation details
    let line = if let Some(ref status) = app.status_message {
        Line::from(Span::styled(status.as_str(), Style::default().fg(warning())))
    } else if let Some(ref err) = app.input_error {
        Line::from(vec![
            Span::styled("✗ ", Style::default().fg(danger())),
            Span::styled(err.as_str(), Style::default().fg(danger())),
        ])
    } else {
        let est = &app.estimate;
        Line::from(vec![
            Span::styled(format!("Z = {}", est.z_score), Style::default().fg(text_dim())),
            Span::styled(" │ ", Style::default().fg(inactive())),
            Span::styled(
                format!("n₀ = {:.2} (unbounded bill)", est.infinite_population),
                Style::default().fg(text_dim()),
            ),
            Span::styled(" │ ", Style::default().fg(inactive())),
            Span::styled(
                format!("corrected n = {:.2}", est.corrected),
                Style::default().fg(text_dim()),
            ),
        ])
    };

    let info = Paragraph::new(line).alignment(Alignment::Center);
    f.render_widget(info, area);
}

fn draw_form_box(f: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .title(Span::styled(" Inputs ", Style::default().fg(accent()).add_modifier(Modifier::BOLD)))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(accent()));

    let population_focused = app.field == Field::Population;
    let cursor = if population_focused { "_" } else { "" };
    let population_color = if app.input_error.is_some() { danger() } else { text() };

    let mut lines = vec![
        components::field_line(
            "Records",
            population_focused,
            header(),
            accent(),
            vec![Span::styled(
                format!("{}{}", app.population_input, cursor),
                Style::default().fg(population_color).add_modifier(Modifier::BOLD),
            )],
        ),
        components::field_line(
            "Confidence",
            app.field == Field::Confidence,
            header(),
            accent(),
            components::confidence_choices(app.confidence, accent(), text_dim()),
        ),
        components::field_line(
            "Margin",
            app.field == Field::Margin,
            header(),
            accent(),
            components::margin_slider(app.margin, accent(), inactive(), text()),
        ),
    ];

    // Spacer rows only when there is room for them
    if area.height >= 9 {
        lines.insert(1, Line::from(""));
        lines.insert(3, Line::from(""));
    }

    let form = Paragraph::new(lines).block(block);
    f.render_widget(form, area);
}

fn draw_result_box(f: &mut Frame, app: &App, area: Rect) {
    let border_color = if app.input_error.is_some() { inactive() } else { success() };
    let block = Block::default()
        .title(Span::styled(" Results ", Style::default().fg(border_color).add_modifier(Modifier::BOLD)))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color));

    let report = Report::new(&app.estimate);

    let mut lines = vec![
        Line::from(vec![
            Span::styled("Check at least ", Style::default().fg(text())),
            Span::styled(report.headline(), Style::default().fg(success()).add_modifier(Modifier::BOLD)),
            Span::styled(format!("  ({})", report.coverage()), Style::default().fg(text_dim())),
        ]),
        Line::from(Span::styled(report.to_string(), Style::default().fg(text()))),
    ];
    lines.extend(
        report::NOTES
            .iter()
            .map(|note| Line::from(Span::styled(format!("• {}", note), Style::default().fg(text_dim())))),
    );

    let result = Paragraph::new(lines).block(block).wrap(Wrap { trim: true });
    f.render_widget(result, area);
}

fn draw_chart_box(f: &mut Frame, app: &App, area: Rect) {
    let est = &app.estimate;
    let population = est.request.population.get() as f64;
    let x_max = population.max(2.0);
    let y_peak = app
        .chart_points
        .iter()
        .map(|(_, y)| *y)
        .fold(est.sample_size as f64, f64::max);
    let y_max = (y_peak * 1.1).ceil().max(1.0);

    let headline = [(population, est.sample_size as f64)];

    let datasets = vec![
        Dataset::default()
            .name("Sample size needed")
            .marker(symbols::Marker::Braille)
            .graph_type(GraphType::Line)
            .style(Style::default().fg(curve()))
            .data(&app.chart_points),
        Dataset::default()
            .name(format!("Your bill ({})", est.request.population))
            .marker(symbols::Marker::Dot)
            .graph_type(GraphType::Scatter)
            .style(Style::default().fg(success()).add_modifier(Modifier::BOLD))
            .data(&headline),
    ];

    let axis_style = Style::default().fg(text_dim());
    let x_labels = vec![
        Span::styled("1", axis_style),
        Span::styled(format!("{:.0}", (1.0 + x_max) / 2.0), axis_style),
        Span::styled(format!("{:.0}", x_max), axis_style),
    ];
    let y_labels = vec![
        Span::styled("0", axis_style),
        Span::styled(format!("{:.0}", y_max / 2.0), axis_style),
        Span::styled(format!("{:.0}", y_max), axis_style),
    ];

    let chart = Chart::new(datasets)
        .block(
            Block::default()
                .title(Span::styled(" Sample Size vs. Bill Size ", Style::default().fg(header())))
                .borders(Borders::ALL)
                .border_style(Style::default().fg(inactive())),
        )
        .x_axis(
            Axis::default()
                .title(Span::styled("Total Records on Bill", axis_style))
                .style(Style::default().fg(inactive()))
                .bounds([1.0, x_max])
                .labels(x_labels),
        )
        .y_axis(
            Axis::default()
                .title(Span::styled("Sample Size Needed", axis_style))
                .style(Style::default().fg(inactive()))
                .bounds([0.0, y_max])
                .labels(y_labels),
        );

    f.render_widget(chart, area);
}

fn draw_footer(f: &mut Frame, app: &App, area: Rect) {
    let hints: Vec<(&str, &str)> = match app.field {
        Field::Population => vec![
            ("0-9", "Type"),
            ("↑↓", "±1"),
            ("PgUp/PgDn", "±100"),
            ("Tab", "Next"),
            ("h", "Help"),
            ("q", "Quit"),
        ],
        Field::Confidence => vec![
            ("←→", "Level"),
            ("Tab", "Next"),
            ("h", "Help"),
            ("q", "Quit"),
        ],
        Field::Margin => vec![
            ("←→", "Slide"),
            ("Tab", "Next"),
            ("h", "Help"),
            ("q", "Quit"),
        ],
    };

    // Responsive: show fewer hints on narrow terminals
    let max_hints = if area.width < 60 { 3 } else { hints.len() };
    let footer = Paragraph::new(Line::from(components::key_hints(&hints, max_hints, accent(), text_dim())))
        .alignment(Alignment::Center);

    f.render_widget(footer, area);
}

fn draw_help_popup(f: &mut Frame) {
    let area = f.area();
    let popup_area = centered_rect(
        if area.width < 80 { 95 } else { 60 },
        if area.height < 30 { 95 } else { 70 },
        area,
    );

    f.render_widget(Clear, popup_area);

    let section = |title: &'static str| {
        Line::from(Span::styled(title, Style::default().fg(header()).add_modifier(Modifier::BOLD)))
    };
    let key = |k: &'static str, desc: &'static str| {
        Line::from(vec![
            Span::styled(format!("  {:<12}", k), Style::default().fg(accent())),
            Span::raw(desc),
        ])
    };

    let help_text = vec![
        section("═══ Navigation ═══"),
        key("Tab", "Next field (Records → Confidence → Margin)"),
        key("Shift-Tab", "Previous field"),
        Line::from(""),
        section("═══ Records ═══"),
        key("0-9", "Type the number of records on the bill"),
        key("Backspace", "Delete a digit"),
        key("↑/↓ j/k", "Add or remove one record"),
        key("PgUp/PgDn", "Add or remove 100 records"),
        Line::from(""),
        section("═══ Confidence & Margin ═══"),
        key("←/→ ↑/↓", "Change level or move the slider"),
        Line::from(""),
        section("═══ How it works ═══"),
        Line::from(Span::styled(
            "  n₀ = Z² · p(1 − p) / E²  with p = 0.5",
            Style::default().fg(text()),
        )),
        Line::from(Span::styled(
            "  n  = n₀ / (1 + (n₀ − 1) / N), rounded up",
            Style::default().fg(text()),
        )),
        Line::from(""),
        section("═══ One-shot output ═══"),
        key("--report", "Print the result sentence"),
        key("--json", "Print the estimate as JSON"),
        key("--curve", "Stream the curve as JSON lines"),
        Line::from(""),
        Line::from(vec![
            Span::styled("  Press ", Style::default().fg(text_dim())),
            Span::styled("h", Style::default().fg(accent())),
            Span::styled("/", Style::default().fg(text_dim())),
            Span::styled("?", Style::default().fg(accent())),
            Span::styled("/", Style::default().fg(text_dim())),
            Span::styled("Esc", Style::default().fg(accent())),
            Span::styled(" to close", Style::default().fg(text_dim())),
        ]),
    ];

    let help = Paragraph::new(help_text)
        .block(
            Block::default()
                .title(Span::styled(" billsample Help ", Style::default().fg(accent())))
                .borders(Borders::ALL)
                .border_style(Style::default().fg(accent())),
        )
        .wrap(Wrap { trim: false });

    f.render_widget(help, popup_area);
}

fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use ratatui::{backend::TestBackend, Terminal};

    fn render(app: &App, width: u16, height: u16) -> Vec<String> {
        let mut terminal = Terminal::new(TestBackend::new(width, height)).unwrap();
        terminal.draw(|f| draw(f, app)).unwrap();

        let buffer = terminal.backend().buffer();
        buffer
            .content
            .chunks(width as usize)
            .map(|row| row.iter().map(|cell| cell.symbol()).collect())
            .collect()
    }

    #[test]
    fn test_headline_is_rendered() {
        let app = App::new(&AppConfig::default());
        let screen = render(&app, 160, 40).join("\n");

        assert!(screen.contains(report::TITLE));
        assert!(screen.contains("169 out of 300 records"));
        assert!(screen.contains("Sample Size vs. Bill Size"));
    }

    #[test]
    fn test_small_terminal_does_not_panic() {
        let app = App::new(&AppConfig::default());
        let _ = render(&app, 40, 12);
    }

    #[test]
    fn test_help_popup_is_drawn() {
        let mut app = App::new(&AppConfig::default());
        app.popup = Popup::Help;
        let screen = render(&app, 120, 40).join("\n");

        assert!(screen.contains("billsample Help"));
    }

    #[test]
    fn test_input_error_replaces_details() {
        let mut app = App::new(&AppConfig::default());
        app.population_input.clear();
        let _ = app.recalculate();
        let screen = render(&app, 160, 40).join("\n");

        assert!(screen.contains("is not a whole number"));
        assert!(screen.contains("169 out of 300 records"));
    }
}
