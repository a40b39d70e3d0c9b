mod components;

use std::sync::OnceLock;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

use crate::app::{App, Field, Focus, Popup, FORM_ELEMENTS, SUBMIT_ELEMENT};
use crate::sequence::Target;
use crate::theme::Theme;

// Theme is fixed once the config has been read
static THEME: OnceLock<Theme> = OnceLock::new();

/// Install the theme used for drawing. Only the first call has an effect.
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
fn inactive() -> Color { theme().inactive }
fn success() -> Color { theme().success }
fn danger() -> Color { theme().danger }
fn text() -> Color { theme().text }
fn text_dim() -> Color { theme().text_dim }
fn header() -> Color { theme().header }

const TITLE: &str = "Compound Interest Calculator";
const SUBTITLE: &str = "See how your savings grow year by year";
const DESCRIPTION: &str = "Enter a starting balance, a deposit made every \
    capitalization period, the annual interest rate and how many years to \
    invest. The chart shows the balance at the end of each year.";

pub fn draw(f: &mut Frame, app: &App) {
    let area = f.area();

    // Nothing is shown until the container fades in
    if !app.is_visible(Target::Container) {
        return;
    }

    let container = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(inactive()));
    let inner = container.inner(area);
    f.render_widget(container, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),  // Title
            Constraint::Length(1),  // Subtitle
            Constraint::Length(3),  // Description
            Constraint::Min(8),     // Form + results
            Constraint::Length(1),  // Footer
        ])
        .split(inner);

    draw_headings(f, app, &chunks[..3]);

    // Side by side on wide terminals, stacked otherwise
    let wide = inner.width >= 90;
    let body = Layout::default()
        .direction(if wide { Direction::Horizontal } else { Direction::Vertical })
        .constraints([
            Constraint::Length(if wide { 36 } else { FORM_ELEMENTS as u16 + 2 }),
            Constraint::Min(10),
        ])
        .split(chunks[3]);

    draw_form(f, app, body[0]);
    draw_results(f, app, body[1]);
    draw_footer(f, app, chunks[4]);

    if app.popup == Popup::Help {
        draw_help_popup(f);
    }
}

fn draw_headings(f: &mut Frame, app: &App, areas: &[Rect]) {
    if app.is_visible(Target::Title) {
        let title = Paragraph::new(Span::styled(
            TITLE,
            Style::default().fg(header()).add_modifier(Modifier::BOLD),
        ))
        .alignment(Alignment::Center);
        f.render_widget(title, areas[0]);
    }

    if app.is_visible(Target::Subtitle) {
        let subtitle = Paragraph::new(Span::styled(SUBTITLE, Style::default().fg(accent())))
            .alignment(Alignment::Center);
        f.render_widget(subtitle, areas[1]);
    }

    if app.is_visible(Target::Description) {
        let description = Paragraph::new(Span::styled(DESCRIPTION, Style::default().fg(text_dim())))
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true });
        f.render_widget(description, areas[2]);
    }
}

/// The investment form: a label line and an input line per field, then the
/// submit button. Each element shows up once the intro reveals it.
fn draw_form(f: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .title(Span::styled(" Investment ", Style::default().fg(accent())))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(inactive()));

    let mut lines: Vec<Line> = Vec::with_capacity(FORM_ELEMENTS);
    for field in Field::ALL {
        let focused = app.focus == Focus::Field(field);

        if app.is_visible(Target::FormElement(field.label_element())) {
            let label_style = if focused {
                Style::default().fg(accent()).add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(text_dim())
            };
            lines.push(Line::from(Span::styled(field.label(), label_style)));
        } else {
            lines.push(Line::default());
        }

        if app.is_visible(Target::FormElement(field.input_element())) {
            let line = if field == Field::Capitalization {
                components::select_line(app.capitalization_label(), focused, theme())
            } else {
                components::input_line(app.field_value(field), focused, theme())
            };
            lines.push(line);
        } else {
            lines.push(Line::default());
        }
    }

    if app.is_visible(Target::FormElement(SUBMIT_ELEMENT)) {
        lines.push(components::submit_line(app.focus == Focus::Submit, theme()));
    }

    f.render_widget(Paragraph::new(lines).block(block), area);
}

fn draw_results(f: &mut Frame, app: &App, area: Rect) {
    if !app.result_visible {
        return;
    }

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),  // Result message
            Constraint::Min(6),     // Chart
            Constraint::Length(1),  // Tooltip
        ])
        .split(area);

    if let Some(result) = &app.result {
        let color = if result.is_error { danger() } else { success() };
        let message = Paragraph::new(Span::styled(result.message.as_str(), Style::default().fg(color)))
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true })
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(color)),
            );
        f.render_widget(message, chunks[0]);
    }

    if let Some(chart) = &app.chart {
        f.render_widget(components::balance_chart(chart, theme()), chunks[1]);
        let tooltip = Paragraph::new(components::tooltip_line(chart, theme()))
            .alignment(Alignment::Center);
        f.render_widget(tooltip, chunks[2]);
    }
}

fn draw_footer(f: &mut Frame, app: &App, area: Rect) {
    let line = if !app.reveal.is_complete() {
        Line::from(Span::styled("Press any key to skip", Style::default().fg(text_dim())))
    } else {
        let mut spans = vec![
            Span::styled("Tab", Style::default().fg(accent())),
            Span::styled(" next  ", Style::default().fg(text_dim())),
            Span::styled("Enter", Style::default().fg(accent())),
            Span::styled(" calculate  ", Style::default().fg(text_dim())),
        ];
        if app.chart.is_some() {
            spans.push(Span::styled("←/→", Style::default().fg(accent())));
            spans.push(Span::styled(" inspect year  ", Style::default().fg(text_dim())));
        }
        spans.push(Span::styled("F1", Style::default().fg(accent())));
        spans.push(Span::styled(" help  ", Style::default().fg(text_dim())));
        spans.push(Span::styled("Esc", Style::default().fg(accent())));
        spans.push(Span::styled(" quit", Style::default().fg(text_dim())));
        Line::from(spans)
    };

    f.render_widget(Paragraph::new(line).alignment(Alignment::Center), area);
}

fn draw_help_popup(f: &mut Frame) {
    let area = f.area();
    let popup_area = centered_rect(
        if area.width < 80 { 95 } else { 60 },
        if area.height < 30 { 95 } else { 70 },
        area,
    );

    f.render_widget(Clear, popup_area);

    let key = |k: &'static str, what: &'static str| {
        Line::from(vec![
            Span::styled(format!("  {:<12}", k), Style::default().fg(accent())),
            Span::styled(what, Style::default().fg(text())),
        ])
    };

    let help_text = vec![
        Line::from(Span::styled("═══ Form ═══", Style::default().fg(header()).add_modifier(Modifier::BOLD))),
        key("Tab / ↓", "Next field"),
        key("S-Tab / ↑", "Previous field"),
        key("Backspace", "Delete last character"),
        key("Delete", "Clear field"),
        key("←/→ Space", "Change capitalization (on the select)"),
        key("Enter", "Calculate"),
        Line::from(""),
        Line::from(Span::styled("═══ Chart ═══", Style::default().fg(header()).add_modifier(Modifier::BOLD))),
        key("←/→", "Move the tooltip one year"),
        key("Home/End", "First / last year"),
        Line::from(""),
        Line::from(Span::styled("═══ Command line ═══", Style::default().fg(header()).add_modifier(Modifier::BOLD))),
        key("interes -b 1000 -r 5 -y 10", ""),
        Line::from(Span::styled("  Print the result without the TUI (--json for details)", Style::default().fg(text_dim()))),
        Line::from(""),
        Line::from(vec![
            Span::styled("  Press ", Style::default().fg(text_dim())),
            Span::styled("Esc", Style::default().fg(accent())),
            Span::styled(" to close", Style::default().fg(text_dim())),
        ]),
    ];

    let help = Paragraph::new(help_text)
        .block(
            Block::default()
                .title(Span::styled(" interes Help ", Style::default().fg(accent())))
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

    fn render(app: &App, width: u16, height: u16) -> String {
        let mut terminal = Terminal::new(TestBackend::new(width, height)).unwrap();
        terminal.draw(|f| draw(f, app)).unwrap();
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    #[test]
    fn test_draws_form_and_result() {
        let mut app = App::new(AppConfig::default(), false);
        app.raw.initial_balance = "1000".to_string();
        app.raw.deposit = "0".to_string();
        app.raw.interest_rate = "5".to_string();
        app.raw.duration = "1".to_string();
        app.submit();

        let screen = render(&app, 120, 40);
        assert!(screen.contains(TITLE));
        assert!(screen.contains("Initial balance"));
        assert!(screen.contains("[ Calculate ]"));
        assert!(screen.contains("€1050.00"));
        assert!(screen.contains("Balance with compound interest: €1050.00"));
    }

    #[test]
    fn test_result_area_hidden_before_submit() {
        let app = App::new(AppConfig::default(), false);
        let screen = render(&app, 120, 40);
        assert!(!screen.contains("final balance"));
    }

    #[test]
    fn test_help_popup_draws() {
        let mut app = App::new(AppConfig::default(), false);
        app.popup = Popup::Help;
        let screen = render(&app, 100, 40);
        assert!(screen.contains("interes Help"));
    }
}
