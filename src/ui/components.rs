//! Widgets shared by the screen layout: form inputs and the balance chart

use ratatui::{
    layout::Constraint,
    style::{Modifier, Style},
    symbols::Marker,
    text::{Line, Span},
    widgets::{Axis, Block, Borders, Chart, Dataset, GraphType, LegendPosition},
};

use crate::chart::{ChartHandle, DATASET_LABEL};
use crate::theme::Theme;

/// One form input row: `› value_` when focused, `  value` otherwise
pub fn input_line<'a>(value: &'a str, focused: bool, theme: &Theme) -> Line<'a> {
    let (marker, marker_style) = if focused {
        ("› ", Style::default().fg(theme.accent).add_modifier(Modifier::BOLD))
    } else {
        ("  ", Style::default())
    };

    let mut spans = vec![
        Span::styled(marker, marker_style),
        Span::styled(value, Style::default().fg(theme.text)),
    ];
    if focused {
        spans.push(Span::styled("_", Style::default().fg(theme.accent)));
    }
    Line::from(spans)
}

/// The capitalization select: `‹ Monthly ›`
pub fn select_line<'a>(label: &'a str, focused: bool, theme: &Theme) -> Line<'a> {
    let arrow_style = if focused {
        Style::default().fg(theme.accent).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(theme.inactive)
    };
    let marker = if focused { "› " } else { "  " };

    Line::from(vec![
        Span::styled(marker, arrow_style),
        Span::styled("‹ ", arrow_style),
        Span::styled(label, Style::default().fg(theme.text)),
        Span::styled(" ›", arrow_style),
    ])
}

pub fn submit_line(focused: bool, theme: &Theme) -> Line<'static> {
    let style = if focused {
        Style::default()
            .fg(theme.tooltip_fg)
            .bg(theme.accent)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(theme.accent)
    };
    Line::from(vec![
        Span::raw("  "),
        Span::styled("[ Calculate ]", style),
    ])
}

/// Line chart of the balances: filled area, the line, point markers and the
/// highlighted tooltip point
pub fn balance_chart<'a>(chart: &'a ChartHandle, theme: &Theme) -> Chart<'a> {
    let datasets = vec![
        Dataset::default()
            .marker(Marker::Braille)
            .graph_type(GraphType::Bar)
            .style(Style::default().fg(theme.fill))
            .data(chart.fill_points()),
        Dataset::default()
            .name(DATASET_LABEL)
            .marker(Marker::Braille)
            .graph_type(GraphType::Line)
            .style(Style::default().fg(theme.line))
            .data(chart.points()),
        Dataset::default()
            .marker(Marker::Dot)
            .graph_type(GraphType::Scatter)
            .style(Style::default().fg(theme.point))
            .data(chart.points()),
        Dataset::default()
            .marker(Marker::Block)
            .graph_type(GraphType::Scatter)
            .style(Style::default().fg(theme.accent))
            .data(chart.selected_point()),
    ];

    let axis_style = Style::default().fg(theme.text_dim);
    let x_labels: Vec<Span> = chart
        .axis_labels()
        .into_iter()
        .map(|l| Span::styled(l, axis_style))
        .collect();
    let y_labels: Vec<Span> = chart
        .y_labels()
        .into_iter()
        .map(|l| Span::styled(l, axis_style))
        .collect();

    Chart::new(datasets)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(theme.inactive)),
        )
        .x_axis(
            Axis::default()
                .title(Span::styled("Year", axis_style))
                .style(Style::default().fg(theme.inactive))
                .bounds(chart.x_bounds())
                .labels(x_labels),
        )
        .y_axis(
            Axis::default()
                .style(Style::default().fg(theme.inactive))
                .bounds(chart.y_bounds())
                .labels(y_labels),
        )
        .legend_position(Some(LegendPosition::TopLeft))
        .hidden_legend_constraints((Constraint::Ratio(1, 2), Constraint::Ratio(1, 2)))
}

/// Tooltip for the highlighted point, no title and no color swatch
pub fn tooltip_line(chart: &ChartHandle, theme: &Theme) -> Line<'static> {
    Line::from(Span::styled(
        format!(" {} ", chart.tooltip()),
        Style::default().fg(theme.tooltip_fg).bg(theme.tooltip_bg),
    ))
}
