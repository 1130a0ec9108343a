//! Reusable form and legend pieces

use ratatui::{
    style::{Color, Modifier, Style},
    text::{Line, Span},
};

use crate::sampling::{ConfidenceLevel, MarginOfError};

/// Width of the label column in the form
const LABEL_WIDTH: usize = 14;

/// A form row: padded label followed by the value spans.
pub fn field_line<'a>(label: &'a str, focused: bool, label_color: Color, accent: Color, value: Vec<Span<'a>>) -> Line<'a> {
    let marker = if focused { "› " } else { "  " };
    let label_style = if focused {
        Style::default().fg(accent).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(label_color)
    };

    let mut spans = vec![
        Span::styled(marker, Style::default().fg(accent)),
        Span::styled(format!("{:<width$}", label, width = LABEL_WIDTH), label_style),
    ];
    spans.extend(value);
    Line::from(spans)
}

/// Choice list with the selected level highlighted: `90%  [95%]  99%`
pub fn confidence_choices<'a>(selected: ConfidenceLevel, on: Color, off: Color) -> Vec<Span<'a>> {
    ConfidenceLevel::ALL
        .iter()
        .map(|level| {
            if *level == selected {
                Span::styled(format!("[{}] ", level), Style::default().fg(on).add_modifier(Modifier::BOLD))
            } else {
                Span::styled(format!(" {}  ", level), Style::default().fg(off))
            }
        })
        .collect()
}

/// Slider track for the margin: `1 ━━━━●───── 10   5%`
pub fn margin_slider<'a>(margin: MarginOfError, filled: Color, track: Color, text: Color) -> Vec<Span<'a>> {
    let lo = *MarginOfError::SLIDER_RANGE.start();
    let hi = *MarginOfError::SLIDER_RANGE.end();
    let pos = margin.percent().clamp(lo, hi) - lo;
    let slots = hi - lo;

    vec![
        Span::styled(format!("{} ", lo), Style::default().fg(track)),
        Span::styled("━".repeat(pos as usize), Style::default().fg(filled)),
        Span::styled("●", Style::default().fg(filled).add_modifier(Modifier::BOLD)),
        Span::styled("─".repeat((slots - pos) as usize), Style::default().fg(track)),
        Span::styled(format!(" {}", hi), Style::default().fg(track)),
        Span::styled(format!("   ±{}", margin), Style::default().fg(text).add_modifier(Modifier::BOLD)),
    ]
}

/// Footer legend spans: `key action │ key action │ …`
pub fn key_hints<'a>(hints: &[(&'a str, &'a str)], max: usize, key: Color, action: Color) -> Vec<Span<'a>> {
    hints
        .iter()
        .take(max)
        .flat_map(|(k, a)| {
            vec![
                Span::styled(*k, Style::default().fg(key)),
                Span::styled(format!(" {} │ ", a), Style::default().fg(action)),
            ]
        })
        .collect()
}
