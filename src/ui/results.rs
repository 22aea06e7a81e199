//! Results screen: score, trait breakdown, and per-unit marks

use ratatui::{
    Frame,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
};

use crate::app::state::AppState;
use crate::bank::TaskBody;
use crate::scoring::feedback::{BlankMark, Marks, OptionMark, RecallMark, WordMark};
use crate::theme::Theme;

/// Draw the results screen as a centered overlay
pub fn draw(frame: &mut Frame, area: Rect, state: &AppState, theme: &Theme) {
    let Some(results) = state.results.as_ref() else {
        return;
    };

    let overlay = super::layout::centered_rect(80, 85, area);
    frame.render_widget(Clear, overlay);

    let block = Block::default()
        .title(" Results ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.border_focused))
        .style(Style::default().bg(theme.bg_secondary));
    let inner = block.inner(overlay);
    frame.render_widget(block, overlay);

    let mut lines = Vec::new();

    // Headline: title and overall points.
    let full = results.score.is_full_marks();
    lines.push(Line::from(vec![
        Span::styled(
            results.question.title.clone(),
            Style::default().fg(theme.fg_primary).add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            format!("   {}/{}", results.score.points(), results.score.max()),
            Style::default()
                .fg(if full { theme.success } else { theme.warning })
                .add_modifier(Modifier::BOLD),
        ),
    ]));
    lines.push(Line::from(""));

    // Trait table.
    for t in &results.score.traits {
        let bar_width = 12usize;
        let filled = if t.max == 0 {
            0
        } else {
            ((t.points as usize * bar_width) / t.max as usize).min(bar_width)
        };
        lines.push(Line::from(vec![
            Span::styled(format!("  {:<12}", t.name), Style::default().fg(theme.fg_secondary)),
            Span::styled("\u{2588}".repeat(filled), Style::default().fg(theme.accent_primary)),
            Span::styled(
                "\u{2591}".repeat(bar_width - filled),
                Style::default().fg(theme.fg_muted),
            ),
            Span::styled(format!("  {}/{}", t.points, t.max), Style::default().fg(theme.fg_primary)),
        ]));
    }
    lines.push(Line::from(""));

    // Feedback lines.
    for note in &results.score.feedback {
        lines.push(Line::from(Span::styled(
            format!("  {note}"),
            Style::default().fg(theme.fg_secondary),
        )));
    }
    lines.push(Line::from(""));

    // Per-unit marks.
    lines.extend(mark_lines(results, theme));
    lines.push(Line::from(""));

    lines.push(super::layout::hint_line(
        &[("Enter", "Retry"), ("c", "Copy feedback"), ("Esc", "Home")],
        theme,
    ));

    let para = Paragraph::new(lines).wrap(Wrap { trim: false });
    frame.render_widget(para, inner);
}

fn mark_lines(results: &crate::app::state::ResultsState, theme: &Theme) -> Vec<Line<'static>> {
    match &results.marks {
        Marks::Options(marks) => option_lines(results, marks, theme),
        Marks::Blanks(marks) => blank_lines(marks, theme),
        Marks::Order(marks) => order_lines(results, marks, theme),
        Marks::Transcript(marks) => transcript_lines(results, marks, theme),
        Marks::Recall(marks) => recall_lines(marks, theme),
        Marks::None => Vec::new(),
    }
}

fn option_lines(
    results: &crate::app::state::ResultsState,
    marks: &[OptionMark],
    theme: &Theme,
) -> Vec<Line<'static>> {
    let options: &[String] = match &results.question.body {
        TaskBody::ChoiceSingle { options, .. } | TaskBody::ChoiceMultiple { options, .. } => {
            options
        }
        _ => return Vec::new(),
    };

    options
        .iter()
        .zip(marks)
        .map(|(option, mark)| {
            let (symbol, style) = match mark {
                OptionMark::CorrectSelected => {
                    ("\u{2713}", Style::default().fg(theme.success))
                }
                OptionMark::WrongSelected => ("\u{2717}", Style::default().fg(theme.error)),
                OptionMark::MissedCorrect => ("\u{2022}", Style::default().fg(theme.warning)),
                OptionMark::Plain => (" ", Style::default().fg(theme.fg_muted)),
            };
            Line::from(Span::styled(format!("  {symbol} {option}"), style))
        })
        .collect()
}

fn blank_lines(marks: &[BlankMark], theme: &Theme) -> Vec<Line<'static>> {
    marks
        .iter()
        .enumerate()
        .map(|(i, mark)| {
            if mark.correct {
                Line::from(Span::styled(
                    format!("  \u{2713} blank {}: {}", i + 1, mark.given),
                    Style::default().fg(theme.success),
                ))
            } else {
                let given =
                    if mark.given.trim().is_empty() { "(empty)" } else { mark.given.as_str() };
                Line::from(vec![
                    Span::styled(
                        format!("  \u{2717} blank {}: {given}", i + 1),
                        Style::default().fg(theme.error),
                    ),
                    Span::styled(
                        format!("  \u{2192} {}", mark.expected),
                        Style::default().fg(theme.fg_muted),
                    ),
                ])
            }
        })
        .collect()
}

fn order_lines(
    results: &crate::app::state::ResultsState,
    marks: &[crate::scoring::feedback::OrderMark],
    theme: &Theme,
) -> Vec<Line<'static>> {
    let TaskBody::Reorder { paragraphs, .. } = &results.question.body else {
        return Vec::new();
    };

    marks
        .iter()
        .enumerate()
        .map(|(slot, mark)| {
            let text = paragraphs
                .iter()
                .find(|p| p.id == mark.id)
                .map(|p| p.text.as_str())
                .unwrap_or("<missing paragraph>");

            let (joint, style) = match mark.pair_ok {
                Some(true) => ("\u{2713}", Style::default().fg(theme.success)),
                Some(false) => ("\u{2717}", Style::default().fg(theme.error)),
                None => (" ", Style::default().fg(theme.fg_muted)),
            };

            Line::from(vec![
                Span::styled(format!("  {}. ", slot + 1), Style::default().fg(theme.fg_muted)),
                Span::styled(text.to_string(), Style::default().fg(theme.fg_secondary)),
                Span::styled(format!("  {joint}"), style),
            ])
        })
        .collect()
}

fn transcript_lines(
    results: &crate::app::state::ResultsState,
    marks: &[WordMark],
    theme: &Theme,
) -> Vec<Line<'static>> {
    let TaskBody::Highlight { transcript, .. } = &results.question.body else {
        return Vec::new();
    };

    let mut spans = vec![Span::raw("  ")];
    for (word, mark) in transcript.iter().zip(marks) {
        let style = match mark {
            WordMark::Hit => Style::default().fg(theme.success).add_modifier(Modifier::BOLD),
            WordMark::FalseAlarm => Style::default().fg(theme.error),
            WordMark::Miss => {
                Style::default().fg(theme.warning).add_modifier(Modifier::UNDERLINED)
            }
            WordMark::Plain => Style::default().fg(theme.fg_muted),
        };
        spans.push(Span::styled(word.clone(), style));
        spans.push(Span::raw(" "));
    }

    vec![
        Line::from(spans),
        Line::from(""),
        Line::from(Span::styled(
            "  bold = spotted   red = wrongly flagged   underlined = missed",
            Style::default().fg(theme.fg_muted),
        )),
    ]
}

fn recall_lines(marks: &[RecallMark], theme: &Theme) -> Vec<Line<'static>> {
    let mut spans = vec![Span::raw("  ")];
    for mark in marks {
        let style = if mark.recalled {
            Style::default().fg(theme.success)
        } else {
            Style::default().fg(theme.error).add_modifier(Modifier::CROSSED_OUT)
        };
        spans.push(Span::styled(mark.word.clone(), style));
        spans.push(Span::raw(" "));
    }
    vec![Line::from(spans)]
}
