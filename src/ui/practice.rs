//! Practice screen: per-task answer surfaces

use std::time::Instant;

use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
};
use textwrap::wrap;

use crate::app::state::{AppState, PracticeState};
use crate::audio::{FailReason, Phase};
use crate::bank::{Response, TaskBody};
use crate::scoring::text::word_count;
use crate::theme::Theme;

/// Draw the practice screen
pub fn draw(
    frame: &mut Frame,
    area: Rect,
    state: &mut AppState,
    theme: &Theme,
    speech_text: Option<&str>,
) {
    let Some(practice) = state.practice.as_ref() else {
        return;
    };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(2), Constraint::Min(3), Constraint::Length(1)])
        .split(area);

    draw_title(frame, chunks[0], practice, theme, speech_text);

    let response = state.sheet.get(&practice.question.id);
    match &practice.question.body {
        TaskBody::Summary { .. } | TaskBody::Dictation { .. } => {
            draw_text_task(frame, chunks[1], practice, theme);
        }
        TaskBody::ChoiceSingle { .. } | TaskBody::ChoiceMultiple { .. } => {
            draw_choice_task(frame, chunks[1], practice, response, theme);
        }
        TaskBody::Blanks { .. } => draw_blanks_task(frame, chunks[1], practice, response, theme),
        TaskBody::Reorder { .. } => draw_reorder_task(frame, chunks[1], practice, response, theme),
        TaskBody::Highlight { .. } => {
            draw_highlight_task(frame, chunks[1], practice, response, theme);
        }
        TaskBody::Speaking { .. } => draw_speaking_task(frame, chunks[1], practice, theme),
    }

    frame.render_widget(Paragraph::new(hints_for(practice, theme)), chunks[2]);
}

fn draw_title(
    frame: &mut Frame,
    area: Rect,
    practice: &PracticeState,
    theme: &Theme,
    speech_text: Option<&str>,
) {
    let mut spans = vec![
        Span::styled(
            practice.question.title.clone(),
            Style::default().fg(theme.fg_primary).add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            format!("  {}", practice.question.task().label()),
            Style::default().fg(theme.fg_muted),
        ),
    ];
    if speech_text.is_some() {
        spans.push(Span::styled("  [playing audio]", Style::default().fg(theme.info)));
    }
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn hints_for<'a>(practice: &PracticeState, theme: &Theme) -> Line<'a> {
    let hints: &[(&str, &str)] = match &practice.question.body {
        TaskBody::Summary { spoken: true, .. } => {
            &[("Ctrl+P", "Play"), ("Ctrl+S", "Submit"), ("Esc", "Back")]
        }
        TaskBody::Summary { .. } => &[("Ctrl+S", "Submit"), ("Esc", "Back")],
        TaskBody::Dictation { .. } => {
            &[("Ctrl+P", "Play"), ("Ctrl+S", "Submit"), ("Esc", "Back")]
        }
        TaskBody::ChoiceSingle { .. } | TaskBody::ChoiceMultiple { .. } => {
            &[("j/k", "Move"), ("Space", "Pick"), ("Enter", "Submit"), ("Esc", "Back")]
        }
        TaskBody::Blanks { .. } => &[
            ("Tab", "Next blank"),
            ("Up/Down", "Cycle choices"),
            ("Enter", "Submit"),
            ("Esc", "Back"),
        ],
        TaskBody::Reorder { .. } => &[
            ("j/k", "Move"),
            ("Space", "Grab / Drop"),
            ("Enter", "Submit"),
            ("Esc", "Back"),
        ],
        TaskBody::Highlight { .. } => &[
            ("h/l", "Move"),
            ("Space", "Flag word"),
            ("p", "Play"),
            ("Enter", "Submit"),
            ("Esc", "Back"),
        ],
        TaskBody::Speaking { .. } => &[
            ("r", "Record"),
            ("s", "Stop"),
            ("x", "Reset"),
            ("Enter", "Submit"),
            ("Esc", "Back"),
        ],
    };
    super::layout::hint_line(hints, theme)
}

fn passage_block<'a>(title: &'a str, theme: &Theme) -> Block<'a> {
    Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.border))
}

fn draw_text_task(frame: &mut Frame, area: Rect, practice: &PracticeState, theme: &Theme) {
    let (source_lines, limit_note) = match &practice.question.body {
        TaskBody::Summary { passage, spoken, limit, .. } => {
            let lines = if *spoken {
                vec![Line::from(Span::styled(
                    "Audio passage - press Ctrl+P to listen",
                    Style::default().fg(theme.info),
                ))]
            } else {
                wrapped_lines(passage, area.width, theme.fg_secondary)
            };
            (lines, format!("{}-{} words", limit.min, limit.max))
        }
        TaskBody::Dictation { .. } => (
            vec![Line::from(Span::styled(
                "Dictation - press Ctrl+P to listen, then type what you heard",
                Style::default().fg(theme.info),
            ))],
            String::new(),
        ),
        _ => (Vec::new(), String::new()),
    };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(45), Constraint::Percentage(55)])
        .split(area);

    let passage =
        Paragraph::new(source_lines).block(passage_block(" Passage ", theme)).wrap(Wrap {
            trim: false,
        });
    frame.render_widget(passage, chunks[0]);

    let words = word_count(&practice.editor.text);
    let counter = if limit_note.is_empty() {
        format!(" Your answer - {words} words ")
    } else {
        format!(" Your answer - {words} words ({limit_note}) ")
    };

    let editor = Paragraph::new(practice.editor.text.clone())
        .style(Style::default().fg(theme.fg_primary))
        .block(passage_block(&counter, theme).border_style(Style::default().fg(theme.border_focused)))
        .wrap(Wrap { trim: false });
    frame.render_widget(editor, chunks[1]);
}

fn draw_choice_task(
    frame: &mut Frame,
    area: Rect,
    practice: &PracticeState,
    response: Option<&Response>,
    theme: &Theme,
) {
    let (prompt, passage, options, multiple) = match &practice.question.body {
        TaskBody::ChoiceSingle { prompt, passage, options, .. } => {
            (prompt, passage, options, false)
        }
        TaskBody::ChoiceMultiple { prompt, passage, options, .. } => {
            (prompt, passage, options, true)
        }
        _ => return,
    };

    let mut lines = Vec::new();
    if let Some(passage) = passage {
        lines.extend(wrapped_lines(passage, area.width, theme.fg_secondary));
        lines.push(Line::from(""));
    }
    lines.push(Line::from(Span::styled(
        prompt.clone(),
        Style::default().fg(theme.fg_primary).add_modifier(Modifier::BOLD),
    )));
    lines.push(Line::from(""));

    for (i, option) in options.iter().enumerate() {
        let picked = match response {
            Some(Response::Choice { selected }) => selected.as_deref() == Some(option.as_str()),
            Some(Response::Choices { selected }) => selected.contains(option),
            _ => false,
        };

        let marker = match (multiple, picked) {
            (false, true) => "\u{25CF}",  // ●
            (false, false) => "\u{25CB}", // ○
            (true, true) => "\u{25A0}",   // ■
            (true, false) => "\u{25A1}",  // □
        };
        let letter = (b'A' + i as u8) as char;

        let style = if i == practice.cursor {
            Style::default().fg(theme.accent_primary).add_modifier(Modifier::BOLD)
        } else if picked {
            Style::default().fg(theme.fg_primary)
        } else {
            Style::default().fg(theme.fg_secondary)
        };

        lines.push(Line::from(Span::styled(format!("  {marker} {letter}) {option}"), style)));
        lines.push(Line::from(""));
    }

    let para = Paragraph::new(lines).wrap(Wrap { trim: false });
    frame.render_widget(para, area);
}

fn draw_blanks_task(
    frame: &mut Frame,
    area: Rect,
    practice: &PracticeState,
    response: Option<&Response>,
    theme: &Theme,
) {
    let TaskBody::Blanks { segments, blanks } = &practice.question.body else {
        return;
    };
    let empty = Vec::new();
    let values = match response {
        Some(Response::Blanks { values }) => values,
        _ => &empty,
    };

    // Interleave text segments with editable blank slots.
    let mut spans = Vec::new();
    for (i, segment) in segments.iter().enumerate() {
        spans.push(Span::styled(segment.clone(), Style::default().fg(theme.fg_secondary)));
        if i < blanks.len() {
            let value = values.get(i).map(String::as_str).unwrap_or("");
            let shown = if value.is_empty() { "______" } else { value };
            let style = if i == practice.cursor {
                Style::default()
                    .fg(theme.accent_primary)
                    .add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
            } else {
                Style::default().fg(theme.fg_primary).add_modifier(Modifier::UNDERLINED)
            };
            spans.push(Span::styled(format!("[{shown}]"), style));
        }
    }

    let mut lines = vec![Line::from(spans), Line::from("")];

    // Offer the option list of the active blank, if it has one.
    if let Some(blank) = blanks.get(practice.cursor) {
        if !blank.options.is_empty() {
            lines.push(Line::from(Span::styled(
                format!("Choices for blank {}: {}", practice.cursor + 1, blank.options.join(" / ")),
                Style::default().fg(theme.fg_muted),
            )));
        }
    }

    let para = Paragraph::new(lines)
        .block(passage_block(" Fill every blank ", theme))
        .wrap(Wrap { trim: false });
    frame.render_widget(para, area);
}

fn draw_reorder_task(
    frame: &mut Frame,
    area: Rect,
    practice: &PracticeState,
    response: Option<&Response>,
    theme: &Theme,
) {
    let TaskBody::Reorder { paragraphs, .. } = &practice.question.body else {
        return;
    };
    let Some(Response::Order { arrangement }) = response else {
        return;
    };

    let mut lines = Vec::new();
    for (slot, id) in arrangement.iter().enumerate() {
        let text = paragraphs
            .iter()
            .find(|p| &p.id == id)
            .map(|p| p.text.as_str())
            .unwrap_or("<missing paragraph>");

        let selected = slot == practice.cursor;
        let marker = match (selected, practice.grabbed) {
            (true, true) => "\u{2195} ",  // ↕ grabbed
            (true, false) => "\u{25B8} ", // ▸ cursor
            _ => "  ",
        };
        let style = if selected {
            Style::default().fg(theme.accent_primary)
        } else {
            Style::default().fg(theme.fg_secondary)
        };

        lines.push(Line::from(Span::styled(
            format!("{marker}{}. {text}", slot + 1),
            style,
        )));
        lines.push(Line::from(""));
    }

    let para = Paragraph::new(lines)
        .block(passage_block(" Arrange into the original order ", theme))
        .wrap(Wrap { trim: false });
    frame.render_widget(para, area);
}

fn draw_highlight_task(
    frame: &mut Frame,
    area: Rect,
    practice: &PracticeState,
    response: Option<&Response>,
    theme: &Theme,
) {
    let TaskBody::Highlight { transcript, .. } = &practice.question.body else {
        return;
    };
    let flagged: &std::collections::BTreeSet<usize> = match response {
        Some(Response::Flags { indices }) => indices,
        _ => return,
    };

    // Lay the transcript out word by word, wrapping at the frame width,
    // so each word stays an addressable unit.
    let width = area.width.saturating_sub(4).max(10) as usize;
    let mut lines = Vec::new();
    let mut current: Vec<Span> = Vec::new();
    let mut current_width = 0usize;

    for (i, word) in transcript.iter().enumerate() {
        let cell = word.chars().count() + 1;
        if current_width + cell > width && !current.is_empty() {
            lines.push(Line::from(std::mem::take(&mut current)));
            current_width = 0;
        }

        let mut style = if flagged.contains(&i) {
            Style::default().fg(theme.warning).add_modifier(Modifier::UNDERLINED)
        } else {
            Style::default().fg(theme.fg_secondary)
        };
        if i == practice.cursor {
            style = style.bg(theme.selection).add_modifier(Modifier::BOLD);
        }

        current.push(Span::styled(word.clone(), style));
        current.push(Span::raw(" "));
        current_width += cell;
    }
    if !current.is_empty() {
        lines.push(Line::from(current));
    }

    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        format!("{} word(s) flagged", flagged.len()),
        Style::default().fg(theme.fg_muted),
    )));

    let para = Paragraph::new(lines)
        .block(passage_block(" Flag the words that differ from the audio ", theme));
    frame.render_widget(para, area);
}

fn draw_speaking_task(frame: &mut Frame, area: Rect, practice: &PracticeState, theme: &Theme) {
    let TaskBody::Speaking { prompt, reflex, .. } = &practice.question.body else {
        return;
    };

    let mut lines = wrapped_lines(prompt, area.width, theme.fg_primary);
    lines.push(Line::from(""));

    let now = Instant::now();
    match practice.sequencer.as_ref() {
        None => {
            lines.push(Line::from(Span::styled(
                "Press r to start the preparation countdown",
                Style::default().fg(theme.fg_muted),
            )));
        }
        Some(seq) => match seq.phase() {
            Phase::Idle => {
                lines.push(Line::from(Span::styled(
                    "Press r to start the preparation countdown",
                    Style::default().fg(theme.fg_muted),
                )));
            }
            Phase::Preparing => {
                let remaining = seq.prepare_remaining(now).unwrap_or_default();
                let label = if *reflex {
                    format!(
                        "Speak now! Recording starts on your voice - {}",
                        super::layout::format_countdown(remaining)
                    )
                } else {
                    format!("Preparing - {}", super::layout::format_countdown(remaining))
                };
                lines.push(Line::from(Span::styled(label, Style::default().fg(theme.warning))));
            }
            Phase::Recording => {
                let remaining = seq.record_remaining(now).unwrap_or_default();
                lines.push(Line::from(Span::styled(
                    format!("\u{25CF} Recording - {}", super::layout::format_countdown(remaining)),
                    Style::default().fg(theme.error).add_modifier(Modifier::BOLD),
                )));
                lines.push(Line::from(level_meter(practice.last_level, theme)));
                if let Some(reaction) = seq.reaction() {
                    lines.push(Line::from(Span::styled(
                        format!("Reaction time: {} ms", reaction.as_millis()),
                        Style::default().fg(theme.info),
                    )));
                }
            }
            Phase::Completed => {
                let recorded = seq.recorded().unwrap_or_default();
                lines.push(Line::from(Span::styled(
                    format!("Recorded {:.1}s - press Enter to submit", recorded.as_secs_f32()),
                    Style::default().fg(theme.success),
                )));
            }
            Phase::Failed(reason) => {
                let label = match reason {
                    FailReason::NoSpeech => "No speech detected before the deadline",
                    FailReason::MidSilence => "Recording stopped: sustained silence",
                };
                lines.push(Line::from(Span::styled(
                    format!("{label} - press x to reset or Enter to submit as zero"),
                    Style::default().fg(theme.error),
                )));
            }
        },
    }

    let para = Paragraph::new(lines)
        .block(passage_block(" Speaking ", theme))
        .wrap(Wrap { trim: false });
    frame.render_widget(para, area);
}

/// A 20-cell level meter for the live input
fn level_meter<'a>(level: f32, theme: &Theme) -> Vec<Span<'a>> {
    const CELLS: usize = 20;
    let lit = ((level.clamp(0.0, 1.0)) * CELLS as f32).round() as usize;

    let mut spans = vec![Span::styled("Level ", Style::default().fg(theme.fg_muted))];
    spans.push(Span::styled(
        "\u{2588}".repeat(lit),
        Style::default().fg(if level >= 0.15 { theme.success } else { theme.fg_muted }),
    ));
    spans.push(Span::styled(
        "\u{2591}".repeat(CELLS - lit.min(CELLS)),
        Style::default().fg(theme.fg_muted),
    ));
    spans
}

/// Wrap plain text into styled lines at the given frame width
fn wrapped_lines(text: &str, width: u16, color: ratatui::style::Color) -> Vec<Line<'static>> {
    let width = width.saturating_sub(4).max(16) as usize;
    wrap(text, width)
        .into_iter()
        .map(|cow| Line::from(Span::styled(cow.into_owned(), Style::default().fg(color))))
        .collect()
}
