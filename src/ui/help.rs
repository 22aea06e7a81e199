//! Help screen

use ratatui::{
    Frame,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
};

use crate::theme::Theme;

const KEYS: &[(&str, &str)] = &[
    ("j/k or arrows", "Move selection"),
    ("Enter", "Open question / fold section / submit answer"),
    ("Space", "Pick an option, grab a paragraph, flag a word"),
    ("Tab / Shift-Tab", "Next / previous blank"),
    ("Ctrl+S", "Submit (always, even while typing)"),
    ("Ctrl+P or p", "Play the audio part of the task"),
    ("r / s / x", "Record, stop, reset a speaking attempt"),
    ("c", "Copy feedback from the results screen"),
    ("Esc", "Back"),
    (":", "Command line"),
];

const COMMANDS: &[(&str, &str)] = &[
    (":open <id>", "Open a question by id"),
    (":list", "Show how many questions are loaded"),
    (":login <name> <email>", "Create or resume the local profile"),
    (":logout", "Remove the local profile"),
    (":enroll <course-id>", "Add a course to the profile"),
    (":backup <path>", "Dump all records to one JSON file"),
    (":restore <path>", "Replace all records from a backup file"),
    (":export <path>", "Write attempt history as CSV"),
    (":reset", "Clear progress and history"),
    (":q", "Quit"),
];

/// Draw the help screen
pub fn draw(frame: &mut Frame, area: Rect, theme: &Theme) {
    let block = Block::default()
        .title(" Help ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.border));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let mut lines = vec![
        Line::from(Span::styled(
            "Keys",
            Style::default().fg(theme.accent_primary).add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
    ];
    for (key, what) in KEYS {
        lines.push(Line::from(vec![
            Span::styled(format!("  {key:<18}"), Style::default().fg(theme.fg_primary)),
            Span::styled(*what, Style::default().fg(theme.fg_secondary)),
        ]));
    }

    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "Commands",
        Style::default().fg(theme.accent_primary).add_modifier(Modifier::BOLD),
    )));
    lines.push(Line::from(""));
    for (cmd, what) in COMMANDS {
        lines.push(Line::from(vec![
            Span::styled(format!("  {cmd:<24}"), Style::default().fg(theme.fg_primary)),
            Span::styled(*what, Style::default().fg(theme.fg_secondary)),
        ]));
    }

    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "Press Esc to go back",
        Style::default().fg(theme.fg_muted),
    )));

    frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: false }), inner);
}
