//! Home screen: profile header and the section/question browser

use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};

use crate::app::state::{AppState, HomeRow, home_rows};
use crate::theme::Theme;

/// Draw the home screen
pub fn draw(frame: &mut Frame, area: Rect, state: &mut AppState, theme: &Theme) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(3), Constraint::Length(1)])
        .split(area);

    draw_header(frame, chunks[0], state, theme);
    draw_tree(frame, chunks[1], state, theme);

    let hints = super::layout::hint_line(
        &[
            ("j/k", "Move"),
            ("Enter", "Open / Fold"),
            (":", "Command"),
            ("?", "Help"),
        ],
        theme,
    );
    frame.render_widget(Paragraph::new(hints), chunks[2]);
}

fn draw_header(frame: &mut Frame, area: Rect, state: &AppState, theme: &Theme) {
    let profile_line = match &state.profile {
        Some(user) => Line::from(vec![
            Span::styled(user.name.clone(), Style::default().fg(theme.fg_primary)),
            Span::styled(
                format!("  {} plan", user.plan.label()),
                Style::default().fg(theme.accent_secondary),
            ),
            Span::styled(
                format!("  {} attempts", state.history.len()),
                Style::default().fg(theme.fg_muted),
            ),
        ]),
        None => Line::from(Span::styled(
            "Not signed in - :login <name> <email>",
            Style::default().fg(theme.fg_muted),
        )),
    };

    let block = Block::default()
        .title(" PTE Practice ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.border));
    let inner = block.inner(area);
    frame.render_widget(block, area);
    frame.render_widget(Paragraph::new(profile_line), inner);
}

fn draw_tree(frame: &mut Frame, area: Rect, state: &mut AppState, theme: &Theme) {
    let rows = home_rows(&state.bank, &state.home.expanded_sections);

    state.home.visible_height = area.height as usize;
    state.home.ensure_selection_visible();

    let visible = rows
        .iter()
        .enumerate()
        .skip(state.home.scroll_offset)
        .take(area.height as usize);

    let mut lines = Vec::new();
    for (index, row) in visible {
        let selected = index == state.home.selected_index;
        let line = match row {
            HomeRow::Section(section, count) => {
                let style = Style::default()
                    .fg(theme.accent_primary)
                    .add_modifier(Modifier::BOLD);
                Line::from(vec![
                    Span::styled(format!("  {} ", section.label()), style),
                    Span::styled(format!("({count})"), Style::default().fg(theme.fg_muted)),
                ])
            }
            HomeRow::Question { title, task, .. } => {
                let accuracy = state
                    .progress
                    .stats(*task)
                    .and_then(|s| s.accuracy())
                    .map(|a| format!("  {a}%"))
                    .unwrap_or_default();
                Line::from(vec![
                    Span::styled(format!("      {title}"), Style::default().fg(theme.fg_primary)),
                    Span::styled(accuracy, Style::default().fg(theme.success)),
                ])
            }
        };

        let line = if selected {
            line.style(Style::default().bg(theme.selection))
        } else {
            line
        };
        lines.push(line);
    }

    frame.render_widget(Paragraph::new(lines), area);
}
