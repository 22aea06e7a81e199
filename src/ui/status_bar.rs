//! Bottom command/status line

use ratatui::{
    Frame,
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::Paragraph,
};

use crate::app::state::CommandLine;
use crate::theme::Theme;

/// Draw the command/status line
pub fn draw(frame: &mut Frame, area: Rect, command_line: &CommandLine, theme: &Theme) {
    let style = if command_line.active {
        Style::default().fg(theme.fg_primary)
    } else if command_line.is_error {
        Style::default().fg(theme.error)
    } else {
        Style::default().fg(theme.fg_muted)
    };

    let text = command_line.display_text();
    frame.render_widget(
        Paragraph::new(Line::from(Span::styled(text, style)))
            .style(Style::default().bg(theme.bg_primary)),
        area,
    );

    // Show the cursor while typing a command.
    if command_line.active {
        let x = area.x + 1 + command_line.editor.cursor as u16;
        frame.set_cursor_position((x.min(area.x + area.width.saturating_sub(1)), area.y));
    }
}
