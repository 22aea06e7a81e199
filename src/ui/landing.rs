//! Landing screen with an animated level-meter wave

use ratatui::{
    Frame,
    layout::Alignment,
    style::Style,
    text::{Line, Span},
    widgets::Paragraph,
};

use crate::app::state::LandingAnimation;
use crate::theme::Theme;

/// Bar heights of the wave, drawn left to right like a voice level meter
/// settling after a spoken word
const WAVE_HEIGHTS: &[u8] = &[
    1, 2, 4, 6, 7, 8, 7, 5, 3, 2, 3, 5, 7, 8, 8, 6, 4, 3, 4, 6, 7, 5, 4, 2, 1, 1,
];

/// Partial block characters indexed by height (0 = blank)
const BLOCKS: [char; 9] = [' ', '▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];

const TITLE: &str = "PTEPREP";
const TAGLINE: &str = "Practice every PTE Academic task from your terminal";
const PROMPT: &str = "Press any key to begin...";

/// Build the wave string based on animation progress
fn build_wave(progress: f32) -> String {
    let bars_to_draw = ((WAVE_HEIGHTS.len() as f32) * progress) as usize;

    WAVE_HEIGHTS
        .iter()
        .enumerate()
        .map(|(i, &height)| {
            if i < bars_to_draw {
                BLOCKS[height.min(8) as usize]
            } else {
                ' '
            }
        })
        .collect()
}

/// Draw the landing screen
pub fn draw(frame: &mut Frame, animation: &LandingAnimation, theme: &Theme) {
    let area = frame.area();

    // Fill background
    let bg_style = Style::default().bg(theme.bg_primary);
    frame.render_widget(Paragraph::new("").style(bg_style), area);

    let title_shown: String = TITLE.chars().take(animation.title_chars(TITLE.len())).collect();

    let mut lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            build_wave(animation.wave_progress()),
            Style::default().fg(theme.accent_primary),
        )),
        Line::from(""),
        Line::from(Span::styled(
            title_shown,
            Style::default().fg(theme.fg_primary).add_modifier(ratatui::style::Modifier::BOLD),
        )),
        Line::from(""),
    ];

    if animation.show_tagline() {
        lines.push(Line::from(Span::styled(TAGLINE, Style::default().fg(theme.fg_secondary))));
    } else {
        lines.push(Line::from(""));
    }

    lines.push(Line::from(""));

    if animation.complete {
        lines.push(Line::from(Span::styled(PROMPT, Style::default().fg(theme.fg_muted))));
    }

    // Center the block vertically in the available area.
    let content_height = lines.len() as u16;
    let top_pad = area.height.saturating_sub(content_height) / 2;
    let centered = ratatui::layout::Rect {
        x: area.x,
        y: area.y + top_pad,
        width: area.width,
        height: content_height.min(area.height),
    };

    let para = Paragraph::new(lines).alignment(Alignment::Center).style(bg_style);
    frame.render_widget(para, centered);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wave_reveals_with_progress() {
        assert_eq!(build_wave(0.0).trim(), "");
        let half = build_wave(0.5);
        let full = build_wave(1.0);
        assert!(half.trim().len() < full.trim().len());
        assert_eq!(full.chars().count(), WAVE_HEIGHTS.len());
    }
}
