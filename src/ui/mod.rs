//! UI rendering components

pub mod help;
pub mod home;
pub mod landing;
pub mod layout;
pub mod practice;
pub mod results;
pub mod status_bar;

use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout},
};

use crate::app::state::{AppState, Screen};
use crate::config::Config;

/// Main draw function
pub fn draw(frame: &mut Frame, state: &mut AppState, config: &Config, speech_text: Option<&str>) {
    let theme = config.active_theme();

    if state.screen == Screen::Landing {
        landing::draw(frame, &state.landing, &theme);
        return;
    }

    // Every other screen shares the bottom command/status line.
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(3), Constraint::Length(1)])
        .split(frame.area());
    let main_area = chunks[0];
    let bottom_area = chunks[1];

    match state.screen {
        Screen::Landing => {}
        Screen::Home => home::draw(frame, main_area, state, &theme),
        Screen::Practice => practice::draw(frame, main_area, state, &theme, speech_text),
        Screen::Results => results::draw(frame, main_area, state, &theme),
        Screen::Help => help::draw(frame, main_area, &theme),
    }

    status_bar::draw(frame, bottom_area, &state.command_line, &theme);
}
