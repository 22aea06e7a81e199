//! Event handling utilities

use crossterm::event::{KeyCode, KeyModifiers};

/// Actions that can be taken in the app
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    // Navigation
    Up,
    Down,
    Left,
    Right,
    Top,
    Bottom,

    // Selection
    Select,
    Toggle,
    Back,

    // Fields
    NextField,
    PrevField,

    // Practice
    Submit,
    Play,
    Record,
    StopRecord,
    ResetAttempt,

    // Results
    Copy,

    // Modes
    Command,
    Help,
}

/// Vim-style key mapping for browsing screens (no modifiers)
pub fn nav_action(key: KeyCode) -> Option<Action> {
    match key {
        KeyCode::Char('j') | KeyCode::Down => Some(Action::Down),
        KeyCode::Char('k') | KeyCode::Up => Some(Action::Up),
        KeyCode::Char('h') | KeyCode::Left => Some(Action::Left),
        KeyCode::Char('l') | KeyCode::Right => Some(Action::Right),
        KeyCode::Char('g') | KeyCode::Home => Some(Action::Top),
        KeyCode::Char('G') | KeyCode::End => Some(Action::Bottom),
        KeyCode::Enter => Some(Action::Select),
        KeyCode::Char(' ') => Some(Action::Toggle),
        KeyCode::Esc => Some(Action::Back),
        KeyCode::Tab => Some(Action::NextField),
        KeyCode::BackTab => Some(Action::PrevField),
        KeyCode::Char(':') => Some(Action::Command),
        KeyCode::Char('?') => Some(Action::Help),
        // Speaking tasks
        KeyCode::Char('r') => Some(Action::Record),
        KeyCode::Char('s') => Some(Action::StopRecord),
        KeyCode::Char('p') => Some(Action::Play),
        KeyCode::Char('x') => Some(Action::ResetAttempt),
        KeyCode::Char('c') => Some(Action::Copy),
        _ => None,
    }
}

/// Control-modified keys work on every practice screen, including the ones
/// that capture plain characters as answer text
pub fn control_action(key: KeyCode, modifiers: KeyModifiers) -> Option<Action> {
    if !modifiers.contains(KeyModifiers::CONTROL) {
        return None;
    }
    match key {
        KeyCode::Char('s') => Some(Action::Submit),
        KeyCode::Char('p') => Some(Action::Play),
        KeyCode::Char('r') => Some(Action::Record),
        KeyCode::Char('x') => Some(Action::ResetAttempt),
        _ => None,
    }
}
