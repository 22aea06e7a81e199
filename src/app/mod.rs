//! Application state and event handling

pub mod command;
pub mod input;
pub mod state;

use std::io::{self, Stdout};
use std::time::{Duration, Instant};

use anyhow::Result;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};

use crate::audio::{
    AudioError, Phase, RecordingSequencer, ScriptedMicrophone, SimulatedSpeech, SpeechEngine,
    Utterance, spawn_sampler,
};
use crate::bank::{QuestionBank, Response, SpokenOutcome, TaskBody, TaskType};
use crate::config::Config;
use crate::scoring::{self, feedback};
use crate::store::progress::{AttemptFailure, AttemptRecord};
use crate::store::{FileStore, profile, progress};
use crate::ui;
use command::{Command, ParseResult, parse_command};
use input::{Action, control_action, nav_action};
use state::{AppState, HomeRow, PracticeState, ResultsState, Screen, home_rows};

/// The main application
pub struct App {
    /// Application configuration
    config: Config,

    /// Persistent key-value store
    store: FileStore,

    /// Speech playback channel (one utterance at a time)
    speech: SimulatedSpeech,

    /// Current application state
    state: AppState,

    /// Terminal backend
    terminal: Terminal<CrosstermBackend<Stdout>>,
}

impl App {
    /// Create a new application instance
    pub fn new(config: Config) -> Result<Self> {
        let terminal = Self::setup_terminal()?;

        let store = FileStore::open(Config::store_path()?)?;
        let bank = QuestionBank::load(&Config::banks_dir()?);
        let user = profile::load(&store)?;
        let (history, progress) = progress::load(&store)?;

        Ok(Self {
            config,
            store,
            speech: SimulatedSpeech::new(),
            state: AppState::new(bank, user, history, progress),
            terminal,
        })
    }

    /// Set up the terminal for TUI rendering
    fn setup_terminal() -> Result<Terminal<CrosstermBackend<Stdout>>> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
        let backend = CrosstermBackend::new(stdout);
        let terminal = Terminal::new(backend)?;
        Ok(terminal)
    }

    /// Restore the terminal to its original state
    fn restore_terminal(&mut self) -> Result<()> {
        disable_raw_mode()?;
        execute!(self.terminal.backend_mut(), LeaveAlternateScreen, DisableMouseCapture)?;
        self.terminal.show_cursor()?;
        Ok(())
    }

    /// Run the application main loop
    pub async fn run(&mut self) -> Result<()> {
        // Set up panic hook to restore terminal
        let original_hook = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |panic_info| {
            let _ = disable_raw_mode();
            let _ = execute!(io::stdout(), LeaveAlternateScreen, DisableMouseCapture);
            original_hook(panic_info);
        }));

        loop {
            // Draw UI
            let config = self.config.clone();
            let speech_text = self.speech.current_text().map(|t| t.to_string());
            self.terminal.draw(|frame| {
                ui::draw(frame, &mut self.state, &config, speech_text.as_deref());
            })?;

            // Handle events
            if event::poll(Duration::from_millis(16))? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press {
                        match self.handle_key(key) {
                            Ok(true) => break, // Exit requested
                            Ok(false) => {}    // Continue
                            Err(e) => {
                                tracing::error!("Error handling key: {}", e);
                                self.state.command_line.set_error(e.to_string());
                            }
                        }
                    }
                }
            }

            // Update animations and timed state
            if self.state.screen == Screen::Landing {
                self.state.landing.tick();
            }
            self.tick_practice();
        }

        self.restore_terminal()?;
        Ok(())
    }

    /// Drain sampler frames and advance the recording sequencer
    fn tick_practice(&mut self) {
        let Some(practice) = self.state.practice.as_mut() else {
            return;
        };
        let Some(seq) = practice.sequencer.as_mut() else {
            return;
        };

        if let Some(levels) = practice.levels.as_mut() {
            while let Ok(frame) = levels.try_recv() {
                practice.last_level = frame.level;
                seq.tick(frame.at, Some(frame.level));
            }
        }
        seq.tick(Instant::now(), None);

        // Finalize once: stop the sampler (dropping the receiver ends the
        // producer) and record the outcome on the sheet.
        if seq.phase().is_terminal() && practice.levels.is_some() {
            practice.levels = None;

            let outcome = seq.outcome();
            let id = practice.question.id.clone();
            self.state.sheet.set(&id, Response::Spoken { outcome });
        }
    }

    /// Handle a key press, returns true if should exit
    fn handle_key(&mut self, key: KeyEvent) -> Result<bool> {
        if self.state.command_line.active {
            return self.handle_command_key(key);
        }

        match self.state.screen {
            Screen::Landing => {
                // Any key progresses from landing
                self.state.screen = Screen::Home;
                Ok(false)
            }
            Screen::Home => self.handle_home_key(key),
            Screen::Practice => self.handle_practice_key(key),
            Screen::Results => self.handle_results_key(key),
            Screen::Help => {
                if matches!(key.code, KeyCode::Esc | KeyCode::Enter | KeyCode::Char('q')) {
                    self.state.screen = Screen::Home;
                }
                Ok(false)
            }
        }
    }

    /// Keys while the `:` command line is active
    fn handle_command_key(&mut self, key: KeyEvent) -> Result<bool> {
        match key.code {
            KeyCode::Esc => self.state.command_line.exit(),
            KeyCode::Enter => {
                let line = self.state.command_line.editor.text.clone();
                self.state.command_line.exit();
                return self.run_command_line(&line);
            }
            KeyCode::Backspace => self.state.command_line.editor.backspace(),
            KeyCode::Delete => self.state.command_line.editor.delete_forward(),
            KeyCode::Left => self.state.command_line.editor.move_left(),
            KeyCode::Right => self.state.command_line.editor.move_right(),
            KeyCode::Home => self.state.command_line.editor.move_start(),
            KeyCode::End => self.state.command_line.editor.move_end(),
            KeyCode::Char(c) => self.state.command_line.editor.insert(c),
            _ => {}
        }
        Ok(false)
    }

    fn run_command_line(&mut self, line: &str) -> Result<bool> {
        match parse_command(line) {
            ParseResult::Ok(cmd) => self.execute_command(cmd),
            ParseResult::UnknownCommand(cmd) => {
                self.state.command_line.set_error(format!("Unknown command: {cmd}"));
                Ok(false)
            }
            ParseResult::MissingArgument(cmd) => {
                self.state.command_line.set_error(format!("Command needs an argument: {cmd}"));
                Ok(false)
            }
        }
    }

    fn execute_command(&mut self, cmd: Command) -> Result<bool> {
        match cmd {
            Command::Open(id) => self.open_question(&id),
            Command::List => {
                let total = self.state.bank.len();
                self.state
                    .command_line
                    .set_message(format!("{total} questions loaded across four sections"));
            }
            Command::Login { name, email } => {
                match profile::sign_in(&mut self.store, &name, &email) {
                    Ok(user) => {
                        self.state.command_line.set_message(format!("Signed in as {}", user.name));
                        self.state.profile = Some(user);
                    }
                    Err(e) => self.state.command_line.set_error(e.to_string()),
                }
            }
            Command::Logout => match profile::sign_out(&mut self.store) {
                Ok(()) => {
                    self.state.profile = None;
                    self.state.command_line.set_message("Signed out");
                }
                Err(e) => self.state.command_line.set_error(e.to_string()),
            },
            Command::Enroll(course) => match profile::enroll(&mut self.store, &course) {
                Ok(()) => {
                    self.state.profile = profile::load(&self.store)?;
                    self.state.command_line.set_message(format!("Enrolled in {course}"));
                }
                Err(e) => self.state.command_line.set_error(e.to_string()),
            },
            Command::Backup(path) => {
                match crate::store::backup::export_to_file(&self.store, &path) {
                    Ok(count) => self
                        .state
                        .command_line
                        .set_message(format!("Backed up {count} records to {:?}", path)),
                    Err(e) => self.state.command_line.set_error(e.to_string()),
                }
            }
            Command::Restore(path) => {
                match crate::store::backup::import_from_file(&mut self.store, &path) {
                    Ok(count) => {
                        // Reload everything the restored records describe.
                        self.state.profile = profile::load(&self.store)?;
                        let (history, progress) = progress::load(&self.store)?;
                        self.state.history = history;
                        self.state.progress = progress;
                        self.state
                            .command_line
                            .set_message(format!("Restored {count} records from {:?}", path));
                    }
                    Err(e) => self.state.command_line.set_error(e.to_string()),
                }
            }
            Command::Export(path) => {
                match crate::store::backup::export_csv_to_file(&self.store, &path) {
                    Ok(count) => self
                        .state
                        .command_line
                        .set_message(format!("Exported {count} attempts to {:?}", path)),
                    Err(e) => self.state.command_line.set_error(e.to_string()),
                }
            }
            Command::Reset => match progress::reset(&mut self.store) {
                Ok(()) => {
                    self.state.history = Default::default();
                    self.state.progress = Default::default();
                    self.state.command_line.set_message("Progress and history cleared");
                }
                Err(e) => self.state.command_line.set_error(e.to_string()),
            },
            Command::Quit => return Ok(true),
            Command::Help => self.state.screen = Screen::Help,
            Command::Nop => self.state.command_line.clear_message(),
        }
        Ok(false)
    }

    fn handle_home_key(&mut self, key: KeyEvent) -> Result<bool> {
        let rows = home_rows(&self.state.bank, &self.state.home.expanded_sections);
        if rows.is_empty() {
            return Ok(false);
        }

        match nav_action(key.code) {
            Some(Action::Down) => {
                let home = &mut self.state.home;
                home.selected_index = (home.selected_index + 1).min(rows.len() - 1);
                home.ensure_selection_visible();
            }
            Some(Action::Up) => {
                let home = &mut self.state.home;
                home.selected_index = home.selected_index.saturating_sub(1);
                home.ensure_selection_visible();
            }
            Some(Action::Top) => {
                self.state.home.selected_index = 0;
                self.state.home.ensure_selection_visible();
            }
            Some(Action::Bottom) => {
                self.state.home.selected_index = rows.len() - 1;
                self.state.home.ensure_selection_visible();
            }
            Some(Action::Select | Action::Toggle) => {
                match rows.get(self.state.home.selected_index) {
                    Some(HomeRow::Section(section, _)) => {
                        let index = crate::bank::SectionKind::all()
                            .iter()
                            .position(|s| s == section)
                            .unwrap_or(0);
                        let expanded = &mut self.state.home.expanded_sections;
                        if !expanded.remove(&index) {
                            expanded.insert(index);
                        }
                    }
                    Some(HomeRow::Question { id, .. }) => {
                        let id = id.clone();
                        self.open_question(&id);
                    }
                    None => {}
                }
            }
            Some(Action::Command) => self.state.command_line.enter(),
            Some(Action::Help) => self.state.screen = Screen::Help,
            _ => {}
        }
        Ok(false)
    }

    /// Open a question by id and switch to the practice screen
    fn open_question(&mut self, id: &str) {
        match self.state.bank.find(id) {
            Some(question) => {
                let question = question.clone();
                self.leave_practice();
                self.state.practice =
                    Some(PracticeState::open(question, &mut self.state.sheet));
                self.state.results = None;
                self.state.screen = Screen::Practice;
                self.state.command_line.clear_message();
            }
            None => {
                self.state.command_line.set_error(format!("No question with id {id:?}"));
            }
        }
    }

    /// Tear down the current practice attempt's timers and audio
    fn leave_practice(&mut self) {
        if let Some(practice) = self.state.practice.as_mut() {
            practice.teardown_audio();
        }
        self.state.practice = None;
        self.speech.cancel();
    }

    fn handle_practice_key(&mut self, key: KeyEvent) -> Result<bool> {
        // Control combinations work on every task, including the ones that
        // capture plain characters as answer text.
        if let Some(action) = control_action(key.code, key.modifiers) {
            return self.handle_practice_action(action);
        }

        if key.code == KeyCode::Esc {
            self.leave_practice();
            self.state.screen = Screen::Home;
            return Ok(false);
        }

        let Some(task) = self.state.practice.as_ref().map(|p| p.question.task()) else {
            return Ok(false);
        };

        match task {
            TaskType::SummarizeWritten
            | TaskType::SummarizeSpoken
            | TaskType::Dictation => self.handle_text_key(key)?,
            TaskType::ChoiceSingle | TaskType::ChoiceMultiple => self.handle_choice_key(key)?,
            TaskType::FillBlanks => self.handle_blanks_key(key)?,
            TaskType::Reorder => self.handle_reorder_key(key)?,
            TaskType::Highlight => self.handle_highlight_key(key)?,
            TaskType::Speaking => {
                if let Some(action) = nav_action(key.code) {
                    return self.handle_practice_action(action);
                }
            }
        }
        Ok(false)
    }

    /// Task-independent practice actions
    fn handle_practice_action(&mut self, action: Action) -> Result<bool> {
        match action {
            Action::Submit | Action::Select => self.submit_practice()?,
            Action::Play => self.play_prompt(),
            Action::Record => self.start_recording(),
            Action::StopRecord => {
                if let Some(seq) =
                    self.state.practice.as_mut().and_then(|p| p.sequencer.as_mut())
                {
                    seq.stop(Instant::now());
                }
            }
            Action::ResetAttempt => self.reset_attempt(),
            Action::Command => self.state.command_line.enter(),
            Action::Help => self.state.screen = Screen::Help,
            _ => {}
        }
        Ok(false)
    }

    /// Free-text tasks: the whole keyboard belongs to the editor
    fn handle_text_key(&mut self, key: KeyEvent) -> Result<()> {
        let Some(practice) = self.state.practice.as_mut() else {
            return Ok(());
        };

        match key.code {
            KeyCode::Char(c) => practice.editor.insert(c),
            KeyCode::Enter => practice.editor.insert('\n'),
            KeyCode::Backspace => practice.editor.backspace(),
            KeyCode::Delete => practice.editor.delete_forward(),
            KeyCode::Left => practice.editor.move_left(),
            KeyCode::Right => practice.editor.move_right(),
            KeyCode::Home => practice.editor.move_start(),
            KeyCode::End => practice.editor.move_end(),
            _ => return Ok(()),
        }

        let id = practice.question.id.clone();
        let text = practice.editor.text.clone();
        self.state.sheet.set(&id, Response::Text { text });
        Ok(())
    }

    fn handle_choice_key(&mut self, key: KeyEvent) -> Result<()> {
        let Some(practice) = self.state.practice.as_mut() else {
            return Ok(());
        };

        let options: Vec<String> = match &practice.question.body {
            TaskBody::ChoiceSingle { options, .. } | TaskBody::ChoiceMultiple { options, .. } => {
                options.clone()
            }
            _ => return Ok(()),
        };
        let multiple = matches!(practice.question.body, TaskBody::ChoiceMultiple { .. });
        let id = practice.question.id.clone();

        match nav_action(key.code) {
            Some(Action::Down) => {
                practice.cursor = (practice.cursor + 1).min(options.len().saturating_sub(1));
            }
            Some(Action::Up) => practice.cursor = practice.cursor.saturating_sub(1),
            Some(Action::Toggle) => {
                let picked = options[practice.cursor].clone();
                match self.state.sheet.get_mut(&id) {
                    Some(Response::Choice { selected }) if !multiple => {
                        // Toggling the same option clears it.
                        *selected =
                            (selected.as_deref() != Some(picked.as_str())).then_some(picked);
                    }
                    Some(Response::Choices { selected }) if multiple => {
                        if !selected.remove(&picked) {
                            selected.insert(picked);
                        }
                    }
                    _ => {}
                }
            }
            Some(Action::Select) => return self.submit_practice(),
            Some(Action::Command) => self.state.command_line.enter(),
            Some(Action::Help) => self.state.screen = Screen::Help,
            _ => {}
        }
        Ok(())
    }

    fn handle_blanks_key(&mut self, key: KeyEvent) -> Result<()> {
        let Some(practice) = self.state.practice.as_mut() else {
            return Ok(());
        };

        let blanks = match &practice.question.body {
            TaskBody::Blanks { blanks, .. } => blanks.clone(),
            _ => return Ok(()),
        };
        let id = practice.question.id.clone();
        let cursor = practice.cursor;

        match key.code {
            KeyCode::Tab => {
                practice.cursor = (cursor + 1) % blanks.len();
            }
            KeyCode::BackTab => {
                practice.cursor = cursor.checked_sub(1).unwrap_or(blanks.len() - 1);
            }
            KeyCode::Enter => return self.submit_practice(),
            KeyCode::Up | KeyCode::Down => {
                // Blanks with an option list cycle; typed blanks ignore.
                let options = &blanks[cursor].options;
                if options.is_empty() {
                    return Ok(());
                }
                if let Some(Response::Blanks { values }) = self.state.sheet.get_mut(&id) {
                    if let Some(value) = values.get_mut(cursor) {
                        let current = options.iter().position(|o| o == value);
                        let next = match (current, key.code) {
                            (None, _) => 0,
                            (Some(i), KeyCode::Down) => (i + 1) % options.len(),
                            (Some(i), _) => i.checked_sub(1).unwrap_or(options.len() - 1),
                        };
                        *value = options[next].clone();
                    }
                }
            }
            KeyCode::Backspace => {
                if let Some(Response::Blanks { values }) = self.state.sheet.get_mut(&id) {
                    if let Some(value) = values.get_mut(cursor) {
                        value.pop();
                    }
                }
            }
            KeyCode::Char(c) => {
                if blanks[cursor].options.is_empty() {
                    if let Some(Response::Blanks { values }) = self.state.sheet.get_mut(&id) {
                        if let Some(value) = values.get_mut(cursor) {
                            value.push(c);
                        }
                    }
                }
            }
            _ => {}
        }
        Ok(())
    }

    fn handle_reorder_key(&mut self, key: KeyEvent) -> Result<()> {
        let Some(practice) = self.state.practice.as_mut() else {
            return Ok(());
        };
        let id = practice.question.id.clone();

        let len = match self.state.sheet.get(&id) {
            Some(Response::Order { arrangement }) => arrangement.len(),
            _ => return Ok(()),
        };
        if len == 0 {
            return Ok(());
        }

        match nav_action(key.code) {
            Some(Action::Down) => {
                let next = (practice.cursor + 1).min(len - 1);
                if practice.grabbed && next != practice.cursor {
                    if let Some(Response::Order { arrangement }) = self.state.sheet.get_mut(&id) {
                        arrangement.swap(practice.cursor, next);
                    }
                }
                practice.cursor = next;
            }
            Some(Action::Up) => {
                let next = practice.cursor.saturating_sub(1);
                if practice.grabbed && next != practice.cursor {
                    if let Some(Response::Order { arrangement }) = self.state.sheet.get_mut(&id) {
                        arrangement.swap(practice.cursor, next);
                    }
                }
                practice.cursor = next;
            }
            Some(Action::Toggle) => practice.grabbed = !practice.grabbed,
            Some(Action::Select) => return self.submit_practice(),
            Some(Action::Command) => self.state.command_line.enter(),
            Some(Action::Help) => self.state.screen = Screen::Help,
            _ => {}
        }
        Ok(())
    }

    fn handle_highlight_key(&mut self, key: KeyEvent) -> Result<()> {
        let Some(practice) = self.state.practice.as_mut() else {
            return Ok(());
        };

        let word_count = match &practice.question.body {
            TaskBody::Highlight { transcript, .. } => transcript.len(),
            _ => return Ok(()),
        };
        let id = practice.question.id.clone();

        match nav_action(key.code) {
            Some(Action::Right) => {
                practice.cursor = (practice.cursor + 1).min(word_count.saturating_sub(1));
            }
            Some(Action::Left) => practice.cursor = practice.cursor.saturating_sub(1),
            Some(Action::Top) => practice.cursor = 0,
            Some(Action::Bottom) => practice.cursor = word_count.saturating_sub(1),
            Some(Action::Toggle) => {
                let cursor = practice.cursor;
                if let Some(Response::Flags { indices }) = self.state.sheet.get_mut(&id) {
                    if !indices.remove(&cursor) {
                        indices.insert(cursor);
                    }
                }
            }
            Some(Action::Play) => self.play_prompt(),
            Some(Action::Select) => return self.submit_practice(),
            Some(Action::Command) => self.state.command_line.enter(),
            Some(Action::Help) => self.state.screen = Screen::Help,
            _ => {}
        }
        Ok(())
    }

    /// Speak the audio part of the current question, cancelling any
    /// utterance already in flight
    fn play_prompt(&mut self) {
        let Some(practice) = self.state.practice.as_ref() else {
            return;
        };

        let text = match &practice.question.body {
            TaskBody::Summary { passage, spoken: true, .. } => Some(passage.clone()),
            TaskBody::Highlight { spoken, .. } => Some(spoken.clone()),
            TaskBody::Dictation { sentence } => Some(sentence.clone()),
            TaskBody::Speaking { prompt, .. } => Some(prompt.clone()),
            _ => None,
        };

        match text {
            Some(text) => {
                let mut utterance = Utterance::new(text).with_rate(self.config.speech_rate);
                utterance.voice = self.config.speech_voice.clone();
                self.speech.speak(utterance);
            }
            None => self.state.command_line.set_message("Nothing to play for this task"),
        }
    }

    /// Start the countdown/recording sequence for a speaking task
    fn start_recording(&mut self) {
        if !self.config.microphone_allowed {
            // Permission failures abort back to idle with a notice.
            self.state.command_line.set_error(AudioError::PermissionDenied.to_string());
            return;
        }

        let config = self.config.clone();
        let Some(practice) = self.state.practice.as_mut() else {
            return;
        };
        let Some(seq_config) = practice.sequencer_config(&config) else {
            self.state.command_line.set_message("This task has no recording stage");
            return;
        };

        if practice.sequencer.as_ref().is_some_and(|s| !matches!(s.phase(), Phase::Idle)) {
            return; // already running or finished; reset first
        }

        let mut sequencer = RecordingSequencer::new(seq_config);
        sequencer.start(Instant::now());

        // The practice mock has no real capture device: a scripted level
        // envelope stands in for the microphone.
        let microphone = if seq_config.reflex {
            ScriptedMicrophone::voiced_after(Duration::from_millis(1200))
        } else {
            ScriptedMicrophone::with_pause(Duration::from_secs(6)..Duration::from_secs(8))
        };

        practice.sequencer = Some(sequencer);
        practice.levels = Some(spawn_sampler(microphone));
    }

    /// Explicit full reset of a speaking attempt back to idle
    fn reset_attempt(&mut self) {
        let Some(practice) = self.state.practice.as_mut() else {
            return;
        };
        practice.teardown_audio();
        let id = practice.question.id.clone();
        self.state.sheet.set(&id, Response::Spoken { outcome: None });
        self.state.command_line.set_message("Attempt reset");
    }

    /// Score the current response, record the attempt, and show results
    fn submit_practice(&mut self) -> Result<()> {
        // An in-flight recording must be stopped (or fail) before the
        // attempt can be scored.
        if let Some(practice) = self.state.practice.as_ref() {
            if practice
                .sequencer
                .as_ref()
                .is_some_and(|s| matches!(s.phase(), Phase::Preparing | Phase::Recording))
            {
                self.state.command_line.set_message("Recording in progress - press s to stop");
                return Ok(());
            }
        }

        let Some(mut practice) = self.state.practice.take() else {
            return Ok(());
        };
        practice.teardown_audio();
        self.speech.cancel();

        let question = practice.question;
        let response = self
            .state
            .sheet
            .get(&question.id)
            .cloned()
            .unwrap_or_else(|| Response::empty_for(&question.body));

        let score = scoring::score(&question, &response);
        let marks = feedback::marks(&question, &response);

        let mut attempt =
            AttemptRecord::new(&question.id, question.task(), score.points(), score.max());
        if let Response::Spoken { outcome } = &response {
            match outcome {
                Some(SpokenOutcome::Completed { reaction_ms, .. }) => {
                    attempt.reaction_ms = *reaction_ms;
                }
                Some(SpokenOutcome::NoSpeech) => attempt.failure = Some(AttemptFailure::NoSpeech),
                Some(SpokenOutcome::Silence) => attempt.failure = Some(AttemptFailure::Silence),
                None => {}
            }
        }

        if let Err(e) = progress::record_attempt(
            &mut self.store,
            &mut self.state.history,
            &mut self.state.progress,
            attempt,
        ) {
            self.state.command_line.set_error(format!("Could not save attempt: {e}"));
        }

        self.state.results = Some(ResultsState { question, response, score, marks });
        self.state.screen = Screen::Results;
        Ok(())
    }

    fn handle_results_key(&mut self, key: KeyEvent) -> Result<bool> {
        match nav_action(key.code) {
            Some(Action::Select) => {
                // Retry: discard the response and reopen the question.
                if let Some(results) = self.state.results.take() {
                    self.state.sheet.reset(&results.question.id);
                    let id = results.question.id.clone();
                    self.open_question(&id);
                }
            }
            Some(Action::Back) => {
                self.state.results = None;
                self.state.screen = Screen::Home;
            }
            Some(Action::Copy) => self.copy_feedback(),
            Some(Action::Command) => self.state.command_line.enter(),
            Some(Action::Help) => self.state.screen = Screen::Help,
            _ => {}
        }
        Ok(false)
    }

    /// Copy the score summary and feedback lines to the system clipboard
    fn copy_feedback(&mut self) {
        let Some(results) = self.state.results.as_ref() else {
            return;
        };

        let mut lines = vec![format!(
            "{}: {}/{}",
            results.question.title,
            results.score.points(),
            results.score.max()
        )];
        lines.extend(results.score.feedback.iter().cloned());
        let text = lines.join("\n");

        match arboard::Clipboard::new().and_then(|mut clipboard| clipboard.set_text(text)) {
            Ok(()) => self.state.command_line.set_message("Feedback copied to clipboard"),
            Err(e) => self.state.command_line.set_error(format!("Clipboard unavailable: {e}")),
        }
    }
}

impl Drop for App {
    fn drop(&mut self) {
        let _ = self.restore_terminal();
    }
}
