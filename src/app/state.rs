//! Application state definitions

use std::collections::HashSet;
use std::time::Instant;

use rand::seq::SliceRandom;
use tokio::sync::mpsc::Receiver;

use crate::audio::{LevelFrame, RecordingSequencer, SequencerConfig};
use crate::bank::{AnswerSheet, Question, QuestionBank, Response, SectionKind, TaskBody, TaskType};
use crate::config::Config;
use crate::scoring::Score;
use crate::scoring::feedback::Marks;
use crate::store::profile::UserProfile;
use crate::store::progress::{History, Progress};

/// Which screen is currently displayed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Screen {
    #[default]
    Landing,
    Home,
    Practice,
    Results,
    Help,
}

/// A row in the home screen's section tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HomeRow {
    /// Section header with its question count
    Section(SectionKind, usize),
    /// One question inside an expanded section
    Question { id: String, title: String, task: TaskType },
}

/// Flatten the bank into visible home rows for the given expansion state
pub fn home_rows(bank: &QuestionBank, expanded: &HashSet<usize>) -> Vec<HomeRow> {
    let mut rows = Vec::new();
    for (index, section) in SectionKind::all().into_iter().enumerate() {
        let questions = bank.by_section(section);
        rows.push(HomeRow::Section(section, questions.len()));
        if expanded.contains(&index) {
            for q in questions {
                rows.push(HomeRow::Question {
                    id: q.id.clone(),
                    title: q.title.clone(),
                    task: q.task(),
                });
            }
        }
    }
    rows
}

/// State for the home screen's section tree
#[derive(Debug, Clone)]
pub struct HomeState {
    /// Currently selected row (flat index)
    pub selected_index: usize,
    /// Which section indices are expanded
    pub expanded_sections: HashSet<usize>,
    /// Scroll offset for long banks
    pub scroll_offset: usize,
    /// Visible height in rows (updated on render)
    pub visible_height: usize,
}

impl Default for HomeState {
    fn default() -> Self {
        // Sections start expanded; the sample bank is small.
        Self {
            selected_index: 0,
            expanded_sections: (0..SectionKind::all().len()).collect(),
            scroll_offset: 0,
            visible_height: 0,
        }
    }
}

impl HomeState {
    /// Ensure the selected row is visible by adjusting scroll offset
    pub fn ensure_selection_visible(&mut self) {
        if self.selected_index < self.scroll_offset {
            self.scroll_offset = self.selected_index;
        }
        let visible = self.visible_height.saturating_sub(2);
        if visible > 0 && self.selected_index >= self.scroll_offset + visible {
            self.scroll_offset = self.selected_index.saturating_sub(visible) + 1;
        }
    }
}

/// A minimal character-indexed text editor shared by free-text answers and
/// the command line
#[derive(Debug, Clone, Default)]
pub struct TextEditor {
    pub text: String,
    /// Cursor position as a character index
    pub cursor: usize,
}

impl TextEditor {
    fn char_to_byte_index(&self, char_idx: usize) -> usize {
        self.text.char_indices().nth(char_idx).map(|(i, _)| i).unwrap_or(self.text.len())
    }

    pub fn char_count(&self) -> usize {
        self.text.chars().count()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    pub fn insert(&mut self, c: char) {
        let byte_idx = self.char_to_byte_index(self.cursor);
        self.text.insert(byte_idx, c);
        self.cursor += 1;
    }

    pub fn backspace(&mut self) {
        if self.cursor > 0 {
            self.cursor -= 1;
            let byte_idx = self.char_to_byte_index(self.cursor);
            self.text.remove(byte_idx);
        }
    }

    pub fn delete_forward(&mut self) {
        if self.cursor < self.char_count() {
            let byte_idx = self.char_to_byte_index(self.cursor);
            self.text.remove(byte_idx);
        }
    }

    pub fn move_left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn move_right(&mut self) {
        if self.cursor < self.char_count() {
            self.cursor += 1;
        }
    }

    pub fn move_start(&mut self) {
        self.cursor = 0;
    }

    pub fn move_end(&mut self) {
        self.cursor = self.char_count();
    }

    pub fn clear(&mut self) {
        self.text.clear();
        self.cursor = 0;
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
        self.cursor = self.char_count();
    }
}

/// State for the bottom command/status line
#[derive(Debug, Clone, Default)]
pub struct CommandLine {
    /// Whether `:` command input is active
    pub active: bool,
    /// Command input buffer
    pub editor: TextEditor,
    /// Status/error message shown when input is inactive
    pub message: Option<String>,
    /// Whether the message is an error
    pub is_error: bool,
}

impl CommandLine {
    pub fn enter(&mut self) {
        self.active = true;
        self.editor.clear();
        self.message = None;
    }

    pub fn exit(&mut self) {
        self.active = false;
        self.editor.clear();
    }

    pub fn set_message(&mut self, msg: impl Into<String>) {
        self.message = Some(msg.into());
        self.is_error = false;
    }

    pub fn set_error(&mut self, msg: impl Into<String>) {
        self.message = Some(msg.into());
        self.is_error = true;
    }

    pub fn clear_message(&mut self) {
        self.message = None;
    }

    /// Text to render on the bottom line
    pub fn display_text(&self) -> String {
        if self.active {
            format!(":{}", self.editor.text)
        } else {
            self.message.clone().unwrap_or_default()
        }
    }
}

/// In-flight practice attempt
#[derive(Debug)]
pub struct PracticeState {
    /// The question being practiced (cloned out of the bank)
    pub question: Question,
    /// Cursor over options/blanks/words/paragraph slots
    pub cursor: usize,
    /// Re-order move mode: the selected paragraph travels with j/k
    pub grabbed: bool,
    /// Editor for free-text responses
    pub editor: TextEditor,
    /// Recording state machine for speaking tasks
    pub sequencer: Option<RecordingSequencer>,
    /// Live level frames from the sampler task; dropping this receiver
    /// cancels the producer
    pub levels: Option<Receiver<LevelFrame>>,
    /// Most recent input level, for the meter
    pub last_level: f32,
}

impl PracticeState {
    /// Open a question: seed the sheet with an empty (or, for re-order,
    /// shuffled) response
    pub fn open(question: Question, sheet: &mut AnswerSheet) -> Self {
        sheet.open(&question);

        if let TaskBody::Reorder { paragraphs, order } = &question.body {
            let mut arrangement: Vec<String> = paragraphs.iter().map(|p| p.id.clone()).collect();
            let mut rng = rand::rng();
            // Present a shuffle that differs from the canonical order.
            loop {
                arrangement.shuffle(&mut rng);
                if arrangement != *order || paragraphs.len() < 2 {
                    break;
                }
            }
            sheet.set(&question.id, Response::Order { arrangement });
        }

        let mut editor = TextEditor::default();
        if let Some(Response::Text { text }) = sheet.get(&question.id) {
            editor.set_text(text.clone());
        }

        Self {
            question,
            cursor: 0,
            grabbed: false,
            editor,
            sequencer: None,
            levels: None,
            last_level: 0.0,
        }
    }

    /// Sequencer configuration for this question under the app config
    pub fn sequencer_config(&self, config: &Config) -> Option<SequencerConfig> {
        match &self.question.body {
            TaskBody::Speaking { prepare_secs, record_secs, reflex, .. } => {
                Some(SequencerConfig {
                    prepare: std::time::Duration::from_secs(*prepare_secs),
                    record: std::time::Duration::from_secs(*record_secs),
                    reflex: *reflex,
                    voice_threshold: config.voice_threshold,
                    silence_window: std::time::Duration::from_secs_f32(
                        config.silence_window_secs,
                    ),
                })
            }
            _ => None,
        }
    }

    /// Drop timers, the sampler channel, and any captured audio
    pub fn teardown_audio(&mut self) {
        self.levels = None; // closes the channel; the producer exits
        if let Some(seq) = &mut self.sequencer {
            seq.reset();
        }
        self.sequencer = None;
        self.last_level = 0.0;
    }
}

/// Scored submission ready for display
#[derive(Debug)]
pub struct ResultsState {
    pub question: Question,
    pub response: Response,
    pub score: Score,
    pub marks: Marks,
}

/// State for the landing animation: an equaliser bar wave that sweeps in,
/// then the title
#[derive(Debug, Clone)]
pub struct LandingAnimation {
    /// When the animation started
    pub start_time: Instant,

    /// Current animation frame (50ms per frame)
    pub current_frame: usize,

    /// Whether animation is complete (ready for input)
    pub complete: bool,
}

impl Default for LandingAnimation {
    fn default() -> Self {
        Self { start_time: Instant::now(), current_frame: 0, complete: false }
    }
}

impl LandingAnimation {
    /// Frame timing constants
    pub const MS_PER_FRAME: u128 = 50;
    pub const WAVE_END_FRAME: usize = 26;
    pub const TITLE_END_FRAME: usize = 46;
    pub const TAGLINE_END_FRAME: usize = 56;

    /// Advance the animation based on elapsed time
    pub fn tick(&mut self) {
        let elapsed_ms = self.start_time.elapsed().as_millis();
        self.current_frame = (elapsed_ms / Self::MS_PER_FRAME) as usize;
        self.complete = self.current_frame >= Self::TAGLINE_END_FRAME;
    }

    /// How much of the wave should be drawn (0.0 to 1.0)
    pub fn wave_progress(&self) -> f32 {
        if self.current_frame >= Self::WAVE_END_FRAME {
            1.0
        } else {
            self.current_frame as f32 / Self::WAVE_END_FRAME as f32
        }
    }

    /// How many characters of the title to show
    pub fn title_chars(&self, title_len: usize) -> usize {
        if self.current_frame < Self::WAVE_END_FRAME {
            0
        } else if self.current_frame >= Self::TITLE_END_FRAME {
            title_len
        } else {
            let span = (Self::TITLE_END_FRAME - Self::WAVE_END_FRAME) as f32;
            let text_frame = (self.current_frame - Self::WAVE_END_FRAME) as f32;
            ((text_frame / span) * title_len as f32).min(title_len as f32) as usize
        }
    }

    /// Whether to show the tagline
    pub fn show_tagline(&self) -> bool {
        self.current_frame >= Self::TITLE_END_FRAME
    }
}

/// Full application state
#[derive(Debug)]
pub struct AppState {
    /// Current screen
    pub screen: Screen,

    /// Landing animation state
    pub landing: LandingAnimation,

    /// Loaded question bank
    pub bank: QuestionBank,

    /// In-progress responses
    pub sheet: AnswerSheet,

    /// Home screen browser state
    pub home: HomeState,

    /// Active practice attempt, when on the practice screen
    pub practice: Option<PracticeState>,

    /// Scored submission, when on the results screen
    pub results: Option<ResultsState>,

    /// Bottom command/status line
    pub command_line: CommandLine,

    /// Signed-in profile, if any
    pub profile: Option<UserProfile>,

    /// Per-task aggregates
    pub progress: Progress,

    /// Chronological attempts
    pub history: History,
}

impl AppState {
    pub fn new(
        bank: QuestionBank,
        profile: Option<UserProfile>,
        history: History,
        progress: Progress,
    ) -> Self {
        Self {
            screen: Screen::Landing,
            landing: LandingAnimation::default(),
            bank,
            sheet: AnswerSheet::default(),
            home: HomeState::default(),
            practice: None,
            results: None,
            command_line: CommandLine::default(),
            profile,
            progress,
            history,
        }
    }
}
