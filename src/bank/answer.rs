//! Learner responses
//!
//! A [`Response`] mirrors the answer shape of one task variant, and an
//! [`AnswerSheet`] holds the in-progress response per question id. Sheets
//! are created empty when a question opens, mutated on every input event,
//! and discarded when the question resets. A response is only ever
//! compared against its own question's answer key.

use std::collections::{BTreeSet, HashMap};

use serde::{Deserialize, Serialize};

use super::model::{Question, TaskBody};

/// Terminal outcome of a timed speaking attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum SpokenOutcome {
    /// Recording ran to completion or was stopped manually
    Completed {
        /// Recorded length in milliseconds
        duration_ms: u64,
        /// Reaction time for reflex tasks
        reaction_ms: Option<u64>,
    },
    /// Countdown elapsed without a voiced sample (reflex tasks)
    NoSpeech,
    /// Input stayed below the voice threshold for the silence window
    Silence,
}

/// A learner's response to one question
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Response {
    /// Free text (summaries, dictation)
    Text { text: String },
    /// Selected option, if any
    Choice { selected: Option<String> },
    /// Selected option set
    Choices { selected: BTreeSet<String> },
    /// One value per blank, positionally
    Blanks { values: Vec<String> },
    /// Paragraph ids in the learner's arrangement
    Order { arrangement: Vec<String> },
    /// Flagged word indices
    Flags { indices: BTreeSet<usize> },
    /// Speaking attempt outcome, present once the attempt ends
    Spoken { outcome: Option<SpokenOutcome> },
}

impl Response {
    /// The empty response for a question's task shape
    pub fn empty_for(body: &TaskBody) -> Self {
        match body {
            TaskBody::Summary { .. } | TaskBody::Dictation { .. } => {
                Response::Text { text: String::new() }
            }
            TaskBody::ChoiceSingle { .. } => Response::Choice { selected: None },
            TaskBody::ChoiceMultiple { .. } => Response::Choices { selected: BTreeSet::new() },
            TaskBody::Blanks { blanks, .. } => {
                Response::Blanks { values: vec![String::new(); blanks.len()] }
            }
            TaskBody::Reorder { .. } => Response::Order { arrangement: Vec::new() },
            TaskBody::Highlight { .. } => Response::Flags { indices: BTreeSet::new() },
            TaskBody::Speaking { .. } => Response::Spoken { outcome: None },
        }
    }

    /// Whether nothing has been answered yet
    pub fn is_empty(&self) -> bool {
        match self {
            Response::Text { text } => text.trim().is_empty(),
            Response::Choice { selected } => selected.is_none(),
            Response::Choices { selected } => selected.is_empty(),
            Response::Blanks { values } => values.iter().all(|v| v.trim().is_empty()),
            Response::Order { arrangement } => arrangement.is_empty(),
            Response::Flags { indices } => indices.is_empty(),
            Response::Spoken { outcome } => outcome.is_none(),
        }
    }
}

/// In-progress responses, keyed by question id
#[derive(Debug, Clone, Default)]
pub struct AnswerSheet {
    responses: HashMap<String, Response>,
}

impl AnswerSheet {
    /// Open a question: insert its empty response if absent
    pub fn open(&mut self, question: &Question) -> &mut Response {
        self.responses
            .entry(question.id.clone())
            .or_insert_with(|| Response::empty_for(&question.body))
    }

    /// Replace the response for a question outright
    pub fn set(&mut self, question_id: &str, response: Response) {
        self.responses.insert(question_id.to_string(), response);
    }

    /// The current response for a question, if opened
    pub fn get(&self, question_id: &str) -> Option<&Response> {
        self.responses.get(question_id)
    }

    /// Mutable access for input handlers
    pub fn get_mut(&mut self, question_id: &str) -> Option<&mut Response> {
        self.responses.get_mut(question_id)
    }

    /// Discard the response for a question (full reset)
    pub fn reset(&mut self, question_id: &str) {
        self.responses.remove(question_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bank::model::{Blank, SectionKind};

    fn blank_question() -> Question {
        Question {
            id: "fib-1".into(),
            title: "Blanks".into(),
            section: SectionKind::Reading,
            body: TaskBody::Blanks {
                segments: vec!["The ".into(), " sat.".into()],
                blanks: vec![Blank { correct: "cat".into(), options: vec![] }],
            },
        }
    }

    #[test]
    fn open_creates_shape_matched_empty_response() {
        let mut sheet = AnswerSheet::default();
        let response = sheet.open(&blank_question());
        assert_eq!(response, &Response::Blanks { values: vec![String::new()] });
        assert!(response.is_empty());
    }

    #[test]
    fn open_does_not_clobber_existing_response() {
        let q = blank_question();
        let mut sheet = AnswerSheet::default();
        sheet.set(&q.id, Response::Blanks { values: vec!["cat".into()] });
        let response = sheet.open(&q);
        assert_eq!(response, &Response::Blanks { values: vec!["cat".into()] });
    }

    #[test]
    fn reset_discards_the_response() {
        let q = blank_question();
        let mut sheet = AnswerSheet::default();
        sheet.open(&q);
        sheet.reset(&q.id);
        assert!(sheet.get(&q.id).is_none());
    }

    #[test]
    fn whitespace_only_text_is_empty() {
        let response = Response::Text { text: "   \n ".into() };
        assert!(response.is_empty());
    }
}
