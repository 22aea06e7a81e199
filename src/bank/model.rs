//! Question model for practice banks
//!
//! Every practice item is a [`Question`]: common metadata plus a
//! [`TaskBody`] variant for the task type. The body carries the correct
//! answer in whatever shape that task needs (a string, a set, an ordered
//! list, an index list, or a per-blank list), and [`Question::validate`]
//! rejects items whose key does not match the variant's shape before they
//! reach a bank.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Exam section a question belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionKind {
    Speaking,
    Writing,
    Reading,
    Listening,
}

impl SectionKind {
    /// Display label
    pub fn label(&self) -> &'static str {
        match self {
            SectionKind::Speaking => "Speaking",
            SectionKind::Writing => "Writing",
            SectionKind::Reading => "Reading",
            SectionKind::Listening => "Listening",
        }
    }

    /// All sections in exam order
    pub fn all() -> [SectionKind; 4] {
        [SectionKind::Speaking, SectionKind::Writing, SectionKind::Reading, SectionKind::Listening]
    }
}

/// Task type, used for history records and scoring dispatch labels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskType {
    SummarizeWritten,
    SummarizeSpoken,
    ChoiceSingle,
    ChoiceMultiple,
    FillBlanks,
    Reorder,
    Highlight,
    Dictation,
    Speaking,
}

impl TaskType {
    /// Display label
    pub fn label(&self) -> &'static str {
        match self {
            TaskType::SummarizeWritten => "Summarize Written Text",
            TaskType::SummarizeSpoken => "Summarize Spoken Text",
            TaskType::ChoiceSingle => "Multiple Choice, Single Answer",
            TaskType::ChoiceMultiple => "Multiple Choice, Multiple Answers",
            TaskType::FillBlanks => "Fill in the Blanks",
            TaskType::Reorder => "Re-order Paragraphs",
            TaskType::Highlight => "Highlight Incorrect Words",
            TaskType::Dictation => "Write from Dictation",
            TaskType::Speaking => "Speaking",
        }
    }
}

/// Inclusive word-count limit for free-text tasks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordLimit {
    pub min: usize,
    pub max: usize,
}

impl WordLimit {
    /// Whether `count` falls inside the limit
    pub fn contains(&self, count: usize) -> bool {
        (self.min..=self.max).contains(&count)
    }
}

/// A single blank in a fill-in-the-blanks question
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Blank {
    /// The correct token for this blank
    pub correct: String,
    /// Choices offered for this blank; empty means the learner types freely
    #[serde(default)]
    pub options: Vec<String>,
}

/// A paragraph in a re-order question
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Paragraph {
    /// Stable identifier, unique within the question
    pub id: String,
    /// Paragraph text
    pub text: String,
}

/// Task-specific content and answer key
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "task", rename_all = "snake_case")]
pub enum TaskBody {
    /// Summarize written or spoken text (SWT/SST)
    Summary {
        /// Source passage; read by the learner, or played aloud when `spoken`
        passage: String,
        /// Keywords the summary is scored against
        keywords: Vec<String>,
        /// Inclusive word-count limit for the response
        limit: WordLimit,
        /// The response must be exactly one sentence
        single_sentence: bool,
        /// The passage is delivered as audio rather than text
        spoken: bool,
    },
    /// Multiple choice, single answer
    ChoiceSingle {
        prompt: String,
        /// Optional reading passage shown above the prompt
        #[serde(default)]
        passage: Option<String>,
        options: Vec<String>,
        correct: String,
    },
    /// Multiple choice, multiple answers
    ChoiceMultiple {
        prompt: String,
        #[serde(default)]
        passage: Option<String>,
        options: Vec<String>,
        correct: Vec<String>,
    },
    /// Fill in the blanks: text segments interleaved with blanks
    Blanks {
        /// `segments.len() == blanks.len() + 1`; blank i sits between
        /// segments i and i+1
        segments: Vec<String>,
        blanks: Vec<Blank>,
    },
    /// Re-order paragraphs
    Reorder {
        paragraphs: Vec<Paragraph>,
        /// Canonical order as a permutation of paragraph ids
        order: Vec<String>,
    },
    /// Highlight incorrect words: the transcript differs from the audio
    Highlight {
        /// What the audio actually says
        spoken: String,
        /// Displayed transcript, word by word
        transcript: Vec<String>,
        /// Indices into `transcript` that differ from the audio
        errors: Vec<usize>,
    },
    /// Write from dictation
    Dictation {
        /// The sentence played to the learner
        sentence: String,
    },
    /// Timed speaking prompt (read aloud, repeat sentence, short answer)
    Speaking {
        prompt: String,
        /// Preparation countdown in seconds
        prepare_secs: u64,
        /// Maximum recording length in seconds
        record_secs: u64,
        /// Reflex task: recording starts on the first voiced sample and
        /// the reaction time is kept
        reflex: bool,
    },
}

/// A single practice question
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    /// Unique identifier within a bank
    pub id: String,
    /// Short display title
    pub title: String,
    /// Exam section
    pub section: SectionKind,
    /// Task content and answer key
    pub body: TaskBody,
}

/// Errors raised while validating or loading questions
#[derive(Debug, Error)]
pub enum BankError {
    #[error("question {id}: {reason}")]
    Invalid { id: String, reason: String },

    #[error("failed to read bank file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse bank file {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

impl Question {
    /// The task type of this question
    pub fn task(&self) -> TaskType {
        match &self.body {
            TaskBody::Summary { spoken: false, .. } => TaskType::SummarizeWritten,
            TaskBody::Summary { spoken: true, .. } => TaskType::SummarizeSpoken,
            TaskBody::ChoiceSingle { .. } => TaskType::ChoiceSingle,
            TaskBody::ChoiceMultiple { .. } => TaskType::ChoiceMultiple,
            TaskBody::Blanks { .. } => TaskType::FillBlanks,
            TaskBody::Reorder { .. } => TaskType::Reorder,
            TaskBody::Highlight { .. } => TaskType::Highlight,
            TaskBody::Dictation { .. } => TaskType::Dictation,
            TaskBody::Speaking { .. } => TaskType::Speaking,
        }
    }

    /// Check that the answer key matches the variant's expected shape
    pub fn validate(&self) -> Result<(), BankError> {
        let fail = |reason: String| {
            Err(BankError::Invalid { id: self.id.clone(), reason })
        };

        if self.id.trim().is_empty() {
            return Err(BankError::Invalid {
                id: "<unnamed>".into(),
                reason: "empty question id".into(),
            });
        }

        match &self.body {
            TaskBody::Summary { passage, keywords, limit, .. } => {
                if passage.trim().is_empty() {
                    return fail("empty passage".into());
                }
                if keywords.is_empty() {
                    return fail("no scoring keywords".into());
                }
                if limit.min > limit.max {
                    return fail(format!("word limit {}..{} is inverted", limit.min, limit.max));
                }
            }
            TaskBody::ChoiceSingle { options, correct, .. } => {
                if options.len() < 2 {
                    return fail("fewer than two options".into());
                }
                if !options.contains(correct) {
                    return fail(format!("correct option {correct:?} is not offered"));
                }
            }
            TaskBody::ChoiceMultiple { options, correct, .. } => {
                if options.len() < 2 {
                    return fail("fewer than two options".into());
                }
                if correct.is_empty() {
                    return fail("no correct options".into());
                }
                for c in correct {
                    if !options.contains(c) {
                        return fail(format!("correct option {c:?} is not offered"));
                    }
                }
                let distinct: HashSet<&String> = correct.iter().collect();
                if distinct.len() != correct.len() {
                    return fail("duplicate correct options".into());
                }
            }
            TaskBody::Blanks { segments, blanks } => {
                if blanks.is_empty() {
                    return fail("no blanks".into());
                }
                if segments.len() != blanks.len() + 1 {
                    return fail(format!(
                        "{} segments for {} blanks (want blanks + 1)",
                        segments.len(),
                        blanks.len()
                    ));
                }
                for (i, blank) in blanks.iter().enumerate() {
                    if blank.correct.trim().is_empty() {
                        return fail(format!("blank {i} has an empty answer"));
                    }
                    if !blank.options.is_empty() && !blank.options.contains(&blank.correct) {
                        return fail(format!("blank {i} answer is not among its options"));
                    }
                }
            }
            TaskBody::Reorder { paragraphs, order } => {
                if paragraphs.len() < 2 {
                    return fail("fewer than two paragraphs".into());
                }
                let ids: HashSet<&String> = paragraphs.iter().map(|p| &p.id).collect();
                if ids.len() != paragraphs.len() {
                    return fail("duplicate paragraph ids".into());
                }
                let ordered: HashSet<&String> = order.iter().collect();
                if order.len() != paragraphs.len() || ordered != ids {
                    return fail("order is not a permutation of the paragraph ids".into());
                }
            }
            TaskBody::Highlight { spoken, transcript, errors } => {
                if spoken.trim().is_empty() {
                    return fail("empty audio text".into());
                }
                if transcript.is_empty() {
                    return fail("empty transcript".into());
                }
                if errors.is_empty() {
                    return fail("no error indices".into());
                }
                let distinct: HashSet<&usize> = errors.iter().collect();
                if distinct.len() != errors.len() {
                    return fail("duplicate error indices".into());
                }
                if let Some(out) = errors.iter().find(|&&i| i >= transcript.len()) {
                    return fail(format!(
                        "error index {out} out of range for {} words",
                        transcript.len()
                    ));
                }
            }
            TaskBody::Dictation { sentence } => {
                if sentence.trim().is_empty() {
                    return fail("empty sentence".into());
                }
            }
            TaskBody::Speaking { prompt, record_secs, .. } => {
                if prompt.trim().is_empty() {
                    return fail("empty prompt".into());
                }
                if *record_secs == 0 {
                    return fail("zero recording length".into());
                }
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn question(body: TaskBody) -> Question {
        Question { id: "q1".into(), title: "Test".into(), section: SectionKind::Reading, body }
    }

    #[test]
    fn choice_single_rejects_unoffered_answer() {
        let q = question(TaskBody::ChoiceSingle {
            prompt: "Pick one".into(),
            passage: None,
            options: vec!["a".into(), "b".into()],
            correct: "c".into(),
        });
        assert!(q.validate().is_err());
    }

    #[test]
    fn choice_multiple_requires_subset() {
        let ok = question(TaskBody::ChoiceMultiple {
            prompt: "Pick several".into(),
            passage: None,
            options: vec!["a".into(), "b".into(), "c".into()],
            correct: vec!["a".into(), "c".into()],
        });
        assert!(ok.validate().is_ok());

        let bad = question(TaskBody::ChoiceMultiple {
            prompt: "Pick several".into(),
            passage: None,
            options: vec!["a".into(), "b".into()],
            correct: vec!["a".into(), "z".into()],
        });
        assert!(bad.validate().is_err());
    }

    #[test]
    fn blanks_require_one_more_segment() {
        let ok = question(TaskBody::Blanks {
            segments: vec!["The ".into(), " sat on the ".into(), ".".into()],
            blanks: vec![
                Blank { correct: "cat".into(), options: vec![] },
                Blank { correct: "mat".into(), options: vec![] },
            ],
        });
        assert!(ok.validate().is_ok());

        let bad = question(TaskBody::Blanks {
            segments: vec!["The ".into()],
            blanks: vec![Blank { correct: "cat".into(), options: vec![] }],
        });
        assert!(bad.validate().is_err());
    }

    #[test]
    fn reorder_order_must_be_permutation() {
        let paragraphs = vec![
            Paragraph { id: "a".into(), text: "A".into() },
            Paragraph { id: "b".into(), text: "B".into() },
        ];

        let ok = question(TaskBody::Reorder {
            paragraphs: paragraphs.clone(),
            order: vec!["b".into(), "a".into()],
        });
        assert!(ok.validate().is_ok());

        let bad = question(TaskBody::Reorder {
            paragraphs,
            order: vec!["a".into(), "a".into()],
        });
        assert!(bad.validate().is_err());
    }

    #[test]
    fn highlight_indices_must_be_in_range() {
        let bad = question(TaskBody::Highlight {
            spoken: "the quick fox".into(),
            transcript: vec!["the".into(), "quick".into(), "fox".into()],
            errors: vec![5],
        });
        assert!(bad.validate().is_err());
    }

    #[test]
    fn summary_task_type_follows_spoken_flag() {
        let written = question(TaskBody::Summary {
            passage: "text".into(),
            keywords: vec!["k".into()],
            limit: WordLimit { min: 5, max: 75 },
            single_sentence: true,
            spoken: false,
        });
        assert_eq!(written.task(), TaskType::SummarizeWritten);
    }

    #[test]
    fn question_round_trips_through_json() {
        let q = question(TaskBody::Dictation { sentence: "We study every day.".into() });
        let json = serde_json::to_string(&q).unwrap();
        let back: Question = serde_json::from_str(&json).unwrap();
        assert_eq!(q, back);
    }
}
