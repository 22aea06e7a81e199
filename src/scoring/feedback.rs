//! Post-submission answer marking
//!
//! After a response is scored, each user-provided unit (option, blank,
//! paragraph position, transcript word, dictated word) is marked correct
//! or incorrect against the stored key, for display only. Everything here
//! is pure and read-only; the numeric score comes from the parent module
//! and is never affected by these marks.

use std::collections::HashMap;

use crate::bank::answer::Response;
use crate::bank::model::{Question, TaskBody};
use crate::scoring::{blank_matches, text};

/// Mark for one multiple-choice option
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionMark {
    /// Selected, and part of the answer key
    CorrectSelected,
    /// Selected, but not part of the answer key
    WrongSelected,
    /// Part of the answer key, but not selected
    MissedCorrect,
    /// Neither selected nor correct
    Plain,
}

/// Mark for one blank
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlankMark {
    pub expected: String,
    pub given: String,
    pub correct: bool,
}

/// Mark for one paragraph slot in the learner's arrangement
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderMark {
    /// Paragraph id at this position
    pub id: String,
    /// Whether the pair formed with the next paragraph matches the
    /// canonical order; `None` for the last slot
    pub pair_ok: Option<bool>,
}

/// Mark for one transcript word in a highlight task
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WordMark {
    /// Flagged, and genuinely incorrect
    Hit,
    /// Flagged, but the word was fine
    FalseAlarm,
    /// Incorrect, but not flagged
    Miss,
    /// Correct and unflagged
    Plain,
}

/// Mark for one expected dictation word
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecallMark {
    pub word: String,
    pub recalled: bool,
}

/// Per-unit marks for one submitted response
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Marks {
    Options(Vec<OptionMark>),
    Blanks(Vec<BlankMark>),
    Order(Vec<OrderMark>),
    Transcript(Vec<WordMark>),
    Recall(Vec<RecallMark>),
    /// Free-text and speaking tasks have no per-unit marks
    None,
}

/// Compute display marks for a submitted response
pub fn marks(question: &Question, response: &Response) -> Marks {
    match (&question.body, response) {
        (TaskBody::ChoiceSingle { options, correct, .. }, Response::Choice { selected }) => {
            let marks = options
                .iter()
                .map(|option| {
                    let is_correct = option == correct;
                    let is_selected = selected.as_deref() == Some(option.as_str());
                    match (is_selected, is_correct) {
                        (true, true) => OptionMark::CorrectSelected,
                        (true, false) => OptionMark::WrongSelected,
                        (false, true) => OptionMark::MissedCorrect,
                        (false, false) => OptionMark::Plain,
                    }
                })
                .collect();
            Marks::Options(marks)
        }
        (TaskBody::ChoiceMultiple { options, correct, .. }, Response::Choices { selected }) => {
            let marks = options
                .iter()
                .map(|option| {
                    let is_correct = correct.contains(option);
                    let is_selected = selected.contains(option);
                    match (is_selected, is_correct) {
                        (true, true) => OptionMark::CorrectSelected,
                        (true, false) => OptionMark::WrongSelected,
                        (false, true) => OptionMark::MissedCorrect,
                        (false, false) => OptionMark::Plain,
                    }
                })
                .collect();
            Marks::Options(marks)
        }
        (TaskBody::Blanks { blanks, .. }, Response::Blanks { values }) => {
            let marks = blanks
                .iter()
                .enumerate()
                .map(|(i, blank)| {
                    let given = values.get(i).cloned().unwrap_or_default();
                    BlankMark {
                        correct: blank_matches(blank, &given),
                        expected: blank.correct.clone(),
                        given,
                    }
                })
                .collect();
            Marks::Blanks(marks)
        }
        (TaskBody::Reorder { order, .. }, Response::Order { arrangement }) => {
            let canonical: Vec<(&str, &str)> =
                order.windows(2).map(|w| (w[0].as_str(), w[1].as_str())).collect();

            let marks = arrangement
                .iter()
                .enumerate()
                .map(|(i, id)| OrderMark {
                    id: id.clone(),
                    pair_ok: arrangement.get(i + 1).map(|next| {
                        canonical.contains(&(id.as_str(), next.as_str()))
                    }),
                })
                .collect();
            Marks::Order(marks)
        }
        (TaskBody::Highlight { transcript, errors, .. }, Response::Flags { indices }) => {
            let marks = (0..transcript.len())
                .map(|i| {
                    let is_error = errors.contains(&i);
                    let is_flagged = indices.contains(&i);
                    match (is_flagged, is_error) {
                        (true, true) => WordMark::Hit,
                        (true, false) => WordMark::FalseAlarm,
                        (false, true) => WordMark::Miss,
                        (false, false) => WordMark::Plain,
                    }
                })
                .collect();
            Marks::Transcript(marks)
        }
        (TaskBody::Dictation { sentence }, Response::Text { text: response_text }) => {
            let mut available: HashMap<String, usize> = HashMap::new();
            for word in text::words(response_text) {
                *available.entry(word).or_insert(0) += 1;
            }

            let marks = text::words(sentence)
                .into_iter()
                .map(|word| {
                    let recalled = match available.get_mut(&word) {
                        Some(count) if *count > 0 => {
                            *count -= 1;
                            true
                        }
                        _ => false,
                    };
                    RecallMark { word, recalled }
                })
                .collect();
            Marks::Recall(marks)
        }
        _ => Marks::None,
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::*;
    use crate::bank::model::{Blank, SectionKind};

    fn question(body: TaskBody) -> Question {
        Question { id: "q".into(), title: "t".into(), section: SectionKind::Reading, body }
    }

    #[test]
    fn single_choice_marks_selected_and_missed() {
        let q = question(TaskBody::ChoiceSingle {
            prompt: "p".into(),
            passage: None,
            options: vec!["a".into(), "b".into(), "c".into()],
            correct: "b".into(),
        });

        let m = marks(&q, &Response::Choice { selected: Some("a".into()) });
        assert_eq!(
            m,
            Marks::Options(vec![
                OptionMark::WrongSelected,
                OptionMark::MissedCorrect,
                OptionMark::Plain,
            ])
        );
    }

    #[test]
    fn blank_marks_carry_expected_and_given() {
        let q = question(TaskBody::Blanks {
            segments: vec!["".into(), "".into(), "".into()],
            blanks: vec![
                Blank { correct: "cat".into(), options: vec![] },
                Blank { correct: "mat".into(), options: vec![] },
            ],
        });

        let m = marks(&q, &Response::Blanks { values: vec!["Cat".into(), "rug".into()] });
        let Marks::Blanks(blanks) = m else { panic!("wrong marks variant") };
        assert!(blanks[0].correct);
        assert!(!blanks[1].correct);
        assert_eq!(blanks[1].expected, "mat");
    }

    #[test]
    fn order_marks_flag_each_adjacent_pair() {
        let q = question(TaskBody::Reorder {
            paragraphs: ["a", "b", "c"]
                .iter()
                .map(|id| crate::bank::model::Paragraph {
                    id: id.to_string(),
                    text: id.to_string(),
                })
                .collect(),
            order: vec!["a".into(), "b".into(), "c".into()],
        });

        let m = marks(
            &q,
            &Response::Order { arrangement: vec!["a".into(), "b".into(), "c".into()] },
        );
        let Marks::Order(order) = m else { panic!("wrong marks variant") };
        assert_eq!(order[0].pair_ok, Some(true));
        assert_eq!(order[1].pair_ok, Some(true));
        assert_eq!(order[2].pair_ok, None);
    }

    #[test]
    fn transcript_marks_distinguish_hits_misses_and_false_alarms() {
        let q = question(TaskBody::Highlight {
            spoken: "x".into(),
            transcript: vec!["w0".into(), "w1".into(), "w2".into(), "w3".into()],
            errors: vec![1, 3],
        });

        let m = marks(&q, &Response::Flags { indices: BTreeSet::from([0, 1]) });
        assert_eq!(
            m,
            Marks::Transcript(vec![
                WordMark::FalseAlarm,
                WordMark::Hit,
                WordMark::Plain,
                WordMark::Miss,
            ])
        );
    }

    #[test]
    fn recall_marks_consume_response_words() {
        let q = question(TaskBody::Dictation { sentence: "the the cat".into() });

        let m = marks(&q, &Response::Text { text: "the cat".into() });
        let Marks::Recall(recall) = m else { panic!("wrong marks variant") };
        assert_eq!(
            recall.iter().map(|r| r.recalled).collect::<Vec<_>>(),
            vec![true, false, true]
        );
    }

    #[test]
    fn marks_never_change_scoring() {
        let q = question(TaskBody::Dictation { sentence: "one two".into() });
        let r = Response::Text { text: "one".into() };
        let before = crate::scoring::score(&q, &r);
        let _ = marks(&q, &r);
        assert_eq!(before, crate::scoring::score(&q, &r));
    }
}
