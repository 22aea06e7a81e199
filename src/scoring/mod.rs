//! Heuristic mock scoring
//!
//! Scoring is pure and synchronous: a question plus a response always maps
//! to the same [`Score`], nothing is mutated, and nothing can panic. A
//! response whose shape does not match the question's task degrades to a
//! zero score instead of erroring, and empty responses score zero on every
//! trait.
//!
//! Negative marking (multiple-answer choice and highlight tasks) is floored
//! at zero per question, never across a section.

pub mod feedback;
pub mod text;

use std::collections::HashMap;

use crate::bank::answer::{Response, SpokenOutcome};
use crate::bank::model::{Blank, Question, TaskBody, WordLimit};

/// One bounded sub-score
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraitScore {
    /// Trait label, e.g. "Content" or "Form"
    pub name: &'static str,
    /// Awarded points, always `<= max`
    pub points: u32,
    /// Stated maximum for this trait
    pub max: u32,
}

impl TraitScore {
    /// Build a trait score, capping points at the maximum
    pub fn new(name: &'static str, points: u32, max: u32) -> Self {
        Self { name, points: points.min(max), max }
    }
}

/// The result of scoring one response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Score {
    /// Bounded sub-scores; the overall score is their sum
    pub traits: Vec<TraitScore>,
    /// Human-readable feedback lines
    pub feedback: Vec<String>,
}

impl Score {
    fn new(traits: Vec<TraitScore>, feedback: Vec<String>) -> Self {
        Self { traits, feedback }
    }

    /// Zero on every trait of the given shape
    fn zeroed(names_and_maxima: &[(&'static str, u32)], note: impl Into<String>) -> Self {
        let traits =
            names_and_maxima.iter().map(|&(name, max)| TraitScore::new(name, 0, max)).collect();
        Self { traits, feedback: vec![note.into()] }
    }

    /// Awarded points: the sum of the (already capped) trait points
    pub fn points(&self) -> u32 {
        self.traits.iter().map(|t| t.points).sum()
    }

    /// Maximum points: the sum of the trait maxima
    pub fn max(&self) -> u32 {
        self.traits.iter().map(|t| t.max).sum()
    }

    /// Whether every trait reached its maximum
    pub fn is_full_marks(&self) -> bool {
        self.traits.iter().all(|t| t.points == t.max)
    }
}

/// Maximum points available for a question, independent of any response
pub fn max_points(question: &Question) -> u32 {
    max_points_for_body(&question.body)
}

/// Score a response against its own question's answer key
pub fn score(question: &Question, response: &Response) -> Score {
    match (&question.body, response) {
        (
            TaskBody::Summary { keywords, limit, single_sentence, .. },
            Response::Text { text },
        ) => score_summary(keywords, *limit, *single_sentence, text),
        (TaskBody::ChoiceSingle { correct, .. }, Response::Choice { selected }) => {
            score_choice_single(correct, selected.as_deref())
        }
        (TaskBody::ChoiceMultiple { correct, .. }, Response::Choices { selected }) => {
            score_choice_multiple(correct, selected.iter().map(String::as_str))
        }
        (TaskBody::Blanks { blanks, .. }, Response::Blanks { values }) => {
            score_blanks(blanks, values)
        }
        (TaskBody::Reorder { order, paragraphs, .. }, Response::Order { arrangement }) => {
            score_reorder(order, paragraphs.len(), arrangement)
        }
        (TaskBody::Highlight { errors, .. }, Response::Flags { indices }) => {
            score_highlight(errors, indices.iter().copied())
        }
        (TaskBody::Dictation { sentence }, Response::Text { text }) => {
            score_dictation(sentence, text)
        }
        (TaskBody::Speaking { .. }, Response::Spoken { outcome }) => score_speaking(*outcome),
        // Shape mismatch: contribute nothing rather than error.
        (body, _) => Score::zeroed(
            &[("Score", max_points_for_body(body))],
            "No scorable answer was recorded for this task.",
        ),
    }
}

fn max_points_for_body(body: &TaskBody) -> u32 {
    match body {
        TaskBody::Summary { .. } => 7, // content 2 + form 1 + grammar 2 + vocabulary 2
        TaskBody::ChoiceSingle { .. } => 1,
        TaskBody::ChoiceMultiple { correct, .. } => correct.len() as u32,
        TaskBody::Blanks { blanks, .. } => blanks.len() as u32,
        TaskBody::Reorder { paragraphs, .. } => paragraphs.len().saturating_sub(1) as u32,
        TaskBody::Highlight { errors, .. } => errors.len() as u32,
        TaskBody::Dictation { sentence } => text::word_count(sentence) as u32,
        TaskBody::Speaking { .. } => 1,
    }
}

const SUMMARY_TRAITS: &[(&str, u32)] =
    &[("Content", 2), ("Form", 1), ("Grammar", 2), ("Vocabulary", 2)];

/// Summarize written/spoken text: keyword coverage plus form constraints
fn score_summary(
    keywords: &[String],
    limit: WordLimit,
    single_sentence: bool,
    response: &str,
) -> Score {
    if text::is_blank(response) {
        return Score::zeroed(SUMMARY_TRAITS, "Empty response.");
    }

    let mut feedback = Vec::new();

    // Content: case-insensitive substring coverage of the keyword list,
    // banded 0/1/2 at half coverage.
    let matches = keywords.iter().filter(|k| text::contains_keyword(response, k)).count();
    let content = if matches == 0 {
        0
    } else if matches * 2 < keywords.len() {
        1
    } else {
        2
    };
    feedback.push(format!("Covered {matches} of {} key points.", keywords.len()));

    // Form: zero outside the word limit or across sentence constraints,
    // regardless of content quality.
    let word_count = text::word_count(response);
    let sentences = text::sentence_count(response);
    let within_limit = limit.contains(word_count);
    let sentence_ok = !single_sentence || sentences == 1;
    let form = u32::from(within_limit && sentence_ok);
    if !within_limit {
        feedback.push(format!(
            "Word count {word_count} is outside the {}-{} word limit.",
            limit.min, limit.max
        ));
    }
    if !sentence_ok {
        feedback.push(format!("Use exactly one sentence (found {sentences})."));
    }

    // Grammar: crude surface checks only.
    let starts_capitalised =
        response.trim_start().chars().next().is_some_and(|c| c.is_uppercase());
    let ends_terminated = response.trim_end().ends_with(['.', '!', '?']);
    let grammar = u32::from(starts_capitalised) + u32::from(ends_terminated);
    if grammar < 2 {
        feedback.push("Start with a capital letter and end with punctuation.".into());
    }

    // Vocabulary: distinct-word ratio bands.
    let distinct = text::distinct_word_count(response);
    let vocabulary = if word_count == 0 {
        0
    } else if distinct * 4 >= word_count * 3 {
        2
    } else if distinct * 2 >= word_count {
        1
    } else {
        0
    };

    Score::new(
        vec![
            TraitScore::new("Content", content, 2),
            TraitScore::new("Form", form, 1),
            TraitScore::new("Grammar", grammar, 2),
            TraitScore::new("Vocabulary", vocabulary, 2),
        ],
        feedback,
    )
}

/// Single answer: one point for strict equality with the stored option
fn score_choice_single(correct: &str, selected: Option<&str>) -> Score {
    let (points, note) = match selected {
        Some(s) if s == correct => (1, "Correct.".to_string()),
        Some(_) => (0, format!("The correct answer is \"{correct}\".")),
        None => (0, "No option selected.".to_string()),
    };
    Score::new(vec![TraitScore::new("Choice", points, 1)], vec![note])
}

/// Multiple answers: +1 per correct pick, -1 per wrong pick, floored at zero
fn score_choice_multiple<'a>(
    correct: &[String],
    selected: impl Iterator<Item = &'a str>,
) -> Score {
    let mut hits = 0i64;
    let mut misses = 0i64;
    for pick in selected {
        if correct.iter().any(|c| c == pick) {
            hits += 1;
        } else {
            misses += 1;
        }
    }

    let max = correct.len() as u32;
    let points = (hits - misses).max(0) as u32;
    let note = if misses > 0 {
        format!("{hits} correct, {misses} incorrect selections.")
    } else {
        format!("{hits} of {max} correct options selected.")
    };
    Score::new(vec![TraitScore::new("Choices", points, max)], vec![note])
}

/// One point per blank matching its stored value, trimmed, case-insensitive
fn score_blanks(blanks: &[Blank], values: &[String]) -> Score {
    let correct = blanks
        .iter()
        .zip(values.iter().map(String::as_str).chain(std::iter::repeat("")))
        .filter(|(blank, value)| blank_matches(blank, value))
        .count() as u32;

    let max = blanks.len() as u32;
    Score::new(
        vec![TraitScore::new("Blanks", correct, max)],
        vec![format!("{correct} of {max} blanks correct.")],
    )
}

pub(crate) fn blank_matches(blank: &Blank, value: &str) -> bool {
    value.trim().eq_ignore_ascii_case(blank.correct.trim())
}

/// Adjacent-pair scoring against the canonical order
fn score_reorder(order: &[String], paragraph_count: usize, arrangement: &[String]) -> Score {
    let max = paragraph_count.saturating_sub(1) as u32;

    let canonical: Vec<(&str, &str)> =
        order.windows(2).map(|w| (w[0].as_str(), w[1].as_str())).collect();

    let points = arrangement
        .windows(2)
        .filter(|w| canonical.contains(&(w[0].as_str(), w[1].as_str())))
        .count() as u32;

    Score::new(
        vec![TraitScore::new("Pairs", points, max)],
        vec![format!("{points} of {max} adjacent pairs in order.")],
    )
}

/// +1 per flagged true error, -1 per wrongly flagged word, floored at zero
fn score_highlight(errors: &[usize], flagged: impl Iterator<Item = usize>) -> Score {
    let mut hits = 0i64;
    let mut false_alarms = 0i64;
    for index in flagged {
        if errors.contains(&index) {
            hits += 1;
        } else {
            false_alarms += 1;
        }
    }

    let max = errors.len() as u32;
    let points = (hits - false_alarms).max(0) as u32;
    Score::new(
        vec![TraitScore::new("Words", points, max)],
        vec![format!("Spotted {hits} of {max} incorrect words.")],
    )
}

/// Bag-of-words dictation scoring: order-independent, punctuation-stripped,
/// no penalty for extra words. Repeated expected words need a matching
/// number of occurrences.
fn score_dictation(sentence: &str, response: &str) -> Score {
    let expected = text::words(sentence);
    let max = expected.len() as u32;

    if text::is_blank(response) {
        return Score::zeroed(&[("Words", max)], "Empty response.");
    }

    let mut available: HashMap<String, usize> = HashMap::new();
    for word in text::words(response) {
        *available.entry(word).or_insert(0) += 1;
    }

    let mut points = 0u32;
    for word in &expected {
        if let Some(count) = available.get_mut(word) {
            if *count > 0 {
                *count -= 1;
                points += 1;
            }
        }
    }

    Score::new(
        vec![TraitScore::new("Words", points, max)],
        vec![format!("{points} of {max} words recalled.")],
    )
}

/// Speaking attempts score on completion alone; terminal failures are zero
fn score_speaking(outcome: Option<SpokenOutcome>) -> Score {
    let (points, note) = match outcome {
        Some(SpokenOutcome::Completed { duration_ms, reaction_ms }) => {
            let secs = duration_ms as f64 / 1000.0;
            let note = match reaction_ms {
                Some(ms) => format!("Recorded {secs:.1}s, reaction {ms} ms."),
                None => format!("Recorded {secs:.1}s."),
            };
            (1, note)
        }
        Some(SpokenOutcome::NoSpeech) => (0, "No speech detected before the deadline.".into()),
        Some(SpokenOutcome::Silence) => (0, "Recording stopped after sustained silence.".into()),
        None => (0, "No attempt recorded.".to_string()),
    };
    Score::new(vec![TraitScore::new("Attempt", points, 1)], vec![note])
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    use super::*;
    use crate::bank::model::{Paragraph, SectionKind};

    fn question(body: TaskBody) -> Question {
        Question { id: "q".into(), title: "t".into(), section: SectionKind::Reading, body }
    }

    fn summary_question() -> Question {
        question(TaskBody::Summary {
            passage: "ignored".into(),
            keywords: vec!["water".into(), "evaporation".into(), "rain".into(), "cycle".into()],
            limit: WordLimit { min: 5, max: 75 },
            single_sentence: true,
            spoken: false,
        })
    }

    #[test]
    fn choice_single_scores_one_iff_strict_equality() {
        let q = question(TaskBody::ChoiceSingle {
            prompt: "p".into(),
            passage: None,
            options: vec!["alpha".into(), "beta".into()],
            correct: "alpha".into(),
        });

        let right = score(&q, &Response::Choice { selected: Some("alpha".into()) });
        assert_eq!(right.points(), 1);

        let wrong = score(&q, &Response::Choice { selected: Some("beta".into()) });
        assert_eq!(wrong.points(), 0);

        let none = score(&q, &Response::Choice { selected: None });
        assert_eq!(none.points(), 0);
    }

    #[test]
    fn choice_multiple_exact_set_scores_k() {
        let q = question(TaskBody::ChoiceMultiple {
            prompt: "p".into(),
            passage: None,
            options: vec!["a".into(), "b".into(), "c".into(), "d".into()],
            correct: vec!["a".into(), "c".into()],
        });

        let exact = score(
            &q,
            &Response::Choices { selected: BTreeSet::from(["a".to_string(), "c".to_string()]) },
        );
        assert_eq!(exact.points(), 2);
        assert_eq!(exact.max(), 2);
    }

    #[test]
    fn choice_multiple_floors_at_zero() {
        let q = question(TaskBody::ChoiceMultiple {
            prompt: "p".into(),
            passage: None,
            options: vec!["a".into(), "b".into(), "c".into(), "d".into()],
            correct: vec!["a".into(), "c".into()],
        });

        let only_wrong = score(
            &q,
            &Response::Choices { selected: BTreeSet::from(["b".to_string(), "d".to_string()]) },
        );
        assert_eq!(only_wrong.points(), 0);

        let nothing = score(&q, &Response::Choices { selected: BTreeSet::new() });
        assert_eq!(nothing.points(), 0);
    }

    #[test]
    fn blanks_match_trimmed_case_insensitive_only() {
        let q = question(TaskBody::Blanks {
            segments: vec!["The ".into(), " sat on the ".into(), ".".into()],
            blanks: vec![
                Blank { correct: "cat".into(), options: vec![] },
                Blank { correct: "mat".into(), options: vec![] },
            ],
        });

        let s = score(&q, &Response::Blanks { values: vec!["  CAT ".into(), "rug".into()] });
        assert_eq!(s.points(), 1);

        let empty = score(&q, &Response::Blanks { values: vec!["".into(), "".into()] });
        assert_eq!(empty.points(), 0);
    }

    #[test]
    fn blanks_tolerate_short_value_lists() {
        let q = question(TaskBody::Blanks {
            segments: vec!["A ".into(), " and ".into(), ".".into()],
            blanks: vec![
                Blank { correct: "one".into(), options: vec![] },
                Blank { correct: "two".into(), options: vec![] },
            ],
        });

        // Degrade, never panic: missing positions count as wrong.
        let s = score(&q, &Response::Blanks { values: vec!["one".into()] });
        assert_eq!(s.points(), 1);
    }

    #[test]
    fn reorder_scores_adjacent_pairs() {
        let q = question(TaskBody::Reorder {
            paragraphs: ["a", "b", "c", "d"]
                .iter()
                .map(|id| Paragraph { id: id.to_string(), text: id.to_string() })
                .collect(),
            order: vec!["b".into(), "a".into(), "d".into(), "c".into()],
        });

        let exact = score(
            &q,
            &Response::Order {
                arrangement: vec!["b".into(), "a".into(), "d".into(), "c".into()],
            },
        );
        assert_eq!(exact.points(), 3);

        let reversed = score(
            &q,
            &Response::Order {
                arrangement: vec!["c".into(), "d".into(), "a".into(), "b".into()],
            },
        );
        assert_eq!(reversed.points(), 0);

        let partial = score(
            &q,
            &Response::Order {
                arrangement: vec!["b".into(), "a".into(), "c".into(), "d".into()],
            },
        );
        assert_eq!(partial.points(), 1);
    }

    #[test]
    fn highlight_floors_at_zero_per_question() {
        let q = question(TaskBody::Highlight {
            spoken: "the quick brown fox".into(),
            transcript: vec!["the".into(), "quack".into(), "brown".into(), "box".into()],
            errors: vec![1, 3],
        });

        let perfect = score(&q, &Response::Flags { indices: BTreeSet::from([1, 3]) });
        assert_eq!(perfect.points(), 2);

        let noisy = score(&q, &Response::Flags { indices: BTreeSet::from([0, 1, 2]) });
        assert_eq!(noisy.points(), 0);
    }

    #[test]
    fn dictation_exact_sentence_is_full_marks() {
        let q = question(TaskBody::Dictation { sentence: "We study hard every day.".into() });

        let exact = score(&q, &Response::Text { text: "We study hard every day.".into() });
        assert_eq!(exact.points(), 5);
        assert!(exact.is_full_marks());

        let empty = score(&q, &Response::Text { text: "".into() });
        assert_eq!(empty.points(), 0);
    }

    #[test]
    fn dictation_is_order_independent_and_unpenalised() {
        let q = question(TaskBody::Dictation { sentence: "the cat sat".into() });

        let scrambled =
            score(&q, &Response::Text { text: "sat THE cat, definitely extra words".into() });
        assert_eq!(scrambled.points(), 3);
    }

    #[test]
    fn dictation_repeated_words_need_repeated_occurrences() {
        let q = question(TaskBody::Dictation { sentence: "the dog chased the cat".into() });

        let one_the = score(&q, &Response::Text { text: "the dog chased cat".into() });
        assert_eq!(one_the.points(), 4);
    }

    #[test]
    fn summary_form_is_zero_outside_word_limit() {
        let q = summary_question();
        let short = score(&q, &Response::Text { text: "Water evaporates.".into() });
        let form = short.traits.iter().find(|t| t.name == "Form").unwrap();
        assert_eq!(form.points, 0);
    }

    #[test]
    fn summary_form_is_zero_for_two_sentences() {
        let q = summary_question();
        let two = score(
            &q,
            &Response::Text {
                text: "Water evaporates into the sky. Rain falls back to complete the cycle."
                    .into(),
            },
        );
        let form = two.traits.iter().find(|t| t.name == "Form").unwrap();
        assert_eq!(form.points, 0);
        // Content is still counted independently of form.
        let content = two.traits.iter().find(|t| t.name == "Content").unwrap();
        assert!(content.points > 0);
    }

    #[test]
    fn summary_single_sentence_in_range_gets_form_point() {
        let q = summary_question();
        let good = score(
            &q,
            &Response::Text {
                text: "Water rises by evaporation and returns as rain, closing the cycle.".into(),
            },
        );
        let form = good.traits.iter().find(|t| t.name == "Form").unwrap();
        assert_eq!(form.points, 1);
        assert_eq!(good.max(), 7);
    }

    #[test]
    fn empty_responses_score_zero_everywhere() {
        let q = summary_question();
        let s = score(&q, &Response::Text { text: "   ".into() });
        assert_eq!(s.points(), 0);
        assert!(s.traits.iter().all(|t| t.points == 0));
    }

    #[test]
    fn mismatched_shape_degrades_to_zero() {
        let q = summary_question();
        let s = score(&q, &Response::Flags { indices: BTreeSet::new() });
        assert_eq!(s.points(), 0);
        assert_eq!(s.max(), 7);
    }

    #[test]
    fn scoring_is_idempotent() {
        let q = summary_question();
        let r = Response::Text {
            text: "Water rises by evaporation and returns as rain, closing the cycle.".into(),
        };
        assert_eq!(score(&q, &r), score(&q, &r));
    }

    #[test]
    fn speaking_failures_score_zero() {
        let q = question(TaskBody::Speaking {
            prompt: "Read this aloud".into(),
            prepare_secs: 3,
            record_secs: 10,
            reflex: true,
        });

        let failed = score(&q, &Response::Spoken { outcome: Some(SpokenOutcome::NoSpeech) });
        assert_eq!(failed.points(), 0);

        let done = score(
            &q,
            &Response::Spoken {
                outcome: Some(SpokenOutcome::Completed {
                    duration_ms: 8000,
                    reaction_ms: Some(1200),
                }),
            },
        );
        assert_eq!(done.points(), 1);
    }

    proptest! {
        #[test]
        fn choice_multiple_never_negative_never_above_max(
            selected in proptest::collection::btree_set("[a-f]", 0..6)
        ) {
            let q = question(TaskBody::ChoiceMultiple {
                prompt: "p".into(),
                passage: None,
                options: ["a", "b", "c", "d", "e", "f"].iter().map(|s| s.to_string()).collect(),
                correct: vec!["a".into(), "b".into(), "c".into()],
            });
            let s = score(&q, &Response::Choices { selected });
            prop_assert!(s.points() <= s.max());
        }

        #[test]
        fn highlight_never_negative_never_above_max(
            indices in proptest::collection::btree_set(0usize..8, 0..8)
        ) {
            let q = question(TaskBody::Highlight {
                spoken: "w w w w w w w w".into(),
                transcript: (0..8).map(|i| format!("w{i}")).collect(),
                errors: vec![0, 2, 4],
            });
            let s = score(&q, &Response::Flags { indices });
            prop_assert!(s.points() <= s.max());
        }

        #[test]
        fn dictation_points_bounded_by_expected_words(response in ".{0,80}") {
            let q = question(TaskBody::Dictation { sentence: "we study hard every day".into() });
            let s = score(&q, &Response::Text { text: response });
            prop_assert!(s.points() <= 5);
        }
    }
}
