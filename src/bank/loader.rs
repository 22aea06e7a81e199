//! Bank loading
//!
//! The built-in bank is constructed in code; user banks are JSON files
//! (arrays of questions) in the banks directory. Every question is
//! validated before it is admitted, and invalid ones are skipped with a
//! warning rather than failing the whole load.

use std::path::Path;

use super::model::{
    Blank, Paragraph, Question, SectionKind, TaskBody, WordLimit,
};

/// An immutable, validated collection of questions
#[derive(Debug, Clone, Default)]
pub struct QuestionBank {
    questions: Vec<Question>,
}

impl QuestionBank {
    /// The built-in sample bank
    pub fn builtin() -> Self {
        let mut bank = Self::default();
        for question in sample_questions() {
            // Built-in items are validated like any others; a bug in the
            // samples should be loud in tests, quiet in release.
            match question.validate() {
                Ok(()) => bank.questions.push(question),
                Err(e) => tracing::warn!("skipping built-in question: {e}"),
            }
        }
        bank
    }

    /// Built-in bank plus every readable JSON bank under `dir`
    pub fn load(dir: &Path) -> Self {
        let mut bank = Self::builtin();

        let entries = match std::fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(_) => return bank, // no banks directory yet
        };

        for entry in entries.flatten() {
            let path = entry.path();
            if path.extension().is_none_or(|ext| ext != "json") {
                continue;
            }
            match load_bank_file(&path) {
                Ok(questions) => {
                    tracing::info!("loaded {} questions from {:?}", questions.len(), path);
                    bank.extend(questions);
                }
                Err(e) => tracing::warn!("skipping bank file {:?}: {e}", path),
            }
        }

        bank
    }

    fn extend(&mut self, questions: Vec<Question>) {
        for question in questions {
            if self.find(&question.id).is_some() {
                tracing::warn!("duplicate question id {:?} ignored", question.id);
                continue;
            }
            self.questions.push(question);
        }
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Question> {
        self.questions.iter()
    }

    /// Find a question by id
    pub fn find(&self, id: &str) -> Option<&Question> {
        self.questions.iter().find(|q| q.id == id)
    }

    /// All questions in a section, in bank order
    pub fn by_section(&self, section: SectionKind) -> Vec<&Question> {
        self.questions.iter().filter(|q| q.section == section).collect()
    }
}

/// Parse one bank file, keeping only the questions that validate
fn load_bank_file(path: &Path) -> Result<Vec<Question>, super::model::BankError> {
    let contents = std::fs::read_to_string(path).map_err(|source| {
        super::model::BankError::Io { path: path.display().to_string(), source }
    })?;

    let parsed: Vec<Question> = serde_json::from_str(&contents).map_err(|source| {
        super::model::BankError::Parse { path: path.display().to_string(), source }
    })?;

    let mut valid = Vec::with_capacity(parsed.len());
    for question in parsed {
        match question.validate() {
            Ok(()) => valid.push(question),
            Err(e) => tracing::warn!("skipping question in {:?}: {e}", path),
        }
    }
    Ok(valid)
}

fn sample_questions() -> Vec<Question> {
    vec![
        Question {
            id: "ra-001".into(),
            title: "Read Aloud: Urban Trees".into(),
            section: SectionKind::Speaking,
            body: TaskBody::Speaking {
                prompt: "Street trees lower summer temperatures in cities by several degrees, \
                         yet most municipal budgets treat them as decoration rather than \
                         infrastructure."
                    .into(),
                prepare_secs: 35,
                record_secs: 40,
                reflex: false,
            },
        },
        Question {
            id: "asq-001".into(),
            title: "Answer Short Question".into(),
            section: SectionKind::Speaking,
            body: TaskBody::Speaking {
                prompt: "What do you call the instrument that measures atmospheric pressure?"
                    .into(),
                prepare_secs: 3,
                record_secs: 10,
                reflex: true,
            },
        },
        Question {
            id: "swt-001".into(),
            title: "Summarize Written Text: The Water Cycle".into(),
            section: SectionKind::Writing,
            body: TaskBody::Summary {
                passage: "Water moves continuously between the oceans, the atmosphere, and the \
                          land. Heat from the sun drives evaporation from open water and \
                          transpiration from plants. As moist air rises and cools, the vapour \
                          condenses into clouds, and precipitation returns the water to the \
                          surface, where rivers and groundwater carry it back towards the sea. \
                          This cycle distributes fresh water across the planet and moderates \
                          regional climates."
                    .into(),
                keywords: vec![
                    "evaporation".into(),
                    "condens".into(),
                    "precipitation".into(),
                    "cycle".into(),
                ],
                limit: WordLimit { min: 5, max: 75 },
                single_sentence: true,
                spoken: false,
            },
        },
        Question {
            id: "sst-001".into(),
            title: "Summarize Spoken Text: Honeybees".into(),
            section: SectionKind::Listening,
            body: TaskBody::Summary {
                passage: "Honeybee colonies make decisions collectively. When scouts find a \
                          promising nest site, they advertise it with a waggle dance whose \
                          length reflects the site's quality. Other scouts visit, judge the \
                          site for themselves, and dance in turn, so support for the best \
                          option snowballs until a quorum forms. No single bee compares the \
                          alternatives; the comparison happens at the level of the swarm."
                    .into(),
                keywords: vec![
                    "scout".into(),
                    "dance".into(),
                    "quorum".into(),
                    "swarm".into(),
                    "collective".into(),
                ],
                limit: WordLimit { min: 50, max: 70 },
                single_sentence: false,
                spoken: true,
            },
        },
        Question {
            id: "mcsa-001".into(),
            title: "Multiple Choice: Author's Purpose".into(),
            section: SectionKind::Reading,
            body: TaskBody::ChoiceSingle {
                prompt: "The author's main purpose in the passage is to".into(),
                passage: Some(
                    "The widespread adoption of container shipping in the 1960s did more to \
                     accelerate global trade than any tariff negotiation of the same era. By \
                     standardising the box, ports, cranes, ships, and trucks could finally \
                     speak a common mechanical language."
                        .into(),
                ),
                options: vec![
                    "argue that tariffs were irrelevant to trade growth".into(),
                    "explain how standardisation enabled global trade".into(),
                    "describe the design of shipping containers".into(),
                    "criticise port modernisation programmes".into(),
                ],
                correct: "explain how standardisation enabled global trade".into(),
            },
        },
        Question {
            id: "mcma-001".into(),
            title: "Multiple Choice: Volcanic Winters".into(),
            section: SectionKind::Reading,
            body: TaskBody::ChoiceMultiple {
                prompt: "According to the passage, which statements are true of large \
                         eruptions?"
                    .into(),
                passage: Some(
                    "Large volcanic eruptions inject sulfate aerosols into the stratosphere, \
                     where they reflect sunlight and cool the surface for one to three years. \
                     The 1815 eruption of Tambora produced the 'year without a summer', with \
                     crop failures across Europe and North America. Aerosols eventually \
                     settle out, so the cooling is sharp but brief."
                        .into(),
                ),
                options: vec![
                    "They can cool the planet for a limited period".into(),
                    "Their aerosols remain aloft for decades".into(),
                    "Tambora's eruption affected harvests far from the volcano".into(),
                    "Cooling effects are permanent".into(),
                ],
                correct: vec![
                    "They can cool the planet for a limited period".into(),
                    "Tambora's eruption affected harvests far from the volcano".into(),
                ],
            },
        },
        Question {
            id: "fib-r-001".into(),
            title: "Fill in the Blanks: Glass Frogs".into(),
            section: SectionKind::Reading,
            body: TaskBody::Blanks {
                segments: vec![
                    "Glass frogs owe their name to translucent skin through which the ".into(),
                    " organs are visible; while sleeping they pool most of their red blood \
                     cells in the liver, making themselves nearly "
                        .into(),
                    " to predators hunting by sight.".into(),
                ],
                blanks: vec![
                    Blank {
                        correct: "internal".into(),
                        options: vec![
                            "internal".into(),
                            "external".into(),
                            "artificial".into(),
                        ],
                    },
                    Blank {
                        correct: "invisible".into(),
                        options: vec![
                            "invisible".into(),
                            "attractive".into(),
                            "audible".into(),
                        ],
                    },
                ],
            },
        },
        Question {
            id: "fib-rw-001".into(),
            title: "Fill in the Blanks: Typed".into(),
            section: SectionKind::Reading,
            body: TaskBody::Blanks {
                segments: vec![
                    "The lighthouse keeper kept a daily ".into(),
                    " of passing ships, noting their flags and ".into(),
                    " in a leather-bound volume.".into(),
                ],
                blanks: vec![
                    Blank { correct: "log".into(), options: vec![] },
                    Blank { correct: "cargo".into(), options: vec![] },
                ],
            },
        },
        Question {
            id: "rop-001".into(),
            title: "Re-order Paragraphs: Printing Press".into(),
            section: SectionKind::Reading,
            body: TaskBody::Reorder {
                paragraphs: vec![
                    Paragraph {
                        id: "scribes".into(),
                        text: "Before the fifteenth century, every European book was copied \
                               by hand, usually by monastic scribes."
                            .into(),
                    },
                    Paragraph {
                        id: "gutenberg".into(),
                        text: "Gutenberg's movable type, introduced around 1450, cut the cost \
                               of reproduction by an order of magnitude."
                            .into(),
                    },
                    Paragraph {
                        id: "spread".into(),
                        text: "Within fifty years, presses operated in more than two hundred \
                               cities, and millions of volumes were in circulation."
                            .into(),
                    },
                    Paragraph {
                        id: "literacy".into(),
                        text: "The resulting flood of affordable books steadily widened \
                               literacy beyond clergy and aristocracy."
                            .into(),
                    },
                ],
                order: vec![
                    "scribes".into(),
                    "gutenberg".into(),
                    "spread".into(),
                    "literacy".into(),
                ],
            },
        },
        Question {
            id: "hiw-001".into(),
            title: "Highlight Incorrect Words: Coral Reefs".into(),
            section: SectionKind::Listening,
            body: TaskBody::Highlight {
                spoken: "Coral reefs cover less than one percent of the ocean floor yet \
                         support roughly a quarter of all marine species."
                    .into(),
                transcript: [
                    "Coral", "reefs", "cover", "more", "than", "one", "percent", "of", "the",
                    "ocean", "surface", "yet", "support", "roughly", "a", "quarter", "of",
                    "all", "marine", "species.",
                ]
                .iter()
                .map(|w| w.to_string())
                .collect(),
                errors: vec![3, 10],
            },
        },
        Question {
            id: "wfd-001".into(),
            title: "Write From Dictation".into(),
            section: SectionKind::Listening,
            body: TaskBody::Dictation {
                sentence: "The library will remain open during the examination period.".into(),
            },
        },
        Question {
            id: "wfd-002".into(),
            title: "Write From Dictation".into(),
            section: SectionKind::Listening,
            body: TaskBody::Dictation {
                sentence: "Assignments submitted after the deadline receive a lower grade."
                    .into(),
            },
        },
    ]
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    #[test]
    fn builtin_bank_is_fully_valid() {
        for question in sample_questions() {
            question.validate().unwrap_or_else(|e| panic!("invalid sample: {e}"));
        }
        let bank = QuestionBank::builtin();
        assert_eq!(bank.len(), sample_questions().len());
    }

    #[test]
    fn builtin_bank_covers_every_section() {
        let bank = QuestionBank::builtin();
        for section in SectionKind::all() {
            assert!(!bank.by_section(section).is_empty(), "{section:?} has no questions");
        }
    }

    #[test]
    fn find_locates_questions_by_id() {
        let bank = QuestionBank::builtin();
        assert!(bank.find("wfd-001").is_some());
        assert!(bank.find("nope").is_none());
    }

    #[test]
    fn user_banks_merge_with_builtin() {
        let dir = TempDir::new().unwrap();
        let extra = serde_json::json!([{
            "id": "user-wfd-1",
            "title": "User Dictation",
            "section": "listening",
            "body": { "task": "dictation", "sentence": "Practice makes progress." }
        }]);
        std::fs::write(dir.path().join("extra.json"), extra.to_string()).unwrap();

        let bank = QuestionBank::load(dir.path());
        assert!(bank.find("user-wfd-1").is_some());
        assert!(bank.len() > QuestionBank::builtin().len());
    }

    #[test]
    fn invalid_questions_in_user_banks_are_skipped() {
        let dir = TempDir::new().unwrap();
        let extra = serde_json::json!([{
            "id": "bad-mcsa",
            "title": "Broken",
            "section": "reading",
            "body": {
                "task": "choice_single",
                "prompt": "p",
                "options": ["a", "b"],
                "correct": "z"
            }
        }]);
        std::fs::write(dir.path().join("extra.json"), extra.to_string()).unwrap();

        let bank = QuestionBank::load(dir.path());
        assert!(bank.find("bad-mcsa").is_none());
    }

    #[test]
    fn duplicate_ids_keep_the_first_occurrence() {
        let dir = TempDir::new().unwrap();
        let extra = serde_json::json!([{
            "id": "wfd-001",
            "title": "Shadowing Dictation",
            "section": "listening",
            "body": { "task": "dictation", "sentence": "Different sentence." }
        }]);
        std::fs::write(dir.path().join("extra.json"), extra.to_string()).unwrap();

        let bank = QuestionBank::load(dir.path());
        let q = bank.find("wfd-001").unwrap();
        assert_eq!(q.title, "Write From Dictation");
    }

    #[test]
    fn missing_banks_directory_falls_back_to_builtin() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("does-not-exist");
        let bank = QuestionBank::load(&missing);
        assert_eq!(bank.len(), QuestionBank::builtin().len());
    }
}
