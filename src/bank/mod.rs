//! Question banks
//!
//! A bank is an immutable list of validated practice questions. The
//! built-in sample bank keeps the app usable out of the box; extra banks
//! are plain JSON files dropped into the banks directory.

pub mod answer;
pub mod loader;
pub mod model;

pub use answer::{AnswerSheet, Response, SpokenOutcome};
pub use loader::QuestionBank;
pub use model::{BankError, Question, SectionKind, TaskBody, TaskType};
