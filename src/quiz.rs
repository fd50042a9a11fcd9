//! Comprehension check boundary: question shape, generator interface and
//! scoring. Question generation itself lives outside this crate.

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use crate::tracker::MIN_WORDS_FOR_QUIZ;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComprehensionQuestion {
    pub question: String,
    pub options: Vec<String>,
    pub correct_index: usize,
}

#[derive(Debug, Error)]
pub enum QuizError {
    #[error("question generation failed: {0}")]
    Generation(String),
    #[error("passage too short for a quiz ({words} words)")]
    PassageTooShort { words: usize },
}

/// Produces multiple-choice questions about a passage the user just read.
pub trait QuizGenerator {
    fn generate(&self, passage: &str) -> Result<Vec<ComprehensionQuestion>, QuizError>;
}

/// Percentage of answers matching the correct option. Unanswered questions
/// count as wrong; an empty quiz scores 0.
pub fn score_answers(questions: &[ComprehensionQuestion], answers: &[Option<usize>]) -> f64 {
    if questions.is_empty() {
        return 0.0;
    }
    let correct = questions
        .iter()
        .zip(answers.iter().chain(std::iter::repeat(&None)))
        .filter(|(q, a)| **a == Some(q.correct_index))
        .count();
    correct as f64 / questions.len() as f64 * 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn question(correct_index: usize) -> ComprehensionQuestion {
        ComprehensionQuestion {
            question: "What happened?".to_string(),
            options: vec!["a".into(), "b".into(), "c".into(), "d".into()],
            correct_index,
        }
    }

    #[test]
    fn test_score_all_correct() {
        let qs = vec![question(0), question(2)];
        assert_eq!(score_answers(&qs, &[Some(0), Some(2)]), 100.0);
    }

    #[test]
    fn test_score_partial_and_missing() {
        let qs = vec![question(0), question(1), question(2), question(3)];
        assert_eq!(score_answers(&qs, &[Some(0), Some(3), None]), 25.0);
    }

    #[test]
    fn test_score_empty_quiz() {
        assert_eq!(score_answers(&[], &[Some(1)]), 0.0);
    }

    struct CannedGenerator;

    impl QuizGenerator for CannedGenerator {
        fn generate(&self, passage: &str) -> Result<Vec<ComprehensionQuestion>, QuizError> {
            let words = passage.split_whitespace().count();
            if words < MIN_WORDS_FOR_QUIZ {
                return Err(QuizError::PassageTooShort { words });
            }
            Ok(vec![question(1)])
        }
    }

    #[test]
    fn test_generator_interface() {
        let long = "word ".repeat(MIN_WORDS_FOR_QUIZ);
        assert_eq!(CannedGenerator.generate(&long).unwrap().len(), 1);
        assert!(CannedGenerator.generate("too short").is_err());
    }
}
