//! Questionnaire configuration: the ordered question list and per-field
//! validation rules. Loaded once at process start; question order defines
//! the step indices the session store walks through.

use once_cell::sync::Lazy;

use crate::core::error::{AppError, AppResult};

/// Answer stored when a skippable question is skipped.
pub const UNSPECIFIED: &str = "не указано";

/// Stable key for a questionnaire field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QuestionKey {
    Name,
    Age,
    Skill,
}

impl QuestionKey {
    /// Human-readable label used in summaries and admin notifications.
    pub fn label(&self) -> &'static str {
        match self {
            QuestionKey::Name => "Имя",
            QuestionKey::Age => "Возраст",
            QuestionKey::Skill => "Навык",
        }
    }
}

/// One questionnaire step.
#[derive(Debug, Clone)]
pub struct Question {
    pub key: QuestionKey,
    pub prompt: &'static str,
    pub skippable: bool,
    pub skip_label: Option<&'static str>,
}

/// The questionnaire, in presentation order. Immutable configuration:
/// step N of a session always refers to QUESTIONS[N].
pub static QUESTIONS: Lazy<Vec<Question>> = Lazy::new(|| {
    vec![
        Question {
            key: QuestionKey::Name,
            prompt: "Как тебя зовут?",
            skippable: false,
            skip_label: None,
        },
        Question {
            key: QuestionKey::Age,
            prompt: "Сколько тебе лет?",
            skippable: false,
            skip_label: None,
        },
        Question {
            key: QuestionKey::Skill,
            prompt: "Чем ты занимаешься / какой у тебя навык?",
            skippable: true,
            skip_label: Some("Пропустить"),
        },
    ]
});

/// Maximum length for the name answer
pub const MAX_NAME_LEN: usize = 30;

/// Maximum length for the free-form skill answer
pub const MAX_SKILL_LEN: usize = 70;

/// Validates a raw answer for the given question.
///
/// Returns the string to store (the skip sentinel for a skipped question,
/// the trimmed input otherwise). A `Validation` error carries the exact
/// re-prompt text shown to the user; the session is left untouched.
pub fn validate_answer(question: &Question, raw: &str) -> AppResult<String> {
    let text = raw.trim();

    if question.skippable {
        if let Some(skip_label) = question.skip_label {
            if text == skip_label {
                return Ok(UNSPECIFIED.to_string());
            }
        }
    }

    match question.key {
        QuestionKey::Name => {
            if text.is_empty() || text.chars().count() > MAX_NAME_LEN {
                return Err(AppError::Validation(format!(
                    "Имя должно быть не длиннее {} символов. Попробуй ещё раз:",
                    MAX_NAME_LEN
                )));
            }
            Ok(text.to_string())
        }
        QuestionKey::Age => {
            // Deliberately loose: digits only, no sign/decimal/range check.
            if text.is_empty() || !text.chars().all(|c| c.is_ascii_digit()) {
                return Err(AppError::Validation(
                    "Возраст должен быть числом. Попробуй ещё раз:".to_string(),
                ));
            }
            Ok(text.to_string())
        }
        QuestionKey::Skill => {
            if text.is_empty() || text.chars().count() > MAX_SKILL_LEN {
                return Err(AppError::Validation(format!(
                    "Ответ должен быть не длиннее {} символов. Попробуй ещё раз:",
                    MAX_SKILL_LEN
                )));
            }
            Ok(text.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn question(key: QuestionKey) -> Question {
        QUESTIONS.iter().find(|q| q.key == key).cloned().unwrap()
    }

    #[test]
    fn test_questions_order_is_stable() {
        let keys: Vec<QuestionKey> = QUESTIONS.iter().map(|q| q.key).collect();
        assert_eq!(keys, vec![QuestionKey::Name, QuestionKey::Age, QuestionKey::Skill]);
    }

    #[test]
    fn test_name_boundary() {
        let q = question(QuestionKey::Name);
        let ok = "a".repeat(30);
        let too_long = "a".repeat(31);
        assert!(validate_answer(&q, &ok).is_ok());
        assert!(validate_answer(&q, &too_long).is_err());
        assert!(validate_answer(&q, "").is_err());
    }

    #[test]
    fn test_age_digits_only() {
        let q = question(QuestionKey::Age);
        assert_eq!(validate_answer(&q, "25").unwrap(), "25");
        assert!(validate_answer(&q, "25.5").is_err());
        assert!(validate_answer(&q, "-1").is_err());
        assert!(validate_answer(&q, "").is_err());
    }

    #[test]
    fn test_age_no_range_check() {
        // The check is digits-only on purpose, not a numeric range.
        let q = question(QuestionKey::Age);
        assert!(validate_answer(&q, "0").is_ok());
        assert!(validate_answer(&q, "99999").is_ok());
    }

    #[test]
    fn test_skill_boundary() {
        let q = question(QuestionKey::Skill);
        let ok = "b".repeat(70);
        let too_long = "b".repeat(71);
        assert!(validate_answer(&q, &ok).is_ok());
        assert!(validate_answer(&q, &too_long).is_err());
    }

    #[test]
    fn test_skip_label_stores_sentinel() {
        let q = question(QuestionKey::Skill);
        assert_eq!(validate_answer(&q, "Пропустить").unwrap(), UNSPECIFIED);
    }

    #[test]
    fn test_skip_label_ignored_for_non_skippable() {
        let q = question(QuestionKey::Name);
        // "Пропустить" is just a (valid) name here.
        assert_eq!(validate_answer(&q, "Пропустить").unwrap(), "Пропустить");
    }

    #[test]
    fn test_answers_are_trimmed() {
        let q = question(QuestionKey::Name);
        assert_eq!(validate_answer(&q, "  Вася  ").unwrap(), "Вася");
    }
}
