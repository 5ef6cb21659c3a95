//! Validated payloads for the programmatic (JSON-in-caption) admin commands.

use serde::Deserialize;
use validator::Validate;

use crate::dto::question::Difficulty;

/// How a payload's difficulty field was resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolvedDifficulty {
    /// The payload named a valid tier.
    Given(Difficulty),
    /// The payload omitted the tier; the default applies.
    Defaulted(Difficulty),
    /// The payload named an unknown tier; coerced to the default with a notice.
    Coerced(Difficulty),
}

impl ResolvedDifficulty {
    /// The tier to use regardless of how it was determined.
    pub fn value(&self) -> Difficulty {
        match self {
            ResolvedDifficulty::Given(d)
            | ResolvedDifficulty::Defaulted(d)
            | ResolvedDifficulty::Coerced(d) => *d,
        }
    }

    /// Whether the operator should be told the tier was replaced.
    pub fn was_coerced(&self) -> bool {
        matches!(self, ResolvedDifficulty::Coerced(_))
    }
}

/// Resolve an optional difficulty string, defaulting to medium.
pub fn resolve_difficulty(raw: Option<&str>) -> ResolvedDifficulty {
    match raw {
        None => ResolvedDifficulty::Defaulted(Difficulty::Medium),
        Some(value) => match value.parse::<Difficulty>() {
            Ok(difficulty) => ResolvedDifficulty::Given(difficulty),
            Err(_) => ResolvedDifficulty::Coerced(Difficulty::Medium),
        },
    }
}

/// JSON payload of `/add_face {...}` sent alongside a photo.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct FacePayload {
    /// Requested difficulty tier; defaults to medium.
    #[serde(default)]
    pub difficulty: Option<String>,
    /// Ordered answer options.
    #[validate(length(min = 2, message = "provide at least 2 options"))]
    pub options: Vec<String>,
    /// The correct option.
    #[validate(length(min = 1, message = "provide correctAnswer"))]
    pub correct_answer: String,
    /// Reveal order override for the photo fragments.
    #[serde(default)]
    pub parts: Option<Vec<String>>,
}

/// JSON payload of `/add_melody {...}` and `/add_voice {...}` sent alongside audio.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct AudioPayload {
    /// Requested difficulty tier; defaults to medium.
    #[serde(default)]
    pub difficulty: Option<String>,
    /// Ordered answer options.
    #[validate(length(min = 2, message = "provide at least 2 options"))]
    pub options: Vec<String>,
    /// The correct option.
    #[validate(length(min = 1, message = "provide correctAnswer"))]
    pub correct_answer: String,
}

/// JSON payload of `/add_quote {...}`; needs no attachment.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct QuotePayload {
    /// Requested difficulty tier; defaults to medium.
    #[serde(default)]
    pub difficulty: Option<String>,
    /// The quoted text.
    #[validate(length(min = 1, message = "provide quote"))]
    pub quote: String,
    /// Quiz sub-type (`source` or `continue`).
    #[validate(length(min = 1, message = "provide questionType"))]
    pub question_type: String,
    /// Ordered answer options.
    #[validate(length(min = 2, message = "provide at least 2 options"))]
    pub options: Vec<String>,
    /// The correct option.
    #[validate(length(min = 1, message = "provide correctAnswer"))]
    pub correct_answer: String,
    /// Reference for the quote.
    #[serde(default)]
    pub source: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn difficulty_defaults_to_medium() {
        assert_eq!(
            resolve_difficulty(None),
            ResolvedDifficulty::Defaulted(Difficulty::Medium)
        );
        assert_eq!(
            resolve_difficulty(Some("hard")),
            ResolvedDifficulty::Given(Difficulty::Hard)
        );
        let coerced = resolve_difficulty(Some("impossible"));
        assert_eq!(coerced.value(), Difficulty::Medium);
        assert!(coerced.was_coerced());
    }

    #[test]
    fn face_payload_requires_two_options() {
        let payload: FacePayload = serde_json::from_str(
            r#"{"difficulty":"easy","options":["Mary"],"correctAnswer":"Mary"}"#,
        )
        .unwrap();
        assert!(payload.validate().is_err());

        let payload: FacePayload = serde_json::from_str(
            r#"{"options":["Mary","Joseph"],"correctAnswer":"Mary"}"#,
        )
        .unwrap();
        assert!(payload.validate().is_ok());
        assert!(payload.difficulty.is_none());
    }

    #[test]
    fn quote_payload_requires_all_text_fields() {
        let payload: QuotePayload = serde_json::from_str(
            r#"{"quote":"","questionType":"source","options":["John","Luke"],"correctAnswer":"John"}"#,
        )
        .unwrap();
        assert!(payload.validate().is_err());
    }
}
