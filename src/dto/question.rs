//! Round identifiers, difficulty tiers, and the question payloads served to players.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Reveal order used when a face question row carries no explicit parts list.
pub const DEFAULT_FACE_PARTS: [&str; 5] = ["nose", "eyes", "mouth", "hands", "full"];

/// One trivia round (game mode).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "kebab-case")]
pub enum RoundKind {
    /// Guess the person from progressively revealed photo fragments.
    GuessFace,
    /// Guess the song from an audio snippet.
    GuessMelody,
    /// Complete or attribute a bible quote.
    BibleQuotes,
    /// Guess the speaker from a voice recording.
    GuessVoice,
    /// Calendar trivia (dates and birthdays).
    Calendar,
}

impl RoundKind {
    /// All rounds in their display order.
    pub const ALL: [RoundKind; 5] = [
        RoundKind::GuessFace,
        RoundKind::GuessMelody,
        RoundKind::BibleQuotes,
        RoundKind::GuessVoice,
        RoundKind::Calendar,
    ];

    /// Stable identifier used in URLs, storage paths, and callback data.
    pub fn id(&self) -> &'static str {
        match self {
            RoundKind::GuessFace => "guess-face",
            RoundKind::GuessMelody => "guess-melody",
            RoundKind::BibleQuotes => "bible-quotes",
            RoundKind::GuessVoice => "guess-voice",
            RoundKind::Calendar => "calendar",
        }
    }

    /// Human-readable round title for operator-facing messages.
    pub fn title(&self) -> &'static str {
        match self {
            RoundKind::GuessFace => "Guess the Face",
            RoundKind::GuessMelody => "Guess the Melody",
            RoundKind::BibleQuotes => "Bible Quotes",
            RoundKind::GuessVoice => "Guess the Voice",
            RoundKind::Calendar => "Calendar",
        }
    }
}

impl fmt::Display for RoundKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for RoundKind {
    type Err = UnknownRound;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        RoundKind::ALL
            .into_iter()
            .find(|round| round.id() == value)
            .ok_or_else(|| UnknownRound {
                value: value.to_owned(),
            })
    }
}

/// Error returned when a string does not name a known round.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown round `{value}`")]
pub struct UnknownRound {
    /// The rejected identifier.
    pub value: String,
}

/// Question pool tier within a round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    /// Entry tier.
    Easy,
    /// Default tier for admin submissions.
    Medium,
    /// Hardest tier.
    Hard,
}

impl Difficulty {
    /// Stable lowercase identifier used in URLs, rows, and storage paths.
    pub fn id(&self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for Difficulty {
    type Err = UnknownDifficulty;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "easy" => Ok(Difficulty::Easy),
            "medium" => Ok(Difficulty::Medium),
            "hard" => Ok(Difficulty::Hard),
            other => Err(UnknownDifficulty {
                value: other.to_owned(),
            }),
        }
    }
}

/// Error returned when a string does not name a difficulty tier.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown difficulty `{value}`")]
pub struct UnknownDifficulty {
    /// The rejected identifier.
    pub value: String,
}

/// A single playable question, shaped per round kind.
///
/// Serialized untagged so each kind keeps the flat field layout the web
/// client consumes. Variant order matters for deserialization: quote rows are
/// recognised by `quote`, calendar rows by `questionType`, face rows by
/// `image`, and audio rows by `audioUrl`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(untagged)]
pub enum Question {
    /// Bible quote completion/attribution question.
    Quote(QuoteQuestion),
    /// Calendar trivia question.
    Calendar(CalendarQuestion),
    /// Face-fragment guessing question.
    Face(FaceQuestion),
    /// Audio question, used by both melody and voice rounds.
    Audio(AudioQuestion),
}

impl Question {
    /// Ordered answer options shared by every question shape.
    pub fn options(&self) -> &[String] {
        match self {
            Question::Quote(q) => &q.options,
            Question::Calendar(q) => &q.options,
            Question::Face(q) => &q.options,
            Question::Audio(q) => &q.options,
        }
    }

    /// The expected answer, always one of [`Question::options`] for curated content.
    pub fn correct_answer(&self) -> &str {
        match self {
            Question::Quote(q) => &q.correct_answer,
            Question::Calendar(q) => &q.correct_answer,
            Question::Face(q) => &q.correct_answer,
            Question::Audio(q) => &q.correct_answer,
        }
    }
}

/// Face-fragment question: an image revealed piece by piece.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FaceQuestion {
    /// Public URL of the face photo.
    pub image: String,
    /// Reveal order of the photo fragments.
    #[serde(default = "default_face_parts")]
    pub parts: Vec<String>,
    /// Ordered answer options.
    pub options: Vec<String>,
    /// The correct option.
    pub correct_answer: String,
}

/// Audio question used by the melody and voice rounds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AudioQuestion {
    /// Public URL of the audio clip.
    pub audio_url: String,
    /// Ordered answer options.
    pub options: Vec<String>,
    /// The correct option.
    pub correct_answer: String,
}

/// Bible quote question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct QuoteQuestion {
    /// The quoted text shown to the player.
    pub quote: String,
    /// Sub-type of the quiz (`source` or `continue`).
    pub question_type: String,
    /// Ordered answer options.
    pub options: Vec<String>,
    /// The correct option.
    pub correct_answer: String,
    /// Reference for the quote (e.g. "John 3:16").
    #[serde(default)]
    pub source: String,
}

/// Calendar trivia question: guess a date from a photo, or a person from a date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CalendarQuestion {
    /// Sub-type of the question (`date` or `birthday`).
    pub question_type: String,
    /// Photo shown for `date` questions.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    /// Date shown for `birthday` questions.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    /// Ordered answer options.
    pub options: Vec<String>,
    /// The correct option.
    pub correct_answer: String,
}

/// Default reveal parts for face questions missing an explicit list.
pub fn default_face_parts() -> Vec<String> {
    DEFAULT_FACE_PARTS.iter().map(|part| part.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_ids_round_trip() {
        for round in RoundKind::ALL {
            assert_eq!(round.id().parse::<RoundKind>().unwrap(), round);
        }
        assert!("guess-something".parse::<RoundKind>().is_err());
    }

    #[test]
    fn untagged_question_picks_the_right_shape() {
        let face: Question = serde_json::from_value(serde_json::json!({
            "image": "/images/faces/person1.jpg",
            "options": ["Mary", "Joseph"],
            "correctAnswer": "Mary",
        }))
        .unwrap();
        match face {
            Question::Face(q) => assert_eq!(q.parts, default_face_parts()),
            other => panic!("expected face question, got {other:?}"),
        }

        let calendar: Question = serde_json::from_value(serde_json::json!({
            "questionType": "birthday",
            "date": "December 25",
            "options": ["Mary", "Joseph"],
            "correctAnswer": "Joseph",
        }))
        .unwrap();
        assert!(matches!(calendar, Question::Calendar(_)));

        let quote: Question = serde_json::from_value(serde_json::json!({
            "quote": "For God so loved the world",
            "questionType": "source",
            "options": ["John", "Luke"],
            "correctAnswer": "John",
            "source": "John 3:16",
        }))
        .unwrap();
        assert!(matches!(quote, Question::Quote(_)));
    }

    #[test]
    fn audio_question_serializes_camel_case() {
        let question = Question::Audio(AudioQuestion {
            audio_url: "/audio/melodies/m1.mp3".into(),
            options: vec!["Silent Night".into(), "Jingle Bells".into()],
            correct_answer: "Silent Night".into(),
        });
        let value = serde_json::to_value(&question).unwrap();
        assert_eq!(value["audioUrl"], "/audio/melodies/m1.mp3");
        assert_eq!(value["correctAnswer"], "Silent Night");
    }
}
