//! Statically bundled question sets, used as fallback and seed content.

use std::{env, fs, io::ErrorKind, path::PathBuf};

use serde::Deserialize;
use tracing::{info, warn};

use crate::dto::question::{
    AudioQuestion, CalendarQuestion, Difficulty, FaceQuestion, Question, QuoteQuestion, RoundKind,
    default_face_parts,
};

/// Default location on disk where the server looks for a JSON catalog override.
const DEFAULT_CATALOG_PATH: &str = "config/catalog.json";
/// Environment variable that overrides [`DEFAULT_CATALOG_PATH`].
const CATALOG_PATH_ENV: &str = "CHRISTMAS_CATALOG_PATH";

/// Bundled question sets per round and difficulty.
///
/// Served whenever the content store is unreachable, unconfigured, or has no
/// rows for the requested round and tier.
#[derive(Debug, Clone)]
pub struct StaticContentCatalog {
    guess_face: DifficultyTiers,
    guess_melody: DifficultyTiers,
    bible_quotes: DifficultyTiers,
    guess_voice: DifficultyTiers,
    calendar: Vec<Question>,
}

/// Question lists split by difficulty tier.
#[derive(Debug, Clone, Default, Deserialize)]
struct DifficultyTiers {
    #[serde(default)]
    easy: Vec<Question>,
    #[serde(default)]
    medium: Vec<Question>,
    #[serde(default)]
    hard: Vec<Question>,
}

impl DifficultyTiers {
    fn tier(&self, difficulty: Difficulty) -> &[Question] {
        match difficulty {
            Difficulty::Easy => &self.easy,
            Difficulty::Medium => &self.medium,
            Difficulty::Hard => &self.hard,
        }
    }
}

impl StaticContentCatalog {
    /// Load the catalog from disk, falling back to the baked-in default sets.
    pub fn load() -> Self {
        let path = resolve_catalog_path();
        match fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str::<RawCatalog>(&contents) {
                Ok(raw) => {
                    let catalog: Self = raw.into();
                    info!(path = %path.display(), "loaded question catalog from file");
                    catalog
                }
                Err(err) => {
                    warn!(
                        path = %path.display(),
                        error = %err,
                        "failed to parse catalog; falling back to bundled sets"
                    );
                    Self::default()
                }
            },
            Err(err) if err.kind() == ErrorKind::NotFound => {
                info!(
                    path = %path.display(),
                    "catalog file not found; using bundled sets"
                );
                Self::default()
            }
            Err(err) => {
                warn!(
                    path = %path.display(),
                    error = %err,
                    "failed to read catalog; falling back to bundled sets"
                );
                Self::default()
            }
        }
    }

    /// Bundled questions for a round and tier.
    ///
    /// The calendar round ignores the difficulty. Rounds with no content for
    /// the requested tier yield an empty slice.
    pub fn questions(&self, round: RoundKind, difficulty: Difficulty) -> &[Question] {
        match round {
            RoundKind::GuessFace => self.guess_face.tier(difficulty),
            RoundKind::GuessMelody => self.guess_melody.tier(difficulty),
            RoundKind::BibleQuotes => self.bible_quotes.tier(difficulty),
            RoundKind::GuessVoice => self.guess_voice.tier(difficulty),
            RoundKind::Calendar => &self.calendar,
        }
    }
}

impl Default for StaticContentCatalog {
    fn default() -> Self {
        Self {
            guess_face: DifficultyTiers {
                easy: vec![face("/images/faces/person1.jpg", &["Mary", "Joseph", "Peter", "Anna"], "Mary")],
                medium: vec![face("/images/faces/person2.jpg", &["Mary", "Joseph", "Peter", "Anna"], "Joseph")],
                hard: Vec::new(),
            },
            guess_melody: DifficultyTiers {
                easy: vec![
                    audio("/audio/melodies/m_001.mp3", &["Silent Night", "Jingle Bells", "O Holy Night"], "Silent Night"),
                    audio("/audio/melodies/m_002.mp3", &["Silent Night", "Jingle Bells", "O Holy Night"], "Jingle Bells"),
                ],
                medium: vec![
                    audio("/audio/melodies/m_010.mp3", &["O Come All Ye Faithful", "The First Noel", "Joy to the World"], "The First Noel"),
                ],
                hard: Vec::new(),
            },
            bible_quotes: DifficultyTiers {
                easy: vec![
                    quote(
                        "For God so loved the world, that he gave his only begotten Son",
                        "source",
                        &["John", "Luke", "Matthew"],
                        "John",
                        "John 3:16",
                    ),
                    quote(
                        "Glory to God in the highest, and on earth peace",
                        "source",
                        &["Luke", "Mark", "John"],
                        "Luke",
                        "Luke 2:14",
                    ),
                ],
                medium: vec![quote(
                    "And she brought forth her firstborn son, and wrapped him in swaddling clothes",
                    "continue",
                    &[
                        "and laid him in a manger",
                        "and laid him in a cradle",
                        "and carried him to the temple",
                    ],
                    "and laid him in a manger",
                    "Luke 2:7",
                )],
                hard: Vec::new(),
            },
            guess_voice: DifficultyTiers {
                easy: vec![audio("/audio/voices/v_001.mp3", &["Mary", "Joseph", "Peter", "Anna"], "Mary")],
                medium: Vec::new(),
                hard: Vec::new(),
            },
            calendar: vec![
                Question::Calendar(CalendarQuestion {
                    question_type: "date".into(),
                    image: Some("/images/calendar/photo1.jpg".into()),
                    date: None,
                    options: vec![
                        "January 1".into(),
                        "January 7".into(),
                        "December 25".into(),
                    ],
                    correct_answer: "January 7".into(),
                }),
                Question::Calendar(CalendarQuestion {
                    question_type: "birthday".into(),
                    image: None,
                    date: Some("December 25".into()),
                    options: vec!["Mary".into(), "Joseph".into(), "Peter".into()],
                    correct_answer: "Joseph".into(),
                }),
            ],
        }
    }
}

#[derive(Debug, Deserialize)]
/// JSON representation of the catalog file located at [`DEFAULT_CATALOG_PATH`].
struct RawCatalog {
    #[serde(default, rename = "guess-face")]
    guess_face: DifficultyTiers,
    #[serde(default, rename = "guess-melody")]
    guess_melody: DifficultyTiers,
    #[serde(default, rename = "bible-quotes")]
    bible_quotes: DifficultyTiers,
    #[serde(default, rename = "guess-voice")]
    guess_voice: DifficultyTiers,
    #[serde(default)]
    calendar: Vec<Question>,
}

impl From<RawCatalog> for StaticContentCatalog {
    fn from(raw: RawCatalog) -> Self {
        Self {
            guess_face: raw.guess_face,
            guess_melody: raw.guess_melody,
            bible_quotes: raw.bible_quotes,
            guess_voice: raw.guess_voice,
            calendar: raw.calendar,
        }
    }
}

/// Resolve the catalog path taking the environment override into account.
fn resolve_catalog_path() -> PathBuf {
    env::var_os(CATALOG_PATH_ENV)
        .map(PathBuf::from)
        .filter(|path| !path.as_os_str().is_empty())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CATALOG_PATH))
}

fn face(image: &str, options: &[&str], correct: &str) -> Question {
    Question::Face(FaceQuestion {
        image: image.into(),
        parts: default_face_parts(),
        options: options.iter().map(|s| s.to_string()).collect(),
        correct_answer: correct.into(),
    })
}

fn audio(audio_url: &str, options: &[&str], correct: &str) -> Question {
    Question::Audio(AudioQuestion {
        audio_url: audio_url.into(),
        options: options.iter().map(|s| s.to_string()).collect(),
        correct_answer: correct.into(),
    })
}

fn quote(text: &str, question_type: &str, options: &[&str], correct: &str, source: &str) -> Question {
    Question::Quote(QuoteQuestion {
        quote: text.into(),
        question_type: question_type.into(),
        options: options.iter().map(|s| s.to_string()).collect(),
        correct_answer: correct.into(),
        source: source.into(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_round_yields_a_list() {
        let catalog = StaticContentCatalog::default();
        for round in RoundKind::ALL {
            // Not every tier has content, but lookups must always succeed.
            let _ = catalog.questions(round, Difficulty::Easy);
            let _ = catalog.questions(round, Difficulty::Hard);
        }
        assert!(!catalog.questions(RoundKind::BibleQuotes, Difficulty::Easy).is_empty());
    }

    #[test]
    fn calendar_ignores_difficulty() {
        let catalog = StaticContentCatalog::default();
        assert_eq!(
            catalog.questions(RoundKind::Calendar, Difficulty::Easy),
            catalog.questions(RoundKind::Calendar, Difficulty::Hard),
        );
    }

    #[test]
    fn options_meet_the_minimum_everywhere() {
        let catalog = StaticContentCatalog::default();
        for round in RoundKind::ALL {
            for difficulty in [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard] {
                for question in catalog.questions(round, difficulty) {
                    assert!(question.options().len() >= 2, "{round} has a thin question");
                    assert!(
                        question
                            .options()
                            .iter()
                            .any(|option| option == question.correct_answer()),
                        "{round} has an answer outside its options"
                    );
                }
            }
        }
    }
}
