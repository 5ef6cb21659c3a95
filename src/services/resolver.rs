//! Round content resolution: live content store rows with static fallback.

use tracing::{debug, warn};

use crate::dao::models::{AudioQuestionRow, FaceQuestionRow, QuoteQuestionRow};
use crate::dao::storage::StorageResult;
use crate::dto::question::{
    AudioQuestion, Difficulty, FaceQuestion, Question, QuoteQuestion, RoundKind,
    default_face_parts,
};
use crate::state::SharedState;

/// Resolve the question list for a round and tier.
///
/// Curated rows from the content store win when present; any failure mode
/// (store unconfigured, unreachable, zero rows, round without a live table)
/// silently degrades to the bundled catalog. This never fails and has no
/// side effects, so callers may retry freely.
pub async fn resolve(
    state: &SharedState,
    round: RoundKind,
    difficulty: Option<Difficulty>,
) -> Vec<Question> {
    let difficulty = difficulty.unwrap_or(Difficulty::Easy);
    let fallback = || state.catalog().questions(round, difficulty).to_vec();

    // Calendar content is static-only: no live table is mapped to it.
    if round == RoundKind::Calendar {
        return fallback();
    }

    let Some(store) = state.content_store().await else {
        debug!(%round, "content store not installed; serving bundled catalog");
        return fallback();
    };

    let result: StorageResult<Vec<Question>> = match round {
        RoundKind::GuessFace => store
            .face_questions(difficulty)
            .await
            .map(|rows| rows.into_iter().map(face_row_to_question).collect()),
        RoundKind::GuessMelody => store
            .melody_questions(difficulty)
            .await
            .map(|rows| rows.into_iter().map(audio_row_to_question).collect()),
        RoundKind::GuessVoice => store
            .voice_questions(difficulty)
            .await
            .map(|rows| rows.into_iter().map(audio_row_to_question).collect()),
        RoundKind::BibleQuotes => store
            .quote_questions(difficulty)
            .await
            .map(|rows| rows.into_iter().map(quote_row_to_question).collect()),
        RoundKind::Calendar => unreachable!("handled above"),
    };

    match result {
        Ok(questions) if !questions.is_empty() => questions,
        Ok(_) => {
            debug!(%round, %difficulty, "no curated rows; serving bundled catalog");
            fallback()
        }
        Err(err) => {
            warn!(error = %err, %round, %difficulty, "content store read failed; serving bundled catalog");
            fallback()
        }
    }
}

/// Map a face row onto the client shape, defaulting the reveal parts.
fn face_row_to_question(row: FaceQuestionRow) -> Question {
    Question::Face(FaceQuestion {
        image: row.image_url,
        parts: row.parts.unwrap_or_else(default_face_parts),
        options: row.options,
        correct_answer: row.correct_answer,
    })
}

fn audio_row_to_question(row: AudioQuestionRow) -> Question {
    Question::Audio(AudioQuestion {
        audio_url: row.audio_url,
        options: row.options,
        correct_answer: row.correct_answer,
    })
}

fn quote_row_to_question(row: QuoteQuestionRow) -> Question {
    Question::Quote(QuoteQuestion {
        quote: row.quote,
        question_type: row.question_type,
        options: row.options,
        correct_answer: row.correct_answer,
        source: row.source.unwrap_or_default(),
    })
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use futures::future::BoxFuture;

    use super::*;
    use crate::catalog::StaticContentCatalog;
    use crate::config::AppConfig;
    use crate::dao::content_store::ContentStore;
    use crate::dao::models::{AdminSessionRow, IconRow};
    use crate::dao::storage::StorageError;
    use crate::state::AppState;

    /// Store stub that either fails wholesale or serves canned rows.
    #[derive(Default)]
    struct StubStore {
        fail: bool,
        faces: Vec<FaceQuestionRow>,
        quotes: Vec<QuoteQuestionRow>,
    }

    fn offline() -> StorageError {
        StorageError::unavailable("stub offline".into(), std::io::Error::other("stub"))
    }

    impl ContentStore for StubStore {
        fn face_questions(
            &self,
            _difficulty: Difficulty,
        ) -> BoxFuture<'static, StorageResult<Vec<FaceQuestionRow>>> {
            let outcome = if self.fail {
                Err(offline())
            } else {
                Ok(self.faces.clone())
            };
            Box::pin(async move { outcome })
        }

        fn melody_questions(
            &self,
            _difficulty: Difficulty,
        ) -> BoxFuture<'static, StorageResult<Vec<AudioQuestionRow>>> {
            let outcome = if self.fail { Err(offline()) } else { Ok(Vec::new()) };
            Box::pin(async move { outcome })
        }

        fn voice_questions(
            &self,
            _difficulty: Difficulty,
        ) -> BoxFuture<'static, StorageResult<Vec<AudioQuestionRow>>> {
            let outcome = if self.fail { Err(offline()) } else { Ok(Vec::new()) };
            Box::pin(async move { outcome })
        }

        fn quote_questions(
            &self,
            _difficulty: Difficulty,
        ) -> BoxFuture<'static, StorageResult<Vec<QuoteQuestionRow>>> {
            let outcome = if self.fail {
                Err(offline())
            } else {
                Ok(self.quotes.clone())
            };
            Box::pin(async move { outcome })
        }

        fn insert_face_question(
            &self,
            _row: FaceQuestionRow,
        ) -> BoxFuture<'static, StorageResult<()>> {
            Box::pin(async { Ok(()) })
        }

        fn insert_melody_question(
            &self,
            _row: AudioQuestionRow,
        ) -> BoxFuture<'static, StorageResult<()>> {
            Box::pin(async { Ok(()) })
        }

        fn insert_voice_question(
            &self,
            _row: AudioQuestionRow,
        ) -> BoxFuture<'static, StorageResult<()>> {
            Box::pin(async { Ok(()) })
        }

        fn insert_quote_question(
            &self,
            _row: QuoteQuestionRow,
        ) -> BoxFuture<'static, StorageResult<()>> {
            Box::pin(async { Ok(()) })
        }

        fn round_icons(&self) -> BoxFuture<'static, StorageResult<Vec<IconRow>>> {
            let outcome = if self.fail { Err(offline()) } else { Ok(Vec::new()) };
            Box::pin(async move { outcome })
        }

        fn upsert_round_icon(&self, _row: IconRow) -> BoxFuture<'static, StorageResult<()>> {
            Box::pin(async { Ok(()) })
        }

        fn latest_session(
            &self,
            _operator_id: i64,
        ) -> BoxFuture<'static, StorageResult<Option<AdminSessionRow>>> {
            Box::pin(async { Ok(None) })
        }

        fn insert_session(&self, _row: AdminSessionRow) -> BoxFuture<'static, StorageResult<()>> {
            Box::pin(async { Ok(()) })
        }

        fn delete_sessions(&self, _operator_id: i64) -> BoxFuture<'static, StorageResult<()>> {
            Box::pin(async { Ok(()) })
        }

        fn put_object(
            &self,
            path: String,
            _bytes: Vec<u8>,
            _content_type: String,
            _overwrite: bool,
        ) -> BoxFuture<'static, StorageResult<String>> {
            Box::pin(async move { Ok(format!("https://store.example/{path}")) })
        }

        fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
            Box::pin(async { Ok(()) })
        }
    }

    fn state_without_store() -> SharedState {
        AppState::new(AppConfig::default(), None, StaticContentCatalog::default())
    }

    async fn state_with(store: StubStore) -> SharedState {
        let state = state_without_store();
        state.install_content_store(Arc::new(store)).await;
        state
    }

    #[tokio::test]
    async fn unconfigured_store_serves_the_bundled_easy_quote_set() {
        let state = state_without_store();
        let questions = resolve(&state, RoundKind::BibleQuotes, Some(Difficulty::Easy)).await;
        assert_eq!(
            questions,
            state
                .catalog()
                .questions(RoundKind::BibleQuotes, Difficulty::Easy)
        );
    }

    #[tokio::test]
    async fn store_failure_degrades_to_the_catalog_for_every_round() {
        let state = state_with(StubStore {
            fail: true,
            ..StubStore::default()
        })
        .await;

        for round in RoundKind::ALL {
            let questions = resolve(&state, round, Some(Difficulty::Easy)).await;
            assert_eq!(
                questions,
                state.catalog().questions(round, Difficulty::Easy),
                "{round} must fall back"
            );
        }
    }

    #[tokio::test]
    async fn zero_rows_fall_back_but_curated_rows_win() {
        let curated = QuoteQuestionRow {
            difficulty: Difficulty::Easy,
            quote: "Fear not: for, behold, I bring you good tidings".into(),
            question_type: "source".into(),
            options: vec!["Luke".into(), "John".into()],
            correct_answer: "Luke".into(),
            source: None,
        };
        let state = state_with(StubStore {
            quotes: vec![curated],
            ..StubStore::default()
        })
        .await;

        // Melody table is empty, so the catalog set is served.
        let melodies = resolve(&state, RoundKind::GuessMelody, Some(Difficulty::Easy)).await;
        assert_eq!(
            melodies,
            state
                .catalog()
                .questions(RoundKind::GuessMelody, Difficulty::Easy)
        );

        // Quote table has a row, which replaces the catalog set.
        let quotes = resolve(&state, RoundKind::BibleQuotes, Some(Difficulty::Easy)).await;
        assert_eq!(quotes.len(), 1);
        match &quotes[0] {
            Question::Quote(q) => {
                assert_eq!(q.correct_answer, "Luke");
                assert_eq!(q.source, "");
            }
            other => panic!("expected quote question, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn face_rows_get_default_parts_when_null() {
        let state = state_with(StubStore {
            faces: vec![FaceQuestionRow {
                difficulty: Difficulty::Medium,
                image_url: "https://store.example/images/faces/medium/1.jpg".into(),
                parts: None,
                options: vec!["Mary".into(), "Joseph".into()],
                correct_answer: "Mary".into(),
            }],
            ..StubStore::default()
        })
        .await;

        let questions = resolve(&state, RoundKind::GuessFace, Some(Difficulty::Medium)).await;
        match &questions[0] {
            Question::Face(q) => assert_eq!(q.parts, default_face_parts()),
            other => panic!("expected face question, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn calendar_is_always_static() {
        let state = state_with(StubStore::default()).await;
        let questions = resolve(&state, RoundKind::Calendar, None).await;
        assert_eq!(
            questions,
            state.catalog().questions(RoundKind::Calendar, Difficulty::Easy)
        );
    }
}
