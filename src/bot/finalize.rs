//! Finalize pipeline: download the attachment, upload it to object storage,
//! write the question or icon row.

use time::OffsetDateTime;
use tracing::info;

use crate::bot::api::DownloadedFile;
use crate::bot::conversation::{ConversationState, FlowKind, MediaKind, MediaRef};
use crate::dao::models::{AudioQuestionRow, FaceQuestionRow, IconRow, QuoteQuestionRow};
use crate::dto::question::{Difficulty, RoundKind};
use crate::error::ServiceError;
use crate::state::SharedState;

/// Result of a finalize attempt that reached the validation gate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FinalizeOutcome {
    /// Row persisted; carries the public media URL when one was uploaded.
    Saved(Option<String>),
    /// Fewer than two options were collected; the flow reopens the options
    /// loop instead of failing.
    NeedMoreOptions,
}

/// Run the full pipeline for a completed conversational flow.
///
/// Failures leave the conversation untouched so the operator can retry
/// without re-entering collected fields.
pub async fn finalize(
    state: &SharedState,
    convo: &ConversationState,
    difficulty: Difficulty,
) -> Result<FinalizeOutcome, ServiceError> {
    if convo.kind != FlowKind::AddIcon && convo.fields.options.len() < 2 {
        return Ok(FinalizeOutcome::NeedMoreOptions);
    }

    match convo.kind {
        FlowKind::AddIcon => {
            let round = convo
                .icon_round
                .ok_or_else(|| ServiceError::InvalidInput("icon flow lost its round".into()))?;
            let media = required_media(convo)?;
            let url = upload_round_icon(state, round, media).await?;
            Ok(FinalizeOutcome::Saved(Some(url)))
        }
        FlowKind::AddQuote => {
            let row = quote_row(convo, difficulty)?;
            let store = state.content_store().await.ok_or(ServiceError::Degraded)?;
            store.insert_quote_question(row).await?;
            info!(difficulty = %difficulty, "quote question persisted");
            Ok(FinalizeOutcome::Saved(None))
        }
        FlowKind::AddFace => {
            let media = required_media(convo)?;
            let url =
                upload_question_media(state, RoundKind::GuessFace, difficulty, media).await?;
            let row = FaceQuestionRow {
                difficulty,
                image_url: url.clone(),
                parts: None,
                options: convo.fields.options.clone(),
                correct_answer: required_field(&convo.fields.correct_answer, "correct answer")?,
            };
            let store = state.content_store().await.ok_or(ServiceError::Degraded)?;
            store.insert_face_question(row).await?;
            info!(difficulty = %difficulty, "face question persisted");
            Ok(FinalizeOutcome::Saved(Some(url)))
        }
        FlowKind::AddMelody | FlowKind::AddVoice => {
            let round = match convo.kind {
                FlowKind::AddMelody => RoundKind::GuessMelody,
                _ => RoundKind::GuessVoice,
            };
            let media = required_media(convo)?;
            let url = upload_question_media(state, round, difficulty, media).await?;
            let row = AudioQuestionRow {
                difficulty,
                audio_url: url.clone(),
                options: convo.fields.options.clone(),
                correct_answer: required_field(&convo.fields.correct_answer, "correct answer")?,
            };
            let store = state.content_store().await.ok_or(ServiceError::Degraded)?;
            match round {
                RoundKind::GuessMelody => store.insert_melody_question(row).await?,
                _ => store.insert_voice_question(row).await?,
            }
            info!(round = %round, difficulty = %difficulty, "audio question persisted");
            Ok(FinalizeOutcome::Saved(Some(url)))
        }
    }
}

/// Download question media and upload it under a timestamp-unique path.
pub async fn upload_question_media(
    state: &SharedState,
    round: RoundKind,
    difficulty: Difficulty,
    media: &MediaRef,
) -> Result<String, ServiceError> {
    let telegram = state
        .telegram()
        .ok_or_else(|| ServiceError::InvalidInput("bot transport is not configured".into()))?;
    let file = telegram.fetch_file(&media.file_id).await?;
    let content_type = content_type_of(media, &file);
    let extension = extension_of(media, &file, &content_type);
    let path = question_object_path(round, difficulty, &extension);

    let store = state.content_store().await.ok_or(ServiceError::Degraded)?;
    let url = store
        .put_object(path, file.bytes, content_type, false)
        .await?;
    Ok(url)
}

/// Download an icon image and upload it under the round-keyed overwrite path.
pub async fn upload_round_icon(
    state: &SharedState,
    round: RoundKind,
    media: &MediaRef,
) -> Result<String, ServiceError> {
    let telegram = state
        .telegram()
        .ok_or_else(|| ServiceError::InvalidInput("bot transport is not configured".into()))?;
    let file = telegram.fetch_file(&media.file_id).await?;
    let content_type = content_type_of(media, &file);
    let extension = extension_of(media, &file, &content_type);
    let path = format!("icons/{}.{extension}", round.id());

    let store = state.content_store().await.ok_or(ServiceError::Degraded)?;
    let url = store
        .put_object(path, file.bytes, content_type, true)
        .await?;
    store
        .upsert_round_icon(IconRow {
            round_id: round.id().to_owned(),
            icon_url: url.clone(),
            updated_at: None,
        })
        .await?;
    info!(round = %round, "round icon replaced");
    Ok(url)
}

/// Build the quote row out of the collected fields.
fn quote_row(
    convo: &ConversationState,
    difficulty: Difficulty,
) -> Result<QuoteQuestionRow, ServiceError> {
    Ok(QuoteQuestionRow {
        difficulty,
        quote: required_field(&convo.fields.quote, "quote")?,
        question_type: required_field(&convo.fields.question_type, "question type")?,
        options: convo.fields.options.clone(),
        correct_answer: required_field(&convo.fields.correct_answer, "correct answer")?,
        source: convo.fields.source.clone(),
    })
}

fn required_media(convo: &ConversationState) -> Result<&MediaRef, ServiceError> {
    convo
        .fields
        .media
        .as_ref()
        .ok_or_else(|| ServiceError::InvalidInput("submission is missing its attachment".into()))
}

fn required_field(value: &Option<String>, name: &str) -> Result<String, ServiceError> {
    value
        .clone()
        .ok_or_else(|| ServiceError::InvalidInput(format!("submission is missing its {name}")))
}

/// Storage path for question media: unique per upload via a millisecond
/// timestamp, never overwritten.
fn question_object_path(round: RoundKind, difficulty: Difficulty, extension: &str) -> String {
    let timestamp = OffsetDateTime::now_utc().unix_timestamp_nanos() / 1_000_000;
    let folder = match round {
        RoundKind::GuessFace => "images/faces",
        RoundKind::GuessMelody => "audio/melodies",
        RoundKind::GuessVoice => "audio/voices",
        RoundKind::BibleQuotes | RoundKind::Calendar => "misc",
    };
    format!("{folder}/{difficulty}/{timestamp}.{extension}")
}

fn content_type_of(media: &MediaRef, file: &DownloadedFile) -> String {
    media
        .mime_type
        .clone()
        .or_else(|| file.content_type.clone())
        .unwrap_or_else(|| match media.kind {
            MediaKind::Photo => "image/jpeg".to_owned(),
            MediaKind::Audio => "audio/mpeg".to_owned(),
            MediaKind::Voice => "audio/ogg".to_owned(),
            MediaKind::Document => "application/octet-stream".to_owned(),
        })
}

fn extension_of(media: &MediaRef, file: &DownloadedFile, content_type: &str) -> String {
    if let Some(extension) = file.extension.clone() {
        return extension;
    }
    match content_type {
        "image/jpeg" => "jpg",
        "image/png" => "png",
        "image/webp" => "webp",
        "audio/mpeg" | "audio/mp3" => "mp3",
        "audio/ogg" => "ogg",
        "audio/mp4" | "audio/x-m4a" => "m4a",
        _ => match media.kind {
            MediaKind::Photo => "jpg",
            MediaKind::Audio => "mp3",
            MediaKind::Voice => "ogg",
            MediaKind::Document => "bin",
        },
    }
    .to_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::StaticContentCatalog;
    use crate::config::AppConfig;
    use crate::state::AppState;

    fn downloaded(content_type: Option<&str>, extension: Option<&str>) -> DownloadedFile {
        DownloadedFile {
            bytes: vec![1, 2, 3],
            content_type: content_type.map(str::to_owned),
            extension: extension.map(str::to_owned),
        }
    }

    fn media(kind: MediaKind, mime: Option<&str>) -> MediaRef {
        MediaRef {
            file_id: "file".into(),
            kind,
            mime_type: mime.map(str::to_owned),
        }
    }

    #[tokio::test]
    async fn too_few_options_reopen_the_loop_before_any_side_effect() {
        let state = AppState::new(AppConfig::default(), None, StaticContentCatalog::default());
        let (mut convo, _) =
            crate::bot::conversation::ConversationState::start(FlowKind::AddMelody, None);
        convo.fields.options.push("Silent Night".into());

        let outcome = finalize(&state, &convo, Difficulty::Medium).await.unwrap();
        assert_eq!(outcome, FinalizeOutcome::NeedMoreOptions);
    }

    #[test]
    fn question_paths_are_difficulty_scoped() {
        let path = question_object_path(RoundKind::GuessMelody, Difficulty::Hard, "mp3");
        assert!(path.starts_with("audio/melodies/hard/"));
        assert!(path.ends_with(".mp3"));

        let path = question_object_path(RoundKind::GuessFace, Difficulty::Easy, "png");
        assert!(path.starts_with("images/faces/easy/"));
    }

    #[test]
    fn content_type_prefers_sender_mime_then_server_header_then_kind() {
        let file = downloaded(Some("image/png"), None);
        assert_eq!(
            content_type_of(&media(MediaKind::Document, Some("image/webp")), &file),
            "image/webp"
        );
        assert_eq!(
            content_type_of(&media(MediaKind::Photo, None), &file),
            "image/png"
        );
        assert_eq!(
            content_type_of(&media(MediaKind::Voice, None), &downloaded(None, None)),
            "audio/ogg"
        );
    }

    #[test]
    fn extension_prefers_the_server_path_then_the_content_type() {
        let with_path = downloaded(Some("audio/mpeg"), Some("oga"));
        assert_eq!(
            extension_of(&media(MediaKind::Voice, None), &with_path, "audio/ogg"),
            "oga"
        );

        let without_path = downloaded(None, None);
        assert_eq!(
            extension_of(&media(MediaKind::Audio, None), &without_path, "audio/mpeg"),
            "mp3"
        );
        assert_eq!(
            extension_of(&media(MediaKind::Photo, None), &without_path, "text/plain"),
            "jpg"
        );
    }

    #[test]
    fn quote_rows_carry_every_collected_field() {
        let (mut convo, _) =
            crate::bot::conversation::ConversationState::start(FlowKind::AddQuote, None);
        convo.fields.question_type = Some("source".into());
        convo.fields.quote = Some("For God so loved the world".into());
        convo.fields.options = vec!["John".into(), "Luke".into()];
        convo.fields.correct_answer = Some("John".into());
        convo.fields.source = Some("John 3:16".into());

        let row = quote_row(&convo, Difficulty::Easy).unwrap();
        assert_eq!(row.question_type, "source");
        assert_eq!(row.options, vec!["John", "Luke"]);
        assert_eq!(row.correct_answer, "John");
        assert_eq!(row.source.as_deref(), Some("John 3:16"));

        convo.fields.correct_answer = None;
        assert!(quote_row(&convo, Difficulty::Easy).is_err());
    }
}
