//! Telegram-driven operator console.
//!
//! [`process_update`] is the single entry point fed by the webhook route. No
//! error escapes it; every failure turns into an operator-facing message or a
//! log line.

pub mod api;
pub mod commands;
pub mod conversation;
pub mod finalize;
pub mod keyboards;

use tracing::{debug, warn};
use validator::Validate;

use crate::bot::commands::{Command, ParsedCommand};
use crate::bot::conversation::{ConversationState, FlowKind, StepAction, extract_audio, extract_image};
use crate::bot::finalize::FinalizeOutcome;
use crate::dto::payload::{AudioPayload, FacePayload, QuotePayload, resolve_difficulty};
use crate::dto::question::{Difficulty, RoundKind};
use crate::dto::telegram::{
    AnswerCallbackQuery, CallbackQuery, InlineKeyboardMarkup, Message, SendMessage, Update,
};
use crate::services::{session, status};
use crate::state::SharedState;

/// Difficulty applied to conversational submissions, which carry no tier step.
const CONVERSATIONAL_DIFFICULTY: Difficulty = Difficulty::Medium;

const MSG_NOT_LOGGED_IN: &str = "You need to log in first: /login <password>.";
const MSG_AUTH_UNAVAILABLE: &str =
    "I cannot verify your session right now, the content store is unreachable. Try again later.";
const MSG_SAVE_FAILED: &str =
    "Saving failed, nothing was lost. Send the last item again to retry, or /cancel.";
const MSG_FLOW_IN_PROGRESS: &str =
    "You are in the middle of a submission. Finish it or send /cancel first.";

const HELP_TEXT: &str = "Commands:\n\
    /menu - main menu\n\
    /login <password> - open an admin session\n\
    /logout - close your session\n\
    /status - deployment status\n\
    /add_face, /add_melody, /add_voice, /add_quote - add a question\n\
    /add_icon - replace a round icon\n\
    /done - finish collecting options\n\
    /cancel - abort the current submission";

/// Handle one inbound webhook update to completion.
pub async fn process_update(state: &SharedState, update: Update) {
    if let Some(query) = update.callback_query {
        handle_callback(state, query).await;
        return;
    }
    if let Some(message) = update.message.or(update.edited_message) {
        handle_message(state, message).await;
    }
}

async fn handle_message(state: &SharedState, message: Message) {
    let chat_id = message.chat.id;
    let operator_id = message.from.as_ref().map_or(chat_id, |user| user.id);

    match commands::parse(message.text_or_caption()) {
        Some(parsed) => handle_command(state, &message, chat_id, operator_id, parsed).await,
        None => handle_plain_message(state, &message, chat_id, operator_id).await,
    }
}

async fn handle_command(
    state: &SharedState,
    message: &Message,
    chat_id: i64,
    operator_id: i64,
    parsed: ParsedCommand,
) {
    match parsed.command {
        Command::Cancel => {
            let had_flow = state.conversations().remove(&operator_id).is_some();
            let text = if had_flow {
                "Cancelled. Back to the start."
            } else {
                "Nothing to cancel."
            };
            send(state, chat_id, text, Some(keyboards::main_menu())).await;
        }
        Command::Done => {
            let action = state
                .conversations()
                .get_mut(&operator_id)
                .map(|mut convo| convo.finish_options());
            match action {
                Some(StepAction::Reply(text) | StepAction::Advanced(text)) => {
                    send(state, chat_id, &text, None).await;
                }
                Some(StepAction::Finalize) => unreachable!("done never finalizes directly"),
                None => {
                    send(state, chat_id, "No submission in progress.", None).await;
                }
            }
        }
        _ if state.conversations().contains_key(&operator_id) => {
            send(state, chat_id, MSG_FLOW_IN_PROGRESS, None).await;
        }
        Command::Start => {
            send(
                state,
                chat_id,
                "Ho ho ho! This is the Christmas Mysteries content console.",
                Some(keyboards::main_menu()),
            )
            .await;
        }
        Command::Help => send(state, chat_id, HELP_TEXT, None).await,
        Command::Menu => {
            send(
                state,
                chat_id,
                "What would you like to do?",
                Some(keyboards::main_menu()),
            )
            .await;
        }
        Command::Status => {
            let report = status::report(state).await;
            send(state, chat_id, &status::console_text(&report), None).await;
        }
        Command::Login => handle_login(state, chat_id, operator_id, &parsed.argument).await,
        Command::Logout => {
            match session::logout(state, operator_id).await {
                Ok(()) => send(state, chat_id, "Logged out.", None).await,
                Err(err) => {
                    warn!(error = %err, operator_id, "logout failed");
                    send(state, chat_id, MSG_AUTH_UNAVAILABLE, None).await;
                }
            };
        }
        Command::AddIcon => {
            if !ensure_authorized(state, chat_id, operator_id).await {
                return;
            }
            send(
                state,
                chat_id,
                "Which round gets the new icon?",
                Some(keyboards::icon_round_menu()),
            )
            .await;
        }
        Command::AddFace | Command::AddMelody | Command::AddVoice | Command::AddQuote => {
            if !ensure_authorized(state, chat_id, operator_id).await {
                return;
            }
            let kind = match parsed.command {
                Command::AddFace => FlowKind::AddFace,
                Command::AddMelody => FlowKind::AddMelody,
                Command::AddVoice => FlowKind::AddVoice,
                _ => FlowKind::AddQuote,
            };
            if parsed.argument.is_empty() {
                start_flow(state, chat_id, operator_id, kind, None).await;
            } else {
                handle_payload_submission(state, message, chat_id, kind, &parsed.argument).await;
            }
        }
    }
}

async fn handle_plain_message(
    state: &SharedState,
    message: &Message,
    chat_id: i64,
    operator_id: i64,
) {
    let action = state
        .conversations()
        .get_mut(&operator_id)
        .map(|mut convo| convo.apply_message(message));

    match action {
        None => {
            debug!(operator_id, "message outside any flow");
            send(
                state,
                chat_id,
                "I did not catch that. Use /menu to get started.",
                Some(keyboards::main_menu()),
            )
            .await;
        }
        Some(StepAction::Reply(text) | StepAction::Advanced(text)) => {
            send(state, chat_id, &text, None).await;
        }
        Some(StepAction::Finalize) => {
            run_finalize(state, chat_id, operator_id).await;
        }
    }
}

/// Run the finalize pipeline on a snapshot of the operator's state.
///
/// The map entry is only removed on success; failures keep it so the
/// operator retries by resending the last item.
async fn run_finalize(state: &SharedState, chat_id: i64, operator_id: i64) {
    let Some(snapshot) = state
        .conversations()
        .get(&operator_id)
        .map(|convo| convo.clone())
    else {
        return;
    };

    match finalize::finalize(state, &snapshot, CONVERSATIONAL_DIFFICULTY).await {
        Ok(FinalizeOutcome::Saved(_)) => {
            state.conversations().remove(&operator_id);
            send(
                state,
                chat_id,
                "Saved! The content is live.",
                Some(keyboards::main_menu()),
            )
            .await;
        }
        Ok(FinalizeOutcome::NeedMoreOptions) => {
            if let Some(mut convo) = state.conversations().get_mut(&operator_id) {
                convo.revert_to_options();
            }
            send(
                state,
                chat_id,
                "I still need at least 2 options. Send more options, then /done.",
                None,
            )
            .await;
        }
        Err(err) => {
            warn!(error = %err, operator_id, "finalize failed; state kept for retry");
            send(state, chat_id, MSG_SAVE_FAILED, None).await;
        }
    }
}

async fn handle_login(state: &SharedState, chat_id: i64, operator_id: i64, password: &str) {
    if password.is_empty() {
        send(state, chat_id, "Usage: /login <password>", None).await;
        return;
    }
    match session::login(state, operator_id, password).await {
        Ok(session::LoginOutcome::Success) => {
            send(
                state,
                chat_id,
                "Welcome! Your session is open for 12 hours.",
                Some(keyboards::main_menu()),
            )
            .await;
        }
        Ok(session::LoginOutcome::WrongPassword) => {
            send(state, chat_id, "Wrong password.", None).await;
        }
        Ok(session::LoginOutcome::PasswordUnset) => {
            send(
                state,
                chat_id,
                "No admin password is configured on this deployment.",
                None,
            )
            .await;
        }
        Err(err) => {
            warn!(error = %err, operator_id, "login failed");
            send(state, chat_id, MSG_AUTH_UNAVAILABLE, None).await;
        }
    }
}

/// Gate a privileged entry point; sends the denial message itself.
async fn ensure_authorized(state: &SharedState, chat_id: i64, operator_id: i64) -> bool {
    match session::check(state, operator_id).await {
        session::AuthCheck::Authorized => true,
        session::AuthCheck::NotLoggedIn => {
            send(state, chat_id, MSG_NOT_LOGGED_IN, None).await;
            false
        }
        session::AuthCheck::Unavailable => {
            send(state, chat_id, MSG_AUTH_UNAVAILABLE, None).await;
            false
        }
    }
}

async fn start_flow(
    state: &SharedState,
    chat_id: i64,
    operator_id: i64,
    kind: FlowKind,
    icon_round: Option<RoundKind>,
) {
    let (convo, prompt) = ConversationState::start(kind, icon_round);
    state.conversations().insert(operator_id, convo);
    let keyboard = match kind {
        FlowKind::AddQuote => Some(keyboards::quote_type_menu()),
        _ => None,
    };
    send(state, chat_id, &prompt, keyboard).await;
}

async fn handle_callback(state: &SharedState, query: CallbackQuery) {
    ack_callback(state, &query.id).await;

    let operator_id = query.from.id;
    let chat_id = query
        .message
        .as_ref()
        .map_or(operator_id, |message| message.chat.id);
    let Some(data) = query.data.as_deref() else {
        return;
    };

    match data {
        "menu_add" => {
            send(
                state,
                chat_id,
                "What kind of question?",
                Some(keyboards::add_question_menu()),
            )
            .await;
        }
        "menu_icon" => {
            if ensure_authorized(state, chat_id, operator_id).await {
                send(
                    state,
                    chat_id,
                    "Which round gets the new icon?",
                    Some(keyboards::icon_round_menu()),
                )
                .await;
            }
        }
        "menu_status" => {
            let report = status::report(state).await;
            send(state, chat_id, &status::console_text(&report), None).await;
        }
        "cancel" => {
            state.conversations().remove(&operator_id);
            send(
                state,
                chat_id,
                "Cancelled. Back to the start.",
                Some(keyboards::main_menu()),
            )
            .await;
        }
        "add_face" | "add_melody" | "add_voice" | "add_quote" => {
            if !ensure_authorized(state, chat_id, operator_id).await {
                return;
            }
            let kind = match data {
                "add_face" => FlowKind::AddFace,
                "add_melody" => FlowKind::AddMelody,
                "add_voice" => FlowKind::AddVoice,
                _ => FlowKind::AddQuote,
            };
            start_flow(state, chat_id, operator_id, kind, None).await;
        }
        _ if data.starts_with("icon_") => {
            if !ensure_authorized(state, chat_id, operator_id).await {
                return;
            }
            match data.trim_start_matches("icon_").parse::<RoundKind>() {
                Ok(round) => {
                    start_flow(state, chat_id, operator_id, FlowKind::AddIcon, Some(round)).await;
                }
                Err(_) => {
                    debug!(data, "unknown icon round in callback");
                }
            }
        }
        _ if data.starts_with("quote_type_") => {
            let question_type = data.trim_start_matches("quote_type_").to_owned();
            let action = state
                .conversations()
                .get_mut(&operator_id)
                .map(|mut convo| convo.set_question_type(&question_type));
            if let Some(StepAction::Reply(text) | StepAction::Advanced(text)) = action {
                send(state, chat_id, &text, None).await;
            }
        }
        _ => debug!(data, "unrecognized callback data"),
    }
}

/// Programmatic one-shot submission: JSON payload in the command argument,
/// media (when required) attached to the same message.
async fn handle_payload_submission(
    state: &SharedState,
    message: &Message,
    chat_id: i64,
    kind: FlowKind,
    raw_payload: &str,
) {
    let result = match kind {
        FlowKind::AddFace => submit_face_payload(state, message, raw_payload).await,
        FlowKind::AddMelody | FlowKind::AddVoice => {
            submit_audio_payload(state, message, kind, raw_payload).await
        }
        FlowKind::AddQuote => submit_quote_payload(state, raw_payload).await,
        FlowKind::AddIcon => Err("icons have no payload form; use /add_icon".to_owned()),
    };

    match result {
        Ok(notice) => send(state, chat_id, &notice, None).await,
        Err(message_text) => send(state, chat_id, &message_text, None).await,
    }
}

async fn submit_face_payload(
    state: &SharedState,
    message: &Message,
    raw: &str,
) -> Result<String, String> {
    let payload: FacePayload =
        serde_json::from_str(raw).map_err(|err| format!("Payload is not valid JSON: {err}"))?;
    payload
        .validate()
        .map_err(|err| format!("Payload is invalid: {err}"))?;
    let media =
        extract_image(message).ok_or("Attach the photo to the same message as the payload.")?;

    let resolved = resolve_difficulty(payload.difficulty.as_deref());
    let url = finalize::upload_question_media(
        state,
        RoundKind::GuessFace,
        resolved.value(),
        &media,
    )
    .await
    .map_err(|err| {
        warn!(error = %err, "programmatic face submission failed");
        MSG_SAVE_FAILED.to_owned()
    })?;

    let row = crate::dao::models::FaceQuestionRow {
        difficulty: resolved.value(),
        image_url: url,
        parts: payload.parts,
        options: payload.options,
        correct_answer: payload.correct_answer,
    };
    persist(state, |store| store.insert_face_question(row)).await?;
    Ok(confirmation("Face question saved.", resolved.was_coerced()))
}

async fn submit_audio_payload(
    state: &SharedState,
    message: &Message,
    kind: FlowKind,
    raw: &str,
) -> Result<String, String> {
    let payload: AudioPayload =
        serde_json::from_str(raw).map_err(|err| format!("Payload is not valid JSON: {err}"))?;
    payload
        .validate()
        .map_err(|err| format!("Payload is invalid: {err}"))?;
    let media =
        extract_audio(message).ok_or("Attach the audio to the same message as the payload.")?;

    let round = if kind == FlowKind::AddMelody {
        RoundKind::GuessMelody
    } else {
        RoundKind::GuessVoice
    };
    let resolved = resolve_difficulty(payload.difficulty.as_deref());
    let url = finalize::upload_question_media(state, round, resolved.value(), &media)
        .await
        .map_err(|err| {
            warn!(error = %err, %round, "programmatic audio submission failed");
            MSG_SAVE_FAILED.to_owned()
        })?;

    let row = crate::dao::models::AudioQuestionRow {
        difficulty: resolved.value(),
        audio_url: url,
        options: payload.options,
        correct_answer: payload.correct_answer,
    };
    if round == RoundKind::GuessMelody {
        persist(state, |store| store.insert_melody_question(row)).await?;
    } else {
        persist(state, |store| store.insert_voice_question(row)).await?;
    }
    Ok(confirmation("Audio question saved.", resolved.was_coerced()))
}

async fn submit_quote_payload(state: &SharedState, raw: &str) -> Result<String, String> {
    let payload: QuotePayload =
        serde_json::from_str(raw).map_err(|err| format!("Payload is not valid JSON: {err}"))?;
    payload
        .validate()
        .map_err(|err| format!("Payload is invalid: {err}"))?;

    let resolved = resolve_difficulty(payload.difficulty.as_deref());
    let row = crate::dao::models::QuoteQuestionRow {
        difficulty: resolved.value(),
        quote: payload.quote,
        question_type: payload.question_type,
        options: payload.options,
        correct_answer: payload.correct_answer,
        source: payload.source,
    };
    persist(state, |store| store.insert_quote_question(row)).await?;
    Ok(confirmation("Quote question saved.", resolved.was_coerced()))
}

async fn persist<F>(state: &SharedState, write: F) -> Result<(), String>
where
    F: FnOnce(
        std::sync::Arc<dyn crate::dao::content_store::ContentStore>,
    ) -> futures::future::BoxFuture<'static, crate::dao::storage::StorageResult<()>>,
{
    let Some(store) = state.content_store().await else {
        return Err(MSG_SAVE_FAILED.to_owned());
    };
    write(store).await.map_err(|err| {
        warn!(error = %err, "content store write failed");
        MSG_SAVE_FAILED.to_owned()
    })
}

fn confirmation(base: &str, coerced: bool) -> String {
    if coerced {
        format!("{base} Unknown difficulty, saved as medium.")
    } else {
        base.to_owned()
    }
}

async fn send(
    state: &SharedState,
    chat_id: i64,
    text: &str,
    reply_markup: Option<InlineKeyboardMarkup>,
) {
    let Some(telegram) = state.telegram() else {
        debug!("bot transport not configured; dropping outbound message");
        return;
    };
    let message = SendMessage {
        chat_id,
        text: text.to_owned(),
        reply_markup,
    };
    if let Err(err) = telegram.send_message(&message).await {
        warn!(error = %err, chat_id, "failed to send message");
    }
}

async fn ack_callback(state: &SharedState, callback_id: &str) {
    let Some(telegram) = state.telegram() else {
        return;
    };
    let answer = AnswerCallbackQuery {
        callback_query_id: callback_id.to_owned(),
        text: None,
    };
    if let Err(err) = telegram.answer_callback(&answer).await {
        warn!(error = %err, "failed to answer callback query");
    }
}
