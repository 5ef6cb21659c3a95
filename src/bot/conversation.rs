//! Per-operator conversational state machine for content submission.
//!
//! Each flow is a finite step sequence; the options step self-loops until the
//! operator closes it with `/done` and at least two options are collected.
//! State never advances past an invalid input.

use crate::dto::question::RoundKind;
use crate::dto::telegram::Message;

/// Which submission flow the operator is in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowKind {
    /// Face-fragment question.
    AddFace,
    /// Melody question.
    AddMelody,
    /// Voice question.
    AddVoice,
    /// Bible-quote question.
    AddQuote,
    /// Round icon override.
    AddIcon,
}

impl FlowKind {
    /// Round the flow writes content for; icons carry their own target round.
    pub fn round(&self) -> Option<RoundKind> {
        match self {
            FlowKind::AddFace => Some(RoundKind::GuessFace),
            FlowKind::AddMelody => Some(RoundKind::GuessMelody),
            FlowKind::AddVoice => Some(RoundKind::GuessVoice),
            FlowKind::AddQuote => Some(RoundKind::BibleQuotes),
            FlowKind::AddIcon => None,
        }
    }
}

/// Position within a flow's step graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// Quote flows: waiting for the sub-type button.
    QuestionType,
    /// Quote flows: waiting for the quote text.
    Quote,
    /// Collecting answer options (self-loop until `/done`).
    Options,
    /// Waiting for the correct answer text.
    CorrectAnswer,
    /// Quote flows: waiting for the source reference.
    Source,
    /// Face flow: waiting for the photo.
    Photo,
    /// Melody and voice flows: waiting for the audio.
    Audio,
    /// Icon flow: waiting for the icon image.
    WaitingFile,
}

/// Kind of Telegram attachment a media reference came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    /// Photo attachment (highest resolution).
    Photo,
    /// Dedicated audio attachment.
    Audio,
    /// Voice note.
    Voice,
    /// Generic document attachment.
    Document,
}

/// File reference extracted from an attachment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaRef {
    /// Telegram file handle.
    pub file_id: String,
    /// Attachment kind the handle came from.
    pub kind: MediaKind,
    /// Sender-reported MIME type, when the attachment carries one.
    pub mime_type: Option<String>,
}

/// Fields accumulated over the course of a flow.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CollectedFields {
    /// Quote sub-type (`source` or `continue`).
    pub question_type: Option<String>,
    /// Quote text.
    pub quote: Option<String>,
    /// Answer options in submission order.
    pub options: Vec<String>,
    /// The correct option.
    pub correct_answer: Option<String>,
    /// Quote source reference.
    pub source: Option<String>,
    /// Media attachment reference.
    pub media: Option<MediaRef>,
}

/// One operator's position in a submission flow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversationState {
    /// Active flow.
    pub kind: FlowKind,
    /// Current step; always reachable from `kind`'s graph.
    pub step: Step,
    /// Icon flow target round.
    pub icon_round: Option<RoundKind>,
    /// Collected field values.
    pub fields: CollectedFields,
}

/// Outcome of feeding one inbound event into the state machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepAction {
    /// Stay on the current step and send this text (re-prompt or correction).
    Reply(String),
    /// Step advanced; send this prompt for the next input.
    Advanced(String),
    /// Every field is collected; run the finalize pipeline.
    Finalize,
}

const PROMPT_OPTIONS: &str =
    "Send the answer options one message each. When you have at least 2, send /done.";
const PROMPT_CORRECT_ANSWER: &str = "Which option is the correct answer?";
const PROMPT_PHOTO: &str = "Now send the photo for this question.";
const PROMPT_AUDIO: &str = "Now send the audio file or voice message.";
const PROMPT_QUOTE: &str = "Send the quote text.";
const PROMPT_SOURCE: &str = "Send the source reference (for example: John 3:16).";
const PROMPT_ICON: &str = "Send the icon image for this round.";

impl ConversationState {
    /// Open a fresh flow, returning the state and the first prompt.
    ///
    /// `icon_round` is required for the icon flow and ignored elsewhere.
    pub fn start(kind: FlowKind, icon_round: Option<RoundKind>) -> (Self, String) {
        let (step, prompt) = match kind {
            FlowKind::AddQuote => (
                Step::QuestionType,
                "What kind of quote question is this?".to_owned(),
            ),
            FlowKind::AddIcon => (Step::WaitingFile, PROMPT_ICON.to_owned()),
            FlowKind::AddFace | FlowKind::AddMelody | FlowKind::AddVoice => {
                (Step::Options, PROMPT_OPTIONS.to_owned())
            }
        };
        (
            Self {
                kind,
                step,
                icon_round,
                fields: CollectedFields::default(),
            },
            prompt,
        )
    }

    /// Feed a plain (non-command) message into the machine.
    pub fn apply_message(&mut self, message: &Message) -> StepAction {
        match self.step {
            Step::Options => self.collect_option(message),
            Step::QuestionType => self.collect_question_type(message),
            Step::Quote => self.collect_text(message, Field::Quote),
            Step::CorrectAnswer => self.collect_correct_answer(message),
            Step::Source => self.collect_text(message, Field::Source),
            Step::Photo => self.collect_media(message, extract_image(message), "a photo"),
            Step::Audio => self.collect_media(message, extract_audio(message), "an audio file"),
            Step::WaitingFile => self.collect_media(message, extract_image(message), "an image"),
        }
    }

    /// Close the options-collection loop (`/done`).
    pub fn finish_options(&mut self) -> StepAction {
        if self.step != Step::Options {
            return StepAction::Reply(
                "Nothing to finish here. Answer the current question instead.".to_owned(),
            );
        }
        if self.fields.options.len() < 2 {
            return StepAction::Reply(format!(
                "I need at least 2 options, you sent {}. Send more options first.",
                self.fields.options.len()
            ));
        }
        self.step = Step::CorrectAnswer;
        StepAction::Advanced(PROMPT_CORRECT_ANSWER.to_owned())
    }

    /// Apply a quote sub-type chosen from the inline keyboard.
    pub fn set_question_type(&mut self, question_type: &str) -> StepAction {
        if self.step != Step::QuestionType {
            return StepAction::Reply("This flow already has its type.".to_owned());
        }
        self.fields.question_type = Some(question_type.to_owned());
        self.step = Step::Quote;
        StepAction::Advanced(PROMPT_QUOTE.to_owned())
    }

    /// Revert an over-eager flow back to the options loop. Used when finalize
    /// finds fewer than two options despite the `/done` gate.
    pub fn revert_to_options(&mut self) {
        self.step = Step::Options;
    }

    fn collect_option(&mut self, message: &Message) -> StepAction {
        let text = message.text_or_caption();
        if text.is_empty() {
            return StepAction::Reply(PROMPT_OPTIONS.to_owned());
        }
        self.fields.options.push(text.to_owned());
        StepAction::Reply(format!(
            "Option {} saved. Send another or /done.",
            self.fields.options.len()
        ))
    }

    fn collect_question_type(&mut self, message: &Message) -> StepAction {
        match message.text_or_caption() {
            kind @ ("source" | "continue") => self.set_question_type(kind),
            _ => StepAction::Reply(
                "Pick the question type with the buttons: source or continue.".to_owned(),
            ),
        }
    }

    fn collect_correct_answer(&mut self, message: &Message) -> StepAction {
        let text = message.text_or_caption();
        if text.is_empty() {
            return StepAction::Reply(PROMPT_CORRECT_ANSWER.to_owned());
        }
        if !self.fields.options.iter().any(|option| option == text) {
            return StepAction::Reply(format!(
                "\"{text}\" is not one of the options. Send exactly one of: {}.",
                self.fields.options.join(", ")
            ));
        }
        self.fields.correct_answer = Some(text.to_owned());
        match self.kind {
            FlowKind::AddFace => {
                self.step = Step::Photo;
                StepAction::Advanced(PROMPT_PHOTO.to_owned())
            }
            FlowKind::AddQuote => {
                self.step = Step::Source;
                StepAction::Advanced(PROMPT_SOURCE.to_owned())
            }
            FlowKind::AddMelody | FlowKind::AddVoice => {
                self.step = Step::Audio;
                StepAction::Advanced(PROMPT_AUDIO.to_owned())
            }
            FlowKind::AddIcon => StepAction::Finalize,
        }
    }

    fn collect_text(&mut self, message: &Message, field: Field) -> StepAction {
        let text = message.text_or_caption();
        if text.is_empty() {
            let prompt = match field {
                Field::Quote => PROMPT_QUOTE,
                Field::Source => PROMPT_SOURCE,
            };
            return StepAction::Reply(prompt.to_owned());
        }
        match field {
            Field::Quote => {
                self.fields.quote = Some(text.to_owned());
                self.step = Step::Options;
                StepAction::Advanced(PROMPT_OPTIONS.to_owned())
            }
            Field::Source => {
                self.fields.source = Some(text.to_owned());
                StepAction::Finalize
            }
        }
    }

    fn collect_media(
        &mut self,
        _message: &Message,
        media: Option<MediaRef>,
        expected: &str,
    ) -> StepAction {
        match media {
            Some(media) => {
                self.fields.media = Some(media);
                StepAction::Finalize
            }
            None => StepAction::Reply(format!(
                "That is not {expected}. Send {expected} to continue, or /cancel."
            )),
        }
    }
}

enum Field {
    Quote,
    Source,
}

/// Extract an image reference: highest-resolution photo, else an image-typed
/// document.
pub fn extract_image(message: &Message) -> Option<MediaRef> {
    if let Some(photo) = message.photo.as_ref().and_then(|sizes| sizes.last()) {
        return Some(MediaRef {
            file_id: photo.file_id.clone(),
            kind: MediaKind::Photo,
            mime_type: None,
        });
    }
    message
        .document
        .as_ref()
        .filter(|doc| {
            doc.mime_type
                .as_deref()
                .is_some_and(|mime| mime.starts_with("image/"))
        })
        .map(|doc| MediaRef {
            file_id: doc.file_id.clone(),
            kind: MediaKind::Document,
            mime_type: doc.mime_type.clone(),
        })
}

/// Extract an audio reference: dedicated audio, else voice note, else an
/// audio-typed document, in that order.
pub fn extract_audio(message: &Message) -> Option<MediaRef> {
    if let Some(audio) = message.audio.as_ref() {
        return Some(MediaRef {
            file_id: audio.file_id.clone(),
            kind: MediaKind::Audio,
            mime_type: None,
        });
    }
    if let Some(voice) = message.voice.as_ref() {
        return Some(MediaRef {
            file_id: voice.file_id.clone(),
            kind: MediaKind::Voice,
            mime_type: None,
        });
    }
    message
        .document
        .as_ref()
        .filter(|doc| {
            doc.mime_type
                .as_deref()
                .is_some_and(|mime| mime.starts_with("audio/"))
        })
        .map(|doc| MediaRef {
            file_id: doc.file_id.clone(),
            kind: MediaKind::Document,
            mime_type: doc.mime_type.clone(),
        })
}
