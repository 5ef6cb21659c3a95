//! Inline keyboard builders for the operator console.

use crate::dto::question::RoundKind;
use crate::dto::telegram::{InlineKeyboardButton, InlineKeyboardMarkup};

/// Main menu shown by `/start` and `/menu`.
pub fn main_menu() -> InlineKeyboardMarkup {
    InlineKeyboardMarkup {
        inline_keyboard: vec![
            vec![InlineKeyboardButton::new("Add a question", "menu_add")],
            vec![InlineKeyboardButton::new("Set a round icon", "menu_icon")],
            vec![InlineKeyboardButton::new("Deployment status", "menu_status")],
        ],
    }
}

/// Question-kind picker behind the "Add a question" menu entry.
pub fn add_question_menu() -> InlineKeyboardMarkup {
    InlineKeyboardMarkup {
        inline_keyboard: vec![
            vec![
                InlineKeyboardButton::new("Guess the face", "add_face"),
                InlineKeyboardButton::new("Guess the melody", "add_melody"),
            ],
            vec![
                InlineKeyboardButton::new("Guess the voice", "add_voice"),
                InlineKeyboardButton::new("Bible quote", "add_quote"),
            ],
            vec![InlineKeyboardButton::new("Cancel", "cancel")],
        ],
    }
}

/// Round picker for the icon flow; one button per round.
pub fn icon_round_menu() -> InlineKeyboardMarkup {
    let mut rows: Vec<Vec<InlineKeyboardButton>> = RoundKind::ALL
        .iter()
        .map(|round| {
            vec![InlineKeyboardButton::new(
                round.title(),
                format!("icon_{}", round.id()),
            )]
        })
        .collect();
    rows.push(vec![InlineKeyboardButton::new("Cancel", "cancel")]);
    InlineKeyboardMarkup {
        inline_keyboard: rows,
    }
}

/// Quote sub-type picker for the quote flow.
pub fn quote_type_menu() -> InlineKeyboardMarkup {
    InlineKeyboardMarkup {
        inline_keyboard: vec![
            vec![
                InlineKeyboardButton::new("Guess the source", "quote_type_source"),
                InlineKeyboardButton::new("Continue the quote", "quote_type_continue"),
            ],
            vec![InlineKeyboardButton::new("Cancel", "cancel")],
        ],
    }
}
