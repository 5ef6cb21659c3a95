//! Wire-facing data types: player responses, admin payloads, Telegram envelopes.

pub mod health;
pub mod payload;
pub mod question;
pub mod round;
pub mod status;
pub mod telegram;
