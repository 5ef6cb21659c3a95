//! Backend for a browser-based Christmas trivia game: five round types served
//! over REST with a static-catalog fallback, plus a Telegram-bot console for
//! curating content into a remote store.

pub mod bot;
pub mod catalog;
pub mod config;
pub mod dao;
pub mod dto;
pub mod error;
pub mod routes;
pub mod services;
pub mod state;
