//! Storage module for Pinboard
//!
//! - `guild`: SQLite - 길드 레코드

mod guild;

pub use guild::GuildStore;
