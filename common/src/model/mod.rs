pub mod recipient;
pub mod row;

/// Telegram chat identifier. Private chats share the user id.
pub type ChatId = i64;
