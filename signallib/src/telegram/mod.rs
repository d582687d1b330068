pub mod objects;
pub use objects::*;

pub mod client;
pub use client::*;

pub mod messages;

pub mod errors;
pub use errors::TelegramError;
