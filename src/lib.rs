//! Contact book bot — a Telegram wizard for personal contacts.

pub mod channels;
pub mod config;
pub mod contacts;
pub mod dispatch;
pub mod error;
pub mod store;
pub mod worker;
