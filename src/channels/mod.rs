//! Chat transport — the Telegram client and the capability trait the
//! dispatchers talk to.

pub mod responder;
pub mod telegram;

pub use responder::{CallbackData, EventStream, IncomingMessage, Responder, TelegramEvent};
pub use telegram::TelegramChannel;
