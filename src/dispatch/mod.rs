//! The conversation state machine: message and callback dispatchers
//! plus the shared field editor they terminate in.

pub mod callback;
pub mod editor;
pub mod message;

pub use callback::CallbackDispatcher;
pub use message::MessageDispatcher;
