//! Contact records and per-user wizard state.

pub mod model;
pub mod state;

pub use model::{Contact, ContactField, render_contact_list};
pub use state::{EditState, Step};
