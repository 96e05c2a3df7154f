//! Contact field editor — the shared terminal step of every field
//! wizard.
//!
//! Fetch-or-create the target contact, write exactly one field, clean
//! up the user's raw input, reset the edit-state, and re-render the
//! anchor message in place. A storage failure aborts before any UI
//! cleanup happens.

use crate::channels::Responder;
use crate::contacts::model::parse_birthday;
use crate::contacts::{Contact, ContactField, EditState};
use crate::error::{DispatchError, Result};
use crate::store::{ContactStore, EditStateStore};

/// Apply one entered field value for the contact targeted by `state`.
///
/// `input_message_id` is the user's own message carrying the value;
/// it is deleted once the write succeeds. `state.message_id` is the
/// anchor edited in place afterwards.
pub async fn enter_field(
    responder: &dyn Responder,
    contacts: &dyn ContactStore,
    states: &dyn EditStateStore,
    user_id: i64,
    state: EditState,
    field: ContactField,
    raw_text: &str,
    input_message_id: i64,
) -> Result<()> {
    let mut contact = match contacts.get_contact(user_id, state.contact_id).await? {
        Some(contact) => contact,
        None => {
            // First write for this contact: persist the shell now so
            // the per-field UPDATE below has a row to hit.
            let shell = Contact::new(state.contact_id);
            contacts.write_contact(user_id, &shell).await?;
            shell
        }
    };

    match field {
        ContactField::Name => {
            contact.name = raw_text.to_string();
            contacts.write_name(raw_text, user_id, state.contact_id).await?;
        }
        ContactField::Phone => {
            contact.phone = raw_text.to_string();
            contacts.write_phone(raw_text, user_id, state.contact_id).await?;
        }
        ContactField::Birthday => {
            let birthday = parse_birthday(raw_text).ok_or_else(|| DispatchError::InvalidBirthday {
                input: raw_text.to_string(),
            })?;
            contact.birthday = Some(birthday);
            contacts
                .write_birthday(birthday, user_id, state.contact_id)
                .await?;
        }
        ContactField::Description => {
            contact.description = raw_text.to_string();
            contacts
                .write_description(raw_text, user_id, state.contact_id)
                .await?;
        }
    }

    responder.delete_message(user_id, input_message_id).await?;
    states.reset_to_idle(user_id).await?;
    responder
        .edit_contact_view(&contact.render(), user_id, state.message_id)
        .await?;
    Ok(())
}
