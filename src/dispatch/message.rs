//! Message dispatcher — routes inbound free-text events.
//!
//! A text is first matched against the command vocabulary; anything
//! else is interpreted through the user's persisted edit-state. With
//! no state (idle), unknown text gets the fixed unknown-command reply
//! and mutates nothing.

use std::sync::Arc;

use tracing::debug;

use crate::channels::{IncomingMessage, Responder};
use crate::contacts::state::CONTACT_NEW;
use crate::contacts::{Contact, ContactField, EditState, Step, render_contact_list};
use crate::dispatch::editor;
use crate::error::{DatabaseError, DispatchError, Result};
use crate::store::{ContactStore, EditStateStore};

const GREETING_MSG: &str = "Hello! You can save people contacts here!:)";
const UNKNOWN_COMMAND_MSG: &str = "I do not know such a command";
const GET_CONTACT_MSG: &str = "Write the name of your contact:";
const EDIT_CONTACT_MSG: &str = "Write ID of the contact you want to edit:";

/// Interprets inbound text messages against the user's edit-state.
pub struct MessageDispatcher {
    responder: Arc<dyn Responder>,
    contacts: Arc<dyn ContactStore>,
    states: Arc<dyn EditStateStore>,
}

impl MessageDispatcher {
    pub fn new(
        responder: Arc<dyn Responder>,
        contacts: Arc<dyn ContactStore>,
        states: Arc<dyn EditStateStore>,
    ) -> Self {
        Self {
            responder,
            contacts,
            states,
        }
    }

    /// Handle one inbound text message to completion.
    pub async fn handle(&self, msg: &IncomingMessage) -> Result<()> {
        match msg.text.as_str() {
            "/start" => {
                return Ok(self.responder.send_message(GREETING_MSG, msg.user_id).await?);
            }
            "/add_contact" => return self.add_contact(msg.user_id).await,
            "/get_contact" => return self.get_contact(msg.user_id).await,
            "/edit_contact" => return self.edit_contact(msg.user_id).await,
            "/list_contacts" => return self.list_contacts(msg.user_id).await,
            _ => {}
        }

        // Not a command — maybe it is input for an armed wizard step.
        if let Some(state) = self.states.get_state(msg.user_id).await? {
            debug!(user_id = msg.user_id, step = %state.step, "Routing text by step");
            match state.step {
                Step::EditingName => {
                    return self.field_entered(msg, state, ContactField::Name).await;
                }
                Step::EditingPhone => {
                    return self.field_entered(msg, state, ContactField::Phone).await;
                }
                Step::EditingBirthday => {
                    return self.field_entered(msg, state, ContactField::Birthday).await;
                }
                Step::EditingDescription => {
                    return self
                        .field_entered(msg, state, ContactField::Description)
                        .await;
                }
                Step::EditingSearchPhrase => return self.search_phrase_entered(msg).await,
                Step::EditingEditId => return self.edit_id_entered(msg).await,
                Step::Idle => {}
            }
        }

        Ok(self
            .responder
            .send_message(UNKNOWN_COMMAND_MSG, msg.user_id)
            .await?)
    }

    /// `/add_contact` — arm a blank wizard and show the empty view.
    /// The real contact id is minted at the first button press.
    async fn add_contact(&self, user_id: i64) -> Result<()> {
        self.states
            .set_state(
                user_id,
                EditState {
                    contact_id: CONTACT_NEW,
                    message_id: 0,
                    step: Step::Idle,
                },
            )
            .await?;
        self.responder
            .send_contact_view(&Contact::new(CONTACT_NEW).render(), user_id)
            .await?;
        Ok(())
    }

    /// `/get_contact` — prompt for a search phrase.
    async fn get_contact(&self, user_id: i64) -> Result<()> {
        self.responder.send_message(GET_CONTACT_MSG, user_id).await?;
        self.states
            .set_state(user_id, EditState::unselected(Step::EditingSearchPhrase))
            .await?;
        Ok(())
    }

    /// `/edit_contact` — prompt for a contact id.
    async fn edit_contact(&self, user_id: i64) -> Result<()> {
        self.responder.send_message(EDIT_CONTACT_MSG, user_id).await?;
        self.states
            .set_state(user_id, EditState::unselected(Step::EditingEditId))
            .await?;
        Ok(())
    }

    /// `/list_contacts` — render everything the user has saved.
    async fn list_contacts(&self, user_id: i64) -> Result<()> {
        let contacts = self.contacts.get_all(user_id).await?;
        self.responder
            .send_message(&render_contact_list(&contacts), user_id)
            .await?;
        Ok(())
    }

    async fn field_entered(
        &self,
        msg: &IncomingMessage,
        state: EditState,
        field: ContactField,
    ) -> Result<()> {
        editor::enter_field(
            self.responder.as_ref(),
            self.contacts.as_ref(),
            self.states.as_ref(),
            msg.user_id,
            state,
            field,
            &msg.text,
            msg.message_id,
        )
        .await
    }

    /// Search step: the text is an exact name filter.
    async fn search_phrase_entered(&self, msg: &IncomingMessage) -> Result<()> {
        let contacts = self.contacts.get_by_name(msg.user_id, &msg.text).await?;
        self.states.reset_to_idle(msg.user_id).await?;
        self.responder
            .send_message(&render_contact_list(&contacts), msg.user_id)
            .await?;
        Ok(())
    }

    /// Edit-id step: the text names the contact to arm for editing.
    async fn edit_id_entered(&self, msg: &IncomingMessage) -> Result<()> {
        let contact_id: i64 = msg
            .text
            .trim()
            .parse()
            .map_err(DispatchError::InvalidContactId)?;

        let contact = self
            .contacts
            .get_contact(msg.user_id, contact_id)
            .await?
            .ok_or_else(|| DatabaseError::NotFound {
                entity: "contact".to_string(),
                id: contact_id.to_string(),
            })?;

        self.states
            .set_state(
                msg.user_id,
                EditState {
                    contact_id: contact.contact_id,
                    message_id: 0,
                    step: Step::Idle,
                },
            )
            .await?;
        self.responder
            .send_contact_view(&contact.render(), msg.user_id)
            .await?;
        Ok(())
    }
}
