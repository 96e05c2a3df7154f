//! Callback dispatcher — routes inline keyboard button presses.
//!
//! Button presses never write contact fields themselves; they arm the
//! message dispatcher for the next free-text event by writing the
//! user's edit-state.

use std::sync::Arc;

use tracing::debug;

use crate::channels::{CallbackData, Responder};
use crate::contacts::{ContactField, EditState, Step};
use crate::error::{DispatchError, Result};
use crate::store::{ContactStore, EditStateStore};

/// Callback action vocabulary, used as `callback_data` on the edit
/// keyboard.
pub mod actions {
    pub const CHANGE_CONTACT_NAME: &str = "ChangeContactName";
    pub const CHANGE_CONTACT_PHONE: &str = "ChangeContactPhone";
    pub const CHANGE_CONTACT_BIRTHDAY: &str = "ChangeContactBirthday";
    pub const CHANGE_CONTACT_DESCRIPTION: &str = "ChangeContactDescription";
    pub const CHANGE_CONTACT_DONE: &str = "ChangeContactDone";
    pub const DELETE_CONTACT: &str = "DeleteContact";
}

const SAVED_MSG: &str = "Saved";
const DELETED_MSG: &str = "Deleted";
const NO_CONTACT_MSG: &str = "No contact is selected";

/// Interprets inbound button-press events.
pub struct CallbackDispatcher {
    responder: Arc<dyn Responder>,
    contacts: Arc<dyn ContactStore>,
    states: Arc<dyn EditStateStore>,
}

impl CallbackDispatcher {
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

    /// Handle one button press to completion.
    pub async fn handle(&self, data: &CallbackData) -> Result<()> {
        match data.action.as_str() {
            actions::CHANGE_CONTACT_NAME => self.to_field_entry(data, ContactField::Name).await,
            actions::CHANGE_CONTACT_PHONE => self.to_field_entry(data, ContactField::Phone).await,
            actions::CHANGE_CONTACT_BIRTHDAY => {
                self.to_field_entry(data, ContactField::Birthday).await
            }
            actions::CHANGE_CONTACT_DESCRIPTION => {
                self.to_field_entry(data, ContactField::Description).await
            }
            actions::CHANGE_CONTACT_DONE => self.save_contact(data).await,
            actions::DELETE_CONTACT => self.delete_contact(data).await,
            other => Err(DispatchError::UnknownAction(other.to_string()).into()),
        }
    }

    /// Resolve which contact the wizard targets: keep an already-set
    /// id, otherwise mint a fresh one. One helper for all four field
    /// buttons so the edge cases cannot diverge.
    async fn resolve_target(&self, user_id: i64) -> Result<i64> {
        if let Some(state) = self.states.get_state(user_id).await? {
            if state.has_contact() {
                return Ok(state.contact_id);
            }
        }
        let minted = self.contacts.next_contact_id(user_id).await?;
        debug!(user_id, contact_id = minted, "Minted contact id");
        Ok(minted)
    }

    /// Arm the message dispatcher: the next text from this user goes
    /// into `field` of the resolved contact.
    async fn to_field_entry(&self, data: &CallbackData, field: ContactField) -> Result<()> {
        let contact_id = self.resolve_target(data.from_id).await?;
        let step = match field {
            ContactField::Name => Step::EditingName,
            ContactField::Phone => Step::EditingPhone,
            ContactField::Birthday => Step::EditingBirthday,
            ContactField::Description => Step::EditingDescription,
        };

        self.states
            .set_state(
                data.from_id,
                EditState {
                    contact_id,
                    message_id: data.message_id,
                    step,
                },
            )
            .await?;

        self.responder
            .answer_callback(field.prompt(), &data.callback_id)
            .await?;
        Ok(())
    }

    /// "Save" — fields were persisted incrementally, so only remove
    /// the editable message from the chat.
    async fn save_contact(&self, data: &CallbackData) -> Result<()> {
        self.responder
            .answer_callback(SAVED_MSG, &data.callback_id)
            .await?;
        self.responder
            .delete_message(data.from_id, data.message_id)
            .await?;
        Ok(())
    }

    /// "Delete contact" — delete the record targeted by the user's
    /// edit-state. Without a selected contact nothing is deleted.
    async fn delete_contact(&self, data: &CallbackData) -> Result<()> {
        let state = self.states.get_state(data.from_id).await?;
        let Some(state) = state.filter(EditState::has_contact) else {
            return Ok(self
                .responder
                .answer_callback(NO_CONTACT_MSG, &data.callback_id)
                .await?);
        };

        self.contacts
            .delete_contact(data.from_id, state.contact_id)
            .await?;
        self.states.reset_to_idle(data.from_id).await?;
        self.responder
            .answer_callback(DELETED_MSG, &data.callback_id)
            .await?;
        self.responder
            .delete_message(data.from_id, data.message_id)
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contacts::Contact;
    use crate::contacts::state::{CONTACT_NEW, CONTACT_NONE};
    use crate::dispatch::test_support::{RecordingResponder, SentAction};
    use crate::error::Error;
    use crate::store::LibSqlBackend;

    async fn dispatcher() -> (CallbackDispatcher, Arc<RecordingResponder>, Arc<LibSqlBackend>) {
        let responder = Arc::new(RecordingResponder::default());
        let db = Arc::new(LibSqlBackend::new_memory().await.unwrap());
        let dispatcher = CallbackDispatcher::new(responder.clone(), db.clone(), db.clone());
        (dispatcher, responder, db)
    }

    fn press(from_id: i64, message_id: i64, action: &str) -> CallbackData {
        CallbackData {
            from_id,
            message_id,
            action: action.to_string(),
            callback_id: "cb-1".to_string(),
        }
    }

    #[tokio::test]
    async fn change_name_mints_id_when_new() {
        let (dispatcher, responder, db) = dispatcher().await;
        db.set_state(
            1,
            EditState {
                contact_id: CONTACT_NEW,
                message_id: 0,
                step: Step::Idle,
            },
        )
        .await
        .unwrap();

        dispatcher
            .handle(&press(1, 55, actions::CHANGE_CONTACT_NAME))
            .await
            .unwrap();

        let state = db.get_state(1).await.unwrap().unwrap();
        assert_eq!(state.contact_id, 1, "first minted id, not the message id");
        assert_eq!(state.message_id, 55);
        assert_eq!(state.step, Step::EditingName);

        assert_eq!(
            responder.actions(),
            vec![SentAction::Answered {
                callback_id: "cb-1".into(),
                text: "Enter the name of your contact:".into()
            }]
        );
    }

    #[tokio::test]
    async fn change_phone_preserves_selected_contact() {
        let (dispatcher, _responder, db) = dispatcher().await;
        db.set_state(
            1,
            EditState {
                contact_id: 7,
                message_id: 55,
                step: Step::Idle,
            },
        )
        .await
        .unwrap();

        // Pressed on a different message; the target must survive.
        dispatcher
            .handle(&press(1, 56, actions::CHANGE_CONTACT_PHONE))
            .await
            .unwrap();

        let state = db.get_state(1).await.unwrap().unwrap();
        assert_eq!(state.contact_id, 7);
        assert_eq!(state.message_id, 56);
        assert_eq!(state.step, Step::EditingPhone);
    }

    #[tokio::test]
    async fn change_birthday_prompt_names_format() {
        let (dispatcher, responder, _db) = dispatcher().await;
        dispatcher
            .handle(&press(1, 55, actions::CHANGE_CONTACT_BIRTHDAY))
            .await
            .unwrap();

        match &responder.actions()[0] {
            SentAction::Answered { text, .. } => assert!(text.contains("dd.mm")),
            other => panic!("expected answer, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn minted_ids_skip_existing_contacts() {
        let (dispatcher, _responder, db) = dispatcher().await;
        db.write_contact(1, &Contact::new(4)).await.unwrap();

        dispatcher
            .handle(&press(1, 55, actions::CHANGE_CONTACT_DESCRIPTION))
            .await
            .unwrap();

        let state = db.get_state(1).await.unwrap().unwrap();
        assert_eq!(state.contact_id, 5);
        assert_eq!(state.step, Step::EditingDescription);
    }

    #[tokio::test]
    async fn done_answers_saved_and_removes_message() {
        let (dispatcher, responder, db) = dispatcher().await;
        dispatcher
            .handle(&press(1, 55, actions::CHANGE_CONTACT_DONE))
            .await
            .unwrap();

        assert_eq!(
            responder.actions(),
            vec![
                SentAction::Answered {
                    callback_id: "cb-1".into(),
                    text: SAVED_MSG.into()
                },
                SentAction::Deleted {
                    user_id: 1,
                    message_id: 55
                },
            ]
        );
        // Done persists nothing.
        assert!(db.get_all(1).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn delete_removes_targeted_contact() {
        let (dispatcher, responder, db) = dispatcher().await;
        db.write_contact(1, &Contact::new(7)).await.unwrap();
        db.set_state(
            1,
            EditState {
                contact_id: 7,
                message_id: 55,
                step: Step::Idle,
            },
        )
        .await
        .unwrap();

        dispatcher
            .handle(&press(1, 55, actions::DELETE_CONTACT))
            .await
            .unwrap();

        assert!(db.get_contact(1, 7).await.unwrap().is_none());
        assert_eq!(db.get_state(1).await.unwrap().unwrap().step, Step::Idle);
        assert_eq!(
            responder.actions(),
            vec![
                SentAction::Answered {
                    callback_id: "cb-1".into(),
                    text: DELETED_MSG.into()
                },
                SentAction::Deleted {
                    user_id: 1,
                    message_id: 55
                },
            ]
        );
    }

    #[tokio::test]
    async fn delete_without_selection_deletes_nothing() {
        let (dispatcher, responder, db) = dispatcher().await;
        // An unrelated contact whose id happens to match the message id.
        db.write_contact(1, &Contact::new(55)).await.unwrap();

        dispatcher
            .handle(&press(1, 55, actions::DELETE_CONTACT))
            .await
            .unwrap();

        assert!(db.get_contact(1, 55).await.unwrap().is_some());
        assert_eq!(
            responder.actions(),
            vec![SentAction::Answered {
                callback_id: "cb-1".into(),
                text: NO_CONTACT_MSG.into()
            }]
        );
    }

    #[tokio::test]
    async fn delete_with_sentinel_state_deletes_nothing() {
        let (dispatcher, _responder, db) = dispatcher().await;
        db.write_contact(1, &Contact::new(55)).await.unwrap();
        db.set_state(
            1,
            EditState {
                contact_id: CONTACT_NONE,
                message_id: 55,
                step: Step::Idle,
            },
        )
        .await
        .unwrap();

        dispatcher
            .handle(&press(1, 55, actions::DELETE_CONTACT))
            .await
            .unwrap();

        assert!(db.get_contact(1, 55).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn unknown_action_is_an_error() {
        let (dispatcher, responder, _db) = dispatcher().await;
        let err = dispatcher
            .handle(&press(1, 55, "FlipContact"))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            Error::Dispatch(DispatchError::UnknownAction(action)) if action == "FlipContact"
        ));
        assert!(responder.actions().is_empty());
    }
}
