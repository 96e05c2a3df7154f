//! Per-user edit-state — tracks which wizard step the conversation
//! is in and which contact/message it targets.

use serde::{Deserialize, Serialize};

/// Sentinel contact id: no contact selected yet.
pub const CONTACT_NONE: i64 = -1;

/// Sentinel contact id: new contact, real id not yet minted.
pub const CONTACT_NEW: i64 = 0;

/// The active phase of the per-user conversation wizard.
///
/// Exactly one step is active per user at a time; it fully determines
/// how the next free-text message is interpreted. Absence of a
/// persisted state row is equivalent to `Idle`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    EditingName,
    EditingPhone,
    EditingBirthday,
    EditingDescription,
    EditingSearchPhrase,
    EditingEditId,
    Idle,
}

impl Step {
    /// Stable integer encoding for the database column.
    pub fn to_db(self) -> i64 {
        match self {
            Self::EditingName => 1,
            Self::EditingPhone => 2,
            Self::EditingBirthday => 3,
            Self::EditingDescription => 4,
            Self::EditingSearchPhrase => 5,
            Self::EditingEditId => 6,
            Self::Idle => 7,
        }
    }

    /// Decode the database column. Unknown values fall back to `Idle`.
    pub fn from_db(value: i64) -> Self {
        match value {
            1 => Self::EditingName,
            2 => Self::EditingPhone,
            3 => Self::EditingBirthday,
            4 => Self::EditingDescription,
            5 => Self::EditingSearchPhrase,
            6 => Self::EditingEditId,
            _ => Self::Idle,
        }
    }
}

impl std::fmt::Display for Step {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::EditingName => "editing_name",
            Self::EditingPhone => "editing_phone",
            Self::EditingBirthday => "editing_birthday",
            Self::EditingDescription => "editing_description",
            Self::EditingSearchPhrase => "editing_search_phrase",
            Self::EditingEditId => "editing_edit_id",
            Self::Idle => "idle",
        };
        write!(f, "{s}")
    }
}

/// Persisted per-user edit-state. At most one row per user; every
/// wizard transition overwrites it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditState {
    /// Target contact, or a sentinel (`CONTACT_NONE` / `CONTACT_NEW`).
    pub contact_id: i64,
    /// Anchor message currently displayed to the user; edited in
    /// place to reflect the contact after each field write.
    pub message_id: i64,
    pub step: Step,
}

impl EditState {
    /// State for a wizard that has no target yet.
    pub fn unselected(step: Step) -> Self {
        Self {
            contact_id: CONTACT_NONE,
            message_id: 0,
            step,
        }
    }

    /// Whether a real contact is targeted (sentinels excluded).
    pub fn has_contact(&self) -> bool {
        self.contact_id > 0
    }
}

impl Default for EditState {
    fn default() -> Self {
        Self {
            contact_id: CONTACT_NONE,
            message_id: 0,
            step: Step::Idle,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn db_encoding_roundtrip() {
        let steps = [
            Step::EditingName,
            Step::EditingPhone,
            Step::EditingBirthday,
            Step::EditingDescription,
            Step::EditingSearchPhrase,
            Step::EditingEditId,
            Step::Idle,
        ];
        for step in steps {
            assert_eq!(Step::from_db(step.to_db()), step);
        }
    }

    #[test]
    fn unknown_db_value_decodes_to_idle() {
        assert_eq!(Step::from_db(0), Step::Idle);
        assert_eq!(Step::from_db(42), Step::Idle);
        assert_eq!(Step::from_db(-3), Step::Idle);
    }

    #[test]
    fn sentinels_are_not_contacts() {
        assert!(!EditState::unselected(Step::EditingSearchPhrase).has_contact());
        let new_contact = EditState {
            contact_id: CONTACT_NEW,
            message_id: 0,
            step: Step::Idle,
        };
        assert!(!new_contact.has_contact());
        let selected = EditState {
            contact_id: 5,
            message_id: 10,
            step: Step::EditingName,
        };
        assert!(selected.has_contact());
    }

    #[test]
    fn default_state_is_idle() {
        let state = EditState::default();
        assert_eq!(state.step, Step::Idle);
        assert_eq!(state.contact_id, CONTACT_NONE);
    }
}
