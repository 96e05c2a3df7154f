//! Contact record and its text projection.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Name given to a contact before the user enters one.
pub const PLACEHOLDER_NAME: &str = "New contact";

/// Separator between contacts in list and search output.
pub const CONTACT_DIVIDER: &str = "-----------------------------\n";

/// Shown when a listing or search produces no contacts.
pub const NO_CONTACTS_MSG: &str = "You don't have any contacts saved yet!";

/// Reference year used when parsing `dd.mm` input. Non-leap, so
/// `29.02` is rejected. Only day and month of a birthday are
/// meaningful; the stored year is always this constant.
pub const BIRTHDAY_REF_YEAR: i32 = 2001;

/// A stored contact, addressable only by (owning user, contact id).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contact {
    /// Unique within the owning user; minted by the store.
    pub contact_id: i64,
    pub name: String,
    /// Empty string means unset.
    pub phone: String,
    /// `None` means unset. The year component is always
    /// [`BIRTHDAY_REF_YEAR`].
    pub birthday: Option<NaiveDate>,
    /// Empty string means unset.
    pub description: String,
}

impl Contact {
    /// A blank contact shell with the placeholder name.
    pub fn new(contact_id: i64) -> Self {
        Self {
            contact_id,
            name: PLACEHOLDER_NAME.to_string(),
            phone: String::new(),
            birthday: None,
            description: String::new(),
        }
    }

    /// Deterministic text projection. Field order is fixed: id and
    /// name always, then phone, birthday (`dd.mm`), and description,
    /// each shown only when set.
    pub fn render(&self) -> String {
        let mut out = format!("ID: {}\n", self.contact_id);
        out.push_str(&format!("Name: {}\n", self.name));
        if !self.phone.is_empty() {
            out.push_str(&format!("Phone: {}\n", self.phone));
        }
        if let Some(birthday) = self.birthday {
            out.push_str(&format!("Birthday: {}\n", birthday.format("%d.%m")));
        }
        if !self.description.is_empty() {
            out.push_str(&format!("Description: {}\n", self.description));
        }
        out
    }
}

/// Render a list of contacts divider-separated, or the fixed
/// no-contacts message for an empty list.
pub fn render_contact_list(contacts: &[Contact]) -> String {
    if contacts.is_empty() {
        return NO_CONTACTS_MSG.to_string();
    }
    let mut out = String::new();
    for contact in contacts {
        out.push_str(&contact.render());
        out.push_str(CONTACT_DIVIDER);
    }
    out
}

/// The four fields a wizard step can write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContactField {
    Name,
    Phone,
    Birthday,
    Description,
}

impl ContactField {
    /// Instruction shown when the user presses the matching button.
    pub fn prompt(&self) -> &'static str {
        match self {
            Self::Name => "Enter the name of your contact:",
            Self::Phone => "Enter the phone of your contact:",
            Self::Birthday => "Enter the birthday of your contact in format 'dd.mm':",
            Self::Description => "Enter description of your contact:",
        }
    }
}

/// Parse `dd.mm` user input into a date in the reference year.
pub fn parse_birthday(input: &str) -> Option<NaiveDate> {
    let (day, month) = input.split_once('.')?;
    let day: u32 = day.parse().ok()?;
    let month: u32 = month.parse().ok()?;
    NaiveDate::from_ymd_opt(BIRTHDAY_REF_YEAR, month, day)
}
