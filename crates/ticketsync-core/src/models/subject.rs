use serde::{Deserialize, Serialize};

use super::cell::cell;
use super::Keyed;

/// One row of the user sheet.
///
/// Descriptive fields default to empty when the sheet leaves them out. The
/// identifier does not: a value without `userId` is not a subject record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
#[serde(rename_all = "camelCase")]
pub struct Subject {
    #[serde(default, deserialize_with = "cell")]
    pub sn: String,
    /// Unique key used to select this record out of the collection.
    #[serde(rename = "userId", deserialize_with = "cell")]
    pub subject_id: String,
    #[serde(default, deserialize_with = "cell")]
    pub admin: String,
    #[serde(default, deserialize_with = "cell")]
    pub sender_name: String,
    #[serde(default, deserialize_with = "cell")]
    pub sender_email: String,
    #[serde(default, deserialize_with = "cell")]
    pub timestamp: String,
    #[serde(default, deserialize_with = "cell")]
    pub full_name: String,
    #[serde(default, deserialize_with = "cell")]
    pub phone_number: String,
    #[serde(default, deserialize_with = "cell")]
    pub email_address: String,
    #[serde(default, deserialize_with = "cell")]
    pub ticket_id: String,
    #[serde(default, deserialize_with = "cell")]
    pub seat_numbers: String,
    #[serde(default, deserialize_with = "cell")]
    pub cover_image: String,
    #[serde(default, deserialize_with = "cell")]
    pub event_name: String,
    #[serde(default, deserialize_with = "cell")]
    pub date_time: String,
    #[serde(default, deserialize_with = "cell")]
    pub door_time: String,
    #[serde(default, deserialize_with = "cell")]
    pub venue: String,
    #[serde(default, deserialize_with = "cell")]
    pub location: String,
    #[serde(default, deserialize_with = "cell")]
    pub section: String,
    #[serde(default, deserialize_with = "cell")]
    pub section_no: String,
    #[serde(default, deserialize_with = "cell")]
    pub row: String,
    #[serde(default, deserialize_with = "cell")]
    pub age_restriction: String,
    #[serde(default, deserialize_with = "cell")]
    pub description: String,
    #[serde(default, deserialize_with = "cell")]
    pub terms: String,
    #[serde(default, deserialize_with = "cell")]
    pub event_status: String,
    #[serde(default, deserialize_with = "cell")]
    pub ticket_status: String,
    #[serde(default, deserialize_with = "cell")]
    pub link: String,
    #[serde(rename = "approvalSTAMP", default, deserialize_with = "cell")]
    pub approval_stamp: String,
    #[serde(rename = "completedSTAMP", default, deserialize_with = "cell")]
    pub completed_stamp: String,
    #[serde(rename = "returnedSTAMP", default, deserialize_with = "cell")]
    pub returned_stamp: String,
    #[serde(default, deserialize_with = "cell")]
    pub route: String,
    #[serde(default, deserialize_with = "cell")]
    pub title_status: String,
    #[serde(default, deserialize_with = "cell")]
    pub message_status: String,
    #[serde(default, deserialize_with = "cell")]
    pub warning_status: String,
    #[serde(default, deserialize_with = "cell")]
    pub system_status: String,
    #[serde(default, deserialize_with = "cell")]
    pub percentage_status: String,
    #[serde(default, deserialize_with = "cell")]
    pub admin_status: String,
}

impl Subject {
    /// Name to show for this subject, falling back to the identifier.
    pub fn display_name(&self) -> &str {
        if self.full_name.trim().is_empty() {
            &self.subject_id
        } else {
            &self.full_name
        }
    }
}

impl Keyed for Subject {
    fn key(&self) -> &str {
        &self.subject_id
    }
}
