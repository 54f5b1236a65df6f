use serde::{Deserialize, Serialize};

use super::cell::cell;
use super::Keyed;

/// One row of the ticket sheet.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
#[serde(rename_all = "camelCase")]
pub struct Ticket {
    #[serde(default, deserialize_with = "cell")]
    pub sn: String,
    #[serde(default, deserialize_with = "cell")]
    pub admin: String,
    /// Unique key used to select this record out of the collection.
    #[serde(rename = "ticketId", deserialize_with = "cell")]
    pub ticket_id: String,
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
    pub ticket_folder_id: String,
    #[serde(default, deserialize_with = "cell")]
    pub age_restriction: String,
    #[serde(default, deserialize_with = "cell")]
    pub description: String,
    #[serde(default, deserialize_with = "cell")]
    pub terms: String,
    #[serde(rename = "newSTAMP", default, deserialize_with = "cell")]
    pub new_stamp: String,
    #[serde(rename = "deletedSTAMP", default, deserialize_with = "cell")]
    pub deleted_stamp: String,
    #[serde(default, deserialize_with = "cell")]
    pub event_status: String,
    #[serde(default, deserialize_with = "cell")]
    pub ticket_status: String,
}

impl Ticket {
    /// True once the sheet has stamped the ticket as deleted.
    pub fn is_deleted(&self) -> bool {
        !self.deleted_stamp.trim().is_empty()
    }
}

impl Keyed for Ticket {
    fn key(&self) -> &str {
        &self.ticket_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::find_by_key;

    #[test]
    fn test_parse_ticket_row() {
        let json = r#"{"sn": 1, "ticketId": 5001, "eventName": "Opening Night", "row": "F", "newSTAMP": "2024-04-02"}"#;
        let ticket: Ticket = serde_json::from_str(json).expect("valid row");
        assert_eq!(ticket.ticket_id, "5001");
        assert_eq!(ticket.event_name, "Opening Night");
        assert_eq!(ticket.new_stamp, "2024-04-02");
        assert!(!ticket.is_deleted());
    }

    #[test]
    fn test_find_by_key_returns_first_match() {
        let tickets = vec![
            Ticket { ticket_id: "t1".into(), row: "A".into(), ..Default::default() },
            Ticket { ticket_id: "t2".into(), row: "B".into(), ..Default::default() },
            Ticket { ticket_id: "t2".into(), row: "C".into(), ..Default::default() },
        ];
        assert_eq!(find_by_key(&tickets, "t2").map(|t| t.row.as_str()), Some("B"));
        assert!(find_by_key(&tickets, "t3").is_none());
        assert!(find_by_key::<Ticket>(&[], "t1").is_none());
    }

    #[test]
    fn test_deleted_stamp() {
        let ticket = Ticket {
            ticket_id: "t1".into(),
            deleted_stamp: "2024-06-01".into(),
            ..Default::default()
        };
        assert!(ticket.is_deleted());
    }
}
