//! Record types served by the remote sheets.
//!
//! The sync engine only inspects the identifier of each record; the rest of
//! the fields are carried through to consumers and the cache untouched.
//!
//! - `Subject`: the per-user record, keyed by `userId`
//! - `Ticket`: the ticket record, keyed by `ticketId`

mod cell;
pub mod subject;
pub mod ticket;

pub use subject::Subject;
pub use ticket::Ticket;

/// A record that can be selected out of a collection by its identifier.
pub trait Keyed {
    /// The record's unique key.
    fn key(&self) -> &str;
}

/// Linear scan for the first record whose key equals `id`.
pub fn find_by_key<'a, T: Keyed>(records: &'a [T], id: &str) -> Option<&'a T> {
    records.iter().find(|r| r.key() == id)
}
