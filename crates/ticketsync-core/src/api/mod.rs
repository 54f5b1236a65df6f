//! Read-only client for the remote sheets.
//!
//! The remote side has no query capability: every call returns the whole
//! collection, and selecting a single record by id happens here, client side.

pub mod client;
pub mod error;

pub use client::{find_subject, find_ticket, RemoteFetcher, SheetClient};
pub use error::ApiError;
