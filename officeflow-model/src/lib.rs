//! Shared record definitions for `OfficeFlow` storage files.

pub mod codec;
pub mod message;
pub mod task;
