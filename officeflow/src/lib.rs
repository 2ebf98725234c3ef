//! `OfficeFlow` — task board and team chat over flat files.

pub mod board;
pub mod chat;
pub mod cli;
pub mod config;
pub mod export;
pub mod stats;
pub mod store;
