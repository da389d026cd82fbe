//! SQLite storage backend for payable resources.
mod sqlite_impl;

pub mod db;
pub use sqlite_impl::SqliteDatabase;
