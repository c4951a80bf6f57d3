//! Database layer (JSON file and document store).

pub mod file_store;
pub mod firestore;

pub use file_store::{FileStore, LoginOutcome};
pub use firestore::DocumentDb;

/// Collection names as constants.
pub mod collections {
    /// Accounts (keyed by username)
    pub const USERS: &str = "users";
    /// Append-only consent events
    pub const USER_DATA: &str = "user_data";
}
