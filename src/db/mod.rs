//! Database layer (Firestore).

pub mod firestore;

pub use firestore::FirestoreDb;

/// Collection names as constants.
pub mod collections {
    /// Per-user documents keyed by the frontend's user id
    pub const USERS: &str = "users";
}
