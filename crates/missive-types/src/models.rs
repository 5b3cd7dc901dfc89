use serde::{Deserialize, Serialize};

/// A user-authored text record. `author` holds the owning user's id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    #[serde(rename = "_id")]
    pub id: String,
    pub title: String,
    pub body: String,
    pub author: String,
}

/// Public view of a user account. The password hash never leaves the DB layer.
///
/// `messages` is ordered most-recent-first and may contain ids of messages
/// that have since been deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    #[serde(rename = "_id")]
    pub id: String,
    pub username: String,
    pub messages: Vec<String>,
}
