use serde::{Deserialize, Serialize};

use crate::models::{Message, User};

// -- Messages --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateMessageRequest {
    #[serde(rename = "_id", default)]
    pub id: Option<String>,
    pub title: String,
    pub body: String,
    pub author: String,
}

/// Fields left out are kept as stored.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateMessageRequest {
    pub title: Option<String>,
    pub body: Option<String>,
    pub author: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct MessageListResponse {
    pub messages: Vec<Message>,
}

/// `message` is `null` when the id matched nothing.
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: Option<Message>,
}

// -- Users --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateUserRequest {
    #[serde(rename = "_id", default)]
    pub id: Option<String>,
    pub username: String,
    pub password: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateUserRequest {
    pub username: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct UserListResponse {
    pub users: Vec<User>,
}

#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub user: Option<User>,
}

// -- Shared --

#[derive(Debug, Serialize)]
pub struct DeletedResponse {
    pub message: &'static str,
    #[serde(rename = "_id")]
    pub id: String,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}
