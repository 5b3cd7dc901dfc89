use axum::{
    Json,
    extract::{Path, State},
};
use axum_extra::extract::WithRejection;
use tracing::{debug, info, warn};
use uuid::Uuid;

use missive_types::api::{
    CreateMessageRequest, DeletedResponse, MessageListResponse, MessageResponse,
    UpdateMessageRequest,
};
use missive_types::models::Message;

use crate::error::{ApiError, require_non_empty};
use crate::state::{AppState, AuthorPolicy, run_blocking};

/// GET /messages
pub async fn list_messages(
    State(state): State<AppState>,
) -> Result<Json<MessageListResponse>, ApiError> {
    let rows = run_blocking(&state, |db| db.list_messages()).await?;

    Ok(Json(MessageListResponse {
        messages: rows.into_iter().map(Message::from).collect(),
    }))
}

/// GET /messages/{message_id}. An unknown id answers `{message: null}`.
pub async fn get_message(
    State(state): State<AppState>,
    WithRejection(Path(message_id), _): WithRejection<Path<String>, ApiError>,
) -> Result<Json<MessageResponse>, ApiError> {
    let row = run_blocking(&state, move |db| db.get_message(&message_id)).await?;

    Ok(Json(MessageResponse {
        message: row.map(Message::from),
    }))
}

/// POST /messages
///
/// Saves the message, then prepends its id to the author's message list. The
/// two writes are independent: if the second fails the message stays saved
/// without a back-reference.
pub async fn create_message(
    State(state): State<AppState>,
    WithRejection(Json(req), _): WithRejection<Json<CreateMessageRequest>, ApiError>,
) -> Result<Json<MessageResponse>, ApiError> {
    require_non_empty("title", &req.title)?;
    require_non_empty("body", &req.body)?;
    require_non_empty("author", &req.author)?;
    if let Some(id) = &req.id {
        require_non_empty("_id", id)?;
    }

    let message = Message {
        id: req.id.unwrap_or_else(|| Uuid::new_v4().to_string()),
        title: req.title,
        body: req.body,
        author: req.author,
    };

    if state.author_policy == AuthorPolicy::Strict {
        let author = message.author.clone();
        let exists = run_blocking(&state, move |db| db.get_user_by_id(&author))
            .await?
            .is_some();
        if !exists {
            return Err(ApiError::Validation(format!(
                "User {} does not exist.",
                message.author
            )));
        }
    }

    let saved = message.clone();
    run_blocking(&state, move |db| {
        db.insert_message(&saved.id, &saved.title, &saved.body, &saved.author)
    })
    .await?;

    let author = message.author.clone();
    let user = run_blocking(&state, move |db| db.get_user_by_id(&author)).await?;
    let Some(user) = user else {
        warn!("Message {} saved but author {} is missing", message.id, message.author);
        return Err(ApiError::Internal(format!("User {} not found", message.author)));
    };

    let message_id = message.id.clone();
    run_blocking(&state, move |db| db.prepend_user_message(&user.id, &message_id)).await?;

    info!("Message {} created by {}", message.id, message.author);
    Ok(Json(MessageResponse {
        message: Some(message),
    }))
}

/// PUT /messages/{message_id}
///
/// Overwrites the supplied fields and answers with a fresh read. Last writer
/// wins; an unknown id answers `{message: null}`.
pub async fn update_message(
    State(state): State<AppState>,
    WithRejection(Path(message_id), _): WithRejection<Path<String>, ApiError>,
    WithRejection(Json(req), _): WithRejection<Json<UpdateMessageRequest>, ApiError>,
) -> Result<Json<MessageResponse>, ApiError> {
    for (field, value) in [("title", &req.title), ("body", &req.body), ("author", &req.author)] {
        if let Some(value) = value {
            require_non_empty(field, value)?;
        }
    }

    let id = message_id.clone();
    let matched = run_blocking(&state, move |db| {
        db.update_message(
            &id,
            req.title.as_deref(),
            req.body.as_deref(),
            req.author.as_deref(),
        )
    })
    .await?;
    if !matched {
        debug!("Update matched no message for id {}", message_id);
    }

    let row = run_blocking(&state, move |db| db.get_message(&message_id)).await?;

    Ok(Json(MessageResponse {
        message: row.map(Message::from),
    }))
}

/// DELETE /messages/{message_id}
///
/// The author's message list is left as is, so it keeps the deleted id.
pub async fn delete_message(
    State(state): State<AppState>,
    WithRejection(Path(message_id), _): WithRejection<Path<String>, ApiError>,
) -> Result<Json<DeletedResponse>, ApiError> {
    let id = message_id.clone();
    let deleted = run_blocking(&state, move |db| db.delete_message(&id)).await?;
    if !deleted {
        return Err(ApiError::NotFound("Message does not exist.".into()));
    }

    info!("Message {} deleted", message_id);
    Ok(Json(DeletedResponse {
        message: "Successfully deleted.",
        id: message_id,
    }))
}
