use anyhow::anyhow;
use axum::{
    Json,
    extract::{Path, State},
    http::{StatusCode, header},
    response::IntoResponse,
};
use tracing::warn;

use bulletin_db::ConcurrencyConflict;
use bulletin_types::api::PublicMessageDto;
use bulletin_types::models::PublicMessage;

use crate::diagnostics::TraceModules;
use crate::error::ApiError;
use crate::extract::ValidJson;
use crate::mapping::{self, MappingError};
use crate::routes::MESSAGES_PATH;
use crate::state::{AppState, with_db};

/// GET /api/v1/messages: every message in list shape, in store order.
pub async fn get_public_messages(
    State(state): State<AppState>,
) -> Result<Json<Vec<PublicMessageDto>>, ApiError> {
    let messages = with_db(&state, |db| db.list_messages())
        .await
        .map_err(ApiError::unhandled)?;

    Ok(Json(messages.iter().map(mapping::to_list_dto).collect()))
}

/// GET /api/v1/messages/{id}: one message in full shape.
pub async fn get_public_message(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<PublicMessageDto>, ApiError> {
    let found = with_db(&state, move |db| {
        let Some(mut message) = db.find_message(id)? else {
            return Ok(None);
        };
        if message.client.is_none() {
            warn!("Public message {} has no client reference, attaching first stored client", id);
            message.client = db.first_client()?;
        }
        Ok(Some(message))
    })
    .await
    .map_err(ApiError::reported)?;

    let message = found.ok_or(ApiError::NotFound)?;
    let dto = mapping::to_dto(&message).map_err(ApiError::reported)?;

    Ok(Json(dto))
}

/// POST /api/v1/messages: creates a message and its client.
pub async fn create_public_message(
    State(state): State<AppState>,
    ValidJson(payload): ValidJson<PublicMessageDto>,
) -> Result<impl IntoResponse, ApiError> {
    let Some(dto) = payload else {
        return Err(ApiError::BadRequest);
    };

    let message = mapping::from_dto(&dto).map_err(|e| match e {
        MappingError::MissingArgument(_) => ApiError::reported_with(StatusCode::NOT_FOUND, e),
        MappingError::MissingClient { .. } => ApiError::reported(e),
    })?;
    state
        .diagnostics
        .debug(TraceModules::PUBLIC_MESSAGES, format_args!("creating {:?}", message));

    let stored = with_db(&state, move |db| db.insert_message(&message))
        .await
        .map_err(ApiError::reported)?;
    state.diagnostics.debug(
        TraceModules::STORE,
        format_args!("public message {} committed", stored.message_id),
    );

    let body = mapping::to_dto(&stored).map_err(ApiError::reported)?;
    let location = format!("{}/{}", MESSAGES_PATH, stored.message_id);

    Ok((StatusCode::CREATED, [(header::LOCATION, location)], Json(body)))
}

/// PUT /api/v1/messages/{id}: overwrites a message with the posted entity.
pub async fn update_public_message(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    ValidJson(payload): ValidJson<PublicMessage>,
) -> Result<StatusCode, ApiError> {
    let message = payload.ok_or_else(|| {
        ApiError::unhandled(anyhow!(
            "Public Message cannot be null (Parameter 'Public Message')"
        ))
    })?;

    if id != message.message_id {
        return Err(ApiError::BadRequest);
    }

    let updated = with_db(&state, move |db| {
        settle_update(db.update_message(&message), || db.message_exists(id))
    })
    .await
    .map_err(ApiError::unhandled)?;

    if updated {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound)
    }
}

/// Decides what an update outcome means for the caller: `Ok(true)` when the
/// row was written, `Ok(false)` when a conflict left no row behind. A
/// conflict on a row that still exists is passed through as an error.
fn settle_update(
    outcome: anyhow::Result<()>,
    still_exists: impl FnOnce() -> anyhow::Result<bool>,
) -> anyhow::Result<bool> {
    match outcome {
        Ok(()) => Ok(true),
        Err(e) if e.is::<ConcurrencyConflict>() => {
            if still_exists()? {
                Err(e)
            } else {
                Ok(false)
            }
        }
        Err(e) => Err(e),
    }
}

/// DELETE /api/v1/messages/{id}: removes a message, answering in plain text.
pub async fn delete_public_message(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<String, ApiError> {
    let deleted = with_db(&state, move |db| {
        let Some(message) = db.find_message(id)? else {
            return Ok(None);
        };
        db.delete_message(id)?;
        Ok(Some(message))
    })
    .await
    .map_err(ApiError::unhandled)?;

    let message = deleted.ok_or(ApiError::NotFound)?;
    Ok(format!("Public message with title {} is deleted", message.title))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn conflict() -> anyhow::Result<()> {
        Err(ConcurrencyConflict { message_id: 2 }.into())
    }

    #[test]
    fn test_settle_update_written() {
        let settled = settle_update(Ok(()), || panic!("existence is not checked on success"));
        assert!(settled.unwrap());
    }

    #[test]
    fn test_settle_update_conflict_on_vanished_row() {
        assert!(!settle_update(conflict(), || Ok(false)).unwrap());
    }

    #[test]
    fn test_settle_update_conflict_on_live_row_is_an_error() {
        let err = settle_update(conflict(), || Ok(true)).unwrap_err();
        assert!(err.is::<ConcurrencyConflict>());
    }

    #[test]
    fn test_settle_update_other_failures_pass_through() {
        let err = settle_update(Err(anyhow!("disk I/O error")), || Ok(false)).unwrap_err();
        assert!(!err.is::<ConcurrencyConflict>());
        assert_eq!(err.to_string(), "disk I/O error");
    }

    #[test]
    fn test_settle_update_existence_check_failure_propagates() {
        let err = settle_update(conflict(), || Err(anyhow!("database is locked"))).unwrap_err();
        assert_eq!(err.to_string(), "database is locked");
    }
}
