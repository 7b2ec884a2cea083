//! Conversions between the stored entity and the wire shape.

use bulletin_types::api::PublicMessageDto;
use bulletin_types::models::{Client, PublicMessage, long_date};
use chrono::Local;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum MappingError {
    #[error("Public message {message_id} has no client attached")]
    MissingClient { message_id: i64 },
    #[error("Value cannot be null. (Parameter '{0}')")]
    MissingArgument(&'static str),
}

/// Full shape, client fields included. Used for single-item reads.
pub fn to_dto(message: &PublicMessage) -> Result<PublicMessageDto, MappingError> {
    let client = message.client.as_ref().ok_or(MappingError::MissingClient {
        message_id: message.message_id,
    })?;

    Ok(PublicMessageDto {
        client_name: client.full_name.clone(),
        client_email_id: client.email_id.clone(),
        ..to_list_dto(message)
    })
}

/// List shape: the client fields are left out.
pub fn to_list_dto(message: &PublicMessage) -> PublicMessageDto {
    PublicMessageDto {
        message_id: message.message_id,
        title: message.title.clone(),
        message_content: message.message_content.clone(),
        addressed_to: message.addressed_to.clone(),
        client_name: None,
        client_email_id: None,
        valid_until: message.valid_until.clone(),
    }
}

/// New entity for a create request, stamped with today's long date. Ids stay
/// at 0 for the store to assign.
pub fn from_dto(dto: &PublicMessageDto) -> Result<PublicMessage, MappingError> {
    let full_name = dto
        .client_name
        .clone()
        .ok_or(MappingError::MissingArgument("clientName"))?;
    let email_id = dto
        .client_email_id
        .clone()
        .ok_or(MappingError::MissingArgument("clientEmailId"))?;

    Ok(PublicMessage {
        message_id: 0,
        title: dto.title.clone(),
        message_content: dto.message_content.clone(),
        addressed_to: dto.addressed_to.clone(),
        client: Some(Client {
            client_id: 0,
            full_name: Some(full_name),
            email_id: Some(email_id),
        }),
        posted_on: Some(long_date(&Local::now())),
        valid_until: dto.valid_until.clone(),
    })
}
