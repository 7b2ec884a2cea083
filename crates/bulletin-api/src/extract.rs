use axum::{
    Json,
    extract::{FromRequest, Request},
};
use serde::de::DeserializeOwned;

use bulletin_types::validation::Validate;

use crate::error::ApiError;

/// JSON body that has passed its shape's required-field rules.
///
/// A literal `null` body comes through as `None` so each handler can decide
/// what a missing payload means for its route.
#[derive(Debug)]
pub struct ValidJson<T>(pub Option<T>);

impl<S, T> FromRequest<S> for ValidJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(payload) = Json::<Option<T>>::from_request(req, state).await?;
        if let Some(value) = &payload {
            value.validate()?;
        }
        Ok(Self(payload))
    }
}
