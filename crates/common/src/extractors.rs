//! Custom axum extractors for Energram

use axum::{
    extract::{rejection::JsonRejection, FromRequest, Request},
    response::{IntoResponse, Response},
    Json,
};
use serde::{de::DeserializeOwned, Deserialize};
use validator::Validate;

use crate::Error;

/// Rows per admin table page when the caller does not ask
const DEFAULT_PAGE_SIZE: i64 = 25;

/// Upper bound on rows per admin table page
const MAX_PAGE_SIZE: i64 = 200;

/// Offset/limit query parameters for admin listings
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct Pagination {
    #[serde(default)]
    pub offset: Option<i64>,
    #[serde(default)]
    pub limit: Option<i64>,
}

impl Pagination {
    pub fn offset(&self) -> i64 {
        self.offset.unwrap_or(0).max(0)
    }

    pub fn limit(&self) -> i64 {
        self.limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE)
    }
}

/// JSON body extractor that runs `validator` rules after deserializing.
///
/// Malformed bodies and rule violations both reject with 400.
#[derive(Debug)]
pub struct ValidatedJson<T>(pub T);

#[derive(Debug)]
pub enum ValidatedJsonRejection {
    Json(JsonRejection),
    Validation(Error),
}

impl IntoResponse for ValidatedJsonRejection {
    fn into_response(self) -> Response {
        match self {
            ValidatedJsonRejection::Json(rejection) => {
                Error::Validation(rejection.body_text()).into_response()
            }
            ValidatedJsonRejection::Validation(e) => e.into_response(),
        }
    }
}

impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = ValidatedJsonRejection;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(payload) = Json::<T>::from_request(req, state)
            .await
            .map_err(ValidatedJsonRejection::Json)?;

        if let Err(errors) = payload.validate() {
            tracing::debug!(error = %errors, "Request body failed validation");
            return Err(ValidatedJsonRejection::Validation(Error::Validation(
                format!("Validation failed: {}", errors),
            )));
        }

        Ok(ValidatedJson(payload))
    }
}
