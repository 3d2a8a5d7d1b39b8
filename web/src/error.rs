use axum::{
    extract::rejection::FormRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use std::sync::Arc;
use tracing::warn;

#[derive(thiserror::Error, Debug)]
pub(crate) enum Error {
    #[error(transparent)]
    Libentree(#[from] libentree::Error),
    #[error("Resource Not Found: {0}")]
    NotFound(String),
    #[error("The provided form was rejected: {0}")]
    UnprocessableEntityFormRejection(#[source] FormRejection),
}

impl Error {
    /// A stable identifier for API clients
    pub(crate) fn code(&self) -> &'static str {
        match self {
            Error::NotFound(_) => "not_found",
            Error::Libentree(libentree::Error::Fetch { .. }) => "fetch_failed",
            Error::Libentree(libentree::Error::MapUnavailable(_)) => "map_unavailable",
            Error::UnprocessableEntityFormRejection(_) => "unprocessable_entity",
            _ => "internal_error",
        }
    }

    pub(crate) fn to_client_status(&self) -> (StatusCode, String) {
        match self {
            Error::Libentree(libentree::Error::Fetch { .. }) => (
                StatusCode::BAD_GATEWAY,
                "Unable to load content. Please check your connection and try again.".to_string(),
            ),
            Error::Libentree(libentree::Error::MapUnavailable(_)) => (
                StatusCode::SERVICE_UNAVAILABLE,
                "The map is currently unavailable".to_string(),
            ),
            Error::Libentree(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Content error".to_string(),
            ),
            Error::NotFound(message) => (StatusCode::NOT_FOUND, message.clone()),
            Error::UnprocessableEntityFormRejection(_) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "The form was not in the expected format. The request could not be processed."
                    .to_string(),
            ),
        }
    }
}

// Tell axum how to convert `Error` into a response.
impl IntoResponse for Error {
    fn into_response(self) -> Response {
        warn!("Got error for response: {self:?}");
        // placeholder, will get refined in the response mapper
        let mut response = StatusCode::INTERNAL_SERVER_ERROR.into_response();
        // insert the error into the response so that we can log it in the response mapper.
        response.extensions_mut().insert(Arc::new(self));
        response
    }
}
