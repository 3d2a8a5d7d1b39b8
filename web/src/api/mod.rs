use crate::{error::Error, state::AppState};
use axum::{Router, routing::get};
use serde::Serialize;

mod map;
mod youth_house;

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/youth-houses", get(youth_house::list_youth_houses))
        .route("/youth-houses/{slug}", get(youth_house::show_youth_house))
        .route("/map", get(map::show_map))
}

/// The body of an API error response
#[derive(Debug, Serialize)]
pub(crate) struct ErrorBody {
    pub(crate) error: &'static str,
    pub(crate) message: String,
}

impl ErrorBody {
    pub(crate) fn new(err: &Error) -> Self {
        Self {
            error: err.code(),
            message: err.to_client_status().1,
        }
    }
}
