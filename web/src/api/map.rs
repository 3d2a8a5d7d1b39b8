use crate::{
    error::Error,
    map::{MapDocument, map_document},
    state::AppState,
};
use axum::{extract::State, response::Json};
use libentree::source;

/// The map of all youth houses, for clients that draw the map themselves.
/// Answers `503` when the map can't be set up.
pub(super) async fn show_map(State(state): State<AppState>) -> Result<Json<MapDocument>, Error> {
    let (houses, settings) = tokio::join!(
        source::youth_houses(state.source.as_ref()),
        state.site_settings()
    );
    let settings = settings.map(|s| s.metadata);
    let document = map_document(&state, houses?.into(), settings.as_ref()).await?;
    Ok(Json(document))
}
