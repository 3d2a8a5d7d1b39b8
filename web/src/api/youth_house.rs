use crate::{error::Error, state::AppState};
use axum::{
    extract::{Path, State},
    response::Json,
};
use libentree::{record::LocationRecord, source};

pub(super) async fn list_youth_houses(
    State(state): State<AppState>,
) -> Result<Json<Vec<LocationRecord>>, Error> {
    let houses = source::youth_houses(state.source.as_ref()).await?;
    Ok(Json(houses))
}

pub(super) async fn show_youth_house(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<LocationRecord>, Error> {
    let house = source::youth_house_by_slug(state.source.as_ref(), &slug)
        .await?
        .ok_or_else(|| Error::NotFound(format!("Youth house '{slug}' not found")))?;
    Ok(Json(house))
}
