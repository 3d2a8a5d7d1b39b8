use super::PageMeta;
use crate::{error::Error, state::AppState};
use axum::{
    extract::{Path, State},
    response::IntoResponse,
};
use libentree::source;
use minijinja::context;

/// At most this many gallery images are shown on a youth house page
const GALLERY_LIMIT: usize = 6;

pub(super) async fn show_youth_house(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<impl IntoResponse, Error> {
    let (house, settings) = tokio::join!(
        source::youth_house_by_slug(state.source.as_ref(), &slug),
        state.site_settings()
    );
    let house = house?.ok_or_else(|| Error::NotFound(format!("Youth house '{slug}' not found")))?;
    let gallery: Vec<_> = house.metadata.gallery.iter().take(GALLERY_LIMIT).collect();
    Ok(state.render_template(
        "youth_house.html.j2",
        context!(
            meta => PageMeta::youth_house(&house),
            site => settings.map(|s| s.metadata),
            name => house.display_name(),
            gallery => gallery,
            house => house,
        ),
    ))
}
