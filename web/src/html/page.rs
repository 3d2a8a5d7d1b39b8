use super::PageMeta;
use crate::{error::Error, state::AppState};
use axum::{
    extract::{Path, State},
    response::IntoResponse,
};
use libentree::source;
use minijinja::context;

pub(super) async fn show_page(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<impl IntoResponse, Error> {
    let (page, settings) = tokio::join!(
        source::page_by_slug(state.source.as_ref(), &slug),
        state.site_settings()
    );
    let page = page?.ok_or_else(|| Error::NotFound(format!("Page '{slug}' not found")))?;
    Ok(state.render_template(
        "page.html.j2",
        context!(
            meta => PageMeta::page(&page),
            site => settings.map(|s| s.metadata),
            title => page.display_title(),
            page => page,
        ),
    ))
}
