use super::PageMeta;
use crate::{error::Error, state::AppState};
use axum::{
    extract::{Path, State},
    response::IntoResponse,
};
use libentree::source;
use minijinja::context;
use tracing::warn;

pub(super) async fn list_projects(State(state): State<AppState>) -> impl IntoResponse {
    let (projects, settings) = tokio::join!(
        source::projects(state.source.as_ref()),
        state.site_settings()
    );
    let (projects, load_error) = match projects {
        Ok(projects) => (projects, false),
        Err(e) => {
            warn!("Unable to load projects: {e}");
            (Vec::new(), true)
        }
    };
    state.render_template(
        "projects.html.j2",
        context!(
            meta => PageMeta::projects(),
            site => settings.map(|s| s.metadata),
            projects => projects,
            load_error => load_error,
        ),
    )
}

pub(super) async fn show_project(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<impl IntoResponse, Error> {
    let (project, settings) = tokio::join!(
        source::project_by_slug(state.source.as_ref(), &slug),
        state.site_settings()
    );
    let project =
        project?.ok_or_else(|| Error::NotFound(format!("Project '{slug}' not found")))?;
    Ok(state.render_template(
        "project.html.j2",
        context!(
            meta => PageMeta::project(&project),
            site => settings.map(|s| s.metadata),
            project => project,
        ),
    ))
}
