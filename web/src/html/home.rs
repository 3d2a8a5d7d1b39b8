use super::PageMeta;
use crate::{
    map::map_section,
    state::AppState,
    util::{FlashMessage, FlashMessageKind},
};
use axum::{
    extract::{Query, State},
    response::IntoResponse,
};
use libentree::{
    record::{LocationRecord, ProjectRecord},
    source,
};
use minijinja::context;
use serde::Deserialize;
use std::sync::Arc;
use tracing::warn;

#[derive(Debug, Default, Deserialize)]
pub(crate) struct HomeParams {
    /// Set after a contact form was submitted without javascript
    #[serde(default)]
    contact: Option<String>,
}

async fn load_content(
    state: &AppState,
) -> libentree::Result<(Vec<ProjectRecord>, Vec<LocationRecord>)> {
    futures::try_join!(
        source::featured_projects(state.source.as_ref()),
        source::youth_houses(state.source.as_ref()),
    )
}

pub(super) async fn home(
    State(state): State<AppState>,
    Query(params): Query<HomeParams>,
) -> impl IntoResponse {
    let (content, settings) = tokio::join!(load_content(&state), state.site_settings());
    let site = settings.map(|s| s.metadata);
    let meta = PageMeta::site(site.as_ref());
    let contact_messages: Vec<FlashMessage> = match params.contact.as_deref() {
        Some("sent") => vec![FlashMessage {
            kind: FlashMessageKind::Success,
            msg: super::contact::THANK_YOU.to_string(),
        }],
        _ => Vec::new(),
    };

    match content {
        Ok((featured_projects, youth_houses)) => {
            let youth_houses: Arc<[LocationRecord]> = youth_houses.into();
            let map = map_section(&state, youth_houses.clone(), site.as_ref()).await;
            state.render_template(
                "home.html.j2",
                context!(
                    meta => meta,
                    site => site,
                    featured_projects => featured_projects,
                    youth_houses => &*youth_houses,
                    map => map,
                    contact_messages => contact_messages,
                ),
            )
        }
        Err(e) => {
            warn!("Unable to load home page content: {e}");
            state.render_template(
                "home.html.j2",
                context!(
                    meta => meta,
                    site => site,
                    load_error => true,
                    contact_messages => contact_messages,
                ),
            )
        }
    }
}
