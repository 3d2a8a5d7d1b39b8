//! The map library used by the site: a mapbox-gl map drawn in the browser by
//! `static/map.js`. On the server side a view is just the document that the
//! script reads, with the popups already rendered to html.
use crate::{
    state::{AppState, TemplateEngine},
    util::{FlashMessage, FlashMessageKind},
};
use async_trait::async_trait;
use axum_template::TemplateEngine as _;
use libentree::{
    Error as LibError,
    map::{MapLibrary, MapSession, MapView, MapViewConfig, MarkerSpec},
    record::{LocationRecord, SiteSettingsMetadata},
};
use minijinja::context;
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use std::{collections::BTreeMap, sync::Arc};
use tracing::{debug, info};

const POPUP_TEMPLATE: &str = "_popup.html.j2";

/// Secret mapbox tokens start with this prefix and must never reach a browser
const SECRET_TOKEN_PREFIX: &str = "sk.";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub(crate) struct MarkerDocument {
    pub(crate) slug: String,
    pub(crate) longitude: f64,
    pub(crate) latitude: f64,
    pub(crate) popup_html: String,
}

/// Everything `map.js` needs to draw the map
#[derive(Debug, Clone, PartialEq, Serialize)]
pub(crate) struct MapDocument {
    pub(crate) access_token: String,
    pub(crate) style: String,
    /// `[longitude, latitude]`, the order mapbox-gl expects
    pub(crate) center: [f64; 2],
    pub(crate) zoom: f64,
    pub(crate) markers: Vec<MarkerDocument>,
}

pub(crate) struct ScriptMapView {
    tmpl: TemplateEngine,
    access_token: String,
    config: MapViewConfig,
    markers: BTreeMap<u64, MarkerDocument>,
    next_id: u64,
}

impl ScriptMapView {
    pub(crate) fn document(&self) -> MapDocument {
        MapDocument {
            access_token: self.access_token.clone(),
            style: self.config.style.clone(),
            center: [self.config.center.longitude, self.config.center.latitude],
            zoom: self.config.zoom,
            markers: self.markers.values().cloned().collect(),
        }
    }
}

impl MapView for ScriptMapView {
    type MarkerId = u64;

    fn add_marker(&mut self, marker: &MarkerSpec) -> libentree::Result<u64> {
        let popup_html = self
            .tmpl
            .render(POPUP_TEMPLATE, context!(popup => &marker.popup))
            .map_err(|e| LibError::Marker(format!("{}: {e}", marker.slug)))?;
        let id = self.next_id;
        self.next_id += 1;
        self.markers.insert(
            id,
            MarkerDocument {
                slug: marker.slug.clone(),
                longitude: marker.point.longitude,
                latitude: marker.point.latitude,
                popup_html,
            },
        );
        Ok(id)
    }

    fn remove_marker(&mut self, id: u64) {
        self.markers.remove(&id);
    }

    fn recenter(&mut self, config: &MapViewConfig) {
        self.config = config.clone();
    }

    fn destroy(&mut self) {
        self.markers.clear();
        self.access_token.clear();
    }
}

#[derive(Clone)]
pub(crate) struct ScriptMapLibrary {
    tmpl: TemplateEngine,
}

impl ScriptMapLibrary {
    pub(crate) fn new(tmpl: TemplateEngine) -> Self {
        Self { tmpl }
    }
}

#[async_trait]
impl MapLibrary for ScriptMapLibrary {
    type View = ScriptMapView;

    async fn initialize(
        &self,
        credential: &SecretString,
        config: &MapViewConfig,
    ) -> libentree::Result<ScriptMapView> {
        let token = credential.expose_secret().trim();
        if token.starts_with(SECRET_TOKEN_PREFIX) {
            return Err(LibError::MapUnavailable(
                "the map access token is a secret token".to_string(),
            ));
        }
        if config.style.trim().is_empty() {
            return Err(LibError::MapUnavailable("no map style configured".to_string()));
        }
        Ok(ScriptMapView {
            tmpl: self.tmpl.clone(),
            access_token: token.to_string(),
            config: config.clone(),
            markers: BTreeMap::new(),
            next_id: 0,
        })
    }
}

/// The map part of a page: either a map or the reason there is none
#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub(crate) enum MapSection {
    Ready { map: MapDocument },
    Unavailable { notice: FlashMessage },
}

/// Build the map document for `records`. The session only lives for the
/// duration of this call.
pub(crate) async fn map_document(
    state: &AppState,
    records: Arc<[LocationRecord]>,
    settings: Option<&SiteSettingsMetadata>,
) -> libentree::Result<MapDocument> {
    let config = state.config.map.view_config().with_site_settings(settings);
    let session = MapSession::open(&state.map_library, &state.map_credential, records, config).await?;
    let document = session
        .view()
        .map(ScriptMapView::document)
        .ok_or_else(|| LibError::MapUnavailable("the map view went away".to_string()))?;
    debug!(markers = document.markers.len(), "built map document");
    Ok(document)
}

pub(crate) async fn map_section(
    state: &AppState,
    records: Arc<[LocationRecord]>,
    settings: Option<&SiteSettingsMetadata>,
) -> MapSection {
    match map_document(state, records, settings).await {
        Ok(map) => MapSection::Ready { map },
        Err(e) => {
            info!("showing the youth house list instead of the map: {e}");
            MapSection::Unavailable {
                notice: FlashMessage {
                    kind: FlashMessageKind::Info,
                    msg: "The interactive map is currently unavailable. Here is a list of all youth houses instead.".to_string(),
                },
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::template_engine;
    use libentree::{
        map::{MapCredential, MapState},
        record::{CmsObject, LocationMetadata},
    };
    use test_log::test;

    fn house(slug: &str, lat: &str, lng: &str, description: &str) -> LocationRecord {
        CmsObject {
            id: format!("id-{slug}"),
            slug: slug.to_string(),
            title: slug.to_uppercase(),
            metadata: LocationMetadata {
                latitude: Some(lat.to_string()),
                longitude: Some(lng.to_string()),
                description: Some(description.to_string()),
                ..Default::default()
            },
        }
    }

    fn library() -> ScriptMapLibrary {
        ScriptMapLibrary::new(template_engine("test", "./templates"))
    }

    fn token(s: &str) -> MapCredential {
        MapCredential::with_token(Some(SecretString::from(s.to_string())))
    }

    #[test(tokio::test)]
    async fn test_document() {
        let mut first = house("a", "50.85", "4.35", "<b>Open</b> every day");
        first.title = "Tom & Jerry <House>".into();
        let records: Arc<[LocationRecord]> = vec![
            first,
            house("b", "", "4.35", "no latitude"),
            house("c", "50.80", "4.30", ""),
        ]
        .into();
        let mut session = MapSession::open(
            &library(),
            &token("pk.abc"),
            records,
            MapViewConfig::default(),
        )
        .await
        .expect("failed to open map");
        assert_eq!(session.state(), MapState::Ready);

        let doc = session.view().map(ScriptMapView::document).expect("no view");
        assert_eq!(doc.access_token, "pk.abc");
        assert_eq!(doc.center, [4.3572, 50.8476]);
        let slugs: Vec<_> = doc.markers.iter().map(|m| m.slug.as_str()).collect();
        assert_eq!(slugs, vec!["a", "c"]);
        assert_eq!(doc.markers[0].longitude, 4.35);
        // popups are rendered as escaped html
        let popup = &doc.markers[0].popup_html;
        assert!(popup.contains("Tom &amp; Jerry &lt;House&gt;"));
        assert!(popup.contains("Open every day"));
        assert!(popup.contains("youth-houses"));

        // the same list again changes nothing, a new one replaces the markers
        let same = session.records().clone();
        session.set_records(same);
        assert_eq!(session.view().map(|v| v.markers.len()), Some(2));
        session.set_records(vec![house("d", "50.9", "4.4", "")].into());
        let doc = session.view().map(ScriptMapView::document).expect("no view");
        assert_eq!(doc.markers.len(), 1);
        assert_eq!(doc.markers[0].slug, "d");
    }

    #[test(tokio::test)]
    async fn test_secret_token_refused() {
        let res = MapSession::open(
            &library(),
            &token("sk.topsecret"),
            Arc::from(Vec::new()),
            MapViewConfig::default(),
        )
        .await;
        assert!(matches!(res, Err(LibError::MapUnavailable(_))));
    }

    #[test(tokio::test)]
    async fn test_missing_style_refused() {
        let config = MapViewConfig {
            style: " ".into(),
            ..Default::default()
        };
        let res = MapSession::open(&library(), &token("pk.abc"), Arc::from(Vec::new()), config).await;
        assert!(matches!(res, Err(LibError::MapUnavailable(_))));
    }
}
