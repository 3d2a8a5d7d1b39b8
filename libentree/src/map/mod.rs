//! Placing youth houses on an interactive map
//!
//! The map itself is drawn by an external library. This module decides which
//! records can be shown, what their popups contain, and keeps the markers of a
//! live map view in sync with the records it is given. See [MapSession] for the
//! lifecycle of a single view.

use crate::record::SiteSettingsMetadata;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

mod marker;
mod session;

pub use marker::{
    ActionKind, EXCERPT_CHARS, InvalidCoordinates, MarkerSpec, Point, PopupAction, PopupContent,
    build_popup_content, validate_coordinates,
};
pub use session::{InitTicket, MapLibrary, MapSession, MapState, MapView, MarkerHandle, rebuild_markers};

/// The center of Brussels
pub const DEFAULT_CENTER: Point = Point {
    latitude: 50.8476,
    longitude: 4.3572,
};
pub const DEFAULT_ZOOM: f64 = 12.0;
pub const DEFAULT_STYLE: &str = "mapbox://styles/mapbox/light-v11";

/// Token values that are known not to be real credentials
pub const DEFAULT_PLACEHOLDER_TOKENS: &[&str] = &["pk.test"];

/// How a map view is positioned and drawn
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapViewConfig {
    pub center: Point,
    pub zoom: f64,
    pub style: String,
}

impl Default for MapViewConfig {
    fn default() -> Self {
        Self {
            center: DEFAULT_CENTER,
            zoom: DEFAULT_ZOOM,
            style: DEFAULT_STYLE.to_string(),
        }
    }
}

impl MapViewConfig {
    /// Apply the map settings an editor entered in the CMS on top of `self`.
    /// Values that don't parse (or aren't finite) are ignored, as is a zoom
    /// level that is not positive.
    pub fn with_site_settings(mut self, settings: Option<&SiteSettingsMetadata>) -> Self {
        let Some(settings) = settings else {
            return self;
        };
        let parse = |v: Option<&String>| {
            v.and_then(|s| s.trim().parse::<f64>().ok())
                .filter(|n| n.is_finite())
        };
        if let Some(lat) = parse(settings.map_center_lat.as_ref()) {
            self.center.latitude = lat;
        }
        if let Some(lng) = parse(settings.map_center_lng.as_ref()) {
            self.center.longitude = lng;
        }
        if let Some(zoom) = settings.map_zoom.filter(|z| z.is_finite() && *z > 0.0) {
            self.zoom = zoom;
        }
        self
    }
}

/// The access credential for the map library, together with the values that
/// should be treated as "not configured"
#[derive(Debug)]
pub struct MapCredential {
    token: Option<SecretString>,
    placeholders: Vec<String>,
}

impl MapCredential {
    pub fn new(token: Option<SecretString>, placeholders: Vec<String>) -> Self {
        Self {
            token,
            placeholders,
        }
    }

    /// A credential with the default placeholder list
    pub fn with_token(token: Option<SecretString>) -> Self {
        Self::new(
            token,
            DEFAULT_PLACEHOLDER_TOKENS
                .iter()
                .map(|s| s.to_string())
                .collect(),
        )
    }

    /// The token, unless it is missing, blank, or one of the placeholders
    pub fn usable(&self) -> Option<&SecretString> {
        self.token.as_ref().filter(|t| {
            let t = t.expose_secret().trim();
            !t.is_empty() && !self.placeholders.iter().any(|p| p == t)
        })
    }
}
