use crate::{record::LocationRecord, text};
use serde::{Deserialize, Serialize};

/// The maximum length of the description excerpt shown in a popup
pub const EXCERPT_CHARS: usize = 140;

/// A position in decimal degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub latitude: f64,
    pub longitude: f64,
}

/// The reason a record can't be placed on the map
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum InvalidCoordinates {
    #[error("no latitude")]
    MissingLatitude,
    #[error("no longitude")]
    MissingLongitude,
    #[error("latitude '{0}' is not a finite number")]
    Latitude(String),
    #[error("longitude '{0}' is not a finite number")]
    Longitude(String),
}

fn parse_degrees(value: &str) -> Option<f64> {
    value.trim().parse::<f64>().ok().filter(|n| n.is_finite())
}

/// Turn the coordinates of a record into a [Point]. Both coordinates must be
/// present and be finite numbers; no range check is applied.
pub fn validate_coordinates(record: &LocationRecord) -> Result<Point, InvalidCoordinates> {
    let lat = record
        .metadata
        .latitude
        .as_deref()
        .ok_or(InvalidCoordinates::MissingLatitude)?;
    let lng = record
        .metadata
        .longitude
        .as_deref()
        .ok_or(InvalidCoordinates::MissingLongitude)?;
    let latitude = parse_degrees(lat).ok_or_else(|| InvalidCoordinates::Latitude(lat.into()))?;
    let longitude = parse_degrees(lng).ok_or_else(|| InvalidCoordinates::Longitude(lng.into()))?;
    Ok(Point {
        latitude,
        longitude,
    })
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum_macros::Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ActionKind {
    Phone,
    Email,
    Website,
}

/// A link shown at the bottom of a popup
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PopupAction {
    pub kind: ActionKind,
    pub label: String,
    pub href: String,
}

/// The content of a marker popup. All fields are plain text; escaping is left
/// to whatever renders it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PopupContent {
    pub name: String,
    pub neighborhood: Option<String>,
    /// The address, one entry per line
    pub address_lines: Vec<String>,
    pub age_range: Option<String>,
    /// Plain-text excerpt of the description, at most [EXCERPT_CHARS] long
    pub excerpt: Option<String>,
    pub actions: Vec<PopupAction>,
    pub detail_path: String,
}

pub fn build_popup_content(record: &LocationRecord) -> PopupContent {
    let meta = &record.metadata;
    let mut actions = Vec::new();
    if let Some(phone) = &meta.phone {
        actions.push(PopupAction {
            kind: ActionKind::Phone,
            label: phone.clone(),
            href: format!("tel:{}", phone.replace(' ', "")),
        });
    }
    if let Some(email) = &meta.email {
        actions.push(PopupAction {
            kind: ActionKind::Email,
            label: email.clone(),
            href: format!("mailto:{email}"),
        });
    }
    if let Some(website) = meta.website.as_deref().and_then(text::web_url) {
        actions.push(PopupAction {
            kind: ActionKind::Website,
            label: "Website".to_string(),
            href: website.to_string(),
        });
    }
    PopupContent {
        name: record.display_name().to_string(),
        neighborhood: meta.neighborhood.clone(),
        address_lines: meta
            .address
            .as_deref()
            .map(|a| text::lines(a).into_iter().map(String::from).collect())
            .unwrap_or_default(),
        age_range: meta.age_range.clone(),
        excerpt: meta
            .description
            .as_deref()
            .map(|d| text::excerpt(d, EXCERPT_CHARS))
            .filter(|e| !e.is_empty()),
        actions,
        detail_path: record.detail_path(),
    }
}

/// Everything the map library needs to draw one marker
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarkerSpec {
    pub slug: String,
    pub point: Point,
    pub popup: PopupContent,
}
