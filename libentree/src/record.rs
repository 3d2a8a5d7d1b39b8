//! Objects that represent the content stored in the CMS
//!
//! Every object in the CMS shares the same envelope (id, slug, title, type)
//! and carries a type-specific `metadata` bag. The bag is decoded into an
//! explicit struct per kind so that nothing downstream has to deal with
//! loosely-typed data.
use crate::{
    empty_string_as_none,
    error::{Error, Result},
};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// The kinds of objects the site reads from the CMS. The string form is the
/// CMS object type slug.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Deserialize,
    Serialize,
    strum_macros::Display,
    strum_macros::EnumString,
    strum_macros::AsRefStr,
)]
pub enum RecordKind {
    #[serde(rename = "youth-houses")]
    #[strum(serialize = "youth-houses")]
    YouthHouse,
    #[serde(rename = "projects")]
    #[strum(serialize = "projects")]
    Project,
    #[serde(rename = "pages")]
    #[strum(serialize = "pages")]
    Page,
    #[serde(rename = "site-settings")]
    #[strum(serialize = "site-settings")]
    SiteSettings,
}

// The CMS sends `null` or `""` for fields that were never filled in, whatever
// their type
fn blank_as_none<'de, D, T>(de: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    match Option::<Value>::deserialize(de)? {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) if s.trim().is_empty() => Ok(None),
        Some(value) => T::deserialize(value)
            .map(Some)
            .map_err(serde::de::Error::custom),
    }
}

fn blank_as_default<'de, D, T>(de: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(blank_as_none(de)?.unwrap_or_default())
}

/// The envelope shared by all CMS objects
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct CmsObject<M> {
    pub id: String,
    pub slug: String,
    pub title: String,
    pub metadata: M,
}

/// A reference to an image hosted by the CMS
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct ImageRef {
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub imgix_url: String,
}

impl ImageRef {
    /// Build a url to a resized version of the image. Falls back to the plain
    /// url when the CMS did not provide an imgix url.
    pub fn sized(&self, width: u32, height: u32) -> String {
        if self.imgix_url.is_empty() {
            self.url.clone()
        } else {
            format!(
                "{}?w={width}&h={height}&fit=crop&auto=format,compress",
                self.imgix_url
            )
        }
    }
}

/// The value of a select-dropdown field in the CMS
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct SelectValue {
    pub key: String,
    pub value: String,
}

/// Metadata of a youth house, i.e. a physical location in the network
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct LocationMetadata {
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub name: Option<String>,
    /// Free text, possibly spanning multiple lines
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub address: Option<String>,
    /// Decimal degrees, as entered by an editor
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub latitude: Option<String>,
    /// Decimal degrees, as entered by an editor
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub longitude: Option<String>,
    /// Rich text (HTML)
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub description: Option<String>,
    /// One activity per line
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub activities: Option<String>,
    /// One `Day: hours` entry per line
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub opening_hours: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub phone: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub email: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub website: Option<String>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub featured_image: Option<ImageRef>,
    #[serde(default, deserialize_with = "blank_as_default")]
    pub gallery: Vec<ImageRef>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub neighborhood: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub age_range: Option<String>,
}

/// A youth house: a directory entry for a physical youth-services site
pub type LocationRecord = CmsObject<LocationMetadata>;

impl LocationRecord {
    /// The name shown to visitors. Editors sometimes leave the name field
    /// empty, in which case the object title is used.
    pub fn display_name(&self) -> &str {
        self.metadata.name.as_deref().unwrap_or(&self.title)
    }

    /// The relative url of the detail page for this youth house
    pub fn detail_path(&self) -> String {
        format!("/youth-houses/{}", self.slug)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct ProjectMetadata {
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub short_description: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub full_description: Option<String>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub status: Option<SelectValue>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub category: Option<SelectValue>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub featured_image: Option<ImageRef>,
    /// `YYYY-MM-DD`
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub start_date: Option<String>,
    /// `YYYY-MM-DD`
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub end_date: Option<String>,
    #[serde(default, deserialize_with = "blank_as_default")]
    pub youth_houses_involved: Vec<LocationRecord>,
    #[serde(default, deserialize_with = "blank_as_default")]
    pub featured_homepage: bool,
}

/// A community project run by one or more youth houses
pub type ProjectRecord = CmsObject<ProjectMetadata>;

impl ProjectRecord {
    pub fn display_title(&self) -> &str {
        self.metadata.title.as_deref().unwrap_or(&self.title)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct PageMetadata {
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub title: Option<String>,
    /// Rich text (HTML)
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub content: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub seo_description: Option<String>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub featured_image: Option<ImageRef>,
    #[serde(default, deserialize_with = "blank_as_default")]
    pub show_in_nav: bool,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub nav_order: Option<i64>,
}

/// A free-form content page
pub type PageRecord = CmsObject<PageMetadata>;

impl PageRecord {
    pub fn display_title(&self) -> &str {
        self.metadata.title.as_deref().unwrap_or(&self.title)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct SocialMedia {
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub instagram: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub facebook: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub twitter: Option<String>,
}

impl SocialMedia {
    pub fn is_empty(&self) -> bool {
        self.instagram.is_none() && self.facebook.is_none() && self.twitter.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct BrandColors {
    pub primary: String,
    pub secondary: String,
    pub accent: String,
    pub dark: String,
    pub light: String,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct SiteSettingsMetadata {
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub site_title: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub site_description: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub hero_title: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub hero_subtitle: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub contact_email: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub contact_phone: Option<String>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub social_media: Option<SocialMedia>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub brand_colors: Option<BrandColors>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub map_center_lat: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub map_center_lng: Option<String>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub map_zoom: Option<f64>,
}

/// Site-wide settings. The CMS holds a single object of this kind.
pub type SiteSettingsRecord = CmsObject<SiteSettingsMetadata>;

/// Any object read from the CMS, discriminated by its `type` field
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(tag = "type")]
pub enum Record {
    #[serde(rename = "youth-houses")]
    YouthHouse(LocationRecord),
    #[serde(rename = "projects")]
    Project(ProjectRecord),
    #[serde(rename = "pages")]
    Page(PageRecord),
    #[serde(rename = "site-settings")]
    SiteSettings(SiteSettingsRecord),
}

impl Record {
    pub fn kind(&self) -> RecordKind {
        match self {
            Record::YouthHouse(_) => RecordKind::YouthHouse,
            Record::Project(_) => RecordKind::Project,
            Record::Page(_) => RecordKind::Page,
            Record::SiteSettings(_) => RecordKind::SiteSettings,
        }
    }

    pub fn slug(&self) -> &str {
        match self {
            Record::YouthHouse(r) => &r.slug,
            Record::Project(r) => &r.slug,
            Record::Page(r) => &r.slug,
            Record::SiteSettings(r) => &r.slug,
        }
    }
}

/// A record type that corresponds to exactly one [RecordKind]
pub trait TypedRecord: Sized {
    const KIND: RecordKind;

    /// Unwrap the typed record from a [Record], failing if the record is of
    /// another kind
    fn from_record(record: Record) -> Result<Self>;
}

macro_rules! typed_record {
    ($ty:ty, $variant:ident) => {
        impl TypedRecord for $ty {
            const KIND: RecordKind = RecordKind::$variant;

            fn from_record(record: Record) -> Result<Self> {
                match record {
                    Record::$variant(r) => Ok(r),
                    other => Err(Error::UnexpectedKind {
                        expected: Self::KIND,
                        actual: other.kind(),
                    }),
                }
            }
        }

        impl From<$ty> for Record {
            fn from(value: $ty) -> Self {
                Record::$variant(value)
            }
        }
    };
}

typed_record!(LocationRecord, YouthHouse);
typed_record!(ProjectRecord, Project);
typed_record!(PageRecord, Page);
typed_record!(SiteSettingsRecord, SiteSettings);

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_decode_youth_house() {
        let json = r#"{
            "id": "66a1",
            "slug": "jh-anderlecht",
            "title": "JH Anderlecht",
            "type": "youth-houses",
            "metadata": {
                "name": "Jeugdhuis Anderlecht",
                "address": "Rue Wayez 12\n1070 Anderlecht",
                "latitude": "50.8366",
                "longitude": "4.3076",
                "description": "<p>Open every day</p>",
                "phone": "",
                "email": null,
                "gallery": null,
                "neighborhood": "Anderlecht"
            }
        }"#;
        let record: Record = serde_json::from_str(json).expect("failed to decode");
        assert_eq!(record.kind(), RecordKind::YouthHouse);
        assert_eq!(record.slug(), "jh-anderlecht");
        let house = LocationRecord::from_record(record).expect("wrong kind");
        assert_eq!(house.display_name(), "Jeugdhuis Anderlecht");
        assert_eq!(house.metadata.latitude.as_deref(), Some("50.8366"));
        // empty strings and nulls are both absent
        assert_eq!(house.metadata.phone, None);
        assert_eq!(house.metadata.email, None);
        assert!(house.metadata.gallery.is_empty());
        assert_eq!(house.metadata.age_range, None);
        assert_eq!(house.detail_path(), "/youth-houses/jh-anderlecht");
    }

    #[test]
    fn test_display_name_falls_back_to_title() {
        let house = LocationRecord {
            id: "1".into(),
            slug: "x".into(),
            title: "The Title".into(),
            metadata: LocationMetadata {
                name: None,
                ..Default::default()
            },
        };
        assert_eq!(house.display_name(), "The Title");
    }

    #[test]
    fn test_decode_project_with_nested_houses() {
        let json = r#"{
            "id": "p1",
            "slug": "street-art",
            "title": "Street Art",
            "type": "projects",
            "metadata": {
                "title": "Street Art Brussels",
                "short_description": "Painting walls",
                "status": {"key": "active", "value": "Active"},
                "category": null,
                "start_date": "2024-03-01",
                "featured_homepage": true,
                "youth_houses_involved": [
                    {"id": "h1", "slug": "h1", "title": "House 1", "type": "youth-houses",
                     "metadata": {"name": "House One"}}
                ]
            }
        }"#;
        let project =
            ProjectRecord::from_record(serde_json::from_str(json).expect("failed to decode"))
                .expect("wrong kind");
        assert_eq!(project.display_title(), "Street Art Brussels");
        assert!(project.metadata.featured_homepage);
        assert_eq!(
            project.metadata.status.as_ref().map(|s| s.key.as_str()),
            Some("active")
        );
        assert_eq!(project.metadata.youth_houses_involved.len(), 1);
        assert_eq!(
            project.metadata.youth_houses_involved[0].display_name(),
            "House One"
        );
    }

    #[test]
    fn test_blank_fields_are_absent() {
        let json = r#"{"id": "h", "slug": "h", "title": "H", "type": "youth-houses",
            "metadata": {"featured_image": "", "gallery": ""}}"#;
        let house = LocationRecord::from_record(serde_json::from_str(json).expect("failed to decode"))
            .expect("wrong kind");
        assert_eq!(house.metadata.featured_image, None);
        assert!(house.metadata.gallery.is_empty());

        let json = r#"{"id": "p", "slug": "p", "title": "P", "type": "projects",
            "metadata": {"status": "", "category": "", "featured_image": " ",
                "youth_houses_involved": "", "featured_homepage": ""}}"#;
        let project =
            ProjectRecord::from_record(serde_json::from_str(json).expect("failed to decode"))
                .expect("wrong kind");
        assert_eq!(project.metadata.status, None);
        assert_eq!(project.metadata.category, None);
        assert_eq!(project.metadata.featured_image, None);
        assert!(project.metadata.youth_houses_involved.is_empty());
        assert!(!project.metadata.featured_homepage);

        let json = r#"{"id": "a", "slug": "a", "title": "A", "type": "pages",
            "metadata": {"featured_image": "", "show_in_nav": "", "nav_order": ""}}"#;
        let page = PageRecord::from_record(serde_json::from_str(json).expect("failed to decode"))
            .expect("wrong kind");
        assert_eq!(page.metadata.featured_image, None);
        assert!(!page.metadata.show_in_nav);
        assert_eq!(page.metadata.nav_order, None);

        let json = r#"{"id": "s", "slug": "s", "title": "S", "type": "site-settings",
            "metadata": {"hero_title": "Hi", "map_zoom": "", "social_media": "",
                "brand_colors": ""}}"#;
        let settings =
            SiteSettingsRecord::from_record(serde_json::from_str(json).expect("failed to decode"))
                .expect("wrong kind");
        assert_eq!(settings.metadata.hero_title.as_deref(), Some("Hi"));
        assert_eq!(settings.metadata.map_zoom, None);
        assert_eq!(settings.metadata.social_media, None);
        assert_eq!(settings.metadata.brand_colors, None);
    }

    #[test]
    fn test_filled_fields_still_decode() {
        let json = r#"{"id": "s", "slug": "s", "title": "S", "type": "site-settings",
            "metadata": {"map_zoom": 13.5, "social_media": {"instagram": "https://instagram.com/x"}}}"#;
        let settings =
            SiteSettingsRecord::from_record(serde_json::from_str(json).expect("failed to decode"))
                .expect("wrong kind");
        assert_eq!(settings.metadata.map_zoom, Some(13.5));
        assert!(settings.metadata.social_media.is_some_and(|s| s.instagram.is_some()));

        let json = r#"{"id": "a", "slug": "a", "title": "A", "type": "pages",
            "metadata": {"nav_order": "first"}}"#;
        assert!(serde_json::from_str::<Record>(json).is_err());
    }

    #[test]
    fn test_unexpected_kind() {
        let json = r#"{"id": "a", "slug": "about", "title": "About", "type": "pages",
            "metadata": {"content": "<p>hi</p>"}}"#;
        let record: Record = serde_json::from_str(json).expect("failed to decode");
        match LocationRecord::from_record(record) {
            Err(Error::UnexpectedKind { expected, actual }) => {
                assert_eq!(expected, RecordKind::YouthHouse);
                assert_eq!(actual, RecordKind::Page);
            }
            other => panic!("unexpected result {other:?}"),
        }
    }

    #[test]
    fn test_unknown_type_is_rejected() {
        let json = r#"{"id": "a", "slug": "b", "title": "c", "type": "authors", "metadata": {}}"#;
        assert!(serde_json::from_str::<Record>(json).is_err());
    }

    #[test]
    fn test_kind_strings() {
        assert_eq!(RecordKind::YouthHouse.to_string(), "youth-houses");
        assert_eq!(RecordKind::SiteSettings.as_ref(), "site-settings");
        assert_eq!(
            RecordKind::from_str("projects").expect("failed to parse"),
            RecordKind::Project
        );
    }

    #[test]
    fn test_image_sizing() {
        let img = ImageRef {
            url: "https://cdn.example.com/a.jpg".into(),
            imgix_url: "https://imgix.example.com/a.jpg".into(),
        };
        assert_eq!(
            img.sized(600, 400),
            "https://imgix.example.com/a.jpg?w=600&h=400&fit=crop&auto=format,compress"
        );
        let img = ImageRef {
            url: "https://cdn.example.com/a.jpg".into(),
            imgix_url: String::new(),
        };
        assert_eq!(img.sized(600, 400), "https://cdn.example.com/a.jpg");
    }
}
