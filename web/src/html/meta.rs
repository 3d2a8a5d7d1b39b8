use axum::http::StatusCode;
use libentree::{
    record::{LocationRecord, PageRecord, ProjectRecord, SiteSettingsMetadata},
    text,
};
use serde::Serialize;

pub(crate) const SITE_NAME: &str = "Entree Brussels";
const DEFAULT_TITLE: &str = "Entree Brussels - Youth Houses Network";
const DEFAULT_DESCRIPTION: &str = "Discover and connect with youth houses across Brussels. Find activities, events, and communities near you.";
const DEFAULT_KEYWORDS: &str = "Brussels, youth houses, community, activities, young people, Entree";

/// Search engines show at most this much of a description
const DESCRIPTION_CHARS: usize = 160;

/// The `<title>` and `<meta>` values of a page
#[derive(Debug, Clone, PartialEq, Serialize)]
pub(crate) struct PageMeta {
    pub(crate) title: String,
    pub(crate) description: String,
    pub(crate) keywords: String,
}

impl Default for PageMeta {
    fn default() -> Self {
        Self {
            title: DEFAULT_TITLE.to_string(),
            description: DEFAULT_DESCRIPTION.to_string(),
            keywords: DEFAULT_KEYWORDS.to_string(),
        }
    }
}

impl PageMeta {
    /// The home page, as configured by the editors
    pub(crate) fn site(settings: Option<&SiteSettingsMetadata>) -> Self {
        let mut meta = Self::default();
        if let Some(settings) = settings {
            if let Some(title) = &settings.site_title {
                meta.title = title.clone();
            }
            if let Some(description) = &settings.site_description {
                meta.description = description.clone();
            }
        }
        meta
    }

    pub(crate) fn projects() -> Self {
        Self {
            title: format!("Projects | {DEFAULT_TITLE}"),
            description: "Explore community projects happening across Brussels youth houses. Join initiatives that bring young people together.".to_string(),
            keywords: "Brussels projects, youth projects, community initiatives, youth houses, collaboration".to_string(),
        }
    }

    pub(crate) fn project(project: &ProjectRecord) -> Self {
        let title = project.display_title();
        Self {
            title: format!("{title} | {SITE_NAME}"),
            description: project
                .metadata
                .short_description
                .as_deref()
                .map(|d| text::excerpt(d, DESCRIPTION_CHARS))
                .unwrap_or_else(|| {
                    format!("Learn about {title}, a community project of the Brussels youth houses.")
                }),
            keywords: format!("{SITE_NAME}, youth projects, Brussels, {title}"),
        }
    }

    pub(crate) fn youth_house(house: &LocationRecord) -> Self {
        let name = house.display_name();
        let neighborhood = house.metadata.neighborhood.as_deref();
        let description = house
            .metadata
            .description
            .as_deref()
            .map(|d| text::excerpt(d, DESCRIPTION_CHARS))
            .filter(|d| !d.is_empty())
            .unwrap_or_else(|| {
                format!(
                    "Discover {name}, a youth house in {}.",
                    neighborhood.unwrap_or("Brussels")
                )
            });
        let mut keywords = vec!["youth house", "Brussels"];
        keywords.extend(neighborhood);
        keywords.extend(["community", "activities", name]);
        Self {
            title: format!("{name} | {SITE_NAME}"),
            description,
            keywords: keywords.join(", "),
        }
    }

    pub(crate) fn page(page: &PageRecord) -> Self {
        let title = page.display_title();
        Self {
            title: format!("{title} | {SITE_NAME}"),
            description: page.metadata.seo_description.clone().unwrap_or_else(|| {
                format!("Learn more about {title} - {SITE_NAME} youth houses network.")
            }),
            keywords: format!("{SITE_NAME}, youth houses, Brussels, {title}"),
        }
    }

    pub(crate) fn error(status: StatusCode) -> Self {
        let (title, description) = if status == StatusCode::NOT_FOUND {
            ("Page Not Found", "The requested page could not be found.")
        } else {
            (
                "Something Went Wrong",
                "The page could not be loaded. Please try again later.",
            )
        };
        Self {
            title: format!("{title} | {SITE_NAME}"),
            description: description.to_string(),
            ..Default::default()
        }
    }
}
