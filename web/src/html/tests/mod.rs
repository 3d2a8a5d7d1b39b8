use crate::test_app;
use async_trait::async_trait;
use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use http_body_util::BodyExt;
use libentree::{
    record::{
        CmsObject, ImageRef, LocationMetadata, LocationRecord, PageMetadata, ProjectMetadata,
        Record, RecordKind, SelectValue, SiteSettingsMetadata, SocialMedia,
    },
    source::{Filter, MemorySource, RecordSource},
};
use std::sync::Arc;
use tower::Service;


pub(crate) const MAP_TOKEN: &str = "pk.eyJ1IjoiZW50cmVlIn0";

/// A short description one character over what a project card shows
const LONG_DESCRIPTION: &str = "Young people from three youth houses debate the future of their neighbourhoods and then present their ideas to the mayor.";

pub(crate) fn house(slug: &str, name: &str, lat: Option<&str>, lng: Option<&str>) -> LocationRecord {
    CmsObject {
        id: format!("id-{slug}"),
        slug: slug.to_string(),
        title: name.to_string(),
        metadata: LocationMetadata {
            name: Some(name.to_string()),
            latitude: lat.map(String::from),
            longitude: lng.map(String::from),
            ..Default::default()
        },
    }
}

fn image(n: usize) -> ImageRef {
    ImageRef {
        url: format!("https://cdn.example.com/img-{n}.jpg"),
        imgix_url: format!("https://imgix.example.com/img-{n}.jpg"),
    }
}

/// A small but complete site: three youth houses (one without coordinates),
/// two projects (one featured), two pages and the site settings
pub(crate) fn fixture_source() -> MemorySource {
    let mut source = MemorySource::default();

    let mut anderlecht = house(
        "jh-anderlecht",
        "Jeugdhuis Anderlecht",
        Some("50.8366"),
        Some("4.3086"),
    );
    anderlecht.metadata = LocationMetadata {
        address: Some("Rue Wayez 1\n1070 Anderlecht".into()),
        description: Some("<p>A <strong>lively</strong> youth house near the canal.</p>".into()),
        activities: Some("• Music workshops\n• Homework club\n\n".into()),
        opening_hours: Some("Monday: 14:00 - 18:00\nSaturday: closed".into()),
        phone: Some("+32 2 555 12 34".into()),
        email: Some("hello@jh-anderlecht.be".into()),
        website: Some("https://jh-anderlecht.be".into()),
        neighborhood: Some("Anderlecht".into()),
        age_range: Some("12-25".into()),
        featured_image: Some(image(0)),
        gallery: (1..=8).map(image).collect(),
        ..anderlecht.metadata
    };
    source.push(anderlecht);
    source.push(house(
        "jh-ixelles",
        "Maison de Jeunes Ixelles",
        Some("50.8333"),
        Some("4.3667"),
    ));
    source.push(house("jh-nowhere", "Jeugdhuis Nergens", Some("50.85"), None));

    source.push(CmsObject {
        id: "id-music-lab".into(),
        slug: "music-lab".into(),
        title: "Music Lab".into(),
        metadata: ProjectMetadata {
            short_description: Some("Young musicians record their first album together.".into()),
            full_description: Some("<p>Recording sessions every week.</p>".into()),
            status: Some(SelectValue {
                key: "active".into(),
                value: "Active".into(),
            }),
            category: Some(SelectValue {
                key: "arts".into(),
                value: "Arts".into(),
            }),
            start_date: Some("2024-03-01".into()),
            youth_houses_involved: vec![house("jh-ixelles", "Maison de Jeunes Ixelles", None, None)],
            featured_homepage: true,
            ..Default::default()
        },
    });
    source.push(CmsObject {
        id: "id-street-art".into(),
        slug: "street-art".into(),
        title: "Street Art Tour".into(),
        metadata: ProjectMetadata::default(),
    });
    source.push(CmsObject {
        id: "id-parliament".into(),
        slug: "youth-parliament".into(),
        title: "Youth Parliament".into(),
        metadata: ProjectMetadata {
            short_description: Some(LONG_DESCRIPTION.to_string()),
            youth_houses_involved: vec![
                house("jh-anderlecht", "Jeugdhuis Anderlecht", None, None),
                house("jh-ixelles", "Maison de Jeunes Ixelles", None, None),
                house("jh-nowhere", "Jeugdhuis Nergens", None, None),
            ],
            ..Default::default()
        },
    });

    source.push(CmsObject {
        id: "id-about".into(),
        slug: "about-entree".into(),
        title: "About".into(),
        metadata: PageMetadata {
            title: Some("About Entree".into()),
            content: Some("<p>Entree connects the youth houses of Brussels.</p>".into()),
            seo_description: Some("Who we are".into()),
            ..Default::default()
        },
    });
    source.push(CmsObject {
        id: "id-contact".into(),
        slug: "contact".into(),
        title: "Contact".into(),
        metadata: PageMetadata::default(),
    });

    source.push(CmsObject {
        id: "id-settings".into(),
        slug: "site-settings".into(),
        title: "Site Settings".into(),
        metadata: SiteSettingsMetadata {
            hero_title: Some("Find your youth house".into()),
            contact_email: Some("info@entree.brussels".into()),
            social_media: Some(SocialMedia {
                instagram: Some("https://instagram.com/entree".into()),
                ..Default::default()
            }),
            map_center_lat: Some("50.84".into()),
            map_center_lng: Some("4.35".into()),
            ..Default::default()
        },
    });
    source
}

/// A CMS that can't be reached
pub(crate) struct FailingSource;

fn fetch_error(what: impl ToString) -> libentree::Error {
    libentree::Error::Fetch {
        what: what.to_string(),
        source: "connection refused".into(),
    }
}

#[async_trait]
impl RecordSource for FailingSource {
    async fn find(&self, kind: RecordKind, _filter: &Filter) -> libentree::Result<Vec<Record>> {
        Err(fetch_error(kind))
    }

    async fn find_one(
        &self,
        kind: RecordKind,
        _slug: Option<&str>,
    ) -> libentree::Result<Option<Record>> {
        Err(fetch_error(kind))
    }
}

pub(crate) fn fixture_app(map_token: Option<&str>) -> Router {
    test_app(Arc::new(fixture_source()), map_token).0
}

pub(crate) fn failing_app() -> Router {
    test_app(Arc::new(FailingSource), Some(MAP_TOKEN)).0
}

/// Send a GET request and return the status and the body
pub(crate) async fn get(app: &mut Router, uri: &str) -> (StatusCode, String) {
    let req = Request::builder()
        .uri(uri)
        .method("GET")
        .body(Body::empty())
        .expect("Failed to build request");
    let response = app
        .as_service()
        .call(req)
        .await
        .expect("Failed to execute request");
    let status = response.status();
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("Failed to read body")
        .to_bytes();
    (status, String::from_utf8_lossy(&bytes).to_string())
}

#[test_log::test(tokio::test)]
async fn test_unknown_path() {
    let mut app = fixture_app(Some(MAP_TOKEN));
    let (status, body) = get(&mut app, "/no/such/thing").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body.contains("Page Not Found"));
}

#[test_log::test(tokio::test)]
async fn test_layout() {
    let mut app = fixture_app(Some(MAP_TOKEN));
    let (status, body) = get(&mut app, "/projects").await;
    assert_eq!(status, StatusCode::OK);
    // navigation
    for label in ["Home", "Projects", "About", "Contact"] {
        assert!(body.contains(label), "navigation is missing {label}");
    }
    // footer with the site settings
    assert!(body.contains("info@entree.brussels"));
    assert!(body.contains("instagram.com"));
    assert!(body.contains(&crate::util::current_year().to_string()));

    // without site settings the footer still renders
    let mut app = test_app(Arc::new(MemorySource::default()), None).0;
    let (status, body) = get(&mut app, "/projects").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("Entree Brussels. All rights reserved."));
    assert!(!body.contains("info@entree.brussels"));
}
