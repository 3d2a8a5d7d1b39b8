//! A [RecordSource] backed by the Cosmic headless CMS REST API
use crate::{
    error::{Error, Result},
    record::{Record, RecordKind},
    source::{Filter, RecordSource},
};
use async_trait::async_trait;
use reqwest::StatusCode;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde_json::{Map, Value};
use std::time::Duration;
use tracing::{debug, warn};

/// The public Cosmic API endpoint
pub const DEFAULT_API_URL: &str = "https://api.cosmicjs.com/v3";

/// The object properties requested for every query. `type` is needed to
/// decode the record into the right variant.
const PROPS: &str = "id,title,slug,type,metadata";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Deserialize)]
struct ObjectsResponse {
    #[serde(default)]
    objects: Vec<Record>,
}

/// Client for the objects endpoint of a single Cosmic bucket
#[derive(Debug)]
pub struct CosmicClient {
    http: reqwest::Client,
    base_url: String,
    bucket_slug: String,
    read_key: SecretString,
}

impl CosmicClient {
    pub fn new(base_url: &str, bucket_slug: &str, read_key: SecretString) -> Result<Self> {
        if bucket_slug.is_empty() {
            return Err(Error::Config("no CMS bucket slug configured".to_string()));
        }
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| Error::Config(format!("unable to build http client: {e}")))?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            bucket_slug: bucket_slug.to_string(),
            read_key,
        })
    }

    fn objects_url(&self) -> String {
        format!("{}/buckets/{}/objects", self.base_url, self.bucket_slug)
    }

    fn build_query(kind: RecordKind, slug: Option<&str>, filter: &Filter) -> Value {
        let mut query = Map::new();
        query.insert("type".to_string(), Value::from(kind.as_ref()));
        if let Some(slug) = slug {
            query.insert("slug".to_string(), Value::from(slug));
        }
        for (path, value) in &filter.fields {
            query.insert(path.clone(), value.clone());
        }
        Value::Object(query)
    }

    /// Run a query against the objects endpoint. A 404 from the API means that
    /// nothing matched and is returned as an empty list.
    async fn query(
        &self,
        what: &str,
        query: Value,
        limit: Option<u32>,
    ) -> Result<Vec<Record>> {
        let mut params = vec![
            ("query", query.to_string()),
            ("props", PROPS.to_string()),
            ("depth", "1".to_string()),
            ("read_key", self.read_key.expose_secret().to_string()),
        ];
        if let Some(limit) = limit {
            params.push(("limit", limit.to_string()));
        }
        debug!(%query, ?limit, "querying CMS for {what}");
        let response = self
            .http
            .get(self.objects_url())
            .query(&params)
            .send()
            .await
            .map_err(|e| Error::fetch(what, e))?;

        if response.status() == StatusCode::NOT_FOUND {
            debug!("CMS found no {what}");
            return Ok(Vec::new());
        }
        let response = response.error_for_status().map_err(|e| {
            warn!(status = ?e.status(), "CMS request for {what} failed");
            Error::fetch(what, e)
        })?;
        let body: ObjectsResponse = response
            .json()
            .await
            .map_err(|e| Error::fetch(what, e))?;
        Ok(body.objects)
    }
}

#[async_trait]
impl RecordSource for CosmicClient {
    async fn find(&self, kind: RecordKind, filter: &Filter) -> Result<Vec<Record>> {
        self.query(kind.as_ref(), Self::build_query(kind, None, filter), None)
            .await
    }

    async fn find_one(&self, kind: RecordKind, slug: Option<&str>) -> Result<Option<Record>> {
        let what = match slug {
            Some(slug) => format!("{kind} '{slug}'"),
            None => kind.to_string(),
        };
        Ok(self
            .query(&what, Self::build_query(kind, slug, &Filter::new()), Some(1))
            .await?
            .into_iter()
            .next())
    }
}
