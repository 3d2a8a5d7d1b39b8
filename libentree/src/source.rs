//! Access to the records stored in the CMS
use crate::{
    error::Result,
    record::{
        LocationRecord, PageRecord, ProjectRecord, Record, RecordKind, SiteSettingsRecord,
        TypedRecord,
    },
};
use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, trace};

/// A type for narrowing down a query for records of a given kind
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter {
    /// Pairs of (field path, expected value), e.g. `("metadata.featured_homepage", true)`
    pub fields: Vec<(String, Value)>,
}

impl Filter {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn field(mut self, path: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.push((path.into(), value.into()));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Something that can look up records by kind. Not finding anything is a
/// normal outcome (an empty list, or `None`); only transport or backend
/// failures are errors.
#[async_trait]
pub trait RecordSource: Send + Sync {
    /// Fetch all records of the given kind that match `filter`
    async fn find(&self, kind: RecordKind, filter: &Filter) -> Result<Vec<Record>>;

    /// Fetch a single record of the given kind. When `slug` is `None`, the
    /// first record of that kind is returned (used for singletons such as the
    /// site settings).
    async fn find_one(&self, kind: RecordKind, slug: Option<&str>) -> Result<Option<Record>>;
}

async fn fetch_all<T: TypedRecord>(source: &dyn RecordSource, filter: &Filter) -> Result<Vec<T>> {
    trace!(kind = %T::KIND, ?filter, "fetching records");
    let records = source.find(T::KIND, filter).await?;
    debug!(kind = %T::KIND, count = records.len(), "fetched records");
    records.into_iter().map(T::from_record).collect()
}

async fn fetch_one<T: TypedRecord>(source: &dyn RecordSource, slug: Option<&str>) -> Result<Option<T>> {
    trace!(kind = %T::KIND, ?slug, "fetching record");
    source
        .find_one(T::KIND, slug)
        .await?
        .map(T::from_record)
        .transpose()
}

pub async fn youth_houses(source: &dyn RecordSource) -> Result<Vec<LocationRecord>> {
    fetch_all(source, &Filter::new()).await
}

pub async fn youth_house_by_slug(
    source: &dyn RecordSource,
    slug: &str,
) -> Result<Option<LocationRecord>> {
    fetch_one(source, Some(slug)).await
}

pub async fn projects(source: &dyn RecordSource) -> Result<Vec<ProjectRecord>> {
    fetch_all(source, &Filter::new()).await
}

/// Projects that editors flagged for display on the home page
pub async fn featured_projects(source: &dyn RecordSource) -> Result<Vec<ProjectRecord>> {
    fetch_all(
        source,
        &Filter::new().field("metadata.featured_homepage", true),
    )
    .await
}

pub async fn project_by_slug(
    source: &dyn RecordSource,
    slug: &str,
) -> Result<Option<ProjectRecord>> {
    fetch_one(source, Some(slug)).await
}

pub async fn pages(source: &dyn RecordSource) -> Result<Vec<PageRecord>> {
    fetch_all(source, &Filter::new()).await
}

pub async fn page_by_slug(source: &dyn RecordSource, slug: &str) -> Result<Option<PageRecord>> {
    fetch_one(source, Some(slug)).await
}

pub async fn site_settings(source: &dyn RecordSource) -> Result<Option<SiteSettingsRecord>> {
    fetch_one(source, None).await
}

/// A [RecordSource] that serves a fixed set of records from memory. Filters
/// are matched against the JSON form of each record.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    records: Vec<Record>,
}

impl MemorySource {
    pub fn new(records: Vec<Record>) -> Self {
        Self { records }
    }

    pub fn push(&mut self, record: impl Into<Record>) {
        self.records.push(record.into());
    }

    fn matches(record: &Record, filter: &Filter) -> bool {
        if filter.is_empty() {
            return true;
        }
        let Ok(json) = serde_json::to_value(record) else {
            return false;
        };
        filter.fields.iter().all(|(path, expected)| {
            path.split('.')
                .try_fold(&json, |v, key| v.get(key))
                .is_some_and(|v| v == expected)
        })
    }
}

#[async_trait]
impl RecordSource for MemorySource {
    async fn find(&self, kind: RecordKind, filter: &Filter) -> Result<Vec<Record>> {
        Ok(self
            .records
            .iter()
            .filter(|r| r.kind() == kind && Self::matches(r, filter))
            .cloned()
            .collect())
    }

    async fn find_one(&self, kind: RecordKind, slug: Option<&str>) -> Result<Option<Record>> {
        Ok(self
            .records
            .iter()
            .find(|r| r.kind() == kind && slug.is_none_or(|s| r.slug() == s))
            .cloned())
    }
}
