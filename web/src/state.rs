use crate::{EnvConfig, map::ScriptMapLibrary, template_engine};
use anyhow::{Context, Result};
use axum_template::{RenderHtml, engine::Engine};
use libentree::{
    cosmic::CosmicClient,
    map::MapCredential,
    record::SiteSettingsRecord,
    source::{self, RecordSource},
};
use serde::Serialize;
use std::{path::PathBuf, sync::Arc};
use tracing::{debug, trace, warn};

pub(crate) type TemplateEngine = Engine<minijinja::Environment<'static>>;

pub(crate) struct SharedState {
    pub(crate) source: Arc<dyn RecordSource>,
    pub(crate) tmpl: TemplateEngine,
    pub(crate) config: EnvConfig,
    pub(crate) map_library: ScriptMapLibrary,
    pub(crate) map_credential: MapCredential,
    pub(crate) datadir: PathBuf,
}

impl SharedState {
    pub(crate) fn new(envname: &str, env: EnvConfig, datadir: PathBuf) -> Result<Self> {
        let tmpl_path = datadir.join("templates");
        let template = template_engine(envname, &tmpl_path);
        trace!("Creating shared app state");
        debug!(api_url = %env.cms.api_url, bucket = %env.cms.bucket_slug, "Using CMS bucket");
        let client = CosmicClient::new(
            &env.cms.api_url,
            &env.cms.bucket_slug,
            env.cms.read_key.clone(),
        )
        .with_context(|| "Unable to set up the CMS client")?;
        Ok(Self::with_source(Arc::new(client), template, env, datadir))
    }

    pub(crate) fn with_source(
        source: Arc<dyn RecordSource>,
        tmpl: TemplateEngine,
        config: EnvConfig,
        datadir: PathBuf,
    ) -> Self {
        Self {
            source,
            map_library: ScriptMapLibrary::new(tmpl.clone()),
            map_credential: config.map.credential(),
            tmpl,
            config,
            datadir,
        }
    }

    pub(crate) fn render_template<S: Serialize>(
        &self,
        key: impl Into<String>,
        data: S,
    ) -> RenderHtml<String, TemplateEngine, S> {
        RenderHtml(key.into(), self.tmpl.clone(), data)
    }

    /// The site settings, if they can be loaded. Pages fall back to defaults
    /// without them, so a failure is only logged.
    pub(crate) async fn site_settings(&self) -> Option<SiteSettingsRecord> {
        source::site_settings(self.source.as_ref())
            .await
            .unwrap_or_else(|e| {
                warn!("Unable to load site settings: {e}");
                None
            })
    }

    #[cfg(test)]
    pub(crate) fn test(source: Arc<dyn RecordSource>, map_token: Option<&str>) -> Self {
        use crate::config::{CmsConfig, ListenConfig, MapConfig};
        let template = template_engine("test", "./templates");
        debug!("Creating test shared app state");
        let config = EnvConfig {
            listen: ListenConfig {
                host: "127.0.0.1".to_string(),
                port: 8080,
            },
            cms: CmsConfig {
                api_url: "http://127.0.0.1:9".to_string(),
                bucket_slug: "entree-test".to_string(),
                read_key_file: String::new(),
                read_key: Default::default(),
            },
            map: MapConfig {
                access_token: map_token.map(|t| t.to_string().into()),
                ..Default::default()
            },
        };
        Self::with_source(source, template, config, ".".into())
    }
}

pub(crate) type AppState = Arc<SharedState>;
