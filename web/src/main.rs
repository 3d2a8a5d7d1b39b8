use anyhow::{Context, Result};
use axum::{
    Router,
    extract::{OriginalUri, State},
    middleware,
    response::{IntoResponse, Json, Redirect, Response},
    routing::get,
};
use axum_template::engine::Engine;
use clap::Parser;
use config::EnvConfig;
use error::Error;
use minijinja::{Environment, context};
use state::{AppState, SharedState, TemplateEngine};
use std::{
    path::{Path, PathBuf},
    sync::Arc,
};
use tower_http::{services::ServeDir, trace::TraceLayer};
use tracing::{debug, info, warn};
use tracing_subscriber::filter::EnvFilter;

mod api;
mod config;
mod error;
mod html;
mod map;
mod state;
mod util;

const API_PREFIX: &str = "/api/v1";

#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// The configuration file (defaults to `config.yaml` in the user's config directory)
    #[arg(short, long)]
    pub config: Option<PathBuf>,
    /// Which environment of the configuration file to use
    #[arg(short, long, default_value = "prod")]
    pub env: String,
    /// The directory holding the `templates` and `static` directories
    #[arg(short, long, default_value = ".")]
    pub datadir: PathBuf,
    /// Listen on this host instead of the configured one
    #[arg(long)]
    pub host: Option<String>,
    /// Listen on this port instead of the configured one
    #[arg(short, long)]
    pub port: Option<u16>,
}

fn default_config_path() -> PathBuf {
    directories::ProjectDirs::from("be", "entree", "entreeweb")
        .map(|dirs| dirs.config_dir().join("config.yaml"))
        .unwrap_or_else(|| PathBuf::from("config.yaml"))
}

pub(crate) fn template_engine(envname: &str, path: impl AsRef<Path>) -> TemplateEngine {
    let mut jinja = Environment::new();
    jinja.set_loader(minijinja::path_loader(path.as_ref().to_path_buf()));
    if envname == "dev" {
        jinja.set_debug(true);
    }
    jinja.add_filter("truncate", util::truncate_text);
    jinja.add_filter("imgix", util::imgix);
    jinja.add_filter("lines", util::lines);
    jinja.add_filter("hours", util::hours);
    jinja.add_filter("datefmt", util::format_date);
    jinja.add_filter("weburl", util::web_url);
    jinja.add_function("current_year", util::current_year);
    jinja.add_global("site_name", html::SITE_NAME);
    Engine::from(jinja)
}

pub(crate) fn app(state: AppState) -> Router {
    Router::new()
        .route("/favicon.ico", get(favicon_redirect))
        .nest_service("/static", ServeDir::new(state.datadir.join("static")))
        .nest(API_PREFIX, api::router())
        .merge(html::router())
        .fallback(not_found)
        .layer(middleware::map_response_with_state(
            state.clone(),
            error_response_mapper,
        ))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_env("ENTREEWEB_LOG"))
        .init();
    let args = Cli::parse();
    let config_path = args.config.clone().unwrap_or_else(default_config_path);
    debug!(
        "using environment '{}' from config file '{}'",
        args.env,
        config_path.display()
    );
    let mut env = EnvConfig::load(&config_path, &args.env)?;
    if let Some(host) = args.host {
        env.listen.host = host;
    }
    if let Some(port) = args.port {
        env.listen.port = port;
    }
    let listen = env.listen.clone();

    let shared_state = Arc::new(SharedState::new(&args.env, env, args.datadir)?);
    let app = app(shared_state);

    let listener = tokio::net::TcpListener::bind((listen.host.as_str(), listen.port))
        .await
        .with_context(|| format!("Unable to listen on {}:{}", listen.host, listen.port))?;
    info!("Listening on http://{}", listener.local_addr()?);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Unable to listen for ctrl-c: {e}");
            std::future::pending::<()>().await;
        }
    };
    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!("Unable to listen for SIGTERM: {e}");
                std::future::pending::<()>().await;
            }
        }
    };
    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    info!("Shutting down");
}

async fn favicon_redirect() -> impl IntoResponse {
    Redirect::permanent("/static/favicon.svg")
}

async fn not_found(OriginalUri(uri): OriginalUri) -> Error {
    Error::NotFound(format!("Nothing found at '{}'", uri.path()))
}

/// Turns the errors stored in a response by [Error::into_response] into an
/// error page, or a json body for API requests
async fn error_response_mapper(
    State(state): State<AppState>,
    OriginalUri(uri): OriginalUri,
    response: Response,
) -> Response {
    let Some(err) = response.extensions().get::<Arc<Error>>().cloned() else {
        return response;
    };
    let (status, message) = err.to_client_status();
    debug!(%status, path = uri.path(), "mapping error response: {err}");
    if uri.path().starts_with(API_PREFIX) {
        return (status, Json(api::ErrorBody::new(&err))).into_response();
    }
    (
        status,
        state.render_template(
            "error.html.j2",
            context!(
                meta => html::PageMeta::error(status),
                status => status.as_u16(),
                message => message,
            ),
        ),
    )
        .into_response()
}

#[cfg(test)]
pub(crate) fn test_app(
    source: Arc<dyn libentree::source::RecordSource>,
    map_token: Option<&str>,
) -> (Router, AppState) {
    let state = Arc::new(SharedState::test(source, map_token));
    (app(state.clone()), state)
}
