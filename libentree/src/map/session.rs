use super::{
    MapCredential, MapViewConfig,
    marker::{MarkerSpec, build_popup_content, validate_coordinates},
};
use crate::{
    error::{Error, Result},
    record::LocationRecord,
};
use async_trait::async_trait;
use secrecy::SecretString;
use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};
use tracing::{debug, trace, warn};

/// A live map view provided by the map library
pub trait MapView {
    /// The library's identifier for a marker added to this view
    type MarkerId;

    fn add_marker(&mut self, marker: &MarkerSpec) -> Result<Self::MarkerId>;
    fn remove_marker(&mut self, id: Self::MarkerId);
    fn recenter(&mut self, config: &MapViewConfig);
    /// Release everything the view holds. No other method is called afterwards.
    fn destroy(&mut self);
}

/// The map library itself: creates views. Initialization loads assets and may
/// fail, e.g. when the credential is rejected.
#[async_trait]
pub trait MapLibrary: Send + Sync {
    type View: MapView + Send;

    async fn initialize(
        &self,
        credential: &SecretString,
        config: &MapViewConfig,
    ) -> Result<Self::View>;
}

/// Ties one youth house to one marker of a view. Only the [MapSession] that
/// created it can release it.
#[derive(Debug)]
pub struct MarkerHandle<Id> {
    slug: String,
    id: Id,
}

impl<Id> MarkerHandle<Id> {
    pub fn slug(&self) -> &str {
        &self.slug
    }
}

/// Remove all markers in `owned` from `view`, then add a marker for every
/// record with usable coordinates, in input order. Records without usable
/// coordinates are left off the map. Returns the number of markers added.
pub fn rebuild_markers<V: MapView>(
    records: &[LocationRecord],
    view: &mut V,
    owned: &mut Vec<MarkerHandle<V::MarkerId>>,
) -> usize {
    for handle in owned.drain(..) {
        view.remove_marker(handle.id);
    }
    for record in records {
        let point = match validate_coordinates(record) {
            Ok(point) => point,
            Err(reason) => {
                warn!(slug = %record.slug, %reason, "leaving youth house off the map");
                continue;
            }
        };
        let spec = MarkerSpec {
            slug: record.slug.clone(),
            point,
            popup: build_popup_content(record),
        };
        match view.add_marker(&spec) {
            Ok(id) => owned.push(MarkerHandle {
                slug: spec.slug,
                id,
            }),
            Err(e) => warn!(slug = %record.slug, "failed to add marker: {e}"),
        }
    }
    trace!(count = owned.len(), "rebuilt markers");
    owned.len()
}

/// The observable state of a [MapSession]
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
pub enum MapState {
    Uninitialized,
    Loading,
    Ready,
    /// Initialization was refused or failed. Stays this way until the session
    /// is closed and mounted again.
    Unavailable,
}

enum Stage<V> {
    Uninitialized,
    Loading,
    Ready(V),
    Unavailable(String),
}

/// Proof that a session was mounted. Hand it back to [MapSession::complete]
/// together with the result of the library initialization.
#[derive(Debug)]
pub struct InitTicket {
    cancelled: Arc<AtomicBool>,
}

impl InitTicket {
    /// Whether the session that issued this ticket has been closed since
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }
}

/// Owns one map view and the markers on it.
///
/// The session moves from `Uninitialized` to `Loading` on [mount](Self::mount)
/// and from there to `Ready` or `Unavailable` on [complete](Self::complete).
/// [close](Self::close) releases the markers and the view from any state and
/// also runs on drop, so nothing outlives the session. A completion that
/// arrives after `close` is discarded.
pub struct MapSession<V: MapView> {
    records: Arc<[LocationRecord]>,
    config: MapViewConfig,
    stage: Stage<V>,
    markers: Vec<MarkerHandle<V::MarkerId>>,
    cancelled: Arc<AtomicBool>,
}

impl<V: MapView> MapSession<V> {
    pub fn new(records: Arc<[LocationRecord]>, config: MapViewConfig) -> Self {
        Self {
            records,
            config,
            stage: Stage::Uninitialized,
            markers: Vec::new(),
            cancelled: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Create a session, initialize the view and place the markers in one go.
    /// Fails with [Error::MapUnavailable] if there is no usable credential or
    /// the library could not be initialized.
    pub async fn open<L>(
        library: &L,
        credential: &MapCredential,
        records: Arc<[LocationRecord]>,
        config: MapViewConfig,
    ) -> Result<Self>
    where
        L: MapLibrary<View = V>,
    {
        let mut session = Self::new(records, config);
        let ticket = session.mount(credential)?;
        // mount only succeeds with a usable token
        let token = credential
            .usable()
            .ok_or_else(|| Error::MapUnavailable("no access token".to_string()))?;
        let result = library.initialize(token, &session.config).await;
        session.complete(ticket, result)?;
        Ok(session)
    }

    pub fn state(&self) -> MapState {
        match self.stage {
            Stage::Uninitialized => MapState::Uninitialized,
            Stage::Loading => MapState::Loading,
            Stage::Ready(_) => MapState::Ready,
            Stage::Unavailable(_) => MapState::Unavailable,
        }
    }

    /// Why the map is unavailable, if it is
    pub fn unavailable_reason(&self) -> Option<&str> {
        match &self.stage {
            Stage::Unavailable(reason) => Some(reason.as_str()),
            _ => None,
        }
    }

    pub fn config(&self) -> &MapViewConfig {
        &self.config
    }

    pub fn records(&self) -> &Arc<[LocationRecord]> {
        &self.records
    }

    pub fn markers(&self) -> &[MarkerHandle<V::MarkerId>] {
        &self.markers
    }

    /// The view, once it is ready
    pub fn view(&self) -> Option<&V> {
        match &self.stage {
            Stage::Ready(view) => Some(view),
            _ => None,
        }
    }

    /// Start initializing the map. Without a usable credential the session
    /// becomes `Unavailable` right away and no initialization is attempted.
    pub fn mount(&mut self, credential: &MapCredential) -> Result<InitTicket> {
        if !matches!(self.stage, Stage::Uninitialized) {
            debug!(state = %self.state(), "remounting map session");
            self.close();
        }
        self.cancelled = Arc::new(AtomicBool::new(false));
        if credential.usable().is_none() {
            let reason = "no map access token configured".to_string();
            debug!("{reason}");
            self.stage = Stage::Unavailable(reason.clone());
            return Err(Error::MapUnavailable(reason));
        }
        self.stage = Stage::Loading;
        Ok(InitTicket {
            cancelled: self.cancelled.clone(),
        })
    }

    /// Deliver the result of the library initialization started by
    /// [mount](Self::mount). A ticket from a session that has been closed
    /// since is ignored and the view it carries is destroyed.
    pub fn complete(&mut self, ticket: InitTicket, result: Result<V>) -> Result<()> {
        let stale = ticket.is_cancelled()
            || !Arc::ptr_eq(&ticket.cancelled, &self.cancelled)
            || !matches!(self.stage, Stage::Loading);
        if stale {
            debug!("discarding map initialization for a closed session");
            if let Ok(mut view) = result {
                view.destroy();
            }
            return Ok(());
        }
        match result {
            Ok(view) => {
                self.stage = Stage::Ready(view);
                let count = self.rebuild();
                debug!(count, "map ready");
                Ok(())
            }
            Err(e) => {
                warn!("map library failed to initialize: {e}");
                let reason = e.to_string();
                self.stage = Stage::Unavailable(reason.clone());
                Err(Error::MapUnavailable(reason))
            }
        }
    }

    /// Replace all markers with markers for the current records. Does nothing
    /// unless the view is ready.
    pub fn rebuild(&mut self) -> usize {
        match &mut self.stage {
            Stage::Ready(view) => rebuild_markers(&self.records, view, &mut self.markers),
            _ => 0,
        }
    }

    /// Swap in a new list of records. The markers are rebuilt only when the
    /// list is a different one than before.
    pub fn set_records(&mut self, records: Arc<[LocationRecord]>) {
        if Arc::ptr_eq(&self.records, &records) {
            trace!("record list unchanged");
            return;
        }
        self.records = records;
        self.rebuild();
    }

    /// Move the view. Markers are left as they are.
    pub fn set_config(&mut self, config: MapViewConfig) {
        if let Stage::Ready(view) = &mut self.stage {
            view.recenter(&config);
        }
        self.config = config;
    }

    /// Release all markers and the view, and cancel a pending initialization
    pub fn close(&mut self) {
        self.cancelled.store(true, Ordering::Release);
        match std::mem::replace(&mut self.stage, Stage::Uninitialized) {
            Stage::Ready(mut view) => {
                for handle in self.markers.drain(..) {
                    view.remove_marker(handle.id);
                }
                view.destroy();
                trace!("map view destroyed");
            }
            _ => self.markers.clear(),
        }
    }
}

impl<V: MapView> Drop for MapSession<V> {
    fn drop(&mut self) {
        self.close();
    }
}
