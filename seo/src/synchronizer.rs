//! Client-side metadata synchronization.
//!
//! Every client-side navigation fetches the override for the new path and writes
//! the merged metadata into the live document. The renderer may reset the head
//! while it hydrates the new page, so a resolved override is written again after
//! each configured delay.
//!
//! Navigations race each other: a slow lookup for an earlier page can complete
//! after the lookup for the current one. Each navigation gets a token from a
//! monotonic counter and every write, including delayed ones, first checks under
//! the document lock that its token is still the latest. Stale work is never
//! cancelled; it completes and writes nothing.

use crate::client::SeoFetch;
use crate::config::{Config, ValidationError};
use crate::document::{DocumentHead, apply_metadata};
use crate::metadata::{Metadata, merge};
use crate::metrics_defs::{SYNC_APPLIED, SYNC_DISCARDED};
use crate::query::SeoQuery;
use parking_lot::Mutex;
use shared::counter;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tenant::VendorContext;
use tokio::runtime::Handle;

/// Identifies one navigation. Later navigations have greater tokens.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NavigationToken(u64);

impl NavigationToken {
    pub fn value(&self) -> u64 {
        self.0
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SyncState {
    /// No navigation has happened yet.
    Idle,
    /// The override for the navigation is being fetched.
    Resolving(NavigationToken),
    /// The navigation's metadata has been written to the document.
    Applied(NavigationToken),
    /// A newer navigation took over; this one will not write again.
    Superseded(NavigationToken),
}

#[derive(Clone, Copy, Debug)]
enum WritePhase {
    Initial,
    Reapply,
}

impl WritePhase {
    fn as_str(&self) -> &'static str {
        match self {
            WritePhase::Initial => "initial",
            WritePhase::Reapply => "reapply",
        }
    }
}

/// Keeps a document's metadata in sync with the current path.
///
/// Fetches and re-application timers run on the runtime passed at construction,
/// so navigations may be reported from threads outside of it.
pub struct MetadataSynchronizer<F, D> {
    inner: Arc<Inner<F, D>>,
}

impl<F, D> Clone for MetadataSynchronizer<F, D> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

struct Inner<F, D> {
    runtime: Handle,
    fetcher: F,
    document: Arc<Mutex<D>>,
    defaults: Metadata,
    reapply_delays: Vec<Duration>,
    // Token of the latest navigation, 0 before the first one
    current: AtomicU64,
    // Token of the latest navigation whose metadata reached the document
    applied: AtomicU64,
}

impl<F, D> MetadataSynchronizer<F, D>
where
    F: SeoFetch + 'static,
    D: DocumentHead + Send + 'static,
{
    pub fn new(
        runtime: Handle,
        fetcher: F,
        document: Arc<Mutex<D>>,
        defaults: Metadata,
        reapply_delays: Vec<Duration>,
    ) -> Self {
        MetadataSynchronizer {
            inner: Arc::new(Inner {
                runtime,
                fetcher,
                document,
                defaults,
                reapply_delays,
                current: AtomicU64::new(0),
                applied: AtomicU64::new(0),
            }),
        }
    }

    /// Uses the configured defaults and re-application delays.
    pub fn from_config(
        runtime: Handle,
        fetcher: F,
        document: Arc<Mutex<D>>,
        config: &Config,
    ) -> Result<Self, ValidationError> {
        config.validate()?;
        Ok(Self::new(
            runtime,
            fetcher,
            document,
            config.defaults.clone(),
            config.reapply_delays(),
        ))
    }

    /// Handle to the synchronized document, shared with the renderer.
    pub fn document(&self) -> Arc<Mutex<D>> {
        self.inner.document.clone()
    }

    /// Starts synchronizing metadata for a new path.
    ///
    /// Any earlier navigation is superseded immediately; its pending work will
    /// not touch the document.
    pub fn navigate(&self, path: &str) -> NavigationToken {
        let token = NavigationToken(self.inner.current.fetch_add(1, Ordering::SeqCst) + 1);
        let context = VendorContext::resolve(path);
        let query = SeoQuery::for_context(&context);

        tracing::debug!(
            token = token.value(),
            tenant = %context.tenant(),
            path = %query.path,
            "Navigation started"
        );

        let inner = self.inner.clone();
        self.inner
            .runtime
            .spawn(async move { inner.resolve(token, query).await });

        token
    }

    pub fn current_token(&self) -> Option<NavigationToken> {
        match self.inner.current.load(Ordering::SeqCst) {
            0 => None,
            token => Some(NavigationToken(token)),
        }
    }

    /// State of the latest navigation.
    pub fn state(&self) -> SyncState {
        let current = self.inner.current.load(Ordering::SeqCst);
        if current == 0 {
            return SyncState::Idle;
        }

        if self.inner.applied.load(Ordering::SeqCst) == current {
            SyncState::Applied(NavigationToken(current))
        } else {
            SyncState::Resolving(NavigationToken(current))
        }
    }

    /// State of a given navigation.
    pub fn state_of(&self, token: NavigationToken) -> SyncState {
        match self.state() {
            SyncState::Resolving(current) | SyncState::Applied(current) if token < current => {
                SyncState::Superseded(token)
            }
            state => state,
        }
    }
}

impl<F, D> Inner<F, D>
where
    F: SeoFetch + 'static,
    D: DocumentHead + Send + 'static,
{
    fn is_current(&self, token: NavigationToken) -> bool {
        self.current.load(Ordering::SeqCst) == token.0
    }

    async fn resolve(self: Arc<Self>, token: NavigationToken, query: SeoQuery) {
        let seo_override = self.fetcher.fetch(&query).await;

        if !self.is_current(token) {
            counter!(SYNC_DISCARDED, "phase" => WritePhase::Initial.as_str()).increment(1);
            tracing::debug!(token = token.value(), path = %query.path, "Discarding stale SEO override");
            return;
        }

        let metadata = merge(&self.defaults, seo_override.as_ref());
        if !self.write_if_current(token, &metadata, WritePhase::Initial) {
            return;
        }
        self.applied.fetch_max(token.0, Ordering::SeqCst);

        // Without an override the renderer's own defaults are already correct
        if seo_override.is_none() {
            return;
        }

        let metadata = Arc::new(metadata);
        for delay in &self.reapply_delays {
            let inner = self.clone();
            let metadata = metadata.clone();
            let delay = *delay;

            // Timers are never cancelled; a superseded token turns them into no-ops
            self.runtime.spawn(async move {
                tokio::time::sleep(delay).await;
                inner.write_if_current(token, &metadata, WritePhase::Reapply);
            });
        }
    }

    fn write_if_current(&self, token: NavigationToken, metadata: &Metadata, phase: WritePhase) -> bool {
        let mut document = self.document.lock();

        if !self.is_current(token) {
            counter!(SYNC_DISCARDED, "phase" => phase.as_str()).increment(1);
            return false;
        }

        apply_metadata(&mut *document, metadata);
        counter!(SYNC_APPLIED, "phase" => phase.as_str()).increment(1);
        tracing::trace!(token = token.value(), phase = phase.as_str(), "Applied metadata");
        true
    }
}
