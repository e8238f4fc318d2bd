// Ordered Server
//
// Push/pull coordination over versioned keys with weak ordering.
// An acknowledged push may later be found discarded: histories are
// bounded and nothing here is durable or replicated.

use std::fmt::Debug;
use std::hash::Hash;
use std::sync::Arc;
use tracing::info;

use crate::config::{ConfigError, ServerConfig};
use crate::group::{GroupError, ServiceGroup};
use crate::history::VersionedStore;

mod service;

pub use service::StoreService;

/// Calls served by the role that owns an ordered server.
pub trait OrderedService<K, V, T>: Send + Sync {
    /// Store `value` under `version` if `prev_version` matches the latest
    /// version of `key`. Returns `false` on a version conflict.
    fn push_service(&self, key: K, value: T, version: V, prev_version: Option<V>) -> bool;

    /// Fetch `(value, version)` for `version`, or for the latest version
    /// when `version` is `None`.
    fn pull_service(&self, key: &K, version: Option<&V>) -> Option<(T, V)>;
}

/// Trait object carried by a [`ServiceGroup`].
pub type DynOrderedService<K, V, T> = dyn OrderedService<K, V, T>;

/// Client contract of an ordered server.
///
/// Implementations need not provide strong consistency. A push that
/// returned `true` may be gone by the time it is pulled, either pruned
/// by later pushes or lost with the serving instance.
///
/// If `version == prev_version` no ordering is enforced and the push
/// always succeeds.
pub trait OrderedServer<K, V, T> {
    /// Push a new `version` of `value` under `key`.
    ///
    /// `Ok(false)` means `prev_version` was stale; pull and retry.
    fn push(
        &self,
        key: K,
        value: T,
        version: V,
        prev_version: Option<V>,
    ) -> Result<bool, ServerError>;

    /// Pull `version` of `key`, or its newest version when `version` is
    /// `None`.
    ///
    /// `Ok(None)` if the key is unknown or the version is not (or no
    /// longer) stored.
    fn pull(&self, key: &K, version: Option<&V>) -> Result<Option<(T, V)>, ServerError>;
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ServerError {
    #[error("invalid server configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("routing failed: {0}")]
    Group(#[from] GroupError),
}

/// Ordered server with strictly ordered updates and one global lock.
///
/// Registers its [`StoreService`] with the group on construction; every
/// push and pull is routed through the group to the owning role.
pub struct SimpleOrderedServer<K, V, T, G>
where
    G: ServiceGroup<DynOrderedService<K, V, T>> + ?Sized,
{
    config: ServerConfig,
    group: Arc<G>,
    service: Arc<StoreService<K, V, T>>,
}

impl<K, V, T, G> SimpleOrderedServer<K, V, T, G>
where
    K: Eq + Hash + Clone + Debug + Send + 'static,
    V: Eq + Hash + Clone + Debug + Send + 'static,
    T: Clone + Send + 'static,
    G: ServiceGroup<DynOrderedService<K, V, T>> + ?Sized,
{
    /// Validate `config` against `group` and register the server.
    pub fn new(config: ServerConfig, group: Arc<G>) -> Result<Self, ServerError> {
        config.validate::<DynOrderedService<K, V, T>, G>(&*group)?;

        let service = Arc::new(StoreService::new(config.version_depth));
        let paired: Arc<DynOrderedService<K, V, T>> = service.clone();
        group.register_paired(&config.server_name, &config.server_role, paired)?;

        info!(
            name = %config.server_name,
            role = %config.server_role,
            depth = config.version_depth,
            "ordered server started"
        );

        Ok(Self {
            config,
            group,
            service,
        })
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Read the local store directly, bypassing the group.
    pub fn inspect<R>(&self, f: impl FnOnce(&VersionedStore<K, V, T>) -> R) -> R {
        self.service.inspect(f)
    }

    fn route(&self) -> Result<Arc<DynOrderedService<K, V, T>>, GroupError> {
        self.group
            .resolve(&self.config.server_role, &self.config.server_name)
    }
}

impl<K, V, T, G> OrderedServer<K, V, T> for SimpleOrderedServer<K, V, T, G>
where
    K: Eq + Hash + Clone + Debug + Send + 'static,
    V: Eq + Hash + Clone + Debug + Send + 'static,
    T: Clone + Send + 'static,
    G: ServiceGroup<DynOrderedService<K, V, T>> + ?Sized,
{
    fn push(
        &self,
        key: K,
        value: T,
        version: V,
        prev_version: Option<V>,
    ) -> Result<bool, ServerError> {
        Ok(self.route()?.push_service(key, value, version, prev_version))
    }

    fn pull(&self, key: &K, version: Option<&V>) -> Result<Option<(T, V)>, ServerError> {
        Ok(self.route()?.pull_service(key, version))
    }
}
