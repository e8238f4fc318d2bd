// Service Group
//
// Membership, paired-service registration and routing between roles.
// The real transport lives outside the kernel; `LocalGroup` dispatches
// in-process and is what the CLI and tests run against.

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;
use tracing::info;

/// Logical process identity within a group.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Role(pub String);

impl Role {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Role {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum GroupError {
    #[error("service `{name}` is already registered")]
    AlreadyRegistered { name: String },

    #[error("no service registered under `{name}`")]
    NotRegistered { name: String },

    #[error("service `{name}` is owned by `{owner}`, not `{requested}`")]
    WrongOwner {
        name: String,
        owner: Role,
        requested: Role,
    },

    #[error("role `{role}` is not a member of the group")]
    UnknownRole { role: Role },
}

/// Routing seam between callers and the role that owns a service.
///
/// `S` is the service interface being carried, usually a trait object.
pub trait ServiceGroup<S: ?Sized>: Send + Sync {
    fn is_member(&self, role: &Role) -> bool;

    /// Register `service` under `name`, served only by `owner`.
    fn register_paired(&self, name: &str, owner: &Role, service: Arc<S>) -> Result<(), GroupError>;

    /// Find the service `name` as served by `role`.
    fn resolve(&self, role: &Role, name: &str) -> Result<Arc<S>, GroupError>;
}

struct Paired<S: ?Sized> {
    owner: Role,
    service: Arc<S>,
}

/// In-process group. Calls are plain synchronous method calls.
pub struct LocalGroup<S: ?Sized> {
    members: RwLock<HashSet<Role>>,
    services: RwLock<HashMap<String, Paired<S>>>,
}

impl<S: ?Sized> LocalGroup<S> {
    pub fn new<I, R>(members: I) -> Self
    where
        I: IntoIterator<Item = R>,
        R: Into<Role>,
    {
        Self {
            members: RwLock::new(members.into_iter().map(Into::into).collect()),
            services: RwLock::new(HashMap::new()),
        }
    }

    pub fn add_member(&self, role: impl Into<Role>) {
        self.members.write().insert(role.into());
    }

    /// Members in no particular order.
    pub fn members(&self) -> Vec<Role> {
        self.members.read().iter().cloned().collect()
    }
}

impl<S: ?Sized + Send + Sync> ServiceGroup<S> for LocalGroup<S> {
    fn is_member(&self, role: &Role) -> bool {
        self.members.read().contains(role)
    }

    fn register_paired(&self, name: &str, owner: &Role, service: Arc<S>) -> Result<(), GroupError> {
        if !self.is_member(owner) {
            return Err(GroupError::UnknownRole {
                role: owner.clone(),
            });
        }

        let mut services = self.services.write();
        if services.contains_key(name) {
            return Err(GroupError::AlreadyRegistered {
                name: name.to_string(),
            });
        }

        services.insert(
            name.to_string(),
            Paired {
                owner: owner.clone(),
                service,
            },
        );
        info!(name, %owner, "registered paired service");
        Ok(())
    }

    fn resolve(&self, role: &Role, name: &str) -> Result<Arc<S>, GroupError> {
        let services = self.services.read();
        let paired = services.get(name).ok_or_else(|| GroupError::NotRegistered {
            name: name.to_string(),
        })?;

        if &paired.owner != role {
            return Err(GroupError::WrongOwner {
                name: name.to_string(),
                owner: paired.owner.clone(),
                requested: role.clone(),
            });
        }

        Ok(Arc::clone(&paired.service))
    }
}
