// Server Configuration
//
// Construction-time settings for an ordered server, loadable from JSON.

use serde::{Deserialize, Serialize};

use crate::group::{Role, ServiceGroup};

/// Default number of old versions kept beyond the newest.
pub const DEFAULT_VERSION_DEPTH: usize = 1;

/// Settings fixed for the lifetime of a server instance.
///
/// Unknown fields are ignored when deserializing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Name the server registers under in its group.
    pub server_name: String,

    /// Role that owns and serves the registered name.
    pub server_role: Role,

    /// Old versions retained per key. With a depth of 1 a key keeps the
    /// newest record and the one before it.
    #[serde(default = "default_version_depth")]
    pub version_depth: usize,
}

fn default_version_depth() -> usize {
    DEFAULT_VERSION_DEPTH
}

/// Precondition violations that abort server construction.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("version depth must be a positive integer, got {depth}")]
    InvalidDepth { depth: usize },

    #[error("role `{role}` is not a member of the group")]
    RoleNotMember { role: Role },
}

impl ServerConfig {
    pub fn new(server_name: impl Into<String>, server_role: impl Into<Role>) -> Self {
        Self {
            server_name: server_name.into(),
            server_role: server_role.into(),
            version_depth: DEFAULT_VERSION_DEPTH,
        }
    }

    pub fn with_version_depth(mut self, depth: usize) -> Self {
        self.version_depth = depth;
        self
    }

    /// Check the configuration against the group the server will join.
    pub fn validate<S, G>(&self, group: &G) -> Result<(), ConfigError>
    where
        S: ?Sized,
        G: ServiceGroup<S> + ?Sized,
    {
        if self.version_depth == 0 {
            return Err(ConfigError::InvalidDepth {
                depth: self.version_depth,
            });
        }

        if !group.is_member(&self.server_role) {
            return Err(ConfigError::RoleNotMember {
                role: self.server_role.clone(),
            });
        }

        Ok(())
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self::new("ordered-server", "server")
    }
}
