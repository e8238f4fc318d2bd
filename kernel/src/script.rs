// Operation Scripts
//
// Replays a sequence of push/pull calls against an ordered server and
// records what each call observed:
// ops → server → outcomes

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::history::{Record, VersionTag};
use crate::server::{OrderedServer, ServerError};

/// One client call, as read from a script file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Operation {
    /// Push `value`. A missing `version` gets a generated tag.
    Push {
        key: String,
        value: Value,
        #[serde(default)]
        version: Option<VersionTag>,
        #[serde(default)]
        prev_version: Option<VersionTag>,
    },

    /// Pull the given `version`, or the latest one.
    Pull {
        key: String,
        #[serde(default)]
        version: Option<VersionTag>,
    },
}

/// What a single operation observed.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Outcome {
    Push {
        key: String,
        version: VersionTag,
        accepted: bool,
    },
    Pull {
        key: String,
        requested: Option<VersionTag>,
        found: Option<Record<VersionTag, Value>>,
    },
}

/// Errors that can occur while running a script.
#[derive(Debug, thiserror::Error)]
pub enum ScriptError {
    #[error("operation {index} failed: {source}")]
    Server {
        index: usize,
        #[source]
        source: ServerError,
    },
}

/// Run every operation in order, stopping at the first routing failure.
///
/// Conflicts and misses are outcomes, not errors.
pub fn run_script<S>(
    server: &S,
    ops: impl IntoIterator<Item = Operation>,
) -> Result<Vec<Outcome>, ScriptError>
where
    S: OrderedServer<String, VersionTag, Value> + ?Sized,
{
    let mut outcomes = Vec::new();

    for (index, op) in ops.into_iter().enumerate() {
        let outcome = match op {
            Operation::Push {
                key,
                value,
                version,
                prev_version,
            } => {
                let version = version.unwrap_or_else(VersionTag::generate);
                let accepted = server
                    .push(key.clone(), value, version.clone(), prev_version)
                    .map_err(|source| ScriptError::Server { index, source })?;

                Outcome::Push {
                    key,
                    version,
                    accepted,
                }
            }
            Operation::Pull { key, version } => {
                let found = server
                    .pull(&key, version.as_ref())
                    .map_err(|source| ScriptError::Server { index, source })?
                    .map(|(value, version)| Record { version, value });

                Outcome::Pull {
                    key,
                    requested: version,
                    found,
                }
            }
        };
        outcomes.push(outcome);
    }

    Ok(outcomes)
}
