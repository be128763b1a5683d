//! Identity snapshots and role resolution
//!
//! The identity is owned by an external authentication provider. This module
//! only reads point-in-time snapshots of it and decides whether the acting
//! user is a driver. Resolution is total: any missing, null or malformed
//! role value means "not a driver".

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

use crate::error::{Error, Result};

// ─────────────────────────────────────────────────────────────────
// Role
// ─────────────────────────────────────────────────────────────────

/// Role claimed by an identity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Driver,
    Rider,
}

impl Role {
    /// Interpret a raw claim value.
    ///
    /// Only a JSON boolean or the exact role names (ASCII case-insensitive)
    /// count as a claim. `"true"`, `1`, `null`, padded strings and objects
    /// are not claims.
    pub fn from_claim(value: &Value) -> Option<Role> {
        match value {
            Value::Bool(true) => Some(Role::Driver),
            Value::Bool(false) => Some(Role::Rider),
            Value::String(s) if s.eq_ignore_ascii_case("driver") => Some(Role::Driver),
            Value::String(s) if s.eq_ignore_ascii_case("rider") => Some(Role::Rider),
            _ => None,
        }
    }

    /// Interpret a boolean driver flag. Only JSON booleans count; a string
    /// in a flag is malformed and makes no claim.
    pub fn from_flag(value: &Value) -> Option<Role> {
        match value {
            Value::Bool(true) => Some(Role::Driver),
            Value::Bool(false) => Some(Role::Rider),
            _ => None,
        }
    }
}

// ─────────────────────────────────────────────────────────────────
// Identity
// ─────────────────────────────────────────────────────────────────

/// Snapshot of the current user's identity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Identity {
    /// Whether the provider has finished loading the user
    pub loaded: bool,
    /// Role attribute, if one was unambiguously present
    pub role: Option<Role>,
}

impl Identity {
    /// Identity that the provider has not loaded yet
    pub fn not_loaded() -> Self {
        Self {
            loaded: false,
            role: None,
        }
    }

    /// Loaded identity with the given role
    pub fn loaded(role: Option<Role>) -> Self {
        Self { loaded: true, role }
    }

    /// Whether this identity resolves to a driver
    pub fn is_driver(&self) -> bool {
        self.role == Some(Role::Driver)
    }
}

/// Raw identity snapshot as handed over by the identity provider
///
/// Every field is optional and loosely typed; conversion into [`Identity`]
/// cannot fail.
#[derive(Debug, Clone, Default)]
pub struct IdentitySnapshot {
    pub loaded: Value,
    pub role: Option<Value>,
    /// Custom attributes (`publicMetadata` in camelCase producers)
    pub public_metadata: Option<Value>,
}

impl IdentitySnapshot {
    /// Parse a snapshot from JSON text. Only non-object JSON is rejected.
    pub fn from_json(source_name: &str, text: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(text)
            .map_err(|e| Error::identity_malformed(source_name, e.to_string()))?;

        match value {
            Value::Object(map) => Ok(Self::from_object(map)),
            other => Err(Error::identity_malformed(
                source_name,
                format!("expected a JSON object, found {}", json_kind(&other)),
            )),
        }
    }

    fn from_object(mut map: Map<String, Value>) -> Self {
        let loaded = map.remove("loaded").unwrap_or(Value::Null);
        let role = map.remove("role");
        let public_metadata = ["public_metadata", "publicMetadata"]
            .into_iter()
            .filter_map(|key| map.remove(key))
            .find(Value::is_object);

        Self {
            loaded,
            role,
            public_metadata,
        }
    }

    /// Driver flag from the custom metadata attribute
    fn metadata_claim(&self) -> Option<&Value> {
        let metadata = self.public_metadata.as_ref()?.as_object()?;
        metadata.get("isDriver").or_else(|| metadata.get("is_driver"))
    }

    /// Resolve the snapshot into an identity.
    ///
    /// When the `role` field and the metadata flag both make a claim and
    /// disagree, the role is ambiguous and left unset.
    pub fn resolve(&self) -> Identity {
        let loaded = matches!(self.loaded, Value::Bool(true));

        let from_role = self.role.as_ref().and_then(Role::from_claim);
        let from_metadata = self.metadata_claim().and_then(Role::from_flag);

        let role = match (from_role, from_metadata) {
            (Some(a), Some(b)) if a != b => {
                debug!(role = ?a, metadata = ?b, "Conflicting role claims, treating as absent");
                None
            }
            (Some(a), _) => Some(a),
            (None, b) => b,
        };

        Identity { loaded, role }
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

// ─────────────────────────────────────────────────────────────────
// Identity Providers
// ─────────────────────────────────────────────────────────────────

/// Source of identity snapshots
///
/// Loading may be asynchronous; the returned snapshot is a single
/// point-in-time reading.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Take a snapshot of the current identity
    async fn snapshot(&self) -> Result<Identity>;
}

/// Reads a JSON identity snapshot from disk
pub struct FileIdentityProvider {
    path: PathBuf,
}

impl FileIdentityProvider {
    pub fn new(path: impl AsRef<Path>) -> Self {
        let expanded = shellexpand::tilde(&path.as_ref().to_string_lossy()).into_owned();
        Self {
            path: PathBuf::from(expanded),
        }
    }
}

#[async_trait]
impl IdentityProvider for FileIdentityProvider {
    async fn snapshot(&self) -> Result<Identity> {
        let text = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|source| Error::IoRead {
                path: self.path.clone(),
                source,
            })?;

        let snapshot = IdentitySnapshot::from_json(&self.path.display().to_string(), &text)?;
        let identity = snapshot.resolve();
        debug!(
            path = %self.path.display(),
            loaded = identity.loaded,
            role = ?identity.role,
            "Identity snapshot read"
        );
        Ok(identity)
    }
}

/// Always returns the same identity
pub struct StaticIdentityProvider {
    identity: Identity,
}

impl StaticIdentityProvider {
    pub fn new(identity: Identity) -> Self {
        Self { identity }
    }

    /// Build from CLI-style inputs: a raw role string and a not-loaded flag
    pub fn from_flags(role: Option<&str>, not_loaded: bool) -> Self {
        let role = role.and_then(|r| Role::from_claim(&Value::String(r.to_string())));
        let identity = if not_loaded {
            Identity::not_loaded()
        } else {
            Identity::loaded(role)
        };
        Self::new(identity)
    }
}

#[async_trait]
impl IdentityProvider for StaticIdentityProvider {
    async fn snapshot(&self) -> Result<Identity> {
        Ok(self.identity)
    }
}
