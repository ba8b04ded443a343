use crate::errors::{TopologyError, TopologyResult};
use rand::Rng;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

pub const PROJECT_NAME_PREFIX: &str = "atlas-project-";
pub const CLUSTER_NAME_PREFIX: &str = "atlas-cluster-";
pub const CLUSTER_TYPE: &str = "REPLICASET";

/// Authentication database of the generated database user.
pub const DEFAULT_USER_DB_NAME: &str = "admin";
pub const DEFAULT_ROLE_NAME: &str = "atlasAdmin";

pub const NAME_SUFFIX_MIN: u64 = 10;
pub const NAME_SUFFIX_MAX: u64 = 9_999_999;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DatabaseRole {
    pub role_name: String,
    pub database_name: String,
}

pub fn default_roles() -> Vec<DatabaseRole> {
    vec![DatabaseRole {
        role_name: DEFAULT_ROLE_NAME.to_string(),
        database_name: DEFAULT_USER_DB_NAME.to_string(),
    }]
}

/// Strategy used to name a project or cluster when the caller gave no explicit name.
pub trait NameAllocator {
    fn allocate(&self, prefix: &str) -> TopologyResult<String>;
}

/// Appends a uniformly drawn suffix from `[NAME_SUFFIX_MIN, NAME_SUFFIX_MAX]`.
/// Unique in practice, but nothing checks existing resources.
#[derive(Debug, Default, Clone, Copy)]
pub struct RandomSuffix;

impl NameAllocator for RandomSuffix {
    fn allocate(&self, prefix: &str) -> TopologyResult<String> {
        let suffix = rand::rng().random_range(NAME_SUFFIX_MIN..=NAME_SUFFIX_MAX);
        Ok(format!("{prefix}{suffix}"))
    }
}

/// Derives the suffix from a SHA-256 of a stable seed, so repeated synthesis
/// with the same seed yields the same names.
#[derive(Debug, Clone)]
pub struct SeededSuffix {
    seed: String,
}

impl SeededSuffix {
    pub fn new(seed: impl Into<String>) -> Self {
        Self { seed: seed.into() }
    }

    fn suffix_for(&self, prefix: &str) -> u64 {
        let mut hasher = Sha256::new();
        hasher.update(self.seed.as_bytes());
        hasher.update(b"/");
        hasher.update(prefix.as_bytes());
        let digest = hasher.finalize();

        let mut head = [0u8; 8];
        head.copy_from_slice(&digest[..8]);
        let span = NAME_SUFFIX_MAX - NAME_SUFFIX_MIN + 1;
        NAME_SUFFIX_MIN + u64::from_be_bytes(head) % span
    }
}

impl NameAllocator for SeededSuffix {
    fn allocate(&self, prefix: &str) -> TopologyResult<String> {
        Ok(format!("{prefix}{}", self.suffix_for(prefix)))
    }
}

/// Refuses to invent names: every project and cluster must be named by the caller.
#[derive(Debug, Default, Clone, Copy)]
pub struct RequireExplicit;

impl NameAllocator for RequireExplicit {
    fn allocate(&self, prefix: &str) -> TopologyResult<String> {
        Err(TopologyError::Configuration(format!(
            "an explicit name is required (no name given for '{prefix}*')"
        )))
    }
}

/// Returns the explicit name when one is set and non-empty, otherwise asks the allocator.
pub fn resolve_name(
    explicit: Option<&str>,
    prefix: &str,
    allocator: &dyn NameAllocator,
) -> TopologyResult<String> {
    match explicit {
        Some(name) if !name.trim().is_empty() => Ok(name.to_string()),
        _ => allocator.allocate(prefix),
    }
}
