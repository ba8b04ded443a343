//! Declaration descriptors and the value references they carry.
//!
//! Nothing in here talks to a cloud API. A descriptor only records what the
//! provisioning engine should create; values that exist only after creation
//! (IDs, ARNs, connection strings) are carried as [`ResourceRef`]s.

use crate::connection::parse_srv_hostname;
use crate::errors::{TopologyError, TopologyResult};
use serde::{Deserialize, Serialize};
use std::fmt;

pub const ATLAS_PROJECT: &str = "MongoDB::Atlas::Project";
pub const ATLAS_NETWORK_CONTAINER: &str = "MongoDB::Atlas::NetworkContainer";
pub const ATLAS_NETWORK_PEERING: &str = "MongoDB::Atlas::NetworkPeering";
pub const ATLAS_CLUSTER: &str = "MongoDB::Atlas::Cluster";
pub const ATLAS_DATABASE_USER: &str = "MongoDB::Atlas::DatabaseUser";
pub const ATLAS_IP_ACCESS_LIST: &str = "MongoDB::Atlas::ProjectIpAccessList";
pub const EC2_ROUTE: &str = "AWS::EC2::Route";
pub const EC2_VPC: &str = "AWS::EC2::VPC";
pub const EC2_SUBNET: &str = "AWS::EC2::Subnet";
pub const SECRETS_MANAGER_SECRET: &str = "AWS::SecretsManager::Secret";
pub const LAMBDA_FUNCTION: &str = "AWS::Lambda::Function";

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LogicalId(String);

impl LogicalId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Nests `id` under this scope, e.g. `MongoDBCluster` + `Project`.
    pub fn child(&self, id: &str) -> Self {
        Self(format!("{}/{}", self.0, id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LogicalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Value known only to the provisioning engine (or a fixed literal).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ResourceRef {
    Literal(String),
    Attribute {
        resource: LogicalId,
        attribute: String,
    },
    Pseudo(String),
    SecretField {
        secret: LogicalId,
        field: String,
    },
    HostOf(Box<ResourceRef>),
}

/// Supplies engine-assigned values once resources exist.
pub trait AttributeResolver {
    fn attribute(&self, resource: &LogicalId, attribute: &str) -> Option<String>;
    fn pseudo(&self, name: &str) -> Option<String>;
}

impl ResourceRef {
    pub fn literal(value: impl Into<String>) -> Self {
        Self::Literal(value.into())
    }

    pub fn attribute(resource: &LogicalId, attribute: &str) -> Self {
        Self::Attribute {
            resource: resource.clone(),
            attribute: attribute.to_string(),
        }
    }

    /// Logical IDs this reference reads from.
    pub fn referenced_resources(&self) -> Vec<&LogicalId> {
        match self {
            Self::Attribute { resource, .. } => vec![resource],
            Self::SecretField { secret, .. } => vec![secret],
            Self::HostOf(inner) => inner.referenced_resources(),
            Self::Literal(_) | Self::Pseudo(_) => vec![],
        }
    }

    /// Resolves the reference against deployed state. Secret fields are never
    /// materialized here; only the secret store hands out their values.
    pub fn resolve(&self, resolver: &dyn AttributeResolver) -> TopologyResult<String> {
        match self {
            Self::Literal(value) => Ok(value.clone()),
            Self::Attribute {
                resource,
                attribute,
            } => resolver.attribute(resource, attribute).ok_or_else(|| {
                TopologyError::UnresolvedReference(format!("{resource}.{attribute}"))
            }),
            Self::Pseudo(name) => resolver
                .pseudo(name)
                .ok_or_else(|| TopologyError::UnresolvedReference(name.clone())),
            Self::SecretField { secret, field } => Err(TopologyError::SecretReference {
                secret: secret.to_string(),
                field: field.clone(),
            }),
            Self::HostOf(inner) => {
                let connection_string = inner.resolve(resolver)?;
                parse_srv_hostname(&connection_string)
            }
        }
    }
}

/// `from` must be created after `to`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DependencyEdge {
    pub from: LogicalId,
    pub to: LogicalId,
}

impl DependencyEdge {
    pub fn new(from: &LogicalId, to: &LogicalId) -> Self {
        Self {
            from: from.clone(),
            to: to.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Declared {
    pub logical_id: LogicalId,
    pub resource_type: String,
}

impl Declared {
    pub fn new(logical_id: &LogicalId, resource_type: &str) -> Self {
        Self {
            logical_id: logical_id.clone(),
            resource_type: resource_type.to_string(),
        }
    }
}
