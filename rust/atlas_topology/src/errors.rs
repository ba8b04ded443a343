use thiserror::Error;

#[derive(Error, Debug)]
pub enum TopologyError {
    #[error("Instance size {size} is not supported. Only dedicated instances (M10 and above) are allowed.")]
    UnsupportedInstanceSize { size: String },

    #[error("Invalid CIDR block '{value}': {reason}")]
    InvalidCidr { value: String, reason: String },

    #[error("Atlas CIDR {atlas} overlaps the VPC CIDR {vpc}")]
    OverlappingCidr { atlas: String, vpc: String },

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Invalid connection string '{value}': {reason}")]
    InvalidConnectionString { value: String, reason: String },

    #[error("Reference could not be resolved: {0}")]
    UnresolvedReference(String),

    #[error("Secret field '{field}' of {secret} can only be read by the secret store")]
    SecretReference { secret: String, field: String },

    #[error("Dependency cycle detected at {0}")]
    DependencyCycle(String),

    #[error("Plan serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl TopologyError {
    pub fn invalid_cidr(value: &str, reason: &str) -> Self {
        Self::InvalidCidr {
            value: value.to_string(),
            reason: reason.to_string(),
        }
    }

    pub fn invalid_connection_string(value: &str, reason: &str) -> Self {
        Self::InvalidConnectionString {
            value: value.to_string(),
            reason: reason.to_string(),
        }
    }
}

pub type TopologyResult<T> = Result<T, TopologyError>;
