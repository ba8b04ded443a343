use thiserror::Error;

pub const MISSING_CONFIGURATION_MESSAGE: &str = "MongoDB configuration not provided (missing MONGODB_HOST_NAME, MONGODB_DB_NAME, or MONGODB_SECRET_ARN)";

#[derive(Error, Debug)]
pub enum ProbeError {
    #[error("{}", MISSING_CONFIGURATION_MESSAGE)]
    MissingConfiguration { missing: Vec<&'static str> },

    #[error("Secret value is empty")]
    EmptySecret,

    #[error("Username or password not found in secret")]
    MissingCredentials,

    #[error("{0}")]
    MalformedSecret(#[from] serde_json::Error),

    #[error("{message}")]
    SecretStore {
        message: String,
        code: Option<String>,
    },

    #[error("{message}")]
    Database {
        message: String,
        code: Option<String>,
    },
}

impl ProbeError {
    pub fn status_code(&self) -> u16 {
        match self {
            ProbeError::MissingConfiguration { .. } => 400,
            _ => 500,
        }
    }

    /// Provider-specific code of the underlying failure, when it carries one.
    pub fn error_code(&self) -> Option<&str> {
        match self {
            ProbeError::SecretStore { code, .. } | ProbeError::Database { code, .. } => {
                code.as_deref()
            }
            _ => None,
        }
    }

    pub fn database(message: impl Into<String>, code: Option<&str>) -> Self {
        ProbeError::Database {
            message: message.into(),
            code: code.map(str::to_string),
        }
    }
}

pub type ProbeResult<T> = Result<T, ProbeError>;
