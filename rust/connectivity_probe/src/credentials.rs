//! Database credentials held in AWS Secrets Manager.

use crate::errors::{ProbeError, ProbeResult};
use async_trait::async_trait;
use aws_sdk_secretsmanager::error::ProvideErrorMetadata;
use std::fmt;

pub const USERNAME_FIELD: &str = "username";
pub const PASSWORD_FIELD: &str = "password";

#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Reads the raw secret string stored under `secret_id`.
#[async_trait]
pub trait SecretStore: Send + Sync {
    async fn secret_string(&self, secret_id: &str) -> ProbeResult<Option<String>>;
}

pub struct SecretsManagerStore {
    client: aws_sdk_secretsmanager::Client,
}

impl SecretsManagerStore {
    pub async fn new(region: Option<String>) -> Self {
        let mut loader = aws_config::defaults(aws_config::BehaviorVersion::latest());
        if let Some(region) = region {
            loader = loader.region(aws_config::Region::new(region));
        }
        let config = loader.load().await;

        Self {
            client: aws_sdk_secretsmanager::Client::new(&config),
        }
    }
}

#[async_trait]
impl SecretStore for SecretsManagerStore {
    async fn secret_string(&self, secret_id: &str) -> ProbeResult<Option<String>> {
        let output = self
            .client
            .get_secret_value()
            .secret_id(secret_id)
            .send()
            .await
            .map_err(|e| ProbeError::SecretStore {
                message: e.message().map(str::to_string).unwrap_or_else(|| e.to_string()),
                code: e.code().map(str::to_string),
            })?;

        Ok(output.secret_string().map(str::to_string))
    }
}

/// Parses the `{"username": .., "password": ..}` payload.
pub fn parse_credentials(secret_string: Option<&str>) -> ProbeResult<Credentials> {
    let raw = match secret_string {
        Some(raw) if !raw.is_empty() => raw,
        _ => return Err(ProbeError::EmptySecret),
    };

    let payload: serde_json::Value = serde_json::from_str(raw)?;
    let field = |name: &str| {
        payload
            .get(name)
            .and_then(serde_json::Value::as_str)
            .filter(|v| !v.is_empty())
            .map(str::to_string)
    };

    match (field(USERNAME_FIELD), field(PASSWORD_FIELD)) {
        (Some(username), Some(password)) => Ok(Credentials { username, password }),
        _ => Err(ProbeError::MissingCredentials),
    }
}
