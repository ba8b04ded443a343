use crate::errors::{ProbeError, ProbeResult};

pub const ENV_HOST_NAME: &str = "MONGODB_HOST_NAME";
pub const ENV_DB_NAME: &str = "MONGODB_DB_NAME";
pub const ENV_SECRET_ARN: &str = "MONGODB_SECRET_ARN";
pub const ENV_REGION: &str = "AWS_REGION";
pub const ENV_FUNCTION_NAME: &str = "AWS_LAMBDA_FUNCTION_NAME";

/// Settings the deployment injects into the function environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeConfig {
    pub host_name: String,
    pub db_name: String,
    pub secret_arn: String,
}

impl ProbeConfig {
    pub fn from_env() -> ProbeResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Empty values count as missing.
    pub fn from_lookup<F>(lookup: F) -> ProbeResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let host_name = read(ENV_HOST_NAME);
        let db_name = read(ENV_DB_NAME);
        let secret_arn = read(ENV_SECRET_ARN);

        match (host_name, db_name, secret_arn) {
            (Some(host_name), Some(db_name), Some(secret_arn)) => Ok(Self {
                host_name,
                db_name,
                secret_arn,
            }),
            (host_name, db_name, secret_arn) => {
                let missing = [
                    (ENV_HOST_NAME, host_name.is_none()),
                    (ENV_DB_NAME, db_name.is_none()),
                    (ENV_SECRET_ARN, secret_arn.is_none()),
                ]
                .into_iter()
                .filter_map(|(key, absent)| absent.then_some(key))
                .collect();
                Err(ProbeError::MissingConfiguration { missing })
            }
        }
    }
}

/// Identifiers of the invocation environment reported back to the caller.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExecutionContext {
    pub region: Option<String>,
    pub function_name: Option<String>,
}

impl ExecutionContext {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        Self {
            region: lookup(ENV_REGION),
            function_name: lookup(ENV_FUNCTION_NAME),
        }
    }
}
