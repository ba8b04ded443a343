//! The single-pass connectivity check.

use crate::config::{ExecutionContext, ProbeConfig};
use crate::connection::{connection_uri, DatabaseConnector, DatabaseSession, ADMIN_DB};
use crate::credentials::{parse_credentials, SecretStore};
use crate::errors::{ProbeError, ProbeResult};
use crate::response::{ConnectivityReport, ProbeResponse};

pub struct ConnectivityProbe<S, C> {
    secrets: S,
    connector: C,
}

impl<S, C> ConnectivityProbe<S, C>
where
    S: SecretStore,
    C: DatabaseConnector,
{
    pub fn new(secrets: S, connector: C) -> Self {
        Self { secrets, connector }
    }

    pub fn secrets(&self) -> &S {
        &self.secrets
    }

    /// Reads configuration from the process environment and runs once.
    pub async fn run_from_env(&self) -> ProbeResponse {
        self.run(ProbeConfig::from_env(), &ExecutionContext::from_env())
            .await
    }

    /// Never fails: every error is folded into the envelope.
    pub async fn run(
        &self,
        config: ProbeResult<ProbeConfig>,
        context: &ExecutionContext,
    ) -> ProbeResponse {
        let config = match config {
            Ok(config) => config,
            Err(e) => {
                if let ProbeError::MissingConfiguration { missing } = &e {
                    log::error!("Probe configuration incomplete, missing {:?}", missing);
                }
                return ProbeResponse::failure(&e, context);
            }
        };

        match self.check(&config).await {
            Ok(report) => {
                log::info!("Successfully connected to MongoDB Atlas");
                ProbeResponse::success(report, context)
            }
            Err(e) => {
                log::error!("Failed to connect to MongoDB Atlas: {e}");
                ProbeResponse::failure(&e, context)
            }
        }
    }

    async fn check(&self, config: &ProbeConfig) -> ProbeResult<ConnectivityReport> {
        log::info!("Retrieving MongoDB credentials from Secrets Manager...");
        let secret = self.secrets.secret_string(&config.secret_arn).await?;
        let credentials = parse_credentials(secret.as_deref())?;
        let uri = connection_uri(&credentials, &config.host_name, &config.db_name);

        log::info!(
            "Attempting to connect to MongoDB Atlas at {} (database {})",
            config.host_name,
            config.db_name
        );
        let session = self.connector.open(&uri).await?;
        let outcome = exercise(session.as_ref(), &config.db_name).await;
        session.close().await;
        outcome
    }
}

async fn exercise(
    session: &dyn DatabaseSession,
    db_name: &str,
) -> ProbeResult<ConnectivityReport> {
    let ping = session.ping().await?;
    log::debug!("Ping against {ADMIN_DB} returned {ping}");
    let collections = session.list_collection_names(db_name).await?;

    Ok(ConnectivityReport {
        ping,
        database: db_name.to_string(),
        collections,
    })
}
