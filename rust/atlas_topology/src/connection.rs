use crate::errors::{TopologyError, TopologyResult};
use crate::resources::{LogicalId, ResourceRef};
use url::Url;

pub const STANDARD_SRV_ATTRIBUTE: &str = "ConnectionStrings.StandardSrv";
pub const SRV_SCHEME: &str = "mongodb+srv";

/// Connection details a client of the deployed cluster needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionInfo {
    cluster: LogicalId,
    db_name: String,
}

impl ConnectionInfo {
    pub fn new(cluster: &LogicalId, db_name: impl Into<String>) -> Self {
        Self {
            cluster: cluster.clone(),
            db_name: db_name.into(),
        }
    }

    /// Hostname of the cluster, derived from its SRV connection string once
    /// the engine has created it.
    pub fn connection_hostname(&self) -> ResourceRef {
        ResourceRef::HostOf(Box::new(ResourceRef::attribute(
            &self.cluster,
            STANDARD_SRV_ATTRIBUTE,
        )))
    }

    pub fn default_db_name(&self) -> &str {
        &self.db_name
    }
}

/// Extracts the host from a `mongodb+srv://<host>[/...]` connection string.
pub fn parse_srv_hostname(connection_string: &str) -> TopologyResult<String> {
    let url = Url::parse(connection_string.trim())
        .map_err(|e| TopologyError::invalid_connection_string(connection_string, &e.to_string()))?;

    if url.scheme() != SRV_SCHEME {
        return Err(TopologyError::invalid_connection_string(
            connection_string,
            &format!("expected scheme '{SRV_SCHEME}', got '{}'", url.scheme()),
        ));
    }

    match url.host_str() {
        Some(host) if !host.is_empty() => Ok(host.to_string()),
        _ => Err(TopologyError::invalid_connection_string(
            connection_string,
            "no host present",
        )),
    }
}
