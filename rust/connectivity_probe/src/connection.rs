//! Database seam of the probe and its MongoDB driver implementation.

use crate::credentials::Credentials;
use crate::errors::{ProbeError, ProbeResult};
use async_trait::async_trait;
use mongodb::bson::{doc, Document};
use mongodb::error::ErrorKind;
use mongodb::Client;

pub const ADMIN_DB: &str = "admin";

/// `mongodb+srv://<user>:<pass>@<host>/<db>?retryWrites=true&w=majority`
pub fn connection_uri(credentials: &Credentials, host_name: &str, db_name: &str) -> String {
    format!(
        "mongodb+srv://{}:{}@{}/{}?retryWrites=true&w=majority",
        urlencoding::encode(&credentials.username),
        urlencoding::encode(&credentials.password),
        host_name,
        db_name
    )
}

/// Opens a session handle. Opening may not touch the network; failures to
/// reach the server surface from the session calls.
#[async_trait]
pub trait DatabaseConnector: Send + Sync {
    async fn open(&self, uri: &str) -> ProbeResult<Box<dyn DatabaseSession>>;
}

#[async_trait]
pub trait DatabaseSession: Send + Sync {
    async fn ping(&self) -> ProbeResult<Document>;
    async fn list_collection_names(&self, db_name: &str) -> ProbeResult<Vec<String>>;
    async fn close(&self);
}

pub struct MongoConnector;

#[async_trait]
impl DatabaseConnector for MongoConnector {
    async fn open(&self, uri: &str) -> ProbeResult<Box<dyn DatabaseSession>> {
        let client = Client::with_uri_str(uri).await.map_err(from_driver)?;
        Ok(Box::new(MongoSession { client }))
    }
}

pub struct MongoSession {
    client: Client,
}

impl MongoSession {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl DatabaseSession for MongoSession {
    async fn ping(&self) -> ProbeResult<Document> {
        self.client
            .database(ADMIN_DB)
            .run_command(doc! { "ping": 1 })
            .await
            .map_err(from_driver)
    }

    async fn list_collection_names(&self, db_name: &str) -> ProbeResult<Vec<String>> {
        self.client
            .database(db_name)
            .list_collection_names()
            .await
            .map_err(from_driver)
    }

    async fn close(&self) {
        self.client.clone().shutdown().await;
    }
}

fn from_driver(err: mongodb::error::Error) -> ProbeError {
    let code = match *err.kind {
        ErrorKind::Command(ref command) if !command.code_name.is_empty() => {
            Some(command.code_name.clone())
        }
        ErrorKind::Command(ref command) => Some(command.code.to_string()),
        ErrorKind::Authentication { .. } => Some("AuthenticationFailed".to_string()),
        ErrorKind::DnsResolve { .. } => Some("DnsResolve".to_string()),
        ErrorKind::ServerSelection { .. } => Some("ServerSelection".to_string()),
        ErrorKind::InvalidArgument { .. } => Some("InvalidArgument".to_string()),
        ErrorKind::Io(ref io) => Some(format!("{:?}", io.kind())),
        _ => None,
    };
    ProbeError::Database {
        message: err.to_string(),
        code,
    }
}
