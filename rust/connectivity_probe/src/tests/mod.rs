#![allow(dead_code)]

use crate::config::ProbeConfig;
use crate::connection::{DatabaseConnector, DatabaseSession};
use crate::credentials::SecretStore;
use crate::errors::{ProbeError, ProbeResult};
use async_trait::async_trait;
use mongodb::bson::{doc, Document};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

pub mod config;
pub mod credentials;
pub mod response;

pub const TEST_HOST: &str = "atlas-cluster-1234.ab1cd.mongodb.net";
pub const TEST_DB: &str = "my-app";
pub const TEST_SECRET_ARN: &str =
    "arn:aws:secretsmanager:ap-southeast-2:123456789012:secret:MongoDBCluster-DatabaseSecret-AbCdEf";

pub fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    move |key| map.get(key).cloned()
}

pub fn test_config() -> ProbeConfig {
    ProbeConfig {
        host_name: TEST_HOST.to_string(),
        db_name: TEST_DB.to_string(),
        secret_arn: TEST_SECRET_ARN.to_string(),
    }
}

/// Secret store backed by a map; `None` values model a secret without a
/// string payload.
#[derive(Default)]
pub struct MemorySecretStore {
    pub secrets: HashMap<String, Option<String>>,
    pub failure: Option<(String, Option<String>)>,
    pub reads: AtomicUsize,
}

impl MemorySecretStore {
    pub fn with_secret(secret_id: &str, value: Option<&str>) -> Self {
        let mut store = Self::default();
        store
            .secrets
            .insert(secret_id.to_string(), value.map(str::to_string));
        store
    }

    pub fn failing(message: &str, code: Option<&str>) -> Self {
        Self {
            failure: Some((message.to_string(), code.map(str::to_string))),
            ..Default::default()
        }
    }

    pub fn read_count(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SecretStore for MemorySecretStore {
    async fn secret_string(&self, secret_id: &str) -> ProbeResult<Option<String>> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        if let Some((message, code)) = &self.failure {
            return Err(ProbeError::SecretStore {
                message: message.clone(),
                code: code.clone(),
            });
        }
        self.secrets
            .get(secret_id)
            .cloned()
            .ok_or_else(|| ProbeError::SecretStore {
                message: "Secrets Manager can't find the specified secret.".to_string(),
                code: Some("ResourceNotFoundException".to_string()),
            })
    }
}

/// Counts opened and closed sessions so tests can check nothing leaks.
#[derive(Default)]
pub struct SessionLedger {
    pub opened: AtomicUsize,
    pub closed: AtomicUsize,
    pub uris: Mutex<Vec<String>>,
}

impl SessionLedger {
    pub fn opened(&self) -> usize {
        self.opened.load(Ordering::SeqCst)
    }

    pub fn closed(&self) -> usize {
        self.closed.load(Ordering::SeqCst)
    }

    pub fn last_uri(&self) -> Option<String> {
        self.uris.lock().ok().and_then(|uris| uris.last().cloned())
    }
}

#[derive(Clone, Default)]
pub struct Failure {
    pub message: String,
    pub code: Option<String>,
}

impl Failure {
    pub fn new(message: &str, code: Option<&str>) -> Self {
        Self {
            message: message.to_string(),
            code: code.map(str::to_string),
        }
    }

    fn to_error(&self) -> ProbeError {
        ProbeError::database(&self.message, self.code.as_deref())
    }
}

#[derive(Default)]
pub struct TrackingConnector {
    pub ledger: Arc<SessionLedger>,
    pub collections: Vec<String>,
    pub open_failure: Option<Failure>,
    pub ping_failure: Option<Failure>,
    pub list_failure: Option<Failure>,
}

impl TrackingConnector {
    pub fn with_collections(names: &[&str]) -> Self {
        Self {
            collections: names.iter().map(|n| n.to_string()).collect(),
            ..Default::default()
        }
    }
}

#[async_trait]
impl DatabaseConnector for TrackingConnector {
    async fn open(&self, uri: &str) -> ProbeResult<Box<dyn DatabaseSession>> {
        if let Ok(mut uris) = self.ledger.uris.lock() {
            uris.push(uri.to_string());
        }
        if let Some(failure) = &self.open_failure {
            return Err(failure.to_error());
        }
        self.ledger.opened.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(TrackingSession {
            ledger: Arc::clone(&self.ledger),
            collections: self.collections.clone(),
            ping_failure: self.ping_failure.clone(),
            list_failure: self.list_failure.clone(),
        }))
    }
}

struct TrackingSession {
    ledger: Arc<SessionLedger>,
    collections: Vec<String>,
    ping_failure: Option<Failure>,
    list_failure: Option<Failure>,
}

#[async_trait]
impl DatabaseSession for TrackingSession {
    async fn ping(&self) -> ProbeResult<Document> {
        match &self.ping_failure {
            Some(failure) => Err(failure.to_error()),
            None => Ok(doc! { "ok": 1 }),
        }
    }

    async fn list_collection_names(&self, _db_name: &str) -> ProbeResult<Vec<String>> {
        match &self.list_failure {
            Some(failure) => Err(failure.to_error()),
            None => Ok(self.collections.clone()),
        }
    }

    async fn close(&self) {
        self.ledger.closed.fetch_add(1, Ordering::SeqCst);
    }
}
