//! Response envelope returned to the invoker.

use crate::config::ExecutionContext;
use crate::errors::ProbeError;
use chrono::{SecondsFormat, Utc};
use mongodb::bson::Document;
use serde::{Deserialize, Serialize};

pub const SUCCESS_MESSAGE: &str = "Successfully connected to MongoDB Atlas";
pub const FAILURE_MESSAGE: &str = "Failed to connect to MongoDB Atlas";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProbeResponse {
    pub status_code: u16,
    /// JSON-encoded [`SuccessBody`] or [`FailureBody`].
    pub body: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VpcInfo {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub availability_zone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub function_name: Option<String>,
}

impl From<&ExecutionContext> for VpcInfo {
    fn from(context: &ExecutionContext) -> Self {
        Self {
            availability_zone: context.region.clone(),
            function_name: context.function_name.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuccessBody {
    pub success: bool,
    pub message: String,
    pub ping: Document,
    pub database: String,
    pub collections_count: usize,
    pub collections: Vec<String>,
    pub timestamp: String,
    pub vpc_info: VpcInfo,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FailureBody {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_code: Option<String>,
    pub timestamp: String,
    pub vpc_info: VpcInfo,
}

/// Result of a completed liveness check.
#[derive(Debug, Clone, PartialEq)]
pub struct ConnectivityReport {
    pub ping: Document,
    pub database: String,
    pub collections: Vec<String>,
}

fn timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

impl ProbeResponse {
    pub fn success(report: ConnectivityReport, context: &ExecutionContext) -> Self {
        let body = SuccessBody {
            success: true,
            message: SUCCESS_MESSAGE.to_string(),
            ping: report.ping,
            database: report.database,
            collections_count: report.collections.len(),
            collections: report.collections,
            timestamp: timestamp(),
            vpc_info: context.into(),
        };
        Self::encode(200, &body)
    }

    pub fn failure(error: &ProbeError, context: &ExecutionContext) -> Self {
        let body = match error {
            ProbeError::MissingConfiguration { .. } => FailureBody {
                success: false,
                message: error.to_string(),
                error: None,
                error_code: None,
                timestamp: timestamp(),
                vpc_info: context.into(),
            },
            _ => FailureBody {
                success: false,
                message: FAILURE_MESSAGE.to_string(),
                error: Some(error.to_string()),
                error_code: error.error_code().map(str::to_string),
                timestamp: timestamp(),
                vpc_info: context.into(),
            },
        };
        Self::encode(error.status_code(), &body)
    }

    fn encode<T: Serialize>(status_code: u16, body: &T) -> Self {
        let body = serde_json::to_string(body).unwrap_or_else(|e| {
            log::error!("Failed to encode response body: {e}");
            serde_json::json!({ "success": false, "message": FAILURE_MESSAGE }).to_string()
        });
        Self { status_code, body }
    }

    pub fn body_json(&self) -> serde_json::Result<serde_json::Value> {
        serde_json::from_str(&self.body)
    }

    pub fn is_success(&self) -> bool {
        self.status_code == 200
    }
}
