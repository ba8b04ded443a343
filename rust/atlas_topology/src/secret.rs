use crate::resources::{LogicalId, ResourceRef};
use rand::distr::Alphanumeric;
use rand::Rng;
use serde::{Deserialize, Serialize};

pub const USERNAME_FIELD: &str = "username";
pub const PASSWORD_FIELD: &str = "password";
pub const DEFAULT_PASSWORD_LENGTH: usize = 12;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PasswordPolicy {
    pub length: usize,
    pub exclude_punctuation: bool,
    pub generate_key: String,
}

impl Default for PasswordPolicy {
    fn default() -> Self {
        Self {
            length: DEFAULT_PASSWORD_LENGTH,
            exclude_punctuation: true,
            generate_key: PASSWORD_FIELD.to_string(),
        }
    }
}

impl PasswordPolicy {
    /// Realizes the policy. This is what the secret store does when the secret
    /// is created; declarations only ever carry the policy itself.
    pub fn generate<R: Rng + ?Sized>(&self, rng: &mut R) -> String {
        (0..self.length)
            .map(|_| char::from(rng.sample(Alphanumeric)))
            .collect()
    }
}

/// Username/password secret. The username is fixed at declaration time, the
/// password is generated by the secret store and never leaves it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CredentialSecret {
    pub logical_id: LogicalId,
    pub username: String,
    pub password_policy: PasswordPolicy,
    pub read_grants: Vec<LogicalId>,
}

impl CredentialSecret {
    pub fn new(logical_id: LogicalId, username: impl Into<String>) -> Self {
        Self {
            logical_id,
            username: username.into(),
            password_policy: PasswordPolicy::default(),
            read_grants: vec![],
        }
    }

    /// JSON document the store fills in with the generated password.
    pub fn secret_string_template(&self) -> serde_json::Value {
        serde_json::json!({ USERNAME_FIELD: self.username })
    }

    pub fn username_ref(&self) -> ResourceRef {
        self.field_ref(USERNAME_FIELD)
    }

    pub fn password_ref(&self) -> ResourceRef {
        self.field_ref(&self.password_policy.generate_key)
    }

    fn field_ref(&self, field: &str) -> ResourceRef {
        ResourceRef::SecretField {
            secret: self.logical_id.clone(),
            field: field.to_string(),
        }
    }

    /// Retrieval handle for running processes.
    pub fn arn_ref(&self) -> ResourceRef {
        ResourceRef::attribute(&self.logical_id, "Arn")
    }

    pub fn grant_read(&mut self, grantee: &LogicalId) {
        if !self.read_grants.contains(grantee) {
            self.read_grants.push(grantee.clone());
        }
    }
}
