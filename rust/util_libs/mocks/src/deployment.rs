//! A synthesized deployment plan plus the engine-side state a real
//! deployment would assign to it.

use atlas_topology::connection::STANDARD_SRV_ATTRIBUTE;
use atlas_topology::defaults::SeededSuffix;
use atlas_topology::resources::{AttributeResolver, LogicalId};
use atlas_topology::secret::{CredentialSecret, PASSWORD_FIELD, USERNAME_FIELD};
use atlas_topology::stack::{synthesize, DeploymentPlan, StackConfig};
use std::collections::HashMap;

pub const TEST_STACK_NAME: &str = "MongodbAtlasVpcPeeringStack";
pub const TEST_ORG_ID: &str = "5f1b2c3d4e5f6a7b8c9d0e1f";
pub const TEST_CLUSTER_HOST: &str = "atlas-cluster-test.ab1cd.mongodb.net";
pub const TEST_ACCOUNT_ID: &str = "123456789012";

/// Stands in for the provisioning engine's view of created resources.
#[derive(Debug, Default, Clone)]
pub struct FakeEngine {
    attributes: HashMap<String, String>,
    pseudo: HashMap<String, String>,
}

impl FakeEngine {
    pub fn set(&mut self, resource: &LogicalId, attribute: &str, value: impl Into<String>) {
        self.attributes
            .insert(format!("{resource}.{attribute}"), value.into());
    }
}

impl AttributeResolver for FakeEngine {
    fn attribute(&self, resource: &LogicalId, attribute: &str) -> Option<String> {
        self.attributes
            .get(&format!("{resource}.{attribute}"))
            .cloned()
    }

    fn pseudo(&self, name: &str) -> Option<String> {
        self.pseudo.get(name).cloned()
    }
}

pub struct DeployedStack {
    pub plan: DeploymentPlan,
    pub engine: FakeEngine,
}

impl DeployedStack {
    /// Synthesizes the default stack with deterministic names and fills in
    /// the attributes the probe function environment reads.
    pub fn new() -> anyhow::Result<Self> {
        let config = StackConfig::new(TEST_STACK_NAME, TEST_ORG_ID, "default")?;
        let plan = synthesize(&config, &SeededSuffix::new(TEST_STACK_NAME))?;

        let mut engine = FakeEngine::default();
        engine.set(
            &plan.atlas.cluster.logical_id,
            STANDARD_SRV_ATTRIBUTE,
            format!("mongodb+srv://{TEST_CLUSTER_HOST}"),
        );
        engine.set(
            &plan.atlas.secret.logical_id,
            "Arn",
            format!(
                "arn:aws:secretsmanager:{}:{TEST_ACCOUNT_ID}:secret:{}-AbCdEf",
                plan.region,
                plan.atlas.secret.logical_id.as_str().replace('/', "-")
            ),
        );
        engine
            .pseudo
            .insert("AWS::AccountId".to_string(), TEST_ACCOUNT_ID.to_string());

        Ok(Self { plan, engine })
    }

    /// Function environment as the engine would render it.
    pub fn function_environment(&self) -> anyhow::Result<HashMap<String, String>> {
        self.plan
            .probe_function
            .environment
            .iter()
            .map(|(key, value)| -> anyhow::Result<(String, String)> {
                Ok((key.clone(), value.resolve(&self.engine)?))
            })
            .collect()
    }

    pub fn secret_arn(&self) -> anyhow::Result<String> {
        Ok(self.plan.atlas.secret.arn_ref().resolve(&self.engine)?)
    }

    /// Secret string the store creates from the declared policy.
    pub fn realize_secret(&self) -> String {
        realize_secret(&self.plan.atlas.secret)
    }
}

pub fn realize_secret(secret: &CredentialSecret) -> String {
    let password = secret.password_policy.generate(&mut rand::rng());
    serde_json::json!({
        USERNAME_FIELD: secret.username,
        PASSWORD_FIELD: password,
    })
    .to_string()
}
