//! The deployment stack: VPC, Atlas topology, the connectivity-probe function
//! wired to the cluster, and the stack outputs.

use crate::access_list::AccessListEntry;
use crate::cidr::Ipv4Cidr;
use crate::defaults::NameAllocator;
use crate::errors::{TopologyError, TopologyResult};
use crate::network::{self, SubnetTier, VpcDescriptor};
use crate::resources::{Declared, DependencyEdge, LogicalId, ResourceRef, LAMBDA_FUNCTION};
use crate::topology::{AtlasTopology, AtlasTopologyBuilder, AutoScaling, ClusterRequest, TopologyConfig};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap, VecDeque};

pub const DEFAULT_REGION: &str = "ap-southeast-2";
pub const DEFAULT_DB_NAME: &str = "my-app";
pub const DEFAULT_DB_USER_NAME: &str = "my-app-user";
pub const DEFAULT_PROJECT_NAME: &str = "my-app-project";
pub const DEFAULT_ATLAS_CIDR: &str = "192.168.8.0/21";
pub const DEFAULT_EBS_VOLUME_TYPE: &str = "STANDARD";
pub const DEFAULT_INSTANCE_SIZE: &str = "M10";
pub const DEFAULT_NODE_COUNT: u8 = 3;

pub const CLUSTER_SCOPE: &str = "MongoDBCluster";
pub const PROBE_FUNCTION_ID: &str = "MongoDBConnectivityTest";
pub const PROBE_RUNTIME: &str = "provided.al2023";
pub const PROBE_HANDLER: &str = "bootstrap";
pub const PROBE_TIMEOUT_SECS: u32 = 30;
pub const PROBE_MEMORY_MB: u32 = 256;
pub const PROBE_DESCRIPTION: &str =
    "Lambda function to test MongoDB Atlas connectivity through VPC peering";

pub const ENV_HOST_NAME: &str = "MONGODB_HOST_NAME";
pub const ENV_DB_NAME: &str = "MONGODB_DB_NAME";
pub const ENV_SECRET_ARN: &str = "MONGODB_SECRET_ARN";

pub const OUTPUT_FUNCTION_ARN: &str = "ConnectivityTestLambdaArn";
pub const OUTPUT_FUNCTION_NAME: &str = "ConnectivityTestLambdaName";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StackConfig {
    pub stack_name: String,
    pub region: String,
    pub atlas_org_id: String,
    pub atlas_profile: String,
    pub project_name: Option<String>,
    pub cluster_name: Option<String>,
    pub db_name: String,
    pub db_user_name: String,
    pub atlas_cidr: Ipv4Cidr,
    pub vpc_cidr: Ipv4Cidr,
    pub max_azs: u8,
    pub nat_gateways: u8,
    pub ebs_volume_type: String,
    pub instance_size: String,
    pub node_count: u8,
    pub enable_backup: bool,
    pub auto_scaling: Option<AutoScaling>,
    pub access_list: Option<Vec<AccessListEntry>>,
}

impl StackConfig {
    /// Stack defaults with the Atlas organization and profile filled in.
    pub fn new(stack_name: &str, atlas_org_id: &str, atlas_profile: &str) -> TopologyResult<Self> {
        Ok(Self {
            stack_name: stack_name.to_string(),
            region: DEFAULT_REGION.to_string(),
            atlas_org_id: atlas_org_id.to_string(),
            atlas_profile: atlas_profile.to_string(),
            project_name: Some(DEFAULT_PROJECT_NAME.to_string()),
            cluster_name: None,
            db_name: DEFAULT_DB_NAME.to_string(),
            db_user_name: DEFAULT_DB_USER_NAME.to_string(),
            atlas_cidr: DEFAULT_ATLAS_CIDR.parse()?,
            vpc_cidr: network::DEFAULT_VPC_CIDR.parse()?,
            max_azs: network::DEFAULT_MAX_AZS,
            nat_gateways: network::DEFAULT_NAT_GATEWAYS,
            ebs_volume_type: DEFAULT_EBS_VOLUME_TYPE.to_string(),
            instance_size: DEFAULT_INSTANCE_SIZE.to_string(),
            node_count: DEFAULT_NODE_COUNT,
            enable_backup: false,
            auto_scaling: None,
            access_list: None,
        })
    }

    pub fn topology_config(&self) -> TopologyConfig {
        TopologyConfig {
            org_id: self.atlas_org_id.clone(),
            profile: self.atlas_profile.clone(),
            project_name: self.project_name.clone(),
            cluster_name: self.cluster_name.clone(),
            db_name: self.db_name.clone(),
            db_user_name: self.db_user_name.clone(),
            atlas_cidr: self.atlas_cidr,
            cluster: ClusterRequest {
                instance_size: self.instance_size.clone(),
                node_count: self.node_count,
                ebs_volume_type: self.ebs_volume_type.clone(),
                region: self.region.clone(),
                auto_scaling: self.auto_scaling.clone(),
                enable_backup: self.enable_backup,
            },
            access_list: self.access_list.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FunctionDescriptor {
    pub logical_id: LogicalId,
    pub runtime: String,
    pub handler: String,
    pub subnets: Vec<LogicalId>,
    pub environment: BTreeMap<String, ResourceRef>,
    pub timeout_secs: u32,
    pub memory_mb: u32,
    pub description: String,
}

impl FunctionDescriptor {
    pub fn function_arn(&self) -> ResourceRef {
        ResourceRef::attribute(&self.logical_id, "Arn")
    }

    pub fn function_name(&self) -> ResourceRef {
        ResourceRef::attribute(&self.logical_id, "FunctionName")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StackOutput {
    pub name: String,
    pub value: ResourceRef,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeploymentPlan {
    pub stack_name: String,
    pub region: String,
    pub vpc: VpcDescriptor,
    pub atlas: AtlasTopology,
    pub probe_function: FunctionDescriptor,
    pub outputs: Vec<StackOutput>,
    pub declarations: Vec<Declared>,
    pub edges: Vec<DependencyEdge>,
    pub creation_order: Vec<LogicalId>,
}

impl DeploymentPlan {
    pub fn to_json(&self) -> TopologyResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn output(&self, name: &str) -> Option<&StackOutput> {
        self.outputs.iter().find(|o| o.name == name)
    }

    /// Position of `id` in the creation order.
    pub fn position(&self, id: &LogicalId) -> Option<usize> {
        self.creation_order.iter().position(|o| o == id)
    }
}

pub fn synthesize(config: &StackConfig, allocator: &dyn NameAllocator) -> TopologyResult<DeploymentPlan> {
    log::debug!("Synthesizing stack {} in {}", config.stack_name, config.region);

    let vpc = VpcDescriptor::build(
        LogicalId::new("Vpc"),
        config.vpc_cidr,
        &config.region,
        config.max_azs,
        config.nat_gateways,
        &network::default_subnet_layout(),
    )?;

    let builder = AtlasTopologyBuilder::new(LogicalId::new(CLUSTER_SCOPE), allocator);
    let mut atlas = builder.provision(&config.topology_config(), &vpc)?;

    let probe_function = probe_function(&atlas, &vpc);
    atlas.secret.grant_read(&probe_function.logical_id);

    let outputs = vec![
        StackOutput {
            name: OUTPUT_FUNCTION_ARN.to_string(),
            value: probe_function.function_arn(),
            description: "ARN of the MongoDB connectivity test Lambda function".to_string(),
        },
        StackOutput {
            name: OUTPUT_FUNCTION_NAME.to_string(),
            value: probe_function.function_name(),
            description: "Name of the MongoDB connectivity test Lambda function".to_string(),
        },
    ];

    let mut declarations = vpc.declarations();
    declarations.extend(atlas.declarations());
    declarations.push(Declared::new(&probe_function.logical_id, LAMBDA_FUNCTION));

    let mut edges = vpc.edges();
    edges.extend(atlas.edges.iter().cloned());
    edges.extend(function_edges(&probe_function));

    let creation_order = dependency_order(&declarations, &edges)?;

    Ok(DeploymentPlan {
        stack_name: config.stack_name.clone(),
        region: config.region.clone(),
        vpc,
        atlas,
        probe_function,
        outputs,
        declarations,
        edges,
        creation_order,
    })
}

fn probe_function(atlas: &AtlasTopology, vpc: &VpcDescriptor) -> FunctionDescriptor {
    let connection = atlas.connection_info();
    let mut environment = BTreeMap::new();
    environment.insert(ENV_HOST_NAME.to_string(), connection.connection_hostname());
    environment.insert(
        ENV_DB_NAME.to_string(),
        ResourceRef::literal(connection.default_db_name()),
    );
    environment.insert(ENV_SECRET_ARN.to_string(), atlas.secret.arn_ref());

    FunctionDescriptor {
        logical_id: LogicalId::new(PROBE_FUNCTION_ID),
        runtime: PROBE_RUNTIME.to_string(),
        handler: PROBE_HANDLER.to_string(),
        subnets: vpc
            .subnets_of(SubnetTier::PrivateWithEgress)
            .map(|s| s.logical_id.clone())
            .collect(),
        environment,
        timeout_secs: PROBE_TIMEOUT_SECS,
        memory_mb: PROBE_MEMORY_MB,
        description: PROBE_DESCRIPTION.to_string(),
    }
}

/// The function waits for everything its environment and subnets read from.
fn function_edges(function: &FunctionDescriptor) -> Vec<DependencyEdge> {
    let mut targets: BTreeSet<&LogicalId> = function.subnets.iter().collect();
    for value in function.environment.values() {
        targets.extend(value.referenced_resources());
    }
    targets
        .into_iter()
        .map(|to| DependencyEdge::new(&function.logical_id, to))
        .collect()
}

/// Kahn's algorithm over the declarations; ties are broken by declaration
/// order so the result is stable.
pub fn dependency_order(
    declarations: &[Declared],
    edges: &[DependencyEdge],
) -> TopologyResult<Vec<LogicalId>> {
    let index: HashMap<&LogicalId, usize> = declarations
        .iter()
        .enumerate()
        .map(|(i, d)| (&d.logical_id, i))
        .collect();

    let mut in_degree = vec![0usize; declarations.len()];
    let mut dependents: Vec<Vec<usize>> = vec![vec![]; declarations.len()];
    for edge in edges {
        let from = *index.get(&edge.from).ok_or_else(|| {
            TopologyError::UnresolvedReference(format!("undeclared resource {}", edge.from))
        })?;
        let to = *index.get(&edge.to).ok_or_else(|| {
            TopologyError::UnresolvedReference(format!("undeclared resource {}", edge.to))
        })?;
        in_degree[from] += 1;
        dependents[to].push(from);
    }

    let mut queue: VecDeque<usize> = (0..declarations.len())
        .filter(|&i| in_degree[i] == 0)
        .collect();
    let mut order = Vec::with_capacity(declarations.len());

    while let Some(i) = queue.pop_front() {
        order.push(declarations[i].logical_id.clone());
        let mut ready = vec![];
        for &dependent in &dependents[i] {
            in_degree[dependent] -= 1;
            if in_degree[dependent] == 0 {
                ready.push(dependent);
            }
        }
        ready.sort_unstable();
        queue.extend(ready);
    }

    if order.len() < declarations.len() {
        let stuck = (0..declarations.len())
            .find(|&i| in_degree[i] > 0)
            .map(|i| declarations[i].logical_id.to_string())
            .unwrap_or_else(|| "unknown".to_string());
        return Err(TopologyError::DependencyCycle(stuck));
    }

    Ok(order)
}
