//! Atlas project, peering and cluster declarations.
//!
//! [`AtlasTopologyBuilder::provision`] validates the request, fills in
//! defaults and returns an immutable [`AtlasTopology`] together with the
//! dependency edges the provisioning engine must honour. It has no side
//! effects; a rejected request leaves nothing behind.

use crate::access_list::{compose_access_list, AccessListEntry};
use crate::cidr::Ipv4Cidr;
use crate::connection::ConnectionInfo;
use crate::defaults::{
    self, resolve_name, DatabaseRole, NameAllocator, CLUSTER_NAME_PREFIX, PROJECT_NAME_PREFIX,
};
use crate::errors::{TopologyError, TopologyResult};
use crate::network::{SubnetTier, VpcDescriptor};
use crate::resources::{
    Declared, DependencyEdge, LogicalId, ResourceRef, ATLAS_CLUSTER, ATLAS_DATABASE_USER,
    ATLAS_IP_ACCESS_LIST, ATLAS_NETWORK_CONTAINER, ATLAS_NETWORK_PEERING, ATLAS_PROJECT,
    EC2_ROUTE, SECRETS_MANAGER_SECRET,
};
use crate::secret::CredentialSecret;
use crate::validator::validate_instance_size;
use serde::{Deserialize, Serialize};

pub const PROVIDER_NAME: &str = "AWS";
pub const REGION_PRIORITY: u8 = 7;
pub const ROUTE_ID_PREFIX: &str = "AwsPeerToAtlasRoute";

/// `ap-southeast-2` -> `AP_SOUTHEAST_2`
pub fn atlas_region_name(region: &str) -> String {
    region.to_uppercase().replace('-', "_")
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComputeAutoScaling {
    pub enabled: bool,
    pub scale_down_enabled: bool,
    pub min_instance_size: Option<String>,
    pub max_instance_size: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AutoScaling {
    pub compute: Option<ComputeAutoScaling>,
    pub disk_gb_enabled: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClusterRequest {
    pub instance_size: String,
    pub node_count: u8,
    pub ebs_volume_type: String,
    pub region: String,
    pub auto_scaling: Option<AutoScaling>,
    pub enable_backup: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TopologyConfig {
    pub org_id: String,
    pub profile: String,
    pub project_name: Option<String>,
    pub cluster_name: Option<String>,
    pub db_name: String,
    pub db_user_name: String,
    pub atlas_cidr: Ipv4Cidr,
    pub cluster: ClusterRequest,
    pub access_list: Option<Vec<AccessListEntry>>,
}

/// Point-in-time recovery, scheduled backups and termination protection
/// always move together.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackupPolicy {
    pub pit_enabled: bool,
    pub backup_enabled: bool,
    pub termination_protection_enabled: bool,
}

impl BackupPolicy {
    pub fn bundle(enabled: bool) -> Self {
        Self {
            pit_enabled: enabled,
            backup_enabled: enabled,
            termination_protection_enabled: enabled,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectDescriptor {
    pub logical_id: LogicalId,
    pub name: String,
    pub org_id: String,
    pub profile: String,
}

impl ProjectDescriptor {
    pub fn project_id(&self) -> ResourceRef {
        ResourceRef::attribute(&self.logical_id, "Id")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkContainerDescriptor {
    pub logical_id: LogicalId,
    pub project_id: ResourceRef,
    pub vpc_id: ResourceRef,
    pub atlas_cidr_block: Ipv4Cidr,
    pub region_name: String,
    pub profile: String,
}

impl NetworkContainerDescriptor {
    pub fn container_id(&self) -> ResourceRef {
        ResourceRef::attribute(&self.logical_id, "Id")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkPeeringDescriptor {
    pub logical_id: LogicalId,
    pub project_id: ResourceRef,
    pub container_id: ResourceRef,
    pub vpc_id: ResourceRef,
    pub accepter_region_name: String,
    pub aws_account_id: ResourceRef,
    pub route_table_cidr_block: Ipv4Cidr,
    pub profile: String,
}

impl NetworkPeeringDescriptor {
    pub fn connection_id(&self) -> ResourceRef {
        ResourceRef::attribute(&self.logical_id, "ConnectionId")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ElectableSpecs {
    pub ebs_volume_type: String,
    pub instance_size: String,
    pub node_count: u8,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegionConfig {
    pub electable_specs: ElectableSpecs,
    pub priority: u8,
    pub region_name: String,
    pub provider_name: String,
    pub backing_provider_name: String,
    pub auto_scaling: Option<AutoScaling>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplicationSpec {
    pub num_shards: u8,
    pub region_configs: Vec<RegionConfig>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClusterDescriptor {
    pub logical_id: LogicalId,
    pub name: String,
    pub project_id: ResourceRef,
    pub cluster_type: String,
    pub profile: String,
    #[serde(flatten)]
    pub backup: BackupPolicy,
    pub replication_specs: Vec<ReplicationSpec>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DatabaseUserDescriptor {
    pub logical_id: LogicalId,
    pub project_id: ResourceRef,
    pub username: ResourceRef,
    pub password: ResourceRef,
    pub database_name: String,
    pub roles: Vec<DatabaseRole>,
    pub profile: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IpAccessListDescriptor {
    pub logical_id: LogicalId,
    pub project_id: ResourceRef,
    pub access_list: Vec<AccessListEntry>,
    pub profile: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteDescriptor {
    pub logical_id: LogicalId,
    pub subnet: LogicalId,
    pub route_table_id: ResourceRef,
    pub destination_cidr_block: Ipv4Cidr,
    pub vpc_peering_connection_id: ResourceRef,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AtlasTopology {
    pub scope: LogicalId,
    pub secret: CredentialSecret,
    pub project: ProjectDescriptor,
    pub network_container: NetworkContainerDescriptor,
    pub network_peering: NetworkPeeringDescriptor,
    pub cluster: ClusterDescriptor,
    pub database_user: DatabaseUserDescriptor,
    pub access_list: IpAccessListDescriptor,
    pub routes: Vec<RouteDescriptor>,
    pub edges: Vec<DependencyEdge>,
    db_name: String,
}

impl AtlasTopology {
    pub fn connection_info(&self) -> ConnectionInfo {
        ConnectionInfo::new(&self.cluster.logical_id, &self.db_name)
    }

    pub fn default_db_name(&self) -> &str {
        &self.db_name
    }

    pub fn username_ref(&self) -> ResourceRef {
        self.secret.username_ref()
    }

    pub fn password_ref(&self) -> ResourceRef {
        self.secret.password_ref()
    }

    /// Every declaration in creation-agnostic order.
    pub fn declarations(&self) -> Vec<Declared> {
        let mut declared = vec![
            Declared::new(&self.secret.logical_id, SECRETS_MANAGER_SECRET),
            Declared::new(&self.project.logical_id, ATLAS_PROJECT),
            Declared::new(&self.network_container.logical_id, ATLAS_NETWORK_CONTAINER),
            Declared::new(&self.network_peering.logical_id, ATLAS_NETWORK_PEERING),
            Declared::new(&self.cluster.logical_id, ATLAS_CLUSTER),
            Declared::new(&self.database_user.logical_id, ATLAS_DATABASE_USER),
            Declared::new(&self.access_list.logical_id, ATLAS_IP_ACCESS_LIST),
        ];
        declared.extend(
            self.routes
                .iter()
                .map(|r| Declared::new(&r.logical_id, EC2_ROUTE)),
        );
        declared
    }
}

pub struct AtlasTopologyBuilder<'a> {
    scope: LogicalId,
    allocator: &'a dyn NameAllocator,
}

impl<'a> AtlasTopologyBuilder<'a> {
    pub fn new(scope: LogicalId, allocator: &'a dyn NameAllocator) -> Self {
        Self { scope, allocator }
    }

    pub fn provision(
        &self,
        config: &TopologyConfig,
        vpc: &VpcDescriptor,
    ) -> TopologyResult<AtlasTopology> {
        validate_instance_size(&config.cluster.instance_size)?;
        if config.atlas_cidr.overlaps(&vpc.cidr) {
            return Err(TopologyError::OverlappingCidr {
                atlas: config.atlas_cidr.to_string(),
                vpc: vpc.cidr.to_string(),
            });
        }
        if config.org_id.trim().is_empty() {
            return Err(TopologyError::Configuration(
                "Atlas organization id is required".to_string(),
            ));
        }

        let region_name = atlas_region_name(&config.cluster.region);
        let profile = config.profile.clone();
        let access_list = compose_access_list(
            &vpc.cidr.to_string(),
            config.access_list.as_deref(),
        );

        let secret = CredentialSecret::new(self.scope.child("DatabaseSecret"), &config.db_user_name);

        let project = ProjectDescriptor {
            logical_id: self.scope.child("Project"),
            name: resolve_name(
                config.project_name.as_deref(),
                PROJECT_NAME_PREFIX,
                self.allocator,
            )?,
            org_id: config.org_id.clone(),
            profile: profile.clone(),
        };

        let network_container = NetworkContainerDescriptor {
            logical_id: self.scope.child("NetworkContainer"),
            project_id: project.project_id(),
            vpc_id: vpc.vpc_id.clone(),
            atlas_cidr_block: config.atlas_cidr,
            region_name: region_name.clone(),
            profile: profile.clone(),
        };

        let network_peering = NetworkPeeringDescriptor {
            logical_id: self.scope.child("NetworkPeering"),
            project_id: project.project_id(),
            container_id: network_container.container_id(),
            vpc_id: vpc.vpc_id.clone(),
            accepter_region_name: vpc.region.clone(),
            aws_account_id: vpc.account.clone(),
            route_table_cidr_block: vpc.cidr,
            profile: profile.clone(),
        };

        let cluster = ClusterDescriptor {
            logical_id: self.scope.child("Cluster"),
            name: resolve_name(
                config.cluster_name.as_deref(),
                CLUSTER_NAME_PREFIX,
                self.allocator,
            )?,
            project_id: project.project_id(),
            cluster_type: defaults::CLUSTER_TYPE.to_string(),
            profile: profile.clone(),
            backup: BackupPolicy::bundle(config.cluster.enable_backup),
            replication_specs: vec![ReplicationSpec {
                num_shards: 1,
                region_configs: vec![RegionConfig {
                    electable_specs: ElectableSpecs {
                        ebs_volume_type: config.cluster.ebs_volume_type.clone(),
                        instance_size: config.cluster.instance_size.clone(),
                        node_count: config.cluster.node_count,
                    },
                    priority: REGION_PRIORITY,
                    region_name: region_name.clone(),
                    provider_name: PROVIDER_NAME.to_string(),
                    backing_provider_name: PROVIDER_NAME.to_string(),
                    auto_scaling: config.cluster.auto_scaling.clone(),
                }],
            }],
        };

        let database_user = DatabaseUserDescriptor {
            logical_id: self.scope.child("User"),
            project_id: project.project_id(),
            username: secret.username_ref(),
            password: secret.password_ref(),
            database_name: defaults::DEFAULT_USER_DB_NAME.to_string(),
            roles: defaults::default_roles(),
            profile: profile.clone(),
        };

        let access_list = IpAccessListDescriptor {
            logical_id: self.scope.child("IpAccess"),
            project_id: project.project_id(),
            access_list,
            profile,
        };

        let routes: Vec<RouteDescriptor> = vpc
            .subnets_of(SubnetTier::PrivateWithEgress)
            .enumerate()
            .map(|(index, subnet)| RouteDescriptor {
                logical_id: self.scope.child(&format!("{ROUTE_ID_PREFIX}{index}")),
                subnet: subnet.logical_id.clone(),
                route_table_id: subnet.route_table_id.clone(),
                destination_cidr_block: config.atlas_cidr,
                vpc_peering_connection_id: network_peering.connection_id(),
            })
            .collect();

        let mut edges = vec![
            DependencyEdge::new(&network_container.logical_id, &project.logical_id),
            DependencyEdge::new(&network_container.logical_id, &vpc.logical_id),
            DependencyEdge::new(&network_peering.logical_id, &project.logical_id),
            DependencyEdge::new(&network_peering.logical_id, &network_container.logical_id),
            DependencyEdge::new(&network_peering.logical_id, &vpc.logical_id),
            DependencyEdge::new(&cluster.logical_id, &project.logical_id),
            // peering must be in place before the cluster is created
            DependencyEdge::new(&cluster.logical_id, &network_container.logical_id),
            DependencyEdge::new(&cluster.logical_id, &network_peering.logical_id),
            DependencyEdge::new(&database_user.logical_id, &project.logical_id),
            DependencyEdge::new(&database_user.logical_id, &secret.logical_id),
            DependencyEdge::new(&access_list.logical_id, &project.logical_id),
        ];
        for route in &routes {
            edges.push(DependencyEdge::new(&route.logical_id, &network_peering.logical_id));
            edges.push(DependencyEdge::new(&route.logical_id, &route.subnet));
        }

        log::info!(
            "Declared Atlas project '{}' with cluster '{}' ({} routes, {} access list entries)",
            project.name,
            cluster.name,
            routes.len(),
            access_list.access_list.len()
        );

        Ok(AtlasTopology {
            scope: self.scope.clone(),
            secret,
            project,
            network_container,
            network_peering,
            cluster,
            database_user,
            access_list,
            routes,
            edges,
            db_name: config.db_name.clone(),
        })
    }
}
