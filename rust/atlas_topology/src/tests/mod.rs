#![allow(dead_code)]

use crate::cidr::Ipv4Cidr;
use crate::network::{default_subnet_layout, VpcDescriptor};
use crate::resources::{AttributeResolver, LogicalId};
use crate::topology::{ClusterRequest, TopologyConfig};
use std::collections::HashMap;

pub mod stack;

pub const TEST_REGION: &str = "ap-southeast-2";

pub fn test_vpc() -> VpcDescriptor {
    VpcDescriptor::build(
        LogicalId::new("Vpc"),
        "10.0.0.0/16".parse().expect("valid VPC CIDR"),
        TEST_REGION,
        2,
        1,
        &default_subnet_layout(),
    )
    .expect("Failed to lay out test VPC")
}

pub fn test_topology_config() -> TopologyConfig {
    TopologyConfig {
        org_id: "5f1b2c3d4e5f6a7b8c9d0e1f".to_string(),
        profile: "default".to_string(),
        project_name: Some("my-app-project".to_string()),
        cluster_name: None,
        db_name: "my-app".to_string(),
        db_user_name: "my-app-user".to_string(),
        atlas_cidr: "192.168.8.0/21".parse::<Ipv4Cidr>().expect("valid Atlas CIDR"),
        cluster: ClusterRequest {
            instance_size: "M10".to_string(),
            node_count: 3,
            ebs_volume_type: "STANDARD".to_string(),
            region: TEST_REGION.to_string(),
            auto_scaling: None,
            enable_backup: false,
        },
        access_list: None,
    }
}

/// Deployed state keyed by `<logical id>.<attribute>`.
#[derive(Default)]
pub struct TestResolver {
    pub attributes: HashMap<String, String>,
    pub pseudo: HashMap<String, String>,
}

impl TestResolver {
    pub fn with_attribute(mut self, resource: &LogicalId, attribute: &str, value: &str) -> Self {
        self.attributes
            .insert(format!("{resource}.{attribute}"), value.to_string());
        self
    }
}

impl AttributeResolver for TestResolver {
    fn attribute(&self, resource: &LogicalId, attribute: &str) -> Option<String> {
        self.attributes.get(&format!("{resource}.{attribute}")).cloned()
    }

    fn pseudo(&self, name: &str) -> Option<String> {
        self.pseudo.get(name).cloned()
    }
}
