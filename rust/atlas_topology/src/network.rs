//! Caller-side VPC layout that the Atlas topology peers with.

use crate::cidr::Ipv4Cidr;
use crate::errors::{TopologyError, TopologyResult};
use crate::resources::{Declared, DependencyEdge, LogicalId, ResourceRef, EC2_SUBNET, EC2_VPC};
use serde::{Deserialize, Serialize};
use std::net::Ipv4Addr;

pub const DEFAULT_VPC_CIDR: &str = "10.0.0.0/16";
pub const DEFAULT_MAX_AZS: u8 = 2;
pub const DEFAULT_NAT_GATEWAYS: u8 = 1;
pub const DEFAULT_SUBNET_MASK: u8 = 24;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SubnetTier {
    Public,
    PrivateWithEgress,
    PrivateIsolated,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubnetLayout {
    pub name: String,
    pub tier: SubnetTier,
    pub cidr_mask: u8,
}

impl SubnetLayout {
    pub fn new(name: &str, tier: SubnetTier, cidr_mask: u8) -> Self {
        Self {
            name: name.to_string(),
            tier,
            cidr_mask,
        }
    }
}

/// Public, Egress and Private tiers, one /24 per availability zone each.
pub fn default_subnet_layout() -> Vec<SubnetLayout> {
    vec![
        SubnetLayout::new("Public", SubnetTier::Public, DEFAULT_SUBNET_MASK),
        SubnetLayout::new("Egress", SubnetTier::PrivateWithEgress, DEFAULT_SUBNET_MASK),
        SubnetLayout::new("Private", SubnetTier::PrivateIsolated, DEFAULT_SUBNET_MASK),
    ]
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubnetDescriptor {
    pub logical_id: LogicalId,
    pub tier: SubnetTier,
    pub availability_zone: String,
    pub cidr: Ipv4Cidr,
    pub subnet_id: ResourceRef,
    pub route_table_id: ResourceRef,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VpcDescriptor {
    pub logical_id: LogicalId,
    pub cidr: Ipv4Cidr,
    pub region: String,
    pub account: ResourceRef,
    pub vpc_id: ResourceRef,
    pub max_azs: u8,
    pub nat_gateways: u8,
    pub subnets: Vec<SubnetDescriptor>,
}

impl VpcDescriptor {
    /// Lays out `layouts` tier by tier, one subnet per availability zone,
    /// packing blocks in order from the start of `cidr`.
    pub fn build(
        logical_id: LogicalId,
        cidr: Ipv4Cidr,
        region: &str,
        max_azs: u8,
        nat_gateways: u8,
        layouts: &[SubnetLayout],
    ) -> TopologyResult<Self> {
        if max_azs == 0 || max_azs > 26 {
            return Err(TopologyError::Configuration(format!(
                "max_azs must be between 1 and 26, got {max_azs}"
            )));
        }
        let has_public = layouts.iter().any(|l| l.tier == SubnetTier::Public);
        let has_egress = layouts.iter().any(|l| l.tier == SubnetTier::PrivateWithEgress);
        if has_egress && (!has_public || nat_gateways == 0) {
            return Err(TopologyError::Configuration(
                "egress subnets need a public subnet tier and at least one NAT gateway".to_string(),
            ));
        }

        let mut subnets = vec![];
        let mut cursor = u64::from(u32::from(cidr.network()));
        let vpc_end = cursor + (1u64 << (32 - cidr.prefix()));

        for layout in layouts {
            if layout.cidr_mask < cidr.prefix() || layout.cidr_mask > 28 {
                return Err(TopologyError::invalid_cidr(
                    &cidr.to_string(),
                    &format!("subnet mask /{} does not fit", layout.cidr_mask),
                ));
            }
            let size = 1u64 << (32 - layout.cidr_mask);
            for az_index in 0..max_azs {
                // align to the block size of this mask
                cursor = cursor.div_ceil(size) * size;
                if cursor + size > vpc_end {
                    return Err(TopologyError::invalid_cidr(
                        &cidr.to_string(),
                        "not enough address space for the subnet layout",
                    ));
                }
                let block = Ipv4Cidr::new(Ipv4Addr::from(cursor as u32), layout.cidr_mask)?;
                cursor += size;

                let subnet_id = logical_id.child(&format!("{}Subnet{}", layout.name, az_index + 1));
                let az = format!("{}{}", region, char::from(b'a' + az_index));
                subnets.push(SubnetDescriptor {
                    subnet_id: ResourceRef::attribute(&subnet_id, "SubnetId"),
                    route_table_id: ResourceRef::attribute(&subnet_id, "RouteTableId"),
                    logical_id: subnet_id,
                    tier: layout.tier,
                    availability_zone: az,
                    cidr: block,
                });
            }
        }

        log::debug!("VPC {} laid out {} subnets in {}", logical_id, subnets.len(), cidr);

        Ok(Self {
            vpc_id: ResourceRef::attribute(&logical_id, "VpcId"),
            account: ResourceRef::Pseudo("AWS::AccountId".to_string()),
            logical_id,
            cidr,
            region: region.to_string(),
            max_azs,
            nat_gateways,
            subnets,
        })
    }

    pub fn subnets_of(&self, tier: SubnetTier) -> impl Iterator<Item = &SubnetDescriptor> {
        self.subnets.iter().filter(move |s| s.tier == tier)
    }

    pub fn declarations(&self) -> Vec<Declared> {
        let mut declared = vec![Declared::new(&self.logical_id, EC2_VPC)];
        declared.extend(
            self.subnets
                .iter()
                .map(|s| Declared::new(&s.logical_id, EC2_SUBNET)),
        );
        declared
    }

    pub fn edges(&self) -> Vec<DependencyEdge> {
        self.subnets
            .iter()
            .map(|s| DependencyEdge::new(&s.logical_id, &self.logical_id))
            .collect()
    }
}
