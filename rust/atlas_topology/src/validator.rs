use crate::errors::{TopologyError, TopologyResult};

/// Shared tiers cannot join a network peering connection.
pub const SHARED_TIER_SIZES: [&str; 3] = ["M0", "M2", "M5"];

pub fn is_shared_tier(instance_size: &str) -> bool {
    SHARED_TIER_SIZES.contains(&instance_size)
}

pub fn validate_instance_size(instance_size: &str) -> TopologyResult<()> {
    if is_shared_tier(instance_size) {
        log::error!("Rejecting shared tier instance size {}", instance_size);
        return Err(TopologyError::UnsupportedInstanceSize {
            size: instance_size.to_string(),
        });
    }
    Ok(())
}
