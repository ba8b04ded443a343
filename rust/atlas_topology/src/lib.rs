//! Declares a MongoDB Atlas cluster reachable over AWS VPC peering and
//! synthesizes the deployment plan a provisioning engine executes.
//!
//! ```rust,no_run
//! use atlas_topology::defaults::SeededSuffix;
//! use atlas_topology::stack::{synthesize, StackConfig};
//!
//! fn example() -> anyhow::Result<()> {
//!     let config = StackConfig::new("MongodbAtlasVpcPeeringStack", "my-org-id", "default")?;
//!     let plan = synthesize(&config, &SeededSuffix::new("MongodbAtlasVpcPeeringStack"))?;
//!     println!("{}", plan.to_json()?);
//!     Ok(())
//! }
//! ```

pub mod access_list;
pub mod cidr;
pub mod connection;
pub mod defaults;
pub mod errors;
pub mod network;
pub mod resources;
pub mod secret;
pub mod stack;
pub mod topology;
pub mod validator;

pub use errors::{TopologyError, TopologyResult};

#[cfg(test)]
mod tests;
