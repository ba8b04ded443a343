//! Post-deployment diagnostic that proves a MongoDB Atlas cluster is
//! reachable from inside the peered VPC.
//!
//! The probe reads its settings from the function environment, pulls the
//! database credentials from the secret store, pings the cluster and lists
//! the collections of the target database. Every outcome is reported as a
//! [`response::ProbeResponse`] envelope; nothing is retried.

pub mod config;
pub mod connection;
pub mod credentials;
pub mod errors;
pub mod probe;
pub mod response;

pub use errors::{ProbeError, ProbeResult};

#[cfg(test)]
mod tests;
