pub mod deployment;
pub mod mongodb_runner;
