/*
Synthesizes the Atlas VPC-peering deployment plan and writes it as JSON.

    ATLAS_ORG_ID=<org> atlas-synth --atlas-profile default --out plan.json
*/

use std::path::PathBuf;

use anyhow::{Context, Result};
use atlas_topology::access_list::AccessListEntry;
use atlas_topology::cidr::Ipv4Cidr;
use atlas_topology::defaults::{NameAllocator, RandomSuffix, SeededSuffix};
use atlas_topology::stack::{self, synthesize, StackConfig};
use clap::Parser;
use dotenv::dotenv;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[arg(long, env = "STACK_NAME", default_value = "MongodbAtlasVpcPeeringStack")]
    stack_name: String,

    /// Stack region, also used for the Atlas cluster region
    #[arg(long, env = "AWS_REGION", default_value = stack::DEFAULT_REGION)]
    region: String,

    #[arg(long, env = "ATLAS_ORG_ID")]
    atlas_org_id: String,

    /// Atlas API key profile used by the resource provider
    #[arg(long, env = "ATLAS_PROFILE", default_value = "default")]
    atlas_profile: String,

    #[arg(long, default_value = stack::DEFAULT_PROJECT_NAME)]
    project_name: String,

    /// Generated when omitted
    #[arg(long)]
    cluster_name: Option<String>,

    #[arg(long, default_value = stack::DEFAULT_DB_NAME)]
    db_name: String,

    #[arg(long, default_value = stack::DEFAULT_DB_USER_NAME)]
    db_user_name: String,

    #[arg(long, default_value = stack::DEFAULT_ATLAS_CIDR)]
    atlas_cidr: Ipv4Cidr,

    #[arg(long)]
    vpc_cidr: Option<Ipv4Cidr>,

    #[arg(long, default_value = stack::DEFAULT_INSTANCE_SIZE)]
    instance_size: String,

    #[arg(long, default_value_t = stack::DEFAULT_NODE_COUNT)]
    node_count: u8,

    #[arg(long, default_value = stack::DEFAULT_EBS_VOLUME_TYPE)]
    ebs_volume_type: String,

    /// Enables backups, point-in-time recovery and termination protection
    #[arg(long)]
    enable_backup: bool,

    /// Extra access list entries as `<cidr>[=<comment>]`
    #[arg(long = "access-list", value_parser = try_parse_access_entry)]
    access_list: Vec<AccessListEntry>,

    /// Derive generated names from this seed instead of a random suffix
    #[arg(long, env = "ATLAS_NAME_SEED")]
    name_seed: Option<String>,

    /// Write the plan here instead of stdout
    #[arg(long)]
    out: Option<PathBuf>,
}

fn try_parse_access_entry(input: &str) -> Result<AccessListEntry> {
    let (cidr, comment) = match input.split_once('=') {
        Some((cidr, comment)) => (cidr, comment),
        None => (input, ""),
    };
    let cidr: Ipv4Cidr = cidr.parse()?;
    Ok(AccessListEntry::new(cidr.to_string(), comment))
}

fn main() -> Result<()> {
    dotenv().ok();
    env_logger::init();

    let cli = Cli::parse();

    let mut config = StackConfig::new(&cli.stack_name, &cli.atlas_org_id, &cli.atlas_profile)?;
    config.region = cli.region;
    config.project_name = Some(cli.project_name);
    config.cluster_name = cli.cluster_name;
    config.db_name = cli.db_name;
    config.db_user_name = cli.db_user_name;
    config.atlas_cidr = cli.atlas_cidr;
    if let Some(vpc_cidr) = cli.vpc_cidr {
        config.vpc_cidr = vpc_cidr;
    }
    config.instance_size = cli.instance_size;
    config.node_count = cli.node_count;
    config.ebs_volume_type = cli.ebs_volume_type;
    config.enable_backup = cli.enable_backup;
    if !cli.access_list.is_empty() {
        config.access_list = Some(cli.access_list);
    }

    let allocator: Box<dyn NameAllocator> = match cli.name_seed {
        Some(seed) => Box::new(SeededSuffix::new(seed)),
        None => Box::new(RandomSuffix),
    };

    let plan = synthesize(&config, allocator.as_ref()).context("synthesizing deployment plan")?;
    let json = plan.to_json()?;

    match cli.out {
        Some(path) => {
            std::fs::write(&path, json).context(format!("writing plan to {path:?}"))?;
            log::info!(
                "Wrote {} declarations for stack {} to {:?}",
                plan.declarations.len(),
                plan.stack_name,
                path
            );
        }
        None => println!("{json}"),
    }

    Ok(())
}
