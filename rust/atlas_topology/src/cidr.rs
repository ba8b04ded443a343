//! IPv4 CIDR block value object.
//!
//! Blocks are normalized on construction (host bits cleared), so two blocks
//! naming the same network compare equal regardless of how they were written.

use crate::errors::{TopologyError, TopologyResult};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::net::Ipv4Addr;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Ipv4Cidr {
    network: Ipv4Addr,
    prefix: u8,
}

impl Ipv4Cidr {
    pub fn new(address: Ipv4Addr, prefix: u8) -> TopologyResult<Self> {
        if prefix > 32 {
            return Err(TopologyError::invalid_cidr(
                &format!("{address}/{prefix}"),
                "prefix length must be 0-32",
            ));
        }
        let network = Ipv4Addr::from(u32::from(address) & Self::mask(prefix));
        Ok(Self { network, prefix })
    }

    fn mask(prefix: u8) -> u32 {
        if prefix == 0 {
            0
        } else {
            u32::MAX << (32 - u32::from(prefix))
        }
    }

    pub fn network(&self) -> Ipv4Addr {
        self.network
    }

    pub fn prefix(&self) -> u8 {
        self.prefix
    }

    fn first(&self) -> u32 {
        u32::from(self.network)
    }

    fn last(&self) -> u32 {
        self.first() | !Self::mask(self.prefix)
    }

    pub fn contains(&self, addr: Ipv4Addr) -> bool {
        let addr = u32::from(addr);
        addr >= self.first() && addr <= self.last()
    }

    pub fn overlaps(&self, other: &Ipv4Cidr) -> bool {
        self.first() <= other.last() && other.first() <= self.last()
    }

    /// Returns the `index`-th child block of length `child_prefix` inside this block.
    pub fn subnet(&self, child_prefix: u8, index: u32) -> TopologyResult<Ipv4Cidr> {
        if child_prefix < self.prefix || child_prefix > 32 {
            return Err(TopologyError::invalid_cidr(
                &self.to_string(),
                &format!("cannot carve /{child_prefix} blocks from a /{}", self.prefix),
            ));
        }
        let available = 1u64 << (child_prefix - self.prefix);
        if u64::from(index) >= available {
            return Err(TopologyError::invalid_cidr(
                &self.to_string(),
                &format!("block has room for {available} /{child_prefix} subnets, index {index} requested"),
            ));
        }
        let size = 1u64 << (32 - child_prefix);
        let start = u64::from(self.first()) + u64::from(index) * size;
        Ipv4Cidr::new(Ipv4Addr::from(start as u32), child_prefix)
    }
}

impl fmt::Display for Ipv4Cidr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.network, self.prefix)
    }
}

impl FromStr for Ipv4Cidr {
    type Err = TopologyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (addr, prefix) = s
            .split_once('/')
            .ok_or_else(|| TopologyError::invalid_cidr(s, "missing '/<prefix>'"))?;
        let address = Ipv4Addr::from_str(addr)
            .map_err(|_| TopologyError::invalid_cidr(s, "invalid IPv4 address"))?;
        let prefix = prefix
            .parse::<u8>()
            .map_err(|_| TopologyError::invalid_cidr(s, "invalid prefix length"))?;
        Ipv4Cidr::new(address, prefix)
    }
}

impl Serialize for Ipv4Cidr {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Ipv4Cidr {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}
