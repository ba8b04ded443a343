use serde::{Deserialize, Serialize};

pub const PRIVATE_ACCESS_COMMENT: &str = "private access";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessListEntry {
    pub cidr_block: String,
    pub comment: String,
}

impl AccessListEntry {
    pub fn new(cidr_block: impl Into<String>, comment: impl Into<String>) -> Self {
        Self {
            cidr_block: cidr_block.into(),
            comment: comment.into(),
        }
    }
}

/// The private network entry always comes first, followed by `extra` as given.
/// Duplicates are kept.
pub fn compose_access_list(
    private_cidr: &str,
    extra: Option<&[AccessListEntry]>,
) -> Vec<AccessListEntry> {
    let mut list = vec![AccessListEntry::new(private_cidr, PRIVATE_ACCESS_COMMENT)];
    if let Some(extra) = extra {
        list.extend_from_slice(extra);
    }
    list
}
