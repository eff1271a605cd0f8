// SPDX-License-Identifier: GPL-3.0-only

use std::fmt;

use serde::{Deserialize, Serialize};

/// Filesystem types the engine can describe.
///
/// `Luks` is a container type: the engine treats the outer LUKS layer as a
/// filesystem wrapping an inner one.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FsType {
    Ext2,
    Ext4,
    Fat32,
    Ntfs,
    LinuxSwap,
    Luks,
    Unformatted,
    Unknown,
}

impl FsType {
    pub fn as_str(&self) -> &'static str {
        match self {
            FsType::Ext2 => "ext2",
            FsType::Ext4 => "ext4",
            FsType::Fat32 => "fat32",
            FsType::Ntfs => "ntfs",
            FsType::LinuxSwap => "linuxswap",
            FsType::Luks => "luks",
            FsType::Unformatted => "unformatted",
            FsType::Unknown => "unknown",
        }
    }
}

impl fmt::Display for FsType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single entry of the filesystem capability set
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    Create,
    Grow,
    Shrink,
    Move,
    Check,
    ReadLabel,
    WriteLabel,
    ReadUuid,
    UpdateUuid,
    ReadUsed,
}

/// How a filesystem capability is provided
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Support {
    /// Capability is not available
    #[default]
    None,

    /// Capability is provided by an external tool (mkfs, fsck, ...)
    External,

    /// Capability is provided by the engine or backend library itself
    Library,
}

impl Support {
    pub fn is_supported(&self) -> bool {
        !matches!(self, Support::None)
    }
}

/// How the filesystem content is disposed of when deleting a partition
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShredAction {
    /// Only remove the partition table entry
    #[default]
    NoShred,

    /// Overwrite the occupied sectors with zeros first
    ZeroShred,

    /// Overwrite with cryptographically random data first (slower)
    RandomShred,
}
