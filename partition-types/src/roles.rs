// SPDX-License-Identifier: GPL-3.0-only

use enumflags2::{BitFlags, bitflags};
use serde::{Deserialize, Serialize};

/// Structural role of a partition within a table.
///
/// Roles combine: a logical partition holding a LUKS container carries
/// `Logical | Luks`. Exactly one of `Primary`, `Extended`, `Logical` or
/// `Unallocated` describes the partition's place in the table.
#[bitflags]
#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PartitionRole {
    /// Top-level partition directly under the table root
    Primary = 0b00001,

    /// Container partition holding logical partitions (MBR-style tables only)
    Extended = 0b00010,

    /// Partition nested inside an extended partition
    Logical = 0b00100,

    /// Synthetic gap-filler representing free space
    Unallocated = 0b01000,

    /// Partition holding a LUKS container
    Luks = 0b10000,
}

pub type PartitionRoles = BitFlags<PartitionRole>;

/// Partition table flags the engine knows how to set
#[bitflags]
#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PartitionFlag {
    Boot = 0b00001,
    Esp = 0b00010,
    Hidden = 0b00100,
    Raid = 0b01000,
    Lvm = 0b10000,
}

pub type PartitionFlags = BitFlags<PartitionFlag>;
