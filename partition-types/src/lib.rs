// SPDX-License-Identifier: GPL-3.0-only

//! Shared data types for the partition operation engine
//!
//! These types are the canonical vocabulary for describing partition layouts:
//! sector ranges, partition roles and flags, table types, filesystem types and
//! capability support levels. The engine crate builds its model and operation
//! types on top of these.

mod fs;
mod roles;
mod sector;
mod table;

pub use fs::{Capability, FsType, ShredAction, Support};
pub use roles::{PartitionFlag, PartitionFlags, PartitionRole, PartitionRoles};
pub use sector::{OPTIMAL_ALIGNMENT_SECTORS, SectorRange};
pub use table::TableType;
