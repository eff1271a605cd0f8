// SPDX-License-Identifier: GPL-3.0-only

//! In-memory model of one device's partition layout.

mod alignment;
mod device;
mod partition;
mod partition_table;

pub use alignment::PartitionAlignment;
pub use device::Device;
pub use partition::{Partition, PartitionFingerprint};
pub use partition_table::PartitionTable;
