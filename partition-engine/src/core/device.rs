// SPDX-License-Identifier: GPL-3.0-only

use crate::core::PartitionTable;

/// A block device and its in-memory partition table
#[derive(Debug)]
pub struct Device {
    node: String,
    model: String,
    logical_sector_size: u64,
    total_sectors: u64,
    heads: u32,
    sectors_per_track: u32,
    table: PartitionTable,
}

impl Device {
    pub fn new(
        node: impl Into<String>,
        model: impl Into<String>,
        logical_sector_size: u64,
        total_sectors: u64,
        heads: u32,
        sectors_per_track: u32,
        table: PartitionTable,
    ) -> Self {
        Self {
            node: node.into(),
            model: model.into(),
            logical_sector_size,
            total_sectors,
            heads,
            sectors_per_track,
            table,
        }
    }

    pub fn node(&self) -> &str {
        &self.node
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn logical_sector_size(&self) -> u64 {
        self.logical_sector_size
    }

    pub fn total_sectors(&self) -> u64 {
        self.total_sectors
    }

    /// Sectors per cylinder of the legacy BIOS geometry
    pub fn cylinder_size(&self) -> u64 {
        u64::from(self.heads) * u64::from(self.sectors_per_track)
    }

    pub fn capacity(&self) -> u64 {
        self.total_sectors * self.logical_sector_size
    }

    pub fn table(&self) -> &PartitionTable {
        &self.table
    }

    pub fn table_mut(&mut self) -> &mut PartitionTable {
        &mut self.table
    }

    /// Node path for a partition number on this device, following the kernel
    /// convention: `/dev/sda` + 1 -> `/dev/sda1`, `/dev/nvme0n1` + 1 ->
    /// `/dev/nvme0n1p1`.
    pub fn partition_node(&self, number: u32) -> String {
        if self.node.ends_with(|c: char| c.is_ascii_digit()) {
            format!("{}p{number}", self.node)
        } else {
            format!("{}{number}", self.node)
        }
    }
}

#[cfg(test)]
mod tests {
    use partition_types::TableType;

    use super::*;

    fn device(node: &str) -> Device {
        let table = PartitionTable::new(
            TableType::Gpt,
            PartitionTable::default_usable(TableType::Gpt, 1_000_000),
        );
        Device::new(node, "Test Disk", 512, 1_000_000, 255, 63, table)
    }

    #[test]
    fn partition_node_naming() {
        assert_eq!(device("/dev/sda").partition_node(3), "/dev/sda3");
        assert_eq!(device("/dev/nvme0n1").partition_node(3), "/dev/nvme0n1p3");
    }

    #[test]
    fn geometry_accessors() {
        let d = device("/dev/sda");
        assert_eq!(d.cylinder_size(), 255 * 63);
        assert_eq!(d.capacity(), 1_000_000 * 512);
    }
}
