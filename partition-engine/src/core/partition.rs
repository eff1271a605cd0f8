// SPDX-License-Identifier: GPL-3.0-only

use std::fmt;

use partition_types::{FsType, PartitionFlags, PartitionRole, PartitionRoles, SectorRange};

use crate::fs::{self, FileSystem};

/// A node of the partition tree: a real partition, an extended container
/// (which owns its logical children and gap fillers), or a synthetic
/// unallocated filler.
///
/// The partition exclusively owns its filesystem object and, for extended
/// partitions, its children.
pub struct Partition {
    node: String,
    roles: PartitionRoles,
    range: SectorRange,
    number: u32,
    mounted: bool,
    mount_point: Option<String>,
    flags: PartitionFlags,
    available_flags: PartitionFlags,
    fs: Box<dyn FileSystem>,
    children: Vec<Partition>,
}

impl Partition {
    pub fn new(
        node: impl Into<String>,
        roles: PartitionRoles,
        range: SectorRange,
        number: u32,
        fs: Box<dyn FileSystem>,
    ) -> Self {
        Self {
            node: node.into(),
            roles,
            range,
            number,
            mounted: false,
            mount_point: None,
            flags: PartitionFlags::empty(),
            available_flags: PartitionFlags::all(),
            fs,
            children: Vec::new(),
        }
    }

    /// Gap filler representing free space
    pub fn unallocated(range: SectorRange) -> Self {
        Self::new(
            "unallocated",
            PartitionRole::Unallocated.into(),
            range,
            0,
            fs::make(FsType::Unknown),
        )
    }

    pub fn node(&self) -> &str {
        &self.node
    }

    pub fn set_node(&mut self, node: impl Into<String>) {
        self.node = node.into();
    }

    pub fn roles(&self) -> PartitionRoles {
        self.roles
    }

    pub fn has_role(&self, role: PartitionRole) -> bool {
        self.roles.contains(role)
    }

    pub fn is_unallocated(&self) -> bool {
        self.has_role(PartitionRole::Unallocated)
    }

    pub fn range(&self) -> &SectorRange {
        &self.range
    }

    pub fn set_range(&mut self, range: SectorRange) {
        self.range = range;
    }

    pub fn number(&self) -> u32 {
        self.number
    }

    pub fn set_number(&mut self, number: u32) {
        self.number = number;
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    pub fn mount_point(&self) -> Option<&str> {
        self.mount_point.as_deref()
    }

    pub fn set_mounted(&mut self, mounted: bool, mount_point: Option<String>) {
        self.mounted = mounted;
        self.mount_point = mount_point;
    }

    pub fn flags(&self) -> PartitionFlags {
        self.flags
    }

    pub fn set_flags(&mut self, flags: PartitionFlags) {
        self.flags = flags;
    }

    /// Flags the backend reports as settable on this partition
    pub fn available_flags(&self) -> PartitionFlags {
        self.available_flags
    }

    pub fn set_available_flags(&mut self, flags: PartitionFlags) {
        self.available_flags = flags;
    }

    pub fn fs(&self) -> &dyn FileSystem {
        self.fs.as_ref()
    }

    pub fn fs_mut(&mut self) -> &mut dyn FileSystem {
        self.fs.as_mut()
    }

    /// Swap the owned filesystem, returning the previous one
    pub fn replace_fs(&mut self, fs: Box<dyn FileSystem>) -> Box<dyn FileSystem> {
        std::mem::replace(&mut self.fs, fs)
    }

    pub fn children(&self) -> &[Partition] {
        &self.children
    }

    pub fn children_mut(&mut self) -> &mut Vec<Partition> {
        &mut self.children
    }

    /// Insert a child keeping children sorted by start sector
    pub fn insert_child_sorted(&mut self, child: Partition) {
        let pos = self
            .children
            .iter()
            .position(|c| c.range().start > child.range().start)
            .unwrap_or(self.children.len());
        self.children.insert(pos, child);
    }

    pub fn remove_child_by_node(&mut self, node: &str) -> Option<Partition> {
        let pos = self
            .children
            .iter()
            .position(|c| c.node() == node && !c.is_unallocated())?;
        Some(self.children.remove(pos))
    }

    /// Shift the numbers of logical children numbered `from` or higher by
    /// `delta`. Logicals must stay contiguously numbered; the OS renumbers
    /// them by scan order, so deleting number N shifts everything above N
    /// down by one, and undoing that shifts it back up.
    pub fn shift_logical_numbers(&mut self, from: u32, delta: i32) {
        for child in &mut self.children {
            if child.has_role(PartitionRole::Logical) && child.number() >= from {
                let shifted = i64::from(child.number()) + i64::from(delta);
                child.set_number(shifted.max(0) as u32);
            }
        }
    }

    /// Structural fingerprint for state comparisons (undo-inverse checks)
    pub fn fingerprint(&self) -> PartitionFingerprint {
        PartitionFingerprint {
            node: self.node.clone(),
            roles: self.roles,
            range: self.range,
            number: self.number,
            flags: self.flags,
            mounted: self.mounted,
            fs_type: self.fs.fs_type(),
            label: self.fs.label().map(str::to_string),
            children: self.children.iter().map(Partition::fingerprint).collect(),
        }
    }
}

impl fmt::Debug for Partition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Partition")
            .field("node", &self.node)
            .field("roles", &self.roles)
            .field("range", &self.range)
            .field("number", &self.number)
            .field("mounted", &self.mounted)
            .field("fs", &self.fs.fs_type())
            .field("children", &self.children)
            .finish()
    }
}

/// Value snapshot of a partition subtree, comparable for structural equality
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartitionFingerprint {
    pub node: String,
    pub roles: PartitionRoles,
    pub range: SectorRange,
    pub number: u32,
    pub flags: PartitionFlags,
    pub mounted: bool,
    pub fs_type: FsType,
    pub label: Option<String>,
    pub children: Vec<PartitionFingerprint>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn logical(node: &str, start: u64, number: u32) -> Partition {
        Partition::new(
            node,
            PartitionRole::Logical.into(),
            SectorRange::new(start, start + 2048),
            number,
            fs::make(FsType::Ext4),
        )
    }

    #[test]
    fn shift_logical_numbers_down_and_back() {
        let mut extended = Partition::new(
            "/dev/sdb1",
            PartitionRole::Extended.into(),
            SectorRange::new(2048, 40960),
            1,
            fs::make(FsType::Unformatted),
        );
        for (i, start) in [(5, 2048u64), (6, 6144), (7, 10240), (8, 14336)] {
            extended.insert_child_sorted(logical(&format!("/dev/sdb{i}"), start, i));
        }

        // as after deleting number 6
        extended.remove_child_by_node("/dev/sdb6");
        extended.shift_logical_numbers(7, -1);
        let numbers: Vec<u32> = extended.children().iter().map(Partition::number).collect();
        assert_eq!(numbers, vec![5, 6, 7]);

        // undo: make room and reinsert
        extended.shift_logical_numbers(6, 1);
        extended.insert_child_sorted(logical("/dev/sdb6", 6144, 6));
        let numbers: Vec<u32> = extended.children().iter().map(Partition::number).collect();
        assert_eq!(numbers, vec![5, 6, 7, 8]);
    }

    #[test]
    fn children_stay_sorted_by_start() {
        let mut extended = Partition::new(
            "/dev/sdb1",
            PartitionRole::Extended.into(),
            SectorRange::new(2048, 40960),
            1,
            fs::make(FsType::Unformatted),
        );
        extended.insert_child_sorted(logical("/dev/sdb6", 6144, 6));
        extended.insert_child_sorted(logical("/dev/sdb5", 2048, 5));

        let starts: Vec<u64> = extended
            .children()
            .iter()
            .map(|c| c.range().start)
            .collect();
        assert_eq!(starts, vec![2048, 6144]);
    }
}
