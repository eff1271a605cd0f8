// SPDX-License-Identifier: GPL-3.0-only

use partition_types::{
    OPTIMAL_ALIGNMENT_SECTORS, PartitionRole, PartitionRoles, SectorRange, TableType,
};

use crate::core::Partition;
use crate::error::{EngineError, Result};

/// The consistency engine for one device's layout.
///
/// Children are kept sorted by start sector, never overlap, and synthetic
/// unallocated fillers tile every gap so that each sector of the usable
/// window belongs to exactly one node. The same holds for the children of
/// the extended partition, if one exists.
#[derive(Debug)]
pub struct PartitionTable {
    table_type: TableType,
    usable: SectorRange,
    children: Vec<Partition>,
}

impl PartitionTable {
    pub fn new(table_type: TableType, usable: SectorRange) -> Self {
        let mut table = Self {
            table_type,
            usable,
            children: Vec::new(),
        };
        table.update_unallocated();
        table
    }

    /// Usable window for a fresh table: GPT reserves 34 sectors at the front
    /// and 33 at the back for the headers; DOS starts after the MBR track.
    pub fn default_usable(table_type: TableType, total_sectors: u64) -> SectorRange {
        match table_type {
            TableType::Gpt => SectorRange::new(34, total_sectors.saturating_sub(33)),
            TableType::Dos => SectorRange::new(63, total_sectors),
        }
    }

    pub fn table_type(&self) -> TableType {
        self.table_type
    }

    /// First/last usable sector window (half-open)
    pub fn usable(&self) -> &SectorRange {
        &self.usable
    }

    pub fn max_primaries(&self) -> usize {
        self.table_type.max_primaries()
    }

    pub fn children(&self) -> &[Partition] {
        &self.children
    }

    /// The extended partition, if the table has one
    pub fn extended(&self) -> Option<&Partition> {
        self.children
            .iter()
            .find(|c| c.has_role(PartitionRole::Extended))
    }

    pub fn extended_mut(&mut self) -> Option<&mut Partition> {
        self.children
            .iter_mut()
            .find(|c| c.has_role(PartitionRole::Extended))
    }

    /// Count of real (non-filler) top-level partitions; the extended
    /// partition counts as one
    pub fn primaries_count(&self) -> usize {
        self.children.iter().filter(|c| !c.is_unallocated()).count()
    }

    /// Find a real partition by its device node path
    pub fn find_by_node(&self, node: &str) -> Option<&Partition> {
        for child in &self.children {
            if child.node() == node && !child.is_unallocated() {
                return Some(child);
            }
            if child.has_role(PartitionRole::Extended) {
                if let Some(found) = child
                    .children()
                    .iter()
                    .find(|c| c.node() == node && !c.is_unallocated())
                {
                    return Some(found);
                }
            }
        }
        None
    }

    pub fn find_by_node_mut(&mut self, node: &str) -> Option<&mut Partition> {
        for child in &mut self.children {
            if child.node() == node && !child.is_unallocated() {
                return Some(child);
            }
            if child.has_role(PartitionRole::Extended) {
                let found = child
                    .children_mut()
                    .iter_mut()
                    .find(|c| c.node() == node && !c.is_unallocated());
                if found.is_some() {
                    return found;
                }
            }
        }
        None
    }

    /// Deepest node whose range contains `sector` and whose roles intersect
    /// the filter
    pub fn find_partition_by_sector(
        &self,
        sector: u64,
        role_filter: PartitionRoles,
    ) -> Option<&Partition> {
        let top = self.children.iter().find(|c| c.range().contains(sector))?;
        if top.has_role(PartitionRole::Extended) {
            if let Some(child) = top
                .children()
                .iter()
                .find(|c| c.range().contains(sector) && c.roles().intersects(role_filter))
            {
                return Some(child);
            }
        }
        top.roles().intersects(role_filter).then_some(top)
    }

    /// Insert a partition, enforcing nesting, overlap and primary-count
    /// rules, then re-derive the gap fillers.
    pub fn insert(&mut self, partition: Partition) -> Result<()> {
        if partition.has_role(PartitionRole::Logical) {
            let Some(extended) = self.extended_mut() else {
                return Err(EngineError::Validation(
                    "no extended partition to hold a logical partition".into(),
                ));
            };
            if !extended.range().encloses(partition.range()) {
                return Err(EngineError::Validation(format!(
                    "logical partition {:?} exceeds the extended partition {:?}",
                    partition.range(),
                    extended.range()
                )));
            }
            if extended
                .children()
                .iter()
                .any(|c| !c.is_unallocated() && c.range().overlaps(partition.range()))
            {
                return Err(EngineError::Validation(format!(
                    "partition {:?} overlaps an existing logical partition",
                    partition.range()
                )));
            }
            extended.insert_child_sorted(partition);
        } else {
            if !self.usable.encloses(partition.range()) {
                return Err(EngineError::Validation(format!(
                    "partition {:?} exceeds the usable window {:?}",
                    partition.range(),
                    self.usable
                )));
            }
            if self
                .children
                .iter()
                .any(|c| !c.is_unallocated() && c.range().overlaps(partition.range()))
            {
                return Err(EngineError::Validation(format!(
                    "partition {:?} overlaps an existing partition",
                    partition.range()
                )));
            }
            if partition.has_role(PartitionRole::Extended) {
                if !self.table_type.supports_extended() {
                    return Err(EngineError::Validation(format!(
                        "{} tables do not support extended partitions",
                        self.table_type
                    )));
                }
                if self.extended().is_some() {
                    return Err(EngineError::Validation(
                        "table already has an extended partition".into(),
                    ));
                }
            }
            if self.primaries_count() + 1 > self.max_primaries() {
                return Err(EngineError::Validation(format!(
                    "table already holds the maximum of {} primary partitions",
                    self.max_primaries()
                )));
            }
            let pos = self
                .children
                .iter()
                .position(|c| !c.is_unallocated() && c.range().start > partition.range().start)
                .unwrap_or(self.children.len());
            self.children.insert(pos, partition);
        }

        self.update_unallocated();
        Ok(())
    }

    /// Remove a real partition by node path, returning ownership of it
    pub fn remove_by_node(&mut self, node: &str) -> Option<Partition> {
        let removed = if let Some(pos) = self
            .children
            .iter()
            .position(|c| c.node() == node && !c.is_unallocated())
        {
            Some(self.children.remove(pos))
        } else {
            self.extended_mut()
                .and_then(|extended| extended.remove_child_by_node(node))
        };

        if removed.is_some() {
            self.update_unallocated();
        }
        removed
    }

    /// Recompute all gap fillers so the table is fully tiled again
    pub fn update_unallocated(&mut self) {
        Self::retile(&mut self.children, self.usable);
        if let Some(extended) = self
            .children
            .iter_mut()
            .find(|c| c.has_role(PartitionRole::Extended))
        {
            let window = *extended.range();
            Self::retile(extended.children_mut(), window);
        }
    }

    fn retile(children: &mut Vec<Partition>, window: SectorRange) {
        children.retain(|c| !c.is_unallocated());
        children.sort_by_key(|c| c.range().start);

        let mut fillers = Vec::new();
        let mut cursor = window.start;
        for child in children.iter() {
            if child.range().start > cursor {
                fillers.push(SectorRange::new(cursor, child.range().start));
            }
            cursor = cursor.max(child.range().end);
        }
        if cursor < window.end {
            fillers.push(SectorRange::new(cursor, window.end));
        }

        children.extend(fillers.into_iter().map(Partition::unallocated));
        children.sort_by_key(|c| c.range().start);
    }

    /// Heuristic used to pick the table-type variant for reporting: true when
    /// all partition boundaries sit on the optimal sector granularity rather
    /// than legacy cylinder boundaries.
    pub fn is_sector_based(&self) -> bool {
        match self.table_type {
            TableType::Gpt => true,
            TableType::Dos => self.real_partitions().all(|p| {
                p.range().start % OPTIMAL_ALIGNMENT_SECTORS == 0
            }),
        }
    }

    fn real_partitions(&self) -> impl Iterator<Item = &Partition> {
        self.children
            .iter()
            .filter(|c| !c.is_unallocated())
            .flat_map(|c| {
                std::iter::once(c).chain(c.children().iter().filter(|l| !l.is_unallocated()))
            })
    }

    /// Verify the central invariant: fully tiled, non-overlapping, valid
    /// nesting and contiguous logical numbering.
    pub fn check_consistency(&self) -> Result<()> {
        Self::check_tiling(&self.children, &self.usable)?;

        let extended_count = self
            .children
            .iter()
            .filter(|c| c.has_role(PartitionRole::Extended))
            .count();
        if extended_count > 1 {
            return Err(EngineError::Validation(
                "more than one extended partition".into(),
            ));
        }
        if extended_count > 0 && !self.table_type.supports_extended() {
            return Err(EngineError::Validation(format!(
                "extended partition on a {} table",
                self.table_type
            )));
        }
        if self
            .children
            .iter()
            .any(|c| c.has_role(PartitionRole::Logical))
        {
            return Err(EngineError::Validation(
                "logical partition at the top level".into(),
            ));
        }
        if self.primaries_count() > self.max_primaries() {
            return Err(EngineError::Validation(format!(
                "{} primary partitions exceed the maximum of {}",
                self.primaries_count(),
                self.max_primaries()
            )));
        }

        if let Some(extended) = self.extended() {
            Self::check_tiling(extended.children(), extended.range())?;

            let mut numbers: Vec<u32> = extended
                .children()
                .iter()
                .filter(|c| !c.is_unallocated())
                .map(|c| {
                    if c.has_role(PartitionRole::Logical) {
                        Ok(c.number())
                    } else {
                        Err(EngineError::Validation(
                            "non-logical partition inside the extended partition".into(),
                        ))
                    }
                })
                .collect::<Result<_>>()?;
            numbers.sort_unstable();
            let expected: Vec<u32> = (5..5 + numbers.len() as u32).collect();
            if numbers != expected {
                return Err(EngineError::Validation(format!(
                    "logical numbering {numbers:?} is not contiguous from 5"
                )));
            }
        }

        Ok(())
    }

    fn check_tiling(children: &[Partition], window: &SectorRange) -> Result<()> {
        let mut cursor = window.start;
        for child in children {
            if child.range().start != cursor {
                return Err(EngineError::Validation(format!(
                    "gap or overlap at sector {cursor}: next node starts at {}",
                    child.range().start
                )));
            }
            cursor = child.range().end;
        }
        if cursor != window.end {
            return Err(EngineError::Validation(format!(
                "table not tiled to the end of the usable window: {cursor} != {}",
                window.end
            )));
        }
        Ok(())
    }

    /// Next free partition number for a partition with the given roles:
    /// lowest unused primary number, or the next logical number (logicals
    /// start at 5 and stay contiguous)
    pub fn next_number_for(&self, roles: PartitionRoles) -> u32 {
        if roles.contains(PartitionRole::Logical) {
            self.extended()
                .map(|extended| {
                    extended
                        .children()
                        .iter()
                        .filter(|c| c.has_role(PartitionRole::Logical))
                        .map(Partition::number)
                        .max()
                        .map_or(5, |n| n + 1)
                })
                .unwrap_or(5)
        } else {
            let used: Vec<u32> = self
                .children
                .iter()
                .filter(|c| !c.is_unallocated())
                .map(Partition::number)
                .collect();
            (1..).find(|n| !used.contains(n)).unwrap_or(1)
        }
    }

    /// Structural fingerprint of the whole table, for state comparisons
    pub fn fingerprint(&self) -> Vec<crate::core::PartitionFingerprint> {
        self.children.iter().map(Partition::fingerprint).collect()
    }
}
