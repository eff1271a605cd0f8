// SPDX-License-Identifier: GPL-3.0-only

use serde::{Deserialize, Serialize};

/// Partition boundary granularity for modern disks (1 MiB at 512-byte sectors)
pub const OPTIMAL_ALIGNMENT_SECTORS: u64 = 2048;

/// A half-open range of device sectors
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectorRange {
    /// Start sector (inclusive)
    pub start: u64,

    /// End sector (exclusive)
    pub end: u64,
}

impl SectorRange {
    pub fn new(start: u64, end: u64) -> Self {
        Self { start, end }
    }

    /// Number of sectors in this range
    pub fn len(&self) -> u64 {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.end <= self.start
    }

    pub fn contains(&self, sector: u64) -> bool {
        sector >= self.start && sector < self.end
    }

    /// Whether this range fully encloses `other`
    pub fn encloses(&self, other: &SectorRange) -> bool {
        other.start >= self.start && other.end <= self.end
    }

    pub fn overlaps(&self, other: &SectorRange) -> bool {
        self.start < other.end && other.start < self.end
    }

    /// Clamp this range so it fits within `bounds`
    pub fn clamp_to(&self, bounds: &SectorRange) -> SectorRange {
        let start = self.start.clamp(bounds.start, bounds.end);
        let end = self.end.clamp(bounds.start, bounds.end);
        SectorRange { start, end }
    }

    /// A range is aligned when both its start and its length sit on the
    /// given sector granularity.
    pub fn is_aligned(&self, granularity: u64) -> bool {
        granularity != 0 && self.start % granularity == 0 && self.len() % granularity == 0
    }

    /// Size in bytes for a given logical sector size
    pub fn byte_len(&self, sector_size: u64) -> u64 {
        self.len().saturating_mul(sector_size)
    }
}
