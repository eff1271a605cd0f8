// SPDX-License-Identifier: GPL-3.0-only

use partition_types::{OPTIMAL_ALIGNMENT_SECTORS, SectorRange};

use crate::core::Device;

/// Alignment policy for partition boundaries.
///
/// A partition is aligned when both its start and its end sit on an optimal
/// I/O boundary (1 MiB granularity). Requested ranges are snapped inward and
/// clamped to the usable window, so an aligned result never exceeds what the
/// caller asked for.
pub struct PartitionAlignment;

impl PartitionAlignment {
    /// Boundary granularity in sectors for the given device
    pub fn sector_alignment(device: &Device) -> u64 {
        // 1 MiB of logical sectors; 2048 for the common 512-byte case
        let bytes = OPTIMAL_ALIGNMENT_SECTORS * 512;
        (bytes / device.logical_sector_size()).max(1)
    }

    pub fn is_aligned(device: &Device, range: &SectorRange) -> bool {
        range.is_aligned(Self::sector_alignment(device))
    }

    /// Snap a requested range onto alignment boundaries within `window`:
    /// start rounds up, end rounds down, both clamped. The result may be
    /// empty when the window is too small to hold an aligned partition.
    pub fn align(device: &Device, window: &SectorRange, requested: &SectorRange) -> SectorRange {
        let granularity = Self::sector_alignment(device);
        let clamped = requested.clamp_to(window);

        let start = clamped.start.div_ceil(granularity) * granularity;
        let end = (clamped.end / granularity) * granularity;
        SectorRange::new(start, end.max(start))
    }
}

#[cfg(test)]
mod tests {
    use partition_types::TableType;

    use super::*;
    use crate::core::PartitionTable;

    fn device() -> Device {
        let table = PartitionTable::new(TableType::Gpt, SectorRange::new(2048, 2_000_000));
        Device::new("/dev/sda", "Test Disk", 512, 2_000_000, 255, 63, table)
    }

    #[test]
    fn mib_boundary_is_aligned() {
        let d = device();
        assert!(PartitionAlignment::is_aligned(
            &d,
            &SectorRange::new(2048, 2048 + 10 * 2048)
        ));
    }

    #[test]
    fn legacy_cylinder_start_is_not_aligned() {
        let d = device();
        assert!(!PartitionAlignment::is_aligned(
            &d,
            &SectorRange::new(63, 63 + 2048)
        ));
    }

    #[test]
    fn align_snaps_inward_and_clamps() {
        let d = device();
        let window = SectorRange::new(2048, 1_000_000);
        let aligned = PartitionAlignment::align(&d, &window, &SectorRange::new(3000, 2_000_000));
        assert_eq!(aligned.start, 4096);
        assert_eq!(aligned.end, (1_000_000 / 2048) * 2048);
        assert!(aligned.is_aligned(2048));
    }

    #[test]
    fn granularity_scales_with_sector_size() {
        let table = PartitionTable::new(TableType::Gpt, SectorRange::new(256, 1_000_000));
        let d = Device::new("/dev/nvme0n1", "Test NVMe", 4096, 1_000_000, 255, 63, table);
        assert_eq!(PartitionAlignment::sector_alignment(&d), 256);
    }
}
