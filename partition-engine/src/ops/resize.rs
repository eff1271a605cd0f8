// SPDX-License-Identifier: GPL-3.0-only

use partition_types::{Capability, FsType, PartitionRole, SectorRange};

use crate::backend::ToolRunner;
use crate::core::{Device, PartitionAlignment};
use crate::error::{EngineError, Result};
use crate::jobs::{CheckFileSystemJob, Job, MoveFileSystemJob, ResizeFileSystemJob, SetGeometryJob};
use crate::ops::OperationStatus;

/// Resizes and/or moves a partition and the filesystem on it.
///
/// Jobs are ordered so the filesystem never exceeds its partition: check,
/// shrink the filesystem, set the new geometry, move the filesystem data,
/// grow the filesystem.
#[derive(Debug)]
pub struct ResizeOperation {
    status: OperationStatus,
    jobs: Vec<Job>,
    device_node: String,
    partition_node: String,
    old_range: SectorRange,
    new_range: SectorRange,
}

impl ResizeOperation {
    pub fn new(
        device: &mut Device,
        tools: &dyn ToolRunner,
        partition_node: &str,
        requested: SectorRange,
    ) -> Result<Self> {
        let sector_size = device.logical_sector_size();
        let partition = device.table().find_by_node(partition_node).ok_or_else(|| {
            EngineError::Validation(format!(
                "no partition {partition_node} on {}",
                device.node()
            ))
        })?;
        if partition.is_unallocated() {
            return Err(EngineError::Validation(
                "free space cannot be resized".into(),
            ));
        }
        if partition.is_mounted() {
            return Err(EngineError::Validation(format!(
                "cannot resize {partition_node} while it is mounted"
            )));
        }
        if partition.fs().is_crypt_open() {
            return Err(EngineError::Validation(format!(
                "cannot resize {partition_node} while the encrypted container is open"
            )));
        }

        let is_logical = partition.has_role(PartitionRole::Logical);
        let is_extended = partition.has_role(PartitionRole::Extended);
        let old_range = *partition.range();

        let window = if is_logical {
            *device
                .table()
                .extended()
                .ok_or_else(|| {
                    EngineError::Validation("logical partition without an extended one".into())
                })?
                .range()
        } else {
            *device.table().usable()
        };
        let new_range = PartitionAlignment::align(device, &window, &requested);
        if new_range.is_empty() {
            return Err(EngineError::Validation(format!(
                "requested range {requested:?} leaves no aligned space"
            )));
        }
        if new_range == old_range {
            return Err(EngineError::Validation(format!(
                "{partition_node} already has the requested geometry"
            )));
        }

        // re-borrow: the target space must be free of other real partitions
        let partition = device
            .table()
            .find_by_node(partition_node)
            .ok_or_else(|| EngineError::Validation(format!("no partition {partition_node}")))?;
        let siblings: &[_] = if is_logical {
            device
                .table()
                .extended()
                .map(|e| e.children())
                .unwrap_or(&[])
        } else {
            device.table().children()
        };
        if siblings.iter().any(|sibling| {
            !sibling.is_unallocated()
                && sibling.node() != partition_node
                && sibling.range().overlaps(&new_range)
        }) {
            return Err(EngineError::Validation(format!(
                "target range {new_range:?} overlaps another partition"
            )));
        }
        if is_extended {
            for child in partition.children().iter().filter(|c| !c.is_unallocated()) {
                if !new_range.encloses(child.range()) {
                    return Err(EngineError::Validation(format!(
                        "new extended range {new_range:?} no longer encloses {}",
                        child.node()
                    )));
                }
            }
        }

        let fs = partition.fs();
        let fs_type = fs.fs_type();
        let has_fs = !matches!(fs_type, FsType::Unformatted | FsType::Unknown);
        let old_bytes = old_range.byte_len(sector_size);
        let new_bytes = new_range.byte_len(sector_size);
        let shrinking = new_bytes < old_bytes;
        let moving = new_range.start != old_range.start;

        if has_fs {
            if shrinking && !fs.support(Capability::Shrink, tools).is_supported() {
                return Err(EngineError::Unsupported(format!(
                    "the {fs_type} file system on {partition_node} cannot be shrunk"
                )));
            }
            if moving && !fs.support(Capability::Move, tools).is_supported() {
                return Err(EngineError::Unsupported(format!(
                    "the {fs_type} file system on {partition_node} cannot be moved"
                )));
            }
            if new_bytes < fs.min_capacity() {
                return Err(EngineError::Validation(format!(
                    "{new_bytes} bytes is below the minimum capacity of {fs_type}"
                )));
            }
            if new_bytes > fs.max_capacity() {
                return Err(EngineError::Validation(format!(
                    "{new_bytes} bytes exceeds the maximum capacity of {fs_type}"
                )));
            }
        }

        let jobs = Self::build_jobs(
            device.node(),
            sector_size,
            partition_node,
            fs_type,
            old_range,
            new_range,
        );

        // preview
        if let Some(partition) = device.table_mut().find_by_node_mut(partition_node) {
            partition.set_range(new_range);
        }
        device.table_mut().update_unallocated();
        tracing::debug!(
            "previewed resize of {partition_node}: {old_range:?} -> {new_range:?}"
        );

        Ok(Self {
            status: OperationStatus::None,
            jobs,
            device_node: device.node().to_string(),
            partition_node: partition_node.to_string(),
            old_range,
            new_range,
        })
    }

    /// Rebuild a resize from `old_range` to the range the partition already
    /// has in the preview. Used when two pending resizes of the same
    /// partition collapse into one; skips the preview step.
    pub(crate) fn rebuilt(
        device: &Device,
        partition_node: &str,
        old_range: SectorRange,
    ) -> Result<Self> {
        let partition = device
            .table()
            .find_by_node(partition_node)
            .ok_or_else(|| EngineError::Validation(format!("no partition {partition_node}")))?;
        let new_range = *partition.range();
        let jobs = Self::build_jobs(
            device.node(),
            device.logical_sector_size(),
            partition_node,
            partition.fs().fs_type(),
            old_range,
            new_range,
        );
        Ok(Self {
            status: OperationStatus::None,
            jobs,
            device_node: device.node().to_string(),
            partition_node: partition_node.to_string(),
            old_range,
            new_range,
        })
    }

    fn build_jobs(
        device_node: &str,
        sector_size: u64,
        partition_node: &str,
        fs_type: FsType,
        old_range: SectorRange,
        new_range: SectorRange,
    ) -> Vec<Job> {
        let has_fs = !matches!(fs_type, FsType::Unformatted | FsType::Unknown);
        let old_bytes = old_range.byte_len(sector_size);
        let new_bytes = new_range.byte_len(sector_size);
        let shrinking = new_bytes < old_bytes;
        let growing = new_bytes > old_bytes;
        let moving = new_range.start != old_range.start;

        let mut jobs = Vec::new();
        if has_fs {
            jobs.push(Job::CheckFileSystem(CheckFileSystemJob::new(
                partition_node,
                fs_type,
            )));
        }
        if has_fs && shrinking {
            jobs.push(Job::ResizeFileSystem(ResizeFileSystemJob::new(
                partition_node,
                fs_type,
                new_bytes,
                true,
            )));
        }
        jobs.push(Job::SetGeometry(SetGeometryJob::new(
            device_node,
            partition_node,
            new_range,
        )));
        if has_fs && moving {
            // the copy source is the filesystem's current extent, which after
            // a shrink is at most the new length
            let source_len = old_range.len().min(new_range.len());
            let source = SectorRange::new(old_range.start, old_range.start + source_len);
            jobs.push(Job::MoveFileSystem(MoveFileSystemJob::new(
                device_node,
                partition_node,
                fs_type,
                source,
                new_range.start,
            )));
        }
        if has_fs && growing {
            jobs.push(Job::ResizeFileSystem(ResizeFileSystemJob::new(
                partition_node,
                fs_type,
                new_bytes,
                false,
            )));
        }
        jobs
    }

    pub fn status(&self) -> OperationStatus {
        self.status
    }

    pub(crate) fn set_status(&mut self, status: OperationStatus) {
        self.status = status;
    }

    pub fn device_node(&self) -> &str {
        &self.device_node
    }

    pub fn partition_node(&self) -> &str {
        &self.partition_node
    }

    pub fn old_range(&self) -> &SectorRange {
        &self.old_range
    }

    pub fn new_range(&self) -> &SectorRange {
        &self.new_range
    }

    pub fn jobs(&self) -> &[Job] {
        &self.jobs
    }

    pub fn description(&self) -> String {
        if self.new_range.start != self.old_range.start {
            format!(
                "Move and resize partition {} to sectors {}..{}",
                self.partition_node, self.new_range.start, self.new_range.end
            )
        } else {
            format!(
                "Resize partition {} from {} to {} sectors",
                self.partition_node,
                self.old_range.len(),
                self.new_range.len()
            )
        }
    }

    pub(crate) fn undo(&mut self, device: &mut Device) {
        if let Some(partition) = device.table_mut().find_by_node_mut(&self.partition_node) {
            partition.set_range(self.old_range);
        }
        device.table_mut().update_unallocated();
    }
}
