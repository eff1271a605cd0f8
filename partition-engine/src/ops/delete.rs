// SPDX-License-Identifier: GPL-3.0-only

use partition_types::{PartitionRole, ShredAction};

use crate::core::{Device, Partition};
use crate::error::{EngineError, Result};
use crate::jobs::{DeleteFileSystemJob, DeletePartitionJob, Job, ShredFileSystemJob};
use crate::ops::OperationStatus;

/// Deletes a partition, optionally overwriting its contents first.
///
/// The constructor removes the partition from the preview and, for
/// logicals, renumbers the siblings above it down by one; undo restores
/// both the partition and the original numbering.
pub struct DeleteOperation {
    status: OperationStatus,
    jobs: Vec<Job>,
    device_node: String,
    partition_node: String,
    number: u32,
    is_logical: bool,
    removed: Option<Partition>,
}

impl DeleteOperation {
    /// Why the partition must not be deleted, if any reason applies
    pub fn delete_veto(partition: &Partition) -> Option<&'static str> {
        if partition.is_unallocated() {
            return Some("free space cannot be deleted");
        }
        if partition.is_mounted() {
            return Some("the partition is mounted");
        }
        if partition.has_role(PartitionRole::Luks) && partition.fs().is_crypt_open() {
            return Some("the encrypted container is open");
        }
        if partition.has_role(PartitionRole::Extended)
            && partition.children().iter().any(|c| !c.is_unallocated())
        {
            return Some("the extended partition still holds logical partitions");
        }
        None
    }

    pub fn can_delete(partition: &Partition) -> bool {
        Self::delete_veto(partition).is_none()
    }

    pub fn new(device: &mut Device, partition_node: &str, shred: ShredAction) -> Result<Self> {
        let partition = device.table().find_by_node(partition_node).ok_or_else(|| {
            EngineError::Validation(format!(
                "no partition {partition_node} on {}",
                device.node()
            ))
        })?;
        if let Some(reason) = Self::delete_veto(partition) {
            return Err(EngineError::Validation(format!(
                "cannot delete {partition_node}: {reason}"
            )));
        }
        let number = partition.number();
        let is_logical = partition.has_role(PartitionRole::Logical);
        let range = *partition.range();

        let fs_job = match shred {
            ShredAction::NoShred => {
                Job::DeleteFileSystem(DeleteFileSystemJob::new(partition_node))
            }
            ShredAction::ZeroShred => {
                Job::ShredFileSystem(ShredFileSystemJob::new(partition_node, range, false))
            }
            ShredAction::RandomShred => {
                Job::ShredFileSystem(ShredFileSystemJob::new(partition_node, range, true))
            }
        };
        let jobs = vec![
            fs_job,
            Job::DeletePartition(DeletePartitionJob::new(device.node(), partition_node)),
        ];

        let removed = device.table_mut().remove_by_node(partition_node);
        if is_logical {
            if let Some(extended) = device.table_mut().extended_mut() {
                extended.shift_logical_numbers(number + 1, -1);
            }
        }
        tracing::debug!("previewed deletion of {partition_node}");

        Ok(Self {
            status: OperationStatus::None,
            jobs,
            device_node: device.node().to_string(),
            partition_node: partition_node.to_string(),
            number,
            is_logical,
            removed,
        })
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

    pub fn jobs(&self) -> &[Job] {
        &self.jobs
    }

    pub fn description(&self) -> String {
        let shredding = self
            .jobs
            .iter()
            .any(|job| matches!(job, Job::ShredFileSystem(_)));
        if shredding {
            format!(
                "Shred and delete partition {} on {}",
                self.partition_node, self.device_node
            )
        } else {
            format!(
                "Delete partition {} on {}",
                self.partition_node, self.device_node
            )
        }
    }

    pub(crate) fn undo(&mut self, device: &mut Device) {
        if self.is_logical {
            if let Some(extended) = device.table_mut().extended_mut() {
                extended.shift_logical_numbers(self.number, 1);
            }
        }
        if let Some(partition) = self.removed.take() {
            if let Err(e) = device.table_mut().insert(partition) {
                tracing::error!("failed to restore {}: {e}", self.partition_node);
            }
        }
    }
}
