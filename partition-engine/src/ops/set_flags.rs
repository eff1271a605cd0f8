// SPDX-License-Identifier: GPL-3.0-only

use partition_types::PartitionFlags;

use crate::core::Device;
use crate::error::{EngineError, Result};
use crate::jobs::{Job, SetPartitionFlagsJob};
use crate::ops::OperationStatus;

/// Replaces the flag set of a partition
#[derive(Debug)]
pub struct SetFlagsOperation {
    status: OperationStatus,
    jobs: Vec<Job>,
    device_node: String,
    partition_node: String,
    old_flags: PartitionFlags,
    new_flags: PartitionFlags,
}

impl SetFlagsOperation {
    pub fn new(device: &mut Device, partition_node: &str, new_flags: PartitionFlags) -> Result<Self> {
        let device_node = device.node().to_string();
        let partition = device
            .table_mut()
            .find_by_node_mut(partition_node)
            .ok_or_else(|| {
                EngineError::Validation(format!("no partition {partition_node} on {device_node}"))
            })?;
        if partition.is_unallocated() {
            return Err(EngineError::Validation(
                "free space carries no flags".into(),
            ));
        }
        if !partition.available_flags().contains(new_flags) {
            return Err(EngineError::Validation(format!(
                "flags {new_flags:?} are not all settable on {partition_node}"
            )));
        }
        let old_flags = partition.flags();
        partition.set_flags(new_flags);

        let jobs = vec![Job::SetPartitionFlags(SetPartitionFlagsJob::new(
            &device_node,
            partition_node,
            new_flags,
        ))];

        Ok(Self {
            status: OperationStatus::None,
            jobs,
            device_node,
            partition_node: partition_node.to_string(),
            old_flags,
            new_flags,
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

    pub fn new_flags(&self) -> PartitionFlags {
        self.new_flags
    }

    pub fn jobs(&self) -> &[Job] {
        &self.jobs
    }

    pub fn description(&self) -> String {
        format!("Set flags of partition {}", self.partition_node)
    }

    /// Fold a newer pending flag change for the same partition into this
    /// one; the original flags stay as the undo target.
    pub(crate) fn replace_pending(&mut self, newer: SetFlagsOperation) {
        self.new_flags = newer.new_flags;
        self.jobs = newer.jobs;
    }

    pub(crate) fn undo(&mut self, device: &mut Device) {
        if let Some(partition) = device.table_mut().find_by_node_mut(&self.partition_node) {
            partition.set_flags(self.old_flags);
        }
    }
}
