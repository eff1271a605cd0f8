// SPDX-License-Identifier: GPL-3.0-only

use crate::core::Device;
use crate::error::{EngineError, Result};
use crate::jobs::{Job, SetFileSystemLabelJob};
use crate::ops::OperationStatus;

/// Changes the label of the filesystem on a partition
pub struct SetLabelOperation {
    status: OperationStatus,
    jobs: Vec<Job>,
    device_node: String,
    partition_node: String,
    old_label: Option<String>,
    new_label: String,
}

impl SetLabelOperation {
    pub fn new(device: &mut Device, partition_node: &str, new_label: String) -> Result<Self> {
        let device_node = device.node().to_string();
        let partition = device
            .table_mut()
            .find_by_node_mut(partition_node)
            .ok_or_else(|| {
                EngineError::Validation(format!("no partition {partition_node} on {device_node}"))
            })?;
        if partition.is_unallocated() {
            return Err(EngineError::Validation(
                "free space carries no file system to label".into(),
            ));
        }
        let fs_type = partition.fs().fs_type();
        let old_label = partition.fs().label().map(str::to_string);
        partition.fs_mut().set_label(Some(new_label.clone()));

        let jobs = vec![Job::SetFileSystemLabel(SetFileSystemLabelJob::new(
            partition_node,
            fs_type,
            new_label.clone(),
        ))];

        Ok(Self {
            status: OperationStatus::None,
            jobs,
            device_node,
            partition_node: partition_node.to_string(),
            old_label,
            new_label,
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

    pub fn new_label(&self) -> &str {
        &self.new_label
    }

    pub fn jobs(&self) -> &[Job] {
        &self.jobs
    }

    pub fn description(&self) -> String {
        format!(
            "Set label of {} to \"{}\"",
            self.partition_node, self.new_label
        )
    }

    /// Fold a newer pending label change for the same partition into this
    /// one; the original label stays as the undo target.
    pub(crate) fn replace_pending(&mut self, newer: SetLabelOperation) {
        self.new_label = newer.new_label;
        self.jobs = newer.jobs;
    }

    pub(crate) fn undo(&mut self, device: &mut Device) {
        if let Some(partition) = device.table_mut().find_by_node_mut(&self.partition_node) {
            partition.fs_mut().set_label(self.old_label.clone());
        }
    }
}
