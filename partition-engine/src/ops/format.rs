// SPDX-License-Identifier: GPL-3.0-only

use partition_types::{FsType, PartitionRole};

use crate::core::Device;
use crate::error::{EngineError, Result};
use crate::fs::{self, FileSystem};
use crate::jobs::{CreateFileSystemJob, DeleteFileSystemJob, Job};
use crate::ops::OperationStatus;

/// Replaces the filesystem on a partition with a freshly created one
#[derive(Debug)]
pub struct FormatOperation {
    status: OperationStatus,
    jobs: Vec<Job>,
    device_node: String,
    partition_node: String,
    fs_type: FsType,
    old_fs: Option<Box<dyn FileSystem>>,
}

impl FormatOperation {
    pub fn new(device: &mut Device, partition_node: &str, fs_type: FsType) -> Result<Self> {
        if fs_type == FsType::Unknown {
            return Err(EngineError::Validation(
                "cannot format to an unknown file system".into(),
            ));
        }
        let device_node = device.node().to_string();
        let partition = device
            .table_mut()
            .find_by_node_mut(partition_node)
            .ok_or_else(|| {
                EngineError::Validation(format!("no partition {partition_node} on {device_node}"))
            })?;
        if partition.is_unallocated() {
            return Err(EngineError::Validation("free space cannot be formatted".into()));
        }
        if partition.has_role(PartitionRole::Extended) {
            return Err(EngineError::Validation(
                "an extended partition cannot carry a file system".into(),
            ));
        }
        if partition.is_mounted() {
            return Err(EngineError::Validation(format!(
                "cannot format {partition_node} while it is mounted"
            )));
        }
        if partition.fs().is_crypt_open() {
            return Err(EngineError::Validation(format!(
                "cannot format {partition_node} while the encrypted container is open"
            )));
        }

        let mut jobs = vec![Job::DeleteFileSystem(DeleteFileSystemJob::new(
            partition_node,
        ))];
        if fs_type != FsType::Unformatted {
            jobs.push(Job::CreateFileSystem(CreateFileSystemJob::new(
                partition_node,
                fs_type,
            )));
        }

        let old_fs = partition.replace_fs(fs::make(fs_type));
        tracing::debug!("previewed format of {partition_node} to {fs_type}");

        Ok(Self {
            status: OperationStatus::None,
            jobs,
            device_node,
            partition_node: partition_node.to_string(),
            fs_type,
            old_fs: Some(old_fs),
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

    pub fn fs_type(&self) -> FsType {
        self.fs_type
    }

    pub fn jobs(&self) -> &[Job] {
        &self.jobs
    }

    pub fn description(&self) -> String {
        format!(
            "Format partition {} as {}",
            self.partition_node, self.fs_type
        )
    }

    pub(crate) fn undo(&mut self, device: &mut Device) {
        if let Some(old_fs) = self.old_fs.take() {
            if let Some(partition) = device.table_mut().find_by_node_mut(&self.partition_node) {
                partition.replace_fs(old_fs);
            }
        }
    }
}
