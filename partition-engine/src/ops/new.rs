// SPDX-License-Identifier: GPL-3.0-only

use partition_types::{FsType, PartitionFlags, PartitionRole, PartitionRoles, SectorRange};

use crate::core::{Device, Partition, PartitionAlignment};
use crate::error::{EngineError, Result};
use crate::fs;
use crate::jobs::{
    CreateFileSystemJob, CreatePartitionJob, Job, SetFileSystemLabelJob, SetPartitionFlagsJob,
};
use crate::ops::OperationStatus;

/// Creates a new partition, optionally with a filesystem, label and flags.
///
/// The constructor aligns the requested range, assigns a number and a
/// provisional node path, and inserts the previewed partition into the
/// table. The node path is provisional until the commit pass re-scans.
#[derive(Debug)]
pub struct NewOperation {
    status: OperationStatus,
    jobs: Vec<Job>,
    device_node: String,
    partition_node: String,
    number: u32,
}

impl NewOperation {
    pub fn new(
        device: &mut Device,
        roles: PartitionRoles,
        requested: SectorRange,
        fs_type: FsType,
        label: Option<String>,
        flags: PartitionFlags,
    ) -> Result<Self> {
        let structural = [
            PartitionRole::Primary,
            PartitionRole::Extended,
            PartitionRole::Logical,
        ]
        .into_iter()
        .filter(|role| roles.contains(*role))
        .count();
        if structural != 1 || roles.contains(PartitionRole::Unallocated) {
            return Err(EngineError::Validation(format!(
                "cannot create a partition with roles {roles:?}"
            )));
        }
        if roles.contains(PartitionRole::Extended) && fs_type != FsType::Unformatted {
            return Err(EngineError::Validation(
                "an extended partition cannot carry a file system".into(),
            ));
        }

        let window = if roles.contains(PartitionRole::Logical) {
            *device
                .table()
                .extended()
                .ok_or_else(|| {
                    EngineError::Validation(
                        "no extended partition to hold a logical partition".into(),
                    )
                })?
                .range()
        } else {
            *device.table().usable()
        };
        let range = PartitionAlignment::align(device, &window, &requested);
        if range.is_empty() {
            return Err(EngineError::Validation(format!(
                "requested range {requested:?} leaves no aligned space"
            )));
        }

        let number = device.table().next_number_for(roles);
        let partition_node = device.partition_node(number);

        let mut jobs = vec![Job::CreatePartition(CreatePartitionJob::new(
            device.node(),
            &partition_node,
            roles,
            range,
        ))];
        if !matches!(fs_type, FsType::Unformatted | FsType::Unknown) {
            jobs.push(Job::CreateFileSystem(CreateFileSystemJob::new(
                &partition_node,
                fs_type,
            )));
        }
        if let Some(label) = &label {
            jobs.push(Job::SetFileSystemLabel(SetFileSystemLabelJob::new(
                &partition_node,
                fs_type,
                label.clone(),
            )));
        }
        if !flags.is_empty() {
            jobs.push(Job::SetPartitionFlags(SetPartitionFlagsJob::new(
                device.node(),
                &partition_node,
                flags,
            )));
        }

        let mut fs = fs::make(fs_type);
        fs.set_label(label);
        let mut partition = Partition::new(&partition_node, roles, range, number, fs);
        partition.set_flags(flags);
        device.table_mut().insert(partition)?;
        tracing::debug!("previewed new partition {partition_node}");

        Ok(Self {
            status: OperationStatus::None,
            jobs,
            device_node: device.node().to_string(),
            partition_node,
            number,
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
        format!(
            "Create partition {} on {}",
            self.partition_node, self.device_node
        )
    }

    pub(crate) fn undo(&mut self, device: &mut Device) {
        if let Some(partition) = device.table_mut().remove_by_node(&self.partition_node) {
            if partition.has_role(PartitionRole::Logical) {
                if let Some(extended) = device.table_mut().extended_mut() {
                    extended.shift_logical_numbers(self.number + 1, -1);
                }
            }
        }
    }
}
