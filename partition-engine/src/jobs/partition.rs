// SPDX-License-Identifier: GPL-3.0-only

//! Jobs that edit partition table entries through the backend.

use partition_types::{PartitionFlags, PartitionRoles, SectorRange};

use crate::backend::ExecContext;
use crate::jobs::JobOutcome;
use crate::report::Report;

#[derive(Debug)]
pub struct CreatePartitionJob {
    device_node: String,
    partition_node: String,
    roles: PartitionRoles,
    range: SectorRange,
}

impl CreatePartitionJob {
    pub fn new(
        device_node: impl Into<String>,
        partition_node: impl Into<String>,
        roles: PartitionRoles,
        range: SectorRange,
    ) -> Self {
        Self {
            device_node: device_node.into(),
            partition_node: partition_node.into(),
            roles,
            range,
        }
    }

    pub fn description(&self) -> String {
        format!(
            "Create new partition {} ({} sectors)",
            self.partition_node,
            self.range.len()
        )
    }

    pub(crate) fn run(&self, parent: &mut Report, ctx: &ExecContext<'_>) -> JobOutcome {
        let report = parent.child(self.description());
        match ctx
            .backend
            .create_partition(&self.device_node, self.roles, self.range)
        {
            Ok(assigned_node) => {
                // The kernel may assign a different node than the preview
                // used; callers re-scan after a commit pass anyway.
                report.line(format!("created as {assigned_node}"));
                JobOutcome::Success
            }
            Err(e) => {
                report.line(e.to_string());
                JobOutcome::Failed
            }
        }
    }
}

#[derive(Debug)]
pub struct DeletePartitionJob {
    device_node: String,
    partition_node: String,
}

impl DeletePartitionJob {
    pub fn new(device_node: impl Into<String>, partition_node: impl Into<String>) -> Self {
        Self {
            device_node: device_node.into(),
            partition_node: partition_node.into(),
        }
    }

    pub fn description(&self) -> String {
        format!("Delete partition {}", self.partition_node)
    }

    pub(crate) fn run(&self, parent: &mut Report, ctx: &ExecContext<'_>) -> JobOutcome {
        let report = parent.child(self.description());
        match ctx
            .backend
            .delete_partition(&self.device_node, &self.partition_node)
        {
            Ok(()) => JobOutcome::Success,
            Err(e) => {
                report.line(e.to_string());
                JobOutcome::Failed
            }
        }
    }
}

#[derive(Debug)]
pub struct SetGeometryJob {
    device_node: String,
    partition_node: String,
    new_range: SectorRange,
}

impl SetGeometryJob {
    pub fn new(
        device_node: impl Into<String>,
        partition_node: impl Into<String>,
        new_range: SectorRange,
    ) -> Self {
        Self {
            device_node: device_node.into(),
            partition_node: partition_node.into(),
            new_range,
        }
    }

    pub fn description(&self) -> String {
        format!(
            "Set geometry of partition {}: start sector {}, length {}",
            self.partition_node,
            self.new_range.start,
            self.new_range.len()
        )
    }

    pub(crate) fn run(&self, parent: &mut Report, ctx: &ExecContext<'_>) -> JobOutcome {
        let report = parent.child(self.description());
        match ctx
            .backend
            .resize_partition(&self.device_node, &self.partition_node, self.new_range)
        {
            Ok(()) => JobOutcome::Success,
            Err(e) => {
                report.line(e.to_string());
                JobOutcome::Failed
            }
        }
    }
}

#[derive(Debug)]
pub struct SetPartitionFlagsJob {
    device_node: String,
    partition_node: String,
    flags: PartitionFlags,
}

impl SetPartitionFlagsJob {
    pub fn new(
        device_node: impl Into<String>,
        partition_node: impl Into<String>,
        flags: PartitionFlags,
    ) -> Self {
        Self {
            device_node: device_node.into(),
            partition_node: partition_node.into(),
            flags,
        }
    }

    pub fn description(&self) -> String {
        format!("Set flags for partition {}", self.partition_node)
    }

    pub(crate) fn run(&self, parent: &mut Report, ctx: &ExecContext<'_>) -> JobOutcome {
        let report = parent.child(self.description());
        match ctx
            .backend
            .set_partition_flags(&self.device_node, &self.partition_node, self.flags)
        {
            Ok(()) => JobOutcome::Success,
            Err(e) => {
                report.line(e.to_string());
                JobOutcome::Failed
            }
        }
    }
}
