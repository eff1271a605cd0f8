// SPDX-License-Identifier: GPL-3.0-only

//! Jobs that act on a partition's filesystem.
//!
//! Capability-backed jobs query the filesystem's support level at run time
//! and skip with a `Degraded` outcome when the capability is missing, so the
//! owning operation finishes with a Warning instead of an Error.

use partition_types::{Capability, FsType, SectorRange};

use crate::backend::ExecContext;
use crate::fs;
use crate::jobs::JobOutcome;
use crate::report::Report;

fn run_capability(
    parent: &mut Report,
    ctx: &ExecContext<'_>,
    description: String,
    fs_type: FsType,
    capability: Capability,
    action: impl FnOnce(&dyn fs::FileSystem, &mut Report) -> crate::error::Result<()>,
) -> JobOutcome {
    let report = parent.child(description);
    let fs = fs::make(fs_type);
    if !fs.support(capability, ctx.tools).is_supported() {
        report.line(format!("skipped: not supported on {fs_type}"));
        tracing::warn!("capability {capability:?} unavailable for {fs_type}, skipping");
        return JobOutcome::Degraded;
    }
    match action(fs.as_ref(), &mut *report) {
        Ok(()) => JobOutcome::Success,
        Err(e) => {
            report.line(e.to_string());
            JobOutcome::Failed
        }
    }
}

#[derive(Debug)]
pub struct CreateFileSystemJob {
    partition_node: String,
    fs_type: FsType,
}

impl CreateFileSystemJob {
    pub fn new(partition_node: impl Into<String>, fs_type: FsType) -> Self {
        Self {
            partition_node: partition_node.into(),
            fs_type,
        }
    }

    pub fn description(&self) -> String {
        format!(
            "Create file system {} on {}",
            self.fs_type, self.partition_node
        )
    }

    pub(crate) fn run(&self, parent: &mut Report, ctx: &ExecContext<'_>) -> JobOutcome {
        run_capability(
            parent,
            ctx,
            self.description(),
            self.fs_type,
            Capability::Create,
            |fs, report| fs.create(report, ctx.tools, &self.partition_node),
        )
    }
}

#[derive(Debug)]
pub struct DeleteFileSystemJob {
    partition_node: String,
}

impl DeleteFileSystemJob {
    pub fn new(partition_node: impl Into<String>) -> Self {
        Self {
            partition_node: partition_node.into(),
        }
    }

    pub fn description(&self) -> String {
        format!("Delete file system on {}", self.partition_node)
    }

    pub(crate) fn run(&self, parent: &mut Report, ctx: &ExecContext<'_>) -> JobOutcome {
        let report = parent.child(self.description());
        match ctx.backend.wipe_filesystem(&self.partition_node) {
            Ok(()) => JobOutcome::Success,
            Err(e) => {
                report.line(e.to_string());
                JobOutcome::Failed
            }
        }
    }
}

#[derive(Debug)]
pub struct ShredFileSystemJob {
    partition_node: String,
    range: SectorRange,
    random: bool,
}

impl ShredFileSystemJob {
    pub fn new(partition_node: impl Into<String>, range: SectorRange, random: bool) -> Self {
        Self {
            partition_node: partition_node.into(),
            range,
            random,
        }
    }

    pub fn description(&self) -> String {
        if self.random {
            format!(
                "Shred file system on {} with random data",
                self.partition_node
            )
        } else {
            format!("Shred file system on {} with zeros", self.partition_node)
        }
    }

    pub(crate) fn run(&self, parent: &mut Report, ctx: &ExecContext<'_>) -> JobOutcome {
        let report = parent.child(self.description());
        match ctx.backend.shred(&self.partition_node, self.range, self.random) {
            Ok(()) => JobOutcome::Success,
            Err(e) => {
                report.line(e.to_string());
                JobOutcome::Failed
            }
        }
    }
}

#[derive(Debug)]
pub struct ResizeFileSystemJob {
    partition_node: String,
    fs_type: FsType,
    new_byte_length: u64,
    shrink: bool,
}

impl ResizeFileSystemJob {
    pub fn new(
        partition_node: impl Into<String>,
        fs_type: FsType,
        new_byte_length: u64,
        shrink: bool,
    ) -> Self {
        Self {
            partition_node: partition_node.into(),
            fs_type,
            new_byte_length,
            shrink,
        }
    }

    pub fn description(&self) -> String {
        format!(
            "Resize file system on {} to {} bytes",
            self.partition_node, self.new_byte_length
        )
    }

    pub(crate) fn run(&self, parent: &mut Report, ctx: &ExecContext<'_>) -> JobOutcome {
        let capability = if self.shrink {
            Capability::Shrink
        } else {
            Capability::Grow
        };
        run_capability(
            parent,
            ctx,
            self.description(),
            self.fs_type,
            capability,
            |fs, report| fs.resize(report, ctx.tools, &self.partition_node, self.new_byte_length),
        )
    }
}

#[derive(Debug)]
pub struct MoveFileSystemJob {
    device_node: String,
    partition_node: String,
    fs_type: FsType,
    source: SectorRange,
    dest_start: u64,
}

impl MoveFileSystemJob {
    pub fn new(
        device_node: impl Into<String>,
        partition_node: impl Into<String>,
        fs_type: FsType,
        source: SectorRange,
        dest_start: u64,
    ) -> Self {
        Self {
            device_node: device_node.into(),
            partition_node: partition_node.into(),
            fs_type,
            source,
            dest_start,
        }
    }

    pub fn description(&self) -> String {
        format!(
            "Move file system on {} to sector {}",
            self.partition_node, self.dest_start
        )
    }

    pub(crate) fn run(&self, parent: &mut Report, ctx: &ExecContext<'_>) -> JobOutcome {
        let report = parent.child(self.description());
        let fs = fs::make(self.fs_type);
        if !fs.support(Capability::Move, ctx.tools).is_supported() {
            report.line(format!("skipped: moving {} is not supported", self.fs_type));
            return JobOutcome::Degraded;
        }
        match ctx
            .backend
            .copy_blocks(&self.device_node, self.source, self.dest_start)
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
pub struct CheckFileSystemJob {
    partition_node: String,
    fs_type: FsType,
}

impl CheckFileSystemJob {
    pub fn new(partition_node: impl Into<String>, fs_type: FsType) -> Self {
        Self {
            partition_node: partition_node.into(),
            fs_type,
        }
    }

    pub fn description(&self) -> String {
        format!("Check file system on {}", self.partition_node)
    }

    pub(crate) fn run(&self, parent: &mut Report, ctx: &ExecContext<'_>) -> JobOutcome {
        run_capability(
            parent,
            ctx,
            self.description(),
            self.fs_type,
            Capability::Check,
            |fs, report| fs.check(report, ctx.tools, &self.partition_node),
        )
    }
}

#[derive(Debug)]
pub struct SetFileSystemLabelJob {
    partition_node: String,
    fs_type: FsType,
    label: String,
}

impl SetFileSystemLabelJob {
    pub fn new(partition_node: impl Into<String>, fs_type: FsType, label: impl Into<String>) -> Self {
        Self {
            partition_node: partition_node.into(),
            fs_type,
            label: label.into(),
        }
    }

    pub fn description(&self) -> String {
        format!(
            "Set label of file system on {} to \"{}\"",
            self.partition_node, self.label
        )
    }

    pub(crate) fn run(&self, parent: &mut Report, ctx: &ExecContext<'_>) -> JobOutcome {
        run_capability(
            parent,
            ctx,
            self.description(),
            self.fs_type,
            Capability::WriteLabel,
            |fs, report| fs.write_label(report, ctx.tools, &self.partition_node, &self.label),
        )
    }
}

#[derive(Debug)]
pub struct UpdateUuidJob {
    partition_node: String,
    fs_type: FsType,
}

impl UpdateUuidJob {
    pub fn new(partition_node: impl Into<String>, fs_type: FsType) -> Self {
        Self {
            partition_node: partition_node.into(),
            fs_type,
        }
    }

    pub fn description(&self) -> String {
        format!("Update UUID of file system on {}", self.partition_node)
    }

    pub(crate) fn run(&self, parent: &mut Report, ctx: &ExecContext<'_>) -> JobOutcome {
        run_capability(
            parent,
            ctx,
            self.description(),
            self.fs_type,
            Capability::UpdateUuid,
            |fs, report| fs.update_uuid(report, ctx.tools, &self.partition_node),
        )
    }
}
