// SPDX-License-Identifier: GPL-3.0-only

//! Atomic device-affecting actions.
//!
//! A job is the smallest unit of real work: it runs against the backend (or
//! an external filesystem tool), records its outcome into the hierarchical
//! report, and never panics or retries. Jobs are strictly ordered within an
//! operation; the operation aborts the remaining jobs on the first failure.

mod filesystem;
mod lvm;
mod partition;

pub use filesystem::{
    CheckFileSystemJob, CreateFileSystemJob, DeleteFileSystemJob, MoveFileSystemJob,
    ResizeFileSystemJob, SetFileSystemLabelJob, ShredFileSystemJob, UpdateUuidJob,
};
pub use lvm::{MovePhysicalVolumeJob, migration_destinations};
pub use partition::{
    CreatePartitionJob, DeletePartitionJob, SetGeometryJob, SetPartitionFlagsJob,
};

use crate::backend::ExecContext;
use crate::report::Report;

/// Result of one job run.
///
/// `Degraded` means a non-essential capability was missing and the job was
/// skipped; the owning operation finishes with `Warning` instead of
/// `Success`, but execution continues.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum JobOutcome {
    Success,
    Degraded,
    Failed,
}

impl JobOutcome {
    pub fn is_failure(&self) -> bool {
        matches!(self, JobOutcome::Failed)
    }
}

/// The atomic actions an operation decomposes into
#[derive(Debug)]
pub enum Job {
    CreatePartition(CreatePartitionJob),
    DeletePartition(DeletePartitionJob),
    SetGeometry(SetGeometryJob),
    SetPartitionFlags(SetPartitionFlagsJob),
    CreateFileSystem(CreateFileSystemJob),
    DeleteFileSystem(DeleteFileSystemJob),
    ShredFileSystem(ShredFileSystemJob),
    ResizeFileSystem(ResizeFileSystemJob),
    MoveFileSystem(MoveFileSystemJob),
    CheckFileSystem(CheckFileSystemJob),
    SetFileSystemLabel(SetFileSystemLabelJob),
    UpdateUuid(UpdateUuidJob),
    MovePhysicalVolume(MovePhysicalVolumeJob),
}

impl Job {
    /// Run the job, recording its outcome under `parent`
    pub fn run(&self, parent: &mut Report, ctx: &ExecContext<'_>) -> JobOutcome {
        tracing::debug!("job: {}", self.description());
        let outcome = match self {
            Job::CreatePartition(job) => job.run(parent, ctx),
            Job::DeletePartition(job) => job.run(parent, ctx),
            Job::SetGeometry(job) => job.run(parent, ctx),
            Job::SetPartitionFlags(job) => job.run(parent, ctx),
            Job::CreateFileSystem(job) => job.run(parent, ctx),
            Job::DeleteFileSystem(job) => job.run(parent, ctx),
            Job::ShredFileSystem(job) => job.run(parent, ctx),
            Job::ResizeFileSystem(job) => job.run(parent, ctx),
            Job::MoveFileSystem(job) => job.run(parent, ctx),
            Job::CheckFileSystem(job) => job.run(parent, ctx),
            Job::SetFileSystemLabel(job) => job.run(parent, ctx),
            Job::UpdateUuid(job) => job.run(parent, ctx),
            Job::MovePhysicalVolume(job) => job.run(parent, ctx),
        };
        if outcome.is_failure() {
            tracing::error!("job failed: {}", self.description());
        }
        outcome
    }

    pub fn description(&self) -> String {
        match self {
            Job::CreatePartition(job) => job.description(),
            Job::DeletePartition(job) => job.description(),
            Job::SetGeometry(job) => job.description(),
            Job::SetPartitionFlags(job) => job.description(),
            Job::CreateFileSystem(job) => job.description(),
            Job::DeleteFileSystem(job) => job.description(),
            Job::ShredFileSystem(job) => job.description(),
            Job::ResizeFileSystem(job) => job.description(),
            Job::MoveFileSystem(job) => job.description(),
            Job::CheckFileSystem(job) => job.description(),
            Job::SetFileSystemLabel(job) => job.description(),
            Job::UpdateUuid(job) => job.description(),
            Job::MovePhysicalVolume(job) => job.description(),
        }
    }
}
