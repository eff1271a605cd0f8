// SPDX-License-Identifier: GPL-3.0-only

//! User-intent operations.
//!
//! An operation is a planned change composed of an ordered list of jobs. Its
//! constructor validates the request, builds the jobs, and immediately
//! previews the intended post-state into the in-memory partition table;
//! `undo` is the strict inverse of that preview. Nothing touches the real
//! device until `execute` runs the jobs through the backend.

mod delete;
mod format;
mod new;
mod resize;
mod set_flags;
mod set_label;

pub use delete::DeleteOperation;
pub use format::FormatOperation;
pub use new::NewOperation;
pub use resize::ResizeOperation;
pub use set_flags::SetFlagsOperation;
pub use set_label::SetLabelOperation;

use crate::backend::ExecContext;
use crate::core::Device;
use crate::jobs::{Job, JobOutcome};
use crate::report::Report;

/// Operation state machine: `None -> Pending -> Running -> {Success,
/// Warning, Error}`, with `None`/`Pending` reachable backward via undo.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OperationStatus {
    #[default]
    None,
    Pending,
    Running,
    Success,
    Warning,
    Error,
}

/// A planned, previewed, undoable change to one device
pub enum Operation {
    New(NewOperation),
    Delete(DeleteOperation),
    Resize(ResizeOperation),
    SetFlags(SetFlagsOperation),
    SetLabel(SetLabelOperation),
    Format(FormatOperation),
}

macro_rules! dispatch {
    ($self:expr, $method:ident $(, $arg:expr)*) => {
        match $self {
            Operation::New(op) => op.$method($($arg),*),
            Operation::Delete(op) => op.$method($($arg),*),
            Operation::Resize(op) => op.$method($($arg),*),
            Operation::SetFlags(op) => op.$method($($arg),*),
            Operation::SetLabel(op) => op.$method($($arg),*),
            Operation::Format(op) => op.$method($($arg),*),
        }
    };
}

impl Operation {
    pub fn status(&self) -> OperationStatus {
        dispatch!(self, status)
    }

    pub(crate) fn set_status(&mut self, status: OperationStatus) {
        dispatch!(self, set_status, status)
    }

    /// Node path of the device this operation targets
    pub fn device_node(&self) -> &str {
        dispatch!(self, device_node)
    }

    /// Node path of the partition this operation targets
    pub fn partition_node(&self) -> &str {
        dispatch!(self, partition_node)
    }

    pub fn description(&self) -> String {
        dispatch!(self, description)
    }

    pub fn jobs(&self) -> &[Job] {
        dispatch!(self, jobs)
    }

    /// Revert the preview, restoring the in-memory table to the state it had
    /// before this operation was constructed
    pub(crate) fn undo(&mut self, device: &mut Device) {
        dispatch!(self, undo, device)
    }

    /// Run the owned jobs in order against the backend. Jobs are fail-fast:
    /// the first failure skips everything after it. All jobs succeeding with
    /// at least one degraded capability yields `Warning`.
    pub fn execute(&mut self, report: &mut Report, ctx: &ExecContext<'_>) -> OperationStatus {
        self.set_status(OperationStatus::Running);
        tracing::info!("executing: {}", self.description());

        let op_report = report.child(self.description());
        let mut degraded = false;
        let mut failed = false;
        for job in self.jobs() {
            match job.run(op_report, ctx) {
                JobOutcome::Success => {}
                JobOutcome::Degraded => degraded = true,
                JobOutcome::Failed => {
                    failed = true;
                    break;
                }
            }
        }

        let status = if failed {
            OperationStatus::Error
        } else if degraded {
            OperationStatus::Warning
        } else {
            OperationStatus::Success
        };
        self.set_status(status);
        status
    }
}
