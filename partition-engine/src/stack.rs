// SPDX-License-Identifier: GPL-3.0-only

//! The undo stack of pending operations.
//!
//! The stack owns the scanned devices and every operation queued against
//! them. Pushing an operation may merge it with an earlier pending one when
//! the pair collapses to something simpler; popping undoes the preview. A
//! commit pass executes pending operations in order and stops at the first
//! error, leaving the rest pending.

use crate::backend::{CoreBackend, ExecContext, scan_device_nodes};
use crate::core::Device;
use crate::error::{EngineError, Result};
use crate::ops::{Operation, OperationStatus, ResizeOperation};
use crate::report::Report;

#[derive(Default)]
pub struct OperationStack {
    devices: Vec<Device>,
    operations: Vec<Operation>,
}

enum Merge {
    CancelNew,
    Resize,
    Flags,
    Label,
}

impl OperationStack {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rescan all devices, discarding any queued operations
    pub fn scan(&mut self, backend: &dyn CoreBackend) -> Result<()> {
        self.operations.clear();
        self.devices = backend.scan_devices()?;
        tracing::info!("scanned {} devices", self.devices.len());
        Ok(())
    }

    /// Rescan the given device nodes, discarding any queued operations
    pub fn scan_nodes(&mut self, backend: &dyn CoreBackend, nodes: &[String]) -> Result<()> {
        self.operations.clear();
        self.devices = scan_device_nodes(backend, nodes)?;
        Ok(())
    }

    pub fn add_device(&mut self, device: Device) {
        self.devices.push(device);
    }

    pub fn devices(&self) -> &[Device] {
        &self.devices
    }

    pub fn device(&self, node: &str) -> Option<&Device> {
        self.devices.iter().find(|d| d.node() == node)
    }

    pub fn device_mut(&mut self, node: &str) -> Option<&mut Device> {
        self.devices.iter_mut().find(|d| d.node() == node)
    }

    pub fn operations(&self) -> &[Operation] {
        &self.operations
    }

    /// Queue an operation. The operation's preview is already applied by its
    /// constructor; pushing marks it `Pending` and may merge it with the
    /// most recent pending operation on the same partition.
    pub fn push(&mut self, op: Operation) {
        tracing::info!("push: {}", op.description());
        if let Some(mut op) = self.try_merge(op) {
            op.set_status(OperationStatus::Pending);
            self.operations.push(op);
        }
        debug_assert!(
            self.devices
                .iter()
                .all(|d| d.table().check_consistency().is_ok())
        );
    }

    /// Collapse `op` with the newest pending operation targeting the same
    /// partition, when the pair has a simpler equivalent:
    ///
    /// * delete after a still-pending create drops both,
    /// * resize after resize becomes one resize from the original geometry
    ///   (and vanishes entirely when the geometry is back where it started),
    /// * a newer flag or label change replaces the pending one.
    ///
    /// Returns the operation still to be queued, if any. The in-memory
    /// preview is unaffected either way; merging only rewrites the queue.
    fn try_merge(&mut self, op: Operation) -> Option<Operation> {
        let device_node = op.device_node().to_string();
        let target = op.partition_node().to_string();
        let Some(prev) = self.operations.iter().rposition(|existing| {
            existing.status() == OperationStatus::Pending
                && existing.device_node() == device_node
                && existing.partition_node() == target
        }) else {
            return Some(op);
        };
        let merge = match (&self.operations[prev], &op) {
            (Operation::New(_), Operation::Delete(_)) => Some(Merge::CancelNew),
            (Operation::Resize(_), Operation::Resize(_)) => Some(Merge::Resize),
            (Operation::SetFlags(_), Operation::SetFlags(_)) => Some(Merge::Flags),
            (Operation::SetLabel(_), Operation::SetLabel(_)) => Some(Merge::Label),
            _ => None,
        };
        let Some(merge) = merge else {
            return Some(op);
        };

        match merge {
            Merge::CancelNew => {
                // the delete's preview removed exactly what the create's
                // preview added; the queue needs neither
                tracing::info!("delete cancels the pending creation of {target}");
                self.operations.remove(prev);
                None
            }
            Merge::Resize => {
                let Operation::Resize(older) = self.operations.remove(prev) else {
                    return Some(op);
                };
                let Operation::Resize(newer) = op else {
                    return Some(Operation::Resize(older));
                };
                let original = *older.old_range();
                if newer.new_range() == &original {
                    tracing::info!("{target} is back at its original geometry");
                    return None;
                }
                let rebuilt = self
                    .device(&device_node)
                    .ok_or_else(|| EngineError::Device(format!("no device {device_node}")))
                    .and_then(|device| ResizeOperation::rebuilt(device, &target, original));
                match rebuilt {
                    Ok(merged) => {
                        tracing::info!("merged two resizes of {target}");
                        Some(Operation::Resize(merged))
                    }
                    Err(e) => {
                        // keep both so the undo target stays the original
                        // geometry
                        tracing::error!("resize merge failed: {e}");
                        self.operations.insert(prev, Operation::Resize(older));
                        Some(Operation::Resize(newer))
                    }
                }
            }
            Merge::Flags => {
                if let (Operation::SetFlags(older), Operation::SetFlags(newer)) =
                    (&mut self.operations[prev], op)
                {
                    older.replace_pending(newer);
                }
                None
            }
            Merge::Label => {
                if let (Operation::SetLabel(older), Operation::SetLabel(newer)) =
                    (&mut self.operations[prev], op)
                {
                    older.replace_pending(newer);
                }
                None
            }
        }
    }

    /// Undo and remove the newest operation, returning it with status `None`.
    /// Only still-pending operations can be popped; anything that already ran
    /// against the device stays until the next rescan.
    pub fn pop(&mut self) -> Option<Operation> {
        if self.operations.last()?.status() != OperationStatus::Pending {
            return None;
        }
        let mut op = self.operations.pop()?;
        tracing::info!("pop: {}", op.description());
        let device_node = op.device_node().to_string();
        if let Some(device) = self.device_mut(&device_node) {
            op.undo(device);
        }
        op.set_status(OperationStatus::None);
        debug_assert!(
            self.devices
                .iter()
                .all(|d| d.table().check_consistency().is_ok())
        );
        Some(op)
    }

    /// Undo and remove the operation at `index`, which must not have later
    /// operations depending on its preview. Attribute changes only conflict
    /// on the same partition; geometry changes conflict with any later
    /// geometry change on the same device.
    pub fn undo_at(&mut self, index: usize) -> Result<Operation> {
        if index >= self.operations.len() {
            return Err(EngineError::Validation(format!(
                "no operation at index {index}"
            )));
        }
        let op = &self.operations[index];
        if op.status() != OperationStatus::Pending {
            return Err(EngineError::Validation(format!(
                "operation \"{}\" already ran and cannot be undone",
                op.description()
            )));
        }
        let device_node = op.device_node().to_string();
        let target = op.partition_node().to_string();
        let geometry = Self::changes_geometry(op);

        let blocked = self.operations[index + 1..].iter().any(|later| {
            later.device_node() == device_node
                && (later.partition_node() == target
                    || (geometry && Self::changes_geometry(later)))
        });
        if blocked {
            return Err(EngineError::Validation(format!(
                "later pending operations depend on the preview of {target}"
            )));
        }

        let mut op = self.operations.remove(index);
        if let Some(device) = self.device_mut(&device_node) {
            op.undo(device);
        }
        op.set_status(OperationStatus::None);
        Ok(op)
    }

    fn changes_geometry(op: &Operation) -> bool {
        matches!(
            op,
            Operation::New(_) | Operation::Delete(_) | Operation::Resize(_)
        )
    }

    /// Undo all pending operations, newest first, then drop the rest.
    /// Operations that already ran need no undo; their effects are real and
    /// only a rescan reflects them.
    pub fn clear(&mut self) {
        while self.pop().is_some() {}
        self.operations.clear();
    }

    /// Execute all pending operations in queue order, holding exclusive
    /// access to every touched device for the whole pass. The first
    /// operation that finishes with `Error` stops the pass; everything
    /// after it stays `Pending`. Operations that ran keep their final
    /// status for inspection. Callers should rescan after a commit,
    /// whether it succeeded or not: the kernel may have assigned different
    /// node paths than the preview used.
    pub fn commit(&mut self, report: &mut Report, ctx: &ExecContext<'_>) -> Result<()> {
        let mut nodes: Vec<String> = Vec::new();
        for op in &self.operations {
            if op.status() == OperationStatus::Pending
                && !nodes.iter().any(|node| node == op.device_node())
            {
                nodes.push(op.device_node().to_string());
            }
        }
        tracing::info!("committing pending operations on {} devices", nodes.len());

        let mut opened: Vec<&String> = Vec::new();
        let mut result = Ok(());
        for node in &nodes {
            if let Err(e) = ctx.backend.open_device_exclusive(node) {
                tracing::error!("cannot get exclusive access to {node}: {e}");
                result = Err(e);
                break;
            }
            opened.push(node);
        }

        if result.is_ok() {
            for op in &mut self.operations {
                if op.status() != OperationStatus::Pending {
                    continue;
                }
                if op.execute(report, ctx) == OperationStatus::Error {
                    result = Err(EngineError::Device(format!(
                        "operation failed: {}",
                        op.description()
                    )));
                    break;
                }
            }
        }

        for node in opened.iter().rev() {
            if let Err(e) = ctx.backend.close_device(node) {
                tracing::warn!("failed to release {node}: {e}");
            }
        }
        result
    }
}
