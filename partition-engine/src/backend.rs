// SPDX-License-Identifier: GPL-3.0-only

//! Backend seams.
//!
//! The engine is backend-agnostic: everything that touches a real device goes
//! through [`CoreBackend`] (table-edit and LVM primitives, device scanning),
//! and everything that invokes a filesystem helper goes through
//! [`ToolRunner`]. Both are injected at execution time, so tests substitute
//! fakes that record calls. Every primitive returns a `Result`; there is no
//! process-wide last-error state.

use std::process::Command;

use partition_types::{PartitionFlags, PartitionRoles, SectorRange};
use rayon::prelude::*;

use crate::core::Device;
use crate::error::{EngineError, Result};

/// Low-level device/partition primitives
pub trait CoreBackend: Send + Sync {
    /// Scan all block devices visible to the backend
    fn scan_devices(&self) -> Result<Vec<Device>>;

    /// Scan a single device node
    fn scan_device(&self, node: &str) -> Result<Device>;

    /// Open a device for shared access
    fn open_device(&self, node: &str) -> Result<()>;

    /// Acquire exclusive access to a device for the duration of a commit
    /// pass; paired with [`CoreBackend::close_device`]
    fn open_device_exclusive(&self, node: &str) -> Result<()>;

    /// Release a device opened with either open call
    fn close_device(&self, node: &str) -> Result<()>;

    /// Create a partition table entry; returns the node path the kernel
    /// assigned to the new partition
    fn create_partition(
        &self,
        device_node: &str,
        roles: PartitionRoles,
        range: SectorRange,
    ) -> Result<String>;

    fn delete_partition(&self, device_node: &str, partition_node: &str) -> Result<()>;

    fn resize_partition(
        &self,
        device_node: &str,
        partition_node: &str,
        new_range: SectorRange,
    ) -> Result<()>;

    fn set_partition_flags(
        &self,
        device_node: &str,
        partition_node: &str,
        flags: PartitionFlags,
    ) -> Result<()>;

    /// Remove filesystem signatures from a partition
    fn wipe_filesystem(&self, partition_node: &str) -> Result<()>;

    /// Overwrite the partition's sectors with zeros, or with random data
    /// when `random` is set
    fn shred(&self, partition_node: &str, range: SectorRange, random: bool) -> Result<()>;

    /// Copy a block range to a new start sector on the same device (used to
    /// move filesystem contents during a partition move)
    fn copy_blocks(
        &self,
        device_node: &str,
        source: SectorRange,
        dest_start: u64,
    ) -> Result<()>;

    /// Physical volumes belonging to an LVM volume group
    fn list_physical_volumes(&self, vg_name: &str) -> Result<Vec<String>>;

    /// Relocate all extents of `source` onto the given target volumes
    fn move_physical_volume(&self, vg_name: &str, source: &str, targets: &[String]) -> Result<()>;
}

/// External filesystem-tool invocation seam
pub trait ToolRunner: Send + Sync {
    /// Whether the given program is available
    fn find(&self, program: &str) -> bool;

    /// Run the program and return its stdout; non-zero exit is an error
    fn run(&self, program: &str, args: &[&str]) -> Result<String>;
}

/// Runs tools on the live system
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemToolRunner;

impl ToolRunner for SystemToolRunner {
    fn find(&self, program: &str) -> bool {
        which::which(program).is_ok()
    }

    fn run(&self, program: &str, args: &[&str]) -> Result<String> {
        tracing::debug!("running {program} {}", args.join(" "));
        let output = Command::new(program).args(args).output()?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(EngineError::Tool(format!("{program} failed: {stderr}")));
        }
        Ok(String::from_utf8_lossy(&output.stdout).to_string())
    }
}

/// Everything a job needs to act on the real system
pub struct ExecContext<'a> {
    pub backend: &'a dyn CoreBackend,
    pub tools: &'a dyn ToolRunner,
}

impl<'a> ExecContext<'a> {
    pub fn new(backend: &'a dyn CoreBackend, tools: &'a dyn ToolRunner) -> Self {
        Self { backend, tools }
    }
}

/// Scan several device nodes in parallel. Scans are independent per device;
/// results come back in input order.
pub fn scan_device_nodes(backend: &dyn CoreBackend, nodes: &[String]) -> Result<Vec<Device>> {
    nodes
        .par_iter()
        .map(|node| backend.scan_device(node))
        .collect()
}
