// SPDX-License-Identifier: GPL-3.0-only

#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::Mutex;

use partition_engine::backend::{CoreBackend, ToolRunner};
use partition_engine::core::{Device, Partition, PartitionTable};
use partition_engine::error::{EngineError, Result};
use partition_engine::fs;
use partition_types::{
    FsType, PartitionFlags, PartitionRole, PartitionRoles, SectorRange, TableType,
};

/// Records every primitive call and fails the ones it is told to fail
#[derive(Default)]
pub struct FakeBackend {
    calls: Mutex<Vec<String>>,
    failures: Mutex<HashSet<&'static str>>,
    volume_groups: Mutex<Vec<(String, Vec<String>)>>,
}

impl FakeBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail(&self, primitive: &'static str) {
        self.failures.lock().unwrap().insert(primitive);
    }

    pub fn add_volume_group(&self, vg_name: &str, members: &[&str]) {
        self.volume_groups.lock().unwrap().push((
            vg_name.to_string(),
            members.iter().map(|m| m.to_string()).collect(),
        ));
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }

    fn gate(&self, primitive: &str) -> Result<()> {
        if self.failures.lock().unwrap().contains(primitive) {
            Err(EngineError::Device(format!("{primitive} failed")))
        } else {
            Ok(())
        }
    }
}

impl CoreBackend for FakeBackend {
    fn scan_devices(&self) -> Result<Vec<Device>> {
        self.record("scan_devices".into());
        Ok(Vec::new())
    }

    fn scan_device(&self, node: &str) -> Result<Device> {
        self.record(format!("scan_device {node}"));
        self.gate("scan_device")?;
        Ok(gpt_device(node))
    }

    fn open_device(&self, node: &str) -> Result<()> {
        self.record(format!("open_device {node}"));
        self.gate("open_device")
    }

    fn open_device_exclusive(&self, node: &str) -> Result<()> {
        self.record(format!("open_device_exclusive {node}"));
        self.gate("open_device_exclusive")
    }

    fn close_device(&self, node: &str) -> Result<()> {
        self.record(format!("close_device {node}"));
        self.gate("close_device")
    }

    fn create_partition(
        &self,
        device_node: &str,
        _roles: PartitionRoles,
        range: SectorRange,
    ) -> Result<String> {
        self.record(format!(
            "create_partition {device_node} {}..{}",
            range.start, range.end
        ));
        self.gate("create_partition")?;
        Ok(format!("{device_node}1"))
    }

    fn delete_partition(&self, device_node: &str, partition_node: &str) -> Result<()> {
        self.record(format!("delete_partition {device_node} {partition_node}"));
        self.gate("delete_partition")
    }

    fn resize_partition(
        &self,
        device_node: &str,
        partition_node: &str,
        new_range: SectorRange,
    ) -> Result<()> {
        self.record(format!(
            "resize_partition {device_node} {partition_node} {}..{}",
            new_range.start, new_range.end
        ));
        self.gate("resize_partition")
    }

    fn set_partition_flags(
        &self,
        device_node: &str,
        partition_node: &str,
        _flags: PartitionFlags,
    ) -> Result<()> {
        self.record(format!("set_partition_flags {device_node} {partition_node}"));
        self.gate("set_partition_flags")
    }

    fn wipe_filesystem(&self, partition_node: &str) -> Result<()> {
        self.record(format!("wipe_filesystem {partition_node}"));
        self.gate("wipe_filesystem")
    }

    fn shred(&self, partition_node: &str, range: SectorRange, random: bool) -> Result<()> {
        self.record(format!(
            "shred {partition_node} {}..{} random={random}",
            range.start, range.end
        ));
        self.gate("shred")
    }

    fn copy_blocks(&self, device_node: &str, source: SectorRange, dest_start: u64) -> Result<()> {
        self.record(format!(
            "copy_blocks {device_node} {}..{} -> {dest_start}",
            source.start, source.end
        ));
        self.gate("copy_blocks")
    }

    fn list_physical_volumes(&self, vg_name: &str) -> Result<Vec<String>> {
        self.record(format!("list_physical_volumes {vg_name}"));
        self.gate("list_physical_volumes")?;
        self.volume_groups
            .lock()
            .unwrap()
            .iter()
            .find(|(name, _)| name == vg_name)
            .map(|(_, members)| members.clone())
            .ok_or_else(|| EngineError::Device(format!("no volume group {vg_name}")))
    }

    fn move_physical_volume(&self, vg_name: &str, source: &str, targets: &[String]) -> Result<()> {
        self.record(format!(
            "move_physical_volume {vg_name} {source} -> {}",
            targets.join(",")
        ));
        self.gate("move_physical_volume")
    }
}

/// Pretends the given programs are installed; runs succeed with empty output
#[derive(Default)]
pub struct FakeTools {
    available: HashSet<String>,
    runs: Mutex<Vec<String>>,
    failures: Mutex<HashSet<String>>,
}

impl FakeTools {
    pub fn with(programs: &[&str]) -> Self {
        Self {
            available: programs.iter().map(|p| p.to_string()).collect(),
            ..Self::default()
        }
    }

    pub fn none() -> Self {
        Self::default()
    }

    pub fn fail(&self, program: &str) {
        self.failures.lock().unwrap().insert(program.to_string());
    }

    pub fn runs(&self) -> Vec<String> {
        self.runs.lock().unwrap().clone()
    }
}

impl ToolRunner for FakeTools {
    fn find(&self, program: &str) -> bool {
        self.available.contains(program)
    }

    fn run(&self, program: &str, args: &[&str]) -> Result<String> {
        self.runs
            .lock()
            .unwrap()
            .push(format!("{program} {}", args.join(" ")));
        if self.failures.lock().unwrap().contains(program) {
            return Err(EngineError::Tool(format!("{program} failed")));
        }
        Ok(String::new())
    }
}

/// All the e2fsprogs helpers the ext jobs probe for
pub fn ext_tools() -> FakeTools {
    FakeTools::with(&[
        "mkfs.ext2", "mkfs.ext4", "e2fsck", "resize2fs", "dumpe2fs", "e2label", "tune2fs",
    ])
}

pub fn gpt_device(node: &str) -> Device {
    let table = PartitionTable::new(TableType::Gpt, SectorRange::new(2048, 2_000_000));
    Device::new(node, "Fake Disk", 512, 2_000_000, 255, 63, table)
}

pub fn dos_device(node: &str) -> Device {
    let table = PartitionTable::new(TableType::Dos, SectorRange::new(63, 2_000_000));
    Device::new(node, "Fake Disk", 512, 2_000_000, 255, 63, table)
}

pub fn ext4_primary(node: &str, start: u64, end: u64, number: u32) -> Partition {
    Partition::new(
        node,
        PartitionRole::Primary.into(),
        SectorRange::new(start, end),
        number,
        fs::make(FsType::Ext4),
    )
}

pub fn ext4_logical(node: &str, start: u64, end: u64, number: u32) -> Partition {
    Partition::new(
        node,
        PartitionRole::Logical.into(),
        SectorRange::new(start, end),
        number,
        fs::make(FsType::Ext4),
    )
}

pub fn extended(node: &str, start: u64, end: u64, number: u32) -> Partition {
    Partition::new(
        node,
        PartitionRole::Extended.into(),
        SectorRange::new(start, end),
        number,
        fs::make(FsType::Unformatted),
    )
}
