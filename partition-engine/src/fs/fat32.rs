// SPDX-License-Identifier: GPL-3.0-only

//! FAT32 via dosfstools (and fatresize when present).

use partition_types::{Capability, FsType, Support};

use crate::backend::ToolRunner;
use crate::error::Result;
use crate::fs::{FileSystem, external_tool};
use crate::report::Report;

#[derive(Debug, Default)]
pub struct Fat32 {
    label: Option<String>,
    uuid: Option<String>,
}

impl Fat32 {
    pub fn new() -> Self {
        Self::default()
    }
}

impl FileSystem for Fat32 {
    fn fs_type(&self) -> FsType {
        FsType::Fat32
    }

    fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    fn set_label(&mut self, label: Option<String>) {
        self.label = label;
    }

    fn uuid(&self) -> Option<&str> {
        self.uuid.as_deref()
    }

    fn set_uuid(&mut self, uuid: Option<String>) {
        self.uuid = uuid;
    }

    fn min_capacity(&self) -> u64 {
        32 * (1 << 20)
    }

    fn max_capacity(&self) -> u64 {
        2 * (1 << 40)
    }

    fn support(&self, capability: Capability, tools: &dyn ToolRunner) -> Support {
        match capability {
            Capability::Create => external_tool(tools, "mkfs.fat"),
            Capability::Check => external_tool(tools, "fsck.fat"),
            Capability::Grow | Capability::Shrink => external_tool(tools, "fatresize"),
            Capability::Move => {
                if tools.find("fsck.fat") {
                    Support::Library
                } else {
                    Support::None
                }
            }
            Capability::ReadLabel | Capability::ReadUuid => Support::Library,
            Capability::WriteLabel => external_tool(tools, "fatlabel"),
            Capability::UpdateUuid | Capability::ReadUsed => Support::None,
        }
    }

    fn create(&self, report: &mut Report, tools: &dyn ToolRunner, node: &str) -> Result<()> {
        report.line(format!("mkfs.fat -F32 {node}"));
        tools.run("mkfs.fat", &["-F32", node]).map(|_| ())
    }

    fn resize(
        &self,
        report: &mut Report,
        tools: &dyn ToolRunner,
        node: &str,
        new_byte_length: u64,
    ) -> Result<()> {
        let size = new_byte_length.to_string();
        report.line(format!("fatresize -s {size} {node}"));
        tools.run("fatresize", &["-s", size.as_str(), node]).map(|_| ())
    }

    fn check(&self, report: &mut Report, tools: &dyn ToolRunner, node: &str) -> Result<()> {
        report.line(format!("fsck.fat -a -w {node}"));
        tools.run("fsck.fat", &["-a", "-w", node]).map(|_| ())
    }

    fn write_label(
        &self,
        report: &mut Report,
        tools: &dyn ToolRunner,
        node: &str,
        label: &str,
    ) -> Result<()> {
        report.line(format!("fatlabel {node} {label}"));
        tools.run("fatlabel", &[node, label]).map(|_| ())
    }
}
