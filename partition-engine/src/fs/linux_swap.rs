// SPDX-License-Identifier: GPL-3.0-only

//! Linux swap space. Resizing recreates the swap signature, so grow and
//! shrink are available whenever mkswap is.

use partition_types::{Capability, FsType, Support};
use uuid::Uuid;

use crate::backend::ToolRunner;
use crate::error::Result;
use crate::fs::{FileSystem, external_tool};
use crate::report::Report;

#[derive(Debug, Default)]
pub struct LinuxSwap {
    label: Option<String>,
    uuid: Option<String>,
}

impl LinuxSwap {
    pub fn new() -> Self {
        Self::default()
    }

    fn mkswap(&self, report: &mut Report, tools: &dyn ToolRunner, node: &str) -> Result<()> {
        match self.label.as_deref() {
            Some(label) => {
                report.line(format!("mkswap -L {label} {node}"));
                tools.run("mkswap", &["-L", label, node]).map(|_| ())
            }
            None => {
                report.line(format!("mkswap {node}"));
                tools.run("mkswap", &[node]).map(|_| ())
            }
        }
    }
}

impl FileSystem for LinuxSwap {
    fn fs_type(&self) -> FsType {
        FsType::LinuxSwap
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
        40 * 1024
    }

    fn support(&self, capability: Capability, tools: &dyn ToolRunner) -> Support {
        match capability {
            Capability::Create
            | Capability::Grow
            | Capability::Shrink
            | Capability::WriteLabel
            | Capability::UpdateUuid => external_tool(tools, "mkswap"),
            Capability::Move => {
                if tools.find("mkswap") {
                    Support::Library
                } else {
                    Support::None
                }
            }
            Capability::ReadLabel | Capability::ReadUuid => Support::Library,
            // Inactive swap has no used capacity to preserve.
            Capability::ReadUsed => Support::Library,
            Capability::Check => Support::None,
        }
    }

    fn create(&self, report: &mut Report, tools: &dyn ToolRunner, node: &str) -> Result<()> {
        self.mkswap(report, tools, node)
    }

    fn resize(
        &self,
        report: &mut Report,
        tools: &dyn ToolRunner,
        node: &str,
        _new_byte_length: u64,
    ) -> Result<()> {
        self.mkswap(report, tools, node)
    }

    fn write_label(
        &self,
        report: &mut Report,
        tools: &dyn ToolRunner,
        node: &str,
        label: &str,
    ) -> Result<()> {
        report.line(format!("mkswap -L {label} {node}"));
        tools.run("mkswap", &["-L", label, node]).map(|_| ())
    }

    fn update_uuid(&self, report: &mut Report, tools: &dyn ToolRunner, node: &str) -> Result<()> {
        let uuid = Uuid::new_v4().to_string();
        report.line(format!("mkswap -U {uuid} {node}"));
        tools.run("mkswap", &["-U", uuid.as_str(), node]).map(|_| ())
    }

    fn read_used_bytes(&self, _tools: &dyn ToolRunner, _node: &str) -> Result<u64> {
        Ok(0)
    }
}
