// SPDX-License-Identifier: GPL-3.0-only

//! NTFS via ntfs-3g/ntfsprogs.

use partition_types::{Capability, FsType, Support};

use crate::backend::ToolRunner;
use crate::error::Result;
use crate::fs::{FileSystem, external_tool};
use crate::report::Report;

#[derive(Debug, Default)]
pub struct Ntfs {
    label: Option<String>,
    uuid: Option<String>,
}

impl Ntfs {
    pub fn new() -> Self {
        Self::default()
    }
}

impl FileSystem for Ntfs {
    fn fs_type(&self) -> FsType {
        FsType::Ntfs
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
        2 * (1 << 20)
    }

    fn max_capacity(&self) -> u64 {
        256 * (1 << 40)
    }

    fn support(&self, capability: Capability, tools: &dyn ToolRunner) -> Support {
        match capability {
            Capability::Create => external_tool(tools, "mkfs.ntfs"),
            Capability::Check => external_tool(tools, "ntfsresize"),
            Capability::Grow | Capability::Shrink => external_tool(tools, "ntfsresize"),
            Capability::Move => {
                if tools.find("ntfsresize") {
                    Support::Library
                } else {
                    Support::None
                }
            }
            Capability::ReadLabel | Capability::ReadUuid => Support::Library,
            Capability::WriteLabel => external_tool(tools, "ntfslabel"),
            Capability::UpdateUuid | Capability::ReadUsed => Support::None,
        }
    }

    fn create(&self, report: &mut Report, tools: &dyn ToolRunner, node: &str) -> Result<()> {
        report.line(format!("mkfs.ntfs -Q -F {node}"));
        tools.run("mkfs.ntfs", &["-Q", "-F", node]).map(|_| ())
    }

    fn resize(
        &self,
        report: &mut Report,
        tools: &dyn ToolRunner,
        node: &str,
        new_byte_length: u64,
    ) -> Result<()> {
        let size = new_byte_length.to_string();
        report.line(format!("ntfsresize --force --size {size} {node}"));
        tools
            .run("ntfsresize", &["--force", "--size", size.as_str(), node])
            .map(|_| ())
    }

    fn check(&self, report: &mut Report, tools: &dyn ToolRunner, node: &str) -> Result<()> {
        report.line(format!("ntfsresize --info --force {node}"));
        tools
            .run("ntfsresize", &["--info", "--force", node])
            .map(|_| ())
    }

    fn write_label(
        &self,
        report: &mut Report,
        tools: &dyn ToolRunner,
        node: &str,
        label: &str,
    ) -> Result<()> {
        report.line(format!("ntfslabel --force {node} {label}"));
        tools
            .run("ntfslabel", &["--force", node, label])
            .map(|_| ())
    }
}
