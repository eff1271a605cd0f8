// SPDX-License-Identifier: GPL-3.0-only

//! ext2/ext4 via e2fsprogs.

use partition_types::{Capability, FsType, Support};

use crate::backend::ToolRunner;
use crate::error::Result;
use crate::fs::{FileSystem, external_tool};
use crate::report::Report;

fn ext_support(capability: Capability, tools: &dyn ToolRunner, mkfs_tool: &str) -> Support {
    match capability {
        Capability::Create => external_tool(tools, mkfs_tool),
        Capability::Check => external_tool(tools, "e2fsck"),
        Capability::Grow => {
            if tools.find("e2fsck") && tools.find("resize2fs") {
                Support::External
            } else {
                Support::None
            }
        }
        // Shrinking additionally needs the used-block count to refuse
        // shrinking below the occupied size.
        Capability::Shrink => {
            if tools.find("e2fsck") && tools.find("resize2fs") && tools.find("dumpe2fs") {
                Support::External
            } else {
                Support::None
            }
        }
        Capability::Move => {
            if tools.find("e2fsck") {
                Support::Library
            } else {
                Support::None
            }
        }
        Capability::ReadLabel | Capability::ReadUuid => Support::Library,
        Capability::WriteLabel => external_tool(tools, "e2label"),
        Capability::UpdateUuid => external_tool(tools, "tune2fs"),
        Capability::ReadUsed => external_tool(tools, "dumpe2fs"),
    }
}

fn ext_create(report: &mut Report, tools: &dyn ToolRunner, mkfs_tool: &str, node: &str) -> Result<()> {
    report.line(format!("{mkfs_tool} -q -F {node}"));
    tools.run(mkfs_tool, &["-q", "-F", node]).map(|_| ())
}

fn ext_resize(
    report: &mut Report,
    tools: &dyn ToolRunner,
    node: &str,
    new_byte_length: u64,
) -> Result<()> {
    let kib = format!("{}K", new_byte_length / 1024);
    report.line(format!("resize2fs {node} {kib}"));
    tools.run("resize2fs", &[node, kib.as_str()]).map(|_| ())
}

fn ext_check(report: &mut Report, tools: &dyn ToolRunner, node: &str) -> Result<()> {
    report.line(format!("e2fsck -f -y {node}"));
    tools.run("e2fsck", &["-f", "-y", node]).map(|_| ())
}

fn ext_write_label(
    report: &mut Report,
    tools: &dyn ToolRunner,
    node: &str,
    label: &str,
) -> Result<()> {
    report.line(format!("e2label {node} {label}"));
    tools.run("e2label", &[node, label]).map(|_| ())
}

fn ext_update_uuid(report: &mut Report, tools: &dyn ToolRunner, node: &str) -> Result<()> {
    report.line(format!("tune2fs -U random {node}"));
    tools.run("tune2fs", &["-U", "random", node]).map(|_| ())
}

fn ext_read_used_bytes(tools: &dyn ToolRunner, node: &str) -> Result<u64> {
    let output = tools.run("dumpe2fs", &["-h", node])?;
    Ok(parse_dumpe2fs_used_bytes(&output).unwrap_or(0))
}

/// Parse `dumpe2fs -h` output into used bytes: (block count - free blocks) * block size
fn parse_dumpe2fs_used_bytes(output: &str) -> Option<u64> {
    let mut block_count = None;
    let mut free_blocks = None;
    let mut block_size = None;

    for line in output.lines() {
        let Some((key, value)) = line.split_once(':') else {
            continue;
        };
        let value = value.trim();
        match key.trim() {
            "Block count" => block_count = value.parse::<u64>().ok(),
            "Free blocks" => free_blocks = value.parse::<u64>().ok(),
            "Block size" => block_size = value.parse::<u64>().ok(),
            _ => {}
        }
        if block_count.is_some() && free_blocks.is_some() && block_size.is_some() {
            break;
        }
    }

    let used = block_count?.checked_sub(free_blocks?)?;
    Some(used * block_size?)
}

macro_rules! ext_variant {
    ($name:ident, $fs_type:expr, $mkfs:literal, $max:expr) => {
        #[derive(Debug, Default)]
        pub struct $name {
            label: Option<String>,
            uuid: Option<String>,
        }

        impl $name {
            pub fn new() -> Self {
                Self::default()
            }
        }

        impl FileSystem for $name {
            fn fs_type(&self) -> FsType {
                $fs_type
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
                64 * 1024
            }

            fn max_capacity(&self) -> u64 {
                $max
            }

            fn support(&self, capability: Capability, tools: &dyn ToolRunner) -> Support {
                ext_support(capability, tools, $mkfs)
            }

            fn create(
                &self,
                report: &mut Report,
                tools: &dyn ToolRunner,
                node: &str,
            ) -> Result<()> {
                ext_create(report, tools, $mkfs, node)
            }

            fn resize(
                &self,
                report: &mut Report,
                tools: &dyn ToolRunner,
                node: &str,
                new_byte_length: u64,
            ) -> Result<()> {
                ext_resize(report, tools, node, new_byte_length)
            }

            fn check(&self, report: &mut Report, tools: &dyn ToolRunner, node: &str) -> Result<()> {
                ext_check(report, tools, node)
            }

            fn write_label(
                &self,
                report: &mut Report,
                tools: &dyn ToolRunner,
                node: &str,
                label: &str,
            ) -> Result<()> {
                ext_write_label(report, tools, node, label)
            }

            fn update_uuid(
                &self,
                report: &mut Report,
                tools: &dyn ToolRunner,
                node: &str,
            ) -> Result<()> {
                ext_update_uuid(report, tools, node)
            }

            fn read_used_bytes(&self, tools: &dyn ToolRunner, node: &str) -> Result<u64> {
                ext_read_used_bytes(tools, node)
            }
        }
    };
}

ext_variant!(Ext2, FsType::Ext2, "mkfs.ext2", 32 * (1 << 40));
ext_variant!(Ext4, FsType::Ext4, "mkfs.ext4", 1 << 60);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_dumpe2fs_header() {
        let output = "Filesystem volume name:   data\n\
                      Block count:              262144\n\
                      Free blocks:              131072\n\
                      Block size:               4096\n";
        assert_eq!(
            parse_dumpe2fs_used_bytes(output),
            Some(131072 * 4096)
        );
    }

    #[test]
    fn unparsable_output_yields_none() {
        assert_eq!(parse_dumpe2fs_used_bytes("garbage"), None);
    }
}
