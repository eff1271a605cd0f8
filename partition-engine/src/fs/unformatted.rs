// SPDX-License-Identifier: GPL-3.0-only

use partition_types::{Capability, FsType, Support};

use crate::backend::ToolRunner;
use crate::error::Result;
use crate::fs::FileSystem;
use crate::report::Report;

/// A partition deliberately left without a filesystem. Creating "nothing"
/// always succeeds, so create is supported by the engine itself.
#[derive(Debug, Default)]
pub struct Unformatted;

impl Unformatted {
    pub fn new() -> Self {
        Self
    }
}

impl FileSystem for Unformatted {
    fn fs_type(&self) -> FsType {
        FsType::Unformatted
    }

    fn support(&self, capability: Capability, _tools: &dyn ToolRunner) -> Support {
        match capability {
            Capability::Create => Support::Library,
            _ => Support::None,
        }
    }

    fn create(&self, report: &mut Report, _tools: &dyn ToolRunner, node: &str) -> Result<()> {
        report.line(format!("leaving {node} unformatted"));
        Ok(())
    }
}

/// A filesystem the scan could not identify. Fully opaque.
#[derive(Debug, Default)]
pub struct Unknown;

impl Unknown {
    pub fn new() -> Self {
        Self
    }
}

impl FileSystem for Unknown {
    fn fs_type(&self) -> FsType {
        FsType::Unknown
    }
}
