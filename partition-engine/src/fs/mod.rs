// SPDX-License-Identifier: GPL-3.0-only

//! Filesystem capability layer.
//!
//! The engine never inspects filesystem internals; each variant exposes the
//! capability set (create/resize/check/label/uuid/used-capacity) with a
//! three-level support status, and executes the supported capabilities
//! through external tools via a [`ToolRunner`]. Jobs query support before
//! attempting an action and degrade gracefully when a capability is missing.

mod ext;
mod fat32;
mod linux_swap;
mod luks;
mod ntfs;
mod unformatted;

pub use ext::{Ext2, Ext4};
pub use fat32::Fat32;
pub use linux_swap::LinuxSwap;
pub use luks::Luks;
pub use ntfs::Ntfs;
pub use unformatted::{Unformatted, Unknown};

use partition_types::{Capability, FsType, Support};

use crate::backend::ToolRunner;
use crate::error::{EngineError, Result};
use crate::report::Report;

/// Capability-set interface over one filesystem variant.
///
/// Default method bodies report everything as unsupported; variants override
/// what they actually provide. Execution methods return an error when called
/// for an unsupported capability, but callers are expected to check
/// [`FileSystem::support`] first and skip instead.
pub trait FileSystem: std::fmt::Debug + Send + Sync {
    fn fs_type(&self) -> FsType;

    fn label(&self) -> Option<&str> {
        None
    }

    fn set_label(&mut self, _label: Option<String>) {}

    fn uuid(&self) -> Option<&str> {
        None
    }

    fn set_uuid(&mut self, _uuid: Option<String>) {}

    /// Whether this is an unlocked LUKS container
    fn is_crypt_open(&self) -> bool {
        false
    }

    /// Smallest capacity in bytes this filesystem can be created or shrunk to
    fn min_capacity(&self) -> u64 {
        0
    }

    /// Largest capacity in bytes this filesystem supports
    fn max_capacity(&self) -> u64 {
        u64::MAX
    }

    fn support(&self, _capability: Capability, _tools: &dyn ToolRunner) -> Support {
        Support::None
    }

    fn create(&self, _report: &mut Report, _tools: &dyn ToolRunner, node: &str) -> Result<()> {
        Err(unsupported("create", self.fs_type(), node))
    }

    fn resize(
        &self,
        _report: &mut Report,
        _tools: &dyn ToolRunner,
        node: &str,
        _new_byte_length: u64,
    ) -> Result<()> {
        Err(unsupported("resize", self.fs_type(), node))
    }

    fn check(&self, _report: &mut Report, _tools: &dyn ToolRunner, node: &str) -> Result<()> {
        Err(unsupported("check", self.fs_type(), node))
    }

    fn write_label(
        &self,
        _report: &mut Report,
        _tools: &dyn ToolRunner,
        node: &str,
        _label: &str,
    ) -> Result<()> {
        Err(unsupported("write label", self.fs_type(), node))
    }

    fn update_uuid(&self, _report: &mut Report, _tools: &dyn ToolRunner, node: &str) -> Result<()> {
        Err(unsupported("update UUID", self.fs_type(), node))
    }

    fn read_used_bytes(&self, _tools: &dyn ToolRunner, node: &str) -> Result<u64> {
        Err(unsupported("read used capacity", self.fs_type(), node))
    }
}

fn unsupported(what: &str, fs_type: FsType, node: &str) -> EngineError {
    EngineError::Unsupported(format!("{what} is not supported on {fs_type} ({node})"))
}

/// Support level gated on the presence of an external tool
pub(crate) fn external_tool(tools: &dyn ToolRunner, program: &str) -> Support {
    if tools.find(program) {
        Support::External
    } else {
        Support::None
    }
}

/// Build a filesystem instance for the given type
pub fn make(fs_type: FsType) -> Box<dyn FileSystem> {
    match fs_type {
        FsType::Ext2 => Box::new(Ext2::new()),
        FsType::Ext4 => Box::new(Ext4::new()),
        FsType::Fat32 => Box::new(Fat32::new()),
        FsType::Ntfs => Box::new(Ntfs::new()),
        FsType::LinuxSwap => Box::new(LinuxSwap::new()),
        FsType::Luks => Box::new(Luks::closed()),
        FsType::Unformatted => Box::new(Unformatted::new()),
        FsType::Unknown => Box::new(Unknown::new()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn make_covers_every_type() {
        for ty in [
            FsType::Ext2,
            FsType::Ext4,
            FsType::Fat32,
            FsType::Ntfs,
            FsType::LinuxSwap,
            FsType::Luks,
            FsType::Unformatted,
            FsType::Unknown,
        ] {
            assert_eq!(make(ty).fs_type(), ty);
        }
    }
}
