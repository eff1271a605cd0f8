// SPDX-License-Identifier: GPL-3.0-only

//! LUKS container wrapping an inner filesystem.
//!
//! While the container is locked the engine treats it as opaque: no
//! capability is offered, and delete eligibility depends on the crypt
//! mapping being closed. Label and UUID of the inner filesystem are exposed
//! read-only when known from a scan.

use partition_types::FsType;

use crate::fs::{FileSystem, Unformatted};

#[derive(Debug)]
pub struct Luks {
    inner: Box<dyn FileSystem>,
    mapper_node: Option<String>,
}

impl Luks {
    /// A locked container with an unknown inner filesystem
    pub fn closed() -> Self {
        Self {
            inner: Box::new(Unformatted::new()),
            mapper_node: None,
        }
    }

    pub fn new(inner: Box<dyn FileSystem>, mapper_node: Option<String>) -> Self {
        Self { inner, mapper_node }
    }

    pub fn inner(&self) -> &dyn FileSystem {
        self.inner.as_ref()
    }

    /// Device-mapper node of the unlocked container, if any
    pub fn mapper_node(&self) -> Option<&str> {
        self.mapper_node.as_deref()
    }

    pub fn set_mapper_node(&mut self, mapper_node: Option<String>) {
        self.mapper_node = mapper_node;
    }
}

impl FileSystem for Luks {
    fn fs_type(&self) -> FsType {
        FsType::Luks
    }

    fn label(&self) -> Option<&str> {
        self.inner.label()
    }

    fn uuid(&self) -> Option<&str> {
        self.inner.uuid()
    }

    fn is_crypt_open(&self) -> bool {
        self.mapper_node.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crypt_open_follows_mapper_node() {
        let mut luks = Luks::closed();
        assert!(!luks.is_crypt_open());

        luks.set_mapper_node(Some("/dev/mapper/cr_data".to_string()));
        assert!(luks.is_crypt_open());
    }
}
