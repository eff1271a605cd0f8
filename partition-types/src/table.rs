// SPDX-License-Identifier: GPL-3.0-only

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Partition table type
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TableType {
    /// GUID partition table
    Gpt,

    /// MBR-style table (reported as "dos" by most tooling)
    Dos,
}

impl TableType {
    /// Maximum number of top-level partitions the table supports. An extended
    /// partition counts as one of the four DOS primaries.
    pub fn max_primaries(&self) -> usize {
        match self {
            TableType::Gpt => 128,
            TableType::Dos => 4,
        }
    }

    /// Whether this table type supports extended/logical partitions
    pub fn supports_extended(&self) -> bool {
        matches!(self, TableType::Dos)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TableType::Gpt => "gpt",
            TableType::Dos => "dos",
        }
    }
}

impl fmt::Display for TableType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TableType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "gpt" => Ok(TableType::Gpt),
            "dos" | "mbr" | "msdos" => Ok(TableType::Dos),
            other => Err(format!(
                "Invalid table type: {other}. Must be 'gpt' or 'dos'/'mbr'"
            )),
        }
    }
}
