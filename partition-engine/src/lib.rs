// SPDX-License-Identifier: GPL-3.0-only

//! Partition layout mutation engine.
//!
//! Changes to a disk are planned as [`ops::Operation`]s held on an
//! [`stack::OperationStack`]. Every operation previews its effect on the
//! in-memory [`core::PartitionTable`] the moment it is constructed, so the
//! user always sees the layout the commit pass would produce; popping an
//! operation undoes its preview exactly. Nothing reaches a real device until
//! [`stack::OperationStack::commit`] runs the operations' jobs through the
//! injected [`backend::CoreBackend`] and [`backend::ToolRunner`].

pub mod backend;
pub mod core;
pub mod error;
pub mod fs;
pub mod jobs;
pub mod ops;
pub mod report;
pub mod stack;

pub use backend::{CoreBackend, ExecContext, SystemToolRunner, ToolRunner};
pub use core::{Device, Partition, PartitionAlignment, PartitionTable};
pub use error::{EngineError, Result};
pub use ops::{
    DeleteOperation, FormatOperation, NewOperation, Operation, OperationStatus, ResizeOperation,
    SetFlagsOperation, SetLabelOperation,
};
pub use report::Report;
pub use stack::OperationStack;
