// SPDX-License-Identifier: GPL-3.0-only

//! Commit pass behavior: job ordering, fail-fast, degraded capabilities.

mod common;

use partition_engine::backend::ExecContext;
use partition_engine::jobs::{Job, MovePhysicalVolumeJob};
use partition_engine::ops::{DeleteOperation, NewOperation, Operation, OperationStatus};
use partition_engine::report::Report;
use partition_engine::stack::OperationStack;
use partition_types::{FsType, PartitionFlag, PartitionFlags, PartitionRole, SectorRange, ShredAction};

use common::{FakeBackend, FakeTools, ext4_primary, ext_tools, gpt_device};

fn stack_with_gpt() -> OperationStack {
    let mut stack = OperationStack::new();
    stack.add_device(gpt_device("/dev/sda"));
    stack
}

#[test]
fn commit_runs_jobs_in_order() {
    let mut stack = stack_with_gpt();
    let backend = FakeBackend::new();
    let tools = ext_tools();

    let device = stack.device_mut("/dev/sda").unwrap();
    let create = NewOperation::new(
        device,
        PartitionRole::Primary.into(),
        SectorRange::new(2048, 500_000),
        FsType::Ext4,
        Some("data".into()),
        PartitionFlag::Boot.into(),
    )
    .unwrap();
    stack.push(Operation::New(create));

    let mut report = Report::new_root();
    let ctx = ExecContext::new(&backend, &tools);
    stack.commit(&mut report, &ctx).unwrap();

    assert_eq!(stack.operations()[0].status(), OperationStatus::Success);
    let calls = backend.calls();
    assert!(calls[1].starts_with("create_partition /dev/sda"));
    assert!(calls[2].starts_with("set_partition_flags /dev/sda"));

    let runs = tools.runs();
    assert!(runs[0].starts_with("mkfs.ext4"));
    assert!(runs[1].starts_with("e2label"));
}

#[test]
fn commit_holds_the_device_exclusively_for_the_whole_pass() {
    let mut stack = stack_with_gpt();
    let backend = FakeBackend::new();
    let tools = ext_tools();

    let device = stack.device_mut("/dev/sda").unwrap();
    let create = NewOperation::new(
        device,
        PartitionRole::Primary.into(),
        SectorRange::new(2048, 500_000),
        FsType::Ext4,
        None,
        PartitionFlags::empty(),
    )
    .unwrap();
    stack.push(Operation::New(create));

    let mut report = Report::new_root();
    let ctx = ExecContext::new(&backend, &tools);
    stack.commit(&mut report, &ctx).unwrap();

    let calls = backend.calls();
    assert_eq!(calls.first().unwrap(), "open_device_exclusive /dev/sda");
    assert_eq!(calls.last().unwrap(), "close_device /dev/sda");
    assert_eq!(
        calls
            .iter()
            .filter(|c| c.starts_with("open_device_exclusive"))
            .count(),
        1
    );
}

#[test]
fn a_device_that_cannot_be_opened_exclusively_aborts_the_commit() {
    let mut stack = stack_with_gpt();
    let backend = FakeBackend::new();
    let tools = ext_tools();
    backend.fail("open_device_exclusive");

    let device = stack.device_mut("/dev/sda").unwrap();
    let create = NewOperation::new(
        device,
        PartitionRole::Primary.into(),
        SectorRange::new(2048, 500_000),
        FsType::Ext4,
        None,
        PartitionFlags::empty(),
    )
    .unwrap();
    stack.push(Operation::New(create));

    let mut report = Report::new_root();
    let ctx = ExecContext::new(&backend, &tools);
    assert!(stack.commit(&mut report, &ctx).is_err());

    // nothing ran; the operation is still undoable after a failed open
    assert_eq!(stack.operations()[0].status(), OperationStatus::Pending);
    assert_eq!(
        backend.calls(),
        vec!["open_device_exclusive /dev/sda".to_string()]
    );
    assert!(tools.runs().is_empty());
    assert!(stack.pop().is_some());
}

#[test]
fn missing_tools_degrade_to_a_warning() {
    let mut stack = stack_with_gpt();
    let backend = FakeBackend::new();
    let tools = FakeTools::none();

    let device = stack.device_mut("/dev/sda").unwrap();
    let create = NewOperation::new(
        device,
        PartitionRole::Primary.into(),
        SectorRange::new(2048, 500_000),
        FsType::Ext4,
        None,
        PartitionFlags::empty(),
    )
    .unwrap();
    stack.push(Operation::New(create));

    let mut report = Report::new_root();
    let ctx = ExecContext::new(&backend, &tools);
    stack.commit(&mut report, &ctx).unwrap();

    // the table edit went through, the mkfs step was skipped
    assert_eq!(stack.operations()[0].status(), OperationStatus::Warning);
    assert!(report.render().contains("skipped"));
    assert!(tools.runs().is_empty());
}

#[test]
fn a_failed_operation_stops_the_pass_and_leaves_the_rest_pending() {
    let mut stack = stack_with_gpt();
    let backend = FakeBackend::new();
    let tools = ext_tools();
    backend.fail("create_partition");

    let device = stack.device_mut("/dev/sda").unwrap();
    let first = NewOperation::new(
        device,
        PartitionRole::Primary.into(),
        SectorRange::new(2048, 500_000),
        FsType::Ext4,
        None,
        PartitionFlags::empty(),
    )
    .unwrap();
    stack.push(Operation::New(first));

    let device = stack.device_mut("/dev/sda").unwrap();
    let second = NewOperation::new(
        device,
        PartitionRole::Primary.into(),
        SectorRange::new(600_064, 1_000_000),
        FsType::Ext4,
        None,
        PartitionFlags::empty(),
    )
    .unwrap();
    stack.push(Operation::New(second));

    let mut report = Report::new_root();
    let ctx = ExecContext::new(&backend, &tools);
    assert!(stack.commit(&mut report, &ctx).is_err());

    assert_eq!(stack.operations()[0].status(), OperationStatus::Error);
    assert_eq!(stack.operations()[1].status(), OperationStatus::Pending);
    // only the first operation's first job ran between open and close
    let calls = backend.calls();
    assert_eq!(calls.len(), 3);
    assert!(calls[1].starts_with("create_partition /dev/sda"));
    assert_eq!(calls[2], "close_device /dev/sda");
}

#[test]
fn a_failed_job_skips_the_remaining_jobs_of_its_operation() {
    let mut stack = stack_with_gpt();
    let backend = FakeBackend::new();
    let tools = ext_tools();
    backend.fail("wipe_filesystem");

    let device = stack.device_mut("/dev/sda").unwrap();
    device
        .table_mut()
        .insert(ext4_primary("/dev/sda1", 2048, 499_712, 1))
        .unwrap();
    let delete = DeleteOperation::new(device, "/dev/sda1", ShredAction::NoShred).unwrap();
    stack.push(Operation::Delete(delete));

    let mut report = Report::new_root();
    let ctx = ExecContext::new(&backend, &tools);
    assert!(stack.commit(&mut report, &ctx).is_err());

    let calls = backend.calls();
    assert_eq!(
        calls,
        vec![
            "open_device_exclusive /dev/sda".to_string(),
            "wipe_filesystem /dev/sda1".to_string(),
            "close_device /dev/sda".to_string(),
        ]
    );
}

#[test]
fn shred_variant_overwrites_instead_of_wiping() {
    let mut stack = stack_with_gpt();
    let backend = FakeBackend::new();
    let tools = ext_tools();

    let device = stack.device_mut("/dev/sda").unwrap();
    device
        .table_mut()
        .insert(ext4_primary("/dev/sda1", 2048, 499_712, 1))
        .unwrap();
    let delete = DeleteOperation::new(device, "/dev/sda1", ShredAction::RandomShred).unwrap();
    stack.push(Operation::Delete(delete));

    let mut report = Report::new_root();
    let ctx = ExecContext::new(&backend, &tools);
    stack.commit(&mut report, &ctx).unwrap();

    let calls = backend.calls();
    assert_eq!(calls[1], "shred /dev/sda1 2048..499712 random=true");
    assert_eq!(calls[2], "delete_partition /dev/sda /dev/sda1");
}

#[test]
fn update_uuid_goes_through_the_filesystem_tool() {
    let backend = FakeBackend::new();
    let tools = ext_tools();

    let job = Job::UpdateUuid(partition_engine::jobs::UpdateUuidJob::new(
        "/dev/sda1",
        FsType::Ext4,
    ));
    let mut report = Report::new_root();
    let ctx = ExecContext::new(&backend, &tools);
    assert!(!job.run(&mut report, &ctx).is_failure());
    assert_eq!(tools.runs(), vec!["tune2fs -U random /dev/sda1".to_string()]);
}

#[test]
fn move_physical_volume_targets_the_remaining_members() {
    let backend = FakeBackend::new();
    let tools = FakeTools::none();
    backend.add_volume_group("vg0", &["/dev/sda1", "/dev/sdb1", "/dev/sdc1"]);

    let job = Job::MovePhysicalVolume(MovePhysicalVolumeJob::new(
        "vg0",
        vec!["/dev/sda1".to_string()],
    ));
    let mut report = Report::new_root();
    let ctx = ExecContext::new(&backend, &tools);
    assert!(!job.run(&mut report, &ctx).is_failure());

    let calls = backend.calls();
    assert_eq!(calls[0], "list_physical_volumes vg0");
    assert_eq!(
        calls[1],
        "move_physical_volume vg0 /dev/sda1 -> /dev/sdb1,/dev/sdc1"
    );
}

#[test]
fn evacuating_every_member_fails_the_move() {
    let backend = FakeBackend::new();
    let tools = FakeTools::none();
    backend.add_volume_group("vg0", &["/dev/sda1", "/dev/sdb1"]);

    let job = Job::MovePhysicalVolume(MovePhysicalVolumeJob::new(
        "vg0",
        vec!["/dev/sda1".to_string(), "/dev/sdb1".to_string()],
    ));
    let mut report = Report::new_root();
    let ctx = ExecContext::new(&backend, &tools);
    assert!(job.run(&mut report, &ctx).is_failure());
    assert_eq!(backend.calls(), vec!["list_physical_volumes vg0".to_string()]);
}
