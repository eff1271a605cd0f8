// SPDX-License-Identifier: GPL-3.0-only

//! LVM physical volume evacuation.

use crate::backend::ExecContext;
use crate::jobs::JobOutcome;
use crate::report::Report;

/// Migration destinations for evacuating physical volumes: all volume-group
/// members that are not themselves being evacuated.
pub fn migration_destinations(members: &[String], evacuees: &[String]) -> Vec<String> {
    members
        .iter()
        .filter(|member| !evacuees.contains(member))
        .cloned()
        .collect()
}

/// Moves the used extents of one or more physical volumes onto the remaining
/// members of their volume group.
///
/// Relocations are issued one source volume at a time, in list order, and the
/// job aborts on the first failure. Volumes already migrated stay migrated:
/// partial completion is reported but never reversed.
#[derive(Debug)]
pub struct MovePhysicalVolumeJob {
    vg_name: String,
    evacuees: Vec<String>,
}

impl MovePhysicalVolumeJob {
    pub fn new(vg_name: impl Into<String>, evacuees: Vec<String>) -> Self {
        Self {
            vg_name: vg_name.into(),
            evacuees,
        }
    }

    pub fn description(&self) -> String {
        format!(
            "Move used physical extents in volume group {} off {}",
            self.vg_name,
            self.evacuees.join(", ")
        )
    }

    pub(crate) fn run(&self, parent: &mut Report, ctx: &ExecContext<'_>) -> JobOutcome {
        let report = parent.child(self.description());

        let members = match ctx.backend.list_physical_volumes(&self.vg_name) {
            Ok(members) => members,
            Err(e) => {
                report.line(e.to_string());
                return JobOutcome::Failed;
            }
        };

        let destinations = migration_destinations(&members, &self.evacuees);
        if destinations.is_empty() {
            report.line(format!(
                "no physical volumes remain in {} to migrate onto",
                self.vg_name
            ));
            return JobOutcome::Failed;
        }

        for source in &self.evacuees {
            report.line(format!("moving extents off {source}"));
            if let Err(e) = ctx
                .backend
                .move_physical_volume(&self.vg_name, source, &destinations)
            {
                report.line(e.to_string());
                return JobOutcome::Failed;
            }
        }

        JobOutcome::Success
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn volumes(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn destinations_are_the_complement_of_the_evacuation_set() {
        let members = volumes(&["/dev/sda1", "/dev/sdb1", "/dev/sdc1", "/dev/sdd1"]);
        let evacuees = volumes(&["/dev/sda1", "/dev/sdb1"]);

        let destinations = migration_destinations(&members, &evacuees);
        assert_eq!(destinations, volumes(&["/dev/sdc1", "/dev/sdd1"]));
    }

    #[test]
    fn evacuating_everything_leaves_no_destinations() {
        let members = volumes(&["/dev/sda1", "/dev/sdb1"]);
        assert!(migration_destinations(&members, &members).is_empty());
    }
}
