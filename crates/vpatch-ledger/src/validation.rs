use vpatch_types::VersionIdentifier;

use crate::entry::ReleaseLine;
use crate::ledger::VersionLedger;

/// Result of checking a release line's patch sequence.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DensityReport {
    pub version: VersionIdentifier,
    pub patch_count: usize,
    pub violations: Vec<Violation>,
}

impl DensityReport {
    /// Returns `true` if all checks passed.
    pub fn is_valid(&self) -> bool {
        self.violations.is_empty()
    }
}

/// A specific problem in a patch sequence.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Violation {
    pub revision: u16,
    pub kind: ViolationKind,
    pub description: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ViolationKind {
    /// A revision between 1 and the line's version is missing.
    Gap,
    /// Two entries claim the same revision.
    Duplicate,
    /// An entry is listed after a higher revision.
    OutOfOrder,
    /// An entry is newer than the line's own version.
    BeyondVersion,
    /// An entry for revision 0, which is never a patch.
    BaseRevision,
}

/// Check that `line` lists patches `1..=version.revision` exactly once each,
/// in ascending order.
pub fn check_dense(line: &ReleaseLine) -> DensityReport {
    let mut violations = Vec::new();
    let newest = line.version.revision();
    let mut expected: u16 = 1;
    let mut highest: u16 = 0;

    for entry in &line.patches {
        let revision = entry.revision_number;
        let mut push = |kind, description: String| {
            violations.push(Violation {
                revision,
                kind,
                description,
            })
        };

        if revision == 0 {
            push(
                ViolationKind::BaseRevision,
                format!("{} is listed as revision 0", entry.patch_name),
            );
            continue;
        }
        if revision > newest {
            push(
                ViolationKind::BeyondVersion,
                format!("revision {revision} is newer than line version {}", line.version),
            );
        }
        if revision < expected {
            let kind = if revision == highest {
                ViolationKind::Duplicate
            } else {
                ViolationKind::OutOfOrder
            };
            push(kind, format!("revision {revision} after revision {highest}"));
            continue;
        }
        if revision > expected {
            push(
                ViolationKind::Gap,
                format!("revisions {expected}..{revision} are missing"),
            );
        }
        highest = revision;
        expected = revision.saturating_add(1);
    }

    if expected <= newest {
        violations.push(Violation {
            revision: newest,
            kind: ViolationKind::Gap,
            description: format!("revisions {expected}..={newest} are missing"),
        });
    }

    DensityReport {
        version: line.version,
        patch_count: line.patches.len(),
        violations,
    }
}

/// Check every release line of a ledger.
pub fn check_ledger(ledger: &VersionLedger) -> Vec<DensityReport> {
    ledger.lines().iter().map(check_dense).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry::PatchEntry;

    fn line(version: &str, revisions: &[u16]) -> ReleaseLine {
        ReleaseLine {
            version: version.parse().unwrap(),
            patches: revisions
                .iter()
                .map(|&r| PatchEntry::new(format!("{r}_1_2"), "00", 1, r))
                .collect(),
        }
    }

    fn kinds(report: &DensityReport) -> Vec<ViolationKind> {
        report.violations.iter().map(|v| v.kind).collect()
    }

    #[test]
    fn dense_line_is_valid() {
        let report = check_dense(&line("1.0.3", &[1, 2, 3]));
        assert!(report.is_valid());
        assert_eq!(report.patch_count, 3);
    }

    #[test]
    fn base_line_without_patches_is_valid() {
        assert!(check_dense(&line("2.4.0", &[])).is_valid());
    }

    #[test]
    fn gap_in_middle() {
        let report = check_dense(&line("1.0.3", &[1, 3]));
        assert_eq!(kinds(&report), vec![ViolationKind::Gap]);
        assert_eq!(report.violations[0].revision, 3);
    }

    #[test]
    fn missing_tail() {
        let report = check_dense(&line("1.0.4", &[1, 2]));
        assert_eq!(kinds(&report), vec![ViolationKind::Gap]);
        assert_eq!(report.violations[0].revision, 4);
    }

    #[test]
    fn duplicate_and_out_of_order() {
        let report = check_dense(&line("1.0.3", &[1, 2, 2, 3, 1]));
        assert_eq!(
            kinds(&report),
            vec![ViolationKind::Duplicate, ViolationKind::OutOfOrder]
        );
    }

    #[test]
    fn entry_beyond_version() {
        let report = check_dense(&line("1.0.1", &[1, 2]));
        assert_eq!(kinds(&report), vec![ViolationKind::BeyondVersion]);
    }

    #[test]
    fn revision_zero_entry() {
        let report = check_dense(&line("1.0.1", &[0, 1]));
        assert_eq!(kinds(&report), vec![ViolationKind::BaseRevision]);
    }

    #[test]
    fn ledger_check_covers_all_lines() {
        let ledger = VersionLedger::from_lines(vec![line("1.1.0", &[]), line("1.0.2", &[2])]);
        let reports = check_ledger(&ledger);
        assert_eq!(reports.len(), 2);
        assert!(reports[0].is_valid());
        assert!(!reports[1].is_valid());
    }
}
