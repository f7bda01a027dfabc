//! Run-level rollup of per-node result statuses.
//!
//! The rollup is derived data: it is recomputed from the full result set
//! after every run and never updated incrementally.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::enums::{ResultStatus, RunStatus};

/// Number of results in each status.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct RollupCounts {
    pub total: u64,
    pub blocked: u64,
    pub fail: u64,
    pub warning: u64,
    pub pass: u64,
    pub unchecked: u64,
}

impl RollupCounts {
    pub const fn record(&mut self, status: ResultStatus) {
        self.total += 1;
        match status {
            ResultStatus::Blocked => self.blocked += 1,
            ResultStatus::Fail => self.fail += 1,
            ResultStatus::Warning => self.warning += 1,
            ResultStatus::Pass => self.pass += 1,
            ResultStatus::Unchecked => self.unchecked += 1,
        }
    }

    /// Aggregate status by precedence `blocked > fail > warning > incomplete > pass`.
    ///
    /// An empty run has nothing left to check and rolls up to `pass`.
    #[must_use]
    pub fn status(&self) -> RunStatus {
        [
            (self.blocked, RunStatus::Blocked),
            (self.fail, RunStatus::Fail),
            (self.warning, RunStatus::Warning),
            (self.unchecked, RunStatus::Incomplete),
        ]
        .into_iter()
        .filter(|(count, _)| *count > 0)
        .map(|(_, status)| status)
        .max_by_key(|status| status.precedence())
        .unwrap_or(RunStatus::Pass)
    }
}

/// Aggregate status plus the counts it was derived from.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct RunRollup {
    pub status: RunStatus,
    pub counts: RollupCounts,
}

impl RunRollup {
    pub fn from_statuses<I>(statuses: I) -> Self
    where
        I: IntoIterator<Item = ResultStatus>,
    {
        let mut counts = RollupCounts::default();
        for status in statuses {
            counts.record(status);
        }
        Self {
            status: counts.status(),
            counts,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use ResultStatus::{Blocked, Fail, Pass, Unchecked, Warning};

    #[rstest]
    #[case(&[Blocked, Pass, Pass, Pass, Pass], RunStatus::Blocked)]
    #[case(&[Unchecked, Unchecked, Unchecked], RunStatus::Incomplete)]
    #[case(&[Pass, Pass, Pass], RunStatus::Pass)]
    #[case(&[Fail, Warning, Unchecked], RunStatus::Fail)]
    #[case(&[Warning, Unchecked, Pass], RunStatus::Warning)]
    #[case(&[Pass, Unchecked], RunStatus::Incomplete)]
    #[case(&[Fail, Blocked], RunStatus::Blocked)]
    #[case(&[], RunStatus::Pass)]
    fn precedence(#[case] statuses: &[ResultStatus], #[case] expected: RunStatus) {
        let rollup = RunRollup::from_statuses(statuses.iter().copied());
        assert_eq!(rollup.status, expected);
    }

    #[test]
    fn counts_every_status() {
        let rollup = RunRollup::from_statuses([Blocked, Fail, Fail, Warning, Pass, Unchecked]);
        assert_eq!(
            rollup.counts,
            RollupCounts {
                total: 6,
                blocked: 1,
                fail: 2,
                warning: 1,
                pass: 1,
                unchecked: 1,
            }
        );
    }

    #[test]
    fn status_is_the_highest_ranked_present() {
        let counts = RollupCounts {
            total: 3,
            warning: 1,
            unchecked: 1,
            pass: 1,
            ..RollupCounts::default()
        };
        assert_eq!(counts.status(), RunStatus::Warning);
        assert!(counts.status().precedence() > RunStatus::Incomplete.precedence());
    }

    #[test]
    fn recomputing_is_idempotent() {
        let statuses = [Warning, Pass, Unchecked];
        assert_eq!(
            RunRollup::from_statuses(statuses),
            RunRollup::from_statuses(statuses)
        );
    }
}
