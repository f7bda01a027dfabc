//! Pass/fail evaluation and conversion of findings into a stored execution.

use std::time::Duration;

use chrono::Utc;
use serde_json::Value;

use vigil_core::entities::{CheckExecution, CheckOutput, OutputStats, PassFailRule, TargetRef};
use vigil_core::enums::{ResultStatus, Severity};

/// Whether `rows` counts as issues under `rule`.
#[must_use]
pub fn has_issues(rows: u64, rule: &PassFailRule) -> bool {
    rule.fail_if_gt.map_or_else(
        || if rule.expect_zero { rows > 0 } else { rows == 0 },
        |threshold| rows > threshold,
    )
}

#[must_use]
pub fn evaluate(rows: u64, rule: &PassFailRule, severity: Severity) -> ResultStatus {
    if has_issues(rows, rule) {
        severity.issue_status()
    } else {
        ResultStatus::Pass
    }
}

/// What one check found, before pass/fail is decided.
#[derive(Debug, Clone, PartialEq)]
pub struct CheckFindings {
    pub summary: String,
    pub targets: Vec<TargetRef>,
    /// Bounded sample for display.
    pub rows: Vec<Value>,
    /// The count the rule is evaluated against.
    pub violations: u64,
    pub truncated: bool,
    pub total_violating_rows: Option<u64>,
}

impl CheckFindings {
    #[must_use]
    pub fn into_execution(
        self,
        rule: &PassFailRule,
        severity: Severity,
        elapsed: Duration,
    ) -> CheckExecution {
        CheckExecution {
            status: evaluate(self.violations, rule, severity),
            severity,
            targets: self.targets,
            output: CheckOutput {
                summary: self.summary,
                stats: OutputStats {
                    row_count: self.violations,
                    truncated: self.truncated,
                    total_violating_rows: self.total_violating_rows,
                },
                rows: self.rows,
                error: None,
            },
            duration_ms: duration_ms(elapsed),
            executed_at: Utc::now(),
        }
    }
}

/// Whole milliseconds, saturating.
#[must_use]
pub fn duration_ms(elapsed: Duration) -> u64 {
    u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    const DEFAULT: PassFailRule = PassFailRule {
        expect_zero: true,
        fail_if_gt: None,
    };

    #[rstest]
    #[case(0, DEFAULT, Severity::Error, ResultStatus::Pass)]
    #[case(3, DEFAULT, Severity::Blocking, ResultStatus::Blocked)]
    #[case(3, DEFAULT, Severity::Warning, ResultStatus::Warning)]
    #[case(3, DEFAULT, Severity::Info, ResultStatus::Fail)]
    #[case(3, DEFAULT, Severity::Error, ResultStatus::Fail)]
    #[case(0, PassFailRule { expect_zero: false, fail_if_gt: None }, Severity::Error, ResultStatus::Fail)]
    #[case(2, PassFailRule { expect_zero: false, fail_if_gt: None }, Severity::Error, ResultStatus::Pass)]
    #[case(5, PassFailRule { expect_zero: true, fail_if_gt: Some(5) }, Severity::Error, ResultStatus::Pass)]
    #[case(6, PassFailRule { expect_zero: true, fail_if_gt: Some(5) }, Severity::Warning, ResultStatus::Warning)]
    #[case(0, PassFailRule { expect_zero: false, fail_if_gt: Some(0) }, Severity::Error, ResultStatus::Pass)]
    fn evaluation_table(
        #[case] rows: u64,
        #[case] rule: PassFailRule,
        #[case] severity: Severity,
        #[case] expected: ResultStatus,
    ) {
        assert_eq!(evaluate(rows, &rule, severity), expected);
    }

    #[test]
    fn findings_become_execution() {
        let findings = CheckFindings {
            summary: "2 rows returned".into(),
            targets: vec![TargetRef::table("public", "users")],
            rows: vec![],
            violations: 2,
            truncated: false,
            total_violating_rows: None,
        };
        let exec = findings.into_execution(&DEFAULT, Severity::Warning, Duration::from_millis(42));
        assert_eq!(exec.status, ResultStatus::Warning);
        assert_eq!(exec.duration_ms, 42);
        assert_eq!(exec.output.stats.row_count, 2);
        assert_eq!(exec.issue_count(), 2);
        assert_eq!(exec.output.error, None);
    }
}
