//! Static read-only check for interpolated SQL.
//!
//! Lexical only: a forbidden keyword inside a string literal, or a `;`
//! inside a quoted identifier, is rejected too.

use crate::error::CheckError;

const READ_KEYWORDS: [&str; 3] = ["SELECT", "WITH", "EXPLAIN"];

const WRITE_KEYWORDS: [&str; 10] = [
    "INSERT", "UPDATE", "DELETE", "DROP", "CREATE", "ALTER", "TRUNCATE", "GRANT", "REVOKE",
    "EXECUTE",
];

const fn is_word_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

fn words(sql: &str) -> impl Iterator<Item = &str> {
    sql.split(|c: char| !is_word_char(c)).filter(|w| !w.is_empty())
}

/// Reject anything but a single read statement.
///
/// Checked in order: statement count, leading keyword, write keywords.
///
/// The scan is purely lexical. It does not track quotes or comments, so a
/// `;` inside a string literal (`SELECT ';'`) still counts as a statement
/// separator, and a write keyword inside a literal is still rejected. Both
/// err on the side of refusing the statement.
pub fn ensure_read_only(sql: &str) -> Result<(), CheckError> {
    let statements = sql.split(';').filter(|s| !s.trim().is_empty()).count();
    if statements > 1 {
        return Err(CheckError::MultiStatement);
    }

    let trimmed = sql.trim_start();
    let first_len = trimmed
        .find(|c: char| !is_word_char(c))
        .unwrap_or(trimmed.len());
    let first = &trimmed[..first_len];
    if !READ_KEYWORDS.iter().any(|k| first.eq_ignore_ascii_case(k)) {
        return Err(CheckError::NotAReadQuery);
    }

    if let Some(word) = words(sql).find(|w| WRITE_KEYWORDS.iter().any(|k| w.eq_ignore_ascii_case(k)))
    {
        return Err(CheckError::WriteOperationForbidden(word.to_ascii_uppercase()));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[rstest]
    #[case("SELECT 1")]
    #[case("  select * from users;")]
    #[case("WITH c AS (SELECT 1) SELECT * FROM c")]
    #[case("EXPLAIN SELECT * FROM orders")]
    #[case("SELECT updated_at, created_by FROM audit_log")]
    #[case("SELECT\n  email\nFROM users\nGROUP BY email\nHAVING count(*) > 1")]
    fn accepts_reads(#[case] sql: &str) {
        assert_eq!(ensure_read_only(sql), Ok(()));
    }

    #[rstest]
    #[case("SELECT 1; DROP TABLE x", CheckError::MultiStatement)]
    #[case("SELECT 1; SELECT 2;", CheckError::MultiStatement)]
    #[case("SELECT ';' AS sep", CheckError::MultiStatement)]
    #[case("UPDATE t SET x=1", CheckError::NotAReadQuery)]
    #[case("", CheckError::NotAReadQuery)]
    #[case("(SELECT 1)", CheckError::NotAReadQuery)]
    #[case("SELECTED", CheckError::NotAReadQuery)]
    #[case("VACUUM users", CheckError::NotAReadQuery)]
    #[case(
        "WITH gone AS (DELETE FROM t RETURNING *) SELECT * FROM gone",
        CheckError::WriteOperationForbidden("DELETE".into())
    )]
    #[case(
        "select * from t where 1 = 1 or exists (select 1) -- drop",
        CheckError::WriteOperationForbidden("DROP".into())
    )]
    #[case(
        "SELECT 'delete me' AS note",
        CheckError::WriteOperationForbidden("DELETE".into())
    )]
    #[case(
        "EXPLAIN ANALYZE insert into t values (1)",
        CheckError::WriteOperationForbidden("INSERT".into())
    )]
    fn rejects(#[case] sql: &str, #[case] expected: CheckError) {
        assert_eq!(ensure_read_only(sql), Err(expected));
    }
}
