//! In-crate fake target for unit tests.

use std::time::Duration;

use super::catalog::CatalogSnapshot;
use super::{QueryOutput, TargetDatabase};
use crate::error::CheckError;

/// Answers statements from canned outputs and records what it saw.
///
/// The first response whose needle occurs in the SQL wins; anything else
/// gets the fallback output. With [`StaticTarget::honouring_limit`] the
/// output is cut by a trailing `LIMIT n` and read at most `max_rows` deep,
/// the way a real server and driver would.
pub struct StaticTarget {
    fallback: QueryOutput,
    responses: Vec<(String, Result<QueryOutput, CheckError>)>,
    seen: Vec<String>,
    honour_limit: bool,
}

impl StaticTarget {
    pub fn new(fallback: QueryOutput) -> Self {
        Self {
            fallback,
            responses: Vec::new(),
            seen: Vec::new(),
            honour_limit: false,
        }
    }

    pub fn honouring_limit(mut self) -> Self {
        self.honour_limit = true;
        self
    }

    pub fn respond(mut self, needle: &str, output: Result<QueryOutput, CheckError>) -> Self {
        self.responses.push((needle.to_string(), output));
        self
    }

    pub fn seen(&self) -> Vec<String> {
        self.seen.clone()
    }
}

impl TargetDatabase for StaticTarget {
    async fn query(
        &mut self,
        sql: &str,
        _timeout: Duration,
        max_rows: usize,
    ) -> Result<QueryOutput, CheckError> {
        self.seen.push(sql.to_string());
        let mut output = self
            .responses
            .iter()
            .find(|(needle, _)| sql.contains(needle.as_str()))
            .map_or_else(|| Ok(self.fallback.clone()), |(_, output)| output.clone())?;
        if self.honour_limit {
            if let Some(limit) = trailing_limit(sql) {
                output.rows.truncate(limit);
            }
            if output.rows.len() > max_rows {
                output.rows.truncate(max_rows);
                output.truncated = true;
            }
        }
        Ok(output)
    }

    async fn catalog(
        &mut self,
        _schemas: &[String],
        _timeout: Duration,
    ) -> Result<CatalogSnapshot, CheckError> {
        Ok(CatalogSnapshot::default())
    }

    async fn release(self) {}
}

fn trailing_limit(sql: &str) -> Option<usize> {
    let mut words = sql.split_whitespace().rev();
    let count = words.next()?.parse().ok()?;
    words
        .next()
        .filter(|word| word.eq_ignore_ascii_case("limit"))
        .map(|_| count)
}
