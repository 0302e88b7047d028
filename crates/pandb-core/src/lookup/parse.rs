//! Parse `test url` output into (local, cloud) categories.
//!
//! Expected layout, one line per database:
//!
//! ```text
//! www.example.com news (Base db) expires in 5 seconds
//! www.example.com news (Cloud db)
//! ```
//!
//! The category is the second single-space-separated token of each of the
//! first two lines. Anything else is `Unresolved`; nothing is guessed.

use super::LookupResult;

pub fn parse_response(raw: Option<&str>) -> LookupResult {
    let Some(raw) = raw else {
        return LookupResult::Unresolved;
    };
    let mut lines = raw.split('\n');
    let (Some(local_line), Some(cloud_line)) = (lines.next(), lines.next()) else {
        return LookupResult::Unresolved;
    };
    match (second_token(local_line), second_token(cloud_line)) {
        (Some(local), Some(cloud)) => LookupResult::Resolved {
            local: local.to_string(),
            cloud: cloud.to_string(),
        },
        _ => LookupResult::Unresolved,
    }
}

fn second_token(line: &str) -> Option<&str> {
    line.trim_end_matches('\r')
        .split(' ')
        .nth(1)
        .filter(|t| !t.is_empty())
}
