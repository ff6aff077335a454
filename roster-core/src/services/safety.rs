//! Query safety gate for ad hoc SQL
//!
//! A coarse lexical check, not a parser. Any statement whose text contains
//! one of the denied words anywhere, in any case, is rejected. That means
//! identifiers and string literals containing the words are rejected too,
//! while statements that avoid the exact words (DELETE, UPDATE, INSERT,
//! GRANT, multi-statement batches) pass.

/// Words that block a statement, matched as lowercase substrings
pub const DENYLIST: [&str; 3] = ["drop", "alter", "truncate"];

/// `true` when `sql` contains none of the denied words
pub fn is_safe(sql: &str) -> bool {
    denied_token(sql).is_none()
}

/// The first denied word found in `sql`, if any
pub fn denied_token(sql: &str) -> Option<&'static str> {
    let lowered = sql.to_lowercase();
    DENYLIST.iter().copied().find(|word| lowered.contains(word))
}
