//! Collision-avoiding name generation
//!
//! Used when a job, vertex or member name is already taken: `"job"` becomes
//! `"job-2"`, `"job-2"` becomes `"job-3"`, and so on.

/// Increment a trailing `-<digits>` index, or append `-2` when there is none.
///
/// The digits are read as a non-negative `i32`. When they do not fit, or
/// the increment would overflow, the suffix is treated as part of the name
/// and `-2` is appended instead.
///
/// ```rust
/// # use clusterkit::naming::add_or_increment_index_in_name;
/// assert_eq!(add_or_increment_index_in_name("a"), "a-2");
/// assert_eq!(add_or_increment_index_in_name("a-2"), "a-3");
/// assert_eq!(add_or_increment_index_in_name("a-25x"), "a-25x-2");
/// ```
pub fn add_or_increment_index_in_name(name: &str) -> String {
    match trailing_index(name) {
        Some((prefix, next)) => format!("{prefix}-{next}"),
        None => format!("{name}-2"),
    }
}

/// Split `name` into its prefix and the incremented trailing index.
fn trailing_index(name: &str) -> Option<(&str, i32)> {
    let (prefix, digits) = name.rsplit_once('-')?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let next = digits.parse::<i32>().ok()?.checked_add(1)?;
    Some((prefix, next))
}
