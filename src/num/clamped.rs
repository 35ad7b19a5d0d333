//! Saturating time and offset arithmetic
//!
//! Watermarks, timestamps and offsets are frequently combined with sentinel
//! values such as `i64::MIN` ("no watermark yet") or `i64::MAX` ("end of
//! stream"). Wrapping at those sentinels silently turns the future into the
//! past, so every combination goes through these functions instead.

/// Adds two values, clamping to `i64::MAX` / `i64::MIN` instead of wrapping.
///
/// # Examples
///
/// ```rust
/// # use clusterkit::num::add_clamped;
/// assert_eq!(add_clamped(1, 2), 3);
/// assert_eq!(add_clamped(i64::MAX, 1), i64::MAX);
/// assert_eq!(add_clamped(i64::MIN, -1), i64::MIN);
/// ```
#[inline]
pub fn add_clamped(a: i64, b: i64) -> i64 {
    a.saturating_add(b)
}

/// Subtracts `b` from `a`, clamping to `i64::MAX` / `i64::MIN` instead of wrapping.
///
/// `b == i64::MIN` is handled exactly: its negation does not fit in `i64`,
/// but the difference is computed without negating, so `0 - i64::MIN`
/// saturates to `i64::MAX` and `i64::MIN - i64::MIN` is `0`.
///
/// # Examples
///
/// ```rust
/// # use clusterkit::num::subtract_clamped;
/// assert_eq!(subtract_clamped(5, 7), -2);
/// assert_eq!(subtract_clamped(i64::MAX, i64::MIN), i64::MAX);
/// assert_eq!(subtract_clamped(i64::MIN, i64::MAX), i64::MIN);
/// ```
#[inline]
pub fn subtract_clamped(a: i64, b: i64) -> i64 {
    a.saturating_sub(b)
}
