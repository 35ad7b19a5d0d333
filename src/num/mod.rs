//! Overflow-safe arithmetic and numeric reductions
//!
//! - `clamped` - 64-bit signed addition/subtraction that saturates at the bounds
//! - `gcd` - pairwise and slice greatest common divisor for `i32` and `i64`

pub mod clamped;
pub mod gcd;

pub use clamped::{add_clamped, subtract_clamped};
pub use gcd::{gcd, gcd_all, Gcd};
