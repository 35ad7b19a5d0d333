//! Greatest common divisor used to normalize partition and processor counts

/// Integer types that support a sign-agnostic greatest common divisor.
pub trait Gcd: Copy {
    /// The identity of the reduction: `gcd(ZERO, n) == |n|`.
    const ZERO: Self;

    /// Greatest common divisor of `|self|` and `|other|`.
    ///
    /// `gcd(0, 0)` is `0`. The result divides both inputs, with one
    /// exception: the true result `2^(bits-1)` is unrepresentable and only
    /// reachable through `MIN` combined with `0` or `MIN`. It is clamped to
    /// `MAX`, which does not divide `MIN`, so `gcd_all(&[MIN])` does not
    /// divide its element either.
    fn gcd(self, other: Self) -> Self;
}

macro_rules! gcd_impl {
    ($t:ty, $u:ty) => {
        impl Gcd for $t {
            const ZERO: Self = 0;

            #[inline]
            fn gcd(self, other: Self) -> Self {
                let mut a: $u = self.unsigned_abs();
                let mut b: $u = other.unsigned_abs();
                while b != 0 {
                    let rem = a % b;
                    a = b;
                    b = rem;
                }
                <$t>::try_from(a).unwrap_or(<$t>::MAX)
            }
        }
    };
}

gcd_impl!(i32, u32);
gcd_impl!(i64, u64);

/// Greatest common divisor of two integers, ignoring sign.
///
/// ```rust
/// # use clusterkit::num::gcd;
/// assert_eq!(gcd(-2i64, 4), 2);
/// assert_eq!(gcd(0i64, 0), 0);
/// ```
#[inline]
pub fn gcd<T: Gcd>(a: T, b: T) -> T {
    a.gcd(b)
}

/// Greatest common divisor of every value in `values`; `0` for an empty slice.
///
/// ```rust
/// # use clusterkit::num::gcd_all;
/// assert_eq!(gcd_all(&[4, 8, 12]), 4);
/// assert_eq!(gcd_all::<i32>(&[]), 0);
/// ```
pub fn gcd_all<T: Gcd>(values: &[T]) -> T {
    values.iter().fold(T::ZERO, |acc, &v| acc.gcd(v))
}
