//! Deterministic fixed-point scalar: [`Fp`].
//!
//! `Fp` is a signed Q31.32 number stored in an `i64`. Every operation is
//! implemented on integers, so two machines given the same raw inputs compute
//! the same raw outputs. Overflow saturates to an infinity sentinel instead of
//! wrapping, and invalid operations (`0 / 0`, `inf - inf`) produce
//! [`Fp::UNSET`].

use std::fmt;
use std::ops::{Add, AddAssign, Div, DivAssign, Mul, MulAssign, Neg, Sub, SubAssign};

const FRACTIONAL_BITS: u32 = 32;
const ONE_RAW: i64 = 1 << FRACTIONAL_BITS;
const FRACTION_MASK: i64 = ONE_RAW - 1;

/// A deterministic Q31.32 fixed-point number.
///
/// Ordering is total and follows the raw value, so
/// `UNSET < NEGATIVE_INFINITY < MIN <= x <= MAX < POSITIVE_INFINITY`.
#[derive(Copy, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(transparent)
)]
pub struct Fp(i64);

impl Fp {
    pub const ZERO: Self = Self(0);
    pub const ONE: Self = Self(ONE_RAW);
    pub const HALF: Self = Self(ONE_RAW >> 1);
    pub const TWO: Self = Self(ONE_RAW << 1);

    /// Largest finite value.
    pub const MAX: Self = Self(i64::MAX - 1);
    /// Smallest finite value.
    pub const MIN: Self = Self(i64::MIN + 2);

    pub const POSITIVE_INFINITY: Self = Self(i64::MAX);
    pub const NEGATIVE_INFINITY: Self = Self(i64::MIN + 1);
    /// The "no value" sentinel. Propagates through every operation.
    pub const UNSET: Self = Self(i64::MIN);

    /// `sqrt(2)` rounded to the nearest representable value.
    pub const SQRT_2: Self = Self(6_074_001_000);
    pub const PI: Self = Self(13_493_037_705);
    pub const HALF_PI: Self = Self(6_746_518_852);
    pub const TWO_PI: Self = Self(26_986_075_409);

    /// Build a value from its raw Q31.32 representation.
    #[inline]
    pub const fn from_raw(raw: i64) -> Self {
        Self(raw)
    }

    /// The raw Q31.32 representation.
    #[inline]
    pub const fn raw(self) -> i64 {
        self.0
    }

    /// Exact conversion from an integer.
    #[inline]
    pub const fn from_int(v: i32) -> Self {
        Self((v as i64) << FRACTIONAL_BITS)
    }

    /// `num / den`, computed with the same rules as [`Div`].
    pub fn from_ratio(num: i64, den: i64) -> Self {
        if den == 0 {
            return Self::divide_by_zero(num.signum());
        }
        Self::saturate(((num as i128) << FRACTIONAL_BITS) / den as i128)
    }

    /// Integer part, rounded towards negative infinity.
    ///
    /// Infinities saturate to `i32::MAX` / `i32::MIN`; `UNSET` also maps to
    /// `i32::MIN`.
    #[inline]
    pub const fn to_int(self) -> i32 {
        (self.0 >> FRACTIONAL_BITS) as i32
    }

    /// Lossy conversion for display and rendering. Never feed the result back
    /// into the simulation.
    pub fn to_f64(self) -> f64 {
        match self {
            Self::POSITIVE_INFINITY => f64::INFINITY,
            Self::NEGATIVE_INFINITY => f64::NEG_INFINITY,
            Self::UNSET => f64::NAN,
            _ => self.0 as f64 / ONE_RAW as f64,
        }
    }

    #[inline]
    pub const fn is_unset(self) -> bool {
        self.0 == Self::UNSET.0
    }

    #[inline]
    pub const fn is_infinite(self) -> bool {
        self.0 == Self::POSITIVE_INFINITY.0 || self.0 == Self::NEGATIVE_INFINITY.0
    }

    #[inline]
    pub const fn is_finite(self) -> bool {
        !self.is_infinite() && !self.is_unset()
    }

    /// `-1`, `0` or `1` according to the sign; `0` for `UNSET`.
    #[inline]
    pub const fn signum(self) -> i64 {
        if self.is_unset() { 0 } else { self.0.signum() }
    }

    pub fn abs(self) -> Self {
        match self {
            Self::UNSET => Self::UNSET,
            Self::NEGATIVE_INFINITY => Self::POSITIVE_INFINITY,
            _ => Self(self.0.abs()),
        }
    }

    pub fn floor(self) -> Self {
        if !self.is_finite() {
            return self;
        }
        Self::saturate((self.0 & !FRACTION_MASK) as i128)
    }

    pub fn ceil(self) -> Self {
        if !self.is_finite() || self.0 & FRACTION_MASK == 0 {
            return self;
        }
        Self::saturate((self.0 & !FRACTION_MASK) as i128 + ONE_RAW as i128)
    }

    /// Round half up.
    pub fn round(self) -> Self {
        (self + Self::HALF).floor()
    }

    /// Square root by integer Newton iteration.
    ///
    /// Negative input yields `UNSET`. The result is the floor of the exact
    /// root at 32 fractional bits.
    pub fn sqrt(self) -> Self {
        if self.is_unset() || self.0 < 0 {
            return Self::UNSET;
        }
        if self == Self::POSITIVE_INFINITY || self.0 == 0 {
            return self;
        }
        let root = isqrt((self.0 as u128) << FRACTIONAL_BITS);
        Self(root as i64)
    }

    /// Sine, accurate to roughly `1e-7` over the whole finite range.
    pub fn sin(self) -> Self {
        if !self.is_finite() {
            return Self::UNSET;
        }
        let mut x = self.wrap_angle();
        if x > Self::HALF_PI {
            x = Self::PI - x;
        } else if x < -Self::HALF_PI {
            x = -Self::PI - x;
        }
        // Taylor series to x^11 in Horner form.
        let x2 = x * x;
        let mut r = Self::ONE - x2.div_int(110);
        for k in [72, 42, 20, 6] {
            r = Self::ONE - (x2 * r).div_int(k);
        }
        x * r
    }

    pub fn cos(self) -> Self {
        if !self.is_finite() {
            return Self::UNSET;
        }
        (self.wrap_angle() + Self::HALF_PI).sin()
    }

    /// Reduce an angle into `[-PI, PI]`.
    fn wrap_angle(self) -> Self {
        let mut r = self.0 % Self::TWO_PI.0;
        if r > Self::PI.0 {
            r -= Self::TWO_PI.0;
        } else if r < -Self::PI.0 {
            r += Self::TWO_PI.0;
        }
        Self(r)
    }

    #[inline]
    fn div_int(self, k: i64) -> Self {
        Self(self.0 / k)
    }

    fn saturate(wide: i128) -> Self {
        if wide > Self::MAX.0 as i128 {
            Self::POSITIVE_INFINITY
        } else if wide < Self::MIN.0 as i128 {
            Self::NEGATIVE_INFINITY
        } else {
            Self(wide as i64)
        }
    }

    fn divide_by_zero(sign: i64) -> Self {
        match sign {
            0 => Self::UNSET,
            s if s > 0 => Self::POSITIVE_INFINITY,
            _ => Self::NEGATIVE_INFINITY,
        }
    }

    fn infinity_with_sign(sign: i64) -> Self {
        if sign < 0 {
            Self::NEGATIVE_INFINITY
        } else {
            Self::POSITIVE_INFINITY
        }
    }
}

fn isqrt(n: u128) -> u128 {
    if n < 2 {
        return n;
    }
    let bits = 128 - n.leading_zeros();
    let mut x = 1u128 << bits.div_ceil(2);
    loop {
        let y = (x + n / x) >> 1;
        if y >= x {
            return x;
        }
        x = y;
    }
}

impl From<i32> for Fp {
    #[inline]
    fn from(v: i32) -> Self {
        Self::from_int(v)
    }
}

impl Neg for Fp {
    type Output = Self;

    fn neg(self) -> Self {
        match self {
            Self::UNSET => Self::UNSET,
            Self::POSITIVE_INFINITY => Self::NEGATIVE_INFINITY,
            Self::NEGATIVE_INFINITY => Self::POSITIVE_INFINITY,
            _ => Self(-self.0),
        }
    }
}

impl Add for Fp {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        if self.is_unset() || rhs.is_unset() {
            return Self::UNSET;
        }
        match (self.is_infinite(), rhs.is_infinite()) {
            (false, false) => Self::saturate(self.0 as i128 + rhs.0 as i128),
            (true, true) if self == rhs => self,
            (true, true) => Self::UNSET,
            (true, false) => self,
            (false, true) => rhs,
        }
    }
}

impl Sub for Fp {
    type Output = Self;

    #[inline]
    fn sub(self, rhs: Self) -> Self {
        self + (-rhs)
    }
}

impl Mul for Fp {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self {
        if self.is_unset() || rhs.is_unset() {
            return Self::UNSET;
        }
        if self.is_infinite() || rhs.is_infinite() {
            let sign = self.signum() * rhs.signum();
            if sign == 0 {
                return Self::UNSET;
            }
            return Self::infinity_with_sign(sign);
        }
        Self::saturate((self.0 as i128 * rhs.0 as i128) >> FRACTIONAL_BITS)
    }
}

impl Div for Fp {
    type Output = Self;

    fn div(self, rhs: Self) -> Self {
        if self.is_unset() || rhs.is_unset() {
            return Self::UNSET;
        }
        if rhs.0 == 0 {
            return Self::divide_by_zero(self.signum());
        }
        match (self.is_infinite(), rhs.is_infinite()) {
            (true, true) => Self::UNSET,
            (true, false) => Self::infinity_with_sign(self.signum() * rhs.signum()),
            (false, true) => Self::ZERO,
            (false, false) => Self::saturate(((self.0 as i128) << FRACTIONAL_BITS) / rhs.0 as i128),
        }
    }
}

impl AddAssign for Fp {
    #[inline]
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl SubAssign for Fp {
    #[inline]
    fn sub_assign(&mut self, rhs: Self) {
        *self = *self - rhs;
    }
}

impl MulAssign for Fp {
    #[inline]
    fn mul_assign(&mut self, rhs: Self) {
        *self = *self * rhs;
    }
}

impl DivAssign for Fp {
    #[inline]
    fn div_assign(&mut self, rhs: Self) {
        *self = *self / rhs;
    }
}

impl std::iter::Sum for Fp {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}

impl fmt::Display for Fp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::UNSET => f.write_str("unset"),
            Self::POSITIVE_INFINITY => f.write_str("inf"),
            Self::NEGATIVE_INFINITY => f.write_str("-inf"),
            _ => write!(f, "{}", self.to_f64()),
        }
    }
}

impl fmt::Debug for Fp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Fp({self})")
    }
}
