//! A wide-exponent floating-point number.
//!
//! Probability products over long symbol sequences underflow ordinary doubles:
//! a history of ten thousand symbols easily produces probabilities around
//! `2^-20000`. `WideF64` keeps an `f64` mantissa normalized into `[1, 2)`
//! together with a separate `i64` exponent, so the representable magnitude
//! range is far beyond anything the forecasting pipeline can produce while
//! mantissa arithmetic stays plain hardware floating point.
//!
//! Overflow and underflow clamp to the closest representable extreme instead
//! of producing infinities; invalid operations collapse to zero. Values are
//! totally ordered (the mantissa is never NaN).

use std::cmp::Ordering;
use std::fmt;
use std::ops::{Add, AddAssign, Div, DivAssign, Mul, MulAssign, Neg, Sub, SubAssign};

const EXP_MASK: u64 = 0x7ff << 52;
const EXP_BIAS: i64 = 1023;

/// Exponents are clamped into `[-EXP_LIMIT, EXP_LIMIT]`, far beyond any code
/// length the pipeline can produce, but small enough that exponent arithmetic
/// cannot itself overflow.
const EXP_LIMIT: i64 = 1 << 48;

/// When two addends' exponents differ by more than this, the smaller one is
/// below the mantissa's resolution and is dropped.
const ADD_SHIFT_LIMIT: i64 = 128;

fn pow2i(e: i32) -> f64 {
    f64::powi(2.0, e)
}

/// Splits a finite, nonzero `f64` into a mantissa in `±[1, 2)` and an
/// unbiased power-of-two exponent.
fn split(x: f64) -> (f64, i64) {
    debug_assert!(x.is_finite() && x != 0.0);
    let bits = x.to_bits();
    let raw_exp = ((bits & EXP_MASK) >> 52) as i64;
    if raw_exp == 0 {
        // Subnormal: scale into the normal range, then account for the scale.
        let (mantissa, exp) = split(x * pow2i(200));
        (mantissa, exp - 200)
    } else {
        let mantissa = f64::from_bits((bits & !EXP_MASK) | ((EXP_BIAS as u64) << 52));
        (mantissa, raw_exp - EXP_BIAS)
    }
}

/// Floating-point value `mantissa * 2^exponent` with an `i64` exponent.
#[derive(Clone, Copy)]
pub struct WideF64 {
    mantissa: f64,
    exponent: i64,
}

impl WideF64 {
    pub const ZERO: WideF64 = WideF64 {
        mantissa: 0.0,
        exponent: 0,
    };

    pub const ONE: WideF64 = WideF64 {
        mantissa: 1.0,
        exponent: 0,
    };

    /// Largest representable magnitude; overflow clamps here.
    pub const MAX: WideF64 = WideF64 {
        mantissa: 2.0 - f64::EPSILON,
        exponent: EXP_LIMIT,
    };

    /// Most negative representable value.
    pub const MIN: WideF64 = WideF64 {
        mantissa: -(2.0 - f64::EPSILON),
        exponent: EXP_LIMIT,
    };

    pub fn from_f64(x: f64) -> Self {
        if x == 0.0 || x.is_nan() {
            return Self::ZERO;
        }
        if x.is_infinite() {
            return if x > 0.0 { Self::MAX } else { Self::MIN };
        }
        let (mantissa, exponent) = split(x);
        Self { mantissa, exponent }
    }

    fn normalize(mantissa: f64, exponent: i64) -> Self {
        if mantissa == 0.0 || mantissa.is_nan() {
            return Self::ZERO;
        }
        if mantissa.is_infinite() {
            return if mantissa > 0.0 { Self::MAX } else { Self::MIN };
        }
        let (frac, shift) = split(mantissa);
        let exponent = exponent.saturating_add(shift);
        if exponent > EXP_LIMIT {
            return if frac > 0.0 { Self::MAX } else { Self::MIN };
        }
        Self {
            mantissa: frac,
            exponent: exponent.max(-EXP_LIMIT),
        }
    }

    pub fn is_zero(&self) -> bool {
        self.mantissa == 0.0
    }

    fn signum(&self) -> i32 {
        if self.mantissa > 0.0 {
            1
        } else if self.mantissa < 0.0 {
            -1
        } else {
            0
        }
    }

    /// Conversion to an ordinary double; out-of-range magnitudes clamp to
    /// `f64::MAX` (or zero for underflow).
    pub fn to_f64(&self) -> f64 {
        if self.is_zero() {
            return 0.0;
        }
        if self.exponent > 1023 {
            return if self.mantissa > 0.0 {
                f64::MAX
            } else {
                -f64::MAX
            };
        }
        if self.exponent < -1074 {
            return 0.0;
        }
        let value = self.mantissa * pow2i(self.exponent as i32);
        if value.is_infinite() {
            if value > 0.0 {
                f64::MAX
            } else {
                -f64::MAX
            }
        } else {
            value
        }
    }

    /// `2^x` for an arbitrary finite `x`, without intermediate overflow.
    pub fn exp2(x: f64) -> Self {
        if x.is_nan() {
            return Self::ZERO;
        }
        if x.is_infinite() {
            return if x > 0.0 { Self::MAX } else { Self::ZERO };
        }
        let int_part = x.floor();
        let frac_part = x - int_part;
        let exponent = if int_part >= EXP_LIMIT as f64 {
            EXP_LIMIT
        } else if int_part <= -(EXP_LIMIT as f64) {
            -EXP_LIMIT
        } else {
            int_part as i64
        };
        Self::normalize(frac_part.exp2(), exponent)
    }

    /// Base-2 logarithm as an ordinary double. Zero maps to negative
    /// infinity; negative values map to NaN.
    pub fn log2(&self) -> f64 {
        if self.is_zero() {
            return f64::NEG_INFINITY;
        }
        if self.mantissa < 0.0 {
            return f64::NAN;
        }
        self.exponent as f64 + self.mantissa.log2()
    }

    pub fn abs(self) -> Self {
        Self {
            mantissa: self.mantissa.abs(),
            exponent: self.exponent,
        }
    }

    /// Rounds toward positive infinity.
    pub fn ceil(self) -> Self {
        if self.is_zero() {
            return Self::ZERO;
        }
        if self.exponent >= 52 {
            // The value has no fractional part at f64 mantissa resolution.
            return self;
        }
        if self.exponent < 0 {
            // Magnitude below one.
            return if self.mantissa > 0.0 {
                Self::ONE
            } else {
                Self::ZERO
            };
        }
        Self::from_f64(self.to_f64().ceil())
    }
}

impl Default for WideF64 {
    fn default() -> Self {
        Self::ZERO
    }
}

impl From<f64> for WideF64 {
    fn from(x: f64) -> Self {
        Self::from_f64(x)
    }
}

impl From<u64> for WideF64 {
    fn from(x: u64) -> Self {
        Self::from_f64(x as f64)
    }
}

impl From<usize> for WideF64 {
    fn from(x: usize) -> Self {
        Self::from_f64(x as f64)
    }
}

impl Add for WideF64 {
    type Output = WideF64;

    fn add(self, rhs: WideF64) -> WideF64 {
        if self.is_zero() {
            return rhs;
        }
        if rhs.is_zero() {
            return self;
        }
        let (hi, lo) = if self.exponent >= rhs.exponent {
            (self, rhs)
        } else {
            (rhs, self)
        };
        let shift = hi.exponent - lo.exponent;
        if shift > ADD_SHIFT_LIMIT {
            return hi;
        }
        let aligned = lo.mantissa * pow2i(-(shift as i32));
        Self::normalize(hi.mantissa + aligned, hi.exponent)
    }
}

impl Sub for WideF64 {
    type Output = WideF64;

    fn sub(self, rhs: WideF64) -> WideF64 {
        self + (-rhs)
    }
}

impl Mul for WideF64 {
    type Output = WideF64;

    fn mul(self, rhs: WideF64) -> WideF64 {
        if self.is_zero() || rhs.is_zero() {
            return Self::ZERO;
        }
        Self::normalize(
            self.mantissa * rhs.mantissa,
            self.exponent.saturating_add(rhs.exponent),
        )
    }
}

impl Div for WideF64 {
    type Output = WideF64;

    fn div(self, rhs: WideF64) -> WideF64 {
        if self.is_zero() {
            return Self::ZERO;
        }
        if rhs.is_zero() {
            // Division by zero clamps instead of producing an infinity.
            return if self.mantissa > 0.0 {
                Self::MAX
            } else {
                Self::MIN
            };
        }
        Self::normalize(
            self.mantissa / rhs.mantissa,
            self.exponent.saturating_sub(rhs.exponent),
        )
    }
}

impl Neg for WideF64 {
    type Output = WideF64;

    fn neg(self) -> WideF64 {
        if self.is_zero() {
            return Self::ZERO;
        }
        Self {
            mantissa: -self.mantissa,
            exponent: self.exponent,
        }
    }
}

impl AddAssign for WideF64 {
    fn add_assign(&mut self, rhs: WideF64) {
        *self = *self + rhs;
    }
}

impl SubAssign for WideF64 {
    fn sub_assign(&mut self, rhs: WideF64) {
        *self = *self - rhs;
    }
}

impl MulAssign for WideF64 {
    fn mul_assign(&mut self, rhs: WideF64) {
        *self = *self * rhs;
    }
}

impl DivAssign for WideF64 {
    fn div_assign(&mut self, rhs: WideF64) {
        *self = *self / rhs;
    }
}

impl PartialEq for WideF64 {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for WideF64 {}

impl PartialOrd for WideF64 {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for WideF64 {
    fn cmp(&self, other: &Self) -> Ordering {
        let (ls, rs) = (self.signum(), other.signum());
        if ls != rs {
            return ls.cmp(&rs);
        }
        if ls == 0 {
            return Ordering::Equal;
        }
        match self.exponent.cmp(&other.exponent) {
            Ordering::Equal => self
                .mantissa
                .partial_cmp(&other.mantissa)
                .unwrap_or(Ordering::Equal),
            ord if ls > 0 => ord,
            ord => ord.reverse(),
        }
    }
}

impl fmt::Debug for WideF64 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}*2^{}", self.mantissa, self.exponent)
    }
}

impl fmt::Display for WideF64 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.exponent.abs() < 512 {
            write!(f, "{}", self.to_f64())
        } else {
            write!(f, "{}*2^{}", self.mantissa, self.exponent)
        }
    }
}
