//! Quadruple-precision binary floating point in pure integer arithmetic.
//!
//! A [`Quad`] is `(-1)^negative * mantissa * 2^exponent` with a 128-bit
//! mantissa whose top bit is set (or zero for the value zero). That is 15
//! bits more significand than IEEE 754 binary128, over the same exponent
//! range. Every operation truncates toward zero; there is no rounding mode
//! and no hidden state, so results are bit-identical everywhere.
//!
//! Results above the binary128 range fail with [`MathError::Overflow`];
//! results below it flush to zero.

use std::cmp::Ordering;
use std::fmt;

use iftl_core::error::MathError;

/// Largest binary exponent of the leading bit (binary128 max normal).
const MAX_LEADING_EXPONENT: i64 = 16_383;
/// Smallest binary exponent of the leading bit (binary128 min subnormal).
const MIN_LEADING_EXPONENT: i64 = -16_494;

const TOP_BIT: u128 = 1 << 127;

/// Hard cap on series iterations; convergence normally takes under 50.
const MAX_SERIES_TERMS: u32 = 256;

/// `ln(2)` truncated to 128 significant bits.
const LN_2: Quad = Quad {
    negative: false,
    exponent: -128,
    mantissa: 0xb172_17f7_d1cf_79ab_c9e3_b398_03f2_f6af,
};

const IEEE_FRACTION_BITS: u32 = 112;
const IEEE_EXPONENT_BIAS: i64 = 16_383;
const IEEE_EXPONENT_MASK: u128 = 0x7fff;

/// Quadruple-precision binary float.
///
/// Values are always normalized, so derived equality is numeric equality.
/// There is a single zero (no negative zero).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub struct Quad {
    negative: bool,
    exponent: i32,
    mantissa: u128,
}

impl Quad {
    pub const ZERO: Self = Self {
        negative: false,
        exponent: 0,
        mantissa: 0,
    };

    pub const ONE: Self = Self {
        negative: false,
        exponent: -127,
        mantissa: TOP_BIT,
    };

    // ------------------------------------------------------------------
    // Construction
    // ------------------------------------------------------------------

    /// Normalize and range-check a raw `(sign, exponent, mantissa)` triple.
    fn pack(negative: bool, exponent: i64, mantissa: u128) -> Result<Self, MathError> {
        if mantissa == 0 {
            return Ok(Self::ZERO);
        }
        let shift = mantissa.leading_zeros();
        let mantissa = mantissa << shift;
        let exponent = exponent - shift as i64;
        let leading = exponent + 127;
        if leading > MAX_LEADING_EXPONENT {
            return Err(MathError::Overflow);
        }
        if leading < MIN_LEADING_EXPONENT {
            return Ok(Self::ZERO);
        }
        Ok(Self {
            negative,
            exponent: exponent as i32,
            mantissa,
        })
    }

    /// Integers always fit the exponent range, so this cannot fail.
    fn from_magnitude(negative: bool, magnitude: u128) -> Self {
        if magnitude == 0 {
            return Self::ZERO;
        }
        let shift = magnitude.leading_zeros();
        Self {
            negative,
            exponent: -(shift as i32),
            mantissa: magnitude << shift,
        }
    }

    /// Exact conversion from a signed integer.
    pub fn from_int(value: i128) -> Self {
        Self::from_magnitude(value < 0, value.unsigned_abs())
    }

    /// Exact conversion from an unsigned integer.
    pub fn from_u128(value: u128) -> Self {
        Self::from_magnitude(false, value)
    }

    /// `numerator / denominator`, truncated.
    pub fn from_ratio(numerator: i128, denominator: i128) -> Result<Self, MathError> {
        Self::from_int(numerator).div(Self::from_int(denominator))
    }

    /// Decode an IEEE 754 binary128 bit pattern. Exact for every finite input.
    ///
    /// NaN and infinities fail with [`MathError::NotFinite`].
    pub fn from_ieee_bits(bits: u128) -> Result<Self, MathError> {
        let negative = bits >> 127 == 1;
        let biased = ((bits >> IEEE_FRACTION_BITS) & IEEE_EXPONENT_MASK) as i64;
        let fraction = bits & ((1u128 << IEEE_FRACTION_BITS) - 1);

        if biased == IEEE_EXPONENT_MASK as i64 {
            return Err(MathError::NotFinite);
        }
        if biased == 0 {
            // Subnormal: fraction * 2^(1 - bias - 112)
            return Self::pack(
                negative,
                1 - IEEE_EXPONENT_BIAS - IEEE_FRACTION_BITS as i64,
                fraction,
            );
        }
        let significand = fraction | (1u128 << IEEE_FRACTION_BITS);
        Self::pack(
            negative,
            biased - IEEE_EXPONENT_BIAS - IEEE_FRACTION_BITS as i64,
            significand,
        )
    }

    /// Encode as an IEEE 754 binary128 bit pattern, truncating the 15 extra
    /// significand bits.
    pub fn to_ieee_bits(self) -> u128 {
        if self.is_zero() {
            return 0;
        }
        let sign = (self.negative as u128) << 127;
        let biased = self.leading_exponent() + IEEE_EXPONENT_BIAS;

        if biased <= 0 {
            let shift = (1 - IEEE_EXPONENT_BIAS - IEEE_FRACTION_BITS as i64) - self.exponent as i64;
            let fraction = if shift >= 128 {
                0
            } else {
                self.mantissa >> shift
            };
            return sign | fraction;
        }

        let fraction =
            (self.mantissa >> (127 - IEEE_FRACTION_BITS)) & ((1u128 << IEEE_FRACTION_BITS) - 1);
        sign | ((biased as u128) << IEEE_FRACTION_BITS) | fraction
    }

    // ------------------------------------------------------------------
    // Inspection
    // ------------------------------------------------------------------

    pub fn is_zero(&self) -> bool {
        self.mantissa == 0
    }

    /// True for values strictly below zero.
    pub fn is_negative(&self) -> bool {
        self.negative
    }

    /// Binary exponent of the leading bit: `floor(log2(|self|))` for nonzero values.
    fn leading_exponent(&self) -> i64 {
        self.exponent as i64 + 127
    }

    fn cmp_magnitude(&self, other: &Self) -> Ordering {
        match (self.is_zero(), other.is_zero()) {
            (true, true) => Ordering::Equal,
            (true, false) => Ordering::Less,
            (false, true) => Ordering::Greater,
            (false, false) => (self.exponent, self.mantissa).cmp(&(other.exponent, other.mantissa)),
        }
    }

    /// Integer part, truncated toward zero, as a magnitude.
    fn truncated_magnitude(&self) -> Result<u128, MathError> {
        if self.is_zero() || self.exponent <= -128 {
            return Ok(0);
        }
        if self.exponent > 0 {
            return Err(MathError::Overflow);
        }
        Ok(self.mantissa >> (-self.exponent) as u32)
    }

    /// Integer part, truncated toward zero.
    pub fn to_u128(&self) -> Result<u128, MathError> {
        let magnitude = self.truncated_magnitude()?;
        if self.negative && magnitude != 0 {
            return Err(MathError::NegativeValue);
        }
        Ok(magnitude)
    }

    /// Integer part, truncated toward zero.
    pub fn to_i128(&self) -> Result<i128, MathError> {
        let magnitude = self.truncated_magnitude()?;
        if self.negative {
            if magnitude > i128::MIN.unsigned_abs() {
                return Err(MathError::Overflow);
            }
            Ok((magnitude as i128).wrapping_neg())
        } else {
            i128::try_from(magnitude).map_err(|_| MathError::Overflow)
        }
    }

    /// Nearest `f64`, for display and diagnostics only.
    pub fn to_f64_lossy(&self) -> f64 {
        if self.is_zero() {
            return 0.0;
        }
        let top = (self.mantissa >> 64) as f64;
        let value = top * 2f64.powi(self.exponent + 64);
        if self.negative { -value } else { value }
    }

    // ------------------------------------------------------------------
    // Arithmetic
    // ------------------------------------------------------------------

    pub fn neg(self) -> Self {
        if self.is_zero() {
            return self;
        }
        Self {
            negative: !self.negative,
            ..self
        }
    }

    pub fn abs(self) -> Self {
        Self {
            negative: false,
            ..self
        }
    }

    pub fn add(self, rhs: Self) -> Result<Self, MathError> {
        if self.is_zero() {
            return Ok(rhs);
        }
        if rhs.is_zero() {
            return Ok(self);
        }

        let (big, small) = if self.cmp_magnitude(&rhs) == Ordering::Less {
            (rhs, self)
        } else {
            (self, rhs)
        };
        let shift = (big.exponent as i64 - small.exponent as i64) as u64;

        if big.negative == small.negative {
            let aligned = if shift >= 128 {
                0
            } else {
                small.mantissa >> shift
            };
            let (sum, carry) = big.mantissa.overflowing_add(aligned);
            if carry {
                Self::pack(big.negative, big.exponent as i64 + 1, (sum >> 1) | TOP_BIT)
            } else {
                Self::pack(big.negative, big.exponent as i64, sum)
            }
        } else {
            // Subtract in 256 bits, borrowing one more unit when bits below
            // the window were dropped, so the result truncates toward zero.
            let (small_hi, small_lo, sticky) = match shift {
                0 => (small.mantissa, 0, false),
                1..=127 => (small.mantissa >> shift, small.mantissa << (128 - shift), false),
                128 => (0, small.mantissa, false),
                129..=255 => {
                    let dropped = shift - 128;
                    let lost = small.mantissa & ((1u128 << dropped) - 1);
                    (0, small.mantissa >> dropped, lost != 0)
                }
                _ => (0, 0, true),
            };
            let (lo, borrow_a) = 0u128.overflowing_sub(small_lo);
            let (lo, borrow_b) = lo.overflowing_sub(sticky as u128);
            // |big| >= |small|, so the high word never underflows.
            let hi = big.mantissa - small_hi - (borrow_a || borrow_b) as u128;

            if hi != 0 {
                let lz = hi.leading_zeros();
                let mantissa = if lz == 0 {
                    hi
                } else {
                    (hi << lz) | (lo >> (128 - lz))
                };
                Self::pack(big.negative, big.exponent as i64 - lz as i64, mantissa)
            } else {
                Self::pack(big.negative, big.exponent as i64 - 128, lo)
            }
        }
    }

    pub fn sub(self, rhs: Self) -> Result<Self, MathError> {
        self.add(rhs.neg())
    }

    pub fn mul(self, rhs: Self) -> Result<Self, MathError> {
        if self.is_zero() || rhs.is_zero() {
            return Ok(Self::ZERO);
        }
        let (hi, lo) = widening_mul(self.mantissa, rhs.mantissa);
        let exponent = self.exponent as i64 + rhs.exponent as i64;
        // The product of two normalized mantissas has its top bit at 254 or 255.
        let (mantissa, exponent) = if hi & TOP_BIT != 0 {
            (hi, exponent + 128)
        } else {
            ((hi << 1) | (lo >> 127), exponent + 127)
        };
        Self::pack(self.negative != rhs.negative, exponent, mantissa)
    }

    pub fn div(self, rhs: Self) -> Result<Self, MathError> {
        if rhs.is_zero() {
            return Err(MathError::DivisionByZero);
        }
        if self.is_zero() {
            return Ok(Self::ZERO);
        }
        let exponent = self.exponent as i64 - rhs.exponent as i64;
        // Scale the dividend so the quotient lands in [2^127, 2^128).
        let (hi, lo, exponent) = if self.mantissa >= rhs.mantissa {
            (self.mantissa >> 1, (self.mantissa & 1) << 127, exponent - 127)
        } else {
            (self.mantissa, 0, exponent - 128)
        };
        let quotient = div_wide(hi, lo, rhs.mantissa);
        Self::pack(self.negative != rhs.negative, exponent, quotient)
    }

    /// `self * 2^power`.
    pub fn scale_pow2(self, power: i64) -> Result<Self, MathError> {
        if self.is_zero() {
            return Ok(self);
        }
        Self::pack(self.negative, self.exponent as i64 + power, self.mantissa)
    }

    // ------------------------------------------------------------------
    // Transcendentals
    // ------------------------------------------------------------------

    /// Natural exponential `e^self`.
    ///
    /// Reduces `self = k*ln2 + r` with `|r| < ln2`, sums the Taylor series of
    /// `e^r` until the terms vanish, then scales by `2^k`.
    pub fn exp(self) -> Result<Self, MathError> {
        if self.is_zero() {
            return Ok(Self::ONE);
        }
        let k = self.div(LN_2)?;
        // |k| >= 2^21 is far outside the exponent range in either direction.
        if !k.is_zero() && k.leading_exponent() > 20 {
            return if self.negative {
                Ok(Self::ZERO)
            } else {
                Err(MathError::Overflow)
            };
        }
        let k = k.to_i128()?;
        let reduced = self.sub(LN_2.mul(Self::from_int(k))?)?;
        exp_series(reduced)?.scale_pow2(k as i64)
    }

    /// Natural logarithm. Fails for zero and negative values.
    ///
    /// Splits `self = y * 2^e` with `y` in `[1, 2)`, then
    /// `ln(y) = 2 * atanh((y - 1) / (y + 1))`.
    pub fn ln(self) -> Result<Self, MathError> {
        if self.is_zero() || self.negative {
            return Err(MathError::NonPositiveLogarithm);
        }
        let e = self.leading_exponent();
        let y = Self {
            negative: false,
            exponent: -127,
            mantissa: self.mantissa,
        };
        let z = y.sub(Self::ONE)?.div(y.add(Self::ONE)?)?;
        let ln_y = atanh_series(z)?.scale_pow2(1)?;
        LN_2.mul(Self::from_int(e as i128))?.add(ln_y)
    }

    /// `self^exponent = e^(exponent * ln(self))`. The base must be positive.
    pub fn pow(self, exponent: Self) -> Result<Self, MathError> {
        exponent.mul(self.ln()?)?.exp()
    }
}

fn exp_series(r: Quad) -> Result<Quad, MathError> {
    let mut sum = Quad::ONE;
    let mut term = Quad::ONE;
    for n in 1..=MAX_SERIES_TERMS {
        term = term.mul(r)?.div(Quad::from_int(n as i128))?;
        let next = sum.add(term)?;
        if next == sum {
            break;
        }
        sum = next;
    }
    Ok(sum)
}

/// `atanh(z) = z + z^3/3 + z^5/5 + ...` for `|z| < 1/3`.
fn atanh_series(z: Quad) -> Result<Quad, MathError> {
    if z.is_zero() {
        return Ok(Quad::ZERO);
    }
    let z2 = z.mul(z)?;
    let mut power = z;
    let mut sum = z;
    for n in 1..=MAX_SERIES_TERMS {
        power = power.mul(z2)?;
        let term = power.div(Quad::from_int(2 * n as i128 + 1))?;
        let next = sum.add(term)?;
        if next == sum {
            break;
        }
        sum = next;
    }
    Ok(sum)
}

/// Full 256-bit product of two `u128`s as `(high, low)`.
fn widening_mul(a: u128, b: u128) -> (u128, u128) {
    const MASK: u128 = u64::MAX as u128;
    let (a1, a0) = (a >> 64, a & MASK);
    let (b1, b0) = (b >> 64, b & MASK);

    let p00 = a0 * b0;
    let p01 = a0 * b1;
    let p10 = a1 * b0;
    let p11 = a1 * b1;

    // mid < 3 * 2^64, no overflow.
    let mid = (p00 >> 64) + (p01 & MASK) + (p10 & MASK);
    let lo = (p00 & MASK) | (mid << 64);
    let hi = p11 + (p01 >> 64) + (p10 >> 64) + (mid >> 64);
    (hi, lo)
}

/// `floor((hi * 2^128 + lo) / divisor)` by shift-subtract long division.
///
/// Requires `hi < divisor`, which keeps the quotient within 128 bits.
fn div_wide(hi: u128, lo: u128, divisor: u128) -> u128 {
    let mut rem = hi;
    let mut quot: u128 = 0;
    for i in (0..128).rev() {
        let carry = rem >> 127;
        rem = (rem << 1) | ((lo >> i) & 1);
        quot <<= 1;
        if carry == 1 || rem >= divisor {
            rem = rem.wrapping_sub(divisor);
            quot |= 1;
        }
    }
    quot
}

/// `floor(a * b / divisor)` with a 256-bit intermediate product.
///
/// Used for proportional splits where `a * b` may exceed `u128`.
pub fn mul_div_floor(a: u128, b: u128, divisor: u128) -> Result<u128, MathError> {
    if divisor == 0 {
        return Err(MathError::DivisionByZero);
    }
    let (hi, lo) = widening_mul(a, b);
    if hi >= divisor {
        return Err(MathError::Overflow);
    }
    Ok(div_wide(hi, lo, divisor))
}

impl Ord for Quad {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self.negative, other.negative) {
            (false, true) => Ordering::Greater,
            (true, false) => Ordering::Less,
            (false, false) => self.cmp_magnitude(other),
            (true, true) => other.cmp_magnitude(self),
        }
    }
}

impl PartialOrd for Quad {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Quad {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_f64_lossy())
    }
}

impl From<i128> for Quad {
    fn from(value: i128) -> Self {
        Self::from_int(value)
    }
}

impl From<u128> for Quad {
    fn from(value: u128) -> Self {
        Self::from_u128(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    /// `x * 10^digits`, truncated, for comparing against decimal references.
    fn scaled(x: Quad, digits: u32) -> i128 {
        x.mul(Quad::from_u128(10u128.pow(digits)))
            .unwrap()
            .to_i128()
            .unwrap()
    }

    // ------------------------------------------------------------------
    // Conversions
    // ------------------------------------------------------------------

    #[test]
    fn integer_round_trip() {
        for v in [0i128, 1, -1, 42, -1000, i64::MAX as i128, i128::MAX, i128::MIN] {
            assert_eq!(Quad::from_int(v).to_i128().unwrap(), v, "round trip {v}");
        }
        assert_eq!(Quad::from_u128(u128::MAX).to_u128().unwrap(), u128::MAX);
    }

    #[test]
    fn one_constant_matches_from_int() {
        assert_eq!(Quad::ONE, Quad::from_int(1));
    }

    #[test]
    fn to_integer_truncates_toward_zero() {
        assert_eq!(Quad::from_ratio(7, 2).unwrap().to_i128().unwrap(), 3);
        assert_eq!(Quad::from_ratio(-7, 2).unwrap().to_i128().unwrap(), -3);
        assert_eq!(Quad::from_ratio(1, 3).unwrap().to_u128().unwrap(), 0);
    }

    #[test]
    fn negative_to_unsigned_fails() {
        assert_eq!(Quad::from_int(-2).to_u128(), Err(MathError::NegativeValue));
        // Magnitude below one truncates to zero regardless of sign.
        assert_eq!(Quad::from_ratio(-1, 2).unwrap().to_u128().unwrap(), 0);
    }

    #[test]
    fn too_large_for_integer_overflows() {
        let big = Quad::from_u128(u128::MAX).mul(Quad::from_int(2)).unwrap();
        assert_eq!(big.to_u128(), Err(MathError::Overflow));
        assert_eq!(Quad::from_u128(u128::MAX).to_i128(), Err(MathError::Overflow));
    }

    #[test]
    fn ieee_one() {
        let one_bits = 0x3fffu128 << 112;
        assert_eq!(Quad::from_ieee_bits(one_bits).unwrap(), Quad::ONE);
        assert_eq!(Quad::ONE.to_ieee_bits(), one_bits);
    }

    #[test]
    fn ieee_log2_e() {
        // log2(e) = 1.4426950408889634...
        let q = Quad::from_ieee_bits(0x3FFF_7154_7652_B82F_E177_7D0F_FDA0_D23A).unwrap();
        assert_eq!(scaled(q, 12), 1_442_695_040_888);
    }

    #[test]
    fn ieee_round_trip_is_exact() {
        for bits in [
            0x3FFF_7154_7652_B82F_E177_7D0F_FDA0_D23Au128,
            0xC000_0000_0000_0000_0000_0000_0000_0000,
            0x0000_0000_0000_0000_0000_0000_0000_0001, // smallest subnormal
            0x7FFE_FFFF_FFFF_FFFF_FFFF_FFFF_FFFF_FFFF, // largest finite
        ] {
            let q = Quad::from_ieee_bits(bits).unwrap();
            assert_eq!(q.to_ieee_bits(), bits, "bits {bits:#x}");
        }
    }

    #[test]
    fn ieee_negative_zero_is_zero() {
        assert_eq!(Quad::from_ieee_bits(1u128 << 127).unwrap(), Quad::ZERO);
    }

    #[test]
    fn ieee_non_finite_rejected() {
        let inf = 0x7fffu128 << 112;
        let nan = inf | 1;
        assert_eq!(Quad::from_ieee_bits(inf), Err(MathError::NotFinite));
        assert_eq!(Quad::from_ieee_bits(nan), Err(MathError::NotFinite));
    }

    // ------------------------------------------------------------------
    // Arithmetic
    // ------------------------------------------------------------------

    #[test]
    fn add_and_sub_integers() {
        let a = Quad::from_int(1_000);
        let b = Quad::from_int(-1_250);
        assert_eq!(a.add(b).unwrap().to_i128().unwrap(), -250);
        assert_eq!(a.sub(b).unwrap().to_i128().unwrap(), 2_250);
        assert_eq!(a.sub(a).unwrap(), Quad::ZERO);
    }

    #[test]
    fn add_carry_renormalizes() {
        let max = Quad::from_u128(u128::MAX >> 1);
        let sum = max.add(max).unwrap();
        assert_eq!(sum.to_u128().unwrap(), (u128::MAX >> 1) * 2);
    }

    #[test]
    fn mul_and_div_exact() {
        let a = Quad::from_int(123_456_789);
        let b = Quad::from_int(-987_654_321);
        let p = a.mul(b).unwrap();
        assert_eq!(p.to_i128().unwrap(), 123_456_789i128 * -987_654_321);
        assert_eq!(p.div(b).unwrap(), a);
    }

    #[test]
    fn division_by_zero() {
        assert_eq!(Quad::ONE.div(Quad::ZERO), Err(MathError::DivisionByZero));
        assert_eq!(Quad::ZERO.div(Quad::ZERO), Err(MathError::DivisionByZero));
    }

    #[test]
    fn one_third_times_three_is_just_below_one() {
        let third = Quad::from_ratio(1, 3).unwrap();
        let back = third.mul(Quad::from_int(3)).unwrap();
        assert!(back < Quad::ONE);
        assert!(Quad::ONE.sub(back).unwrap() < Quad::from_ratio(1, 1 << 100).unwrap());
    }

    #[test]
    fn subtracting_a_tiny_value_stays_below() {
        let tiny = Quad::ONE.scale_pow2(-200).unwrap();
        let diff = Quad::ONE.sub(tiny).unwrap();
        assert!(diff < Quad::ONE);
        assert_eq!(diff.mantissa, u128::MAX);

        // 2 - (0.5 + 2^-128): the borrow crosses the retained window.
        let half_and_bit = Quad::ONE
            .scale_pow2(-1)
            .unwrap()
            .add(Quad::ONE.scale_pow2(-128).unwrap())
            .unwrap();
        let diff = Quad::from_int(2).sub(half_and_bit).unwrap();
        assert!(diff < Quad::from_ratio(3, 2).unwrap());
        assert!(Quad::from_ratio(3, 2).unwrap().sub(diff).unwrap() <= Quad::ONE.scale_pow2(-127).unwrap());
    }

    #[test]
    fn mixed_sign_add_truncates_toward_zero() {
        let tiny = Quad::ONE.scale_pow2(-300).unwrap();
        let neg = Quad::from_int(-1).add(tiny).unwrap();
        assert!(neg > Quad::from_int(-1));
        assert!(neg.is_negative());
        assert_eq!(Quad::from_int(5).sub(Quad::from_int(3)).unwrap(), Quad::from_int(2));
    }

    #[test]
    fn overflow_beyond_binary128_range() {
        let huge = Quad::ONE.scale_pow2(16_383).unwrap();
        assert_eq!(huge.mul(Quad::from_int(2)), Err(MathError::Overflow));
    }

    #[test]
    fn underflow_flushes_to_zero() {
        let tiny = Quad::ONE.scale_pow2(-16_494).unwrap();
        assert!(!tiny.is_zero());
        assert_eq!(tiny.div(Quad::from_int(2)).unwrap(), Quad::ZERO);
    }

    #[test]
    fn ordering() {
        let values = [
            Quad::from_int(-5),
            Quad::from_ratio(-1, 2).unwrap(),
            Quad::ZERO,
            Quad::from_ratio(1, 3).unwrap(),
            Quad::ONE,
            Quad::from_int(7),
        ];
        for w in values.windows(2) {
            assert!(w[0] < w[1], "{} < {}", w[0], w[1]);
        }
    }

    #[test]
    fn neg_of_zero_is_zero() {
        assert_eq!(Quad::ZERO.neg(), Quad::ZERO);
        assert!(!Quad::ZERO.neg().is_negative());
    }

    // ------------------------------------------------------------------
    // Transcendentals
    // ------------------------------------------------------------------

    #[test]
    fn exp_zero_is_one() {
        assert_eq!(Quad::ZERO.exp().unwrap(), Quad::ONE);
    }

    #[test]
    fn exp_one_is_e() {
        // e = 2.718281828459045235360287471352662...
        let e = Quad::ONE.exp().unwrap();
        assert_eq!(scaled(e, 30), 2_718_281_828_459_045_235_360_287_471_352);
    }

    #[test]
    fn exp_negative() {
        // e^-1 = 0.367879441171442321595523770161460...
        let inv_e = Quad::from_int(-1).exp().unwrap();
        assert_eq!(scaled(inv_e, 30), 367_879_441_171_442_321_595_523_770_161);
    }

    #[test]
    fn exp_large_negative_flushes() {
        assert_eq!(Quad::from_int(-1_000_000).exp().unwrap(), Quad::ZERO);
    }

    #[test]
    fn exp_large_positive_overflows() {
        assert_eq!(Quad::from_int(1_000_000).exp(), Err(MathError::Overflow));
        assert_eq!(Quad::from_int(12_000).exp(), Err(MathError::Overflow));
    }

    #[test]
    fn ln_of_two_is_constant() {
        assert_eq!(Quad::from_int(2).ln().unwrap(), LN_2);
    }

    #[test]
    fn ln_of_one_is_zero() {
        assert_eq!(Quad::ONE.ln().unwrap(), Quad::ZERO);
    }

    #[test]
    fn ln_of_ten() {
        // ln(10) = 2.302585092994045684017991454684364...
        let ln10 = Quad::from_int(10).ln().unwrap();
        assert_eq!(scaled(ln10, 30), 2_302_585_092_994_045_684_017_991_454_684);
    }

    #[test]
    fn ln_below_one_is_negative() {
        // ln(0.5) = -ln(2)
        let half = Quad::from_ratio(1, 2).unwrap();
        assert_eq!(half.ln().unwrap(), LN_2.neg());
    }

    #[test]
    fn ln_rejects_non_positive() {
        assert_eq!(Quad::ZERO.ln(), Err(MathError::NonPositiveLogarithm));
        assert_eq!(Quad::from_int(-3).ln(), Err(MathError::NonPositiveLogarithm));
    }

    #[test]
    fn pow_integer_exponent() {
        // 1.0025^2 = 1.00500625
        let base = Quad::from_ratio(10_025, 10_000).unwrap();
        let sq = base.pow(Quad::from_int(2)).unwrap();
        // ln(1.0025) is truncated, so the last digit may fall one short.
        let diff = scaled(sq, 20) - 100_500_625_000_000_000_000;
        assert!((-1..=0).contains(&diff), "diff {diff}");
    }

    #[test]
    fn exp_ln_inverse() {
        let x = Quad::from_ratio(31_415, 10_000).unwrap();
        let back = x.ln().unwrap().exp().unwrap();
        let err = back.sub(x).unwrap().abs();
        assert!(err < Quad::ONE.scale_pow2(-110).unwrap(), "error {err}");
    }

    #[test]
    fn widening_mul_max() {
        let (hi, lo) = widening_mul(u128::MAX, u128::MAX);
        // (2^128 - 1)^2 = 2^256 - 2^129 + 1
        assert_eq!(hi, u128::MAX - 1);
        assert_eq!(lo, 1);
    }

    #[test]
    fn div_wide_simple() {
        // (1 * 2^128 + 0) / 2^127 = 2
        assert_eq!(div_wide(1, 0, 1 << 127), 2);
        assert_eq!(div_wide(0, 100, 7), 14);
    }

    #[test]
    fn mul_div_floor_wide_product() {
        // (2^128 - 1) * 3 / 4 overflows u128 in the middle but not at the end.
        assert_eq!(mul_div_floor(u128::MAX, 3, 4).unwrap(), u128::MAX / 4 * 3 + 2);
        assert_eq!(mul_div_floor(1000, 100, 300).unwrap(), 333);
        assert_eq!(mul_div_floor(7, 0, 5).unwrap(), 0);
    }

    #[test]
    fn mul_div_floor_errors() {
        assert_eq!(mul_div_floor(1, 1, 0), Err(MathError::DivisionByZero));
        assert_eq!(mul_div_floor(u128::MAX, u128::MAX, 1), Err(MathError::Overflow));
    }

    // --- proptest ---

    proptest! {
        #[test]
        fn integer_add_exact(a in -(1i128 << 100)..(1i128 << 100), b in -(1i128 << 100)..(1i128 << 100)) {
            let sum = Quad::from_int(a).add(Quad::from_int(b)).unwrap();
            prop_assert_eq!(sum.to_i128().unwrap(), a + b);
        }

        #[test]
        fn integer_mul_exact(a in -(1i128 << 60)..(1i128 << 60), b in -(1i128 << 60)..(1i128 << 60)) {
            let p = Quad::from_int(a).mul(Quad::from_int(b)).unwrap();
            prop_assert_eq!(p.to_i128().unwrap(), a * b);
        }

        #[test]
        fn integer_div_matches_truncating_division(a in any::<i64>(), b in 1i64..1_000_000) {
            let q = Quad::from_int(a as i128).div(Quad::from_int(b as i128)).unwrap();
            prop_assert_eq!(q.to_i128().unwrap(), (a / b) as i128);
        }

        #[test]
        fn exp_monotonic(a in -50_000i64..50_000, b in -50_000i64..50_000) {
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            let x = Quad::from_ratio(lo as i128, 1_000).unwrap().exp().unwrap();
            let y = Quad::from_ratio(hi as i128, 1_000).unwrap().exp().unwrap();
            prop_assert!(x <= y);
        }

        #[test]
        fn exp_deterministic(a in -100_000i64..100_000) {
            let x = Quad::from_ratio(a as i128, 1_000).unwrap();
            prop_assert_eq!(x.exp().unwrap(), x.exp().unwrap());
        }

        #[test]
        fn ordering_matches_integers(a in any::<i64>(), b in any::<i64>()) {
            prop_assert_eq!(
                Quad::from_int(a as i128).cmp(&Quad::from_int(b as i128)),
                a.cmp(&b)
            );
        }
    }
}
