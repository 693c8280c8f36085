//! Real number abstraction
//!
//! The PSLQ core never names a concrete floating-point type. It is written
//! against [`Real`], which captures exactly what the algorithm consumes:
//! field arithmetic, ordering, square root, round-to-nearest and a machine
//! epsilon that sets every detection threshold.
//!
//! Implementations are provided for `f32` and `f64`. With the `mpfr`
//! feature, [`MpFloat`](crate::multiprecision::MpFloat) supplies arbitrary
//! fixed binary precision.

use num_bigint::BigInt;
use num_traits::{FromPrimitive, ToPrimitive};
use std::fmt::{Debug, Display};
use std::ops::{Add, Div, Mul, Neg, Sub};

/// Numeric collaborator consumed by the PSLQ core
///
/// Arithmetic operators take their operands by value; callers clone where a
/// value is reused. For `f32`/`f64` clones are free.
pub trait Real:
    Clone
    + PartialOrd
    + Debug
    + Display
    + Add<Output = Self>
    + Sub<Output = Self>
    + Mul<Output = Self>
    + Div<Output = Self>
    + Neg<Output = Self>
{
    /// Convert from a double (exact for binary types at least as wide)
    fn from_f64(v: f64) -> Self;

    fn from_i64(v: i64) -> Self;

    /// Convert an exact integer, rounding to the type's precision
    fn from_bigint(v: &BigInt) -> Self;

    /// Lossy conversion, used for reporting only
    fn to_f64(&self) -> f64;

    /// Round to nearest and convert to an exact integer
    ///
    /// Returns `None` for non-finite values.
    fn to_bigint(&self) -> Option<BigInt>;

    fn sqrt(&self) -> Self;

    fn abs(&self) -> Self;

    /// Round to the nearest integer, half-way cases away from zero
    fn round(&self) -> Self;

    fn ln(&self) -> Self;

    fn exp(&self) -> Self;

    /// Distance from 1 to the next representable value
    fn epsilon() -> Self;

    fn pi() -> Self;

    /// Euler–Mascheroni constant γ
    fn euler() -> Self;

    /// Catalan's constant G
    fn catalan() -> Self;

    /// Apéry's constant ζ(3)
    fn zeta_three() -> Self;

    /// Glaisher–Kinkelin constant A
    fn glaisher() -> Self;

    /// Khinchin's constant K₀
    fn khinchin() -> Self;

    fn zero() -> Self {
        Self::from_i64(0)
    }

    fn one() -> Self {
        Self::from_i64(1)
    }

    fn is_zero(&self) -> bool {
        *self == Self::zero()
    }
}

/// √ε of the type: the tolerance used by every PSLQ threshold
pub fn sqrt_epsilon<R: Real>() -> R {
    R::epsilon().sqrt()
}

const EULER: f64 = 0.5772156649015329;
const CATALAN: f64 = 0.915965594177219;
const ZETA_THREE: f64 = 1.2020569031595942;
const GLAISHER: f64 = 1.2824271291006226;
const KHINCHIN: f64 = 2.6854520010653062;

macro_rules! impl_real_for_float {
    ($t:ty, $pi:expr) => {
        impl Real for $t {
            #[inline]
            fn from_f64(v: f64) -> Self {
                v as $t
            }

            #[inline]
            fn from_i64(v: i64) -> Self {
                v as $t
            }

            fn from_bigint(v: &BigInt) -> Self {
                v.to_f64().map(|f| f as $t).unwrap_or(<$t>::NAN)
            }

            #[inline]
            fn to_f64(&self) -> f64 {
                *self as f64
            }

            fn to_bigint(&self) -> Option<BigInt> {
                if !self.is_finite() {
                    return None;
                }
                BigInt::from_f64(<$t>::round(*self) as f64)
            }

            #[inline]
            fn sqrt(&self) -> Self {
                <$t>::sqrt(*self)
            }

            #[inline]
            fn abs(&self) -> Self {
                <$t>::abs(*self)
            }

            #[inline]
            fn round(&self) -> Self {
                <$t>::round(*self)
            }

            fn ln(&self) -> Self {
                <$t>::ln(*self)
            }

            fn exp(&self) -> Self {
                <$t>::exp(*self)
            }

            #[inline]
            fn epsilon() -> Self {
                <$t>::EPSILON
            }

            #[inline]
            fn pi() -> Self {
                $pi
            }

            fn euler() -> Self {
                EULER as $t
            }

            fn catalan() -> Self {
                CATALAN as $t
            }

            fn zeta_three() -> Self {
                ZETA_THREE as $t
            }

            fn glaisher() -> Self {
                GLAISHER as $t
            }

            fn khinchin() -> Self {
                KHINCHIN as $t
            }
        }
    };
}

impl_real_for_float!(f32, std::f32::consts::PI);
impl_real_for_float!(f64, std::f64::consts::PI);
