//! Fixed-precision MPFR reals
//!
//! `f64` limits PSLQ to relations whose coefficient norm stays well below
//! 10⁸; the detection threshold is √ε. [`MpFloat<PREC>`] carries `PREC` bits
//! of mantissa in the type itself, so `Real::epsilon()` is known without a
//! value in hand and every intermediate stays at the same precision.

use crate::real::Real;
use num_bigint::BigInt;
use rug::float::{Constant, Special};
use rug::Float;
use std::fmt;
use std::ops::{Add, Div, Mul, Neg, Sub};

// MPFR has no built-in for these two; 110 significant digits cover about
// 365 bits.
const GLAISHER: &str = "1.2824271291006226368753425688697917277676889273250011920637400217404063088588264611297364919582023743942064612";
const KHINCHIN: &str = "2.6854520010653064453097148354817956938203822939944629530511523455572188595371520028011411749318476979951534659";

/// MPFR float with `PREC` bits of precision
#[derive(Debug, Clone, PartialEq, PartialOrd)]
pub struct MpFloat<const PREC: u32>(Float);

/// 256-bit precision (about 77 decimal digits)
pub type Mp256 = MpFloat<256>;

impl<const PREC: u32> MpFloat<PREC> {
    /// Wrap an MPFR value, rounding it to `PREC` bits
    pub fn new(value: Float) -> Self {
        Self(Float::with_val(PREC, value))
    }

    /// Parse a decimal literal at full precision
    ///
    /// Literals must be parsed rather than converted from `f64`, otherwise
    /// only 53 bits of the input survive.
    pub fn parse(s: &str) -> Option<Self> {
        Float::parse(s).ok().map(|p| Self(Float::with_val(PREC, p)))
    }

    pub fn as_float(&self) -> &Float {
        &self.0
    }

    pub fn precision() -> u32 {
        PREC
    }
}

impl<const PREC: u32> fmt::Display for MpFloat<PREC> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

macro_rules! impl_binary_op {
    ($tr:ident, $method:ident) => {
        impl<const PREC: u32> $tr for MpFloat<PREC> {
            type Output = Self;

            fn $method(self, rhs: Self) -> Self {
                Self(Float::with_val(PREC, $tr::$method(self.0, rhs.0)))
            }
        }
    };
}

impl_binary_op!(Add, add);
impl_binary_op!(Sub, sub);
impl_binary_op!(Mul, mul);
impl_binary_op!(Div, div);

impl<const PREC: u32> Neg for MpFloat<PREC> {
    type Output = Self;

    fn neg(self) -> Self {
        Self(-self.0)
    }
}

impl<const PREC: u32> Real for MpFloat<PREC> {
    fn from_f64(v: f64) -> Self {
        Self(Float::with_val(PREC, v))
    }

    fn from_i64(v: i64) -> Self {
        Self(Float::with_val(PREC, v))
    }

    fn from_bigint(v: &BigInt) -> Self {
        match v.to_string().parse::<rug::Integer>() {
            Ok(i) => Self(Float::with_val(PREC, i)),
            Err(_) => Self(Float::with_val(PREC, Special::Nan)),
        }
    }

    fn to_f64(&self) -> f64 {
        self.0.to_f64()
    }

    fn to_bigint(&self) -> Option<BigInt> {
        let i = self.0.to_integer()?;
        i.to_string().parse::<BigInt>().ok()
    }

    fn sqrt(&self) -> Self {
        Self(self.0.clone().sqrt())
    }

    fn abs(&self) -> Self {
        Self(self.0.clone().abs())
    }

    fn round(&self) -> Self {
        Self(self.0.clone().round())
    }

    fn ln(&self) -> Self {
        Self(self.0.clone().ln())
    }

    fn exp(&self) -> Self {
        Self(self.0.clone().exp())
    }

    fn epsilon() -> Self {
        Self(Float::with_val(PREC, Float::u_exp(1, 1 - PREC as i32)))
    }

    fn pi() -> Self {
        Self(Float::with_val(PREC, Constant::Pi))
    }

    fn euler() -> Self {
        Self(Float::with_val(PREC, Constant::Euler))
    }

    fn catalan() -> Self {
        Self(Float::with_val(PREC, Constant::Catalan))
    }

    fn zeta_three() -> Self {
        Self(Float::with_val(PREC, 3).zeta())
    }

    fn glaisher() -> Self {
        Self::parse(GLAISHER).unwrap_or_else(|| Self(Float::with_val(PREC, Special::Nan)))
    }

    fn khinchin() -> Self {
        Self::parse(KHINCHIN).unwrap_or_else(|| Self(Float::with_val(PREC, Special::Nan)))
    }
}
