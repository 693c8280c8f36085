//! Integer relations read out of the transform B
//!
//! Column k of B satisfies xᵀB_k = ‖x‖·y_k, so once y_k vanishes that
//! column is a relation.

use num_bigint::BigInt;
use num_integer::Integer;
use num_traits::{Signed, ToPrimitive, Zero};
use std::fmt;
use crate::real::Real;
use crate::state::PslqState;

/// One nonzero coefficient and the input value it multiplies
#[derive(Debug, Clone, PartialEq)]
pub struct RelationTerm<R> {
    pub coefficient: BigInt,
    /// Position of the value in the input slice
    pub index: usize,
    pub value: R,
}

/// Integer relation Σ cᵢxᵢ ≈ 0, zero coefficients omitted
#[derive(Debug, Clone, PartialEq)]
pub struct Relation<R> {
    terms: Vec<RelationTerm<R>>,
    dimension: usize,
}

impl<R: Real> Relation<R> {
    /// Pair each coefficient with its value, dropping zeros
    pub fn from_column(values: &[R], column: &[BigInt]) -> Self {
        assert_eq!(values.len(), column.len());
        let terms = column
            .iter()
            .zip(values)
            .enumerate()
            .filter(|(_, (c, _))| !c.is_zero())
            .map(|(index, (c, v))| RelationTerm {
                coefficient: c.clone(),
                index,
                value: v.clone(),
            })
            .collect();
        Self {
            terms,
            dimension: values.len(),
        }
    }

    /// Read column `index` of B against the input values
    pub fn extract(state: &PslqState<R>, index: usize) -> Self {
        Self::from_column(&state.x, &state.b.column(index))
    }

    pub fn terms(&self) -> &[RelationTerm<R>] {
        &self.terms
    }

    /// Number of nonzero coefficients
    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// Length of the input vector the relation was found for
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Dense coefficient vector, zeros included
    pub fn coefficients(&self) -> Vec<BigInt> {
        let mut dense = vec![BigInt::zero(); self.dimension];
        for t in &self.terms {
            dense[t.index] = t.coefficient.clone();
        }
        dense
    }

    /// Σ cᵢxᵢ at the working precision
    pub fn residual(&self) -> R {
        self.terms.iter().fold(R::zero(), |acc, t| {
            acc + R::from_bigint(&t.coefficient) * t.value.clone()
        })
    }

    /// Σ cᵢ²
    pub fn norm_squared(&self) -> BigInt {
        self.terms
            .iter()
            .map(|t| &t.coefficient * &t.coefficient)
            .fold(BigInt::zero(), |acc, sq| acc + sq)
    }

    /// Euclidean norm, for comparison against the norm ceiling
    pub fn norm(&self) -> f64 {
        self.norm_squared().to_f64().map(f64::sqrt).unwrap_or(f64::INFINITY)
    }

    pub fn max_abs_coefficient(&self) -> BigInt {
        self.terms
            .iter()
            .map(|t| t.coefficient.abs())
            .max()
            .unwrap_or_else(BigInt::zero)
    }

    /// Divide out the content and make the first coefficient positive
    pub fn normalized(&self) -> Self {
        let content = self
            .terms
            .iter()
            .fold(BigInt::zero(), |g, t| g.gcd(&t.coefficient));
        if content.is_zero() {
            return self.clone();
        }
        let flip = self.terms.first().map_or(false, |t| t.coefficient.is_negative());
        let divisor = if flip { -content } else { content };
        let terms = self
            .terms
            .iter()
            .map(|t| RelationTerm {
                coefficient: &t.coefficient / &divisor,
                index: t.index,
                value: t.value.clone(),
            })
            .collect();
        Self {
            terms,
            dimension: self.dimension,
        }
    }

    /// (coefficient, value) pairs in input order
    pub fn into_pairs(self) -> Vec<(BigInt, R)> {
        self.terms
            .into_iter()
            .map(|t| (t.coefficient, t.value))
            .collect()
    }

    /// Render "c₁⋅a + c₂⋅b − …" with a caller-chosen label per term
    pub fn render_with<F>(&self, mut label: F) -> String
    where
        F: FnMut(&RelationTerm<R>) -> String,
    {
        let mut out = String::new();
        for (k, t) in self.terms.iter().enumerate() {
            if k == 0 {
                out.push_str(&format!("{}⋅{}", t.coefficient, label(t)));
            } else {
                let sign = if t.coefficient.is_negative() { " - " } else { " + " };
                out.push_str(&format!("{}{}⋅{}", sign, t.coefficient.abs(), label(t)));
            }
        }
        out
    }
}

impl<R: Real> fmt::Display for Relation<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render_with(|t| t.value.to_string()))
    }
}
