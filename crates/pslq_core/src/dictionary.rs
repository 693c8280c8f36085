//! Named constants and human-readable relation reports
//!
//! A [`Dictionary`] identifies each constant by its insertion index, never
//! by value, so two names that happen to share a value cannot be confused.
//! The search needs ascending input; entries are sorted for the run and the
//! relation is mapped back through the permutation afterwards.

use crate::config::PslqConfig;
use crate::pslq::{report_failure, Pslq};
use crate::real::Real;
use crate::relation::Relation;
use crate::trace::{TraceSink, TracingSink};
use crate::PslqOutcome;
use std::cmp::Ordering;

/// Ordered collection of named constants
#[derive(Debug, Clone, Default)]
pub struct Dictionary<R> {
    entries: Vec<(String, R)>,
}

impl<R: Real> Dictionary<R> {
    pub fn new() -> Self {
        Self { entries: Vec::new() }
    }

    /// Add a constant and return its index
    pub fn insert(&mut self, name: impl Into<String>, value: R) -> usize {
        self.entries.push((name.into(), value));
        self.entries.len() - 1
    }

    /// Builder form of [`insert`](Self::insert)
    pub fn with(mut self, name: impl Into<String>, value: R) -> Self {
        self.insert(name, value);
        self
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn name(&self, index: usize) -> &str {
        &self.entries[index].0
    }

    pub fn value(&self, index: usize) -> &R {
        &self.entries[index].1
    }

    pub fn names(&self) -> Vec<&str> {
        self.entries.iter().map(|(n, _)| n.as_str()).collect()
    }

    pub fn values(&self) -> Vec<R> {
        self.entries.iter().map(|(_, v)| v.clone()).collect()
    }

    /// Entry indices in ascending order of value
    pub fn ascending_order(&self) -> Vec<usize> {
        let mut order: Vec<usize> = (0..self.entries.len()).collect();
        order.sort_by(|&a, &b| {
            self.entries[a]
                .1
                .partial_cmp(&self.entries[b].1)
                .unwrap_or(Ordering::Equal)
        });
        order
    }

    /// π, e, √2, ln 2
    pub fn tiny() -> Self {
        let two = R::from_i64(2);
        Self::new()
            .with("π", R::pi())
            .with("e", R::one().exp())
            .with("√2", two.sqrt())
            .with("ln(2)", two.ln())
    }

    /// Common constants plus logarithms of small primes
    ///
    /// φ itself is omitted: it is linearly dependent on √5 and 1. Its
    /// logarithm is not.
    pub fn small() -> Self {
        let int = R::from_i64;
        let pi = R::pi();
        let phi = (R::one() + int(5).sqrt()) / int(2);
        let mut d = Self::new()
            .with("1/γ", R::one() / R::euler())
            .with("√π", pi.sqrt())
            .with("π", pi.clone())
            .with("ln(π)", pi.ln())
            .with("π²", pi.clone() * pi.clone())
            .with("π³", pi.clone() * pi.clone() * pi)
            .with("e", R::one().exp())
            .with("√2", int(2).sqrt())
            .with("√3", int(3).sqrt())
            .with("√5", int(5).sqrt())
            .with("√7", int(7).sqrt())
            .with("√11", int(11).sqrt())
            .with("γ", R::euler())
            .with("ln(φ)", phi.ln())
            .with("G", R::catalan())
            .with("A", R::glaisher())
            .with("K₀", R::khinchin())
            .with("ζ(3)", R::zeta_three());
        for p in [2, 3, 5, 7, 11, 13, 17, 19] {
            d.insert(format!("ln({})", p), int(p).ln());
        }
        d
    }
}

/// Render "c₁⋅name₁ + c₂⋅name₂ − … = 0"
///
/// `names` is indexed by [`RelationTerm::index`](crate::RelationTerm).
pub fn render_symbolic<R: Real>(relation: &Relation<R>, names: &[&str]) -> String {
    format!("{} = 0", relation.render_with(|t| names[t.index].to_string()))
}

/// Search the dictionary for a relation and describe it
///
/// # Returns
/// A two-part report (numeric check, then symbolic form), or an empty
/// string if no relation was found
pub fn describe_relation<R: Real>(dictionary: &Dictionary<R>, gamma: f64) -> String {
    describe_relation_with(dictionary, &PslqConfig::default().with_gamma(gamma), TracingSink)
}

/// [`describe_relation`] with explicit configuration and trace sink
pub fn describe_relation_with<R: Real, S: TraceSink>(
    dictionary: &Dictionary<R>,
    config: &PslqConfig,
    sink: S,
) -> String {
    let order = dictionary.ascending_order();
    let values: Vec<R> = order.iter().map(|&i| dictionary.value(i).clone()).collect();
    let names: Vec<&str> = order.iter().map(|&i| dictionary.name(i)).collect();

    let mut pslq = Pslq::with_sink(config.clone(), sink);
    let relation = match pslq.run(&values) {
        Ok((PslqOutcome::RelationFound { relation, .. }, _)) => relation.normalized(),
        Ok(_) => return String::new(),
        Err(e) => {
            report_failure(&e);
            return String::new();
        }
    };

    format!(
        "As\n\t{} = {},\nit is likely that\n\t{}.",
        relation,
        relation.residual(),
        render_symbolic(&relation, &names)
    )
}
