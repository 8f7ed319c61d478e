use crate::error::{Result, SearchError};
use std::collections::HashMap;

fn norm(v: &[f64]) -> f64 {
    v.iter().map(|x| x * x).sum::<f64>().sqrt()
}

/// Cosine similarity of two equal-length vectors.
///
/// A zero-norm operand has no direction; its similarity to anything is 0.
pub fn similarity(a: &[f64], b: &[f64]) -> Result<f64> {
    if a.len() != b.len() {
        return Err(SearchError::DimensionMismatch { expected: a.len(), found: b.len() });
    }
    let denom = norm(a) * norm(b);
    if denom == 0.0 || !denom.is_finite() {
        return Ok(0.0);
    }
    let dot: f64 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    Ok(dot / denom)
}

/// Scores every document against `query` and keeps those strictly above `threshold`.
///
/// Documents whose vector length differs from the query are skipped.
pub fn rank<'a, I>(query: &[f64], documents: I, threshold: f64) -> HashMap<String, f64>
where
    I: IntoIterator<Item = (&'a str, &'a [f64])>,
{
    let mut matches = HashMap::new();
    for (id, vector) in documents {
        match similarity(query, vector) {
            Ok(score) if score > threshold => { matches.insert(id.to_string(), score); }
            Ok(_) => {}
            Err(err) => tracing::warn!(doc = id, %err, "skipping document"),
        }
    }
    matches
}
