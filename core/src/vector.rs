use crate::error::{Result, SearchError};
use crate::idf::IdfTable;
use std::collections::HashMap;

pub type TermVector = Vec<f64>;

/// TF-IDF vector of `tokens` over the table's vocabulary.
///
/// Component `i` is `count(term_i) / tokens.len() * idf(term_i)`, zero for absent terms.
/// Tokens outside the vocabulary still count towards `tokens.len()`.
pub fn build_vector<T: AsRef<str>>(tokens: &[T], idf_table: &IdfTable) -> Result<TermVector> {
    if tokens.is_empty() {
        return Err(SearchError::InvalidInput("cannot vectorize an empty token list".into()));
    }
    let mut counts: HashMap<usize, u32> = HashMap::new();
    for t in tokens {
        if let Some(tid) = idf_table.term_id(t.as_ref()) {
            *counts.entry(tid as usize).or_insert(0) += 1;
        }
    }
    let len = tokens.len() as f64;
    let mut vector = vec![0.0; idf_table.len()];
    for (tid, count) in counts {
        let tf = count as f64 / len;
        vector[tid] = tf * idf_table.weights()[tid];
    }
    Ok(vector)
}

/// Like [`build_vector`], but an empty token list yields the all-zero vector.
pub fn build_vector_or_zero<T: AsRef<str>>(tokens: &[T], idf_table: &IdfTable) -> TermVector {
    match build_vector(tokens, idf_table) {
        Ok(v) => v,
        Err(err) => {
            tracing::debug!(%err, "falling back to zero vector");
            vec![0.0; idf_table.len()]
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tokenizer::Token;
    use std::collections::HashSet;

    fn table(docs: &[&[&str]]) -> IdfTable {
        let sets: Vec<HashSet<Token>> = docs
            .iter()
            .map(|d| d.iter().map(|t| t.to_string()).collect())
            .collect();
        IdfTable::from_term_sets(&sets)
    }

    #[test]
    fn length_matches_vocabulary() {
        let t = table(&[&["a", "b"], &["c"], &["d"]]);
        let v = build_vector(&["a", "zzz"], &t).unwrap();
        assert_eq!(v.len(), t.len());
    }

    #[test]
    fn tf_times_idf() {
        let t = table(&[&["a", "b"], &["c"], &["d"]]);
        let v = build_vector(&["a", "a", "b", "zzz"], &t).unwrap();
        let idf_a = t.get("a").unwrap();
        let idf_b = t.get("b").unwrap();
        assert!((v[0] - 0.5 * idf_a).abs() < 1e-12);
        assert!((v[1] - 0.25 * idf_b).abs() < 1e-12);
        assert_eq!(v[2], 0.0);
        assert_eq!(v[3], 0.0);
    }

    #[test]
    fn empty_tokens_are_invalid() {
        let t = table(&[&["a"]]);
        let empty: [&str; 0] = [];
        assert!(matches!(build_vector(&empty, &t), Err(SearchError::InvalidInput(_))));
        assert_eq!(build_vector_or_zero(&empty, &t), vec![0.0]);
    }

    #[test]
    fn deterministic() {
        let t = table(&[&["x", "y"], &["y", "z"], &["w"]]);
        let toks = ["y", "x", "y", "q"];
        assert_eq!(build_vector(&toks, &t).unwrap(), build_vector(&toks, &t).unwrap());
    }
}
