use crate::error::{Result, SearchError};
use crate::tokenizer::Token;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap, HashSet};

pub type TermId = u32;

/// Stand-in numerator when a term occurs in every document.
pub const UNIVERSAL_TERM_EPSILON: f64 = 1e-5;

/// `ln((n - d) / d)`, with the numerator replaced by [`UNIVERSAL_TERM_EPSILON`] when `d >= n`.
///
/// The result is negative for terms present in more than half the documents.
/// `d == 0` has no defined weight and is rejected.
pub fn idf_from_counts(num_docs: usize, doc_freq: usize) -> Result<f64> {
    if doc_freq == 0 {
        return Err(SearchError::InvalidInput("term does not occur in any document".into()));
    }
    let numerator = if num_docs > doc_freq { (num_docs - doc_freq) as f64 } else { UNIVERSAL_TERM_EPSILON };
    Ok((numerator / doc_freq as f64).ln())
}

/// IDF of `term` over `documents`, each given as its token sequence.
pub fn compute_idf<D: AsRef<[Token]>>(term: &str, documents: &[D]) -> Result<f64> {
    let doc_freq = documents
        .iter()
        .filter(|doc| doc.as_ref().iter().any(|t| t == term))
        .count();
    idf_from_counts(documents.len(), doc_freq)
}

/// Vocabulary and IDF weights in one canonical (sorted) term order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct IdfTable {
    terms: Vec<Token>,
    weights: Vec<f64>,
    #[serde(skip)]
    dictionary: HashMap<Token, TermId>,
}

impl IdfTable {
    /// Builds the table from each document's set of distinct terms.
    pub fn from_term_sets<'a, I>(term_sets: I) -> Self
    where
        I: IntoIterator<Item = &'a HashSet<Token>>,
    {
        let mut df: BTreeMap<&str, usize> = BTreeMap::new();
        let mut num_docs = 0usize;
        for set in term_sets {
            num_docs += 1;
            for term in set {
                *df.entry(term.as_str()).or_insert(0) += 1;
            }
        }

        let mut table = IdfTable::default();
        for (term_id, (term, doc_freq)) in df.into_iter().enumerate() {
            // every term here was seen in at least one set, so doc_freq >= 1
            let weight = idf_from_counts(num_docs, doc_freq).unwrap_or(0.0);
            table.dictionary.insert(term.to_string(), term_id as TermId);
            table.terms.push(term.to_string());
            table.weights.push(weight);
        }
        table
    }

    pub fn len(&self) -> usize { self.terms.len() }
    pub fn is_empty(&self) -> bool { self.terms.is_empty() }

    /// Vocabulary in canonical order.
    pub fn terms(&self) -> &[Token] { &self.terms }
    pub fn weights(&self) -> &[f64] { &self.weights }

    pub fn term_id(&self, term: &str) -> Option<TermId> { self.dictionary.get(term).copied() }

    pub fn get(&self, term: &str) -> Option<f64> {
        self.term_id(term).map(|id| self.weights[id as usize])
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> + '_ {
        self.terms.iter().map(String::as_str).zip(self.weights.iter().copied())
    }
}
