use crate::boolean::{match_documents, BooleanQuery};
use crate::config::SearchConfig;
use crate::error::{Result, SearchError};
use crate::idf::IdfTable;
use crate::similarity::rank;
use crate::tokenizer::{normalize_with, Token};
use crate::vector::{build_vector, build_vector_or_zero, TermVector};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub id: String,
    /// Tokens in text order, duplicates kept.
    pub tokens: Vec<Token>,
    pub terms: HashSet<Token>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchHit {
    pub id: String,
    pub score: f64,
}

/// Documents, vocabulary, IDF table and document vectors, built together and read-only afterwards.
///
/// `vectors[i]` belongs to `docs[i]`; both are ordered by document id.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Index {
    docs: Vec<Document>,
    idf: IdfTable,
    vectors: Vec<TermVector>,
    config: SearchConfig,
}

impl Index {
    pub fn build<I, K, V>(documents: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: AsRef<str>,
    {
        Self::assemble(documents, SearchConfig::default())
    }

    pub fn build_with_config<I, K, V>(documents: I, config: SearchConfig) -> Result<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: AsRef<str>,
    {
        config.validate()?;
        Ok(Self::assemble(documents, config))
    }

    fn assemble<I, K, V>(documents: I, config: SearchConfig) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: AsRef<str>,
    {
        // keyed by id: a repeated id replaces the earlier text
        let mut by_id: BTreeMap<String, Vec<Token>> = BTreeMap::new();
        for (id, text) in documents {
            let id = id.into();
            let tokens = normalize_with(text.as_ref(), config.case_fold);
            if by_id.insert(id.clone(), tokens).is_some() {
                tracing::warn!(doc = %id, "duplicate document id, keeping the last one");
            }
        }

        let docs: Vec<Document> = by_id
            .into_iter()
            .map(|(id, tokens)| {
                let terms = tokens.iter().cloned().collect();
                Document { id, tokens, terms }
            })
            .collect();

        let idf = IdfTable::from_term_sets(docs.iter().map(|d| &d.terms));

        let vectors = docs
            .iter()
            .map(|d| {
                if d.tokens.is_empty() {
                    tracing::warn!(doc = %d.id, "document has no tokens, using zero vector");
                }
                build_vector_or_zero(&d.tokens, &idf)
            })
            .collect();

        tracing::info!(num_docs = docs.len(), num_terms = idf.len(), "built index");
        Self { docs, idf, vectors, config }
    }

    pub fn config(&self) -> &SearchConfig { &self.config }
    pub fn num_docs(&self) -> usize { self.docs.len() }
    pub fn num_terms(&self) -> usize { self.idf.len() }
    pub fn is_empty(&self) -> bool { self.docs.is_empty() }

    /// Vocabulary in the order used by every vector.
    pub fn vocabulary(&self) -> &[Token] { self.idf.terms() }
    pub fn idf_table(&self) -> &IdfTable { &self.idf }
    pub fn documents(&self) -> &[Document] { &self.docs }

    pub fn document(&self, id: &str) -> Option<&Document> {
        self.position(id).map(|i| &self.docs[i])
    }

    pub fn vector(&self, id: &str) -> Option<&[f64]> {
        self.position(id).map(|i| self.vectors[i].as_slice())
    }

    pub fn vectors(&self) -> impl Iterator<Item = (&str, &[f64])> + '_ {
        self.docs.iter().map(|d| d.id.as_str()).zip(self.vectors.iter().map(Vec::as_slice))
    }

    fn position(&self, id: &str) -> Option<usize> {
        self.docs.binary_search_by(|d| d.id.as_str().cmp(id)).ok()
    }

    /// Vector of the query's distinct terms. Fails with `InvalidInput` when the query has no tokens.
    pub fn try_query_vector(&self, text: &str) -> Result<TermVector> {
        let terms: BTreeSet<Token> = normalize_with(text, self.config.case_fold).into_iter().collect();
        let terms: Vec<Token> = terms.into_iter().collect();
        build_vector(&terms, &self.idf)
    }

    pub fn query_vector(&self, text: &str) -> TermVector {
        self.try_query_vector(text).unwrap_or_else(|err| {
            tracing::debug!(%err, "empty query, using zero vector");
            vec![0.0; self.idf.len()]
        })
    }

    /// Similarity of every document above `threshold`, keyed by id.
    pub fn scores(&self, text: &str, threshold: f64) -> HashMap<String, f64> {
        let q = self.query_vector(text);
        rank(&q, self.vectors(), threshold)
    }

    /// Matches above the configured threshold, best first.
    pub fn search(&self, text: &str) -> Vec<SearchHit> {
        sort_hits(self.scores(text, self.config.similarity_threshold))
    }

    /// Ranks an already built query vector against every document, best first.
    pub fn search_vector(&self, query: &[f64], threshold: f64) -> Vec<SearchHit> {
        sort_hits(rank(query, self.vectors(), threshold))
    }

    pub fn search_with_threshold(&self, text: &str, threshold: f64) -> Result<Vec<SearchHit>> {
        if !threshold.is_finite() {
            return Err(SearchError::InvalidInput(format!("threshold must be finite, got {threshold}")));
        }
        Ok(sort_hits(self.scores(text, threshold)))
    }

    /// Ids of documents satisfying the boolean query, sorted.
    pub fn boolean_match(&self, query: &BooleanQuery) -> Vec<String> {
        match_documents(self.docs.iter().map(|d| (d.id.as_str(), &d.terms)), query)
            .into_iter()
            .collect()
    }

    /// Parses `text` as one AND-clause per line and matches it.
    pub fn boolean_match_text(&self, text: &str) -> Result<Vec<String>> {
        let query = BooleanQuery::parse(text, self.config.case_fold)?;
        Ok(self.boolean_match(&query))
    }
}

fn sort_hits(scores: HashMap<String, f64>) -> Vec<SearchHit> {
    let mut hits: Vec<SearchHit> = scores.into_iter().map(|(id, score)| SearchHit { id, score }).collect();
    hits.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.id.cmp(&b.id))
    });
    hits
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pets() -> Index {
        Index::build([("a.txt", "the cat sat"), ("b.txt", "the dog ran")])
    }

    #[test]
    fn vocabulary_is_union_of_documents() {
        let idx = pets();
        assert_eq!(idx.vocabulary(), &["cat", "dog", "ran", "sat", "the"]);
        assert_eq!(idx.num_docs(), 2);
    }

    #[test]
    fn every_vector_spans_the_vocabulary() {
        let idx = pets();
        for (_, v) in idx.vectors() {
            assert_eq!(v.len(), idx.vocabulary().len());
        }
        for (_, w) in idx.idf_table().iter() {
            assert!(w.is_finite());
        }
    }

    #[test]
    fn two_document_corpus_gives_single_doc_terms_zero_weight() {
        // ln((2 - 1) / 1) == 0, so "cat" carries no weight and nothing clears the threshold
        let idx = pets();
        assert_eq!(idx.idf_table().get("cat"), Some(0.0));
        let scores = idx.scores("cat", -1.0);
        assert_eq!(scores["a.txt"], 0.0);
        assert_eq!(scores["b.txt"], 0.0);
        assert!(idx.search("cat").is_empty());
    }

    #[test]
    fn cat_query_prefers_a() {
        let idx = Index::build([("a.txt", "the cat sat"), ("b.txt", "the dog ran"), ("c.txt", "a bird flew")]);
        let scores = idx.scores("cat", -1.0);
        assert!(scores["a.txt"] > scores["b.txt"]);
        assert!((scores["a.txt"] - 1.0 / 3f64.sqrt()).abs() < 1e-9);

        let hits = idx.search("cat");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, "a.txt");
    }

    #[test]
    fn query_outside_vocabulary_scores_zero() {
        let idx = pets();
        let q = idx.query_vector("zebra");
        assert!(q.iter().all(|x| *x == 0.0));
        let scores = idx.scores("zebra", -1.0);
        assert!(scores.values().all(|s| *s == 0.0));
        assert!(idx.search("zebra").is_empty());
    }

    #[test]
    fn empty_query_is_invalid_but_recoverable() {
        let idx = pets();
        assert!(matches!(idx.try_query_vector(" ?! "), Err(SearchError::InvalidInput(_))));
        assert!(idx.search(" ?! ").is_empty());
    }

    #[test]
    fn empty_corpus() {
        let idx = Index::build(Vec::<(String, String)>::new());
        assert!(idx.is_empty());
        assert!(idx.vocabulary().is_empty());
        assert!(idx.search("anything").is_empty());
    }

    #[test]
    fn rebuild_is_identical() {
        assert_eq!(pets(), pets());
    }

    #[test]
    fn duplicate_ids_keep_last() {
        let idx = Index::build([("a", "one"), ("a", "two")]);
        assert_eq!(idx.num_docs(), 1);
        assert_eq!(idx.document("a").unwrap().tokens, vec!["two"]);
    }

    #[test]
    fn lookup_by_id() {
        let idx = pets();
        assert!(idx.vector("b.txt").is_some());
        assert!(idx.document("c.txt").is_none());
    }

    #[test]
    fn boolean_mode_shares_tokenizer() {
        let idx = Index::build([("p.txt", "cat, dog."), ("q.txt", "cat bird")]);
        assert_eq!(idx.boolean_match_text("cat dog").unwrap(), vec!["p.txt"]);
        assert_eq!(idx.boolean_match_text("dog\nbird").unwrap(), vec!["p.txt", "q.txt"]);
        assert!(idx.boolean_match_text("").is_err());
    }

    #[test]
    fn case_fold_option() {
        let cfg = SearchConfig { case_fold: true, ..Default::default() };
        let idx = Index::build_with_config([("a", "The Cat"), ("b", "a dog"), ("c", "Fish")], cfg).unwrap();
        assert_eq!(idx.vocabulary(), &["a", "cat", "dog", "fish", "the"]);
        assert_eq!(idx.search("CAT")[0].id, "a");
    }

    #[test]
    fn tokenless_document_gets_zero_vector() {
        let idx = Index::build([("a", "cat dog"), ("b", "?!"), ("c", "fish")]);
        assert_eq!(idx.num_docs(), 3);
        assert_eq!(idx.vocabulary(), &["cat", "dog", "fish"]);

        let b = idx.vector("b").unwrap();
        assert_eq!(b.len(), idx.vocabulary().len());
        assert!(b.iter().all(|x| *x == 0.0));
        assert!(idx.document("b").unwrap().tokens.is_empty());

        // "b" still counts towards n: ln((3 - 1) / 1)
        assert!((idx.idf_table().get("cat").unwrap() - 2f64.ln()).abs() < 1e-12);

        let scores = idx.scores("cat", -1.0);
        assert_eq!(scores["b"], 0.0);
        assert!((scores["a"] - 1.0 / 2f64.sqrt()).abs() < 1e-9);
        assert_eq!(idx.search("cat").iter().map(|h| h.id.as_str()).collect::<Vec<_>>(), vec!["a"]);
    }

    #[test]
    fn search_vector_matches_search() {
        let idx = Index::build([("a.txt", "the cat sat"), ("b.txt", "the dog ran"), ("c.txt", "a bird flew")]);
        let q = idx.try_query_vector("cat bird").unwrap();
        assert_eq!(idx.search_vector(&q, 0.05), idx.search("cat bird"));
    }

    #[test]
    fn non_finite_threshold_rejected() {
        assert!(pets().search_with_threshold("cat", f64::NAN).is_err());
    }
}
