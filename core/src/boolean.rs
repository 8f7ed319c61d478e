use crate::error::{Result, SearchError};
use crate::tokenizer::{normalize_with, Token};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};

/// OR of AND-clauses. A document matches when every term of at least one clause is in its term set.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BooleanQuery {
    pub clauses: Vec<Vec<Token>>,
}

impl BooleanQuery {
    pub fn new(clauses: Vec<Vec<Token>>) -> Self { Self { clauses } }

    /// One clause per line; blank lines (after normalization) are skipped.
    pub fn parse(text: &str, case_fold: bool) -> Result<Self> {
        Self::from_lines(text.lines(), case_fold)
    }

    pub fn from_lines<'a, I>(lines: I, case_fold: bool) -> Result<Self>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let clauses: Vec<Vec<Token>> = lines
            .into_iter()
            .map(|line| normalize_with(line, case_fold))
            .filter(|clause| !clause.is_empty())
            .collect();
        if clauses.is_empty() {
            return Err(SearchError::InvalidInput("boolean query has no terms".into()));
        }
        Ok(Self { clauses })
    }

    pub fn is_empty(&self) -> bool { self.clauses.is_empty() }

    pub fn matches(&self, terms: &HashSet<Token>) -> bool {
        self.clauses
            .iter()
            .any(|clause| !clause.is_empty() && clause.iter().all(|t| terms.contains(t)))
    }
}

/// Ids of documents satisfying `query`, sorted.
pub fn match_documents<'a, I>(documents: I, query: &BooleanQuery) -> BTreeSet<String>
where
    I: IntoIterator<Item = (&'a str, &'a HashSet<Token>)>,
{
    if query.is_empty() {
        return BTreeSet::new();
    }
    documents
        .into_iter()
        .filter(|(_, terms)| query.matches(terms))
        .map(|(id, _)| id.to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn q(clauses: &[&[&str]]) -> BooleanQuery {
        BooleanQuery::new(clauses.iter().map(|c| c.iter().map(|t| t.to_string()).collect()).collect())
    }

    fn terms(words: &[&str]) -> HashSet<Token> {
        words.iter().map(|t| t.to_string()).collect()
    }

    #[test]
    fn and_within_or_across() {
        let doc = terms(&["cat", "dog"]);
        assert!(q(&[&["cat", "dog"]]).matches(&doc));
        assert!(!q(&[&["cat", "bird"]]).matches(&doc));
        assert!(q(&[&["cat", "bird"], &["dog"]]).matches(&doc));
    }

    #[test]
    fn case_sensitive() {
        assert!(!q(&[&["Cat"]]).matches(&terms(&["cat"])));
    }

    #[test]
    fn empty_query_and_empty_clause_match_nothing() {
        let doc = terms(&["cat"]);
        let docs = vec![("a.txt", &doc)];
        assert!(match_documents(docs.clone(), &BooleanQuery::default()).is_empty());
        assert!(match_documents(docs, &q(&[&[]])).is_empty());
    }

    #[test]
    fn parse_lines() {
        let parsed = BooleanQuery::parse("cat dog\n\n  ,.  \nbird!\n", false).unwrap();
        assert_eq!(parsed, q(&[&["cat", "dog"], &["bird"]]));
        assert!(matches!(BooleanQuery::parse(" \n...", false), Err(SearchError::InvalidInput(_))));
    }

    #[test]
    fn matched_ids_are_sorted() {
        let a = terms(&["x"]);
        let b = terms(&["x", "y"]);
        let c = terms(&["y"]);
        let docs = vec![("c.txt", &c), ("b.txt", &b), ("a.txt", &a)];
        let got: Vec<String> = match_documents(docs, &q(&[&["x"]])).into_iter().collect();
        assert_eq!(got, vec!["a.txt", "b.txt"]);
    }
}
