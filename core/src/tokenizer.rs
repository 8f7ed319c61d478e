use lazy_static::lazy_static;
use regex::Regex;
use std::collections::BTreeSet;

pub type Token = String;

lazy_static! {
    // ASCII punctuation: !"#$%&'()*+,-./:;<=>?@[\]^_`{|}~
    static ref PUNCT: Regex = Regex::new(r"[[:punct:]]+").expect("valid regex");
}

/// Delete ASCII punctuation and split on whitespace. Case is preserved.
pub fn normalize(text: &str) -> Vec<Token> {
    PUNCT
        .replace_all(text, "")
        .split_whitespace()
        .map(str::to_string)
        .collect()
}

/// Same as [`normalize`], lowercasing every token when `case_fold` is set.
pub fn normalize_with(text: &str, case_fold: bool) -> Vec<Token> {
    let mut tokens = normalize(text);
    if case_fold {
        for t in tokens.iter_mut() { *t = t.to_lowercase(); }
    }
    tokens
}

/// Distinct tokens of `text` in sorted order.
pub fn unique_terms(text: &str) -> BTreeSet<Token> {
    normalize(text).into_iter().collect()
}
