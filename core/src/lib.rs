pub mod boolean;
pub mod config;
pub mod error;
pub mod idf;
pub mod index;
pub mod loader;
pub mod similarity;
pub mod tokenizer;
pub mod vector;

pub use boolean::BooleanQuery;
pub use config::{SearchConfig, DEFAULT_SIMILARITY_THRESHOLD};
pub use error::{Result, SearchError};
pub use idf::{IdfTable, TermId};
pub use index::{Document, Index, SearchHit};
pub use tokenizer::Token;
