//! Adapters layer: Concrete implementations of ports.
//!
//! These modules contain the actual integration with external resources:
//! - `nlp`: French tokenizer, stopwords, stemmer and domain vocabularies
//! - `keywords`: catalogue-based keyword extraction
//! - `dataset`: JSON / CSV survey loading
//! - `remote`: HTTP client for the remote prediction service
//! - `sanitize`: identifier filtering for logs

pub mod dataset;
pub mod keywords;
pub mod nlp;
pub mod remote;
pub mod sanitize;

pub use dataset::DatasetError;
pub use keywords::CatalogueKeywordExtractor;
pub use remote::HttpRiskPredictor;
