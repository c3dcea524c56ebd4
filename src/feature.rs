//! Feature extraction: text to fixed-width TF-IDF vectors.
//!
//! A [`TfidfVectorizer`] is fitted once on the training split and yields an
//! immutable [`FeatureSpace`]. The space transforms any text into a sparse
//! vector of the same dimensionality and can be shared freely between
//! threads.
//!
//! ```
//! use sentiscope::feature::{TfidfVectorizer, VectorizerConfig};
//!
//! let corpus = ["great video", "great song", "bad video", "bad song"];
//! let config = VectorizerConfig { min_df: 1, ..VectorizerConfig::default() };
//! let space = TfidfVectorizer::new(config).unwrap().fit(&corpus).unwrap();
//!
//! let vector = space.transform_one("great video").unwrap();
//! assert_eq!(vector.dim(), space.dimension());
//! ```

pub mod config;
pub mod sparse;
pub mod vectorizer;

pub use config::VectorizerConfig;
pub use sparse::{CsrMatrix, SparseRow, SparseVector};
pub use vectorizer::{FeatureSpace, TfidfVectorizer};
