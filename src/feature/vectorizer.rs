//! TF-IDF vectorizer and the fitted feature space it produces.

use ahash::AHashMap;
use log::debug;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::analysis::analyzer::{Analyzer, CommentAnalyzer};
use crate::error::{Result, SentiscopeError};
use crate::feature::config::VectorizerConfig;
use crate::feature::sparse::{CsrMatrix, SparseVector};

/// Fits a [`FeatureSpace`] on a training corpus.
///
/// `fit` consumes the vectorizer, so a single vectorizer can only ever
/// produce one feature space.
#[derive(Debug)]
pub struct TfidfVectorizer {
    config: VectorizerConfig,
    analyzer: CommentAnalyzer,
}

impl TfidfVectorizer {
    /// Create a new TF-IDF vectorizer with the given configuration.
    pub fn new(config: VectorizerConfig) -> Result<Self> {
        config.validate()?;
        let analyzer = CommentAnalyzer::with_config(config.analyzer.clone())?;
        Ok(TfidfVectorizer { config, analyzer })
    }

    pub fn config(&self) -> &VectorizerConfig {
        &self.config
    }

    /// Build the vocabulary and idf weights from training documents.
    pub fn fit<S: AsRef<str> + Sync>(self, documents: &[S]) -> Result<FeatureSpace> {
        let n_documents = documents.len();
        if n_documents == 0 {
            return Err(SentiscopeError::feature(
                "cannot fit a feature space on an empty corpus",
            ));
        }

        let analyzed: Vec<Vec<String>> = documents
            .par_iter()
            .map(|doc| self.analyzer.terms(doc.as_ref()))
            .collect::<Result<_>>()?;

        // term -> (document frequency, total frequency)
        let mut counts: AHashMap<String, (usize, usize)> = AHashMap::new();
        for terms in &analyzed {
            let mut seen: AHashMap<&str, usize> = AHashMap::new();
            for term in terms {
                *seen.entry(term.as_str()).or_insert(0) += 1;
            }
            for (term, tf) in seen {
                let entry = counts.entry(term.to_string()).or_insert((0, 0));
                entry.0 += 1;
                entry.1 += tf;
            }
        }
        let distinct_terms = counts.len();

        let max_doc_count = self.config.max_df * n_documents as f64;
        if max_doc_count < self.config.min_df as f64 {
            return Err(SentiscopeError::feature(format!(
                "max_df ({}) corresponds to fewer documents than min_df ({}) for {} documents",
                self.config.max_df, self.config.min_df, n_documents
            )));
        }

        let mut kept: Vec<(String, usize, usize)> = counts
            .into_iter()
            .filter(|(_, (df, _))| *df >= self.config.min_df && (*df as f64) <= max_doc_count)
            .map(|(term, (df, tf))| (term, df, tf))
            .collect();

        if kept.is_empty() {
            return Err(SentiscopeError::feature(
                "after pruning, no terms remain; try a lower min_df or a higher max_df",
            ));
        }

        if let Some(limit) = self.config.max_features {
            if kept.len() > limit {
                kept.sort_by(|a, b| b.2.cmp(&a.2).then_with(|| a.0.cmp(&b.0)));
                kept.truncate(limit);
            }
        }
        kept.sort_by(|a, b| a.0.cmp(&b.0));

        let idf: Vec<f64> = kept
            .iter()
            .map(|(_, df, _)| smoothed_idf(n_documents, *df))
            .collect();
        let terms: Vec<String> = kept.into_iter().map(|(term, _, _)| term).collect();

        debug!(
            "fitted feature space: {} documents, {} distinct terms, {} kept",
            n_documents,
            distinct_terms,
            terms.len()
        );

        FeatureSpace::from_parts(self.config, terms, idf, n_documents)
    }
}

/// `ln((1 + n) / (1 + df)) + 1`
fn smoothed_idf(n_documents: usize, df: usize) -> f64 {
    ((1.0 + n_documents as f64) / (1.0 + df as f64)).ln() + 1.0
}

/// A fitted, immutable term vocabulary with idf weights.
///
/// Every text transformed through the same space yields a vector of
/// [`dimension`](Self::dimension) entries; terms outside the vocabulary are
/// ignored.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "FeatureSpaceData", into = "FeatureSpaceData")]
pub struct FeatureSpace {
    config: VectorizerConfig,
    terms: Vec<String>,
    idf: Vec<f64>,
    n_documents: usize,
    vocabulary: AHashMap<String, usize>,
    analyzer: CommentAnalyzer,
}

/// Serialized form of a [`FeatureSpace`]; the analyzer and the term lookup
/// table are rebuilt on load.
#[derive(Serialize, Deserialize)]
struct FeatureSpaceData {
    config: VectorizerConfig,
    terms: Vec<String>,
    idf: Vec<f64>,
    n_documents: usize,
}

impl TryFrom<FeatureSpaceData> for FeatureSpace {
    type Error = SentiscopeError;

    fn try_from(data: FeatureSpaceData) -> Result<Self> {
        FeatureSpace::from_parts(data.config, data.terms, data.idf, data.n_documents)
    }
}

impl From<FeatureSpace> for FeatureSpaceData {
    fn from(space: FeatureSpace) -> Self {
        FeatureSpaceData {
            config: space.config,
            terms: space.terms,
            idf: space.idf,
            n_documents: space.n_documents,
        }
    }
}

impl FeatureSpace {
    fn from_parts(
        config: VectorizerConfig,
        terms: Vec<String>,
        idf: Vec<f64>,
        n_documents: usize,
    ) -> Result<Self> {
        if terms.len() != idf.len() {
            return Err(SentiscopeError::feature(format!(
                "vocabulary has {} terms but {} idf weights",
                terms.len(),
                idf.len()
            )));
        }
        if terms.is_empty() {
            return Err(SentiscopeError::feature("feature space has no terms"));
        }

        let mut vocabulary = AHashMap::with_capacity(terms.len());
        for (index, term) in terms.iter().enumerate() {
            if vocabulary.insert(term.clone(), index).is_some() {
                return Err(SentiscopeError::feature(format!("duplicate term '{term}'")));
            }
        }
        let analyzer = CommentAnalyzer::with_config(config.analyzer.clone())?;

        Ok(FeatureSpace {
            config,
            terms,
            idf,
            n_documents,
            vocabulary,
            analyzer,
        })
    }

    /// Number of dimensions of every vector produced by this space.
    pub fn dimension(&self) -> usize {
        self.terms.len()
    }

    /// Terms in index order.
    pub fn terms(&self) -> &[String] {
        &self.terms
    }

    /// Index of `term`, if it is part of the vocabulary.
    pub fn term_index(&self, term: &str) -> Option<usize> {
        self.vocabulary.get(term).copied()
    }

    /// Idf weight per dimension.
    pub fn idf(&self) -> &[f64] {
        &self.idf
    }

    /// Number of documents the space was fitted on.
    pub fn n_documents(&self) -> usize {
        self.n_documents
    }

    pub fn config(&self) -> &VectorizerConfig {
        &self.config
    }

    /// Transform a document into an L2-normalised TF-IDF vector.
    pub fn transform_one(&self, document: &str) -> Result<SparseVector> {
        let mut pairs = Vec::new();
        for token in self.analyzer.analyze(document)? {
            if let Some(&index) = self.vocabulary.get(&token.text) {
                pairs.push((index, 1.0));
            }
        }

        let mut vector = SparseVector::from_pairs(self.dimension(), pairs)?;
        let weighted: Vec<(usize, f64)> = vector
            .indices()
            .iter()
            .zip(vector.values())
            .map(|(&i, &tf)| (i, tf * self.idf[i]))
            .collect();
        vector = SparseVector::from_pairs(self.dimension(), weighted)?;
        vector.normalize_l2();
        Ok(vector)
    }

    /// Transform documents into a matrix with one row per document.
    pub fn transform<S: AsRef<str> + Sync>(&self, documents: &[S]) -> Result<CsrMatrix> {
        let rows: Vec<SparseVector> = documents
            .par_iter()
            .map(|doc| self.transform_one(doc.as_ref()))
            .collect::<Result<_>>()?;
        CsrMatrix::from_rows(self.dimension(), &rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn corpus() -> Vec<String> {
        vec![
            "great video loved it".to_string(),
            "great video thanks".to_string(),
            "terrible video hated it".to_string(),
            "terrible audio".to_string(),
            "ok video i guess".to_string(),
        ]
    }

    fn fit(config: VectorizerConfig) -> FeatureSpace {
        TfidfVectorizer::new(config).unwrap().fit(&corpus()).unwrap()
    }

    #[test]
    fn test_document_frequency_pruning() {
        let space = fit(VectorizerConfig::default());

        // "video" appears in 4/5 documents (<= 0.9 * 5), kept.
        assert!(space.term_index("video").is_some());
        // "great video" appears in 2 documents, kept.
        assert!(space.term_index("great video").is_some());
        // "audio" appears once, below min_df.
        assert!(space.term_index("audio").is_none());
        // Single letters never become tokens.
        assert!(space.term_index("i").is_none());

        let mut sorted = space.terms().to_vec();
        sorted.sort();
        assert_eq!(space.terms(), sorted.as_slice());
    }

    #[test]
    fn test_max_df_drops_ubiquitous_terms() {
        let config = VectorizerConfig {
            max_df: 0.7,
            ..VectorizerConfig::default()
        };
        let space = fit(config);
        assert!(space.term_index("video").is_none());
        assert!(space.term_index("great").is_some());
    }

    #[test]
    fn test_max_features_keeps_most_frequent() {
        let config = VectorizerConfig {
            max_features: Some(1),
            ..VectorizerConfig::default()
        };
        let space = fit(config);
        assert_eq!(space.terms(), &["video".to_string()]);
    }

    #[test]
    fn test_smoothed_idf() {
        let space = fit(VectorizerConfig::default());
        let index = space.term_index("great").unwrap();
        let expected = (6.0f64 / 3.0).ln() + 1.0;
        assert!((space.idf()[index] - expected).abs() < 1e-12);
        assert_eq!(space.n_documents(), 5);
    }

    #[test]
    fn test_transform_dimension_and_unseen_terms() {
        let space = fit(VectorizerConfig::default());

        let unseen = space.transform_one("completely unrelated words").unwrap();
        assert_eq!(unseen.dim(), space.dimension());
        assert_eq!(unseen.nnz(), 0);

        let seen = space.transform_one("Great VIDEO").unwrap();
        assert_eq!(seen.dim(), space.dimension());
        assert!((seen.l2_norm() - 1.0).abs() < 1e-12);
        assert!(seen.get(space.term_index("great video").unwrap()) > 0.0);

        let matrix = space.transform(&["great video", "", "terrible"]).unwrap();
        assert_eq!(matrix.n_rows(), 3);
        assert_eq!(matrix.n_cols(), space.dimension());
        assert_eq!(matrix.row(1).nnz(), 0);
    }

    #[test]
    fn test_fit_errors() {
        let empty: Vec<String> = Vec::new();
        assert!(
            TfidfVectorizer::new(VectorizerConfig::default())
                .unwrap()
                .fit(&empty)
                .is_err()
        );

        let unique = vec![
            "alpha beta".to_string(),
            "gamma delta".to_string(),
            "epsilon zeta".to_string(),
        ];
        let err = TfidfVectorizer::new(VectorizerConfig::default())
            .unwrap()
            .fit(&unique)
            .unwrap_err();
        assert!(err.to_string().contains("no terms remain"));
    }

    #[test]
    fn test_serialization_rebuilds_lookup() {
        let space = fit(VectorizerConfig::default());
        let bytes = bincode::serialize(&space).unwrap();
        let restored: FeatureSpace = bincode::deserialize(&bytes).unwrap();

        assert_eq!(restored.dimension(), space.dimension());
        assert_eq!(restored.term_index("great"), space.term_index("great"));
        assert_eq!(
            restored.transform_one("great video thanks").unwrap(),
            space.transform_one("great video thanks").unwrap()
        );
    }
}
