//! Labeled training corpus.
//!
//! The cleaning stage hands over a CSV file with a `clean_comment` text
//! column and a `category` column holding -1, 0 or 1:
//!
//! ```csv
//! clean_comment,category
//! loved this video,1
//! worst upload ever,-1
//! ```

use std::io::Read;
use std::path::Path;

use csv::ReaderBuilder;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

use crate::error::{Result, SentiscopeError};
use crate::sentiment::Sentiment;

/// A single training example.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabeledExample {
    pub text: String,
    pub label: Sentiment,
}

impl LabeledExample {
    pub fn new<S: Into<String>>(text: S, label: Sentiment) -> Self {
        LabeledExample {
            text: text.into(),
            label,
        }
    }
}

#[derive(Debug, Deserialize)]
struct CorpusRecord {
    clean_comment: Option<String>,
    category: Option<String>,
}

/// An ordered, immutable set of labeled examples.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Corpus {
    examples: Vec<LabeledExample>,
}

impl Corpus {
    pub fn new(examples: Vec<LabeledExample>) -> Self {
        Corpus { examples }
    }

    /// Load a corpus from a CSV file on disk.
    pub fn from_csv_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(SentiscopeError::corpus(format!(
                "corpus file not found: {}",
                path.display()
            )));
        }
        let file = std::fs::File::open(path)?;
        Self::from_csv_reader(file)
    }

    /// Load a corpus from CSV data with `clean_comment` and `category` columns.
    ///
    /// Rows with a missing text, an empty text, or a category outside
    /// {-1, 0, 1} are rejected with the offending line number.
    pub fn from_csv_reader<R: Read>(reader: R) -> Result<Self> {
        let mut reader = ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);

        let headers = reader.headers()?.clone();
        for required in ["clean_comment", "category"] {
            if !headers.iter().any(|h| h == required) {
                return Err(SentiscopeError::corpus(format!(
                    "missing required column '{required}'"
                )));
            }
        }

        let mut examples = Vec::new();
        for (row, record) in reader.deserialize::<CorpusRecord>().enumerate() {
            // Header is line 1.
            let line = row + 2;
            let record = record?;

            let text = match record.clean_comment {
                Some(text) if !text.is_empty() => text,
                _ => {
                    return Err(SentiscopeError::corpus(format!(
                        "line {line}: empty clean_comment"
                    )));
                }
            };
            let raw_label = record.category.unwrap_or_default();
            let label = raw_label
                .parse::<i64>()
                .ok()
                .and_then(Sentiment::from_score)
                .ok_or_else(|| {
                    SentiscopeError::corpus(format!(
                        "line {line}: category must be -1, 0 or 1, got '{raw_label}'"
                    ))
                })?;

            examples.push(LabeledExample { text, label });
        }

        Ok(Corpus { examples })
    }

    pub fn len(&self) -> usize {
        self.examples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.examples.is_empty()
    }

    pub fn examples(&self) -> &[LabeledExample] {
        &self.examples
    }

    pub fn texts(&self) -> Vec<&str> {
        self.examples.iter().map(|e| e.text.as_str()).collect()
    }

    pub fn labels(&self) -> Vec<Sentiment> {
        self.examples.iter().map(|e| e.label).collect()
    }

    /// Number of examples per class, in (negative, neutral, positive) order.
    pub fn class_counts(&self) -> [usize; 3] {
        let mut counts = [0; 3];
        for example in &self.examples {
            counts[example.label.index()] += 1;
        }
        counts
    }

    /// Number of classes with at least one example.
    pub fn distinct_classes(&self) -> usize {
        self.class_counts().iter().filter(|&&c| c > 0).count()
    }

    /// Split into (train, test) keeping class proportions.
    ///
    /// The test split receives `ceil(test_size * n)` examples distributed
    /// over the classes in proportion to their size. The split is fully
    /// determined by `seed`.
    pub fn stratified_split(&self, test_size: f64, seed: u64) -> Result<(Corpus, Corpus)> {
        if !(test_size > 0.0 && test_size < 1.0) {
            return Err(SentiscopeError::corpus(format!(
                "test_size must be in (0, 1), got {test_size}"
            )));
        }
        let n = self.len();
        if n == 0 {
            return Err(SentiscopeError::corpus("cannot split an empty corpus"));
        }
        if self.distinct_classes() < 2 {
            return Err(SentiscopeError::corpus(
                "corpus contains a single class; at least two are required",
            ));
        }
        let counts = self.class_counts();
        if let Some(sentiment) = Sentiment::ALL
            .iter()
            .find(|s| counts[s.index()] == 1)
        {
            return Err(SentiscopeError::corpus(format!(
                "class {} has only 1 example; stratified splitting needs at least 2",
                sentiment.display_name()
            )));
        }

        let n_test = (test_size * n as f64).ceil() as usize;
        let n_train = n - n_test;
        if n_test == 0 || n_train == 0 {
            return Err(SentiscopeError::corpus(format!(
                "test_size {test_size} leaves an empty split for {n} examples"
            )));
        }

        let allocation = allocate(&counts, n_test);

        let mut rng = StdRng::seed_from_u64(seed);
        let mut train_idx = Vec::with_capacity(n_train);
        let mut test_idx = Vec::with_capacity(n_test);
        for sentiment in Sentiment::ALL {
            let mut members: Vec<usize> = self
                .examples
                .iter()
                .enumerate()
                .filter(|(_, e)| e.label == sentiment)
                .map(|(i, _)| i)
                .collect();
            members.shuffle(&mut rng);
            let take = allocation[sentiment.index()];
            test_idx.extend_from_slice(&members[..take]);
            train_idx.extend_from_slice(&members[take..]);
        }
        train_idx.shuffle(&mut rng);
        test_idx.shuffle(&mut rng);

        Ok((self.subset(&train_idx), self.subset(&test_idx)))
    }

    /// Examples at `indices`, in that order.
    pub fn subset(&self, indices: &[usize]) -> Corpus {
        Corpus {
            examples: indices.iter().map(|&i| self.examples[i].clone()).collect(),
        }
    }
}

/// Distribute `total` draws over classes proportionally to `counts`,
/// handing leftovers to the largest fractional remainders first.
fn allocate(counts: &[usize; 3], total: usize) -> [usize; 3] {
    let n: usize = counts.iter().sum();
    let mut allocation = [0usize; 3];
    let mut remainders = Vec::with_capacity(3);

    for (class, &count) in counts.iter().enumerate() {
        let exact = total as f64 * count as f64 / n as f64;
        allocation[class] = exact.floor() as usize;
        remainders.push((class, exact - exact.floor()));
    }

    let mut leftover = total - allocation.iter().sum::<usize>();
    remainders.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
    for (class, _) in remainders {
        if leftover == 0 {
            break;
        }
        if allocation[class] < counts[class] {
            allocation[class] += 1;
            leftover -= 1;
        }
    }
    allocation
}
