use log::debug;
use std::collections::{HashMap, HashSet};

use crate::templates::{Template, TEMPLATES};

/// Vocabulary cap. Far above what ten labels produce, but it keeps the
/// fitted space bounded for arbitrary corpora.
const MAX_FEATURES: usize = 50_000;

/// Lowercased alphanumeric tokens of length >= 2; punctuation splits.
fn tokenize(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|t| t.chars().count() >= 2)
        .map(str::to_string)
        .collect()
}

/// Unigrams plus adjacent-pair bigrams over the token stream.
fn ngrams(tokens: &[String]) -> Vec<String> {
    let mut terms = tokens.to_vec();
    for pair in tokens.windows(2) {
        terms.push(format!("{} {}", pair[0], pair[1]));
    }
    terms
}

fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}

/// Term-frequency / inverse-document-frequency feature space fitted on a
/// small document corpus.
pub struct TfidfVectorizer {
    vocabulary: HashMap<String, usize>,
    idf: Vec<f32>,
}

impl TfidfVectorizer {
    /// Fit the vocabulary and smoothed IDF weights on a corpus.
    pub fn fit(documents: &[&str]) -> Self {
        let docs: Vec<Vec<String>> = documents.iter().map(|d| ngrams(&tokenize(d))).collect();

        let mut doc_freq: HashMap<&str, usize> = HashMap::new();
        let mut total_freq: HashMap<&str, usize> = HashMap::new();
        for doc in &docs {
            let mut seen: HashSet<&str> = HashSet::new();
            for term in doc {
                *total_freq.entry(term.as_str()).or_insert(0) += 1;
                if seen.insert(term.as_str()) {
                    *doc_freq.entry(term.as_str()).or_insert(0) += 1;
                }
            }
        }

        // Deterministic layout: alphabetical. If the cap binds, keep the
        // most frequent terms (ties alphabetical) before laying out.
        let mut terms: Vec<&str> = total_freq.keys().copied().collect();
        terms.sort_unstable();
        if terms.len() > MAX_FEATURES {
            terms.sort_unstable_by_key(|t| (std::cmp::Reverse(total_freq[t]), *t));
            terms.truncate(MAX_FEATURES);
            terms.sort_unstable();
        }

        let n_docs = docs.len();
        let mut vocabulary = HashMap::with_capacity(terms.len());
        let mut idf = Vec::with_capacity(terms.len());
        for (i, term) in terms.iter().enumerate() {
            vocabulary.insert(term.to_string(), i);
            let df = doc_freq[term];
            idf.push(((1 + n_docs) as f32 / (1 + df) as f32).ln() + 1.0);
        }
        debug!("fitted tf-idf space: {} docs, {} terms", n_docs, idf.len());

        Self { vocabulary, idf }
    }

    /// Project a document into the fitted space, L2-normalized. Terms outside
    /// the vocabulary are ignored, so a document with no overlap maps to the
    /// zero vector.
    pub fn transform(&self, document: &str) -> Vec<f32> {
        let mut vec = vec![0f32; self.idf.len()];
        for term in ngrams(&tokenize(document)) {
            if let Some(&i) = self.vocabulary.get(&term) {
                vec[i] += 1.0;
            }
        }
        for (i, v) in vec.iter_mut().enumerate() {
            *v *= self.idf[i];
        }
        let norm = vec.iter().map(|v| v * v).sum::<f32>().sqrt();
        if norm > 0.0 {
            for v in &mut vec {
                *v /= norm;
            }
        }
        vec
    }
}

/// Nearest-neighbor template selection over the fixed label set.
pub struct TemplateMatcher {
    templates: &'static [Template],
    vectorizer: TfidfVectorizer,
    label_vectors: Vec<Vec<f32>>,
}

impl TemplateMatcher {
    pub fn new() -> Self {
        Self::with_templates(TEMPLATES)
    }

    pub fn with_templates(templates: &'static [Template]) -> Self {
        assert!(!templates.is_empty(), "template set must not be empty");
        let labels: Vec<&str> = templates.iter().map(|t| t.label).collect();
        let vectorizer = TfidfVectorizer::fit(&labels);
        let label_vectors = labels.iter().map(|l| vectorizer.transform(l)).collect();
        Self {
            templates,
            vectorizer,
            label_vectors,
        }
    }

    /// Pick the template whose label is closest to the question.
    ///
    /// Stable argmax: ties, and questions with no lexical overlap at all,
    /// resolve to the first template. A selection is always produced.
    pub fn pick(&self, question: &str) -> &'static Template {
        let qv = self.vectorizer.transform(question);
        let mut best = 0usize;
        let mut best_score = f32::NEG_INFINITY;
        for (i, lv) in self.label_vectors.iter().enumerate() {
            let score = cosine_similarity(&qv, lv);
            if score > best_score {
                best = i;
                best_score = score;
            }
        }
        debug!(
            "picked '{}' (similarity {:.4})",
            self.templates[best].label, best_score
        );
        &self.templates[best]
    }
}

impl Default for TemplateMatcher {
    fn default() -> Self {
        Self::new()
    }
}
