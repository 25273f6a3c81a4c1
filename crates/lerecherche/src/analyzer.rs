// Query classification
//
// *L'Analyse* (The Analysis) - Decide how a free-text query should be matched

use crate::dimension::{self, Dimension};
use serde::{Deserialize, Serialize};
use std::fmt;

/// One whitespace token of a multi-word query
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum QueryToken {
    /// Token that is exactly a dimension
    Dimension(Dimension),
    /// Any other token, verbatim
    Term(String),
}

/// Controlling match strategy for a query
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum QueryClass {
    /// Single term matched as a substring
    Plain {
        /// Trimmed query text
        term: String,
    },
    /// The whole query is one dimension
    ExactDimension {
        /// Parsed dimension
        dimension: Dimension,
    },
    /// Dimension text inside a single token, or dimensions with nothing else
    EmbeddedDimension {
        /// Distinct embedded dimensions
        dimensions: Vec<Dimension>,
    },
    /// Every token must match
    MultiWord {
        /// Tokens in query order
        tokens: Vec<QueryToken>,
    },
    /// Embedded dimensions plus other terms
    Combined {
        /// Distinct embedded dimensions
        dimensions: Vec<Dimension>,
        /// Remaining non-dimension terms
        terms: Vec<String>,
    },
}

impl QueryClass {
    /// Short name used in logs
    pub fn name(&self) -> &'static str {
        match self {
            QueryClass::Plain { .. } => "plain",
            QueryClass::ExactDimension { .. } => "exact-dimension",
            QueryClass::EmbeddedDimension { .. } => "embedded-dimension",
            QueryClass::MultiWord { .. } => "multi-word",
            QueryClass::Combined { .. } => "combined",
        }
    }
}

impl fmt::Display for QueryClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Classification of a raw query
///
/// The flags describe the query independently; `class` is the single
/// strategy the planner acts on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryAnalysis {
    /// Trimmed query text
    pub query: String,
    /// Two or more tokens and not one dimension as a whole
    pub is_multi_word: bool,
    /// The whole query is one dimension
    pub is_exact_dimension: bool,
    /// At least one dimension occurs somewhere in the query
    pub has_embedded_dimension: bool,
    /// Multi-word, embedded dimension, and other terms remain
    pub is_combined: bool,
    /// Controlling strategy
    pub class: QueryClass,
}

/// Classify a raw query string
///
/// Deterministic and total: malformed dimension-like text falls through to
/// plain or multi-word matching.
pub fn analyze(raw: &str) -> QueryAnalysis {
    let query = raw.trim().to_string();
    let words: Vec<&str> = query.split_whitespace().collect();

    let exact = Dimension::parse(&query);
    let embedded = dimension::embedded_dimensions(&query);
    let remaining = dimension::remaining_terms(&query);

    let is_exact_dimension = exact.is_some();
    let is_multi_word = words.len() >= 2 && !is_exact_dimension;
    let has_embedded_dimension = !embedded.is_empty();
    let is_combined = is_multi_word && has_embedded_dimension && !remaining.is_empty();

    let class = classify(&query, &words, exact, embedded, remaining, is_multi_word);

    QueryAnalysis {
        query,
        is_multi_word,
        is_exact_dimension,
        has_embedded_dimension,
        is_combined,
        class,
    }
}

fn classify(
    query: &str,
    words: &[&str],
    exact: Option<Dimension>,
    embedded: Vec<Dimension>,
    remaining: Vec<String>,
    is_multi_word: bool,
) -> QueryClass {
    if query.is_empty() {
        return QueryClass::Plain {
            term: String::new(),
        };
    }

    if let Some(dimension) = exact {
        return QueryClass::ExactDimension { dimension };
    }

    if is_multi_word {
        let tokens: Vec<QueryToken> = words
            .iter()
            .map(|word| match Dimension::parse(word) {
                Some(dimension) => QueryToken::Dimension(dimension),
                None => QueryToken::Term((*word).to_string()),
            })
            .collect();

        // A standalone dimension token keeps per-token matching
        if tokens.iter().any(|t| matches!(t, QueryToken::Dimension(_))) {
            return QueryClass::MultiWord { tokens };
        }

        if !embedded.is_empty() {
            return if remaining.is_empty() {
                QueryClass::EmbeddedDimension {
                    dimensions: embedded,
                }
            } else {
                QueryClass::Combined {
                    dimensions: embedded,
                    terms: remaining,
                }
            };
        }

        return QueryClass::MultiWord { tokens };
    }

    // A lone token matches on its dimensions only
    if !embedded.is_empty() {
        return QueryClass::EmbeddedDimension {
            dimensions: embedded,
        };
    }

    QueryClass::Plain {
        term: query.to_string(),
    }
}
