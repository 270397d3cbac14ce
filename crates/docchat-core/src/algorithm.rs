//! Ranking algorithm identifiers and the single-choice selector.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Ranking algorithm executed by the retrieval service.
///
/// Serialized as the lowercase wire name (`"semantic"`, `"bm25"`,
/// `"tfidf"`, `"hybrid"`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlgorithmId {
    /// Embedding similarity.
    Semantic,
    /// Okapi BM25.
    Bm25,
    /// TF-IDF keyword match.
    Tfidf,
    /// Fusion of the three above.
    #[default]
    Hybrid,
}

impl AlgorithmId {
    /// Every algorithm, in menu order.
    pub const ALL: [AlgorithmId; 4] = [
        AlgorithmId::Hybrid,
        AlgorithmId::Bm25,
        AlgorithmId::Tfidf,
        AlgorithmId::Semantic,
    ];

    /// Wire name sent as `search_type`.
    pub fn as_str(&self) -> &'static str {
        match self {
            AlgorithmId::Semantic => "semantic",
            AlgorithmId::Bm25 => "bm25",
            AlgorithmId::Tfidf => "tfidf",
            AlgorithmId::Hybrid => "hybrid",
        }
    }

    /// Human-readable description.
    pub fn label(&self) -> &'static str {
        match self {
            AlgorithmId::Semantic => "Semantic (meaning-based)",
            AlgorithmId::Bm25 => "BM25 (advanced ranking)",
            AlgorithmId::Tfidf => "TF-IDF (keyword match)",
            AlgorithmId::Hybrid => "Hybrid (best results)",
        }
    }
}

impl fmt::Display for AlgorithmId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when parsing an unknown algorithm name.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Unknown search algorithm `{0}`. Use semantic, bm25, tfidf, or hybrid.")]
pub struct UnknownAlgorithm(pub String);

impl FromStr for AlgorithmId {
    type Err = UnknownAlgorithm;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "semantic" => Ok(AlgorithmId::Semantic),
            "bm25" => Ok(AlgorithmId::Bm25),
            "tfidf" | "tf-idf" => Ok(AlgorithmId::Tfidf),
            "hybrid" => Ok(AlgorithmId::Hybrid),
            _ => Err(UnknownAlgorithm(s.to_string())),
        }
    }
}

/// Holds the one active ranking algorithm for a session.
#[derive(Debug, Clone, Default)]
pub struct AlgorithmSelector {
    active: AlgorithmId,
}

impl AlgorithmSelector {
    pub fn new(initial: AlgorithmId) -> Self {
        Self { active: initial }
    }

    pub fn active(&self) -> AlgorithmId {
        self.active
    }

    /// Make `algorithm` the active one, returning the previous choice.
    pub fn select(&mut self, algorithm: AlgorithmId) -> AlgorithmId {
        std::mem::replace(&mut self.active, algorithm)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_round_trips_wire_names() {
        for algo in AlgorithmId::ALL {
            assert_eq!(algo.as_str().parse::<AlgorithmId>().unwrap(), algo);
        }
    }

    #[test]
    fn test_parse_is_case_insensitive() {
        assert_eq!("BM25".parse::<AlgorithmId>().unwrap(), AlgorithmId::Bm25);
        assert_eq!(" Hybrid ".parse::<AlgorithmId>().unwrap(), AlgorithmId::Hybrid);
        assert_eq!("tf-idf".parse::<AlgorithmId>().unwrap(), AlgorithmId::Tfidf);
    }

    #[test]
    fn test_parse_unknown() {
        let err = "keyword".parse::<AlgorithmId>().unwrap_err();
        assert!(err.to_string().contains("keyword"));
    }

    #[test]
    fn test_serde_uses_wire_name() {
        let json = serde_json::to_string(&AlgorithmId::Tfidf).unwrap();
        assert_eq!(json, "\"tfidf\"");
        let back: AlgorithmId = serde_json::from_str("\"semantic\"").unwrap();
        assert_eq!(back, AlgorithmId::Semantic);
    }

    #[test]
    fn test_selector_defaults_to_hybrid_and_switches() {
        let mut selector = AlgorithmSelector::default();
        assert_eq!(selector.active(), AlgorithmId::Hybrid);
        let previous = selector.select(AlgorithmId::Bm25);
        assert_eq!(previous, AlgorithmId::Hybrid);
        assert_eq!(selector.active(), AlgorithmId::Bm25);
    }
}
