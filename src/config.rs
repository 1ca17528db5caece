use crate::error::{EditError, ErrorCode, Result};
use crate::r#match::{EditDistance, SimilarityStrategy, WordOverlap};

/// How a list of instructions is turned into document splices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ApplyMode {
    /// Every target is resolved against one pre-edit snapshot and all splices
    /// are committed as a single batch. Overlapping targets are rejected.
    #[default]
    Snapshot,
    /// Each instruction sees the result of the previous one.
    Chained,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StrategyKind {
    #[default]
    WordOverlap,
    EditDistance,
}

/// Where raw text goes when an edit-shaped response yields no instructions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FallbackPlacement {
    #[default]
    End,
    Cursor(usize),
}

#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub apply_mode: ApplyMode,
    pub fuzzy: bool,
    pub strategy: StrategyKind,
    pub min_word_ratio: f64,
    pub max_length_deviation: f64,
    pub min_similarity: f64,
    pub fallback: FallbackPlacement,
}

impl EngineConfig {
    pub fn new() -> Self {
        Self {
            apply_mode: ApplyMode::Snapshot,
            fuzzy: true,
            strategy: StrategyKind::WordOverlap,
            min_word_ratio: 0.5,
            max_length_deviation: 0.5,
            min_similarity: 0.85,
            fallback: FallbackPlacement::End,
        }
    }

    pub fn validate(&self) -> Result<()> {
        for (field, value) in [
            ("min_word_ratio", self.min_word_ratio),
            ("max_length_deviation", self.max_length_deviation),
        ] {
            if !(value > 0.0 && value <= 1.0) {
                return Err(invalid(field, value, "must be in (0, 1]"));
            }
        }
        if !(0.1..=1.0).contains(&self.min_similarity) {
            return Err(invalid("min_similarity", self.min_similarity, "must be between 0.1 and 1.0"));
        }
        Ok(())
    }

    /// Builds the similarity strategy used when exact lookup fails.
    pub fn build_strategy(&self) -> Box<dyn SimilarityStrategy> {
        match self.strategy {
            StrategyKind::WordOverlap => Box::new(WordOverlap {
                min_word_ratio: self.min_word_ratio,
                max_length_deviation: self.max_length_deviation,
            }),
            StrategyKind::EditDistance => Box::new(EditDistance {
                min_score: self.min_similarity,
            }),
        }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::new()
    }
}

fn invalid(field: &str, value: f64, reason: &str) -> EditError {
    EditError::Validation {
        code: ErrorCode::InvalidConfig,
        message: format!("{field} = {value} {reason}"),
        context: "config".to_string(),
    }
}
