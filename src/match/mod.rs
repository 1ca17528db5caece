use crate::logger::Logger;

mod match_distance;
mod match_exact;
mod match_normalize;
mod match_words;

pub use match_distance::EditDistance;
pub use match_exact::try_exact_match;
pub use match_normalize::{line_ranges, tokenize_words};
pub use match_words::WordOverlap;

/// Byte span of a located target in the searched text.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MatchSpan {
    pub start: usize,
    pub end: usize,
    pub score: f64,
    /// `false` when the span is a whole line picked by a similarity strategy.
    pub exact: bool,
}

/// Approximate lookup used once the literal target is not present.
///
/// Implementations return the span of the line (or run of lines) standing in
/// for `needle`, excluding the final line terminator.
pub trait SimilarityStrategy {
    fn name(&self) -> &'static str;

    fn find_line(&self, haystack: &str, needle: &str, logger: &Logger) -> Option<MatchSpan>;
}

/// Layered lookup:
/// 1) first exact occurrence
/// 2) similarity strategy, when one is given
pub fn find_target(
    haystack: &str,
    needle: &str,
    strategy: Option<&dyn SimilarityStrategy>,
    logger: &Logger,
) -> Option<MatchSpan> {
    if needle.is_empty() {
        return None;
    }

    if let Some(span) = try_exact_match(haystack, needle, logger) {
        return Some(span);
    }

    let strategy = strategy?;
    logger.info(
        "matcher",
        "similarity_search",
        &format!("no exact match; trying {} (needle_len={})", strategy.name(), needle.len()),
    );
    strategy.find_line(haystack, needle, logger)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn logger() -> Logger {
        Logger::new_for_test(1, None)
    }

    #[test]
    fn exact_wins_over_similarity() {
        let strategy = WordOverlap::default();
        let span = find_target("one two\nthree", "two", Some(&strategy), &logger()).unwrap();
        assert!(span.exact);
        assert_eq!((span.start, span.end), (4, 7));
    }

    #[test]
    fn no_strategy_means_exact_only() {
        assert!(find_target("Hello, friend!", "Hello, pal!", None, &logger()).is_none());
    }

    #[test]
    fn empty_needle_never_matches() {
        assert!(find_target("abc", "", Some(&WordOverlap::default()), &logger()).is_none());
    }
}
