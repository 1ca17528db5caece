use super::match_normalize::{line_ranges, tokenize_words};
use super::{MatchSpan, SimilarityStrategy};
use crate::logger::Logger;

/// Word-overlap heuristic.
///
/// A line qualifies when at least `min_word_ratio` of the target's words are
/// found in it (a word counts when it contains, or is contained in, one of the
/// line's words) and its trimmed length is within `max_length_deviation` of
/// the target's length. The first qualifying line wins.
///
/// The ratio test is inclusive: with the default 0.5, a two-word target
/// matches a line holding one of its words. `"Hello, " + name + "!"` finds
/// `Hello, friend!` this way; a strict "more than half" rule would not.
#[derive(Debug, Clone)]
pub struct WordOverlap {
    pub min_word_ratio: f64,
    pub max_length_deviation: f64,
}

impl Default for WordOverlap {
    fn default() -> Self {
        Self {
            min_word_ratio: 0.5,
            max_length_deviation: 0.5,
        }
    }
}

impl SimilarityStrategy for WordOverlap {
    fn name(&self) -> &'static str {
        "word_overlap"
    }

    fn find_line(&self, haystack: &str, needle: &str, logger: &Logger) -> Option<MatchSpan> {
        let words = tokenize_words(needle);
        if words.is_empty() {
            logger.info("matcher", "no_words", "target has no words to compare");
            return None;
        }
        let target_len = needle.trim().chars().count() as f64;

        for (start, end) in line_ranges(haystack) {
            let line = haystack[start..end].trim();
            if line.is_empty() {
                continue;
            }

            let line_words = tokenize_words(line);
            let matched = words
                .iter()
                .filter(|w| {
                    line_words
                        .iter()
                        .any(|lw| lw.contains(w.as_str()) || w.contains(lw.as_str()))
                })
                .count();
            let ratio = matched as f64 / words.len() as f64;

            let len = line.chars().count() as f64;
            let deviation = (len - target_len).abs() / target_len;

            if ratio >= self.min_word_ratio && deviation <= self.max_length_deviation {
                logger.info(
                    "matcher",
                    "word_overlap_match",
                    &format!("start={start}, end={end}, words={matched}/{}", words.len()),
                );
                return Some(MatchSpan { start, end, score: ratio, exact: false });
            }
        }

        logger.info("matcher", "no_match", "no line passed the word-overlap thresholds");
        None
    }
}
