use super::match_normalize::line_ranges;
use super::{MatchSpan, SimilarityStrategy};
use crate::logger::Logger;
use strsim::normalized_damerau_levenshtein;

/// Damerau-Levenshtein similarity over windows of as many lines as the target
/// has. Near-ties between the two best windows are treated as ambiguous.
#[derive(Debug, Clone)]
pub struct EditDistance {
    pub min_score: f64,
}

impl Default for EditDistance {
    fn default() -> Self {
        Self { min_score: 0.85 }
    }
}

impl SimilarityStrategy for EditDistance {
    fn name(&self) -> &'static str {
        "edit_distance"
    }

    fn find_line(&self, haystack: &str, needle: &str, logger: &Logger) -> Option<MatchSpan> {
        let ranges = line_ranges(haystack);
        let needle = needle.trim();
        let win = needle.lines().count().max(1);
        if ranges.len() < win {
            logger.info("matcher", "no_candidates", "document shorter than target");
            return None;
        }

        let mut best_score: f64 = -1.0;
        let mut second_score: f64 = -1.0;
        let mut best_range: Option<(usize, usize)> = None;

        for i in 0..=ranges.len() - win {
            let start = ranges[i].0;
            let end = ranges[i + win - 1].1;
            let candidate = haystack[start..end].trim();
            if candidate.is_empty() {
                continue;
            }
            let score = normalized_damerau_levenshtein(candidate, needle);

            if score > best_score {
                second_score = best_score;
                best_score = score;
                best_range = Some((start, end));
            } else if score > second_score {
                second_score = score;
            }
        }

        let (start, end) = best_range?;
        if best_score < self.min_score {
            logger.info(
                "matcher",
                "no_match_threshold",
                &format!("best={:.3} < min={:.3}", best_score, self.min_score),
            );
            return None;
        }
        if second_score >= self.min_score && (best_score - second_score) < 0.02 {
            logger.info(
                "matcher",
                "ambiguous_match",
                &format!("best={:.3}, second={:.3}", best_score, second_score),
            );
            return None;
        }

        logger.info(
            "matcher",
            "edit_distance_match",
            &format!("start={start}, end={end}, score={best_score:.3}"),
        );
        Some(MatchSpan { start, end, score: best_score, exact: false })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn find(haystack: &str, needle: &str) -> Option<MatchSpan> {
        EditDistance::default().find_line(haystack, needle, &Logger::new_for_test(1, None))
    }

    #[test]
    fn tolerates_typos() {
        let doc = "You are a helpful asistant.\nAnswer briefly.\n";
        let span = find(doc, "You are a helpful assistant.").unwrap();
        assert_eq!(&doc[span.start..span.end], "You are a helpful asistant.");
    }

    #[test]
    fn identical_lines_are_ambiguous() {
        let doc = "Answer briefly!\nAnswer briefly!\n";
        assert!(find(doc, "Answer briefly.").is_none());
    }

    #[test]
    fn unrelated_text_is_rejected() {
        assert!(find("completely different\n", "You are a helpful assistant.").is_none());
    }
}
