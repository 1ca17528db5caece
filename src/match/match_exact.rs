use super::MatchSpan;
use crate::logger::Logger;

/// Fast path: the first exact occurrence of `needle`.
pub fn try_exact_match(haystack: &str, needle: &str, logger: &Logger) -> Option<MatchSpan> {
    let idx = haystack.find(needle)?;

    let occurrences = haystack.matches(needle).count();
    if occurrences > 1 {
        logger.info(
            "matcher",
            "first_of_many",
            &format!("{occurrences} exact occurrences; using the first at byte {idx}"),
        );
    }

    Some(MatchSpan {
        start: idx,
        end: idx + needle.len(),
        score: 1.0,
        exact: true,
    })
}
