//! Best-candidate scan over waiting interest records.

use crate::domain::InterestRecord;

use super::similarity::cosine_similarity;

/// Finds the waiting record most similar to `embedding`.
///
/// `candidates` must be in creation-ascending order (as produced by
/// [`crate::domain::InterestStore::list_unmatched`]); the scan keeps a
/// candidate only on a strictly greater score, so equal maxima resolve
/// to the earliest-created record. Candidates whose similarity is
/// undefined (zero magnitude, mismatched dimension) are skipped.
///
/// Returns the best candidate iff its score meets `threshold`.
#[must_use]
pub fn find_best_match<'a>(
    embedding: &[f32],
    candidates: &'a [InterestRecord],
    threshold: f64,
) -> Option<&'a InterestRecord> {
    let mut best: Option<(&'a InterestRecord, f64)> = None;
    for candidate in candidates {
        let Some(score) = cosine_similarity(embedding, &candidate.embedding) else {
            continue;
        };
        if best.is_none_or(|(_, top)| score > top) {
            best = Some((candidate, score));
        }
    }
    best.and_then(|(record, score)| (score >= threshold).then_some(record))
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use chrono::{Duration, Utc};

    use super::*;
    use crate::domain::{ConnectionId, InterestId};

    fn record(text: &str, embedding: Vec<f32>, age_secs: i64) -> InterestRecord {
        InterestRecord {
            id: InterestId::new(),
            connection_id: ConnectionId::new(),
            text: text.to_string(),
            embedding,
            matched: false,
            room_id: None,
            created_at: Utc::now() - Duration::seconds(age_secs),
        }
    }

    #[test]
    fn returns_candidate_with_maximum_score() {
        let candidates = vec![
            record("far", vec![0.0, 1.0], 30),
            record("close", vec![0.9, 0.1], 20),
            record("middling", vec![0.5, 0.5], 10),
        ];
        let best = find_best_match(&[1.0, 0.0], &candidates, 0.1);
        assert_eq!(best.map(|r| r.text.as_str()), Some("close"));
    }

    #[test]
    fn equal_maxima_resolve_to_earliest_created() {
        // Identical embeddings, listed in creation order.
        let candidates = vec![
            record("first", vec![1.0, 0.0], 60),
            record("second", vec![2.0, 0.0], 10),
        ];
        let best = find_best_match(&[1.0, 0.0], &candidates, 0.5);
        assert_eq!(best.map(|r| r.text.as_str()), Some("first"));
    }

    #[test]
    fn below_threshold_returns_none() {
        let candidates = vec![record("orthogonal", vec![0.0, 1.0], 10)];
        assert!(find_best_match(&[1.0, 0.0], &candidates, 0.4).is_none());
    }

    #[test]
    fn score_exactly_at_threshold_matches() {
        // cos = 0.42 between the unit vector and this candidate.
        let candidates = vec![record("trekking", vec![0.42, 0.907_524_1], 10)];
        assert!(find_best_match(&[1.0, 0.0], &candidates, 0.42).is_some());
    }

    #[test]
    fn zero_magnitude_submission_never_matches() {
        let candidates = vec![record("anything", vec![1.0, 0.0], 10)];
        assert!(find_best_match(&[0.0, 0.0], &candidates, 0.0).is_none());
    }

    #[test]
    fn zero_magnitude_candidate_is_skipped() {
        let candidates = vec![
            record("degenerate", vec![0.0, 0.0], 20),
            record("valid", vec![1.0, 0.0], 10),
        ];
        let best = find_best_match(&[1.0, 0.0], &candidates, 0.5);
        assert_eq!(best.map(|r| r.text.as_str()), Some("valid"));
    }

    #[test]
    fn empty_candidate_list_returns_none() {
        assert!(find_best_match(&[1.0, 0.0], &[], 0.0).is_none());
    }
}
