//! Approval counting over raw review history.
//!
//! A reviewer's standing is their last decisive review. Counting review
//! events directly would over-count someone who approved, requested
//! changes, then approved again.

use std::collections::HashMap;

use crate::domain::{Review, ReviewState};

/// Number of distinct reviewers whose latest decisive review is an approval.
///
/// Reviews are ordered by `submitted_at`; reviews without a timestamp keep
/// their relative input order (the sort is stable). `Commented` and
/// `Pending` reviews never override an earlier decision.
pub fn count_approvals(reviews: &[Review]) -> u32 {
    let mut ordered: Vec<&Review> = reviews.iter().collect();
    ordered.sort_by_key(|r| r.submitted_at);

    let mut latest: HashMap<&str, ReviewState> = HashMap::new();
    for review in ordered {
        if review.state.is_decisive() {
            latest.insert(review.reviewer.as_str(), review.state);
        }
    }

    let approved = latest
        .values()
        .filter(|state| **state == ReviewState::Approved)
        .count();
    u32::try_from(approved).unwrap_or(u32::MAX)
}
