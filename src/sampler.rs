use crate::error::{QuizError, Result};
use crate::question::{Question, QuestionId};
use itertools::Itertools;
use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::HashSet;

/// Questions per quiz when nothing else is configured.
pub const DEFAULT_MAX_QUESTIONS: usize = 45;

/// Picks the questions for a new quiz.
///
/// Unattempted questions are preferred. When there are fewer of them than
/// `max`, all of them are taken and the rest is backfilled with a random
/// sample of previously attempted questions, unattempted first. Once
/// everything has been attempted the whole pool is sampled uniformly.
///
/// The result is not in pool order: the unattempted block is shuffled too,
/// so only the split between fresh and backfilled questions is fixed.
///
/// Returns [`QuizError::EmptyPool`] when nothing can be selected.
pub fn sample<R: Rng + ?Sized>(
    pool: &[Question],
    attempted: &HashSet<QuestionId>,
    max: usize,
    rng: &mut R,
) -> Result<Vec<Question>> {
    // first occurrence of a repeated id wins
    let (mut unattempted, mut seen): (Vec<&Question>, Vec<&Question>) = pool
        .iter()
        .unique_by(|q| q.id.clone())
        .partition(|q| !attempted.contains(&q.id));

    let picked: Vec<&Question> = if unattempted.len() >= max {
        unattempted.shuffle(rng);
        unattempted.truncate(max);
        unattempted
    } else if !unattempted.is_empty() {
        let backfill = (max - unattempted.len()).min(seen.len());
        unattempted.shuffle(rng);
        let (sampled, _) = seen.partial_shuffle(rng, backfill);
        unattempted.extend(sampled.iter().copied());
        unattempted
    } else {
        // everything has been attempted before
        let count = seen.len().min(max);
        let (sampled, _) = seen.partial_shuffle(rng, count);
        sampled.to_vec()
    };

    if picked.is_empty() {
        return Err(QuizError::EmptyPool);
    }

    tracing::debug!(
        selected = picked.len(),
        fresh = picked.iter().filter(|q| !attempted.contains(&q.id)).count(),
        "sampled quiz questions"
    );

    Ok(picked.into_iter().cloned().collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::question::fixtures::{pool, question};
    use crate::question::OptionKey;
    use assert_matches::assert_matches;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn ids(questions: &[Question]) -> HashSet<QuestionId> {
        questions.iter().map(|q| q.id.clone()).collect()
    }

    fn rng(seed: u64) -> StdRng {
        StdRng::seed_from_u64(seed)
    }

    #[test]
    fn empty_pool_is_an_error() {
        let result = sample(&[], &HashSet::new(), 45, &mut rng(1));
        assert_matches!(result, Err(QuizError::EmptyPool));
    }

    #[test]
    fn zero_max_is_an_empty_pool() {
        let result = sample(&pool("q", 3), &HashSet::new(), 0, &mut rng(1));
        assert_matches!(result, Err(QuizError::EmptyPool));
    }

    #[test]
    fn fifty_unattempted_yields_forty_five_distinct() {
        let p = pool("q", 50);
        let picked = sample(&p, &HashSet::new(), 45, &mut rng(7)).unwrap();

        assert_eq!(picked.len(), 45);
        let picked_ids = ids(&picked);
        assert_eq!(picked_ids.len(), 45);
        assert!(picked_ids.is_subset(&ids(&p)));
    }

    #[test]
    fn backfills_from_attempted_after_all_unattempted() {
        let fresh = pool("new", 10);
        let old = pool("old", 40);
        let attempted = ids(&old);
        let mut all = old.clone();
        all.extend(fresh.clone());

        let picked = sample(&all, &attempted, 45, &mut rng(3)).unwrap();

        assert_eq!(picked.len(), 45);
        assert_eq!(ids(&picked).len(), 45);
        // unattempted block comes first and is complete
        assert_eq!(ids(&picked[..10]), ids(&fresh));
        assert!(picked[10..].iter().all(|q| attempted.contains(&q.id)));
    }

    #[test]
    fn unattempted_block_is_shuffled_ahead_of_backfill() {
        let fresh = pool("q", 10);
        let seen = pool("s", 40);
        let attempted = ids(&seen);
        let all: Vec<Question> = fresh.iter().chain(seen.iter()).cloned().collect();
        let pool_order: Vec<QuestionId> = fresh.iter().map(|q| q.id.clone()).collect();

        let reordered = (0..20u64).any(|seed| {
            let picked = sample(&all, &attempted, 45, &mut rng(seed)).unwrap();
            let head: Vec<QuestionId> = picked[..10].iter().map(|q| q.id.clone()).collect();
            assert_eq!(ids(&picked[..10]), ids(&fresh));
            head != pool_order
        });
        assert!(reordered);
    }

    #[test]
    fn backfill_is_bounded_by_attempted_count() {
        let fresh = pool("new", 5);
        let old = pool("old", 3);
        let attempted = ids(&old);
        let mut all = fresh.clone();
        all.extend(old);

        let picked = sample(&all, &attempted, 45, &mut rng(11)).unwrap();
        assert_eq!(picked.len(), 8);
    }

    #[test]
    fn prefers_unattempted_when_enough() {
        let fresh = pool("new", 60);
        let old = pool("old", 60);
        let attempted = ids(&old);
        let mut all = old;
        all.extend(fresh);

        for seed in 0..20 {
            let picked = sample(&all, &attempted, 45, &mut rng(seed)).unwrap();
            assert_eq!(picked.len(), 45);
            assert!(picked.iter().all(|q| !attempted.contains(&q.id)));
        }
    }

    #[test]
    fn all_attempted_large_pool_samples_max() {
        let p = pool("q", 100);
        let attempted = ids(&p);
        let picked = sample(&p, &attempted, 45, &mut rng(5)).unwrap();
        assert_eq!(picked.len(), 45);
        assert_eq!(ids(&picked).len(), 45);
    }

    #[test]
    fn small_pool_returns_a_permutation() {
        let p = pool("q", 12);
        let attempted = ids(&p[..6]);
        let picked = sample(&p, &attempted, 45, &mut rng(9)).unwrap();
        assert_eq!(picked.len(), 12);
        assert_eq!(ids(&picked), ids(&p));
    }

    #[test]
    fn length_is_min_of_max_and_pool() {
        let mut r = rng(42);
        for size in [1usize, 2, 10, 44, 45, 46, 90] {
            let p = pool("q", size);
            for split in [0, size / 2, size] {
                let attempted = ids(&p[..split]);
                let picked = sample(&p, &attempted, 45, &mut r).unwrap();
                assert_eq!(picked.len(), size.min(45), "size={size} split={split}");
                assert_eq!(ids(&picked).len(), picked.len());
            }
        }
    }

    #[test]
    fn duplicate_ids_in_pool_are_collapsed() {
        let p = vec![
            question("x", OptionKey::A),
            question("x", OptionKey::B),
            question("y", OptionKey::C),
        ];
        let picked = sample(&p, &HashSet::new(), 45, &mut rng(2)).unwrap();
        assert_eq!(picked.len(), 2);
        let x = picked.iter().find(|q| q.id.as_str() == "x").unwrap();
        assert_eq!(x.correct, OptionKey::A);
    }

    #[test]
    fn every_order_of_a_small_pool_occurs() {
        let p = pool("q", 3);
        let mut orders = HashSet::new();
        let mut r = rng(0);
        for _ in 0..600 {
            let picked = sample(&p, &HashSet::new(), 45, &mut r).unwrap();
            let order: Vec<String> = picked.iter().map(|q| q.id.to_string()).collect();
            orders.insert(order);
        }
        assert_eq!(orders.len(), 6);
    }
}
