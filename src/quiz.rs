//! Picking the next quiz question.
//!
//! The server keeps no quiz state: every request carries the ids already asked, and
//! those ids are only used as an exclusion set.
use std::collections::HashSet;
use std::sync::Mutex;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use crate::db::Question;

/// Quiz selector id meaning "draw from every category".
pub const ALL_CATEGORIES: i64 = 0;

/// Chooses one question out of a non-empty list of eligible candidates.
pub trait QuestionPicker: Send + Sync {
    fn pick(&self, candidates: &[Question]) -> Option<Question>;
}

/// Uniform random choice backed by a seedable generator.
pub struct RandomPicker {
    rng: Mutex<StdRng>,
}

impl RandomPicker {
    pub fn from_entropy() -> Self {
        Self {
            rng: Mutex::new(StdRng::from_entropy()),
        }
    }

    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }
}

impl QuestionPicker for RandomPicker {
    fn pick(&self, candidates: &[Question]) -> Option<Question> {
        // poisoning leaves the generator state intact
        let mut rng = self.rng.lock().unwrap_or_else(|e| e.into_inner());
        candidates.choose(&mut *rng).cloned()
    }
}

/// Returns a question from `candidates` whose id is not in `previous`,
/// or `None` once every candidate has been asked.
pub fn next_question(
    candidates: Vec<Question>,
    previous: &[i64],
    picker: &dyn QuestionPicker,
) -> Option<Question> {
    let asked: HashSet<i64> = previous.iter().copied().collect();
    let remaining: Vec<Question> = candidates
        .into_iter()
        .filter(|q| !asked.contains(&q.id))
        .collect();
    if remaining.is_empty() {
        return None;
    }
    picker.pick(&remaining)
}
