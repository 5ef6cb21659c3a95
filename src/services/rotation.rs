//! Non-repeating question selection within a play session.
//!
//! The engine keeps an exclusion set of already-played pool indices and a
//! cursor into the remaining pool, persisting both through an injected
//! key-value capability so a reopened session continues where it left off.

use std::collections::HashSet;

use dashmap::DashMap;
use serde::{Deserialize, Serialize};

use crate::dto::question::{Difficulty, Question, RoundKind};

/// Points awarded for a correct answer.
pub const SCORE_INCREMENT: u32 = 10;

/// Persisted rotation position for one round and tier.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RotationState {
    /// Original pool indices already played in this cycle.
    pub used: HashSet<usize>,
    /// Cursor into the available (not yet used) pool.
    pub current_index: usize,
}

/// Key-value persistence capability for [`RotationState`].
///
/// Injected rather than hard-wired so the engine stays independent of where
/// the state actually lives (browser storage, a file, memory in tests).
pub trait RotationStore {
    /// Load the state stored under `key`, if any.
    fn load(&self, key: &str) -> Option<RotationState>;
    /// Persist `state` under `key`, replacing any previous value.
    fn save(&self, key: &str, state: &RotationState);
    /// Drop the state stored under `key`.
    fn remove(&self, key: &str);
}

impl<S: RotationStore + ?Sized> RotationStore for &S {
    fn load(&self, key: &str) -> Option<RotationState> {
        (**self).load(key)
    }

    fn save(&self, key: &str, state: &RotationState) {
        (**self).save(key, state)
    }

    fn remove(&self, key: &str) {
        (**self).remove(key)
    }
}

/// In-memory [`RotationStore`] backed by a concurrent map.
#[derive(Debug, Default)]
pub struct MemoryRotationStore {
    entries: DashMap<String, RotationState>,
}

impl RotationStore for MemoryRotationStore {
    fn load(&self, key: &str) -> Option<RotationState> {
        self.entries.get(key).map(|entry| entry.clone())
    }

    fn save(&self, key: &str, state: &RotationState) {
        self.entries.insert(key.to_owned(), state.clone());
    }

    fn remove(&self, key: &str) {
        self.entries.remove(key);
    }
}

/// Selects the next question from a pool while avoiding repeats within a
/// completion cycle.
///
/// State is keyed by round and difficulty so pools of different tiers never
/// share an exclusion set. The score counter is session-local and not
/// persisted.
pub struct RotationEngine<S: RotationStore> {
    store: S,
    key: String,
    state: RotationState,
    score: u32,
}

impl<S: RotationStore> RotationEngine<S> {
    /// Open the engine for one round and tier, restoring persisted state.
    pub fn new(store: S, round: RoundKind, difficulty: Difficulty) -> Self {
        let key = format!("used-{round}-{difficulty}");
        let state = store.load(&key).unwrap_or_default();
        Self {
            store,
            key,
            state,
            score: 0,
        }
    }

    /// Session-local score.
    pub fn score(&self) -> u32 {
        self.score
    }

    /// Indices currently in rotation, and the exclusion set to apply.
    ///
    /// Once the exclusion set covers the whole pool the entire pool becomes
    /// available again, so the round never runs dry.
    fn available_indices(&self, pool_len: usize) -> Vec<usize> {
        if self.state.used.len() >= pool_len {
            (0..pool_len).collect()
        } else {
            (0..pool_len)
                .filter(|index| !self.state.used.contains(index))
                .collect()
        }
    }

    /// The question to present, or `None` for an empty pool (terminal
    /// "no questions" state).
    pub fn current<'p>(&self, pool: &'p [Question]) -> Option<&'p Question> {
        if pool.is_empty() {
            return None;
        }
        let available = self.available_indices(pool.len());
        let index = available[self.state.current_index % available.len()];
        Some(&pool[index])
    }

    /// Record the outcome of the question just shown and advance.
    ///
    /// The shown question's original pool index joins the exclusion set; when
    /// that set covers the pool it is cleared entirely. Addressing always
    /// restarts at the head of the recomputed available pool. The updated
    /// state is persisted before returning.
    pub fn record_answer(&mut self, pool: &[Question], correct: bool) {
        if correct {
            self.score += SCORE_INCREMENT;
        }
        if pool.is_empty() {
            return;
        }

        let available = self.available_indices(pool.len());
        let original = available[self.state.current_index % available.len()];
        self.state.used.insert(original);

        if self.state.used.len() >= pool.len() {
            self.state.used.clear();
        }
        self.state.current_index = 0;
        self.store.save(&self.key, &self.state);
    }

    /// Snapshot of the persisted rotation position.
    pub fn state(&self) -> &RotationState {
        &self.state
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dto::question::AudioQuestion;

    fn pool(len: usize) -> Vec<Question> {
        (0..len)
            .map(|i| {
                Question::Audio(AudioQuestion {
                    audio_url: format!("/audio/melodies/m_{i}.mp3"),
                    options: vec!["a".into(), "b".into()],
                    correct_answer: "a".into(),
                })
            })
            .collect()
    }

    fn engine() -> RotationEngine<MemoryRotationStore> {
        RotationEngine::new(
            MemoryRotationStore::default(),
            RoundKind::GuessMelody,
            Difficulty::Easy,
        )
    }

    #[test]
    fn empty_pool_is_terminal() {
        let mut engine = engine();
        assert!(engine.current(&[]).is_none());
        engine.record_answer(&[], true);
        assert_eq!(engine.score(), SCORE_INCREMENT);
    }

    #[test]
    fn covers_every_question_exactly_once_before_reset() {
        let pool = pool(5);
        let mut engine = engine();
        let mut seen = Vec::new();

        for step in 0..pool.len() {
            let question = engine.current(&pool).unwrap().clone();
            seen.push(question);
            engine.record_answer(&pool, false);
            if step < pool.len() - 1 {
                assert_eq!(engine.state().used.len(), step + 1);
            }
        }

        // All five shown without repeats, then the cycle resets.
        for question in &pool {
            assert_eq!(seen.iter().filter(|q| *q == question).count(), 1);
        }
        assert!(engine.state().used.is_empty());
        assert_eq!(engine.state().current_index, 0);
    }

    #[test]
    fn answering_last_remaining_question_resets_the_cycle() {
        let pool = pool(3);
        let store = MemoryRotationStore::default();
        store.save(
            "used-guess-melody-easy",
            &RotationState {
                used: HashSet::from([0, 1]),
                current_index: 0,
            },
        );
        let mut engine = RotationEngine::new(store, RoundKind::GuessMelody, Difficulty::Easy);

        // Only index 2 is still in rotation.
        assert_eq!(engine.current(&pool), Some(&pool[2]));
        engine.record_answer(&pool, true);

        assert!(engine.state().used.is_empty());
        assert_eq!(engine.state().current_index, 0);
        assert_eq!(engine.score(), SCORE_INCREMENT);
    }

    #[test]
    fn state_survives_reopening_under_the_same_key() {
        let pool = pool(4);
        let store = MemoryRotationStore::default();
        {
            let mut engine =
                RotationEngine::new(&store, RoundKind::GuessFace, Difficulty::Medium);
            engine.current(&pool).unwrap();
            engine.record_answer(&pool, false);
        }

        let reopened = RotationEngine::new(&store, RoundKind::GuessFace, Difficulty::Medium);
        assert_eq!(reopened.state().used.len(), 1);

        // A different tier starts from scratch.
        let other = RotationEngine::new(&store, RoundKind::GuessFace, Difficulty::Hard);
        assert!(other.state().used.is_empty());
    }

    #[test]
    fn score_counts_only_correct_answers() {
        let pool = pool(3);
        let mut engine = engine();
        engine.record_answer(&pool, true);
        engine.record_answer(&pool, false);
        engine.record_answer(&pool, true);
        assert_eq!(engine.score(), 2 * SCORE_INCREMENT);
    }
}
