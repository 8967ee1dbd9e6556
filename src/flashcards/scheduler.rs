//! Review scheduler
//!
//! Drives a card through New → Learning → Review ⇄ Relearning. Each review
//! is a pure function of the card, the rating, the review time and the
//! parameters bound at construction: no clock is read and no state is
//! shared between calls, so one `Scheduler` can serve any number of
//! threads.

use chrono::{DateTime, Duration, Utc};

use super::algorithm::{
    apply_fuzz, clamp_difficulty, clamp_stability, fuzz_seed, init_difficulty, init_stability,
    next_difficulty, next_forget_stability, next_interval, next_recall_stability,
    next_short_term_stability, retrievability,
};
use super::config::SchedulerParameters;
use super::errors::{Result, SchedulerError};
use super::models::{CardStatus, MemoryState, Rating, RecordLogItem, ReviewLog, SchedulingPreview};
use super::steps::{next_step, LearningStep, StepOutcome};

const SECONDS_PER_DAY: f64 = 86_400.0;

/// Spaced repetition scheduler bound to one parameter set
#[derive(Debug, Clone, Default)]
pub struct Scheduler {
    params: SchedulerParameters,
}

impl Scheduler {
    /// Validate `params` and bind them to a new scheduler
    pub fn new(params: SchedulerParameters) -> Result<Self> {
        params.validate()?;
        Ok(Self { params })
    }

    pub fn parameters(&self) -> &SchedulerParameters {
        &self.params
    }

    /// A fresh New card, due at `now`
    pub fn create_initial_state(&self, now: DateTime<Utc>) -> MemoryState {
        MemoryState::new(now)
    }

    /// Apply `rating` to `state` at `now` and return the updated card
    pub fn review(&self, state: &MemoryState, rating: Rating, now: DateTime<Utc>) -> MemoryState {
        self.review_with_log(state, rating, now).card
    }

    /// Like [`review`](Self::review), also returning the review log
    pub fn review_with_log(
        &self,
        state: &MemoryState,
        rating: Rating,
        now: DateTime<Utc>,
    ) -> RecordLogItem {
        self.preview(state, now).into_item(rating)
    }

    /// Outcome of every rating for `state` at `now`
    pub fn preview(&self, state: &MemoryState, now: DateTime<Utc>) -> SchedulingPreview {
        let card = normalize(state);
        let elapsed_days = self.elapsed_days(&card, now);

        let cards = if card.state == CardStatus::New {
            Rating::ALL.map(|rating| self.review_new(&card, rating, elapsed_days, now))
        } else if card.state.is_learning() {
            Rating::ALL.map(|rating| self.review_learning(&card, rating, elapsed_days, now))
        } else {
            self.review_long_term(&card, elapsed_days, now)
        };

        let [again, hard, good, easy] = cards;
        let item = |rating: Rating, next: MemoryState| {
            log::debug!(
                "{} -> {} on {} (stability {:.2}, difficulty {:.2}, due {})",
                state.state,
                next.state,
                rating,
                next.stability,
                next.difficulty,
                next.due
            );
            RecordLogItem {
                log: build_log(state, rating, elapsed_days, now),
                card: next,
            }
        };

        SchedulingPreview {
            again: item(Rating::Again, again),
            hard: item(Rating::Hard, hard),
            good: item(Rating::Good, good),
            easy: item(Rating::Easy, easy),
        }
    }

    /// Probability the card is recalled at `now` (0 for New cards)
    pub fn retrievability(&self, state: &MemoryState, now: DateTime<Utc>) -> f64 {
        if state.state == CardStatus::New {
            return 0.0;
        }
        let elapsed = match state.last_review {
            Some(last) if now > last => (now - last).num_seconds() as f64 / SECONDS_PER_DAY,
            _ => 0.0,
        };
        retrievability(elapsed, clamp_stability(state.stability))
    }

    /// Return a card to New, due at `now`. Lapses survive unless
    /// `reset_lapses` is set.
    pub fn forget(
        &self,
        state: &MemoryState,
        now: DateTime<Utc>,
        reset_lapses: bool,
    ) -> MemoryState {
        let mut card = MemoryState::new(now);
        if !reset_lapses {
            card.lapses = state.lapses;
        }
        card
    }

    /// Undo the review recorded in `log`, which must be the last review
    /// applied to `state`
    pub fn rollback(&self, state: &MemoryState, log: &ReviewLog) -> Result<MemoryState> {
        if state.last_review != Some(log.reviewed_at) {
            return Err(SchedulerError::RollbackMismatch {
                card: state.last_review,
                log: log.reviewed_at,
            });
        }

        let lapses = if is_lapse(log.state, log.rating) {
            state.lapses.saturating_sub(1)
        } else {
            state.lapses
        };

        Ok(MemoryState {
            due: log.due,
            stability: log.stability,
            difficulty: log.difficulty,
            elapsed_days: log.last_elapsed_days,
            scheduled_days: log.scheduled_days,
            learning_steps: log.learning_steps,
            reps: state.reps.saturating_sub(1),
            lapses,
            state: log.state,
            last_review: log.last_review,
        })
    }

    fn elapsed_days(&self, card: &MemoryState, now: DateTime<Utc>) -> u32 {
        let Some(last) = card.last_review else {
            return 0;
        };
        if now < last {
            log::warn!(
                "Review at {} precedes last review at {}; treating elapsed time as 0",
                now,
                last
            );
            return 0;
        }
        u32::try_from((now - last).num_days()).unwrap_or(u32::MAX)
    }

    /// First review: the step table is entered at step 0 and the rating is
    /// applied from there, so Good completes step 0
    fn review_new(
        &self,
        card: &MemoryState,
        rating: Rating,
        elapsed_days: u32,
        now: DateTime<Utc>,
    ) -> MemoryState {
        let w = &self.params.weights;
        let mut next = reviewed(card, elapsed_days, now);
        next.stability = init_stability(w, rating);
        next.difficulty = init_difficulty(w, rating);

        self.step_or_graduate(
            card,
            next,
            CardStatus::Learning,
            self.params.active_learning_steps(),
            0,
            rating,
            now,
        )
    }

    fn review_learning(
        &self,
        card: &MemoryState,
        rating: Rating,
        elapsed_days: u32,
        now: DateTime<Utc>,
    ) -> MemoryState {
        let w = &self.params.weights;
        let mut next = reviewed(card, elapsed_days, now);
        next.difficulty = next_difficulty(w, card.difficulty, rating);
        next.stability = if self.same_day(elapsed_days) {
            next_short_term_stability(w, card.stability, rating)
        } else {
            self.long_term_stability(card, rating, elapsed_days)
        };

        let steps = match card.state {
            CardStatus::Relearning => self.params.active_relearning_steps(),
            _ => self.params.active_learning_steps(),
        };

        self.step_or_graduate(
            card,
            next,
            card.state,
            steps,
            card.learning_steps,
            rating,
            now,
        )
    }

    /// Outcomes for a Review card, ordered Again, Hard, Good, Easy
    fn review_long_term(
        &self,
        card: &MemoryState,
        elapsed_days: u32,
        now: DateTime<Utc>,
    ) -> [MemoryState; 4] {
        let w = &self.params.weights;
        let max = self.params.maximum_interval;

        let mut again = reviewed(card, elapsed_days, now);
        again.difficulty = next_difficulty(w, card.difficulty, Rating::Again);
        again.stability = self.long_term_stability(card, Rating::Again, elapsed_days);
        again.lapses = card.lapses.saturating_add(1);
        let again = self.step_or_graduate(
            card,
            again,
            CardStatus::Relearning,
            self.params.active_relearning_steps(),
            0,
            Rating::Again,
            now,
        );

        let [hard, good, easy] = [Rating::Hard, Rating::Good, Rating::Easy].map(|rating| {
            let mut next = reviewed(card, elapsed_days, now);
            next.difficulty = next_difficulty(w, card.difficulty, rating);
            next.stability = if self.same_day(elapsed_days) {
                next_short_term_stability(w, card.stability, rating)
            } else {
                self.long_term_stability(card, rating, elapsed_days)
            };
            next
        });

        let hard_ivl = self.interval_for(card, hard.stability, elapsed_days, now);
        let good_ivl = self.interval_for(card, good.stability, elapsed_days, now);
        let easy_ivl = self.interval_for(card, easy.stability, elapsed_days, now);

        let hard_ivl = hard_ivl.min(good_ivl);
        let good_ivl = good_ivl.max(hard_ivl.saturating_add(1)).min(max);
        let easy_ivl = easy_ivl.max(good_ivl.saturating_add(1)).min(max);

        [
            again,
            schedule_review(hard, hard_ivl, now),
            schedule_review(good, good_ivl, now),
            schedule_review(easy, easy_ivl, now),
        ]
    }

    /// Place a reviewed card into its step table, or graduate it to Review
    #[allow(clippy::too_many_arguments)]
    fn step_or_graduate(
        &self,
        card: &MemoryState,
        mut next: MemoryState,
        learning_status: CardStatus,
        steps: &[LearningStep],
        current_step: u32,
        rating: Rating,
        now: DateTime<Utc>,
    ) -> MemoryState {
        let hard_repeats = learning_status != CardStatus::Relearning;

        match next_step(steps, current_step, rating, hard_repeats) {
            StepOutcome::Stay { index, delay } => {
                next.state = learning_status;
                next.learning_steps = index;
                next.scheduled_days = delay.whole_days();
                next.due = now + delay.duration();
                next
            }
            StepOutcome::Graduate => {
                let interval = self.interval_for(card, next.stability, next.elapsed_days, now);
                schedule_review(next, interval, now)
            }
        }
    }

    fn long_term_stability(&self, card: &MemoryState, rating: Rating, elapsed_days: u32) -> f64 {
        let w = &self.params.weights;
        let r = retrievability(f64::from(elapsed_days), card.stability);
        match rating {
            Rating::Again => next_forget_stability(w, card.difficulty, card.stability, r),
            _ => next_recall_stability(w, card.difficulty, card.stability, r, rating),
        }
    }

    fn interval_for(
        &self,
        card: &MemoryState,
        stability: f64,
        elapsed_days: u32,
        now: DateTime<Utc>,
    ) -> u32 {
        let max = self.params.maximum_interval;
        let interval = next_interval(stability, self.params.request_retention, max);
        if !self.params.enable_fuzz {
            return interval;
        }
        let seed = fuzz_seed(now, card.reps, card.difficulty, card.stability);
        apply_fuzz(interval, elapsed_days, max, seed)
    }

    fn same_day(&self, elapsed_days: u32) -> bool {
        self.params.enable_short_term && elapsed_days == 0
    }
}

/// Clamp stored numbers of a reviewed card into their domains
fn normalize(state: &MemoryState) -> MemoryState {
    let mut card = state.clone();
    if card.state != CardStatus::New {
        card.stability = clamp_stability(card.stability);
        card.difficulty = clamp_difficulty(card.difficulty);
    }
    card
}

/// Copy of `card` with the bookkeeping every review performs
fn reviewed(card: &MemoryState, elapsed_days: u32, now: DateTime<Utc>) -> MemoryState {
    let mut next = card.clone();
    next.elapsed_days = elapsed_days;
    next.last_review = Some(now);
    next.reps = card.reps.saturating_add(1);
    next
}

fn schedule_review(mut next: MemoryState, interval: u32, now: DateTime<Utc>) -> MemoryState {
    next.state = CardStatus::Review;
    next.learning_steps = 0;
    next.scheduled_days = interval;
    next.due = now + Duration::days(i64::from(interval));
    next
}

fn is_lapse(state: CardStatus, rating: Rating) -> bool {
    state == CardStatus::Review && rating == Rating::Again
}

fn build_log(
    state: &MemoryState,
    rating: Rating,
    elapsed_days: u32,
    now: DateTime<Utc>,
) -> ReviewLog {
    ReviewLog {
        rating,
        state: state.state,
        due: state.due,
        stability: state.stability,
        difficulty: state.difficulty,
        last_review: state.last_review,
        last_elapsed_days: state.elapsed_days,
        elapsed_days,
        scheduled_days: state.scheduled_days,
        learning_steps: state.learning_steps,
        reviewed_at: now,
    }
}
