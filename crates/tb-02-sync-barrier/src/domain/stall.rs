//! False-positive tolerance of the convergence barrier.
//!
//! A tank's duplicate filter occasionally rejects a legitimate transaction as
//! already seen, capping its pending set one below target for good. The
//! tracker tells that case apart from a tank that is still catching up.

/// Verdict after one observation of a tank's pending-set size.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StallOutcome {
    Reached,
    /// Held at `target − 1` for the whole stall budget.
    ToleratedFalsePositive,
    Pending,
}

/// Retry-budget counter for one tank.
#[derive(Clone, Debug)]
pub struct StallTracker {
    target: usize,
    budget: u32,
    last_size: Option<usize>,
    /// Consecutive observations of `last_size`.
    repeats: u32,
}

impl StallTracker {
    pub fn new(target: usize, budget: u32) -> Self {
        Self {
            target,
            budget,
            last_size: None,
            repeats: 0,
        }
    }

    pub fn observe(&mut self, size: usize) -> StallOutcome {
        if size >= self.target {
            return StallOutcome::Reached;
        }

        if self.last_size == Some(size) {
            self.repeats = self.repeats.saturating_add(1);
        } else {
            self.last_size = Some(size);
            self.repeats = 1;
        }

        if self.budget > 0 && size + 1 == self.target && self.repeats >= self.budget {
            StallOutcome::ToleratedFalsePositive
        } else {
            StallOutcome::Pending
        }
    }

    /// Consecutive observations of the current size.
    pub fn repeats(&self) -> u32 {
        self.repeats
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn feed(tracker: &mut StallTracker, sizes: &[usize]) -> Vec<StallOutcome> {
        sizes.iter().map(|size| tracker.observe(*size)).collect()
    }

    #[test]
    fn test_reaching_target_is_immediate() {
        let mut tracker = StallTracker::new(4, 3);
        assert_eq!(tracker.observe(4), StallOutcome::Reached);
        assert_eq!(tracker.observe(9), StallOutcome::Reached);
    }

    #[test]
    fn test_stuck_one_below_for_budget_is_tolerated() {
        let mut tracker = StallTracker::new(4, 3);
        let outcomes = feed(&mut tracker, &[1, 3, 3, 3]);
        assert_eq!(
            outcomes,
            vec![
                StallOutcome::Pending,
                StallOutcome::Pending,
                StallOutcome::Pending,
                StallOutcome::ToleratedFalsePositive,
            ]
        );
    }

    #[test]
    fn test_change_resets_counter() {
        let mut tracker = StallTracker::new(10, 3);
        feed(&mut tracker, &[9, 9]);
        assert_eq!(tracker.repeats(), 2);
        // Dips and recovers: the budget starts over.
        assert_eq!(tracker.observe(8), StallOutcome::Pending);
        assert_eq!(tracker.observe(9), StallOutcome::Pending);
        assert_eq!(tracker.repeats(), 1);
        assert_eq!(tracker.observe(9), StallOutcome::Pending);
        assert_eq!(tracker.observe(9), StallOutcome::ToleratedFalsePositive);
    }

    #[test]
    fn test_other_stalls_never_tolerated() {
        let mut tracker = StallTracker::new(10, 2);
        let outcomes = feed(&mut tracker, &[8; 20]);
        assert!(outcomes.iter().all(|o| *o == StallOutcome::Pending));
    }

    #[test]
    fn test_zero_budget_disables_tolerance() {
        let mut tracker = StallTracker::new(2, 0);
        let outcomes = feed(&mut tracker, &[1; 50]);
        assert!(outcomes.iter().all(|o| *o == StallOutcome::Pending));
        assert_eq!(tracker.observe(2), StallOutcome::Reached);
    }

    #[test]
    fn test_target_zero_reached_on_empty_set() {
        let mut tracker = StallTracker::new(0, 10);
        assert_eq!(tracker.observe(0), StallOutcome::Reached);
    }
}
