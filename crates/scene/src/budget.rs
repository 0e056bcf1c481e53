//! Particle budgets: live-particle counters with a hard cap per category.

use crate::tier::TierParams;

/// Which pool a budget guards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BudgetCategory {
    Explosion,
    Splatter,
}

/// Counts live particles of one category against a cap.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParticleBudget {
    cap: usize,
    active: usize,
}

impl ParticleBudget {
    pub fn new(cap: usize) -> Self {
        Self { cap, active: 0 }
    }

    pub fn cap(&self) -> usize {
        self.cap
    }

    pub fn active(&self) -> usize {
        self.active
    }

    pub fn remaining(&self) -> usize {
        self.cap.saturating_sub(self.active)
    }

    /// How many of `requested` would be admitted right now.
    pub fn admissible(&self, requested: usize) -> usize {
        requested.min(self.remaining())
    }

    /// Admit up to `requested` particles and count them as live.
    pub fn acquire(&mut self, requested: usize) -> usize {
        let admitted = self.admissible(requested);
        self.active += admitted;
        if admitted < requested {
            log::debug!(
                "Particle budget clamped request {} -> {} ({}/{})",
                requested,
                admitted,
                self.active,
                self.cap
            );
        }
        admitted
    }

    /// Return `count` particles to the pool.
    pub fn release(&mut self, count: usize) {
        self.active = self.active.saturating_sub(count);
    }

    /// Change the cap. Live particles above a lowered cap are not evicted;
    /// new requests are refused until the count drops back under it.
    pub fn set_cap(&mut self, cap: usize) {
        self.cap = cap;
    }

    pub fn reset(&mut self) {
        self.active = 0;
    }
}

/// The budgets for every category, sized for one tier.
#[derive(Debug, Clone)]
pub struct ParticleBudgets {
    pub explosion: ParticleBudget,
    pub splatter: ParticleBudget,
}

impl ParticleBudgets {
    pub fn for_tier(params: &TierParams) -> Self {
        Self {
            explosion: ParticleBudget::new(params.explosion_cap),
            splatter: ParticleBudget::new(params.splatter_count),
        }
    }

    pub fn get(&self, category: BudgetCategory) -> &ParticleBudget {
        match category {
            BudgetCategory::Explosion => &self.explosion,
            BudgetCategory::Splatter => &self.splatter,
        }
    }

    pub fn get_mut(&mut self, category: BudgetCategory) -> &mut ParticleBudget {
        match category {
            BudgetCategory::Explosion => &mut self.explosion,
            BudgetCategory::Splatter => &mut self.splatter,
        }
    }

    pub fn retier(&mut self, params: &TierParams) {
        self.explosion.set_cap(params.explosion_cap);
        self.splatter.set_cap(params.splatter_count);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tier::DeviceTier;

    #[test]
    fn budget_clamps_to_remaining() {
        let mut b = ParticleBudget::new(1000);
        assert_eq!(b.acquire(960), 960);
        assert_eq!(b.acquire(100), 40);
        assert_eq!(b.active(), 1000);
        assert_eq!(b.acquire(5), 0);
    }

    #[test]
    fn budget_release_never_underflows() {
        let mut b = ParticleBudget::new(10);
        b.acquire(3);
        b.release(5);
        assert_eq!(b.active(), 0);
    }

    #[test]
    fn budget_lowered_cap_refuses_until_drained() {
        let mut b = ParticleBudget::new(1000);
        b.acquire(700);
        b.set_cap(500);
        assert_eq!(b.admissible(10), 0);
        b.release(250);
        assert_eq!(b.admissible(100), 50);
    }

    #[test]
    fn budgets_follow_tier_tables() {
        let budgets = ParticleBudgets::for_tier(DeviceTier::Constrained.params());
        assert_eq!(budgets.get(BudgetCategory::Explosion).cap(), 500);
        assert_eq!(budgets.get(BudgetCategory::Splatter).cap(), 50);
    }
}
