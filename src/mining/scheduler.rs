//! Miner scheduling
//!
//! Simulates Proof of Elapsed Time with a lottery: each participant draws a
//! wait value uniformly from `[1, n²]` and proposers are ordered by
//! increasing draw. Equal draws fall back to identity order, so a seeded
//! generator always yields the same order for the same registry.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Strategy producing the proposer order for one mining cycle
pub trait MinerScheduler: Send + Sync {
    /// Order `participants` by who proposes first
    fn assign_order(&mut self, participants: &[String]) -> Vec<String>;
}

/// Randomized PoET-style lottery
#[derive(Debug)]
pub struct PoetLottery {
    rng: StdRng,
}

impl PoetLottery {
    /// Lottery seeded from OS entropy
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    /// Reproducible lottery
    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Draw a wait value for every participant, in input order
    pub fn draw(&mut self, participants: &[String]) -> Vec<(u64, String)> {
        let n = participants.len() as u64;
        let upper = n.saturating_mul(n).max(1);

        participants
            .iter()
            .map(|p| (self.rng.gen_range(1..=upper), p.clone()))
            .collect()
    }
}

impl Default for PoetLottery {
    fn default() -> Self {
        Self::new()
    }
}

impl MinerScheduler for PoetLottery {
    fn assign_order(&mut self, participants: &[String]) -> Vec<String> {
        let mut draws = self.draw(participants);
        draws.sort();

        log::debug!("PoET draws: {:?}", draws);

        draws.into_iter().map(|(_, identity)| identity).collect()
    }
}

/// Deterministic scheduler returning a preset order
///
/// Identities in the preset that are not registered are skipped; registered
/// identities missing from the preset follow in registry order.
#[derive(Debug, Clone, Default)]
pub struct FixedOrder {
    order: Vec<String>,
}

impl FixedOrder {
    pub fn new<I, S>(order: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            order: order.into_iter().map(Into::into).collect(),
        }
    }
}

impl MinerScheduler for FixedOrder {
    fn assign_order(&mut self, participants: &[String]) -> Vec<String> {
        let mut result: Vec<String> = self
            .order
            .iter()
            .filter(|id| participants.contains(id))
            .cloned()
            .collect();

        for id in participants {
            if !result.contains(id) {
                result.push(id.clone());
            }
        }

        result
    }
}
