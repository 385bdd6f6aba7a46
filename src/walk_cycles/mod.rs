//! Randomized search for cycles of the asynchronous dynamics.
//!
//! Each iteration walks randomly through asynchronous successors until a
//! state repeats, then checks that the cycle actually exercises a designated
//! tracked variable. States of valid cycles are queued for "grinding":
//! follow-up walks start directly from them to sample their neighborhood far
//! more densely than fresh random starts would.

use crate::{LevelState, TrinaryNetwork, VariableId};
use fxhash::FxHashMap;
use log::{info, warn};
use rand::rngs::StdRng;
use rand::Rng;
use std::io::Write;

/// How many follow-up walks may start from one ground state.
const GRIND_LIMIT: usize = 1_000;

/// Cycle states with fewer visits than this are left out of the ranked
/// summary.
const RANK_THRESHOLD: usize = 100;

/// Samples cycles of the asynchronous dynamics by randomized walks.
pub struct WalkCycleSampler<'a> {
    network: &'a TrinaryNetwork,
    /// The variable which must take at least two distinct values over a
    /// cycle for the cycle to count.
    tracked: VariableId,
    stack_limit: usize,
    /// All valid cycles found so far.
    cycles: Vec<Vec<LevelState>>,
    /// How often each state appeared in a valid cycle.
    seen_count: FxHashMap<LevelState, usize>,
    /// Per "from" state: how often each asynchronous successor was taken by
    /// a valid cycle. Initialized over the full successor set on first
    /// visit, so untaken edges report as explicit zeros.
    edge_frequency: FxHashMap<LevelState, FxHashMap<LevelState, usize>>,
    /// States whose neighborhood still deserves extra walks, and how many
    /// such walks each has already received.
    needs_grind: Vec<LevelState>,
    grind_count: Vec<usize>,
}

impl<'a> WalkCycleSampler<'a> {
    pub fn new(
        network: &'a TrinaryNetwork,
        tracked: VariableId,
        stack_limit: usize,
    ) -> WalkCycleSampler<'a> {
        WalkCycleSampler {
            network,
            tracked,
            stack_limit,
            cycles: Vec::new(),
            seen_count: FxHashMap::default(),
            edge_frequency: FxHashMap::default(),
            needs_grind: Vec::new(),
            grind_count: Vec::new(),
        }
    }

    /// The number of valid cycles recorded so far.
    pub fn num_cycles(&self) -> usize {
        self.cycles.len()
    }

    /// The number of states queued for grinding.
    pub fn num_pending_grinds(&self) -> usize {
        self.needs_grind.len()
    }

    /// Run one walk: from a grind state if any is pending, otherwise from a
    /// fresh random state. Records the cycle if the walk closed one and the
    /// tracked variable varies over it.
    pub fn iterate(&mut self, random: &mut StdRng) {
        let start = match self.needs_grind.last() {
            Some(state) => {
                let state = state.clone();
                let slot = self.grind_count.len() - 1;
                self.grind_count[slot] += 1;
                if self.grind_count[slot] >= GRIND_LIMIT {
                    self.grind_count.pop();
                    self.needs_grind.pop();
                }
                state
            }
            None => self.network.random_state(random),
        };

        let cycle = self.walk_until_cycle(start, random);
        if cycle.is_empty() || !self.tracked_varies(&cycle) {
            return;
        }
        self.record_edges(&cycle);
        for state in &cycle {
            let count = self.seen_count.entry(state.clone()).or_insert(0);
            *count += 1;
            if *count == 1 {
                // First sighting: queue the state for grinding.
                self.needs_grind.push(state.clone());
                self.grind_count.push(0);
            }
        }
        self.cycles.push(cycle);
    }

    /// **(internal)** Walk randomly until some state repeats; the sub-path
    /// between the two occurrences is the cycle. Empty when the walk reached
    /// a steady state or exceeded the stack limit.
    fn walk_until_cycle(&self, start: LevelState, random: &mut StdRng) -> Vec<LevelState> {
        let mut path = vec![start];
        let mut path_position: FxHashMap<LevelState, usize> = FxHashMap::default();
        loop {
            let current = &path[path.len() - 1];
            path_position.insert(current.clone(), path.len() - 1);
            let mut options = self.network.asynchronous_successors(current);
            if options.is_empty() {
                // A steady state: the walk can never close a loop.
                return Vec::new();
            }
            let choice = random.gen_range(0..options.len());
            let next = options.swap_remove(choice);
            if path.len() >= self.stack_limit {
                warn!("walk abandoned after {} states (stack limit)", path.len());
                return Vec::new();
            }
            if let Some(repeated) = path_position.get(&next).copied() {
                path.push(next);
                return path[repeated + 1..].to_vec();
            }
            path.push(next);
        }
    }

    /// **(internal)** True iff the tracked variable takes at least two
    /// distinct values over the cycle.
    fn tracked_varies(&self, cycle: &[LevelState]) -> bool {
        let first = cycle[0][self.tracked];
        cycle.iter().any(|state| state[self.tracked] != first)
    }

    /// **(internal)** Tally the transitions between consecutive cycle
    /// states. A "from" state seen for the first time gets a zeroed table
    /// over all of its asynchronous successors.
    fn record_edges(&mut self, cycle: &[LevelState]) {
        let network = self.network;
        for (i, from) in cycle.iter().enumerate() {
            let to = &cycle[(i + 1) % cycle.len()];
            let table = self.edge_frequency.entry(from.clone()).or_insert_with(|| {
                network
                    .asynchronous_successors(from)
                    .into_iter()
                    .map(|successor| (successor, 0))
                    .collect()
            });
            *table.entry(to.clone()).or_insert(0) += 1;
        }
    }

    /// Write every valid cycle to `out` followed by a `# Total found:` line;
    /// the frequency-ranked summary of heavily visited states and their
    /// out-edges goes to the log.
    pub fn write_report<W: Write>(&self, out: &mut W) -> Result<(), std::io::Error> {
        for cycle in &self.cycles {
            for state in cycle {
                self.network.write_state(state, out)?;
            }
            writeln!(out)?;
        }
        writeln!(out, "# Total found: {}", self.cycles.len())?;

        let mut ranked: Vec<(usize, &LevelState)> = self
            .seen_count
            .iter()
            .filter(|(_, count)| **count >= RANK_THRESHOLD)
            .map(|(state, count)| (*count, state))
            .collect();
        ranked.sort();
        for (count, state) in ranked {
            info!("{} visits: {}", count, self.network.state_to_string(state));
            if let Some(table) = self.edge_frequency.get(state) {
                let mut edges: Vec<(usize, &LevelState)> =
                    table.iter().map(|(to, count)| (*count, to)).collect();
                edges.sort();
                for (count, to) in edges.into_iter().rev() {
                    info!("  {} -> {}", count, self.network.state_to_string(to));
                }
            }
        }
        info!("distinct cycle states: {}", self.seen_count.len());
        Ok(())
    }
}
