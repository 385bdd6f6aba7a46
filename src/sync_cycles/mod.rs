//! Exhaustive search for cycles of the synchronous dynamics.
//!
//! Every state of the mixed-radix state space is used as a starting point.
//! Following the (deterministic) synchronous successor from any start must
//! eventually close a loop; the search records the loop once and marks all of
//! its states as known so later starts that run into them stop immediately.

use crate::{LevelState, TrinaryNetwork, VariableId};
use fxhash::{FxHashMap, FxHashSet};
use log::info;
use std::collections::hash_map::Entry;
use std::io::Write;

/// Finds every cycle of the synchronous dynamics reachable from any state.
pub struct SyncCycleFinder<'a> {
    network: &'a TrinaryNetwork,
    /// States already reported as part of some cycle.
    known_cycle: FxHashSet<LevelState>,
}

impl<'a> SyncCycleFinder<'a> {
    pub fn new(network: &'a TrinaryNetwork) -> SyncCycleFinder<'a> {
        SyncCycleFinder {
            network,
            known_cycle: FxHashSet::default(),
        }
    }

    /// The number of states known to lie on some cycle.
    pub fn num_known_states(&self) -> usize {
        self.known_cycle.len()
    }

    /// **(internal)** Plain mixed-radix increment of a starting-state
    /// counter, lowest position first. Returns `false` on overflow.
    fn increment(&self, state: &mut LevelState) -> bool {
        let mut index = 0;
        loop {
            if index >= self.network.num_vars() {
                return false;
            }
            let id = VariableId::from(index);
            let (lower, upper) = self.network.get_interaction(id).bounds();
            if state[id] == upper {
                state.set(id, lower);
                index += 1;
            } else {
                let value = state[id] + 1;
                state.set(id, value);
                return true;
            }
        }
    }

    /// Walk the synchronous dynamics from every possible starting state and
    /// write each newly discovered cycle to `out` (its length, then its
    /// states, then a blank line). Returns the number of cycles found.
    pub fn find_cycles<W: Write>(&mut self, out: &mut W) -> Result<usize, std::io::Error> {
        self.network.write_header(out)?;
        let mut cycles = 0;
        let mut counter = self.network.lower_bound_state();
        loop {
            if !self.known_cycle.contains(&counter) {
                if self.walk_from(&counter, out)? {
                    cycles += 1;
                }
            }
            if !self.increment(&mut counter) {
                break;
            }
        }
        info!("synchronous search complete, {} cycles", cycles);
        Ok(cycles)
    }

    /// **(internal)** Follow the synchronous successor from `start` until the
    /// path closes on itself (a new cycle, reported and returned as `true`)
    /// or runs into territory that needs no further work.
    fn walk_from<W: Write>(
        &mut self,
        start: &LevelState,
        out: &mut W,
    ) -> Result<bool, std::io::Error> {
        let mut path = vec![start.clone()];
        let mut path_position: FxHashMap<LevelState, usize> = FxHashMap::default();
        path_position.insert(start.clone(), 0);
        let mut current = start.clone();

        loop {
            let next = self.network.synchronous_successor(&current);
            path.push(next.clone());
            let end_of_path = path.len() - 1;
            match path_position.entry(next.clone()) {
                Entry::Occupied(entry) => {
                    // The sub-path between the two occurrences is the cycle.
                    let start_of_cycle = *entry.get();
                    writeln!(out, "{}", end_of_path - start_of_cycle)?;
                    for state in &path[start_of_cycle..end_of_path] {
                        self.network.write_state(state, out)?;
                        self.known_cycle.insert(state.clone());
                    }
                    writeln!(out)?;
                    return Ok(true);
                }
                Entry::Vacant(entry) => {
                    entry.insert(end_of_path);
                }
            }
            // Any state ordered below the start was already processed as a
            // starting state, so whatever this path leads to is already
            // reported.
            if precedes(&next, start) {
                return Ok(false);
            }
            if self.known_cycle.contains(&next) {
                return Ok(false);
            }
            current = next;
        }
    }
}

/// **(internal)** Compare two states in enumeration order: the highest
/// position is the most significant digit.
fn precedes(left: &LevelState, right: &LevelState) -> bool {
    for i in (0..left.len()).rev() {
        if left.values()[i] < right.values()[i] {
            return true;
        } else if left.values()[i] > right.values()[i] {
            return false;
        }
    }
    false
}
