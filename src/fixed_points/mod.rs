//! Exhaustive enumeration of the steady states of a `TrinaryNetwork`.
//!
//! The state space is the mixed-radix cross product of all variable domains
//! and is never materialized. The enumerator walks it with an incremental
//! stability tracker: for every position it knows how many interactions
//! *rooted* there (by `minimum_dependency`) are currently unstable, so whole
//! sub-ranges of positions with no unstable interaction can be skipped in one
//! step ("hyperplane pruning") instead of being cycled through exhaustively.

use crate::{LevelState, TrinaryNetwork, VariableId};
use fxhash::FxHashSet;
use log::{debug, info};
use std::io::Write;

/// Exhaustively enumerates steady states, streaming them to an output sink.
///
/// The enumerator owns its transient search state (the live `reference`
/// candidate and the stability aggregates) and can be dropped after one
/// `enumerate` call.
pub struct FixedPointEnumerator<'a> {
    network: &'a TrinaryNetwork,
    /// Position -> targets whose stability depends on it (self included).
    affects_of: Vec<Vec<VariableId>>,
    /// The live enumeration candidate.
    reference: LevelState,
    /// 0/1 per target: does its interaction currently want a change?
    target_unstable: Vec<i32>,
    /// Per position: count of unstable interactions whose
    /// `minimum_dependency` is that position.
    bin_unstable: Vec<i32>,
    /// Sum of all bins; zero iff `reference` is a steady state.
    total_unstable: i32,
}

impl<'a> FixedPointEnumerator<'a> {
    pub fn new(network: &'a TrinaryNetwork) -> FixedPointEnumerator<'a> {
        let length = network.num_vars();
        let mut affects_of: Vec<FxHashSet<VariableId>> = vec![FxHashSet::default(); length];
        for interaction in network.interactions() {
            for activator in interaction.activators() {
                affects_of[activator.to_index()].insert(interaction.target());
            }
            for inhibitor in interaction.inhibitors() {
                affects_of[inhibitor.to_index()].insert(interaction.target());
            }
            // A target changing affects its own stability.
            affects_of[interaction.target().to_index()].insert(interaction.target());
        }
        let affects_of: Vec<Vec<VariableId>> = affects_of
            .into_iter()
            .map(|targets| {
                let mut targets: Vec<VariableId> = targets.into_iter().collect();
                targets.sort();
                targets
            })
            .collect();

        let mut enumerator = FixedPointEnumerator {
            network,
            affects_of,
            reference: network.lower_bound_state(),
            target_unstable: vec![0; length],
            bin_unstable: vec![0; length],
            total_unstable: 0,
        };
        enumerator.rebuild_unstable();
        enumerator
    }

    /// The candidate state the enumeration currently examines.
    pub fn reference(&self) -> &LevelState {
        &self.reference
    }

    /// True iff the current `reference` is a steady state.
    pub fn reference_is_steady(&self) -> bool {
        self.total_unstable == 0
    }

    /// **(internal)** Recompute all aggregates from scratch. Only used at
    /// initialization; every later update goes through `make_move`.
    fn rebuild_unstable(&mut self) {
        let length = self.network.num_vars();
        self.target_unstable = vec![0; length];
        self.bin_unstable = vec![0; length];
        self.total_unstable = 0;
        for interaction in self.network.interactions() {
            let unstable = i32::from(!interaction.is_stable(&self.reference));
            self.target_unstable[interaction.target().to_index()] = unstable;
            self.bin_unstable[interaction.minimum_dependency().to_index()] += unstable;
            self.total_unstable += unstable;
        }
    }

    /// **(internal)** Set `reference[position] = value` and apply the signed
    /// stability delta of every interaction that references `position`.
    /// O(degree of the position), never a full rescan.
    fn make_move(&mut self, position: VariableId, value: i32) {
        self.reference.set(position, value);
        for affected in &self.affects_of[position.to_index()] {
            let interaction = self.network.get_interaction(*affected);
            let unstable = i32::from(!interaction.is_stable(&self.reference));
            let delta = unstable - self.target_unstable[affected.to_index()];
            self.bin_unstable[interaction.minimum_dependency().to_index()] += delta;
            self.total_unstable += delta;
            self.target_unstable[affected.to_index()] = unstable;
        }
    }

    /// **(internal)** Advance the mixed-radix counter starting at `index`:
    /// positions at their upper bound reset and carry upwards. Returns the
    /// position where the carry stopped; `num_vars` means the counter
    /// overflowed and the enumeration is complete.
    fn advance(&mut self, mut index: usize) -> usize {
        let length = self.network.num_vars();
        loop {
            let id = VariableId::from(index);
            let (lower, upper) = self.network.get_interaction(id).bounds();
            if self.reference[id] != upper {
                break;
            }
            self.make_move(id, lower);
            index += 1;
            if index >= length {
                return index;
            }
        }
        let id = VariableId::from(index);
        let value = self.reference[id] + 1;
        self.make_move(id, value);
        index
    }

    /// Visit the whole state space and write every steady state to `out`,
    /// followed by a `# Count:` line. Returns the number of steady states.
    pub fn enumerate<W: Write>(&mut self, out: &mut W) -> Result<usize, std::io::Error> {
        let length = self.network.num_vars();
        self.reference = self.network.lower_bound_state();
        self.rebuild_unstable();

        self.network.write_header(out)?;
        let mut count = 0;
        let mut index = length - 1;
        let mut milestone = 0;
        loop {
            if self.total_unstable == 0 {
                self.network.write_state(&self.reference, out)?;
                count += 1;
            }
            // Hyperplane pruning: positions with no unstable interaction
            // rooted at them cannot invalidate any lower assignment, so the
            // scan jumps straight down to the next position that matters.
            while index > 0 && self.bin_unstable[index] == 0 {
                index -= 1;
            }
            index = self.advance(index);
            if index >= length {
                break;
            }
            if index >= milestone {
                milestone = index + 1;
                debug!("enumeration carry reached position {}", index);
            }
        }
        writeln!(out, "# Count: {}", count)?;
        info!("enumeration complete, {} steady states", count);
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use crate::_impl_trinary_network::tests::{all_states, build_chain_network};
    use crate::fixed_points::FixedPointEnumerator;
    use crate::TrinaryNetwork;
    use pretty_assertions::assert_eq;

    /// **(test)** Steady states of a small network by brute force.
    fn brute_force_steady_states(network: &TrinaryNetwork) -> Vec<String> {
        all_states(network)
            .into_iter()
            .filter(|state| network.is_steady_state(state))
            .map(|state| network.state_to_string(&state))
            .collect()
    }

    /// **(test)** Steady states as reported by the enumerator.
    fn enumerated_steady_states(network: &TrinaryNetwork) -> Vec<String> {
        let mut buffer: Vec<u8> = Vec::new();
        let count = FixedPointEnumerator::new(network)
            .enumerate(&mut buffer)
            .unwrap();
        let text = String::from_utf8(buffer).unwrap();
        let states: Vec<String> = text
            .lines()
            .skip(1) // header
            .filter(|line| !line.starts_with('#'))
            .map(|line| line.to_string())
            .collect();
        assert_eq!(count, states.len());
        states
    }

    fn assert_same_states(mut left: Vec<String>, mut right: Vec<String>) {
        left.sort();
        right.sort();
        assert_eq!(left, right);
    }

    #[test]
    fn promotes_pair_matches_brute_force() {
        // `A` free, `B` promoted by `A`: 9 states, of which those where `B`
        // already follows `A`'s level are steady.
        let model = "A B\n3 3\n-1 -1\nA =\nB = A PROMOTES\n";
        let network = TrinaryNetwork::try_from_post_string(model).unwrap();
        let expected = brute_force_steady_states(&network);
        assert_eq!(3, expected.len());
        assert_same_states(expected, enumerated_steady_states(&network));
    }

    #[test]
    fn chain_matches_brute_force() {
        let network = build_chain_network();
        assert_same_states(
            brute_force_steady_states(&network),
            enumerated_steady_states(&network),
        );
    }

    #[test]
    fn five_variable_model_matches_brute_force() {
        let model = r"
            A B C D E
            3 3 3 3 2
            -1 -1 -1 -1 0
            A = B INHIBITS
            B = A INHIBITS E PROMOTES
            C = A PROMOTES B INHIBITS
            D = C PROMOTES D PROMOTES
            E = D INHIBITS
        ";
        let network = TrinaryNetwork::try_from_post_string(model).unwrap();
        assert_same_states(
            brute_force_steady_states(&network),
            enumerated_steady_states(&network),
        );
    }

    #[test]
    fn tracker_matches_definition_on_every_move() {
        let network = build_chain_network();
        let mut enumerator = FixedPointEnumerator::new(&network);
        // Drive the reference through a few hand-picked moves and check the
        // aggregate against the definition after each one.
        let moves: [(usize, i32); 6] = [(0, 1), (1, -1), (2, 1), (0, 0), (2, -1), (1, 1)];
        for (position, value) in moves {
            enumerator.make_move(crate::VariableId::from(position), value);
            assert_eq!(
                network.is_steady_state(enumerator.reference()),
                enumerator.reference_is_steady()
            );
            let total: i32 = enumerator.bin_unstable.iter().sum();
            assert_eq!(total, enumerator.total_unstable);
        }
    }
}
