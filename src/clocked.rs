//! The semi-synchronous "clocked" transition relation.
//!
//! One designated variable acts as a phase clock splitting the network into a
//! "brain" partition and everything else. While the clock is in brain phase,
//! only brain variables may update; otherwise only non-brain variables may.
//! When every update pending in a state belongs to the inactive phase, the
//! clock itself flips, deferring those updates to the next phase.

use crate::{LevelState, TrinaryNetwork, VariableId};
use fxhash::FxHashSet;

/// The clocked transition relation of a `TrinaryNetwork`.
///
/// Constructed from variable *names* so the partition can be checked against
/// the network. The clock variable never updates through its own interaction;
/// it only moves through the phase flip.
pub struct ClockedDynamics<'a> {
    network: &'a TrinaryNetwork,
    clock: VariableId,
    brain: FxHashSet<VariableId>,
}

impl<'a> ClockedDynamics<'a> {
    /// Resolve the clock and the brain partition against the network.
    ///
    /// Returns `Err` if any of the names is not a network variable.
    pub fn new(
        network: &'a TrinaryNetwork,
        clock_name: &str,
        brain_names: &[&str],
    ) -> Result<ClockedDynamics<'a>, String> {
        let clock = network
            .find_variable(clock_name)
            .ok_or(format!("Unknown clock variable `{}`.", clock_name))?;
        let mut brain = FxHashSet::default();
        for name in brain_names {
            let id = network
                .find_variable(name)
                .ok_or(format!("Unknown brain variable `{}`.", name))?;
            brain.insert(id);
        }
        Ok(ClockedDynamics {
            network,
            clock,
            brain,
        })
    }

    pub fn network(&self) -> &'a TrinaryNetwork {
        self.network
    }

    pub fn clock(&self) -> VariableId {
        self.clock
    }

    /// True iff the clock indicates brain phase in the given state.
    pub fn is_brain_phase(&self, state: &LevelState) -> bool {
        state[self.clock] > 0
    }

    /// All clocked successors of the given state.
    ///
    /// Like the asynchronous relation, but restricted to the partition the
    /// clock currently activates. If only inactive-phase variables want to
    /// change, the single successor flips the clock to the opposite extreme
    /// of its domain. The result is empty iff no non-clock variable wants to
    /// change.
    pub fn successors(&self, state: &LevelState) -> Vec<LevelState> {
        let brain_phase = self.is_brain_phase(state);
        let mut successors = Vec::new();
        let mut deferred = false;
        for interaction in self.network.interactions() {
            let target = interaction.target();
            if target == self.clock {
                continue;
            }
            let next = interaction.next_value(state);
            if next == state[target] {
                continue;
            }
            if self.brain.contains(&target) == brain_phase {
                let mut successor = state.clone();
                successor.set(target, next);
                successors.push(successor);
            } else {
                deferred = true;
            }
        }
        if successors.is_empty() && deferred {
            let variable = self.network.get_variable(self.clock);
            let flipped = if brain_phase {
                variable.lower_bound()
            } else {
                variable.upper_bound()
            };
            // A clock with a degenerate domain cannot flip; such a state is
            // simply stuck.
            if flipped != state[self.clock] {
                let mut successor = state.clone();
                successor.set(self.clock, flipped);
                successors.push(successor);
            }
        }
        successors
    }
}

#[cfg(test)]
mod tests {
    use crate::clocked::ClockedDynamics;
    use crate::TrinaryNetwork;

    /// **(test)** `SW` is a free-running phase clock, `B` is a brain variable
    /// promoted by the non-brain variable `X`, and `X` is inhibited by `B`.
    fn build_clocked_network() -> TrinaryNetwork {
        let model = r"
            SW B X
            3 3 3
            -1 -1 -1
            SW =
            B = X PROMOTES
            X = B INHIBITS
        ";
        TrinaryNetwork::try_from_post_string(model).unwrap()
    }

    #[test]
    fn unknown_names_are_rejected() {
        let network = build_clocked_network();
        assert!(ClockedDynamics::new(&network, "SW", &["B", "Y"]).is_err());
        assert!(ClockedDynamics::new(&network, "CLK", &["B"]).is_err());
    }

    #[test]
    fn only_active_phase_variables_update() {
        let network = build_clocked_network();
        let clocked = ClockedDynamics::new(&network, "SW", &["SW", "B"]).unwrap();

        // Brain phase (SW = 1): X = 1 wants to pull B up, B = 1 wants to push
        // X down. Only the brain update of B may fire.
        let state = network.parse_state("1 0 1").unwrap();
        assert!(clocked.is_brain_phase(&state));
        let successors = clocked.successors(&state);
        assert_eq!(1, successors.len());
        assert_eq!(network.parse_state("1 1 1").unwrap(), successors[0]);

        // Same levels in non-brain phase: only the X update may fire.
        let state = network.parse_state("-1 0 1").unwrap();
        assert!(!clocked.is_brain_phase(&state));
        let successors = clocked.successors(&state);
        assert_eq!(1, successors.len());
        assert_eq!(network.parse_state("-1 0 0").unwrap(), successors[0]);
    }

    #[test]
    fn clock_flips_when_only_cross_phase_updates_pend() {
        let network = build_clocked_network();
        let clocked = ClockedDynamics::new(&network, "SW", &["SW", "B"]).unwrap();

        // Brain phase, B already follows X, but X still wants to drop: the
        // only pending update is cross-phase, so the clock flips low.
        let state = network.parse_state("1 1 1").unwrap();
        let successors = clocked.successors(&state);
        assert_eq!(1, successors.len());
        assert_eq!(network.parse_state("-1 1 1").unwrap(), successors[0]);
    }

    #[test]
    fn fully_stable_states_have_no_successors() {
        let network = build_clocked_network();
        let clocked = ClockedDynamics::new(&network, "SW", &["SW", "B"]).unwrap();
        // B follows X = 0 and X is free of pressure; nothing wants to change.
        let state = network.parse_state("1 0 0").unwrap();
        assert!(clocked.successors(&state).is_empty());
    }
}
