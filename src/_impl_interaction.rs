use crate::{Interaction, LevelState, VariableId};
use std::cmp::Ordering;

impl Interaction {
    /// The variable whose next value this interaction computes.
    pub fn target(&self) -> VariableId {
        self.target
    }

    /// Positions which push the target towards its upper bound.
    pub fn activators(&self) -> &[VariableId] {
        &self.activators
    }

    /// Positions which push the target towards its lower bound.
    pub fn inhibitors(&self) -> &[VariableId] {
        &self.inhibitors
    }

    /// The target's domain, copied here so the enumeration counters do not
    /// need to consult the variable table.
    pub fn bounds(&self) -> (i32, i32) {
        (self.lower_bound, self.upper_bound)
    }

    /// The smallest position among the target and all of its dependencies.
    pub fn minimum_dependency(&self) -> VariableId {
        self.minimum_dependency
    }

    /// **(internal)** Combine activator and inhibitor inputs into a desired
    /// direction of change. Positive means "towards the upper bound", negative
    /// "towards the lower bound", zero "towards neutral".
    fn desired_direction(&self, state: &LevelState) -> i32 {
        let activation = self.activators.iter().map(|a| state[*a]).max();
        let inhibition = self.inhibitors.iter().map(|i| state[*i]).max();
        match (activation, inhibition) {
            // Without inhibitors, the strongest activator decides. A variable
            // with no dependencies at all follows its own current value.
            (activation, None) => activation.unwrap_or_else(|| state[self.target]),
            // Without activators, the strongest inhibitor decides, negated.
            (None, Some(inhibition)) => -inhibition,
            // Conflicting or absent signals cancel to neutral.
            (Some(activation), Some(inhibition)) => {
                if activation > 0 && inhibition <= 0 {
                    activation
                } else if inhibition > 0 && activation <= 0 {
                    -inhibition
                } else {
                    0
                }
            }
        }
    }

    /// Compute the next value of the target under the given state.
    ///
    /// The value moves at most one unit per step towards the desired
    /// direction, saturating at the target's bounds. A neutral direction
    /// decays a nonzero value one step towards zero.
    pub fn next_value(&self, state: &LevelState) -> i32 {
        let current = state[self.target];
        match self.desired_direction(state).cmp(&0) {
            Ordering::Greater => {
                if current < self.upper_bound {
                    current + 1
                } else {
                    current
                }
            }
            Ordering::Less => {
                if current > self.lower_bound {
                    current - 1
                } else {
                    current
                }
            }
            Ordering::Equal => current - current.signum(),
        }
    }

    /// True iff the interaction does not want to change the target under the
    /// given state.
    pub fn is_stable(&self, state: &LevelState) -> bool {
        self.next_value(state) == state[self.target]
    }
}

#[cfg(test)]
mod tests {
    use crate::{LevelState, TrinaryNetwork};

    /// **(test)** A three-variable network exercising all branches of the
    /// combination rule: `A` has no dependencies, `B` is only promoted,
    /// `C` is promoted by `A` and inhibited by `B`.
    fn build_test_network() -> TrinaryNetwork {
        let model = r"
            A B C
            3 3 3
            -1 -1 -1
            A =
            B = A PROMOTES
            C = A PROMOTES B INHIBITS
        ";
        TrinaryNetwork::try_from_post_string(model).unwrap()
    }

    fn state_of(network: &TrinaryNetwork, line: &str) -> LevelState {
        network.parse_state(line).unwrap()
    }

    #[test]
    fn self_persistence_without_dependencies() {
        let network = build_test_network();
        let a = network.find_variable("A").unwrap();
        let interaction = network.get_interaction(a);
        for line in ["-1 0 0", "0 0 0", "1 0 0"] {
            let state = state_of(&network, line);
            assert_eq!(state[a], interaction.next_value(&state));
            assert!(interaction.is_stable(&state));
        }
    }

    #[test]
    fn promotion_moves_gradually_and_saturates() {
        let network = build_test_network();
        let b = network.find_variable("B").unwrap();
        let interaction = network.get_interaction(b);
        // A high, B low: B climbs one unit per step.
        assert_eq!(0, interaction.next_value(&state_of(&network, "1 -1 0")));
        assert_eq!(1, interaction.next_value(&state_of(&network, "1 0 0")));
        // Already at the upper bound: saturate.
        assert_eq!(1, interaction.next_value(&state_of(&network, "1 1 0")));
    }

    #[test]
    fn neutral_signal_decays_towards_zero() {
        let network = build_test_network();
        let b = network.find_variable("B").unwrap();
        let interaction = network.get_interaction(b);
        // A neutral: a displaced B decays one step towards zero.
        assert_eq!(0, interaction.next_value(&state_of(&network, "0 1 0")));
        assert_eq!(0, interaction.next_value(&state_of(&network, "0 -1 0")));
        assert_eq!(0, interaction.next_value(&state_of(&network, "0 0 0")));
    }

    #[test]
    fn inhibition_negates_and_conflict_cancels() {
        let network = build_test_network();
        let c = network.find_variable("C").unwrap();
        let interaction = network.get_interaction(c);
        // Only the inhibitor is active: C is pushed down.
        assert_eq!(-1, interaction.next_value(&state_of(&network, "0 1 0")));
        // Only the activator is active: C is pushed up.
        assert_eq!(1, interaction.next_value(&state_of(&network, "1 -1 0")));
        // Both active: the signals cancel and C decays.
        assert_eq!(0, interaction.next_value(&state_of(&network, "1 1 1")));
        // An inhibited inhibitor does not push C anywhere.
        assert_eq!(0, interaction.next_value(&state_of(&network, "0 -1 0")));
    }
}
