use crate::{
    Interaction, InteractionIterator, LevelState, TrinaryNetwork, Variable, VariableId,
    VariableIdIterator,
};
use fxhash::{FxHashMap, FxHashSet};
use rand::rngs::StdRng;
use rand::Rng;
use std::io::Write;
use std::ops::Index;
use std::path::Path;

/// **(internal)** One interaction as read from a source file, before names are
/// resolved to storage positions. Both parsers produce these and hand them to
/// `TrinaryNetwork::from_temps`.
pub(crate) struct InteractionTemp {
    pub name: String,
    pub activators: Vec<String>,
    pub inhibitors: Vec<String>,
    pub lower_bound: i32,
    pub upper_bound: i32,
}

impl InteractionTemp {
    /// **(internal)** Every name this interaction references: the target
    /// first, then activators, then inhibitors. May contain repeats.
    fn dependency_names(&self) -> impl Iterator<Item = &String> {
        std::iter::once(&self.name)
            .chain(self.activators.iter())
            .chain(self.inhibitors.iter())
    }
}

/// Methods for building `TrinaryNetwork`s. The per-format parsing lives in
/// `_post_parser` and `_csv_parser`; both end up here.
impl TrinaryNetwork {
    /// Read a network from the given file path.
    ///
    /// Files with a `.csv` extension are read as the legacy interaction
    /// matrix; everything else is read as the primary "post" format.
    pub fn try_from_file<T: AsRef<Path>>(path: T) -> Result<TrinaryNetwork, String> {
        let path: &Path = path.as_ref();
        let is_csv = path.extension().and_then(|it| it.to_str()) == Some("csv");
        match std::fs::read_to_string(path) {
            Ok(content) => {
                if is_csv {
                    Self::try_from_csv_string(content.as_str())
                } else {
                    Self::try_from_post_string(content.as_str())
                }
            }
            Err(e) => Err(format!("File not readable: {}", e)),
        }
    }

    /// **(internal)** Resolve parsed interactions into a finished network.
    ///
    /// Runs the dependency reordering, converts names to storage positions,
    /// computes `minimum_dependency` for every interaction, and records the
    /// source-file column order for I/O.
    pub(crate) fn from_temps(temps: Vec<InteractionTemp>) -> Result<TrinaryNetwork, String> {
        if temps.is_empty() {
            return Err("Model declares no variables.".to_string());
        }
        let mut declared = FxHashSet::default();
        for temp in &temps {
            if !declared.insert(temp.name.as_str()) {
                return Err(format!("Two interaction lines for `{}`.", temp.name));
            }
        }
        // Every dependency must have an interaction line of its own, otherwise
        // the reordering below would hand out more positions than variables.
        for temp in &temps {
            for name in temp.dependency_names() {
                if !declared.contains(name.as_str()) {
                    return Err(format!(
                        "Variable `{}` depends on `{}`, which has no interaction line of its own.",
                        temp.name, name
                    ));
                }
            }
        }

        let position_of = reorganize(&temps);

        let length = temps.len();
        let mut variables = vec![None; length];
        let mut placed = Vec::with_capacity(length);
        let mut original_order = Vec::with_capacity(length);
        for temp in &temps {
            let target = VariableId(position_of[&temp.name]);
            original_order.push(target);
            variables[target.0] = Some(Variable {
                name: temp.name.clone(),
                lower_bound: temp.lower_bound,
                upper_bound: temp.upper_bound,
            });

            let activators: Vec<VariableId> = temp
                .activators
                .iter()
                .map(|name| VariableId(position_of[name]))
                .collect();
            let inhibitors: Vec<VariableId> = temp
                .inhibitors
                .iter()
                .map(|name| VariableId(position_of[name]))
                .collect();
            let minimum_dependency = activators
                .iter()
                .chain(inhibitors.iter())
                .fold(target, |min, dep| std::cmp::min(min, *dep));
            placed.push(Interaction {
                target,
                activators,
                inhibitors,
                lower_bound: temp.lower_bound,
                upper_bound: temp.upper_bound,
                minimum_dependency,
            });
        }
        placed.sort_by_key(|interaction| interaction.target);

        let variables: Vec<Variable> = variables
            .into_iter()
            .enumerate()
            .map(|(position, variable)| match variable {
                Some(variable) => variable,
                None => panic!("Reordering left position {} without a variable.", position),
            })
            .collect();
        let variable_to_index = variables
            .iter()
            .enumerate()
            .map(|(i, variable)| (variable.name.clone(), VariableId(i)))
            .collect::<FxHashMap<_, _>>();

        Ok(TrinaryNetwork {
            variables,
            interactions: placed,
            variable_to_index,
            original_order,
        })
    }
}

/// **(internal)** Assign storage positions to variable names.
///
/// Repeatedly takes the interaction with the fewest not-yet-placed name
/// dependencies (declaration order breaks ties) and hands its unplaced
/// dependency set the highest still-unused positions. Tightly-coupled small
/// dependency sets therefore end up rooted high, which is what lets the
/// steady-state scan skip whole sub-ranges of low positions at once.
fn reorganize(temps: &[InteractionTemp]) -> FxHashMap<String, usize> {
    let mut position_of: FxHashMap<String, usize> = FxHashMap::default();
    let mut next_position = temps.len();
    let mut remaining: Vec<usize> = (0..temps.len()).collect();
    while !remaining.is_empty() {
        let mut pick = 0;
        let mut fewest = usize::MAX;
        for (slot, row) in remaining.iter().enumerate() {
            let unplaced = temps[*row]
                .dependency_names()
                .filter(|name| !position_of.contains_key(name.as_str()))
                .collect::<FxHashSet<_>>()
                .len();
            if unplaced < fewest {
                fewest = unplaced;
                pick = slot;
            }
        }
        let row = remaining.remove(pick);
        for name in temps[row].dependency_names() {
            if !position_of.contains_key(name) {
                next_position -= 1;
                position_of.insert(name.clone(), next_position);
            }
        }
    }
    position_of
}

/// Basic utility methods for inspecting a `TrinaryNetwork`.
impl TrinaryNetwork {
    /// The number of variables in this network.
    pub fn num_vars(&self) -> usize {
        self.variables.len()
    }

    /// Return an iterator over all variable ids of this network.
    pub fn variables(&self) -> VariableIdIterator {
        (0..self.variables.len()).map(VariableId)
    }

    /// Return an iterator over all interactions, in storage order.
    pub fn interactions(&self) -> InteractionIterator {
        self.interactions.iter()
    }

    /// Find a `VariableId` for the given name, or `None` if the variable
    /// does not exist.
    pub fn find_variable(&self, name: &str) -> Option<VariableId> {
        self.variable_to_index.get(name).cloned()
    }

    /// Return a `Variable` corresponding to the given `VariableId`.
    pub fn get_variable(&self, id: VariableId) -> &Variable {
        &self.variables[id.0]
    }

    /// Shorthand for `self.get_variable(id).get_name()`.
    pub fn get_variable_name(&self, id: VariableId) -> &String {
        &self.variables[id.0].name
    }

    /// The interaction controlling the variable at the given position.
    pub fn get_interaction(&self, id: VariableId) -> &Interaction {
        let interaction = &self.interactions[id.0];
        if interaction.target != id {
            panic!(
                "Interaction filed under position {} has target {}.",
                id, interaction.target
            );
        }
        interaction
    }

    /// Source-file column order: `original_order()[column]` is the storage
    /// position of the variable declared in that column.
    pub fn original_order(&self) -> &[VariableId] {
        &self.original_order
    }
}

/// The transition relations of a `TrinaryNetwork`. The clocked relation lives
/// in the `clocked` module because it carries extra configuration.
impl TrinaryNetwork {
    /// Apply every interaction simultaneously against the same snapshot,
    /// producing the unique synchronous successor.
    pub fn synchronous_successor(&self, state: &LevelState) -> LevelState {
        LevelState::new(
            self.interactions
                .iter()
                .map(|interaction| interaction.next_value(state))
                .collect(),
        )
    }

    /// One successor per interaction which wants to change its target,
    /// each differing from `state` in exactly that one position.
    ///
    /// The result is empty iff `state` is a steady state.
    pub fn asynchronous_successors(&self, state: &LevelState) -> Vec<LevelState> {
        let mut successors = Vec::new();
        for interaction in &self.interactions {
            let next = interaction.next_value(state);
            if next != state[interaction.target] {
                let mut successor = state.clone();
                successor.set(interaction.target, next);
                successors.push(successor);
            }
        }
        successors
    }

    /// True iff no interaction wants to change its target.
    pub fn is_steady_state(&self, state: &LevelState) -> bool {
        self.interactions
            .iter()
            .all(|interaction| interaction.is_stable(state))
    }

    /// The state with every variable at its lower bound (the first state of
    /// the mixed-radix enumeration order).
    pub fn lower_bound_state(&self) -> LevelState {
        LevelState::new(self.variables.iter().map(|v| v.lower_bound).collect())
    }

    /// Sample a state uniformly from the cross product of all variable
    /// domains, using the shared generator.
    pub fn random_state(&self, random: &mut StdRng) -> LevelState {
        LevelState::new(
            self.variables
                .iter()
                .map(|v| random.gen_range(v.lower_bound..=v.upper_bound))
                .collect(),
        )
    }
}

/// Text I/O for states, in the original source-file column order.
impl TrinaryNetwork {
    /// Write the variable names, in original order, as a header line.
    pub fn write_header<W: Write>(&self, out: &mut W) -> Result<(), std::io::Error> {
        let names: Vec<&str> = self
            .original_order
            .iter()
            .map(|id| self.variables[id.0].name.as_str())
            .collect();
        writeln!(out, "{}", names.join(" "))
    }

    /// Render a state as one line of space-separated signed integers, in
    /// original order. The inverse of `parse_state`.
    pub fn state_to_string(&self, state: &LevelState) -> String {
        let values: Vec<String> = self
            .original_order
            .iter()
            .map(|id| state[*id].to_string())
            .collect();
        values.join(" ")
    }

    /// Write a state as one line, in original order.
    pub fn write_state<W: Write>(
        &self,
        state: &LevelState,
        out: &mut W,
    ) -> Result<(), std::io::Error> {
        writeln!(out, "{}", self.state_to_string(state))
    }

    /// Parse a state from one line of space-separated integers in original
    /// order, validating the token count and the variable bounds.
    pub fn parse_state(&self, line: &str) -> Result<LevelState, String> {
        let tokens: Vec<&str> = line.split_whitespace().collect();
        if tokens.len() != self.num_vars() {
            return Err(format!(
                "Expected {} state values, found {}.",
                self.num_vars(),
                tokens.len()
            ));
        }
        let mut values = vec![0; self.num_vars()];
        for (column, token) in tokens.iter().enumerate() {
            let value: i32 = token
                .parse()
                .map_err(|_| format!("`{}` is not a valid state value.", token))?;
            let id = self.original_order[column];
            let variable = &self.variables[id.0];
            if value < variable.lower_bound || value > variable.upper_bound {
                return Err(format!(
                    "Value {} of `{}` is outside its domain [{}, {}].",
                    value, variable.name, variable.lower_bound, variable.upper_bound
                ));
            }
            values[id.0] = value;
        }
        Ok(LevelState::new(values))
    }
}

/// Allow indexing `TrinaryNetwork` using `VariableId` objects.
impl Index<VariableId> for TrinaryNetwork {
    type Output = Variable;

    fn index(&self, index: VariableId) -> &Self::Output {
        self.get_variable(index)
    }
}

#[cfg(test)]
pub mod tests {
    use crate::{LevelState, TrinaryNetwork};
    use fxhash::FxHashSet;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    /// **(test)** A dependency chain: `A` feeds `B`, `B` feeds `C`.
    pub fn build_chain_network() -> TrinaryNetwork {
        let model = r"
            A B C
            3 3 3
            -1 -1 -1
            A =
            B = A PROMOTES
            C = B PROMOTES
        ";
        TrinaryNetwork::try_from_post_string(model).unwrap()
    }

    /// **(test)** Two mutually-inhibiting variables; the synchronous dynamics
    /// toggle between the two "opposite corner" states.
    pub fn build_toggle_network() -> TrinaryNetwork {
        let model = r"
            A B
            3 3
            -1 -1
            A = B INHIBITS
            B = A INHIBITS
        ";
        TrinaryNetwork::try_from_post_string(model).unwrap()
    }

    /// **(test)** Enumerate the full state space of a small network.
    pub fn all_states(network: &TrinaryNetwork) -> Vec<LevelState> {
        let mut states = Vec::new();
        let mut current = network.lower_bound_state();
        loop {
            states.push(current.clone());
            let mut position = 0;
            loop {
                if position >= network.num_vars() {
                    return states;
                }
                let id = crate::VariableId::from(position);
                let variable = network.get_variable(id);
                if current[id] == variable.upper_bound() {
                    current.set(id, variable.lower_bound());
                    position += 1;
                } else {
                    let next = current[id] + 1;
                    current.set(id, next);
                    break;
                }
            }
        }
    }

    #[test]
    fn reordering_covers_all_positions() {
        let network = build_chain_network();
        let positions: FxHashSet<usize> = network.variables().map(|id| id.to_index()).collect();
        assert_eq!((0..3).collect::<FxHashSet<_>>(), positions);
        // On a dependency chain, every position is the root of exactly one
        // interaction.
        let roots: FxHashSet<usize> = network
            .interactions()
            .map(|i| i.minimum_dependency().to_index())
            .collect();
        assert_eq!((0..3).collect::<FxHashSet<_>>(), roots);
    }

    #[test]
    fn reordering_places_loose_interactions_high() {
        let network = build_chain_network();
        // `A` has the smallest dependency set, so the greedy pass places it
        // first, at the top of the ordering.
        let a = network.find_variable("A").unwrap();
        assert_eq!(2, a.to_index());
    }

    #[test]
    fn synchronous_successor_is_idempotent_at_fixed_points() {
        let network = build_chain_network();
        for state in all_states(&network) {
            if network.is_steady_state(&state) {
                assert_eq!(state, network.synchronous_successor(&state));
            }
        }
    }

    #[test]
    fn asynchronous_successors_empty_iff_steady() {
        let network = build_toggle_network();
        for state in all_states(&network) {
            let successors = network.asynchronous_successors(&state);
            assert_eq!(network.is_steady_state(&state), successors.is_empty());
            // Every successor differs in exactly one position.
            for successor in &successors {
                let differences = state
                    .values()
                    .iter()
                    .zip(successor.values())
                    .filter(|(a, b)| a != b)
                    .count();
                assert_eq!(1, differences);
            }
        }
    }

    #[test]
    fn state_text_round_trip() {
        let network = build_chain_network();
        for state in all_states(&network) {
            let line = network.state_to_string(&state);
            assert_eq!(state, network.parse_state(&line).unwrap());
        }
        assert!(network.parse_state("1 0").is_err());
        assert!(network.parse_state("1 0 2").is_err());
        assert!(network.parse_state("1 0 x").is_err());
    }

    #[test]
    fn random_states_respect_bounds() {
        let network = build_chain_network();
        let mut random = StdRng::seed_from_u64(17);
        for _ in 0..100 {
            let state = network.random_state(&mut random);
            for id in network.variables() {
                let variable = network.get_variable(id);
                assert!(state[id] >= variable.lower_bound());
                assert!(state[id] <= variable.upper_bound());
            }
        }
    }
}
