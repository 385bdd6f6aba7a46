use fxhash::FxHashMap;
use lazy_static::lazy_static;
use regex::Regex;
use std::iter::Map;
use std::ops::Range;

pub mod clocked;
pub mod fixed_points;
pub mod sampled_scc;
pub mod sync_cycles;
pub mod walk_cycles;

/// **(internal)** Implements the legacy CSV interaction-matrix parser for `TrinaryNetwork`.
mod _csv_parser;
/// **(internal)** Utility methods for `Interaction`.
mod _impl_interaction;
/// **(internal)** Utility methods for `LevelState`.
mod _impl_level_state;
/// **(internal)** GraphViz export of clocked transitions.
mod _impl_network_to_dot;
/// **(internal)** Utility methods for `TrinaryNetwork`, including the transition
/// relations and the dependency reordering performed at construction.
mod _impl_trinary_network;
/// **(internal)** Utility methods for `Variable`.
mod _impl_variable;
/// **(internal)** Utility methods for `VariableId`.
mod _impl_variable_id;
/// **(internal)** Implements the "post" model-description parser for `TrinaryNetwork`.
mod _post_parser;

lazy_static! {
    /// A regex which describes valid identifiers of network variables.
    pub static ref ID_REGEX: Regex = Regex::new(r"^[a-zA-Z0-9_]+$").unwrap();
}

/// A type-safe index of a `Variable` inside a `TrinaryNetwork`.
///
/// The index refers to the *storage* ordering produced by the dependency
/// reordering which runs during network construction, not to the column order
/// of the source file. The column order is retained separately for I/O.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct VariableId(usize);

/// A variable of a `TrinaryNetwork`.
///
/// Every variable has a `name` and a bounded integer domain
/// `[lower_bound, upper_bound]`. The common case is the symmetric trinary
/// domain `{-1, 0, 1}`, but arbitrary bounded ranges are supported.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct Variable {
    name: String,
    lower_bound: i32,
    upper_bound: i32,
}

/// The rule governing the next value of one variable of a `TrinaryNetwork`.
///
/// `activators` push the target towards its upper bound, `inhibitors` towards
/// its lower bound. Each variable has exactly one interaction, stored at the
/// position of its `target`. `minimum_dependency` is the smallest position
/// referenced by the interaction (target included) and is the bin under which
/// the steady-state enumeration tracks this interaction's stability.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct Interaction {
    target: VariableId,
    activators: Vec<VariableId>,
    inhibitors: Vec<VariableId>,
    lower_bound: i32,
    upper_bound: i32,
    minimum_dependency: VariableId,
}

/// One snapshot of a network: a fixed-length vector of integer levels, one per
/// variable position, each within its variable's bounds.
///
/// Equality and hashing are value based, so two states with identical entries
/// are the same state regardless of how they were produced. All analyses use
/// `LevelState` as their map/set key.
#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct LevelState(Vec<i32>);

/// A trinary regulatory network: a set of variables with bounded integer
/// domains, plus one `Interaction` per variable.
///
/// A network is built by one of the parsers (`try_from_post_string`,
/// `try_from_csv_string`, or `try_from_file`) and is immutable afterwards.
/// It is shared by `&` reference into all analysis components.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TrinaryNetwork {
    variables: Vec<Variable>,
    interactions: Vec<Interaction>,
    variable_to_index: FxHashMap<String, VariableId>,
    /// Source-file column order: `original_order[column]` is the storage
    /// position of the variable declared in that column.
    original_order: Vec<VariableId>,
}

/// An iterator over all `VariableId`s of a `TrinaryNetwork`.
pub type VariableIdIterator = Map<Range<usize>, fn(usize) -> VariableId>;

/// An iterator over the `Interaction`s of a `TrinaryNetwork`.
pub type InteractionIterator<'a> = std::slice::Iter<'a, Interaction>;
