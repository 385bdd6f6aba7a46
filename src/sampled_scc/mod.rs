//! Sampled discovery of strongly connected components of the clocked
//! transition relation.
//!
//! One `sample` runs an iterative Tarjan search from a pseudo-random state
//! and stops as soon as the first component completes, the search runs into a
//! component found by an earlier sample, or the explored-state budget is
//! exhausted. Repeating the sampling many times builds occurrence statistics
//! over the discovered components.

use crate::clocked::ClockedDynamics;
use crate::LevelState;
use fxhash::FxHashMap;
use log::{debug, info, warn};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use std::io::Write;

/// **(internal)** One frame of the explicit Tarjan stack.
struct Frame {
    state: LevelState,
    /// Discovery index of this state.
    index: usize,
    /// The smallest discovery index reachable from this frame.
    low_link: usize,
    /// Successors not yet explored, in randomized order.
    unsearched: Vec<LevelState>,
}

impl Frame {
    fn new(
        state: LevelState,
        index: usize,
        clocked: &ClockedDynamics,
        random: &mut StdRng,
    ) -> Frame {
        let mut unsearched = clocked.successors(&state);
        unsearched.shuffle(random);
        Frame {
            state,
            index,
            low_link: index,
            unsearched,
        }
    }
}

/// Repeated randomized Tarjan searches over the clocked relation, bounded by
/// `stack_limit` explored states per search.
pub struct SampledSccFinder<'a> {
    clocked: ClockedDynamics<'a>,
    stack_limit: usize,
    /// Every component discovered so far, in discovery order.
    components: Vec<Vec<LevelState>>,
    /// How often each component has been (re-)encountered across samples.
    occurrences: Vec<usize>,
    /// Membership index over all component states.
    state_in_component: FxHashMap<LevelState, usize>,
}

impl<'a> SampledSccFinder<'a> {
    pub fn new(clocked: ClockedDynamics<'a>, stack_limit: usize) -> SampledSccFinder<'a> {
        SampledSccFinder {
            clocked,
            stack_limit,
            components: Vec::new(),
            occurrences: Vec::new(),
            state_in_component: FxHashMap::default(),
        }
    }

    /// The number of distinct components discovered so far.
    pub fn num_components(&self) -> usize {
        self.components.len()
    }

    /// How often each component has been encountered.
    pub fn occurrences(&self) -> &[usize] {
        &self.occurrences
    }

    /// Run one search from a fresh pseudo-random state. Returns `true` iff a
    /// previously unknown component was discovered.
    pub fn sample(&mut self, random: &mut StdRng) -> bool {
        let start = self.clocked.network().random_state(random);
        self.tarjan(start, random)
    }

    /// **(internal)** One bounded iterative Tarjan run.
    fn tarjan(&mut self, start: LevelState, random: &mut StdRng) -> bool {
        // A start inside a known component is a re-encounter, not a find.
        if let Some(component) = self.state_in_component.get(&start) {
            self.occurrences[*component] += 1;
            return false;
        }

        let mut state_to_frame: FxHashMap<LevelState, usize> = FxHashMap::default();
        let mut frames: Vec<Frame> = Vec::new();
        let mut recursion: Vec<usize> = Vec::new();

        state_to_frame.insert(start.clone(), 0);
        frames.push(Frame::new(start, 0, &self.clocked, random));
        recursion.push(0);
        let mut next_index = 1;

        while let Some(top) = recursion.last().copied() {
            if frames[top].unsearched.is_empty() {
                // All successors explored. A frame that cannot reach above
                // itself roots a completed component: everything discovered
                // after it (still on the frame stack) belongs to it.
                if frames[top].low_link == frames[top].index {
                    let component: Vec<LevelState> =
                        frames[top..].iter().map(|f| f.state.clone()).collect();
                    if component.len() > 1 {
                        info!("multi-state component of size {}", component.len());
                    }
                    let id = self.components.len();
                    for state in &component {
                        self.state_in_component.insert(state.clone(), id);
                    }
                    self.components.push(component);
                    self.occurrences.push(1);
                    return true;
                }
                recursion.pop();
                continue;
            }

            // Peek the next successor; it is only popped once its low-link
            // has been folded into this frame.
            let next = match frames[top].unsearched.last() {
                Some(next) => next.clone(),
                None => unreachable!("non-empty successor list was just checked"),
            };
            if let Some(known) = state_to_frame.get(&next).copied() {
                let low_link = frames[known].low_link;
                let frame = &mut frames[top];
                frame.low_link = frame.low_link.min(low_link);
                frame.unsearched.pop();
            } else if let Some(component) = self.state_in_component.get(&next) {
                // Ran into a component discovered by an earlier sample;
                // nothing new can be learned from this walk.
                self.occurrences[*component] += 1;
                return false;
            } else {
                if next_index >= self.stack_limit {
                    warn!(
                        "search abandoned: {} states explored (stack limit)",
                        next_index
                    );
                    return false;
                }
                state_to_frame.insert(next.clone(), next_index);
                frames.push(Frame::new(next, next_index, &self.clocked, random));
                recursion.push(next_index);
                next_index += 1;
                if next_index % 10_000 == 0 {
                    debug!("explored {} states", next_index);
                }
            }
        }

        // The root frame always completes as a component before the
        // recursion stack can drain.
        panic!("Tarjan recursion stack drained without completing a component.");
    }

    /// Write every discovered component to `out`: its occurrence count, then
    /// its states.
    pub fn write_report<W: Write>(&self, out: &mut W) -> Result<(), std::io::Error> {
        let network = self.clocked.network();
        for (component, occurrences) in self.components.iter().zip(self.occurrences.iter()) {
            writeln!(out, "{}", occurrences)?;
            for state in component {
                network.write_state(state, out)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::clocked::ClockedDynamics;
    use crate::sampled_scc::SampledSccFinder;
    use crate::TrinaryNetwork;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    /// **(test)** Every variable keeps its own value, so every state is a
    /// terminal singleton component.
    fn build_frozen_network() -> TrinaryNetwork {
        let model = r"
            SW A
            3 3
            -1 -1
            SW =
            A =
        ";
        TrinaryNetwork::try_from_post_string(model).unwrap()
    }

    #[test]
    fn frozen_network_yields_singleton_components() {
        let network = build_frozen_network();
        let clocked = ClockedDynamics::new(&network, "SW", &["SW"]).unwrap();
        let mut finder = SampledSccFinder::new(clocked, 1_000);
        let mut random = StdRng::seed_from_u64(3);

        for _ in 0..200 {
            finder.sample(&mut random);
        }
        // At most 9 distinct states exist, so memory stays bounded no matter
        // how many samples run.
        assert!(finder.num_components() <= 9);
        assert!(finder.num_components() >= 1);
        for component in &finder.components {
            assert_eq!(1, component.len());
        }
        // 200 samples are accounted for: every run either found a new
        // component or bumped an existing counter.
        let total: usize = finder.occurrences().iter().sum();
        assert_eq!(200, total);
    }

    #[test]
    fn oscillator_finds_a_multi_state_component() {
        // While the clock is high, `B` is promoted by `SW` but inhibited by
        // itself, so it toggles between 0 and 1 forever; the brain phase
        // traps the search inside a genuine two-state component.
        let model = r"
            SW B X
            3 3 3
            -1 -1 -1
            SW =
            B = SW PROMOTES B INHIBITS
            X = SW INHIBITS
        ";
        let network = TrinaryNetwork::try_from_post_string(model).unwrap();
        let clocked = ClockedDynamics::new(&network, "SW", &["B"]).unwrap();
        let mut finder = SampledSccFinder::new(clocked, 10_000);
        let mut random = StdRng::seed_from_u64(11);

        for _ in 0..300 {
            finder.sample(&mut random);
        }
        assert!(finder.num_components() >= 1);
        assert!(finder
            .components
            .iter()
            .any(|component| component.len() > 1));
        // Every multi-state component really is closed under the relation.
        for component in finder.components.iter().filter(|c| c.len() > 1) {
            for state in component {
                for successor in finder.clocked.successors(state) {
                    assert!(component.contains(&successor));
                }
            }
        }

        let mut buffer: Vec<u8> = Vec::new();
        finder.write_report(&mut buffer).unwrap();
        assert!(!buffer.is_empty());
    }

    #[test]
    fn stack_limit_spares_the_start_state() {
        let network = build_frozen_network();
        let clocked = ClockedDynamics::new(&network, "SW", &["SW"]).unwrap();
        let mut finder = SampledSccFinder::new(clocked, 0);
        let mut random = StdRng::seed_from_u64(7);
        // With no successors at all, the start state still completes as a
        // singleton; the limit only applies to discovering *more* states.
        assert!(finder.sample(&mut random));
    }

    #[test]
    fn stack_limit_abandons_without_reporting() {
        let model = r"
            SW B
            3 3
            -1 -1
            SW =
            B = SW PROMOTES B INHIBITS
        ";
        let network = TrinaryNetwork::try_from_post_string(model).unwrap();
        let clocked = ClockedDynamics::new(&network, "SW", &["B"]).unwrap();
        let mut finder = SampledSccFinder::new(clocked, 1);
        let mut random = StdRng::seed_from_u64(7);
        // The start has a successor, so the run must stop at the one-state
        // budget and leave no component behind.
        let start = network.parse_state("1 0").unwrap();
        assert!(!finder.tarjan(start, &mut random));
        assert_eq!(0, finder.num_components());
    }
}
