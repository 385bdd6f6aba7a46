use crate::clocked::ClockedDynamics;
use crate::{LevelState, TrinaryNetwork};
use std::io::Write;

impl TrinaryNetwork {
    /// Export the clocked transitions of the given states to a `.dot`
    /// digraph, one `"from" -> "to";` edge per successor.
    ///
    /// States are rendered as their original-order text form, so the graph
    /// can be cross-referenced with saved state files.
    pub fn write_clocked_dot<W: Write>(
        &self,
        clocked: &ClockedDynamics,
        states: &[LevelState],
        out: &mut W,
    ) -> Result<(), std::io::Error> {
        writeln!(out, "digraph G {{")?;
        writeln!(out, "overlap=scalexy;")?;
        for state in states {
            for successor in clocked.successors(state) {
                writeln!(
                    out,
                    "\"{}\" -> \"{}\";",
                    self.state_to_string(state),
                    self.state_to_string(&successor)
                )?;
            }
        }
        writeln!(out, "}}")?;
        Ok(())
    }
}
