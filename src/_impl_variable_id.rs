use crate::VariableId;
use std::fmt::{Display, Error, Formatter};

impl VariableId {
    /// Convert this id into a plain `usize` position.
    pub fn to_index(self) -> usize {
        self.0
    }
}

impl From<usize> for VariableId {
    fn from(val: usize) -> Self {
        VariableId(val)
    }
}

impl From<VariableId> for usize {
    fn from(value: VariableId) -> Self {
        value.0
    }
}

impl Display for VariableId {
    fn fmt(&self, f: &mut Formatter) -> Result<(), Error> {
        write!(f, "NetVariable({})", self.0)
    }
}
