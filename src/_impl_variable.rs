use crate::Variable;
use std::fmt::{Display, Error, Formatter};

impl Display for Variable {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), Error> {
        write!(f, "{}", self.name)
    }
}

impl Variable {
    /// Human-readable name of this variable.
    pub fn get_name(&self) -> &String {
        &self.name
    }

    /// The smallest value this variable can take.
    pub fn lower_bound(&self) -> i32 {
        self.lower_bound
    }

    /// The largest value this variable can take.
    pub fn upper_bound(&self) -> i32 {
        self.upper_bound
    }

    /// The number of values in this variable's domain.
    pub fn domain_size(&self) -> usize {
        (self.upper_bound - self.lower_bound + 1) as usize
    }
}
