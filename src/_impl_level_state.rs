use crate::{LevelState, VariableId};
use std::fmt::{Display, Error, Formatter};
use std::ops::Index;

impl LevelState {
    /// Wrap a vector of levels (one entry per variable position).
    pub fn new(values: Vec<i32>) -> LevelState {
        LevelState(values)
    }

    /// The number of variable positions in this state.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The raw level vector, in storage order.
    pub fn values(&self) -> &[i32] {
        &self.0
    }

    /// The level of the variable at the given position.
    pub fn get(&self, variable: VariableId) -> i32 {
        self.0[variable.to_index()]
    }

    /// **(internal)** Overwrite one position. States handed out by the library
    /// are immutable snapshots; this is only used while building a successor
    /// or advancing an enumeration counter.
    pub(crate) fn set(&mut self, variable: VariableId, value: i32) {
        self.0[variable.to_index()] = value;
    }
}

impl From<Vec<i32>> for LevelState {
    fn from(values: Vec<i32>) -> Self {
        LevelState(values)
    }
}

impl Index<VariableId> for LevelState {
    type Output = i32;

    fn index(&self, index: VariableId) -> &Self::Output {
        &self.0[index.to_index()]
    }
}

impl Display for LevelState {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), Error> {
        write!(f, "[")?;
        for (i, value) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, " ")?;
            }
            write!(f, "{}", value)?;
        }
        write!(f, "]")
    }
}

#[cfg(test)]
mod tests {
    use crate::{LevelState, VariableId};

    #[test]
    fn level_state_value_semantics() {
        let a = LevelState::new(vec![1, 0, -1]);
        let b = LevelState::from(vec![1, 0, -1]);
        assert_eq!(a, b);
        assert_eq!(3, a.len());
        assert_eq!(-1, a[VariableId::from(2)]);
        assert_eq!("[1 0 -1]", a.to_string());

        let mut c = a.clone();
        c.set(VariableId::from(1), 1);
        assert_ne!(a, c);
        assert_eq!(1, c.get(VariableId::from(1)));
    }
}
