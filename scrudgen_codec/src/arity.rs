use serde::{Deserialize, Serialize};
use std::fmt;

use crate::UnsupportedArity;

/// Number of components in a composite identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "usize", into = "usize")]
pub enum Arity {
    Two,
    Three,
    Four,
}

impl Arity {
    pub const MIN: usize = 2;
    pub const MAX: usize = 4;

    pub const fn get(self) -> usize {
        match self {
            Arity::Two => 2,
            Arity::Three => 3,
            Arity::Four => 4,
        }
    }
}

impl TryFrom<usize> for Arity {
    type Error = UnsupportedArity;

    fn try_from(value: usize) -> Result<Self, Self::Error> {
        match value {
            2 => Ok(Arity::Two),
            3 => Ok(Arity::Three),
            4 => Ok(Arity::Four),
            n => Err(UnsupportedArity(n)),
        }
    }
}

impl From<Arity> for usize {
    fn from(arity: Arity) -> Self {
        arity.get()
    }
}

impl fmt::Display for Arity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.get())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_try_from_bounds() {
        assert_eq!(Arity::try_from(1), Err(UnsupportedArity(1)));
        assert_eq!(Arity::try_from(2), Ok(Arity::Two));
        assert_eq!(Arity::try_from(4), Ok(Arity::Four));
        assert_eq!(Arity::try_from(5), Err(UnsupportedArity(5)));
    }

    #[test]
    fn test_get_matches_bounds() {
        assert_eq!(Arity::Two.get(), Arity::MIN);
        assert_eq!(Arity::Four.get(), Arity::MAX);
    }
}
