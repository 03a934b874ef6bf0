#[cfg(test)]
use rand::{distributions::Standard, prelude::Distribution, Rng};

use crate::matcher::MatchTokens;
use crate::model::Nargs;

pub(crate) type OffsetValue = (usize, String);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum Bound {
    Range(u8, u8),
    Lower(u8),
    // Everything from here on, taken literally.
    Remainder,
}

impl From<Nargs> for Bound {
    fn from(value: Nargs) -> Self {
        match value {
            Nargs::Precisely(n) => Bound::Range(n, n),
            Nargs::Optional => Bound::Range(0, 1),
            Nargs::Any => Bound::Lower(0),
            Nargs::AtLeastOne => Bound::Lower(1),
            Nargs::Remainder => Bound::Remainder,
        }
    }
}

impl Bound {
    pub(crate) fn minimum(&self) -> usize {
        match self {
            Bound::Range(n, _) | Bound::Lower(n) => *n as usize,
            Bound::Remainder => 0,
        }
    }

    pub(crate) fn maximum(&self) -> Option<usize> {
        match self {
            Bound::Range(_, n) => Some(*n as usize),
            Bound::Lower(_) | Bound::Remainder => None,
        }
    }
}

#[cfg(test)]
impl Distribution<Bound> for Standard {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Bound {
        match rng.gen_range(0..3) {
            0 => {
                let upper: u8 = rng.gen();

                if upper == 0 {
                    Bound::Range(0, upper)
                } else {
                    Bound::Range(rng.gen_range(0..upper), upper)
                }
            }
            1 => Bound::Lower(rng.gen()),
            2 => Bound::Remainder,
            _ => unreachable!("internal error - impossible gen_range()"),
        }
    }
}

#[derive(Debug, Clone)]
pub(crate) struct ArgumentConfig {
    id: usize,
    bound: Bound,
}

impl ArgumentConfig {
    pub(crate) fn new(id: usize, bound: Bound) -> Self {
        Self { id, bound }
    }

    pub(crate) fn id(&self) -> usize {
        self.id
    }

    pub(crate) fn bound(&self) -> Bound {
        self.bound
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct OptionConfig {
    id: usize,
    flags: Vec<String>,
    bound: Bound,
}

impl OptionConfig {
    pub(crate) fn new(id: usize, flags: Vec<String>, bound: Bound) -> Self {
        Self { id, flags, bound }
    }

    pub(crate) fn id(&self) -> usize {
        self.id
    }

    pub(crate) fn flags(&self) -> &[String] {
        &self.flags
    }

    /// The name used to refer to this option in error messages (ex: `-f/--flag`).
    pub(crate) fn name(&self) -> String {
        self.flags.join("/")
    }

    pub(crate) fn bound(&self) -> Bound {
        self.bound
    }
}

#[derive(Debug, PartialEq, Eq)]
pub(crate) struct Matches {
    pub values: Vec<MatchTokens>,
    pub unrecognized: Vec<OffsetValue>,
}
