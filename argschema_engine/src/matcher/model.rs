use thiserror::Error;

use crate::matcher::api::*;

#[derive(Debug, PartialEq, Eq, Hash)]
pub(crate) struct MatchTokens {
    pub id: usize,
    pub offset: usize,
    pub values: Vec<OffsetValue>,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub(super) enum CloseError {
    #[error("too few values provided for '{name}' (provided={provided}, expected={expected}).")]
    TooFewValues {
        name: String,
        bound: Bound,
        provided: usize,
        expected: usize,
    },
}

#[derive(Debug)]
pub(super) struct MatchBuffer {
    id: usize,
    name: String,
    bound: Bound,
    offset: usize,
    values: Vec<OffsetValue>,
}

impl MatchBuffer {
    pub(super) fn new(id: usize, name: impl Into<String>, bound: Bound, offset: usize) -> Self {
        Self {
            id,
            name: name.into(),
            bound,
            offset,
            values: Vec::default(),
        }
    }

    pub(super) fn push(&mut self, offset: usize, value: String) {
        self.values.push((offset, value));
    }

    pub(super) fn is_open(&self) -> bool {
        match self.bound.maximum() {
            Some(n) => self.values.len() < n,
            None => true,
        }
    }

    /// Whether the buffer takes every following token, regardless of what it looks like.
    pub(super) fn is_literal(&self) -> bool {
        self.bound == Bound::Remainder
    }

    pub(super) fn can_close(&self) -> bool {
        self.values.len() >= self.bound.minimum()
    }

    pub(super) fn close(self) -> Result<MatchTokens, CloseError> {
        if !self.can_close() {
            return Err(CloseError::TooFewValues {
                provided: self.values.len(),
                expected: self.bound.minimum(),
                name: self.name,
                bound: self.bound,
            });
        }

        Ok(MatchTokens {
            id: self.id,
            offset: self.offset,
            values: self.values,
        })
    }
}
