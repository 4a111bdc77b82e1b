//!
//! Sequences
//!
//! A sequence is a forward-only stream of values of one element type.
//! Iteration follows a small state machine:
//!
//!   Unstarted --get_iterator--> Positioned --next (end)--> Exhausted
//!   any state --reset--> Unstarted
//!
//! `next` on an exhausted sequence keeps returning `None`. Materialized
//! sources can be rewound any number of times and yield the same elements
//! again; streaming sources are single pass, so rewinding one that has
//! already produced elements is a fault.
//!

use std::collections::VecDeque;

use crate::error::{Result, SqlError};
use crate::status::{NOT_ENOUGH_MEMORY, SQL_INVALID_STATE};
use crate::types::Type;
use crate::value::Value;

pub trait SequenceSource: Send {
    fn next(&mut self) -> Result<Option<Value>>;
    /// Return to the first element.
    fn rewind(&mut self) -> Result<()>;
    /// Total number of elements, buffering at most `limit` of them.
    fn count(&mut self, limit: usize) -> Result<usize>;
    fn fork(&self) -> Result<Option<Box<dyn SequenceSource>>>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeqState {
    Unstarted,
    Positioned,
    Exhausted,
}

pub struct Sequence {
    elem_type: Type,
    state: SeqState,
    source: Box<dyn SequenceSource>,
}

impl std::fmt::Debug for Sequence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Sequence")
            .field("elem_type", &self.elem_type)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

impl Sequence {
    pub fn new(elem_type: Type, source: Box<dyn SequenceSource>) -> Self {
        Self {
            elem_type,
            state: SeqState::Unstarted,
            source,
        }
    }

    /// Reproducible sequence over values that are already resident.
    pub fn materialized(elem_type: Type, items: Vec<Value>) -> Self {
        Self::new(elem_type, Box::new(VecSource::new(items)))
    }

    /// Single-pass sequence pulling from an iterator, which may be unbounded.
    pub fn streaming<I>(elem_type: Type, iter: I) -> Self
    where
        I: Iterator<Item = Value> + Send + 'static,
    {
        Self::new(elem_type, Box::new(IterSource::new(Box::new(iter))))
    }

    pub fn elem_type(&self) -> Type {
        self.elem_type
    }

    pub fn state(&self) -> SeqState {
        self.state
    }

    pub fn get_iterator(&mut self) -> Result<()> {
        if self.state != SeqState::Unstarted {
            self.source.rewind()?;
        }
        self.state = SeqState::Positioned;
        Ok(())
    }

    pub fn reset(&mut self) -> Result<()> {
        self.source.rewind()?;
        self.state = SeqState::Unstarted;
        Ok(())
    }

    pub fn next(&mut self) -> Result<Option<Value>> {
        match self.state {
            SeqState::Unstarted => Err(SqlError::fault(
                SQL_INVALID_STATE,
                "sequence iterator has not been obtained",
            )),
            SeqState::Exhausted => Ok(None),
            SeqState::Positioned => {
                let item = self.source.next()?;
                if item.is_none() {
                    self.state = SeqState::Exhausted;
                }
                Ok(item)
            }
        }
    }

    pub fn count(&mut self, limit: usize) -> Result<usize> {
        self.source.count(limit)
    }

    pub fn try_clone(&self) -> Result<Sequence> {
        match self.source.fork()? {
            Some(source) => Ok(Sequence::new(self.elem_type, source)),
            None => Err(SqlError::fault(
                SQL_INVALID_STATE,
                "streaming sequence cannot be copied",
            )),
        }
    }
}

pub struct VecSource {
    items: Vec<Value>,
    pos: usize,
}

impl VecSource {
    pub fn new(items: Vec<Value>) -> Self {
        Self { items, pos: 0 }
    }
}

impl SequenceSource for VecSource {
    fn next(&mut self) -> Result<Option<Value>> {
        let Some(item) = self.items.get(self.pos) else {
            return Ok(None);
        };
        let item = item.try_clone()?;
        self.pos += 1;
        Ok(Some(item))
    }

    fn rewind(&mut self) -> Result<()> {
        self.pos = 0;
        Ok(())
    }

    fn count(&mut self, _limit: usize) -> Result<usize> {
        Ok(self.items.len())
    }

    fn fork(&self) -> Result<Option<Box<dyn SequenceSource>>> {
        let items = self
            .items
            .iter()
            .map(Value::try_clone)
            .collect::<Result<Vec<_>>>()?;
        Ok(Some(Box::new(VecSource::new(items))))
    }
}

pub struct IterSource {
    iter: Box<dyn Iterator<Item = Value> + Send>,
    buffered: VecDeque<Value>,
    consumed: usize,
    drained: bool,
}

impl IterSource {
    pub fn new(iter: Box<dyn Iterator<Item = Value> + Send>) -> Self {
        Self {
            iter,
            buffered: VecDeque::new(),
            consumed: 0,
            drained: false,
        }
    }
}

impl SequenceSource for IterSource {
    fn next(&mut self) -> Result<Option<Value>> {
        let item = match self.buffered.pop_front() {
            Some(item) => Some(item),
            None if self.drained => None,
            None => self.iter.next(),
        };
        if item.is_some() {
            self.consumed += 1;
        }
        Ok(item)
    }

    fn rewind(&mut self) -> Result<()> {
        if self.consumed == 0 {
            return Ok(());
        }
        Err(SqlError::fault(
            SQL_INVALID_STATE,
            "streaming sequence cannot be rewound",
        ))
    }

    fn count(&mut self, limit: usize) -> Result<usize> {
        while !self.drained {
            if self.consumed + self.buffered.len() >= limit {
                return Err(SqlError::fault(
                    NOT_ENOUGH_MEMORY,
                    format!("sequence has more than {limit} elements"),
                ));
            }
            match self.iter.next() {
                Some(item) => self.buffered.push_back(item),
                None => self.drained = true,
            }
        }
        Ok(self.consumed + self.buffered.len())
    }

    fn fork(&self) -> Result<Option<Box<dyn SequenceSource>>> {
        Ok(None)
    }
}
