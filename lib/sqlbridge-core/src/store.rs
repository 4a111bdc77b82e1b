//!
//! Allocator Store
//!
//! Every value handed across the boundary lives in a slot of the store and
//! is owned by exactly one allocator. Handles are generational: the upper
//! 32 bits carry the slot generation and the lower 32 bits the slot index.
//! Releasing a value bumps its slot generation, so a second release or a
//! later read through the old handle is reported as a stale handle instead
//! of touching reused memory.
//!
//! Slot 0 is never used (handle 0 means "no value"). Slots 1..=3 hold the
//! Null, false and true constants. They have no owner, are never freed,
//! and releasing them is a no-op.
//!
//! Allocators come in three kinds. Standalone allocators are created and
//! destroyed by the caller. Transaction and database allocators are
//! retired by the engine when the transaction completes or the database
//! closes; destroying them directly is an invalid operation.
//!

use std::collections::{HashMap, HashSet};

use tracing::{debug, trace, warn};

use crate::config::Config;
use crate::error::{Result, SqlError};
use crate::types::Type;
use crate::value::Value;
use crate::value_ref::ValueRef;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AllocatorId(u64);

impl AllocatorId {
    pub fn as_raw(self) -> u64 {
        self.0
    }

    /// `None` for the reserved raw value 0.
    pub fn from_raw(raw: u64) -> Option<Self> {
        (raw != 0).then_some(Self(raw))
    }
}

impl std::fmt::Display for AllocatorId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AllocatorKind {
    Standalone,
    Transaction,
    Database,
}

#[repr(transparent)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ValueHandle(u64);

const FIRST_DYNAMIC_SLOT: u32 = 4;

impl ValueHandle {
    pub const NONE: ValueHandle = ValueHandle(0);
    pub const NULL: ValueHandle = ValueHandle(1);
    pub const FALSE: ValueHandle = ValueHandle(2);
    pub const TRUE: ValueHandle = ValueHandle(3);

    fn new(index: u32, generation: u32) -> Self {
        Self(((generation as u64) << 32) | index as u64)
    }

    pub fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    pub fn as_raw(self) -> u64 {
        self.0
    }

    pub fn boolean(b: bool) -> Self {
        if b { Self::TRUE } else { Self::FALSE }
    }

    pub fn is_none(self) -> bool {
        self == Self::NONE
    }

    pub fn is_constant(self) -> bool {
        matches!(self, Self::NULL | Self::FALSE | Self::TRUE)
    }

    fn index(self) -> usize {
        (self.0 & 0xffff_ffff) as usize
    }

    fn generation(self) -> u32 {
        (self.0 >> 32) as u32
    }
}

struct Entry {
    owner: Option<AllocatorId>,
    value: Value,
}

struct Slot {
    generation: u32,
    entry: Option<Entry>,
}

struct Arena {
    kind: AllocatorKind,
    owned: HashSet<usize>,
}

pub struct Store {
    slots: Vec<Slot>,
    free: Vec<usize>,
    arenas: HashMap<AllocatorId, Arena>,
    next_allocator: u64,
    track_releases: bool,
    materialize_limit: usize,
}

impl Default for Store {
    fn default() -> Self {
        Self::new(&Config::default())
    }
}

impl Store {
    pub fn new(config: &Config) -> Self {
        let constant = |value| Slot {
            generation: 0,
            entry: Some(Entry { owner: None, value }),
        };
        let slots = vec![
            Slot {
                generation: 0,
                entry: None,
            },
            constant(Value::Null),
            constant(Value::Bool(false)),
            constant(Value::Bool(true)),
        ];
        Self {
            slots,
            free: Vec::new(),
            arenas: HashMap::new(),
            next_allocator: 1,
            track_releases: config.ownership.track_releases,
            materialize_limit: config.sequence.materialize_limit,
        }
    }

    pub fn apply_config(&mut self, config: &Config) {
        self.track_releases = config.ownership.track_releases;
        self.materialize_limit = config.sequence.materialize_limit;
    }

    // Allocators

    pub fn create_allocator(&mut self, kind: AllocatorKind) -> AllocatorId {
        let id = AllocatorId(self.next_allocator);
        self.next_allocator += 1;
        self.arenas.insert(
            id,
            Arena {
                kind,
                owned: HashSet::new(),
            },
        );
        debug!(allocator = id.0, ?kind, "allocator created");
        id
    }

    /// Destroy a standalone allocator and every value it still owns.
    pub fn destroy_allocator(&mut self, id: AllocatorId) -> Result<usize> {
        let kind = self.allocator_kind(id)?;
        if kind != AllocatorKind::Standalone {
            return Err(SqlError::invalid_operation(format!(
                "{kind:?} allocator {id} is retired by its owner, not destroyed"
            )));
        }
        self.retire_allocator(id)
    }

    /// Drop an allocator of any kind. Returns how many values it still owned.
    pub fn retire_allocator(&mut self, id: AllocatorId) -> Result<usize> {
        let arena = self
            .arenas
            .remove(&id)
            .ok_or_else(|| unknown_allocator(id))?;
        let freed = arena.owned.len();
        for index in arena.owned {
            self.free_slot(index);
        }
        debug!(allocator = id.0, kind = ?arena.kind, freed, "allocator retired");
        Ok(freed)
    }

    pub fn allocator_kind(&self, id: AllocatorId) -> Result<AllocatorKind> {
        self.arenas
            .get(&id)
            .map(|arena| arena.kind)
            .ok_or_else(|| unknown_allocator(id))
    }

    pub fn live_values(&self, id: AllocatorId) -> Result<usize> {
        self.arenas
            .get(&id)
            .map(|arena| arena.owned.len())
            .ok_or_else(|| unknown_allocator(id))
    }

    pub fn allocator_count(&self) -> usize {
        self.arenas.len()
    }

    // Values

    /// Place a value in the store under `allocator`. Null and Bool resolve
    /// to the shared constants and are not owned.
    pub fn alloc(&mut self, allocator: AllocatorId, value: Value) -> Result<ValueHandle> {
        match value {
            Value::Null => return Ok(ValueHandle::NULL),
            Value::Bool(b) => return Ok(ValueHandle::boolean(b)),
            _ => {}
        }
        let arena = self
            .arenas
            .get_mut(&allocator)
            .ok_or_else(|| unknown_allocator(allocator))?;
        let entry = Entry {
            owner: Some(allocator),
            value,
        };
        let index = match self.free.pop() {
            Some(index) => {
                self.slots[index].entry = Some(entry);
                index
            }
            None => {
                self.slots.push(Slot {
                    generation: 1,
                    entry: Some(entry),
                });
                self.slots.len() - 1
            }
        };
        arena.owned.insert(index);
        let handle = ValueHandle::new(index as u32, self.slots[index].generation);
        trace!(allocator = allocator.0, handle = handle.0, "value allocated");
        Ok(handle)
    }

    pub fn alloc_ref(&mut self, allocator: AllocatorId, value: Value) -> Result<ValueRef> {
        let handle = self.alloc(allocator, value)?;
        let owner = self.owner(handle)?;
        Ok(ValueRef::new(owner, handle))
    }

    fn entry(&self, handle: ValueHandle) -> Result<&Entry> {
        self.slots
            .get(handle.index())
            .filter(|slot| slot.generation == handle.generation())
            .and_then(|slot| slot.entry.as_ref())
            .ok_or_else(|| stale(handle))
    }

    pub fn get(&self, handle: ValueHandle) -> Result<&Value> {
        Ok(&self.entry(handle)?.value)
    }

    pub fn get_mut(&mut self, handle: ValueHandle) -> Result<&mut Value> {
        if handle.is_constant() {
            return Err(SqlError::invalid_operation("constant values cannot be modified"));
        }
        self.slots
            .get_mut(handle.index())
            .filter(|slot| slot.generation == handle.generation())
            .and_then(|slot| slot.entry.as_mut())
            .map(|entry| &mut entry.value)
            .ok_or_else(|| stale(handle))
    }

    pub fn owner(&self, handle: ValueHandle) -> Result<Option<AllocatorId>> {
        Ok(self.entry(handle)?.owner)
    }

    fn owning_allocator(&self, handle: ValueHandle) -> Result<AllocatorId> {
        self.owner(handle)?
            .ok_or_else(|| SqlError::runtime("value is not owned by an allocator"))
    }

    pub fn release(&mut self, allocator: AllocatorId, handle: ValueHandle) -> Result<()> {
        if handle.is_constant() {
            return Ok(());
        }
        let owner = self.owning_allocator(handle)?;
        if owner != allocator {
            if self.track_releases {
                warn!(
                    allocator = allocator.0,
                    owner = owner.0,
                    handle = handle.0,
                    "release through foreign allocator rejected"
                );
                return Err(SqlError::ForeignRelease {
                    value: handle.0,
                    allocator: allocator.0,
                });
            }
            warn!(
                allocator = allocator.0,
                owner = owner.0,
                handle = handle.0,
                "release through foreign allocator"
            );
        }
        if let Some(arena) = self.arenas.get_mut(&owner) {
            arena.owned.remove(&handle.index());
        }
        self.free_slot(handle.index());
        trace!(allocator = owner.0, handle = handle.0, "value released");
        Ok(())
    }

    fn free_slot(&mut self, index: usize) {
        let slot = &mut self.slots[index];
        slot.entry = None;
        slot.generation = match slot.generation.wrapping_add(1) {
            0 => 1,
            g => g,
        };
        self.free.push(index);
    }

    /// Number of owned values across all allocators.
    pub fn live_count(&self) -> usize {
        self.slots.len() - FIRST_DYNAMIC_SLOT as usize - self.free.len()
    }

    // Compound value operations. Results are materialized in the allocator
    // that owns the source value unless one is given.

    /// Element count for arrays and sequences, byte length for strings.
    pub fn value_size(&mut self, handle: ValueHandle) -> Result<usize> {
        if matches!(self.get(handle)?, Value::Sequence(_)) {
            return self.seq_count(handle);
        }
        self.get(handle)?.size()
    }

    pub fn string_ref(&mut self, handle: ValueHandle, allocator: AllocatorId) -> Result<ValueRef> {
        let rendered = self.get(handle)?.string_value()?;
        self.alloc_ref(allocator, rendered)
    }

    pub fn binary_ref(&mut self, handle: ValueHandle, allocator: AllocatorId) -> Result<ValueRef> {
        let bytes = self.get(handle)?.binary_value()?;
        self.alloc_ref(allocator, bytes)
    }

    /// Allocator owning a value of the given kind. Wrong discriminant is an
    /// invalid operation.
    pub fn allocator_of(&self, handle: ValueHandle, expected: Type) -> Result<AllocatorId> {
        let found = self.get(handle)?.value_type();
        if found != expected {
            return Err(SqlError::invalid_operation(format!(
                "expected {expected} value, found {found}"
            )));
        }
        self.owning_allocator(handle)
    }

    pub fn array_get_at(&mut self, handle: ValueHandle, index: usize) -> Result<ValueRef> {
        let element = self.get(handle)?.as_array()?.get_at(index)?;
        let allocator = self.owning_allocator(handle)?;
        self.alloc_ref(allocator, element)
    }

    pub fn array_set_at(
        &mut self,
        handle: ValueHandle,
        index: usize,
        value: ValueHandle,
    ) -> Result<()> {
        let expected = self.get(handle)?.as_array()?.elem_type();
        let source = self.get(value)?;
        let found = source.value_type();
        if found != expected {
            return Err(SqlError::InvalidTypeCast { expected, found });
        }
        let copy = source.try_clone()?;
        self.get_mut(handle)?.as_array_mut()?.set_at(index, copy)
    }

    pub fn array_set_body(
        &mut self,
        handle: ValueHandle,
        bytes: &[u8],
        count: usize,
    ) -> Result<()> {
        self.get_mut(handle)?.as_array_mut()?.set_body(bytes, count)
    }

    pub fn seq_get_iterator(&mut self, handle: ValueHandle) -> Result<()> {
        self.get_mut(handle)?.as_sequence_mut()?.get_iterator()
    }

    pub fn seq_reset(&mut self, handle: ValueHandle) -> Result<()> {
        self.get_mut(handle)?.as_sequence_mut()?.reset()
    }

    /// Next element, owned by the sequence's allocator, or `NONE` once the
    /// sequence is exhausted.
    pub fn seq_next(&mut self, handle: ValueHandle) -> Result<ValueHandle> {
        let allocator = self.owning_allocator(handle)?;
        match self.get_mut(handle)?.as_sequence_mut()?.next()? {
            Some(item) => self.alloc(allocator, item),
            None => Ok(ValueHandle::NONE),
        }
    }

    pub fn seq_count(&mut self, handle: ValueHandle) -> Result<usize> {
        let limit = self.materialize_limit;
        self.get_mut(handle)?.as_sequence_mut()?.count(limit)
    }

    pub fn seq_elem_type(&self, handle: ValueHandle) -> Result<Type> {
        match self.get(handle)? {
            Value::Sequence(seq) => Ok(seq.elem_type()),
            other => Err(SqlError::invalid_operation(format!(
                "expected sequence value, found {}",
                other.value_type()
            ))),
        }
    }

    pub fn blob_available(&mut self, handle: ValueHandle) -> Result<usize> {
        self.get_mut(handle)?.as_blob_mut()?.available()
    }

    pub fn blob_get(&mut self, handle: ValueHandle, buf: &mut [u8]) -> Result<usize> {
        self.get_mut(handle)?.as_blob_mut()?.get(buf)
    }

    pub fn blob_reset(&mut self, handle: ValueHandle, pos: u64) -> Result<()> {
        self.get_mut(handle)?.as_blob_mut()?.reset(pos)
    }

    pub fn record_column(&mut self, handle: ValueHandle, index: usize) -> Result<ValueRef> {
        let column = self.get(handle)?.as_record()?.get(index)?;
        let allocator = self.owning_allocator(handle)?;
        self.alloc_ref(allocator, column)
    }

    pub fn record_column_name(
        &mut self,
        handle: ValueHandle,
        index: usize,
        allocator: AllocatorId,
    ) -> Result<ValueRef> {
        let name = self.get(handle)?.as_record()?.column(index)?.name.clone();
        self.alloc_ref(allocator, Value::from(name))
    }
}

fn unknown_allocator(id: AllocatorId) -> SqlError {
    SqlError::StaleHandle(format!("allocator {id} does not exist"))
}

fn stale(handle: ValueHandle) -> SqlError {
    SqlError::StaleHandle(format!("value handle {:#x} is not live", handle.0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::array::Array;
    use crate::blob::Blob;
    use crate::record::{Column, Record};
    use crate::sequence::Sequence;
    use crate::status::*;
    use std::sync::Arc;

    fn store() -> Store {
        Store::default()
    }

    #[test]
    fn test_release_exactly_once() {
        let mut store = store();
        let a = store.create_allocator(AllocatorKind::Standalone);
        let v = store.alloc(a, Value::from("hello")).unwrap();
        assert_eq!(store.live_values(a).unwrap(), 1);

        store.release(a, v).unwrap();
        assert_eq!(store.live_values(a).unwrap(), 0);

        let err = store.release(a, v).unwrap_err();
        assert_eq!(err.status(), SQL_NULL_REFERENCE);
        assert_eq!(store.get(v).unwrap_err().status(), SQL_NULL_REFERENCE);
    }

    #[test]
    fn test_reused_slot_does_not_revive_old_handle() {
        let mut store = store();
        let a = store.create_allocator(AllocatorKind::Standalone);
        let old = store.alloc(a, Value::Int(1)).unwrap();
        store.release(a, old).unwrap();
        let new = store.alloc(a, Value::Int(2)).unwrap();
        assert_ne!(old, new);
        assert!(store.get(old).is_err());
        assert_eq!(store.get(new).unwrap().int_value().unwrap(), 2);
    }

    #[test]
    fn test_constants_are_unowned() {
        let mut store = store();
        let a = store.create_allocator(AllocatorKind::Standalone);
        assert_eq!(store.alloc(a, Value::Null).unwrap(), ValueHandle::NULL);
        assert_eq!(store.alloc(a, Value::Bool(true)).unwrap(), ValueHandle::TRUE);
        assert_eq!(store.live_values(a).unwrap(), 0);
        assert_eq!(store.owner(ValueHandle::FALSE).unwrap(), None);
        store.release(a, ValueHandle::NULL).unwrap();
        store.release(a, ValueHandle::NULL).unwrap();
        assert!(store.get(ValueHandle::NULL).unwrap().is_null());
        assert!(store.get_mut(ValueHandle::TRUE).is_err());
        assert!(store.get(ValueHandle::NONE).is_err());
    }

    #[test]
    fn test_foreign_release_rejected_when_tracked() {
        let mut store = store();
        let a = store.create_allocator(AllocatorKind::Standalone);
        let b = store.create_allocator(AllocatorKind::Standalone);
        let v = store.alloc(a, Value::Int(5)).unwrap();
        let err = store.release(b, v).unwrap_err();
        assert_eq!(err.status(), INVALID_OPERATION);
        assert!(store.get(v).is_ok());
    }

    #[test]
    fn test_foreign_release_allowed_when_untracked() {
        let mut config = Config::default();
        config.ownership.track_releases = false;
        let mut store = Store::new(&config);
        let a = store.create_allocator(AllocatorKind::Standalone);
        let b = store.create_allocator(AllocatorKind::Standalone);
        let v = store.alloc(a, Value::Int(5)).unwrap();
        store.release(b, v).unwrap();
        assert_eq!(store.live_values(a).unwrap(), 0);
    }

    #[test]
    fn test_array_set_at_checks_target_before_copying() {
        let mut store = store();
        let a = store.create_allocator(AllocatorKind::Standalone);
        let text = store.alloc(a, Value::from("text")).unwrap();
        let gone = store.alloc(a, Value::Int(1)).unwrap();
        store.release(a, gone).unwrap();
        let err = store.array_set_at(text, 0, gone).unwrap_err();
        assert_eq!(err.status(), INVALID_OPERATION);

        let ints = store.alloc(a, Value::Array(Array::new(Type::Int, 1).unwrap())).unwrap();
        let seq = Sequence::streaming(Type::Int, (0..3).map(Value::Int));
        let seq = store.alloc(a, Value::Sequence(seq)).unwrap();
        let err = store.array_set_at(ints, 0, seq).unwrap_err();
        assert_eq!(err.status(), INVALID_TYPE_CAST);
        assert_eq!(store.array_set_at(ints, 0, gone).unwrap_err().status(), SQL_NULL_REFERENCE);
    }

    #[test]
    fn test_destroy_frees_owned_values() {
        let mut store = store();
        let a = store.create_allocator(AllocatorKind::Standalone);
        let v1 = store.alloc(a, Value::Int(1)).unwrap();
        let v2 = store.alloc(a, Value::from("two")).unwrap();
        assert_eq!(store.live_count(), 2);
        assert_eq!(store.destroy_allocator(a).unwrap(), 2);
        assert_eq!(store.live_count(), 0);
        assert!(store.get(v1).is_err());
        assert!(store.get(v2).is_err());
        assert!(store.alloc(a, Value::Int(3)).is_err());
        assert!(store.destroy_allocator(a).is_err());
    }

    #[test]
    fn test_engine_allocators_cannot_be_destroyed() {
        let mut store = store();
        let t = store.create_allocator(AllocatorKind::Transaction);
        let err = store.destroy_allocator(t).unwrap_err();
        assert_eq!(err.status(), INVALID_OPERATION);
        store.alloc(t, Value::Int(1)).unwrap();
        assert_eq!(store.retire_allocator(t).unwrap(), 1);
    }

    #[test]
    fn test_array_get_at_lands_in_array_allocator() {
        let mut store = store();
        let a = store.create_allocator(AllocatorKind::Standalone);
        let arr = store.alloc(a, Value::Array(Array::new(Type::Int, 3).unwrap())).unwrap();
        let elem = store.array_get_at(arr, 1).unwrap();
        assert_eq!(elem.allocator(), Some(a));
        assert_eq!(store.get(elem.value()).unwrap().value_type(), Type::Int);
        elem.release(&mut store).unwrap();
        assert_eq!(store.allocator_of(arr, Type::Array).unwrap(), a);
        assert_eq!(
            store.allocator_of(arr, Type::Sequence).unwrap_err().status(),
            INVALID_OPERATION
        );
        assert_eq!(
            store.array_get_at(arr, 3).unwrap_err().status(),
            INDEX_OUT_OF_BOUNDS
        );
    }

    #[test]
    fn test_array_set_at_copies_value() {
        let mut store = store();
        let a = store.create_allocator(AllocatorKind::Standalone);
        let arr = store.alloc(a, Value::Array(Array::new(Type::String, 1).unwrap())).unwrap();
        let s = store.alloc(a, Value::from("x")).unwrap();
        store.array_set_at(arr, 0, s).unwrap();
        store.release(a, s).unwrap();
        let elem = store.array_get_at(arr, 0).unwrap();
        assert_eq!(store.get(elem.value()).unwrap(), &Value::from("x"));
        elem.release(&mut store).unwrap();

        let ints = store.alloc(a, Value::Array(Array::new(Type::Int, 1).unwrap())).unwrap();
        let s = store.alloc(a, Value::from("y")).unwrap();
        assert_eq!(
            store.array_set_at(ints, 0, s).unwrap_err().status(),
            INVALID_TYPE_CAST
        );
    }

    #[test]
    fn test_sequence_walk_and_sentinel() {
        let mut store = store();
        let a = store.create_allocator(AllocatorKind::Standalone);
        let seq = Sequence::materialized(Type::Int, vec![Value::Int(1), Value::Int(2)]);
        let h = store.alloc(a, Value::Sequence(seq)).unwrap();
        assert_eq!(store.value_size(h).unwrap(), 2);
        assert_eq!(store.seq_count(h).unwrap(), 2);
        assert_eq!(store.seq_elem_type(h).unwrap(), Type::Int);

        store.seq_get_iterator(h).unwrap();
        let mut seen = Vec::new();
        loop {
            let item = store.seq_next(h).unwrap();
            if item.is_none() {
                break;
            }
            seen.push(store.get(item).unwrap().int_value().unwrap());
            store.release(a, item).unwrap();
        }
        assert_eq!(seen, vec![1, 2]);
        assert!(store.seq_next(h).unwrap().is_none());
        store.seq_reset(h).unwrap();
    }

    #[test]
    fn test_blob_through_store() {
        let mut store = store();
        let a = store.create_allocator(AllocatorKind::Standalone);
        let h = store.alloc(a, Value::Blob(Blob::from_bytes(vec![3u8; 100], 64))).unwrap();
        assert_eq!(store.blob_available(h).unwrap(), 64);
        let mut buf = [0u8; 40];
        let mut total = 0;
        while store.blob_available(h).unwrap() > 0 {
            total += store.blob_get(h, &mut buf).unwrap();
        }
        assert_eq!(total, 100);
        store.blob_reset(h, 0).unwrap();
        assert_eq!(store.blob_available(h).unwrap(), 64);
    }

    #[test]
    fn test_record_column() {
        let mut store = store();
        let a = store.create_allocator(AllocatorKind::Standalone);
        let other = store.create_allocator(AllocatorKind::Standalone);
        let columns: Arc<[Column]> = vec![Column::new("n", Type::Int)].into();
        let record = Record::new(columns, vec![Value::Int(9)]).unwrap();
        let h = store.alloc(a, Value::Struct(record)).unwrap();

        let col = store.record_column(h, 0).unwrap();
        assert_eq!(col.allocator(), Some(a));
        assert_eq!(store.get(col.value()).unwrap().int_value().unwrap(), 9);
        col.release(&mut store).unwrap();

        let name = store.record_column_name(h, 0, other).unwrap();
        assert_eq!(name.allocator(), Some(other));
        assert_eq!(store.get(name.value()).unwrap(), &Value::from("n"));
        name.release(&mut store).unwrap();

        assert_eq!(store.record_column(h, 1).unwrap_err().status(), RUNTIME_ERROR);
    }

    #[test]
    fn test_string_ref_into_other_allocator() {
        let mut store = store();
        let a = store.create_allocator(AllocatorKind::Standalone);
        let tmp = store.create_allocator(AllocatorKind::Standalone);
        let n = store.alloc(a, Value::numeric(12345, 2).unwrap()).unwrap();
        let s = store.string_ref(n, tmp).unwrap();
        assert_eq!(store.get(s.value()).unwrap(), &Value::from("123.45"));
        s.release(&mut store).unwrap();
        assert_eq!(store.live_values(tmp).unwrap(), 0);
    }
}
