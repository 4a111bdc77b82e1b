///
/// Owned value references.
///
/// A `ValueRef` pairs a value with the allocator that must release it.
/// Releasing consumes the reference, so a value cannot be released twice
/// through the same `ValueRef`. A reference dropped without being released
/// or handed off with `into_raw` is logged as a leak.
///

use tracing::warn;

use crate::error::Result;
use crate::store::{AllocatorId, Store, ValueHandle};

#[must_use = "a ValueRef must be released or handed off with into_raw"]
#[derive(Debug)]
pub struct ValueRef {
    allocator: Option<AllocatorId>,
    value: ValueHandle,
    armed: bool,
}

impl ValueRef {
    pub fn new(allocator: Option<AllocatorId>, value: ValueHandle) -> Self {
        Self {
            allocator,
            value,
            armed: allocator.is_some(),
        }
    }

    /// `None` for the shared constants, which need no release.
    pub fn allocator(&self) -> Option<AllocatorId> {
        self.allocator
    }

    pub fn value(&self) -> ValueHandle {
        self.value
    }

    pub fn release(mut self, store: &mut Store) -> Result<()> {
        self.armed = false;
        match self.allocator {
            Some(allocator) => store.release(allocator, self.value),
            None => Ok(()),
        }
    }

    /// Give up ownership tracking, typically to hand the pair to a foreign
    /// caller who becomes responsible for the release.
    pub fn into_raw(mut self) -> (Option<AllocatorId>, ValueHandle) {
        self.armed = false;
        (self.allocator, self.value)
    }

    /// Run `f` with the value, then release it whatever `f` returned.
    pub fn scoped<T>(
        self,
        store: &mut Store,
        f: impl FnOnce(&mut Store, ValueHandle) -> Result<T>,
    ) -> Result<T> {
        let value = self.value;
        let result = f(store, value);
        let released = self.release(store);
        let out = result?;
        released?;
        Ok(out)
    }
}

impl Drop for ValueRef {
    fn drop(&mut self) {
        if self.armed {
            warn!(
                allocator = self.allocator.map(AllocatorId::as_raw),
                value = self.value.as_raw(),
                "value reference dropped without release"
            );
        }
    }
}
