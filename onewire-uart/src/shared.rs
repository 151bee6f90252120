//! Mutex-owning wrapper for buses shared between threads.

use std::sync::{Mutex, MutexGuard, PoisonError};

use onewire_core::{OwResult, RomSearch, SearchKind};

use crate::{bus::UartOneWire, error::UartError, transport::UartTransport};

/// A [`UartOneWire`] behind a mutex.
///
/// Locking yields the plain bus master, so any sequence of primitives
/// (reset, match, function command, data) runs as one uninterrupted
/// transaction under a single acquisition. The enumeration conveniences
/// below hold the lock for the entire scan, visitor included.
pub struct SharedUartOneWire<T> {
    bus: Mutex<UartOneWire<T>>,
}

impl<T: UartTransport> SharedUartOneWire<T> {
    /// Wrap an initialized bus master.
    pub fn new(bus: UartOneWire<T>) -> Self {
        Self {
            bus: Mutex::new(bus),
        }
    }

    /// Exclusive access to the bus for one transaction.
    ///
    /// The handle carries no state across operations, so a lock poisoned by
    /// a panicking thread is taken over rather than propagated.
    pub fn lock(&self) -> MutexGuard<'_, UartOneWire<T>> {
        self.bus.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Enumerate the bus into `roms` without letting go of the lock.
    ///
    /// See [`RomSearch::fill`].
    pub fn search_roms(
        &self,
        kind: SearchKind,
        roms: &mut [u64],
    ) -> OwResult<usize, UartError<T::Error>> {
        let mut bus = self.lock();
        RomSearch::new(&mut *bus, kind).fill(roms)
    }

    /// Visit every ROM on the bus without letting go of the lock; the
    /// visitor runs under the lock as well.
    ///
    /// See [`RomSearch::for_each`].
    pub fn for_each_rom<F>(&self, kind: SearchKind, visit: F) -> OwResult<usize, UartError<T::Error>>
    where
        F: FnMut(Option<u64>, usize) -> OwResult<(), UartError<T::Error>>,
    {
        let mut bus = self.lock();
        RomSearch::new(&mut *bus, kind).for_each(visit)
    }

    /// Tear the wrapper down and return the inner bus master.
    pub fn into_inner(self) -> UartOneWire<T> {
        self.bus
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner)
    }
}
