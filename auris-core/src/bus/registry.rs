//! Per-kind callback table

use super::BusError;
use crate::event::{EventKind, InterruptEvent, EVENT_KIND_COUNT};

/// Deferred event handler
///
/// Runs on the bus worker with exclusive access to the bus context.
pub type Callback<C> = fn(&mut C, &InterruptEvent);

/// One row of the registry
pub struct RegistryEntry<C> {
    kind: EventKind,
    callback: Option<Callback<C>>,
}

impl<C> RegistryEntry<C> {
    fn vacant(kind: EventKind) -> Self {
        Self {
            kind,
            callback: None,
        }
    }

    pub fn kind(&self) -> EventKind {
        self.kind
    }

    pub fn name(&self) -> &'static str {
        self.kind.name()
    }

    pub fn description(&self) -> &'static str {
        self.kind.description()
    }

    pub fn is_registered(&self) -> bool {
        self.callback.is_some()
    }
}

/// Result of a successful registration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Registration {
    /// Slot was empty
    Added,
    /// A previous callback was overwritten
    Replaced,
}

/// Maps each event kind to at most one callback
pub struct CallbackRegistry<C> {
    entries: [RegistryEntry<C>; EVENT_KIND_COUNT],
}

impl<C> Default for CallbackRegistry<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C> CallbackRegistry<C> {
    pub fn new() -> Self {
        Self {
            entries: EventKind::ALL.map(RegistryEntry::vacant),
        }
    }

    /// Install `callback` for `kind`, replacing any previous one
    pub fn register(
        &mut self,
        kind: EventKind,
        callback: Callback<C>,
    ) -> Result<Registration, BusError> {
        if !kind.is_registrable() {
            return Err(BusError::InvalidKind);
        }

        let entry = &mut self.entries[kind.index()];
        let previous = entry.callback.replace(callback);
        if previous.is_some() {
            log_warn!("Replacing callback for {}", kind.name());
            Ok(Registration::Replaced)
        } else {
            Ok(Registration::Added)
        }
    }

    /// Remove the callback for `kind`
    ///
    /// When `expected` is given, the registered callback must be that same
    /// function or the slot is left untouched.
    pub fn unregister(
        &mut self,
        kind: EventKind,
        expected: Option<Callback<C>>,
    ) -> Result<(), BusError> {
        if !kind.is_registrable() {
            return Err(BusError::InvalidKind);
        }

        let entry = &mut self.entries[kind.index()];
        let current = entry.callback.ok_or(BusError::NotRegistered)?;
        if let Some(expected) = expected {
            if current as usize != expected as usize {
                return Err(BusError::CallbackMismatch);
            }
        }
        entry.callback = None;
        Ok(())
    }

    pub fn get(&self, kind: EventKind) -> Option<Callback<C>> {
        self.entries[kind.index()].callback
    }

    pub fn entry(&self, kind: EventKind) -> &RegistryEntry<C> {
        &self.entries[kind.index()]
    }

    pub fn entries(&self) -> impl Iterator<Item = &RegistryEntry<C>> {
        self.entries.iter()
    }
}
