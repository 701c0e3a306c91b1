//! In-memory encounter storage with one lock per encounter.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, RwLock};

use crate::encounter::Encounter;
use crate::error::{EncounterError, EncounterResult};
use crate::id::EncounterId;

type Slot = Arc<Mutex<Encounter>>;

/// Holds every live encounter.
///
/// Commands on one encounter are serialized by that encounter's mutex;
/// different encounters never contend beyond the brief map lookup.
#[derive(Debug, Default)]
pub struct EncounterStore {
    encounters: RwLock<HashMap<EncounterId, Slot>>,
}

impl EncounterStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a new encounter.
    pub fn insert(&self, encounter: Encounter) -> EncounterResult<EncounterId> {
        let id = encounter.id;
        let mut map = self
            .encounters
            .write()
            .map_err(|_| EncounterError::LockPoisoned)?;
        map.insert(id, Arc::new(Mutex::new(encounter)));
        Ok(id)
    }

    /// Delete an encounter with its participants, effects, and log.
    ///
    /// Waits for any command already running against it to finish.
    pub fn remove(&self, id: EncounterId) -> EncounterResult<Encounter> {
        let slot = self
            .encounters
            .write()
            .map_err(|_| EncounterError::LockPoisoned)?
            .remove(&id)
            .ok_or(EncounterError::EncounterNotFound(id))?;
        let encounter = slot
            .lock()
            .map_err(|_| EncounterError::LockPoisoned)?
            .clone();
        Ok(encounter)
    }

    /// Read an encounter under its lock.
    pub fn read<T>(&self, id: EncounterId, f: impl FnOnce(&Encounter) -> T) -> EncounterResult<T> {
        let slot = self.slot(id)?;
        let guard = slot.lock().map_err(|_| EncounterError::LockPoisoned)?;
        Ok(f(&guard))
    }

    /// Run a command against one encounter atomically.
    ///
    /// A failed command is rolled back to the state it started from. The
    /// checkpoint copies everything except the log, which is cut back to its
    /// previous length instead.
    pub fn transact<T>(
        &self,
        id: EncounterId,
        f: impl FnOnce(&mut Encounter) -> EncounterResult<T>,
    ) -> EncounterResult<T> {
        let slot = self.slot(id)?;
        let mut guard = slot.lock().map_err(|_| EncounterError::LockPoisoned)?;
        let checkpoint = guard.checkpoint();
        match f(&mut *guard) {
            Ok(out) => Ok(out),
            Err(err) => {
                guard.rollback(checkpoint);
                Err(err)
            }
        }
    }

    /// Ids of all stored encounters.
    pub fn ids(&self) -> EncounterResult<Vec<EncounterId>> {
        let map = self
            .encounters
            .read()
            .map_err(|_| EncounterError::LockPoisoned)?;
        let mut ids: Vec<EncounterId> = map.keys().copied().collect();
        ids.sort_unstable();
        Ok(ids)
    }

    /// Number of stored encounters.
    pub fn len(&self) -> usize {
        self.encounters.read().map(|m| m.len()).unwrap_or(0)
    }

    /// Whether the store is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn slot(&self, id: EncounterId) -> EncounterResult<Slot> {
        let map = self
            .encounters
            .read()
            .map_err(|_| EncounterError::LockPoisoned)?;
        map.get(&id)
            .cloned()
            .ok_or(EncounterError::EncounterNotFound(id))
    }
}
