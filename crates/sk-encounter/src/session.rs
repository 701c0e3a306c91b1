//! Session records credited when encounters end.

use std::collections::HashMap;
use std::sync::RwLock;

use serde::{Deserialize, Serialize};

use crate::error::{EncounterError, EncounterResult};
use crate::id::SessionId;

/// Cumulative combat statistics of a game session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionRecord {
    /// Encounters completed in the session.
    pub encounters_faced: u32,
    /// Enemies defeated across those encounters.
    pub enemies_defeated: u32,
}

/// Receives the tally of each finished encounter.
pub trait SessionLedger: Send + Sync {
    /// Credit a session with one finished encounter.
    fn record_encounter(&self, session: SessionId, enemies_defeated: u32) -> EncounterResult<()>;

    /// Current totals for a session.
    fn totals(&self, session: SessionId) -> EncounterResult<SessionRecord>;
}

/// A [`SessionLedger`] kept in memory.
#[derive(Debug, Default)]
pub struct InMemorySessions {
    records: RwLock<HashMap<SessionId, SessionRecord>>,
}

impl InMemorySessions {
    /// Create an empty ledger.
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionLedger for InMemorySessions {
    fn record_encounter(&self, session: SessionId, enemies_defeated: u32) -> EncounterResult<()> {
        let mut records = self
            .records
            .write()
            .map_err(|_| EncounterError::LockPoisoned)?;
        let record = records.entry(session).or_default();
        record.encounters_faced += 1;
        record.enemies_defeated += enemies_defeated;
        Ok(())
    }

    fn totals(&self, session: SessionId) -> EncounterResult<SessionRecord> {
        let records = self
            .records
            .read()
            .map_err(|_| EncounterError::LockPoisoned)?;
        Ok(records.get(&session).copied().unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accumulates_per_session() {
        let ledger = InMemorySessions::new();
        let s = SessionId::new();
        ledger.record_encounter(s, 2).unwrap();
        ledger.record_encounter(s, 1).unwrap();
        assert_eq!(
            ledger.totals(s).unwrap(),
            SessionRecord {
                encounters_faced: 2,
                enemies_defeated: 3
            }
        );
        assert_eq!(
            ledger.totals(SessionId::new()).unwrap(),
            SessionRecord::default()
        );
    }
}
