//! The append-only event log of an encounter.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::id::ParticipantId;
use crate::roster::Roster;

/// What kind of thing a log entry records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    /// The encounter started.
    CombatStart,
    /// The encounter ended.
    CombatEnd,
    /// The encounter was paused.
    CombatPaused,
    /// The encounter was resumed.
    CombatResumed,
    /// A new round began.
    RoundStart,
    /// A participant's turn began.
    TurnStart,
    /// An attack that dealt no damage.
    Attack,
    /// Damage was dealt.
    Damage,
    /// Damage was healed.
    Healing,
    /// A participant went down.
    Defeated,
    /// A status effect was applied.
    EffectApplied,
    /// A status effect ran out or was removed.
    EffectExpired,
    /// A participant joined.
    ParticipantAdded,
    /// A participant left.
    ParticipantRemoved,
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::CombatStart => "combat_start",
            Self::CombatEnd => "combat_end",
            Self::CombatPaused => "combat_paused",
            Self::CombatResumed => "combat_resumed",
            Self::RoundStart => "round_start",
            Self::TurnStart => "turn_start",
            Self::Attack => "attack",
            Self::Damage => "damage",
            Self::Healing => "healing",
            Self::Defeated => "defeated",
            Self::EffectApplied => "effect_applied",
            Self::EffectExpired => "effect_expired",
            Self::ParticipantAdded => "participant_added",
            Self::ParticipantRemoved => "participant_removed",
        };
        f.write_str(s)
    }
}

/// One immutable record in the event log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    /// Position in the log, starting at 1 and strictly increasing.
    pub sequence: u64,
    /// Kind of event.
    pub event_type: EventType,
    /// Round in progress when the event happened.
    pub round_number: u32,
    /// Rendered text.
    pub description: String,
    /// Participant who acted, if any.
    pub actor: Option<ParticipantId>,
    /// Participant acted upon, if any.
    pub target: Option<ParticipantId>,
    /// Event-specific payload.
    pub data: Value,
    /// Write time. Never earlier than the previous entry's.
    pub timestamp: DateTime<Utc>,
}

/// An entry about to be written. Sequence, round, and timestamp are
/// assigned by the log.
#[derive(Debug, Clone)]
pub struct NewLogEntry {
    event_type: EventType,
    description: String,
    actor: Option<ParticipantId>,
    target: Option<ParticipantId>,
    data: Value,
}

impl NewLogEntry {
    /// Start an entry with a type and description.
    pub fn new(event_type: EventType, description: impl Into<String>) -> Self {
        Self {
            event_type,
            description: description.into(),
            actor: None,
            target: None,
            data: Value::Object(Default::default()),
        }
    }

    /// Set the acting participant.
    pub fn actor(mut self, actor: ParticipantId) -> Self {
        self.actor = Some(actor);
        self
    }

    /// Set the targeted participant.
    pub fn target(mut self, target: ParticipantId) -> Self {
        self.target = Some(target);
        self
    }

    /// Attach a structured payload.
    pub fn data(mut self, data: Value) -> Self {
        self.data = data;
        self
    }
}

/// An append-only, totally ordered list of log entries.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EventLog {
    entries: Vec<LogEntry>,
}

impl EventLog {
    /// Create an empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entry for the given round and return it.
    pub fn record(&mut self, round_number: u32, entry: NewLogEntry) -> &LogEntry {
        let now = Utc::now();
        let (sequence, timestamp) = match self.entries.last() {
            Some(last) => (last.sequence + 1, now.max(last.timestamp)),
            None => (1, now),
        };
        self.entries.push(LogEntry {
            sequence,
            event_type: entry.event_type,
            round_number,
            description: entry.description,
            actor: entry.actor,
            target: entry.target,
            data: entry.data,
            timestamp,
        });
        &self.entries[self.entries.len() - 1]
    }

    /// Drop entries written after the first `len`.
    pub(crate) fn truncate(&mut self, len: usize) {
        self.entries.truncate(len);
    }

    /// All entries in write order.
    pub fn entries(&self) -> &[LogEntry] {
        &self.entries
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing has been logged.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The last `n` entries, oldest first.
    pub fn tail(&self, n: usize) -> &[LogEntry] {
        &self.entries[self.entries.len().saturating_sub(n)..]
    }

    /// Entries written during one round.
    pub fn in_round(&self, round: u32) -> impl Iterator<Item = &LogEntry> {
        self.entries.iter().filter(move |e| e.round_number == round)
    }

    /// Entries of one type.
    pub fn of_type(&self, event_type: EventType) -> impl Iterator<Item = &LogEntry> {
        self.entries
            .iter()
            .filter(move |e| e.event_type == event_type)
    }

    /// Entries grouped by round, each group in write order.
    pub fn by_round(&self) -> BTreeMap<u32, Vec<&LogEntry>> {
        let mut rounds: BTreeMap<u32, Vec<&LogEntry>> = BTreeMap::new();
        for entry in &self.entries {
            rounds.entry(entry.round_number).or_default().push(entry);
        }
        rounds
    }

    /// Export as markdown, one section per round.
    pub fn export_markdown(&self, title: &str, roster: &Roster) -> String {
        let mut out = format!("# {title}\n\n");
        for (round, entries) in self.by_round() {
            out.push_str(&format!("## Round {round}\n\n"));
            for entry in entries {
                out.push_str(&format!(
                    "- **{}** {}{}\n",
                    entry.event_type,
                    entry.description,
                    participants_suffix(entry, roster)
                ));
            }
            out.push('\n');
        }
        out
    }

    /// Export as plain text, one section per round.
    pub fn export_text(&self, title: &str, roster: &Roster) -> String {
        let mut out = format!("{title}\n{}\n\n", "=".repeat(title.chars().count()));
        for (round, entries) in self.by_round() {
            out.push_str(&format!("--- Round {round} ---\n"));
            for entry in entries {
                out.push_str(&format!(
                    "[{}] {}{}\n",
                    entry.event_type,
                    entry.description,
                    participants_suffix(entry, roster)
                ));
            }
            out.push('\n');
        }
        out
    }
}

fn participants_suffix(entry: &LogEntry, roster: &Roster) -> String {
    match (entry.actor, entry.target) {
        (Some(a), Some(t)) => format!(" ({} -> {})", roster.name_of(Some(a)), roster.name_of(Some(t))),
        (Some(a), None) => format!(" ({})", roster.name_of(Some(a))),
        (None, Some(t)) => format!(" (-> {})", roster.name_of(Some(t))),
        (None, None) => String::new(),
    }
}
