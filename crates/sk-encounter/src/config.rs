//! Configuration for the encounter engine.

/// Tunable rules and presentation settings for an [`Engine`](crate::Engine).
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Whether sixes explode on attack rolls even without Edge (rule of six).
    pub explode_by_default: bool,
    /// How many recent log entries a state view carries.
    pub log_tail: usize,
    /// Divisor applied to initiative when a target has no dodge pool.
    pub defense_divisor: i32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            explode_by_default: true,
            log_tail: 10,
            defense_divisor: 2,
        }
    }
}

impl EngineConfig {
    /// Set whether sixes explode by default.
    pub fn with_rule_of_six(mut self, explode: bool) -> Self {
        self.explode_by_default = explode;
        self
    }

    /// Set how many log entries state views include.
    pub fn with_log_tail(mut self, tail: usize) -> Self {
        self.log_tail = tail;
        self
    }

    /// Set the initiative divisor for the fallback defense pool (at least 1).
    pub fn with_defense_divisor(mut self, divisor: i32) -> Self {
        self.defense_divisor = divisor.max(1);
        self
    }
}
