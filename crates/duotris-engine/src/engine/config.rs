use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::{ConfigError, KickTable, PieceBuffer};

/// Tunables for one player session.
///
/// [`EngineConfig::standard`] is the default: SRS kicks, five visible next pieces, and a
/// 500 ms lock delay. [`EngineConfig::classic`] is the lighter rule set with horizontal-only
/// kicks, three visible pieces, and immediate locking.
///
/// ```
/// use duotris_engine::EngineConfig;
///
/// let config: EngineConfig = serde_json::from_str(r#"{ "lookahead": 3 }"#).unwrap();
/// assert_eq!(config.lookahead, 3);
/// assert_eq!(config.lock_delay_ms, Some(500));
/// config.validate().unwrap();
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub kick_table: KickTable,
    /// Number of upcoming pieces kept visible.
    pub lookahead: usize,
    /// Grace period after grounding; `None` locks on the first failed gravity step.
    pub lock_delay_ms: Option<u64>,
    pub initial_gravity_ms: u64,
    pub gravity_step_ms: u64,
    pub min_gravity_ms: u64,
    pub lines_per_level: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::standard()
    }
}

impl EngineConfig {
    #[must_use]
    pub const fn standard() -> Self {
        Self {
            kick_table: KickTable::Srs,
            lookahead: 5,
            lock_delay_ms: Some(500),
            initial_gravity_ms: 800,
            gravity_step_ms: 60,
            min_gravity_ms: 120,
            lines_per_level: 10,
        }
    }

    #[must_use]
    pub const fn classic() -> Self {
        Self {
            kick_table: KickTable::Simple,
            lookahead: 3,
            lock_delay_ms: None,
            ..Self::standard()
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.lookahead < PieceBuffer::MIN_LOOKAHEAD {
            return Err(ConfigError::LookaheadTooShort {
                min: PieceBuffer::MIN_LOOKAHEAD,
                actual: self.lookahead,
            });
        }
        if self.initial_gravity_ms == 0 {
            return Err(ConfigError::Zero {
                name: "initial_gravity_ms",
            });
        }
        if self.min_gravity_ms == 0 {
            return Err(ConfigError::Zero {
                name: "min_gravity_ms",
            });
        }
        if self.min_gravity_ms > self.initial_gravity_ms {
            return Err(ConfigError::GravityFloorAboveStart {
                min_ms: self.min_gravity_ms,
                initial_ms: self.initial_gravity_ms,
            });
        }
        if self.lines_per_level == 0 {
            return Err(ConfigError::Zero {
                name: "lines_per_level",
            });
        }
        Ok(())
    }

    /// Automatic drop interval at `level` (1-based).
    #[must_use]
    pub fn gravity_interval(&self, level: usize) -> Duration {
        let steps = u64::try_from(level.saturating_sub(1)).unwrap_or(u64::MAX);
        let millis = self
            .initial_gravity_ms
            .saturating_sub(steps.saturating_mul(self.gravity_step_ms))
            .max(self.min_gravity_ms);
        Duration::from_millis(millis)
    }

    #[must_use]
    pub fn lock_delay(&self) -> Option<Duration> {
        self.lock_delay_ms.map(Duration::from_millis)
    }
}
