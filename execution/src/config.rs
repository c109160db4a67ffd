//! Engine configuration.

use crate::settlement::{
    jackpot::{self, JackpotTierConfig},
    SettlementConfig,
};
use serde::{Deserialize, Serialize};
use spacerace_types::{
    PayoutModel, BPS_SCALE, DEFAULT_HOUSE_EDGE_BPS, DEFAULT_HOUSE_SEED_BALANCE, DEFAULT_MAX_BET,
    DEFAULT_MIN_BET, JACKPOT_TIERS,
};
use std::str::FromStr;
use thiserror::Error;
use tracing::Level;

/// Default capacity of the desk mailbox.
pub const DEFAULT_MAILBOX_SIZE: usize = 1024;

/// Configuration for the desk and its host.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct EngineConfig {
    #[serde(default)]
    pub payout_model: PayoutModel,
    #[serde(default = "default_min_bet")]
    pub min_bet: u64,
    #[serde(default = "default_max_bet")]
    pub max_bet: u64,
    #[serde(default = "default_house_edge_bps")]
    pub house_edge_bps: u64,
    #[serde(default = "default_house_seed_balance")]
    pub house_seed_balance: u64,
    /// Mini, mega and super, in that order.
    #[serde(default = "jackpot::default_tiers")]
    pub jackpots: [JackpotTierConfig; JACKPOT_TIERS],
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default = "default_mailbox_size")]
    pub mailbox_size: usize,
}

fn default_min_bet() -> u64 {
    DEFAULT_MIN_BET
}

fn default_max_bet() -> u64 {
    DEFAULT_MAX_BET
}

fn default_house_edge_bps() -> u64 {
    DEFAULT_HOUSE_EDGE_BPS
}

fn default_house_seed_balance() -> u64 {
    DEFAULT_HOUSE_SEED_BALANCE
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_mailbox_size() -> usize {
    DEFAULT_MAILBOX_SIZE
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            payout_model: PayoutModel::default(),
            min_bet: DEFAULT_MIN_BET,
            max_bet: DEFAULT_MAX_BET,
            house_edge_bps: DEFAULT_HOUSE_EDGE_BPS,
            house_seed_balance: DEFAULT_HOUSE_SEED_BALANCE,
            jackpots: jackpot::default_tiers(),
            log_level: default_log_level(),
            mailbox_size: DEFAULT_MAILBOX_SIZE,
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error("min_bet must be > 0")]
    ZeroMinBet,
    #[error("min_bet ({min}) exceeds max_bet ({max})")]
    BetRange { min: u64, max: u64 },
    #[error("{field} must be <= 10000 bps (got {value})")]
    BpsOutOfRange { field: &'static str, value: u64 },
    #[error("jackpot tier {tier} must be rarer than tier {previous} ({chance} >= {previous_chance})")]
    JackpotRarity {
        tier: usize,
        previous: usize,
        chance: u64,
        previous_chance: u64,
    },
    #[error("invalid log level: {value}")]
    InvalidLogLevel { value: String },
    #[error("{field} must be > 0 (got {value})")]
    InvalidNonZero { field: &'static str, value: usize },
}

/// Configuration that passed [EngineConfig::validate].
#[derive(Clone, Debug)]
pub struct ValidatedConfig {
    pub settlement: SettlementConfig,
    pub house_seed_balance: u64,
    pub log_level: Level,
    pub mailbox_size: usize,
}

impl EngineConfig {
    pub fn from_yaml(contents: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(contents)?)
    }

    pub fn validate(self) -> Result<ValidatedConfig, ConfigError> {
        if self.min_bet == 0 {
            return Err(ConfigError::ZeroMinBet);
        }
        if self.min_bet > self.max_bet {
            return Err(ConfigError::BetRange {
                min: self.min_bet,
                max: self.max_bet,
            });
        }
        ensure_bps("house_edge_bps", self.house_edge_bps)?;

        let mut contributions = 0u64;
        for (tier, config) in self.jackpots.iter().enumerate() {
            ensure_bps("jackpots.chance_bps", config.chance_bps)?;
            contributions = contributions.saturating_add(config.contribution_bps);
            if tier == 0 {
                continue;
            }
            let previous = &self.jackpots[tier - 1];
            if config.chance_bps >= previous.chance_bps {
                return Err(ConfigError::JackpotRarity {
                    tier,
                    previous: tier - 1,
                    chance: config.chance_bps,
                    previous_chance: previous.chance_bps,
                });
            }
        }
        ensure_bps("jackpots.contribution_bps", contributions)?;

        if self.mailbox_size == 0 {
            return Err(ConfigError::InvalidNonZero {
                field: "mailbox_size",
                value: 0,
            });
        }
        let log_level =
            Level::from_str(&self.log_level).map_err(|_| ConfigError::InvalidLogLevel {
                value: self.log_level.clone(),
            })?;

        Ok(ValidatedConfig {
            settlement: SettlementConfig {
                model: self.payout_model,
                min_bet: self.min_bet,
                max_bet: self.max_bet,
                house_edge_bps: self.house_edge_bps,
                jackpots: self.jackpots,
            },
            house_seed_balance: self.house_seed_balance,
            log_level,
            mailbox_size: self.mailbox_size,
        })
    }
}

fn ensure_bps(field: &'static str, value: u64) -> Result<(), ConfigError> {
    if value > BPS_SCALE {
        return Err(ConfigError::BpsOutOfRange { field, value });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_validate() {
        let validated = EngineConfig::default().validate().expect("defaults are valid");
        assert_eq!(validated.settlement, SettlementConfig::default());
        assert_eq!(validated.log_level, Level::INFO);
        assert_eq!(validated.mailbox_size, DEFAULT_MAILBOX_SIZE);
    }

    #[test]
    fn test_yaml_fills_missing_fields() {
        let config = EngineConfig::from_yaml(
            "payout_model: pari_mutuel\nmin_bet: 50\nlog_level: debug\n",
        )
        .unwrap();
        assert_eq!(config.payout_model, PayoutModel::PariMutuel);
        assert_eq!(config.min_bet, 50);
        assert_eq!(config.max_bet, DEFAULT_MAX_BET);
        assert_eq!(config.jackpots, jackpot::default_tiers());

        let validated = config.validate().unwrap();
        assert_eq!(validated.log_level, Level::DEBUG);
        assert_eq!(validated.settlement.model, PayoutModel::PariMutuel);
    }

    #[test]
    fn test_yaml_jackpot_table() {
        let yaml = r#"
jackpots:
  - { contribution_bps: 200, chance_bps: 500, floor: 10 }
  - { contribution_bps: 100, chance_bps: 50, floor: 100 }
  - { contribution_bps: 50, chance_bps: 5, floor: 1000 }
"#;
        let validated = EngineConfig::from_yaml(yaml).unwrap().validate().unwrap();
        assert_eq!(validated.settlement.jackpots[0].chance_bps, 500);
        assert_eq!(validated.settlement.jackpots[2].floor, 1_000);
    }

    #[test]
    fn test_rejects_malformed_yaml() {
        assert!(matches!(
            EngineConfig::from_yaml("min_bet: lots"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_rejects_bad_values() {
        let config = EngineConfig {
            min_bet: 0,
            ..EngineConfig::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::ZeroMinBet)));

        let config = EngineConfig {
            min_bet: 500,
            max_bet: 100,
            ..EngineConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::BetRange { min: 500, max: 100 })
        ));

        let config = EngineConfig {
            house_edge_bps: 10_001,
            ..EngineConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::BpsOutOfRange {
                field: "house_edge_bps",
                ..
            })
        ));

        let mut config = EngineConfig::default();
        config.jackpots[2].chance_bps = config.jackpots[1].chance_bps;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::JackpotRarity { tier: 2, .. })
        ));

        let config = EngineConfig {
            mailbox_size: 0,
            ..EngineConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidNonZero {
                field: "mailbox_size",
                ..
            })
        ));

        let config = EngineConfig {
            log_level: "loud".to_string(),
            ..EngineConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidLogLevel { .. })
        ));
    }
}
