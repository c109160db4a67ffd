//! Host-side helpers for the spacerace command line: config loading, player parsing and the JSON
//! views printed by each sub-command.

use anyhow::{Context, Result};
use commonware_codec::{DecodeExt, Encode};
use commonware_cryptography::{ed25519::PrivateKey, Signer};
use commonware_utils::{from_hex_formatted, hex};
use serde::Serialize;
use spacerace_execution::{
    config::{EngineConfig, ValidatedConfig},
    RaceSeed, WagerReceipt,
};
use spacerace_types::{JackpotState, PlayerId, RaceResult};
use std::path::Path;

/// Load and validate a YAML config, or fall back to defaults when no path is given.
pub fn load_config(path: Option<&Path>) -> Result<ValidatedConfig> {
    let config = match path {
        Some(path) => {
            let contents = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read config {}", path.display()))?;
            EngineConfig::from_yaml(&contents).context("failed to parse config")?
        }
        None => EngineConfig::default(),
    };
    config.validate().context("invalid config")
}

/// Resolve a player from a hex-encoded public key or, failing that, a numeric test seed.
pub fn parse_player(value: &str) -> Result<PlayerId> {
    if let Ok(seed) = value.parse::<u64>() {
        return Ok(PrivateKey::from_seed(seed).public_key());
    }
    let bytes = from_hex_formatted(value).context("player must be a u64 seed or hex public key")?;
    PlayerId::decode(&mut bytes.as_slice()).context("failed to decode player public key")
}

/// Parse a hex race seed.
pub fn parse_seed(value: &str) -> Result<[u8; 32]> {
    let bytes = from_hex_formatted(value).context("seed must be hex")?;
    bytes
        .try_into()
        .map_err(|bytes: Vec<u8>| anyhow::anyhow!("seed must be 32 bytes (got {})", bytes.len()))
}

#[derive(Serialize)]
pub struct RaceReport<'a> {
    pub seed_hex: String,
    pub commit_hex: String,
    #[serde(flatten)]
    pub race: &'a RaceResult,
}

impl<'a> RaceReport<'a> {
    pub fn new(race: &'a RaceResult) -> Self {
        let seed = RaceSeed::from_bytes(race.seed);
        Self {
            seed_hex: hex(seed.as_bytes()),
            commit_hex: hex(&seed.commit()),
            race,
        }
    }
}

#[derive(Serialize)]
pub struct WagerReport<'a> {
    pub player: String,
    #[serde(flatten)]
    pub race: RaceReport<'a>,
    pub settlement: &'a spacerace_types::SettlementResult,
    pub unlocked: &'a [spacerace_types::AchievementId],
    pub rank: Option<u32>,
}

impl<'a> WagerReport<'a> {
    pub fn new(player: &PlayerId, receipt: &'a WagerReceipt) -> Self {
        Self {
            player: hex(&player.encode()),
            race: RaceReport::new(&receipt.race),
            settlement: &receipt.settlement,
            unlocked: &receipt.unlocked,
            rank: receipt.rank,
        }
    }
}

#[derive(Debug, PartialEq, Eq, Serialize)]
pub struct JackpotView {
    pub mini: u64,
    pub mega: u64,
    #[serde(rename = "super")]
    pub super_jackpot: u64,
}

impl From<&JackpotState> for JackpotView {
    fn from(state: &JackpotState) -> Self {
        Self {
            mini: state.mini(),
            mega: state.mega(),
            super_jackpot: state.super_jackpot(),
        }
    }
}

/// Pretty JSON for stdout.
pub fn render<T: Serialize>(value: &T) -> Result<String> {
    serde_json::to_string_pretty(value).context("failed to render json")
}
