//! Engine configuration.
//!
//! Every tunable of the engine lives here as plain data: the MaxN depth
//! table, the heuristic weight brackets, the MCTS budget and reward shape.
//! Configurations deserialize from JSON with every field optional; missing
//! fields take the tuned defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised while loading or validating a configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("search budget must be positive")]
    ZeroBudget,

    #[error("exploration constant must be finite and non-negative, got {0}")]
    InvalidExploration(f64),

    #[error("rollout ply cap must be positive")]
    ZeroRolloutCap,

    #[error("depth table is empty")]
    EmptyDepthTable,

    #[error("depth rule {index}: {reason}")]
    InvalidDepthRule { index: usize, reason: &'static str },

    #[error("heuristic bracket table is empty")]
    EmptyBrackets,

    #[error("heuristic bracket {index}: {reason}")]
    InvalidBracket { index: usize, reason: &'static str },

    #[error("non-finite value in {0}")]
    NonFinite(&'static str),
}

/// Top-level search strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchMode {
    /// MaxN with MCTS tie-breaking at the root.
    #[default]
    Hybrid,
    /// MCTS alone from the current state.
    Mcts,
}

/// How MaxN resolves a tie between root moves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TieBreak {
    #[default]
    Mcts,
    Uniform,
}

/// Maps the number of on-board pieces to a MaxN search depth.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepthRule {
    pub min_on_board: u8,
    pub depth: u8,
}

/// Depth of the first rule in `table` whose `min_on_board` is reached.
/// Falls back to a single ply when no rule applies.
pub fn depth_for(table: &[DepthRule], on_board: u8) -> u8 {
    table
        .iter()
        .find(|rule| rule.min_on_board <= on_board)
        .map_or(1, |rule| rule.depth)
}

/// Per-signal weights of the heuristic evaluator.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SignalWeights {
    pub distance: f64,
    pub capture: f64,
    pub exit: f64,
    pub attack: f64,
}

impl SignalWeights {
    pub const fn new(distance: f64, capture: f64, exit: f64, attack: f64) -> Self {
        SignalWeights {
            distance,
            capture,
            exit,
            attack,
        }
    }

    fn is_finite(&self) -> bool {
        self.distance.is_finite()
            && self.capture.is_finite()
            && self.exit.is_finite()
            && self.attack.is_finite()
    }
}

/// Weights used when the evaluated player's total pieces is at most
/// `max_total`. A `None` bound matches everything and must come last.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bracket {
    pub max_total: Option<u8>,
    pub weights: SignalWeights,
}

const FEW: SignalWeights = SignalWeights::new(0.0, 3.0, -1.0, 1.0);
const EVEN: SignalWeights = SignalWeights::new(1.0, 4.0, 2.0, 0.0);
const AHEAD: SignalWeights = SignalWeights::new(1.0, 1.0, 4.0, 0.0);
const STRONG: SignalWeights = SignalWeights::new(1.0, 3.0, 6.0, 0.0);
const DOMINANT: SignalWeights = SignalWeights::new(1.0, 1.0, 6.0, 0.0);

/// Heuristic evaluator parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeuristicConfig {
    /// Weight brackets ordered by ascending `max_total`.
    pub brackets: Vec<Bracket>,
    /// Used when the player is behind some opponent in total pieces.
    pub trailing: SignalWeights,
    /// Used when the player has three exits and more than one piece left.
    pub closing: SignalWeights,
    /// Bonus applied at opponent plies that cost the root player a piece.
    pub paranoid_penalty: f64,
}

impl Default for HeuristicConfig {
    fn default() -> Self {
        HeuristicConfig {
            brackets: vec![
                Bracket { max_total: Some(3), weights: FEW },
                Bracket { max_total: Some(5), weights: EVEN },
                Bracket { max_total: Some(7), weights: AHEAD },
                Bracket { max_total: Some(9), weights: STRONG },
                Bracket { max_total: None, weights: DOMINANT },
            ],
            trailing: FEW,
            closing: DOMINANT,
            paranoid_penalty: 3.0,
        }
    }
}

/// How long an MCTS run may search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchBudget {
    /// Wall-clock limit in milliseconds, checked once per dive.
    TimeMs(u64),
    /// Fixed number of dives.
    Iterations(u32),
}

impl Default for SearchBudget {
    fn default() -> Self {
        SearchBudget::TimeMs(1000)
    }
}

/// Shape of the rollout reward.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RewardConfig {
    /// Magnitude of a win or loss reached after one ply.
    pub win_reward: f64,
    /// Scales the reward by the advancing player's total pieces.
    pub material_weight: f64,
}

impl Default for RewardConfig {
    fn default() -> Self {
        RewardConfig {
            win_reward: 6.0,
            material_weight: 1.0,
        }
    }
}

/// Monte-Carlo tree search parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MctsConfig {
    pub exploration: f64,
    pub budget: SearchBudget,
    pub max_rollout_plies: u32,
    pub reward: RewardConfig,
}

impl Default for MctsConfig {
    fn default() -> Self {
        MctsConfig {
            exploration: std::f64::consts::SQRT_2,
            budget: SearchBudget::default(),
            max_rollout_plies: 600,
            reward: RewardConfig::default(),
        }
    }
}

impl MctsConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.exploration.is_finite() || self.exploration < 0.0 {
            return Err(ConfigError::InvalidExploration(self.exploration));
        }
        match self.budget {
            SearchBudget::TimeMs(0) | SearchBudget::Iterations(0) => {
                return Err(ConfigError::ZeroBudget)
            }
            _ => {}
        }
        if self.max_rollout_plies == 0 {
            return Err(ConfigError::ZeroRolloutCap);
        }
        if !self.reward.win_reward.is_finite() || !self.reward.material_weight.is_finite() {
            return Err(ConfigError::NonFinite("mcts.reward"));
        }
        Ok(())
    }
}

/// Complete engine configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub mode: SearchMode,
    /// Rules ordered by descending `min_on_board`; the first that applies wins.
    pub depth_table: Vec<DepthRule>,
    pub heuristic: HeuristicConfig,
    pub mcts: MctsConfig,
    pub tie_break: TieBreak,
    /// Fixed RNG seed; `None` seeds from entropy.
    pub seed: Option<u64>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            mode: SearchMode::default(),
            depth_table: vec![
                DepthRule { min_on_board: 8, depth: 3 },
                DepthRule { min_on_board: 5, depth: 4 },
                DepthRule { min_on_board: 0, depth: 6 },
            ],
            heuristic: HeuristicConfig::default(),
            mcts: MctsConfig::default(),
            tie_break: TieBreak::default(),
            seed: None,
        }
    }
}

impl EngineConfig {
    /// Parses and validates a JSON configuration.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: EngineConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a JSON configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&text)
    }

    /// Checks every invariant the search relies on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.validate_depth_table()?;
        self.validate_heuristic()?;
        self.mcts.validate()
    }

    /// MaxN depth for the given number of on-board pieces.
    pub fn depth_for(&self, on_board: u8) -> u8 {
        depth_for(&self.depth_table, on_board)
    }

    fn validate_depth_table(&self) -> Result<(), ConfigError> {
        if self.depth_table.is_empty() {
            return Err(ConfigError::EmptyDepthTable);
        }
        for (index, rule) in self.depth_table.iter().enumerate() {
            if rule.depth == 0 {
                return Err(ConfigError::InvalidDepthRule {
                    index,
                    reason: "depth must be at least 1",
                });
            }
            if index > 0 && rule.min_on_board >= self.depth_table[index - 1].min_on_board {
                return Err(ConfigError::InvalidDepthRule {
                    index,
                    reason: "min_on_board must be strictly descending",
                });
            }
        }
        if self.depth_table.last().map(|r| r.min_on_board) != Some(0) {
            return Err(ConfigError::InvalidDepthRule {
                index: self.depth_table.len() - 1,
                reason: "last rule must cover zero pieces",
            });
        }
        Ok(())
    }

    fn validate_heuristic(&self) -> Result<(), ConfigError> {
        let h = &self.heuristic;
        if h.brackets.is_empty() {
            return Err(ConfigError::EmptyBrackets);
        }
        let last = h.brackets.len() - 1;
        let mut prev: Option<u8> = None;
        for (index, bracket) in h.brackets.iter().enumerate() {
            match bracket.max_total {
                None if index != last => {
                    return Err(ConfigError::InvalidBracket {
                        index,
                        reason: "only the last bracket may be unbounded",
                    })
                }
                None => {}
                Some(_) if index == last => {
                    return Err(ConfigError::InvalidBracket {
                        index,
                        reason: "last bracket must be unbounded",
                    })
                }
                Some(max) => {
                    if prev.is_some_and(|p| max <= p) {
                        return Err(ConfigError::InvalidBracket {
                            index,
                            reason: "bounds must be strictly ascending",
                        });
                    }
                    prev = Some(max);
                }
            }
            if !bracket.weights.is_finite() {
                return Err(ConfigError::NonFinite("heuristic.brackets"));
            }
        }
        if !h.trailing.is_finite() {
            return Err(ConfigError::NonFinite("heuristic.trailing"));
        }
        if !h.closing.is_finite() {
            return Err(ConfigError::NonFinite("heuristic.closing"));
        }
        if !h.paranoid_penalty.is_finite() {
            return Err(ConfigError::NonFinite("heuristic.paranoid_penalty"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        EngineConfig::default().validate().unwrap();
    }

    #[test]
    fn default_depth_table() {
        let config = EngineConfig::default();
        assert_eq!(config.depth_for(12), 3);
        assert_eq!(config.depth_for(8), 3);
        assert_eq!(config.depth_for(7), 4);
        assert_eq!(config.depth_for(5), 4);
        assert_eq!(config.depth_for(4), 6);
        assert_eq!(config.depth_for(0), 6);
    }

    #[test]
    fn empty_json_gives_defaults() {
        let config = EngineConfig::from_json_str("{}").unwrap();
        assert_eq!(config, EngineConfig::default());
    }

    #[test]
    fn partial_json_overrides_fields() {
        let json = r#"{
            "mode": "mcts",
            "tie_break": "uniform",
            "seed": 42,
            "mcts": { "budget": { "iterations": 200 }, "exploration": 0.5 }
        }"#;
        let config = EngineConfig::from_json_str(json).unwrap();
        assert_eq!(config.mode, SearchMode::Mcts);
        assert_eq!(config.tie_break, TieBreak::Uniform);
        assert_eq!(config.seed, Some(42));
        assert_eq!(config.mcts.budget, SearchBudget::Iterations(200));
        assert_eq!(config.mcts.exploration, 0.5);
        assert_eq!(config.mcts.max_rollout_plies, 600);
        assert_eq!(config.heuristic, HeuristicConfig::default());
    }

    #[test]
    fn zero_budget_rejected() {
        let json = r#"{ "mcts": { "budget": { "time_ms": 0 } } }"#;
        assert!(matches!(
            EngineConfig::from_json_str(json),
            Err(ConfigError::ZeroBudget)
        ));
        let json = r#"{ "mcts": { "budget": { "iterations": 0 } } }"#;
        assert!(matches!(
            EngineConfig::from_json_str(json),
            Err(ConfigError::ZeroBudget)
        ));
    }

    #[test]
    fn negative_exploration_rejected() {
        let mut config = EngineConfig::default();
        config.mcts.exploration = -1.0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidExploration(_))
        ));
        config.mcts.exploration = f64::NAN;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidExploration(_))
        ));
    }

    #[test]
    fn zero_rollout_cap_rejected() {
        let mut config = EngineConfig::default();
        config.mcts.max_rollout_plies = 0;
        assert!(matches!(config.validate(), Err(ConfigError::ZeroRolloutCap)));
    }

    #[test]
    fn bad_depth_tables_rejected() {
        let mut config = EngineConfig::default();
        config.depth_table.clear();
        assert!(matches!(config.validate(), Err(ConfigError::EmptyDepthTable)));

        config.depth_table = vec![DepthRule { min_on_board: 4, depth: 3 }];
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidDepthRule { index: 0, .. })
        ));

        config.depth_table = vec![
            DepthRule { min_on_board: 5, depth: 3 },
            DepthRule { min_on_board: 8, depth: 4 },
            DepthRule { min_on_board: 0, depth: 6 },
        ];
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidDepthRule { index: 1, .. })
        ));

        config.depth_table = vec![DepthRule { min_on_board: 0, depth: 0 }];
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidDepthRule { index: 0, .. })
        ));
    }

    #[test]
    fn bad_brackets_rejected() {
        let mut config = EngineConfig::default();
        config.heuristic.brackets.clear();
        assert!(matches!(config.validate(), Err(ConfigError::EmptyBrackets)));

        let w = SignalWeights::default();
        config.heuristic.brackets = vec![
            Bracket { max_total: Some(5), weights: w },
            Bracket { max_total: Some(3), weights: w },
            Bracket { max_total: None, weights: w },
        ];
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidBracket { index: 1, .. })
        ));

        config.heuristic.brackets = vec![Bracket { max_total: Some(5), weights: w }];
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidBracket { index: 0, .. })
        ));

        config.heuristic.brackets = vec![
            Bracket { max_total: None, weights: w },
            Bracket { max_total: None, weights: w },
        ];
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidBracket { index: 0, .. })
        ));
    }

    #[test]
    fn non_finite_weights_rejected() {
        let mut config = EngineConfig::default();
        config.heuristic.trailing.capture = f64::INFINITY;
        assert!(matches!(config.validate(), Err(ConfigError::NonFinite(_))));
    }

    #[test]
    fn malformed_json_is_reported() {
        assert!(matches!(
            EngineConfig::from_json_str("{ not json"),
            Err(ConfigError::Json(_))
        ));
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = EngineConfig::load("/nonexistent/chexers.json").unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn config_roundtrips_through_json() {
        let mut config = EngineConfig::default();
        config.seed = Some(7);
        config.mcts.budget = SearchBudget::Iterations(50);
        config.mcts.exploration = 1.5;
        let json = serde_json::to_string(&config).unwrap();
        assert_eq!(EngineConfig::from_json_str(&json).unwrap(), config);
    }
}
