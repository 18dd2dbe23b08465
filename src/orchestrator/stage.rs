use crate::error::PipelineError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A named pipeline stage.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    Generate,
    Preprocess,
    Features,
    Train,
    Evaluate,
    Save,
    Dashboard,
}

const DEFAULT_ORDER: [Stage; 6] = [
    Stage::Generate,
    Stage::Preprocess,
    Stage::Features,
    Stage::Train,
    Stage::Evaluate,
    Stage::Save,
];

impl Stage {
    pub const ALL: [Stage; 7] = [
        Stage::Generate,
        Stage::Preprocess,
        Stage::Features,
        Stage::Train,
        Stage::Evaluate,
        Stage::Save,
        Stage::Dashboard,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Stage::Generate => "generate",
            Stage::Preprocess => "preprocess",
            Stage::Features => "features",
            Stage::Train => "train",
            Stage::Evaluate => "evaluate",
            Stage::Save => "save",
            Stage::Dashboard => "dashboard",
        }
    }

    /// Position in the default run; `None` for optional-only stages.
    pub fn ordinal(self) -> Option<usize> {
        DEFAULT_ORDER.iter().position(|&s| s == self)
    }

    /// Runs only when requested explicitly.
    pub fn is_optional_only(self) -> bool {
        self.ordinal().is_none()
    }

    /// Stages of the default run, in order.
    pub fn default_order() -> &'static [Stage] {
        &DEFAULT_ORDER
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Stage {
    type Err = PipelineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Stage::ALL
            .iter()
            .copied()
            .find(|stage| stage.name() == s)
            .ok_or_else(|| PipelineError::InvalidInput(format!("unknown stage '{}'", s)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_order_excludes_dashboard() {
        let names: Vec<&str> = Stage::default_order().iter().map(|s| s.name()).collect();
        assert_eq!(
            names,
            vec!["generate", "preprocess", "features", "train", "evaluate", "save"]
        );
        assert!(Stage::Dashboard.is_optional_only());
        assert_eq!(Stage::Train.ordinal(), Some(3));
    }

    #[test]
    fn test_parse_round_trip() {
        for stage in Stage::ALL {
            assert_eq!(stage.name().parse::<Stage>().unwrap(), stage);
        }
        assert!("deploy".parse::<Stage>().is_err());
    }
}
