use std::{fmt::Display, fs, path::Path, time::Duration};

use serde::{Deserialize, Serialize};

use crate::{
    grid::{Grid, Point, WeightMode},
    Error, Result,
};

/// Everything needed to set up a grid and run searches on it.
///
/// Missing fields fall back to the [`Preset::Unweighted`] values when
/// deserializing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub rows: usize,
    pub columns: usize,
    /// Multiplier on the heuristic, 1 keeps A* optimal, larger values are greedier
    pub heuristic_weight: f64,
    pub weights: WeightMode,
    /// Time between two steps while running
    pub step_interval_ms: u64,
    /// Upper bound on steps taken for a single `advance` call
    pub max_steps_per_advance: usize,
    /// Defaults to the top left corner
    pub start: Option<Point>,
    /// Defaults to the bottom right corner
    pub goal: Option<Point>,
}

impl Default for Config {
    fn default() -> Self {
        Preset::Unweighted.config()
    }
}

impl Config {
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Config = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        Self::from_json_str(&fs::read_to_string(path)?)
    }

    pub fn validate(&self) -> Result<()> {
        if self.rows == 0 || self.columns == 0 {
            return Err(Error::EmptyGrid {
                columns: self.columns,
                rows: self.rows,
            });
        }
        if !self.heuristic_weight.is_finite() || self.heuristic_weight < 1.0 {
            return Err(Error::InvalidConfig(format!(
                "heuristic_weight must be at least 1, got {}",
                self.heuristic_weight
            )));
        }
        if let WeightMode::Uniform { weight } = self.weights {
            if !weight.is_finite() || weight < 0.0 {
                return Err(Error::InvalidWeight(weight));
            }
        }
        if self.max_steps_per_advance == 0 {
            return Err(Error::InvalidConfig(
                "max_steps_per_advance must be at least 1".to_string(),
            ));
        }
        for point in [self.start, self.goal].into_iter().flatten() {
            if point.col >= self.columns || point.row >= self.rows {
                return Err(Error::OutOfBounds {
                    point,
                    columns: self.columns,
                    rows: self.rows,
                });
            }
        }
        Ok(())
    }

    /// Builds a fresh grid, with new weights when they are random
    pub fn build_grid(&self) -> Result<Grid> {
        self.validate()?;
        let mut grid = Grid::new(self.rows, self.columns, &self.weights)?;
        if let Some(start) = self.start {
            grid.set_start(start)?;
        }
        if let Some(goal) = self.goal {
            grid.set_goal(goal)?;
        }
        Ok(grid)
    }

    pub fn step_interval(&self) -> Duration {
        Duration::from_millis(self.step_interval_ms)
    }

    /// Whether switching from `self` to `other` needs a new grid
    pub fn changes_grid(&self, other: &Config) -> bool {
        self.rows != other.rows
            || self.columns != other.columns
            || self.weights != other.weights
            || self.start != other.start
            || self.goal != other.goal
    }
}

/// The two classic setups
#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub enum Preset {
    /// 15x15, every cell costs 1, plain A*
    Unweighted,
    /// 50x50 with random weights and a heuristic weight of 3
    Weighted,
}

impl Preset {
    pub const ALL: [Preset; 2] = [Preset::Unweighted, Preset::Weighted];

    pub fn config(self) -> Config {
        match self {
            Preset::Unweighted => Config {
                rows: 15,
                columns: 15,
                heuristic_weight: 1.0,
                weights: WeightMode::Uniform { weight: 1.0 },
                step_interval_ms: 5,
                max_steps_per_advance: 64,
                start: None,
                goal: None,
            },
            Preset::Weighted => Config {
                rows: 50,
                columns: 50,
                heuristic_weight: 3.0,
                weights: WeightMode::Random { seed: None },
                step_interval_ms: 5,
                max_steps_per_advance: 64,
                start: None,
                goal: None,
            },
        }
    }
}

impl Display for Preset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Preset::Unweighted => "unweighted",
                Preset::Weighted => "weighted",
            }
        )
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_presets_are_valid() {
        for preset in Preset::ALL {
            preset.config().validate().unwrap();
        }
        assert_eq!(Config::default(), Preset::Unweighted.config());
        assert!(Preset::Weighted.config().weights.is_random());
    }

    #[test]
    fn test_validate() {
        let config = Config {
            heuristic_weight: 0.5,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(Error::InvalidConfig(_))));

        let config = Config {
            rows: 0,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(Error::EmptyGrid { .. })));

        let config = Config {
            weights: WeightMode::Uniform { weight: -2.0 },
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(Error::InvalidWeight(_))));

        let config = Config {
            goal: Some(Point::new(15, 0)),
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(Error::OutOfBounds { .. })));

        let config = Config {
            max_steps_per_advance: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_json() {
        let config =
            Config::from_json_str(r#"{ "rows": 20, "weights": { "mode": "random", "seed": 3 } }"#)
                .unwrap();

        assert_eq!(config.rows, 20);
        assert_eq!(config.columns, 15);
        assert_eq!(config.weights, WeightMode::Random { seed: Some(3) });
        assert_eq!(config.heuristic_weight, 1.0);

        assert!(matches!(
            Config::from_json_str(r#"{ "heuristic_weight": 0 }"#),
            Err(Error::InvalidConfig(_))
        ));
        assert!(matches!(
            Config::from_json_str("{ rows: }"),
            Err(Error::Json(_))
        ));
    }

    #[test]
    fn test_build_grid() {
        let config = Config {
            rows: 4,
            columns: 5,
            start: Some(Point::new(1, 1)),
            goal: Some(Point::new(0, 3)),
            ..Default::default()
        };
        let grid = config.build_grid().unwrap();
        assert_eq!((grid.rows(), grid.columns()), (4, 5));
        assert_eq!(grid.start(), Point::new(1, 1));
        assert_eq!(grid.goal(), Point::new(0, 3));
    }

    #[test]
    fn test_changes_grid() {
        let config = Config::default();
        let faster = Config {
            step_interval_ms: 50,
            heuristic_weight: 2.0,
            ..config.clone()
        };
        assert!(!config.changes_grid(&faster));
        assert!(config.changes_grid(&Preset::Weighted.config()));
    }
}
