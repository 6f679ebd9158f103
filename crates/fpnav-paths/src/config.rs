//! Runtime selection of a search engine.

use crate::astar::ArrayAstar;
use crate::offset::MovementPattern;
use crate::stepwise::AstarSearch;
use crate::traits::PathFinder;

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "snake_case")
)]
pub enum EngineKind {
    /// Single-shot array-based A* ([`ArrayAstar`]).
    #[default]
    Array,
    /// Node-pooled step-wise A* ([`AstarSearch`]).
    Pooled,
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "snake_case")
)]
pub enum PatternKind {
    #[default]
    Full,
    LateralOnly,
    DiagonalOnly,
}

impl PatternKind {
    pub fn pattern(self) -> MovementPattern {
        match self {
            PatternKind::Full => MovementPattern::full(),
            PatternKind::LateralOnly => MovementPattern::lateral_only(),
            PatternKind::DiagonalOnly => MovementPattern::diagonal_only(),
        }
    }
}

/// Which engine to run and how.
///
/// `movement` only applies to the array engine and `volume` only to the
/// pooled one. `iteration_limit` caps expansions for both.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(default)
)]
pub struct PathfinderConfig {
    pub engine: EngineKind,
    pub movement: PatternKind,
    pub iteration_limit: Option<u32>,
    pub volume: u16,
}

impl PathfinderConfig {
    pub fn build(&self) -> Box<dyn PathFinder + Send> {
        match self.engine {
            EngineKind::Array => {
                if self.volume > 0 {
                    log::warn!("array engine ignores volume {}", self.volume);
                }
                Box::new(
                    ArrayAstar::new(self.movement.pattern())
                        .with_iteration_limit(self.iteration_limit),
                )
            }
            EngineKind::Pooled => {
                if self.movement != PatternKind::Full {
                    log::warn!(
                        "pooled engine always uses eight-way movement, ignoring {:?}",
                        self.movement
                    );
                }
                Box::new(AstarSearch::new(self.volume).with_step_limit(self.iteration_limit))
            }
        }
    }
}
