//! Configuration-time failures.
//!
//! Every variant is fatal: the run controller aborts setup and nothing is
//! retried.

use thiserror::Error;

use crate::vector::Vector;

pub type Result<T> = std::result::Result<T, Error>;

/// Which placement rule an overlapping volume broke.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum OverlapKind {
    /// A surface point of the daughter lies outside its mother.
    ExceedsMother,
    /// A surface point of the daughter lies inside a sibling, or the two
    /// coincide.
    Sibling,
    /// A sibling lies entirely inside the daughter.
    EnclosesSibling,
}

#[derive(Error, Debug)]
pub enum Error {
    #[error("material `{0}` not found in the material database")]
    UnknownMaterial(String),

    #[error("element `{0}` not found in the material database")]
    UnknownElement(String),

    #[error("material `{0}` is already defined")]
    DuplicateMaterial(String),

    #[error("invalid material `{name}`: {reason}")]
    InvalidMaterial { name: String, reason: String },

    #[error("particle `{0}` not found in the particle table")]
    UnknownParticle(String),

    #[error("invalid solid `{name}`: {reason}")]
    InvalidSolid { name: String, reason: String },

    #[error("world volume is already placed, cannot place `{0}` without a mother")]
    WorldAlreadyPlaced(String),

    #[error("volume `{0}` needs a mother volume, place the world first")]
    MissingParent(String),

    #[error("overlap ({kind:?}) placing `{volume}` against `{other}` at {point}")]
    Overlap {
        kind:   OverlapKind,
        volume: String,
        other:  String,
        point:  Vector<f64>,
    },

    #[error("no volume named `{0}`")]
    UnknownVolume(String),

    #[error("sensitive detector `{0}` is not registered with the detector manager")]
    UnregisteredDetector(String),

    #[error("sensitive detector `{0}` is already registered")]
    DuplicateDetector(String),

    #[error("scorer `{scorer}` is already registered on detector `{detector}`")]
    DuplicateScorer { detector: String, scorer: String },

    #[error("run manager is not initialized")]
    NotInitialized,

    #[error("run manager is already initialized")]
    AlreadyInitialized,

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("config parse error: {0}")]
    Config(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

impl Error {
    pub fn invalid_solid(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidSolid {
            name:   name.into(),
            reason: reason.into(),
        }
    }

    pub fn invalid_material(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidMaterial {
            name:   name.into(),
            reason: reason.into(),
        }
    }
}
