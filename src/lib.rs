#![allow(clippy::many_single_char_names, clippy::too_many_arguments)]
#[macro_use]
extern crate derive_more;
#[macro_use]
extern crate serde;

pub mod units;
mod error;
pub use crate::error::{Error, OverlapKind, Result};
mod random;
pub use crate::random::{worker_streams, PRng};
mod vector;
pub use crate::vector::{UnitVector, Vector};
mod material;
pub use crate::material::{Element, Material, MaterialDatabase, MaterialState};
mod geometry;
pub use crate::geometry::{BoxSolid, Inside, Solid, TubeSolid};
mod volume;
pub use crate::volume::{LogicalVolume, PlacedVolume, VolumeId, VolumeTree};
mod particle;
pub use crate::particle::{ParticleDefinition, ParticleTable};
mod event;
pub use crate::event::{CollectorHit, Event, HitsCollection, PrimaryParticle, PrimaryVertex, ScoreMap};
mod detector;
pub use crate::detector::{
    DetectorId, DetectorManager, EnergyDeposit, MultiFunctionalDetector, PrimitiveScorer, SensitiveDetector,
    ShieldCollector, Step,
};
mod sources;
pub use crate::sources::{AnySource, ParticleGun, PencilSource, SlabSource, Source};
mod config;
pub use crate::config::{ScenarioConfig, SourceConfig};
mod run;
pub use crate::run::{DetectorConstruction, PrimaryGeneratorAction, RunManager, Setup};
pub mod scenario;
pub use crate::scenario::{ShieldingConstruction, ShieldingPrimaryGenerator};
