use std::collections::BTreeMap;
use std::sync::Arc;

use crate::particle::ParticleDefinition;
use crate::vector::{UnitVector, Vector};

#[derive(Debug, Clone)]
pub struct PrimaryParticle {
    pub definition:         Arc<ParticleDefinition>,
    pub kinetic_energy:     f64,
    pub momentum_direction: UnitVector<f64>,
}

#[derive(Debug, Clone)]
pub struct PrimaryVertex {
    pub position:  Vector<f64>,
    pub time:      f64,
    pub particles: Vec<PrimaryParticle>,
}

/// One energy-depositing step recorded by a per-step collector.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct CollectorHit {
    pub track_id: u32,
    pub edep:     f64,
    pub position: Vector<f64>,
    pub time:     f64,
}

/// Accumulated score per copy number.
pub type ScoreMap = BTreeMap<u32, f64>;

#[derive(Debug, Clone, PartialEq)]
pub enum HitsCollection {
    Hits(Vec<CollectorHit>),
    Scores(ScoreMap),
}

impl HitsCollection {
    pub fn len(&self) -> usize {
        match self {
            HitsCollection::Hits(h) => h.len(),
            HitsCollection::Scores(s) => s.len(),
        }
    }

    pub fn is_empty(&self) -> bool { self.len() == 0 }

    /// Total deposited energy in the collection.
    pub fn total(&self) -> f64 {
        match self {
            HitsCollection::Hits(h) => h.iter().map(|h| h.edep).sum(),
            HitsCollection::Scores(s) => s.values().sum(),
        }
    }
}

/// Collections of one event, keyed `"<detector>/<collection>"`.
pub type HitsCollections = BTreeMap<String, HitsCollection>;

#[derive(Debug, Clone, Default)]
pub struct Event {
    pub id:       u64,
    pub vertices: Vec<PrimaryVertex>,
    pub hits:     HitsCollections,
}

impl Event {
    pub fn new(id: u64) -> Self {
        Self {
            id,
            ..Self::default()
        }
    }

    pub fn add_primary_vertex(&mut self, vertex: PrimaryVertex) { self.vertices.push(vertex); }

    pub fn primaries(&self) -> impl Iterator<Item = (&PrimaryVertex, &PrimaryParticle)> {
        self.vertices
            .iter()
            .flat_map(|v| v.particles.iter().map(move |p| (v, p)))
    }
}
