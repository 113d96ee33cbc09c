//! Sensitive detectors and the registry that owns them.
//!
//! A detector has to be registered with the [`DetectorManager`] before it can
//! be attached to a volume; attaching by name looks the detector up in the
//! registry and fails with [`Error::UnregisteredDetector`] otherwise.
use core::fmt::Debug;

use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::event::{CollectorHit, Event, HitsCollection};
use crate::vector::Vector;
use crate::volume::{VolumeId, VolumeTree};

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DetectorId(usize);

/// What the transport engine reports for one step inside a volume.
#[derive(Debug, Clone)]
pub struct Step {
    pub volume:               VolumeId,
    pub copy_no:              u32,
    pub track_id:             u32,
    pub particle:             String,
    pub pre_position:         Vector<f64>,
    pub post_position:        Vector<f64>,
    pub global_time:          f64,
    pub total_energy_deposit: f64,
}

pub trait SensitiveDetector: Debug + Send + Sync {
    fn name(&self) -> &str;

    /// Unqualified names of the collections this detector fills.
    fn collection_names(&self) -> Vec<String>;

    /// Called at the start of every event, before any step.
    fn initialize(&self, event: &mut Event);

    /// Returns whether the step produced a record.
    fn process_hits(&self, step: &Step, event: &mut Event) -> bool;

    fn end_of_event(&self, _event: &mut Event) {}
}

fn collection_key(detector: &str, collection: &str) -> String { format!("{}/{}", detector, collection) }

/// Records every energy-depositing step as a separate hit.
#[derive(Debug, Clone)]
pub struct ShieldCollector {
    name:       String,
    collection: String,
}

impl ShieldCollector {
    pub fn new(name: impl Into<String>, collection: impl Into<String>) -> Self {
        Self {
            name:       name.into(),
            collection: collection.into(),
        }
    }

    pub fn collection_key(&self) -> String { collection_key(&self.name, &self.collection) }
}

impl SensitiveDetector for ShieldCollector {
    fn name(&self) -> &str { &self.name }

    fn collection_names(&self) -> Vec<String> { vec![self.collection.clone()] }

    fn initialize(&self, event: &mut Event) {
        event
            .hits
            .insert(self.collection_key(), HitsCollection::Hits(Vec::new()));
    }

    fn process_hits(&self, step: &Step, event: &mut Event) -> bool {
        if step.total_energy_deposit == 0.0 {
            return false;
        }
        let hit = CollectorHit {
            track_id: step.track_id,
            edep:     step.total_energy_deposit,
            position: step.post_position,
            time:     step.global_time,
        };
        match event.hits.get_mut(&self.collection_key()) {
            Some(HitsCollection::Hits(hits)) => hits.push(hit),
            _ => {
                event
                    .hits
                    .insert(self.collection_key(), HitsCollection::Hits(vec![hit]));
            }
        }
        true
    }
}

/// A quantity scored per step and summed per copy number.
pub trait PrimitiveScorer: Debug + Send + Sync {
    fn name(&self) -> &str;

    fn score(&self, step: &Step) -> Option<f64>;
}

#[derive(Debug, Clone)]
pub struct EnergyDeposit {
    name: String,
}

impl EnergyDeposit {
    pub fn new(name: impl Into<String>) -> Self { Self { name: name.into() } }
}

impl PrimitiveScorer for EnergyDeposit {
    fn name(&self) -> &str { &self.name }

    fn score(&self, step: &Step) -> Option<f64> {
        if step.total_energy_deposit > 0.0 {
            Some(step.total_energy_deposit)
        } else {
            None
        }
    }
}

/// Detector whose output is produced by its registered scorers.
#[derive(Debug)]
pub struct MultiFunctionalDetector {
    name:    String,
    scorers: Vec<Box<dyn PrimitiveScorer>>,
}

impl MultiFunctionalDetector {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name:    name.into(),
            scorers: Vec::new(),
        }
    }

    pub fn register_primitive(&mut self, scorer: Box<dyn PrimitiveScorer>) -> Result<()> {
        if self.scorers.iter().any(|s| s.name() == scorer.name()) {
            return Err(Error::DuplicateScorer {
                detector: self.name.clone(),
                scorer:   scorer.name().to_owned(),
            });
        }
        self.scorers.push(scorer);
        Ok(())
    }
}

impl SensitiveDetector for MultiFunctionalDetector {
    fn name(&self) -> &str { &self.name }

    fn collection_names(&self) -> Vec<String> { self.scorers.iter().map(|s| s.name().to_owned()).collect() }

    fn initialize(&self, event: &mut Event) {
        for s in &self.scorers {
            event
                .hits
                .insert(collection_key(&self.name, s.name()), HitsCollection::Scores(Default::default()));
        }
    }

    fn process_hits(&self, step: &Step, event: &mut Event) -> bool {
        let mut scored = false;
        for s in &self.scorers {
            let value = match s.score(step) {
                Some(v) => v,
                None => continue,
            };
            let entry = event
                .hits
                .entry(collection_key(&self.name, s.name()))
                .or_insert_with(|| HitsCollection::Scores(Default::default()));
            if let HitsCollection::Scores(map) = entry {
                *map.entry(step.copy_no).or_insert(0.0) += value;
                scored = true;
            }
        }
        scored
    }
}

/// Owns every sensitive detector of a run.
#[derive(Debug, Default)]
pub struct DetectorManager {
    verbose_level: u32,
    detectors:     Vec<Box<dyn SensitiveDetector>>,
}

impl DetectorManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_verbose_level(&mut self, level: u32) { self.verbose_level = level; }

    pub fn verbose_level(&self) -> u32 { self.verbose_level }

    pub fn add_new_detector(&mut self, detector: Box<dyn SensitiveDetector>) -> Result<DetectorId> {
        if self.find_detector(detector.name()).is_some() {
            return Err(Error::DuplicateDetector(detector.name().to_owned()));
        }
        if self.verbose_level > 0 {
            info!("New sensitive detector <{}> is registered", detector.name());
        }
        let id = DetectorId(self.detectors.len());
        self.detectors.push(detector);
        Ok(id)
    }

    pub fn find_detector(&self, name: &str) -> Option<DetectorId> {
        self.detectors
            .iter()
            .position(|d| d.name() == name)
            .map(DetectorId)
    }

    pub fn detector(&self, id: DetectorId) -> &dyn SensitiveDetector { self.detectors[id.0].as_ref() }

    /// Attaches a registered detector to every volume whose logical volume is
    /// named `volume`. Returns how many volumes were made sensitive.
    pub fn set_sensitive_detector(&self, tree: &mut VolumeTree, volume: &str, detector: &str) -> Result<usize> {
        let id = self
            .find_detector(detector)
            .ok_or_else(|| Error::UnregisteredDetector(detector.to_owned()))?;
        let targets = tree.find_logical(volume);
        if targets.is_empty() {
            return Err(Error::UnknownVolume(volume.to_owned()));
        }
        for &v in &targets {
            tree.get_mut(v).logical.set_sensitive_detector(id);
        }
        if self.verbose_level > 0 {
            info!(volume, detector, "attached sensitive detector");
        }
        Ok(targets.len())
    }

    /// Fully qualified names of every collection any detector fills.
    pub fn collection_names(&self) -> Vec<String> {
        self.detectors
            .iter()
            .flat_map(|d| {
                d.collection_names()
                    .into_iter()
                    .map(move |c| collection_key(d.name(), &c))
            })
            .collect()
    }

    pub fn begin_event(&self, event: &mut Event) {
        for d in &self.detectors {
            d.initialize(event);
        }
    }

    /// Hands the step to the detector attached to the step's volume, if any.
    pub fn process_step(&self, tree: &VolumeTree, step: &Step, event: &mut Event) -> bool {
        match tree.get(step.volume).logical.sensitive_detector() {
            Some(id) => {
                let recorded = self.detectors[id.0].process_hits(step, event);
                if recorded && self.verbose_level > 1 {
                    debug!(detector = self.detectors[id.0].name(), edep = step.total_energy_deposit, "hit");
                }
                recorded
            }
            None => false,
        }
    }

    pub fn end_event(&self, event: &mut Event) {
        for d in &self.detectors {
            d.end_of_event(event);
        }
    }

    pub fn len(&self) -> usize { self.detectors.len() }

    pub fn is_empty(&self) -> bool { self.detectors.is_empty() }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::BoxSolid;
    use crate::material::MaterialDatabase;
    use crate::volume::LogicalVolume;
    use approx::assert_relative_eq;
    use std::sync::Arc;

    fn two_volumes() -> (VolumeTree, VolumeId, VolumeId) {
        let mut db = MaterialDatabase::new();
        let vacuum = db.find_or_build_material("G4_Galactic").unwrap();
        let lead = db.find_or_build_material("G4_Pb").unwrap();
        let mut tree = VolumeTree::new().with_overlap_samples(100);
        let w = tree
            .place(
                None,
                LogicalVolume::new("World", Arc::new(BoxSolid::cube("World", 10.0).unwrap()), vacuum),
                Vector::ZERO,
                0,
                true,
            )
            .unwrap();
        let s = tree
            .place(
                Some(w),
                LogicalVolume::new("Shield", Arc::new(BoxSolid::cube("Shield", 5.0).unwrap()), lead),
                Vector::ZERO,
                0,
                true,
            )
            .unwrap();
        (tree, w, s)
    }

    fn step(volume: VolumeId, edep: f64) -> Step {
        Step {
            volume,
            copy_no: 0,
            track_id: 1,
            particle: "gamma".to_owned(),
            pre_position: Vector::ZERO,
            post_position: Vector::new(1.0, 2.0, 3.0),
            global_time: 4.0,
            total_energy_deposit: edep,
        }
    }

    #[test]
    fn attaching_unregistered_detector_fails() {
        let (mut tree, ..) = two_volumes();
        let manager = DetectorManager::new();
        let err = manager
            .set_sensitive_detector(&mut tree, "Shield", "detectorSD")
            .unwrap_err();
        assert!(matches!(err, Error::UnregisteredDetector(ref n) if n == "detectorSD"));
    }

    #[test]
    fn attaching_to_unknown_volume_fails() {
        let (mut tree, ..) = two_volumes();
        let mut manager = DetectorManager::new();
        manager
            .add_new_detector(Box::new(ShieldCollector::new("detectorSD", "DetectorHitsCollection")))
            .unwrap();
        assert!(matches!(
            manager.set_sensitive_detector(&mut tree, "Hull", "detectorSD"),
            Err(Error::UnknownVolume(_))
        ));
    }

    #[test]
    fn duplicate_detector_names_are_rejected() {
        let mut manager = DetectorManager::new();
        manager
            .add_new_detector(Box::new(MultiFunctionalDetector::new("patient")))
            .unwrap();
        assert!(matches!(
            manager.add_new_detector(Box::new(MultiFunctionalDetector::new("patient"))),
            Err(Error::DuplicateDetector(_))
        ));
    }

    #[test]
    fn collector_records_depositing_steps() {
        let (mut tree, w, s) = two_volumes();
        let mut manager = DetectorManager::new();
        manager
            .add_new_detector(Box::new(ShieldCollector::new("detectorSD", "DetectorHitsCollection")))
            .unwrap();
        assert_eq!(manager.set_sensitive_detector(&mut tree, "Shield", "detectorSD").unwrap(), 1);

        let mut event = Event::new(0);
        manager.begin_event(&mut event);
        assert!(manager.process_step(&tree, &step(s, 2.0), &mut event));
        assert!(!manager.process_step(&tree, &step(s, 0.0), &mut event));
        assert!(!manager.process_step(&tree, &step(w, 5.0), &mut event));
        manager.end_event(&mut event);

        match &event.hits["detectorSD/DetectorHitsCollection"] {
            HitsCollection::Hits(hits) => {
                assert_eq!(hits.len(), 1);
                assert_eq!(hits[0].position, Vector::new(1.0, 2.0, 3.0));
                assert_eq!(hits[0].time, 4.0);
            }
            other => panic!("unexpected collection {:?}", other),
        }
    }

    #[test]
    fn energy_deposit_accumulates_per_copy() {
        let (mut tree, _, s) = two_volumes();
        let mut patient = MultiFunctionalDetector::new("patient");
        patient
            .register_primitive(Box::new(EnergyDeposit::new("edep")))
            .unwrap();
        assert!(patient
            .register_primitive(Box::new(EnergyDeposit::new("edep")))
            .is_err());
        let mut manager = DetectorManager::new();
        manager.add_new_detector(Box::new(patient)).unwrap();
        manager.set_sensitive_detector(&mut tree, "Shield", "patient").unwrap();
        assert_eq!(manager.collection_names(), vec!["patient/edep".to_owned()]);

        let mut event = Event::new(3);
        manager.begin_event(&mut event);
        assert!(event.hits["patient/edep"].is_empty());
        for &e in &[0.5, 1.25, 0.0] {
            manager.process_step(&tree, &step(s, e), &mut event);
        }
        let scores = &event.hits["patient/edep"];
        assert_eq!(scores.len(), 1);
        assert_relative_eq!(scores.total(), 1.75);
    }
}
