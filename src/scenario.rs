//! The spacecraft shielding study.
//!
//! A vacuum world holds a lead shield, the shield holds an air chamber and the
//! chamber holds a muscle-tissue patient cylinder, all centred on the origin.
//! The shield records every depositing step; the patient scores the energy
//! deposited per event. Gammas start on a plane below the patient and travel
//! along +y.
use std::sync::Arc;

use tracing::info;

use crate::config::ScenarioConfig;
use crate::detector::{DetectorManager, EnergyDeposit, MultiFunctionalDetector, ShieldCollector};
use crate::error::Result;
use crate::event::Event;
use crate::geometry::{BoxSolid, TubeSolid};
use crate::material::MaterialDatabase;
use crate::particle::ParticleTable;
use crate::random::PRng;
use crate::run::{DetectorConstruction, PrimaryGeneratorAction};
use crate::sources::{AnySource, ParticleGun, Source};
use crate::units::*;
use crate::vector::Vector;
use crate::volume::{LogicalVolume, VolumeTree};

pub const WORLD: &str = "World";
pub const SHIELD: &str = "Shield";
pub const AIR_CHAMBER: &str = "AirChamber";
pub const PATIENT: &str = "Patient";

pub const SHIELD_DETECTOR: &str = "detectorSD";
pub const SHIELD_HITS: &str = "DetectorHitsCollection";
pub const PATIENT_DETECTOR: &str = "patient";
pub const PATIENT_EDEP: &str = "edep";

/// Scintillator defined alongside the standard materials.
pub const LSO: &str = "Lu2SiO5";

#[derive(Debug, Clone)]
pub struct ShieldingConstruction {
    config: ScenarioConfig,
}

impl Default for ShieldingConstruction {
    fn default() -> Self { Self::new(ScenarioConfig::default()) }
}

impl ShieldingConstruction {
    pub fn new(config: ScenarioConfig) -> Self { Self { config } }

    fn define_materials(&self, materials: &mut MaterialDatabase) -> Result<()> {
        if materials.find_material(LSO).is_none() {
            materials.define_compound(LSO, 7.4 * G_PER_CM3, &[("Lu", 2), ("Si", 1), ("O", 5)])?;
        }
        Ok(())
    }

    fn define_volumes(&self, materials: &mut MaterialDatabase) -> Result<VolumeTree> {
        let c = &self.config;
        let vacuum = materials.find_or_build_material(&c.world_material)?;
        let shielding = materials.find_or_build_material(&c.shield_material)?;
        let air = materials.find_or_build_material(&c.chamber_material)?;
        let tissue = materials.find_or_build_material(&c.patient_material)?;

        let mut tree = VolumeTree::new().with_overlap_samples(c.overlap_samples);
        let check = c.check_overlaps;

        let world = tree.place(
            None,
            LogicalVolume::new(WORLD, Arc::new(BoxSolid::cube(WORLD, c.world_half_extent)?), vacuum),
            Vector::ZERO,
            0,
            check,
        )?;
        let shield = tree.place(
            Some(world),
            LogicalVolume::new(SHIELD, Arc::new(BoxSolid::cube(SHIELD, c.shield_half_extent)?), shielding),
            Vector::ZERO,
            0,
            check,
        )?;
        let chamber = tree.place(
            Some(shield),
            LogicalVolume::new(
                AIR_CHAMBER,
                Arc::new(BoxSolid::cube(AIR_CHAMBER, c.chamber_half_extent)?),
                air,
            ),
            Vector::ZERO,
            0,
            check,
        )?;
        tree.place(
            Some(chamber),
            LogicalVolume::new(
                PATIENT,
                Arc::new(TubeSolid::cylinder(PATIENT, c.patient_radius, 0.5 * c.patient_length)?),
                tissue,
            ),
            Vector::ZERO,
            0,
            check,
        )?;
        Ok(tree)
    }
}

impl DetectorConstruction for ShieldingConstruction {
    fn construct(&mut self, materials: &mut MaterialDatabase) -> Result<VolumeTree> {
        self.define_materials(materials)?;
        let tree = self.define_volumes(materials)?;
        info!(volumes = tree.len(), "shielding geometry constructed");
        Ok(tree)
    }

    fn construct_sd_and_field(&mut self, tree: &mut VolumeTree, detectors: &mut DetectorManager) -> Result<()> {
        detectors.set_verbose_level(self.config.sd_verbose_level);

        detectors.add_new_detector(Box::new(ShieldCollector::new(SHIELD_DETECTOR, SHIELD_HITS)))?;
        detectors.set_sensitive_detector(tree, SHIELD, SHIELD_DETECTOR)?;

        let mut patient = MultiFunctionalDetector::new(PATIENT_DETECTOR);
        patient.register_primitive(Box::new(EnergyDeposit::new(PATIENT_EDEP)))?;
        detectors.add_new_detector(Box::new(patient))?;
        detectors.set_sensitive_detector(tree, PATIENT, PATIENT_DETECTOR)?;
        Ok(())
    }
}

/// One primary per event from `source`, with fixed species and energy.
#[derive(Debug, Clone)]
pub struct ShieldingPrimaryGenerator<S = AnySource> {
    gun:    ParticleGun,
    source: S,
}

impl<S: Source> ShieldingPrimaryGenerator<S> {
    pub fn new(particles: &ParticleTable, particle: &str, energy: f64, source: S) -> Result<Self> {
        let mut gun = ParticleGun::new(1, particles.find_particle(particle)?);
        gun.set_particle_energy(energy);
        Ok(Self { gun, source })
    }

    pub fn gun(&self) -> &ParticleGun { &self.gun }
}

impl ShieldingPrimaryGenerator<AnySource> {
    pub fn from_config(particles: &ParticleTable, config: &ScenarioConfig) -> Result<Self> {
        Self::new(particles, &config.particle, config.energy, config.source.to_source())
    }
}

impl<S: Source> PrimaryGeneratorAction for ShieldingPrimaryGenerator<S> {
    fn generate_primaries(&mut self, event: &mut Event, rng: &mut PRng) -> Result<()> {
        let (position, direction) = self.source.launch(rng);
        self.gun.set_particle_position(position);
        self.gun.set_particle_momentum_direction(direction);
        self.gun.generate_primary_vertex(event);
        Ok(())
    }
}
