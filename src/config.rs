//! Scenario parameters.
//!
//! Every field has a default, so an empty JSON object describes the baseline
//! shielding study. Lengths are in millimetres and energies in MeV, the
//! crate's internal units.
use std::path::Path;

use crate::error::{Error, Result};
use crate::sources::{AnySource, PencilSource, SlabSource};
use crate::units::*;
use crate::vector::{UnitVector, Vector};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum SourceConfig {
    /// Uniform over `|x| <= half_x, |z| <= half_z` at fixed `y`.
    Slab {
        half_x:    f64,
        half_z:    f64,
        y:         f64,
        direction: UnitVector<f64>,
    },
    Pencil {
        position:  Vector<f64>,
        direction: UnitVector<f64>,
    },
}

impl SourceConfig {
    pub fn to_source(&self) -> AnySource {
        match *self {
            SourceConfig::Slab {
                half_x,
                half_z,
                y,
                direction,
            } => AnySource::Slab(SlabSource {
                half_x,
                half_z,
                src_y: y,
                src_dir: direction,
            }),
            SourceConfig::Pencil { position, direction } => AnySource::Pencil(PencilSource {
                src_pos: position,
                src_dir: direction,
            }),
        }
    }
}

impl Default for SourceConfig {
    fn default() -> Self {
        SourceConfig::Slab {
            half_x:    5.0 * M,
            half_z:    5.0 * M,
            y:         -4.5 * M,
            direction: UnitVector::y(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScenarioConfig {
    pub world_half_extent:   f64,
    pub shield_half_extent:  f64,
    pub chamber_half_extent: f64,
    pub patient_radius:      f64,
    /// Full length of the patient cylinder.
    pub patient_length:      f64,

    pub world_material:   String,
    pub shield_material:  String,
    pub chamber_material: String,
    pub patient_material: String,

    pub check_overlaps:   bool,
    pub overlap_samples:  usize,
    pub sd_verbose_level: u32,

    pub particle: String,
    pub energy:   f64,
    pub source:   SourceConfig,

    pub seed:     u64,
    pub n_events: u64,
    pub workers:  usize,
}

impl Default for ScenarioConfig {
    fn default() -> Self {
        Self {
            world_half_extent:   5.0 * M,
            shield_half_extent:  4.0 * M,
            chamber_half_extent: 3.0 * M,
            patient_radius:      2.75 * M,
            patient_length:      2.75 * M,

            world_material:   "G4_Galactic".to_owned(),
            shield_material:  "G4_Pb".to_owned(),
            chamber_material: "G4_AIR".to_owned(),
            patient_material: "G4_MUSCLE_STRIATED_ICRU".to_owned(),

            check_overlaps:   true,
            overlap_samples:  crate::volume::DEFAULT_OVERLAP_SAMPLES,
            sd_verbose_level: 1,

            particle: "gamma".to_owned(),
            energy:   10.0 * GEV,
            source:   SourceConfig::default(),

            seed:     0,
            n_events: 1000,
            workers:  1,
        }
    }
}

impl ScenarioConfig {
    pub fn from_json_str(s: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    pub fn validate(&self) -> Result<()> {
        let lengths = [
            ("world_half_extent", self.world_half_extent),
            ("shield_half_extent", self.shield_half_extent),
            ("chamber_half_extent", self.chamber_half_extent),
            ("patient_radius", self.patient_radius),
            ("patient_length", self.patient_length),
        ];
        for (name, v) in lengths.iter() {
            if !(v.is_finite() && *v > 0.0) {
                return Err(Error::InvalidConfig(format!("{} must be positive, got {}", name, v)));
            }
        }
        let nesting = [
            ("patient_radius", self.patient_radius, "chamber_half_extent", self.chamber_half_extent),
            ("patient_length / 2", 0.5 * self.patient_length, "chamber_half_extent", self.chamber_half_extent),
            ("chamber_half_extent", self.chamber_half_extent, "shield_half_extent", self.shield_half_extent),
            ("shield_half_extent", self.shield_half_extent, "world_half_extent", self.world_half_extent),
        ];
        for &(inner, a, outer, b) in nesting.iter() {
            if a >= b {
                return Err(Error::InvalidConfig(format!("{} ({}) must be smaller than {} ({})", inner, a, outer, b)));
            }
        }
        if !(self.energy.is_finite() && self.energy >= 0.0) {
            return Err(Error::InvalidConfig(format!("energy must be non-negative, got {}", self.energy)));
        }
        if let SourceConfig::Slab { half_x, half_z, .. } = self.source {
            if !(half_x >= 0.0 && half_z >= 0.0) {
                return Err(Error::InvalidConfig("slab half widths must be non-negative".to_owned()));
            }
        }
        if self.n_events == 0 {
            return Err(Error::InvalidConfig("n_events must be at least 1".to_owned()));
        }
        if self.workers == 0 {
            return Err(Error::InvalidConfig("workers must be at least 1".to_owned()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_object_is_baseline() {
        let config = ScenarioConfig::from_json_str("{}").unwrap();
        assert_eq!(config, ScenarioConfig::default());
        assert_eq!(config.energy, 10_000.0);
        assert_eq!(config.patient_radius, 2750.0);
    }

    #[test]
    fn partial_override() {
        let config = ScenarioConfig::from_json_str(
            r#"{
                "shield_material": "Lu2SiO5",
                "workers": 4,
                "source": {"kind": "Pencil", "position": {"x": 0, "y": -4500, "z": 0}, "direction": {"x": 0, "y": 1, "z": 0}}
            }"#,
        )
        .unwrap();
        assert_eq!(config.shield_material, "Lu2SiO5");
        assert_eq!(config.workers, 4);
        assert_eq!(config.world_half_extent, 5000.0);
        assert!(matches!(config.source, SourceConfig::Pencil { .. }));
    }

    #[test]
    fn invalid_values_are_rejected() {
        assert!(matches!(
            ScenarioConfig::from_json_str(r#"{"shield_half_extent": -1}"#),
            Err(Error::InvalidConfig(_))
        ));
        assert!(matches!(ScenarioConfig::from_json_str(r#"{"workers": 0}"#), Err(Error::InvalidConfig(_))));
        assert!(matches!(ScenarioConfig::from_json_str(r#"{"energy": "lots"}"#), Err(Error::Config(_))));
        assert!(matches!(ScenarioConfig::from_json_str(r#"{"n_events": 0}"#), Err(Error::InvalidConfig(_))));
    }

    #[test]
    fn volumes_must_nest() {
        for json in &[
            r#"{"check_overlaps": false, "patient_radius": 6000.0}"#,
            r#"{"patient_radius": 3000.0}"#,
            r#"{"patient_length": 6000.0}"#,
            r#"{"chamber_half_extent": 4500.0}"#,
            r#"{"shield_half_extent": 5000.0}"#,
            r#"{"world_half_extent": 3500.0}"#,
        ] {
            let err = ScenarioConfig::from_json_str(json).unwrap_err();
            assert!(matches!(err, Error::InvalidConfig(_)), "{}: {}", json, err);
        }
        let config = ScenarioConfig::from_json_str(r#"{"patient_radius": 2999.0, "patient_length": 5998.0}"#).unwrap();
        assert_eq!(config.patient_radius, 2999.0);
    }
}
