use std::collections::BTreeMap;
use std::sync::Arc;

use crate::error::{Error, Result};
use crate::units::*;

#[derive(Debug, Clone, PartialEq)]
pub struct ParticleDefinition {
    pub name:         String,
    pub pdg_encoding: i32,
    pub mass:         f64,
    /// In units of the positron charge.
    pub charge:       f64,
}

/// Registry of particle species by name.
#[derive(Debug, Clone)]
pub struct ParticleTable {
    particles: BTreeMap<String, Arc<ParticleDefinition>>,
}

impl Default for ParticleTable {
    fn default() -> Self { Self::with_standard() }
}

impl ParticleTable {
    pub fn empty() -> Self {
        Self {
            particles: BTreeMap::new(),
        }
    }

    pub fn with_standard() -> Self {
        let mut table = Self::empty();
        let muon_mass = 105.658_375_5 * MEV;
        let alpha_mass = 3727.379_409_7 * MEV;
        for &(name, pdg, mass, charge) in &[
            ("gamma", 22, 0.0, 0.0),
            ("e-", 11, ELECTRON_MASS_C2, -1.0),
            ("e+", -11, ELECTRON_MASS_C2, 1.0),
            ("mu-", 13, muon_mass, -1.0),
            ("mu+", -13, muon_mass, 1.0),
            ("proton", 2212, PROTON_MASS_C2, 1.0),
            ("neutron", 2112, NEUTRON_MASS_C2, 0.0),
            ("alpha", 1_000_020_040, alpha_mass, 2.0),
        ] {
            table.insert(ParticleDefinition {
                name: name.to_owned(),
                pdg_encoding: pdg,
                mass,
                charge,
            });
        }
        table
    }

    pub fn insert(&mut self, definition: ParticleDefinition) -> Arc<ParticleDefinition> {
        let definition = Arc::new(definition);
        self.particles.insert(definition.name.clone(), definition.clone());
        definition
    }

    pub fn find_particle(&self, name: &str) -> Result<Arc<ParticleDefinition>> {
        self.particles
            .get(name)
            .cloned()
            .ok_or_else(|| Error::UnknownParticle(name.to_owned()))
    }

    pub fn find_by_encoding(&self, pdg: i32) -> Option<Arc<ParticleDefinition>> {
        self.particles.values().find(|p| p.pdg_encoding == pdg).cloned()
    }

    pub fn len(&self) -> usize { self.particles.len() }

    pub fn is_empty(&self) -> bool { self.particles.is_empty() }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gamma_is_massless_and_neutral() {
        let table = ParticleTable::with_standard();
        let gamma = table.find_particle("gamma").unwrap();
        assert_eq!(gamma.pdg_encoding, 22);
        assert_eq!(gamma.mass, 0.0);
        assert_eq!(gamma.charge, 0.0);
        assert!(Arc::ptr_eq(&gamma, &table.find_by_encoding(22).unwrap()));
    }

    #[test]
    fn unknown_species_is_an_error() {
        let table = ParticleTable::with_standard();
        assert!(matches!(table.find_particle("graviton"), Err(Error::UnknownParticle(ref n)) if n == "graviton"));
        assert!(ParticleTable::empty().find_particle("gamma").is_err());
    }
}
