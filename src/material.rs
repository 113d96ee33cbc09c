//! Material database.
//!
//! Materials are resolved by symbolic name from a table of standard NIST
//! compositions, built on first request and cached. A resolved material is an
//! immutable `Arc` shared by every volume that uses it.
use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::debug;

use crate::error::{Error, Result};
use crate::units::*;

#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    pub symbol: String,
    pub name:   String,
    pub z:      u32,
    /// Molar mass.
    pub a:      f64,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum MaterialState {
    Solid,
    Liquid,
    Gas,
}

#[derive(Debug, Clone)]
pub struct Material {
    pub name:        String,
    pub density:     f64,
    pub state:       MaterialState,
    pub temperature: f64,
    pub pressure:    f64,
    /// Elements with their mass fractions, summing to one.
    pub components:  Vec<(Arc<Element>, f64)>,
}

impl Material {
    pub fn mass_fraction(&self, symbol: &str) -> f64 {
        self.components
            .iter()
            .filter(|(e, _)| e.symbol == symbol)
            .map(|(_, f)| *f)
            .sum()
    }

    pub fn is_vacuum_like(&self) -> bool {
        self.density < 1e-10 * G_PER_CM3
    }
}

impl PartialEq for Material {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

// (symbol, name, Z, A in g/mole)
const ELEMENTS: &[(&str, &str, u32, f64)] = &[
    ("H", "Hydrogen", 1, 1.00794),
    ("C", "Carbon", 6, 12.0107),
    ("N", "Nitrogen", 7, 14.0067),
    ("O", "Oxygen", 8, 15.9994),
    ("Na", "Sodium", 11, 22.98977),
    ("Mg", "Magnesium", 12, 24.305),
    ("Si", "Silicon", 14, 28.0855),
    ("P", "Phosphorus", 15, 30.973762),
    ("S", "Sulfur", 16, 32.065),
    ("Ar", "Argon", 18, 39.948),
    ("K", "Potassium", 19, 39.0983),
    ("Lu", "Lutetium", 71, 174.967),
    ("Pb", "Lead", 82, 207.217),
];

struct Recipe {
    name:        &'static str,
    /// g/cm3
    density:     f64,
    state:       MaterialState,
    temperature: f64,
    pressure:    f64,
    /// Mass fractions.
    fractions:   &'static [(&'static str, f64)],
}

const NIST_MATERIALS: &[Recipe] = &[
    Recipe {
        name:        "G4_Galactic",
        density:     1e-25,
        state:       MaterialState::Gas,
        temperature: 2.73 * KELVIN,
        pressure:    3e-18 * PASCAL,
        fractions:   &[("H", 1.0)],
    },
    Recipe {
        name:        "G4_Pb",
        density:     11.35,
        state:       MaterialState::Solid,
        temperature: 293.15 * KELVIN,
        pressure:    ATMOSPHERE,
        fractions:   &[("Pb", 1.0)],
    },
    Recipe {
        name:        "G4_AIR",
        density:     0.00120479,
        state:       MaterialState::Gas,
        temperature: 293.15 * KELVIN,
        pressure:    ATMOSPHERE,
        fractions:   &[("C", 0.000124), ("N", 0.755267), ("O", 0.231781), ("Ar", 0.012827)],
    },
    Recipe {
        name:        "G4_MUSCLE_STRIATED_ICRU",
        density:     1.04,
        state:       MaterialState::Solid,
        temperature: 293.15 * KELVIN,
        pressure:    ATMOSPHERE,
        fractions:   &[
            ("H", 0.102),
            ("C", 0.123),
            ("N", 0.035),
            ("O", 0.729),
            ("Na", 0.0008),
            ("Mg", 0.0002),
            ("P", 0.002),
            ("S", 0.005),
            ("K", 0.003),
        ],
    },
];

/// Registry of elements and materials, passed explicitly to whoever builds
/// geometry.
#[derive(Debug, Default)]
pub struct MaterialDatabase {
    elements:  BTreeMap<String, Arc<Element>>,
    materials: BTreeMap<String, Arc<Material>>,
}

impl MaterialDatabase {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn find_or_build_element(&mut self, symbol: &str) -> Result<Arc<Element>> {
        if let Some(e) = self.elements.get(symbol) {
            return Ok(e.clone());
        }
        let &(symbol, name, z, a) = ELEMENTS
            .iter()
            .find(|(s, ..)| *s == symbol)
            .ok_or_else(|| Error::UnknownElement(symbol.to_owned()))?;
        let element = Arc::new(Element {
            symbol: symbol.to_owned(),
            name: name.to_owned(),
            z,
            a: a * G_PER_MOLE,
        });
        self.elements.insert(symbol.to_owned(), element.clone());
        Ok(element)
    }

    pub fn find_material(&self, name: &str) -> Option<Arc<Material>> {
        self.materials.get(name).cloned()
    }

    pub fn find_or_build_material(&mut self, name: &str) -> Result<Arc<Material>> {
        if let Some(m) = self.materials.get(name) {
            return Ok(m.clone());
        }
        let recipe = NIST_MATERIALS
            .iter()
            .find(|r| r.name == name)
            .ok_or_else(|| Error::UnknownMaterial(name.to_owned()))?;
        let mut components = Vec::with_capacity(recipe.fractions.len());
        for &(symbol, fraction) in recipe.fractions {
            components.push((self.find_or_build_element(symbol)?, fraction));
        }
        normalize(&mut components);
        let material = Arc::new(Material {
            name: recipe.name.to_owned(),
            density: recipe.density * G_PER_CM3,
            state: recipe.state,
            temperature: recipe.temperature,
            pressure: recipe.pressure,
            components,
        });
        debug!(material = name, density_g_cm3 = recipe.density, "built standard material");
        self.materials.insert(name.to_owned(), material.clone());
        Ok(material)
    }

    /// Defines a solid compound from integer atom counts per formula unit,
    /// e.g. `[("Lu", 2), ("Si", 1), ("O", 5)]`.
    pub fn define_compound(&mut self, name: &str, density: f64, atoms: &[(&str, u32)]) -> Result<Arc<Material>> {
        if self.materials.contains_key(name) || NIST_MATERIALS.iter().any(|r| r.name == name) {
            return Err(Error::DuplicateMaterial(name.to_owned()));
        }
        if !(density > 0.0) {
            return Err(Error::invalid_material(name, "density must be positive"));
        }
        if atoms.is_empty() || atoms.iter().all(|&(_, n)| n == 0) {
            return Err(Error::invalid_material(name, "no atoms in composition"));
        }
        let mut components = Vec::with_capacity(atoms.len());
        for &(symbol, count) in atoms {
            let element = self.find_or_build_element(symbol)?;
            let mass = f64::from(count) * element.a;
            components.push((element, mass));
        }
        normalize(&mut components);
        let material = Arc::new(Material {
            name: name.to_owned(),
            density,
            state: MaterialState::Solid,
            temperature: STP_TEMPERATURE,
            pressure: ATMOSPHERE,
            components,
        });
        debug!(material = name, density_g_cm3 = density / G_PER_CM3, "defined compound");
        self.materials.insert(name.to_owned(), material.clone());
        Ok(material)
    }

    pub fn materials(&self) -> impl Iterator<Item = &Arc<Material>> {
        self.materials.values()
    }
}

fn normalize(components: &mut [(Arc<Element>, f64)]) {
    let total: f64 = components.iter().map(|(_, f)| f).sum();
    for (_, f) in components.iter_mut() {
        *f /= total;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn standard_materials_resolve() {
        let mut db = MaterialDatabase::new();
        for name in &["G4_Galactic", "G4_Pb", "G4_AIR", "G4_MUSCLE_STRIATED_ICRU"] {
            let m = db.find_or_build_material(name).unwrap();
            let total: f64 = m.components.iter().map(|(_, f)| f).sum();
            assert_relative_eq!(total, 1.0, epsilon = 1e-12);
        }
        let lead = db.find_or_build_material("G4_Pb").unwrap();
        assert_relative_eq!(lead.density / G_PER_CM3, 11.35, max_relative = 1e-12);
        assert!(db.find_or_build_material("G4_Galactic").unwrap().is_vacuum_like());
        assert!(!lead.is_vacuum_like());
    }

    #[test]
    fn resolved_materials_are_shared() {
        let mut db = MaterialDatabase::new();
        let a = db.find_or_build_material("G4_AIR").unwrap();
        let b = db.find_or_build_material("G4_AIR").unwrap();
        assert!(Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn unknown_material_is_an_error() {
        let mut db = MaterialDatabase::new();
        let err = db.find_or_build_material("G4_UNOBTAINIUM").unwrap_err();
        assert!(matches!(err, Error::UnknownMaterial(ref n) if n == "G4_UNOBTAINIUM"));
    }

    #[test]
    fn lso_compound_mass_fractions() {
        let mut db = MaterialDatabase::new();
        let lso = db
            .define_compound("Lu2SiO5", 7.4 * G_PER_CM3, &[("Lu", 2), ("Si", 1), ("O", 5)])
            .unwrap();
        let molar = 2.0 * 174.967 + 28.0855 + 5.0 * 15.9994;
        assert_relative_eq!(lso.mass_fraction("Lu"), 2.0 * 174.967 / molar, max_relative = 1e-9);
        assert_relative_eq!(lso.mass_fraction("O"), 5.0 * 15.9994 / molar, max_relative = 1e-9);
        assert!(Arc::ptr_eq(&lso, &db.find_or_build_material("Lu2SiO5").unwrap()));
    }

    #[test]
    fn bad_compounds_are_rejected() {
        let mut db = MaterialDatabase::new();
        assert!(matches!(
            db.define_compound("G4_Pb", 1.0, &[("Pb", 1)]),
            Err(Error::DuplicateMaterial(_))
        ));
        assert!(matches!(
            db.define_compound("X", 1.0, &[("Xx", 1)]),
            Err(Error::UnknownElement(_))
        ));
        assert!(matches!(
            db.define_compound("Y", 0.0, &[("O", 1)]),
            Err(Error::InvalidMaterial { .. })
        ));
        assert!(matches!(db.define_compound("Z", 1.0, &[]), Err(Error::InvalidMaterial { .. })));
    }
}
