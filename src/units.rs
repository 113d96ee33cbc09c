//! Internal unit system.
//!
//! Lengths are in millimetres, times in nanoseconds, energies in MeV and
//! charges in units of the positron charge. Multiply a literal by a unit to
//! bring it into the internal system, divide by one to read it back out.
#![allow(clippy::excessive_precision)]

pub const MM: f64 = 1.0;
pub const CM: f64 = 10.0 * MM;
pub const M: f64 = 1000.0 * MM;
pub const MM3: f64 = MM * MM * MM;
pub const CM3: f64 = CM * CM * CM;
pub const M3: f64 = M * M * M;

pub const NS: f64 = 1.0;
pub const S: f64 = 1.0e9 * NS;

pub const MEV: f64 = 1.0;
pub const EV: f64 = 1.0e-6 * MEV;
pub const KEV: f64 = 1.0e-3 * MEV;
pub const GEV: f64 = 1.0e3 * MEV;
pub const TEV: f64 = 1.0e6 * MEV;

pub const E_SI: f64 = 1.602176634e-19;
pub const JOULE: f64 = EV / E_SI;
pub const KG: f64 = JOULE * S * S / (M * M);
pub const G: f64 = 1.0e-3 * KG;
pub const MG: f64 = 1.0e-3 * G;
pub const G_PER_CM3: f64 = G / CM3;
pub const MOLE: f64 = 1.0;
pub const G_PER_MOLE: f64 = G / MOLE;

pub const KELVIN: f64 = 1.0;
pub const PASCAL: f64 = JOULE / M3;
pub const ATMOSPHERE: f64 = 101_325.0 * PASCAL;

pub const STP_TEMPERATURE: f64 = 273.15 * KELVIN;

pub const PI: f64 = core::f64::consts::PI;
pub const TWOPI: f64 = 2.0 * PI;

pub const ELECTRON_MASS_C2: f64 = 0.510_998_95 * MEV;
pub const PROTON_MASS_C2: f64 = 938.272_088_16 * MEV;
pub const NEUTRON_MASS_C2: f64 = 939.565_420_52 * MEV;
pub const AMU_C2: f64 = 931.494_102_42 * MEV;
