use core::fmt::Debug;

use rand::prelude::{Distribution, Rng};

use crate::error::{Error, Result};
use crate::random::{Azimuth, PRng, Symmetric};
use crate::units::{PI, TWOPI};
use crate::vector::Vector;

/// Half-thickness of a solid's surface.
pub const SURFACE_TOLERANCE: f64 = 1e-9;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Inside {
    In,
    Surface,
    Out,
}

impl Inside {
    /// Classifies a signed distance, negative inside.
    fn from_safety(d: f64) -> Self {
        if d > SURFACE_TOLERANCE {
            Inside::Out
        } else if d > -SURFACE_TOLERANCE {
            Inside::Surface
        } else {
            Inside::In
        }
    }
}

/// A shape in its own local frame, centred on the origin.
pub trait Solid: Debug + Send + Sync {
    fn name(&self) -> &str;

    fn inside(&self, p: Vector<f64>) -> Inside;

    /// Axis-aligned bounding box as `(min, max)`.
    fn extent(&self) -> (Vector<f64>, Vector<f64>);

    /// A random point on the surface, area-weighted.
    fn surface_point(&self, rng: &mut PRng) -> Vector<f64>;

    fn cubic_volume(&self) -> f64;
}

#[derive(Debug, Clone, PartialEq)]
pub struct BoxSolid {
    name:     String,
    pub half: Vector<f64>,
}

impl BoxSolid {
    pub fn new(name: impl Into<String>, hx: f64, hy: f64, hz: f64) -> Result<Self> {
        let name = name.into();
        if !(hx > 0.0 && hy > 0.0 && hz > 0.0) {
            return Err(Error::invalid_solid(name, format!("half lengths ({}, {}, {}) must be positive", hx, hy, hz)));
        }
        Ok(Self {
            name,
            half: Vector::new(hx, hy, hz),
        })
    }

    pub fn cube(name: impl Into<String>, half: f64) -> Result<Self> {
        Self::new(name, half, half, half)
    }
}

impl Solid for BoxSolid {
    fn name(&self) -> &str { &self.name }

    fn inside(&self, p: Vector<f64>) -> Inside {
        let d = p.abs() - self.half;
        Inside::from_safety(d.x.max(d.y).max(d.z))
    }

    fn extent(&self) -> (Vector<f64>, Vector<f64>) { (-self.half, self.half) }

    fn surface_point(&self, rng: &mut PRng) -> Vector<f64> {
        let Vector { x: hx, y: hy, z: hz } = self.half;
        let (ax, ay, az) = (hy * hz, hx * hz, hx * hy);
        let pick = rng.gen::<f64>() * (ax + ay + az);
        let sign = if rng.gen::<bool>() { 1.0 } else { -1.0 };
        let u = |h: f64, rng: &mut PRng| Symmetric { half_width: h }.sample(rng);
        if pick < ax {
            Vector::new(sign * hx, u(hy, rng), u(hz, rng))
        } else if pick < ax + ay {
            Vector::new(u(hx, rng), sign * hy, u(hz, rng))
        } else {
            Vector::new(u(hx, rng), u(hy, rng), sign * hz)
        }
    }

    fn cubic_volume(&self) -> f64 { 8.0 * self.half.x * self.half.y * self.half.z }
}

/// Finite cylinder, optionally hollow and cut in azimuth, along the z axis.
#[derive(Debug, Clone, PartialEq)]
pub struct TubeSolid {
    name:          String,
    pub rmin:      f64,
    pub rmax:      f64,
    pub half_z:    f64,
    pub start_phi: f64,
    pub delta_phi: f64,
}

impl TubeSolid {
    pub fn new(
        name: impl Into<String>,
        rmin: f64,
        rmax: f64,
        half_z: f64,
        start_phi: f64,
        delta_phi: f64,
    ) -> Result<Self> {
        let name = name.into();
        if !(rmin >= 0.0 && rmax > rmin) {
            return Err(Error::invalid_solid(name, format!("radii {} .. {} must satisfy 0 <= rmin < rmax", rmin, rmax)));
        }
        if !(half_z > 0.0) {
            return Err(Error::invalid_solid(name, format!("half length {} must be positive", half_z)));
        }
        if !(delta_phi > 0.0) {
            return Err(Error::invalid_solid(name, format!("delta phi {} must be positive", delta_phi)));
        }
        Ok(Self {
            name,
            rmin,
            rmax,
            half_z,
            start_phi: if delta_phi >= TWOPI { 0.0 } else { start_phi },
            delta_phi: delta_phi.min(TWOPI),
        })
    }

    /// Solid cylinder of the given radius and half length.
    pub fn cylinder(name: impl Into<String>, radius: f64, half_z: f64) -> Result<Self> {
        Self::new(name, 0.0, radius, half_z, 0.0, TWOPI)
    }

    pub fn is_full_circle(&self) -> bool { self.delta_phi >= TWOPI }

    fn phi_safety(&self, p: Vector<f64>) -> f64 {
        if self.is_full_circle() {
            return f64::NEG_INFINITY;
        }
        let r = p.perp();
        let rel = (p.y.atan2(p.x) - self.start_phi).rem_euclid(TWOPI);
        if rel <= self.delta_phi {
            -r * rel.min(self.delta_phi - rel).min(PI / 2.0).sin()
        } else {
            r * (rel - self.delta_phi).min(TWOPI - rel).min(PI / 2.0).sin()
        }
    }
}

impl Solid for TubeSolid {
    fn name(&self) -> &str { &self.name }

    fn inside(&self, p: Vector<f64>) -> Inside {
        let r = p.perp();
        let mut d = (p.z.abs() - self.half_z).max(r - self.rmax);
        if self.rmin > 0.0 {
            d = d.max(self.rmin - r);
        }
        Inside::from_safety(d.max(self.phi_safety(p)))
    }

    fn extent(&self) -> (Vector<f64>, Vector<f64>) {
        let h = Vector::new(self.rmax, self.rmax, self.half_z);
        (-h, h)
    }

    fn surface_point(&self, rng: &mut PRng) -> Vector<f64> {
        let (rmin, rmax, hz, dphi) = (self.rmin, self.rmax, self.half_z, self.delta_phi);
        let outer = dphi * rmax * 2.0 * hz;
        let inner = dphi * rmin * 2.0 * hz;
        let caps = dphi * (rmax * rmax - rmin * rmin);
        let cuts = if self.is_full_circle() { 0.0 } else { 4.0 * (rmax - rmin) * hz };
        let phi = Azimuth {
            start: self.start_phi,
            delta: dphi,
        };
        let z = Symmetric { half_width: hz };
        let pick = rng.gen::<f64>() * (outer + inner + caps + cuts);
        let (r, phi, z) = if pick < outer {
            (rmax, phi.sample(rng), z.sample(rng))
        } else if pick < outer + inner {
            (rmin, phi.sample(rng), z.sample(rng))
        } else if pick < outer + inner + caps {
            let r = (rmin * rmin + rng.gen::<f64>() * (rmax * rmax - rmin * rmin)).sqrt();
            let sign = if rng.gen::<bool>() { 1.0 } else { -1.0 };
            (r, phi.sample(rng), sign * hz)
        } else {
            let r = rmin + rng.gen::<f64>() * (rmax - rmin);
            let edge = if rng.gen::<bool>() { self.start_phi } else { self.start_phi + dphi };
            (r, edge, z.sample(rng))
        };
        Vector::new(r * phi.cos(), r * phi.sin(), z)
    }

    fn cubic_volume(&self) -> f64 { self.delta_phi * (self.rmax * self.rmax - self.rmin * self.rmin) * self.half_z }
}
