use std::sync::Arc;

use rand::{prelude::Distribution, seq::SliceRandom};

use crate::event::{Event, PrimaryParticle, PrimaryVertex};
use crate::particle::ParticleDefinition;
use crate::random::{PRng, Symmetric};
use crate::vector::{UnitVector, Vector};

/// Where and in which direction a primary starts.
pub trait Source {
    fn launch(&self, rng: &mut PRng) -> (Vector<f64>, UnitVector<f64>);
}

impl<S: Source + ?Sized> Source for &S {
    fn launch(&self, rng: &mut PRng) -> (Vector<f64>, UnitVector<f64>) { S::launch(*self, rng) }
}

impl<S: Source + ?Sized> Source for Box<S> {
    fn launch(&self, rng: &mut PRng) -> (Vector<f64>, UnitVector<f64>) { S::launch(self, rng) }
}

/// Picks one of the sources uniformly, then launches from it.
impl<S: Source> Source for [S] {
    fn launch(&self, rng: &mut PRng) -> (Vector<f64>, UnitVector<f64>) {
        match self.choose(rng) {
            Some(src) => src.launch(rng),
            None => unreachable!("No elements in slice"),
        }
    }
}

#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct PencilSource {
    pub src_pos: Vector<f64>,
    pub src_dir: UnitVector<f64>,
}

impl Source for PencilSource {
    fn launch(&self, _rng: &mut PRng) -> (Vector<f64>, UnitVector<f64>) { (self.src_pos, self.src_dir) }
}

/// Uniform over the rectangle `|x| <= half_x, |z| <= half_z` in the plane
/// `y = src_y`, all primaries sharing one direction.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct SlabSource {
    pub half_x:  f64,
    pub half_z:  f64,
    pub src_y:   f64,
    pub src_dir: UnitVector<f64>,
}

impl Source for SlabSource {
    fn launch(&self, rng: &mut PRng) -> (Vector<f64>, UnitVector<f64>) {
        let x = Symmetric { half_width: self.half_x }.sample(rng);
        let z = Symmetric { half_width: self.half_z }.sample(rng);
        (Vector::new(x, self.src_y, z), self.src_dir)
    }
}

/// One of the built-in sources, chosen at run time.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum AnySource {
    Pencil(PencilSource),
    Slab(SlabSource),
}

impl Source for AnySource {
    fn launch(&self, rng: &mut PRng) -> (Vector<f64>, UnitVector<f64>) {
        match self {
            AnySource::Pencil(s) => s.launch(rng),
            AnySource::Slab(s) => s.launch(rng),
        }
    }
}

/// Emits `n_particle` identical primaries from one vertex.
#[derive(Debug, Clone)]
pub struct ParticleGun {
    n_particle: u32,
    definition: Arc<ParticleDefinition>,
    energy:     f64,
    position:   Vector<f64>,
    direction:  UnitVector<f64>,
    time:       f64,
}

impl ParticleGun {
    pub fn new(n_particle: u32, definition: Arc<ParticleDefinition>) -> Self {
        Self {
            n_particle,
            definition,
            energy: 0.0,
            position: Vector::ZERO,
            direction: UnitVector::x(),
            time: 0.0,
        }
    }

    pub fn set_particle_definition(&mut self, definition: Arc<ParticleDefinition>) { self.definition = definition; }

    pub fn set_particle_energy(&mut self, energy: f64) { self.energy = energy; }

    pub fn set_particle_position(&mut self, position: Vector<f64>) { self.position = position; }

    pub fn set_particle_momentum_direction(&mut self, direction: UnitVector<f64>) { self.direction = direction; }

    pub fn set_particle_time(&mut self, time: f64) { self.time = time; }

    pub fn particle_definition(&self) -> &Arc<ParticleDefinition> { &self.definition }

    pub fn particle_energy(&self) -> f64 { self.energy }

    pub fn generate_primary_vertex(&self, event: &mut Event) {
        let particle = PrimaryParticle {
            definition:         self.definition.clone(),
            kinetic_energy:     self.energy,
            momentum_direction: self.direction,
        };
        event.add_primary_vertex(PrimaryVertex {
            position:  self.position,
            time:      self.time,
            particles: vec![particle; self.n_particle as usize],
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::particle::ParticleTable;
    use crate::units::*;
    use rand::SeedableRng;

    #[test]
    fn pencil_is_fixed() {
        let src = PencilSource {
            src_pos: Vector::new(1.0, 2.0, 3.0),
            src_dir: UnitVector::z(),
        };
        let mut rng = PRng::seed_from_u64(0);
        assert_eq!(src.launch(&mut rng), (src.src_pos, src.src_dir));
    }

    #[test]
    fn slab_stays_in_plane() {
        let src = SlabSource {
            half_x:  5.0 * M,
            half_z:  2.0 * M,
            src_y:   -4.5 * M,
            src_dir: UnitVector::y(),
        };
        let mut rng = PRng::seed_from_u64(11);
        for _ in 0..10_000 {
            let (p, v) = src.launch(&mut rng);
            assert!(p.x.abs() <= 5.0 * M);
            assert!(p.z.abs() <= 2.0 * M);
            assert_eq!(p.y, -4.5 * M);
            assert_eq!(v, UnitVector::y());
        }
    }

    #[test]
    fn slice_of_sources_uses_each() {
        let srcs = [
            PencilSource {
                src_pos: Vector::new(-1.0, 0.0, 0.0),
                src_dir: UnitVector::x(),
            },
            PencilSource {
                src_pos: Vector::new(1.0, 0.0, 0.0),
                src_dir: UnitVector::x(),
            },
        ];
        let mut rng = PRng::seed_from_u64(5);
        let n = 2_000;
        let right = (0..n)
            .filter(|_| srcs[..].launch(&mut rng).0.x > 0.0)
            .count();
        assert!(right > n / 3 && right < 2 * n / 3, "{}", right);
    }

    #[test]
    fn gun_emits_configured_particles() {
        let table = ParticleTable::with_standard();
        let mut gun = ParticleGun::new(2, table.find_particle("gamma").unwrap());
        gun.set_particle_energy(10.0 * GEV);
        gun.set_particle_position(Vector::new(0.0, -4.5 * M, 0.0));
        gun.set_particle_momentum_direction(UnitVector::y());
        let mut event = Event::new(0);
        gun.generate_primary_vertex(&mut event);
        assert_eq!(event.vertices.len(), 1);
        assert_eq!(event.primaries().count(), 2);
        for (vertex, particle) in event.primaries() {
            assert_eq!(vertex.position.y, -4500.0);
            assert_eq!(particle.kinetic_energy, 10_000.0);
            assert_eq!(particle.definition.name, "gamma");
        }
    }
}
