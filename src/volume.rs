//! Placed volume hierarchy.
//!
//! The tree is an arena of placed volumes. Each node owns the list of its
//! daughters and knows its single mother; only the world has none. Placement
//! optionally checks the new daughter against its mother and its siblings by
//! sampling points on the daughter's surface.
use std::sync::Arc;

use rand::SeedableRng;
use tracing::{debug, info, warn};

use crate::detector::DetectorId;
use crate::error::{Error, OverlapKind, Result};
use crate::geometry::{Inside, Solid};
use crate::material::Material;
use crate::random::PRng;
use crate::vector::Vector;

/// Surface points sampled per overlap check.
pub const DEFAULT_OVERLAP_SAMPLES: usize = 1000;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VolumeId(usize);

impl VolumeId {
    pub fn index(self) -> usize { self.0 }
}

/// Shape, material and name of a volume, independent of where it is placed.
#[derive(Debug, Clone)]
pub struct LogicalVolume {
    pub name:           String,
    pub solid:          Arc<dyn Solid>,
    pub material:       Arc<Material>,
    sensitive_detector: Option<DetectorId>,
}

impl LogicalVolume {
    pub fn new(name: impl Into<String>, solid: Arc<dyn Solid>, material: Arc<Material>) -> Self {
        Self {
            name: name.into(),
            solid,
            material,
            sensitive_detector: None,
        }
    }

    pub fn sensitive_detector(&self) -> Option<DetectorId> { self.sensitive_detector }

    pub(crate) fn set_sensitive_detector(&mut self, id: DetectorId) { self.sensitive_detector = Some(id); }
}

#[derive(Debug)]
pub struct PlacedVolume {
    pub name:        String,
    pub logical:     LogicalVolume,
    /// Offset of this volume's origin in its mother's frame.
    pub translation: Vector<f64>,
    pub copy_no:     u32,
    parent:          Option<VolumeId>,
    children:        Vec<VolumeId>,
}

impl PlacedVolume {
    pub fn parent(&self) -> Option<VolumeId> { self.parent }

    pub fn children(&self) -> &[VolumeId] { &self.children }
}

#[derive(Debug)]
pub struct VolumeTree {
    nodes:           Vec<PlacedVolume>,
    overlap_samples: usize,
    rng:             PRng,
}

impl Default for VolumeTree {
    fn default() -> Self { Self::new() }
}

impl VolumeTree {
    pub fn new() -> Self {
        Self {
            nodes:           Vec::new(),
            overlap_samples: DEFAULT_OVERLAP_SAMPLES,
            rng:             PRng::seed_from_u64(0x5eed_0f_0e57),
        }
    }

    pub fn with_overlap_samples(mut self, samples: usize) -> Self {
        self.overlap_samples = samples.max(1);
        self
    }

    /// Places `logical` inside `mother` at `translation`. `None` places the
    /// world, which must be the first and only root.
    pub fn place(
        &mut self,
        mother: Option<VolumeId>,
        logical: LogicalVolume,
        translation: Vector<f64>,
        copy_no: u32,
        check_overlaps: bool,
    ) -> Result<VolumeId> {
        let name = logical.name.clone();
        match mother {
            None if !self.nodes.is_empty() => return Err(Error::WorldAlreadyPlaced(name)),
            None => {}
            Some(_) if self.nodes.is_empty() => return Err(Error::MissingParent(name)),
            Some(m) => {
                self.try_get(m)?;
                if check_overlaps {
                    self.check_overlaps(m, &logical, translation)?;
                }
            }
        }
        let id = VolumeId(self.nodes.len());
        debug!(volume = %name, mother = ?mother.map(|m| self.nodes[m.0].name.as_str()), %translation, "placed volume");
        self.nodes.push(PlacedVolume {
            name,
            logical,
            translation,
            copy_no,
            parent: mother,
            children: Vec::new(),
        });
        if let Some(m) = mother {
            self.nodes[m.0].children.push(id);
        }
        Ok(id)
    }

    fn check_overlaps(&mut self, mother: VolumeId, logical: &LogicalVolume, translation: Vector<f64>) -> Result<()> {
        let overlap = |kind, other: &str, point| Error::Overlap {
            kind,
            volume: logical.name.clone(),
            other: other.to_owned(),
            point,
        };
        let mother_node = &self.nodes[mother.0];
        // samples that fell on each sibling's surface
        let mut on_surface = vec![0usize; mother_node.children.len()];
        let mut p = translation;
        for _ in 0..self.overlap_samples {
            // daughter surface point in the mother's frame
            p = logical.solid.surface_point(&mut self.rng) + translation;
            if mother_node.logical.solid.inside(p) == Inside::Out {
                warn!(volume = %logical.name, mother = %mother_node.name, point = %p, "daughter protrudes from mother");
                return Err(overlap(OverlapKind::ExceedsMother, &mother_node.name, p));
            }
            for (i, &s) in mother_node.children.iter().enumerate() {
                let sibling = &self.nodes[s.0];
                match sibling.logical.solid.inside(p - sibling.translation) {
                    Inside::In => {
                        warn!(volume = %logical.name, sibling = %sibling.name, point = %p, "daughter overlaps sibling");
                        return Err(overlap(OverlapKind::Sibling, &sibling.name, p));
                    }
                    Inside::Surface => on_surface[i] += 1,
                    Inside::Out => {}
                }
            }
        }
        // a coincident sibling never contains a sample strictly, only on its surface
        for (i, &s) in mother_node.children.iter().enumerate() {
            if on_surface[i] == self.overlap_samples {
                let sibling = &self.nodes[s.0];
                warn!(volume = %logical.name, sibling = %sibling.name, "daughter coincides with sibling");
                return Err(overlap(OverlapKind::Sibling, &sibling.name, p));
            }
        }
        for &s in &mother_node.children {
            let sibling = &self.nodes[s.0];
            let q = sibling.logical.solid.surface_point(&mut self.rng) + sibling.translation;
            if logical.solid.inside(q - translation) == Inside::In {
                warn!(volume = %logical.name, sibling = %sibling.name, "daughter encloses sibling");
                return Err(overlap(OverlapKind::EnclosesSibling, &sibling.name, q));
            }
        }
        info!("Checking overlaps for volume {} ... OK!", logical.name);
        Ok(())
    }

    fn try_get(&self, id: VolumeId) -> Result<&PlacedVolume> {
        self.nodes
            .get(id.0)
            .ok_or_else(|| Error::UnknownVolume(format!("#{}", id.0)))
    }

    pub fn world(&self) -> Option<VolumeId> {
        if self.nodes.is_empty() {
            None
        } else {
            Some(VolumeId(0))
        }
    }

    /// Panics on an id from another tree.
    pub fn get(&self, id: VolumeId) -> &PlacedVolume { &self.nodes[id.0] }

    pub(crate) fn get_mut(&mut self, id: VolumeId) -> &mut PlacedVolume { &mut self.nodes[id.0] }

    pub fn find(&self, name: &str) -> Option<VolumeId> {
        self.nodes.iter().position(|n| n.name == name).map(VolumeId)
    }

    /// Every volume whose logical volume carries `name`.
    pub fn find_logical(&self, name: &str) -> Vec<VolumeId> {
        self.nodes
            .iter()
            .enumerate()
            .filter(|(_, n)| n.logical.name == name)
            .map(|(i, _)| VolumeId(i))
            .collect()
    }

    pub fn parent(&self, id: VolumeId) -> Option<VolumeId> { self.nodes[id.0].parent }

    pub fn children(&self, id: VolumeId) -> &[VolumeId] { &self.nodes[id.0].children }

    /// Number of ancestors; the world has depth zero.
    pub fn depth(&self, id: VolumeId) -> usize {
        let mut depth = 0;
        let mut cur = self.nodes[id.0].parent;
        while let Some(p) = cur {
            depth += 1;
            cur = self.nodes[p.0].parent;
        }
        depth
    }

    pub fn global_translation(&self, id: VolumeId) -> Vector<f64> {
        let mut t = Vector::ZERO;
        let mut cur = Some(id);
        while let Some(c) = cur {
            t = t + self.nodes[c.0].translation;
            cur = self.nodes[c.0].parent;
        }
        t
    }

    /// Deepest volume containing the world-frame point `p`.
    pub fn locate(&self, p: Vector<f64>) -> Option<VolumeId> {
        let world = self.world()?;
        let mut local = p - self.nodes[world.0].translation;
        if self.nodes[world.0].logical.solid.inside(local) == Inside::Out {
            return None;
        }
        let mut cur = world;
        'descend: loop {
            for &c in &self.nodes[cur.0].children {
                let child = &self.nodes[c.0];
                let q = local - child.translation;
                if child.logical.solid.inside(q) != Inside::Out {
                    cur = c;
                    local = q;
                    continue 'descend;
                }
            }
            return Some(cur);
        }
    }

    pub fn len(&self) -> usize { self.nodes.len() }

    pub fn is_empty(&self) -> bool { self.nodes.is_empty() }

    pub fn iter(&self) -> impl Iterator<Item = (VolumeId, &PlacedVolume)> {
        self.nodes.iter().enumerate().map(|(i, n)| (VolumeId(i), n))
    }
}
