//! Callback contract between user configuration and the run loop.
//!
//! The run manager calls [`DetectorConstruction::construct`] and then
//! [`DetectorConstruction::construct_sd_and_field`] exactly once, after which
//! the geometry is frozen. Every event then gets one
//! [`PrimaryGeneratorAction::generate_primaries`] call. Transport is external:
//! whatever steps an engine produces are fed through the `transport` hook of
//! [`RunManager::beam_on_with`].
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use rayon::ThreadPoolBuilder;
use tracing::{debug, info};

use crate::detector::DetectorManager;
use crate::error::{Error, Result};
use crate::event::Event;
use crate::material::MaterialDatabase;
use crate::random::{worker_streams, PRng};
use crate::volume::VolumeTree;

pub trait DetectorConstruction {
    /// Builds the placed volume tree and returns it with the world at its root.
    fn construct(&mut self, materials: &mut MaterialDatabase) -> Result<VolumeTree>;

    /// Registers sensitive detectors and attaches them to volumes of `tree`.
    fn construct_sd_and_field(&mut self, tree: &mut VolumeTree, detectors: &mut DetectorManager) -> Result<()>;
}

pub trait PrimaryGeneratorAction {
    /// Adds the primary vertices of one event.
    fn generate_primaries(&mut self, event: &mut Event, rng: &mut PRng) -> Result<()>;
}

/// Everything built at initialization. Read-only once the run starts.
#[derive(Debug)]
pub struct Setup {
    pub materials: MaterialDatabase,
    pub tree:      VolumeTree,
    pub detectors: DetectorManager,
}

pub struct RunManager<D, P> {
    construction:  D,
    generator:     P,
    setup:         Option<Setup>,
    rng:           PRng,
    next_event_id: u64,
    run_id:        u32,
}

impl<D: DetectorConstruction, P: PrimaryGeneratorAction> RunManager<D, P> {
    pub fn new(construction: D, generator: P, seed: u64) -> Self {
        Self {
            construction,
            generator,
            setup: None,
            rng: PRng::seed_from_u64(seed),
            next_event_id: 0,
            run_id: 0,
        }
    }

    pub fn initialize(&mut self) -> Result<()> {
        if self.setup.is_some() {
            return Err(Error::AlreadyInitialized);
        }
        let mut materials = MaterialDatabase::new();
        let mut tree = self.construction.construct(&mut materials)?;
        if tree.world().is_none() {
            return Err(Error::InvalidConfig("construction returned an empty volume tree".to_owned()));
        }
        let mut detectors = DetectorManager::new();
        self.construction
            .construct_sd_and_field(&mut tree, &mut detectors)?;
        info!(volumes = tree.len(), detectors = detectors.len(), "geometry initialized");
        self.setup = Some(Setup {
            materials,
            tree,
            detectors,
        });
        Ok(())
    }

    pub fn setup(&self) -> Option<&Setup> { self.setup.as_ref() }

    pub fn generator(&self) -> &P { &self.generator }

    pub fn beam_on(&mut self, n_events: u64) -> Result<Vec<Event>> { self.beam_on_with(n_events, |_, _, _| {}) }

    /// Runs `n_events` sequentially. `transport` runs between primary
    /// generation and end of event.
    pub fn beam_on_with<F>(&mut self, n_events: u64, mut transport: F) -> Result<Vec<Event>>
    where
        F: FnMut(&Setup, &mut Event, &mut PRng),
    {
        let setup = self.setup.as_ref().ok_or(Error::NotInitialized)?;
        info!(run = self.run_id, events = n_events, "run starts");
        let mut events = Vec::new();
        for id in self.next_event_id..self.next_event_id + n_events {
            events.push(process_event(
                id,
                setup,
                &mut self.generator,
                &mut self.rng,
                &mut transport,
            )?);
        }
        self.next_event_id += n_events;
        info!(run = self.run_id, events = n_events, "run terminated");
        self.run_id += 1;
        Ok(events)
    }
}

impl<D, P> RunManager<D, P>
where
    D: DetectorConstruction,
    P: PrimaryGeneratorAction + Clone + Send,
{
    pub fn beam_on_parallel(&mut self, n_events: u64, workers: usize) -> Result<Vec<Event>> {
        self.beam_on_parallel_with(n_events, workers, |_, _, _| {})
    }

    /// Runs events on a pool of `workers` threads. Each worker owns a clone
    /// of the generator, an independent random stream and a contiguous block
    /// of event ids. Events come back in id order.
    pub fn beam_on_parallel_with<F>(&mut self, n_events: u64, workers: usize, transport: F) -> Result<Vec<Event>>
    where
        F: Fn(&Setup, &mut Event, &mut PRng) + Sync,
    {
        let setup = self.setup.as_ref().ok_or(Error::NotInitialized)?;
        let workers = workers.max(1);
        let first = self.next_event_id;
        let block = (n_events + workers as u64 - 1) / workers as u64;
        let generator = &self.generator;
        let jobs: Vec<_> = worker_streams(self.rng.gen(), workers)
            .into_iter()
            .enumerate()
            .map(|(w, rng)| {
                let w = w as u64;
                let ids = first + (w * block).min(n_events)..first + ((w + 1) * block).min(n_events);
                (ids, rng, generator.clone())
            })
            .collect();
        let pool = ThreadPoolBuilder::new().num_threads(workers).build()?;
        info!(run = self.run_id, events = n_events, workers, "run starts");
        let transport = &transport;
        let blocks = pool.install(|| {
            jobs.into_par_iter()
                .map(|(ids, mut rng, mut generator)| {
                    let mut transport = transport;
                    ids.map(|id| process_event(id, setup, &mut generator, &mut rng, &mut transport))
                        .collect::<Result<Vec<_>>>()
                })
                .collect::<Result<Vec<_>>>()
        })?;
        let events: Vec<Event> = blocks.into_iter().flatten().collect();
        debug!(run = self.run_id, workers, block, "workers done");
        self.next_event_id += n_events;
        info!(run = self.run_id, events = n_events, "run terminated");
        self.run_id += 1;
        Ok(events)
    }
}

fn process_event<P, F>(id: u64, setup: &Setup, generator: &mut P, rng: &mut PRng, transport: &mut F) -> Result<Event>
where
    P: PrimaryGeneratorAction,
    F: FnMut(&Setup, &mut Event, &mut PRng),
{
    let mut event = Event::new(id);
    setup.detectors.begin_event(&mut event);
    generator.generate_primaries(&mut event, rng)?;
    transport(setup, &mut event, rng);
    setup.detectors.end_event(&mut event);
    Ok(event)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::BoxSolid;
    use crate::volume::LogicalVolume;
    use crate::vector::Vector;
    use std::sync::Arc;

    struct Cube;

    impl DetectorConstruction for Cube {
        fn construct(&mut self, materials: &mut MaterialDatabase) -> Result<VolumeTree> {
            let mut tree = VolumeTree::new();
            let vacuum = materials.find_or_build_material("G4_Galactic")?;
            tree.place(
                None,
                LogicalVolume::new("World", Arc::new(BoxSolid::cube("World", 1.0)?), vacuum),
                Vector::ZERO,
                0,
                true,
            )?;
            Ok(tree)
        }

        fn construct_sd_and_field(&mut self, _: &mut VolumeTree, _: &mut DetectorManager) -> Result<()> { Ok(()) }
    }

    #[derive(Clone)]
    struct Counter(u64);

    impl PrimaryGeneratorAction for Counter {
        fn generate_primaries(&mut self, _: &mut Event, _: &mut PRng) -> Result<()> {
            self.0 += 1;
            Ok(())
        }
    }

    #[test]
    fn initialize_once() {
        let mut run = RunManager::new(Cube, Counter(0), 1);
        assert!(matches!(run.beam_on(1), Err(Error::NotInitialized)));
        run.initialize().unwrap();
        assert!(matches!(run.initialize(), Err(Error::AlreadyInitialized)));
    }

    #[test]
    fn one_call_per_event_and_ids_continue() {
        let mut run = RunManager::new(Cube, Counter(0), 1);
        run.initialize().unwrap();
        let first = run.beam_on(5).unwrap();
        let second = run.beam_on(3).unwrap();
        assert_eq!(run.generator().0, 8);
        assert_eq!(first.iter().map(|e| e.id).collect::<Vec<_>>(), vec![0, 1, 2, 3, 4]);
        assert_eq!(second[0].id, 5);
    }

    #[test]
    fn parallel_events_come_back_in_order() {
        let mut run = RunManager::new(Cube, Counter(0), 1);
        run.initialize().unwrap();
        let events = run.beam_on_parallel(103, 4).unwrap();
        assert_eq!(events.len(), 103);
        assert!(events.iter().enumerate().all(|(i, e)| e.id == i as u64));
    }

    #[test]
    fn parallel_with_more_workers_than_events() {
        let mut run = RunManager::new(Cube, Counter(0), 1);
        run.initialize().unwrap();
        let events = run.beam_on_parallel(3, 8).unwrap();
        assert_eq!(events.iter().map(|e| e.id).collect::<Vec<_>>(), vec![0, 1, 2]);
        let next = run.beam_on_parallel(0, 8).unwrap();
        assert!(next.is_empty());
        assert_eq!(run.beam_on(1).unwrap()[0].id, 3);
    }

    #[test]
    fn construction_errors_abort_initialization() {
        struct Broken;
        impl DetectorConstruction for Broken {
            fn construct(&mut self, materials: &mut MaterialDatabase) -> Result<VolumeTree> {
                materials.find_or_build_material("G4_NOTHING")?;
                unreachable!()
            }

            fn construct_sd_and_field(&mut self, _: &mut VolumeTree, _: &mut DetectorManager) -> Result<()> { Ok(()) }
        }
        let mut run = RunManager::new(Broken, Counter(0), 1);
        assert!(matches!(run.initialize(), Err(Error::UnknownMaterial(_))));
        assert!(run.setup().is_none());
    }
}
