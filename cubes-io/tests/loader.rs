use crossbeam_channel::{Receiver, Sender};
use cubes::position::{ColumnPosition, CubePosition, LocalPosition, SparseKey};
use cubes::testing::{blocks, TestEntity, TestWorld};
use cubes::{u4, BlockId, Column, ColumnHandle, Cube, CubeHandle, EntityId, WorldContext};
use cubes_io::{CubeIo, CubeLoader, LoadReport, LoadStatus, LoaderConfig, LoaderError};
use rustc_hash::{FxHashMap, FxHashSet};
use std::cell::RefCell;
use std::io;
use std::rc::Rc;
use std::time::{Duration, Instant};

#[derive(Clone)]
struct RawCube {
	y: u32,
	blocks: Vec<(LocalPosition, BlockId)>,
	entities: Vec<TestEntity>
}

/// Cubes kept in memory. Reads can be held back with a gate, and made to fail or panic.
#[derive(Default)]
struct MemoryStorage {
	cubes: FxHashMap<SparseKey, RawCube>,
	failing: FxHashSet<SparseKey>,
	panicking: FxHashSet<SparseKey>,
	gate: Option<Receiver<()>>
}

impl MemoryStorage {
	fn with_cube(mut self, position: CubePosition, blocks: Vec<(LocalPosition, BlockId)>, entities: Vec<TestEntity>) -> Self {
		self.cubes.insert(position.key(), RawCube { y: position.y(), blocks, entities });
		self
	}

	fn gated(mut self) -> (Self, Sender<()>) {
		let (sender, receiver) = crossbeam_channel::unbounded();
		self.gate = Some(receiver);

		(self, sender)
	}
}

impl CubeIo<TestWorld> for MemoryStorage {
	type Raw = RawCube;

	fn load_cube_async_part(&self, column: &ColumnHandle<TestWorld>, y: u32) -> io::Result<Option<RawCube>> {
		if let Some(gate) = &self.gate {
			gate.recv().map_err(|_| io::Error::new(io::ErrorKind::BrokenPipe, "gate closed"))?;
		}

		let key = column.read().position().cube(y)
			.map_err(|error| io::Error::new(io::ErrorKind::InvalidInput, error))?
			.key();

		if self.panicking.contains(&key) {
			panic!("corrupted region file");
		}

		if self.failing.contains(&key) {
			return Err(io::Error::new(io::ErrorKind::InvalidData, "checksum mismatch"));
		}

		Ok(self.cubes.get(&key).cloned())
	}

	fn load_cube_sync_part(&self, raw: RawCube, column: &ColumnHandle<TestWorld>, world: &mut TestWorld) -> Cube<TestWorld> {
		let position = column.read().position().cube(raw.y).unwrap();
		let mut cube = Cube::new(column, position, world.has_sky());

		for (at, block) in raw.blocks {
			cube.set_block_silently(at, block, u4::new(0));
		}

		for entity in raw.entities {
			cube.add_entity(entity);
		}

		cube.mark_saved(0);
		cube
	}
}

fn init() {
	let _ = env_logger::builder().is_test(true).try_init();
}

fn config() -> LoaderConfig {
	LoaderConfig { worker_threads: 2, ..LoaderConfig::default() }
}

fn pos(x: i32, y: i32, z: i32) -> CubePosition {
	CubePosition::new(x, y, z).unwrap()
}

/// Collects the reports of one or more completions, giving the workers a few seconds to finish.
fn poll(loader: &mut CubeLoader<TestWorld, MemoryStorage>, world: &mut TestWorld, count: usize) -> Vec<LoadReport<TestWorld>> {
	let deadline = Instant::now() + Duration::from_secs(5);
	let mut reports = Vec::new();

	while reports.len() < count {
		assert!(Instant::now() < deadline, "timed out waiting for cube loads");

		reports.extend(loader.process_completed(world).unwrap());
		std::thread::sleep(Duration::from_millis(1));
	}

	reports
}

type Seen = Rc<RefCell<Vec<Option<CubePosition>>>>;

fn recorder(seen: &Seen) -> impl FnOnce(Option<&CubeHandle<TestWorld>>) + 'static {
	let seen = seen.clone();

	move |cube: Option<&CubeHandle<TestWorld>>| seen.borrow_mut().push(cube.map(|cube| cube.read().position()))
}

#[test]
fn test_load_and_install() {
	init();

	let target = pos(1, 2, 3);
	let at = LocalPosition::new(0, 0, 0);
	let storage = MemoryStorage::default().with_cube(target, vec![(at, blocks::STONE)], vec![TestEntity::new(9, [20.0, 40.0, 50.0])]);

	let mut world = TestWorld::server();
	let mut loader = CubeLoader::new(storage, &config()).unwrap();
	let column = Column::handle(ColumnPosition::new(1, 3));
	let seen = Seen::default();

	let dependency = loader.queue_load(target, recorder(&seen)).unwrap();
	assert_eq!(loader.status(target), Some(LoadStatus::Pending));

	dependency.resolve(column.clone());

	let cube = loader.wait_for(target, &mut world).unwrap().expect("cube should be installed");

	assert!(std::sync::Arc::ptr_eq(column.read().cube(2).unwrap(), &cube));
	assert_eq!(cube.read().block(at), blocks::STONE);
	assert!(cube.read().is_loaded());
	assert!(!cube.read().is_dirty());
	assert!(world.entities.contains(&EntityId(9)));

	assert_eq!(*seen.borrow(), vec![Some(target)]);
	assert_eq!(loader.status(target), None);
	assert_eq!(loader.outstanding(), 0);
}

#[test]
fn test_not_visible_before_install() {
	init();

	let target = pos(0, 0, 0);
	let (storage, gate) = MemoryStorage::default().with_cube(target, vec![], vec![]).gated();

	let mut world = TestWorld::server();
	let mut loader = CubeLoader::new(storage, &config()).unwrap();
	let column = Column::handle(ColumnPosition::new(0, 0));
	let seen = Seen::default();

	loader.queue_load(target, recorder(&seen)).unwrap().resolve(column.clone());

	// The read is held back, so there is nothing to install yet
	assert!(loader.process_completed(&mut world).unwrap().is_empty());

	gate.send(()).unwrap();
	std::thread::sleep(Duration::from_millis(50));

	// The read has most likely finished by now, but nothing is installed until the main context
	// asks for it
	assert!(column.read().cube(0).is_none());
	assert!(seen.borrow().is_empty());
	assert_eq!(loader.status(target), Some(LoadStatus::Pending));

	let reports = poll(&mut loader, &mut world, 1);

	assert_eq!(reports[0].status, LoadStatus::Installed);
	assert!(column.read().cube(0).is_some());
	assert_eq!(*seen.borrow(), vec![Some(target)]);
}

#[test]
fn test_io_failure() {
	init();

	let target = pos(-4, 7, 2);
	let mut storage = MemoryStorage::default().with_cube(target, vec![], vec![]);
	storage.failing.insert(target.key());

	let mut world = TestWorld::server();
	let mut loader = CubeLoader::new(storage, &config()).unwrap();
	let column = Column::handle(ColumnPosition::new(-4, 2));
	let seen = Seen::default();

	loader.queue_load(target, recorder(&seen)).unwrap().resolve(column.clone());

	let reports = poll(&mut loader, &mut world, 1);

	assert_eq!(reports[0].position, target);
	assert_eq!(reports[0].status, LoadStatus::IoFailed);
	assert!(reports[0].cube.is_none());

	assert!(column.read().is_empty());
	assert_eq!(*seen.borrow(), vec![None]);
	assert_eq!(loader.outstanding(), 0);
}

#[test]
fn test_not_stored() {
	init();

	let target = pos(0, 5, 0);
	let mut world = TestWorld::server();
	let mut loader = CubeLoader::new(MemoryStorage::default(), &config()).unwrap();
	let column = Column::handle(ColumnPosition::new(0, 0));
	let seen = Seen::default();

	loader.queue_load(target, recorder(&seen)).unwrap().resolve(column.clone());

	assert!(loader.wait_for(target, &mut world).unwrap().is_none());
	assert!(column.read().is_empty());
	assert_eq!(*seen.borrow(), vec![None]);
}

#[test]
fn test_merged_callbacks() {
	init();

	let target = pos(2, 1, 2);
	let (storage, gate) = MemoryStorage::default().with_cube(target, vec![], vec![]).gated();

	let mut world = TestWorld::server();
	let mut loader = CubeLoader::new(storage, &config()).unwrap();
	let column = Column::handle(ColumnPosition::new(2, 2));
	let seen = Seen::default();

	let dependency = loader.queue_load(target, recorder(&seen)).unwrap();
	assert!(loader.queue_load(target, recorder(&seen)).is_none());
	assert_eq!(loader.outstanding(), 1);

	dependency.resolve(column.clone());
	gate.send(()).unwrap();

	let reports = poll(&mut loader, &mut world, 1);

	assert_eq!(reports.len(), 1);
	assert_eq!(*seen.borrow(), vec![Some(target), Some(target)]);
	assert_eq!(column.read().len(), 1);
}

#[test]
fn test_dropped_dependency() {
	init();

	let mut world = TestWorld::server();
	let mut loader = CubeLoader::new(MemoryStorage::default(), &config()).unwrap();

	let dependency = loader.queue_load(pos(0, 0, 0), |_| ()).unwrap();
	drop(dependency);

	match loader.process_completed(&mut world) {
		Err(LoaderError::DependencyDropped(position)) => assert_eq!(position, pos(0, 0, 0)),
		Err(other) => panic!("unexpected error: {}", other),
		Ok(_) => panic!("dropping an unresolved dependency must be fatal")
	}
}

#[test]
fn test_requeue_after_fault() {
	init();

	let target = pos(4, 1, 4);
	let storage = MemoryStorage::default().with_cube(target, vec![(LocalPosition::new(1, 2, 3), blocks::GLASS)], vec![]);

	let mut world = TestWorld::server();
	let mut loader = CubeLoader::new(storage, &config()).unwrap();

	drop(loader.queue_load(target, |_| ()).unwrap());
	assert!(matches!(loader.process_completed(&mut world), Err(LoaderError::DependencyDropped(_))));

	assert_eq!(loader.status(target), None);
	assert_eq!(loader.outstanding(), 0);

	let column = Column::handle(ColumnPosition::new(4, 4));
	let seen = Seen::default();

	loader.queue_load(target, recorder(&seen)).expect("a faulted cube can be queued again").resolve(column.clone());

	let cube = loader.wait_for(target, &mut world).unwrap().expect("cube should be installed");

	assert_eq!(cube.read().block(LocalPosition::new(1, 2, 3)), blocks::GLASS);
	assert_eq!(*seen.borrow(), vec![Some(target)]);
	assert_eq!(loader.outstanding(), 0);
}

#[test]
fn test_fault_after_completion() {
	init();

	let installed = pos(0, 0, 0);
	let dropped = pos(0, 2, 0);
	let storage = MemoryStorage::default().with_cube(installed, vec![], vec![]);

	let mut world = TestWorld::server();
	let mut loader = CubeLoader::new(storage, &config()).unwrap();
	let column = Column::handle(ColumnPosition::new(0, 0));
	let seen = Seen::default();

	loader.load_in_column(&column, 0, recorder(&seen)).unwrap();

	let deadline = Instant::now() + Duration::from_secs(5);

	while loader.ready() < 1 {
		assert!(Instant::now() < deadline, "timed out waiting for cube loads");
		std::thread::sleep(Duration::from_millis(1));
	}

	// Queued behind the finished read
	drop(loader.queue_load(dropped, |_| ()).unwrap());
	assert_eq!(loader.ready(), 2);

	let reports = loader.process_completed(&mut world).unwrap();

	assert_eq!(reports.len(), 1);
	assert_eq!(reports[0].position, installed);
	assert_eq!(reports[0].status, LoadStatus::Installed);
	assert!(column.read().cube(0).is_some());
	assert_eq!(*seen.borrow(), vec![Some(installed)]);

	match loader.process_completed(&mut world) {
		Err(LoaderError::DependencyDropped(position)) => assert_eq!(position, dropped),
		Err(other) => panic!("unexpected error: {}", other),
		Ok(_) => panic!("the fault must be reported by the next call")
	}

	assert_eq!(loader.outstanding(), 0);
	assert!(loader.process_completed(&mut world).unwrap().is_empty());
}

#[test]
fn test_column_mismatch() {
	init();

	let mut world = TestWorld::server();
	let mut loader = CubeLoader::new(MemoryStorage::default(), &config()).unwrap();

	loader.queue_load(pos(0, 0, 0), |_| ()).unwrap().resolve(Column::handle(ColumnPosition::new(1, 0)));

	assert!(matches!(loader.wait_for(pos(0, 0, 0), &mut world), Err(LoaderError::ColumnMismatch { .. })));
	assert_eq!(loader.outstanding(), 0);
}

#[test]
fn test_worker_panic() {
	init();

	let target = pos(3, 3, 3);
	let mut storage = MemoryStorage::default();
	storage.panicking.insert(target.key());

	let mut world = TestWorld::server();
	let mut loader = CubeLoader::new(storage, &config()).unwrap();

	loader.queue_load(target, |_| ()).unwrap().resolve(Column::handle(ColumnPosition::new(3, 3)));

	match loader.wait_for(target, &mut world) {
		Err(LoaderError::WorkerPanicked { position, message }) => {
			assert_eq!(position, target);
			assert_eq!(message, "corrupted region file");
		},
		Err(other) => panic!("unexpected error: {}", other),
		Ok(_) => panic!("a panicking read must be fatal")
	}

	assert_eq!(loader.status(target), None);
}

#[test]
fn test_drain_limit() {
	init();

	let mut storage = MemoryStorage::default();

	for y in 0..3 {
		storage = storage.with_cube(pos(0, y, 0), vec![], vec![]);
	}

	let config = LoaderConfig { drain_limit: 1, ..config() };
	let mut world = TestWorld::server();
	let mut loader = CubeLoader::new(storage, &config).unwrap();
	let column = Column::handle(ColumnPosition::new(0, 0));

	for y in 0..3 {
		loader.load_in_column(&column, y, |_| ()).unwrap();
	}

	let deadline = Instant::now() + Duration::from_secs(5);
	let mut installed = 0;

	while installed < 3 {
		assert!(Instant::now() < deadline, "timed out waiting for cube loads");

		let reports = loader.process_completed(&mut world).unwrap();
		assert!(reports.len() <= 1);

		installed += reports.len();
	}

	assert_eq!(column.read().len(), 3);
}
