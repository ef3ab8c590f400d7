use cubes::position::{ColumnPosition, CubePosition, GlobalPosition, LayerPosition, HORIZONTAL_MAX, HORIZONTAL_MIN, VERTICAL_MAX};
use cubes::testing::{blocks, TestWorld};
use cubes::{u4, Column, ColumnHeightMap, LightChannel, NO_HEIGHT};
use cubes_light::{BlockLightTable, CubeProvider, LightAccess, NeighborSnapshot, ResidentColumns, SnapshotError};

type Snapshot = NeighborSnapshot<TestWorld, BlockLightTable>;

fn init() {
	let _ = env_logger::builder().is_test(true).try_init();
}

fn pos(x: i32, y: i32, z: i32) -> CubePosition {
	CubePosition::new(x, y, z).unwrap()
}

fn rules() -> BlockLightTable {
	let mut rules = BlockLightTable::new();
	rules.set(blocks::GLASS, 0, u4::MIN);
	rules.set(blocks::TORCH, 0, u4::new(14));

	rules
}

/// Every cube within one cube of `center`, except those in `skip`.
fn region(center: CubePosition, skip: &[CubePosition]) -> ResidentColumns<TestWorld> {
	let mut columns = ResidentColumns::new(true);

	for dx in -1..=1 {
		for dy in -1..=1 {
			for dz in -1..=1 {
				let position = center.offset(dx, dy, dz).unwrap();

				if !skip.contains(&position) {
					columns.cube(position);
				}
			}
		}
	}

	columns
}

fn expect_error(result: Result<Snapshot, SnapshotError>) -> SnapshotError {
	match result {
		Ok(_) => panic!("expected the snapshot to fail"),
		Err(error) => error
	}
}

#[test]
fn test_reads_match_cubes() {
	init();

	let center = pos(0, 1, 0);
	let mut columns = region(center, &[]);

	// One marked block per cube
	for dx in -1..=1 {
		for dy in -1..=1 {
			for dz in -1..=1 {
				let cube = columns.cube(center.offset(dx, dy, dz).unwrap());
				let mut cube = cube.write();
				let at = edge::local(dx, dy, dz);

				cube.set_light(LightChannel::Block, at, u4::new((dx + 1 + (dy + 1) * 3) as u8));
				cube.set_light(LightChannel::Sky, at, u4::new((dz + 1) as u8));
			}
		}
	}

	let snapshot = Snapshot::around(&columns, &columns, rules(), center, 1).unwrap();
	assert_eq!(snapshot.bounds(), (pos(-1, 0, -1), pos(1, 2, 1)));

	for cube in snapshot.cubes() {
		let cube = cube.read();

		for at in [edge::local(-1, -1, -1), edge::local(0, 0, 0), edge::local(1, 1, 1)].iter() {
			let global = cube.position().with_local(*at);

			for &channel in [LightChannel::Block, LightChannel::Sky].iter() {
				assert_eq!(snapshot.light_for(channel, global).unwrap(), cube.light(channel, *at));
			}
		}
	}

	assert_eq!(snapshot.light_for(LightChannel::Block, GlobalPosition::new(-16 + 15, 0, -16)).unwrap(), u4::new(0));
}

#[test]
fn test_missing_interior_cube() {
	init();

	let center = pos(5, 10, -5);
	let columns = region(center, &[center]);

	match expect_error(Snapshot::around(&columns, &columns, rules(), center, 1)) {
		SnapshotError::MissingCube(report) => {
			assert_eq!(report.cube, center);
			assert!(report.column_resident());
			assert_eq!(report.columns.len(), 9);

			let column = report.columns.iter().find(|column| column.position == center.column()).unwrap();
			assert_eq!(column.cubes, vec![pos(5, 9, -5), pos(5, 11, -5)]);

			let message = report.to_string();
			assert!(message.starts_with("Cube not loaded while creating cube cache"));
			assert!(message.contains("Getting cube: (5, 10, -5)"));
		},
		other => panic!("unexpected error: {}", other)
	}
}

#[test]
fn test_corners_in_any_order() {
	let center = pos(0, 4, 0);
	let columns = region(center, &[]);

	let snapshot = Snapshot::new(&columns, &columns, rules(), pos(1, 3, -1), pos(-1, 5, 1)).unwrap();

	assert_eq!(snapshot.bounds(), (pos(-1, 3, -1), pos(1, 5, 1)));
	assert_eq!(snapshot.cubes().count(), 27);
}

#[test]
fn test_writes_reach_cubes() {
	init();

	let center = pos(-2, 3, 7);
	let columns = region(center, &[]);
	let snapshot = Snapshot::around(&columns, &columns, rules(), center, 1).unwrap();

	let at = GlobalPosition::new(-33, 63, 112);
	let before = snapshot.light_for(LightChannel::Block, at).unwrap();
	snapshot.set_light_for(LightChannel::Block, at, u4::new(12)).unwrap();

	assert_eq!(before, u4::new(0));
	assert_eq!(snapshot.light_for(LightChannel::Block, at).unwrap(), u4::new(12));

	let cube = columns.loaded_cube(at.cube().unwrap()).unwrap();
	let cube = cube.read();

	assert_eq!(cube.light(LightChannel::Block, at.local()), u4::new(12));
	assert!(cube.is_dirty());
}

#[test]
fn test_block_region_creates_middle() {
	init();

	let mut columns = ResidentColumns::<TestWorld>::new(true);
	let start = GlobalPosition::new(16, 64, 16);
	let end = GlobalPosition::new(31, 79, 31);

	let snapshot = Snapshot::for_block_region(&mut columns, &ResidentColumns::new(true), rules(), start, end).unwrap();

	assert_eq!(snapshot.bounds(), (pos(1, 4, 1), pos(1, 4, 1)));
	assert!(columns.loaded_cube(pos(1, 4, 1)).is_some());
	assert!(snapshot.contains(GlobalPosition::new(20, 70, 20)));
	assert!(!snapshot.contains(GlobalPosition::new(32, 70, 20)));
}

#[test]
fn test_block_region_needs_neighbors() {
	init();

	let mut columns = ResidentColumns::<TestWorld>::new(true);

	// Spans cubes 0 and 1 on the X axis, only the middle cube 0 gets created
	let start = GlobalPosition::new(0, 0, 0);
	let end = GlobalPosition::new(17, 0, 0);

	let regions = ResidentColumns::<TestWorld>::new(true);
	let error = expect_error(Snapshot::for_block_region(&mut columns, &regions, rules(), start, end));

	match error {
		SnapshotError::MissingCube(report) => {
			assert_eq!(report.cube, pos(1, 0, 0));
			assert!(report.columns.is_empty());
		},
		other => panic!("unexpected error: {}", other)
	}

	assert!(columns.loaded_cube(pos(0, 0, 0)).is_some());
}

#[test]
fn test_can_see_sky() {
	init();

	let layer = LayerPosition::new(3, 5);
	let mut heights = ColumnHeightMap::new();
	heights.set_height(layer, 40);

	let mut columns = ResidentColumns::<TestWorld>::new(true);
	columns.insert(Column::new(ColumnPosition::new(0, 0), Box::new(heights)).into_handle());
	columns.cube(pos(0, 2, 0));
	columns.cube(pos(0, 3, 0));

	let snapshot = Snapshot::new(&columns, &columns, rules(), pos(0, 2, 0), pos(0, 3, 0)).unwrap();

	assert!(!snapshot.can_see_sky(GlobalPosition::new(3, 40, 5)).unwrap());
	assert!(!snapshot.can_see_sky(GlobalPosition::new(3, 33, 5)).unwrap());
	assert!(snapshot.can_see_sky(GlobalPosition::new(3, 41, 5)).unwrap());

	// Nothing at all in this block column
	assert_eq!(columns.column(ColumnPosition::new(0, 0)).unwrap().read().height_at(LayerPosition::new(4, 5)), NO_HEIGHT);
	assert!(snapshot.can_see_sky(GlobalPosition::new(4, 32, 5)).unwrap());

	assert_eq!(snapshot.emitted_light(GlobalPosition::new(3, 40, 5), LightChannel::Sky).unwrap(), u4::MIN);
	assert_eq!(snapshot.emitted_light(GlobalPosition::new(3, 41, 5), LightChannel::Sky).unwrap(), u4::MAX);
}

#[test]
fn test_emission_and_opacity() {
	init();

	let mut columns = ResidentColumns::<TestWorld>::new(true);
	let cube = columns.cube(pos(0, 0, 0));

	{
		let mut cube = cube.write();
		cube.set_block_silently(edge::local(0, 0, 0), blocks::TORCH, u4::new(5));
		cube.set_block_silently(edge::local(1, 0, 0), blocks::STONE, u4::new(0));
		cube.set_block_silently(edge::local(-1, 0, 0), blocks::GLASS, u4::new(0));
	}

	let snapshot = Snapshot::new(&columns, &columns, rules(), pos(0, 0, 0), pos(0, 0, 0)).unwrap();

	let torch = GlobalPosition::new(8, 8, 8);
	let stone = GlobalPosition::new(15, 8, 8);
	let glass = GlobalPosition::new(0, 8, 8);

	assert_eq!(snapshot.block_at(torch).unwrap(), blocks::TORCH);
	assert_eq!(snapshot.metadata_at(torch).unwrap(), u4::new(5));

	assert_eq!(snapshot.emitted_light(torch, LightChannel::Block).unwrap(), u4::new(14));
	assert_eq!(snapshot.emitted_light(stone, LightChannel::Block).unwrap(), u4::MIN);

	assert_eq!(snapshot.light_opacity(torch).unwrap(), 0);
	assert_eq!(snapshot.light_opacity(glass).unwrap(), 0);
	assert_eq!(snapshot.light_opacity(stone).unwrap(), 255);
	assert_eq!(snapshot.light_opacity(GlobalPosition::new(1, 1, 1)).unwrap(), 0);
}

#[test]
fn test_outside_window() {
	let columns = region(pos(0, 1, 0), &[]);
	let snapshot = Snapshot::around(&columns, &columns, rules(), pos(0, 1, 0), 1).unwrap();

	let outside = GlobalPosition::new(0, 48, 0);

	match snapshot.light_for(LightChannel::Sky, outside) {
		Err(SnapshotError::OutsideWindow { at, min, max }) => {
			assert_eq!(at, outside);
			assert_eq!((min, max), (pos(-1, 0, -1), pos(1, 2, 1)));
		},
		other => panic!("unexpected result: {:?}", other)
	}

	assert!(snapshot.cube_at(GlobalPosition::new(-17, 0, 0)).is_err());
	assert!(snapshot.set_light_for(LightChannel::Block, GlobalPosition::new(0, -1, 0), u4::MAX).is_err());
	assert!(snapshot.cube_at(GlobalPosition::new(-16, 47, 31)).is_ok());
}

#[test]
fn test_huge_window_reports_missing() {
	init();

	let columns = ResidentColumns::<TestWorld>::new(true);
	let start = pos(HORIZONTAL_MIN, 0, HORIZONTAL_MIN);
	let end = pos(HORIZONTAL_MAX, VERTICAL_MAX as i32, HORIZONTAL_MAX);

	match expect_error(Snapshot::new(&columns, &columns, rules(), end, start)) {
		SnapshotError::MissingCube(report) => {
			assert_eq!(report.cube, start);
			assert!(report.columns.is_empty());
		},
		other => panic!("unexpected error: {}", other)
	}
}

#[test]
fn test_window_below_zero() {
	let columns = region(pos(0, 1, 0), &[]);

	match expect_error(Snapshot::around(&columns, &columns, rules(), pos(0, 0, 0), 1)) {
		SnapshotError::OutOfRange(_) => (),
		other => panic!("unexpected error: {}", other)
	}
}

mod edge {
	use cubes::position::LocalPosition;

	/// A block near the middle of a cube, moved to the edge in the given directions.
	pub fn local(dx: i32, dy: i32, dz: i32) -> LocalPosition {
		let axis = |delta: i32| match delta {
			-1 => 0,
			0 => 8,
			_ => 15
		};

		LocalPosition::new(axis(dx), axis(dy), axis(dz))
	}
}
