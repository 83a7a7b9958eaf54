pub const WORLD_WIDTH: f32 = 4000.0;
pub const WORLD_HEIGHT: f32 = 4000.0;
pub const TICK_MS: u64 = 1000 / 30;

pub const REQUIRED_FOODS: usize = 1000;
pub const BOT_QUOTA: usize = 10;

pub const BASE_SPEED: f32 = 2.0;
pub const BOOST_SPEED: f32 = 5.0;
pub const BOOST_SHED_INTERVAL: u32 = 5;
pub const BOOST_MIN_LENGTH: usize = 1;
pub const BOT_RETIRE_LENGTH: usize = 100;

pub const AMBIENT_FOOD_VALUE: f32 = 2.0;
pub const DROP_FOOD_VALUE: f32 = 1.0;

pub const TARGET_SPACING: f32 = 10.0;
pub const MAX_SPACING: f32 = 14.0;
pub const SPACING_STIFFNESS: f32 = 0.35;
pub const TRAIL_LENGTH_FACTOR: usize = 6;

pub const PICKUP_RADIUS: f32 = 20.0;
pub const COLLISION_COARSE_BOX: f32 = 50.0;
pub const VIEW_PADDING: f32 = 100.0;
pub const DEFAULT_VIEWPORT_WIDTH: f32 = 800.0;
pub const DEFAULT_VIEWPORT_HEIGHT: f32 = 600.0;

pub const MIN_CELL: f32 = 32.0;
pub const MAX_CELL: f32 = 512.0;
pub const INITIAL_CELL: f32 = 256.0;
pub const FOOD_LOAD_WEIGHT: f32 = 0.25;

pub const DEFAULT_SEGMENT_COLOR: [u8; 3] = [255, 255, 0];
