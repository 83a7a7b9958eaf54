pub mod constants;
pub mod math;
pub mod server;
pub mod snake;
pub mod spatial;
pub mod types;
pub mod world;
