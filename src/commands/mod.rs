pub mod download_tiles;
pub mod plan_tiles;

pub use download_tiles::download_tiles;
pub use plan_tiles::print_plan;
