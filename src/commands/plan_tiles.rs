use crate::config::Config;
use crate::tile::plan_tiles;

/// Prints the tile rectangle for each zoom level without fetching anything.
pub fn print_plan(config: &Config) -> u64 {
    let mut total = 0;
    for &zoom in &config.zoom_levels {
        let range = plan_tiles(&config.bounding_box, zoom);
        println!(
            "zoom {:>2}: x {}..={}, y {}..={} ({} x {} = {} tiles)",
            zoom,
            range.min_x,
            range.max_x,
            range.min_y,
            range.max_y,
            range.width(),
            range.height(),
            range.len()
        );
        total += range.len();
    }
    println!("{} tiles in total", total);
    total
}
