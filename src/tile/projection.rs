use std::f64::consts::PI;

/// Fractional Web Mercator tile position of a point at `zoom`.
///
/// Latitudes at or near ±90° are not guarded against: the secant term
/// diverges and the result may be infinite or NaN.
pub fn project_fractional(lat: f64, lon: f64, zoom: u8) -> (f64, f64) {
    let n = 2.0_f64.powi(zoom as i32);
    let lat_rad = lat * PI / 180.0;
    let x = (lon + 180.0) / 360.0 * n;
    let y = (1.0 - (lat_rad.tan() + 1.0 / lat_rad.cos()).ln() / PI) / 2.0 * n;
    (x, y)
}

/// Integer tile indices containing the point at `zoom`.
///
/// Indices are floored. Non-finite values saturate on the integer cast
/// (NaN becomes 0), they are not clamped into the tile grid.
pub fn project(lat: f64, lon: f64, zoom: u8) -> (i64, i64) {
    let (x, y) = project_fractional(lat, lon, zoom);
    (x.floor() as i64, y.floor() as i64)
}
