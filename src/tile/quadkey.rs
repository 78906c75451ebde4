/// Encodes a tile as a base-4 quadkey, most significant quadrant first.
///
/// Each digit is `bit(x) + 2 * bit(y)` for one bit position, from `zoom - 1`
/// down to 0, so the result has exactly `zoom` characters. Zoom 0 is the
/// empty string. Zoom levels beyond 32 pad the front with `0` digits.
pub fn encode(x: u32, y: u32, zoom: u8) -> String {
    let mut quadkey = String::with_capacity(zoom as usize);
    for i in (1..=zoom as u32).rev() {
        // x and y are u32, so every bit above 31 is zero
        let mask = 1_u64.checked_shl(i - 1).unwrap_or(0);
        let mut digit = b'0';
        if x as u64 & mask != 0 {
            digit += 1;
        }
        if y as u64 & mask != 0 {
            digit += 2;
        }
        quadkey.push(digit as char);
    }
    quadkey
}
