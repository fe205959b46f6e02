/// Stops of the "sunset" sequential scale, light yellow to deep violet.
const SUNSET: [(u8, u8, u8); 7] = [
    (243, 231, 155),
    (250, 196, 132),
    (248, 160, 126),
    (235, 127, 134),
    (206, 102, 147),
    (160, 89, 160),
    (92, 83, 165),
];

pub const SUNSET_NAME: &str = "sunset";

/// Samples the sunset scale at `t` in `[0, 1]` and returns `#rrggbb`.
///
/// `t` is clamped; `NaN` maps to the low end.
pub fn sunset(t: f64) -> String {
    let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
    let scaled = t * (SUNSET.len() - 1) as f64;
    let lo = scaled.floor() as usize;
    let hi = (lo + 1).min(SUNSET.len() - 1);
    let frac = scaled - lo as f64;

    let lerp = |a: u8, b: u8| (a as f64 + (b as f64 - a as f64) * frac).round() as u8;
    let (r0, g0, b0) = SUNSET[lo];
    let (r1, g1, b1) = SUNSET[hi];
    format!("#{:02x}{:02x}{:02x}", lerp(r0, r1), lerp(g0, g1), lerp(b0, b1))
}

/// Position of `value` within `[min, max]`; 0.5 when the range is empty.
pub fn normalize(value: f64, min: f64, max: f64) -> f64 {
    let span = max - min;
    if span <= 0.0 || !span.is_finite() {
        0.5
    } else {
        (value - min) / span
    }
}
