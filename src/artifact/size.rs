// ABOUTME: Human-readable artifact sizes for progress logs.
// ABOUTME: Uses base-10 units (1 kB = 1000 B) with up to two decimals.

const UNITS: [&str; 6] = ["B", "kB", "MB", "GB", "TB", "PB"];

pub fn format_size(bytes: u64) -> String {
    let mut value = bytes as f64;
    let mut unit = 0;
    // Values that round up to 1000 move to the next unit.
    while value >= 999.995 && unit < UNITS.len() - 1 {
        value /= 1000.0;
        unit += 1;
    }

    let rendered = format!("{value:.2}");
    let rendered = rendered.trim_end_matches('0').trim_end_matches('.');
    format!("{rendered} {}", UNITS[unit])
}
