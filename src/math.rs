// src/math.rs

/// Convert a UI amount into smallest units: round(amount * 10^decimals)
pub fn to_smallest_units(amount: f64, decimals: u8) -> u64 {
    (amount * 10f64.powi(decimals as i32)).round() as u64
}

/// Convert smallest units back into a UI amount
pub fn from_smallest_units(value: u64, decimals: u8) -> f64 {
    value as f64 / 10f64.powi(decimals as i32)
}

/// Format smallest units with proper decimals for display
pub fn format_amount(value: u64, decimals: u8) -> String {
    format!("{:.6}", from_smallest_units(value, decimals))
}
