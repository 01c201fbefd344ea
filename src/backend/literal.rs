pub const DATE_FORMAT: &str = "%Y-%m-%d";
pub const TIME_FORMAT: &str = "%H:%M:%S%.6f";
pub const DATE_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.6f";
pub const DATE_TIME_OFFSET_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.6f%:z";

/// Single-quoted, embedded quotes doubled.
pub fn string(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

/// Upper-case hex digits, no prefix.
pub fn hex(bytes: &[u8]) -> String {
    bytes.iter().map(|byte| format!("{:02X}", byte)).collect()
}

pub fn float(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{:.1}", value)
    } else {
        value.to_string()
    }
}
