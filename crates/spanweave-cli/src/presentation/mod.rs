pub mod compare;
pub mod sessions;
pub mod style;
pub mod summary;

use anyhow::Result;
use serde::Serialize;

/// Pretty JSON on stdout.
pub fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

pub fn format_duration(seconds: Option<f64>) -> String {
    match seconds {
        None => "unknown".to_string(),
        Some(s) if s < 60.0 => format!("{:.1}s", s),
        Some(s) if s < 3600.0 => format!("{:.1}m", s / 60.0),
        Some(s) => format!("{:.1}h", s / 3600.0),
    }
}
