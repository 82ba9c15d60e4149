//! Bandwidth reporting shared by the monitor and the `pigeon` sampler
//!
//! The monitor parses the live output of `vnstat -l`:
//!
//! ```text
//!    rx:     1,52 Mbit/s   210 p/s          tx:   312,40 kbit/s   150 p/s
//! ```
//!
//! and writes the summed rate, in bits per second, to the side-channel file
//! as a plain decimal number.

use crate::error::{PetError, Result};
use std::path::Path;
use tokio::fs;

/// Convert a rate unit into its bits-per-second multiplier
pub fn unit_multiplier(unit: &str) -> Result<f64> {
    match unit {
        "bit/s" => Ok(1.0),
        "kbit/s" => Ok(1e3),
        "Mbit/s" => Ok(1e6),
        "gbit/s" | "Gbit/s" => Ok(1e9),
        other => Err(PetError::UnknownUnit(other.to_string())),
    }
}

/// Parse a decimal that may use `,` as separator
pub fn parse_decimal(value: &str) -> Option<f64> {
    value.trim().replace(',', ".").parse().ok()
}

/// Total rate (tx + rx) in bits per second
///
/// Output that is empty or carries no `rx` figure counts as zero.
pub fn parse_vnstat_line(output: &str) -> Result<f64> {
    if output.is_empty() || !output.contains("rx") {
        return Ok(0.0);
    }

    let tokens: Vec<&str> = output.split_whitespace().collect();
    let rx = rate_after(&tokens, "rx:")?;
    let tx = rate_after(&tokens, "tx:")?;
    Ok(tx + rx)
}

/// Rate given by the value and unit tokens following `marker`
fn rate_after(tokens: &[&str], marker: &str) -> Result<f64> {
    let position = tokens
        .iter()
        .rposition(|t| *t == marker)
        .ok_or_else(|| PetError::malformed("vnstat", format!("no '{}' field", marker)))?;

    let value = tokens
        .get(position + 1)
        .and_then(|v| parse_decimal(v))
        .ok_or_else(|| PetError::malformed("vnstat", format!("bad value after '{}'", marker)))?;
    let unit = tokens
        .get(position + 2)
        .ok_or_else(|| PetError::malformed("vnstat", format!("no unit after '{}'", marker)))?;

    Ok(value * unit_multiplier(unit)?)
}

/// Write the latest total to the side-channel file
pub async fn write_signal(path: &Path, bits_per_second: f64) -> Result<()> {
    fs::write(path, bits_per_second.to_string())
        .await
        .map_err(|source| PetError::SourceUnavailable {
            path: path.to_path_buf(),
            source,
        })
}
