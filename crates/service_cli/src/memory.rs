//! Process memory high-water-mark lookup.
//!
//! Linux-specific: parses the `VmHWM:` line of `/proc/self/status`. The
//! kernel reports the value in kB.

use std::fs;
use std::io;

/// Returns the process memory high-water mark in MB.
///
/// # Errors
///
/// Returns an [`io::Error`] if `/proc/self/status` cannot be read or does
/// not contain a parsable `VmHWM:` line (e.g. on non-Linux platforms).
pub fn high_water_mark_mb() -> io::Result<f64> {
    let status = fs::read_to_string("/proc/self/status")?;
    parse_vm_hwm(&status)
}

fn parse_vm_hwm(status: &str) -> io::Result<f64> {
    for line in status.lines() {
        if let Some(rest) = line.strip_prefix("VmHWM:") {
            let kilobytes: u64 = rest
                .trim()
                .trim_end_matches("kB")
                .trim()
                .parse()
                .map_err(|e| {
                    io::Error::new(io::ErrorKind::InvalidData, format!("bad VmHWM line: {e}"))
                })?;
            return Ok(kilobytes as f64 / 1024.0);
        }
    }
    Err(io::Error::new(
        io::ErrorKind::NotFound,
        "VmHWM not present in /proc/self/status",
    ))
}
