use serde_json::Value;
use std::io::{self, Write};

/// Pretty-print JSON to stdout. Cyrillic labels are written as-is.
pub fn print_json(value: &Value) {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    let written = serde_json::to_writer_pretty(&mut out, value).and_then(|_| {
        writeln!(out).map_err(serde_json::Error::io)?;
        Ok(())
    });
    if let Err(e) = written {
        eprintln!("JSON serialization error: {}", e);
    }
}
