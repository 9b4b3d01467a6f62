//! List command implementation.

use chanlog_core::LogDir;
use serde::Serialize;
use std::path::Path;

/// One listed segment.
#[derive(Debug, Serialize)]
pub struct SegmentEntry {
    /// Day as `YYYY-MM-DD`.
    pub date: String,
    /// File size in bytes.
    pub size: u64,
    /// Whether the footer is present.
    pub finalized: bool,
}

/// Runs the list command.
pub fn run(dir: &Path, extension: &str, format: &str) -> Result<(), Box<dyn std::error::Error>> {
    if !dir.is_dir() {
        return Err(format!("No log directory at {}", dir.display()).into());
    }

    let entries = collect(dir, extension)?;

    if format == "json" {
        println!("{}", serde_json::to_string_pretty(&entries)?);
    } else {
        print_text(dir, &entries);
    }

    Ok(())
}

fn collect(dir: &Path, extension: &str) -> Result<Vec<SegmentEntry>, Box<dyn std::error::Error>> {
    LogDir::inspect(dir, extension)?
        .into_iter()
        .map(|info| -> Result<SegmentEntry, Box<dyn std::error::Error>> {
            Ok(SegmentEntry {
                date: info.date.format("%Y-%m-%d").to_string(),
                size: std::fs::metadata(&info.path)?.len(),
                finalized: info.finalized,
            })
        })
        .collect()
}

fn print_text(dir: &Path, entries: &[SegmentEntry]) {
    println!("Log directory: {}", dir.display());
    println!("Segments: {}", entries.len());
    println!();
    for entry in entries {
        let status = if entry.finalized { "finalized" } else { "open" };
        println!("  {}  {:>10} bytes  {}", entry.date, entry.size, status);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn collects_sizes_and_status() {
        let temp = tempdir().unwrap();
        std::fs::write(
            temp.path().join("2024-03-01.html"),
            "<table>\n    </table>\n  </body>\n</html>\n",
        )
        .unwrap();
        std::fs::write(temp.path().join("2024-03-02.html"), "<table>\n").unwrap();

        let entries = collect(temp.path(), "html").unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].date, "2024-03-01");
        assert!(entries[0].finalized);
        assert_eq!(entries[1].size, 8);
        assert!(!entries[1].finalized);
    }
}
