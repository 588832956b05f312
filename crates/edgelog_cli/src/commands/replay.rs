//! Replay command implementation.

use edgelog_core::{CheckpointCoordinator, LogEntry, ReplayReport, ReplayStop};
use edgelog_storage::FileDevice;
use serde::Serialize;
use std::path::Path;

/// Replay output.
#[derive(Debug, Serialize)]
struct ReplayOutput<'a> {
    report: &'a ReplayReport,
    entries: &'a [LogEntry],
}

/// Runs the replay command.
pub fn run(
    path: &Path,
    limit: Option<usize>,
    format: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let device = FileDevice::open_read_only(path)?;
    let replay = CheckpointCoordinator::default().replay_with_report(&device)?;

    let shown = limit.unwrap_or(usize::MAX).min(replay.entries.len());
    let entries = &replay.entries[..shown];

    match format {
        "json" => {
            let output = ReplayOutput {
                report: &replay.report,
                entries,
            };
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        _ => print_text_output(&replay.report, entries),
    }

    Ok(())
}

fn print_text_output(report: &ReplayReport, entries: &[LogEntry]) {
    for (i, entry) in entries.iter().enumerate() {
        println!("{i:>8}  {entry}");
    }
    if entries.len() as u64 != report.entries_recovered {
        let hidden = report.entries_recovered - entries.len() as u64;
        println!("  ... ({hidden} more)");
    }

    println!();
    println!("Generation:  {}", report.generation.as_u32());
    println!(
        "Log region:  blocks {}..{}",
        report.log_start,
        u64::from(report.log_start) + u64::from(report.log_size)
    );
    println!(
        "Blocks:      {} valid of {} scanned",
        report.blocks_valid, report.blocks_scanned
    );
    println!("Entries:     {}", report.entries_recovered);
    match report.stop {
        ReplayStop::RegionExhausted => println!("Stopped:     end of log region"),
        ReplayStop::Rejected { index, reason } => {
            println!("Stopped:     block {index} ({reason})");
        }
        ReplayStop::DeviceEnd { index } => {
            println!("Stopped:     block {index} lies past end of device");
        }
    }
}
