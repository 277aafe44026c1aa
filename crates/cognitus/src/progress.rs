//! Sync progress reporting.
//!
//! Implements the core's [`SyncProgressReporter`] for the CLI. Progress goes
//! to **stderr** so stdout remains parseable for scripts.

use std::io::Write;

use cognitus_core::reconcile::{NoProgress, SyncProgressEvent, SyncProgressReporter};

/// Human-friendly progress on stderr: "sync  fetching  1,234 / 5,000 cards".
pub struct StderrProgress;

impl SyncProgressReporter for StderrProgress {
    fn report(&self, event: SyncProgressEvent) {
        let line = match &event {
            SyncProgressEvent::Planned {
                to_delete,
                to_insert,
            } => format!(
                "sync  planned  {} to delete, {} to insert\n",
                format_number(*to_delete as u64),
                format_number(*to_insert as u64)
            ),
            SyncProgressEvent::Fetching { n, total } => format!(
                "sync  fetching  {} / {} cards\n",
                format_number(*n as u64),
                format_number(*total as u64)
            ),
            SyncProgressEvent::Committed { deleted, inserted } => format!(
                "sync  committed  {} deleted, {} inserted\n",
                format_number(*deleted as u64),
                format_number(*inserted as u64)
            ),
        };
        let mut stderr = std::io::stderr().lock();
        let _ = stderr.write_all(line.as_bytes());
        let _ = stderr.flush();
    }
}

/// Machine-readable progress: one JSON object per line on stderr.
pub struct JsonProgress;

fn event_json(event: &SyncProgressEvent) -> serde_json::Value {
    match event {
        SyncProgressEvent::Planned {
            to_delete,
            to_insert,
        } => serde_json::json!({
            "event": "progress",
            "phase": "planned",
            "to_delete": to_delete,
            "to_insert": to_insert
        }),
        SyncProgressEvent::Fetching { n, total } => serde_json::json!({
            "event": "progress",
            "phase": "fetching",
            "n": n,
            "total": total
        }),
        SyncProgressEvent::Committed { deleted, inserted } => serde_json::json!({
            "event": "progress",
            "phase": "committed",
            "deleted": deleted,
            "inserted": inserted
        }),
    }
}

impl SyncProgressReporter for JsonProgress {
    fn report(&self, event: SyncProgressEvent) {
        if let Ok(line) = serde_json::to_string(&event_json(&event)) {
            let mut stderr = std::io::stderr().lock();
            let _ = writeln!(stderr, "{}", line);
            let _ = stderr.flush();
        }
    }
}

pub fn format_number(n: u64) -> String {
    let s = n.to_string();
    let mut result = String::with_capacity(s.len() + (s.len() - 1) / 3);
    for (i, c) in s.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            result.push(',');
        }
        result.push(c);
    }
    result.chars().rev().collect()
}

/// Progress mode for the CLI: off, human (stderr), or JSON (stderr).
#[derive(Clone, Copy, Debug, Eq, PartialEq, clap::ValueEnum)]
pub enum ProgressMode {
    Off,
    Human,
    Json,
}

impl ProgressMode {
    /// Default: human progress when stderr is a TTY, otherwise off.
    pub fn default_for_tty() -> Self {
        if atty::is(atty::Stream::Stderr) {
            ProgressMode::Human
        } else {
            ProgressMode::Off
        }
    }

    pub fn reporter(&self) -> Box<dyn SyncProgressReporter> {
        match self {
            ProgressMode::Off => Box::new(NoProgress),
            ProgressMode::Human => Box::new(StderrProgress),
            ProgressMode::Json => Box::new(JsonProgress),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_number_comma() {
        assert_eq!(format_number(0), "0");
        assert_eq!(format_number(999), "999");
        assert_eq!(format_number(1000), "1,000");
        assert_eq!(format_number(1_234_567), "1,234,567");
    }

    #[test]
    fn json_events_carry_phase() {
        let v = event_json(&SyncProgressEvent::Fetching { n: 3, total: 10 });
        assert_eq!(v["phase"], "fetching");
        assert_eq!(v["n"], 3);
        assert_eq!(v["total"], 10);

        let v = event_json(&SyncProgressEvent::Committed {
            deleted: 1,
            inserted: 2,
        });
        assert_eq!(v["phase"], "committed");
        assert_eq!(v["inserted"], 2);
    }
}
