// src/logging.rs
//
// Tabular metric sinks for the aggregation loop.
// - TabularSink: trait used by the trainer
// - NoopSink:    discards everything
// - JsonlSink:   run parameters + one JSON object per iteration row

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use crate::config::Config;
use crate::trainer::IterationRecord;

/// Abstract sink for per-run parameters and per-iteration metric rows.
pub trait TabularSink {
    /// Called once at run start with the full experiment configuration.
    fn save_params(&mut self, cfg: &Config);

    /// Called once per aggregation iteration.
    fn log_row(&mut self, record: &IterationRecord);
}

/// Sink that discards all output.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopSink;

impl TabularSink for NoopSink {
    fn save_params(&mut self, _cfg: &Config) {}

    fn log_row(&mut self, _record: &IterationRecord) {
        // intentionally no-op
    }
}

/// JSONL file sink: the first line carries the run parameters, every
/// following line is one iteration record.
pub struct JsonlSink {
    writer: BufWriter<File>,
}

impl JsonlSink {
    pub fn create(path: impl AsRef<Path>) -> io::Result<Self> {
        let file = File::create(path)?;
        Ok(Self {
            writer: BufWriter::new(file),
        })
    }

    fn write_line(&mut self, line: &str) {
        // A failed telemetry write must not abort a training run.
        if let Err(err) = writeln!(self.writer, "{}", line) {
            eprintln!("telemetry write failed: {}", err);
        }
    }
}

impl TabularSink for JsonlSink {
    fn save_params(&mut self, cfg: &Config) {
        match serde_json::to_string(&serde_json::json!({ "params": cfg })) {
            Ok(line) => self.write_line(&line),
            Err(err) => eprintln!("failed to serialize run params: {}", err),
        }
        let _ = self.writer.flush();
    }

    fn log_row(&mut self, record: &IterationRecord) {
        match serde_json::to_string(record) {
            Ok(line) => self.write_line(&line),
            Err(err) => eprintln!("failed to serialize iteration record: {}", err),
        }
        let _ = self.writer.flush();
    }
}
