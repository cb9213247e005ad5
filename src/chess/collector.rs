use super::types::Batch;

use crossbeam_channel::Receiver;
use std::fmt::Write as _;
use std::io::{self, Write};

/// Running totals of the collector.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Totals {
    pub batches: u64,
    pub positions: u64,
    /// Bytes written to the primary output, newlines included.
    pub bytes: u64,
    /// Records that were abandoned by a worker.
    pub skipped: u64,
}

impl Totals {
    /// `Position count: 12K (1.23MB)`
    pub fn progress_line(&self) -> String {
        format!(
            "Position count: {}K ({:.2}MB)",
            self.positions / 1000,
            self.bytes as f64 / 1_000_000.0
        )
    }
}

/// Single consumer of the result queue: writes `FEN;score` lines to the
/// primary output and keeps a progress line up to date on a separate stream.
pub struct Collector<W, P> {
    output: W,
    progress: Option<P>,
    progress_interval: u64,
    totals: Totals,
    line: String,
}

impl<W: Write, P: Write> Collector<W, P> {
    /// `progress` of `None` disables progress reporting.
    pub fn new(output: W, progress: Option<P>, progress_interval: u64) -> Self {
        Self {
            output,
            progress,
            progress_interval: progress_interval.max(1),
            totals: Totals::default(),
            line: String::with_capacity(128),
        }
    }

    pub fn totals(&self) -> Totals {
        self.totals
    }

    /// Writes one batch, in its own order.
    pub fn write_batch(&mut self, batch: &Batch) -> io::Result<()> {
        for position in &batch.positions {
            self.line.clear();
            let _ = writeln!(self.line, "{};{}", position.fen, position.score);
            self.output.write_all(self.line.as_bytes())?;
            self.totals.bytes += self.line.len() as u64;
        }

        self.totals.positions += batch.positions.len() as u64;
        self.totals.batches += 1;
        if batch.skipped {
            self.totals.skipped += 1;
        }

        if self.totals.batches.is_multiple_of(self.progress_interval) {
            self.report_progress()?;
        }

        Ok(())
    }

    fn report_progress(&mut self) -> io::Result<()> {
        if let Some(progress) = self.progress.as_mut() {
            write!(progress, "\r{}", self.totals.progress_line())?;
            progress.flush()?;
        }
        Ok(())
    }

    /// Drains the queue until every sender is gone, then flushes the output
    /// and ends the progress line.
    pub fn run(mut self, result_receiver: Receiver<Batch>) -> io::Result<Totals> {
        while let Ok(batch) = result_receiver.recv() {
            self.write_batch(&batch)?;
        }

        self.output.flush()?;
        if self.progress.is_some() {
            self.report_progress()?;
            if let Some(progress) = self.progress.as_mut() {
                writeln!(progress)?;
            }
        }

        Ok(self.totals)
    }
}
