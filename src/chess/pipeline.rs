use super::collector::{Collector, Totals};
use super::reader::RecordSplitter;
use super::types::{Batch, WorkMessage};
use super::worker::worker_thread;

use anyhow::{Context, Result, anyhow, bail};
use crossbeam_channel::{Sender, bounded};
use log::{debug, info};
use std::io::{self, BufRead, Write};
use std::thread;

pub const DEFAULT_WORKERS: usize = 6;
pub const DEFAULT_QUEUE_CAPACITY: usize = 8;
pub const DEFAULT_PROGRESS_INTERVAL: u64 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PipelineConfig {
    pub num_workers: usize,
    /// Capacity of both the work queue and the result queue.
    pub queue_capacity: usize,
    /// Batches between two progress lines.
    pub progress_interval: u64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            num_workers: DEFAULT_WORKERS,
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            progress_interval: DEFAULT_PROGRESS_INTERVAL,
        }
    }
}

impl PipelineConfig {
    pub fn validate(&self) -> Result<()> {
        if self.num_workers == 0 {
            bail!("worker count must be at least 1");
        }
        if self.queue_capacity == 0 {
            bail!("queue capacity must be at least 1");
        }
        if self.progress_interval == 0 {
            bail!("progress interval must be at least 1");
        }
        Ok(())
    }
}

/// Summary of a finished run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub records: u64,
    pub totals: Totals,
}

enum FeedOutcome {
    Exhausted,
    /// Every worker is gone; only happens after the collector failed.
    Disconnected,
}

/// Pushes records onto the work queue, blocking while it is full. A read
/// error ends the feed and is handed back to the caller.
fn feed_records<R: BufRead>(
    splitter: &mut RecordSplitter<R>,
    work_sender: &Sender<WorkMessage>,
) -> (io::Result<()>, FeedOutcome) {
    for record in splitter.by_ref() {
        let record = match record {
            Ok(record) => record,
            Err(err) => return (Err(err), FeedOutcome::Exhausted),
        };
        if work_sender.send(WorkMessage::Record(record)).is_err() {
            return (Ok(()), FeedOutcome::Disconnected);
        }
    }
    (Ok(()), FeedOutcome::Exhausted)
}

/// Runs the whole extraction: the calling thread splits the input, a pool of
/// workers parses records and one collector thread writes the results.
///
/// `progress`, when given, receives the progress line. Returns once the input
/// is exhausted and every extracted position has been written.
pub fn run_pipeline<R, W, P>(
    input: R,
    output: W,
    progress: Option<P>,
    config: PipelineConfig,
) -> Result<RunSummary>
where
    R: BufRead,
    W: Write + Send,
    P: Write + Send,
{
    config.validate()?;

    let (work_sender, work_receiver) = bounded::<WorkMessage>(config.queue_capacity);
    let (result_sender, result_receiver) = bounded::<Batch>(config.queue_capacity);
    let mut splitter = RecordSplitter::new(input);

    thread::scope(|scope| -> Result<RunSummary> {
        let collector = Collector::new(output, progress, config.progress_interval);
        let collector_handle = scope.spawn(move || collector.run(result_receiver));

        let mut worker_handles = Vec::with_capacity(config.num_workers);
        for worker_id in 0..config.num_workers {
            let work_receiver = work_receiver.clone();
            let result_sender = result_sender.clone();
            worker_handles
                .push(scope.spawn(move || worker_thread(worker_id, work_receiver, result_sender)));
        }

        // Workers hold the only result senders from here on, so the collector
        // sees the queue close once the last of them returns.
        drop(work_receiver);
        drop(result_sender);

        let (read_result, outcome) = feed_records(&mut splitter, &work_sender);
        if let FeedOutcome::Exhausted = outcome {
            for _ in 0..config.num_workers {
                if work_sender.send(WorkMessage::EndOfInput).is_err() {
                    break;
                }
            }
        }
        drop(work_sender);

        let mut processed = 0u64;
        for (idx, handle) in worker_handles.into_iter().enumerate() {
            processed += handle
                .join()
                .map_err(|_| anyhow!("worker thread {idx} panicked"))?;
        }
        debug!("workers processed {processed} records");

        let totals = collector_handle
            .join()
            .map_err(|_| anyhow!("collector thread panicked"))?
            .context("failed to write output")?;

        read_result.context("failed to read input")?;

        let summary = RunSummary {
            records: splitter.records_emitted(),
            totals,
        };
        info!(
            "{} records, {} skipped, {} positions, {} bytes",
            summary.records, totals.skipped, totals.positions, totals.bytes
        );
        Ok(summary)
    })
}
