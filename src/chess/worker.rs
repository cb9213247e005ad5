use super::moves::extract_positions;
use super::types::{Batch, Record, WorkMessage};
use super::visitor::FastGameVisitor;

use crossbeam_channel::{Receiver, Sender};
use log::{debug, trace};

/// Turns one record into its batch. Unusable records come back as an empty
/// batch flagged as skipped; nothing here is fatal.
pub fn process_record(visitor: &mut FastGameVisitor, record: &Record) -> Batch {
    let outcome = visitor
        .parse(&record.bytes)
        .and_then(|game| extract_positions(&game));

    match outcome {
        Ok(positions) => Batch {
            record_index: record.index,
            positions,
            skipped: false,
        },
        Err(reason) if reason.is_fast_exit() => {
            trace!(
                "record {} skipped after {} moves: {}",
                record.index,
                visitor.moves_visited(),
                reason
            );
            Batch::skipped(record.index)
        }
        Err(reason) => {
            debug!("record {} skipped: {}", record.index, reason);
            Batch::skipped(record.index)
        }
    }
}

/// Worker loop: pops records until the end-of-input marker (or a closed
/// queue) and pushes one batch per record. Returns the number of records
/// processed.
///
/// Stops early when the result queue is gone, which only happens when the
/// collector has failed.
pub fn worker_thread(
    worker_id: usize,
    work_receiver: Receiver<WorkMessage>,
    result_sender: Sender<Batch>,
) -> u64 {
    let mut visitor = FastGameVisitor::new();
    let mut processed = 0u64;

    while let Ok(message) = work_receiver.recv() {
        let record = match message {
            WorkMessage::Record(record) => record,
            WorkMessage::EndOfInput => break,
        };

        let batch = process_record(&mut visitor, &record);
        processed += 1;

        if result_sender.send(batch).is_err() {
            debug!("worker {worker_id}: result queue closed, stopping");
            break;
        }
    }

    trace!("worker {worker_id} finished after {processed} records");
    processed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossbeam_channel::bounded;
    use std::thread;

    fn record(index: u64, movetext: &str) -> Record {
        Record {
            index,
            bytes: format!("[Event \"W\"]\n\n{movetext}\n").into_bytes(),
        }
    }

    #[test]
    fn test_process_record_extracts_positions() {
        let mut visitor = FastGameVisitor::new();
        let batch = process_record(
            &mut visitor,
            &record(7, "1. e4 { [%eval 0.3] } e5 { [%eval 0.25] } *"),
        );

        assert_eq!(batch.record_index, 7);
        assert!(!batch.skipped);
        assert_eq!(batch.positions.len(), 2);
        assert_eq!(batch.positions[1].score, 25);
    }

    #[test]
    fn test_process_record_unevaluated_game_yields_empty_batch() {
        let mut visitor = FastGameVisitor::new();
        let batch = process_record(&mut visitor, &record(1, "1. e4 { hello } e5 *"));

        assert!(batch.skipped);
        assert!(batch.is_empty());
    }

    #[test]
    fn test_process_record_game_without_comments_is_skipped() {
        let mut visitor = FastGameVisitor::new();
        let batch = process_record(&mut visitor, &record(1, "1. e4 e5 2. Nf3 *"));

        assert!(batch.skipped);
        assert!(batch.is_empty());
    }

    #[test]
    fn test_process_record_malformed_record_yields_empty_batch() {
        let mut visitor = FastGameVisitor::new();
        let batch = process_record(
            &mut visitor,
            &record(3, "1. e4 { [%eval 0.3] } e5 { [%eval 0.2]"),
        );

        assert_eq!(batch.record_index, 3);
        assert!(batch.skipped);
        assert!(batch.is_empty());
    }

    #[test]
    fn test_process_record_illegal_move_yields_empty_batch() {
        let mut visitor = FastGameVisitor::new();
        let batch = process_record(
            &mut visitor,
            &record(1, "1. e4 { [%eval 0.3] } e5 { [%eval 0.2] } 2. Qxf7 *"),
        );

        assert!(batch.skipped);
        assert!(batch.is_empty());
    }

    #[test]
    fn test_worker_stops_on_end_of_input() {
        let (work_tx, work_rx) = bounded(4);
        let (result_tx, result_rx) = bounded(4);

        let handle = thread::spawn(move || worker_thread(0, work_rx, result_tx));

        work_tx
            .send(WorkMessage::Record(record(1, "1. e4 { [%eval 0.3] } *")))
            .unwrap();
        work_tx
            .send(WorkMessage::Record(record(2, "1. d4 { nope } *")))
            .unwrap();
        work_tx.send(WorkMessage::EndOfInput).unwrap();

        assert_eq!(handle.join().unwrap(), 2);

        let batches: Vec<Batch> = result_rx.iter().collect();
        assert_eq!(batches.len(), 2);
        assert_eq!(batches[0].positions.len(), 1);
        assert!(batches[1].skipped);

        // The work queue still has its sender; the worker left because of
        // the marker, not a disconnect.
        drop(work_tx);
    }

    #[test]
    fn test_worker_stops_when_result_queue_closes() {
        let (work_tx, work_rx) = bounded(4);
        let (result_tx, result_rx) = bounded::<Batch>(1);
        drop(result_rx);

        let handle = thread::spawn(move || worker_thread(0, work_rx, result_tx));
        work_tx
            .send(WorkMessage::Record(record(1, "1. e4 *")))
            .unwrap();

        assert_eq!(handle.join().unwrap(), 1);
    }
}
