//! Bounded worker pool with first-failure cancellation.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc;
use std::sync::{Mutex, PoisonError};

use crate::fetch;
use crate::resolver::SegmentRef;
use crate::retry::run_with_retry;
use crate::storage::{DownloadedSegment, SegmentStore};

use super::{DownloadError, DownloadOptions, DownloadProgress};

type WorkQueue<'a> = Mutex<VecDeque<&'a SegmentRef>>;

/// Runs all `refs` on `opts.max_concurrent` threads. Returns an arena indexed
/// by segment index; on failure returns the first non-cancellation error after
/// every worker has exited.
pub(super) fn run_pool(
    refs: &[SegmentRef],
    store: &SegmentStore,
    opts: &DownloadOptions,
    progress: Option<&DownloadProgress>,
) -> Result<Vec<Option<DownloadedSegment>>, DownloadError> {
    let count = refs.len();
    let work: WorkQueue<'_> = Mutex::new(refs.iter().collect());
    let cancel = AtomicBool::new(false);
    let num_workers = opts.max_concurrent.max(1).min(count);

    tracing::debug!(segments = count, workers = num_workers, "starting segment pool");

    std::thread::scope(|scope| {
        let (tx, rx) = mpsc::channel::<(usize, Result<DownloadedSegment, DownloadError>)>();
        let mut handles = Vec::with_capacity(num_workers);
        for _ in 0..num_workers {
            let tx = tx.clone();
            let work = &work;
            let cancel = &cancel;
            handles.push(scope.spawn(move || {
                while !cancel.load(Ordering::Relaxed) {
                    let Some(item) = pop_front(work) else {
                        break;
                    };
                    let res = download_one(item, store, opts, cancel);
                    if tx.send((item.index, res)).is_err() {
                        break;
                    }
                }
            }));
        }
        drop(tx);

        let mut arena: Vec<Option<DownloadedSegment>> = vec![None; count];
        let mut first_error: Option<DownloadError> = None;
        // Ends once every worker has dropped its sender.
        for (index, res) in rx {
            match res {
                Ok(seg) => {
                    if let Some(p) = progress {
                        p.record(seg.byte_len);
                    }
                    arena[index] = Some(seg);
                }
                Err(e) if first_error.is_none() && !e.is_cancellation() => {
                    tracing::warn!("{}; cancelling remaining segments", e);
                    cancel.store(true, Ordering::Relaxed);
                    let dropped = drain(&work);
                    if dropped > 0 {
                        tracing::debug!(dropped, "dropped queued segments");
                    }
                    first_error = Some(e);
                }
                Err(e) => tracing::debug!("segment {} stopped: {}", index, e),
            }
        }

        for h in handles {
            if h.join().is_err() && first_error.is_none() {
                first_error = Some(DownloadError::WorkerPanicked);
            }
        }

        match first_error {
            Some(e) => Err(e),
            None => Ok(arena),
        }
    })
}

fn download_one(
    item: &SegmentRef,
    store: &SegmentStore,
    opts: &DownloadOptions,
    cancel: &AtomicBool,
) -> Result<DownloadedSegment, DownloadError> {
    let bytes = run_with_retry(&opts.retry, Some(cancel), || {
        fetch::fetch(&item.url, &opts.fetch, Some(cancel))
    })
    .map_err(|source| DownloadError::Fetch {
        index: item.index,
        url: item.url.clone(),
        source,
    })?;

    store
        .write(item.index, &bytes)
        .map_err(|source| DownloadError::Storage {
            index: item.index,
            path: store.path_for(item.index),
            source,
        })
}

fn pop_front<'a>(work: &WorkQueue<'a>) -> Option<&'a SegmentRef> {
    work.lock()
        .unwrap_or_else(PoisonError::into_inner)
        .pop_front()
}

fn drain(work: &WorkQueue<'_>) -> usize {
    let mut q = work.lock().unwrap_or_else(PoisonError::into_inner);
    let n = q.len();
    q.clear();
    n
}
