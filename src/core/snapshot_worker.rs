use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;

use crate::core::{DirectoryEntry, EntryFilter, snapshot};

struct SnapshotRequest {
    id: u64,
    root: PathBuf,
    filter: EntryFilter,
}

pub struct SnapshotResult {
    pub id: u64,
    pub root: PathBuf,
    pub tree: DirectoryEntry,
}

pub struct SnapshotWorker {
    request_tx: Sender<SnapshotRequest>,
    result_rx: Receiver<SnapshotResult>,
    next_id: u64,
}

impl SnapshotWorker {
    pub fn new() -> Self {
        let (request_tx, request_rx) = mpsc::channel::<SnapshotRequest>();
        let (result_tx, result_rx) = mpsc::channel::<SnapshotResult>();

        thread::spawn(move || {
            for request in request_rx {
                let tree = snapshot(&request.root, &request.filter);
                tracing::debug!(
                    id = request.id,
                    root = %request.root.display(),
                    files = tree.file_count(),
                    "snapshot ready"
                );
                let result = SnapshotResult {
                    id: request.id,
                    root: request.root,
                    tree,
                };
                if result_tx.send(result).is_err() {
                    break;
                }
            }
        });

        Self {
            request_tx,
            result_rx,
            next_id: 0,
        }
    }

    /// Queues a walk of `root` and returns the id its result will carry.
    pub fn request(&mut self, root: PathBuf, filter: EntryFilter) -> u64 {
        self.next_id += 1;
        let id = self.next_id;
        let _ = self.request_tx.send(SnapshotRequest { id, root, filter });
        id
    }

    pub fn poll(&self) -> Option<SnapshotResult> {
        self.result_rx.try_recv().ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn snapshot_worker_returns_tree_for_requested_root() {
        let temp_dir = tempfile::tempdir().unwrap();
        std::fs::write(temp_dir.path().join("index.js"), "").unwrap();
        let mut worker = SnapshotWorker::new();

        let id = worker.request(temp_dir.path().to_path_buf(), EntryFilter::default());

        let result = worker
            .result_rx
            .recv_timeout(Duration::from_secs(2))
            .unwrap();
        assert_eq!(result.id, id);
        assert_eq!(result.root, temp_dir.path());
        assert_eq!(result.tree.children.len(), 1);
    }

    #[test]
    fn snapshot_worker_answers_requests_in_order() {
        let temp_dir = tempfile::tempdir().unwrap();
        let mut worker = SnapshotWorker::new();

        let first = worker.request(temp_dir.path().to_path_buf(), EntryFilter::default());
        let second = worker.request(temp_dir.path().to_path_buf(), EntryFilter::default());

        let timeout = Duration::from_secs(2);
        assert_eq!(worker.result_rx.recv_timeout(timeout).unwrap().id, first);
        assert_eq!(worker.result_rx.recv_timeout(timeout).unwrap().id, second);
        assert!(second > first);
    }
}
