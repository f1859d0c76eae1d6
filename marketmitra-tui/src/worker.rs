//! Background worker thread: price fetching runs here.
//!
//! Communication with the TUI main thread is via `mpsc` channels.

use std::io;
use std::sync::mpsc::{Receiver, Sender};
use std::thread::{self, JoinHandle};

use tracing::{debug, info};

use marketmitra_core::{
    load_dashboard_with, DashboardConfig, DashboardData, DashboardError, DataError, FetchProgress,
};

/// Commands sent from the TUI to the worker.
#[derive(Debug)]
pub enum WorkerCommand {
    Load { config: Box<DashboardConfig> },
    Shutdown,
}

/// Responses sent from the worker back to the TUI.
#[derive(Debug, Clone)]
pub enum WorkerResponse {
    FetchStarted {
        ticker: String,
        index: usize,
        total: usize,
    },
    FetchDone {
        ticker: String,
        error: Option<String>,
    },
    Loaded(Box<DashboardData>),
    Blocked(DashboardError),
    /// The configured price source could not be built.
    SourceError(String),
}

/// Spawn the background worker thread.
pub fn spawn_worker(
    rx: Receiver<WorkerCommand>,
    tx: Sender<WorkerResponse>,
) -> io::Result<JoinHandle<()>> {
    thread::Builder::new()
        .name("marketmitra-worker".into())
        .spawn(move || worker_loop(rx, tx))
}

fn worker_loop(rx: Receiver<WorkerCommand>, tx: Sender<WorkerResponse>) {
    loop {
        match rx.recv() {
            Ok(WorkerCommand::Shutdown) | Err(_) => break,
            Ok(WorkerCommand::Load { config }) => {
                let response = handle_load(&config, &tx);
                if tx.send(response).is_err() {
                    break;
                }
            }
        }
    }
    debug!("worker exiting");
}

fn handle_load(config: &DashboardConfig, tx: &Sender<WorkerResponse>) -> WorkerResponse {
    let source = match config.build_source() {
        Ok(source) => source,
        Err(e) => return WorkerResponse::SourceError(e.to_string()),
    };
    info!(source = source.name(), "loading dashboard");

    let progress = ChannelProgress { tx: tx.clone() };
    match load_dashboard_with(config, &source, &progress) {
        Ok(data) => WorkerResponse::Loaded(Box::new(data)),
        Err(e) => WorkerResponse::Blocked(e),
    }
}

/// Forwards per-ticker progress to the TUI.
struct ChannelProgress {
    tx: Sender<WorkerResponse>,
}

impl FetchProgress for ChannelProgress {
    fn on_start(&self, ticker: &str, index: usize, total: usize) {
        let _ = self.tx.send(WorkerResponse::FetchStarted {
            ticker: ticker.to_string(),
            index,
            total,
        });
    }

    fn on_complete(
        &self,
        ticker: &str,
        _index: usize,
        _total: usize,
        result: &Result<usize, DataError>,
    ) {
        let _ = self.tx.send(WorkerResponse::FetchDone {
            ticker: ticker.to_string(),
            error: result.as_ref().err().map(|e| e.to_string()),
        });
    }

    fn on_batch_complete(&self, _with_data: usize, _missing: usize, _total: usize) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use marketmitra_core::{SourceKind, TickerMap};
    use std::sync::mpsc;
    use std::time::Duration;

    fn synthetic_config() -> DashboardConfig {
        let mut config = DashboardConfig::default();
        config.source.kind = SourceKind::Synthetic;
        config
    }

    fn final_response(rx: &mpsc::Receiver<WorkerResponse>) -> WorkerResponse {
        loop {
            let resp = rx
                .recv_timeout(Duration::from_secs(10))
                .expect("worker should respond");
            match resp {
                WorkerResponse::FetchStarted { .. } | WorkerResponse::FetchDone { .. } => continue,
                other => return other,
            }
        }
    }

    #[test]
    fn worker_shutdown() {
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (resp_tx, _resp_rx) = mpsc::channel();

        let handle = spawn_worker(cmd_rx, resp_tx).unwrap();
        cmd_tx.send(WorkerCommand::Shutdown).unwrap();
        handle.join().expect("worker should join cleanly");
    }

    #[test]
    fn synthetic_load_reports_progress_and_data() {
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (resp_tx, resp_rx) = mpsc::channel();
        let handle = spawn_worker(cmd_rx, resp_tx).unwrap();

        cmd_tx
            .send(WorkerCommand::Load {
                config: Box::new(synthetic_config()),
            })
            .unwrap();

        let first = resp_rx.recv_timeout(Duration::from_secs(10)).unwrap();
        assert!(matches!(first, WorkerResponse::FetchStarted { index: 0, total: 7, .. }));

        match final_response(&resp_rx) {
            WorkerResponse::Loaded(data) => {
                assert_eq!(data.merged.len(), 7);
                assert_eq!(data.absent_merged(), 0);
                assert_eq!(data.source_name, "synthetic");
            }
            other => panic!("unexpected response: {other:?}"),
        }

        cmd_tx.send(WorkerCommand::Shutdown).unwrap();
        handle.join().unwrap();
    }

    #[test]
    fn empty_mapping_is_blocked() {
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (resp_tx, resp_rx) = mpsc::channel();
        let handle = spawn_worker(cmd_rx, resp_tx).unwrap();

        let mut config = synthetic_config();
        config.tickers = TickerMap::default();
        cmd_tx
            .send(WorkerCommand::Load {
                config: Box::new(config),
            })
            .unwrap();

        match final_response(&resp_rx) {
            WorkerResponse::Blocked(e) => assert_eq!(e, DashboardError::EmptyPerformanceTable),
            other => panic!("unexpected response: {other:?}"),
        }

        drop(cmd_tx);
        handle.join().unwrap();
    }
}
