//! Application state: single-owner, main-thread only.
//!
//! All TUI state lives here. The worker thread communicates via channels.

use std::collections::VecDeque;
use std::path::PathBuf;
use std::sync::mpsc::{Receiver, SendError, Sender};

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use marketmitra_core::{filter_sectors, DashboardConfig, DashboardData, DashboardError, MergedRow};

use crate::worker::{WorkerCommand, WorkerResponse};

const PANEL_COUNT: usize = 5;
const ERROR_HISTORY_CAP: usize = 50;

/// Which panel is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Panel {
    Budget,
    Market,
    Comparison,
    Returns,
    About,
}

impl Panel {
    pub fn index(self) -> usize {
        match self {
            Panel::Budget => 0,
            Panel::Market => 1,
            Panel::Comparison => 2,
            Panel::Returns => 3,
            Panel::About => 4,
        }
    }

    pub fn from_index(i: usize) -> Option<Self> {
        match i {
            0 => Some(Panel::Budget),
            1 => Some(Panel::Market),
            2 => Some(Panel::Comparison),
            3 => Some(Panel::Returns),
            4 => Some(Panel::About),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Panel::Budget => "Budget",
            Panel::Market => "Market",
            Panel::Comparison => "Comparison",
            Panel::Returns => "Returns",
            Panel::About => "About",
        }
    }

    pub fn next(self) -> Panel {
        Panel::from_index((self.index() + 1) % PANEL_COUNT).unwrap_or(Panel::Budget)
    }

    pub fn prev(self) -> Panel {
        Panel::from_index((self.index() + PANEL_COUNT - 1) % PANEL_COUNT).unwrap_or(Panel::Budget)
    }
}

/// Status message severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusLevel {
    Info,
    Warning,
    Error,
}

/// Error category for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Fetch,
    Data,
    Config,
    Other,
}

impl ErrorCategory {
    pub fn label(self) -> &'static str {
        match self {
            ErrorCategory::Fetch => "FETCH",
            ErrorCategory::Data => "DATA",
            ErrorCategory::Config => "CFG",
            ErrorCategory::Other => "ERR",
        }
    }
}

/// An error record for the error history overlay.
#[derive(Debug, Clone)]
pub struct ErrorRecord {
    pub timestamp: NaiveDateTime,
    pub category: ErrorCategory,
    pub message: String,
    pub context: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Overlay {
    None,
    ErrorHistory,
}

/// Result of the most recent completed load.
#[derive(Debug)]
pub enum LoadState {
    /// Nothing has finished loading yet.
    Pending,
    Ready(Box<DashboardData>),
    /// A whole table is missing; only the message is rendered.
    Blocked(DashboardError),
    /// The price source could not be constructed.
    Failed(String),
}

/// In-flight fetch progress, shown in the status bar.
#[derive(Debug, Clone, Default)]
pub struct FetchStatus {
    pub current: Option<String>,
    pub done: usize,
    pub total: usize,
    pub failed: usize,
}

/// Sidebar "Filter Sectors" checklist.
#[derive(Debug, Clone, Default)]
pub struct SectorFilter {
    sectors: Vec<String>,
    selected: Vec<bool>,
    cursor: usize,
}

impl SectorFilter {
    /// Every sector starts selected.
    pub fn new(sectors: Vec<String>) -> Self {
        let selected = vec![true; sectors.len()];
        Self {
            sectors,
            selected,
            cursor: 0,
        }
    }

    /// Keep only the sectors in `names` selected. Unknown names are ignored.
    pub fn restrict_to(&mut self, names: &[String]) {
        for (sector, flag) in self.sectors.iter().zip(self.selected.iter_mut()) {
            *flag = names.contains(sector);
        }
    }

    pub fn sectors(&self) -> &[String] {
        &self.sectors
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn is_selected(&self, index: usize) -> bool {
        self.selected.get(index).copied().unwrap_or(false)
    }

    pub fn is_empty(&self) -> bool {
        self.sectors.is_empty()
    }

    pub fn move_down(&mut self) {
        if self.cursor + 1 < self.sectors.len() {
            self.cursor += 1;
        }
    }

    pub fn move_up(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn toggle_current(&mut self) {
        if let Some(flag) = self.selected.get_mut(self.cursor) {
            *flag = !*flag;
        }
    }

    pub fn select_all(&mut self) {
        self.selected.iter_mut().for_each(|f| *f = true);
    }

    pub fn deselect_all(&mut self) {
        self.selected.iter_mut().for_each(|f| *f = false);
    }

    /// Selected sector names, in sidebar order.
    pub fn selected_sectors(&self) -> Vec<String> {
        self.sectors
            .iter()
            .zip(&self.selected)
            .filter(|(_, on)| **on)
            .map(|(s, _)| s.clone())
            .collect()
    }

    pub fn selected_count(&self) -> usize {
        self.selected.iter().filter(|on| **on).count()
    }
}

/// Top-level application state.
pub struct AppState {
    pub active_panel: Panel,
    pub running: bool,
    pub config: DashboardConfig,
    pub load: LoadState,
    pub loading: bool,
    pub fetch: FetchStatus,
    pub filter: SectorFilter,
    /// Selection restored from disk, applied once the first load lands.
    pub pending_selection: Option<Vec<String>>,
    pub worker_tx: Sender<WorkerCommand>,
    pub worker_rx: Receiver<WorkerResponse>,
    pub status_message: Option<(String, StatusLevel)>,
    pub error_history: VecDeque<ErrorRecord>,
    pub error_scroll: usize,
    pub overlay: Overlay,
    pub state_path: PathBuf,
}

impl AppState {
    pub fn new(
        config: DashboardConfig,
        worker_tx: Sender<WorkerCommand>,
        worker_rx: Receiver<WorkerResponse>,
        state_path: PathBuf,
    ) -> Self {
        Self {
            active_panel: Panel::Budget,
            running: true,
            config,
            load: LoadState::Pending,
            loading: false,
            fetch: FetchStatus::default(),
            filter: SectorFilter::default(),
            pending_selection: None,
            worker_tx,
            worker_rx,
            status_message: None,
            error_history: VecDeque::with_capacity(ERROR_HISTORY_CAP),
            error_scroll: 0,
            overlay: Overlay::None,
            state_path,
        }
    }

    /// Ask the worker to (re)load the dashboard. Ignored while a load runs.
    pub fn request_load(&mut self) {
        if self.loading {
            return;
        }
        let command = WorkerCommand::Load {
            config: Box::new(self.config.clone()),
        };
        match self.worker_tx.send(command) {
            Ok(()) => {
                self.loading = true;
                self.fetch = FetchStatus::default();
                self.set_status("Loading budget and market data...");
            }
            Err(SendError(_)) => {
                self.push_error(
                    ErrorCategory::Other,
                    "Background worker is not running".into(),
                    "reload".into(),
                );
            }
        }
    }

    /// Install freshly loaded data, keeping the current selection where the
    /// sectors still exist.
    pub fn apply_loaded(&mut self, data: DashboardData) {
        let previous = if self.filter.is_empty() {
            self.pending_selection.take()
        } else {
            Some(self.filter.selected_sectors())
        };
        let mut filter = SectorFilter::new(data.sectors());
        if let Some(names) = previous {
            filter.restrict_to(&names);
        }
        self.filter = filter;
        self.loading = false;
        self.fetch.current = None;

        for warning in &data.warnings {
            self.record_error(ErrorCategory::Config, warning.to_string(), "ticker mapping".into());
        }
        match data.warnings.first() {
            None => self.set_status("Dashboard loaded successfully"),
            Some(first) if data.warnings.len() == 1 => {
                self.set_warning(format!("Dashboard loaded with a warning: {first}"))
            }
            Some(first) => self.set_warning(format!(
                "Dashboard loaded with {} warnings: {first} (e for details)",
                data.warnings.len()
            )),
        }
        self.load = LoadState::Ready(Box::new(data));
    }

    /// Fold one worker message into the state.
    pub fn handle_response(&mut self, response: WorkerResponse) {
        match response {
            WorkerResponse::FetchStarted { ticker, total, .. } => {
                self.fetch.current = Some(ticker);
                self.fetch.total = total;
            }
            WorkerResponse::FetchDone { ticker, error } => {
                self.fetch.done += 1;
                if let Some(message) = error {
                    self.fetch.failed += 1;
                    self.record_error(ErrorCategory::Fetch, message, ticker);
                }
            }
            WorkerResponse::Loaded(data) => self.apply_loaded(*data),
            WorkerResponse::Blocked(error) => self.apply_blocked(error),
            WorkerResponse::SourceError(message) => self.apply_failed(message),
        }
    }

    pub fn apply_blocked(&mut self, error: DashboardError) {
        self.loading = false;
        self.fetch.current = None;
        self.push_error(ErrorCategory::Data, error.to_string(), "dashboard load".into());
        self.load = LoadState::Blocked(error);
    }

    pub fn apply_failed(&mut self, message: String) {
        self.loading = false;
        self.fetch.current = None;
        self.push_error(ErrorCategory::Config, message.clone(), "price source".into());
        self.load = LoadState::Failed(message);
    }

    pub fn data(&self) -> Option<&DashboardData> {
        match &self.load {
            LoadState::Ready(data) => Some(&**data),
            _ => None,
        }
    }

    /// Merged rows for the selected sectors.
    pub fn filtered_rows(&self) -> Vec<MergedRow> {
        match self.data() {
            Some(data) => filter_sectors(&data.merged, &self.filter.selected_sectors()),
            None => Vec::new(),
        }
    }

    fn record_error(&mut self, category: ErrorCategory, message: String, context: String) {
        let record = ErrorRecord {
            timestamp: chrono::Local::now().naive_local(),
            category,
            message,
            context,
        };
        self.error_history.push_front(record);
        if self.error_history.len() > ERROR_HISTORY_CAP {
            self.error_history.pop_back();
        }
    }

    /// Push an error to the history, capping at 50.
    pub fn push_error(&mut self, category: ErrorCategory, message: String, context: String) {
        self.record_error(category, message.clone(), context);
        self.status_message = Some((message, StatusLevel::Error));
    }

    /// Set an info status message.
    pub fn set_status(&mut self, msg: impl Into<String>) {
        self.status_message = Some((msg.into(), StatusLevel::Info));
    }

    /// Set a warning status message.
    pub fn set_warning(&mut self, msg: impl Into<String>) {
        self.status_message = Some((msg.into(), StatusLevel::Warning));
    }
}
