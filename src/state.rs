use std::collections::BTreeSet;
use std::path::Path;

use datanexus::config::ShellConfig;
use datanexus::data::chart::ChartKind;
use datanexus::data::filter::numeric_range;
use datanexus::data::transform::{ImputeMethod, Transformation};
use datanexus::session::Session;

// ---------------------------------------------------------------------------
// Navigation
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Module {
    Ingestion,
    Profiling,
    Transformation,
    Visualization,
}

impl Module {
    pub const ALL: [Module; 4] = [
        Module::Ingestion,
        Module::Profiling,
        Module::Transformation,
        Module::Visualization,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Module::Ingestion => "📁 Ingestion",
            Module::Profiling => "🔍 Profiling",
            Module::Transformation => "🧹 Transformation",
            Module::Visualization => "📈 Visualization",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusKind {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Status {
    pub kind: StatusKind,
    pub text: String,
}

// ---------------------------------------------------------------------------
// Form state
// ---------------------------------------------------------------------------

/// Widget selections of the transformation page.
#[derive(Debug, Clone)]
pub struct TransformForm {
    pub drop: BTreeSet<String>,
    pub impute_column: Option<String>,
    pub impute_method: ImputeMethod,
    pub filter_column: Option<String>,
    pub filter_low: f64,
    pub filter_high: f64,
}

impl Default for TransformForm {
    fn default() -> Self {
        Self {
            drop: BTreeSet::new(),
            impute_column: None,
            impute_method: ImputeMethod::DropRows,
            filter_column: None,
            filter_low: 0.0,
            filter_high: 0.0,
        }
    }
}

/// Widget selections of the visualization page.
#[derive(Debug, Clone)]
pub struct ChartForm {
    pub kind: ChartKind,
    pub x: Option<String>,
    pub y: Option<String>,
    pub color: Option<String>,
}

impl Default for ChartForm {
    fn default() -> Self {
        Self {
            kind: ChartKind::Bar,
            x: None,
            y: None,
            color: None,
        }
    }
}

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct AppState {
    pub config: ShellConfig,

    /// The user's data. Only mutated through `load_*` and `apply`.
    pub session: Session,

    pub module: Module,

    /// Status / error message shown in the UI.
    pub status: Option<Status>,

    pub transform: TransformForm,
    pub chart: ChartForm,
}

impl AppState {
    pub fn new(config: ShellConfig) -> Self {
        Self {
            config,
            session: Session::new(),
            module: Module::Ingestion,
            status: None,
            transform: TransformForm::default(),
            chart: ChartForm::default(),
        }
    }

    pub fn succeed(&mut self, text: impl Into<String>) {
        self.status = Some(Status {
            kind: StatusKind::Success,
            text: text.into(),
        });
    }

    pub fn fail(&mut self, text: impl Into<String>) {
        self.status = Some(Status {
            kind: StatusKind::Error,
            text: text.into(),
        });
    }

    /// Load an upload given as bytes (drag-and-drop, web).
    pub fn load_bytes(&mut self, file_name: &str, bytes: &[u8]) {
        match self.session.load(file_name, bytes) {
            Ok(()) => self.on_loaded(),
            Err(e) => {
                log::error!("Failed to load {file_name}: {e}");
                self.fail(format!("❌ Error loading file: {e}"));
            }
        }
    }

    /// Load an upload from disk (file dialog). The bytes go through the same
    /// session load as a dropped file.
    pub fn load_path(&mut self, path: &Path) {
        match datanexus::data::loader::read_upload(path) {
            Ok((file_name, bytes)) => self.load_bytes(&file_name, &bytes),
            Err(e) => {
                log::error!("Failed to read upload: {e:#}");
                self.fail(format!("❌ Error loading file: {e:#}"));
            }
        }
    }

    fn on_loaded(&mut self) {
        self.transform = TransformForm::default();
        self.chart = ChartForm::default();
        self.sync_selections();
        self.succeed("File successfully loaded!");
    }

    /// Run a transformation and report the outcome.
    pub fn apply(&mut self, request: &Transformation, success: &str) {
        match self.session.apply(request) {
            Ok(()) => {
                self.sync_selections();
                self.succeed(success);
            }
            Err(e) => {
                log::warn!("Rejected {request}: {e}");
                self.fail(format!("Operation failed: {e}"));
            }
        }
    }

    /// Point every column selection at a column that still exists.
    pub fn sync_selections(&mut self) {
        let Some(table) = self.session.table() else {
            return;
        };
        let names = table.column_names();
        let first = names.first().cloned();
        let keep = |sel: &Option<String>| sel.clone().filter(|s| names.contains(s));

        self.transform.drop.retain(|n| names.contains(n));
        self.transform.impute_column = keep(&self.transform.impute_column).or_else(|| first.clone());

        let filter_column = keep(&self.transform.filter_column).or_else(|| first.clone());
        if filter_column != self.transform.filter_column {
            self.transform.filter_column = filter_column;
            self.reset_filter_bounds();
        }

        self.chart.x = keep(&self.chart.x).or_else(|| first.clone());
        self.chart.y = keep(&self.chart.y).or_else(|| first.clone());
        self.chart.color = keep(&self.chart.color);
    }

    /// Seed the slider with the filter column's full range.
    pub fn reset_filter_bounds(&mut self) {
        let range = self.session.table().zip(self.transform.filter_column.as_deref());
        let (lo, hi) = range
            .and_then(|(table, col)| numeric_range(table, col))
            .unwrap_or((0.0, 0.0));
        self.transform.filter_low = lo;
        self.transform.filter_high = hi;
    }

    /// Save the processed table through a save dialog.
    pub fn export_dialog(&mut self) {
        let exported = match self.session.export() {
            Ok(f) => f,
            Err(e) => {
                self.fail(format!("Export failed: {e}"));
                return;
            }
        };
        let Some(path) = rfd::FileDialog::new()
            .set_title("Download processed dataset")
            .set_file_name(&exported.file_name)
            .add_filter("CSV", &["csv"])
            .save_file()
        else {
            return;
        };
        match std::fs::write(&path, &exported.bytes) {
            Ok(()) => {
                log::info!("Exported {} bytes to {}", exported.bytes.len(), path.display());
                self.succeed(format!("Saved {}", path.display()));
            }
            Err(e) => {
                log::error!("Failed to write {}: {e}", path.display());
                self.fail(format!("Export failed: {e}"));
            }
        }
    }
}
