//! # Sync Controller
//!
//! Keeps the source pane text in step with the document:
//!
//! ```text
//! document ──→ schema.transform ──→ codec.stringify ──→ preview (truncated)
//!    ↑                                              └─→ copy / download (full)
//!    └── reset ←── schema.prepare_import ←── codec.parse ←── source pane
//! ```
//!
//! The preview is recomputed when the bound document notifies, when the
//! format or indentation changes, and when a new document or schema instance
//! is installed. Nothing else triggers it.
//!
//! Copy, download and import-start arrive as command counters (see
//! [`crate::commands`]) and run once per increment.

use crate::commands::{CommandChannels, CommandCounters, CommandKind};
use crate::preferences::{PreferenceStore, FORMAT_KEY, INDENT_KEY};
use crate::schema::{Schema, TransformContext};
use crate::{Document, EditorError, SyncConfig, SyncHost, ViewBinding};
use docsync_codec::{CodecRegistry, Indentation};
use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};
use tracing::{debug, error, info, warn};

/// Output format and indentation currently selected
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputSettings {
    pub format: String,
    pub indentation: Indentation,
}

/// What an import attempt did
#[derive(Debug)]
pub enum ImportOutcome {
    /// Nothing staged, or no document to import into
    Skipped,

    /// The document was reset to the parsed value
    Applied,

    /// Parsing failed; document and source text are untouched
    Failed(EditorError),
}

impl ImportOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, ImportOutcome::Applied)
    }
}

struct Shared {
    codecs: CodecRegistry,
    config: SyncConfig,
    host: Rc<dyn SyncHost>,
    prefs: Rc<dyn PreferenceStore>,
    settings: RefCell<OutputSettings>,
    document: RefCell<Option<Document>>,
    schema: RefCell<Option<Rc<dyn Schema>>>,
    name: RefCell<String>,
    source: RefCell<String>,
    recomputes: Cell<u64>,
}

/// Drives export, import and the edge-triggered commands for one source pane
pub struct SyncController {
    shared: Rc<Shared>,
    binding: ViewBinding,
    channels: CommandChannels,
}

impl SyncController {
    /// Create a controller. Format and indentation come from `prefs`,
    /// falling back to the config defaults.
    pub fn new(
        codecs: CodecRegistry,
        config: SyncConfig,
        host: Rc<dyn SyncHost>,
        prefs: Rc<dyn PreferenceStore>,
    ) -> Result<Self, EditorError> {
        if !codecs.contains(&config.default_format) {
            return Err(EditorError::UnknownFormat(config.default_format.clone()));
        }

        let format = match prefs.get(FORMAT_KEY) {
            Some(stored) if codecs.contains(&stored) => stored,
            Some(stored) => {
                warn!(format = %stored, "Ignoring stored format that is not registered");
                config.default_format.clone()
            }
            None => config.default_format.clone(),
        };

        let indentation = match prefs.get(INDENT_KEY) {
            Some(stored) => stored.parse().unwrap_or_else(|_| {
                warn!(indentation = %stored, "Ignoring unknown stored indentation");
                config.default_indentation
            }),
            None => config.default_indentation,
        };

        debug!(%format, %indentation, "Created sync controller");

        Ok(Self {
            shared: Rc::new(Shared {
                codecs,
                config,
                host,
                prefs,
                settings: RefCell::new(OutputSettings { format, indentation }),
                document: RefCell::new(None),
                schema: RefCell::new(None),
                name: RefCell::new(String::new()),
                source: RefCell::new(String::new()),
                recomputes: Cell::new(0),
            }),
            binding: ViewBinding::new(),
            channels: CommandChannels::new(),
        })
    }

    /// Install the document to sync with, or detach with `None`.
    /// Installing a new instance recomputes the preview; reinstalling the
    /// bound instance does nothing.
    pub fn set_document(&mut self, document: Option<Document>) {
        if let Some(document) = &document {
            if self.binding.is_bound_to(document) {
                return;
            }
        }

        let weak: Weak<Shared> = Rc::downgrade(&self.shared);
        let bound = self.binding.bind_optional(document.as_ref(), move || {
            if let Some(shared) = weak.upgrade() {
                shared.recompute();
            }
        });

        *self.shared.document.borrow_mut() = document;
        if bound {
            self.shared.recompute();
        }
    }

    /// Install the schema capability. A new instance recomputes the preview.
    pub fn set_schema(&self, schema: Option<Rc<dyn Schema>>) {
        let changed = {
            let current = self.shared.schema.borrow();
            match (current.as_ref(), schema.as_ref()) {
                (Some(a), Some(b)) => !same_instance(a, b),
                (None, None) => false,
                _ => true,
            }
        };
        if !changed {
            return;
        }

        let installed = schema.is_some();
        *self.shared.schema.borrow_mut() = schema;
        if installed {
            self.shared.recompute();
        }
    }

    /// Document name used for downloads; does not trigger a recompute
    pub fn set_name(&self, name: impl Into<String>) {
        *self.shared.name.borrow_mut() = name.into();
    }

    pub fn name(&self) -> String {
        self.shared.name.borrow().clone()
    }

    pub fn settings(&self) -> OutputSettings {
        self.shared.settings.borrow().clone()
    }

    pub fn config(&self) -> &SyncConfig {
        &self.shared.config
    }

    /// Select the output format and persist it
    pub fn set_format(&self, format: &str) -> Result<(), EditorError> {
        if !self.shared.codecs.contains(format) {
            return Err(EditorError::UnknownFormat(format.to_string()));
        }

        let changed = {
            let mut settings = self.shared.settings.borrow_mut();
            let changed = settings.format != format;
            settings.format = format.to_string();
            changed
        };

        if changed {
            info!(%format, "Output format changed");
            self.shared.recompute();
        }
        self.shared.prefs.set(FORMAT_KEY, format)
    }

    /// Select the indentation and persist it
    pub fn set_indentation(&self, indentation: Indentation) -> Result<(), EditorError> {
        let changed = {
            let mut settings = self.shared.settings.borrow_mut();
            let changed = settings.indentation != indentation;
            settings.indentation = indentation;
            changed
        };

        if changed {
            info!(%indentation, "Indentation changed");
            self.shared.recompute();
        }
        self.shared.prefs.set(INDENT_KEY, indentation.as_str())
    }

    /// Current source pane text
    pub fn source(&self) -> String {
        self.shared.source.borrow().clone()
    }

    /// Stage user-typed text in the source pane. Nothing is parsed until
    /// [`SyncController::import`].
    pub fn edit_source(&self, text: impl Into<String>) {
        *self.shared.source.borrow_mut() = text.into();
    }

    /// Force a preview recompute
    pub fn refresh(&self) {
        self.shared.recompute();
    }

    /// Number of preview recomputes so far
    pub fn recomputes(&self) -> u64 {
        self.shared.recomputes.get()
    }

    /// Full, untruncated export text
    pub fn export(&self) -> Result<String, EditorError> {
        self.shared.export_text()
    }

    /// Commit the staged source text to the document (blur semantics)
    pub fn import(&self) -> ImportOutcome {
        self.shared.import()
    }

    /// Observe the host's command counters and run every command whose
    /// counter advanced. Returns the commands that ran.
    pub fn dispatch(&mut self, counters: &CommandCounters) -> Vec<CommandKind> {
        let fired = self.channels.observe(counters);
        let mut ran = Vec::with_capacity(fired.len());

        for command in fired {
            let performed = match command {
                CommandKind::Copy => self.shared.copy(),
                CommandKind::Download => self.shared.download(),
                CommandKind::Import => self.shared.start_import(),
            };
            if performed {
                ran.push(command);
            } else {
                debug!(%command, "Command consumed without action");
            }
        }
        ran
    }

    /// Last counter values the controller has consumed
    pub fn last_seen(&self) -> CommandCounters {
        self.channels.last_seen()
    }
}

impl Shared {
    fn is_ready(&self) -> bool {
        self.document.borrow().is_some() && self.schema.borrow().is_some()
    }

    fn export_text(&self) -> Result<String, EditorError> {
        let document = self.document.borrow().clone().ok_or(EditorError::NotReady)?;
        let schema = self.schema.borrow().clone().ok_or(EditorError::NotReady)?;
        let settings = self.settings.borrow().clone();

        let context = TransformContext {
            name: self.name.borrow().clone(),
            format: settings.format.clone(),
        };
        let value = document
            .with_value(|value| schema.transform(value, &context))
            .map_err(|e| EditorError::Transform(e.0))?;

        let mut text = self
            .codecs
            .stringify(&settings.format, &value, settings.indentation)?;
        text.push('\n');
        Ok(text)
    }

    fn recompute(&self) {
        if !self.is_ready() {
            return;
        }
        self.recomputes.set(self.recomputes.get() + 1);

        match self.export_text() {
            Ok(text) => {
                let preview = truncate_preview(text, &self.config);
                *self.source.borrow_mut() = preview;
            }
            Err(err) => {
                error!(error = %err, "Failed to compute output");
                self.host
                    .report_error(&format!("Error getting JSON output: {err}"));
                self.source.borrow_mut().clear();
            }
        }
    }

    fn import(&self) -> ImportOutcome {
        let text = self.source.borrow().clone();
        if text.is_empty() {
            return ImportOutcome::Skipped;
        }

        let Some(document) = self.document.borrow().clone() else {
            debug!("No document to import into");
            return ImportOutcome::Skipped;
        };

        let format = self.settings.borrow().format.clone();
        let parsed = match self.codecs.parse(&format, &text) {
            Ok(value) => value,
            Err(err) => {
                error!(%format, error = %err, "Import failed");
                self.host.report_error(&format!("Error importing: {err}"));
                return ImportOutcome::Failed(err.into());
            }
        };

        let schema = self.schema.borrow().clone();
        let value = match schema {
            Some(schema) => schema.prepare_import(parsed),
            None => parsed,
        };

        info!(%format, bytes = text.len(), "Importing source text");
        document.reset(value, false);
        ImportOutcome::Applied
    }

    fn copy(&self) -> bool {
        if !self.is_ready() {
            return false;
        }
        if let Err(err) = self.try_copy() {
            error!(error = %err, "Copy failed");
            self.report_command_error("copying", &err);
        }
        true
    }

    fn try_copy(&self) -> Result<(), EditorError> {
        let text = self.export_text()?;
        self.host.write_clipboard(&text)?;
        self.host.copy_succeeded();
        Ok(())
    }

    fn download(&self) -> bool {
        if !self.is_ready() {
            return false;
        }
        if let Err(err) = self.try_download() {
            error!(error = %err, "Download failed");
            self.report_command_error("downloading", &err);
        }
        true
    }

    fn try_download(&self) -> Result<(), EditorError> {
        let text = self.export_text()?;
        let filename = format!("{}.{}", self.name.borrow(), self.settings.borrow().format);
        debug!(%filename, bytes = text.len(), "Saving export");
        self.host.save_file(&filename, &text)?;
        Ok(())
    }

    /// Host refusals name the action; anything else failed while exporting
    fn report_command_error(&self, action: &str, err: &EditorError) {
        let message = match err {
            EditorError::Host(err) => format!("Error {action}: {err}"),
            err => format!("Error getting JSON output: {err}"),
        };
        self.host.report_error(&message);
    }

    fn start_import(&self) -> bool {
        self.source.borrow_mut().clear();
        self.host.focus_source();
        true
    }
}

fn same_instance(a: &Rc<dyn Schema>, b: &Rc<dyn Schema>) -> bool {
    std::ptr::eq(Rc::as_ptr(a) as *const (), Rc::as_ptr(b) as *const ())
}

/// Cut `text` to the preview limit (in characters) and append the notice.
/// Text shorter than the limit is returned unchanged.
pub fn truncate_preview(mut text: String, config: &SyncConfig) -> String {
    let limit = config.preview_limit;
    if text.chars().count() < limit {
        return text;
    }

    let end = text
        .char_indices()
        .nth(limit)
        .map_or(text.len(), |(index, _)| index);
    text.truncate(end);
    text.push_str(&config.truncation_notice());
    text
}
