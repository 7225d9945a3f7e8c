pub mod convert;
pub mod init;
pub mod prefs;
pub mod preview;
pub mod tree;

pub use convert::{convert, ConvertArgs};
pub use init::{init, InitArgs};
pub use prefs::{prefs, PrefsArgs};
pub use preview::{preview, PreviewArgs};
pub use tree::{tree, TreeArgs};

use crate::config::Config;
use crate::host::TerminalHost;
use anyhow::{bail, Context, Result};
use clap::Args;
use docsync_editor::{
    CodecRegistry, EditSession, FileStore, ImportOutcome, Indentation, MemoryStore,
    SyncController, Value,
};
use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use thiserror::Error;
use tracing::info;

#[derive(Error, Debug)]
pub enum CliError {
    #[error("Cannot detect the format of {0}; pass --from")]
    UnknownExtension(PathBuf),

    #[error("{0} is empty")]
    EmptyInput(PathBuf),
}

/// Format and indentation overrides shared by the document commands
#[derive(Debug, Clone, Args)]
pub struct FormatArgs {
    /// Format of the input file (defaults to its extension)
    #[arg(long)]
    pub from: Option<String>,

    /// Output format (defaults to the stored preference)
    #[arg(long)]
    pub to: Option<String>,

    /// Output indentation: 2_spaces, 4_spaces, tabs or minified
    #[arg(short, long)]
    pub indent: Option<Indentation>,
}

/// Format id for a file extension
pub fn detect_format(path: &Path) -> Result<String, CliError> {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some("json") => Ok("json".to_string()),
        Some("yaml") | Some("yml") => Ok("yaml".to_string()),
        _ => Err(CliError::UnknownExtension(path.to_path_buf())),
    }
}

/// One controller plus the document it syncs, reused across input files.
///
/// Preferences are read from the project store but changes stay in memory;
/// only `docsync prefs` writes them back.
pub struct Workbench {
    pub config: Config,
    pub host: Rc<TerminalHost>,
    pub controller: SyncController,
    pub session: EditSession,
    preferred_format: String,
}

impl Workbench {
    pub fn open(cwd: &str) -> Result<Self> {
        let config = Config::load(cwd)?;
        let stored = FileStore::open(config.prefs_path(cwd))?;
        let prefs = Rc::new(MemoryStore::with_values(stored.entries()));
        let host = Rc::new(TerminalHost::new(config.out_dir(cwd)));

        let controller = SyncController::new(
            CodecRegistry::with_defaults(),
            config.sync.clone(),
            host.clone(),
            prefs,
        )?;
        controller.set_schema(Some(config.schema()));
        let preferred_format = controller.settings().format;

        Ok(Self {
            config,
            host,
            controller,
            session: EditSession::new("cli", "", Value::Null),
            preferred_format,
        })
    }

    /// Import `input` into a fresh document, then select the output format
    pub fn load(&mut self, input: &Path, formats: &FormatArgs) -> Result<()> {
        let from = match &formats.from {
            Some(format) => format.clone(),
            None => detect_format(input)?,
        };
        let text = fs::read_to_string(input)
            .with_context(|| format!("Failed to read {}", input.display()))?;
        let name = input
            .file_stem()
            .and_then(|stem| stem.to_str())
            .unwrap_or("document");

        let document = self.session.replace(name, Value::Null).clone();
        self.controller.set_document(Some(document));
        self.controller.set_name(name);
        self.controller.set_format(&from)?;

        self.controller.edit_source(text);
        match self.controller.import() {
            ImportOutcome::Applied => {}
            ImportOutcome::Skipped => return Err(CliError::EmptyInput(input.to_path_buf()).into()),
            ImportOutcome::Failed(err) => {
                // The returned error carries the parse failure; drop the host's copy
                self.host.take_errors();
                return Err(err).with_context(|| format!("Failed to import {}", input.display()));
            }
        }

        if let Some(indent) = formats.indent {
            self.controller.set_indentation(indent)?;
        }
        let to = formats.to.clone().unwrap_or_else(|| self.preferred_format.clone());
        self.controller.set_format(&to)?;
        self.check_host()?;

        info!(input = %input.display(), %from, %to, "Loaded document");
        Ok(())
    }

    /// Turn errors the controller reported to the host into a command error
    pub fn check_host(&self) -> Result<()> {
        let errors = self.host.take_errors();
        if !errors.is_empty() {
            bail!("{}", errors.join("; "));
        }
        Ok(())
    }
}
