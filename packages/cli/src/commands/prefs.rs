use crate::config::Config;
use crate::host::TerminalHost;
use anyhow::Result;
use clap::Args;
use colored::Colorize;
use docsync_editor::{CodecRegistry, FileStore, Indentation, SyncController};
use std::rc::Rc;

#[derive(Debug, Args)]
pub struct PrefsArgs {
    /// Persist this output format
    #[arg(short = 'F', long)]
    pub format: Option<String>,

    /// Persist this indentation
    #[arg(short, long)]
    pub indent: Option<Indentation>,
}

/// Show or update the persisted output preferences
pub fn prefs(args: PrefsArgs, cwd: &str) -> Result<()> {
    let config = Config::load(cwd)?;
    let store = Rc::new(FileStore::open(config.prefs_path(cwd))?);
    let host = Rc::new(TerminalHost::new(config.out_dir(cwd)));

    let controller = SyncController::new(
        CodecRegistry::with_defaults(),
        config.sync.clone(),
        host,
        store.clone(),
    )?;

    if let Some(format) = &args.format {
        controller.set_format(format)?;
    }
    if let Some(indent) = args.indent {
        controller.set_indentation(indent)?;
    }

    let settings = controller.settings();
    println!("{}", "⚙️  Output preferences".bright_blue().bold());
    println!("  format:      {}", settings.format.bright_white());
    println!("  indentation: {}", settings.indentation.to_string().bright_white());
    println!("  stored in:   {}", store.path().display().to_string().dimmed());
    Ok(())
}
