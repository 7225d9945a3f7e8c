use super::{FormatArgs, Workbench};
use anyhow::Result;
use clap::Args;
use colored::Colorize;
use std::path::PathBuf;

#[derive(Debug, Args)]
pub struct PreviewArgs {
    /// Input file
    pub input: PathBuf,

    #[command(flatten)]
    pub formats: FormatArgs,
}

/// Print the source pane text: the export, truncated at the preview limit
pub fn preview(args: PreviewArgs, cwd: &str) -> Result<()> {
    let mut workbench = Workbench::open(cwd)?;
    workbench.load(&args.input, &args.formats)?;

    let settings = workbench.controller.settings();
    eprintln!(
        "{} {} ({}, {})",
        "👀".bright_blue(),
        args.input.display().to_string().bright_white(),
        settings.format,
        settings.indentation
    );
    print!("{}", workbench.controller.source());

    let limit = workbench.config.sync.preview_limit;
    if workbench.controller.source().chars().count() > limit {
        eprintln!(
            "{} Preview cut at {} chars; run `docsync convert` for the full output",
            "⚠️".yellow(),
            limit
        );
    }
    Ok(())
}
