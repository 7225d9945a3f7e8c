use super::{detect_format, FormatArgs, Workbench};
use anyhow::{anyhow, bail, Result};
use clap::Args;
use colored::Colorize;
use docsync_editor::CommandKind;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

#[derive(Debug, Args)]
pub struct ConvertArgs {
    /// Input file, or a directory to convert every matching file in
    pub input: PathBuf,

    #[command(flatten)]
    pub formats: FormatArgs,

    /// Write the output to this file instead of stdout
    #[arg(short, long, conflicts_with = "out_dir")]
    pub out: Option<PathBuf>,

    /// Save `<name>.<format>` files into this directory (overrides config)
    #[arg(long)]
    pub out_dir: Option<PathBuf>,
}

pub fn convert(args: ConvertArgs, cwd: &str) -> Result<()> {
    let mut workbench = Workbench::open(cwd)?;
    if let Some(out_dir) = &args.out_dir {
        workbench.host.set_out_dir(out_dir.clone());
    }

    if args.input.is_dir() {
        return convert_dir(&mut workbench, &args);
    }

    workbench.load(&args.input, &args.formats)?;

    if args.out_dir.is_some() {
        let saved = download(&mut workbench)?;
        println!("  {} {} → {}", "✓".green(), args.input.display(), saved.display());
        return Ok(());
    }

    let output = copy(&mut workbench)?;
    match &args.out {
        Some(out) => {
            fs::write(out, &output)?;
            println!("  {} {} → {}", "✓".green(), args.input.display(), out.display());
        }
        None => print!("{output}"),
    }
    Ok(())
}

fn convert_dir(workbench: &mut Workbench, args: &ConvertArgs) -> Result<()> {
    if args.out.is_some() {
        bail!("--out needs a single input file; use --out-dir for directories");
    }

    println!("{}", "🔄 Converting documents...".bright_blue().bold());

    let files = find_documents(&args.input, args.formats.from.as_deref());
    if files.is_empty() {
        println!("{}", "⚠️  No documents found".yellow());
        return Ok(());
    }
    println!("Found {} files", files.len());

    let mut success_count = 0;
    let mut error_count = 0;

    for file in &files {
        let relative_path = file.strip_prefix(&args.input).unwrap_or(file);
        let result = workbench
            .load(file, &args.formats)
            .and_then(|()| download(workbench));

        match result {
            Ok(saved) => {
                success_count += 1;
                println!("  {} {} → {}", "✓".green(), relative_path.display(), saved.display());
            }
            Err(e) => {
                error_count += 1;
                eprintln!(
                    "  {} {} - {}",
                    "✗".red(),
                    relative_path.display(),
                    format!("{e:#}").red()
                );
            }
        }
    }

    println!();
    if error_count == 0 {
        println!("{} Converted {} files successfully", "✅".green(), success_count);
    } else {
        println!(
            "{} Converted {} files, {} errors",
            "⚠️".yellow(),
            success_count,
            error_count
        );
    }
    Ok(())
}

/// Run the copy command and take the captured export
fn copy(workbench: &mut Workbench) -> Result<String> {
    run(workbench, CommandKind::Copy)?;
    workbench
        .host
        .take_clipboard()
        .ok_or_else(|| anyhow!("Nothing was exported"))
}

/// Run the download command, returning the saved path
fn download(workbench: &mut Workbench) -> Result<PathBuf> {
    run(workbench, CommandKind::Download)?;
    workbench
        .host
        .saved()
        .pop()
        .ok_or_else(|| anyhow!("Nothing was saved"))
}

/// Bump one command counter past what the controller has seen and dispatch
fn run(workbench: &mut Workbench, command: CommandKind) -> Result<()> {
    let mut counters = workbench.controller.last_seen();
    counters.bump(command);

    let ran = workbench.controller.dispatch(&counters);
    workbench.check_host()?;
    if !ran.contains(&command) {
        bail!("{command} did not run");
    }
    Ok(())
}

fn find_documents(dir: &Path, from: Option<&str>) -> Vec<PathBuf> {
    WalkDir::new(dir)
        .follow_links(true)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.into_path())
        .filter(|path| match (detect_format(path), from) {
            (Ok(format), Some(from)) => format == from,
            (Ok(_), None) => true,
            (Err(_), _) => false,
        })
        .collect()
}
