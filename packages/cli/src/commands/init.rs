use crate::config::{Config, DEFAULT_CONFIG_NAME};
use anyhow::{bail, Result};
use clap::Args;
use colored::Colorize;
use docsync_codec::{CodecRegistry, Indentation};
use std::fs;
use std::path::PathBuf;

#[derive(Debug, Args)]
pub struct InitArgs {
    /// Default output format (json, yaml)
    #[arg(short = 'F', long, default_value = "json")]
    pub format: String,

    /// Default indentation
    #[arg(short, long, default_value = "2_spaces")]
    pub indent: Indentation,

    /// Strip keys with this prefix on export
    #[arg(long)]
    pub annotation_prefix: Option<String>,

    /// Force overwrite existing config
    #[arg(short, long)]
    pub force: bool,
}

pub fn init(args: InitArgs, cwd: &str) -> Result<()> {
    let config_path = PathBuf::from(cwd).join(DEFAULT_CONFIG_NAME);

    // Check if config already exists
    if config_path.exists() && !args.force {
        println!(
            "{} {} already exists",
            "⚠️".yellow(),
            DEFAULT_CONFIG_NAME.bright_white()
        );
        println!("Use --force to overwrite");
        return Ok(());
    }

    if !CodecRegistry::with_defaults().contains(&args.format) {
        bail!("Unknown format: {}", args.format);
    }

    println!("{}", "📝 Initializing docsync project...".bright_blue().bold());

    let mut config = Config::default();
    config.sync.default_format = args.format;
    config.sync.default_indentation = args.indent;
    config.annotation_prefix = args.annotation_prefix;

    let config_json = serde_json::to_string_pretty(&config)?;
    fs::write(&config_path, config_json)?;

    println!("  {} Created {}", "✓".green(), DEFAULT_CONFIG_NAME);
    println!();
    println!("{}", "✅ Project initialized!".green().bold());
    println!();
    println!("Next steps:");
    println!("  1. Run: docsync preview <file>");
    println!("  2. Run: docsync convert <file> --to {}", config.sync.default_format);
    println!("  3. Check output in {}/", config.out_dir);

    Ok(())
}
