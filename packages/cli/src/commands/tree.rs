use super::{FormatArgs, Workbench};
use anyhow::Result;
use clap::Args;
use colored::Colorize;
use docsync_editor::{BasicNodeView, TreeRenderer};
use std::path::PathBuf;
use std::rc::Rc;

#[derive(Debug, Args)]
pub struct TreeArgs {
    /// Input file
    pub input: PathBuf,

    /// Format of the input file (defaults to its extension)
    #[arg(long)]
    pub from: Option<String>,

    /// Render language; "none" renders nothing
    #[arg(long, default_value = "en_us")]
    pub lang: String,

    /// Print the tree as JSON instead of an outline
    #[arg(long)]
    pub json: bool,
}

pub fn tree(args: TreeArgs, cwd: &str) -> Result<()> {
    let mut workbench = Workbench::open(cwd)?;
    let formats = FormatArgs {
        from: args.from.clone(),
        to: None,
        indent: None,
    };
    workbench.load(&args.input, &formats)?;

    let mut renderer = TreeRenderer::new(workbench.host.clone());
    renderer.set_lang(args.lang);
    renderer.set_view(Some(Rc::new(BasicNodeView)));
    renderer.set_document(Some(workbench.session.document().clone()));

    let tree = renderer.render();

    // A failing subtree is replaced by an empty node; the rest still prints
    for message in workbench.host.take_errors() {
        eprintln!("  {} {}", "✗".red(), message.red());
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&tree)?);
    } else {
        print!("{}", tree.outline());
    }
    Ok(())
}
