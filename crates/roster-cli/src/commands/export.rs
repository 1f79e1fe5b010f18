use super::context::Context;
use anyhow::{Context as _, Result};
use chrono::Local;
use clap::Args;
use roster_application::export::export_file_name;
use roster_infrastructure::RosterPaths;
use std::path::PathBuf;

#[derive(Args, Debug)]
pub struct ExportArgs {
    /// Export only these ids (default: every user)
    #[arg(long, num_args = 1..)]
    pub ids: Vec<String>,
    /// Write to this file instead of stdout
    #[arg(long, conflicts_with = "save")]
    pub output: Option<PathBuf>,
    /// Write to the exports directory under a dated file name
    #[arg(long)]
    pub save: bool,
}

impl ExportArgs {
    fn target(&self) -> Result<Option<PathBuf>> {
        if let Some(path) = &self.output {
            return Ok(Some(path.clone()));
        }
        if self.save {
            let dir = RosterPaths::export_dir()?;
            return Ok(Some(dir.join(export_file_name(Local::now().date_naive()))));
        }
        Ok(None)
    }
}

pub async fn run(context: &Context, args: ExportArgs) -> Result<()> {
    let store = context.store_selecting(&args.ids).await?;
    let text = store.export_selection_or_all().await?;

    match args.target()? {
        Some(path) => {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create {}", parent.display()))?;
            }
            std::fs::write(&path, text)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            println!("Exported to {}", path.display());
        }
        None => print!("{}", text),
    }

    Ok(())
}
