//! Process command - run the pipeline once for a single video.

use crate::cli::{preflight, Output};
use crate::config::Settings;
use crate::orchestrator::Pipeline;
use anyhow::{Context, Result};
use indicatif::MultiProgress;

/// Run the process command.
pub async fn run_process(url: &str, output: Option<&str>, settings: Settings) -> Result<()> {
    preflight::check(&settings)?;

    let progress = MultiProgress::new();
    let pipeline = Pipeline::with_progress(&settings, progress.clone())?;

    let spinner = progress.add(Output::spinner("Processing video..."));
    let result = pipeline.process(url).await;
    spinner.finish_and_clear();
    let result = result?;

    Output::pipeline_summary(&result);

    let json = serde_json::to_string_pretty(&result.response_body())?;
    match output {
        Some(path) => {
            let path = Settings::expand_path(path);
            std::fs::write(&path, json)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            Output::success(&format!("Wrote {}", path.display()));
        }
        None => println!("{}", json),
    }

    Ok(())
}
