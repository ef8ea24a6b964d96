mod cli;
mod display;
mod error;
mod rules;
mod store;
mod web;

use anyhow::{anyhow, bail, Context, Result};
use clap::Parser;
use tracing::info;
use cli::{Cli, Command};
use display::{describe_config, describe_outcome, render_box, render_grid};
use rules::{FaultyTech, SwapOutcome};
use store::SavedRuns;

/// Starts from the named saved configuration, or from the only saved one
/// when none is named, otherwise from the defaults
fn starting_tech(saved_runs: &SavedRuns, name: Option<&str>) -> Result<FaultyTech> {
    match name {
        Some(name) => {
            let record = saved_runs
                .get(name)
                .ok_or_else(|| anyhow!("no saved configuration named '{}'", name))?;
            Ok(FaultyTech::from_record(record)?)
        }
        None => match saved_runs.only() {
            Some((name, record)) => {
                info!(name, "starting from the only saved configuration");
                Ok(FaultyTech::from_record(record)?)
            }
            None => Ok(FaultyTech::new()),
        },
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let mut saved_runs = SavedRuns::load(&cli.store)
        .with_context(|| format!("loading saved configurations from {}", cli.store.display()))?;

    match cli.command {
        Command::Pick { saved, settings, grid } => {
            let mut tech = starting_tech(&saved_runs, saved.as_deref())?;
            settings.apply(&mut tech)?;
            let record = tech.to_record();
            let outcome = tech.pick_swaps()?;

            println!("{}", describe_config(&record));
            println!();
            print!("{}", describe_outcome(&outcome));

            if let (true, SwapOutcome::Plan(plan)) = (grid, &outcome) {
                println!();
                print!("{}", render_grid(&record, plan, 1));
                for box_number in 2..=tech.box_count() {
                    print!("{}", render_box(&record, plan, box_number));
                }
            }
        }
        Command::Save { name, settings } => {
            let existing = saved_runs.get(&name).map(|_| name.as_str());
            let mut tech = starting_tech(&saved_runs, existing)?;
            settings.apply(&mut tech)?;
            if saved_runs.insert(&name, tech.to_record()) {
                saved_runs.save()?;
                println!("Saved '{}' to {}", name, saved_runs.path().display());
            } else {
                println!("'{}' is already saved with these settings", name);
            }
        }
        Command::List => {
            if saved_runs.is_empty() {
                println!("No saved configurations in {}", saved_runs.path().display());
            }
            for (name, record) in saved_runs.iter() {
                println!("== {} ==", name);
                println!("{}", describe_config(record));
            }
        }
        Command::Remove { name } => {
            if saved_runs.remove(&name).is_none() {
                bail!("no saved configuration named '{}'", name);
            }
            saved_runs.save()?;
            println!("Removed '{}'", name);
        }
        Command::Web { port, bind } => {
            info!(%bind, port, store = %saved_runs.path().display(), "starting web server");
            println!("Access the API at http://{}:{}/api/config", bind, port);
            web::start_server(&bind, port, saved_runs)
                .await
                .context("running web server")?;
        }
    }

    Ok(())
}
