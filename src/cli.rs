use std::path::PathBuf;
use clap::{Args, Parser, Subcommand};
use serde_json::json;
use crate::error::ValidationError;
use crate::rules::{FaultyTech, Field};
use crate::store::DEFAULT_STORE_PATH;

#[derive(Parser)]
#[command(name = "faulty-tech")]
#[command(about = "Randomized party/box swaps for the Faulty Technology nuzlocke rule")]
pub struct Cli {
    #[arg(
        long,
        env = "FAULTY_TECH_STORE",
        help = "File holding saved configurations",
        default_value = DEFAULT_STORE_PATH
    )]
    pub store: PathBuf,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Pick the swaps to make
    Pick {
        #[arg(long, help = "Start from a saved configuration")]
        saved: Option<String>,
        #[command(flatten)]
        settings: Settings,
        #[arg(long, help = "Draw the party and box grids", default_value_t = false)]
        grid: bool,
    },
    /// Save a configuration under a name
    Save {
        name: String,
        #[command(flatten)]
        settings: Settings,
    },
    /// List saved configurations
    List,
    /// Delete a saved configuration
    Remove { name: String },
    /// Serve the JSON API
    Web {
        #[arg(long, help = "Port to listen on", default_value_t = 8080)]
        port: u16,
        #[arg(long, help = "Address to bind", default_value_t = String::from("127.0.0.1"))]
        bind: String,
    },
}

/// Settings that override the starting configuration
#[derive(Args, Debug, Default)]
pub struct Settings {
    #[arg(long, help = "Current party size (1-6)")]
    pub party_size: Option<i64>,
    #[arg(long, help = "Fewest swaps per run")]
    pub min: Option<i64>,
    #[arg(long, help = "Most swaps per run")]
    pub max: Option<i64>,
    #[arg(long, help = "Members currently stored in boxes")]
    pub boxed: Option<i64>,
    #[arg(
        long,
        help = "Randomize box 1 members to swap in",
        num_args = 0..=1,
        require_equals = true,
        default_missing_value = "true"
    )]
    pub swapins: Option<bool>,
    #[arg(
        long,
        help = "Randomize shifts from later boxes",
        num_args = 0..=1,
        require_equals = true,
        default_missing_value = "true"
    )]
    pub shifts: Option<bool>,
    #[arg(
        long,
        help = "Allow fewer swap-ins than swap-outs",
        num_args = 0..=1,
        require_equals = true,
        default_missing_value = "true"
    )]
    pub diff_swaps: Option<bool>,
}

impl Settings {
    /// Applies every given setting through validation, stopping at the first rejection
    pub fn apply(&self, tech: &mut FaultyTech) -> Result<(), ValidationError> {
        if let Some(party_size) = self.party_size {
            tech.set_field(Field::PartySize, &json!(party_size))?;
        }

        // order the bounds so any valid target pair is reachable
        let current_max = tech.to_record().max as i64;
        let bounds = match self.min {
            Some(min) if min <= current_max => [(Field::Min, self.min), (Field::Max, self.max)],
            _ => [(Field::Max, self.max), (Field::Min, self.min)],
        };
        for (field, value) in bounds {
            if let Some(value) = value {
                tech.set_field(field, &json!(value))?;
            }
        }

        if let Some(boxed) = self.boxed {
            tech.set_field(Field::Boxed, &json!(boxed))?;
        }
        // swap-ins first, fewer swap-ins depend on them
        for (field, value) in [
            (Field::SwapIns, self.swapins),
            (Field::Shifts, self.shifts),
            (Field::DiffSwaps, self.diff_swaps),
        ] {
            if let Some(value) = value {
                tech.set_field(field, &json!(value))?;
            }
        }
        Ok(())
    }
}
