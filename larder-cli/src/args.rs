//! Command-line surface for `larder`.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use larder_core::SearchMode;

#[derive(Parser, Debug)]
#[command(name = "larder", version, about = "Recipe search and recommendations from the terminal", long_about = None)]
pub struct Cli {
    /// Path to a TOML config file
    #[arg(long, env = "LARDER_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Search recipes, following pages while more are available
    Search {
        term: String,
        #[arg(long, value_enum, default_value_t = ModeArg::All)]
        mode: ModeArg,
        /// Maximum number of pages to load
        #[arg(long, default_value_t = 1)]
        pages: u32,
        /// Use the small preview page size without pagination
        #[arg(long, default_value_t = false)]
        preview: bool,
    },
    /// Show recommendations and where they came from
    Recommend {
        /// Cache identity to read as, instead of asking the backend
        #[arg(long)]
        user: Option<String>,
    },
    /// Pantry management
    Pantry(PantryArgs),
    /// Recommendations, featured recipes and category shelves
    Home,
}

#[derive(Parser, Debug)]
pub struct PantryArgs {
    #[command(subcommand)]
    pub action: PantryCmd,
}

#[derive(Subcommand, Debug)]
pub enum PantryCmd {
    /// List pantry items
    List,
    /// Add an item or update its amount
    Add {
        name: String,
        amount: f64,
        #[arg(default_value = "")]
        units: String,
    },
    /// Remove an item
    Remove { name: String },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ModeArg {
    All,
    Ingredients,
    Name,
}

impl From<ModeArg> for SearchMode {
    fn from(value: ModeArg) -> Self {
        match value {
            ModeArg::All => SearchMode::All,
            ModeArg::Ingredients => SearchMode::ByIngredients,
            ModeArg::Name => SearchMode::ByName,
        }
    }
}
