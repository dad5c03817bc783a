use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Args {
    /// Data directory holding config.yaml, catalog.json and vectors.bin
    #[clap(long, default_value = ".", global = true)]
    pub data_dir: PathBuf,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Build the catalog and the vector index from a restaurant dataset.
    ///
    /// Regenerates descriptions and search texts, then embeds every
    /// restaurant. Embeddings of unchanged restaurants are reused from
    /// the existing index.
    Index {
        /// Path to the dataset (a JSON array of restaurant records)
        #[clap(short, long)]
        file: PathBuf,
    },

    /// Search the indexed restaurants from the command line
    Search {
        /// Free-text query, Korean or English
        query: String,

        /// Only restaurants in this city (substring match)
        #[clap(short, long)]
        location: Option<String>,

        /// Only restaurants in any of these categories
        #[clap(short, long)]
        category: Option<Vec<String>>,

        /// Minimum star rating
        #[clap(long)]
        min_stars: Option<f32>,

        /// Only kid-friendly restaurants
        #[clap(long)]
        kids: bool,

        /// Only restaurants that allow dogs
        #[clap(long)]
        dogs: bool,

        /// Maximum number of results
        #[clap(short = 'n', long)]
        limit: Option<usize>,

        /// Print raw scored results instead of chat display items
        #[clap(long, default_value = "false")]
        scores: bool,
    },

    /// Run the HTTP chat server
    Daemon {},
}
