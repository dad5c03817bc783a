use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod chat;
mod cli;
mod config;
mod describe;
mod indexer;
mod present;
mod restaurants;
mod search;
mod semantic;
#[cfg(test)]
mod tests;
mod translate;
mod web;

use config::Config;
use restaurants::SearchFilters;
use search::SearchService;

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();
}

fn main() -> anyhow::Result<()> {
    let args = cli::Args::parse();

    init_logging();

    let config = Config::load_with(&args.data_dir);

    match args.command {
        cli::Command::Index { file } => {
            indexer::run(&config, &args.data_dir, &file)?;
            Ok(())
        }

        cli::Command::Daemon {} => {
            let search = SearchService::open(&config, &args.data_dir)?;
            let chat = chat::ChatService::new(search, config.search.default_limit);
            web::start_daemon(chat, config.server.bind.clone());
            Ok(())
        }

        cli::Command::Search {
            query,
            location,
            category,
            min_stars,
            kids,
            dogs,
            limit,
            scores,
        } => {
            let filters = SearchFilters {
                location,
                categories: category,
                min_stars,
                good_for_kids: kids.then_some(true),
                dogs_allowed: dogs.then_some(true),
            };
            let filters = (!filters.is_empty()).then_some(filters);

            let service = SearchService::open(&config, &args.data_dir)?;
            let limit = limit.unwrap_or(config.search.default_limit);
            let results = service.search(&query, filters.as_ref(), limit);

            if scores {
                println!("{}", serde_json::to_string_pretty(&results).unwrap());
            } else {
                let items = present::present(&results);
                println!("{}", serde_json::to_string_pretty(&items).unwrap());
            }
            Ok(())
        }
    }
}
