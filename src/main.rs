mod budget;
mod classifier;
mod cli;
mod db;
mod error;
mod extractor;
mod fmt;
mod ingestor;
mod models;
mod settings;
mod store;

use clap::Parser;

use cli::{CategoryCommands, Cli, Commands, CycleCommands, InvoicesCommands, RulesCommands};

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Init { data_dir } => cli::init::run(data_dir),
        Commands::Ingest {
            message,
            received_at,
        } => cli::ingest::run(message, received_at.as_deref()),
        Commands::Invoices { command } => match command {
            InvoicesCommands::List { skip, limit } => cli::invoices::list(skip, limit),
            InvoicesCommands::Show { id } => cli::invoices::show(id),
            InvoicesCommands::Recategorize {
                id,
                classification,
                main_category,
                sub_category,
                create_rule,
            } => cli::invoices::recategorize(
                id,
                &classification,
                &main_category,
                &sub_category,
                create_rule,
            ),
            InvoicesCommands::Delete { id } => cli::invoices::delete(id),
        },
        Commands::Rules { command } => match command {
            RulesCommands::Add {
                keywords,
                classification,
                main_category,
                sub_category,
                limit,
            } => cli::rules::add(&keywords, &classification, &main_category, &sub_category, limit),
            RulesCommands::List => cli::rules::list(),
            RulesCommands::Show { id } => cli::rules::show(id),
            RulesCommands::Update {
                id,
                keywords,
                classification,
                main_category,
                sub_category,
                limit,
            } => cli::rules::update(
                id,
                keywords.as_deref(),
                classification.as_deref(),
                main_category.as_deref(),
                sub_category.as_deref(),
                limit,
            ),
            RulesCommands::Delete { id } => cli::rules::delete(id),
        },
        Commands::Categories => cli::rules::categories(),
        Commands::Category { command } => match command {
            CategoryCommands::Limit { category } => cli::category::limit(&category),
            CategoryCommands::Remaining { category } => cli::category::remaining(&category),
            CategoryCommands::Analysis { category } => cli::category::analysis(&category),
        },
        Commands::Cycle { command } => match command {
            CycleCommands::Start { date } => cli::cycle::start(date),
            CycleCommands::Current => cli::cycle::current(),
            CycleCommands::History { limit } => cli::cycle::history(limit),
            CycleCommands::Analysis { id } => cli::cycle::analysis(id),
        },
        Commands::Status => cli::status::run(),
        Commands::Demo => cli::demo::run(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
