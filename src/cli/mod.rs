pub mod category;
pub mod cycle;
pub mod demo;
pub mod ingest;
pub mod init;
pub mod invoices;
pub mod rules;
pub mod status;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "masroof", about = "Track Saudi bank SMS spending against budget cycles.")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Set up Masroof: choose a data directory and initialize the database.
    Init {
        /// Path for Masroof data (default: ~/Documents/masroof)
        #[arg(long = "data-dir")]
        data_dir: Option<String>,
    },
    /// Record one SMS message: extract, classify, persist.
    Ingest {
        /// Message text; read from stdin when omitted
        message: Option<String>,
        /// Received timestamp for backfills: YYYY-MM-DD HH:MM:SS
        #[arg(long = "received-at")]
        received_at: Option<String>,
    },
    /// Browse and correct recorded invoices.
    Invoices {
        #[command(subcommand)]
        command: InvoicesCommands,
    },
    /// Manage classification rules.
    Rules {
        #[command(subcommand)]
        command: RulesCommands,
    },
    /// List the distinct main categories referenced by rules.
    Categories,
    /// Per-category limits and spending.
    Category {
        #[command(subcommand)]
        command: CategoryCommands,
    },
    /// Budget cycle management and reports.
    Cycle {
        #[command(subcommand)]
        command: CycleCommands,
    },
    /// Show current database and summary statistics.
    Status,
    /// Load sample rules and a month of SMS traffic to explore Masroof.
    Demo,
}

#[derive(Subcommand)]
pub enum InvoicesCommands {
    /// List recorded invoices, newest first.
    List {
        /// Rows to skip
        #[arg(long, default_value = "0")]
        skip: i64,
        /// Maximum rows to show
        #[arg(long, default_value = "100")]
        limit: i64,
    },
    /// Show one invoice in full, including the raw SMS.
    Show {
        /// Invoice ID (shown in `masroof invoices list`)
        id: i64,
    },
    /// Correct the classification fields of an invoice.
    Recategorize {
        id: i64,
        #[arg(long)]
        classification: String,
        #[arg(long = "main-category")]
        main_category: String,
        #[arg(long = "sub-category")]
        sub_category: String,
        /// Also add a rule matching this invoice's merchant
        #[arg(long = "create-rule")]
        create_rule: bool,
    },
    /// Delete an invoice by ID.
    Delete { id: i64 },
}

#[derive(Subcommand)]
pub enum RulesCommands {
    /// Add a classification rule. Rules match in creation order.
    Add {
        /// Comma-separated keywords matched against merchant names
        keywords: String,
        /// High-level group, e.g. Necessities
        #[arg(long)]
        classification: String,
        /// Main category, e.g. Health
        #[arg(long = "main-category")]
        main_category: String,
        /// Sub category, e.g. Pharmacy
        #[arg(long = "sub-category")]
        sub_category: String,
        /// Spending limit for the main category
        #[arg(long)]
        limit: Option<f64>,
    },
    /// List all rules in match order.
    List,
    /// Show one rule.
    Show {
        /// Rule ID (shown in `masroof rules list`)
        id: i64,
    },
    /// Update an existing rule (unset fields keep their value).
    Update {
        id: i64,
        #[arg(long)]
        keywords: Option<String>,
        #[arg(long)]
        classification: Option<String>,
        #[arg(long = "main-category")]
        main_category: Option<String>,
        #[arg(long = "sub-category")]
        sub_category: Option<String>,
        #[arg(long)]
        limit: Option<f64>,
    },
    /// Delete a rule by ID.
    Delete { id: i64 },
}

#[derive(Subcommand)]
pub enum CategoryCommands {
    /// Show the configured limit for a main category.
    Limit { category: String },
    /// Show what is left of a main category's limit (all-time spend).
    Remaining { category: String },
    /// Spending totals and average for a main category.
    Analysis { category: String },
}

#[derive(Subcommand)]
pub enum CycleCommands {
    /// Close the active cycle (if any) and start a new one.
    Start {
        /// Start date: YYYY-MM-DD (default: today)
        #[arg(long)]
        date: Option<String>,
    },
    /// Show the active cycle and where it stands in its 30-day window.
    Current,
    /// List recent cycles with their total spend.
    History {
        #[arg(long, default_value = "12")]
        limit: i64,
    },
    /// Full spending analysis for one cycle.
    Analysis {
        /// Cycle ID (shown in `masroof cycle history`)
        id: i64,
    },
}
