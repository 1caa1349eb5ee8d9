#![cfg(not(tarpaulin_include))]

use activity_dashboard::aggregate::ChartField;
use activity_dashboard::commands::{ExportArtifact, ExportCommand, SearchCommand};
use activity_dashboard::config::DashboardConfig;
use activity_dashboard::filter::SearchInput;
use activity_dashboard::loader::{build_client, load_dataset_file, try_fetch_dataset};
use activity_dashboard::session::Session;
use chrono::{NaiveDate, Utc};
use clap::Parser;
use std::fs;
use std::path::PathBuf;

/// Filter the activity sheet and write the exports without the web front end
#[derive(Parser)]
#[command(name = "report", version)]
struct Cli {
    #[command(flatten)]
    config: DashboardConfig,

    /// Read the sheet from a saved JSON file instead of the endpoint
    #[arg(long)]
    file: Option<PathBuf>,

    #[arg(long)]
    activity_type: Option<String>,

    /// Substring of the participant name
    #[arg(long)]
    name: Option<String>,

    #[arg(long)]
    department: Option<String>,

    #[arg(long)]
    level: Option<String>,

    #[arg(long)]
    format: Option<String>,

    /// Earliest start date, e.g. 2024-01-01
    #[arg(long)]
    start_date: Option<String>,

    /// Latest end date, inclusive
    #[arg(long)]
    end_date: Option<String>,

    /// Write the CSV export here
    #[arg(long)]
    csv: Option<PathBuf>,

    /// Write the table layout (JSON) here
    #[arg(long)]
    table_layout: Option<PathBuf>,

    /// Print date for the table layout; defaults to today
    #[arg(long)]
    printed_on: Option<NaiveDate>,
}

impl Cli {
    fn search_input(&self) -> SearchInput {
        SearchInput {
            activity_type: self.activity_type.clone(),
            name: self.name.clone(),
            department: self.department.clone(),
            level: self.level.clone(),
            activity_format: self.format.clone(),
            start_date: self.start_date.clone(),
            end_date: self.end_date.clone(),
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let parser = cli.config.date_parser();

    let dataset = match &cli.file {
        Some(path) => load_dataset_file(path)?,
        None => {
            let client = build_client(cli.config.fetch_timeout())?;
            try_fetch_dataset(&client, &cli.config.endpoint).await?
        }
    };

    let mut session = Session::new(parser);
    session.load(dataset);
    let result = SearchCommand::new(cli.search_input()).execute(&mut session)?;

    println!("จำนวนผลงาน: {}", result.summary.count);
    println!("จำนวนชั่วโมงอบรม: {}", result.summary.display_hours());
    for field in ChartField::ALL {
        println!();
        println!("{}", field.title());
        for entry in result.counts(field).entries() {
            println!("  {}: {}", entry.value, entry.count);
        }
    }

    if let Some(path) = &cli.csv {
        if let ExportArtifact::Csv(csv) = ExportCommand::Csv.execute(&session)? {
            fs::write(path, csv.into_bytes())?;
            log::info!("wrote CSV to {}", path.display());
        }
    }

    if let Some(path) = &cli.table_layout {
        let printed_on = cli
            .printed_on
            .unwrap_or_else(|| Utc::now().with_timezone(&parser.offset()).date_naive());
        let command = ExportCommand::TablePdf { printed_on };
        if let ExportArtifact::TablePdf(layout) = command.execute(&session)? {
            fs::write(path, serde_json::to_vec_pretty(&layout)?)?;
            log::info!("wrote table layout to {}", path.display());
        }
    }

    Ok(())
}
