use activity_dashboard::app;
use activity_dashboard::config::DashboardConfig;
use clap::Parser;

#[derive(Parser)]
#[command(name = "dashboard", version, about = "Activity dashboard HTTP service")]
struct Cli {
    #[command(flatten)]
    config: DashboardConfig,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    // Start the web application
    app::run(cli.config).await?;

    Ok(())
}
