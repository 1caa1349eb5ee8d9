use crate::dates::DateParser;
use clap::Args;
use std::path::PathBuf;
use std::time::Duration;

/// Published web-app endpoint that answers with the whole sheet as JSON
pub const DEFAULT_ENDPOINT: &str = "https://script.google.com/macros/s/AKfycby3b89RQLEK3Ps2AGaDwnhcMLEY66MaCUVCl7mQnDlugVei7MGQt2Qgm0UHeWU4mhzT/exec";

pub const DEFAULT_BIND: &str = "127.0.0.1:3000";

/// Runtime settings shared by the service and the report tool
#[derive(Args, Clone, Debug)]
pub struct DashboardConfig {
    /// Data endpoint returning the sheet as a JSON array of rows
    #[arg(long, env = "DASHBOARD_ENDPOINT", default_value = DEFAULT_ENDPOINT)]
    pub endpoint: String,

    /// Address the HTTP service listens on
    #[arg(long, env = "DASHBOARD_BIND", default_value = DEFAULT_BIND)]
    pub bind: String,

    /// Directory served under /static
    #[arg(long, env = "DASHBOARD_STATIC_DIR", default_value = "static")]
    pub static_dir: PathBuf,

    /// Seconds to wait for each attachment thumbnail before leaving it blank
    #[arg(long, default_value_t = 15)]
    pub image_timeout_secs: u64,

    /// Seconds before a dataset request is abandoned
    #[arg(long, default_value_t = 30)]
    pub fetch_timeout_secs: u64,

    /// UTC offset, in hours, for dates written without one
    #[arg(
        long,
        default_value_t = 7,
        allow_hyphen_values = true,
        value_parser = clap::value_parser!(i32).range(-23..=23)
    )]
    pub utc_offset_hours: i32,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        DashboardConfig {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            bind: DEFAULT_BIND.to_string(),
            static_dir: PathBuf::from("static"),
            image_timeout_secs: 15,
            fetch_timeout_secs: 30,
            utc_offset_hours: 7,
        }
    }
}

impl DashboardConfig {
    pub fn image_timeout(&self) -> Duration {
        Duration::from_secs(self.image_timeout_secs)
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }

    pub fn date_parser(&self) -> DateParser {
        DateParser::with_offset_hours(self.utc_offset_hours).unwrap_or_default()
    }
}
