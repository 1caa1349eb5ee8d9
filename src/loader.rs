use crate::dataset::Dataset;
use crate::error::Result;
use std::fs;
use std::path::Path;
#[cfg(feature = "web")]
use {crate::error::DashboardError, reqwest::Client, std::time::Duration};

/// Build the HTTP client shared by dataset retrieval and thumbnail fetches
#[cfg(feature = "web")]
pub fn build_client(timeout: Duration) -> Result<Client> {
    Ok(Client::builder().timeout(timeout).build()?)
}

/// Retrieve the sheet from the data endpoint, surfacing every failure
///
/// # Arguments
/// * `client` - HTTP client to issue the GET with
/// * `endpoint` - URL answering with a JSON array of rows, header row first
///
/// # Returns
/// * `Result<Dataset>` - The loaded rows, or the transport, status or decode error
#[cfg(feature = "web")]
pub async fn try_fetch_dataset(client: &Client, endpoint: &str) -> Result<Dataset> {
    let response = client.get(endpoint).send().await?;
    let status = response.status();
    if !status.is_success() {
        return Err(DashboardError::Retrieval(format!(
            "endpoint answered {status}"
        )));
    }

    let body = response.text().await?;
    Dataset::from_json(&body)
}

/// Retrieve the sheet, degrading to an empty dataset on any failure.
///
/// The failure is logged; the dashboard keeps running with nothing to filter.
#[cfg(feature = "web")]
pub async fn fetch_dataset(client: &Client, endpoint: &str) -> Dataset {
    match try_fetch_dataset(client, endpoint).await {
        Ok(dataset) => {
            log::info!("fetched {} rows from {}", dataset.len(), endpoint);
            dataset
        }
        Err(e) => {
            log::error!("Error fetching data: {}", e);
            Dataset::default()
        }
    }
}

/// Load a dataset from a JSON file previously saved from the endpoint
///
/// # Examples
/// ```no_run
/// use activity_dashboard::loader::load_dataset_file;
///
/// match load_dataset_file("sheet.json") {
///     Ok(dataset) => println!("Loaded {} rows", dataset.len()),
///     Err(e) => eprintln!("Error loading sheet: {}", e),
/// }
/// ```
pub fn load_dataset_file(path: impl AsRef<Path>) -> Result<Dataset> {
    let body = fs::read_to_string(path)?;
    Dataset::from_json(&body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn loads_saved_sheet() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"[["header"],["t","สมชาย","ครู"],["t","สมหญิง"]]"#).unwrap();
        let dataset = load_dataset_file(file.path()).unwrap();
        assert_eq!(dataset.len(), 2);
        assert_eq!(dataset.rows()[0].get(1), "สมชาย");
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = load_dataset_file("/nonexistent/sheet.json").unwrap_err();
        assert!(matches!(err, crate::error::DashboardError::Io(_)));
    }
}
