//! WMO weather code descriptions

use std::collections::HashMap;
use std::path::PathBuf;

use tokio::sync::OnceCell;
use tracing::{debug, warn};

/// Used when the description table cannot be loaded
const FALLBACK_DESCRIPTIONS: [(i32, &str); 4] = [
    (0, "Clear sky"),
    (1, "Mainly clear"),
    (2, "Partly cloudy"),
    (3, "Overcast"),
];

/// Translates weather codes using a side-loaded JSON table (`{"0": "Clear sky", ...}`).
///
/// The table is loaded on first use and kept for the translator's lifetime.
#[derive(Debug)]
pub struct WeatherCodeTranslator {
    table_path: PathBuf,
    table: OnceCell<HashMap<i32, String>>,
}

impl WeatherCodeTranslator {
    pub fn new(table_path: impl Into<PathBuf>) -> Self {
        Self {
            table_path: table_path.into(),
            table: OnceCell::new(),
        }
    }

    /// Describe a weather code. Never fails; unknown codes get a placeholder.
    pub async fn describe(&self, code: i32) -> String {
        let table = self.table.get_or_init(|| self.load()).await;
        table
            .get(&code)
            .cloned()
            .unwrap_or_else(|| format!("Unknown code {code}"))
    }

    async fn load(&self) -> HashMap<i32, String> {
        match self.read_table().await {
            Ok(table) => {
                debug!("Loaded {} weather code descriptions", table.len());
                table
            }
            Err(e) => {
                warn!(
                    "Weather code table {} unavailable, using built-in fallback: {}",
                    self.table_path.display(),
                    e
                );
                fallback_table()
            }
        }
    }

    async fn read_table(&self) -> anyhow::Result<HashMap<i32, String>> {
        let bytes = tokio::fs::read(&self.table_path).await?;
        let raw: HashMap<String, String> = serde_json::from_slice(&bytes)?;
        raw.into_iter()
            .map(|(code, description)| -> anyhow::Result<(i32, String)> {
                Ok((code.trim().parse::<i32>()?, description))
            })
            .collect()
    }
}

fn fallback_table() -> HashMap<i32, String> {
    FALLBACK_DESCRIPTIONS
        .iter()
        .map(|(code, description)| (*code, (*description).to_string()))
        .collect()
}
