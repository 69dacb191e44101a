use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct PoheadConfig {
    /// Treat header diagnostics as errors in the CLI
    pub strict: bool,

    pub oracle: OracleConfig,
}

/// External canonicalizer used to verify round trips.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct OracleConfig {
    pub program: String,
    pub args: Vec<String>,

    #[serde(deserialize_with = "deserialize_duration")]
    pub timeout: Duration,
}

impl Default for PoheadConfig {
    fn default() -> Self {
        Self {
            strict: false,
            oracle: OracleConfig::default(),
        }
    }
}

impl Default for OracleConfig {
    fn default() -> Self {
        Self {
            // resolved on PATH
            program: "msgcat".to_string(),
            // read the catalog from stdin
            args: vec!["-".to_string()],

            timeout: Duration::from_secs(30),
        }
    }
}

impl PoheadConfig {
    pub fn from_file(path: &Path) -> Self {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(err) => {
                tracing::warn!(path = %path.display(), %err, "failed to read config, using defaults");
                return PoheadConfig::default();
            }
        };

        Self::from_toml(&content).unwrap_or_else(|err| {
            tracing::warn!(path = %path.display(), %err, "failed to deserialize config, using defaults");
            PoheadConfig::default()
        })
    }

    pub fn from_toml(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str::<PoheadConfig>(content)
    }
}

fn deserialize_duration<'de, D>(deserializer: D) -> Result<Duration, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let secs = f64::deserialize(deserializer)?;
    Duration::try_from_secs_f64(secs).map_err(serde::de::Error::custom)
}
