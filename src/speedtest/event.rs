use serde::Deserialize;

use super::SpeedtestError;

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Server {
    pub name: Option<String>,
    pub location: Option<String>,
    pub country: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Ping {
    /// Milliseconds
    pub latency: Option<f64>,
    pub jitter: Option<f64>,
    /// 0.0..=1.0, only present on progress events
    pub progress: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Transfer {
    /// Bytes per second
    pub bandwidth: Option<f64>,
    pub progress: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ResultLink {
    pub url: Option<String>,
}

/// One line of `speedtest --format json --progress` output.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum SpeedtestEvent {
    TestStart {
        isp: Option<String>,
        server: Option<Server>,
    },
    Ping {
        ping: Ping,
    },
    Download {
        download: Transfer,
    },
    Upload {
        upload: Transfer,
    },
    Result {
        download: Transfer,
        upload: Transfer,
        ping: Ping,
        isp: Option<String>,
        server: Option<Server>,
        result: Option<ResultLink>,
    },
    Log {
        level: Option<String>,
        message: String,
    },
    #[serde(other)]
    Unknown,
}

/// Parse one output line, rejecting anything that does not match the schema.
pub fn parse_line(line: &str) -> Result<SpeedtestEvent, SpeedtestError> {
    serde_json::from_str(line).map_err(|err| SpeedtestError::SchemaMismatch {
        line: line.to_string(),
        message: err.to_string(),
    })
}
