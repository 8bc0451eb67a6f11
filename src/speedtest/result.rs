use serde::Serialize;

use super::event::{Server, SpeedtestEvent};

/// Per-phase progress, 0.0..=1.0
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ResultProgress {
    pub ping: Option<f64>,
    pub download: Option<f64>,
    pub upload: Option<f64>,
}

/// Running aggregate of a speedtest. Bandwidths are bytes per second, ping in
/// milliseconds.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SpeedtestResult {
    pub isp: Option<String>,
    pub location: Option<String>,
    pub server_name: Option<String>,
    pub download: Option<f64>,
    pub upload: Option<f64>,
    pub ping: Option<f64>,
    pub url: Option<String>,
    pub progress: ResultProgress,
}

/// What applying an event did to the aggregate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Update {
    Progress,
    Finished,
    Ignored,
}

impl SpeedtestResult {
    fn apply_server(&mut self, server: Option<Server>) {
        let Some(server) = server else { return };
        if server.name.is_some() {
            self.server_name = server.name;
        }
        self.location = match (server.location, server.country) {
            (Some(city), Some(country)) => Some(format!("{city}, {country}")),
            (city, country) => city.or(country).or(self.location.take()),
        };
    }

    pub fn apply(&mut self, event: SpeedtestEvent) -> Update {
        match event {
            SpeedtestEvent::TestStart { isp, server } => {
                self.isp = isp.or(self.isp.take());
                self.apply_server(server);
                Update::Progress
            }
            SpeedtestEvent::Ping { ping } => {
                self.ping = ping.latency.or(self.ping);
                self.progress.ping = ping.progress;
                Update::Progress
            }
            SpeedtestEvent::Download { download } => {
                self.download = download.bandwidth.or(self.download);
                self.progress.download = download.progress;
                Update::Progress
            }
            SpeedtestEvent::Upload { upload } => {
                self.upload = upload.bandwidth.or(self.upload);
                self.progress.upload = upload.progress;
                Update::Progress
            }
            SpeedtestEvent::Result {
                download,
                upload,
                ping,
                isp,
                server,
                result,
            } => {
                self.download = download.bandwidth;
                self.upload = upload.bandwidth;
                self.ping = ping.latency;
                self.isp = isp.or(self.isp.take());
                self.apply_server(server);
                self.url = result.and_then(|r| r.url);
                self.progress = ResultProgress {
                    ping: Some(1.0),
                    download: Some(1.0),
                    upload: Some(1.0),
                };
                Update::Finished
            }
            SpeedtestEvent::Log { .. } | SpeedtestEvent::Unknown => Update::Ignored,
        }
    }

    pub fn is_complete(&self) -> bool {
        self.url.is_some() || (self.download.is_some() && self.upload.is_some() && self.ping.is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::speedtest::parse_line;

    fn feed(lines: &[&str]) -> (SpeedtestResult, Vec<Update>) {
        let mut result = SpeedtestResult::default();
        let updates = lines
            .iter()
            .map(|line| result.apply(parse_line(line).unwrap()))
            .collect();
        (result, updates)
    }

    #[test]
    fn test_progress_accumulates() {
        let (result, updates) = feed(&[
            r#"{"type":"testStart","isp":"Acme","server":{"name":"Example","location":"Berlin","country":"Germany"}}"#,
            r#"{"type":"ping","ping":{"latency":11.5,"progress":1.0}}"#,
            r#"{"type":"download","download":{"bandwidth":1000,"progress":0.5}}"#,
            r#"{"type":"log","level":"info","message":"warming up"}"#,
        ]);

        assert_eq!(
            updates,
            vec![Update::Progress, Update::Progress, Update::Progress, Update::Ignored]
        );
        assert_eq!(result.isp.as_deref(), Some("Acme"));
        assert_eq!(result.server_name.as_deref(), Some("Example"));
        assert_eq!(result.location.as_deref(), Some("Berlin, Germany"));
        assert_eq!(result.ping, Some(11.5));
        assert_eq!(result.download, Some(1000.0));
        assert_eq!(result.progress.download, Some(0.5));
        assert_eq!(result.upload, None);
        assert!(!result.is_complete());
    }

    #[test]
    fn test_result_event_finishes() {
        let (result, updates) = feed(&[
            r#"{"type":"testStart","isp":"Acme","server":{"name":"Example"}}"#,
            r#"{"type":"upload","upload":{"bandwidth":10,"progress":0.9}}"#,
            r#"{"type":"result","ping":{"latency":9.0,"jitter":1.0},"download":{"bandwidth":5000},"upload":{"bandwidth":2500},"result":{"id":"abc","url":"https://www.speedtest.net/result/c/abc"}}"#,
        ]);

        assert_eq!(updates.last(), Some(&Update::Finished));
        assert_eq!(result.isp.as_deref(), Some("Acme"));
        assert_eq!(result.download, Some(5000.0));
        assert_eq!(result.upload, Some(2500.0));
        assert_eq!(result.ping, Some(9.0));
        assert_eq!(
            result.url.as_deref(),
            Some("https://www.speedtest.net/result/c/abc")
        );
        assert_eq!(result.progress.upload, Some(1.0));
        assert!(result.is_complete());
    }

    #[test]
    fn test_progress_without_bandwidth_keeps_last_value() {
        let (result, _) = feed(&[
            r#"{"type":"download","download":{"bandwidth":700,"progress":0.2}}"#,
            r#"{"type":"download","download":{"progress":0.3}}"#,
        ]);
        assert_eq!(result.download, Some(700.0));
        assert_eq!(result.progress.download, Some(0.3));
    }
}
