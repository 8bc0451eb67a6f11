use anyhow::{Context, Result, anyhow, bail};
use std::io::Write;
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tokio::time::interval;
use tracing::{info, warn};

use crate::fetch::{FetchStatus, Refreshable};
use crate::speedtest::{
    SpeedtestCli, SpeedtestError, SpeedtestResult, Update, percentage_to_string, ping_to_string,
    speed_to_string,
};

const WATCH_POLL: Duration = Duration::from_millis(250);

/// One-line summary of a result in progress
pub fn summary_line(result: &SpeedtestResult) -> String {
    let field = |value: Option<f64>, format: fn(f64) -> String, progress: Option<f64>| {
        let text = value.map(format).unwrap_or_else(|| "?".to_string());
        match percentage_to_string(progress) {
            Some(percent) => format!("{text} ({percent})"),
            None => text,
        }
    };

    format!(
        "ping {} | down {} | up {}",
        field(result.ping, ping_to_string, result.progress.ping),
        field(result.download, speed_to_string, result.progress.download),
        field(result.upload, speed_to_string, result.progress.upload),
    )
}

/// Run the speedtest CLI and print its progress to stdout.
///
/// In watch mode the test is repeated once the last result is older than the
/// watch period, or right away when a line is entered on stdin.
pub struct SpeedtestMode {
    cli: SpeedtestCli,
    json: bool,
    watch: bool,
    latest: Refreshable<SpeedtestResult, SpeedtestError>,
}

impl SpeedtestMode {
    pub fn new(cli_path: PathBuf, json: bool, watch: Option<Duration>) -> Self {
        Self::with_cli(SpeedtestCli::new(cli_path), json, watch)
    }

    pub fn with_cli(cli: SpeedtestCli, json: bool, watch: Option<Duration>) -> Self {
        Self {
            cli,
            json,
            watch: watch.is_some(),
            latest: Refreshable::new(watch.unwrap_or(Duration::MAX)),
        }
    }

    /// Last completed run and its status
    pub fn latest(&self) -> &Refreshable<SpeedtestResult, SpeedtestError> {
        &self.latest
    }

    pub async fn run(&mut self) -> Result<()> {
        if !self.cli.is_installed() {
            bail!(
                "speedtest CLI not found at {}; install it or pass --cli-path",
                self.cli.program().display()
            );
        }

        if !self.watch {
            self.refresh().await?;
            return match self.latest.error() {
                Some(err) => Err(anyhow!("Speedtest failed: {err}")),
                None => Ok(()),
            };
        }

        println!("Press Enter to run again, Ctrl-C to stop");
        let mut stdin = Some(BufReader::new(tokio::io::stdin()).lines());
        let mut poll = interval(WATCH_POLL);
        loop {
            if self.latest.needs_refresh(Instant::now()) {
                self.refresh().await?;
            }

            tokio::select! {
                _ = poll.tick() => {}

                line = next_line(&mut stdin) => match line {
                    Some(_) => self.latest.invalidate(),
                    None => stdin = None,
                },

                _ = tokio::signal::ctrl_c() => break,
            }
        }
        Ok(())
    }

    /// Run the CLI once and report the outcome.
    async fn refresh(&mut self) -> Result<()> {
        let ticket = self.latest.begin();
        let outcome = self.measure().await;
        if let Err(err) = &outcome {
            warn!(error = %err, "speedtest failed");
        }
        self.latest.complete(ticket, outcome, Instant::now());

        if let Some(err) = self.latest.error() {
            if self.watch {
                eprintln!("\rSpeedtest failed: {err}");
            }
            return Ok(());
        }
        if let Some(result) = self.latest.data() {
            self.report(result)?;
        }
        Ok(())
    }

    async fn measure(&self) -> Result<SpeedtestResult, SpeedtestError> {
        let json = self.json;
        let mut stdout = std::io::stdout();
        self.cli
            .run(|snapshot, update| {
                if update == Update::Progress && !json {
                    // Best effort: a closed stdout must not abort the test
                    let _ = write!(stdout, "\r{}", summary_line(snapshot));
                    let _ = stdout.flush();
                }
            })
            .await
    }

    fn report(&self, result: &SpeedtestResult) -> Result<()> {
        info!(url = result.url.as_deref().unwrap_or("-"), "speedtest finished");
        if self.json {
            println!(
                "{}",
                serde_json::to_string_pretty(result).context("Failed to encode result")?
            );
        } else {
            println!("\r{}", summary_line(result));
            println!("ISP:      {}", result.isp.as_deref().unwrap_or("?"));
            println!("Server:   {}", result.server_name.as_deref().unwrap_or("?"));
            println!("Location: {}", result.location.as_deref().unwrap_or("?"));
            if let Some(url) = &result.url {
                println!("Result:   {url}");
            }
        }
        Ok(())
    }
}

/// Next line from stdin, or never once stdin is closed.
async fn next_line(stdin: &mut Option<Lines<BufReader<Stdin>>>) -> Option<String> {
    match stdin {
        Some(lines) => lines.next_line().await.ok().flatten(),
        None => std::future::pending().await,
    }
}
