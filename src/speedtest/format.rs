/// Bandwidth in bytes per second as megabits per second.
pub fn speed_to_string(bytes_per_sec: f64) -> String {
    format!("{:.2} Mbps", bytes_per_sec * 8.0 / 1_000_000.0)
}

pub fn ping_to_string(latency_ms: f64) -> String {
    format!("{latency_ms:.1} ms")
}

/// Progress as a whole percentage; `None` once the phase is done.
pub fn percentage_to_string(progress: Option<f64>) -> Option<String> {
    let percent = (progress? * 100.0).round() as i64;
    (percent != 100).then(|| format!("{percent}%"))
}
