/// One progress sample emitted while the engine runs.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct RenderProgress {
    /// Output frames written so far.
    pub frame: u64,
    /// Output timestamp reached, in seconds.
    pub out_secs: f64,
    /// `out_secs / total`, clamped to `[0, 1]`.
    pub fraction: f64,
    /// Encoding speed relative to real time, when the engine reports one.
    pub speed: Option<f64>,
    /// Final sample of the run.
    pub done: bool,
}

/// Incremental parser for the engine's `-progress` key/value stream.
///
/// Each block is a run of `key=value` lines terminated by `progress=continue` or
/// `progress=end`; one [`RenderProgress`] is produced per block.
#[derive(Debug)]
pub struct ProgressParser {
    total_secs: f64,
    frame: u64,
    out_secs: f64,
    speed: Option<f64>,
}

impl ProgressParser {
    pub fn new(total_secs: f64) -> Self {
        Self {
            total_secs,
            frame: 0,
            out_secs: 0.0,
            speed: None,
        }
    }

    pub fn feed_line(&mut self, line: &str) -> Option<RenderProgress> {
        let (key, value) = line.trim().split_once('=')?;
        let value = value.trim();
        match key.trim() {
            "frame" => {
                if let Ok(v) = value.parse() {
                    self.frame = v;
                }
            }
            // Microseconds despite the name.
            "out_time_ms" | "out_time_us" => {
                if let Ok(v) = value.parse::<i64>() {
                    self.out_secs = v.max(0) as f64 / 1_000_000.0;
                }
            }
            "out_time" => {
                if let Some(v) = parse_clock(value) {
                    self.out_secs = v;
                }
            }
            "speed" => {
                self.speed = value.trim_end_matches('x').trim().parse().ok();
            }
            "progress" => {
                let done = value == "end";
                return Some(RenderProgress {
                    frame: self.frame,
                    out_secs: self.out_secs,
                    fraction: self.fraction(done),
                    speed: self.speed,
                    done,
                });
            }
            _ => {}
        }
        None
    }

    fn fraction(&self, done: bool) -> f64 {
        if done {
            return 1.0;
        }
        if self.total_secs <= 0.0 {
            return 0.0;
        }
        (self.out_secs / self.total_secs).clamp(0.0, 1.0)
    }
}

/// `HH:MM:SS.micro` → seconds.
fn parse_clock(s: &str) -> Option<f64> {
    let mut parts = s.splitn(3, ':');
    let h: f64 = parts.next()?.parse().ok()?;
    let m: f64 = parts.next()?.parse().ok()?;
    let sec: f64 = parts.next()?.parse().ok()?;
    Some(h * 3600.0 + m * 60.0 + sec)
}

#[cfg(test)]
#[path = "../../tests/unit/encode/progress.rs"]
mod tests;
