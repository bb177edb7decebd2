use std::time::{Duration, Instant};
use tracing::debug;

/// A simple wall-clock timer for logging elapsed time.
pub struct Timer {
    label: String,
    start: Instant,
}

impl Timer {
    pub fn start(label: impl Into<String>) -> Self {
        let label = label.into();
        debug!("⏱  Starting: {}", label);
        Self {
            label,
            start: Instant::now(),
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }
}

impl Drop for Timer {
    fn drop(&mut self) {
        debug!(
            "⏱  Finished: {} (took {:.2?})",
            self.label,
            self.start.elapsed()
        );
    }
}

/// Format a value with thousands separators and at most two decimals.
/// 1234.5 → "1,234.50" | 120.0 → "120" | -42000.0 → "-42,000"
pub fn fmt_value(v: f64) -> String {
    let rounded = (v.abs() * 100.0).round() / 100.0;
    let whole = rounded.trunc() as u64;
    let cents = ((rounded - rounded.trunc()) * 100.0).round() as u64;

    let s = whole.to_string();
    let mut result = String::new();
    for (i, ch) in s.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            result.push(',');
        }
        result.push(ch);
    }
    let mut out: String = result.chars().rev().collect();
    if cents > 0 {
        out.push_str(&format!(".{:02}", cents));
    }
    if v < 0.0 && (whole > 0 || cents > 0) {
        out.insert(0, '-');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fmt_value() {
        assert_eq!(fmt_value(1_234_567.0), "1,234,567");
        assert_eq!(fmt_value(0.0), "0");
        assert_eq!(fmt_value(-42_000.0), "-42,000");
        assert_eq!(fmt_value(1234.5), "1,234.50");
        assert_eq!(fmt_value(999.994), "999.99");
        assert_eq!(fmt_value(-0.001), "0");
    }

    #[test]
    fn test_timer_elapsed() {
        let t = Timer::start("noop");
        assert!(t.elapsed() < Duration::from_secs(5));
    }
}
