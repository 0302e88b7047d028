//! `count/total` progress lines for the status channel.

/// Reports every `interval`-th processed URL (1-indexed).
#[derive(Debug, Clone, Copy)]
pub struct Progress {
    total: usize,
    interval: usize,
}

impl Progress {
    /// `interval == 0` disables reporting.
    pub fn new(total: usize, interval: usize) -> Self {
        Self { total, interval }
    }

    /// Status line after `count` URLs have been processed, if one is due.
    pub fn line_at(&self, count: usize) -> Option<String> {
        if self.interval == 0 || count == 0 || count % self.interval != 0 {
            return None;
        }
        Some(format!("{}/{}", count, self.total))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_tenth() {
        let p = Progress::new(25, 10);
        let lines: Vec<String> = (1..=25).filter_map(|c| p.line_at(c)).collect();
        assert_eq!(lines, vec!["10/25", "20/25"]);
    }

    #[test]
    fn zero_interval_disabled() {
        let p = Progress::new(100, 0);
        assert!((1..=100).all(|c| p.line_at(c).is_none()));
    }
}
