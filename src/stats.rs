use std::time::Duration;

/// Counters collected during an ingestion run
#[derive(Debug, Clone, Default)]
pub struct IngestStats {
    pub lines_read: usize,
    pub attempted: usize,
    pub inserted: usize,
    pub duplicates: usize,
    pub failed: usize,
    pub processing_time: Duration,
}

impl IngestStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold another worker's counters into this one.
    pub fn merge(&mut self, other: &IngestStats) {
        self.lines_read += other.lines_read;
        self.attempted += other.attempted;
        self.inserted += other.inserted;
        self.duplicates += other.duplicates;
        self.failed += other.failed;
    }

    pub fn format_summary(&self) -> String {
        let mut output = format!(
            "Lines processed: {} total, {} inserted, {} duplicates skipped",
            self.lines_read, self.inserted, self.duplicates
        );

        if self.failed > 0 {
            output.push_str(&format!(", {} failed", self.failed));
        }

        let processing_time_ms = self.processing_time.as_millis();
        output.push_str(&format!(" in {}ms", processing_time_ms));

        if processing_time_ms > 0 && self.lines_read > 0 {
            let lines_per_sec = (self.lines_read as f64 * 1000.0) / processing_time_ms as f64;
            output.push_str(&format!(" ({:.0} lines/s)", lines_per_sec));
        }

        output
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_sums_counters() {
        let mut a = IngestStats {
            lines_read: 5,
            attempted: 5,
            inserted: 3,
            duplicates: 2,
            ..Default::default()
        };
        let b = IngestStats {
            attempted: 4,
            inserted: 2,
            duplicates: 1,
            failed: 1,
            ..Default::default()
        };
        a.merge(&b);
        assert_eq!(a.lines_read, 5);
        assert_eq!(a.attempted, 9);
        assert_eq!(a.inserted, 5);
        assert_eq!(a.duplicates, 3);
        assert_eq!(a.failed, 1);
    }

    #[test]
    fn test_format_summary_mentions_failures_only_when_present() {
        let mut stats = IngestStats {
            lines_read: 4,
            inserted: 3,
            duplicates: 1,
            ..Default::default()
        };
        assert!(!stats.format_summary().contains("failed"));
        stats.failed = 2;
        assert!(stats.format_summary().contains("2 failed"));
    }
}
