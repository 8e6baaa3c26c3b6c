//! Logging backends for collection progress.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;
use std::time::Instant;

/// Point-in-time view of data collection.
#[derive(Debug, Clone)]
pub struct TrainingSnapshot {
    /// Total environment steps taken.
    pub env_steps: usize,
    /// Completed episodes.
    pub episodes: usize,
    /// Mean return over the recent episode window.
    pub avg_return: f32,
    /// Windows currently stored in the replay buffer.
    pub buffer_len: usize,
    /// Replay buffer fill fraction.
    pub buffer_utilization: f32,
}

/// Logger backend for training snapshots.
pub trait MetricsLogger: Send {
    /// Record one snapshot.
    fn log(&mut self, snapshot: &TrainingSnapshot);

    /// Flush buffered output.
    fn flush(&mut self);
}

/// Stdout logger, throttled to at most one line per interval.
pub struct ConsoleLogger {
    min_interval_secs: f32,
    last_log: Option<Instant>,
}

impl ConsoleLogger {
    pub fn new(min_interval_secs: f32) -> Self {
        Self {
            min_interval_secs,
            last_log: None,
        }
    }
}

impl Default for ConsoleLogger {
    fn default() -> Self {
        Self::new(5.0)
    }
}

impl MetricsLogger for ConsoleLogger {
    fn log(&mut self, snapshot: &TrainingSnapshot) {
        if let Some(last) = self.last_log {
            if last.elapsed().as_secs_f32() < self.min_interval_secs {
                return;
            }
        }
        self.last_log = Some(Instant::now());
        println!(
            "step {:>9} | episodes {:>6} | avg return {:>8.2} | buffer {:>8} ({:>5.1}%)",
            snapshot.env_steps,
            snapshot.episodes,
            snapshot.avg_return,
            snapshot.buffer_len,
            snapshot.buffer_utilization * 100.0
        );
    }

    fn flush(&mut self) {
        let _ = io::stdout().flush();
    }
}

/// CSV logger writing one row per snapshot.
pub struct CsvLogger {
    writer: BufWriter<File>,
}

impl CsvLogger {
    /// Create the file and write the header row.
    pub fn create(path: impl AsRef<Path>) -> io::Result<Self> {
        let mut writer = BufWriter::new(File::create(path)?);
        writeln!(
            writer,
            "env_steps,episodes,avg_return,buffer_len,buffer_utilization"
        )?;
        Ok(Self { writer })
    }
}

impl MetricsLogger for CsvLogger {
    fn log(&mut self, snapshot: &TrainingSnapshot) {
        let _ = writeln!(
            self.writer,
            "{},{},{},{},{}",
            snapshot.env_steps,
            snapshot.episodes,
            snapshot.avg_return,
            snapshot.buffer_len,
            snapshot.buffer_utilization
        );
    }

    fn flush(&mut self) {
        let _ = self.writer.flush();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_csv_logger_writes_rows() {
        let dir = std::env::temp_dir().join("sequence_rl_csv_logger_test");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("metrics.csv");

        let mut logger = CsvLogger::create(&path).unwrap();
        logger.log(&TrainingSnapshot {
            env_steps: 100,
            episodes: 2,
            avg_return: 1.5,
            buffer_len: 42,
            buffer_utilization: 0.42,
        });
        logger.flush();

        let contents = std::fs::read_to_string(&path).unwrap();
        let mut lines = contents.lines();
        assert_eq!(
            lines.next().unwrap(),
            "env_steps,episodes,avg_return,buffer_len,buffer_utilization"
        );
        assert_eq!(lines.next().unwrap(), "100,2,1.5,42,0.42");

        std::fs::remove_file(&path).ok();
    }
}
