//! Accuracy-trend extraction from textual training logs.
//!
//! Federated training runs emit lines like
//! `Node 3 - Round 12: ... Test Accuracy: 87.5%`; this module scans them
//! into per-node accuracy series and aggregates a per-round mean/std
//! trend. Chart rendering is left to external tooling; the trend CSV is
//! the artifact handed over.

use crate::error::Result;
use regex::Regex;
use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::fs;
use std::path::Path;
use std::sync::LazyLock;

/// Matches one per-node test-accuracy report line.
static ACCURACY_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"Node (\d+) - Round \d+: .*?Test Accuracy: ([\d.]+)%")
        .expect("accuracy pattern must compile")
});

/// Per-node test-accuracy series scanned from a training log.
///
/// Nodes are keyed by id; each node's series is in log order, one entry
/// per round it reported. Nodes may have reported different numbers of
/// rounds; aggregation only averages the nodes present in each round.
///
/// # Examples
///
/// ```
/// use distar::logs::AccuracyLog;
///
/// let log = AccuracyLog::parse_str(
///     "Node 0 - Round 1: Loss: 0.9, Test Accuracy: 50.0%\n\
///      Node 1 - Round 1: Loss: 0.8, Test Accuracy: 70.0%\n",
/// );
/// assert_eq!(log.n_nodes(), 2);
/// assert!((log.mean_per_round()[0] - 60.0).abs() < 1e-4);
/// ```
#[derive(Debug, Clone, Default)]
pub struct AccuracyLog {
    node_accuracy: BTreeMap<usize, Vec<f32>>,
}

impl AccuracyLog {
    /// Scans log text for accuracy lines. Lines that don't match the
    /// pattern are ignored.
    #[must_use]
    pub fn parse_str(text: &str) -> Self {
        let mut node_accuracy: BTreeMap<usize, Vec<f32>> = BTreeMap::new();
        for line in text.lines() {
            if let Some(caps) = ACCURACY_LINE.captures(line) {
                let node_id: usize = match caps[1].parse() {
                    Ok(id) => id,
                    Err(_) => continue,
                };
                let accuracy: f32 = match caps[2].parse() {
                    Ok(acc) => acc,
                    Err(_) => continue,
                };
                node_accuracy.entry(node_id).or_default().push(accuracy);
            }
        }
        Self { node_accuracy }
    }

    /// Reads and scans a log file.
    ///
    /// # Errors
    ///
    /// Returns `Io` if the file can't be read.
    pub fn parse_file(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        Ok(Self::parse_str(&text))
    }

    /// Number of distinct nodes seen in the log.
    #[must_use]
    pub fn n_nodes(&self) -> usize {
        self.node_accuracy.len()
    }

    /// Longest per-node series length, i.e. the number of rounds.
    #[must_use]
    pub fn n_rounds(&self) -> usize {
        self.node_accuracy
            .values()
            .map(Vec::len)
            .max()
            .unwrap_or(0)
    }

    /// The accuracy series for one node, if it appeared in the log.
    #[must_use]
    pub fn node_series(&self, node_id: usize) -> Option<&[f32]> {
        self.node_accuracy.get(&node_id).map(Vec::as_slice)
    }

    /// Node ids in ascending order.
    #[must_use]
    pub fn node_ids(&self) -> Vec<usize> {
        self.node_accuracy.keys().copied().collect()
    }

    fn round_values(&self, round: usize) -> Vec<f32> {
        self.node_accuracy
            .values()
            .filter_map(|series| series.get(round).copied())
            .collect()
    }

    /// Mean accuracy per round across the nodes that reported it.
    /// Rounds with no reporting node yield NaN.
    #[must_use]
    pub fn mean_per_round(&self) -> Vec<f32> {
        (0..self.n_rounds())
            .map(|r| {
                let values = self.round_values(r);
                if values.is_empty() {
                    f32::NAN
                } else {
                    values.iter().sum::<f32>() / values.len() as f32
                }
            })
            .collect()
    }

    /// Population standard deviation per round across the nodes that
    /// reported it. Rounds with no reporting node yield NaN.
    #[must_use]
    pub fn std_per_round(&self) -> Vec<f32> {
        (0..self.n_rounds())
            .map(|r| {
                let values = self.round_values(r);
                if values.is_empty() {
                    return f32::NAN;
                }
                let mean = values.iter().sum::<f32>() / values.len() as f32;
                let variance =
                    values.iter().map(|v| (v - mean) * (v - mean)).sum::<f32>()
                        / values.len() as f32;
                variance.sqrt()
            })
            .collect()
    }

    /// Writes the per-round trend as `round,mean,std` CSV (1-based round
    /// numbers, fixed decimal precision).
    ///
    /// # Errors
    ///
    /// Returns `Io` if the file can't be written.
    pub fn write_trend_csv(&self, path: &Path, precision: usize) -> Result<()> {
        let means = self.mean_per_round();
        let stds = self.std_per_round();

        let mut out = String::from("round,mean,std\n");
        for (round, (mean, std)) in means.iter().zip(stds.iter()).enumerate() {
            let _ = writeln!(out, "{},{mean:.precision$},{std:.precision$}", round + 1);
        }

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, out)?;
        Ok(())
    }
}
