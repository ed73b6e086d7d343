use crate::core::energy::statistics::{ComponentStats, EnergyAggregator};
use crate::core::models::pair::ResiduePair;
use serde::Serialize;
use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::Path;

const COLUMN_WIDTH: usize = 15;

/// Formats the three-line results block for one residue pair.
///
/// ```text
/// Van der Waals   Polarization
///     AVG STD         AVG STD
/// res 1 - res 2 -1.50   0.50    -0.25   0.00
/// ```
pub fn format_pair_block(pair: ResiduePair, summary: &[(String, ComponentStats)]) -> String {
    let header = summary
        .iter()
        .map(|(name, _)| format!("{:<width$}", name, width = COLUMN_WIDTH))
        .collect::<Vec<_>>()
        .join(" ");
    let subheader = summary
        .iter()
        .map(|_| format!("{:^width$}", "AVG STD", width = COLUMN_WIDTH))
        .collect::<Vec<_>>()
        .join(" ");

    let mut data = format!("{} ", pair);
    for (_, stats) in summary {
        data.push_str(&format!("{:<7.2} {:<7.2} ", stats.mean, stats.std_dev));
    }

    format!("{}\n{}\n{}\n", header, subheader, data)
}

/// Appends a pair's block to the results file, creating it when absent.
///
/// The file is opened in append mode for every call, so earlier pairs are never
/// overwritten and a failed pair leaves previous blocks intact.
pub fn append_pair_block(
    path: &Path,
    pair: ResiduePair,
    summary: &[(String, ComponentStats)],
) -> io::Result<()> {
    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    file.write_all(format_pair_block(pair, summary).as_bytes())?;
    file.flush()
}

#[derive(Debug, Serialize)]
struct SummaryRow<'a> {
    trajectory: String,
    residue_i: usize,
    residue_j: usize,
    component: &'a str,
    count: usize,
    mean: f64,
    std_dev: f64,
}

/// Writes one CSV row per trajectory, pair and component.
pub fn write_csv_summary<'a>(
    path: &Path,
    runs: impl IntoIterator<Item = (&'a Path, &'a EnergyAggregator)>,
) -> Result<(), csv::Error> {
    let mut writer = csv::Writer::from_path(path)?;
    for (trajectory, aggregator) in runs {
        let trajectory = trajectory.display().to_string();
        for (pair, samples) in aggregator.pairs() {
            for (component, stats) in samples.summary() {
                writer.serialize(SummaryRow {
                    trajectory: trajectory.clone(),
                    residue_i: pair.first,
                    residue_j: pair.second,
                    component: &component,
                    count: stats.count,
                    mean: stats.mean,
                    std_dev: stats.std_dev,
                })?;
            }
        }
    }
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn stats(mean: f64, std_dev: f64) -> ComponentStats {
        ComponentStats {
            count: 2,
            mean,
            std_dev,
        }
    }

    #[test]
    fn block_lists_every_component_with_avg_and_std() {
        let summary = vec![
            ("Van der Waals".to_string(), stats(-1.5, 0.5)),
            ("Polarization".to_string(), stats(-0.25, 0.0)),
        ];
        let block = format_pair_block(ResiduePair::new(1, 2), &summary);
        let lines: Vec<_> = block.lines().collect();

        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "Van der Waals   Polarization   ");
        assert_eq!(lines[1], "    AVG STD         AVG STD    ");
        assert_eq!(lines[2], "res 1 - res 2 -1.50   0.50    -0.25   0.00    ");
    }

    #[test]
    fn long_component_names_are_not_truncated() {
        let summary = vec![("Intermolecular Energy".to_string(), stats(3.0, 1.0))];
        let block = format_pair_block(ResiduePair::new(3, 9), &summary);
        assert!(block.starts_with("Intermolecular Energy\n"));
        assert!(block.ends_with("res 3 - res 9 3.00    1.00    \n"));
    }

    #[test]
    fn append_never_overwrites_previous_pairs() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("energy_analysis.txt");
        let summary = vec![("Van der Waals".to_string(), stats(-1.0, 0.0))];

        append_pair_block(&path, ResiduePair::new(1, 2), &summary).unwrap();
        append_pair_block(&path, ResiduePair::new(1, 3), &summary).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content.lines().count(), 6);
        assert!(content.contains("res 1 - res 2 "));
        assert!(content.contains("res 1 - res 3 "));
    }

    #[test]
    fn csv_summary_has_one_row_per_pair_component() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("summary.csv");
        let mut aggregator = EnergyAggregator::new();
        aggregator.record(ResiduePair::new(1, 2), "Van der Waals", -1.0);
        aggregator.record(ResiduePair::new(1, 2), "Polarization", -0.5);
        aggregator.record(ResiduePair::new(2, 3), "Van der Waals", -2.0);

        let mut second = EnergyAggregator::new();
        second.record(ResiduePair::new(1, 2), "Van der Waals", -3.0);

        write_csv_summary(
            &path,
            [
                (Path::new("a.arc"), &aggregator),
                (Path::new("b.arc"), &second),
            ],
        )
        .unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<_> = content.lines().collect();
        assert_eq!(
            lines[0],
            "trajectory,residue_i,residue_j,component,count,mean,std_dev"
        );
        assert_eq!(lines.len(), 5);
        assert_eq!(lines[1], "a.arc,1,2,Van der Waals,1,-1.0,0.0");
        assert_eq!(lines[3], "a.arc,2,3,Van der Waals,1,-2.0,0.0");
        assert_eq!(lines[4], "b.arc,1,2,Van der Waals,1,-3.0,0.0");
    }
}
