use crate::cli::ResiduesArgs;
use crate::error::{CliError, Result};
use respair::core::io::arc::{ArcFile, Trajectory};
use respair::core::models::pair::pair_count;
use respair::core::models::residue::{Residue, segment_residues};
use std::fmt::Write;
use tracing::info;

pub async fn run(args: ResiduesArgs) -> Result<()> {
    info!("Loading trajectory from {:?}", &args.trajectory);
    let trajectory =
        ArcFile::read_from_path(&args.trajectory).map_err(|e| CliError::FileParsing {
            path: args.trajectory.clone(),
            source: e.into(),
        })?;

    let residues = segment_residues(trajectory.atoms.iter().cloned());
    print!("{}", render_residue_table(&trajectory, &residues));
    Ok(())
}

/// Describes the segmentation the `run` command would work with.
fn render_residue_table(trajectory: &Trajectory, residues: &[Residue]) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Trajectory:   {}", trajectory.path.display());
    let _ = writeln!(
        out,
        "Frame header: '{}' ({} frame(s))",
        trajectory.header.text, trajectory.header.frame_count
    );
    let _ = writeln!(
        out,
        "Residues:     {} ({} pair(s) to evaluate)",
        residues.len(),
        pair_count(residues.len())
    );
    let _ = writeln!(out);
    let _ = writeln!(out, "{:>7} {:>7}  SERIALS", "INDEX", "ATOMS");

    for residue in residues {
        let serials = match residue.span() {
            Some(span) => format!("{}-{}", span.first, span.last),
            None => "-".to_string(),
        };
        let note = if residue.index == 0 { "  (reference)" } else { "" };
        let _ = writeln!(
            out,
            "{:>7} {:>7}  {}{}",
            residue.index,
            residue.len(),
            serials,
            note
        );
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use std::path::PathBuf;

    #[test]
    fn table_lists_every_residue_with_its_serial_range() {
        let content = "\
6
1 O 0.0 0.0 0.0 63 2
2 N 1.0 0.0 0.0 7 3
3 CA 2.0 0.0 0.0 8 2
4 C 3.0 0.0 0.0 9 3
5 N 4.0 0.0 0.0 7 4
6 CA 5.0 0.0 0.0 8 5
6
";
        let (atoms, header) = ArcFile::read_from(&mut Cursor::new(content)).unwrap();
        let trajectory = Trajectory {
            path: PathBuf::from("traj.arc"),
            atoms,
            header,
        };
        let residues = segment_residues(trajectory.atoms.iter().cloned());

        let table = render_residue_table(&trajectory, &residues);
        let lines: Vec<_> = table.lines().collect();

        assert_eq!(lines[0], "Trajectory:   traj.arc");
        assert_eq!(lines[1], "Frame header: '6' (2 frame(s))");
        assert_eq!(lines[2], "Residues:     2 (0 pair(s) to evaluate)");
        assert_eq!(lines[4], "  INDEX   ATOMS  SERIALS");
        assert_eq!(lines[5], "      0       1  1-1  (reference)");
        assert_eq!(lines[6], "      1       5  2-6");
    }
}
