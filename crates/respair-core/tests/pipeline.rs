use respair::core::io::arc::{ArcError, ArcFile};
use respair::engine::config::{PairEnergyConfig, PairEnergyConfigBuilder};
use respair::engine::error::EngineError;
use respair::engine::progress::ProgressReporter;
use respair::engine::tool::{ExternalTool, ToolOutput};
use respair::workflows::pair_energy;
use std::cell::RefCell;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Ten atoms: a two-atom reference residue and two backbone residues of four atoms.
const FRAME: &str = "\
    10
    40.000000   40.000000   40.000000   90.000000   90.000000   90.000000
     1  O     0.000000    0.000000    0.000000    63     2
     2  H     0.950000    0.000000    0.000000    64     1
     3  N     3.000000    0.000000    0.000000     7     4     0     0     0
     4  CA    4.400000    0.000000    0.000000     8     3     5     0     0
     5  C     5.900000    0.000000    0.000000     9     4     6     7     0
     6  O     6.500000    1.000000    0.000000    10     5     0     0     0
     7  N     6.600000   -1.100000    0.000000     7     5     8     0     0
     8  CA    8.000000   -1.100000    0.000000     8     7     9     0     0
     9  C     9.500000   -1.100000    0.000000     9     8    10     0     0
    10  O    10.100000    0.000000    0.000000    10     9     0     0     0
";

const ENERGY_REPORT: [&str; 2] = [
    " Intermolecular Energy :     -10.0000 Kcal/mole\n Van der Waals      -2.0000    12\n",
    " Intermolecular Energy :     -14.0000 Kcal/mole\n Van der Waals      -4.0000    12\n",
];

/// Stands in for both external programs.
///
/// The extraction program copies a fixed padded structure next to the trajectory; the
/// analysis program prints one report per frame of the extracted structure, cycling
/// through [`ENERGY_REPORT`].
struct ScriptedTools {
    work_dir: PathBuf,
    frames: usize,
    log: RefCell<Vec<(String, String)>>,
}

impl ExternalTool for ScriptedTools {
    fn run(&self, program: &str, stdin_script: &str) -> Result<ToolOutput, EngineError> {
        self.log
            .borrow_mut()
            .push((program.to_string(), stdin_script.to_string()));
        match program {
            "archive" => {
                let n = self.log.borrow().len();
                fs::write(
                    self.work_dir.join(format!("traj.{n:03}")),
                    "2\n1 N 0.0 0.0 0.0 7 2 0 0\n2 CA 1.0 0.0 0.0 8 1 0 0\n",
                )?;
                Ok(ToolOutput::from_stdout("Tinker archive written\n"))
            }
            "analyze" => {
                let structure = stdin_script.lines().next().unwrap_or_default();
                let content = fs::read_to_string(structure)?;
                assert!(!content.contains(" 0 0"), "artifact was not normalized");
                let report = (0..self.frames)
                    .map(|frame| ENERGY_REPORT[frame % 2])
                    .collect::<String>();
                Ok(ToolOutput {
                    stdout: report,
                    stderr: "Warning: incomplete valence\n".to_string(),
                    exit_code: Some(0),
                })
            }
            other => Err(EngineError::ToolNotFound {
                tool: other.to_string(),
            }),
        }
    }
}

fn setup(frames: usize) -> (TempDir, PathBuf, PairEnergyConfig) {
    let dir = tempfile::tempdir().unwrap();
    let trajectory = dir.path().join("traj.arc");
    fs::write(&trajectory, FRAME.repeat(frames)).unwrap();
    let config = PairEnergyConfigBuilder::new()
        .parameter_file(PathBuf::from("amoebabio18.prm"))
        .results_path(dir.path().join("energy_analysis.txt"))
        .scratch_dir(dir.path().join("scratch"))
        .csv_summary_path(Some(dir.path().join("summary.csv")))
        .build()
        .unwrap();
    (dir, trajectory, config)
}

fn tools_for(dir: &Path, frames: usize) -> ScriptedTools {
    ScriptedTools {
        work_dir: dir.to_path_buf(),
        frames,
        log: RefCell::new(Vec::new()),
    }
}

#[test]
fn five_frame_trajectory_reports_frame_count_five() {
    let (_dir, trajectory, _) = setup(5);
    let loaded = ArcFile::read_from_path(&trajectory).unwrap();
    assert_eq!(loaded.header.frame_count, 5);
    assert_eq!(loaded.header.text, "10");
    assert_eq!(loaded.atoms.len(), 10);
}

#[test]
fn pipeline_aggregates_every_frame_of_the_single_pair() {
    let (dir, trajectory, config) = setup(4);
    let tools = tools_for(dir.path(), 4);

    let outcomes = pair_energy::run_files(
        std::slice::from_ref(&trajectory),
        &config,
        &tools,
        &ProgressReporter::new(),
    );

    assert_eq!(outcomes.len(), 1);
    let result = outcomes[0].result.as_ref().unwrap();
    assert_eq!(result.frame_count, 4);
    assert_eq!(result.residue_count, 3);
    assert_eq!(result.completed.len(), 1);

    let pair = result.completed[0];
    assert_eq!((pair.first, pair.second), (1, 2));
    let summary = result.aggregator.summary(pair);
    assert_eq!(summary[0].0, "Intermolecular Energy");
    assert_eq!(summary[0].1.count, 4);
    assert!((summary[0].1.mean + 12.0).abs() < 1e-9);
    assert!((summary[0].1.std_dev - 2.0).abs() < 1e-9);
    assert!((summary[1].1.mean + 3.0).abs() < 1e-9);

    let log = tools.log.borrow();
    assert_eq!(log[0].0, "archive");
    assert_eq!(
        log[0].1,
        format!("{}\n3\n-1 -2 -11 -10 0\n1 4 1\n", trajectory.display())
    );
    assert_eq!(log[1].0, "analyze");
    assert!(log[1].1.ends_with("pair_1_2.arc\namoebabio18.prm\nE\n"));

    let results = fs::read_to_string(&config.output.results_path).unwrap();
    let lines: Vec<_> = results.lines().collect();
    assert_eq!(lines.len(), 3);
    assert!(lines[0].starts_with("Intermolecular Energy Van der Waals"));
    assert_eq!(lines[2], "res 1 - res 2 -12.00  2.00    -3.00   1.00    ");

    assert_eq!(fs::read_dir(&config.extraction.scratch_dir).unwrap().count(), 0);
    let csv = fs::read_to_string(config.output.csv_summary_path.as_ref().unwrap()).unwrap();
    assert_eq!(csv.lines().count(), 3);
}

#[test]
fn missing_trajectory_is_reported_and_skipped() {
    let (dir, trajectory, config) = setup(2);
    let tools = tools_for(dir.path(), 2);
    let missing = dir.path().join("does_not_exist.arc");

    let outcomes = pair_energy::run_files(
        &[missing.clone(), trajectory],
        &config,
        &tools,
        &ProgressReporter::new(),
    );

    match &outcomes[0].result {
        Err(EngineError::Trajectory(ArcError::NotFound { path })) => assert_eq!(path, &missing),
        other => panic!("expected NotFound, got {:?}", other),
    }
    assert!(outcomes[1].result.is_ok());
    assert_eq!(tools.log.borrow().len(), 2);
}
