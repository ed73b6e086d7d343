use crate::core::energy::report::{EnergyReport, ReportRule};
use crate::engine::error::EngineError;
use crate::engine::tool::ExternalTool;
use std::path::Path;
use tracing::{debug, instrument, warn};

/// The stdin script requesting an energy decomposition (`E`) of `structure`.
pub fn analysis_script(structure: &Path, parameter_file: &Path) -> String {
    format!("{}\n{}\nE\n", structure.display(), parameter_file.display())
}

/// Evaluates the energy decomposition of one extracted pair structure.
///
/// Diagnostic output on stderr and a non-zero exit status are logged but do not
/// discard the report: the tool routinely complains about the truncated structure
/// while still printing usable numbers.
#[instrument(skip_all, name = "analyze_pair", fields(structure = %structure.display()))]
pub fn analyze_pair(
    tool: &dyn ExternalTool,
    program: &str,
    structure: &Path,
    parameter_file: &Path,
    rules: &[ReportRule],
) -> Result<EnergyReport, EngineError> {
    let output = tool.run(program, &analysis_script(structure, parameter_file))?;
    output.warn_on_stderr(program);

    let report = EnergyReport::parse(&output.stdout, rules);
    if report.is_empty() {
        warn!("'{}' produced no recognised energy lines", program);
    } else {
        debug!("Parsed {} energy observations", report.observations().len());
    }
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::energy::report::default_rules;
    use crate::engine::tool::ToolOutput;
    use crate::engine::tool::testing::FakeTool;

    const FRAME_REPORT: &str = "\
 Intermolecular Energy :                -4.0000 Kcal/mole
 Van der Waals                          -1.0000              120
 Atomic Multipoles                      -2.0000               60
 Polarization                           -1.0000               60
";

    #[test]
    fn script_names_structure_parameters_and_energy_mode() {
        let script = analysis_script(Path::new("scratch/pair_1_2.arc"), Path::new("amoeba.prm"));
        assert_eq!(script, "scratch/pair_1_2.arc\namoeba.prm\nE\n");
    }

    #[test]
    fn analyze_pair_parses_stdout_with_the_given_rules() {
        let tool = FakeTool::new(|_, _| Ok(ToolOutput::from_stdout(FRAME_REPORT.repeat(2))));
        let report = analyze_pair(
            &tool,
            "analyze",
            Path::new("pair_1_2.arc"),
            Path::new("ff.prm"),
            &default_rules(),
        )
        .unwrap();

        assert_eq!(report.observations().len(), 8);
        assert_eq!(
            report.values_of("Intermolecular Energy").collect::<Vec<_>>(),
            vec![-4.0, -4.0]
        );
        let calls = tool.calls.borrow();
        assert_eq!(calls[0].0, "analyze");
        assert_eq!(calls[0].1, "pair_1_2.arc\nff.prm\nE\n");
    }

    #[test]
    fn stderr_and_exit_status_do_not_discard_the_report() {
        let tool = FakeTool::new(|_, _| {
            Ok(ToolOutput {
                stdout: FRAME_REPORT.to_string(),
                stderr: "Warning: atom 12 has an incomplete valence\n".to_string(),
                exit_code: Some(1),
            })
        });
        let report = analyze_pair(
            &tool,
            "analyze",
            Path::new("pair_1_2.arc"),
            Path::new("ff.prm"),
            &default_rules(),
        )
        .unwrap();
        assert_eq!(report.observations().len(), 4);
    }

    #[test]
    fn unrecognised_output_yields_an_empty_report() {
        let tool = FakeTool::new(|_, _| Ok(ToolOutput::from_stdout("nothing useful\n")));
        let report = analyze_pair(
            &tool,
            "analyze",
            Path::new("pair_1_2.arc"),
            Path::new("ff.prm"),
            &default_rules(),
        )
        .unwrap();
        assert!(report.is_empty());
    }
}
