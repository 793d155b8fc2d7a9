pub mod core;
pub mod errors;
pub mod input;
pub mod output_writer;

pub use crate::core::air_handling_unit::parameters::{
    ControllerGain, Inputs, Parameters, SolverSettings,
};
pub use crate::core::air_handling_unit::state::{CoilCondition, StatePoint, StateVector, Unknown};
pub use crate::core::air_handling_unit::topology::{
    Actuator, AhuSolution, ControlledOutput, ControlledVariable, Scenario, Topology,
};
pub use crate::core::air_handling_unit::AirHandlingUnit;
pub use crate::errors::{AhuError, ScenarioError};
use crate::input::ingest_scenarios;
use crate::output_writer::OutputWriter;
use csv::WriterBuilder;
use indexmap::IndexMap;
use std::borrow::Cow;
use std::io::Read;
use strum::IntoEnumIterator;
use tracing::{info, instrument, warn};

/// Outcome of every scenario of a run, keyed and ordered by scenario name.
#[derive(Debug)]
pub struct RunResults {
    pub outcomes: IndexMap<String, Result<AhuSolution, AhuError>>,
}

impl RunResults {
    pub fn failures(&self) -> impl Iterator<Item = (&str, &AhuError)> {
        self.outcomes
            .iter()
            .filter_map(|(name, outcome)| outcome.as_ref().err().map(|e| (name.as_str(), e)))
    }
}

/// Solve every scenario of a JSON scenario file and write one results table.
///
/// Arguments:
/// * `input` - the scenario file
/// * `output` - where the "results" CSV file goes
/// * `fail_fast` - whether a failed scenario fails the whole run, rather than being reported in its row
#[instrument(skip_all)]
pub fn run_scenarios(
    input: impl Read,
    output: impl OutputWriter,
    fail_fast: bool,
) -> Result<RunResults, ScenarioError> {
    let file = ingest_scenarios(input)?;
    let ahu = AirHandlingUnit::new(file.settings).map_err(|e| ScenarioError::InvalidRequest(e.into()))?;
    let scenarios = file.to_scenarios();

    info!(count = scenarios.len(), "solving scenarios");
    let solutions = ahu.solve_all(&scenarios);

    let outcomes: IndexMap<String, Result<AhuSolution, AhuError>> = file
        .names()
        .map(str::to_owned)
        .zip(solutions)
        .collect();

    for (name, outcome) in &outcomes {
        if let Err(e) = outcome {
            if fail_fast {
                return Err(ScenarioError::FailureInCalculation {
                    name: name.clone(),
                    source: e.clone(),
                });
            }
            warn!(scenario = name.as_str(), error = %e, "scenario failed");
        }
    }

    if !output.is_noop() {
        write_results_file(&output, &scenarios, &outcomes)
            .map_err(ScenarioError::ErrorInPostprocessing)?;
    }

    Ok(RunResults { outcomes })
}

const LOADS: [(Unknown, &str); 6] = [
    (Unknown::CoolingSensible, "cooling coil sensible load"),
    (Unknown::CoolingLatent, "cooling coil latent load"),
    (Unknown::CoolingTotal, "cooling coil total load"),
    (Unknown::ReheatSensible, "reheat coil load"),
    (Unknown::ZoneSensible, "zone sensible load"),
    (Unknown::ZoneLatent, "zone latent load"),
];

fn write_results_file(
    output: &impl OutputWriter,
    scenarios: &[Scenario],
    outcomes: &IndexMap<String, Result<AhuSolution, AhuError>>,
) -> Result<(), anyhow::Error> {
    let writer = output.writer_for_location_key("results", "csv")?;
    let mut writer = WriterBuilder::new().flexible(true).from_writer(writer);

    let mut headings: Vec<Cow<'static, str>> = vec![
        "scenario".into(),
        "topology".into(),
        "status".into(),
        "coil condition".into(),
        "supply mass flow rate".into(),
        "bypass factor".into(),
        "supply volume flow rate".into(),
    ];
    let mut units_row = vec!["", "", "", "", "[kg/s]", "[ratio]", "[m3/s]"];
    for point in StatePoint::iter() {
        let point = point.short_name();
        headings.push(format!("theta_{point}").into());
        headings.push(format!("w_{point}").into());
        headings.push(format!("phi_{point}").into());
        headings.push(format!("h_{point}").into());
        units_row.extend(["[deg C]", "[kg/kg]", "[ratio]", "[J/kg]"]);
    }
    for (_, heading) in LOADS {
        headings.push(heading.into());
        units_row.push("[W]");
    }
    headings.push("apparatus dew point iterations".into());
    headings.push("set-point search evaluations".into());
    units_row.extend(["[count]", "[count]"]);

    writer.write_record(headings.iter().map(|heading| heading.as_ref()))?;
    writer.write_record(&units_row)?;

    for ((name, outcome), scenario) in outcomes.iter().zip(scenarios) {
        let mut row = vec![name.clone(), scenario.topology.to_string()];
        match outcome {
            Ok(solution) => {
                row.extend([
                    "solved".to_string(),
                    solution.coil_condition.to_string(),
                    solution.supply_mass_flow().to_string(),
                    solution.bypass_factor().to_string(),
                    solution.supply_volume_flow.to_string(),
                ]);
                for point in StatePoint::iter() {
                    let air = solution.air_state(point);
                    row.extend(
                        [air.temp, air.humidity_ratio, air.rel_humidity, air.enthalpy]
                            .map(|value| value.to_string()),
                    );
                }
                for (unknown, _) in LOADS {
                    row.push(solution.state[unknown].to_string());
                }
                row.push(solution.adp_iterations.to_string());
                row.push(solution.setpoint_iterations.to_string());
            }
            Err(e) => row.push(e.to_string()),
        }
        writer.write_record(&row)?;
    }

    writer.flush()?;

    Ok(())
}
