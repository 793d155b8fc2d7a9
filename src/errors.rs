use crate::core::air_handling_unit::state::StatePoint;
use crate::core::air_handling_unit::topology::{Actuator, ControlledVariable};
use crate::core::psychrometrics::MoistAirError;
use strum::Display;
use thiserror::Error;

/// Errors raised while solving an air-handling unit scenario.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum AhuError {
    #[error("Infeasible moist-air state at {location}: {source}")]
    InfeasibleMoistAirState {
        location: StatePoint,
        source: MoistAirError,
    },
    #[error("Non-solvable linear system: {reason}")]
    NonSolvableLinearSystem { reason: String },
    #[error("No feasible solution: {controlled} cannot be brought to its set-point of {setpnt} by the {actuator} within [{lower}, {upper}]")]
    NoFeasibleSolution {
        controlled: ControlledVariable,
        actuator: Actuator,
        setpnt: f64,
        lower: f64,
        upper: f64,
    },
    #[error("No convergence of the {process} after {iterations} iterations (residual {residual:e})")]
    NonConvergent {
        process: IterativeProcess,
        iterations: usize,
        residual: f64,
    },
    #[error("Invalid parameter {name} = {value}: {constraint}")]
    InvalidParameter {
        name: &'static str,
        value: f64,
        constraint: &'static str,
    },
    #[error("Infeasible {actuator} duty of {duty:.1} W: {constraint}")]
    InfeasibleActuatorDuty {
        actuator: Actuator,
        duty: f64,
        constraint: &'static str,
    },
}

impl AhuError {
    pub(crate) fn invalid_parameter(name: &'static str, value: f64, constraint: &'static str) -> Self {
        Self::InvalidParameter {
            name,
            value,
            constraint,
        }
    }
}

#[derive(Clone, Copy, Debug, Display, PartialEq, Eq)]
pub enum IterativeProcess {
    #[strum(to_string = "apparatus dew point linearisation")]
    ApparatusDewPoint,
    #[strum(to_string = "set-point search")]
    SetpointSearch,
}

/// Errors raised while running a scenario file.
#[derive(Debug, Error)]
pub enum ScenarioError {
    #[error("Scenario file was considered invalid due to error: {0}")]
    InvalidRequest(#[from] anyhow::Error),
    #[error("Error identified while solving scenario '{name}': {source}")]
    FailureInCalculation { name: String, source: AhuError },
    #[error("Error while writing results: {0}")]
    ErrorInPostprocessing(anyhow::Error),
}
