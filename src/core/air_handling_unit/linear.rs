use super::balance::{assemble, BalanceSystem, BoundaryConditions, CoilSurface};
use super::parameters::Parameters;
use super::state::{AirStates, CoilCondition, OperatingPoint, StatePoint, StateVector, Unknown};
use super::AirHandlingUnit;
use crate::core::psychrometrics::MoistAirError;
use crate::errors::{AhuError, IterativeProcess};
use strum::IntoEnumIterator;
use tracing::{debug, trace};

/// First guess of the apparatus dew point, in deg C
const INITIAL_APPARATUS_DEW_POINT: f64 = 10.;
/// Apparatus dew points outside this range stop the linearisation, in deg C
const APPARATUS_DEW_POINT_RANGE: (f64, f64) = (-100., 100.);
/// Largest accepted ||A.x - b|| relative to ||A||.||x|| + ||b||
const RELATIVE_RESIDUAL_LIMIT: f64 = 1e-10;

/// Direct solution of the balance system by LU decomposition with partial pivoting.
pub(crate) fn solve_linear_system(system: &BalanceSystem) -> Result<StateVector, AhuError> {
    let solution = system
        .matrix
        .clone()
        .lu()
        .solve(&system.rhs)
        .ok_or_else(|| AhuError::NonSolvableLinearSystem {
            reason: "the coefficient matrix is singular".into(),
        })?;
    let state =
        StateVector::from_solution(&solution).ok_or_else(|| AhuError::NonSolvableLinearSystem {
            reason: "the solution is not finite".into(),
        })?;

    let residual = (&system.matrix * &solution - &system.rhs).norm();
    let scale = system.matrix.norm() * solution.norm() + system.rhs.norm();
    if residual > RELATIVE_RESIDUAL_LIMIT * scale {
        return Err(AhuError::NonSolvableLinearSystem {
            reason: format!(
                "the coefficient matrix is ill-conditioned (relative residual {:e})",
                residual / scale
            ),
        });
    }

    Ok(state)
}

impl AirHandlingUnit {
    /// Solve the balances for fixed parameters, and the air state at every point.
    pub(crate) fn operating_point(
        &self,
        parameters: &Parameters,
        boundary: &BoundaryConditions,
    ) -> Result<OperatingPoint, AhuError> {
        let (state, coil_condition, adp_iterations) = self.balance(parameters, boundary)?;
        self.with_air_states(state, coil_condition, adp_iterations, boundary)
    }

    /// Solve the balances for fixed parameters.
    ///
    /// The saturation curve at the coil surface is linearised around the
    /// apparatus dew point found by the previous solve, until that dew point
    /// settles. A coil whose surface would humidify the air is solved again
    /// as a dry coil. Air states are not checked.
    pub(crate) fn balance(
        &self,
        parameters: &Parameters,
        boundary: &BoundaryConditions,
    ) -> Result<(StateVector, CoilCondition, usize), AhuError> {
        let (wet, adp_iterations) = self.solve_wet_coil(parameters, boundary)?;

        if wet[Unknown::HumidityCoil] > wet[Unknown::HumidityMixed] {
            debug!(
                temp_coil = wet[Unknown::TempCoil],
                "coil surface above the dew point of the entering air, solving as a dry coil"
            );
            let system = assemble(
                parameters,
                boundary,
                CoilSurface::Dry,
                &self.psychrometrics,
            )?;
            Ok((
                solve_linear_system(&system)?,
                CoilCondition::Dry,
                adp_iterations,
            ))
        } else {
            Ok((wet, CoilCondition::Wet, adp_iterations))
        }
    }

    pub(crate) fn with_air_states(
        &self,
        state: StateVector,
        coil_condition: CoilCondition,
        adp_iterations: usize,
        boundary: &BoundaryConditions,
    ) -> Result<OperatingPoint, AhuError> {
        Ok(OperatingPoint {
            air_states: self.air_states(&state, boundary)?,
            state,
            coil_condition,
            adp_iterations,
        })
    }

    fn solve_wet_coil(
        &self,
        parameters: &Parameters,
        boundary: &BoundaryConditions,
    ) -> Result<(StateVector, usize), AhuError> {
        let tolerance = self.settings.apparatus_dew_point_tolerance;
        let max_iterations = self.settings.max_apparatus_dew_point_iterations;
        let mut temp_linearisation = INITIAL_APPARATUS_DEW_POINT;
        let mut change = f64::INFINITY;

        for iteration in 1..=max_iterations {
            let system = assemble(
                parameters,
                boundary,
                CoilSurface::Wet { temp_linearisation },
                &self.psychrometrics,
            )?;
            let state = solve_linear_system(&system)?;
            let temp_coil = state[Unknown::TempCoil];
            let humidity_coil = state[Unknown::HumidityCoil];

            if humidity_coil < 0. {
                return Err(AhuError::InfeasibleMoistAirState {
                    location: StatePoint::CoilLeaving,
                    source: MoistAirError::NegativeHumidityRatio {
                        humidity_ratio: humidity_coil,
                    },
                });
            }

            change = (temp_coil - temp_linearisation).abs();
            trace!(iteration, temp_linearisation, temp_coil, "apparatus dew point");
            let (lowest, highest) = APPARATUS_DEW_POINT_RANGE;
            if !(lowest..=highest).contains(&temp_coil) {
                return Err(AhuError::NonConvergent {
                    process: IterativeProcess::ApparatusDewPoint,
                    iterations: iteration,
                    residual: change,
                });
            }
            if change < tolerance {
                return Ok((state, iteration));
            }
            temp_linearisation = temp_coil;
        }

        Err(AhuError::NonConvergent {
            process: IterativeProcess::ApparatusDewPoint,
            iterations: max_iterations,
            residual: change,
        })
    }

    fn air_states(
        &self,
        state: &StateVector,
        boundary: &BoundaryConditions,
    ) -> Result<AirStates, AhuError> {
        let mut air_states = AirStates::default();
        for point in StatePoint::iter() {
            let (temp, humidity_ratio) = match point.unknowns() {
                Some((temp, humidity_ratio)) => (state[temp], state[humidity_ratio]),
                None => (boundary.temp_outdoor, boundary.humidity_outdoor),
            };
            let air_state = self
                .psychrometrics
                .state_from_humidity_ratio(temp, humidity_ratio)
                .map_err(|source| AhuError::InfeasibleMoistAirState {
                    location: point,
                    source,
                })?;
            air_states.set(point, air_state);
        }

        Ok(air_states)
    }
}
