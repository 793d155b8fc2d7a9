use super::balance::BoundaryConditions;
use super::parameters::{ControllerGain, Inputs, Parameters};
use super::state::{AirStates, CoilCondition, OperatingPoint, StatePoint, StateVector, Unknown};
use super::AirHandlingUnit;
use crate::core::psychrometrics::{AirState, Psychrometrics};
use crate::core::solvers::{find_root, RootSearch, RootSearchError};
use crate::errors::{AhuError, IterativeProcess};
use rayon::prelude::*;
use strum::Display;
use tracing::{debug, instrument};

/// Duty of the wrong sign tolerated on a coil before it is reported, in W
const DUTY_TOLERANCE: f64 = 1e-3;

/// Output held at a set-point by varying the bypass factor or the supply mass flow rate.
#[derive(Clone, Copy, Debug, Display, PartialEq, Eq)]
pub enum ControlledVariable {
    #[strum(to_string = "zone relative humidity")]
    ZoneRelHumidity,
    #[strum(to_string = "supply air temperature")]
    SupplyTemp,
}

impl ControlledVariable {
    fn measure(&self, point: &OperatingPoint) -> f64 {
        match self {
            Self::ZoneRelHumidity => point.air_states[StatePoint::Zone].rel_humidity,
            Self::SupplyTemp => point.state[Unknown::TempSupply],
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ControlledOutput {
    pub variable: ControlledVariable,
    /// set-point, in deg C for a temperature or between 0 and 1 for a relative humidity
    pub setpnt: f64,
}

impl ControlledOutput {
    fn validate(&self) -> Result<(), AhuError> {
        let (valid, constraint) = match self.variable {
            ControlledVariable::ZoneRelHumidity => (
                (0. ..=1.).contains(&self.setpnt),
                "must be a relative humidity between 0 and 1",
            ),
            ControlledVariable::SupplyTemp => {
                (self.setpnt.is_finite(), "must be a finite temperature")
            }
        };
        if !valid {
            return Err(AhuError::invalid_parameter("setpnt", self.setpnt, constraint));
        }

        Ok(())
    }
}

#[derive(Clone, Copy, Debug, Display, PartialEq, Eq)]
pub enum Actuator {
    #[strum(to_string = "cooling coil")]
    CoolingCoil,
    #[strum(to_string = "reheat coil")]
    ReheatCoil,
    #[strum(to_string = "bypass damper")]
    BypassDamper,
    #[strum(to_string = "supply fan")]
    SupplyFan,
}

/// Control topologies of the air-handling unit.
///
/// The zone temperature is always held by the cooling coil. The topologies
/// differ in what, if anything, holds the zone humidity or the supply air
/// temperature.
#[derive(Clone, Copy, Debug, Display, PartialEq)]
pub enum Topology {
    /// constant air volume, zone humidity held by the reheat coil
    #[strum(to_string = "CAV with reheat")]
    CavReheat,
    /// constant air volume without reheat, zone humidity floating
    #[strum(to_string = "CAV")]
    Cav,
    /// constant air volume without reheat, one output held by the bypass factor
    #[strum(to_string = "CAV with variable bypass")]
    Vbp { controlled: ControlledOutput },
    /// variable air volume without reheat, zone humidity held by the supply mass flow rate
    ///
    /// `setpnt` is the zone relative humidity held by the search. The zone
    /// humidity set-point of the [`Inputs`] only feeds the humidity loop,
    /// which is off without reheat, so it has no effect here.
    #[strum(to_string = "VAV controlling zone humidity")]
    VavZoneHumidity { setpnt: f64 },
    /// variable air volume without reheat, supply temperature held by the supply mass flow rate
    #[strum(to_string = "VAV controlling supply temperature")]
    VavSupplyTemp { setpnt: f64 },
    /// variable air volume, zone humidity held by the reheat coil and supply
    /// temperature by the supply mass flow rate
    #[strum(to_string = "VAV with reheat")]
    VavReheat { setpnt: f64 },
}

/// Parameter varied by the set-point search.
#[derive(Clone, Copy, Debug)]
enum SearchVariable {
    BypassFactor,
    SupplyMassFlow,
}

impl SearchVariable {
    fn actuator(&self) -> Actuator {
        match self {
            Self::BypassFactor => Actuator::BypassDamper,
            Self::SupplyMassFlow => Actuator::SupplyFan,
        }
    }

    fn position(&self, parameters: &Parameters) -> f64 {
        match self {
            Self::BypassFactor => parameters.bypass_factor,
            Self::SupplyMassFlow => parameters.supply_mass_flow,
        }
    }

    fn moved_to(&self, parameters: Parameters, position: f64) -> Parameters {
        match self {
            Self::BypassFactor => parameters.with_bypass_factor(position),
            Self::SupplyMassFlow => parameters.with_supply_mass_flow(position),
        }
    }
}

impl Topology {
    /// Index of the topology in the usual numbering, from 1 to 6.
    pub fn number(&self) -> u8 {
        match self {
            Self::CavReheat => 1,
            Self::Cav => 2,
            Self::Vbp { .. } => 3,
            Self::VavZoneHumidity { .. } => 4,
            Self::VavSupplyTemp { .. } => 5,
            Self::VavReheat { .. } => 6,
        }
    }

    pub fn has_reheat(&self) -> bool {
        matches!(self, Self::CavReheat | Self::VavReheat { .. })
    }

    fn search(&self) -> Option<(SearchVariable, ControlledOutput)> {
        match *self {
            Self::CavReheat | Self::Cav => None,
            Self::Vbp { controlled } => Some((SearchVariable::BypassFactor, controlled)),
            Self::VavZoneHumidity { setpnt } => Some((
                SearchVariable::SupplyMassFlow,
                ControlledOutput {
                    variable: ControlledVariable::ZoneRelHumidity,
                    setpnt,
                },
            )),
            Self::VavSupplyTemp { setpnt } | Self::VavReheat { setpnt } => Some((
                SearchVariable::SupplyMassFlow,
                ControlledOutput {
                    variable: ControlledVariable::SupplyTemp,
                    setpnt,
                },
            )),
        }
    }

    /// Parameters with the humidity loop switched off where there is no reheat coil.
    fn loop_parameters(&self, parameters: &Parameters) -> Parameters {
        if self.has_reheat() {
            *parameters
        } else {
            Parameters {
                gain_humidity: ControllerGain::DISABLED,
                ..*parameters
            }
        }
    }
}

/// Result of a solve of one topology.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AhuSolution {
    pub topology: Topology,
    /// parameters at the solution, including a supply mass flow rate or bypass factor found by search
    pub parameters: Parameters,
    pub state: StateVector,
    pub air_states: AirStates,
    pub coil_condition: CoilCondition,
    /// supply air volume flow rate, in m3/s
    pub supply_volume_flow: f64,
    pub adp_iterations: usize,
    /// residual evaluations of the set-point search, 0 when no search was needed
    pub setpoint_iterations: usize,
}

impl AhuSolution {
    fn new(
        topology: Topology,
        parameters: Parameters,
        point: OperatingPoint,
        setpoint_iterations: usize,
        psychrometrics: &Psychrometrics,
    ) -> Self {
        let supply = point.air_states[StatePoint::Supply];

        Self {
            topology,
            parameters,
            state: point.state,
            air_states: point.air_states,
            coil_condition: point.coil_condition,
            supply_volume_flow: parameters.supply_mass_flow
                * psychrometrics.specific_volume(supply.temp, supply.humidity_ratio),
            adp_iterations: point.adp_iterations,
            setpoint_iterations,
        }
    }

    pub fn air_state(&self, point: StatePoint) -> &AirState {
        &self.air_states[point]
    }

    pub fn supply_mass_flow(&self) -> f64 {
        self.parameters.supply_mass_flow
    }

    pub fn bypass_factor(&self) -> f64 {
        self.parameters.bypass_factor
    }

    /// total load of the cooling coil, in W (negative when cooling)
    pub fn cooling_load(&self) -> f64 {
        self.state[Unknown::CoolingTotal]
    }

    /// sensible load of the reheat coil, in W
    pub fn reheat_load(&self) -> f64 {
        self.state[Unknown::ReheatSensible]
    }
}

/// One independent solve: topology, parameters and inputs.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Scenario {
    pub topology: Topology,
    pub parameters: Parameters,
    pub inputs: Inputs,
}

impl AirHandlingUnit {
    /// Solve the unit in a control topology.
    ///
    /// Arguments:
    /// * `topology` - which outputs are controlled, and by which actuators
    /// * `parameters` - mass flow rates, bypass factor and gains; a searched
    ///   bypass factor or supply mass flow rate is used as the initial guess
    /// * `inputs` - outdoor air, zone set-points and zone loads
    #[instrument(skip(self, parameters, inputs))]
    pub fn solve(
        &self,
        topology: Topology,
        parameters: &Parameters,
        inputs: &Inputs,
    ) -> Result<AhuSolution, AhuError> {
        parameters.validate()?;
        inputs.validate()?;
        let search = topology.search();
        if let Some((_, controlled)) = search {
            controlled.validate()?;
        }
        let boundary = BoundaryConditions::new(inputs, &self.psychrometrics)?;
        let parameters = topology.loop_parameters(parameters);

        // coil duties are checked before air states, which an infeasible duty usually spoils
        let (parameters, point, setpoint_iterations) = match search {
            None => {
                let (state, coil_condition, adp_iterations) =
                    self.balance(&parameters, &boundary)?;
                check_actuator_duties(&state)?;
                let point =
                    self.with_air_states(state, coil_condition, adp_iterations, &boundary)?;
                (parameters, point, 0)
            }
            Some((variable, controlled)) => {
                let (parameters, point, evaluations) =
                    self.track_setpoint(parameters, &boundary, variable, controlled)?;
                check_actuator_duties(&point.state)?;
                (parameters, point, evaluations)
            }
        };

        debug!(
            supply_mass_flow = parameters.supply_mass_flow,
            bypass_factor = parameters.bypass_factor,
            cooling_load = point.state[Unknown::CoolingTotal],
            reheat_load = point.state[Unknown::ReheatSensible],
            adp_iterations = point.adp_iterations,
            setpoint_iterations,
            "solved"
        );

        Ok(AhuSolution::new(
            topology,
            parameters,
            point,
            setpoint_iterations,
            &self.psychrometrics,
        ))
    }

    /// Solve independent scenarios in parallel, returning results in the order given.
    pub fn solve_all(&self, scenarios: &[Scenario]) -> Vec<Result<AhuSolution, AhuError>> {
        scenarios
            .par_iter()
            .map(|scenario| self.solve(scenario.topology, &scenario.parameters, &scenario.inputs))
            .collect()
    }

    fn track_setpoint(
        &self,
        parameters: Parameters,
        boundary: &BoundaryConditions,
        variable: SearchVariable,
        controlled: ControlledOutput,
    ) -> Result<(Parameters, OperatingPoint, usize), AhuError> {
        let actuator = variable.actuator();
        let (lower, upper) = self.search_range(variable, &parameters)?;
        let search = RootSearch {
            lower,
            upper,
            initial: variable.position(&parameters),
            tolerance: self.settings.setpoint_tolerance,
            max_iterations: self.settings.max_iterations,
        };

        let root = find_root(
            |position| -> Result<_, AhuError> {
                let point = self.operating_point(&variable.moved_to(parameters, position), boundary)?;
                Ok((controlled.variable.measure(&point) - controlled.setpnt, point))
            },
            &search,
        )
        .map_err(|e| match e {
            RootSearchError::Evaluation(e) => e,
            RootSearchError::Unresponsive | RootSearchError::NoSignChange => {
                AhuError::NoFeasibleSolution {
                    controlled: controlled.variable,
                    actuator,
                    setpnt: controlled.setpnt,
                    lower,
                    upper,
                }
            }
            RootSearchError::NonConvergent {
                iterations,
                residual,
            } => AhuError::NonConvergent {
                process: IterativeProcess::SetpointSearch,
                iterations,
                residual,
            },
        })?;

        debug!(
            %actuator,
            position = root.x,
            residual = root.residual,
            evaluations = root.evaluations,
            "set-point reached"
        );

        Ok((
            variable.moved_to(parameters, root.x),
            root.value,
            root.evaluations,
        ))
    }

    fn search_range(
        &self,
        variable: SearchVariable,
        parameters: &Parameters,
    ) -> Result<(f64, f64), AhuError> {
        match variable {
            SearchVariable::BypassFactor => Ok((0., 1.)),
            SearchVariable::SupplyMassFlow => {
                let lower = parameters
                    .outdoor_mass_flow
                    .max(self.settings.min_supply_mass_flow);
                let upper = self.settings.max_supply_mass_flow;
                if lower >= upper {
                    return Err(AhuError::invalid_parameter(
                        "outdoor_mass_flow",
                        parameters.outdoor_mass_flow,
                        "leaves no room for the supply mass flow rate search",
                    ));
                }
                Ok((lower, upper))
            }
        }
    }
}

fn check_actuator_duties(state: &StateVector) -> Result<(), AhuError> {
    let cooling = state[Unknown::CoolingTotal];
    if cooling > DUTY_TOLERANCE {
        return Err(AhuError::InfeasibleActuatorDuty {
            actuator: Actuator::CoolingCoil,
            duty: cooling,
            constraint: "a cooling coil cannot add heat",
        });
    }
    let reheat = state[Unknown::ReheatSensible];
    if reheat < -DUTY_TOLERANCE {
        return Err(AhuError::InfeasibleActuatorDuty {
            actuator: Actuator::ReheatCoil,
            duty: reheat,
            constraint: "a reheat coil cannot remove heat",
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::air_handling_unit::parameters::SolverSettings;
    use approx::{assert_abs_diff_eq, assert_relative_eq};
    use pretty_assertions::assert_eq;
    use rstest::*;

    #[fixture]
    fn ahu() -> AirHandlingUnit {
        AirHandlingUnit::default()
    }

    #[fixture]
    fn parameters() -> Parameters {
        Parameters {
            supply_mass_flow: 3.1,
            outdoor_mass_flow: 1.,
            bypass_factor: 0.16,
            gain_temp: 1e10.into(),
            gain_humidity: 1e10.into(),
        }
    }

    #[fixture]
    fn inputs() -> Inputs {
        Inputs {
            temp_outdoor: 32.,
            rh_outdoor: 0.5,
            temp_zone_setpnt: 26.,
            rh_zone_setpnt: 0.5,
            infiltration_mass_flow: 1.35,
            ua_building: 675.,
            gains_sensible: 34_000.,
            gains_latent: 4_000.,
        }
    }

    fn humid_inputs(inputs: Inputs) -> Inputs {
        Inputs {
            rh_outdoor: 0.6,
            ..inputs
        }
    }

    #[rstest]
    fn should_hold_zone_temperature_and_humidity_with_reheat(
        ahu: AirHandlingUnit,
        parameters: Parameters,
        inputs: Inputs,
    ) {
        let solution = ahu
            .solve(Topology::CavReheat, &parameters, &humid_inputs(inputs))
            .unwrap();

        assert_abs_diff_eq!(solution.air_state(StatePoint::Zone).temp, 26., epsilon = 1e-4);
        assert_abs_diff_eq!(
            solution.air_state(StatePoint::Zone).rel_humidity,
            0.5,
            epsilon = 1e-4
        );
        assert_relative_eq!(solution.cooling_load(), -107_192.3, max_relative = 1e-4);
        assert_relative_eq!(solution.reheat_load(), 6_835.09, max_relative = 1e-3);
        assert_eq!(solution.setpoint_iterations, 0);
        assert_eq!(solution.coil_condition, CoilCondition::Wet);
    }

    #[rstest]
    fn should_refuse_negative_reheat(ahu: AirHandlingUnit, parameters: Parameters, inputs: Inputs) {
        let result = ahu.solve(Topology::CavReheat, &parameters, &inputs);

        match result {
            Err(AhuError::InfeasibleActuatorDuty { actuator, duty, .. }) => {
                assert_eq!(actuator, Actuator::ReheatCoil);
                assert_relative_eq!(duty, -3_719.76, max_relative = 1e-3);
            }
            other => panic!("expected an infeasible reheat duty, got {other:?}"),
        }
    }

    #[rstest]
    #[case::dry_coil_runaway(26., 0.4)]
    #[case::supersaturated_supply(28., 0.4)]
    fn should_report_coil_duty_before_air_states(
        ahu: AirHandlingUnit,
        parameters: Parameters,
        inputs: Inputs,
        #[case] temp_outdoor: f64,
        #[case] rh_outdoor: f64,
    ) {
        let inputs = Inputs {
            temp_outdoor,
            rh_outdoor,
            ..inputs
        };

        match ahu.solve(Topology::CavReheat, &parameters, &inputs) {
            Err(AhuError::InfeasibleActuatorDuty { actuator, duty, .. }) => {
                assert_eq!(actuator, Actuator::CoolingCoil);
                assert!(duty > 0.);
            }
            other => panic!("expected an infeasible coil duty, got {other:?}"),
        }
    }

    #[rstest]
    #[case::zone_humidity_above_one(Topology::VavZoneHumidity { setpnt: 1.5 })]
    #[case::negative_zone_humidity(Topology::VavZoneHumidity { setpnt: -0.2 })]
    #[case::nan_supply_temperature(Topology::VavSupplyTemp { setpnt: f64::NAN })]
    #[case::infinite_supply_temperature(Topology::VavReheat { setpnt: f64::INFINITY })]
    #[case::nan_zone_humidity_with_bypass(Topology::Vbp {
        controlled: ControlledOutput {
            variable: ControlledVariable::ZoneRelHumidity,
            setpnt: f64::NAN,
        },
    })]
    fn should_reject_invalid_setpoints(
        ahu: AirHandlingUnit,
        parameters: Parameters,
        inputs: Inputs,
        #[case] topology: Topology,
    ) {
        assert!(matches!(
            ahu.solve(topology, &parameters, &inputs),
            Err(AhuError::InvalidParameter { name: "setpnt", .. })
        ));
    }

    #[rstest]
    fn should_hold_topology_setpoint_whatever_zone_humidity_input(
        ahu: AirHandlingUnit,
        parameters: Parameters,
        inputs: Inputs,
    ) {
        let topology = Topology::VavZoneHumidity { setpnt: 0.5 };
        let solution = ahu.solve(topology, &parameters, &inputs).unwrap();

        let inputs = Inputs {
            rh_zone_setpnt: 0.4,
            ..inputs
        };
        let other = ahu.solve(topology, &parameters, &inputs).unwrap();

        assert_eq!(other.state, solution.state);
        assert_eq!(other.supply_mass_flow(), solution.supply_mass_flow());
    }

    #[rstest]
    fn should_let_zone_humidity_float_without_reheat(
        ahu: AirHandlingUnit,
        parameters: Parameters,
        inputs: Inputs,
    ) {
        let solution = ahu.solve(Topology::Cav, &parameters, &inputs).unwrap();

        assert_eq!(solution.parameters.gain_humidity, ControllerGain::DISABLED);
        assert_abs_diff_eq!(solution.reheat_load(), 0., epsilon = 1e-6);
        assert_abs_diff_eq!(solution.air_state(StatePoint::Zone).temp, 26., epsilon = 1e-4);
        assert_abs_diff_eq!(
            solution.air_state(StatePoint::Zone).rel_humidity,
            0.479809,
            epsilon = 1e-5
        );
        assert_relative_eq!(solution.cooling_load(), -84_834.35, max_relative = 1e-4);
        assert_relative_eq!(
            solution.air_state(StatePoint::Supply).temp,
            11.112917,
            max_relative = 1e-5
        );
    }

    #[rstest]
    fn should_hold_zone_humidity_with_bypass(
        ahu: AirHandlingUnit,
        parameters: Parameters,
        inputs: Inputs,
    ) {
        let topology = Topology::Vbp {
            controlled: ControlledOutput {
                variable: ControlledVariable::ZoneRelHumidity,
                setpnt: 0.5,
            },
        };
        let solution = ahu.solve(topology, &parameters, &inputs).unwrap();

        assert_abs_diff_eq!(solution.bypass_factor(), 0.034774, epsilon = 1e-3);
        assert_abs_diff_eq!(
            solution.air_state(StatePoint::Zone).rel_humidity,
            0.5,
            epsilon = 1e-4
        );
        assert_eq!(solution.supply_mass_flow(), 3.1);
        assert!(solution.setpoint_iterations > 1);
    }

    #[rstest]
    fn should_fail_to_hold_supply_temperature_with_bypass_at_constant_flow(
        ahu: AirHandlingUnit,
        parameters: Parameters,
        inputs: Inputs,
    ) {
        let parameters = Parameters {
            supply_mass_flow: 3.162,
            ..parameters
        };
        let topology = Topology::Vbp {
            controlled: ControlledOutput {
                variable: ControlledVariable::SupplyTemp,
                setpnt: 11.77,
            },
        };

        assert_eq!(
            ahu.solve(topology, &parameters, &inputs),
            Err(AhuError::NoFeasibleSolution {
                controlled: ControlledVariable::SupplyTemp,
                actuator: Actuator::BypassDamper,
                setpnt: 11.77,
                lower: 0.,
                upper: 1.,
            })
        );
    }

    #[rstest]
    fn should_hold_zone_humidity_with_supply_flow(
        ahu: AirHandlingUnit,
        parameters: Parameters,
        inputs: Inputs,
    ) {
        let solution = ahu
            .solve(
                Topology::VavZoneHumidity { setpnt: 0.5 },
                &parameters,
                &inputs,
            )
            .unwrap();

        assert_abs_diff_eq!(solution.supply_mass_flow(), 3.5274, epsilon = 2e-3);
        assert_abs_diff_eq!(
            solution.air_state(StatePoint::Zone).rel_humidity,
            0.5,
            epsilon = 1e-4
        );
        assert_relative_eq!(solution.cooling_load(), -82_307.99, max_relative = 1e-3);
        assert_relative_eq!(solution.supply_volume_flow, 2.8969, max_relative = 1e-3);
    }

    #[rstest]
    fn should_hold_supply_temperature_with_supply_flow(
        ahu: AirHandlingUnit,
        parameters: Parameters,
        inputs: Inputs,
    ) {
        let solution = ahu
            .solve(
                Topology::VavSupplyTemp { setpnt: 14. },
                &parameters,
                &inputs,
            )
            .unwrap();

        assert_abs_diff_eq!(solution.supply_mass_flow(), 3.8458, epsilon = 2e-3);
        assert_abs_diff_eq!(
            solution.air_state(StatePoint::Supply).temp,
            14.,
            epsilon = 1e-4
        );
        assert_abs_diff_eq!(solution.reheat_load(), 0., epsilon = 1e-6);
    }

    #[rstest]
    fn should_hold_supply_temperature_and_zone_humidity_with_reheat(
        ahu: AirHandlingUnit,
        parameters: Parameters,
        inputs: Inputs,
    ) {
        let solution = ahu
            .solve(
                Topology::VavReheat { setpnt: 14. },
                &parameters,
                &humid_inputs(inputs),
            )
            .unwrap();

        assert_abs_diff_eq!(solution.supply_mass_flow(), 3.8458, epsilon = 2e-3);
        assert_abs_diff_eq!(
            solution.air_state(StatePoint::Supply).temp,
            14.,
            epsilon = 1e-4
        );
        assert_abs_diff_eq!(
            solution.air_state(StatePoint::Zone).rel_humidity,
            0.5,
            epsilon = 2e-4
        );
        assert_relative_eq!(solution.reheat_load(), 12_304.4, max_relative = 1e-2);
    }

    #[rstest]
    fn should_reject_outdoor_flow_above_search_range(parameters: Parameters, inputs: Inputs) {
        let ahu = AirHandlingUnit::new(SolverSettings {
            max_supply_mass_flow: 0.9,
            ..Default::default()
        })
        .unwrap();

        assert!(matches!(
            ahu.solve(Topology::VavSupplyTemp { setpnt: 14. }, &parameters, &inputs),
            Err(AhuError::InvalidParameter {
                name: "outdoor_mass_flow",
                ..
            })
        ));
    }

    #[rstest]
    fn should_validate_before_solving(ahu: AirHandlingUnit, parameters: Parameters, inputs: Inputs) {
        let parameters = Parameters {
            bypass_factor: 1.5,
            ..parameters
        };

        assert!(matches!(
            ahu.solve(Topology::Cav, &parameters, &inputs),
            Err(AhuError::InvalidParameter {
                name: "bypass_factor",
                ..
            })
        ));
    }

    #[rstest]
    fn should_solve_scenarios_in_parallel_in_order(
        ahu: AirHandlingUnit,
        parameters: Parameters,
        inputs: Inputs,
    ) {
        let scenarios = [
            Scenario {
                topology: Topology::Cav,
                parameters,
                inputs,
            },
            Scenario {
                topology: Topology::CavReheat,
                parameters,
                inputs,
            },
            Scenario {
                topology: Topology::VavSupplyTemp { setpnt: 14. },
                parameters,
                inputs,
            },
        ];

        let results = ahu.solve_all(&scenarios);

        assert_eq!(results.len(), 3);
        assert_eq!(
            results[0],
            ahu.solve(Topology::Cav, &parameters, &inputs)
        );
        assert!(matches!(
            results[1],
            Err(AhuError::InfeasibleActuatorDuty { .. })
        ));
        assert_eq!(results[2].as_ref().unwrap().topology.number(), 5);
    }

    #[rstest]
    fn should_describe_topologies() {
        assert_eq!(Topology::CavReheat.to_string(), "CAV with reheat");
        assert_eq!(Topology::VavReheat { setpnt: 14. }.number(), 6);
        assert!(Topology::VavReheat { setpnt: 14. }.has_reheat());
        assert!(!Topology::VavSupplyTemp { setpnt: 14. }.has_reheat());
    }
}
