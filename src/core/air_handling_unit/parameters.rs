use crate::core::psychrometrics::ALTITUDE_RANGE;
use crate::errors::AhuError;
use serde::Deserialize;

/// Gain of a proportional controller closing one actuator loop.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ControllerGain {
    /// actuator duty = gain × error, in W per unit of the controlled variable (0 disables the loop)
    Proportional(f64),
    /// ideal controller: the controlled variable is pinned to its set-point
    Exact,
}

impl ControllerGain {
    pub const DISABLED: Self = Self::Proportional(0.);

    pub fn is_disabled(&self) -> bool {
        matches!(self, Self::Proportional(gain) if *gain == 0.)
    }

    fn validate(&self, name: &'static str) -> Result<(), AhuError> {
        match self {
            Self::Proportional(gain) if !gain.is_finite() || *gain < 0. => Err(
                AhuError::invalid_parameter(name, *gain, "gain must be finite and non-negative"),
            ),
            _ => Ok(()),
        }
    }
}

impl From<f64> for ControllerGain {
    fn from(gain: f64) -> Self {
        Self::Proportional(gain)
    }
}

/// Operating parameters of the air-handling unit, fixed for the duration of a solve.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Parameters {
    /// supply air mass flow rate m, in kg/s
    pub supply_mass_flow: f64,
    /// outdoor (fresh) air mass flow rate mo, in kg/s; m - mo is recirculated
    pub outdoor_mass_flow: f64,
    /// fraction β of the supply air that bypasses the cooling coil
    pub bypass_factor: f64,
    /// gain Kθ of the zone temperature loop acting on the cooling coil
    pub gain_temp: ControllerGain,
    /// gain Kw of the zone humidity loop acting on the reheat coil
    pub gain_humidity: ControllerGain,
}

impl Parameters {
    pub(crate) fn validate(&self) -> Result<(), AhuError> {
        if !(self.supply_mass_flow.is_finite() && self.supply_mass_flow > 0.) {
            return Err(AhuError::invalid_parameter(
                "supply_mass_flow",
                self.supply_mass_flow,
                "must be positive",
            ));
        }
        if !(0. ..=self.supply_mass_flow).contains(&self.outdoor_mass_flow) {
            return Err(AhuError::invalid_parameter(
                "outdoor_mass_flow",
                self.outdoor_mass_flow,
                "must lie between 0 and the supply mass flow rate",
            ));
        }
        if !(0. ..=1.).contains(&self.bypass_factor) {
            return Err(AhuError::invalid_parameter(
                "bypass_factor",
                self.bypass_factor,
                "must lie in [0, 1]",
            ));
        }
        self.gain_temp.validate("gain_temp")?;
        self.gain_humidity.validate("gain_humidity")
    }

    pub(crate) fn with_supply_mass_flow(self, supply_mass_flow: f64) -> Self {
        Self {
            supply_mass_flow,
            ..self
        }
    }

    pub(crate) fn with_bypass_factor(self, bypass_factor: f64) -> Self {
        Self {
            bypass_factor,
            ..self
        }
    }
}

/// Outdoor conditions, zone set-points and zone loads for one solve.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Inputs {
    /// outdoor air temperature θo, in deg C
    pub temp_outdoor: f64,
    /// outdoor relative humidity φo
    pub rh_outdoor: f64,
    /// zone temperature set-point θ5sp, in deg C
    pub temp_zone_setpnt: f64,
    /// zone relative humidity set-point φ5sp
    pub rh_zone_setpnt: f64,
    /// infiltration mass flow rate mi, in kg/s
    pub infiltration_mass_flow: f64,
    /// overall heat transfer coefficient of the building envelope UA, in W/K
    pub ua_building: f64,
    /// auxiliary sensible heat gains QsBL, in W
    pub gains_sensible: f64,
    /// auxiliary latent heat gains QlBL, in W
    pub gains_latent: f64,
}

impl Inputs {
    pub(crate) fn validate(&self) -> Result<(), AhuError> {
        for (name, value) in [
            ("temp_outdoor", self.temp_outdoor),
            ("temp_zone_setpnt", self.temp_zone_setpnt),
            ("gains_sensible", self.gains_sensible),
            ("gains_latent", self.gains_latent),
        ] {
            if !value.is_finite() {
                return Err(AhuError::invalid_parameter(name, value, "must be finite"));
            }
        }
        for (name, value) in [
            ("rh_outdoor", self.rh_outdoor),
            ("rh_zone_setpnt", self.rh_zone_setpnt),
        ] {
            if !(0. ..=1.).contains(&value) {
                return Err(AhuError::invalid_parameter(name, value, "must lie in [0, 1]"));
            }
        }
        for (name, value) in [
            ("infiltration_mass_flow", self.infiltration_mass_flow),
            ("ua_building", self.ua_building),
        ] {
            if !(value.is_finite() && value >= 0.) {
                return Err(AhuError::invalid_parameter(name, value, "must be non-negative"));
            }
        }

        Ok(())
    }
}

/// Numerical settings shared by every solve of an [`AirHandlingUnit`](super::AirHandlingUnit).
#[derive(Clone, Copy, Debug, Deserialize, PartialEq)]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
#[serde(default, deny_unknown_fields)]
pub struct SolverSettings {
    /// altitude of the site, in m, setting the atmospheric pressure
    pub altitude: f64,
    /// accepted deviation of a controlled output from its set-point, in the units of that output
    pub setpoint_tolerance: f64,
    /// iteration budget of the set-point search
    pub max_iterations: usize,
    /// accepted change of the apparatus dew point between two linearisations, in deg C
    pub apparatus_dew_point_tolerance: f64,
    pub max_apparatus_dew_point_iterations: usize,
    /// upper edge of the supply mass flow search, in kg/s
    pub max_supply_mass_flow: f64,
    /// lower edge of the supply mass flow search, in kg/s
    pub min_supply_mass_flow: f64,
}

impl Default for SolverSettings {
    fn default() -> Self {
        Self {
            altitude: 0.,
            setpoint_tolerance: 1e-4,
            max_iterations: 100,
            apparatus_dew_point_tolerance: 1e-4,
            max_apparatus_dew_point_iterations: 50,
            max_supply_mass_flow: 10.,
            min_supply_mass_flow: 0.01,
        }
    }
}

impl SolverSettings {
    pub(crate) fn validate(&self) -> Result<(), AhuError> {
        let (lowest, highest) = ALTITUDE_RANGE;
        if !(lowest..=highest).contains(&self.altitude) {
            return Err(AhuError::invalid_parameter(
                "altitude",
                self.altitude,
                "outside the range of the standard atmosphere relation",
            ));
        }
        for (name, value) in [
            ("setpoint_tolerance", self.setpoint_tolerance),
            (
                "apparatus_dew_point_tolerance",
                self.apparatus_dew_point_tolerance,
            ),
            ("min_supply_mass_flow", self.min_supply_mass_flow),
        ] {
            if !(value.is_finite() && value > 0.) {
                return Err(AhuError::invalid_parameter(name, value, "must be positive"));
            }
        }
        if !(self.max_supply_mass_flow.is_finite()
            && self.max_supply_mass_flow > self.min_supply_mass_flow)
        {
            return Err(AhuError::invalid_parameter(
                "max_supply_mass_flow",
                self.max_supply_mass_flow,
                "must exceed the minimum supply mass flow rate",
            ));
        }
        for (name, value) in [
            ("max_iterations", self.max_iterations),
            (
                "max_apparatus_dew_point_iterations",
                self.max_apparatus_dew_point_iterations,
            ),
        ] {
            if value == 0 {
                return Err(AhuError::invalid_parameter(
                    name,
                    value as f64,
                    "at least one iteration is needed",
                ));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::*;

    #[fixture]
    fn parameters() -> Parameters {
        Parameters {
            supply_mass_flow: 3.1,
            outdoor_mass_flow: 1.,
            bypass_factor: 0.16,
            gain_temp: ControllerGain::Exact,
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

    #[rstest]
    fn should_accept_documented_defaults(parameters: Parameters, inputs: Inputs) {
        assert!(parameters.validate().is_ok());
        assert!(inputs.validate().is_ok());
        assert!(SolverSettings::default().validate().is_ok());
    }

    #[rstest]
    fn should_reject_parameters_outside_their_domain(parameters: Parameters) {
        for (invalid, expected_name) in [
            (
                Parameters {
                    supply_mass_flow: 0.,
                    ..parameters
                },
                "supply_mass_flow",
            ),
            (
                Parameters {
                    outdoor_mass_flow: 3.2,
                    ..parameters
                },
                "outdoor_mass_flow",
            ),
            (
                Parameters {
                    bypass_factor: -0.1,
                    ..parameters
                },
                "bypass_factor",
            ),
            (
                Parameters {
                    bypass_factor: 1.01,
                    ..parameters
                },
                "bypass_factor",
            ),
            (
                Parameters {
                    gain_humidity: (-1.).into(),
                    ..parameters
                },
                "gain_humidity",
            ),
            (
                Parameters {
                    gain_temp: f64::NAN.into(),
                    ..parameters
                },
                "gain_temp",
            ),
        ] {
            assert!(matches!(
                invalid.validate(),
                Err(AhuError::InvalidParameter { name, .. }) if name == expected_name
            ));
        }
    }

    #[rstest]
    fn should_reject_inputs_outside_their_domain(inputs: Inputs) {
        for (invalid, expected_name) in [
            (
                Inputs {
                    rh_outdoor: 1.2,
                    ..inputs
                },
                "rh_outdoor",
            ),
            (
                Inputs {
                    rh_zone_setpnt: -0.1,
                    ..inputs
                },
                "rh_zone_setpnt",
            ),
            (
                Inputs {
                    ua_building: -675.,
                    ..inputs
                },
                "ua_building",
            ),
            (
                Inputs {
                    temp_outdoor: f64::INFINITY,
                    ..inputs
                },
                "temp_outdoor",
            ),
        ] {
            assert!(matches!(
                invalid.validate(),
                Err(AhuError::InvalidParameter { name, .. }) if name == expected_name
            ));
        }
    }

    #[rstest]
    fn should_reject_inconsistent_solver_settings() {
        let settings = SolverSettings {
            max_supply_mass_flow: 0.005,
            ..Default::default()
        };
        assert!(settings.validate().is_err());

        let settings = SolverSettings {
            altitude: 12_000.,
            ..Default::default()
        };
        assert!(settings.validate().is_err());
    }

    #[rstest]
    fn should_recognise_disabled_loops() {
        assert!(ControllerGain::DISABLED.is_disabled());
        assert!(ControllerGain::from(0.).is_disabled());
        assert!(!ControllerGain::Exact.is_disabled());
        assert!(!ControllerGain::from(1e10).is_disabled());
    }
}
