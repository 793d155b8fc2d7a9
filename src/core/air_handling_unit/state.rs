use crate::core::psychrometrics::AirState;
use nalgebra::DVector;
use std::ops::Index;
use strum::{Display, EnumCount, EnumIter};

/// Unknowns of the balance system, in the order of the state vector.
#[derive(Clone, Copy, Debug, EnumCount, EnumIter, PartialEq, Eq)]
pub enum Unknown {
    /// θ1, mixed air temperature, in deg C
    TempMixed,
    /// w1, mixed air humidity ratio, in kg/kg
    HumidityMixed,
    /// θ2, temperature of the air leaving the coil surface, in deg C
    TempCoil,
    /// w2
    HumidityCoil,
    /// θ3, temperature after the bypass rejoins the coil air, in deg C
    TempBypassed,
    /// w3
    HumidityBypassed,
    /// θ4, supply air temperature, in deg C
    TempSupply,
    /// w4
    HumiditySupply,
    /// θ5, zone air temperature, in deg C
    TempZone,
    /// w5
    HumidityZone,
    /// QsCC, sensible load of the cooling coil, in W (negative when cooling)
    CoolingSensible,
    /// QlCC, latent load of the cooling coil, in W (negative when dehumidifying)
    CoolingLatent,
    /// QtCC, total load of the cooling coil, in W
    CoolingTotal,
    /// QsHC, sensible load of the reheat coil, in W
    ReheatSensible,
    /// QsTZ, sensible load delivered to the zone by the supply air, in W
    ZoneSensible,
    /// QlTZ, latent load delivered to the zone by the supply air, in W
    ZoneLatent,
}

impl Unknown {
    pub(crate) const fn index(self) -> usize {
        self as usize
    }
}

/// Points of the air path at which the moist-air state is reported.
#[derive(Clone, Copy, Debug, Display, EnumCount, EnumIter, PartialEq, Eq, Hash)]
pub enum StatePoint {
    #[strum(to_string = "outdoor air (o)")]
    Outdoor,
    #[strum(to_string = "mixed air (1)")]
    Mixed,
    #[strum(to_string = "coil leaving air (2)")]
    CoilLeaving,
    #[strum(to_string = "bypass mixed air (3)")]
    Bypassed,
    #[strum(to_string = "supply air (4)")]
    Supply,
    #[strum(to_string = "zone air (5)")]
    Zone,
}

impl StatePoint {
    /// Unknowns holding the temperature and humidity ratio at this point, if solved for.
    pub(crate) fn unknowns(&self) -> Option<(Unknown, Unknown)> {
        match self {
            Self::Outdoor => None,
            Self::Mixed => Some((Unknown::TempMixed, Unknown::HumidityMixed)),
            Self::CoilLeaving => Some((Unknown::TempCoil, Unknown::HumidityCoil)),
            Self::Bypassed => Some((Unknown::TempBypassed, Unknown::HumidityBypassed)),
            Self::Supply => Some((Unknown::TempSupply, Unknown::HumiditySupply)),
            Self::Zone => Some((Unknown::TempZone, Unknown::HumidityZone)),
        }
    }

    pub fn short_name(&self) -> &'static str {
        match self {
            Self::Outdoor => "o",
            Self::Mixed => "1",
            Self::CoilLeaving => "2",
            Self::Bypassed => "3",
            Self::Supply => "4",
            Self::Zone => "5",
        }
    }
}

/// Solution of the balance system.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StateVector([f64; Unknown::COUNT]);

impl StateVector {
    pub(crate) fn from_solution(solution: &DVector<f64>) -> Option<Self> {
        let values: [f64; Unknown::COUNT] = solution.as_slice().try_into().ok()?;
        values.iter().all(|value| value.is_finite()).then_some(Self(values))
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }
}

impl Index<Unknown> for StateVector {
    type Output = f64;

    fn index(&self, unknown: Unknown) -> &Self::Output {
        &self.0[unknown.index()]
    }
}

/// Whether the cooling coil condenses moisture out of the air.
#[derive(Clone, Copy, Debug, Display, PartialEq, Eq)]
#[strum(serialize_all = "lowercase")]
pub enum CoilCondition {
    /// air leaves the coil surface saturated, at the apparatus dew point
    Wet,
    /// sensible cooling only, the coil surface stays above the dew point of the entering air
    Dry,
}

/// Air states at every point of the air path, indexed by [`StatePoint`].
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct AirStates([AirState; StatePoint::COUNT]);

impl AirStates {
    pub(crate) fn set(&mut self, point: StatePoint, state: AirState) {
        self.0[point as usize] = state;
    }
}

impl Index<StatePoint> for AirStates {
    type Output = AirState;

    fn index(&self, point: StatePoint) -> &Self::Output {
        &self.0[point as usize]
    }
}

/// Converged solution of the balances for one set of parameters.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct OperatingPoint {
    pub(crate) state: StateVector,
    pub(crate) air_states: AirStates,
    pub(crate) coil_condition: CoilCondition,
    pub(crate) adp_iterations: usize,
}
