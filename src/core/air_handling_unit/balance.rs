// Steady-state mass and energy balances of the air-handling unit, written as
// a linear system A.x = b over the state vector (see `Unknown`).
//
//  o --mo--> [mixing box] --m--> [cooling coil, bypass β] --> [reheat coil] --> [zone] --+
//               ^                                                                        |
//               +------------------------------- m - mo ---------------------------------+

use super::parameters::{ControllerGain, Inputs, Parameters};
use super::state::{StatePoint, Unknown};
use crate::core::psychrometrics::Psychrometrics;
use crate::core::units::{LATENT_HEAT_VAPORISATION, SPECIFIC_HEAT_DRY_AIR};
use crate::errors::AhuError;
use nalgebra::{DMatrix, DVector};
use strum::EnumCount;

/// Rows of the balance system.
#[derive(Clone, Copy, Debug, EnumCount)]
enum Balance {
    MixingSensible,
    MixingLatent,
    CoilSensible,
    CoilLatent,
    CoilTotal,
    CoilSurface,
    BypassSensible,
    BypassLatent,
    ReheatSensible,
    ReheatLatent,
    SupplySensible,
    SupplyLatent,
    ZoneSensible,
    ZoneLatent,
    TempController,
    HumidityController,
}

const _: () = assert!(Balance::COUNT == Unknown::COUNT);

/// Model of the air leaving the coil surface.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) enum CoilSurface {
    /// saturated, with the saturation curve linearised around this temperature (deg C)
    Wet { temp_linearisation: f64 },
    /// no condensation, the humidity ratio is unchanged across the coil
    Dry,
}

/// Inputs of a solve expressed in the quantities the balances use.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct BoundaryConditions {
    pub(crate) temp_outdoor: f64,
    pub(crate) humidity_outdoor: f64,
    temp_zone_setpnt: f64,
    humidity_zone_setpnt: f64,
    infiltration_mass_flow: f64,
    ua_building: f64,
    gains_sensible: f64,
    gains_latent: f64,
}

impl BoundaryConditions {
    pub(crate) fn new(inputs: &Inputs, psychrometrics: &Psychrometrics) -> Result<Self, AhuError> {
        let humidity_outdoor = psychrometrics
            .humidity_ratio(inputs.temp_outdoor, inputs.rh_outdoor)
            .map_err(|source| AhuError::InfeasibleMoistAirState {
                location: StatePoint::Outdoor,
                source,
            })?;
        let humidity_zone_setpnt = psychrometrics
            .humidity_ratio(inputs.temp_zone_setpnt, inputs.rh_zone_setpnt)
            .map_err(|source| AhuError::InfeasibleMoistAirState {
                location: StatePoint::Zone,
                source,
            })?;

        Ok(Self {
            temp_outdoor: inputs.temp_outdoor,
            humidity_outdoor,
            temp_zone_setpnt: inputs.temp_zone_setpnt,
            humidity_zone_setpnt,
            infiltration_mass_flow: inputs.infiltration_mass_flow,
            ua_building: inputs.ua_building,
            gains_sensible: inputs.gains_sensible,
            gains_latent: inputs.gains_latent,
        })
    }
}

#[derive(Clone, Debug, PartialEq)]
pub(crate) struct BalanceSystem {
    pub(crate) matrix: DMatrix<f64>,
    pub(crate) rhs: DVector<f64>,
}

impl BalanceSystem {
    fn new() -> Self {
        Self {
            matrix: DMatrix::zeros(Balance::COUNT, Unknown::COUNT),
            rhs: DVector::zeros(Balance::COUNT),
        }
    }

    fn coefficients(&mut self, row: Balance, terms: &[(Unknown, f64)]) -> &mut Self {
        for (unknown, coefficient) in terms {
            self.matrix[(row as usize, unknown.index())] = *coefficient;
        }
        self
    }

    fn constant(&mut self, row: Balance, value: f64) {
        self.rhs[row as usize] = value;
    }
}

/// Assemble the balances for fixed parameters and coil surface model.
///
/// Arguments:
/// * `parameters` - mass flow rates, bypass factor and controller gains
/// * `boundary` - outdoor air, set-points and zone loads
/// * `coil` - whether the air leaves the coil surface saturated or unchanged in humidity
/// * `psychrometrics` - moist-air properties at the site pressure
pub(crate) fn assemble(
    parameters: &Parameters,
    boundary: &BoundaryConditions,
    coil: CoilSurface,
    psychrometrics: &Psychrometrics,
) -> Result<BalanceSystem, AhuError> {
    use Unknown::*;

    let c = SPECIFIC_HEAT_DRY_AIR;
    let l = LATENT_HEAT_VAPORISATION;
    let m = parameters.supply_mass_flow;
    let mo = parameters.outdoor_mass_flow;
    let beta = parameters.bypass_factor;
    let m_coil = (1. - beta) * m;
    let mi = boundary.infiltration_mass_flow;
    let ua = boundary.ua_building;

    let mut system = BalanceSystem::new();

    // mixing box: outdoor air and recirculated zone air
    system
        .coefficients(
            Balance::MixingSensible,
            &[(TempMixed, m * c), (TempZone, -(m - mo) * c)],
        )
        .constant(Balance::MixingSensible, mo * c * boundary.temp_outdoor);
    system
        .coefficients(
            Balance::MixingLatent,
            &[(HumidityMixed, m * l), (HumidityZone, -(m - mo) * l)],
        )
        .constant(Balance::MixingLatent, mo * l * boundary.humidity_outdoor);

    // cooling coil, on the share of the air in contact with its surface
    system.coefficients(
        Balance::CoilSensible,
        &[
            (TempCoil, m_coil * c),
            (TempMixed, -m_coil * c),
            (CoolingSensible, -1.),
        ],
    );
    system.coefficients(
        Balance::CoilLatent,
        &[
            (HumidityCoil, m_coil * l),
            (HumidityMixed, -m_coil * l),
            (CoolingLatent, -1.),
        ],
    );
    system.coefficients(
        Balance::CoilTotal,
        &[
            (CoolingSensible, 1.),
            (CoolingLatent, 1.),
            (CoolingTotal, -1.),
        ],
    );
    match coil {
        CoilSurface::Wet { temp_linearisation } => {
            let humidity_sat = psychrometrics
                .saturation_humidity_ratio(temp_linearisation)
                .map_err(|source| AhuError::InfeasibleMoistAirState {
                    location: StatePoint::CoilLeaving,
                    source,
                })?;
            let slope = psychrometrics.saturation_slope(temp_linearisation);
            system
                .coefficients(
                    Balance::CoilSurface,
                    &[(HumidityCoil, 1.), (TempCoil, -slope)],
                )
                .constant(
                    Balance::CoilSurface,
                    humidity_sat - slope * temp_linearisation,
                );
        }
        CoilSurface::Dry => {
            system.coefficients(
                Balance::CoilSurface,
                &[(HumidityCoil, 1.), (HumidityMixed, -1.)],
            );
        }
    }

    // bypassed air rejoins the air leaving the coil surface
    system.coefficients(
        Balance::BypassSensible,
        &[
            (TempBypassed, m * c),
            (TempMixed, -beta * m * c),
            (TempCoil, -m_coil * c),
        ],
    );
    system.coefficients(
        Balance::BypassLatent,
        &[
            (HumidityBypassed, m * l),
            (HumidityMixed, -beta * m * l),
            (HumidityCoil, -m_coil * l),
        ],
    );

    // reheat coil is sensible only
    system.coefficients(
        Balance::ReheatSensible,
        &[
            (TempSupply, m * c),
            (TempBypassed, -m * c),
            (ReheatSensible, -1.),
        ],
    );
    system.coefficients(
        Balance::ReheatLatent,
        &[(HumiditySupply, 1.), (HumidityBypassed, -1.)],
    );

    // loads carried by the supply air into the zone
    system.coefficients(
        Balance::SupplySensible,
        &[(TempSupply, m * c), (TempZone, -m * c), (ZoneSensible, -1.)],
    );
    system.coefficients(
        Balance::SupplyLatent,
        &[
            (HumiditySupply, m * l),
            (HumidityZone, -m * l),
            (ZoneLatent, -1.),
        ],
    );

    // zone: supply air, envelope, infiltration and auxiliary gains
    system
        .coefficients(
            Balance::ZoneSensible,
            &[(ZoneSensible, 1.), (TempZone, -(ua + mi * c))],
        )
        .constant(
            Balance::ZoneSensible,
            -(ua + mi * c) * boundary.temp_outdoor - boundary.gains_sensible,
        );
    system
        .coefficients(
            Balance::ZoneLatent,
            &[(ZoneLatent, 1.), (HumidityZone, -mi * l)],
        )
        .constant(
            Balance::ZoneLatent,
            -mi * l * boundary.humidity_outdoor - boundary.gains_latent,
        );

    // zone temperature loop, direct acting on the cooling coil: QtCC = Kθ.(θ5sp - θ5)
    match parameters.gain_temp {
        ControllerGain::Proportional(gain) => system
            .coefficients(
                Balance::TempController,
                &[(CoolingTotal, 1.), (TempZone, gain)],
            )
            .constant(Balance::TempController, gain * boundary.temp_zone_setpnt),
        ControllerGain::Exact => system
            .coefficients(Balance::TempController, &[(TempZone, 1.)])
            .constant(Balance::TempController, boundary.temp_zone_setpnt),
    }

    // zone humidity loop, reverse acting on the reheat coil: QsHC = Kw.(w5 - w5sp)
    match parameters.gain_humidity {
        ControllerGain::Proportional(gain) => system
            .coefficients(
                Balance::HumidityController,
                &[(ReheatSensible, 1.), (HumidityZone, -gain)],
            )
            .constant(
                Balance::HumidityController,
                -gain * boundary.humidity_zone_setpnt,
            ),
        ControllerGain::Exact => system
            .coefficients(Balance::HumidityController, &[(HumidityZone, 1.)])
            .constant(
                Balance::HumidityController,
                boundary.humidity_zone_setpnt,
            ),
    }

    Ok(system)
}
