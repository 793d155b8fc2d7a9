use thiserror::Error;

/// Specific heat of dry air, in J / (kg.K)
pub const SPECIFIC_HEAT_DRY_AIR: f64 = 1_000.;
/// Latent heat of vaporisation of water at 0 deg C, in J / kg
pub const LATENT_HEAT_VAPORISATION: f64 = 2_496e3;
/// Molar mass of water vapour, in kg / kmol
pub const MOLAR_MASS_WATER_VAPOUR: f64 = 18.015_286;
/// Molar mass of dry air, in kg / kmol
pub const MOLAR_MASS_DRY_AIR: f64 = 28.966;
/// Universal gas constant, in J / (kmol.K)
pub const UNIVERSAL_GAS_CONSTANT: f64 = 8_314.462_618_153_24;
/// Standard atmospheric pressure at sea level, in Pa
pub const STANDARD_ATMOSPHERIC_PRESSURE: f64 = 101_325.;

pub(crate) const ZERO_CELSIUS_IN_KELVIN: f64 = 273.15;

pub(crate) fn celsius_to_kelvin(temp_c: f64) -> Result<f64, BelowAbsoluteZeroError> {
    if temp_c < -ZERO_CELSIUS_IN_KELVIN {
        Err(BelowAbsoluteZeroError::from_c(temp_c))
    } else {
        Ok(temp_c + ZERO_CELSIUS_IN_KELVIN)
    }
}

#[derive(Clone, Copy, Debug, Error, PartialEq)]
#[error("A temperature of {k}ºK/{}ºC was encountered, which is less than absolute zero", k - ZERO_CELSIUS_IN_KELVIN)]
pub struct BelowAbsoluteZeroError {
    k: f64,
}

impl BelowAbsoluteZeroError {
    fn from_c(c: f64) -> Self {
        Self {
            k: c + ZERO_CELSIUS_IN_KELVIN,
        }
    }
}
