// This module provides the properties of moist air (dry air and water vapour
// mixtures) at a fixed atmospheric pressure.
// Saturation pressure over liquid water follows ASHRAE Fundamentals (2017), ch. 1, eq. (6).

use crate::core::units::{
    celsius_to_kelvin, BelowAbsoluteZeroError, LATENT_HEAT_VAPORISATION, MOLAR_MASS_DRY_AIR,
    MOLAR_MASS_WATER_VAPOUR, SPECIFIC_HEAT_DRY_AIR, STANDARD_ATMOSPHERIC_PRESSURE,
    UNIVERSAL_GAS_CONSTANT, ZERO_CELSIUS_IN_KELVIN,
};
use thiserror::Error;

// Coefficients of the saturation pressure correlation, valid from 0 to 200 deg C
const C8: f64 = -5.800_220_6e3;
const C9: f64 = 1.391_499_3e0;
const C10: f64 = -4.864_023_9e-2;
const C11: f64 = 4.176_476_8e-5;
const C12: f64 = -1.445_209_3e-8;
const C13: f64 = 6.545_967_3e0;

// Tetens form of the saturation curve (Murray, 1967), used for its slope
const TETENS_A: f64 = 17.269_388_2;
const TETENS_B: f64 = 273.16 - 35.86;
const TETENS_C: f64 = 610.78;

/// Altitude range over which the standard atmosphere relation is applied, in m
pub const ALTITUDE_RANGE: (f64, f64) = (-500., 10_000.);

/// Relative humidity above 1 accepted as saturated rather than supersaturated
pub(crate) const SATURATION_TOLERANCE: f64 = 1e-5;

const RATIO_MOLAR_MASSES: f64 = MOLAR_MASS_WATER_VAPOUR / MOLAR_MASS_DRY_AIR;

#[derive(Clone, Copy, Debug, Error, PartialEq)]
pub enum MoistAirError {
    #[error("relative humidity of {rel_humidity} exceeds saturation at {temp} ºC")]
    Supersaturated { temp: f64, rel_humidity: f64 },
    #[error("humidity ratio of {humidity_ratio} kg/kg is negative")]
    NegativeHumidityRatio { humidity_ratio: f64 },
    #[error("relative humidity of {0} is outside [0, 1]")]
    RelativeHumidityOutOfRange(f64),
    #[error("vapour pressure at {temp} ºC reaches the atmospheric pressure")]
    VapourPressureAboveAtmospheric { temp: f64 },
    #[error(transparent)]
    BelowAbsoluteZero(#[from] BelowAbsoluteZeroError),
}

/// Atmospheric pressure as a function of altitude, in Pa
///
/// Arguments:
/// * `altitude` - altitude above sea level, in m (valid from -500 to 10000 m)
pub fn atmospheric_pressure(altitude: f64) -> f64 {
    STANDARD_ATMOSPHERIC_PRESSURE * (1. - 2.25577e-5 * altitude).powf(5.2559)
}

/// Saturation vapour pressure over liquid water, in Pa
///
/// Arguments:
/// * `temp` - dry-bulb temperature, in deg C
pub fn saturation_vapour_pressure(temp: f64) -> Result<f64, BelowAbsoluteZeroError> {
    let t = celsius_to_kelvin(temp)?;
    Ok((C8 / t + C9 + C10 * t + C11 * t.powi(2) + C12 * t.powi(3) + C13 * t.ln()).exp())
}

/// Specific enthalpy of moist air, in J per kg of dry air
///
/// Uses the linearised form h = c.θ + l.w, consistent with the balance equations.
pub fn enthalpy(temp: f64, humidity_ratio: f64) -> f64 {
    SPECIFIC_HEAT_DRY_AIR * temp + LATENT_HEAT_VAPORISATION * humidity_ratio
}

/// State of moist air at a point of the air-handling unit.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct AirState {
    /// dry-bulb temperature, in deg C
    pub temp: f64,
    /// humidity ratio, in kg of vapour per kg of dry air
    pub humidity_ratio: f64,
    /// relative humidity, between 0 and 1
    pub rel_humidity: f64,
    /// specific enthalpy, in J per kg of dry air
    pub enthalpy: f64,
}

/// Psychrometric functions evaluated at a fixed atmospheric pressure.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Psychrometrics {
    pressure: f64,
}

impl Default for Psychrometrics {
    fn default() -> Self {
        Self {
            pressure: STANDARD_ATMOSPHERIC_PRESSURE,
        }
    }
}

impl Psychrometrics {
    pub fn at_altitude(altitude: f64) -> Self {
        Self {
            pressure: atmospheric_pressure(altitude),
        }
    }

    /// atmospheric pressure, in Pa
    pub fn pressure(&self) -> f64 {
        self.pressure
    }

    /// Humidity ratio for a given temperature and relative humidity, in kg/kg
    ///
    /// Arguments:
    /// * `temp` - dry-bulb temperature, in deg C
    /// * `rel_humidity` - relative humidity, between 0 and 1
    pub fn humidity_ratio(&self, temp: f64, rel_humidity: f64) -> Result<f64, MoistAirError> {
        if !(0. ..=1.).contains(&rel_humidity) {
            return Err(MoistAirError::RelativeHumidityOutOfRange(rel_humidity));
        }
        let p_vapour = rel_humidity * saturation_vapour_pressure(temp)?;
        if p_vapour >= self.pressure {
            return Err(MoistAirError::VapourPressureAboveAtmospheric { temp });
        }

        Ok(RATIO_MOLAR_MASSES * p_vapour / (self.pressure - p_vapour))
    }

    /// Humidity ratio of saturated air, in kg/kg
    pub fn saturation_humidity_ratio(&self, temp: f64) -> Result<f64, MoistAirError> {
        self.humidity_ratio(temp, 1.)
    }

    /// Relative humidity for a given temperature and humidity ratio
    ///
    /// The value is not clipped: a result above 1 denotes supersaturated air.
    ///
    /// Arguments:
    /// * `temp` - dry-bulb temperature, in deg C
    /// * `humidity_ratio` - humidity ratio, in kg/kg
    pub fn rel_humidity(&self, temp: f64, humidity_ratio: f64) -> Result<f64, MoistAirError> {
        if humidity_ratio < 0. {
            return Err(MoistAirError::NegativeHumidityRatio { humidity_ratio });
        }

        Ok(self.pressure * humidity_ratio
            / ((RATIO_MOLAR_MASSES + humidity_ratio) * saturation_vapour_pressure(temp)?))
    }

    /// Slope of the saturation curve dws/dθ at a temperature on that curve, in kg/(kg.K)
    ///
    /// Arguments:
    /// * `temp_sat` - temperature on the saturation curve, in deg C
    pub fn saturation_slope(&self, temp_sat: f64) -> f64 {
        let p_sat = TETENS_C * (TETENS_A * temp_sat / (temp_sat + TETENS_B)).exp();

        RATIO_MOLAR_MASSES * TETENS_A * TETENS_B * self.pressure * p_sat
            / ((temp_sat + TETENS_B).powi(2) * (self.pressure - p_sat).powi(2))
    }

    /// Specific volume of moist air, in m3 per kg of dry air
    pub fn specific_volume(&self, temp: f64, humidity_ratio: f64) -> f64 {
        UNIVERSAL_GAS_CONSTANT / MOLAR_MASS_WATER_VAPOUR
            * (RATIO_MOLAR_MASSES + humidity_ratio)
            * (temp + ZERO_CELSIUS_IN_KELVIN)
            / self.pressure
    }

    /// Air state from temperature and relative humidity
    pub fn state_from_rel_humidity(
        &self,
        temp: f64,
        rel_humidity: f64,
    ) -> Result<AirState, MoistAirError> {
        let humidity_ratio = self.humidity_ratio(temp, rel_humidity)?;

        Ok(AirState {
            temp,
            humidity_ratio,
            rel_humidity,
            enthalpy: enthalpy(temp, humidity_ratio),
        })
    }

    /// Air state from temperature and humidity ratio
    ///
    /// Fails when the humidity ratio is negative or when the air would be
    /// supersaturated at this temperature.
    pub fn state_from_humidity_ratio(
        &self,
        temp: f64,
        humidity_ratio: f64,
    ) -> Result<AirState, MoistAirError> {
        let rel_humidity = self.rel_humidity(temp, humidity_ratio)?;
        if rel_humidity > 1. + SATURATION_TOLERANCE {
            return Err(MoistAirError::Supersaturated { temp, rel_humidity });
        }

        Ok(AirState {
            temp,
            humidity_ratio,
            rel_humidity,
            enthalpy: enthalpy(temp, humidity_ratio),
        })
    }
}
