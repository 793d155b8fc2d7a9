mod balance;
mod linear;
pub mod parameters;
pub mod state;
pub mod topology;

use crate::core::psychrometrics::Psychrometrics;
use crate::errors::AhuError;
use parameters::SolverSettings;

/// Steady-state model of an air-handling unit serving a single thermal zone.
///
/// Holds only the numerical settings and the site pressure, so that one
/// instance can solve any number of independent scenarios, concurrently or not.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct AirHandlingUnit {
    settings: SolverSettings,
    psychrometrics: Psychrometrics,
}

impl AirHandlingUnit {
    pub fn new(settings: SolverSettings) -> Result<Self, AhuError> {
        settings.validate()?;

        Ok(Self {
            psychrometrics: Psychrometrics::at_altitude(settings.altitude),
            settings,
        })
    }

    pub fn settings(&self) -> &SolverSettings {
        &self.settings
    }

    pub fn psychrometrics(&self) -> &Psychrometrics {
        &self.psychrometrics
    }
}
