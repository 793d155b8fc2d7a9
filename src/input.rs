use crate::core::air_handling_unit::parameters::{
    ControllerGain, Inputs, Parameters, SolverSettings,
};
use crate::core::air_handling_unit::topology::{
    ControlledOutput, ControlledVariable, Scenario, Topology,
};
use indexmap::IndexMap;
use serde::Deserialize;
use std::io::{BufReader, Read};

pub fn ingest_scenarios(json: impl Read) -> Result<ScenarioFile, anyhow::Error> {
    let reader = BufReader::new(json);

    Ok(serde_json::from_reader(reader)?)
}

/// A batch of independent air-handling unit solves sharing one set of solver settings.
#[derive(Debug, Deserialize)]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
#[serde(deny_unknown_fields)]
pub struct ScenarioFile {
    #[serde(default)]
    pub settings: SolverSettings,
    /// scenarios by name, solved and reported in the order given
    pub scenarios: IndexMap<String, ScenarioInput>,
}

impl ScenarioFile {
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.scenarios.keys().map(String::as_str)
    }

    pub fn to_scenarios(&self) -> Vec<Scenario> {
        self.scenarios.values().map(Scenario::from).collect()
    }
}

#[derive(Clone, Copy, Debug, Deserialize)]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
#[serde(deny_unknown_fields)]
pub struct ScenarioInput {
    pub topology: TopologyInput,
    pub parameters: ParametersInput,
    pub inputs: InputsInput,
}

impl From<&ScenarioInput> for Scenario {
    fn from(input: &ScenarioInput) -> Self {
        Self {
            topology: input.topology.into(),
            parameters: input.parameters.into(),
            inputs: input.inputs.into(),
        }
    }
}

#[derive(Clone, Copy, Debug, Deserialize)]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
#[serde(tag = "type", rename_all = "snake_case", deny_unknown_fields)]
pub enum TopologyInput {
    CavReheat,
    Cav,
    Vbp {
        controlled: ControlledVariableInput,
        setpnt: f64,
    },
    VavZoneHumidity {
        setpnt: f64,
    },
    VavSupplyTemp {
        setpnt: f64,
    },
    VavReheat {
        setpnt: f64,
    },
}

impl From<TopologyInput> for Topology {
    fn from(input: TopologyInput) -> Self {
        match input {
            TopologyInput::CavReheat => Self::CavReheat,
            TopologyInput::Cav => Self::Cav,
            TopologyInput::Vbp { controlled, setpnt } => Self::Vbp {
                controlled: ControlledOutput {
                    variable: controlled.into(),
                    setpnt,
                },
            },
            TopologyInput::VavZoneHumidity { setpnt } => Self::VavZoneHumidity { setpnt },
            TopologyInput::VavSupplyTemp { setpnt } => Self::VavSupplyTemp { setpnt },
            TopologyInput::VavReheat { setpnt } => Self::VavReheat { setpnt },
        }
    }
}

#[derive(Clone, Copy, Debug, Deserialize)]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
#[serde(rename_all = "snake_case")]
pub enum ControlledVariableInput {
    #[serde(alias = "phi_5")]
    ZoneRelHumidity,
    #[serde(alias = "theta_4")]
    SupplyTemp,
}

impl From<ControlledVariableInput> for ControlledVariable {
    fn from(input: ControlledVariableInput) -> Self {
        match input {
            ControlledVariableInput::ZoneRelHumidity => Self::ZoneRelHumidity,
            ControlledVariableInput::SupplyTemp => Self::SupplyTemp,
        }
    }
}

/// Either a proportional gain or the string "exact" for ideal tracking.
#[derive(Clone, Copy, Debug, Deserialize)]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
#[serde(untagged)]
pub enum GainInput {
    Proportional(f64),
    Ideal(ExactGain),
}

#[derive(Clone, Copy, Debug, Deserialize)]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
#[serde(rename_all = "snake_case")]
pub enum ExactGain {
    Exact,
}

impl From<GainInput> for ControllerGain {
    fn from(input: GainInput) -> Self {
        match input {
            GainInput::Proportional(gain) => Self::Proportional(gain),
            GainInput::Ideal(ExactGain::Exact) => Self::Exact,
        }
    }
}

#[derive(Clone, Copy, Debug, Deserialize)]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
#[serde(deny_unknown_fields)]
pub struct ParametersInput {
    /// kg/s
    #[serde(alias = "m")]
    pub supply_mass_flow: f64,
    /// kg/s
    #[serde(alias = "mo")]
    pub outdoor_mass_flow: f64,
    #[serde(alias = "beta")]
    pub bypass_factor: f64,
    #[serde(alias = "K_theta")]
    pub gain_temp: GainInput,
    #[serde(alias = "K_w")]
    pub gain_humidity: GainInput,
}

impl From<ParametersInput> for Parameters {
    fn from(input: ParametersInput) -> Self {
        Self {
            supply_mass_flow: input.supply_mass_flow,
            outdoor_mass_flow: input.outdoor_mass_flow,
            bypass_factor: input.bypass_factor,
            gain_temp: input.gain_temp.into(),
            gain_humidity: input.gain_humidity.into(),
        }
    }
}

#[derive(Clone, Copy, Debug, Deserialize)]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
#[serde(deny_unknown_fields)]
pub struct InputsInput {
    /// deg C
    #[serde(alias = "theta_o")]
    pub temp_outdoor: f64,
    #[serde(alias = "phi_o")]
    pub rh_outdoor: f64,
    /// deg C
    #[serde(alias = "theta_5_sp")]
    pub temp_zone_setpnt: f64,
    #[serde(alias = "phi_5_sp")]
    pub rh_zone_setpnt: f64,
    /// kg/s
    #[serde(alias = "mi")]
    pub infiltration_mass_flow: f64,
    /// W/K
    #[serde(alias = "UA")]
    pub ua_building: f64,
    /// W
    #[serde(alias = "Qs_BL")]
    pub gains_sensible: f64,
    /// W
    #[serde(alias = "Ql_BL")]
    pub gains_latent: f64,
}

impl From<InputsInput> for Inputs {
    fn from(input: InputsInput) -> Self {
        Self {
            temp_outdoor: input.temp_outdoor,
            rh_outdoor: input.rh_outdoor,
            temp_zone_setpnt: input.temp_zone_setpnt,
            rh_zone_setpnt: input.rh_zone_setpnt,
            infiltration_mass_flow: input.infiltration_mass_flow,
            ua_building: input.ua_building,
            gains_sensible: input.gains_sensible,
            gains_latent: input.gains_latent,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::*;
    use serde_json::json;
    use std::fs::File;
    use walkdir::WalkDir;

    #[fixture]
    fn scenario_json() -> serde_json::Value {
        json!({
            "settings": {"altitude": 250.0, "max_supply_mass_flow": 8.0},
            "scenarios": {
                "vav zone humidity": {
                    "topology": {"type": "vav_zone_humidity", "setpnt": 0.5},
                    "parameters": {"m": 3.1, "mo": 1.0, "beta": 0.16, "K_theta": 1e10, "K_w": 0},
                    "inputs": {
                        "theta_o": 32.0, "phi_o": 0.5, "theta_5_sp": 26.0, "phi_5_sp": 0.5,
                        "mi": 1.35, "UA": 675.0, "Qs_BL": 34000.0, "Ql_BL": 4000.0
                    }
                },
                "bypass on supply temperature": {
                    "topology": {"type": "vbp", "controlled": "theta_4", "setpnt": 11.77},
                    "parameters": {
                        "supply_mass_flow": 3.162, "outdoor_mass_flow": 1.0, "bypass_factor": 0.16,
                        "gain_temp": "exact", "gain_humidity": "exact"
                    },
                    "inputs": {
                        "temp_outdoor": 32.0, "rh_outdoor": 0.5, "temp_zone_setpnt": 26.0,
                        "rh_zone_setpnt": 0.5, "infiltration_mass_flow": 1.35,
                        "ua_building": 675.0, "gains_sensible": 34000.0, "gains_latent": 4000.0
                    }
                }
            }
        })
    }

    #[rstest]
    fn should_read_scenarios_in_order_with_aliases(scenario_json: serde_json::Value) {
        let file = ingest_scenarios(scenario_json.to_string().as_bytes()).unwrap();

        assert_eq!(
            file.names().collect::<Vec<_>>(),
            vec!["vav zone humidity", "bypass on supply temperature"]
        );
        assert_eq!(file.settings.altitude, 250.);
        assert_eq!(file.settings.max_supply_mass_flow, 8.);
        assert_eq!(
            file.settings.setpoint_tolerance,
            SolverSettings::default().setpoint_tolerance
        );

        let scenarios = file.to_scenarios();
        assert_eq!(
            scenarios[0].topology,
            Topology::VavZoneHumidity { setpnt: 0.5 }
        );
        assert_eq!(scenarios[0].parameters.gain_temp, ControllerGain::Proportional(1e10));
        assert!(scenarios[0].parameters.gain_humidity.is_disabled());
        assert_eq!(scenarios[0].inputs.ua_building, 675.);
        assert_eq!(
            scenarios[1].topology,
            Topology::Vbp {
                controlled: ControlledOutput {
                    variable: ControlledVariable::SupplyTemp,
                    setpnt: 11.77,
                }
            }
        );
        assert_eq!(scenarios[1].parameters.gain_humidity, ControllerGain::Exact);
    }

    #[rstest]
    fn should_default_solver_settings_when_absent(mut scenario_json: serde_json::Value) {
        scenario_json.as_object_mut().unwrap().remove("settings");

        let file = ingest_scenarios(scenario_json.to_string().as_bytes()).unwrap();

        assert_eq!(file.settings, SolverSettings::default());
    }

    #[rstest]
    fn should_reject_unknown_fields(mut scenario_json: serde_json::Value) {
        scenario_json["scenarios"]["vav zone humidity"]["inputs"]["wind_speed"] = json!(3.0);

        assert!(ingest_scenarios(scenario_json.to_string().as_bytes()).is_err());
    }

    #[rstest]
    fn should_reject_unknown_gain_keyword(mut scenario_json: serde_json::Value) {
        scenario_json["scenarios"]["vav zone humidity"]["parameters"]["K_w"] = json!("perfect");

        assert!(ingest_scenarios(scenario_json.to_string().as_bytes()).is_err());
    }

    #[rstest]
    fn should_successfully_parse_all_demo_files() {
        for entry in WalkDir::new("./demos")
            .into_iter()
            .filter_map(Result::ok)
            .filter(|e| {
                !e.file_type().is_dir() && e.file_name().to_str().unwrap().ends_with("json")
            })
        {
            let parsed = ingest_scenarios(File::open(entry.path()).unwrap());
            assert!(
                parsed.is_ok(),
                "error was {:?} when parsing file {}",
                parsed.err().unwrap(),
                entry.file_name().to_str().unwrap()
            );
        }
    }
}
