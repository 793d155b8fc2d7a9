use ahu::input::ScenarioFile;
use schemars::schema_for;

fn main() -> anyhow::Result<()> {
    let schema = schema_for!(ScenarioFile);
    println!("{}", serde_json::to_string_pretty(&schema)?);

    Ok(())
}
