#![no_main]

use ahu::output_writer::OutputWriter;
use ahu::run_scenarios;
use libfuzzer_sys::fuzz_target;
use std::io;
use std::io::{BufReader, Cursor, Write};

fuzz_target!(|data: &[u8]| {
    let _run = run_scenarios(BufReader::new(Cursor::new(data)), FuzzOutput, false);
});

/// Discards the results table while still making the run write it.
#[derive(Debug, Default)]
struct FuzzOutput;

impl OutputWriter for FuzzOutput {
    fn writer_for_location_key(
        &self,
        _location_key: &str,
        _file_extension: &str,
    ) -> anyhow::Result<impl Write> {
        Ok(io::sink())
    }
}
