use ahu::output_writer::FileOutputWriter;
use ahu::run_scenarios;
use clap::Parser;
use std::ffi::OsStr;
use std::fs;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use tracing::{debug, Level};
use tracing_subscriber::fmt::format::FmtSpan;

#[derive(Parser, Default, Debug)]
#[clap(author, version, about, long_about = None)]
struct AhuArgs {
    /// Path to a JSON scenario file
    input_file: String,
    #[clap(
        long,
        short,
        default_value_t = false,
        help = "Log every solver iteration"
    )]
    verbose: bool,
    #[clap(long, default_value_t = false, help = "Whether to log out spans")]
    log_spans: bool,
    #[clap(
        long,
        default_value_t = false,
        help = "Stop at the first scenario that cannot be solved"
    )]
    fail_fast: bool,
}

fn main() -> anyhow::Result<()> {
    let args = AhuArgs::parse();

    // set up basic tracing
    let tracing_subscriber = {
        let mut builder = tracing_subscriber::fmt::fmt().with_max_level(if args.verbose {
            Level::TRACE
        } else {
            Level::INFO
        });

        if args.log_spans {
            builder = builder.with_span_events(FmtSpan::CLOSE);
        }

        builder.finish()
    };
    tracing::subscriber::set_global_default(tracing_subscriber)?;

    let input_file = Path::new(args.input_file.as_str());
    let input_file_stem = input_file
        .file_stem()
        .and_then(OsStr::to_str)
        .unwrap_or("scenarios");

    let mut output_path = input_file.parent().map(PathBuf::from).unwrap_or_default();
    output_path.push(format!("{input_file_stem}__results"));
    fs::create_dir_all(&output_path)?;
    debug!(output_path = %output_path.display(), "writing results");

    let file_output = FileOutputWriter::new(output_path, format!("{input_file_stem}__{{}}.{{}}"));

    let results = run_scenarios(
        BufReader::new(File::open(input_file)?),
        &file_output,
        args.fail_fast,
    )?;

    let failures = results.failures().count();
    if failures > 0 {
        eprintln!(
            "{failures} of {} scenarios could not be solved",
            results.outcomes.len()
        );
    }

    Ok(())
}
