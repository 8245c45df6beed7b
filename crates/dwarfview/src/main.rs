use std::io::{self, Write};
use std::process;

use dwarfview_core::{process as process_file, ElfDwarfSource, ViewError, ViewSettings};
use dwarfview_utils::{debug, init_logging_with_config, LoggingConfig};

mod cli;

fn main()
{
    // Usage errors exit with status 2; --help and --version with 0.
    let invocation = cli::try_parse_from(std::env::args_os()).unwrap_or_else(|err| err.exit());

    // Held until exit so the file writer can flush.
    let _guard = match init_logging_with_config(&LoggingConfig::from_env().with_level(invocation.cli.log_level)) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Failed to initialize logging: {e}");
            process::exit(1);
        }
    };

    let settings = match invocation.settings() {
        Ok(settings) => settings,
        Err(e) => fail(&e),
    };
    debug!(inputs = invocation.cli.inputs.len(), outputs = ?settings.outputs, "starting");

    for input in &invocation.cli.inputs {
        if let Err(e) = run(&ElfDwarfSource::new(input), &settings) {
            fail(&e);
        }
    }
}

/// Process one input file: warnings to stderr first, then the view to stdout.
fn run(source: &ElfDwarfSource, settings: &ViewSettings) -> Result<(), ViewError>
{
    let name = source.path().display().to_string();
    let report = process_file(source, &name, settings)?;

    for warning in &report.warnings {
        eprint!("\nWarning: {warning}\n");
    }
    for path in &report.split_files {
        debug!(path = %path.display(), "split file");
    }

    emit(&report.output);
    Ok(())
}

fn emit(output: &str)
{
    let mut stdout = io::stdout().lock();
    match stdout.write_all(output.as_bytes()).and_then(|()| stdout.flush()) {
        Ok(()) => {}
        // A closed pipe (e.g. `| head`) ends the run quietly.
        Err(e) if e.kind() == io::ErrorKind::BrokenPipe => process::exit(0),
        Err(e) => {
            debug!(error = ?e, "writing output");
            eprint!("\nFailed to write output: {e}\n");
            process::exit(1);
        }
    }
}

fn fail(error: &ViewError) -> !
{
    debug!(code = %error.code(), details = ?error, "fatal error");
    eprint!("\n{error}\n");
    process::exit(1);
}
