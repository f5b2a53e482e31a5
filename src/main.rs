/*!
 * Command-line interface for ctxdump
 */

use std::io::{self, BufWriter, Write};
use std::process::ExitCode;

use clap::{CommandFactory, Parser};
use clap_complete::generate;
use rayon::ThreadPoolBuilder;
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;

use ctxdump::clipboard;
use ctxdump::config::{Args, Config};
use ctxdump::report::Reporter;
use ctxdump::{Collector, Result};

fn main() -> ExitCode {
    let args = Args::parse();

    if let Some(shell) = args.generate {
        let mut cmd = Args::command();
        generate(shell, &mut cmd, "dump", &mut io::stdout());
        return ExitCode::SUCCESS;
    }

    init_tracing(args.verbose);

    match run(Config::from_args(args)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

/// Logs go to stderr; `RUST_LOG` wins over `-v`
fn init_tracing(verbose: bool) {
    let default = if verbose { "ctxdump=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .without_time()
        .init();
}

fn run(config: Config) -> Result<()> {
    if let Err(e) = ThreadPoolBuilder::new()
        .num_threads(config.num_threads)
        .build_global()
    {
        warn!(error = %e, "failed to set thread pool size");
    }

    let stats = config.stats;
    let clip = config.clip;
    let collector = Collector::new(config)?;
    debug!(roots = collector.roots().len(), "starting collection");

    let report = if clip {
        let mut buffer = Vec::new();
        let report = collector.run(&mut buffer)?;
        let mut stdout = io::stdout().lock();
        stdout.write_all(&buffer)?;
        stdout.flush()?;

        match String::from_utf8(buffer) {
            Ok(text) => match clipboard::copy_to_clipboard(&text) {
                Ok(()) => eprintln!("Copied {} bytes to clipboard", text.len()),
                Err(e) => warn!(error = %e, "failed to copy output to clipboard"),
            },
            Err(e) => warn!(error = %e, "output is not valid UTF-8, not copying"),
        }
        report
    } else {
        let mut out = BufWriter::new(io::stdout().lock());
        collector.run(&mut out)?
    };

    if stats {
        Reporter.print_report(&report);
    }
    Ok(())
}
