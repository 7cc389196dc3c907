use std::io::{self, Write};
#[cfg(unix)]
use std::mem::ManuallyDrop;
#[cfg(unix)]
use std::os::unix::io::FromRawFd;
use std::path::Path;
use std::process;

use clap::Parser;

use uniq_rs::common::io::{InputSource, close_output, create_output, open_input};
use uniq_rs::common::io_error_msg;
use uniq_rs::uniq::{Mode, UniqConfig, UniqError, process_uniq, process_uniq_bytes};

#[derive(Parser)]
#[command(
    name = "uniq",
    version,
    about = "Report or omit repeated lines",
    long_about = "Filter adjacent matching lines from INPUT (or standard input),\n\
                  writing to OUTPUT (or standard output).",
    after_help = "A field is a run of blanks (usually spaces and/or TABs), then non-blank \
                  characters. Fields are skipped before chars.\n\n\
                  Note: 'uniq' does not detect repeated lines unless they are adjacent.\n\
                  You may want to sort the input first, or use 'sort -u' without 'uniq'."
)]
struct Cli {
    /// Prefix lines by the number of occurrences
    #[arg(short = 'c', long = "count")]
    count: bool,

    /// Only print duplicate lines, one for each group
    #[arg(short = 'd', long = "repeated")]
    repeated: bool,

    /// Avoid comparing the first N fields
    #[arg(
        short = 'f',
        long = "skip-fields",
        value_name = "N",
        default_value = "0"
    )]
    skip_fields: usize,

    /// Ignore differences in case when comparing
    #[arg(short = 'i', long = "ignore-case")]
    ignore_case: bool,

    /// Avoid comparing the first N characters
    #[arg(
        short = 's',
        long = "skip-chars",
        value_name = "N",
        default_value = "0"
    )]
    skip_chars: usize,

    /// Only print unique lines
    #[arg(short = 'u', long = "unique")]
    unique: bool,

    /// Compare no more than N characters in lines
    #[arg(short = 'w', long = "check-chars", value_name = "N")]
    check_chars: Option<usize>,

    /// Line delimiter is NUL, not newline
    #[arg(short = 'z', long = "zero-terminated")]
    zero_terminated: bool,

    /// Input file (default: stdin)
    input: Option<String>,

    /// Output file (default: stdout)
    output: Option<String>,
}

impl Cli {
    fn to_config(&self) -> Result<UniqConfig, UniqError> {
        Ok(UniqConfig {
            mode: Mode::from_flags(self.count, self.repeated, self.unique)?,
            ignore_case: self.ignore_case,
            skip_fields: self.skip_fields,
            skip_chars: self.skip_chars,
            check_chars: self.check_chars,
            zero_terminated: self.zero_terminated,
        })
    }
}

/// Where lines come from.
enum Source {
    Stdin,
    File(InputSource),
}

/// Enlarge pipe buffers on Linux for higher throughput.
#[cfg(target_os = "linux")]
fn enlarge_pipes() {
    const PIPE_SIZE: i32 = 8 * 1024 * 1024;
    unsafe {
        libc::fcntl(0, libc::F_SETPIPE_SZ, PIPE_SIZE); // stdin
        libc::fcntl(1, libc::F_SETPIPE_SZ, PIPE_SIZE); // stdout
    }
}

fn main() {
    uniq_rs::common::reset_sigpipe();

    #[cfg(target_os = "linux")]
    enlarge_pipes();

    let cli = Cli::parse();

    // Mode conflicts are fatal before any file is touched
    let config = match cli.to_config() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("uniq: {}", e);
            eprintln!("Try 'uniq --help' for more information.");
            process::exit(1);
        }
    };

    let source = match cli.input.as_deref() {
        Some("-") | None => Source::Stdin,
        Some(path) => match open_input(Path::new(path)) {
            Ok(input) => Source::File(input),
            Err(e) => {
                eprintln!("uniq: {}: {}", path, io_error_msg(&e));
                process::exit(1);
            }
        },
    };

    let ok = match cli.output.as_deref() {
        Some(path) if path != "-" => {
            let file = match create_output(Path::new(path)) {
                Ok(f) => f,
                Err(e) => {
                    eprintln!("uniq: {}: {}", path, io_error_msg(&e));
                    process::exit(1);
                }
            };
            let ok = run_uniq(source, &file, &config);
            if let Err(e) = close_output(file) {
                eprintln!("uniq: {}: {}", path, io_error_msg(&e));
                process::exit(1);
            }
            ok
        }
        _ => run_uniq_stdout(source, &config),
    };

    if !ok {
        process::exit(1);
    }
}

/// Raw fd 1: process_uniq buffers internally, so skip stdout's LineWriter.
#[cfg(unix)]
fn run_uniq_stdout(source: Source, config: &UniqConfig) -> bool {
    let raw = unsafe { ManuallyDrop::new(std::fs::File::from_raw_fd(1)) };
    run_uniq(source, &*raw, config)
}

#[cfg(not(unix))]
fn run_uniq_stdout(source: Source, config: &UniqConfig) -> bool {
    let stdout = io::stdout();
    run_uniq(source, stdout.lock(), config)
}

/// Run one uniq pass. Returns false when anything failed; failures have
/// already been reported on stderr.
fn run_uniq(source: Source, output: impl Write, config: &UniqConfig) -> bool {
    let result = match source {
        Source::Stdin => process_uniq(io::stdin().lock(), output, config),
        Source::File(InputSource::Bytes(data)) => process_uniq_bytes(&data, output, config),
        Source::File(InputSource::Stream(file)) => process_uniq(file, output, config),
    };

    match result {
        Ok(stats) => stats.is_clean(),
        Err(e) => {
            eprintln!("uniq: {}", io_error_msg(&e));
            false
        }
    }
}
