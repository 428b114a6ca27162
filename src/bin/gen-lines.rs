use std::path;
use std::process;
use std::time::Instant;

use bytesize::ByteSize;
use log;

use ext_line_sort::cli::{self, LogLevel};
use ext_line_sort::progress::DEFAULT_PROGRESS_INTERVAL;
use ext_line_sort::{HumanDuration, LineGenerator, Progress, ProgressReporter};

fn main() {
    let arg_parser = build_arg_parser();

    let log_level: LogLevel = arg_parser.value_of_t_or_exit("log_level");
    cli::init_logger(log_level);

    let size: ByteSize = arg_parser.value_of_t_or_exit("size");
    let output = arg_parser.value_of("output").expect("value is required");

    log::info!("target size: {}", size);
    let started = Instant::now();
    let mut progress = ProgressReporter::new(Some(Box::new(log_progress)), DEFAULT_PROGRESS_INTERVAL);

    match LineGenerator::new().generate_file(path::Path::new(output), size.as_u64(), &mut progress) {
        Ok(written) => log::info!(
            "file generation complete: {} in {}",
            ByteSize(written),
            HumanDuration(started.elapsed())
        ),
        Err(err) => {
            log::error!("{} generation error: {}", output, err);
            process::exit(1);
        }
    }
}

fn log_progress(progress: &Progress) {
    if let Progress::Generate {
        written_bytes,
        target_bytes,
    } = progress
    {
        log::info!(
            "generated {} ({:.1}%)",
            ByteSize(*written_bytes),
            *written_bytes as f64 / (*target_bytes).max(1) as f64 * 100.0
        );
    }
}

fn build_arg_parser() -> clap::ArgMatches {
    clap::App::new("gen-lines")
        .about("numbered text lines test file generator")
        .arg(
            cli::size_arg("size")
                .short('s')
                .long("size")
                .help("file size to be generated")
                .required(true),
        )
        .arg(
            clap::Arg::new("output")
                .short('o')
                .long("output")
                .help("output file")
                .required(true)
                .takes_value(true),
        )
        .arg(cli::log_level_arg())
        .get_matches()
}
