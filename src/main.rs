use std::path;
use std::process;

use bytesize::ByteSize;
use log;

use ext_line_sort::cli::{self, LogLevel};
use ext_line_sort::{ExternalSorter, ExternalSorterBuilder, Progress};

fn main() {
    let arg_parser = build_arg_parser();

    let log_level: LogLevel = arg_parser.value_of_t_or_exit("log_level");
    cli::init_logger(log_level);

    let tmp_dir: Option<&str> = arg_parser.value_of("tmp_dir");
    let chunk_size: ByteSize = arg_parser.value_of_t_or_exit("chunk_size");
    let buf_size: Option<ByteSize> = arg_parser
        .is_present("buf_size")
        .then(|| arg_parser.value_of_t_or_exit("buf_size"));

    let input = arg_parser.value_of("input").expect("value is required");
    let output = arg_parser.value_of("output").expect("value is required");

    let mut sorter_builder = ExternalSorterBuilder::new()
        .with_chunk_size(chunk_size.as_u64())
        .with_progress(log_progress);

    if let Some(tmp_dir) = tmp_dir {
        sorter_builder = sorter_builder.with_tmp_dir(path::Path::new(tmp_dir));
    }

    if let Some(buf_size) = buf_size {
        sorter_builder = sorter_builder.with_rw_buf_size(buf_size.as_u64() as usize);
    }

    let sorter: ExternalSorter = match sorter_builder.build() {
        Ok(sorter) => sorter,
        Err(err) => {
            log::error!("sorter initialization error: {}", err);
            process::exit(1);
        }
    };

    match sorter.sort(path::Path::new(input), path::Path::new(output)) {
        Ok(stats) => log::info!("{} lines sorted using {} chunks", stats.lines, stats.chunks),
        Err(err) => {
            log::error!("data sorting error: {}", err);
            process::exit(1);
        }
    }
}

fn log_progress(progress: &Progress) {
    match progress {
        Progress::Split {
            processed_bytes,
            total_bytes,
            chunks,
        } => log::info!(
            "splitting progress: {:.1}% ({} chunks)",
            *processed_bytes as f64 / (*total_bytes).max(1) as f64 * 100.0,
            chunks
        ),
        Progress::Merge { lines, bytes } => log::info!("merged {} lines ({})", lines, ByteSize(*bytes)),
        Progress::Generate { .. } => {}
    }
}

fn build_arg_parser() -> clap::ArgMatches {
    clap::App::new("line-sort")
        .about("external sorter of numbered text lines")
        .arg(
            clap::Arg::new("input")
                .short('i')
                .long("input")
                .help("file to be sorted")
                .required(true)
                .takes_value(true),
        )
        .arg(
            clap::Arg::new("output")
                .short('o')
                .long("output")
                .help("result file")
                .required(true)
                .takes_value(true),
        )
        .arg(cli::log_level_arg())
        .arg(
            clap::Arg::new("tmp_dir")
                .short('d')
                .long("tmp-dir")
                .help("directory to be used to store temporary data")
                .takes_value(true),
        )
        .arg(
            cli::size_arg("chunk_size")
                .short('c')
                .long("chunk-size")
                .help("chunk size limit")
                .default_value("200MiB"),
        )
        .arg(
            cli::size_arg("buf_size")
                .short('b')
                .long("buf-size")
                .help("chunk file read/write buffer size"),
        )
        .get_matches()
}
