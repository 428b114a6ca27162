use std::path;

use bytesize::MIB;
use env_logger;
use log;

use ext_line_sort::{ExternalSorter, ExternalSorterBuilder};

fn main() {
    env_logger::Builder::new().filter_level(log::LevelFilter::Debug).init();

    let sorter: ExternalSorter = ExternalSorterBuilder::new()
        .with_tmp_dir(path::Path::new("./"))
        .with_chunk_size(50 * MIB)
        .build()
        .unwrap();

    let stats = sorter
        .sort(path::Path::new("input.txt"), path::Path::new("output.txt"))
        .unwrap();

    log::info!("{} lines sorted", stats.lines);
}
