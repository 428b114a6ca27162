//! Command line helpers shared by the binaries.

use clap::ArgEnum;
use env_logger;
use log;

#[derive(Copy, Clone, clap::ArgEnum)]
pub enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn possible_values() -> impl Iterator<Item = clap::PossibleValue<'static>> {
        Self::value_variants().iter().filter_map(|v| v.to_possible_value())
    }
}

impl std::str::FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        <LogLevel as clap::ArgEnum>::from_str(s, false)
    }
}

/// Logging level argument.
pub fn log_level_arg() -> clap::Arg<'static> {
    clap::Arg::new("log_level")
        .short('l')
        .long("loglevel")
        .help("logging level")
        .takes_value(true)
        .default_value("info")
        .possible_values(LogLevel::possible_values())
}

/// Size argument accepting human readable values like `200MiB` or `1 GB`.
pub fn size_arg(name: &'static str) -> clap::Arg<'static> {
    clap::Arg::new(name).takes_value(true).validator(|v| match v.parse::<bytesize::ByteSize>() {
        Ok(_) => Ok(()),
        Err(err) => Err(format!("size format incorrect: {}", err)),
    })
}

pub fn init_logger(log_level: LogLevel) {
    env_logger::Builder::new()
        .filter_level(match log_level {
            LogLevel::Off => log::LevelFilter::Off,
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        })
        .format_timestamp_millis()
        .init();
}
