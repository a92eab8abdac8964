use std::fs::OpenOptions;
use std::io::{Error, ErrorKind};
use std::path::Path;

use simplelog::*;

/// Log to a file; the terminal is owned by the UI.
pub fn init(path: &Path) -> Result<(), Error> {
    let log_file = OpenOptions::new().create(true).append(true).open(path)?;

    let config = ConfigBuilder::new()
        .set_target_level(LevelFilter::Error)
        .set_thread_level(LevelFilter::Off)
        .build();

    CombinedLogger::init(vec![WriteLogger::new(LevelFilter::Debug, config, log_file)])
        .map_err(|err| Error::new(ErrorKind::Other, err))
}
