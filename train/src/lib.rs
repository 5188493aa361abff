//! The training program for the pix2depth project.

pub mod common;
pub mod config;
pub mod logging;
pub mod message;
pub mod train;
pub mod utils;

use crate::{common::*, logging::LoggingWorker};

/// The entry of the training program.
pub fn start(config: Arc<config::Config>) -> Result<()> {
    let start_time = Local::now();
    let logging_dir = config
        .logging
        .dir
        .join(format!("{}", start_time.format(utils::FILE_STRFTIME)));
    let weights_dir = Arc::new(logging_dir.join("weights"));

    // create dirs and save config
    fs::create_dir_all(&logging_dir)?;
    fs::create_dir_all(&*weights_dir)?;
    {
        let path = logging_dir.join("config.json5");
        let text = serde_json::to_string_pretty(&*config)?;
        fs::write(&path, text)?;
    }

    // start logger
    let (logging_tx, logging_rx) = flume::unbounded();
    let logging_handle = thread::spawn(move || -> Result<()> {
        LoggingWorker::new(&logging_dir, logging_rx)?.start()
    });

    // the training worker owns the only sender, so the logging worker
    // finishes once training returns
    let result = train::training_worker(config, weights_dir, logging_tx);

    logging_handle
        .join()
        .map_err(|_err| format_err!("the logging worker panicked"))??;

    result
}
