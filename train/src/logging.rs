//! Data logging toolkit.

use crate::{
    common::*,
    message::{LoggingMessage, LoggingMessageKind, TrainingStepLog},
};
use std::{fs::File, io::BufWriter};
use tfrecord::{EventWriter, EventWriterInit};

/// The data logging worker.
///
/// It receives [LoggingMessage]s from the training loop and writes
/// TensorBoard event files, keeping event file I/O off the training
/// thread.
#[derive(Debug)]
pub struct LoggingWorker {
    event_writer: EventWriter<BufWriter<File>>,
    rx: flume::Receiver<LoggingMessage>,
}

impl LoggingWorker {
    /// Create a data logging worker writing under `logging_dir/events`.
    pub fn new(logging_dir: &Path, rx: flume::Receiver<LoggingMessage>) -> Result<Self> {
        let event_dir = logging_dir.join("events");
        fs::create_dir_all(&event_dir)?;
        let event_path_prefix = event_dir
            .join("pix2depth")
            .into_os_string()
            .into_string()
            .map_err(|_| format_err!("invalid logging directory name"))?;

        let event_writer = EventWriterInit::default().from_prefix(event_path_prefix, None)?;

        Ok(Self { event_writer, rx })
    }

    /// Consume messages until every sender is dropped.
    pub fn start(mut self) -> Result<()> {
        loop {
            let LoggingMessage { tag, kind } = match self.rx.recv() {
                Ok(msg) => msg,
                Err(flume::RecvError::Disconnected) => break,
            };

            match kind {
                LoggingMessageKind::TrainingStep(log) => {
                    self.log_training_step(&tag, log)?;
                }
                LoggingMessageKind::Images { step, images } => {
                    self.log_images(&tag, step, images)?;
                }
            }
        }
        Ok(())
    }

    fn log_training_step(&mut self, tag: &str, log: TrainingStepLog) -> Result<()> {
        let TrainingStepLog {
            step,
            d_loss,
            d_accuracy,
            g_loss,
            g_adversarial,
            g_reconstruction,
            ..
        } = log;
        let step = step as i64;

        self.event_writer
            .write_scalar(format!("{}/d_loss", tag), step, d_loss as f32)?;
        self.event_writer
            .write_scalar(format!("{}/d_accuracy", tag), step, d_accuracy as f32)?;
        self.event_writer
            .write_scalar(format!("{}/g_loss", tag), step, g_loss as f32)?;
        self.event_writer
            .write_scalar(format!("{}/g_adversarial", tag), step, g_adversarial as f32)?;
        self.event_writer.write_scalar(
            format!("{}/g_reconstruction", tag),
            step,
            g_reconstruction as f32,
        )?;
        Ok(())
    }

    fn log_images(&mut self, tag: &str, step: usize, images: Vec<Tensor>) -> Result<()> {
        self.event_writer
            .write_image_list(tag, step as i64, images)?;
        Ok(())
    }
}
