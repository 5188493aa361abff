//! Messages sent from the training loop to the logging worker.

use crate::common::*;

#[derive(Debug)]
pub struct LoggingMessage {
    pub tag: Cow<'static, str>,
    pub kind: LoggingMessageKind,
}

#[derive(Debug)]
pub enum LoggingMessageKind {
    TrainingStep(TrainingStepLog),
    Images { step: usize, images: Vec<Tensor> },
}

/// Scalar statistics of one training step.
#[derive(Debug, Clone, Copy)]
pub struct TrainingStepLog {
    pub epoch: usize,
    pub step: usize,
    pub d_loss: f64,
    pub d_accuracy: f64,
    pub g_loss: f64,
    pub g_adversarial: f64,
    pub g_reconstruction: f64,
}

impl LoggingMessage {
    pub fn new_training_step<S>(tag: S, log: TrainingStepLog) -> Self
    where
        S: Into<Cow<'static, str>>,
    {
        Self {
            tag: tag.into(),
            kind: LoggingMessageKind::TrainingStep(log),
        }
    }

    pub fn new_images<S>(tag: S, step: usize, images: Vec<Tensor>) -> Self
    where
        S: Into<Cow<'static, str>>,
    {
        Self {
            tag: tag.into(),
            kind: LoggingMessageKind::Images { step, images },
        }
    }
}
