//! Training program configuration format.

use crate::common::*;

/// The main training configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub dataset: DatasetConfig,
    pub model: ModelConfig,
    pub logging: LoggingConfig,
    pub training: TrainingConfig,
}

impl Config {
    pub fn open<P>(path: P) -> Result<Self>
    where
        P: AsRef<Path>,
    {
        let text = std::fs::read_to_string(path)?;
        let config = json5::from_str(&text)?;
        Ok(config)
    }
}

/// Dataset options.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetConfig {
    /// The directory of RGB image files.
    pub image_dir: PathBuf,
    /// The directory of 16-bit depth map files, matched to images by stem.
    pub depth_dir: PathBuf,
    /// The side length images and depth maps are resized to.
    pub image_size: NonZeroUsize,
}

/// Network topology options.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Channel count of the generator's first downsampling block.
    pub generator_base_channels: NonZeroUsize,
    /// Channel count of the discriminator's first downsampling block.
    pub discriminator_base_channels: NonZeroUsize,
}

/// Data logging options.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// The directory where per-run session directories are created.
    pub dir: PathBuf,
    /// If set, log qualitative depth samples along with the scalars.
    pub enable_images: bool,
    /// If set, it saves the weight files per this number of epochs.
    pub save_weights_epochs: Option<NonZeroUsize>,
}

/// The training options.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingConfig {
    /// The number of passes over the dataset.
    pub epochs: NonZeroUsize,
    /// The batch size.
    pub batch_size: NonZeroUsize,
    /// The learning rate shared by both optimizers.
    pub learning_rate: R64,
    /// The beta1 parameter for both Adam optimizers.
    pub momentum: R64,
    /// The weighting factor of the adversarial loss term.
    pub adversarial_loss_weight: R64,
    /// The weighting factor of the L1 reconstruction loss term.
    pub reconstruction_loss_weight: R64,
    /// The training device.
    #[serde(with = "tch_serde::serde_device")]
    pub device: Device,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_config_text() -> Result<()> {
        let text = r#"
        {
            dataset: {
                image_dir: "data/images",
                depth_dir: "data/depths",
                image_size: 256,
            },
            model: {
                generator_base_channels: 64,
                discriminator_base_channels: 64,
            },
            logging: {
                dir: "logs",
                enable_images: true,
                save_weights_epochs: 1,
            },
            training: {
                epochs: 300,
                batch_size: 4,
                learning_rate: 0.0002,
                momentum: 0.5,
                adversarial_loss_weight: 1.0,
                reconstruction_loss_weight: 100.0,
                device: "cpu",
            },
        }
        "#;

        let config: Config = json5::from_str(text)?;
        ensure!(config.training.batch_size.get() == 4);
        ensure!(config.training.learning_rate == r64(0.0002));
        ensure!(config.training.device == Device::Cpu);
        ensure!(config.logging.save_weights_epochs == NonZeroUsize::new(1));
        Ok(())
    }
}
