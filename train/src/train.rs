//! The discriminator/generator alternation loop.

use crate::{
    common::*,
    config::{Config, ModelConfig, TrainingConfig},
    message::{LoggingMessage, TrainingStepLog},
    utils::{self, RateCounter},
};

/// Start the training worker.
///
/// The loop runs synchronously on the calling thread; only event file
/// writing happens elsewhere, behind `logging_tx`.
pub fn training_worker(
    config: Arc<Config>,
    weights_dir: Arc<PathBuf>,
    logging_tx: flume::Sender<LoggingMessage>,
) -> Result<()> {
    let Config {
        model:
            ModelConfig {
                generator_base_channels,
                discriminator_base_channels,
            },
        training:
            TrainingConfig {
                epochs,
                batch_size,
                learning_rate,
                momentum,
                adversarial_loss_weight,
                reconstruction_loss_weight,
                device,
            },
        ..
    } = *config;

    info!("use device {:?}", device);

    // load dataset
    info!("loading dataset");
    let dataset = DepthPairDataset::load(
        &config.dataset.image_dir,
        &config.dataset.depth_dir,
        config.dataset.image_size.get(),
    )?;
    info!("dataset has {} samples", dataset.len());
    let batch_ranges = dataset.batch_ranges(batch_size.get())?;

    // init models
    info!("initializing models");
    let generator_vs = nn::VarStore::new(device);
    let generator = UnetGeneratorInit {
        base_c: generator_base_channels.get(),
        ..UnetGeneratorInit::new(3, 1)
    }
    .build(&generator_vs.root() / "generator");

    let discriminator_vs = nn::VarStore::new(device);
    let discriminator = PatchDiscriminatorInit {
        base_c: discriminator_base_channels.get(),
        ..PatchDiscriminatorInit::new(3, 1)
    }
    .build(&discriminator_vs.root() / "discriminator");

    // one optimizer per parameter set; the generator step backpropagates
    // through the discriminator but only updates generator variables
    let adam = nn::Adam {
        beta1: momentum.raw(),
        beta2: 0.999,
        wd: 0.0,
    };
    let mut generator_opt = adam.build(&generator_vs, learning_rate.raw())?;
    let mut discriminator_opt = adam.build(&discriminator_vs, learning_rate.raw())?;

    let gan_loss = GanLossInit {
        adversarial_weight: adversarial_loss_weight.raw(),
        reconstruction_weight: reconstruction_loss_weight.raw(),
        ..Default::default()
    }
    .build();

    let save_weights_epochs = config.logging.save_weights_epochs.map(|steps| steps.get());

    // training
    info!("start training");
    let start_time = Instant::now();
    let mut rate_counter = RateCounter::with_second_interval();
    let mut training_step = 0;

    for epoch in 0..epochs.get() {
        let mut last_log = None;

        for range in batch_ranges.iter().cloned() {
            let (images, depths) = dataset.load_batch(range)?;
            let images = images.to_device(device);
            let depths = depths.to_device(device);

            // train the discriminator on the real pair and the generated
            // pair, one optimizer step each
            let fake = tch::no_grad(|| generator.forward_t(&images, false));

            let real_pred = discriminator.forward_t(&depths, &images, true);
            let real_loss = gan_loss.adversarial(&real_pred, true);
            discriminator_opt.backward_step(&real_loss);

            let fake_pred = discriminator.forward_t(&fake, &images, true);
            let fake_loss = gan_loss.adversarial(&fake_pred, false);
            discriminator_opt.backward_step(&fake_loss);

            let d_loss = 0.5 * (f64::from(&real_loss) + f64::from(&fake_loss));
            let d_accuracy = 0.5
                * (gan_loss.accuracy(&real_pred, true) + gan_loss.accuracy(&fake_pred, false));

            // train the generator through the discriminator
            let fake = generator.forward_t(&images, true);
            let pred = discriminator.forward_t(&fake, &images, true);
            let generator_output = gan_loss.generator(&pred, &fake, &depths);
            generator_opt.backward_step(&generator_output.total);

            // print message
            rate_counter.add(1.0);
            if let Some(batch_rate) = rate_counter.rate() {
                let record_rate = batch_rate * batch_size.get() as f64;
                info!(
                    "epoch: {}\tstep: {}\t{:.2} batches/s\t{:.2} records/s",
                    epoch, training_step, batch_rate, record_rate
                );
            }

            // send to logger
            let log = TrainingStepLog {
                epoch,
                step: training_step,
                d_loss,
                d_accuracy,
                g_loss: f64::from(&generator_output.total),
                g_adversarial: f64::from(&generator_output.adversarial),
                g_reconstruction: f64::from(&generator_output.reconstruction),
            };
            logging_tx
                .send(LoggingMessage::new_training_step("training-step", log))
                .map_err(|_err| format_err!("cannot send message to logger"))?;

            last_log = Some(log);
            training_step += 1;
        }

        // plot the progress
        if let Some(log) = last_log {
            info!(
                "[Epoch {}/{}] [D loss: {:.6}, acc: {:3.0}%] [G loss: {:.6}] time: {:.1?}",
                epoch,
                epochs.get(),
                log.d_loss,
                100.0 * log.d_accuracy,
                log.g_loss,
                start_time.elapsed()
            );
        }

        // save weights
        if let Some(0) = save_weights_epochs.map(|steps| epoch % steps) {
            utils::save_weights(&generator_vs, &discriminator_vs, &weights_dir)?;

            if config.logging.enable_images {
                let images =
                    sample_images(&dataset, &generator, device).context("failed to sample")?;
                logging_tx
                    .send(LoggingMessage::new_images("sample", training_step, images))
                    .map_err(|_err| format_err!("cannot send message to logger"))?;
            }
        }
    }

    Ok(())
}

/// Generate a qualitative sample from the first dataset record: the
/// predicted depth next to the ground truth, rescaled to `[0, 1]`.
fn sample_images(
    dataset: &DepthPairDataset,
    generator: &UnetGenerator,
    device: Device,
) -> Result<Vec<Tensor>> {
    let sample = &dataset.samples()[0];
    let image = dataset.load_image(&sample.image_file)?;
    let depth = dataset.load_depth(&sample.depth_file)?;

    let fake = tch::no_grad(|| {
        generator
            .forward_t(&image.unsqueeze(0).to_device(device), false)
            .i(0)
            .to_device(Device::Cpu)
    });

    Ok(vec![fake * 0.5 + 0.5, depth * 0.5 + 0.5])
}
