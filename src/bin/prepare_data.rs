use std::path::Path;

use anyhow::{Context, Result};
use seg_pipeline::config::{PipelineConfig, CONFIG_FILE};
use seg_pipeline::data::augment::augment;
use seg_pipeline::data::batch::BatchLoader;
use seg_pipeline::data::dataset::Dataset;
use seg_pipeline::data::reader::DataReader;
use seg_pipeline::data::sample::{Sample, SampleOptions};

/// Print the shape and value range of one batch.
fn describe_batch(label: &str, batch: &[Sample]) {
    let Some(first) = batch.first() else {
        log::info!("{label}: empty batch");
        return;
    };
    let (w, h) = first.dimensions();
    let mask_max = batch
        .iter()
        .flat_map(|s| s.mask.pixels().map(|p| p.0[0]))
        .fold(0.0f32, f32::max);
    let n = batch.len();
    log::info!("{label}: {n} x {h}x{w}x3 images, {n} x {h}x{w}x1 masks, max value {mask_max}");
}

fn prepare_training(config: &PipelineConfig, options: SampleOptions) -> Result<()> {
    let mut reader = DataReader::new(&config.train_images_dir, &config.train_masks_dir)
        .with_rule(config.pairing.clone());
    let (train, val) = reader
        .train_val(options, config.desired_amount, config.val_fraction, config.split_seed)
        .context("assembling training data")?;

    let train = BatchLoader::new(augment(train), config.batch_size)
        .shuffled(config.shuffle_buffer, config.split_seed);
    let val = BatchLoader::new(val, config.batch_size);
    log::info!(
        "{} train samples in {} batches | {} val samples in {} batches",
        train.dataset().len(),
        train.num_batches(),
        val.dataset().len(),
        val.num_batches()
    );

    if let Some(batch) = train.epoch(0).next() {
        describe_batch("first train batch", &batch.context("decoding first train batch")?);
    }
    if let Some(batch) = val.epoch(0).next() {
        describe_batch("first val batch", &batch.context("decoding first val batch")?);
    }
    Ok(())
}

fn prepare_evaluation(config: &PipelineConfig, options: SampleOptions) -> Result<()> {
    let mut reader = DataReader::new(&config.test_images_dir, &config.test_masks_dir)
        .with_rule(config.pairing.clone());
    let eval = reader
        .evaluation(options, config.desired_amount)
        .context("assembling evaluation data")?;

    let batches = BatchLoader::new(eval.combined, config.batch_size);
    log::info!(
        "{} test samples in {} batches ({} images, {} masks)",
        batches.dataset().len(),
        batches.num_batches(),
        eval.images.len(),
        eval.masks.len()
    );
    if let Some(batch) = batches.epoch(0).next() {
        describe_batch("first test batch", &batch.context("decoding first test batch")?);
    }
    Ok(())
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = PipelineConfig::load_or_default(Path::new(CONFIG_FILE))?;
    let options = SampleOptions {
        target_size: config.target_size(),
    };

    prepare_training(&config, options)?;

    if config.test_images_dir.is_dir() && config.test_masks_dir.is_dir() {
        prepare_evaluation(&config, options)?;
    } else {
        log::warn!(
            "{} not found, skipping evaluation data",
            config.test_images_dir.display()
        );
    }
    Ok(())
}
