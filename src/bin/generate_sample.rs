use std::path::Path;

use anyhow::{Context, Result};
use image::{GrayImage, Luma, Rgb, RgbImage};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use seg_pipeline::config::{PipelineConfig, CONFIG_FILE};
use seg_pipeline::results::metrics::EpochMetrics;

const SCENE_SIZE: u32 = 96;
const TRAIN_SCENES: usize = 20;
const TEST_SCENES: usize = 5;
const EPOCHS: usize = 200;

/// One synthetic capture: a noisy field with a few rectangular buildings.
/// The mask marks building pixels as class 1; the post-disaster image
/// darkens a random subset of them.
fn generate_scene(rng: &mut ChaCha8Rng) -> (RgbImage, RgbImage, GrayImage) {
    let mut pre = RgbImage::from_fn(SCENE_SIZE, SCENE_SIZE, |_, _| {
        let g: u8 = rng.gen_range(90..140);
        Rgb([g / 2, g, g / 3])
    });
    let mut mask = GrayImage::new(SCENE_SIZE, SCENE_SIZE);

    for _ in 0..rng.gen_range(2..6) {
        let w = rng.gen_range(8..24);
        let h = rng.gen_range(8..24);
        let x0 = rng.gen_range(0..SCENE_SIZE - w);
        let y0 = rng.gen_range(0..SCENE_SIZE - h);
        let shade: u8 = rng.gen_range(150..220);
        for y in y0..y0 + h {
            for x in x0..x0 + w {
                pre.put_pixel(x, y, Rgb([shade, shade, shade.saturating_sub(10)]));
                mask.put_pixel(x, y, Luma([1]));
            }
        }
    }

    let mut post = pre.clone();
    for (x, y, px) in post.enumerate_pixels_mut() {
        if mask.get_pixel(x, y).0[0] == 1 && rng.gen_bool(0.4) {
            px.0 = px.0.map(|c| c / 3);
        }
    }
    (pre, post, mask)
}

fn write_split(
    images_dir: &Path,
    masks_dir: &Path,
    scenes: usize,
    rng: &mut ChaCha8Rng,
) -> Result<()> {
    std::fs::create_dir_all(images_dir)
        .with_context(|| format!("creating {}", images_dir.display()))?;
    std::fs::create_dir_all(masks_dir)
        .with_context(|| format!("creating {}", masks_dir.display()))?;

    for i in 0..scenes {
        let (pre, post, mask) = generate_scene(rng);
        let stem = format!("event-{i:05}");
        pre.save(images_dir.join(format!("{stem}_pre_disaster.png")))?;
        post.save(images_dir.join(format!("{stem}_post_disaster.png")))?;
        mask.save(masks_dir.join(format!("{stem}_pre_disaster_target.png")))?;
        mask.save(masks_dir.join(format!("{stem}_post_disaster_target.png")))?;
    }
    Ok(())
}

/// Loss decaying towards a floor, accuracy rising towards a ceiling, with a
/// little noise and a widening train/validation gap.
fn generate_history(rng: &mut ChaCha8Rng) -> EpochMetrics {
    let mut m = EpochMetrics {
        train_loss: Vec::with_capacity(EPOCHS),
        train_accuracy: Vec::with_capacity(EPOCHS),
        val_loss: Vec::with_capacity(EPOCHS),
        val_accuracy: Vec::with_capacity(EPOCHS),
    };
    for epoch in 0..EPOCHS {
        let t = epoch as f64 / EPOCHS as f64;
        let decay = (-5.0 * t).exp();
        let gap = 0.08 * t;
        m.train_loss.push(0.15 + 0.9 * decay + rng.gen_range(-0.01..0.01));
        m.val_loss.push(0.2 + 0.9 * decay + gap + rng.gen_range(-0.03..0.03));
        m.train_accuracy.push(0.97 - 0.45 * decay + rng.gen_range(-0.005..0.005));
        m.val_accuracy.push(0.93 - 0.45 * decay - gap / 2.0 + rng.gen_range(-0.015..0.015));
    }
    m
}

fn main() -> Result<()> {
    env_logger::init();
    let config = PipelineConfig::load_or_default(Path::new(CONFIG_FILE))?;
    let mut rng = ChaCha8Rng::seed_from_u64(42);

    write_split(&config.train_images_dir, &config.train_masks_dir, TRAIN_SCENES, &mut rng)?;
    write_split(&config.test_images_dir, &config.test_masks_dir, TEST_SCENES, &mut rng)?;

    let history = generate_history(&mut rng);
    if let Some(parent) = config.history_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(&config.history_path, serde_json::to_string(&history)?)
        .with_context(|| format!("writing {}", config.history_path.display()))?;

    println!(
        "Wrote {TRAIN_SCENES} train and {TEST_SCENES} test scenes ({SCENE_SIZE}x{SCENE_SIZE}) \
         under {} and {}",
        config.train_images_dir.display(),
        config.test_images_dir.display()
    );
    println!(
        "Wrote {EPOCHS} epochs of history to {}",
        config.history_path.display()
    );
    Ok(())
}
