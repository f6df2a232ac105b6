use std::path::{Path, PathBuf};

use image::imageops::{self, FilterType};
use image::{DynamicImage, GrayImage, ImageBuffer, Luma, Rgb32FImage, RgbImage};

use crate::error::{DataError, Result};

/// H×W×3 float image.
pub type ImageF32 = Rgb32FImage;
/// H×W×1 float mask.
pub type MaskF32 = ImageBuffer<Luma<f32>, Vec<f32>>;

const MASK_SCALE: f32 = 255.0;

// ---------------------------------------------------------------------------
// FilePair – one image and the mask labelling it
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FilePair {
    pub image: PathBuf,
    pub mask: PathBuf,
}

// ---------------------------------------------------------------------------
// Sample – one decoded, model-ready pair
// ---------------------------------------------------------------------------

/// A decoded image with its aligned mask.
///
/// Image channels are scaled to `[0, 1]`. Mask pixels keep their class
/// values (0, 1, 2, ...) as floats.
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    pub image: ImageF32,
    pub mask: MaskF32,
}

impl Sample {
    /// `(width, height)` of the image.
    pub fn dimensions(&self) -> (u32, u32) {
        self.image.dimensions()
    }
}

/// How decoded pairs are turned into [`Sample`]s.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SampleOptions {
    /// `(height, width)` to resize to, `None` keeps the decoded size.
    pub target_size: Option<(u32, u32)>,
}

// ---------------------------------------------------------------------------
// Decoding
// ---------------------------------------------------------------------------

fn read_image(path: &Path) -> Result<DynamicImage> {
    let bytes = std::fs::read(path).map_err(|source| DataError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    image::load_from_memory(&bytes).map_err(|source| DataError::Decode {
        path: path.to_path_buf(),
        source,
    })
}

/// Decode a file as a 3-channel byte image.
pub fn decode_image(path: &Path) -> Result<RgbImage> {
    Ok(read_image(path)?.to_rgb8())
}

/// Decode a file as a 1-channel byte mask.
pub fn decode_mask(path: &Path) -> Result<GrayImage> {
    Ok(read_image(path)?.to_luma8())
}

// ---------------------------------------------------------------------------
// Preparation
// ---------------------------------------------------------------------------

/// Cast to float, scale to `[0, 1]`, then optionally resize bilinearly.
pub fn prepare_image(image: RgbImage, target_size: Option<(u32, u32)>) -> ImageF32 {
    let scaled = DynamicImage::ImageRgb8(image).to_rgb32f();
    match target_size {
        Some((height, width)) => resize_image(&scaled, height, width),
        None => scaled,
    }
}

/// Cast to float, then optionally resize bilinearly. Class values are not
/// rescaled, and interpolated values between classes are kept as they are.
pub fn prepare_mask(mask: GrayImage, target_size: Option<(u32, u32)>) -> MaskF32 {
    let mask = mask_to_f32(&mask);
    match target_size {
        Some((height, width)) => resize_mask(&mask, height, width),
        None => mask,
    }
}

// `Triangle` widens its kernel when shrinking, so downscales are
// antialiased. Plain two-tap bilinear sampling would alias instead.
pub fn resize_image(image: &ImageF32, height: u32, width: u32) -> ImageF32 {
    if image.dimensions() == (width, height) {
        return image.clone();
    }
    imageops::resize(image, width, height, FilterType::Triangle)
}

/// Bilinear resize of a float mask, keeping fractional values.
///
/// The float resampler clamps to `[0, 1]`, so values go through it divided by
/// 255. Masks decoded from bytes never exceed that.
pub fn resize_mask(mask: &MaskF32, height: u32, width: u32) -> MaskF32 {
    if mask.dimensions() == (width, height) {
        return mask.clone();
    }
    let mut unit = mask.clone();
    for v in unit.iter_mut() {
        *v /= MASK_SCALE;
    }
    let mut resized = imageops::resize(&unit, width, height, FilterType::Triangle);
    for v in resized.iter_mut() {
        *v *= MASK_SCALE;
    }
    resized
}

fn mask_to_f32(mask: &GrayImage) -> MaskF32 {
    ImageBuffer::from_fn(mask.width(), mask.height(), |x, y| {
        Luma([mask.get_pixel(x, y).0[0] as f32])
    })
}

/// Read and decode both files of `pair`, producing a ready [`Sample`].
pub fn load_sample(pair: &FilePair, options: SampleOptions) -> Result<Sample> {
    let image = decode_image(&pair.image)?;
    let mask = decode_mask(&pair.mask)?;
    Ok(Sample {
        image: prepare_image(image, options.target_size),
        mask: prepare_mask(mask, options.target_size),
    })
}
