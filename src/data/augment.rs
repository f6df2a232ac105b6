use image::imageops;
use palette::{FromColor, Hsv, ShiftHue, Srgb};

use super::dataset::Dataset;
use super::sample::{resize_image, resize_mask, ImageF32, MaskF32, Sample};
use crate::error::{DataError, Result};

pub const BRIGHTNESS_DELTA: f32 = 0.1;
pub const GAMMA: f32 = 0.1;
/// Fraction of a full turn around the hue circle.
pub const HUE_DELTA: f32 = -0.1;
pub const CROP_FRACTION: f32 = 0.7;
pub const CROP_SIZE: (u32, u32) = (128, 128);

// ---------------------------------------------------------------------------
// Transform – one deterministic augmentation
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Transform {
    /// Mirror left-right, image and mask.
    FlipHorizontal,
    /// Mirror top-bottom, image and mask.
    FlipVertical,
    /// Quarter turn counter-clockwise, image and mask.
    Rotate90,
    /// Add a constant to every image channel. No clamping.
    Brightness(f32),
    /// Raise every image channel to a power.
    Gamma(f32),
    /// Rotate hue by a fraction of a turn in HSV space.
    Hue(f32),
    /// Keep the central `fraction` of both axes, then resize to
    /// `(height, width)`. Image and mask alike.
    CentralCrop { fraction: f32, size: (u32, u32) },
}

/// The transforms stacked onto a training set, in output order.
pub const PIPELINE: [Transform; 6] = [
    Transform::FlipHorizontal,
    Transform::FlipVertical,
    Transform::Rotate90,
    Transform::Brightness(BRIGHTNESS_DELTA),
    Transform::Gamma(GAMMA),
    Transform::Hue(HUE_DELTA),
];

impl Transform {
    /// The crop that is available but not part of [`PIPELINE`].
    pub const fn central_crop() -> Self {
        Transform::CentralCrop {
            fraction: CROP_FRACTION,
            size: CROP_SIZE,
        }
    }

    pub fn apply(&self, sample: Sample) -> Sample {
        let Sample { image, mask } = sample;
        match *self {
            Transform::FlipHorizontal => Sample {
                image: imageops::flip_horizontal(&image),
                mask: imageops::flip_horizontal(&mask),
            },
            Transform::FlipVertical => Sample {
                image: imageops::flip_vertical(&image),
                mask: imageops::flip_vertical(&mask),
            },
            Transform::Rotate90 => Sample {
                image: imageops::rotate270(&image),
                mask: imageops::rotate270(&mask),
            },
            Transform::Brightness(delta) => Sample {
                image: map_channels(image, |c| c + delta),
                mask,
            },
            Transform::Gamma(gamma) => Sample {
                image: map_channels(image, |c| c.powf(gamma)),
                mask,
            },
            Transform::Hue(delta) => Sample {
                image: shift_hue(image, delta),
                mask,
            },
            Transform::CentralCrop { fraction, size } => central_crop(image, mask, fraction, size),
        }
    }
}

fn map_channels(mut image: ImageF32, f: impl Fn(f32) -> f32) -> ImageF32 {
    for c in image.iter_mut() {
        *c = f(*c);
    }
    image
}

fn shift_hue(mut image: ImageF32, delta: f32) -> ImageF32 {
    let degrees = delta * 360.0;
    for px in image.pixels_mut() {
        let [r, g, b] = px.0;
        let hsv: Hsv = Hsv::from_color(Srgb::new(r, g, b));
        let rgb: Srgb = Srgb::from_color(hsv.shift_hue(degrees));
        px.0 = [rgb.red, rgb.green, rgb.blue];
    }
    image
}

/// Offset and length of the centred window covering `fraction` of `len`.
fn central_window(len: u32, fraction: f32) -> (u32, u32) {
    let start = ((len as f64 - len as f64 * fraction as f64) / 2.0) as u32;
    (start, len - 2 * start)
}

fn central_crop(image: ImageF32, mask: MaskF32, fraction: f32, size: (u32, u32)) -> Sample {
    let (width, height) = image.dimensions();
    let (x, w) = central_window(width, fraction);
    let (y, h) = central_window(height, fraction);
    let (out_h, out_w) = size;

    let image = imageops::crop_imm(&image, x, y, w, h).to_image();
    let image = resize_image(&image, out_h, out_w);

    let mask = imageops::crop_imm(&mask, x, y, w, h).to_image();
    let mask = resize_mask(&mask, out_h, out_w);

    Sample { image, mask }
}

// ---------------------------------------------------------------------------
// Augmented – originals followed by one transformed copy per transform
// ---------------------------------------------------------------------------

/// Lazy concatenation of `base` and `base` mapped through each transform.
///
/// With `n = base.len()`, element `i` is `base[i % n]` passed through
/// transform number `i / n` (0 meaning untouched).
#[derive(Debug, Clone)]
pub struct Augmented<D> {
    base: D,
    transforms: Vec<Transform>,
}

impl<D: Dataset<Item = Sample>> Augmented<D> {
    pub fn new(base: D, transforms: Vec<Transform>) -> Self {
        Self { base, transforms }
    }

    /// The transform behind element `index`; `None` for an original.
    pub fn transform_at(&self, index: usize) -> Option<Transform> {
        let n = self.base.len();
        if n == 0 {
            return None;
        }
        let copy = index / n;
        copy.checked_sub(1).and_then(|t| self.transforms.get(t).copied())
    }
}

/// Grow a training set sevenfold with the fixed [`PIPELINE`].
pub fn augment<D: Dataset<Item = Sample>>(base: D) -> Augmented<D> {
    let augmented = Augmented::new(base, PIPELINE.to_vec());
    log::info!("augmented to {} samples", augmented.len());
    augmented
}

impl<D: Dataset<Item = Sample>> Dataset for Augmented<D> {
    type Item = Sample;

    fn len(&self) -> usize {
        self.base.len() * (1 + self.transforms.len())
    }

    fn get(&self, index: usize) -> Result<Sample> {
        if index >= self.len() {
            return Err(DataError::IndexOutOfRange {
                index,
                len: self.len(),
            });
        }
        let sample = self.base.get(index % self.base.len())?;
        Ok(match self.transform_at(index) {
            Some(transform) => transform.apply(sample),
            None => sample,
        })
    }
}
