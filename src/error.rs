use std::path::PathBuf;

// ---------------------------------------------------------------------------
// DataError – everything the data layer can fail with
// ---------------------------------------------------------------------------

/// Errors raised while discovering, decoding or assembling samples, and
/// while loading recorded training metrics.
#[derive(Debug, thiserror::Error)]
pub enum DataError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to decode image {path}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("failed while walking {root}: {source}")]
    Walk {
        root: PathBuf,
        #[source]
        source: walkdir::Error,
    },

    #[error("found {images} images but {masks} masks")]
    PairCountMismatch { images: usize, masks: usize },

    #[error("no image/mask pairs found under {images_root} and {masks_root}")]
    NoPairs {
        images_root: PathBuf,
        masks_root: PathBuf,
    },

    #[error("image filename {name} appears more than once under {root}")]
    DuplicateImage { name: String, root: PathBuf },

    #[error("{image} is matched by more than one mask: {masks:?}")]
    DuplicateMask { image: PathBuf, masks: Vec<PathBuf> },

    #[error("index {index} out of range for dataset of length {len}")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("metric '{key}' has {found} entries, expected {expected}")]
    MetricLength {
        key: &'static str,
        expected: usize,
        found: usize,
    },

    #[error("failed to parse {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

pub type Result<T, E = DataError> = std::result::Result<T, E>;
