use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use walkdir::WalkDir;

use super::sample::FilePair;
use crate::error::{DataError, Result};

/// Substring that marks a pre-disaster capture.
pub const PRE_MARKER: &str = "pre";

// ---------------------------------------------------------------------------
// PairingRule – how a mask filename maps to its image filename
// ---------------------------------------------------------------------------

/// Declared mapping from a mask's filename to the filename of the image it
/// labels.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PairingRule {
    /// `<stem><mask_suffix>.<any>` labels `<stem>.<image_extension>`.
    Suffix {
        mask_suffix: String,
        image_extension: String,
    },
    /// Drop the last `count` characters of the mask filename (extension
    /// included) and append `.<image_extension>`.
    TrimChars {
        count: usize,
        image_extension: String,
    },
}

impl Default for PairingRule {
    fn default() -> Self {
        PairingRule::Suffix {
            mask_suffix: "_target".into(),
            image_extension: "png".into(),
        }
    }
}

impl PairingRule {
    /// Filename of the image labelled by a mask called `mask_name`, or
    /// `None` when the mask does not follow the rule.
    pub fn image_name_for(&self, mask_name: &str) -> Option<String> {
        match self {
            PairingRule::Suffix {
                mask_suffix,
                image_extension,
            } => {
                let stem = Path::new(mask_name).file_stem()?.to_str()?;
                let base = stem.strip_suffix(mask_suffix.as_str())?;
                (!base.is_empty()).then(|| format!("{base}.{image_extension}"))
            }
            PairingRule::TrimChars {
                count,
                image_extension,
            } => {
                let keep = mask_name.chars().count().checked_sub(*count)?;
                if keep == 0 {
                    return None;
                }
                let base: String = mask_name.chars().take(keep).collect();
                Some(format!("{base}.{image_extension}"))
            }
        }
    }
}

// ---------------------------------------------------------------------------
// FilePairs – parallel, index-aligned image and mask lists
// ---------------------------------------------------------------------------

/// Image and mask paths where index `i` in both lists refers to the same
/// capture.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilePairs {
    images: Vec<PathBuf>,
    masks: Vec<PathBuf>,
}

impl FilePairs {
    pub fn images(&self) -> &[PathBuf] {
        &self.images
    }

    pub fn masks(&self) -> &[PathBuf] {
        &self.masks
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<FilePair> {
        Some(FilePair {
            image: self.images.get(index)?.clone(),
            mask: self.masks.get(index)?.clone(),
        })
    }

    pub fn iter(&self) -> impl Iterator<Item = FilePair> + '_ {
        self.images
            .iter()
            .zip(&self.masks)
            .map(|(image, mask)| FilePair {
                image: image.clone(),
                mask: mask.clone(),
            })
    }

    /// Keep only the first `amount` pairs.
    pub fn truncated(&self, amount: usize) -> FilePairs {
        let n = amount.min(self.len());
        FilePairs {
            images: self.images[..n].to_vec(),
            masks: self.masks[..n].to_vec(),
        }
    }
}

impl FromIterator<FilePair> for FilePairs {
    fn from_iter<T: IntoIterator<Item = FilePair>>(iter: T) -> Self {
        let (images, masks): (Vec<PathBuf>, Vec<PathBuf>) =
            iter.into_iter().map(|p| (p.image, p.mask)).unzip();
        FilePairs { images, masks }
    }
}

// ---------------------------------------------------------------------------
// Discovery
// ---------------------------------------------------------------------------

fn file_name(path: &Path) -> Option<&str> {
    path.file_name().and_then(|n| n.to_str())
}

/// Recursively list files under `root` whose path below `root` contains
/// [`PRE_MARKER`].
fn pre_disaster_files(root: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in WalkDir::new(root).follow_links(true) {
        let entry = entry.map_err(|source| DataError::Walk {
            root: root.to_path_buf(),
            source,
        })?;
        if !entry.file_type().is_file() {
            continue;
        }
        let relative = entry.path().strip_prefix(root).unwrap_or(entry.path());
        if relative.to_string_lossy().contains(PRE_MARKER) {
            files.push(entry.into_path());
        }
    }
    Ok(files)
}

/// Walk both trees and pair every pre-disaster mask with its image.
///
/// Images come back sorted by path, masks aligned to them. Masks whose
/// derived image name is not among the images are skipped. Fails when two
/// masks map to one image, when the surviving counts differ or when nothing
/// was found.
pub fn discover_pairs(
    images_root: &Path,
    masks_root: &Path,
    rule: &PairingRule,
) -> Result<FilePairs> {
    let mut images = pre_disaster_files(images_root)?;
    images.sort();

    let mut position: HashMap<&str, usize> = HashMap::with_capacity(images.len());
    for (i, path) in images.iter().enumerate() {
        let Some(name) = file_name(path) else { continue };
        if position.insert(name, i).is_some() {
            return Err(DataError::DuplicateImage {
                name: name.to_string(),
                root: images_root.to_path_buf(),
            });
        }
    }

    let mut masks: Vec<(usize, PathBuf)> = pre_disaster_files(masks_root)?
        .into_iter()
        .filter_map(|mask| {
            let derived = rule.image_name_for(file_name(&mask)?)?;
            let at = *position.get(derived.as_str())?;
            Some((at, mask))
        })
        .collect();
    masks.sort();

    log::info!("X : {} files | y: {} files", images.len(), masks.len());

    if let Some(pos) = masks.windows(2).position(|w| w[0].0 == w[1].0) {
        let at = masks[pos].0;
        return Err(DataError::DuplicateMask {
            image: images[at].clone(),
            masks: masks[pos..]
                .iter()
                .take_while(|(i, _)| *i == at)
                .map(|(_, path)| path.clone())
                .collect(),
        });
    }
    if images.len() != masks.len() {
        return Err(DataError::PairCountMismatch {
            images: images.len(),
            masks: masks.len(),
        });
    }
    if images.is_empty() {
        return Err(DataError::NoPairs {
            images_root: images_root.to_path_buf(),
            masks_root: masks_root.to_path_buf(),
        });
    }

    Ok(FilePairs {
        images,
        masks: masks.into_iter().map(|(_, path)| path).collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn touch(path: &Path) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, b"").unwrap();
    }

    /// `images/` and `targets/` under a fresh temp dir.
    fn layout(images: &[&str], masks: &[&str]) -> (TempDir, PathBuf, PathBuf) {
        let dir = TempDir::new().unwrap();
        let images_root = dir.path().join("images");
        let masks_root = dir.path().join("targets");
        fs::create_dir_all(&images_root).unwrap();
        fs::create_dir_all(&masks_root).unwrap();
        for name in images {
            touch(&images_root.join(name));
        }
        for name in masks {
            touch(&masks_root.join(name));
        }
        (dir, images_root, masks_root)
    }

    #[test]
    fn pairs_pre_disaster_files_in_order() {
        let (_dir, images, masks) = layout(
            &["b_pre_disaster.png", "a_pre_disaster.png", "a_post_disaster.png"],
            &[
                "a_pre_disaster_target.png",
                "b_pre_disaster_target.png",
                "a_post_disaster_target.png",
            ],
        );

        let pairs = discover_pairs(&images, &masks, &PairingRule::default()).unwrap();
        assert_eq!(pairs.len(), 2);
        assert_eq!(
            pairs.images(),
            &[images.join("a_pre_disaster.png"), images.join("b_pre_disaster.png")]
        );
        assert_eq!(
            pairs.masks(),
            &[
                masks.join("a_pre_disaster_target.png"),
                masks.join("b_pre_disaster_target.png")
            ]
        );
    }

    #[test]
    fn every_index_satisfies_the_rule() {
        let (_dir, images, masks) = layout(
            &["a.png", "a_b.png", "c_pre.png", "x/a_c_pre.png"],
            &["a_b_target.png", "c_pre_target.png", "a_c_pre_target.png", "a_target.png"],
        );
        // Only the "pre" files survive the filter on both sides.
        let rule = PairingRule::default();
        let pairs = discover_pairs(&images, &masks, &rule).unwrap();
        assert_eq!(pairs.len(), 2);
        for pair in pairs.iter() {
            let mask_name = pair.mask.file_name().unwrap().to_str().unwrap();
            let image_name = pair.image.file_name().unwrap().to_str().unwrap();
            assert_eq!(rule.image_name_for(mask_name).as_deref(), Some(image_name));
        }
    }

    #[test]
    fn alignment_survives_names_that_sort_differently() {
        // "a_pre.png" < "a_pre_b.png" but "a_pre_b_target.png" < "a_pre_target.png".
        let (_dir, images, masks) = layout(
            &["a_pre.png", "a_pre_b.png"],
            &["a_pre_target.png", "a_pre_b_target.png"],
        );
        let pairs = discover_pairs(&images, &masks, &PairingRule::default()).unwrap();
        assert_eq!(pairs.masks()[0], masks.join("a_pre_target.png"));
        assert_eq!(pairs.masks()[1], masks.join("a_pre_b_target.png"));
    }

    #[test]
    fn walks_nested_directories() {
        let (_dir, images, masks) = layout(
            &["event1/a_pre_disaster.png", "event2/b_pre_disaster.png"],
            &["event1/a_pre_disaster_target.png", "b_pre_disaster_target.png"],
        );
        let pairs = discover_pairs(&images, &masks, &PairingRule::default()).unwrap();
        assert_eq!(pairs.len(), 2);
        assert_eq!(pairs.images()[1], images.join("event2/b_pre_disaster.png"));
        assert_eq!(pairs.masks()[1], masks.join("b_pre_disaster_target.png"));
    }

    #[test]
    fn unmatched_image_is_a_count_mismatch() {
        let (_dir, images, masks) = layout(
            &["a_pre_disaster.png", "b_pre_disaster.png"],
            &["a_pre_disaster_target.png"],
        );
        let err = discover_pairs(&images, &masks, &PairingRule::default()).unwrap_err();
        assert!(matches!(
            err,
            DataError::PairCountMismatch { images: 2, masks: 1 }
        ));
    }

    #[test]
    fn empty_trees_are_rejected() {
        let (_dir, images, masks) = layout(&["a_post.png"], &["a_post_target.png"]);
        let err = discover_pairs(&images, &masks, &PairingRule::default()).unwrap_err();
        assert!(matches!(err, DataError::NoPairs { .. }));
    }

    #[test]
    fn missing_root_is_a_walk_error() {
        let dir = TempDir::new().unwrap();
        let err = discover_pairs(
            &dir.path().join("nope"),
            &dir.path().join("nada"),
            &PairingRule::default(),
        )
        .unwrap_err();
        assert!(matches!(err, DataError::Walk { .. }));
    }

    #[test]
    fn duplicate_image_names_are_rejected() {
        let (_dir, images, masks) = layout(
            &["x/a_pre.png", "y/a_pre.png"],
            &["a_pre_target.png"],
        );
        let err = discover_pairs(&images, &masks, &PairingRule::default()).unwrap_err();
        assert!(matches!(err, DataError::DuplicateImage { .. }));
    }

    #[test]
    fn two_masks_for_one_image_are_rejected() {
        let (_dir, images, masks) = layout(
            &["a_pre.png", "b_pre.png"],
            &["x/a_pre_target.png", "y/a_pre_target.png"],
        );
        let err = discover_pairs(&images, &masks, &PairingRule::default()).unwrap_err();
        match err {
            DataError::DuplicateMask { image, masks: found } => {
                assert_eq!(image, images.join("a_pre.png"));
                assert_eq!(
                    found,
                    vec![
                        masks.join("x/a_pre_target.png"),
                        masks.join("y/a_pre_target.png"),
                    ]
                );
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn trim_rule_reproduces_fixed_width_matching() {
        let rule = PairingRule::TrimChars {
            count: 11,
            image_extension: "png".into(),
        };
        assert_eq!(
            rule.image_name_for("a_pre_disaster_target.png").as_deref(),
            Some("a_pre_disaster.png")
        );
        assert_eq!(rule.image_name_for("short.png"), None);

        let (_dir, images, masks) = layout(
            &["a_pre_disaster.png"],
            &["a_pre_disaster_target.png"],
        );
        let pairs = discover_pairs(&images, &masks, &rule).unwrap();
        assert_eq!(pairs.len(), 1);
    }

    #[test]
    fn suffix_rule_rejects_foreign_names() {
        let rule = PairingRule::default();
        assert_eq!(rule.image_name_for("a_pre_mask.png"), None);
        assert_eq!(rule.image_name_for("_target.png"), None);
        assert_eq!(
            rule.image_name_for("a_pre_target.tif").as_deref(),
            Some("a_pre.png")
        );
    }

    #[test]
    fn truncated_keeps_leading_pairs() {
        let pairs: FilePairs = (0..5)
            .map(|i| FilePair {
                image: PathBuf::from(format!("{i}.png")),
                mask: PathBuf::from(format!("{i}_target.png")),
            })
            .collect();
        let head = pairs.truncated(3);
        assert_eq!(head.len(), 3);
        assert_eq!(head.get(2).unwrap().image, PathBuf::from("2.png"));
        assert_eq!(pairs.truncated(10).len(), 5);
    }
}
