use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use anyhow::{Context, Result};
use log::{debug, warn};
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::core::domain::Image;
use crate::error::AipesError;

/// A reference set partitioned into `ngroup` disjoint groups.
pub trait GroupedDataset {
    fn ngroup(&self) -> usize;

    /// Returns `(train, validation)` for group `index`.
    /// Validation is that group; training is every other group.
    fn select(&self, index: usize) -> Result<(Vec<Image>, Vec<Image>)>;
}

/// Shuffled k-fold partition.
///
/// **Invariant**: every image lands in exactly one group and group sizes differ by at most one.
#[derive(Debug, Clone)]
pub struct KFoldDataset {
    groups: Vec<Vec<Image>>,
}

impl KFoldDataset {
    /// Shuffles `images` with a seeded RNG and deals them round-robin into `ngroup` groups.
    pub fn new(images: Vec<Image>, ngroup: usize, seed: u64) -> Result<Self, AipesError> {
        if ngroup == 0 || ngroup > images.len() {
            return Err(AipesError::InvalidGroupCount {
                ngroup,
                images: images.len(),
            });
        }

        let mut order: Vec<usize> = (0..images.len()).collect();
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        order.shuffle(&mut rng);

        let mut slots: Vec<Option<Image>> = images.into_iter().map(Some).collect();
        let mut groups = vec![Vec::new(); ngroup];
        for (k, idx) in order.into_iter().enumerate() {
            if let Some(image) = slots[idx].take() {
                groups[k % ngroup].push(image);
            }
        }

        Ok(Self { groups })
    }

    /// Uses pre-built groups as they are.
    pub fn from_groups(groups: Vec<Vec<Image>>) -> Self {
        Self { groups }
    }

    pub fn groups(&self) -> &[Vec<Image>] {
        &self.groups
    }

    pub fn len(&self) -> usize {
        self.groups.iter().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl GroupedDataset for KFoldDataset {
    fn ngroup(&self) -> usize {
        self.groups.len()
    }

    fn select(&self, index: usize) -> Result<(Vec<Image>, Vec<Image>)> {
        let validation = self
            .groups
            .get(index)
            .ok_or(AipesError::GroupOutOfRange {
                index,
                ngroup: self.groups.len(),
            })?
            .clone();

        let train: Vec<Image> = self
            .groups
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != index)
            .flat_map(|(_, g)| g.iter().cloned())
            .collect();

        debug!("Group {}: {} training / {} validation images", index, train.len(), validation.len());
        Ok((train, validation))
    }
}

/// Reads a JSON array of images.
pub fn load_images(path: &Path) -> Result<Vec<Image>> {
    let file = File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
    let images: Vec<Image> = serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("Failed to parse images from {}", path.display()))?;

    for image in images.iter().filter(|img| img.atoms.is_empty()) {
        warn!("Image '{}' in {} has no atoms", image.label, path.display());
    }
    Ok(images)
}
