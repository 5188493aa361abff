//! Paired RGB/depth dataset loading and preprocessing.

use crate::common::*;

/// The far plane of the depth sensor in meters. Depth values are mapped
/// from `[0, 2 * DEPTH_SCALE]` meters to `[-1, 1]`.
pub const DEPTH_SCALE: f32 = 42.5;

/// Divisor converting 16-bit depth PNG values to meters.
pub const DEPTH_UNIT_DIVISOR: f32 = 256.0;

/// Divisor mapping 8-bit color values to `[-1, 1]`.
pub const IMAGE_SCALE: f32 = 127.5;

/// A paired image/depth sample.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SampleRecord {
    pub image_file: PathBuf,
    pub depth_file: PathBuf,
}

/// A fixed, ordered collection of paired image/depth samples.
///
/// The pairing is assembled once at load time. Tensors are created on
/// demand per batch and are not cached.
#[derive(Debug, Clone)]
pub struct DepthPairDataset {
    samples: Vec<SampleRecord>,
    image_size: usize,
}

impl DepthPairDataset {
    /// Enumerate two directories and pair image files with depth files by
    /// file stem.
    pub fn load(
        image_dir: impl AsRef<Path>,
        depth_dir: impl AsRef<Path>,
        image_size: usize,
    ) -> Result<Self> {
        let image_dir = image_dir.as_ref();
        let depth_dir = depth_dir.as_ref();

        let image_files = list_files(image_dir)?;
        let depth_files = list_files(depth_dir)?;
        ensure!(
            !image_files.is_empty(),
            "no image files found in '{}'",
            image_dir.display()
        );

        let samples = pair_samples(image_files, depth_files)?;
        info!("paired {} image/depth samples", samples.len());

        Ok(Self {
            samples,
            image_size,
        })
    }

    pub fn samples(&self) -> &[SampleRecord] {
        &self.samples
    }

    pub fn image_size(&self) -> usize {
        self.image_size
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Compute the batch windows of one epoch.
    ///
    /// It produces `len / batch_size + 1` windows. A window that would run
    /// past the end of the dataset is realigned to the last `batch_size`
    /// samples, so every window is full-sized.
    pub fn batch_ranges(&self, batch_size: usize) -> Result<Vec<Range<usize>>> {
        let num_samples = self.samples.len();
        ensure!(batch_size > 0, "batch size must be positive");
        ensure!(
            num_samples >= batch_size,
            "dataset has {} samples, but the batch size is {}",
            num_samples,
            batch_size
        );

        let num_batches = num_samples / batch_size + 1;
        let ranges = (0..num_batches)
            .map(|index| {
                let start = index * batch_size;
                let end = start + batch_size;
                if end > num_samples {
                    num_samples - batch_size..num_samples
                } else {
                    start..end
                }
            })
            .collect();
        Ok(ranges)
    }

    /// Load one batch of samples into `[b, 3, s, s]` image and
    /// `[b, 1, s, s]` depth tensors, both scaled to `[-1, 1]`.
    pub fn load_batch(&self, range: Range<usize>) -> Result<(Tensor, Tensor)> {
        ensure!(
            range.end <= self.samples.len(),
            "batch range {:?} exceeds dataset size {}",
            range,
            self.samples.len()
        );

        let (images, depths): (Vec<_>, Vec<_>) = self.samples[range]
            .iter()
            .map(|sample| -> Result<_> {
                let image = self.load_image(&sample.image_file)?;
                let depth = self.load_depth(&sample.depth_file)?;
                Ok((image, depth))
            })
            .try_collect::<_, Vec<_>, _>()?
            .into_iter()
            .unzip();

        Ok((Tensor::stack(&images, 0), Tensor::stack(&depths, 0)))
    }

    /// Load one RGB image into a `[3, s, s]` tensor scaled to `[-1, 1]`.
    pub fn load_image(&self, path: &Path) -> Result<Tensor> {
        let size = self.image_size as u32;
        let image = image::open(path)
            .with_context(|| format!("failed to load image file '{}'", path.display()))?
            .resize_exact(size, size, FilterType::Lanczos3)
            .to_rgb8();

        let values: Vec<f32> = image
            .into_raw()
            .into_iter()
            .map(|value| value as f32 / IMAGE_SCALE - 1.0)
            .collect();
        let tensor = Tensor::of_slice(&values)
            .view([size as i64, size as i64, 3])
            .permute(&[2, 0, 1]);
        Ok(tensor)
    }

    /// Load one 16-bit depth map into a `[1, s, s]` tensor scaled to
    /// `[-1, 1]` with the fixed far-plane divisor.
    pub fn load_depth(&self, path: &Path) -> Result<Tensor> {
        let size = self.image_size as u32;
        let depth = image::open(path)
            .with_context(|| format!("failed to load depth file '{}'", path.display()))?
            .resize_exact(size, size, FilterType::Lanczos3)
            .to_luma16();

        let values: Vec<f32> = depth
            .into_raw()
            .into_iter()
            .map(|value| value as f32 / DEPTH_UNIT_DIVISOR / DEPTH_SCALE - 1.0)
            .collect();
        let tensor = Tensor::of_slice(&values).view([1, size as i64, size as i64]);
        Ok(tensor)
    }
}

fn list_files(dir: &Path) -> Result<Vec<PathBuf>> {
    ensure!(dir.is_dir(), "'{}' is not a directory", dir.display());
    let files: Vec<_> = glob::glob(&format!("{}/*", dir.display()))?
        .try_collect::<_, Vec<_>, _>()?
        .into_iter()
        .filter(|path| path.is_file())
        .sorted()
        .collect();
    Ok(files)
}

/// Pair image files with depth files by file stem.
pub fn pair_samples(
    image_files: Vec<PathBuf>,
    depth_files: Vec<PathBuf>,
) -> Result<Vec<SampleRecord>> {
    let file_stem = |path: &Path| -> Result<String> {
        let stem = path
            .file_stem()
            .and_then(|stem| stem.to_str())
            .ok_or_else(|| format_err!("invalid file name '{}'", path.display()))?;
        Ok(stem.to_owned())
    };

    let mut depth_index: HashMap<String, PathBuf> = HashMap::new();
    for path in depth_files {
        let stem = file_stem(&path)?;
        ensure!(
            depth_index.insert(stem.clone(), path).is_none(),
            "duplicated depth file stem '{}'",
            stem
        );
    }

    let samples: Vec<_> = image_files
        .into_iter()
        .map(|image_file| -> Result<_> {
            let stem = file_stem(&image_file)?;
            let depth_file = depth_index.remove(&stem).ok_or_else(|| {
                format_err!(
                    "no depth file matches image file '{}'",
                    image_file.display()
                )
            })?;
            Ok(SampleRecord {
                image_file,
                depth_file,
            })
        })
        .try_collect()?;

    ensure!(
        depth_index.is_empty(),
        "{} depth files have no matching image file",
        depth_index.len()
    );

    Ok(samples)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dataset_with_len(len: usize) -> DepthPairDataset {
        let samples = (0..len)
            .map(|index| SampleRecord {
                image_file: PathBuf::from(format!("images/{:04}.png", index)),
                depth_file: PathBuf::from(format!("depths/{:04}.png", index)),
            })
            .collect();
        DepthPairDataset {
            samples,
            image_size: 256,
        }
    }

    #[test]
    fn batch_ranges_realign_tail_window() -> Result<()> {
        let dataset = dataset_with_len(10);
        let ranges = dataset.batch_ranges(4)?;
        ensure!(
            ranges == vec![0..4, 4..8, 6..10],
            "unexpected windows {:?}",
            ranges
        );
        Ok(())
    }

    #[test]
    fn batch_ranges_on_divisible_dataset() -> Result<()> {
        // The walk always emits len / bs + 1 windows; on an evenly divisible
        // dataset the tail window repeats the last full batch.
        let dataset = dataset_with_len(8);
        let ranges = dataset.batch_ranges(4)?;
        ensure!(
            ranges == vec![0..4, 4..8, 4..8],
            "unexpected windows {:?}",
            ranges
        );
        Ok(())
    }

    #[test]
    fn batch_ranges_reject_short_dataset() {
        let dataset = dataset_with_len(3);
        assert!(dataset.batch_ranges(4).is_err());
    }

    #[test]
    fn pair_samples_by_stem() -> Result<()> {
        let image_files = vec![
            PathBuf::from("images/a.jpg"),
            PathBuf::from("images/b.jpg"),
        ];
        let depth_files = vec![
            PathBuf::from("depths/b.png"),
            PathBuf::from("depths/a.png"),
        ];
        let samples = pair_samples(image_files, depth_files)?;
        ensure!(samples.len() == 2);
        ensure!(samples[0].depth_file == PathBuf::from("depths/a.png"));
        ensure!(samples[1].depth_file == PathBuf::from("depths/b.png"));
        Ok(())
    }

    #[test]
    fn pair_samples_reject_unmatched_files() {
        let image_files = vec![PathBuf::from("images/a.jpg")];
        assert!(pair_samples(image_files.clone(), vec![]).is_err());

        let depth_files = vec![
            PathBuf::from("depths/a.png"),
            PathBuf::from("depths/orphan.png"),
        ];
        assert!(pair_samples(image_files, depth_files).is_err());
    }
}
