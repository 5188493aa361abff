use super::blocks::{DownBlock2D, DownBlock2DInit};
use crate::common::*;

/// PatchGAN discriminator initializer.
#[derive(Debug, Clone)]
pub struct PatchDiscriminatorInit {
    /// Number of conditioning image channels.
    pub image_c: usize,
    /// Number of translated map channels.
    pub depth_c: usize,
    /// Channel count of the first downsampling block.
    pub base_c: usize,
}

impl PatchDiscriminatorInit {
    pub fn new(image_c: usize, depth_c: usize) -> Self {
        Self {
            image_c,
            depth_c,
            base_c: 64,
        }
    }

    pub fn build<'p, P>(self, path: P) -> PatchDiscriminator
    where
        P: Borrow<nn::Path<'p>>,
    {
        let path = path.borrow();
        let Self {
            image_c,
            depth_c,
            base_c,
        } = self;

        let down_channels = [
            (image_c + depth_c, base_c),
            (base_c, base_c * 2),
            (base_c * 2, base_c * 4),
            (base_c * 4, base_c * 8),
        ];
        let downs: Vec<_> = down_channels
            .iter()
            .enumerate()
            .map(|(index, &(in_c, out_c))| {
                DownBlock2DInit {
                    batch_norm: index != 0,
                    ..DownBlock2DInit::new(in_c, out_c)
                }
                .build(path / format!("down_{}", index))
            })
            .collect();

        // linear patch output, the LSGAN objective needs no sigmoid;
        // size-preserving so the grid side stays image_size / 2^4
        let last = nn::conv2d(
            path / "last",
            (base_c * 8) as i64,
            1,
            3,
            nn::ConvConfig {
                stride: 1,
                padding: 1,
                ..Default::default()
            },
        );

        PatchDiscriminator { downs, last }
    }
}

/// The conditional PatchGAN discriminator.
///
/// It consumes a depth map concatenated with its conditioning RGB image
/// and emits a grid of per-patch realness scores of side
/// `image_size / 2^4`.
#[derive(Debug)]
pub struct PatchDiscriminator {
    downs: Vec<DownBlock2D>,
    last: nn::Conv2D,
}

impl PatchDiscriminator {
    pub fn forward_t(&self, depth: &Tensor, image: &Tensor, train: bool) -> Tensor {
        let Self {
            ref downs,
            ref last,
        } = *self;

        let mut xs = Tensor::cat(&[depth, image], 1);
        for down in downs {
            xs = down.forward_t(&xs, train);
        }
        xs.apply(last)
    }

    /// The per-side patch count for a given input resolution.
    pub fn patch_side(image_size: usize) -> usize {
        image_size / 2usize.pow(4)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn discriminator_patch_shape() -> Result<()> {
        let vs = nn::VarStore::new(Device::Cpu);
        let discriminator =
            PatchDiscriminatorInit::new(3, 1).build(&vs.root() / "discriminator");

        let images = Tensor::zeros(&[2, 3, 256, 256], tch::kind::FLOAT_CPU);
        let depths = Tensor::zeros(&[2, 1, 256, 256], tch::kind::FLOAT_CPU);
        let pred = discriminator.forward_t(&depths, &images, true);

        let side = PatchDiscriminator::patch_side(256) as i64;
        ensure!(side == 16);
        ensure!(
            pred.size4()? == (2, 1, side, side),
            "unexpected shape {:?}",
            pred.size()
        );
        Ok(())
    }
}
