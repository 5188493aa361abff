use super::blocks::{DownBlock2D, DownBlock2DInit, UpBlock2D, UpBlock2DInit};
use crate::common::*;

/// U-Net generator initializer.
#[derive(Debug, Clone)]
pub struct UnetGeneratorInit {
    /// Number of input image channels.
    pub in_c: usize,
    /// Number of output map channels.
    pub out_c: usize,
    /// Channel count of the first downsampling block.
    pub base_c: usize,
}

impl UnetGeneratorInit {
    pub fn new(in_c: usize, out_c: usize) -> Self {
        Self {
            in_c,
            out_c,
            base_c: 64,
        }
    }

    pub fn build<'p, P>(self, path: P) -> UnetGenerator
    where
        P: Borrow<nn::Path<'p>>,
    {
        let path = path.borrow();
        let Self { in_c, out_c, base_c } = self;

        let down_channels = [
            (in_c, base_c),
            (base_c, base_c * 2),
            (base_c * 2, base_c * 4),
            (base_c * 4, base_c * 8),
            (base_c * 8, base_c * 8),
            (base_c * 8, base_c * 8),
            (base_c * 8, base_c * 8),
        ];
        let downs: Vec<_> = down_channels
            .iter()
            .enumerate()
            .map(|(index, &(in_c, out_c))| {
                DownBlock2DInit {
                    // the outermost block normalizes nothing
                    batch_norm: index != 0,
                    ..DownBlock2DInit::new(in_c, out_c)
                }
                .build(path / format!("down_{}", index))
            })
            .collect();

        // each block consumes the previous output concatenated with the
        // skip connection of the matching downsampling block
        let up_channels = [
            (base_c * 8, base_c * 8, true),
            (base_c * 16, base_c * 8, true),
            (base_c * 16, base_c * 8, true),
            (base_c * 16, base_c * 4, false),
            (base_c * 8, base_c * 2, false),
            (base_c * 4, base_c, false),
        ];
        let ups: Vec<_> = up_channels
            .iter()
            .enumerate()
            .map(|(index, &(in_c, out_c, dropout))| {
                UpBlock2DInit {
                    dropout: dropout.then(|| 0.5),
                    ..UpBlock2DInit::new(in_c, out_c)
                }
                .build(path / format!("up_{}", index))
            })
            .collect();

        let last = nn::conv_transpose2d(
            path / "last",
            (base_c * 2) as i64,
            out_c as i64,
            4,
            nn::ConvTransposeConfig {
                stride: 2,
                padding: 1,
                ..Default::default()
            },
        );

        UnetGenerator { downs, ups, last }
    }
}

/// The pix2pix U-Net generator.
///
/// Seven downsampling blocks, six upsampling blocks with skip
/// concatenation, and a final transposed convolution with tanh output.
#[derive(Debug)]
pub struct UnetGenerator {
    downs: Vec<DownBlock2D>,
    ups: Vec<UpBlock2D>,
    last: nn::ConvTranspose2D,
}

impl nn::ModuleT for UnetGenerator {
    fn forward_t(&self, xs: &Tensor, train: bool) -> Tensor {
        let Self {
            ref downs,
            ref ups,
            ref last,
        } = *self;

        let mut skips: Vec<Tensor> = vec![];
        let mut xs = xs.shallow_clone();
        for down in downs {
            xs = down.forward_t(&xs, train);
            skips.push(xs.shallow_clone());
        }

        // the bottleneck output itself is not a skip connection
        skips.pop();

        // each up block pairs with the skip of the matching down block,
        // innermost first
        for (up, skip) in izip!(ups, skips.iter().rev()) {
            let ys = up.forward_t(&xs, train);
            xs = Tensor::cat(&[&ys, skip], 1);
        }

        xs.apply(last).tanh()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generator_output_shape() -> Result<()> {
        let vs = nn::VarStore::new(Device::Cpu);
        let generator = UnetGeneratorInit::new(3, 1).build(&vs.root() / "generator");

        let images = Tensor::zeros(&[2, 3, 256, 256], tch::kind::FLOAT_CPU);
        let depths = generator.forward_t(&images, true);
        ensure!(
            depths.size4()? == (2, 1, 256, 256),
            "unexpected shape {:?}",
            depths.size()
        );
        Ok(())
    }

    #[test]
    fn generator_output_is_bounded() -> Result<()> {
        let vs = nn::VarStore::new(Device::Cpu);
        let generator = UnetGeneratorInit::new(3, 1).build(&vs.root() / "generator");

        let images = Tensor::rand(&[1, 3, 128, 128], tch::kind::FLOAT_CPU) * 2.0 - 1.0;
        let depths = tch::no_grad(|| generator.forward_t(&images, false));
        ensure!(
            bool::from(depths.ge(-1.0).logical_and(&depths.le(1.0)).all()),
            "tanh output must lie in [-1, 1]"
        );
        Ok(())
    }
}
