use crate::common::*;

/// Downsampling block initializer.
#[derive(Debug, Clone)]
pub struct DownBlock2DInit {
    pub in_c: usize,
    pub out_c: usize,
    pub k: usize,
    pub s: usize,
    pub p: usize,
    pub batch_norm: bool,
    pub leaky_slope: f64,
}

impl DownBlock2DInit {
    pub fn new(in_c: usize, out_c: usize) -> Self {
        Self {
            in_c,
            out_c,
            k: 4,
            s: 2,
            p: 1,
            batch_norm: true,
            leaky_slope: 0.2,
        }
    }

    pub fn build<'p, P>(self, path: P) -> DownBlock2D
    where
        P: Borrow<nn::Path<'p>>,
    {
        let path = path.borrow();

        let Self {
            in_c,
            out_c,
            k,
            s,
            p,
            batch_norm,
            leaky_slope,
        } = self;

        let conv = nn::conv2d(
            path / "conv",
            in_c as i64,
            out_c as i64,
            k as i64,
            nn::ConvConfig {
                stride: s as i64,
                padding: p as i64,
                ..Default::default()
            },
        );
        let bn = batch_norm
            .then(|| nn::batch_norm2d(path / "bn", out_c as i64, Default::default()));

        DownBlock2D {
            conv,
            bn,
            leaky_slope,
        }
    }
}

/// A strided conv2d followed by leaky ReLU and optional batch norm.
#[derive(Debug)]
pub struct DownBlock2D {
    conv: nn::Conv2D,
    bn: Option<nn::BatchNorm>,
    leaky_slope: f64,
}

impl nn::ModuleT for DownBlock2D {
    fn forward_t(&self, xs: &Tensor, train: bool) -> Tensor {
        let Self {
            ref conv,
            ref bn,
            leaky_slope,
        } = *self;

        let xs = leaky_relu(&xs.apply(conv), leaky_slope);

        match bn {
            Some(bn) => xs.apply_t(bn, train),
            None => xs,
        }
    }
}

/// Upsampling block initializer.
#[derive(Debug, Clone)]
pub struct UpBlock2DInit {
    pub in_c: usize,
    pub out_c: usize,
    pub k: usize,
    pub s: usize,
    pub p: usize,
    pub dropout: Option<f64>,
}

impl UpBlock2DInit {
    pub fn new(in_c: usize, out_c: usize) -> Self {
        Self {
            in_c,
            out_c,
            k: 4,
            s: 2,
            p: 1,
            dropout: None,
        }
    }

    pub fn build<'p, P>(self, path: P) -> UpBlock2D
    where
        P: Borrow<nn::Path<'p>>,
    {
        let path = path.borrow();

        let Self {
            in_c,
            out_c,
            k,
            s,
            p,
            dropout,
        } = self;

        let deconv = nn::conv_transpose2d(
            path / "deconv",
            in_c as i64,
            out_c as i64,
            k as i64,
            nn::ConvTransposeConfig {
                stride: s as i64,
                padding: p as i64,
                ..Default::default()
            },
        );
        let bn = nn::batch_norm2d(path / "bn", out_c as i64, Default::default());

        UpBlock2D {
            deconv,
            bn,
            dropout,
        }
    }
}

/// A strided conv_transpose2d followed by ReLU, batch norm and optional
/// dropout.
#[derive(Debug)]
pub struct UpBlock2D {
    deconv: nn::ConvTranspose2D,
    bn: nn::BatchNorm,
    dropout: Option<f64>,
}

impl nn::ModuleT for UpBlock2D {
    fn forward_t(&self, xs: &Tensor, train: bool) -> Tensor {
        let Self {
            ref deconv,
            ref bn,
            dropout,
        } = *self;

        let xs = xs.apply(deconv).relu().apply_t(bn, train);

        match dropout {
            Some(prob) => xs.dropout(prob, train),
            None => xs,
        }
    }
}

pub(crate) fn leaky_relu(xs: &Tensor, slope: f64) -> Tensor {
    xs.clamp_min(0.0) + xs.clamp_max(0.0) * slope
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn down_block_halves_resolution() -> Result<()> {
        let vs = nn::VarStore::new(Device::Cpu);
        let block = DownBlock2DInit::new(3, 8).build(&vs.root() / "down");

        let input = Tensor::zeros(&[2, 3, 32, 32], tch::kind::FLOAT_CPU);
        let output = block.forward_t(&input, true);
        ensure!(
            output.size4()? == (2, 8, 16, 16),
            "unexpected shape {:?}",
            output.size()
        );
        Ok(())
    }

    #[test]
    fn up_block_doubles_resolution() -> Result<()> {
        let vs = nn::VarStore::new(Device::Cpu);
        let block = UpBlock2DInit {
            dropout: Some(0.5),
            ..UpBlock2DInit::new(8, 4)
        }
        .build(&vs.root() / "up");

        let input = Tensor::zeros(&[2, 8, 16, 16], tch::kind::FLOAT_CPU);
        let output = block.forward_t(&input, true);
        ensure!(
            output.size4()? == (2, 4, 32, 32),
            "unexpected shape {:?}",
            output.size()
        );
        Ok(())
    }

    #[test]
    fn leaky_relu_slope() {
        let input = Tensor::of_slice(&[-10.0f32, 0.0, 5.0]);
        let output = leaky_relu(&input, 0.2);
        let expect = Tensor::of_slice(&[-2.0f32, 0.0, 5.0]);
        assert!(bool::from((output - expect).abs().le(1e-6).all()));
    }
}
