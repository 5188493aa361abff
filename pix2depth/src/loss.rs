//! The combined adversarial + reconstruction objective.

use crate::common::*;

/// GAN loss initializer.
#[derive(Debug, Clone)]
pub struct GanLossInit {
    /// The weighting factor of the adversarial MSE term.
    pub adversarial_weight: f64,
    /// The weighting factor of the L1 reconstruction term.
    pub reconstruction_weight: f64,
    /// The reduction method applied on output losses.
    pub reduction: Reduction,
}

impl Default for GanLossInit {
    fn default() -> Self {
        Self {
            adversarial_weight: 1.0,
            reconstruction_weight: 100.0,
            reduction: Reduction::Mean,
        }
    }
}

impl GanLossInit {
    pub fn build(self) -> GanLoss {
        let Self {
            adversarial_weight,
            reconstruction_weight,
            reduction,
        } = self;

        GanLoss {
            adversarial_weight,
            reconstruction_weight,
            reduction,
        }
    }
}

/// Least-squares adversarial loss with L1 reconstruction.
#[derive(Debug, Clone)]
pub struct GanLoss {
    adversarial_weight: f64,
    reconstruction_weight: f64,
    reduction: Reduction,
}

/// Generator loss terms.
#[derive(Debug)]
pub struct GeneratorLossOutput {
    pub total: Tensor,
    pub adversarial: Tensor,
    pub reconstruction: Tensor,
}

impl GanLoss {
    /// Compute the least-squares loss of patch predictions against an
    /// all-real or all-fake target grid.
    pub fn adversarial(&self, pred: &Tensor, is_real: bool) -> Tensor {
        let diff = pred - self.target_like(pred, is_real);
        self.reduce(&diff * &diff)
    }

    /// The fraction of patch predictions on the correct side of 0.5.
    pub fn accuracy(&self, pred: &Tensor, is_real: bool) -> f64 {
        let correct = if is_real { pred.ge(0.5) } else { pred.lt(0.5) };
        f64::from(&correct.to_kind(Kind::Float).mean(Kind::Float))
    }

    /// Compute the combined generator objective: fool the discriminator
    /// while staying close to the ground truth in L1.
    pub fn generator(
        &self,
        pred: &Tensor,
        fake_depth: &Tensor,
        target_depth: &Tensor,
    ) -> GeneratorLossOutput {
        debug_assert_eq!(
            fake_depth.size(),
            target_depth.size(),
            "generated and target depth shape must be equal"
        );

        let adversarial = self.adversarial(pred, true);
        let reconstruction = self.reduce((fake_depth - target_depth).abs());
        let total =
            &adversarial * self.adversarial_weight + &reconstruction * self.reconstruction_weight;

        GeneratorLossOutput {
            total,
            adversarial,
            reconstruction,
        }
    }

    fn target_like(&self, pred: &Tensor, is_real: bool) -> Tensor {
        if is_real {
            pred.ones_like()
        } else {
            pred.zeros_like()
        }
    }

    fn reduce(&self, loss: Tensor) -> Tensor {
        match self.reduction {
            Reduction::None => loss,
            Reduction::Sum => loss.sum(Kind::Float),
            Reduction::Mean => loss.mean(Kind::Float),
            Reduction::Other(_) => unimplemented!(),
        }
    }
}
