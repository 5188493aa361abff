//! Conditional GAN toolkit for RGB to depth translation.
//!
//! The crate provides the building blocks used by the training program:
//! the paired image/depth dataset, the U-Net generator and PatchGAN
//! discriminator modules, and the combined adversarial + reconstruction
//! loss.

pub mod common;
pub mod dataset;
pub mod loss;
pub mod model;
