//! Common imports from external crates.

pub use anyhow::{bail, ensure, format_err, Context, Error, Result};
pub use chrono::Local;
pub use itertools::Itertools;
pub use noisy_float::prelude::*;
pub use pix2depth::{
    dataset::DepthPairDataset,
    loss::{GanLoss, GanLossInit},
    model::{PatchDiscriminator, PatchDiscriminatorInit, UnetGenerator, UnetGeneratorInit},
};
pub use serde::{Deserialize, Serialize};
pub use std::{
    borrow::Cow,
    fmt::Debug,
    fs,
    num::NonZeroUsize,
    path::{Path, PathBuf},
    sync::Arc,
    thread,
    time::{Duration, Instant},
};
pub use tch::{
    nn::{self, ModuleT as _, OptimizerConfig as _},
    Device, IndexOp, Kind, Reduction, Tensor,
};
pub use tracing::{info, warn};

pub type Fallible<T> = Result<T, Error>;
