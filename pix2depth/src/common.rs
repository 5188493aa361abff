//! Common imports from external crates.

pub use anyhow::{bail, ensure, format_err, Context, Error, Result};
pub use image::imageops::FilterType;
pub use itertools::{izip, Itertools};
pub use std::{
    borrow::Borrow,
    cmp::Ordering,
    collections::HashMap,
    fmt::Debug,
    num::NonZeroUsize,
    ops::Range,
    path::{Path, PathBuf},
};
pub use tch::{
    nn::{self, ModuleT as _, OptimizerConfig as _},
    Device, IndexOp, Kind, Reduction, Tensor,
};
pub use tracing::{info, warn};

pub type Fallible<T> = Result<T, Error>;
