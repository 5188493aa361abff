use anyhow::{bail, format_err, Context, Error, Result};
use std::{env, path::PathBuf, str::FromStr, sync::Arc};
use structopt::StructOpt;
use tracing_subscriber::{filter::LevelFilter, prelude::*, EnvFilter};
use train::config::Config;

#[derive(Debug, Clone, StructOpt)]
/// Train the RGB-to-depth conditional GAN
struct Args {
    #[structopt(short = "m", long, default_value = "train")]
    /// program mode, either 'train' or 'test'
    pub mode: Mode,
    #[structopt(long, default_value = "train.json5")]
    /// configuration file
    pub config_file: PathBuf,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Train,
    Test,
}

impl FromStr for Mode {
    type Err = Error;

    fn from_str(text: &str) -> Result<Self> {
        let mode = match text {
            "train" => Self::Train,
            "test" => Self::Test,
            _ => return Err(format_err!("unrecognized mode '{}'", text)),
        };
        Ok(mode)
    }
}

pub fn main() -> Result<()> {
    // setup tracing
    let fmt_layer = tracing_subscriber::fmt::layer().with_target(true).compact();
    let filter_layer = {
        let filter = EnvFilter::from_default_env();
        if env::var("RUST_LOG").is_err() {
            filter.add_directive(LevelFilter::INFO.into())
        } else {
            filter
        }
    };

    tracing_subscriber::registry()
        .with(filter_layer)
        .with(fmt_layer)
        .init();

    // parse arguments
    let Args { mode, config_file } = Args::from_args();

    match mode {
        Mode::Train => {
            let config = Arc::new(Config::open(&config_file).with_context(|| {
                format!("failed to load config file '{}'", config_file.display())
            })?);
            train::start(config)?;
        }
        Mode::Test => {
            bail!("test mode is not implemented yet");
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_mode() {
        assert_eq!("train".parse::<Mode>().unwrap(), Mode::Train);
        assert_eq!("test".parse::<Mode>().unwrap(), Mode::Test);
        assert!("serve".parse::<Mode>().is_err());
    }
}
