use crate::common::*;

pub const GENERATOR_WEIGHTS_FILE: &str = "weights_generator.ot";
pub const DISCRIMINATOR_WEIGHTS_FILE: &str = "weights_discriminator.ot";
pub const COMBINED_WEIGHTS_FILE: &str = "weights_combined.ot";

/// Save generator and discriminator parameters to the three weight files.
///
/// File names are fixed; a later save overwrites the previous one. The
/// combined file stores both parameter sets under `generator/` and
/// `discriminator/` prefixes.
pub fn save_weights(
    generator_vs: &nn::VarStore,
    discriminator_vs: &nn::VarStore,
    weights_dir: &Path,
) -> Result<()> {
    generator_vs.save(weights_dir.join(GENERATOR_WEIGHTS_FILE))?;
    discriminator_vs.save(weights_dir.join(DISCRIMINATOR_WEIGHTS_FILE))?;

    let combined: Vec<(String, Tensor)> = generator_vs
        .variables()
        .into_iter()
        .map(|(name, tensor)| (format!("generator/{}", name), tensor))
        .chain(
            discriminator_vs
                .variables()
                .into_iter()
                .map(|(name, tensor)| (format!("discriminator/{}", name), tensor)),
        )
        .sorted_by(|(lhs, _), (rhs, _)| lhs.cmp(rhs))
        .collect();
    Tensor::save_multi(&combined, weights_dir.join(COMBINED_WEIGHTS_FILE))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn save_weights_writes_three_files() -> Result<()> {
        let weights_dir =
            std::env::temp_dir().join(format!("pix2depth-weights-{}", std::process::id()));
        fs::create_dir_all(&weights_dir)?;

        let generator_vs = nn::VarStore::new(Device::Cpu);
        let discriminator_vs = nn::VarStore::new(Device::Cpu);
        let _gen_var = generator_vs.root().zeros("weight", &[2, 2]);
        let _disc_var = discriminator_vs.root().ones("weight", &[3]);

        save_weights(&generator_vs, &discriminator_vs, &weights_dir)?;

        for file in [
            GENERATOR_WEIGHTS_FILE,
            DISCRIMINATOR_WEIGHTS_FILE,
            COMBINED_WEIGHTS_FILE,
        ] {
            ensure!(
                weights_dir.join(file).is_file(),
                "missing weight file '{}'",
                file
            );
        }

        let combined = Tensor::load_multi(weights_dir.join(COMBINED_WEIGHTS_FILE))?;
        let names: Vec<_> = combined.iter().map(|(name, _)| name.as_str()).collect();
        ensure!(names.contains(&"generator/weight"));
        ensure!(names.contains(&"discriminator/weight"));

        fs::remove_dir_all(&weights_dir)?;
        Ok(())
    }
}
