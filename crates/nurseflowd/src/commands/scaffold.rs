use std::path::Path;

use nurseflow_core::WardConfig;

pub fn run(out: &Path, force: bool) -> anyhow::Result<()> {
    if out.exists() && !force {
        anyhow::bail!("{} already exists (use --force to overwrite)", out.display());
    }
    std::fs::write(out, WardConfig::scaffold().to_toml_string()?)?;
    println!("✓ Generated {}", out.display());
    Ok(())
}
