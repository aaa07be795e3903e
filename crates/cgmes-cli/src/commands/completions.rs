use std::{fs, io, path::Path};

use anyhow::{Context, Result};
use clap_complete::{generate, Shell};

use cgmes_cli::cli::build_cli_command;

pub fn handle(shell: Shell, out: Option<&Path>) -> Result<()> {
    let mut cmd = build_cli_command();
    match out {
        Some(path) => {
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)
                    .with_context(|| format!("creating '{}'", parent.display()))?;
            }
            let mut file = fs::File::create(path)
                .with_context(|| format!("creating completion file '{}'", path.display()))?;
            generate(shell, &mut cmd, "cgmes", &mut file);
            println!("Wrote {shell:?} completion to {}", path.display());
        }
        None => generate(shell, &mut cmd, "cgmes", &mut io::stdout()),
    }
    Ok(())
}
