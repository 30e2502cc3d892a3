//! `mfront-interfaces generate` command

use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::cli::GenerateArgs;
use mfront_interfaces::core::ManifestFormat;
use mfront_interfaces::ops::generate::{generate, resolve_behaviours, GenerateOptions};
use mfront_interfaces::util::config::{global_config_path, load_config, project_config_path};
use mfront_interfaces::util::diagnostic::{emit, Diagnostic};
use mfront_interfaces::util::fs::{relative_path, to_manifest_path};
use mfront_interfaces::GenerationContext;

pub fn execute(args: GenerateArgs, color: bool) -> Result<()> {
    let cwd = std::env::current_dir().context("failed to get the current directory")?;

    // Load configuration (global + project)
    let config = load_config(global_config_path().as_deref(), &project_config_path(&cwd));

    // Output directory: CLI > config > current directory
    let output_dir = args
        .output_dir
        .or_else(|| config.generation.output_dir.clone())
        .unwrap_or_else(|| PathBuf::from("."));

    // Manifest format: CLI > config > json
    let manifest_format = match args.manifest {
        Some(m) => m
            .parse::<ManifestFormat>()
            .map_err(|e| anyhow::anyhow!("{}", e))?,
        None => config.generation.manifest_format.unwrap_or_default(),
    };

    let mut ctx = GenerationContext::from_config(&output_dir, &config);
    if args.debug {
        ctx.set_debug(true);
    }
    if args.mtest_on_failure {
        ctx.set_generate_mtest_on_failure(true);
    }

    for behaviour in resolve_behaviours(&cwd, &args.behaviours)? {
        let opts = GenerateOptions {
            behaviour,
            interfaces: args.interfaces.clone(),
            keywords: args.keywords.clone(),
            manifest_format,
        };

        let result = generate(&ctx, &opts)?;

        for key in &result.unused_keywords {
            let mut diag =
                Diagnostic::warning(format!("keyword `{}` is not used by any interface", key))
                    .with_suggestion(
                        "Prefix it with the interface name or scope it with `[<interface>]`",
                    );
            if let Some(path) = &opts.keywords {
                diag = diag.with_location(path);
            }
            emit(&diag, color);
        }

        for file in &result.files {
            eprintln!(
                "   Generated {}",
                to_manifest_path(&relative_path(ctx.output_dir(), file))
            );
        }
        eprintln!(
            "    Finished `{}` -> {}",
            result.behaviour,
            result.manifest.display()
        );
    }

    Ok(())
}
