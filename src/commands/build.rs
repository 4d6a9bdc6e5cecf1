use crate::cli;
use emblem_core::{
    config::Config,
    glyphs::GlyphSource,
    mapping::Mapping,
    package,
    pipeline::{self, BuildOptions},
    tools::Toolchain,
};
use std::{
    io::{BufRead, Write},
    path::{Path, PathBuf},
};

pub async fn build(
    config: &Config,
    cli_args: &cli::Cli,
    args: &cli::build::Cli,
) -> eyre::Result<()> {
    let mapping = Mapping::load(&cli_args.mapping).await?;
    let required = super::required_names(config);

    let source = GlyphSource::new(&cli_args.glyph_path);
    source.check()?;

    let toolchain = Toolchain::from_config(&config.tools);
    let mut tools = vec![&toolchain.inkscape, &toolchain.rsvg_convert];
    if !args.no_optimize {
        tools.push(&toolchain.optipng);
    }
    for tool in tools {
        let version = tool.version_string().await?;
        tracing::info!("{}: {}", tool.name(), version);
    }

    let out_dir = args
        .output
        .clone()
        .unwrap_or_else(|| PathBuf::from(pipeline::theme_dir_name(config, args.style)));
    if out_dir.exists() {
        if !args.ci && !confirm_replace(&out_dir)? {
            eyre::bail!("not replacing existing theme directory {}", out_dir.display());
        }
        tokio::fs::remove_dir_all(&out_dir).await?;
    }

    let options = BuildOptions {
        style: args.style,
        jobs: args.jobs.unwrap_or_else(pipeline::default_jobs),
        optimize: !args.no_optimize,
    };
    let report = pipeline::build(
        config,
        &mapping,
        &required,
        &source,
        &toolchain,
        &out_dir,
        &options,
    )
    .await?;

    super::print_success(
        args.ci,
        &format!(
            "built {} icons ({} files) into {}",
            report.icons,
            report.artifacts,
            report.theme_dir.display()
        ),
    )?;

    if args.package {
        let output = package::package(&out_dir, Path::new("."), &args.version_tag)?;
        super::print_success(
            args.ci,
            &format!(
                "packaged {} (checksum {})",
                output.archive.display(),
                output.checksum.display()
            ),
        )?;
    }
    Ok(())
}

fn confirm_replace(path: &Path) -> eyre::Result<bool> {
    eprint!("theme directory {} already exists, replace it? [y/N] ", path.display());
    std::io::stderr().flush()?;
    let mut answer = String::new();
    std::io::stdin().lock().read_line(&mut answer)?;
    Ok(matches!(answer.trim(), "y" | "Y"))
}
