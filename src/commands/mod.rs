use crate::cli;
use emblem_core::{
    config::Config,
    coverage::{self, RequiredNames},
    glyphs::GlyphSource,
    mapping::Mapping,
    tools::Toolchain,
};
use std::io::Write;
use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

mod build;

pub use build::build;

pub async fn check(
    config: &Config,
    cli_args: &cli::Cli,
    args: &cli::check::Cli,
) -> eyre::Result<()> {
    let mapping = Mapping::load(&cli_args.mapping).await?;
    let required = required_names(config);

    let missing = coverage::check(&mapping, &required);
    if !missing.is_empty() {
        for name in &missing {
            tracing::error!("missing required icon name: {}", name);
        }
        return Err(coverage::CoverageError { missing }.into());
    }
    println!(
        "mapping covers all {} required icon names ({} icons total)",
        required.len(),
        mapping.len()
    );

    if args.glyphs {
        let source = GlyphSource::new(&cli_args.glyph_path);
        source.check()?;
        for record in mapping.records() {
            if record.source.is_placeholder() {
                continue;
            }
            source.locate(&record.source, args.style)?;
        }
        println!(
            "all mapped glyphs exist in {} ({} style)",
            cli_args.glyph_path.display(),
            args.style
        );
    }
    Ok(())
}

pub fn config(config: &Config) -> eyre::Result<()> {
    print!("{}", toml::to_string_pretty(config)?);
    Ok(())
}

pub async fn version(config: &Config) -> eyre::Result<()> {
    println!("emblem: {}", emblem_core::VERSION);

    let toolchain = Toolchain::from_config(&config.tools);
    for tool in [
        &toolchain.inkscape,
        &toolchain.rsvg_convert,
        &toolchain.optipng,
    ] {
        match tool.version_string().await {
            Ok(version) => println!("{}: {}", tool.name(), version),
            Err(err) => println!(
                "{}: could not determine version ({}), is it installed?",
                tool.name(),
                err
            ),
        }
    }
    Ok(())
}

pub(crate) fn required_names(config: &Config) -> RequiredNames {
    let mut required = RequiredNames::builtin();
    required.extend(config.build.extra_required.iter().cloned());
    required
}

pub(crate) fn print_success(ci: bool, message: &str) -> eyre::Result<()> {
    let choice = if ci {
        ColorChoice::Never
    } else {
        ColorChoice::Auto
    };
    let mut stdout = StandardStream::stdout(choice);
    stdout.set_color(ColorSpec::new().set_fg(Some(Color::Green)).set_bold(true))?;
    writeln!(&mut stdout, "{}", message)?;
    stdout.reset()?;
    Ok(())
}
