//! The build pipeline: coverage gate, per-glyph worker pool, join
//! barrier, theme assembly.
//!
//! Glyph work is dispatched as stateless tasks over a bounded pool: one
//! normalization task per mapping record, then one rasterization task per
//! (record, size) pair. Nothing is written to the theme tree until every
//! task has finished.

use crate::{
    config::Config,
    coverage::{self, CoverageError, RequiredNames},
    glyphs::{self, GlyphSource, Style, PLACEHOLDER_SVG},
    mapping::{Context, GlyphId, IconName, Mapping, Record},
    normalize::{self, Normalizer},
    raster::{self, Rasterizer},
    theme::{self, Assembler, ThemeMeta},
    tools::Toolchain,
};
use futures::{stream, StreamExt, TryStreamExt};
use std::{
    num::NonZeroUsize,
    path::{Path, PathBuf},
    sync::Arc,
};

#[derive(Debug, Clone)]
pub struct BuildOptions {
    pub style: Style,
    /// Upper bound on concurrently running glyph tasks.
    pub jobs: usize,
    /// Whether PNGs are passed through optipng.
    pub optimize: bool,
}

impl Default for BuildOptions {
    fn default() -> Self {
        BuildOptions {
            style: Style::default(),
            jobs: default_jobs(),
            optimize: true,
        }
    }
}

pub fn default_jobs() -> usize {
    std::thread::available_parallelism()
        .map(NonZeroUsize::get)
        .unwrap_or(4)
}

#[derive(Debug)]
pub struct BuildReport {
    pub icons: usize,
    pub artifacts: usize,
    pub theme_dir: PathBuf,
    pub descriptor: PathBuf,
}

#[derive(Debug, thiserror::Error)]
pub enum IconError {
    #[error(transparent)]
    Glyph(#[from] glyphs::Error),
    #[error("normalization failed")]
    Normalize(#[source] normalize::Error),
    #[error("rasterization at {size}x{size} failed")]
    Raster {
        size: u32,
        #[source]
        source: raster::Error,
    },
}

#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error(transparent)]
    Coverage(#[from] CoverageError),
    #[error("failed to build icon '{name}' from glyph '{glyph}'")]
    Icon {
        name: IconName,
        glyph: GlyphId,
        #[source]
        source: IconError,
    },
    #[error("failed to assemble theme")]
    Assemble(#[source] theme::Error),
}

impl BuildError {
    fn icon(record: &Record, source: IconError) -> BuildError {
        BuildError::Icon {
            name: record.name.clone(),
            glyph: record.source.clone(),
            source,
        }
    }
}

#[derive(Debug, Clone)]
struct NormalizedIcon {
    name: IconName,
    glyph: GlyphId,
    context: Context,
    svg: Arc<Vec<u8>>,
}

#[derive(Debug)]
struct PngArtifact {
    icon: usize,
    size: u32,
    png: Vec<u8>,
}

/// Runs the whole pipeline against an already-loaded mapping. Halts at
/// the coverage gate before any external tool is invoked.
pub async fn build(
    config: &Config,
    mapping: &Mapping,
    required: &RequiredNames,
    source: &GlyphSource,
    toolchain: &Toolchain,
    out_dir: &Path,
    options: &BuildOptions,
) -> Result<BuildReport, BuildError> {
    coverage::verify(mapping, required)?;
    tracing::info!(
        icons = mapping.len(),
        sizes = config.build.sizes.len(),
        style = %options.style,
        "coverage check passed, starting build"
    );

    let normalizer = Normalizer::new(toolchain.inkscape.clone());
    let mut rasterizer = Rasterizer::new(toolchain.rsvg_convert.clone(), &config.build.text_color);
    if options.optimize {
        rasterizer = rasterizer.with_optipng(toolchain.optipng.clone());
    }
    let jobs = options.jobs.max(1);

    let icons: Vec<NormalizedIcon> = stream::iter(
        mapping
            .records()
            .map(|record| normalize_record(record, source, &normalizer, options.style)),
    )
    .buffer_unordered(jobs)
    .try_collect()
    .await?;

    let mut pngs: Vec<PngArtifact> = stream::iter(
        raster_tasks(icons.len(), &config.build.sizes)
            .into_iter()
            .map(|(idx, size)| {
                let icon = &icons[idx];
                let rasterizer = &rasterizer;
                async move {
                    let png = rasterizer.rasterize(&icon.svg, size).await.map_err(|e| {
                        BuildError::Icon {
                            name: icon.name.clone(),
                            glyph: icon.glyph.clone(),
                            source: IconError::Raster { size, source: e },
                        }
                    })?;
                    Ok::<_, BuildError>(PngArtifact {
                        icon: idx,
                        size,
                        png,
                    })
                }
            }),
    )
    .buffer_unordered(jobs)
    .try_collect()
    .await?;
    pngs.sort_by_key(|artifact| (artifact.icon, artifact.size));

    // all tasks joined, the tree is written in one sequential pass
    let mut assembler = Assembler::new(out_dir);
    let mut artifacts = 0;
    for icon in &icons {
        assembler
            .write_svg(icon.context, &icon.name, &icon.svg)
            .await
            .map_err(BuildError::Assemble)?;
        artifacts += 1;
    }
    for artifact in &pngs {
        let icon = &icons[artifact.icon];
        assembler
            .write_png(artifact.size, icon.context, &icon.name, &artifact.png)
            .await
            .map_err(BuildError::Assemble)?;
        artifacts += 1;
    }

    let meta = theme_meta(config, options.style);
    let descriptor = assembler
        .write_descriptor(&meta)
        .await
        .map_err(BuildError::Assemble)?;

    tracing::info!(
        icons = icons.len(),
        artifacts,
        theme_dir = %out_dir.display(),
        "build complete"
    );
    Ok(BuildReport {
        icons: icons.len(),
        artifacts,
        theme_dir: out_dir.to_owned(),
        descriptor,
    })
}

async fn normalize_record(
    record: &Record,
    source: &GlyphSource,
    normalizer: &Normalizer,
    style: Style,
) -> Result<NormalizedIcon, BuildError> {
    let svg = if record.source.is_placeholder() {
        tracing::debug!(icon = %record.name, "using placeholder glyph");
        PLACEHOLDER_SVG.as_bytes().to_vec()
    } else {
        tracing::info!(icon = %record.name, glyph = %record.source, "normalizing");
        let path = source
            .locate(&record.source, style)
            .map_err(|e| BuildError::icon(record, IconError::Glyph(e)))?;
        normalizer
            .normalize(&path)
            .await
            .map_err(|e| BuildError::icon(record, IconError::Normalize(e)))?
    };
    Ok(NormalizedIcon {
        name: record.name.clone(),
        glyph: record.source.clone(),
        context: record.context,
        svg: Arc::new(svg),
    })
}

/// One rasterization task per (icon, size) pair.
fn raster_tasks(icon_count: usize, sizes: &[u32]) -> Vec<(usize, u32)> {
    let mut tasks = Vec::with_capacity(icon_count * sizes.len());
    for idx in 0..icon_count {
        for &size in sizes {
            tasks.push((idx, size));
        }
    }
    tasks
}

pub fn theme_meta(config: &Config, style: Style) -> ThemeMeta {
    ThemeMeta {
        name: format!("{} {}", config.theme.name, style.label()),
        comment: config.theme.comment.clone(),
        inherits: config.theme.inherits.clone(),
        example: config.theme.example.clone(),
    }
}

/// Default output directory name, derived from the configured theme name
/// and the selected style.
pub fn theme_dir_name(config: &Config, style: Style) -> String {
    let mut slug = String::new();
    for c in config.theme.name.chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
        } else if !slug.ends_with('-') {
            slug.push('-');
        }
    }
    let slug = slug.trim_matches('-');
    format!("{}-{}", slug, style)
}
