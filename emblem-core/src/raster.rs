//! Rasterization of canonical SVGs to fixed-size PNGs via rsvg-convert,
//! with optional optipng optimization. Pure per call: all intermediate
//! files live in a fresh temp directory.

use crate::tools::{self, Tool};
use std::ffi::OsString;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Tool(#[from] tools::Error),
    #[error("produced file is not a PNG")]
    NotAPng,
    #[error("expected a {expected}x{expected} image, got {width}x{height}")]
    WrongDimensions {
        expected: u32,
        width: u32,
        height: u32,
    },
    #[error("i/o error during rasterization")]
    Io(#[source] std::io::Error),
}

#[derive(Debug, Clone)]
pub struct Rasterizer {
    rsvg_convert: Tool,
    optipng: Option<Tool>,
    color: String,
}

impl Rasterizer {
    pub fn new(rsvg_convert: Tool, color: impl Into<String>) -> Rasterizer {
        Rasterizer {
            rsvg_convert,
            optipng: None,
            color: color.into(),
        }
    }

    pub fn with_optipng(mut self, optipng: Tool) -> Rasterizer {
        self.optipng = Some(optipng);
        self
    }

    /// Renders the SVG to a `size`x`size` PNG. `currentColor` resolves to
    /// the configured color through a generated stylesheet.
    pub async fn rasterize(&self, svg: &[u8], size: u32) -> Result<Vec<u8>, Error> {
        let tmp = tempfile::tempdir().map_err(Error::Io)?;
        let input = tmp.path().join("icon.svg");
        let stylesheet = tmp.path().join("color.css");
        let output = tmp.path().join("icon.png");

        tokio::fs::write(&input, svg).await.map_err(Error::Io)?;
        tokio::fs::write(&stylesheet, format!("svg {{ color: {}; }}\n", self.color))
            .await
            .map_err(Error::Io)?;

        let mut stylesheet_arg = OsString::from("--stylesheet=");
        stylesheet_arg.push(&stylesheet);
        let size_str = size.to_string();
        let args: Vec<OsString> = vec![
            OsString::from("-w"),
            OsString::from(&size_str),
            OsString::from("-h"),
            OsString::from(&size_str),
            stylesheet_arg,
            input.as_os_str().to_owned(),
            OsString::from("-o"),
            output.as_os_str().to_owned(),
        ];
        self.rsvg_convert.run(&args).await?;

        if let Some(optipng) = &self.optipng {
            let args: Vec<OsString> = vec![
                OsString::from("-o7"),
                OsString::from("-quiet"),
                output.as_os_str().to_owned(),
            ];
            optipng.run(&args).await?;
        }

        let png = match tokio::fs::read(&output).await {
            Ok(bytes) if !bytes.is_empty() => bytes,
            Ok(_) | Err(_) => {
                return Err(Error::Tool(tools::Error::EmptyOutput {
                    tool: self.rsvg_convert.name(),
                }))
            }
        };

        let (width, height) = png_dimensions(&png).ok_or(Error::NotAPng)?;
        if (width, height) != (size, size) {
            return Err(Error::WrongDimensions {
                expected: size,
                width,
                height,
            });
        }

        Ok(png)
    }
}

/// Reads the image dimensions from a PNG's IHDR chunk.
fn png_dimensions(data: &[u8]) -> Option<(u32, u32)> {
    const SIGNATURE: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a];

    if data.len() < 24 || data[..8] != SIGNATURE || &data[12..16] != b"IHDR" {
        return None;
    }
    let width = u32::from_be_bytes(data[16..20].try_into().ok()?);
    let height = u32::from_be_bytes(data[20..24].try_into().ok()?);
    Some((width, height))
}
