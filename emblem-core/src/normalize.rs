//! Glyph normalization: Inkscape flattens the upstream SVG, then the
//! markup is rewritten into the canonical theme form (24x24 viewbox,
//! currentColor fills).

use crate::tools::{self, Tool};
use quick_xml::events::{BytesStart, Event};
use quick_xml::{Reader, Writer};
use std::{
    ffi::OsString,
    io::Cursor,
    path::{Path, PathBuf},
};

const SHAPE_ELEMENTS: [&[u8]; 7] = [
    b"path",
    b"rect",
    b"circle",
    b"ellipse",
    b"polygon",
    b"polyline",
    b"line",
];

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Tool(#[from] tools::Error),
    #[error("exported svg for {} is not valid UTF-8", .0.display())]
    InvalidUtf8(PathBuf),
    #[error("error rewriting svg markup")]
    Xml(#[source] quick_xml::Error),
    #[error("i/o error during normalization")]
    Io(#[source] std::io::Error),
}

#[derive(Debug, Clone)]
pub struct Normalizer {
    inkscape: Tool,
}

impl Normalizer {
    pub fn new(inkscape: Tool) -> Normalizer {
        Normalizer { inkscape }
    }

    /// Produces the canonical single-color SVG for an upstream glyph file.
    pub async fn normalize(&self, source: &Path) -> Result<Vec<u8>, Error> {
        let tmp = tempfile::tempdir().map_err(Error::Io)?;
        let exported = tmp.path().join("export.svg");

        let mut filename_arg = OsString::from("--export-filename=");
        filename_arg.push(&exported);
        let args: Vec<OsString> = vec![
            source.as_os_str().to_owned(),
            OsString::from("--export-plain-svg"),
            filename_arg,
            OsString::from("--export-area-drawing"),
            OsString::from("--vacuum-defs"),
        ];
        self.inkscape.run(&args).await?;

        let exported_svg = match tokio::fs::read(&exported).await {
            Ok(bytes) if !bytes.is_empty() => bytes,
            Ok(_) | Err(_) => {
                return Err(Error::Tool(tools::Error::EmptyOutput {
                    tool: self.inkscape.name(),
                }))
            }
        };

        canonicalize_svg(&exported_svg, source)
    }
}

/// Rewrites exported SVG markup into the theme's canonical form: the root
/// element gets a fixed 24x24 viewbox and every filled shape is driven by
/// `currentColor`. Existing `fill="none"` markers are kept.
fn canonicalize_svg(svg: &[u8], source: &Path) -> Result<Vec<u8>, Error> {
    let text =
        std::str::from_utf8(svg).map_err(|_| Error::InvalidUtf8(source.to_owned()))?;
    let mut reader = Reader::from_str(text);
    let mut writer = Writer::new(Cursor::new(Vec::new()));

    loop {
        match reader.read_event().map_err(Error::Xml)? {
            Event::Eof => break,
            Event::Start(e) => {
                let rewritten = rewrite_element(&e)?;
                writer.write_event(Event::Start(rewritten)).map_err(Error::Xml)?;
            }
            Event::Empty(e) => {
                let rewritten = rewrite_element(&e)?;
                writer.write_event(Event::Empty(rewritten)).map_err(Error::Xml)?;
            }
            other => writer.write_event(other).map_err(Error::Xml)?,
        }
    }

    Ok(writer.into_inner().into_inner())
}

fn rewrite_element(e: &BytesStart<'_>) -> Result<BytesStart<'static>, Error> {
    let local = e.local_name();
    if local.as_ref() == b"svg" {
        rebuild(e, &["width", "height", "viewBox"], |out| {
            out.push_attribute(("width", "24"));
            out.push_attribute(("height", "24"));
            out.push_attribute(("viewBox", "0 0 24 24"));
        })
    } else if SHAPE_ELEMENTS.contains(&local.as_ref()) {
        // keep fill="none" backing shapes, recolor everything else
        if attribute_value(e, b"fill")?.as_deref() == Some("none") {
            return Ok(e.to_owned().into_owned());
        }
        rebuild(e, &["fill"], |out| {
            out.push_attribute(("fill", "currentColor"));
        })
    } else {
        Ok(e.to_owned().into_owned())
    }
}

fn rebuild(
    e: &BytesStart<'_>,
    drop_attrs: &[&str],
    add_attrs: impl FnOnce(&mut BytesStart<'static>),
) -> Result<BytesStart<'static>, Error> {
    let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
    let mut out = BytesStart::new(name);
    for attr in e.attributes() {
        let attr = attr.map_err(|err| Error::Xml(quick_xml::Error::InvalidAttr(err)))?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        if drop_attrs.contains(&key.as_str()) {
            continue;
        }
        let value = String::from_utf8_lossy(&attr.value).into_owned();
        out.push_attribute((key.as_str(), value.as_str()));
    }
    add_attrs(&mut out);
    Ok(out)
}

fn attribute_value(e: &BytesStart<'_>, name: &[u8]) -> Result<Option<String>, Error> {
    for attr in e.attributes() {
        let attr = attr.map_err(|err| Error::Xml(quick_xml::Error::InvalidAttr(err)))?;
        if attr.key.as_ref() == name {
            return Ok(Some(String::from_utf8_lossy(&attr.value).into_owned()));
        }
    }
    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn canonicalize(svg: &str) -> String {
        let out = canonicalize_svg(svg.as_bytes(), Path::new("test.svg")).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn should_force_24x24_viewbox_on_root() {
        let out = canonicalize(
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="48" height="48" viewBox="0 0 48 48"><path d="M2 2h20v20H2z"/></svg>"#,
        );

        assert!(out.contains(r#"width="24""#));
        assert!(out.contains(r#"height="24""#));
        assert!(out.contains(r#"viewBox="0 0 24 24""#));
        assert!(!out.contains("48"));
        assert!(out.contains(r#"xmlns="http://www.w3.org/2000/svg""#));
    }

    #[test]
    fn should_recolor_shapes_with_current_color() {
        let out = canonicalize(
            r##"<svg width="24" height="24" viewBox="0 0 24 24"><path d="M2 2h20" fill="#e8eaed"/><circle cx="12" cy="12" r="4"/></svg>"##,
        );

        assert!(!out.contains("#e8eaed"));
        assert_eq!(out.matches(r#"fill="currentColor""#).count(), 2);
    }

    #[test]
    fn should_keep_fill_none_backing_shapes() {
        let out = canonicalize(
            r#"<svg viewBox="0 0 24 24"><path d="M0 0h24v24H0z" fill="none"/><path d="M4 4h16"/></svg>"#,
        );

        assert!(out.contains(r#"fill="none""#));
        assert_eq!(out.matches(r#"fill="currentColor""#).count(), 1);
    }

    #[test]
    fn should_leave_group_elements_alone() {
        let out = canonicalize(
            r#"<svg viewBox="0 0 24 24"><g transform="translate(2 2)"><rect width="4" height="4"/></g></svg>"#,
        );

        assert!(out.contains(r#"<g transform="translate(2 2)">"#));
        assert!(out.contains(r#"fill="currentColor""#));
    }

    #[test]
    fn should_fail_on_invalid_utf8() {
        let err = canonicalize_svg(&[0xff, 0xfe, 0x00], Path::new("bad.svg")).unwrap_err();

        assert!(matches!(err, Error::InvalidUtf8(_)));
    }
}
