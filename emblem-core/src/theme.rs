//! Theme tree assembly and descriptor generation.
//!
//! The assembler runs after every glyph task has finished. Directory
//! entries are tracked in a sorted map so the descriptor comes out
//! byte-identical across repeated builds.

use crate::mapping::{Context, IconName};
use std::{
    collections::BTreeMap,
    fmt::Write as _,
    path::{Path, PathBuf},
};

/// Descriptor metadata for the `[Icon Theme]` group.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct ThemeMeta {
    pub name: String,
    pub comment: String,
    pub inherits: String,
    pub example: String,
}

/// One populated directory of the theme tree.
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Copy, Clone)]
pub enum ThemeDir {
    Fixed { size: u32, context: Context },
    Scalable { context: Context },
}

impl ThemeDir {
    pub fn rel_path(&self) -> String {
        match self {
            ThemeDir::Fixed { size, context } => {
                format!("{size}x{size}/{}", context.dir_name())
            }
            ThemeDir::Scalable { context } => format!("scalable/{}", context.dir_name()),
        }
    }

    fn descriptor_group(&self) -> String {
        let mut group = String::new();
        match self {
            ThemeDir::Fixed { size, context } => {
                writeln!(group, "[{}]", self.rel_path()).unwrap();
                writeln!(group, "Size={size}").unwrap();
                writeln!(group, "Context={}", context.display_name()).unwrap();
                writeln!(group, "Type=Fixed").unwrap();
            }
            ThemeDir::Scalable { context } => {
                writeln!(group, "[{}]", self.rel_path()).unwrap();
                writeln!(group, "Size=24").unwrap();
                writeln!(group, "Context={}", context.display_name()).unwrap();
                writeln!(group, "Type=Scalable").unwrap();
                writeln!(group, "MinSize=8").unwrap();
                writeln!(group, "MaxSize=256").unwrap();
            }
        }
        group
    }
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("i/o error writing {}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Writes artifacts into the theme tree and generates `index.theme`.
#[derive(Debug)]
pub struct Assembler {
    root: PathBuf,
    // keyed by relative path so iteration order matches the descriptor's
    // lexicographic Directories list
    directories: BTreeMap<String, ThemeDir>,
}

impl Assembler {
    pub fn new(root: impl Into<PathBuf>) -> Assembler {
        Assembler {
            root: root.into(),
            directories: BTreeMap::new(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn directories(&self) -> impl Iterator<Item = &str> {
        self.directories.keys().map(String::as_str)
    }

    pub async fn write_svg(
        &mut self,
        context: Context,
        name: &IconName,
        svg: &[u8],
    ) -> Result<PathBuf, Error> {
        let dir = ThemeDir::Scalable { context };
        self.write_artifact(dir, format!("{name}.svg"), svg).await
    }

    pub async fn write_png(
        &mut self,
        size: u32,
        context: Context,
        name: &IconName,
        png: &[u8],
    ) -> Result<PathBuf, Error> {
        let dir = ThemeDir::Fixed { size, context };
        self.write_artifact(dir, format!("{name}.png"), png).await
    }

    async fn write_artifact(
        &mut self,
        dir: ThemeDir,
        filename: String,
        data: &[u8],
    ) -> Result<PathBuf, Error> {
        let dir_path = self.root.join(dir.rel_path());
        tokio::fs::create_dir_all(&dir_path)
            .await
            .map_err(|e| Error::Io {
                path: dir_path.clone(),
                source: e,
            })?;
        let path = dir_path.join(filename);
        tokio::fs::write(&path, data).await.map_err(|e| Error::Io {
            path: path.clone(),
            source: e,
        })?;
        self.directories.insert(dir.rel_path(), dir);
        Ok(path)
    }

    /// Renders the `index.theme` contents for the directories populated
    /// so far.
    pub fn descriptor(&self, meta: &ThemeMeta) -> String {
        let mut out = String::new();
        writeln!(out, "[Icon Theme]").unwrap();
        writeln!(out, "Name={}", meta.name).unwrap();
        writeln!(out, "Comment={}", meta.comment).unwrap();
        writeln!(out, "Inherits={}", meta.inherits).unwrap();
        writeln!(out, "Example={}", meta.example).unwrap();
        writeln!(
            out,
            "Directories={}",
            self.directories.keys().cloned().collect::<Vec<_>>().join(",")
        )
        .unwrap();

        for dir in self.directories.values() {
            writeln!(out).unwrap();
            out.push_str(&dir.descriptor_group());
        }
        out
    }

    pub async fn write_descriptor(&self, meta: &ThemeMeta) -> Result<PathBuf, Error> {
        let path = self.root.join("index.theme");
        tokio::fs::create_dir_all(&self.root)
            .await
            .map_err(|e| Error::Io {
                path: self.root.clone(),
                source: e,
            })?;
        tokio::fs::write(&path, self.descriptor(meta))
            .await
            .map_err(|e| Error::Io {
                path: path.clone(),
                source: e,
            })?;
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn meta() -> ThemeMeta {
        ThemeMeta {
            name: "Material Symbols Filled".to_string(),
            comment: "Material Design glyphs adapted for KDE Plasma.".to_string(),
            inherits: "breeze".to_string(),
            example: "folder".to_string(),
        }
    }

    #[tokio::test]
    async fn should_write_artifacts_under_size_and_context() {
        let tmp = tempfile::tempdir().unwrap();
        let mut assembler = Assembler::new(tmp.path());
        let name = IconName("edit-copy".to_string());

        assembler
            .write_svg(Context::Actions, &name, b"<svg/>")
            .await
            .unwrap();
        assembler
            .write_png(16, Context::Actions, &name, b"png")
            .await
            .unwrap();

        assert!(tmp.path().join("scalable/actions/edit-copy.svg").is_file());
        assert!(tmp.path().join("16x16/actions/edit-copy.png").is_file());
        assert_eq!(
            assembler.directories().collect::<Vec<_>>(),
            vec!["16x16/actions", "scalable/actions"]
        );
    }

    #[tokio::test]
    async fn should_list_directories_in_lexicographic_order() {
        let tmp = tempfile::tempdir().unwrap();
        let mut assembler = Assembler::new(tmp.path());
        let name = IconName("folder".to_string());

        for size in [256, 16, 128] {
            assembler
                .write_png(size, Context::Places, &name, b"png")
                .await
                .unwrap();
        }
        assembler
            .write_png(16, Context::Actions, &name, b"png")
            .await
            .unwrap();

        assert_eq!(
            assembler.directories().collect::<Vec<_>>(),
            vec![
                "128x128/places",
                "16x16/actions",
                "16x16/places",
                "256x256/places",
            ]
        );
    }

    #[tokio::test]
    async fn should_render_descriptor_with_directory_groups() {
        let tmp = tempfile::tempdir().unwrap();
        let mut assembler = Assembler::new(tmp.path());
        let name = IconName("edit-copy".to_string());

        assembler
            .write_svg(Context::Actions, &name, b"<svg/>")
            .await
            .unwrap();
        assembler
            .write_png(16, Context::Actions, &name, b"png")
            .await
            .unwrap();

        let descriptor = assembler.descriptor(&meta());

        assert_eq!(
            descriptor,
            "[Icon Theme]\n\
             Name=Material Symbols Filled\n\
             Comment=Material Design glyphs adapted for KDE Plasma.\n\
             Inherits=breeze\n\
             Example=folder\n\
             Directories=16x16/actions,scalable/actions\n\
             \n\
             [16x16/actions]\n\
             Size=16\n\
             Context=Actions\n\
             Type=Fixed\n\
             \n\
             [scalable/actions]\n\
             Size=24\n\
             Context=Actions\n\
             Type=Scalable\n\
             MinSize=8\n\
             MaxSize=256\n"
        );
    }

    #[tokio::test]
    async fn descriptor_is_identical_across_repeated_builds() {
        let name = IconName("go-home".to_string());
        let mut descriptors = Vec::new();

        for _ in 0..2 {
            let tmp = tempfile::tempdir().unwrap();
            let mut assembler = Assembler::new(tmp.path());
            assembler
                .write_png(32, Context::Actions, &name, b"png")
                .await
                .unwrap();
            assembler
                .write_svg(Context::Actions, &name, b"<svg/>")
                .await
                .unwrap();
            descriptors.push(assembler.descriptor(&meta()));
        }

        assert_eq!(descriptors[0], descriptors[1]);
    }

    #[tokio::test]
    async fn should_write_descriptor_file() {
        let tmp = tempfile::tempdir().unwrap();
        let mut assembler = Assembler::new(tmp.path());
        assembler
            .write_svg(Context::Places, &IconName("folder".to_string()), b"<svg/>")
            .await
            .unwrap();

        let path = assembler.write_descriptor(&meta()).await.unwrap();

        assert_eq!(path, tmp.path().join("index.theme"));
        let contents = std::fs::read_to_string(path).unwrap();
        assert!(contents.starts_with("[Icon Theme]\n"));
        assert!(contents.contains("Directories=scalable/places\n"));
    }
}
