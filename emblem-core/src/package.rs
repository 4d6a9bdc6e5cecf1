//! Packaging of an assembled theme tree into a tar.xz archive with a
//! sha256 sidecar.

use std::{
    fs::File,
    path::{Path, PathBuf},
};

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("theme directory {} does not exist", .0.display())]
    MissingTree(PathBuf),
    #[error("theme directory {} has no usable name", .0.display())]
    UnnamedTree(PathBuf),
    #[error("i/o error while packaging")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, PartialEq, Eq, Clone)]
pub struct PackageOutput {
    pub archive: PathBuf,
    pub checksum: PathBuf,
}

/// Archives `tree_root` as `<name>_<version>.tar.xz` under `dest_dir` and
/// writes a `sha256sum`-style sidecar next to it. Entries are appended in
/// sorted path order so identical trees produce identical archives.
pub fn package(tree_root: &Path, dest_dir: &Path, version: &str) -> Result<PackageOutput, Error> {
    if !tree_root.is_dir() {
        return Err(Error::MissingTree(tree_root.to_owned()));
    }
    let theme_name = tree_root
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| Error::UnnamedTree(tree_root.to_owned()))?
        .to_owned();

    std::fs::create_dir_all(dest_dir)?;
    let archive_name = format!("{theme_name}_{version}.tar.xz");
    let archive = dest_dir.join(&archive_name);

    let mut xz = xz2::write::XzEncoder::new(File::create(&archive)?, 6);
    {
        let mut tar = tar::Builder::new(&mut xz);
        for (rel, path) in sorted_files(tree_root)? {
            tar.append_path_with_name(&path, Path::new(&theme_name).join(rel))?;
        }
        tar.finish()?;
    }
    xz.finish()?;

    let digest = sha256(&archive)?;
    let checksum = dest_dir.join(format!("{archive_name}.sha256"));
    std::fs::write(&checksum, format!("{digest}  {archive_name}\n"))?;

    tracing::info!(
        archive = %archive.display(),
        checksum = %checksum.display(),
        "packaged theme"
    );
    Ok(PackageOutput { archive, checksum })
}

/// All files under `root`, as (relative, absolute) pairs in sorted
/// relative-path order.
fn sorted_files(root: &Path) -> Result<Vec<(PathBuf, PathBuf)>, std::io::Error> {
    fn walk(
        root: &Path,
        dir: &Path,
        files: &mut Vec<(PathBuf, PathBuf)>,
    ) -> Result<(), std::io::Error> {
        for entry in std::fs::read_dir(dir)? {
            let path = entry?.path();
            if path.is_dir() {
                walk(root, &path, files)?;
            } else {
                let rel = path
                    .strip_prefix(root)
                    .expect("walked path is under the walk root")
                    .to_owned();
                files.push((rel, path));
            }
        }
        Ok(())
    }

    let mut files = Vec::new();
    walk(root, root, &mut files)?;
    files.sort();
    Ok(files)
}

fn sha256(path: &Path) -> Result<String, std::io::Error> {
    use sha2::Digest;
    use std::io::copy;

    let mut digest = sha2::Sha256::new();
    let mut f = File::open(path)?;
    copy(&mut f, &mut digest)?;
    Ok(hex::encode(digest.finalize().as_slice()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fake_tree() -> tempfile::TempDir {
        let tmp = tempfile::tempdir().unwrap();
        let root = tmp.path().join("material-symbols-filled");
        std::fs::create_dir_all(root.join("scalable/actions")).unwrap();
        std::fs::create_dir_all(root.join("16x16/actions")).unwrap();
        std::fs::write(root.join("index.theme"), "[Icon Theme]\n").unwrap();
        std::fs::write(root.join("scalable/actions/edit-copy.svg"), "<svg/>").unwrap();
        std::fs::write(root.join("16x16/actions/edit-copy.png"), "png").unwrap();
        tmp
    }

    #[test]
    fn should_create_archive_and_checksum() {
        let tmp = fake_tree();
        let tree = tmp.path().join("material-symbols-filled");
        let dest = tmp.path().join("dist");

        let output = package(&tree, &dest, "1.2.0").unwrap();

        assert_eq!(
            output.archive,
            dest.join("material-symbols-filled_1.2.0.tar.xz")
        );
        assert_eq!(
            output.checksum,
            dest.join("material-symbols-filled_1.2.0.tar.xz.sha256")
        );
        assert!(output.archive.is_file());
        assert!(output.checksum.is_file());
    }

    #[test]
    fn checksum_sidecar_matches_archive() {
        let tmp = fake_tree();
        let tree = tmp.path().join("material-symbols-filled");
        let dest = tmp.path().join("dist");

        let output = package(&tree, &dest, "0.1.0").unwrap();

        let sidecar = std::fs::read_to_string(&output.checksum).unwrap();
        let expected = format!(
            "{}  material-symbols-filled_0.1.0.tar.xz\n",
            sha256(&output.archive).unwrap()
        );
        assert_eq!(sidecar, expected);
    }

    #[test]
    fn should_walk_files_in_sorted_order() {
        let tmp = fake_tree();
        let tree = tmp.path().join("material-symbols-filled");

        let files = sorted_files(&tree).unwrap();

        let rels: Vec<_> = files.iter().map(|(rel, _)| rel.clone()).collect();
        assert_eq!(
            rels,
            vec![
                PathBuf::from("16x16/actions/edit-copy.png"),
                PathBuf::from("index.theme"),
                PathBuf::from("scalable/actions/edit-copy.svg"),
            ]
        );
    }

    #[test]
    fn should_fail_on_missing_tree() {
        let tmp = tempfile::tempdir().unwrap();

        let err = package(&tmp.path().join("nope"), tmp.path(), "1.0").unwrap_err();

        assert!(matches!(err, Error::MissingTree(_)));
    }
}
