use serde::{Deserialize, Serialize};
use std::{
    collections::HashMap,
    fmt,
    path::{Path, PathBuf},
    str::FromStr,
};

/// FreeDesktop icon name an upstream glyph is published under.
#[derive(Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Clone, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IconName(pub String);

impl fmt::Display for IconName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Id of a glyph in the upstream repository.
#[derive(Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Clone, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GlyphId(pub String);

impl GlyphId {
    /// Reserved id that resolves to the built-in placeholder glyph
    /// instead of an upstream file.
    pub const PLACEHOLDER: &'static str = "unknown";

    pub fn is_placeholder(&self) -> bool {
        self.0 == Self::PLACEHOLDER
    }
}

impl fmt::Display for GlyphId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// FreeDesktop Icon Naming Specification context.
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Copy, Clone, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Context {
    Actions,
    Apps,
    Categories,
    Devices,
    Emblems,
    Mimetypes,
    Places,
    Status,
}

impl Context {
    pub const ALL: [Context; 8] = [
        Context::Actions,
        Context::Apps,
        Context::Categories,
        Context::Devices,
        Context::Emblems,
        Context::Mimetypes,
        Context::Places,
        Context::Status,
    ];

    /// Directory name inside the theme tree.
    pub fn dir_name(&self) -> &'static str {
        match self {
            Context::Actions => "actions",
            Context::Apps => "apps",
            Context::Categories => "categories",
            Context::Devices => "devices",
            Context::Emblems => "emblems",
            Context::Mimetypes => "mimetypes",
            Context::Places => "places",
            Context::Status => "status",
        }
    }

    /// Display name used for the `Context` key in the theme descriptor.
    pub fn display_name(&self) -> &'static str {
        match self {
            Context::Actions => "Actions",
            Context::Apps => "Applications",
            Context::Categories => "Categories",
            Context::Devices => "Devices",
            Context::Emblems => "Emblems",
            Context::Mimetypes => "MimeTypes",
            Context::Places => "Places",
            Context::Status => "Status",
        }
    }
}

#[derive(Debug, thiserror::Error)]
#[error("unknown icon context '{0}'")]
pub struct UnknownContext(pub String);

impl FromStr for Context {
    type Err = UnknownContext;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Context::ALL
            .iter()
            .find(|c| c.dir_name() == s)
            .copied()
            .ok_or_else(|| UnknownContext(s.to_owned()))
    }
}

impl fmt::Display for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.dir_name())
    }
}

/// One row of the mapping table.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct Record {
    pub name: IconName,
    pub source: GlyphId,
    pub context: Context,
}

/// The icon name mapping table, in file order.
///
/// Loaded once at process start and treated as read-only for the rest of
/// the build.
#[derive(Debug, Default, PartialEq, Eq, Clone)]
pub struct Mapping {
    records: Vec<Record>,

    /// path of the mapping file, if the mapping was loaded from a file
    source: Option<PathBuf>,
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("malformed mapping row at line {line}: expected 3 comma-separated fields, got {fields}")]
    MalformedRow { line: usize, fields: usize },
    #[error("empty field in mapping row at line {line}")]
    EmptyField { line: usize },
    #[error("unknown icon context '{context}' at line {line}")]
    UnknownContext { line: usize, context: String },
    #[error("duplicate icon name '{name}' at line {line}, first defined at line {first}")]
    DuplicateName {
        name: IconName,
        line: usize,
        first: usize,
    },
    #[error("i/o error reading mapping file {}", .0.display())]
    IoError(PathBuf, #[source] std::io::Error),
}

impl Mapping {
    pub fn parse(s: &str) -> Result<Mapping, Error> {
        let mut records = Vec::new();
        let mut seen: HashMap<IconName, usize> = HashMap::new();

        for (idx, raw) in s.lines().enumerate() {
            let line = idx + 1;
            let row = raw.trim();
            if row.is_empty() || row.starts_with('#') {
                continue;
            }

            let fields: Vec<&str> = row.split(',').map(str::trim).collect();
            if fields.len() != 3 {
                return Err(Error::MalformedRow {
                    line,
                    fields: fields.len(),
                });
            }
            if fields.iter().any(|f| f.is_empty()) {
                return Err(Error::EmptyField { line });
            }

            let name = IconName(fields[0].to_owned());
            if let Some(&first) = seen.get(&name) {
                return Err(Error::DuplicateName { name, line, first });
            }
            seen.insert(name.clone(), line);

            let context = fields[2]
                .parse()
                .map_err(|UnknownContext(context)| Error::UnknownContext { line, context })?;
            records.push(Record {
                name,
                source: GlyphId(fields[1].to_owned()),
                context,
            });
        }

        Ok(Mapping {
            records,
            source: None,
        })
    }

    pub async fn load(path: &Path) -> Result<Mapping, Error> {
        let data = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| Error::IoError(path.to_owned(), e))?;
        let mut mapping = Mapping::parse(&data)?;
        mapping.source = Some(path.to_owned());
        Ok(mapping)
    }

    pub fn records(&self) -> impl Iterator<Item = &Record> {
        self.records.iter()
    }

    pub fn names(&self) -> impl Iterator<Item = &IconName> {
        self.records.iter().map(|r| &r.name)
    }

    pub fn get(&self, name: &IconName) -> Option<&Record> {
        self.records.iter().find(|r| &r.name == name)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_parse_rows_in_file_order() {
        let mapping = Mapping::parse(
            "edit-copy,content_copy,actions\n\
             folder,folder,places\n\
             go-home,home,actions\n",
        )
        .unwrap();

        assert_eq!(mapping.len(), 3);
        assert_eq!(
            mapping.records().map(|r| r.name.clone()).collect::<Vec<_>>(),
            vec![
                IconName("edit-copy".to_string()),
                IconName("folder".to_string()),
                IconName("go-home".to_string()),
            ]
        );
        assert_eq!(
            mapping.get(&IconName("folder".to_string())),
            Some(&Record {
                name: IconName("folder".to_string()),
                source: GlyphId("folder".to_string()),
                context: Context::Places,
            })
        );
    }

    #[test]
    fn should_skip_comments_and_blank_lines() {
        let mapping = Mapping::parse(
            "# core actions\n\
             \n\
             edit-copy,content_copy,actions\n\
             \n\
             # places\n\
             folder,folder,places\n",
        )
        .unwrap();

        assert_eq!(mapping.len(), 2);
    }

    #[test]
    fn should_trim_whitespace_around_fields() {
        let mapping = Mapping::parse("edit-copy , content_copy , actions\n").unwrap();

        let record = mapping.records().next().unwrap();
        assert_eq!(record.name, IconName("edit-copy".to_string()));
        assert_eq!(record.source, GlyphId("content_copy".to_string()));
        assert_eq!(record.context, Context::Actions);
    }

    #[test]
    fn should_fail_on_wrong_field_count() {
        let err = Mapping::parse(
            "edit-copy,content_copy,actions\n\
             go-home,home\n",
        )
        .unwrap_err();

        match err {
            Error::MalformedRow { line, fields } => {
                assert_eq!(line, 2);
                assert_eq!(fields, 2);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn should_fail_on_empty_field() {
        let err = Mapping::parse("edit-copy,,actions\n").unwrap_err();

        match err {
            Error::EmptyField { line } => assert_eq!(line, 1),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn should_fail_on_unknown_context() {
        let err = Mapping::parse("edit-copy,content_copy,widgets\n").unwrap_err();

        match err {
            Error::UnknownContext { line, context } => {
                assert_eq!(line, 1);
                assert_eq!(context, "widgets");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn should_fail_on_duplicate_name() {
        let err = Mapping::parse(
            "list-add,add,actions\n\
             folder,folder,places\n\
             list-add,add_circle,actions\n",
        )
        .unwrap_err();

        match err {
            Error::DuplicateName { name, line, first } => {
                assert_eq!(name, IconName("list-add".to_string()));
                assert_eq!(line, 3);
                assert_eq!(first, 1);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn should_recognize_placeholder_id() {
        assert!(GlyphId("unknown".to_string()).is_placeholder());
        assert!(!GlyphId("home".to_string()).is_placeholder());
    }

    #[test]
    fn should_parse_all_contexts_by_directory_name() {
        for context in Context::ALL {
            assert_eq!(context.dir_name().parse::<Context>().unwrap(), context);
        }
        assert!("24x24".parse::<Context>().is_err());
    }
}
