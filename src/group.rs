//! Query groups: one named structure per discovered query file.

use std::collections::BTreeMap;
use std::collections::btree_map::Entry;
use std::path::PathBuf;

use tracing::{debug, warn};

use crate::bind::BindStyle;
use crate::discover::SqlSource;
use crate::error::{SqlGenError, SqlGenResult};
use crate::naming::{field_name, type_name};
use crate::scanner::scan;

/// A struct field backing one distinct parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    /// Rust identifier of the field.
    pub name: String,
    /// Parameter name as written in the query.
    pub param: String,
}

/// Everything the emitter needs for one query file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryGroup {
    /// Generated type name.
    pub name: String,
    /// Source path relative to the root.
    pub source: PathBuf,
    /// Rewritten SQL.
    pub sql: String,
    /// Parameter names in argument order, repeats included.
    pub params: Vec<String>,
    /// Distinct parameters, sorted by field name.
    pub fields: Vec<Field>,
}

impl QueryGroup {
    /// Scan one source file and build its group.
    pub fn assemble(
        source: &SqlSource,
        style: BindStyle,
        combine_duplicates: bool,
    ) -> SqlGenResult<Self> {
        let name = type_name(&source.segments)?;
        let rewritten = scan(&source.content, style, combine_duplicates);

        if let Some(region) = rewritten.unterminated {
            warn!(
                path = %source.path.display(),
                "query ends inside an unterminated {}",
                region.describe()
            );
        }

        let mut by_field: BTreeMap<String, String> = BTreeMap::new();
        for param in &rewritten.params {
            match by_field.entry(field_name(param)) {
                Entry::Vacant(slot) => {
                    slot.insert(param.clone());
                }
                Entry::Occupied(slot) if slot.get() != param => {
                    return Err(SqlGenError::FieldCollision {
                        path: source.path.clone(),
                        field: slot.key().clone(),
                        first: slot.get().clone(),
                        second: param.clone(),
                    });
                }
                Entry::Occupied(_) => {}
            }
        }

        let fields = by_field
            .into_iter()
            .map(|(name, param)| Field { name, param })
            .collect();

        debug!(name = %name, params = rewritten.params.len(), "assembled query group");

        Ok(Self {
            name,
            source: source.relative(),
            sql: rewritten.sql,
            params: rewritten.params,
            fields,
        })
    }

    /// Field identifiers in argument order.
    pub fn arguments(&self) -> Vec<String> {
        self.params.iter().map(|p| field_name(p)).collect()
    }
}

/// Assemble every source and sort the groups by type name.
///
/// Fails on the first file that cannot be assembled, or when two files map
/// to the same type name.
pub fn assemble_all(
    sources: &[SqlSource],
    style: BindStyle,
    combine_duplicates: bool,
) -> SqlGenResult<Vec<QueryGroup>> {
    let mut groups: BTreeMap<String, QueryGroup> = BTreeMap::new();

    for source in sources {
        let group = QueryGroup::assemble(source, style, combine_duplicates)?;
        match groups.entry(group.name.clone()) {
            Entry::Occupied(existing) => {
                return Err(SqlGenError::DuplicateQuery {
                    name: group.name,
                    first: existing.get().source.clone(),
                    second: group.source,
                });
            }
            Entry::Vacant(slot) => {
                slot.insert(group);
            }
        }
    }

    Ok(groups.into_values().collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn source(path: &str, content: &str) -> SqlSource {
        SqlSource {
            path: PathBuf::from("/queries").join(path),
            segments: path.split('/').map(str::to_string).collect(),
            content: content.to_string(),
        }
    }

    #[test]
    fn test_assemble() {
        let src = source(
            "authors/create.sql",
            "INSERT INTO authors (name, bio) VALUES (:name, :bio) RETURNING *;",
        );
        let group = QueryGroup::assemble(&src, BindStyle::Dollar, true).unwrap();

        assert_eq!(group.name, "AuthorsCreate");
        assert_eq!(group.sql, "INSERT INTO authors (name, bio) VALUES ($1, $2) RETURNING *;");
        assert_eq!(group.params, vec!["name", "bio"]);
        assert_eq!(
            group.fields,
            vec![
                Field { name: "bio".into(), param: "bio".into() },
                Field { name: "name".into(), param: "name".into() },
            ]
        );
        assert_eq!(group.arguments(), vec!["name", "bio"]);
    }

    #[test]
    fn test_repeated_params_share_a_field() {
        let src = source("find.sql", "SELECT * FROM t WHERE a = :id OR b = :id");
        let group = QueryGroup::assemble(&src, BindStyle::Question, true).unwrap();

        assert_eq!(group.sql, "SELECT * FROM t WHERE a = ? OR b = ?");
        assert_eq!(group.params, vec!["id", "id"]);
        assert_eq!(group.fields.len(), 1);
        assert_eq!(group.arguments(), vec!["id", "id"]);
    }

    #[test]
    fn test_field_collision() {
        let src = source("clash.sql", "SELECT :user.id, :user_id");
        let err = QueryGroup::assemble(&src, BindStyle::Dollar, true).unwrap_err();
        match err {
            SqlGenError::FieldCollision { field, first, second, .. } => {
                assert_eq!(field, "user_id");
                assert_eq!(first, "user.id");
                assert_eq!(second, "user_id");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_assemble_all_sorts_by_name() {
        let sources = vec![
            source("books/list.sql", ""),
            source("authors/list.sql", "SELECT * FROM authors ORDER BY name;"),
        ];
        let groups = assemble_all(&sources, BindStyle::Dollar, true).unwrap();
        let names: Vec<_> = groups.iter().map(|g| g.name.as_str()).collect();
        assert_eq!(names, vec!["AuthorsList", "BooksList"]);
        assert_eq!(groups[1].sql, "");
        assert!(groups[1].fields.is_empty());
    }

    #[test]
    fn test_duplicate_type_names() {
        let sources = vec![
            source("authors/create.sql", "SELECT 1"),
            source("authors_create.sql", "SELECT 2"),
        ];
        let err = assemble_all(&sources, BindStyle::Dollar, true).unwrap_err();
        assert!(matches!(err, SqlGenError::DuplicateQuery { ref name, .. } if name == "AuthorsCreate"));
    }
}
