use std::{
    borrow::Cow,
    path::{Path, PathBuf},
};

use crate::run::RunError;

/// Raw contents of a SQL script, kept alongside the path it was read from.
#[derive(Debug, Clone)]
pub struct SqlScript {
    path: PathBuf,
    text: String,
}

/// One statement of a script. `ordinal` is 1-based and follows file order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Statement<'a> {
    pub ordinal: usize,
    pub text: &'a str,
}

impl<'a> Statement<'a> {
    /// Text sent to the service. Splitting strips the `;`, some endpoints
    /// want it back.
    pub fn payload(&self, append_semicolon: bool) -> Cow<'a, str> {
        if append_semicolon {
            Cow::Owned(format!("{};", self.text))
        } else {
            Cow::Borrowed(self.text)
        }
    }
}

impl SqlScript {
    pub fn new(path: impl Into<PathBuf>, text: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            text: text.into(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn char_len(&self) -> usize {
        self.text.chars().count()
    }

    pub fn statements(&self) -> Vec<Statement<'_>> {
        split_sql_statements(&self.text)
            .into_iter()
            .enumerate()
            .map(|(i, text)| Statement {
                ordinal: i + 1,
                text,
            })
            .collect()
    }
}

pub async fn read_script(path: &Path) -> Result<SqlScript, RunError> {
    let text = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| RunError::FileRead {
            path: path.to_path_buf(),
            source,
        })?;
    Ok(SqlScript::new(path, text))
}

// Plain delimiter split: a `;` inside a string literal or comment still ends
// the fragment.
pub fn split_sql_statements(sql: &str) -> Vec<&str> {
    sql.split(';')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use crate::run::RunError;

    use super::{read_script, split_sql_statements, SqlScript, Statement};

    #[test]
    fn split_statements_basic() {
        let sql = "SELECT 1;\n\nSELECT 2;\n";
        let stmts = split_sql_statements(sql);
        assert_eq!(stmts, vec!["SELECT 1", "SELECT 2"]);
    }

    #[test]
    fn split_keeps_comment_fragments() {
        let sql = "CREATE TABLE a(x int); -- comment; CREATE TABLE b(y int);";
        assert_eq!(
            split_sql_statements(sql),
            vec!["CREATE TABLE a(x int)", "-- comment", "CREATE TABLE b(y int)"]
        );
    }

    #[test]
    fn split_breaks_inside_string_literals() {
        let sql = "INSERT INTO t VALUES ('a;b');";
        assert_eq!(
            split_sql_statements(sql),
            vec!["INSERT INTO t VALUES ('a", "b')"]
        );
    }

    #[test]
    fn whitespace_only_input_has_no_statements() {
        assert!(split_sql_statements("").is_empty());
        assert!(split_sql_statements(" ;\n;\t; ").is_empty());
    }

    #[test]
    fn rejoined_statements_keep_content_in_order() {
        let inputs = [
            "a;b;c",
            "  create table x (id int) ;\n\n; insert into x values (1);  ",
            ";;;select 1;;",
            "no delimiter at all",
        ];
        let squash = |s: &str| {
            s.chars()
                .filter(|c| !c.is_whitespace() && *c != ';')
                .collect::<String>()
        };
        for sql in inputs {
            let stmts = split_sql_statements(sql);
            let rejoined = stmts.join(";");
            assert_eq!(split_sql_statements(&rejoined), stmts);
            assert_eq!(squash(&rejoined), squash(sql));
        }
    }

    #[test]
    fn statements_are_numbered_from_one() {
        let script = SqlScript::new("x.sql", "select 1; ; select 2");
        let stmts = script.statements();
        assert_eq!(
            stmts,
            vec![
                Statement {
                    ordinal: 1,
                    text: "select 1"
                },
                Statement {
                    ordinal: 2,
                    text: "select 2"
                },
            ]
        );
        assert_eq!(stmts[0].payload(false), "select 1");
        assert_eq!(stmts[0].payload(true), "select 1;");
    }

    #[test]
    fn char_len_counts_characters() {
        let script = SqlScript::new("x.sql", "-- 中文\n");
        assert_eq!(script.char_len(), 6);
    }

    #[tokio::test]
    async fn read_script_loads_file() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        write!(f, "create table a (x int);\ncreate table b (y int);\n").unwrap();

        let script = read_script(f.path()).await.unwrap();
        assert_eq!(script.path(), f.path());
        assert_eq!(script.statements().len(), 2);
    }

    #[tokio::test]
    async fn read_script_reports_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.sql");

        let err = read_script(&missing).await.unwrap_err();
        match err {
            RunError::FileRead { path, source } => {
                assert_eq!(path, missing);
                assert_eq!(source.kind(), std::io::ErrorKind::NotFound);
            }
        }
    }
}
