//! Plain adjacency-list fixtures.
//!
//! Each line has the form `NAME -> DEP1 DEP2 ...`:
//!
//! ```text
//! A -> B C
//! B -> D
//! D ->
//! E -> A   # comment
//! ```
//!
//! An empty dependency list is legal. Lines without `->` are ignored, and
//! when a name is defined twice the last definition wins. A `#` at the start
//! of a line or after whitespace starts a comment; inside a name it is part
//! of the name, so `Pkg#2 -> A` defines `Pkg#2`.

use super::{EnumerableSource, PackageSource};
use crate::domain::{AdjacencyMap, PackageName};
use crate::error::{Error, Result, SourceError};
use std::fmt;
use std::fs;
use std::path::Path;

/// Non-fatal problems found while loading a fixture.
///
/// The affected line is skipped and loading continues.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FixtureWarning {
    /// A line had more than one `->` separator.
    MalformedLine {
        /// 1-based line number.
        line_number: usize,
        /// The offending line, trimmed.
        content: String,
    },
    /// A definition line had nothing before `->`.
    MissingName {
        /// 1-based line number.
        line_number: usize,
    },
    /// A later line redefined an existing package.
    Redefined {
        /// 1-based line number of the winning definition.
        line_number: usize,
        /// The redefined package.
        package: PackageName,
    },
}

impl fmt::Display for FixtureWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FixtureWarning::MalformedLine {
                line_number,
                content,
            } => write!(f, "line {line_number}: skipped malformed line '{content}'"),
            FixtureWarning::MissingName { line_number } => {
                write!(f, "line {line_number}: skipped definition without a package name")
            }
            FixtureWarning::Redefined {
                line_number,
                package,
            } => write!(
                f,
                "line {line_number}: '{package}' redefined, earlier definition discarded"
            ),
        }
    }
}

/// An in-memory package universe parsed from an adjacency-list file.
#[derive(Debug, Clone, Default)]
pub struct TextFixture {
    packages: AdjacencyMap,
}

impl TextFixture {
    /// Load a fixture file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or defines no packages.
    pub fn load(path: &Path) -> Result<(Self, Vec<FixtureWarning>)> {
        let content = fs::read_to_string(path).map_err(|e| {
            Error::Source(SourceError::Io(format!(
                "cannot read fixture '{}': {e}",
                path.display()
            )))
        })?;
        let (fixture, warnings) = Self::parse(&content);
        if fixture.is_empty() {
            return Err(Error::Source(SourceError::Parse(format!(
                "fixture '{}' contains no package definitions",
                path.display()
            ))));
        }
        Ok((fixture, warnings))
    }

    /// Parse fixture text. Never fails; bad lines become warnings.
    pub fn parse(content: &str) -> (Self, Vec<FixtureWarning>) {
        let mut packages = AdjacencyMap::new();
        let mut warnings = Vec::new();

        for (index, raw) in content.lines().enumerate() {
            let line_number = index + 1;
            let line = strip_comment(raw).trim();
            if !line.contains("->") {
                continue;
            }

            let parts: Vec<&str> = line.split("->").collect();
            let [name, deps] = parts.as_slice() else {
                warnings.push(FixtureWarning::MalformedLine {
                    line_number,
                    content: line.to_string(),
                });
                continue;
            };

            let name = name.trim();
            if name.is_empty() {
                warnings.push(FixtureWarning::MissingName { line_number });
                continue;
            }

            let package = PackageName::from(name);
            if packages.contains(name) {
                warnings.push(FixtureWarning::Redefined {
                    line_number,
                    package: package.clone(),
                });
            }
            packages.insert(package, deps.split_whitespace().map(PackageName::from));
        }

        (Self { packages }, warnings)
    }

    /// Number of defined packages.
    pub fn len(&self) -> usize {
        self.packages.len()
    }

    /// Whether the fixture defines no packages.
    pub fn is_empty(&self) -> bool {
        self.packages.is_empty()
    }

    /// The full forward adjacency map of the fixture.
    pub fn adjacency(&self) -> &AdjacencyMap {
        &self.packages
    }
}

impl PackageSource for TextFixture {
    fn get_dependencies(
        &self,
        name: &PackageName,
    ) -> std::result::Result<Vec<PackageName>, SourceError> {
        self.packages
            .get(name.as_str())
            .map(<[PackageName]>::to_vec)
            .ok_or_else(|| SourceError::NotFound(name.to_string()))
    }
}

/// `line` up to its comment, if it has one.
fn strip_comment(line: &str) -> &str {
    let mut previous = None;
    for (at, c) in line.char_indices() {
        if c == '#' && previous.is_none_or(char::is_whitespace) {
            return &line[..at];
        }
        previous = Some(c);
    }
    line
}

impl EnumerableSource for TextFixture {
    fn list_all(&self) -> std::result::Result<Vec<PackageName>, SourceError> {
        Ok(self.packages.keys().cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use tempfile::TempDir;

    fn deps(fixture: &TextFixture, name: &str) -> Vec<String> {
        fixture
            .get_dependencies(&name.into())
            .expect("package should be defined")
            .iter()
            .map(ToString::to_string)
            .collect()
    }

    #[test]
    fn test_parse_simple_fixture() {
        let (fixture, warnings) = TextFixture::parse("A -> B C\nB -> D\nC -> D E\nD -> \n");
        assert!(warnings.is_empty());
        assert_eq!(fixture.len(), 4);
        assert_eq!(deps(&fixture, "A"), vec!["B", "C"]);
        assert_eq!(deps(&fixture, "C"), vec!["D", "E"]);
        assert!(deps(&fixture, "D").is_empty());
    }

    #[test]
    fn test_empty_dependency_list_without_trailing_space() {
        let (fixture, _) = TextFixture::parse("D ->");
        assert!(deps(&fixture, "D").is_empty());
    }

    #[rstest]
    #[case("just some text")]
    #[case("")]
    #[case("# A -> B")]
    fn test_lines_without_arrow_are_ignored(#[case] line: &str) {
        let (fixture, warnings) = TextFixture::parse(line);
        assert!(fixture.is_empty());
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_trailing_comment_is_stripped() {
        let (fixture, _) = TextFixture::parse("E -> A  # cyclic on purpose");
        assert_eq!(deps(&fixture, "E"), vec!["A"]);
    }

    #[rstest]
    #[case("A -> B#2 C", &["B#2", "C"])]
    #[case("A -> B#2 # pinned", &["B#2"])]
    #[case("A -> B\t#tabbed comment", &["B"])]
    fn test_hash_inside_name_is_kept(#[case] line: &str, #[case] expected: &[&str]) {
        let (fixture, warnings) = TextFixture::parse(line);
        assert!(warnings.is_empty());
        assert_eq!(deps(&fixture, "A"), expected);
    }

    #[test]
    fn test_hash_in_package_name() {
        let (fixture, _) = TextFixture::parse("Pkg#2 -> A\n");
        assert!(fixture.get_dependencies(&"Pkg#2".into()).is_ok());
    }

    #[test]
    fn test_last_definition_wins() {
        let (fixture, warnings) = TextFixture::parse("A -> B\nC -> \nA -> C D\n");
        assert_eq!(deps(&fixture, "A"), vec!["C", "D"]);
        assert_eq!(
            warnings,
            vec![FixtureWarning::Redefined {
                line_number: 3,
                package: "A".into(),
            }]
        );
        let order: Vec<PackageName> = fixture.list_all().unwrap();
        assert_eq!(order, vec![PackageName::from("A"), PackageName::from("C")]);
    }

    #[test]
    fn test_duplicate_dependencies_removed() {
        let (fixture, _) = TextFixture::parse("A -> B C B");
        assert_eq!(deps(&fixture, "A"), vec!["B", "C"]);
    }

    #[test]
    fn test_malformed_and_nameless_lines_warn() {
        let (fixture, warnings) = TextFixture::parse("A -> B -> C\n -> D\nE -> F\n");
        assert_eq!(fixture.len(), 1);
        assert_eq!(warnings.len(), 2);
        assert!(matches!(
            warnings[0],
            FixtureWarning::MalformedLine { line_number: 1, .. }
        ));
        assert_eq!(warnings[1], FixtureWarning::MissingName { line_number: 2 });
    }

    #[test]
    fn test_unknown_package_is_not_found() {
        let (fixture, _) = TextFixture::parse("A -> B");
        assert_eq!(
            fixture.get_dependencies(&"B".into()),
            Err(SourceError::NotFound("B".to_string()))
        );
    }

    #[test]
    fn test_load_empty_file_is_error() {
        let temp = TempDir::new().expect("temp dir");
        let path = temp.path().join("empty.txt");
        std::fs::write(&path, "no definitions here\n").expect("write fixture");

        let err = TextFixture::load(&path).expect_err("empty fixture should fail");
        assert!(matches!(err, Error::Source(SourceError::Parse(_))));
    }

    #[test]
    fn test_load_missing_file_is_error() {
        let err = TextFixture::load(Path::new("/definitely/not/here.txt"))
            .expect_err("missing fixture should fail");
        assert!(matches!(err, Error::Source(SourceError::Io(_))));
    }
}
