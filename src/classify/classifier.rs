use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use regex::Regex;
use thiserror::Error;

use crate::core::config::RoleRegexes;
use crate::core::types::SampleRole;

#[derive(Error, Debug)]
pub enum ClassifyError {
    #[error("Invalid --{option} regular expression '{pattern}': {source}")]
    InvalidRegex {
        option: &'static str,
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("'{name}' does not match any sample role regular expression")]
    NoMatch { name: String },

    #[error("'{name}' matches more than one sample role: {}", format_roles(.roles))]
    Ambiguous { name: String, roles: Vec<SampleRole> },
}

fn format_roles(roles: &[SampleRole]) -> String {
    roles
        .iter()
        .map(|r| format!("{r} (--{})", r.option_name()))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Maps a filename or sample tag to exactly one [`SampleRole`]
#[derive(Debug, Clone)]
pub struct SampleClassifier {
    patterns: Vec<(SampleRole, Regex)>,
}

impl SampleClassifier {
    /// Compile the four role regexes
    ///
    /// # Errors
    ///
    /// Returns `ClassifyError::InvalidRegex` naming the offending option if
    /// any pattern fails to compile.
    pub fn new(regexes: &RoleRegexes) -> Result<Self, ClassifyError> {
        let mut patterns = Vec::with_capacity(SampleRole::ALL.len());
        for role in SampleRole::ALL {
            let pattern = regexes.get(role);
            let regex = Regex::new(pattern).map_err(|source| ClassifyError::InvalidRegex {
                option: role.option_name(),
                pattern: pattern.to_string(),
                source,
            })?;
            patterns.push((role, regex));
        }
        Ok(Self { patterns })
    }

    /// Classify a name by regex search
    ///
    /// Every pattern is tried; a name matching two or more is an error
    /// rather than resolved by evaluation order.
    ///
    /// # Errors
    ///
    /// Returns `ClassifyError::NoMatch` or `ClassifyError::Ambiguous`.
    pub fn classify(&self, name: &str) -> Result<SampleRole, ClassifyError> {
        let roles: Vec<SampleRole> = self
            .patterns
            .iter()
            .filter(|(_, re)| re.is_match(name))
            .map(|(role, _)| *role)
            .collect();

        match roles.as_slice() {
            [role] => Ok(*role),
            [] => Err(ClassifyError::NoMatch {
                name: name.to_string(),
            }),
            _ => Err(ClassifyError::Ambiguous {
                name: name.to_string(),
                roles,
            }),
        }
    }

    /// Classify a file by its file name only (directories are ignored)
    ///
    /// # Errors
    ///
    /// Same as [`SampleClassifier::classify`].
    pub fn classify_path(&self, path: &Path) -> Result<SampleRole, ClassifyError> {
        let name = path
            .file_name()
            .map_or_else(|| path.to_string_lossy(), |n| n.to_string_lossy());
        self.classify(&name)
    }

    /// Assign every path to its role, failing on the first file that does
    /// not classify to exactly one role
    ///
    /// # Errors
    ///
    /// Returns the first `ClassifyError` encountered.
    pub fn partition<'a, I>(&self, paths: I) -> Result<BTreeMap<SampleRole, Vec<PathBuf>>, ClassifyError>
    where
        I: IntoIterator<Item = &'a PathBuf>,
    {
        let mut by_role: BTreeMap<SampleRole, Vec<PathBuf>> = BTreeMap::new();
        for path in paths {
            let role = self.classify_path(path)?;
            by_role.entry(role).or_default().push(path.clone());
        }
        Ok(by_role)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classifier(n: &str, nt: &str, t: &str, tt: &str) -> SampleClassifier {
        SampleClassifier::new(&RoleRegexes::new(n, nt, t, tt)).unwrap()
    }

    #[test]
    fn test_classify_default_patterns() {
        let c = SampleClassifier::new(&RoleRegexes::default()).unwrap();
        assert_eq!(c.classify("pt01_NTex.bam").unwrap(), SampleRole::NormalDna);
        assert_eq!(c.classify("pt01_NTtr.bam").unwrap(), SampleRole::NormalRna);
        assert_eq!(c.classify("pt01_TPex.bam").unwrap(), SampleRole::TumorDna);
        assert_eq!(c.classify("pt01_TPtr.bam").unwrap(), SampleRole::TumorRna);
    }

    #[test]
    fn test_no_match_is_error() {
        let c = classifier("Nex", "Ntr", "Tex", "Ttr");
        assert!(matches!(
            c.classify("sample.bam"),
            Err(ClassifyError::NoMatch { .. })
        ));
    }

    #[test]
    fn test_overlapping_patterns_are_ambiguous() {
        // "DNA" matches both the normal and tumor DNA patterns
        let c = classifier("DNA", "NRNA", "SDNA", "TRNA");
        match c.classify("pt01_SDNA.bam") {
            Err(ClassifyError::Ambiguous { roles, .. }) => {
                assert_eq!(roles, vec![SampleRole::NormalDna, SampleRole::TumorDna]);
            }
            other => panic!("expected ambiguity, got {other:?}"),
        }
    }

    #[test]
    fn test_classify_path_ignores_directories() {
        let c = classifier("Nex", "Ntr", "Tex", "Ttr");
        let path = PathBuf::from("/data/Tex_runs/sample_Ntr.bam");
        assert_eq!(c.classify_path(&path).unwrap(), SampleRole::NormalRna);
    }

    #[test]
    fn test_invalid_regex_names_option() {
        let err = SampleClassifier::new(&RoleRegexes::new("Nex", "(", "Tex", "Ttr")).unwrap_err();
        assert!(err.to_string().contains("--normaltransre"));
    }

    #[test]
    fn test_partition() {
        let c = classifier("Nex", "Ntr", "Tex", "Ttr");
        let files = vec![
            PathBuf::from("a_Nex.bam"),
            PathBuf::from("b_Tex.bam"),
            PathBuf::from("c_Tex.bam"),
        ];
        let parts = c.partition(&files).unwrap();
        assert_eq!(parts[&SampleRole::NormalDna].len(), 1);
        assert_eq!(parts[&SampleRole::TumorDna].len(), 2);
        assert!(!parts.contains_key(&SampleRole::TumorRna));
    }
}
