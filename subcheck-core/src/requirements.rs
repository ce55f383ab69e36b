use std::collections::HashSet;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SubcheckError};

/// Default table compiled into the binary.
pub const EMBEDDED_REQUIREMENTS: &str = include_str!("../requirements.toml");

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DomainRequirements {
    pub name: String,
    #[serde(default)]
    pub required: Vec<String>,
}

#[derive(Deserialize)]
struct TableFile {
    #[serde(default)]
    domain: Vec<DomainRequirements>,
}

/// Domain name -> ordered required document labels. Immutable once loaded.
#[derive(Clone, Debug, Default, Serialize)]
pub struct RequirementsTable {
    domains: Vec<DomainRequirements>,
}

impl RequirementsTable {
    pub fn embedded() -> Result<Self> {
        Self::from_toml_str(EMBEDDED_REQUIREMENTS)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)?;
        Self::from_toml_str(&raw)
            .map_err(|e| SubcheckError::Config(format!("{}: {e}", path.display())))
    }

    /// `path` when given, else the embedded table.
    pub fn load_or_embedded(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(p) => Self::load(p),
            None => Self::embedded(),
        }
    }

    pub fn from_toml_str(raw: &str) -> Result<Self> {
        let file: TableFile = toml::from_str(raw)
            .map_err(|e| SubcheckError::Config(format!("requirements decode: {e}")))?;
        Self::from_entries(file.domain)
    }

    pub fn from_entries(domains: Vec<DomainRequirements>) -> Result<Self> {
        let mut seen = HashSet::new();
        for d in &domains {
            if d.name.trim().is_empty() {
                return Err(SubcheckError::Config("domain with empty name".into()));
            }
            if !seen.insert(d.name.as_str()) {
                return Err(SubcheckError::Config(format!("duplicate domain: {}", d.name)));
            }
        }
        Ok(Self { domains })
    }

    pub fn lookup(&self, domain: &str) -> Result<&[String]> {
        self.domains
            .iter()
            .find(|d| d.name == domain)
            .map(|d| d.required.as_slice())
            .ok_or_else(|| SubcheckError::UnknownDomain(domain.to_string()))
    }

    /// Domain names in source order.
    pub fn domains(&self) -> impl Iterator<Item = &str> {
        self.domains.iter().map(|d| d.name.as_str())
    }

    pub fn entries(&self) -> &[DomainRequirements] {
        &self.domains
    }

    pub fn len(&self) -> usize {
        self.domains.len()
    }

    pub fn is_empty(&self) -> bool {
        self.domains.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn embedded_table_has_reference_domains() {
        let t = RequirementsTable::embedded().unwrap();
        let names: Vec<_> = t.domains().collect();
        assert_eq!(
            names,
            vec![
                "Python",
                "Data Analytics",
                "Data Management",
                "Business Analysis",
                "Content Creation - Graphics & Multimedia",
                "Marketing",
            ]
        );
        assert_eq!(t.lookup("Python").unwrap().len(), 11);
        assert_eq!(t.lookup("Python").unwrap()[0], "Project Charter");
        assert_eq!(
            t.lookup("Content Creation - Graphics & Multimedia").unwrap(),
            &["Tasks Specific Deliverables".to_string()]
        );
    }

    #[test]
    fn unknown_domain_is_an_error() {
        let t = RequirementsTable::embedded().unwrap();
        assert!(matches!(
            t.lookup("NoSuchDomain"),
            Err(SubcheckError::UnknownDomain(d)) if d == "NoSuchDomain"
        ));
    }

    #[test]
    fn lookup_is_exact_match() {
        let t = RequirementsTable::embedded().unwrap();
        assert!(t.lookup("python").is_err());
    }

    #[test]
    fn duplicate_domains_rejected() {
        let raw = r#"
            [[domain]]
            name = "A"
            required = ["x"]
            [[domain]]
            name = "A"
            required = ["y"]
        "#;
        assert!(matches!(
            RequirementsTable::from_toml_str(raw),
            Err(SubcheckError::Config(_))
        ));
    }

    #[test]
    fn empty_required_list_allowed() {
        let raw = "[[domain]]\nname = \"Empty\"\n";
        let t = RequirementsTable::from_toml_str(raw).unwrap();
        assert!(t.lookup("Empty").unwrap().is_empty());
    }

    #[test]
    fn load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let p = dir.path().join("req.toml");
        fs::write(&p, "[[domain]]\nname = \"Rust\"\nrequired = [\"Design Doc\"]\n").unwrap();
        let t = RequirementsTable::load(&p).unwrap();
        assert_eq!(t.len(), 1);
        assert_eq!(t.lookup("Rust").unwrap(), &["Design Doc".to_string()]);
    }
}
