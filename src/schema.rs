//! Manifest schema
//!
//! A manifest declares resources as `[<type>.<name>]` tables:
//!
//! ```toml
//! [rosa_oidc_config.main]
//! managed = true
//!
//! [rosa_oidc_config.self_hosted]
//! managed = false
//! secret_arn = "arn:aws:secretsmanager:..."
//! issuer_url = "https://oidc-f3y4.s3.us-east-1.amazonaws.com"
//! installer_role_arn = "arn:aws:iam::...:role/..."
//! ```

use anyhow::{Context, Result, bail};
use declarative::{Address, Attributes, Declaration, Value};
use std::fs;
use std::path::Path;

/// Declared resources, ordered by type then name
#[derive(Debug, Default)]
pub struct Manifest {
    pub declarations: Vec<Declaration>,
}

impl Manifest {
    /// Load a manifest file
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Could not read manifest: {}", path.display()))?;
        Self::parse(&content).with_context(|| format!("Invalid manifest: {}", path.display()))
    }

    /// Parse manifest content
    pub fn parse(content: &str) -> Result<Self> {
        let root: toml::Table = toml::from_str(content).context("Invalid TOML format")?;
        let mut declarations = Vec::new();

        for (resource_type, entries) in root {
            let toml::Value::Table(entries) = entries else {
                bail!("`{resource_type}` must be a table of named resources");
            };

            for (name, body) in entries {
                let address: Address = format!("{resource_type}.{name}").parse()?;
                let toml::Value::Table(body) = body else {
                    bail!("{address} must be a table of attributes");
                };
                declarations.push(Declaration {
                    attributes: attributes(&address, body)?,
                    address,
                });
            }
        }

        Ok(Self { declarations })
    }

    pub fn is_empty(&self) -> bool {
        self.declarations.is_empty()
    }
}

fn attributes(address: &Address, body: toml::Table) -> Result<Attributes> {
    body.into_iter()
        .map(|(key, value)| {
            let value = match value {
                toml::Value::Boolean(b) => Value::Bool(b),
                toml::Value::String(s) => Value::String(s),
                other => bail!(
                    "{address}: attribute `{key}` must be a string or bool, found {}",
                    other.type_str()
                ),
            };
            Ok((key, value))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const MANIFEST: &str = r#"
[rosa_oidc_config.managed]
managed = true

[rosa_oidc_config.self_hosted]
managed = false
secret_arn = "arn:aws:secretsmanager:us-east-1:765374464689:secret:rosa-private-key-oidc-f3y4-fEqj4c"
issuer_url = "https://oidc-f3y4.s3.us-east-1.amazonaws.com"
installer_role_arn = "arn:aws:iam::765374464689:role/terr-account2-Installer-Role"
"#;

    #[test]
    fn test_parse_manifest() {
        let manifest = Manifest::parse(MANIFEST).unwrap();
        assert_eq!(manifest.declarations.len(), 2);

        let managed = &manifest.declarations[0];
        assert_eq!(managed.address.to_string(), "rosa_oidc_config.managed");
        assert_eq!(managed.attributes["managed"], Value::Bool(true));

        let self_hosted = &manifest.declarations[1];
        assert_eq!(self_hosted.attributes.len(), 4);
        assert_eq!(
            self_hosted.attributes["issuer_url"].as_str(),
            Some("https://oidc-f3y4.s3.us-east-1.amazonaws.com")
        );
    }

    #[test]
    fn test_parse_rejects_bad_shapes() {
        assert!(Manifest::parse("rosa_oidc_config = 1").is_err());
        assert!(Manifest::parse("[rosa_oidc_config]\nmain = true").is_err());

        let err = Manifest::parse("[rosa_oidc_config.main]\nmanaged = 1").unwrap_err();
        assert!(format!("{err:#}").contains("must be a string or bool"));
    }

    #[test]
    fn test_empty_manifest() {
        assert!(Manifest::parse("").unwrap().is_empty());
    }

    #[test]
    fn test_load_reports_path() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("oidc.toml");
        assert!(Manifest::load(&path).is_err());

        fs::write(&path, "[rosa_oidc_config.main\n").unwrap();
        let err = Manifest::load(&path).unwrap_err();
        assert!(err.to_string().contains("Invalid manifest"));
    }
}
