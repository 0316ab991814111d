//! Attribute validation for OIDC config declarations
//!
//! A declaration is either *managed* (the service hosts the issuer, so no
//! self-hosted attribute may be set) or *unmanaged* (the caller supplies the
//! secret, issuer and installer role, so all three must be set). Values that
//! are absent or contain only whitespace count as empty.

use crate::error::ValidationError;
use clustersmgmt::OidcConfigRequest;
use declarative::{Attributes, Value};

/// Attribute names of an OIDC config
pub mod attr {
    pub const ID: &str = "id";
    pub const MANAGED: &str = "managed";
    pub const SECRET_ARN: &str = "secret_arn";
    pub const ISSUER_URL: &str = "issuer_url";
    pub const INSTALLER_ROLE_ARN: &str = "installer_role_arn";
    pub const THUMBPRINT: &str = "thumbprint";
    pub const OIDC_ENDPOINT_URL: &str = "oidc_endpoint_url";

    /// Attributes a caller may declare
    pub const DECLARABLE: [&str; 4] = [MANAGED, SECRET_ARN, ISSUER_URL, INSTALLER_ROLE_ARN];
}

/// What a caller asked for, before validation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Intent {
    pub managed: bool,
    pub secret_arn: Option<String>,
    pub issuer_url: Option<String>,
    pub installer_role_arn: Option<String>,
}

/// An intent that passed validation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidIntent {
    Managed,
    Unmanaged {
        secret_arn: String,
        issuer_url: String,
        installer_role_arn: String,
    },
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

impl Intent {
    pub fn managed() -> Self {
        Self {
            managed: true,
            ..Self::default()
        }
    }

    pub fn unmanaged(
        secret_arn: impl Into<String>,
        issuer_url: impl Into<String>,
        installer_role_arn: impl Into<String>,
    ) -> Self {
        Self {
            managed: false,
            secret_arn: Some(secret_arn.into()),
            issuer_url: Some(issuer_url.into()),
            installer_role_arn: Some(installer_role_arn.into()),
        }
    }

    /// Read an intent from declared attributes
    ///
    /// `managed` is required and must be a bool; the other declarable
    /// attributes must be strings. Anything else is rejected.
    pub fn from_attributes(attributes: &Attributes) -> Result<Self, ValidationError> {
        if let Some(name) = attributes
            .keys()
            .find(|name| !attr::DECLARABLE.contains(&name.as_str()))
        {
            return Err(ValidationError::UnknownAttribute { name: name.clone() });
        }

        let managed = match attributes.get(attr::MANAGED) {
            Some(Value::Bool(managed)) => *managed,
            Some(Value::String(_)) => {
                return Err(ValidationError::WrongType {
                    name: attr::MANAGED.to_string(),
                    expected: "bool",
                });
            }
            None => return Err(ValidationError::MissingAttribute { name: attr::MANAGED }),
        };

        let string = |name: &'static str| match attributes.get(name) {
            Some(Value::String(s)) => Ok(Some(s.clone())),
            Some(Value::Bool(_)) => Err(ValidationError::WrongType {
                name: name.to_string(),
                expected: "string",
            }),
            None => Ok(None),
        };

        Ok(Self {
            managed,
            secret_arn: string(attr::SECRET_ARN)?,
            issuer_url: string(attr::ISSUER_URL)?,
            installer_role_arn: string(attr::INSTALLER_ROLE_ARN)?,
        })
    }

    fn self_hosted(&self) -> [(&'static str, Option<&str>); 3] {
        [
            (attr::SECRET_ARN, non_blank(self.secret_arn.as_deref())),
            (attr::ISSUER_URL, non_blank(self.issuer_url.as_deref())),
            (attr::INSTALLER_ROLE_ARN, non_blank(self.installer_role_arn.as_deref())),
        ]
    }

    /// Check the managed/unmanaged attribute rules
    ///
    /// Pure: never touches the network. Unmanaged values are kept verbatim.
    pub fn validate(&self) -> Result<ValidIntent, ValidationError> {
        let fields = self.self_hosted();

        if self.managed {
            return if fields.iter().all(|(_, value)| value.is_none()) {
                Ok(ValidIntent::Managed)
            } else {
                Err(ValidationError::ManagedWithSelfHostedAttributes)
            };
        }

        match fields {
            [(_, Some(secret_arn)), (_, Some(issuer_url)), (_, Some(installer_role_arn))] => {
                Ok(ValidIntent::Unmanaged {
                    secret_arn: secret_arn.to_string(),
                    issuer_url: issuer_url.to_string(),
                    installer_role_arn: installer_role_arn.to_string(),
                })
            }
            _ => Err(ValidationError::UnmanagedMissingAttributes {
                missing: fields
                    .iter()
                    .filter(|(_, value)| value.is_none())
                    .map(|(name, _)| *name)
                    .collect(),
            }),
        }
    }
}

impl ValidIntent {
    pub fn is_managed(&self) -> bool {
        matches!(self, Self::Managed)
    }

    /// The create request for this intent
    pub fn request(&self) -> OidcConfigRequest {
        match self {
            Self::Managed => OidcConfigRequest::managed(),
            Self::Unmanaged {
                secret_arn,
                issuer_url,
                installer_role_arn,
            } => OidcConfigRequest::unmanaged(secret_arn, issuer_url, installer_role_arn),
        }
    }
}
