//! Wire types for the clusters_mgmt endpoints used by this crate.
//!
//! Response types keep every field optional or defaulted: deciding whether a
//! payload is complete is left to the caller, so a missing `id` surfaces as a
//! domain error instead of a deserialization failure.

use serde::{Deserialize, Serialize};

/// Body of an OIDC config creation request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OidcConfigRequest {
    /// Whether the service hosts the issuer and its keys.
    pub managed: bool,
    /// Whether the config may be shared by several clusters.
    pub reusable: bool,
    /// Secret holding the issuer's private key (unmanaged only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secret_arn: Option<String>,
    /// Issuer URL (unmanaged only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issuer_url: Option<String>,
    /// Installer role used to register the config (unmanaged only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub installer_role_arn: Option<String>,
}

impl OidcConfigRequest {
    /// Request for a managed config.
    #[must_use]
    pub fn managed() -> Self {
        Self {
            managed: true,
            reusable: true,
            secret_arn: None,
            issuer_url: None,
            installer_role_arn: None,
        }
    }

    /// Request for an unmanaged (self-hosted) config.
    pub fn unmanaged(
        secret_arn: impl Into<String>,
        issuer_url: impl Into<String>,
        installer_role_arn: impl Into<String>,
    ) -> Self {
        Self {
            managed: false,
            reusable: true,
            secret_arn: Some(secret_arn.into()),
            issuer_url: Some(issuer_url.into()),
            installer_role_arn: Some(installer_role_arn.into()),
        }
    }
}

/// An OIDC config as returned by the API.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OidcConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub href: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issuer_url: Option<String>,
    #[serde(default)]
    pub managed: bool,
    #[serde(default)]
    pub reusable: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secret_arn: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub installer_role_arn: Option<String>,
}

/// Body of a thumbprint inquiry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThumbprintRequest {
    pub issuer_url: String,
}

/// Result of a thumbprint inquiry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Thumbprint {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub href: Option<String>,
    #[serde(default)]
    pub thumbprint: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub oidc_config_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cluster_id: Option<String>,
}

impl Thumbprint {
    /// Thumbprint value with no metadata.
    pub fn new(thumbprint: impl Into<String>) -> Self {
        Self {
            thumbprint: thumbprint.into(),
            ..Self::default()
        }
    }
}

/// Minimal view of a cluster returned by a search.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClusterRef {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl ClusterRef {
    /// Cluster known by name only.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            id: None,
            name: Some(name.into()),
        }
    }

    /// Name for messages: the cluster name, else its id.
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.name
            .as_deref()
            .or(self.id.as_deref())
            .unwrap_or("<unnamed>")
    }
}

/// Page of a cluster search.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClusterList {
    #[serde(default)]
    pub kind: String,
    #[serde(default)]
    pub page: u32,
    #[serde(default)]
    pub size: u32,
    #[serde(default)]
    pub total: u32,
    #[serde(default)]
    pub items: Vec<ClusterRef>,
}

/// Search expression selecting clusters that use the given OIDC config.
#[must_use]
pub fn clusters_using_oidc_config(id: &str) -> String {
    format!("aws.sts.oidc_config.id = '{}'", id.replace('\'', "''"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_managed_request_serialization() {
        let body = serde_json::to_value(OidcConfigRequest::managed()).unwrap();
        assert_eq!(body, serde_json::json!({"managed": true, "reusable": true}));
    }

    #[test]
    fn test_unmanaged_request_serialization() {
        let request = OidcConfigRequest::unmanaged(
            "arn:aws:secretsmanager:us-east-1:765374464689:secret:key",
            "https://oidc-f3y4.s3.us-east-1.amazonaws.com",
            "arn:aws:iam::765374464689:role/Installer-Role",
        );
        let body = serde_json::to_value(&request).unwrap();
        assert_eq!(body["managed"], false);
        assert_eq!(
            body["issuer_url"],
            "https://oidc-f3y4.s3.us-east-1.amazonaws.com"
        );
        assert_eq!(
            body["installer_role_arn"],
            "arn:aws:iam::765374464689:role/Installer-Role"
        );
    }

    #[test]
    fn test_oidc_config_deserialization() {
        let json = r#"{
          "href": "/api/clusters_mgmt/v1/oidc_configs/23f6gk51qi5ng15mm095c90hhajbf7c5",
          "id": "23f6gk51qi5ng15mm095c90hhajbf7c5",
          "issuer_url": "https://d3gt1gce2zmg3d.cloudfront.net/23f6gk51qi5ng15mm095c90hhajbf7c5",
          "managed": true,
          "reusable": true
        }"#;
        let config: OidcConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.id.as_deref(), Some("23f6gk51qi5ng15mm095c90hhajbf7c5"));
        assert!(config.managed);
        assert!(config.secret_arn.is_none());
    }

    #[test]
    fn test_oidc_config_missing_fields_deserialize() {
        let config: OidcConfig = serde_json::from_str(r#"{"managed": false}"#).unwrap();
        assert!(config.id.is_none());
        assert!(config.issuer_url.is_none());
    }

    #[test]
    fn test_thumbprint_deserialization() {
        let json = r#"{
          "href": "/api/clusters_mgmt/v1/aws_inquiries/oidc_thumbprint/9e99a48a9960b14926bb7f3b02e22da2b0ab7280",
          "thumbprint": "9e99a48a9960b14926bb7f3b02e22da2b0ab7280",
          "oidc_config_id": "23f6gk51qi5ng15mm095c90hhajbf7c5",
          "cluster_id": ""
        }"#;
        let thumbprint: Thumbprint = serde_json::from_str(json).unwrap();
        assert_eq!(
            thumbprint.thumbprint,
            "9e99a48a9960b14926bb7f3b02e22da2b0ab7280"
        );
    }

    #[test]
    fn test_cluster_list_deserialization() {
        let empty: ClusterList =
            serde_json::from_str(r#"{"kind": "ClusterList", "page": 0, "size": 0, "total": 0, "items": []}"#)
                .unwrap();
        assert!(empty.items.is_empty());

        let one: ClusterList = serde_json::from_str(
            r#"{"kind": "ClusterList", "page": 1, "size": 1, "total": 1, "items": [{"name": "cluster-name"}]}"#,
        )
        .unwrap();
        assert_eq!(one.items.len(), 1);
        assert_eq!(one.items[0].display_name(), "cluster-name");
    }

    #[test]
    fn test_cluster_display_name_fallbacks() {
        let by_id = ClusterRef {
            id: Some("1abc".to_string()),
            name: None,
        };
        assert_eq!(by_id.display_name(), "1abc");
        assert_eq!(ClusterRef::default().display_name(), "<unnamed>");
    }

    #[test]
    fn test_search_expression_quotes_id() {
        assert_eq!(
            clusters_using_oidc_config("abc"),
            "aws.sts.oidc_config.id = 'abc'"
        );
        assert_eq!(
            clusters_using_oidc_config("a'b"),
            "aws.sts.oidc_config.id = 'a''b'"
        );
    }
}
