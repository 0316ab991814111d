//! Projection of remote OIDC config data onto local state
//!
//! The projection is pure: the same remote data and prior state always give
//! the same result, and projecting again onto that result changes nothing.

use crate::error::{Error, Result};
use crate::state::OidcConfigState;
use clustersmgmt::{OidcConfig, Thumbprint};
use declarative::Lifecycle;

/// Strip the leading URI scheme (`https://`, `http://`, ...) from an issuer URL
///
/// URLs without a scheme are returned unchanged.
pub fn endpoint_url(issuer_url: &str) -> &str {
    match issuer_url.split_once("://") {
        Some((scheme, rest)) if is_scheme(scheme) => rest,
        _ => issuer_url,
    }
}

fn is_scheme(s: &str) -> bool {
    let mut chars = s.chars();
    chars.next().is_some_and(|c| c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

/// Build the local state of a config from its remote representation
///
/// Attributes the read endpoint does not echo (`installer_role_arn`, and
/// `secret_arn` on some responses) are carried over from `prior`. For
/// unmanaged configs the caller-supplied issuer spelling is kept when the
/// remote one differs only by ASCII case.
///
/// # Errors
///
/// Returns [`Error::MalformedResponse`] if the remote data has no `id` or
/// `issuer_url`, or the thumbprint is empty.
pub fn project(
    remote: &OidcConfig,
    thumbprint: &Thumbprint,
    prior: Option<&OidcConfigState>,
) -> Result<OidcConfigState> {
    let id = non_blank(remote.id.as_deref()).ok_or(Error::MalformedResponse { field: "id" })?;
    let remote_issuer = non_blank(remote.issuer_url.as_deref())
        .ok_or(Error::MalformedResponse { field: "issuer_url" })?;
    let thumbprint = non_blank(Some(thumbprint.thumbprint.as_str()))
        .ok_or(Error::MalformedResponse { field: "thumbprint" })?;

    let issuer_url = match prior {
        Some(prior) if !remote.managed && prior.issuer_url.eq_ignore_ascii_case(remote_issuer) => {
            prior.issuer_url.clone()
        }
        _ => remote_issuer.to_string(),
    };

    let carried = |remote: Option<&str>, prior: Option<&String>| {
        non_blank(remote)
            .map(str::to_string)
            .or_else(|| prior.filter(|p| !p.trim().is_empty()).cloned())
    };
    let (secret_arn, installer_role_arn) = if remote.managed {
        (None, None)
    } else {
        (
            carried(
                remote.secret_arn.as_deref(),
                prior.and_then(|p| p.secret_arn.as_ref()),
            ),
            carried(
                remote.installer_role_arn.as_deref(),
                prior.and_then(|p| p.installer_role_arn.as_ref()),
            ),
        )
    };

    Ok(OidcConfigState {
        id: id.to_string(),
        oidc_endpoint_url: Some(endpoint_url(&issuer_url).to_string()),
        issuer_url,
        managed: remote.managed,
        secret_arn,
        installer_role_arn,
        thumbprint: Some(thumbprint.to_string()),
        lifecycle: Lifecycle::Ready,
    })
}
