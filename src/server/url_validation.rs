use crate::error::SegmuxError;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};
use url::{Host, Url};

/// Validate a user-submitted manifest URL before fetching it (SSRF guard).
///
/// Only absolute `http://` and `https://` URLs are accepted. Unless
/// `allow_private` is set, IP literals in private, loopback, link-local or
/// otherwise non-routable ranges are rejected, as are `localhost` names.
/// Other hostnames are not resolved, so DNS rebinding is out of reach here.
///
/// # Errors
/// Returns [`SegmuxError::InvalidUrl`] describing why the URL was refused.
pub fn validate_manifest_url(url: &str, allow_private: bool) -> Result<Url, SegmuxError> {
    let parsed =
        Url::parse(url).map_err(|e| SegmuxError::InvalidUrl(format!("{url}: {e}")))?;

    match parsed.scheme() {
        "http" | "https" => {}
        scheme => {
            return Err(SegmuxError::InvalidUrl(format!(
                "scheme '{scheme}' not allowed, use http or https"
            )));
        }
    }

    let host = parsed
        .host()
        .ok_or_else(|| SegmuxError::InvalidUrl(format!("no host in {url}")))?;

    if allow_private {
        return Ok(parsed);
    }

    let blocked = match host {
        Host::Ipv4(ip) => is_internal(IpAddr::V4(ip)),
        Host::Ipv6(ip) => is_internal(IpAddr::V6(ip)),
        Host::Domain(name) => {
            let name = name.trim_end_matches('.').to_ascii_lowercase();
            name == "localhost" || name.ends_with(".localhost")
        }
    };

    if blocked {
        return Err(SegmuxError::InvalidUrl(format!(
            "host '{host}' is private or reserved"
        )));
    }

    Ok(parsed)
}

/// True for addresses a public manifest can never legitimately live on.
fn is_internal(ip: IpAddr) -> bool {
    match ip {
        IpAddr::V4(v4) => is_internal_v4(v4),
        IpAddr::V6(v6) => match v6.to_ipv4_mapped() {
            Some(v4) => is_internal_v4(v4),
            None => is_internal_v6(v6),
        },
    }
}

fn is_internal_v4(ip: Ipv4Addr) -> bool {
    ip.octets()[0] == 0
        || ip.is_private()
        || ip.is_loopback()
        || ip.is_link_local()
        || ip.is_broadcast()
}

fn is_internal_v6(ip: Ipv6Addr) -> bool {
    ip.is_unspecified() || ip.is_loopback() || ip.is_unique_local() || ip.is_unicast_link_local()
}
