use super::gateway::Bucket;

const PUBLIC_PREFIX: &str = "/storage/v1/object/public/";
const SIGNED_PREFIX: &str = "/storage/v1/object/sign/";

/// Derive the stored object path from a column value.
///
/// Rows may hold a bare path (what uploads return) or a full public or signed
/// URL written by another client. Signed URLs carry a token in the query
/// string, which is dropped. Any other URL is not ours to resolve.
pub fn object_path(bucket: Bucket, value: &str) -> Option<String> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }

    for prefix in [PUBLIC_PREFIX, SIGNED_PREFIX] {
        let marker = format!("{prefix}{}/", bucket.name());
        if let Some((_, rest)) = value.split_once(marker.as_str()) {
            let rest = rest.split('?').next().unwrap_or_default();
            return (!rest.is_empty()).then(|| rest.to_string());
        }
    }

    if value.contains("://") {
        return None;
    }
    Some(value.to_string())
}

/// Build the public URL of `path` under a hosted `base` URL.
pub(super) fn hosted_public_url(base: &str, bucket: Bucket, path: &str) -> String {
    format!(
        "{}{PUBLIC_PREFIX}{}/{}",
        base.trim_end_matches('/'),
        bucket.name(),
        path.trim_start_matches('/')
    )
}

/// Reject paths that are absolute or climb out of the bucket directory.
pub(super) fn is_safe_relative(path: &str) -> bool {
    !path.is_empty()
        && !path.starts_with('/')
        && !path.starts_with('\\')
        && path
            .split(['/', '\\'])
            .all(|part| !part.is_empty() && part != "." && part != "..")
}
