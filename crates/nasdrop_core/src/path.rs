use crate::escape::decode_uri;
use crate::plan::FolderToCreate;
use crate::rule::DomainRule;

/// Relative destination path mirrored from the URL structure after the rule's anchor.
///
/// Returns `None` when the anchor is missing from the URL or when the file
/// sits directly under it. Purely numeric folder names get a `_` prefix so the
/// NAS never sees a bare number as a folder name.
pub fn derive_path(url: &str, rule: &DomainRule) -> Option<String> {
    let anchor = rule.create_path_after_url_component.as_str();
    let start = url.find(anchor)? + anchor.len();
    let last_slash = url.rfind('/')?;
    if last_slash <= start {
        return None;
    }

    let path = url[start..last_slash]
        .split('/')
        .map(|segment| {
            let segment = decode_uri(segment);
            if is_integer_segment(&segment) {
                format!("_{segment}")
            } else {
                segment
            }
        })
        .collect::<Vec<_>>()
        .join("/");
    Some(path)
}

fn is_integer_segment(segment: &str) -> bool {
    let digits = segment
        .strip_prefix(|c: char| c == '+' || c == '-')
        .unwrap_or(segment);
    !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())
}

/// Folder entries needed to materialize `relative` under `base`: every ancestor, then the leaf.
pub fn folder_chain(base: &str, relative: &str) -> Vec<FolderToCreate> {
    let segments: Vec<&str> = relative.split('/').filter(|s| !s.is_empty()).collect();
    let base = base.trim_end_matches('/');

    segments
        .iter()
        .enumerate()
        .map(|(depth, name)| {
            let parent_path = std::iter::once(base)
                .chain(segments[..depth].iter().copied())
                .filter(|part| !part.is_empty())
                .collect::<Vec<_>>()
                .join("/");
            FolderToCreate::new(parent_path, *name)
        })
        .collect()
}

/// Destination for a task: `base`, optionally extended by `sub`, never starting with `/`.
pub fn join_destination(base: &str, sub: Option<&str>) -> String {
    let joined = match sub.map(|s| s.trim_matches('/')).filter(|s| !s.is_empty()) {
        Some(sub) => format!("{}/{}", base.trim_end_matches('/'), sub),
        None => base.to_string(),
    };
    joined.trim_start_matches('/').to_string()
}
