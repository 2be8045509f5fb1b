//! Path canonicalisation and tree walking.
//!
//! Node names are rooted, slash-separated paths. Every path that reaches the
//! engine has been through [`slash_clean`], so the walk helpers can assume
//! clean input.

/// Canonicalise a path: prepend "/" if absent, resolve `.` and `..`, collapse
/// repeated slashes, and strip any trailing slash except on the root itself.
///
/// The result always begins with "/" and contains no redundant elements.
/// `..` segments that would climb above the root are discarded.
pub fn slash_clean(name: &str) -> String {
    let mut segments: Vec<&str> = Vec::new();
    for segment in name.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            segment => segments.push(segment),
        }
    }
    if segments.is_empty() {
        return "/".to_string();
    }
    let mut cleaned = String::with_capacity(name.len());
    for segment in segments {
        cleaned.push('/');
        cleaned.push_str(segment);
    }
    cleaned
}

/// The immediate parent of a clean path; "/" is its own parent.
pub fn parent_path(name: &str) -> &str {
    match name.rfind('/') {
        None | Some(0) => "/",
        Some(idx) => &name[..idx],
    }
}

/// Iterate from a clean path up to "/" inclusive: the path itself first, then
/// each ancestor in order.
///
/// Callers that care whether a step is the starting path use `enumerate()`;
/// early termination is ordinary loop control.
pub fn ancestors_to_root(name: &str) -> AncestorsToRoot<'_> {
    AncestorsToRoot { next: Some(name) }
}

/// Iterator returned by [`ancestors_to_root`].
#[derive(Debug, Clone)]
pub struct AncestorsToRoot<'a> {
    next: Option<&'a str>,
}

impl<'a> Iterator for AncestorsToRoot<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<&'a str> {
        let current = self.next?;
        self.next = if current == "/" { None } else { Some(parent_path(current)) };
        Some(current)
    }
}
