//! Path string utilities.
//!
//! The engine works on '/'-normalized path strings rather than `PathBuf`:
//! every path it sees comes from the host analyzer already normalized, and
//! every offset it emits must line up with host spans, so paths stay in
//! plain string space end to end.

/// Extensions recognized when stripping a module file name, compound
/// declaration extensions first so `.d.ts` is not mistaken for `.ts`.
const MODULE_EXTENSIONS: [&str; 9] = [
    ".d.mts", ".d.cts", ".d.ts", ".tsx", ".ts", ".jsx", ".js", ".mjs", ".cjs",
];

/// Directory portion of a path, without the trailing separator.
/// `"/a/b/c.ts"` → `"/a/b"`; a bare file name maps to `"."`.
pub fn get_directory_path(path: &str) -> &str {
    match path.rfind('/') {
        Some(0) => "/",
        Some(idx) => &path[..idx],
        None => ".",
    }
}

/// Strip a recognized module extension, if any.
pub fn remove_file_extension(path: &str) -> &str {
    for ext in MODULE_EXTENSIONS {
        if path.len() > ext.len() && path.ends_with(ext) {
            return &path[..path.len() - ext.len()];
        }
    }
    path
}

/// Strip the extension and collapse a trailing `/index` to the bare
/// directory name.
pub fn remove_extension_and_index_suffix(path: &str) -> &str {
    let without_ext = remove_file_extension(path);
    without_ext
        .strip_suffix("/index")
        .unwrap_or(without_ext)
}

/// Whether a specifier is explicit-relative (`./x`, `../x`, `.`, `..`).
pub fn is_external_module_name_relative(name: &str) -> bool {
    name == "." || name == ".." || name.starts_with("./") || name.starts_with("../")
}

/// Prefix `./` unless the path is already explicit-relative.
pub fn ensure_path_is_relative(path: &str) -> String {
    if is_external_module_name_relative(path) {
        path.to_string()
    } else {
        format!("./{path}")
    }
}

/// Whether `path` is `directory` itself or lies underneath it.
/// Segment-aware: `/proj` does not contain `/project2`.
pub fn contains_path(directory: &str, path: &str) -> bool {
    if directory == path {
        return true;
    }
    let directory = directory.strip_suffix('/').unwrap_or(directory);
    path.len() > directory.len()
        && path.starts_with(directory)
        && path.as_bytes()[directory.len()] == b'/'
}

/// Path of `path` relative to `directory`, or `None` if `path` is not
/// underneath it.
pub fn get_relative_path_if_in_directory<'a>(path: &'a str, directory: &'a str) -> Option<&'a str> {
    if !contains_path(directory, path) {
        return None;
    }
    let directory = directory.strip_suffix('/').unwrap_or(directory);
    if path.len() == directory.len() {
        return Some("");
    }
    Some(&path[directory.len() + 1..])
}

/// Relative path from `from_directory` to `to_path`, built from the shared
/// segment prefix with `..` hops for the remainder.
pub fn get_relative_path_to_directory(from_directory: &str, to_path: &str) -> String {
    let from: Vec<&str> = from_directory.split('/').filter(|s| !s.is_empty()).collect();
    let to: Vec<&str> = to_path.split('/').filter(|s| !s.is_empty()).collect();

    let mut common = 0;
    while common < from.len() && common < to.len() && from[common] == to[common] {
        common += 1;
    }

    let mut parts: Vec<&str> = Vec::new();
    for _ in common..from.len() {
        parts.push("..");
    }
    parts.extend(&to[common..]);
    parts.join("/")
}

/// Relative path from a directory to a target, explicit-relative.
pub fn get_relative_path(to_path: &str, from_directory: &str) -> String {
    ensure_path_is_relative(&get_relative_path_to_directory(from_directory, to_path))
}

/// Join a directory and a relative segment, resolving `./` and `../`.
pub fn combine_paths(directory: &str, relative: &str) -> String {
    if relative.starts_with('/') {
        return relative.to_string();
    }
    let mut segments: Vec<&str> = directory.split('/').filter(|s| !s.is_empty()).collect();
    for segment in relative.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            other => segments.push(other),
        }
    }
    let joined = segments.join("/");
    if directory.starts_with('/') {
        format!("/{joined}")
    } else {
        joined
    }
}
