//! Dependency-tree path analysis.
//!
//! Pure structural scan over a '/'-delimited path locating the package
//! boundaries inside a `node_modules` tree. No filesystem access; callers
//! decide what to do with the offsets.
//!
//! Expected pattern, with the four reported offsets:
//!
//! ```text
//! /base/path/node_modules/[@scope/]package/[subdirectory/]file.js
//!           ^            ^                ^               ^
//!           tree root    package name    package root    file name
//! ```

const TREE_ROOT_SEGMENT: &str = "/node_modules/";

/// Offsets into a dependency-tree path. Each is the index of the `/` that
/// starts the named region.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodeModulesPathParts {
    /// Start of the top-level `/node_modules/` boundary.
    pub top_level_node_modules_index: usize,
    /// Separator right after the top-level `node_modules` segment, i.e.
    /// the start of the package name.
    pub top_level_package_name_index: usize,
    /// Separator ending the (innermost) package-name segment(s).
    pub package_root_index: usize,
    /// Separator starting the final file-name segment.
    pub file_name_index: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    BeforeNodeModules,
    NodeModules,
    Scope,
    PackageContent,
}

/// Scan a path for dependency-tree structure.
///
/// Per `/`-delimited segment: entering a `node_modules` boundary moves into
/// the tree root; the following segment is either a `@scope` prefix (the
/// segment after it completes the package name) or the package name itself;
/// a nested `node_modules` boundary inside package content starts a nested
/// package. Returns `None` when no boundary is ever found, or when the path
/// ends before a file segment follows the package name.
pub fn get_node_modules_path_parts(path: &str) -> Option<NodeModulesPathParts> {
    let bytes = path.as_bytes();
    let mut top_level_node_modules_index = 0usize;
    let mut top_level_package_name_index = 0usize;
    let mut package_root_index = 0usize;

    let mut state = State::BeforeNodeModules;
    let mut part_start = 0usize;
    let mut next_sep = Some(0usize);

    while let Some(sep) = next_sep {
        part_start = sep;
        next_sep = path[part_start + 1..]
            .find('/')
            .map(|rel| part_start + 1 + rel);

        match state {
            State::BeforeNodeModules => {
                if path[part_start..].starts_with(TREE_ROOT_SEGMENT) {
                    top_level_node_modules_index = part_start;
                    if let Some(end) = next_sep {
                        top_level_package_name_index = end;
                    }
                    state = State::NodeModules;
                }
            }
            State::NodeModules | State::Scope => {
                if state == State::NodeModules && bytes.get(part_start + 1) == Some(&b'@') {
                    state = State::Scope;
                } else {
                    // The package name needs a file segment after it.
                    package_root_index = next_sep?;
                    state = State::PackageContent;
                }
            }
            State::PackageContent => {
                if path[part_start..].starts_with(TREE_ROOT_SEGMENT) {
                    state = State::NodeModules;
                }
            }
        }
    }

    if state != State::PackageContent {
        return None;
    }

    Some(NodeModulesPathParts {
        top_level_node_modules_index,
        top_level_package_name_index,
        package_root_index,
        file_name_index: part_start,
    })
}
