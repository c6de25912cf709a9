//! Module specifier computation.
//!
//! Given a target module and the file an import will be written into, this
//! resolver produces the best textual specifier for the new import. It is
//! the inverse of loader resolution: instead of mapping specifier text to a
//! file, it maps a file to the specifier text the host's loader
//! configuration would most plausibly accept.
//!
//! Strategies are attempted in fixed precedence order, first success wins:
//!
//! 1. Ambient module name (quoted declaration, no backing file)
//! 2. Type-roots relative name
//! 3. Bare package name inside a `node_modules` tree
//! 4. `baseUrl`-relative name, refined through `paths` mappings
//! 5. `rootDirs` logical-root mapping
//! 6. Explicit-relative path (unconditional fallback)

use crate::config::{CompilerOptions, ModuleResolutionKind};
use crate::node_modules::{NodeModulesPathParts, get_node_modules_path_parts};
use crate::paths::{
    combine_paths, contains_path, get_directory_path, get_relative_path,
    get_relative_path_if_in_directory, remove_extension_and_index_suffix, remove_file_extension,
};
use crate::program::{ExportOracle, ModuleId};
use tracing::debug;

/// Simplified package.json structure: only the entry-point fields matter
/// when deciding whether a file is importable by bare package name.
#[derive(Debug, Clone, Default, serde::Deserialize)]
struct PackageJson {
    main: Option<String>,
    types: Option<String>,
    typings: Option<String>,
}

/// Computes import specifiers for one fix request.
pub struct ModuleSpecifierResolver<'a> {
    oracle: &'a dyn ExportOracle,
    options: &'a CompilerOptions,
}

impl<'a> ModuleSpecifierResolver<'a> {
    pub fn new(oracle: &'a dyn ExportOracle, options: &'a CompilerOptions) -> Self {
        ModuleSpecifierResolver { oracle, options }
    }

    /// Best specifier for importing `target` from `current_file`. Always
    /// succeeds; the relative-path fallback is unconditional.
    pub fn resolve(&self, current_file: &str, target: ModuleId) -> String {
        if let Some(name) = self.try_ambient_module_name(target) {
            debug!(strategy = "ambient", specifier = %name, "resolved module specifier");
            return name;
        }

        // Non-ambient modules always have a backing file.
        let module_file = match self.oracle.module_file_name(target) {
            Some(file) => file,
            None => {
                let name = strip_quotes(self.oracle.module_name(target)).to_string();
                debug!(specifier = %name, "module without file, using declared name");
                return name;
            }
        };
        let source_directory = get_directory_path(current_file);

        let (strategy, specifier) = if let Some(name) = self.try_type_roots(module_file) {
            ("type-roots", name)
        } else if let Some(name) = self.try_node_modules(module_file, source_directory) {
            ("node-modules", name)
        } else if let Some(name) = self.try_base_url_and_paths(module_file) {
            ("base-url", name)
        } else if let Some(name) = self.try_root_dirs(module_file, source_directory) {
            ("root-dirs", name)
        } else {
            let relative = get_relative_path(module_file, source_directory);
            ("relative", remove_file_extension(&relative).to_string())
        };
        debug!(strategy, specifier = %specifier, "resolved module specifier");
        specifier
    }

    /// Strategy 1: a module declared with a quoted literal name is imported
    /// by exactly that name.
    fn try_ambient_module_name(&self, target: ModuleId) -> Option<String> {
        if self.oracle.module_file_name(target).is_some() {
            return None;
        }
        Some(strip_quotes(self.oracle.module_name(target)).to_string())
    }

    /// Strategy 2: path relative to a configured type-declaration root.
    fn try_type_roots(&self, module_file: &str) -> Option<String> {
        let type_roots = self.options.type_roots.as_ref()?;
        type_roots.iter().find_map(|root| {
            let relative = get_relative_path_if_in_directory(module_file, root)?;
            Some(remove_extension_and_index_suffix(relative).to_string())
        })
    }

    /// Strategy 3: bare package name for files inside a `node_modules`
    /// tree. Only applies under package-directory (`node`) resolution.
    fn try_node_modules(&self, module_file: &str, source_directory: &str) -> Option<String> {
        if self.options.module_resolution != ModuleResolutionKind::Node {
            return None;
        }
        let parts = get_node_modules_path_parts(module_file)?;

        let specifier = self.directory_or_extensionless_file_name(module_file, &parts);

        // Make the result loader-relative: inside the same dependency tree
        // the package-relative name suffices, otherwise fall back to a
        // relative path to the (extensionless) module path.
        let base_path = &module_file[..parts.top_level_node_modules_index];
        if base_path.is_empty() || contains_path(base_path, source_directory) {
            Some(specifier[parts.top_level_package_name_index + 1..].to_string())
        } else {
            Some(get_relative_path(&specifier, source_directory))
        }
    }

    /// If the file is the package's declared entry point it is importable
    /// by the bare package root; otherwise strip the extension and collapse
    /// a trailing `/index`.
    fn directory_or_extensionless_file_name(
        &self,
        module_file: &str,
        parts: &NodeModulesPathParts,
    ) -> String {
        let package_root = &module_file[..parts.package_root_index];
        let package_json_path = format!("{package_root}/package.json");
        if let Some(content) = self.oracle.read_file(&package_json_path) {
            match serde_json::from_str::<PackageJson>(&content) {
                Ok(package_json) => {
                    let entry = package_json
                        .typings
                        .or(package_json.types)
                        .or(package_json.main);
                    if let Some(entry) = entry {
                        let main_export_file = combine_paths(package_root, &entry);
                        if main_export_file == module_file {
                            return package_root.to_string();
                        }
                    }
                }
                Err(error) => {
                    debug!(path = %package_json_path, %error, "ignoring unparseable package.json");
                }
            }
        }

        let without_extension = remove_file_extension(module_file);
        if &without_extension[parts.file_name_index..] == "/index" {
            without_extension[..parts.file_name_index].to_string()
        } else {
            without_extension.to_string()
        }
    }

    /// Strategy 4: `baseUrl`-relative name, refined through the `paths`
    /// mapping table in declaration order.
    fn try_base_url_and_paths(&self, module_file: &str) -> Option<String> {
        let base_url = self.options.base_url.as_deref()?;
        let relative = get_relative_path_if_in_directory(module_file, base_url)?;
        // Both forms participate in exact matching; only the collapsed one
        // participates in wildcard matching and is the final fallback.
        let relative_with_index = remove_file_extension(relative);
        let relative_name = remove_extension_and_index_suffix(relative);

        if let Some(paths) = &self.options.paths {
            for (key, targets) in paths {
                for pattern in targets {
                    let pattern = pattern.as_str();
                    match pattern.matches('*').count() {
                        1 if pattern != "*" => {
                            let star = pattern.find('*').expect("counted above");
                            let prefix = &pattern[..star];
                            let suffix = &pattern[star + 1..];
                            if relative_name.len() >= prefix.len() + suffix.len()
                                && relative_name.starts_with(prefix)
                                && relative_name.ends_with(suffix)
                            {
                                let matched =
                                    &relative_name[prefix.len()..relative_name.len() - suffix.len()];
                                return Some(key.replacen('*', matched, 1));
                            }
                        }
                        0 if pattern == relative_name || pattern == relative_with_index => {
                            return Some(key.clone());
                        }
                        _ => {}
                    }
                }
            }
        }

        Some(relative_name.to_string())
    }

    /// Strategy 5: map both endpoints through the configured logical root
    /// directories.
    fn try_root_dirs(&self, module_file: &str, source_directory: &str) -> Option<String> {
        let root_dirs = self.options.root_dirs.as_ref()?;
        let normalized_target = path_relative_to_root_dirs(module_file, root_dirs)?;
        let relative = match path_relative_to_root_dirs(source_directory, root_dirs) {
            Some(normalized_source) => get_relative_path(normalized_target, normalized_source),
            None => normalized_target.to_string(),
        };
        Some(remove_file_extension(&relative).to_string())
    }
}

fn path_relative_to_root_dirs<'p>(path: &'p str, root_dirs: &[String]) -> Option<&'p str> {
    root_dirs
        .iter()
        .find_map(|root| get_relative_path_if_in_directory(path, root))
}

fn strip_quotes(name: &str) -> &str {
    let bytes = name.as_bytes();
    if bytes.len() >= 2
        && (bytes[0] == b'"' || bytes[0] == b'\'')
        && bytes[bytes.len() - 1] == bytes[0]
    {
        &name[1..name.len() - 1]
    } else {
        name
    }
}
