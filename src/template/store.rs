//! Directory-backed template storage
//!
//! Layout on disk is `root/<group>/<template file>`. Every file inside one
//! group directory is registered into a single Handlebars registry, so any
//! template in the group can pull in a sibling as a partial (`{{> header}}`).

use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::Path;
use std::sync::Arc;

use handlebars::Handlebars;

use super::types::{TemplateError, TemplateResult};

/// A named set of templates compiled into one shared namespace
pub struct TemplateGroup {
    name: String,
    registry: Handlebars<'static>,
}

impl std::fmt::Debug for TemplateGroup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TemplateGroup")
            .field("name", &self.name)
            .field("templates", &self.template_names())
            .finish()
    }
}

impl TemplateGroup {
    /// Compile every regular file directly inside `dir` into one group.
    /// Nested directories and hidden files are skipped.
    pub fn load(name: &str, dir: &Path) -> TemplateResult<Self> {
        let entries = fs::read_dir(dir).map_err(|e| TemplateError::load(dir, e))?;

        // Sorted so duplicate-name reporting is deterministic
        let mut sources = BTreeMap::new();
        for entry in entries {
            let entry = entry.map_err(|e| TemplateError::load(dir, e))?;
            let path = entry.path();

            let file_type = entry.file_type().map_err(|e| TemplateError::load(&path, e))?;
            if !file_type.is_file() {
                continue;
            }

            let Some(stem) = template_name(&path) else {
                continue;
            };

            if let Some(previous) = sources.insert(stem.clone(), path.clone()) {
                return Err(TemplateError::load(
                    &path,
                    format!(
                        "template name '{}' already defined by {}",
                        stem,
                        previous.display()
                    ),
                ));
            }
        }

        let mut registry = Handlebars::new();
        registry.set_strict_mode(true);

        for (template, path) in &sources {
            let source = fs::read_to_string(path).map_err(|e| TemplateError::load(path, e))?;
            registry
                .register_template_string(template, source)
                .map_err(|e| TemplateError::load(path, e))?;
        }

        tracing::debug!(
            group = %name,
            templates = sources.len(),
            "Template group compiled"
        );

        Ok(Self {
            name: name.to_string(),
            registry,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Check if the group defines a template
    pub fn contains(&self, template: &str) -> bool {
        self.registry.has_template(template)
    }

    /// Template names in the group, sorted
    pub fn template_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.registry.get_templates().keys().cloned().collect();
        names.sort();
        names
    }

    pub(crate) fn registry(&self) -> &Handlebars<'static> {
        &self.registry
    }
}

/// Read-only mapping from group name to compiled template group
#[derive(Debug, Default)]
pub struct TemplateStore {
    groups: HashMap<String, TemplateGroup>,
}

impl TemplateStore {
    /// Load every first-level directory under `root` as a template group.
    ///
    /// Any listing, read, or parse failure aborts the whole load.
    #[tracing::instrument(name = "template_store.load", skip_all, fields(root = %root.as_ref().display()))]
    pub fn load(root: impl AsRef<Path>) -> TemplateResult<Self> {
        let root = root.as_ref();
        let entries = fs::read_dir(root).map_err(|e| TemplateError::load(root, e))?;

        let mut groups = HashMap::new();
        for entry in entries {
            let entry = entry.map_err(|e| TemplateError::load(root, e))?;
            let path = entry.path();

            let file_type = entry.file_type().map_err(|e| TemplateError::load(&path, e))?;
            if !file_type.is_dir() {
                continue;
            }

            let Some(name) = entry.file_name().to_str().map(str::to_string) else {
                tracing::warn!(path = %path.display(), "Skipping group with non UTF-8 name");
                continue;
            };

            let group = TemplateGroup::load(&name, &path)?;
            groups.insert(name, group);
        }

        let store = Self { groups };
        tracing::info!(
            groups = store.len(),
            templates = store.template_count(),
            "Templates loaded"
        );

        Ok(store)
    }

    /// Get a group by name
    pub fn group(&self, name: &str) -> TemplateResult<&TemplateGroup> {
        self.groups
            .get(name)
            .ok_or_else(|| TemplateError::GroupNotFound(name.to_string()))
    }

    /// Group names, sorted
    pub fn group_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.groups.keys().cloned().collect();
        names.sort();
        names
    }

    /// Number of groups
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Number of templates across all groups
    pub fn template_count(&self) -> usize {
        self.groups
            .values()
            .map(|group| group.registry.get_templates().len())
            .sum()
    }
}

/// Load a store and wrap it for sharing between request handlers
pub fn load_template_store(root: impl AsRef<Path>) -> TemplateResult<Arc<TemplateStore>> {
    TemplateStore::load(root).map(Arc::new)
}

fn template_name(path: &Path) -> Option<String> {
    let file_name = path.file_name()?.to_str()?;
    if file_name.starts_with('.') {
        return None;
    }

    path.file_stem()?.to_str().map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn write(dir: &Path, relative: &str, contents: &str) {
        let path = dir.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, contents).unwrap();
    }

    #[test]
    fn test_load_groups_by_directory() {
        let root = TempDir::new().unwrap();
        write(root.path(), "billing/invoice.html", "<title>Invoice</title>");
        write(root.path(), "billing/default.html", "<title>Billing</title>");
        write(root.path(), "auth/reset.html", "<title>Reset</title>");
        write(root.path(), "README.md", "not a group");

        let store = TemplateStore::load(root.path()).unwrap();

        assert_eq!(store.group_names(), vec!["auth", "billing"]);
        assert_eq!(store.template_count(), 3);
        assert_eq!(
            store.group("billing").unwrap().template_names(),
            vec!["default", "invoice"]
        );
    }

    #[test]
    fn test_nested_directories_are_not_recursed() {
        let root = TempDir::new().unwrap();
        write(root.path(), "billing/invoice.html", "<title>Invoice</title>");
        write(root.path(), "billing/archive/old.html", "<title>Old</title>");

        let store = TemplateStore::load(root.path()).unwrap();
        let billing = store.group("billing").unwrap();

        assert!(billing.contains("invoice"));
        assert!(!billing.contains("old"));
        assert!(store.group("archive").is_err());
    }

    #[test]
    fn test_hidden_files_are_skipped() {
        let root = TempDir::new().unwrap();
        write(root.path(), "billing/.gitkeep", "");
        write(root.path(), "billing/invoice.html", "<title>Invoice</title>");

        let store = TemplateStore::load(root.path()).unwrap();
        assert_eq!(store.group("billing").unwrap().template_names(), vec!["invoice"]);
    }

    #[test]
    fn test_empty_group_directory_loads() {
        let root = TempDir::new().unwrap();
        fs::create_dir(root.path().join("empty")).unwrap();

        let store = TemplateStore::load(root.path()).unwrap();
        assert!(store.group("empty").unwrap().template_names().is_empty());
    }

    #[test]
    fn test_missing_root_fails() {
        let root = PathBuf::from("/nonexistent/mail-templates");
        let err = TemplateStore::load(&root).unwrap_err();
        assert!(matches!(err, TemplateError::Load { .. }));
    }

    #[test]
    fn test_syntax_error_aborts_whole_load() {
        let root = TempDir::new().unwrap();
        write(root.path(), "auth/reset.html", "<title>Reset</title>");
        write(root.path(), "billing/broken.html", "<title>{{#if x}}</title>");

        let err = TemplateStore::load(root.path()).unwrap_err();
        match err {
            TemplateError::Load { path, .. } => assert!(path.ends_with("broken.html")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_unreadable_template_aborts_whole_load() {
        let root = TempDir::new().unwrap();
        write(root.path(), "auth/reset.html", "<title>Reset</title>");
        fs::create_dir(root.path().join("billing")).unwrap();
        fs::write(root.path().join("billing/invoice.html"), [0xff, 0xfe, 0x00, 0xc3]).unwrap();

        let err = TemplateStore::load(root.path()).unwrap_err();
        match err {
            TemplateError::Load { path, .. } => assert!(path.ends_with("invoice.html")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[cfg(unix)]
    #[test]
    fn test_unlistable_group_aborts_whole_load() {
        use std::os::unix::fs::PermissionsExt;

        let root = TempDir::new().unwrap();
        write(root.path(), "auth/reset.html", "<title>Reset</title>");
        write(root.path(), "billing/invoice.html", "<title>Invoice</title>");
        let locked = root.path().join("billing");
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();

        // Privileged users can still list the directory
        let listable = fs::read_dir(&locked).is_ok();
        let result = TemplateStore::load(root.path());
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();

        if listable {
            return;
        }
        match result {
            Err(TemplateError::Load { path, .. }) => assert_eq!(path, locked),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_duplicate_stem_is_rejected() {
        let root = TempDir::new().unwrap();
        write(root.path(), "billing/invoice.html", "<title>Invoice</title>");
        write(root.path(), "billing/invoice.htm", "<title>Invoice</title>");

        let err = TemplateStore::load(root.path()).unwrap_err();
        assert!(err.to_string().contains("invoice"));
    }

    #[test]
    fn test_unknown_group() {
        let store = TemplateStore::default();
        assert!(store.is_empty());
        assert!(matches!(
            store.group("billing"),
            Err(TemplateError::GroupNotFound(name)) if name == "billing"
        ));
    }
}
