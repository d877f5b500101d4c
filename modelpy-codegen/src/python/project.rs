//! Python package scaffolding.
//!
//! Emits the `pyproject.toml`, version module, `py.typed` marker and the
//! package `__init__.py` chain around the generated sources. Output is a
//! pure function of the input models, so regenerating from the same
//! model tree is byte-identical.

use indexmap::IndexMap;
use modelpy_model::Model;

/// Scaffolding files for the generated package tree, keyed by relative
/// path.
#[must_use]
pub fn emit_project(models: &[Model]) -> IndexMap<String, String> {
    let mut files = IndexMap::new();
    let Some(first) = models.first() else {
        return files;
    };

    let mut tops: Vec<&str> = models
        .iter()
        .filter_map(|m| m.namespace.split('.').next())
        .collect();
    tops.sort_unstable();
    tops.dedup();
    let package = tops.first().copied().unwrap_or("model");
    let version = &first.version;

    files.insert("pyproject.toml".to_string(), pyproject(package, version));

    files.insert(
        format!("src/{package}/__init__.py"),
        "from .version import __version__\n".to_string(),
    );
    files.insert(format!("src/{package}/version.py"), version_module(version));
    files.insert(format!("src/{package}/py.typed"), String::new());

    for model in models {
        let segments: Vec<&str> = model.namespace.split('.').collect();
        for depth in 1..=segments.len() {
            let dir = segments[..depth].join("/");
            let init = format!("src/{dir}/__init__.py");
            files.entry(init).or_insert_with(|| " ".to_string());
        }
        if !model.functions.is_empty() {
            let dir = model.namespace.replace('.', "/");
            files.insert(format!("src/{dir}/functions/__init__.py"), " ".to_string());
        }
    }
    files
}

fn pyproject(package: &str, version: &str) -> String {
    format!(
        "[build-system]\n\
         requires = [\"setuptools>=62.0\"]\n\
         build-backend = \"setuptools.build_meta\"\n\
         \n\
         [project]\n\
         name = \"python-{package}\"\n\
         version = \"{version}\"\n\
         requires-python = \">=3.11\"\n\
         dependencies = [\n\
         \x20   \"pydantic>=2.10.3\",\n\
         \x20   \"rune.runtime>=1.0.0,<1.1.0\"\n\
         ]\n\
         \n\
         [tool.setuptools.packages.find]\n\
         where = [\"src\"]\n"
    )
}

fn version_module(version: &str) -> String {
    let components: Vec<String> = version
        .split('.')
        .map(|part| {
            if part.chars().all(|c| c.is_ascii_digit()) && !part.is_empty() {
                part.to_string()
            } else {
                format!("'{part}'")
            }
        })
        .collect();
    format!(
        "version = ({},)\n\
         version_str = '{version}'\n\
         __version__ = '{version}'\n\
         \n\
         # EOF\n",
        components.join(", ")
    )
}
