use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use nova_java_model::{MemoryJavaModel, ProjectBuilder};
use walkdir::WalkDir;

/// A Java project lowered from disk.
pub struct LoadedProject {
    pub root: PathBuf,
    pub model: MemoryJavaModel,
    /// Source document URIs and the files they were read from, sorted by URI.
    pub documents: BTreeMap<String, PathBuf>,
}

impl LoadedProject {
    /// `path` is a project directory (every `.java` file below it) or a single
    /// Java file. `dependencies` are directories of dependency sources.
    pub fn load(path: &Path, dependencies: &[PathBuf]) -> Result<Self> {
        let path = path
            .canonicalize()
            .with_context(|| format!("failed to resolve {}", path.display()))?;
        let (root, sources) = if path.is_dir() {
            (path.clone(), java_files(&path)?)
        } else {
            let root = path.parent().map(Path::to_path_buf).unwrap_or_else(|| path.clone());
            (root, vec![path])
        };

        let name = root
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "project".to_string());
        let mut builder = ProjectBuilder::new(name);
        let mut documents = BTreeMap::new();

        for file in sources {
            let text = read(&file)?;
            let uri = file_uri(&file);
            builder.add_source(uri.clone(), text);
            documents.insert(uri, file);
        }

        for dir in dependencies {
            let dir = dir
                .canonicalize()
                .with_context(|| format!("failed to resolve dependency {}", dir.display()))?;
            for file in java_files(&dir)? {
                let text = read(&file)?;
                builder.add_dependency_source(file_uri(&file), text);
            }
        }

        let model = builder.build()?;
        tracing::debug!(
            target = "nova.microprofile",
            root = %root.display(),
            documents = documents.len(),
            types = model.len(),
            "loaded project"
        );

        Ok(Self {
            root,
            model,
            documents,
        })
    }

    pub fn root_uri(&self) -> String {
        file_uri(&self.root)
    }
}

fn read(file: &Path) -> Result<String> {
    std::fs::read_to_string(file).with_context(|| format!("failed to read {}", file.display()))
}

fn java_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in WalkDir::new(dir).sort_by_file_name() {
        let entry = entry.with_context(|| format!("failed to walk {}", dir.display()))?;
        if entry.file_type().is_file()
            && entry.path().extension().is_some_and(|ext| ext == "java")
        {
            files.push(entry.into_path());
        }
    }
    Ok(files)
}

fn file_uri(path: &Path) -> String {
    let path = path.to_string_lossy().replace('\\', "/");
    if path.starts_with('/') {
        format!("file://{path}")
    } else {
        format!("file:///{path}")
    }
}
