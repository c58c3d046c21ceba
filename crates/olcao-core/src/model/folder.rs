//! Carpetas de la calculación: sandbox (antes del envío) y recuperada
//! (después de la ejecución).
use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Directorio de staging donde `prepare_for_submission` deposita entradas.
#[derive(Debug, Clone)]
pub struct SandboxFolder {
    root: PathBuf,
}

impl SandboxFolder {
    /// Usa (y crea si hace falta) `root` como sandbox.
    pub fn new(root: impl Into<PathBuf>) -> io::Result<Self> {
        let root = root.into();
        fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    pub fn path(&self) -> &Path {
        &self.root
    }

    pub fn create_file_from_bytes(&mut self, name: &str, bytes: &[u8]) -> io::Result<()> {
        fs::write(self.root.join(name), bytes)
    }

    /// Nombres de primer nivel, ordenados.
    pub fn get_content_list(&self) -> io::Result<Vec<String>> {
        let mut names = Vec::new();
        for entry in fs::read_dir(&self.root)? {
            names.push(entry?.file_name().to_string_lossy().into_owned());
        }
        names.sort();
        Ok(names)
    }

    pub fn read_to_string(&self, name: &str) -> io::Result<String> {
        fs::read_to_string(self.root.join(name))
    }
}

/// Archivos recuperados tras la ejecución, indexados por nombre relativo.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RetrievedFolder {
    files: BTreeMap<String, Vec<u8>>,
}

impl RetrievedFolder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, content: impl Into<Vec<u8>>) {
        self.files.insert(name.into(), content.into());
    }

    pub fn with_file(mut self, name: impl Into<String>, content: impl Into<Vec<u8>>) -> Self {
        self.insert(name, content);
        self
    }

    /// Nombres ordenados lexicográficamente.
    pub fn list_object_names(&self) -> Vec<String> {
        self.files.keys().cloned().collect()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.files.contains_key(name)
    }

    pub fn get_object_content(&self, name: &str) -> io::Result<&[u8]> {
        self.files
            .get(name)
            .map(|v| v.as_slice())
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, format!("{name} not in retrieved folder")))
    }

    /// Carga recursivamente un directorio; los nombres usan `/` como separador.
    pub fn from_dir(dir: &Path) -> io::Result<Self> {
        let mut folder = Self::new();
        load_dir(dir, dir, &mut folder)?;
        Ok(folder)
    }
}

fn load_dir(base: &Path, dir: &Path, folder: &mut RetrievedFolder) -> io::Result<()> {
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        if entry.file_type()?.is_dir() {
            load_dir(base, &path, folder)?;
        } else {
            let rel = path.strip_prefix(base)
                          .map_err(|e| io::Error::new(io::ErrorKind::Other, e.to_string()))?;
            let name = rel.components()
                          .map(|c| c.as_os_str().to_string_lossy().into_owned())
                          .collect::<Vec<_>>()
                          .join("/");
            folder.insert(name, fs::read(&path)?);
        }
    }
    Ok(())
}
