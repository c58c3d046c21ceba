//! Copia de archivos del directorio de trabajo al directorio recuperado
//! según la lista de recuperación de la calculación.
use std::fs;
use std::io;
use std::path::Path;

use olcao_core::model::RetrieveItem;
use olcao_core::pattern;

/// Últimos `depth` componentes de `name` (al menos el nombre de archivo).
fn keep_tail(name: &str, depth: u32) -> String {
    let parts: Vec<&str> = name.split('/').collect();
    let keep = (depth as usize).clamp(1, parts.len());
    parts[parts.len() - keep..].join("/")
}

/// Nombres relativos (separados por `/`) de los archivos bajo `work`.
///
/// Sólo lee metadatos. Entradas ilegibles (symlinks colgantes, directorios
/// sin permiso) se omiten y no se sigue ningún symlink a directorio.
fn list_files(work: &Path) -> io::Result<Vec<String>> {
    let mut names = Vec::new();
    walk(work, "", &mut names)?;
    names.sort();
    Ok(names)
}

fn walk(dir: &Path, prefix: &str, names: &mut Vec<String>) -> io::Result<()> {
    for entry in fs::read_dir(dir)? {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                log::debug!("retrieve: skipping unreadable entry in {}: {e}", dir.display());
                continue;
            }
        };
        let path = entry.path();
        let name = format!("{prefix}{}", entry.file_name().to_string_lossy());
        let (meta, linked) = match fs::symlink_metadata(&path) {
            Ok(meta) if meta.file_type().is_symlink() => (fs::metadata(&path), true),
            other => (other, false),
        };
        match meta {
            Ok(meta) if meta.is_dir() && !linked => {
                if let Err(e) = walk(&path, &format!("{name}/"), names) {
                    log::debug!("retrieve: skipping directory {name}: {e}");
                }
            }
            Ok(meta) if meta.is_file() => names.push(name),
            Ok(_) => {}
            Err(e) => log::debug!("retrieve: skipping {name}: {e}"),
        }
    }
    Ok(())
}

/// Copia a `dest` todo lo que coincide con `items`; devuelve los nombres
/// relativos recuperados. Patrones sin coincidencia no son error, y un
/// archivo que coincide pero no se puede copiar se omite con un aviso.
pub fn retrieve_files(work: &Path, dest: &Path, items: &[RetrieveItem]) -> io::Result<Vec<String>> {
    fs::create_dir_all(dest)?;
    let names = list_files(work)?;
    let mut copied = Vec::new();

    for item in items {
        let (glob, local, depth) = match item {
            RetrieveItem::Name(name) => (name.as_str(), None, None),
            RetrieveItem::Nested(remote, local, depth) => (remote.as_str(), Some(local.as_str()), Some(*depth)),
        };
        let matched = pattern::filter(glob, &names);
        if matched.is_empty() {
            log::debug!("retrieve: nothing matches '{glob}'");
        }
        for name in matched {
            let target = match (local, depth) {
                (Some(local), Some(depth)) => {
                    let tail = keep_tail(&name, depth);
                    if local == "." {
                        tail
                    } else {
                        format!("{}/{tail}", local.trim_end_matches('/'))
                    }
                }
                _ => name.clone(),
            };
            let path = dest.join(&target);
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)?;
            }
            if let Err(e) = fs::copy(work.join(&name), &path) {
                log::warn!("retrieve: could not copy {name}: {e}");
                continue;
            }
            if !copied.contains(&target) {
                copied.push(target);
            }
        }
    }
    Ok(copied)
}
