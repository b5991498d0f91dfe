use crate::{Error, Result, StoredImage};
use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};
use tracing::{debug, warn};

pub trait ObjectStore {
    fn put(&mut self, path: &str, bytes: &[u8]) -> Result<()>;

    /// Removing an object that is already gone is not an error.
    fn delete(&mut self, path: &str) -> Result<()>;

    fn exists(&self, path: &str) -> Result<bool>;
}

/// Deletes every image in `images`, stopping at the first storage failure.
pub(crate) fn delete_images<'a, S, I>(store: &mut S, images: I) -> Result<usize>
where
    S: ObjectStore + ?Sized,
    I: IntoIterator<Item = &'a StoredImage>,
{
    let mut deleted = 0;
    for image in images {
        store.delete(&image.path)?;
        debug!(path = %image.path, "deleted image");
        deleted += 1;
    }
    Ok(deleted)
}

/// Deletes `previous` unless `next` still points at the same object.
pub(crate) fn delete_replaced<S>(
    store: &mut S,
    previous: Option<&StoredImage>,
    next: Option<&StoredImage>,
) -> Result<usize>
where
    S: ObjectStore + ?Sized,
{
    match previous {
        Some(old) if next.map_or(true, |new| new.path != old.path) => delete_images(store, [old]),
        _ => Ok(0),
    }
}

/// Keeps objects in memory. Used by tests and dry runs.
#[derive(Debug, Default)]
pub struct MemoryStore {
    objects: BTreeMap<String, Vec<u8>>,
}

impl MemoryStore {
    pub fn new() -> MemoryStore {
        MemoryStore::default()
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }
}

impl ObjectStore for MemoryStore {
    fn put(&mut self, path: &str, bytes: &[u8]) -> Result<()> {
        self.objects.insert(path.to_string(), bytes.to_vec());
        Ok(())
    }

    fn delete(&mut self, path: &str) -> Result<()> {
        if self.objects.remove(path).is_none() {
            warn!(path, "image already missing from storage");
        }
        Ok(())
    }

    fn exists(&self, path: &str) -> Result<bool> {
        Ok(self.objects.contains_key(path))
    }
}

/// Keeps objects as files below a root directory.
#[derive(Debug)]
pub struct DirStore {
    root: PathBuf,
}

impl DirStore {
    pub fn new(root: impl Into<PathBuf>) -> Result<DirStore> {
        let root = root.into();
        fs_err::create_dir_all(&root)?;
        Ok(DirStore { root })
    }

    fn resolve(&self, path: &str) -> Result<PathBuf> {
        let relative = Path::new(path);
        if path.is_empty()
            || !relative
                .components()
                .all(|c| matches!(c, Component::Normal(_)))
        {
            return Err(Error::invalid("path", format!("{:?} is not a storage path", path)));
        }
        Ok(self.root.join(relative))
    }
}

impl ObjectStore for DirStore {
    fn put(&mut self, path: &str, bytes: &[u8]) -> Result<()> {
        let file = self.resolve(path)?;
        if let Some(parent) = file.parent() {
            fs_err::create_dir_all(parent)?;
        }
        fs_err::write(file, bytes)?;
        Ok(())
    }

    fn delete(&mut self, path: &str) -> Result<()> {
        match fs_err::remove_file(self.resolve(path)?) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == ErrorKind::NotFound => {
                warn!(path, "image already missing from storage");
                Ok(())
            }
            Err(err) => Err(err.into()),
        }
    }

    fn exists(&self, path: &str) -> Result<bool> {
        Ok(self.resolve(path)?.is_file())
    }
}
