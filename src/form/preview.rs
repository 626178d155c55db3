//! Preview handles for images attached to a listing form.
//!
//! A [`PreviewRef`] stands for an external resource (an object URL, a
//! thumbnail on disk) and must be handed back to its provider exactly once.
//! It is deliberately not `Clone`.

use std::collections::BTreeSet;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{debug, warn};

/// A local image file picked by the user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageFile {
    pub name: String,
    pub path: PathBuf,
}

impl ImageFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.to_string_lossy().into_owned());
        Self { name, path }
    }
}

/// Handle to a rendered preview
#[derive(Debug, PartialEq, Eq)]
pub struct PreviewRef(String);

impl PreviewRef {
    pub fn new(reference: impl Into<String>) -> Self {
        Self(reference.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Creates and releases preview resources
pub trait PreviewProvider {
    fn create_preview(&self, file: &ImageFile) -> PreviewRef;

    fn release_preview(&self, preview: PreviewRef);
}

#[derive(Debug, Default)]
struct Registry {
    next_id: u64,
    live: BTreeSet<String>,
    released: Vec<String>,
}

/// In-process preview provider issuing `preview://N/<file>` references.
///
/// Cloning shares the same registry, so a caller can keep a handle to
/// inspect what is still live after giving one to a form.
#[derive(Debug, Clone, Default)]
pub struct LocalPreviewRegistry {
    inner: Arc<Mutex<Registry>>,
}

impl LocalPreviewRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Registry> {
        // A poisoned registry still holds consistent bookkeeping
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// References created and not yet released
    pub fn live(&self) -> Vec<String> {
        self.lock().live.iter().cloned().collect()
    }

    pub fn live_count(&self) -> usize {
        self.lock().live.len()
    }

    /// Released references in release order
    pub fn released(&self) -> Vec<String> {
        self.lock().released.clone()
    }
}

impl PreviewProvider for LocalPreviewRegistry {
    fn create_preview(&self, file: &ImageFile) -> PreviewRef {
        let mut registry = self.lock();
        registry.next_id += 1;
        let reference = format!("preview://{}/{}", registry.next_id, file.name);
        registry.live.insert(reference.clone());
        debug!("Created preview {}", reference);
        PreviewRef(reference)
    }

    fn release_preview(&self, preview: PreviewRef) {
        let mut registry = self.lock();
        if registry.live.remove(&preview.0) {
            debug!("Released preview {}", preview.0);
            registry.released.push(preview.0);
        } else {
            warn!("Release of unknown preview {}", preview.0);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn image_name_comes_from_path() {
        let file = ImageFile::new("/tmp/uploads/tractor-front.jpg");
        assert_eq!(file.name, "tractor-front.jpg");
    }

    #[test]
    fn registry_tracks_live_and_released() {
        let registry = LocalPreviewRegistry::new();
        let a = registry.create_preview(&ImageFile::new("a.jpg"));
        let b = registry.create_preview(&ImageFile::new("b.jpg"));
        assert_ne!(a, b);
        assert_eq!(registry.live_count(), 2);

        let a_ref = a.as_str().to_string();
        registry.release_preview(a);
        assert_eq!(registry.live_count(), 1);
        assert_eq!(registry.released(), vec![a_ref]);
        assert_eq!(registry.live(), vec![b.as_str().to_string()]);
    }
}
