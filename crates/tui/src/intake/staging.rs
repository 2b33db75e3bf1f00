use std::path::{Path, PathBuf};

/// A photo selected for AI analysis but not yet uploaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagedPhoto {
    pub path: PathBuf,
    pub file_name: String,
}

impl StagedPhoto {
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.to_string_lossy().into_owned());
        Self { path, file_name }
    }
}

/// Holding area for photos pending analysis.
///
/// Entirely independent of network state: entries may be added or removed
/// while an analysis request is in flight. Duplicate selections are kept
/// as-is; the buffer does no identity dedup.
#[derive(Debug, Default)]
pub struct StagingBuffer {
    photos: Vec<StagedPhoto>,
}

impl StagingBuffer {
    pub fn add(&mut self, photos: impl IntoIterator<Item = StagedPhoto>) {
        self.photos.extend(photos);
    }

    pub fn add_path(&mut self, path: impl AsRef<Path>) {
        self.photos.push(StagedPhoto::from_path(path.as_ref()));
    }

    /// Removes exactly one entry; later entries shift down by one.
    /// Out-of-range indices are ignored.
    pub fn remove_at(&mut self, index: usize) -> Option<StagedPhoto> {
        if index < self.photos.len() {
            Some(self.photos.remove(index))
        } else {
            None
        }
    }

    pub fn clear(&mut self) {
        self.photos.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.photos.is_empty()
    }

    pub fn len(&self) -> usize {
        self.photos.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &StagedPhoto> {
        self.photos.iter()
    }

    pub fn photos(&self) -> &[StagedPhoto] {
        &self.photos
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_preserves_order_and_duplicates() {
        let mut buffer = StagingBuffer::default();
        buffer.add([
            StagedPhoto::from_path("a.jpg"),
            StagedPhoto::from_path("b.jpg"),
            StagedPhoto::from_path("a.jpg"),
        ]);

        let names: Vec<_> = buffer.iter().map(|p| p.file_name.as_str()).collect();
        assert_eq!(names, ["a.jpg", "b.jpg", "a.jpg"]);
    }

    #[test]
    fn remove_at_shifts_later_entries() {
        let mut buffer = StagingBuffer::default();
        buffer.add([
            StagedPhoto::from_path("a.jpg"),
            StagedPhoto::from_path("b.jpg"),
            StagedPhoto::from_path("c.jpg"),
        ]);

        let removed = buffer.remove_at(1);
        assert_eq!(removed.map(|p| p.file_name), Some("b.jpg".to_string()));
        assert_eq!(buffer.len(), 2);
        let names: Vec<_> = buffer.iter().map(|p| p.file_name.as_str()).collect();
        assert_eq!(names, ["a.jpg", "c.jpg"]);
    }

    #[test]
    fn remove_at_out_of_range_is_a_no_op() {
        let mut buffer = StagingBuffer::default();
        buffer.add_path("a.jpg");

        assert!(buffer.remove_at(5).is_none());
        assert_eq!(buffer.len(), 1);
    }

    #[test]
    fn file_name_derived_from_path() {
        let photo = StagedPhoto::from_path("/tmp/zdjecia/portfel.jpg");
        assert_eq!(photo.file_name, "portfel.jpg");
    }
}
