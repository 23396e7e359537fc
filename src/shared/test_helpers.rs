use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::core::error::{AppError, Result};
use crate::modules::storage::{ImageStore, ImageUpload};

/// Ordered log of collaborator calls shared between test doubles
pub type Journal = Arc<Mutex<Vec<String>>>;

pub fn new_journal() -> Journal {
    Arc::new(Mutex::new(Vec::new()))
}

pub fn journal_entries(journal: &Journal) -> Vec<String> {
    journal.lock().unwrap().clone()
}

/// Image store that names images sequentially and records every call
pub struct RecordingImageStore {
    journal: Journal,
    saved: Mutex<Vec<String>>,
    deleted: Mutex<Vec<String>>,
    fail_saves: bool,
}

impl RecordingImageStore {
    pub fn new(journal: Journal) -> Self {
        Self {
            journal,
            saved: Mutex::new(Vec::new()),
            deleted: Mutex::new(Vec::new()),
            fail_saves: false,
        }
    }

    /// Store whose saves always fail with an external service error
    pub fn failing(journal: Journal) -> Self {
        Self {
            fail_saves: true,
            ..Self::new(journal)
        }
    }

    pub fn saved(&self) -> Vec<String> {
        self.saved.lock().unwrap().clone()
    }

    pub fn deleted(&self) -> Vec<String> {
        self.deleted.lock().unwrap().clone()
    }
}

#[async_trait]
impl ImageStore for RecordingImageStore {
    async fn save_image(&self, upload: ImageUpload) -> Result<String> {
        if self.fail_saves {
            return Err(AppError::ExternalServiceError(
                "image storage unavailable".to_string(),
            ));
        }

        let mut saved = self.saved.lock().unwrap();
        let name = format!("image-{}-{}", saved.len() + 1, upload.file_name);
        saved.push(name.clone());
        self.journal
            .lock()
            .unwrap()
            .push(format!("image.save:{}", name));
        Ok(name)
    }

    async fn delete_image_if_exists(&self, name: &str) -> Result<()> {
        self.deleted.lock().unwrap().push(name.to_string());
        self.journal
            .lock()
            .unwrap()
            .push(format!("image.delete:{}", name));
        Ok(())
    }

    fn image_url(&self, name: &str) -> String {
        format!("http://images.test/{}", name)
    }
}

/// Image upload fixture with a PNG content type
pub fn png_upload(file_name: &str, data: &[u8]) -> ImageUpload {
    ImageUpload {
        data: data.to_vec(),
        file_name: file_name.to_string(),
        content_type: "image/png".to_string(),
    }
}
