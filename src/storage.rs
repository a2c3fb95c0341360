//! Uploaded images on the local filesystem.
//!
//! Every image lives under `<image_root>/images/<key>` and is served back at
//! `/images/<key>`.

use std::path::PathBuf;

use chrono::Utc;
use rocket::{fs::TempFile, tokio::fs};

use crate::error::Result;
use crate::model::common::{ballot::CandidateNumber, position::position_rank};

/// URL prefix the image directory is mounted at.
pub const IMAGE_URL_PREFIX: &str = "/images";

const LOGO_DIR: &str = "candidates/logo";
const MEMBER_DIR: &str = "members";
const GROUP_DIR: &str = "candidates/groupimage";

/// Local image storage.
pub struct ImageStore {
    root: PathBuf,
}

impl ImageStore {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    /// The directory served at [`IMAGE_URL_PREFIX`].
    pub fn public_dir(&self) -> PathBuf {
        self.root.join("images")
    }

    /// Create the fixed directories.
    pub async fn prepare(&self) -> Result<()> {
        for dir in [LOGO_DIR, MEMBER_DIR, GROUP_DIR] {
            fs::create_dir_all(self.public_dir().join(dir)).await?;
        }
        Ok(())
    }

    /// Store a party logo, returning its public URL. Each upload gets a
    /// fresh name so browsers never show a stale logo.
    pub async fn save_logo(&self, party_name: &str, file: &mut TempFile<'_>) -> Result<String> {
        let key = format!(
            "{LOGO_DIR}/{}",
            logo_file_name(party_name, Utc::now().timestamp_millis())
        );
        self.store(&key, file).await
    }

    /// Store a member photo, returning its public URL. The file is named
    /// after the member's position, so a new photo for the same position
    /// replaces the old one.
    pub async fn save_member_photo(
        &self,
        party: CandidateNumber,
        position: &str,
        file: &mut TempFile<'_>,
    ) -> Result<String> {
        self.store(&member_photo_key(party, position), file).await
    }

    async fn store(&self, key: &str, file: &mut TempFile<'_>) -> Result<String> {
        let path = self.public_dir().join(key);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }
        file.copy_to(&path).await?;
        debug!("Stored image {}", path.display());
        Ok(public_url(key))
    }
}

fn public_url(key: &str) -> String {
    format!("{IMAGE_URL_PREFIX}/{key}")
}

/// A party name reduced to characters that are safe in a file name: runs of
/// whitespace become `_`, and anything that is not ASCII alphanumeric, `_`
/// or Thai is dropped.
pub fn safe_name(name: &str) -> String {
    name.split_whitespace()
        .collect::<Vec<_>>()
        .join("_")
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_' || is_thai(*c))
        .collect()
}

fn is_thai(c: char) -> bool {
    ('\u{0E00}'..='\u{0E7F}').contains(&c)
}

pub fn logo_file_name(party_name: &str, millis: i64) -> String {
    format!("{}_{millis}.jpg", safe_name(party_name))
}

pub fn member_photo_key(party: CandidateNumber, position: &str) -> String {
    format!("{MEMBER_DIR}/party_{party}/{}.jpg", position_rank(position))
}
