//! Downloads the photos of saved recipes
//!
//! Files land in `<out>/<document id>/<hash><ext>`. The hash is taken from the
//! image URL, so re-running the downloader skips everything already on disk.

use crate::images::ImageError;
use crate::model::Recipe;
use crate::sites::SiteRegistry;
use crate::storage::FrontierStore;
use reqwest::Client;
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use url::Url;

/// Length of the hex hash used as file stem
const HASH_LEN: usize = 20;

/// Totals of a download pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DownloadReport {
    pub recipes: u64,
    pub downloaded: u64,
    pub skipped: u64,
}

/// File name of a downloaded image
///
/// First 20 hex characters of the SHA-256 of the URL, followed by the
/// extension of the URL path (if any).
///
/// # Example
///
/// ```
/// use recipe_harvester::images::image_file_name;
///
/// let name = image_file_name("https://x.test/img/photo.jpg").unwrap();
/// assert_eq!(name.len(), 24);
/// assert!(name.ends_with(".jpg"));
/// ```
pub fn image_file_name(image_url: &str) -> Result<String, ImageError> {
    let parsed =
        Url::parse(image_url).map_err(|e| ImageError::InvalidUrl(format!("{}: {}", image_url, e)))?;

    let hash = hex::encode(Sha256::digest(image_url.as_bytes()));
    let extension = Path::new(parsed.path())
        .extension()
        .map(|ext| format!(".{}", ext.to_string_lossy()))
        .unwrap_or_default();

    Ok(format!("{}{}", &hash[..HASH_LEN], extension))
}

/// Downloads recipe images into a directory
pub struct ImageDownloader {
    client: Client,
    out_dir: PathBuf,
}

impl ImageDownloader {
    pub fn new(client: Client, out_dir: impl Into<PathBuf>) -> Self {
        Self {
            client,
            out_dir: out_dir.into(),
        }
    }

    /// Downloads the images of every saved recipe of every registered site
    pub async fn download_all(
        &self,
        store: &dyn FrontierStore,
        sites: &SiteRegistry,
    ) -> Result<DownloadReport, ImageError> {
        let mut report = DownloadReport::default();

        for site in sites.sites() {
            tracing::info!("Downloading images of {}", site.name());

            for document in store.all_documents(site.name())? {
                let document = document?;
                let recipe: Recipe = document.decode()?;
                let (downloaded, skipped) = self.download_recipe(document.id, &recipe).await?;

                report.recipes += 1;
                report.downloaded += downloaded;
                report.skipped += skipped;
            }
        }

        Ok(report)
    }

    /// Downloads the images of one recipe
    ///
    /// # Returns
    ///
    /// `(downloaded, skipped)` counts
    pub async fn download_recipe(
        &self,
        document_id: i64,
        recipe: &Recipe,
    ) -> Result<(u64, u64), ImageError> {
        let dir = self.out_dir.join(document_id.to_string());
        let mut downloaded = 0;
        let mut skipped = 0;

        for image_url in &recipe.imgs {
            let target = dir.join(image_file_name(image_url)?);
            if tokio::fs::try_exists(&target).await? {
                tracing::debug!("Skipping {} ({} exists)", image_url, target.display());
                skipped += 1;
                continue;
            }

            tracing::debug!("Downloading {} to {}", image_url, target.display());
            let bytes = self
                .client
                .get(image_url)
                .send()
                .await?
                .error_for_status()?
                .bytes()
                .await?;

            tokio::fs::create_dir_all(&dir).await?;
            tokio::fs::write(&target, &bytes).await?;
            downloaded += 1;
        }

        Ok((downloaded, skipped))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::SqliteStore;
    use tempfile::TempDir;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn recipe(imgs: Vec<String>) -> Recipe {
        Recipe {
            url: "https://www.kwestiasmaku.com/przepis/sernik".to_string(),
            name: "Sernik".to_string(),
            portions: 12,
            ingredients: Vec::new(),
            steps: Vec::new(),
            imgs,
        }
    }

    #[test]
    fn test_image_file_name() {
        let name = image_file_name("https://x.test/files/photo.JPG?itok=abc").unwrap();
        let expected = hex::encode(Sha256::digest(b"https://x.test/files/photo.JPG?itok=abc"));
        assert_eq!(name, format!("{}.JPG", &expected[..20]));
    }

    #[test]
    fn test_image_file_name_without_extension() {
        let name = image_file_name("https://x.test/image").unwrap();
        assert_eq!(name.len(), 20);
        assert!(!name.contains('.'));
    }

    #[test]
    fn test_image_file_name_invalid_url() {
        assert!(matches!(
            image_file_name("not a url"),
            Err(ImageError::InvalidUrl(_))
        ));
    }

    #[tokio::test]
    async fn test_download_recipe_and_skip_existing() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/img/sernik.jpg"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![1u8, 2, 3]))
            .expect(1)
            .mount(&server)
            .await;

        let out = TempDir::new().unwrap();
        let downloader = ImageDownloader::new(Client::new(), out.path());
        let image_url = format!("{}/img/sernik.jpg", server.uri());
        let recipe = recipe(vec![image_url.clone()]);

        let first = downloader.download_recipe(42, &recipe).await.unwrap();
        assert_eq!(first, (1, 0));

        let target = out
            .path()
            .join("42")
            .join(image_file_name(&image_url).unwrap());
        assert_eq!(std::fs::read(&target).unwrap(), vec![1u8, 2, 3]);

        let second = downloader.download_recipe(42, &recipe).await.unwrap();
        assert_eq!(second, (0, 1));
    }

    #[tokio::test]
    async fn test_download_failure_is_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let out = TempDir::new().unwrap();
        let downloader = ImageDownloader::new(Client::new(), out.path());
        let recipe = recipe(vec![format!("{}/missing.png", server.uri())]);

        let result = downloader.download_recipe(1, &recipe).await;
        assert!(matches!(result, Err(ImageError::Http(_))));
        assert!(!out.path().join("1").exists());
    }

    #[tokio::test]
    async fn test_download_all_reads_saved_recipes() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![9u8; 16]))
            .mount(&server)
            .await;

        let mut store = SqliteStore::new_in_memory().unwrap();
        let saved = recipe(vec![
            format!("{}/a.jpg", server.uri()),
            format!("{}/b.png", server.uri()),
        ]);
        let payload = serde_json::to_string(&saved).unwrap();
        let id = store
            .record_document("kwestiasmaku.com", &saved.url, &payload)
            .unwrap();

        let out = TempDir::new().unwrap();
        let downloader = ImageDownloader::new(Client::new(), out.path());
        let report = downloader
            .download_all(&store, &SiteRegistry::default())
            .await
            .unwrap();

        assert_eq!(
            report,
            DownloadReport {
                recipes: 1,
                downloaded: 2,
                skipped: 0
            }
        );
        assert_eq!(
            std::fs::read_dir(out.path().join(id.to_string())).unwrap().count(),
            2
        );
    }
}
