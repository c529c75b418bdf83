//! Square cropping of downloaded photos
//!
//! Output keeps the downloader's layout: `<out>/<parent dir name>/<stem>.png`.

use crate::images::ImageError;
use image::{GenericImageView, ImageFormat};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex};

const SUPPORTED_EXTENSIONS: [&str; 3] = ["png", "jpg", "jpeg"];

/// Crops one image to its centred square and writes it as PNG
///
/// # Returns
///
/// * `Ok(Some(path))` - The written PNG
/// * `Ok(None)` - Unsupported extension, nothing written
/// * `Err(ImageError)` - The image could not be decoded or written
pub fn crop_square(source: &Path, out_dir: &Path) -> Result<Option<PathBuf>, ImageError> {
    let extension = source
        .extension()
        .map(|ext| ext.to_string_lossy().to_lowercase())
        .unwrap_or_default();
    if !SUPPORTED_EXTENSIONS.contains(&extension.as_str()) {
        tracing::warn!("Skipping {}: unsupported image type", source.display());
        return Ok(None);
    }

    let img = image::open(source)?;
    let (width, height) = img.dimensions();
    let side = width.min(height);
    let square = img.crop_imm((width - side) / 2, (height - side) / 2, side, side);

    let group = source
        .parent()
        .and_then(Path::file_name)
        .map(PathBuf::from)
        .unwrap_or_default();
    let stem = source.file_stem().unwrap_or_default();

    let target_dir = out_dir.join(group);
    std::fs::create_dir_all(&target_dir)?;
    let target = target_dir.join(format!("{}.png", stem.to_string_lossy()));

    square.save_with_format(&target, ImageFormat::Png)?;
    tracing::debug!("Cropped {} to {}", source.display(), target.display());
    Ok(Some(target))
}

/// Crops every image under `img_dir` using `concurrency` workers
///
/// # Returns
///
/// The number of images written
pub async fn crop_square_all(
    img_dir: &Path,
    out_dir: &Path,
    concurrency: usize,
) -> Result<u64, ImageError> {
    let concurrency = concurrency.max(1);
    let (tx, rx) = mpsc::channel::<PathBuf>(concurrency);
    let rx = Arc::new(Mutex::new(rx));

    let workers: Vec<_> = (0..concurrency)
        .map(|_| {
            let rx = Arc::clone(&rx);
            let out_dir = out_dir.to_path_buf();
            tokio::spawn(async move {
                let mut written = 0u64;
                loop {
                    let next = rx.lock().await.recv().await;
                    let Some(path) = next else {
                        break;
                    };
                    let out_dir = out_dir.clone();
                    let cropped =
                        tokio::task::spawn_blocking(move || crop_square(&path, &out_dir)).await??;
                    if cropped.is_some() {
                        written += 1;
                    }
                }
                Ok::<u64, ImageError>(written)
            })
        })
        .collect();
    drop(rx);

    let walked = walk_files(img_dir, &tx).await;
    drop(tx);

    let mut total = 0;
    let mut first_error = walked.err().map(ImageError::from);
    for worker in workers {
        match worker.await? {
            Ok(written) => total += written,
            Err(e) => {
                first_error.get_or_insert(e);
            }
        }
    }

    match first_error {
        Some(e) => Err(e),
        None => Ok(total),
    }
}

/// Sends every file below `dir` down the channel
async fn walk_files(dir: &Path, tx: &mpsc::Sender<PathBuf>) -> std::io::Result<()> {
    let mut pending = vec![dir.to_path_buf()];

    while let Some(dir) = pending.pop() {
        let mut entries = tokio::fs::read_dir(&dir).await?;
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if entry.file_type().await?.is_dir() {
                pending.push(path);
            } else if tx.send(path).await.is_err() {
                // Every worker has stopped on an error
                return Ok(());
            }
        }
    }

    Ok(())
}
