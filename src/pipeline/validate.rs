use tracing::warn;

use crate::models::UploadedImage;

const ALLOWED_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "bmp", "gif"];

const ALLOWED_CONTENT_TYPES: &[&str] = &[
    "image/jpeg",
    "image/jpg",
    "image/png",
    "image/bmp",
    "image/gif",
];

/// Checks an upload against the size/extension/content-type policy.
///
/// This is a pure predicate over request metadata. It deliberately does not
/// sniff magic numbers; the worker is the one that actually decodes the
/// bytes and will reject non-images on its own.
pub fn is_valid_image(upload: &UploadedImage, max_upload_size: u64) -> bool {
    if upload.data.is_empty() {
        warn!("upload is empty");
        return false;
    }

    let size = upload.data.len() as u64;
    if size > max_upload_size {
        warn!(size, max_upload_size, "upload exceeds maximum allowed size");
        return false;
    }

    let Some(filename) = upload.filename.as_deref() else {
        warn!("upload has no filename");
        return false;
    };

    let extension = upload.extension().unwrap_or("").to_ascii_lowercase();
    if !ALLOWED_EXTENSIONS.contains(&extension.as_str()) {
        warn!(filename, extension, "file extension is not allowed");
        return false;
    }

    let Some(content_type) = upload.content_type.as_deref() else {
        warn!(filename, "upload has no content type");
        return false;
    };
    if !ALLOWED_CONTENT_TYPES.contains(&content_type.to_ascii_lowercase().as_str()) {
        warn!(filename, content_type, "content type is not allowed");
        return false;
    }

    true
}
