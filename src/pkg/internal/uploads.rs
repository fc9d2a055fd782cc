use std::path::Path;

use axum::http::StatusCode;
use standard_error::{Interpolate, StandardError, Status};
use uuid::Uuid;

use crate::prelude::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bucket {
    Resumes,
    Avatars,
    Posts,
}

impl Bucket {
    pub const ALL: [Bucket; 3] = [Bucket::Resumes, Bucket::Avatars, Bucket::Posts];

    pub fn as_str(&self) -> &'static str {
        match self {
            Bucket::Resumes => "resumes",
            Bucket::Avatars => "avatars",
            Bucket::Posts => "posts",
        }
    }
}

pub const RESUME_TYPES: &[&str] = &[
    "application/pdf",
    "application/msword",
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
];

#[derive(Debug)]
pub enum Accept {
    Images,
    Only(&'static [&'static str]),
}

impl Accept {
    fn allows(&self, content_type: &str) -> bool {
        match self {
            Accept::Images => content_type.starts_with("image/"),
            Accept::Only(types) => types.contains(&content_type),
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum KeyShape {
    Avatar,
    PostImage,
    Resume,
}

#[derive(Debug)]
pub struct UploadPolicy {
    pub bucket: Bucket,
    pub accept: Accept,
    pub max_bytes: usize,
    shape: KeyShape,
}

pub const AVATAR: UploadPolicy = UploadPolicy {
    bucket: Bucket::Avatars,
    accept: Accept::Images,
    max_bytes: 2 * 1024 * 1024,
    shape: KeyShape::Avatar,
};

pub const POST_IMAGE: UploadPolicy = UploadPolicy {
    bucket: Bucket::Posts,
    accept: Accept::Images,
    max_bytes: 5 * 1024 * 1024,
    shape: KeyShape::PostImage,
};

pub const RESUME: UploadPolicy = UploadPolicy {
    bucket: Bucket::Resumes,
    accept: Accept::Only(RESUME_TYPES),
    max_bytes: 5 * 1024 * 1024,
    shape: KeyShape::Resume,
};

/// A file part read out of a multipart request.
#[derive(Debug)]
pub struct Upload {
    pub file_name: String,
    pub content_type: String,
    pub data: Vec<u8>,
}

impl UploadPolicy {
    /// Checks type and size. Runs before anything touches storage or the db.
    pub fn check(&self, upload: &Upload) -> Result<()> {
        if !self.accept.allows(&upload.content_type) {
            return Err(StandardError::new("ERR-UPLOAD-001")
                .interpolate_err(upload.content_type.clone())
                .code(StatusCode::UNSUPPORTED_MEDIA_TYPE));
        }
        if upload.data.len() > self.max_bytes {
            return Err(StandardError::new("ERR-UPLOAD-002")
                .interpolate_err(format!("{} MB", self.max_bytes / (1024 * 1024)))
                .code(StatusCode::PAYLOAD_TOO_LARGE));
        }
        Ok(())
    }

    pub fn object_key(&self, user_id: &Uuid, file_name: &str, millis: i64) -> String {
        let ext = extension(file_name);
        match self.shape {
            KeyShape::Avatar => format!("{}-avatar-{}.{}", user_id, millis, ext),
            KeyShape::PostImage => format!("post-images/{}-{}.{}", user_id, millis, ext),
            KeyShape::Resume => format!("{}-resume-{}.{}", user_id, millis, ext),
        }
    }

    /// Whether `key` was generated by this policy for `user_id`.
    pub fn owns_key(&self, user_id: &Uuid, key: &str) -> bool {
        let prefix = match self.shape {
            KeyShape::Avatar => format!("{}-avatar-", user_id),
            KeyShape::PostImage => format!("post-images/{}-", user_id),
            KeyShape::Resume => format!("{}-resume-", user_id),
        };
        key.starts_with(&prefix)
    }
}

fn extension(file_name: &str) -> String {
    Path::new(file_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .filter(|ext| ext.chars().all(|c| c.is_ascii_alphanumeric()))
        .map(|ext| ext.to_lowercase())
        .unwrap_or_else(|| "bin".into())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn upload(content_type: &str, size: usize) -> Upload {
        Upload {
            file_name: "drawing.png".into(),
            content_type: content_type.into(),
            data: vec![0u8; size],
        }
    }

    #[test]
    fn test_oversized_avatar_is_rejected() {
        assert!(AVATAR.check(&upload("image/png", 2 * 1024 * 1024)).is_ok());
        assert!(AVATAR.check(&upload("image/png", 2 * 1024 * 1024 + 1)).is_err());
    }

    #[test]
    fn test_post_image_allows_five_megabytes() {
        assert!(POST_IMAGE.check(&upload("image/jpeg", 5 * 1024 * 1024)).is_ok());
        assert!(POST_IMAGE.check(&upload("image/jpeg", 5 * 1024 * 1024 + 1)).is_err());
    }

    #[test]
    fn test_non_images_are_rejected_for_image_buckets() {
        assert!(AVATAR.check(&upload("application/pdf", 10)).is_err());
        assert!(POST_IMAGE.check(&upload("text/html", 10)).is_err());
    }

    #[test]
    fn test_resume_accepts_only_documents() {
        for t in RESUME_TYPES {
            assert!(RESUME.check(&upload(t, 1024)).is_ok());
        }
        assert!(RESUME.check(&upload("image/png", 1024)).is_err());
        assert!(RESUME.check(&upload("application/pdf", 5 * 1024 * 1024 + 1)).is_err());
    }

    #[test]
    fn test_object_keys() {
        let id = Uuid::nil();
        assert_eq!(
            AVATAR.object_key(&id, "Me.JPG", 42),
            format!("{}-avatar-42.jpg", id)
        );
        assert_eq!(
            POST_IMAGE.object_key(&id, "site plan.png", 7),
            format!("post-images/{}-7.png", id)
        );
        assert_eq!(
            RESUME.object_key(&id, "cv", 1),
            format!("{}-resume-1.bin", id)
        );
    }

    #[test]
    fn test_owns_key_only_matches_own_avatars() {
        let me = Uuid::new_v4();
        let other = Uuid::new_v4();
        let key = AVATAR.object_key(&me, "a.png", 1);
        assert!(AVATAR.owns_key(&me, &key));
        assert!(!AVATAR.owns_key(&other, &key));
        assert!(!RESUME.owns_key(&me, &key));
    }
}
