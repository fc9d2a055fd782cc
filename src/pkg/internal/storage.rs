use async_trait::async_trait;
use aws_sdk_s3::{
    Client,
    config::{BehaviorVersion, Credentials, Region},
    primitives::ByteStream,
};
use standard_error::{Interpolate, StandardError};

use chrono::Utc;
use uuid::Uuid;

use crate::{
    conf::settings,
    pkg::internal::uploads::{Bucket, Upload, UploadPolicy},
    prelude::Result,
};

pub fn s3_client() -> Client {
    let creds = Credentials::new(
        settings.s3_access_key.clone(),
        settings.s3_secret_key.clone(),
        None,
        None,
        "archinnection-settings",
    );
    let conf = aws_sdk_s3::config::Builder::new()
        .behavior_version(BehaviorVersion::latest())
        .region(Region::new(settings.s3_region.clone()))
        .endpoint_url(&settings.s3_endpoint)
        .credentials_provider(creds)
        .force_path_style(true)
        .build();
    Client::from_conf(conf)
}

pub async fn create_bucket(
    client: &Client,
    bucket_name: &str,
) -> Result<Option<aws_sdk_s3::operation::create_bucket::CreateBucketOutput>> {
    let mut create = client.create_bucket().bucket(bucket_name);
    // us-east-1 must not be sent as an explicit constraint
    if settings.s3_region != "us-east-1" {
        let constraint =
            aws_sdk_s3::types::BucketLocationConstraint::from(settings.s3_region.as_str());
        let cfg = aws_sdk_s3::types::CreateBucketConfiguration::builder()
            .location_constraint(constraint)
            .build();
        create = create.create_bucket_configuration(cfg);
    }
    create.send().await.map(Some).or_else(|err| {
        if err
            .as_service_error()
            .map(|se| se.is_bucket_already_exists() || se.is_bucket_already_owned_by_you())
            == Some(true)
        {
            Ok(None)
        } else {
            Err(StandardError::new("ERR-S3-001").interpolate_err(err.to_string()))
        }
    })
}

/// Object operations used by the upload flows.
#[async_trait]
pub trait S3Ops {
    async fn upload_object(
        &self,
        bucket: &str,
        key: &str,
        data: Vec<u8>,
        content_type: &str,
    ) -> Result<()>;

    /// S3 deletes are idempotent, so a missing key is not an error.
    async fn remove_object(&self, bucket: &str, key: &str) -> Result<()>;
}

#[async_trait]
impl S3Ops for Client {
    async fn upload_object(
        &self,
        bucket: &str,
        key: &str,
        data: Vec<u8>,
        content_type: &str,
    ) -> Result<()> {
        let size = data.len();
        self.put_object()
            .bucket(bucket)
            .key(key)
            .content_type(content_type)
            .body(ByteStream::from(data))
            .send()
            .await
            .map_err(|e| StandardError::new("ERR-S3-002").interpolate_err(e.to_string()))?;
        tracing::debug!("uploaded {}/{} ({} bytes)", bucket, key, size);
        Ok(())
    }

    async fn remove_object(&self, bucket: &str, key: &str) -> Result<()> {
        self.delete_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| StandardError::new("ERR-S3-003").interpolate_err(e.to_string()))?;
        tracing::debug!("removed {}/{}", bucket, key);
        Ok(())
    }
}

pub fn public_url(bucket: &str, key: &str) -> String {
    format!("{}/{}/{}", settings.s3_public_url, bucket, key)
}

/// Recovers the object key from a url produced by [`public_url`].
pub fn key_from_url(bucket: &str, url: &str) -> Option<String> {
    let prefix = format!("{}/{}/", settings.s3_public_url, bucket);
    url.strip_prefix(&prefix)
        .filter(|key| !key.is_empty())
        .map(str::to_string)
}

/// An object written under an upload policy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    pub bucket: Bucket,
    pub key: String,
    pub url: String,
}

/// Validates `upload` against `policy` and writes it. Nothing is sent when validation fails.
pub async fn store<S>(
    s3: &S,
    policy: &UploadPolicy,
    user_id: &Uuid,
    upload: Upload,
) -> Result<StoredObject>
where
    S: S3Ops + Sync + ?Sized,
{
    policy.check(&upload)?;
    let key = policy.object_key(user_id, &upload.file_name, Utc::now().timestamp_millis());
    let bucket = policy.bucket.as_str();
    s3.upload_object(bucket, &key, upload.data, &upload.content_type)
        .await?;
    Ok(StoredObject {
        bucket: policy.bucket,
        url: public_url(bucket, &key),
        key,
    })
}

/// Removes an object whose row write failed. Failures are logged, never raised.
pub async fn discard<S>(s3: &S, object: &StoredObject)
where
    S: S3Ops + Sync + ?Sized,
{
    match s3.remove_object(object.bucket.as_str(), &object.key).await {
        Ok(()) => tracing::warn!("discarded orphaned object {}", &object.url),
        Err(_) => tracing::error!("orphaned object {} could not be removed", &object.url),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use tracing_test::traced_test;

    use super::*;
    use crate::pkg::internal::uploads::{AVATAR, RESUME};

    #[derive(Default)]
    struct Recorder {
        calls: Mutex<Vec<String>>,
    }

    impl Recorder {
        fn calls(&self) -> Vec<String> {
            self.calls.lock().map(|c| c.clone()).unwrap_or_default()
        }
    }

    #[async_trait]
    impl S3Ops for Recorder {
        async fn upload_object(
            &self,
            bucket: &str,
            key: &str,
            _data: Vec<u8>,
            _content_type: &str,
        ) -> Result<()> {
            if let Ok(mut calls) = self.calls.lock() {
                calls.push(format!("put {}/{}", bucket, key));
            }
            Ok(())
        }

        async fn remove_object(&self, bucket: &str, key: &str) -> Result<()> {
            if let Ok(mut calls) = self.calls.lock() {
                calls.push(format!("delete {}/{}", bucket, key));
            }
            Ok(())
        }
    }

    fn upload(content_type: &str, size: usize) -> Upload {
        Upload {
            file_name: "portrait.png".into(),
            content_type: content_type.into(),
            data: vec![1u8; size],
        }
    }

    #[tokio::test]
    async fn test_oversized_upload_never_reaches_storage() {
        let s3 = Recorder::default();
        let user = Uuid::new_v4();
        let result = store(&s3, &AVATAR, &user, upload("image/png", 3 * 1024 * 1024)).await;
        assert!(result.is_err());
        assert!(s3.calls().is_empty());
    }

    #[tokio::test]
    async fn test_wrong_type_never_reaches_storage() {
        let s3 = Recorder::default();
        let result = store(&s3, &RESUME, &Uuid::new_v4(), upload("image/png", 10)).await;
        assert!(result.is_err());
        assert!(s3.calls().is_empty());
    }

    #[tokio::test]
    async fn test_store_writes_under_policy_key() -> Result<()> {
        let s3 = Recorder::default();
        let user = Uuid::new_v4();
        let stored = store(&s3, &AVATAR, &user, upload("image/png", 10)).await?;
        assert_eq!(stored.bucket, Bucket::Avatars);
        assert!(AVATAR.owns_key(&user, &stored.key));
        assert_eq!(key_from_url("avatars", &stored.url), Some(stored.key.clone()));
        assert_eq!(s3.calls(), vec![format!("put avatars/{}", stored.key)]);
        Ok(())
    }

    #[tokio::test]
    #[traced_test]
    async fn test_discard_removes_and_logs() -> Result<()> {
        let s3 = Recorder::default();
        let stored = store(&s3, &AVATAR, &Uuid::new_v4(), upload("image/png", 10)).await?;
        discard(&s3, &stored).await;
        assert_eq!(s3.calls().len(), 2);
        assert!(logs_contain("discarded orphaned object"));
        Ok(())
    }

    #[test]
    fn test_key_round_trips_through_public_url() {
        let url = public_url("avatars", "abc-avatar-1.png");
        assert_eq!(
            key_from_url("avatars", &url).as_deref(),
            Some("abc-avatar-1.png")
        );
    }

    #[test]
    fn test_key_from_foreign_url_is_none() {
        let url = public_url("avatars", "abc-avatar-1.png");
        assert_eq!(key_from_url("resumes", &url), None);
        assert_eq!(key_from_url("avatars", "https://elsewhere.example/x.png"), None);
    }

    #[test]
    fn test_nested_keys_are_preserved() {
        let url = public_url("posts", "post-images/u-1.jpg");
        assert_eq!(
            key_from_url("posts", &url).as_deref(),
            Some("post-images/u-1.jpg")
        );
    }
}
