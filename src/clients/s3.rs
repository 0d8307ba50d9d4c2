//! S3 location of the shared configuration document.

use async_trait::async_trait;
use aws_sdk_s3::Client as S3Client;
use aws_sdk_s3::error::DisplayErrorContext;

use crate::core::resolver::RemoteConfigSource;
use crate::errors::DigestError;

pub struct S3ConfigSource {
    client: S3Client,
    bucket: String,
    key: String,
}

impl S3ConfigSource {
    #[must_use]
    pub fn new(client: S3Client, bucket: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            client,
            bucket: bucket.into(),
            key: key.into(),
        }
    }

    #[must_use]
    pub fn from_sdk_config(
        sdk_config: &aws_config::SdkConfig,
        bucket: impl Into<String>,
        key: impl Into<String>,
    ) -> Self {
        Self::new(S3Client::new(sdk_config), bucket, key)
    }
}

#[async_trait]
impl RemoteConfigSource for S3ConfigSource {
    fn describe(&self) -> String {
        format!("s3://{}/{}", self.bucket, self.key)
    }

    async fn fetch(&self) -> Result<Option<String>, DigestError> {
        let out = match self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(&self.key)
            .send()
            .await
        {
            Ok(out) => out,
            Err(e) => {
                if e.as_service_error().is_some_and(|se| se.is_no_such_key()) {
                    return Ok(None);
                }
                return Err(DigestError::AwsError(format!(
                    "s3 get_object: {}",
                    DisplayErrorContext(e)
                )));
            }
        };

        let bytes = out
            .body
            .collect()
            .await
            .map_err(|e| DigestError::AwsError(format!("s3 read body: {e}")))?
            .into_bytes();

        String::from_utf8(bytes.to_vec())
            .map(Some)
            .map_err(|e| DigestError::ConfigInvalid(format!("configuration is not UTF-8: {e}")))
    }
}
