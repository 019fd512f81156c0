use serde::Serialize;
use tracing::info;

use crate::analyzers::pipeline::PipelineRun;
use crate::output::{CATALOG_FILE, GRADE_FILE, RANKING_FILE, TIME_FILE};

/// Serializes a value to JSON and uploads it to an S3 bucket with `application/json` content type.
pub async fn write_json_to_s3(
    client: &aws_sdk_s3::Client,
    bucket: &str,
    key: &str,
    value: &impl Serialize,
) -> anyhow::Result<()> {
    let body = serde_json::to_vec(value)?;

    client
        .put_object()
        .bucket(bucket)
        .key(key)
        .body(body.into())
        .content_type("application/json")
        .send()
        .await?;

    Ok(())
}

fn object_key(prefix: &str, file: &str) -> String {
    let prefix = prefix.trim_matches('/');
    if prefix.is_empty() {
        file.to_string()
    } else {
        format!("{prefix}/{file}")
    }
}

/// Publishes the four mappings of `run` under `prefix` in `bucket`.
#[tracing::instrument(skip(client, run))]
pub async fn publish_run(
    client: &aws_sdk_s3::Client,
    bucket: &str,
    prefix: &str,
    run: &PipelineRun,
) -> anyhow::Result<()> {
    write_json_to_s3(client, bucket, &object_key(prefix, RANKING_FILE), &run.ranking).await?;
    write_json_to_s3(client, bucket, &object_key(prefix, TIME_FILE), &run.time).await?;
    write_json_to_s3(client, bucket, &object_key(prefix, GRADE_FILE), &run.grade).await?;
    write_json_to_s3(client, bucket, &object_key(prefix, CATALOG_FILE), &run.catalog).await?;

    info!(bucket, prefix, "Published mappings to S3");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_object_key_joins_prefix() {
        assert_eq!(object_key("", "time.json"), "time.json");
        assert_eq!(object_key("cape/", "time.json"), "cape/time.json");
        assert_eq!(object_key("/cape/2017", "time.json"), "cape/2017/time.json");
    }
}
