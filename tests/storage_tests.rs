use course_portal::{
    error::StorageError,
    models::BlobMetadata,
    storage::{MOCK_STORAGE_FAILURE, MockStorageService, S3StorageClient, StorageService},
};

#[cfg(test)]
mod mock_tests {
    use super::*;

    fn metadata(pathname: &str) -> BlobMetadata {
        BlobMetadata {
            url: format!("http://localhost:9000/course-assets/{}", pathname),
            pathname: pathname.to_string(),
            size: 42,
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_mock_empty_listing() {
        let mock = MockStorageService::new();
        let listing = mock.list_blobs(None, None, None).await.unwrap();

        assert!(listing.blobs.is_empty());
        assert!(!listing.has_more);
        assert!(listing.cursor.is_none());
    }

    #[tokio::test]
    async fn test_mock_prefix_filter() {
        let mock = MockStorageService::with_blobs(vec![
            metadata("thumbnails/b.png"),
            metadata("lessons/a.mp4"),
            metadata("thumbnails/a.png"),
        ]);

        let listing = mock
            .list_blobs(Some("thumbnails/"), None, None)
            .await
            .unwrap();

        let names: Vec<&str> = listing.blobs.iter().map(|b| b.pathname.as_str()).collect();
        assert_eq!(names, vec!["thumbnails/a.png", "thumbnails/b.png"]);
    }

    #[tokio::test]
    async fn test_mock_head_blob() {
        let blob = metadata("lessons/a.mp4");
        let mock = MockStorageService::with_blobs(vec![blob.clone()]);

        assert_eq!(mock.head_blob(&blob.url).await.unwrap(), blob);

        let missing = mock
            .head_blob("http://localhost:9000/course-assets/nope")
            .await
            .unwrap_err();
        assert!(matches!(missing, StorageError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_mock_failure() {
        let mock = MockStorageService::new_failing();

        let err = mock.list_blobs(None, None, None).await.unwrap_err();
        assert_eq!(err, StorageError::Unavailable(MOCK_STORAGE_FAILURE.to_string()));

        assert!(mock.head_blob("http://localhost/x").await.is_err());
    }
}

#[cfg(test)]
mod s3_tests {
    use super::*;

    #[tokio::test]
    async fn test_s3_client_creation() {
        // Construction performs no network I/O.
        let _client = S3StorageClient::new(
            "http://localhost:9000",
            "us-east-1",
            "testkey",
            "testsecret",
            "testbucket",
        )
        .await;
    }

    #[tokio::test]
    async fn test_s3_head_rejects_url_outside_bucket() {
        let client = S3StorageClient::new(
            "http://localhost:9000",
            "us-east-1",
            "testkey",
            "testsecret",
            "testbucket",
        )
        .await;

        // Resolved locally before any request is sent.
        let err = client
            .head_blob("http://localhost:9000/other-bucket/file.pdf")
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::NotFound(_)));

        let err = client.head_blob("::not a url::").await.unwrap_err();
        assert!(matches!(err, StorageError::InvalidUrl(_)));
    }
}
