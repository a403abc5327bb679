// SeriesService tests: snapshot computation, error surfacing and caching

mod common;

use std::sync::Arc;

use mockito::Server;
use weather_series_service::pipeline::PipelineError;
use weather_series_service::services::ServiceError;

#[tokio::test]
async fn test_get_snapshot_computes_and_caches() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/export.csv")
        .with_status(200)
        .with_body(common::LEGACY_SAMPLE)
        .expect(1)
        .create_async()
        .await;

    let url = format!("{}/export.csv", server.url());
    let service = common::series_service(url.clone(), 1);

    let first = service.get_snapshot().await.unwrap();
    let second = service.get_snapshot().await.unwrap();

    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(first.source(), url);
    assert_eq!(first.table().len(), 4);
    mock.assert_async().await;
}

#[tokio::test]
async fn test_invalidate_forces_recompute() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/export.csv")
        .with_status(200)
        .with_body(common::CLEANED_SAMPLE)
        .expect(2)
        .create_async()
        .await;

    let service = common::series_service(format!("{}/export.csv", server.url()), 0);

    let first = service.get_snapshot().await.unwrap();
    service.invalidate();
    let second = service.get_snapshot().await.unwrap();

    assert!(!Arc::ptr_eq(&first, &second));
    assert_eq!(first.table(), second.table());
    mock.assert_async().await;
}

#[tokio::test]
async fn test_errors_are_not_cached() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/export.csv")
        .with_status(200)
        .with_body("Date,Temp\n13/04/23,14.1\n")
        .expect(2)
        .create_async()
        .await;

    let service = common::series_service(format!("{}/export.csv", server.url()), 0);

    for _ in 0..2 {
        let err = service.get_snapshot().await.unwrap_err();
        assert!(matches!(
            err,
            ServiceError::Pipeline(PipelineError::Schema { .. })
        ));
    }
    mock.assert_async().await;
}
