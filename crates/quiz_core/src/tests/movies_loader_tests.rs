use super::*;
use axum::{http::StatusCode, routing::get, Router};
use tokio::net::TcpListener;

const CATALOG: &str = r#"{
    "errorMessage": "",
    "items": [
        {"id": "tt0111161", "rank": "1", "title": "The Shawshank Redemption", "imDbRating": "9.2", "image": "https://m.media-amazon.com/images/M/abc._V1_Ratio0.6716_AL_.jpg"},
        {"id": "tt0068646", "rank": "2", "title": "The Godfather", "imDbRating": "9.1", "image": "https://m.media-amazon.com/images/M/def._V1_Ratio0.6716_AL_.jpg"},
        {"id": "tt0000001", "rank": "3", "title": "Unrated", "imDbRating": "", "image": ""}
    ]
}"#;

async fn spawn_catalog_server(app: Router) -> String {
    std::env::set_var("NO_PROXY", "127.0.0.1,localhost");
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    format!("http://{addr}")
}

fn loader_for(url: &str) -> HttpMoviesLoader {
    HttpMoviesLoader::new(Url::parse(url).expect("url"), Duration::from_secs(5)).expect("loader")
}

#[test]
fn parses_catalog_items() {
    let movies = parse_catalog(CATALOG.as_bytes()).expect("catalog");
    assert_eq!(movies.len(), 3);
    assert_eq!(movies[0].title, "The Shawshank Redemption");
    assert!((movies[0].rating - 9.2).abs() < f32::EPSILON);
    assert_eq!(
        movies[1].image_url,
        "https://m.media-amazon.com/images/M/def._V0_UX600_.jpg"
    );
}

#[test]
fn unparsable_rating_becomes_zero() {
    let movies = parse_catalog(CATALOG.as_bytes()).expect("catalog");
    assert_eq!(movies[2].rating, 0.0);
    assert_eq!(movies[2].image_url, "");
}

#[test]
fn upstream_error_message_is_a_load_failure() {
    let body = br#"{"errorMessage": "Invalid API Key", "items": []}"#;
    let err = parse_catalog(body).expect_err("rejected");
    assert_eq!(err, QuizError::SourceRejected("Invalid API Key".into()));
    assert!(err.is_load_failure());
}

#[test]
fn garbage_body_is_malformed() {
    let err = parse_catalog(b"<html>busy</html>").expect_err("malformed");
    assert!(matches!(err, QuizError::MalformedResponse(_)));
}

#[test]
fn poster_url_without_variant_marker_is_kept() {
    assert_eq!(
        resized_poster_url("https://example.com/poster.jpg"),
        "https://example.com/poster.jpg"
    );
}

#[test]
fn api_key_is_appended_as_last_segment() {
    let base = Url::parse("https://tv-api.com/en/API/Top250Movies").expect("url");
    let endpoint = HttpMoviesLoader::endpoint_with_key(&base, Some("k_12345")).expect("endpoint");
    assert_eq!(
        endpoint.as_str(),
        "https://tv-api.com/en/API/Top250Movies/k_12345"
    );

    let trailing = Url::parse("https://tv-api.com/en/API/Top250Movies/").expect("url");
    let endpoint =
        HttpMoviesLoader::endpoint_with_key(&trailing, Some("k_12345")).expect("endpoint");
    assert_eq!(
        endpoint.as_str(),
        "https://tv-api.com/en/API/Top250Movies/k_12345"
    );

    let unchanged = HttpMoviesLoader::endpoint_with_key(&base, Some("  ")).expect("endpoint");
    assert_eq!(unchanged, base);
}

#[tokio::test]
async fn loads_catalog_over_http() {
    let app = Router::new().route("/API/Top250Movies/k_test", get(|| async { CATALOG }));
    let server_url = spawn_catalog_server(app).await;

    let loader = loader_for(&format!("{server_url}/API/Top250Movies/k_test"));
    let movies = loader.load_movies().await.expect("movies");
    assert_eq!(movies.len(), 3);
    assert_eq!(movies[1].title, "The Godfather");
}

#[tokio::test]
async fn server_error_status_is_transport_failure() {
    let app = Router::new().route(
        "/catalog",
        get(|| async { (StatusCode::SERVICE_UNAVAILABLE, "maintenance") }),
    );
    let server_url = spawn_catalog_server(app).await;

    let err = loader_for(&format!("{server_url}/catalog"))
        .load_movies()
        .await
        .expect_err("status error");
    assert!(matches!(err, QuizError::Transport(_)));
}

#[tokio::test]
async fn unreachable_server_is_transport_failure() {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    drop(listener);

    let err = loader_for(&format!("http://{addr}/catalog"))
        .load_movies()
        .await
        .expect_err("connection refused");
    assert!(matches!(err, QuizError::Transport(_)));
}

#[tokio::test]
async fn fetches_poster_bytes() {
    let app = Router::new().route("/poster.jpg", get(|| async { vec![1_u8, 2, 3, 4] }));
    let server_url = spawn_catalog_server(app).await;

    let loader = loader_for(&format!("{server_url}/catalog"));
    let bytes = loader
        .load_poster(&format!("{server_url}/poster.jpg"))
        .await
        .expect("poster");
    assert_eq!(bytes, vec![1, 2, 3, 4]);
}

#[tokio::test]
async fn empty_poster_url_is_rejected_without_request() {
    let loader = loader_for("http://127.0.0.1:9/catalog");
    let err = loader.load_poster("").await.expect_err("no url");
    assert!(matches!(err, QuizError::ImageDecode(_)));
}
