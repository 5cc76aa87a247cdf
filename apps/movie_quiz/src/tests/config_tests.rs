use std::{
    env,
    time::{SystemTime, UNIX_EPOCH},
};

use super::*;

fn temp_root() -> PathBuf {
    let suffix = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock")
        .as_nanos();
    let root = env::temp_dir().join(format!("movie_quiz_config_test_{suffix}"));
    fs::create_dir_all(&root).expect("temp root");
    root
}

#[test]
fn defaults_match_upstream_service() {
    let settings = Settings::default();
    assert_eq!(settings.movies_url, "https://tv-api.com/en/API/Top250Movies");
    assert_eq!(settings.api_key, None);
    assert_eq!(settings.request_timeout_secs, 10);
    assert_eq!(settings.answer_delay_ms, 1000);
    assert_eq!(settings.min_movies, 10);
    assert!(settings.stats_path.ends_with("statistics.json"));
}

#[test]
fn file_values_override_defaults() {
    let mut settings = Settings::default();
    settings
        .apply_file(
            r#"
            movies_url = "http://127.0.0.1:9000/movies"
            api_key = "k_123"
            request_timeout_secs = 3
            answer_delay_ms = "250"
            "#,
        )
        .expect("apply file");

    assert_eq!(settings.movies_url, "http://127.0.0.1:9000/movies");
    assert_eq!(settings.api_key.as_deref(), Some("k_123"));
    assert_eq!(settings.request_timeout_secs, 3);
    assert_eq!(settings.answer_delay_ms, 250);
    assert_eq!(settings.min_movies, 10);
}

#[test]
fn unknown_file_keys_are_ignored() {
    let mut settings = Settings::default();
    settings
        .apply_file("theme = \"dark\"\nmin_movies = 12\n")
        .expect("apply file");
    assert_eq!(settings.min_movies, 12);
}

#[test]
fn nested_tables_are_rejected() {
    let mut settings = Settings::default();
    let err = settings
        .apply_file("[server]\nmovies_url = \"http://x\"\n")
        .expect_err("nested table");
    assert!(err.to_string().contains("plain value"));
}

#[test]
fn environment_overrides_file() {
    let mut settings = Settings::default();
    settings.apply_file("answer_delay_ms = 500\n").expect("apply file");
    settings
        .apply_env(|name| match name {
            "MOVIE_QUIZ__ANSWER_DELAY_MS" => Some("20".into()),
            "MOVIE_QUIZ__STATS_PATH" => Some("/tmp/quiz/stats.json".into()),
            _ => None,
        })
        .expect("apply env");

    assert_eq!(settings.answer_delay_ms, 20);
    assert_eq!(settings.stats_path, PathBuf::from("/tmp/quiz/stats.json"));
}

#[test]
fn malformed_number_names_the_variable() {
    let mut settings = Settings::default();
    let err = settings
        .apply_env(|name| (name == "MOVIE_QUIZ__MIN_MOVIES").then(|| "many".to_string()))
        .expect_err("bad number");
    assert!(format!("{err:#}").contains("MOVIE_QUIZ__MIN_MOVIES"));
}

#[test]
fn empty_api_key_means_none() {
    let mut settings = Settings::default();
    settings.set("api_key", "k_1").expect("set");
    settings.set("api_key", "  ").expect("set");
    assert_eq!(settings.api_key, None);
}

#[test]
fn quiz_options_append_api_key_segment() {
    let mut settings = Settings::default();
    settings.set("api_key", "k_abc").expect("set");
    settings.set("answer_delay_ms", "40").expect("set");

    let options = settings.quiz_options().expect("valid settings");
    assert_eq!(
        options.movies_endpoint.as_str(),
        "https://tv-api.com/en/API/Top250Movies/k_abc"
    );
    assert_eq!(options.request_timeout, Duration::from_secs(10));
    assert_eq!(options.answer_delay, Duration::from_millis(40));
    assert_eq!(options.min_movies, 10);
}

#[test]
fn invalid_url_and_zero_timeout_fail_validation() {
    let mut settings = Settings::default();
    settings.set("movies_url", "not a url").expect("set");
    assert!(settings.quiz_options().is_err());

    let mut settings = Settings::default();
    settings.set("movies_url", "ftp://example.com/movies").expect("set");
    assert!(settings.quiz_options().is_err());

    let mut settings = Settings::default();
    settings.set("request_timeout_secs", "0").expect("set");
    let err = settings.quiz_options().expect_err("zero timeout");
    assert!(err.to_string().contains("request_timeout_secs"));
}

#[test]
fn explicit_config_path_is_loaded() {
    let root = temp_root();
    let path = root.join("custom.toml");
    fs::write(&path, "min_movies = 25\n").expect("write config");

    let settings = load_settings(Some(&path)).expect("load");
    assert_eq!(settings.min_movies, 25);

    fs::remove_dir_all(root).expect("cleanup");
}

#[test]
fn missing_explicit_config_is_an_error() {
    let root = temp_root();
    let err = load_settings(Some(&root.join("absent.toml"))).expect_err("missing file");
    assert!(err.to_string().contains("absent.toml"));
    fs::remove_dir_all(root).expect("cleanup");
}
