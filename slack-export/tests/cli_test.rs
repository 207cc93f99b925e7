use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use serde_json::json;

use slack_export::api::slack::decode_response;
use slack_export::cli::{Args, Command, LogLevel, parse_time_bound};
use slack_export::error::ExportError;
use slack_export::models::ChannelsPage;
use slack_export::settings::{Settings, load_settings_from, resolve};

fn parse(argv: &[&str]) -> Args {
    Args::try_parse_from(argv).unwrap()
}

#[test]
fn test_parse_time_bound_formats() {
    assert_eq!(
        parse_time_bound("1638883139.000600").unwrap(),
        "1638883139.000600"
    );
    assert_eq!(parse_time_bound("1638883139").unwrap(), "1638883139");
    assert_eq!(
        parse_time_bound("2021-12-07T13:18:59Z").unwrap(),
        "1638883139.000000"
    );
    assert_eq!(
        parse_time_bound("2021-12-07T22:18:59.000600+09:00").unwrap(),
        "1638883139.000600"
    );
    assert_eq!(parse_time_bound("2021-12-07").unwrap(), "1638835200.000000");
    assert!(parse_time_bound("yesterday").is_err());
    assert!(parse_time_bound("12.").is_err());
}

#[test]
fn test_default_command_is_export() {
    let args = parse(&["slack-export", "--token", "xoxb-test"]);

    assert!(args.command.is_none());
    assert_eq!(args.log_level, LogLevel::Info);
}

#[test]
fn test_export_window_and_post_args() {
    let args = parse(&[
        "slack-export",
        "export",
        "--oldest",
        "2021-12-07",
        "--no-progress",
    ]);
    match args.command {
        Some(Command::Export(export)) => {
            assert_eq!(export.oldest.as_deref(), Some("1638835200.000000"));
            assert_eq!(export.latest, None);
            assert!(export.no_progress);
        }
        other => panic!("unexpected command: {other:?}"),
    }

    let args = parse(&[
        "slack-export",
        "post",
        "C1",
        "hello",
        "--mention",
        "U1",
        "--mention",
        "U2",
        "--log-level",
        "debug",
    ]);
    match args.command {
        Some(Command::Post {
            channel_id,
            text,
            thread_ts,
            mentions,
        }) => {
            assert_eq!(channel_id, "C1");
            assert_eq!(text, "hello");
            assert_eq!(thread_ts, None);
            assert_eq!(mentions, vec!["U1", "U2"]);
        }
        other => panic!("unexpected command: {other:?}"),
    }
    assert!(args.log_level.is_verbose());
}

#[test]
fn test_resolve_prefers_cli_over_config_file() {
    let args = parse(&[
        "slack-export",
        "--token",
        "cli-token",
        "--delay-ms",
        "250",
    ]);
    let settings = Settings {
        slack_token: Some("file-token".to_string()),
        output_dir: Some(PathBuf::from("/tmp/exports")),
        rate_limit_delay_ms: Some(5000),
        ..Default::default()
    };

    let config = resolve(&args, settings).unwrap();

    assert_eq!(config.token, "cli-token");
    assert_eq!(config.delay, Duration::from_millis(250));
    assert_eq!(config.output_dir, PathBuf::from("/tmp/exports"));
    assert_eq!(config.api_url, "https://slack.com/api");
    assert_eq!(config.channel_types, "public_channel");
    assert!(!format!("{:?}", config).contains("cli-token"));
}

#[test]
fn test_resolve_defaults_and_missing_token() {
    let args = Args {
        command: None,
        token: None,
        api_url: None,
        output_dir: None,
        delay_ms: None,
        channel_types: None,
        log_level: LogLevel::Info,
    };

    let err = resolve(&args, Settings::default()).unwrap_err();
    assert!(err.to_string().contains("SLACK_TOKEN"));

    let settings = Settings {
        slack_token: Some("file-token".to_string()),
        ..Default::default()
    };
    let config = resolve(&args, settings).unwrap();
    assert_eq!(config.token, "file-token");
    assert_eq!(config.output_dir, PathBuf::from("./work"));
    assert_eq!(config.delay, Duration::from_secs(1));
}

#[test]
fn test_load_settings_from_toml() {
    let temp_dir = tempfile::tempdir().unwrap();
    let path = temp_dir.path().join("config.toml");
    fs::write(
        &path,
        r#"
slack_token = "xoxb-from-file"
output_dir = "exports"
rate_limit_delay_ms = 1500
channel_types = "public_channel,private_channel"
"#,
    )
    .unwrap();

    let settings = load_settings_from(&path).unwrap();

    assert_eq!(settings.slack_token.as_deref(), Some("xoxb-from-file"));
    assert_eq!(settings.output_dir, Some(PathBuf::from("exports")));
    assert_eq!(settings.rate_limit_delay_ms, Some(1500));
    assert_eq!(
        settings.channel_types.as_deref(),
        Some("public_channel,private_channel")
    );
    assert_eq!(settings.api_url, None);
}

#[test]
fn test_load_settings_missing_file_is_empty() {
    let temp_dir = tempfile::tempdir().unwrap();

    let settings = load_settings_from(&temp_dir.path().join("config.toml")).unwrap();

    assert!(settings.slack_token.is_none());
}

#[test]
fn test_decode_response_classification() {
    let page: ChannelsPage = decode_response(
        "conversations.list",
        json!({
            "ok": true,
            "channels": [{"id": "C1", "name": "general"}],
            "response_metadata": {"next_cursor": ""},
        }),
    )
    .unwrap();
    assert_eq!(page.channels[0].id(), "C1");

    let err = decode_response::<ChannelsPage>(
        "conversations.list",
        json!({"ok": false, "error": "invalid_auth"}),
    )
    .unwrap_err();
    assert!(err.is_api_failure());
    assert_eq!(err.to_string(), "conversations.list failed: invalid_auth");

    let err = decode_response::<ChannelsPage>("conversations.list", json!({"ok": true}))
        .unwrap_err();
    assert!(matches!(err, ExportError::MalformedResponse { .. }));
    assert!(!err.is_api_failure());

    let err = decode_response::<ChannelsPage>("conversations.list", json!({"channels": []}))
        .unwrap_err();
    assert!(matches!(err, ExportError::MalformedResponse { .. }));
}
