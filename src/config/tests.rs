use super::{apply_config, load_config_file, types::ConfigFile};
use clap::{CommandFactory, FromArgMatches};
use std::time::Duration;
use tempfile::tempdir;

use crate::args::{HttpMethod, TesterArgs};
use crate::engine::SuccessPolicy;
use crate::stats::LatencyScope;

fn args_with_config(cli: &[&str], config: &ConfigFile) -> Result<TesterArgs, String> {
    let matches = TesterArgs::command()
        .try_get_matches_from(cli)
        .map_err(|err| format!("parse failed: {}", err))?;
    let mut args =
        TesterArgs::from_arg_matches(&matches).map_err(|err| format!("from matches: {}", err))?;
    apply_config(&mut args, &matches, config).map_err(|err| format!("apply failed: {}", err))?;
    Ok(args)
}

#[test]
fn parse_toml_config_with_json_body() -> Result<(), String> {
    let dir = tempdir().map_err(|err| format!("tempdir failed: {}", err))?;
    let path = dir.path().join("stresslab.toml");
    let content = r#"
url = "https://api.restful-api.dev/objects"
method = "post"
requests_per_second = 2
num_times = 3
wait_time = 1
ttfb_only = true
headers = ["Content-Type: application/json"]

[json]
name = "Apple MacBook Pro 16"

[json.data]
year = 2019
price = 1849.99
"#;
    std::fs::write(&path, content).map_err(|err| format!("write failed: {}", err))?;

    let config = load_config_file(&path).map_err(|err| err.to_string())?;
    if config.url.as_deref() != Some("https://api.restful-api.dev/objects") {
        return Err("Unexpected url".to_owned());
    }
    if config.method != Some(HttpMethod::Post) {
        return Err("Unexpected method".to_owned());
    }
    if config.requests_per_second != Some(2) || config.num_times != Some(3) {
        return Err("Unexpected batch shape".to_owned());
    }
    let body = config.json.ok_or_else(|| "Expected json body".to_owned())?;
    if body["data"]["year"] != serde_json::json!(2019) {
        return Err(format!("Unexpected body: {}", body));
    }
    Ok(())
}

#[test]
fn parse_json_config() -> Result<(), String> {
    let dir = tempdir().map_err(|err| format!("tempdir failed: {}", err))?;
    let path = dir.path().join("stresslab.json");
    let content = r#"{
  "url": "http://localhost:3000",
  "rps": 50,
  "rounds": 4,
  "wait_time": "500ms",
  "success": "2xx",
  "latency_scope": "success"
}"#;
    std::fs::write(&path, content).map_err(|err| format!("write failed: {}", err))?;

    let config = load_config_file(&path).map_err(|err| err.to_string())?;
    if config.requests_per_second != Some(50) || config.num_times != Some(4) {
        return Err("Unexpected batch shape".to_owned());
    }
    if config.success != Some(SuccessPolicy::Status2xx) {
        return Err("Unexpected success policy".to_owned());
    }
    if config.latency_scope != Some(LatencyScope::Success) {
        return Err("Unexpected latency scope".to_owned());
    }
    let wait = config
        .wait_time
        .ok_or_else(|| "Expected wait_time".to_owned())?
        .to_duration(true)
        .map_err(|err| err.to_string())?;
    if wait != Duration::from_millis(500) {
        return Err(format!("Unexpected wait_time: {:?}", wait));
    }
    Ok(())
}

#[test]
fn unsupported_extension_is_rejected() -> Result<(), String> {
    let dir = tempdir().map_err(|err| format!("tempdir failed: {}", err))?;
    let path = dir.path().join("stresslab.yaml");
    std::fs::write(&path, "url: x").map_err(|err| format!("write failed: {}", err))?;
    if load_config_file(&path).is_ok() {
        return Err("Expected yaml config to be rejected".to_owned());
    }
    Ok(())
}

#[test]
fn config_fills_values_not_given_on_cli() -> Result<(), String> {
    let config = ConfigFile {
        url: Some("http://config-host".to_owned()),
        requests_per_second: Some(7),
        num_times: Some(2),
        wait_time: Some(super::types::DurationValue::Seconds(0.0)),
        ttfb_only: Some(false),
        json: Some(serde_json::json!({"k": "v"})),
        ..ConfigFile::default()
    };
    let args = args_with_config(&["stresslab", "-r", "3"], &config)?;

    if args.url.as_deref() != Some("http://config-host") {
        return Err("Expected url from config".to_owned());
    }
    if args.requests_per_second.get() != 3 {
        return Err("Expected CLI requests_per_second to win".to_owned());
    }
    if args.num_times.get() != 2 {
        return Err("Expected num_times from config".to_owned());
    }
    if !args.wait_time.is_zero() {
        return Err("Expected zero wait_time from config".to_owned());
    }
    if !args.full_response {
        return Err("Expected ttfb_only = false to enable full responses".to_owned());
    }
    if args.json.as_deref() != Some(r#"{"k":"v"}"#) {
        return Err(format!("Unexpected json: {:?}", args.json));
    }
    Ok(())
}

#[test]
fn config_rejects_zero_batch() -> Result<(), String> {
    let config = ConfigFile {
        requests_per_second: Some(0),
        ..ConfigFile::default()
    };
    if args_with_config(&["stresslab"], &config).is_ok() {
        return Err("Expected requests_per_second = 0 to be rejected".to_owned());
    }
    Ok(())
}

#[test]
fn config_rejects_zero_timeout() -> Result<(), String> {
    let config = ConfigFile {
        timeout: Some(super::types::DurationValue::Text("0s".to_owned())),
        ..ConfigFile::default()
    };
    if args_with_config(&["stresslab"], &config).is_ok() {
        return Err("Expected zero timeout to be rejected".to_owned());
    }
    Ok(())
}
