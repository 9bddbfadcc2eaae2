// UI layer: the interactive wizard, built on `dialoguer` prompts.
// Steps run in order: API key, devices, push type, fields, send.

use crate::api::{ApiClient, Device};
use crate::config::{validate_api_key, Config, API_KEY_LEN};
use crate::dispatch::{dispatch, SendOutcome, Target};
use crate::push::{resolve_file, validate_url, Field, PushFields, PushRequest, PushType};
use anyhow::{bail, Result};
use dialoguer::{Input, MultiSelect, Select};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::Path;
use std::time::Duration;
use tracing::{debug, warn};

/// Run the whole wizard and return one outcome per selected device.
///
/// `config` is only written when no key was stored yet; the new key is
/// saved to `config_path`, and a failed save does not stop the run.
pub fn run_interactive(
    api: &ApiClient,
    config: &mut Config,
    config_path: &Path,
) -> Result<Vec<SendOutcome>> {
    let api_key = obtain_key(config, config_path)?;

    let devices = with_spinner("Fetching devices...", || api.list_devices(&api_key))?;
    if devices.is_empty() {
        bail!("No devices found; check your API key or register a device with Pushbullet first");
    }

    let targets: Vec<Target> = select_devices(&devices)?
        .into_iter()
        .map(Target::Device)
        .collect();
    let kind = select_type()?;
    let request = collect_request(kind)?;

    debug!(kind = kind.as_str(), devices = targets.len(), "dispatching push");
    with_spinner("Sending...", || dispatch(api, &api_key, &targets, &request))
}

/// Return the stored key, or prompt for one and persist it.
fn obtain_key(config: &mut Config, config_path: &Path) -> Result<String> {
    if let Some(key) = config.api_key() {
        return Ok(key.to_string());
    }

    let key: String = Input::new()
        .with_prompt("What's your Pushbullet API Key?")
        .validate_with(|input: &String| check_api_key(input))
        .interact_text()?;

    store_key(config, config_path, &key);
    Ok(key)
}

/// Keep `key` in memory and try to persist it. A failed write is logged
/// and the run carries on with the in-memory config.
fn store_key(config: &mut Config, config_path: &Path, key: &str) {
    config.api_key = Some(key.to_string());
    if let Err(e) = config.save(config_path) {
        warn!(path = %config_path.display(), error = %e, "failed to save config");
        eprintln!("Error writing config file: {e}");
    }
}

fn check_api_key(input: &str) -> Result<(), String> {
    if validate_api_key(input) {
        Ok(())
    } else {
        Err(format!("An API key is {API_KEY_LEN} characters long"))
    }
}

/// Multi-select over the device list; asks again until something is picked.
fn select_devices(devices: &[Device]) -> Result<Vec<Device>> {
    let names = device_labels(devices);
    loop {
        let picked = MultiSelect::new()
            .with_prompt("What devices do you want to push to? (space to select, enter to confirm)")
            .items(&names)
            .interact()?;
        if !picked.is_empty() {
            return Ok(picked.into_iter().map(|i| devices[i].clone()).collect());
        }
        println!("Select at least one device.");
    }
}

fn device_labels(devices: &[Device]) -> Vec<&str> {
    devices.iter().map(|d| d.display_name.as_str()).collect()
}

/// Index into `PushType::ALL` preselected in the type menu.
const DEFAULT_TYPE_INDEX: usize = 0;

fn select_type() -> Result<PushType> {
    let labels: Vec<&str> = PushType::ALL.iter().map(|kind| kind.label()).collect();
    let choice = Select::new()
        .with_prompt("What type of push?")
        .items(&labels)
        .default(DEFAULT_TYPE_INDEX)
        .interact()?;
    Ok(PushType::ALL[choice])
}

/// Prompt for the fields `kind` needs, then build the request. URL and
/// filename are checked as they are typed.
fn collect_request(kind: PushType) -> Result<PushRequest> {
    loop {
        let mut fields = PushFields::default();
        for &field in kind.fields() {
            fields.set(field, prompt_field(field)?);
        }
        match kind.build(&fields) {
            Ok(request) => return Ok(request),
            Err(e) if e.is_invalid_input() => println!("{e}"),
            Err(e) => return Err(e.into()),
        }
    }
}

fn prompt_field(field: Field) -> Result<String> {
    let mut input = Input::<String>::new();
    input.with_prompt(field.prompt());
    match field {
        Field::Url => {
            input.validate_with(|url: &String| validate_url(url).map_err(|e| e.to_string()));
        }
        Field::Filename => {
            input.validate_with(|name: &String| {
                resolve_file(name).map(|_| ()).map_err(|e| e.to_string())
            });
        }
        _ => {
            input.allow_empty(true);
        }
    }
    Ok(input.interact_text()?)
}

fn with_spinner<T>(message: &'static str, work: impl FnOnce() -> T) -> Result<T> {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(ProgressStyle::with_template("{spinner} {msg}")?);
    spinner.set_message(message);
    spinner.enable_steady_tick(Duration::from_millis(100));
    let out = work();
    spinner.finish_and_clear();
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_key_check_reports_length() {
        assert!(check_api_key(&"x".repeat(API_KEY_LEN)).is_ok());
        let err = check_api_key("short").unwrap_err();
        assert!(err.contains("45"));
    }

    #[test]
    fn stored_key_skips_prompt_and_leaves_file_alone() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        let mut config = Config {
            api_key: Some("a".repeat(API_KEY_LEN)),
        };
        let key = obtain_key(&mut config, &path).unwrap();
        assert_eq!(key, "a".repeat(API_KEY_LEN));
        assert!(!path.exists());
    }

    #[test]
    fn device_labels_keep_server_order() {
        let devices = vec![
            Device {
                id: "2".into(),
                display_name: "Phone".into(),
            },
            Device {
                id: "1".into(),
                display_name: "Chrome".into(),
            },
        ];
        assert_eq!(device_labels(&devices), vec!["Phone", "Chrome"]);
    }

    #[test]
    fn type_menu_defaults_to_note() {
        assert_eq!(PushType::ALL[DEFAULT_TYPE_INDEX], PushType::Note);
    }

    #[test]
    fn store_key_persists_new_key() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".pushbullet").join("config.json");
        let key = "b".repeat(API_KEY_LEN);
        let mut config = Config::default();

        store_key(&mut config, &path, &key);

        assert_eq!(config.api_key(), Some(key.as_str()));
        assert_eq!(Config::load(&path), config);
    }

    #[test]
    fn store_key_keeps_going_when_write_fails() {
        let dir = tempfile::tempdir().unwrap();
        // The parent of the config path is a regular file, so the save fails.
        let blocker = dir.path().join("not-a-dir");
        std::fs::write(&blocker, "x").unwrap();
        let path = blocker.join("config.json");
        let key = "c".repeat(API_KEY_LEN);
        let mut config = Config::default();

        store_key(&mut config, &path, &key);

        assert_eq!(config.api_key.as_deref(), Some(key.as_str()));
        assert!(!path.exists());
    }

    #[test]
    fn spinner_returns_work_result() {
        assert_eq!(with_spinner("working", || 41 + 1).unwrap(), 42);
    }
}
