//! Integration tests for command execution
//!
//! Tests the full flow: command line -> operation -> config resolution -> admin API

use async_trait::async_trait;
use cephmgr::admin::{AdminApi, AdminError, BucketInfo, UserCap, UserRecord};
use cephmgr::commands::{self, Cli, ExitCode, Operation};
use cephmgr::config::{ConfigResolver, ConfigValues, StreamPrompter};
use cephmgr::{CapabilitySet, CephmgrError, ConfigError, ConnectionConfig, UserIdentity};
use clap::Parser;
use parking_lot::Mutex;
use std::io::Cursor;
use std::path::Path;
use std::sync::Arc;
use tempfile::tempdir;

/// In-memory admin API that records every call
#[derive(Default)]
struct MockAdmin {
    calls: Mutex<Vec<String>>,
    failure: Option<(u16, &'static str)>,
}

impl MockAdmin {
    fn failing(status: u16, code: &'static str) -> Self {
        Self {
            failure: Some((status, code)),
            ..Default::default()
        }
    }

    fn record(&self, call: String) -> Result<(), AdminError> {
        self.calls.lock().push(call);
        match self.failure {
            Some((status, code)) => Err(AdminError::Api {
                status,
                code: code.to_string(),
            }),
            None => Ok(()),
        }
    }

    fn calls(&self) -> Vec<String> {
        self.calls.lock().clone()
    }
}

fn caps_of(caps: &CapabilitySet) -> Vec<UserCap> {
    caps.iter()
        .map(|grant| UserCap {
            cap_type: grant.resource.to_string(),
            perm: grant.permission.to_string(),
        })
        .collect()
}

#[async_trait]
impl AdminApi for MockAdmin {
    async fn create_user(
        &self,
        user: &UserIdentity,
        caps: Option<&CapabilitySet>,
    ) -> Result<UserRecord, AdminError> {
        self.record(format!("create_user {}", user.id))?;
        Ok(UserRecord {
            id: user.id.clone(),
            display_name: user.display_name.clone(),
            caps: caps.map(caps_of).unwrap_or_default(),
            ..Default::default()
        })
    }

    async fn get_user(&self, uid: &str) -> Result<UserRecord, AdminError> {
        self.record(format!("get_user {}", uid))?;
        Ok(UserRecord {
            id: uid.to_string(),
            ..Default::default()
        })
    }

    async fn list_users(&self) -> Result<Vec<String>, AdminError> {
        self.record("list_users".to_string())?;
        Ok(vec!["admin".to_string(), "jdoe".to_string()])
    }

    async fn delete_user(&self, uid: &str) -> Result<(), AdminError> {
        self.record(format!("delete_user {}", uid))
    }

    async fn add_user_caps(
        &self,
        uid: &str,
        caps: &CapabilitySet,
    ) -> Result<Vec<UserCap>, AdminError> {
        self.record(format!("add_user_caps {} {}", uid, caps))?;
        Ok(caps_of(caps))
    }

    async fn remove_user_caps(
        &self,
        uid: &str,
        caps: &CapabilitySet,
    ) -> Result<Vec<UserCap>, AdminError> {
        self.record(format!("remove_user_caps {} {}", uid, caps))?;
        Ok(Vec::new())
    }

    async fn list_buckets(&self) -> Result<Vec<String>, AdminError> {
        self.record("list_buckets".to_string())?;
        Ok(vec!["photos".to_string()])
    }

    async fn get_bucket_info(&self, bucket: &str) -> Result<BucketInfo, AdminError> {
        self.record(format!("get_bucket_info {}", bucket))?;
        Ok(BucketInfo {
            bucket: bucket.to_string(),
            id: "default.1234.1".to_string(),
            owner: "jdoe".to_string(),
            ..Default::default()
        })
    }
}

fn operation(args: &[&str]) -> Result<Operation, CephmgrError> {
    let argv = std::iter::once("cephmgr").chain(args.iter().copied());
    let cli = Cli::try_parse_from(argv).unwrap();
    Operation::from_command(cli.command)
}

fn no_input() -> StreamPrompter<Cursor<&'static str>, Vec<u8>> {
    StreamPrompter::new(Cursor::new(""), Vec::new())
}

fn write_config(path: &Path, hostname: &str) {
    std::fs::write(
        path,
        format!(
            "hostname: {}\naccessKey: file-key\naccessSecret: file-secret\n",
            hostname
        ),
    )
    .unwrap();
}

/// Run `args` against `mock`, returning the config handed to the client
async fn run_with(
    args: &[&str],
    resolver: ConfigResolver<StreamPrompter<Cursor<&'static str>, Vec<u8>>>,
    mock: &Arc<MockAdmin>,
) -> (Result<(), CephmgrError>, Option<ConnectionConfig>, String) {
    let mut seen = None;
    let mut out = Vec::new();

    let result = commands::run(
        operation(args).unwrap(),
        resolver,
        |config: &ConnectionConfig| {
            seen = Some(config.clone());
            Ok(mock.clone() as Arc<dyn AdminApi>)
        },
        &mut out,
    )
    .await;

    (result, seen, String::from_utf8(out).unwrap())
}

/// Test flag > environment > file precedence for the hostname
#[tokio::test]
async fn test_hostname_precedence() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("cephmgr.yaml");
    write_config(&path, "http://a");
    let mock = Arc::new(MockAdmin::default());

    let env = || ConfigValues::from_env(vec![("CEPH_HOSTNAME", "http://b")]);
    let flags = || ConfigValues::new(Some("http://c".to_string()), None, None);

    // Flag wins
    let resolver = ConfigResolver::new(&path, flags(), env(), no_input());
    let (result, seen, _) = run_with(&["user", "list"], resolver, &mock).await;
    result.unwrap();
    let seen = seen.unwrap();
    assert_eq!(seen.hostname, "http://c");
    assert_eq!(seen.access_key, "file-key");

    // Without the flag the environment wins
    let resolver = ConfigResolver::new(&path, ConfigValues::default(), env(), no_input());
    let (result, seen, _) = run_with(&["user", "list"], resolver, &mock).await;
    result.unwrap();
    assert_eq!(seen.unwrap().hostname, "http://b");

    // Without both the file value is used
    let resolver = ConfigResolver::new(
        &path,
        ConfigValues::default(),
        ConfigValues::default(),
        no_input(),
    );
    let (result, seen, out) = run_with(&["user", "list"], resolver, &mock).await;
    result.unwrap();
    assert_eq!(seen.unwrap().hostname, "http://a");
    assert_eq!(out, "admin\njdoe\n");

    assert_eq!(mock.calls().len(), 3);
}

/// Test that the first run prompts once, persists the values and uses them
#[tokio::test]
async fn test_first_run_prompts_once() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("cephmgr.yaml");
    let mock = Arc::new(MockAdmin::default());

    let prompter = StreamPrompter::new(
        Cursor::new("http://typed\ntyped-key\ntyped-secret\n"),
        Vec::new(),
    );
    let resolver = ConfigResolver::new(
        &path,
        ConfigValues::default(),
        ConfigValues::default(),
        prompter,
    );
    let (result, seen, _) = run_with(&["bucket", "list"], resolver, &mock).await;
    result.unwrap();

    let seen = seen.unwrap();
    assert_eq!(seen.hostname, "http://typed");
    assert_eq!(seen.access_secret.expose(), "typed-secret");

    let saved = std::fs::read_to_string(&path).unwrap();
    assert!(saved.contains("hostname: http://typed"));
    assert!(saved.contains("accessKey: typed-key"));
    assert!(saved.contains("accessSecret: typed-secret"));

    // The second run reads the file and does not prompt
    let resolver = ConfigResolver::new(
        &path,
        ConfigValues::default(),
        ConfigValues::default(),
        no_input(),
    );
    let (result, seen, _) = run_with(&["bucket", "list"], resolver, &mock).await;
    result.unwrap();
    assert_eq!(seen.unwrap().access_key, "typed-key");

    assert_eq!(mock.calls(), vec!["list_buckets", "list_buckets"]);
}

/// Test that a missing --user is a usage error before any call
#[test]
fn test_caps_add_without_user() {
    let err = operation(&["user", "caps", "add", "--caps", "users=read"]).unwrap_err();

    let code = ExitCode::from_error(&err);
    assert_eq!(code, ExitCode::UsageError);
    assert_eq!(code.as_i32(), 1);
    assert!(code.shows_help());
    assert_eq!(err.to_string(), "required argument --user not set");

    let help = commands::render_help(&["user", "caps", "add"]);
    assert!(help.contains("--user"));

    let mut err_out = Vec::new();
    assert_eq!(
        commands::report(&err, &["user", "caps", "add"], &mut err_out),
        ExitCode::UsageError
    );
    let text = String::from_utf8(err_out).unwrap();
    assert!(text.starts_with("Error: required argument --user not set\n\n"));
    assert!(text.ends_with(&help));
}

/// Test that missing --caps on remove is a usage error
#[test]
fn test_caps_remove_without_caps() {
    let err = operation(&["user", "caps", "remove", "-u", "jdoe"]).unwrap_err();
    assert!(matches!(
        err,
        CephmgrError::MissingArgument {
            argument: "--caps",
            ..
        }
    ));
    assert_eq!(ExitCode::from_error(&err).as_i32(), 1);
}

/// Test that a remote error exits 1 without help text
#[tokio::test]
async fn test_remote_error_exit_code() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("cephmgr.yaml");
    write_config(&path, "http://rgw");
    let mock = Arc::new(MockAdmin::failing(404, "NoSuchUser"));

    let resolver = ConfigResolver::new(
        &path,
        ConfigValues::default(),
        ConfigValues::default(),
        no_input(),
    );
    let (result, _, out) = run_with(
        &["user", "caps", "add", "--user", "ghost", "--caps", "users=read"],
        resolver,
        &mock,
    )
    .await;

    let err = result.unwrap_err();
    assert_eq!(err.to_string(), "RGW admin API returned 404: NoSuchUser");
    let code = ExitCode::from_error(&err);
    assert_eq!(code, ExitCode::RemoteError);
    assert_eq!(code.as_i32(), 1);
    assert!(!code.shows_help());
    assert!(out.is_empty());

    // Exactly one attempt
    assert_eq!(mock.calls(), vec!["add_user_caps ghost users=read"]);

    // No help after a remote error
    let mut err_out = Vec::new();
    commands::report(&err, &["user", "caps", "add"], &mut err_out);
    assert_eq!(
        String::from_utf8(err_out).unwrap(),
        "Error: RGW admin API returned 404: NoSuchUser\n"
    );
}

/// Test that an incomplete config fails before the client is built
#[tokio::test]
async fn test_incomplete_config_never_connects() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("cephmgr.yaml");
    std::fs::write(&path, "hostname: http://rgw\n").unwrap();
    let mock = Arc::new(MockAdmin::default());

    let resolver = ConfigResolver::new(
        &path,
        ConfigValues::default(),
        ConfigValues::default(),
        no_input(),
    );
    let (result, seen, _) = run_with(&["user", "get", "-u", "jdoe"], resolver, &mock).await;

    match result {
        Err(CephmgrError::Config(ConfigError::Incomplete(missing))) => {
            assert_eq!(missing, vec!["accessKey", "accessSecret"]);
        }
        other => panic!("expected Incomplete, got {:?}", other),
    }
    assert!(seen.is_none());
    assert!(mock.calls().is_empty());
}

/// Test that help and version never touch the config file
#[tokio::test]
async fn test_local_operations_skip_config() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("cephmgr.yaml");
    let mock = Arc::new(MockAdmin::default());

    for args in [&["user"][..], &["user", "caps"][..], &["version"][..]] {
        let resolver = ConfigResolver::new(
            &path,
            ConfigValues::default(),
            ConfigValues::default(),
            no_input(),
        );
        let (result, seen, out) = run_with(args, resolver, &mock).await;
        result.unwrap();
        assert!(seen.is_none());
        assert!(!out.is_empty());
    }

    assert!(!path.exists());
    assert!(mock.calls().is_empty());
}

/// Test the create flow with initial capabilities
#[tokio::test]
async fn test_create_user_with_caps() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("cephmgr.yaml");
    write_config(&path, "http://rgw");
    let mock = Arc::new(MockAdmin::default());

    let resolver = ConfigResolver::new(
        &path,
        ConfigValues::default(),
        ConfigValues::default(),
        no_input(),
    );
    let (result, _, out) = run_with(
        &[
            "user",
            "create",
            "--user",
            "jdoe",
            "--fullname",
            "J. Doe",
            "--caps",
            "buckets=*,users=read,write",
        ],
        resolver,
        &mock,
    )
    .await;
    result.unwrap();

    assert!(out.starts_with("Created user for J. Doe"));
    assert_eq!(mock.calls(), vec!["create_user jdoe"]);
}

/// Test bucket info rendering
#[tokio::test]
async fn test_bucket_info() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("cephmgr.yaml");
    let mock = Arc::new(MockAdmin::default());
    let env = ConfigValues::from_env(vec![
        ("CEPH_HOSTNAME", "http://rgw"),
        ("CEPH_ACCESSKEY", "env-key"),
        ("CEPH_ACCESSSECRET", "env-secret"),
    ]);

    let resolver = ConfigResolver::new(&path, ConfigValues::default(), env, no_input());
    let (result, _, out) = run_with(&["bucket", "info", "photos"], resolver, &mock).await;
    result.unwrap();

    let lines: Vec<&str> = out.lines().collect();
    assert!(lines[0].starts_with("ID"));
    assert!(lines[2].starts_with("default.1234.1"));
    assert!(lines[2].ends_with("jdoe"));
    // Complete environment skips the first-run setup
    assert!(!path.exists());
}
