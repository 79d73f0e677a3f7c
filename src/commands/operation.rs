//! Validated commands

use super::output;
use super::{BucketCommands, CapsCommands, Commands, UserCommands};
use crate::admin::AdminApi;
use crate::caps::{CapabilitySet, CapsChange, CapsVerb};
use crate::{CephmgrError, UserIdentity};
use std::io::Write;
use tracing::info;

const ROOT: &[&str] = &[];
const USER: &[&str] = &["user"];
const USER_CREATE: &[&str] = &["user", "create"];
const USER_GET: &[&str] = &["user", "get"];
const USER_LIST: &[&str] = &["user", "list"];
const USER_DELETE: &[&str] = &["user", "delete"];
const USER_CAPS: &[&str] = &["user", "caps"];
const USER_CAPS_ADD: &[&str] = &["user", "caps", "add"];
const USER_CAPS_REMOVE: &[&str] = &["user", "caps", "remove"];
const BUCKET: &[&str] = &["bucket"];
const BUCKET_LIST: &[&str] = &["bucket", "list"];
const BUCKET_INFO: &[&str] = &["bucket", "info"];
const VERSION: &[&str] = &["version"];

/// A command whose arguments have been checked
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    /// Print the help of a parent command
    Help(&'static [&'static str]),
    Version,
    /// One admin API call
    Admin(AdminOperation),
}

/// Operations that need a connection to RGW
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdminOperation {
    CreateUser {
        user: UserIdentity,
        caps: Option<CapabilitySet>,
    },
    GetUser {
        uid: String,
    },
    ListUsers,
    DeleteUser {
        uid: String,
    },
    ChangeCaps {
        uid: String,
        change: CapsChange,
    },
    ListBuckets,
    BucketInfo {
        bucket: String,
    },
}

fn required(
    value: Option<String>,
    command: &'static [&'static str],
    argument: &'static str,
) -> Result<String, CephmgrError> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or(CephmgrError::MissingArgument { command, argument })
}

fn optional(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

fn caps_change(
    verb: CapsVerb,
    user: Option<String>,
    caps: Option<String>,
    command: &'static [&'static str],
) -> Result<Operation, CephmgrError> {
    let uid = required(user, command, "--user")?;
    let spec = required(caps, command, "--caps")?;
    let change = CapsChange::parse(verb, &spec)
        .map_err(|source| CephmgrError::InvalidCaps { command, source })?;

    Ok(Operation::Admin(AdminOperation::ChangeCaps { uid, change }))
}

impl Operation {
    /// Check the arguments of a parsed command.
    ///
    /// Nothing here touches the network or the config file.
    pub fn from_command(command: Option<Commands>) -> Result<Self, CephmgrError> {
        let operation = match command {
            None => Operation::Help(ROOT),
            Some(Commands::Version) => Operation::Version,

            Some(Commands::User { command: None }) => Operation::Help(USER),
            Some(Commands::User {
                command: Some(command),
            }) => match command {
                UserCommands::Create {
                    user,
                    fullname,
                    email,
                    caps,
                } => {
                    let uid = required(user, USER_CREATE, "--user")?;
                    let display_name = optional(fullname).unwrap_or_else(|| uid.clone());
                    let caps = optional(caps)
                        .map(|spec| CapabilitySet::parse(&spec))
                        .transpose()
                        .map_err(|source| CephmgrError::InvalidCaps {
                            command: USER_CREATE,
                            source,
                        })?;

                    let mut user = UserIdentity::new(uid).with_display_name(display_name);
                    if let Some(email) = optional(email) {
                        user = user.with_email(email);
                    }
                    Operation::Admin(AdminOperation::CreateUser { user, caps })
                }
                UserCommands::Get { user } => Operation::Admin(AdminOperation::GetUser {
                    uid: required(user, USER_GET, "--user")?,
                }),
                UserCommands::List => Operation::Admin(AdminOperation::ListUsers),
                UserCommands::Delete { user } => Operation::Admin(AdminOperation::DeleteUser {
                    uid: required(user, USER_DELETE, "--user")?,
                }),
                UserCommands::Caps { command: None } => Operation::Help(USER_CAPS),
                UserCommands::Caps {
                    command: Some(CapsCommands::Add { user, caps }),
                } => caps_change(CapsVerb::Add, user, caps, USER_CAPS_ADD)?,
                UserCommands::Caps {
                    command: Some(CapsCommands::Remove { user, caps }),
                } => caps_change(CapsVerb::Remove, user, caps, USER_CAPS_REMOVE)?,
            },

            Some(Commands::Bucket { command: None }) => Operation::Help(BUCKET),
            Some(Commands::Bucket {
                command: Some(BucketCommands::List),
            }) => Operation::Admin(AdminOperation::ListBuckets),
            Some(Commands::Bucket {
                command: Some(BucketCommands::Info { bucket }),
            }) => Operation::Admin(AdminOperation::BucketInfo {
                bucket: required(bucket, BUCKET_INFO, "<BUCKET>")?,
            }),
        };

        Ok(operation)
    }

    /// Subcommand path, used to select the help text
    pub fn command_path(&self) -> &'static [&'static str] {
        match self {
            Operation::Help(path) => *path,
            Operation::Version => VERSION,
            Operation::Admin(op) => op.command_path(),
        }
    }
}

impl AdminOperation {
    pub fn command_path(&self) -> &'static [&'static str] {
        match self {
            AdminOperation::CreateUser { .. } => USER_CREATE,
            AdminOperation::GetUser { .. } => USER_GET,
            AdminOperation::ListUsers => USER_LIST,
            AdminOperation::DeleteUser { .. } => USER_DELETE,
            AdminOperation::ChangeCaps { change, .. } => match change.verb {
                CapsVerb::Add => USER_CAPS_ADD,
                CapsVerb::Remove => USER_CAPS_REMOVE,
            },
            AdminOperation::ListBuckets => BUCKET_LIST,
            AdminOperation::BucketInfo { .. } => BUCKET_INFO,
        }
    }

    /// Make exactly one admin API call and render its result
    pub async fn run<W: Write>(&self, api: &dyn AdminApi, out: &mut W) -> Result<(), CephmgrError> {
        match self {
            AdminOperation::CreateUser { user, caps } => {
                let record = api.create_user(user, caps.as_ref()).await?;
                info!(uid = %record.id, "Created user");
                output::created_user(out, &record)?;
            }
            AdminOperation::GetUser { uid } => {
                let record = api.get_user(uid).await?;
                output::user(out, &record)?;
            }
            AdminOperation::ListUsers => {
                let users = api.list_users().await?;
                output::names(out, &users)?;
            }
            AdminOperation::DeleteUser { uid } => {
                api.delete_user(uid).await?;
                info!(uid = %uid, "Deleted user");
                writeln!(out, "User '{}' deleted", uid)?;
            }
            AdminOperation::ChangeCaps { uid, change } => {
                let caps = match change.verb {
                    CapsVerb::Add => api.add_user_caps(uid, &change.requested).await?,
                    CapsVerb::Remove => api.remove_user_caps(uid, &change.requested).await?,
                };
                info!(uid = %uid, verb = %change.verb, caps = %change.requested, "Changed capabilities");
                output::user_caps(out, uid, &caps)?;
            }
            AdminOperation::ListBuckets => {
                let buckets = api.list_buckets().await?;
                output::names(out, &buckets)?;
            }
            AdminOperation::BucketInfo { bucket } => {
                let info = api.get_bucket_info(bucket).await?;
                output::bucket(out, &info)?;
            }
        }

        Ok(())
    }
}
