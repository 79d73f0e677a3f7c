//! Fixed-width output

use crate::admin::{BucketInfo, UserCap, UserRecord};
use std::io::{self, Write};

/// Print `cephmgr <version> <commit> (<build date>)`
pub fn version<W: Write>(out: &mut W) -> io::Result<()> {
    let commit = option_env!("CEPHMGR_COMMIT").unwrap_or("unknown");
    let date = option_env!("CEPHMGR_BUILD_DATE").unwrap_or("unknown");
    writeln!(
        out,
        "cephmgr {} {} ({})",
        env!("CARGO_PKG_VERSION"),
        commit.get(..7).unwrap_or(commit),
        date
    )
}

/// Print a freshly created user with its keys
pub fn created_user<W: Write>(out: &mut W, user: &UserRecord) -> io::Result<()> {
    writeln!(out, "Created user for {}", user.display_name)?;
    for key in &user.keys {
        writeln!(out)?;
        writeln!(out, "{:<11} {}", "ID:", key.user)?;
        writeln!(out, "{:<11} {}", "accesskey:", key.access_key)?;
        writeln!(out, "{:<11} {}", "secret:", key.secret_key.expose())?;
    }
    Ok(())
}

pub fn user<W: Write>(out: &mut W, user: &UserRecord) -> io::Result<()> {
    writeln!(out, "{:<20} {:<24} {:<28} {}", "UID", "FULL NAME", "EMAIL", "CAPS")?;
    writeln!(out, "{}", "-".repeat(90))?;
    writeln!(
        out,
        "{:<20} {:<24} {:<28} {}",
        user.id,
        user.display_name,
        if user.email.is_empty() { "-" } else { user.email.as_str() },
        user.caps_summary()
    )
}

/// One name per line
pub fn names<W: Write>(out: &mut W, names: &[String]) -> io::Result<()> {
    for name in names {
        writeln!(out, "{}", name)?;
    }
    Ok(())
}

/// Capabilities of a user after a change
pub fn user_caps<W: Write>(out: &mut W, uid: &str, caps: &[UserCap]) -> io::Result<()> {
    writeln!(out, "User ID: {}", uid)?;
    if caps.is_empty() {
        return writeln!(out, "  (no capabilities)");
    }
    for cap in caps {
        writeln!(out, "  {:<10} {}", cap.cap_type, cap.perm)?;
    }
    Ok(())
}

pub fn bucket<W: Write>(out: &mut W, info: &BucketInfo) -> io::Result<()> {
    writeln!(out, "{:<48} {:<24} {}", "ID", "BUCKET", "OWNER")?;
    writeln!(out, "{}", "-".repeat(90))?;
    writeln!(out, "{:<48} {:<24} {}", info.id, info.bucket, info.owner)
}
