use ssh_key::PublicKey;
use std::fs;
use std::path::Path;
use tracing::info;

use crate::errors::UtilError;

/// A parsed `authorized_keys` line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorizedKey {
    pub key_type: String,
    pub comment: Option<String>,
}

impl From<&PublicKey> for AuthorizedKey {
    fn from(key: &PublicKey) -> Self {
        let comment = key.comment().trim();
        Self {
            key_type: key.algorithm().as_str().to_string(),
            comment: (!comment.is_empty()).then(|| comment.to_string()),
        }
    }
}

/// Checks that `path` is an SSH public key we can hand to a pod VM:
/// it exists, its permissions are exactly 0600 and it holds a valid
/// OpenSSH public key line.
pub fn verify_ssh_key_file(path: &Path) -> Result<AuthorizedKey, UtilError> {
    let metadata = fs::metadata(path).map_err(|e| UtilError::io(path, e))?;
    check_permissions(path, &metadata)?;

    let content = fs::read_to_string(path).map_err(|e| UtilError::io(path, e))?;
    let key = parse_authorized_key(&content)?;

    info!(path = %path.display(), key_type = %key.key_type, "Verified SSH public key file");
    Ok(key)
}

#[cfg(unix)]
fn check_permissions(path: &Path, metadata: &fs::Metadata) -> Result<(), UtilError> {
    use std::os::unix::fs::PermissionsExt;

    let mode = metadata.permissions().mode() & 0o777;
    if mode != 0o600 {
        return Err(UtilError::KeyPermissions {
            path: path.to_path_buf(),
            mode,
        });
    }
    Ok(())
}

#[cfg(not(unix))]
fn check_permissions(_path: &Path, _metadata: &fs::Metadata) -> Result<(), UtilError> {
    Ok(())
}

/// Parses the first key line of `content`, skipping blanks and `#` comments.
///
/// The whole key blob is decoded, so truncated or padded key data is
/// rejected. Leading `authorized_keys` options are tolerated: parsing is
/// retried from each field until one decodes.
pub fn parse_authorized_key(content: &str) -> Result<AuthorizedKey, UtilError> {
    let line = content
        .lines()
        .map(str::trim)
        .find(|line| !line.is_empty() && !line.starts_with('#'))
        .ok_or_else(|| invalid("no key found"))?;

    let mut first_error = None;
    for start in field_starts(line) {
        match PublicKey::from_openssh(&line[start..]) {
            Ok(key) => return Ok(AuthorizedKey::from(&key)),
            Err(e) => {
                first_error.get_or_insert(e);
            }
        }
    }

    Err(match first_error {
        Some(e) => invalid(&e.to_string()),
        None => invalid("no key found"),
    })
}

// Byte offsets where each whitespace-separated field begins.
fn field_starts(line: &str) -> impl Iterator<Item = usize> + '_ {
    line.char_indices()
        .filter(move |&(i, c)| {
            !c.is_whitespace() && (i == 0 || line[..i].ends_with(char::is_whitespace))
        })
        .map(|(i, _)| i)
}

fn invalid(message: &str) -> UtilError {
    UtilError::InvalidKey {
        message: message.to_string(),
    }
}
