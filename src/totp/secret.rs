//! Loading the shared OTP seed from disk.

use secrecy::{ExposeSecret, SecretString};
use std::{fs, io, path::Path};
use totp_rs::Secret;

#[derive(Debug, thiserror::Error)]
pub enum SecretError {
    #[error("failed to read secret file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: io::Error,
    },
    #[error("secret file {path} is empty")]
    Empty { path: String },
    #[error("secret is not valid base32")]
    Encoding,
}

/// Read the single-line base32 seed once at startup.
///
/// # Errors
/// Returns an error if the file cannot be read, is blank, or does not decode.
pub fn load_secret(path: &Path) -> Result<SecretString, SecretError> {
    let display = path.display().to_string();
    let raw = fs::read_to_string(path).map_err(|source| SecretError::Read {
        path: display.clone(),
        source,
    })?;

    let secret = SecretString::from(normalize(&raw));
    if secret.expose_secret().is_empty() {
        return Err(SecretError::Empty { path: display });
    }

    // Fail at startup rather than on the first login.
    decode(&secret)?;

    Ok(secret)
}

/// Raw key bytes behind a base32 seed.
///
/// # Errors
/// Returns [`SecretError::Encoding`] if the seed is not base32 or decodes to nothing.
pub fn decode(secret: &SecretString) -> Result<Vec<u8>, SecretError> {
    let bytes = Secret::Encoded(normalize(secret.expose_secret()))
        .to_bytes()
        .map_err(|_| SecretError::Encoding)?;
    if bytes.is_empty() {
        return Err(SecretError::Encoding);
    }
    Ok(bytes)
}

// Authenticator apps print seeds in lowercase groups; padding is optional.
fn normalize(raw: &str) -> String {
    raw.chars()
        .filter(|c| !c.is_whitespace() && *c != '=')
        .map(|c| c.to_ascii_uppercase())
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use ulid::Ulid;

    fn write_temp(contents: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!("totpgate-secret-{}", Ulid::new()));
        fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn loads_and_trims_secret() {
        let path = write_temp("JBSWY3DPEHPK3PXP\n");
        let secret = load_secret(&path).unwrap();
        assert_eq!(secret.expose_secret(), "JBSWY3DPEHPK3PXP");
        let _ = fs::remove_file(path);
    }

    #[test]
    fn normalizes_grouped_lowercase_seed() {
        let path = write_temp("jbsw y3dp ehpk 3pxp====\n");
        let secret = load_secret(&path).unwrap();
        assert_eq!(secret.expose_secret(), "JBSWY3DPEHPK3PXP");
        let _ = fs::remove_file(path);
    }

    #[test]
    fn missing_file_is_an_error() {
        let path = std::env::temp_dir().join(format!("totpgate-missing-{}", Ulid::new()));
        let err = load_secret(&path).unwrap_err();
        assert!(matches!(err, SecretError::Read { .. }));
        assert!(err.to_string().contains("totpgate-missing-"));
    }

    #[test]
    fn blank_file_is_an_error() {
        let path = write_temp("  \n");
        assert!(matches!(
            load_secret(&path).unwrap_err(),
            SecretError::Empty { .. }
        ));
        let _ = fs::remove_file(path);
    }

    #[test]
    fn non_base32_is_an_error() {
        let path = write_temp("not base32 at all!\n");
        assert!(matches!(
            load_secret(&path).unwrap_err(),
            SecretError::Encoding
        ));
        let _ = fs::remove_file(path);
    }

    #[test]
    fn decode_yields_key_bytes() {
        let bytes = decode(&SecretString::from("JBSWY3DPEHPK3PXP")).unwrap();
        assert_eq!(bytes, b"Hello!\xde\xad\xbe\xef");
    }
}
