//! Random client credential generation.

/// URL-safe alphabet. 64 symbols, so masking a random byte is unbiased.
const ALPHABET: &[u8; 64] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789_-";

/// Length of generated public client identifiers (characters).
pub const CLIENT_ID_LENGTH: usize = 16;

/// Length of generated client secrets (characters).
pub const CLIENT_SECRET_LENGTH: usize = 32;

/// Draw `len` characters from [`ALPHABET`] using the OS CSPRNG.
pub fn random_identifier(len: usize) -> Result<String, getrandom::Error> {
    let mut bytes = vec![0u8; len];
    getrandom::fill(&mut bytes)?;
    Ok(bytes
        .iter()
        .map(|b| ALPHABET[(b & 0x3f) as usize] as char)
        .collect())
}

/// A freshly generated credential pair. The secret exists in plaintext only
/// inside this value.
pub struct ClientCredentials {
    pub client_id: String,
    pub client_secret: String,
}

impl ClientCredentials {
    pub fn generate() -> Result<Self, getrandom::Error> {
        Ok(Self {
            client_id: random_identifier(CLIENT_ID_LENGTH)?,
            client_secret: random_identifier(CLIENT_SECRET_LENGTH)?,
        })
    }
}

impl std::fmt::Debug for ClientCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientCredentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_lengths_and_alphabet() {
        let creds = ClientCredentials::generate().expect("rng");
        assert_eq!(creds.client_id.len(), CLIENT_ID_LENGTH);
        assert_eq!(creds.client_secret.len(), CLIENT_SECRET_LENGTH);
        assert!(
            creds
                .client_secret
                .bytes()
                .chain(creds.client_id.bytes())
                .all(|b| ALPHABET.contains(&b))
        );
    }

    #[test]
    fn test_identifiers_are_unique() {
        let ids: HashSet<String> = (0..256)
            .map(|_| random_identifier(CLIENT_ID_LENGTH).expect("rng"))
            .collect();
        assert_eq!(ids.len(), 256);
    }

    #[test]
    fn test_debug_redacts_secret() {
        let creds = ClientCredentials::generate().expect("rng");
        let printed = format!("{creds:?}");
        assert!(printed.contains(&creds.client_id));
        assert!(!printed.contains(&creds.client_secret));
    }
}
