use crate::error::{Result, SopError};
use crate::paths;
use crate::types::TokenScope;
use chrono::{DateTime, Utc};
use rand::RngCore;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::path::Path;

pub const TOKEN_PREFIX: &str = "sop_";

// ---------------------------------------------------------------------------
// ApiToken
// ---------------------------------------------------------------------------

/// One registered API token. Only the SHA-256 digest of the plaintext is
/// stored; the prefix is kept for display in token lists.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiToken {
    pub id: String,
    pub name: String,
    /// User the token acts as; the facade filters issues to this owner.
    pub owner: String,
    pub prefix: String,
    pub sha256: String,
    pub scopes: Vec<TokenScope>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub revoked: bool,
}

impl ApiToken {
    pub fn has_scope(&self, scope: TokenScope) -> bool {
        self.scopes.contains(&scope)
    }
}

// ---------------------------------------------------------------------------
// TokenRegistry
// ---------------------------------------------------------------------------

/// The full token registry persisted at `.sop/tokens.yaml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TokenRegistry {
    #[serde(default)]
    pub tokens: Vec<ApiToken>,
}

impl TokenRegistry {
    pub fn load(root: &Path) -> Result<Self> {
        let path = paths::tokens_path(root);
        if !path.exists() {
            return Ok(Self::default());
        }
        let data = std::fs::read_to_string(&path)?;
        let registry: TokenRegistry = serde_yaml::from_str(&data)?;
        Ok(registry)
    }

    pub fn save(&self, root: &Path) -> Result<()> {
        let path = paths::tokens_path(root);
        let data = serde_yaml::to_string(self)?;
        crate::io::atomic_write(&path, data.as_bytes())
    }

    /// Mint a token for `owner` and persist the registry. Returns the record
    /// and the plaintext, which is never stored and shown exactly once.
    pub fn create(
        &mut self,
        root: &Path,
        name: impl Into<String>,
        owner: impl Into<String>,
        scopes: Vec<TokenScope>,
    ) -> Result<(ApiToken, String)> {
        let plaintext = generate_plaintext();
        let token = ApiToken {
            id: uuid::Uuid::new_v4().to_string(),
            name: name.into(),
            owner: owner.into(),
            prefix: plaintext[..TOKEN_PREFIX.len() + 8].to_string(),
            sha256: digest(&plaintext),
            scopes,
            created_at: Utc::now(),
            revoked: false,
        };
        self.tokens.push(token.clone());
        self.save(root)?;
        Ok((token, plaintext))
    }

    /// Look up a live token by plaintext. Revoked tokens never match.
    pub fn authenticate(&self, plaintext: &str) -> Option<&ApiToken> {
        let wanted = digest(plaintext);
        self.tokens
            .iter()
            .find(|t| !t.revoked && t.sha256 == wanted)
    }

    pub fn revoke(&mut self, root: &Path, id: &str) -> Result<()> {
        let token = self
            .tokens
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or_else(|| SopError::TokenNotFound(id.to_string()))?;
        token.revoked = true;
        self.save(root)
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn generate_plaintext() -> String {
    let mut bytes = [0u8; 16];
    rand::thread_rng().fill_bytes(&mut bytes);
    format!("{TOKEN_PREFIX}{}", hex::encode(bytes))
}

pub fn digest(plaintext: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(plaintext.as_bytes());
    hex::encode(hasher.finalize())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn create_and_authenticate() {
        let dir = TempDir::new().unwrap();
        let mut registry = TokenRegistry::load(dir.path()).unwrap();
        let (token, plaintext) = registry
            .create(dir.path(), "ci", "alice", vec![TokenScope::IssuesRead])
            .unwrap();

        assert!(plaintext.starts_with(TOKEN_PREFIX));
        assert_eq!(plaintext.len(), TOKEN_PREFIX.len() + 32);
        assert!(plaintext.starts_with(&token.prefix));

        let reloaded = TokenRegistry::load(dir.path()).unwrap();
        let found = reloaded.authenticate(&plaintext).unwrap();
        assert_eq!(found.owner, "alice");
        assert!(found.has_scope(TokenScope::IssuesRead));
        assert!(!found.has_scope(TokenScope::IssuesWrite));
    }

    #[test]
    fn plaintext_not_stored() {
        let dir = TempDir::new().unwrap();
        let mut registry = TokenRegistry::load(dir.path()).unwrap();
        let (_, plaintext) = registry
            .create(dir.path(), "ci", "alice", vec![TokenScope::IssuesRead])
            .unwrap();

        let raw = std::fs::read_to_string(dir.path().join(".sop/tokens.yaml")).unwrap();
        assert!(!raw.contains(&plaintext));
    }

    #[test]
    fn revoked_token_never_matches() {
        let dir = TempDir::new().unwrap();
        let mut registry = TokenRegistry::load(dir.path()).unwrap();
        let (token, plaintext) = registry
            .create(dir.path(), "ci", "alice", vec![TokenScope::IssuesRead])
            .unwrap();

        registry.revoke(dir.path(), &token.id).unwrap();
        assert!(registry.authenticate(&plaintext).is_none());
    }

    #[test]
    fn revoke_unknown_fails() {
        let dir = TempDir::new().unwrap();
        let mut registry = TokenRegistry::default();
        assert!(matches!(
            registry.revoke(dir.path(), "nope"),
            Err(SopError::TokenNotFound(_))
        ));
    }

    #[test]
    fn unknown_plaintext_does_not_authenticate() {
        let registry = TokenRegistry::default();
        assert!(registry.authenticate("sop_deadbeef").is_none());
    }

    #[test]
    fn digest_is_stable_hex() {
        let d = digest("sop_test");
        assert_eq!(d.len(), 64);
        assert_eq!(d, digest("sop_test"));
    }
}
