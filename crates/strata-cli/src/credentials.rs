//! Credential collection
//!
//! Each adapter kind belongs to one credential flow. The collector walks the
//! flow through a [`Prompt`] and produces the ordered field map that ends up
//! in the project `.strata` file under the datasource key.

use crate::adapters;
use crate::prompt::Prompt;
use std::io;
use std::str::FromStr;
use strata_config::FieldMap;

pub const DEFAULT_OAUTH_REDIRECT_URI: &str = "https://localhost:3420/callback";

/// Credential flow for an adapter kind
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialFlow {
    /// Token based auth with a selectable mode (snowflake)
    TokenFamily,
    /// Cloud access key pair (athena)
    AccessKeyFamily,
    /// Username and password, or nothing when not required
    Generic { required: bool },
}

impl CredentialFlow {
    pub fn for_adapter(kind: &str) -> Self {
        match adapters::normalize(kind).as_str() {
            "snowflake" => CredentialFlow::TokenFamily,
            "athena" => CredentialFlow::AccessKeyFamily,
            other => CredentialFlow::Generic {
                required: requires_credentials(other),
            },
        }
    }
}

/// Whether datasources of this kind need credentials at all
pub fn requires_credentials(kind: &str) -> bool {
    adapters::normalize(kind) != "duckdb"
}

/// Authentication modes of the token family
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthMode {
    PersonalAccessToken,
    KeyPair,
    OAuth,
}

impl AuthMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuthMode::PersonalAccessToken => "pat",
            AuthMode::KeyPair => "kp",
            AuthMode::OAuth => "oauth",
        }
    }
}

impl FromStr for AuthMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pat" => Ok(AuthMode::PersonalAccessToken),
            "kp" => Ok(AuthMode::KeyPair),
            "oauth" => Ok(AuthMode::OAuth),
            _ => Err(format!("Unknown authentication mode: {}", s)),
        }
    }
}

/// Interactive credential collector for one adapter kind
#[derive(Debug, Clone)]
pub struct CredentialCollector {
    adapter: String,
    flow: CredentialFlow,
    credentials: FieldMap,
}

impl CredentialCollector {
    pub fn new(adapter: &str) -> Self {
        Self {
            adapter: adapters::normalize(adapter),
            flow: CredentialFlow::for_adapter(adapter),
            credentials: FieldMap::new(),
        }
    }

    pub fn adapter(&self) -> &str {
        &self.adapter
    }

    pub fn requires_credentials(&self) -> bool {
        !matches!(self.flow, CredentialFlow::Generic { required: false })
    }

    /// Run the flow, replacing anything collected before
    pub fn collect(&mut self, prompt: &mut dyn Prompt) -> io::Result<&FieldMap> {
        self.credentials.clear();

        match self.flow {
            CredentialFlow::TokenFamily => self.collect_token(prompt)?,
            CredentialFlow::AccessKeyFamily => {
                self.put("access_key_id", prompt.ask("AWS Access Key ID", None)?);
                self.put(
                    "secret_access_key",
                    prompt.ask_secret("AWS Secret Access Key")?,
                );
            }
            CredentialFlow::Generic { required: true } => {
                self.put("username", prompt.ask("Username", None)?);
                self.put("password", prompt.ask_secret("Password")?);
            }
            CredentialFlow::Generic { required: false } => {}
        }

        tracing::debug!(
            adapter = %self.adapter,
            fields = self.credentials.len(),
            "collected credentials"
        );
        Ok(&self.credentials)
    }

    /// Whether the last collection produced anything worth storing
    pub fn collected(&self) -> bool {
        !self.credentials.is_empty()
    }

    pub fn credentials(&self) -> &FieldMap {
        &self.credentials
    }

    fn collect_token(&mut self, prompt: &mut dyn Prompt) -> io::Result<()> {
        let mode = loop {
            let answer = prompt.ask(
                "Authentication mode (pat/kp/oauth)",
                Some(AuthMode::PersonalAccessToken.as_str()),
            )?;
            match answer.parse::<AuthMode>() {
                Ok(mode) => break mode,
                Err(message) => println!("{}", message),
            }
        };
        self.put("auth_mode", mode.as_str().to_string());

        match mode {
            AuthMode::PersonalAccessToken => {
                self.put(
                    "personal_access_token",
                    prompt.ask_secret("Personal Access Token")?,
                );
            }
            AuthMode::KeyPair => {
                self.put("username", prompt.ask("Username", None)?);
                self.put("private_key", prompt.ask("Private key file path", None)?);
            }
            AuthMode::OAuth => {
                self.put("oauth_client_id", prompt.ask("OAuth client ID", None)?);
                self.put(
                    "oauth_client_secret",
                    prompt.ask_secret("OAuth client secret")?,
                );
                self.put(
                    "oauth_redirect_uri",
                    prompt.ask("OAuth redirect URI", Some(DEFAULT_OAUTH_REDIRECT_URI))?,
                );
                let scope = prompt.ask("OAuth scope (optional)", None)?;
                if !scope.is_empty() {
                    self.put("oauth_scope", scope);
                }
            }
        }
        Ok(())
    }

    fn put(&mut self, field: &str, value: String) {
        self.credentials.insert(field.to_string(), value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prompt::scripted::ScriptedPrompt;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn pairs(map: &FieldMap) -> Vec<(&str, &str)> {
        map.iter().map(|(k, v)| (k.as_str(), v.as_str())).collect()
    }

    #[rstest]
    #[case("snowflake", CredentialFlow::TokenFamily)]
    #[case("Snowflake", CredentialFlow::TokenFamily)]
    #[case("athena", CredentialFlow::AccessKeyFamily)]
    #[case("postgres", CredentialFlow::Generic { required: true })]
    #[case("mysql", CredentialFlow::Generic { required: true })]
    #[case("duckdb", CredentialFlow::Generic { required: false })]
    fn test_flow_selection(#[case] kind: &str, #[case] expected: CredentialFlow) {
        assert_eq!(CredentialFlow::for_adapter(kind), expected);
    }

    #[test]
    fn test_generic_flow() {
        let mut prompt = ScriptedPrompt::new(&["alice", "s3cret"]);
        let mut collector = CredentialCollector::new("postgres");

        collector.collect(&mut prompt).unwrap();

        assert!(collector.collected());
        assert_eq!(
            pairs(collector.credentials()),
            vec![("username", "alice"), ("password", "s3cret")]
        );
        assert_eq!(prompt.secrets, vec!["Password"]);
    }

    #[test]
    fn test_duckdb_collects_nothing() {
        let mut prompt = ScriptedPrompt::new(&[]);
        let mut collector = CredentialCollector::new("duckdb");

        assert!(!collector.requires_credentials());
        collector.collect(&mut prompt).unwrap();

        assert!(!collector.collected());
        assert!(prompt.asked.is_empty());
    }

    #[test]
    fn test_access_key_flow() {
        let mut prompt = ScriptedPrompt::new(&["AKIA123", "wJalr"]);
        let mut collector = CredentialCollector::new("athena");

        collector.collect(&mut prompt).unwrap();

        assert_eq!(
            pairs(collector.credentials()),
            vec![("access_key_id", "AKIA123"), ("secret_access_key", "wJalr")]
        );
    }

    #[test]
    fn test_token_flow_default_mode() {
        let mut prompt = ScriptedPrompt::new(&["", "tok-123"]);
        let mut collector = CredentialCollector::new("snowflake");

        collector.collect(&mut prompt).unwrap();

        assert_eq!(
            pairs(collector.credentials()),
            vec![("auth_mode", "pat"), ("personal_access_token", "tok-123")]
        );
    }

    #[test]
    fn test_token_flow_key_pair() {
        let mut prompt = ScriptedPrompt::new(&["kp", "svc_user", "/keys/rsa.p8"]);
        let mut collector = CredentialCollector::new("snowflake");

        collector.collect(&mut prompt).unwrap();

        assert_eq!(
            pairs(collector.credentials()),
            vec![
                ("auth_mode", "kp"),
                ("username", "svc_user"),
                ("private_key", "/keys/rsa.p8")
            ]
        );
    }

    #[test]
    fn test_token_flow_oauth_defaults_and_optional_scope() {
        let mut prompt = ScriptedPrompt::new(&["oauth", "client", "secret", "", ""]);
        let mut collector = CredentialCollector::new("snowflake");

        collector.collect(&mut prompt).unwrap();

        assert_eq!(
            pairs(collector.credentials()),
            vec![
                ("auth_mode", "oauth"),
                ("oauth_client_id", "client"),
                ("oauth_client_secret", "secret"),
                ("oauth_redirect_uri", DEFAULT_OAUTH_REDIRECT_URI),
            ]
        );
    }

    #[test]
    fn test_token_flow_oauth_with_scope() {
        let mut prompt = ScriptedPrompt::new(&[
            "oauth",
            "client",
            "secret",
            "https://example.com/cb",
            "session:role:analyst",
        ]);
        let mut collector = CredentialCollector::new("snowflake");

        collector.collect(&mut prompt).unwrap();

        let creds = collector.credentials();
        assert_eq!(creds["oauth_redirect_uri"], "https://example.com/cb");
        assert_eq!(creds["oauth_scope"], "session:role:analyst");
    }

    #[test]
    fn test_unknown_mode_is_asked_again() {
        let mut prompt = ScriptedPrompt::new(&["password", "PAT", "tok"]);
        let mut collector = CredentialCollector::new("snowflake");

        collector.collect(&mut prompt).unwrap();

        assert_eq!(prompt.asked.len(), 3);
        assert_eq!(collector.credentials()["auth_mode"], "pat");
    }

    #[test]
    fn test_exhausted_input_is_an_error() {
        let mut prompt = ScriptedPrompt::new(&["alice"]);
        let mut collector = CredentialCollector::new("mysql");

        let err = collector.collect(&mut prompt).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof);
    }

    #[test]
    fn test_collect_replaces_previous_answers() {
        let mut prompt = ScriptedPrompt::new(&["a", "1", "b", "2"]);
        let mut collector = CredentialCollector::new("postgres");

        collector.collect(&mut prompt).unwrap();
        collector.collect(&mut prompt).unwrap();

        assert_eq!(
            pairs(collector.credentials()),
            vec![("username", "b"), ("password", "2")]
        );
    }
}
