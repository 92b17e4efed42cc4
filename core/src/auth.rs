use secrecy::{ExposeSecret as _, SecretString};

/// Credentials attached to every request.
///
/// The token is sent as a bearer credential. The workspace id is part of
/// every path and the node id scopes customer listings and submissions.
#[derive(Debug, Clone)]
pub struct Auth {
    token: SecretString,
    pub workspace_id: String,
    pub node_id: String,
}

impl Auth {
    pub fn new(token: &str, workspace_id: &str, node_id: &str) -> Self {
        Self {
            token: SecretString::from(token.to_owned()),
            workspace_id: workspace_id.to_owned(),
            node_id: node_id.to_owned(),
        }
    }

    pub(crate) fn bearer(&self) -> String {
        format!("Bearer {}", self.token.expose_secret())
    }
}
