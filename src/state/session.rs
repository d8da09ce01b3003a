/// The signed-in user, as handed to us by the identity provider.
///
/// `voter_id` is opaque: it is only compared and stored, never parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub voter_id: String,
    pub email: String,
    pub display_name: Option<String>,
}

impl Session {
    pub fn new(voter_id: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            voter_id: voter_id.into(),
            email: email.into(),
            display_name: None,
        }
    }

    pub fn with_display_name(mut self, name: impl Into<String>) -> Self {
        self.display_name = Some(name.into());
        self
    }

    /// Name shown next to uploaded photos: the display name, else the local
    /// part of the email, else a generic placeholder
    pub fn uploader_label(&self) -> String {
        if let Some(name) = self.display_name.as_deref().map(str::trim) {
            if !name.is_empty() {
                return name.to_string();
            }
        }

        match self.email.split('@').next().map(str::trim) {
            Some(local) if !local.is_empty() => local.to_string(),
            _ => "Usuario".to_string(),
        }
    }
}
