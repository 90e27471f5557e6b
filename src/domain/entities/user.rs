use std::fmt;

/// The sender of an inbound conversational event
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct User {
    pub id: String,
    pub username: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub is_bot: bool,
}

impl User {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            username: None,
            first_name: None,
            last_name: None,
            is_bot: false,
        }
    }

    pub fn with_username(mut self, username: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self
    }

    pub fn with_first_name(mut self, first: impl Into<String>) -> Self {
        self.first_name = Some(first.into());
        self
    }

    pub fn with_last_name(mut self, last: impl Into<String>) -> Self {
        self.last_name = Some(last.into());
        self
    }

    pub fn as_bot(mut self) -> Self {
        self.is_bot = true;
        self
    }

    /// First and last name joined, when either is known
    pub fn full_name(&self) -> Option<String> {
        match (&self.first_name, &self.last_name) {
            (Some(first), Some(last)) => Some(format!("{} {}", first, last)),
            (Some(first), None) => Some(first.clone()),
            (None, Some(last)) => Some(last.clone()),
            (None, None) => None,
        }
    }

    /// Best human-readable label: username, then full name, then id
    pub fn display_name(&self) -> String {
        self.username
            .clone()
            .or_else(|| self.full_name())
            .unwrap_or_else(|| self.id.clone())
    }
}

impl fmt::Display for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_name_prefers_username() {
        let user = User::new("42")
            .with_username("alice")
            .with_first_name("Alice")
            .with_last_name("Liddell");
        assert_eq!(user.display_name(), "alice");
    }

    #[test]
    fn display_name_falls_back_to_full_name_then_id() {
        let user = User::new("42").with_first_name("Alice").with_last_name("Liddell");
        assert_eq!(user.display_name(), "Alice Liddell");

        assert_eq!(User::new("42").display_name(), "42");
    }
}
