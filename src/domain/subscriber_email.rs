#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct SubscriberEmail(String);

impl SubscriberEmail {
    /// An address is accepted when it has exactly one '@', a non-empty local
    /// part and a domain with at least one inner dot. Anything else never
    /// reaches storage or the queue.
    pub fn parse(email: String) -> Result<SubscriberEmail, String> {
        let mut parts = email.splitn(2, '@');
        let local = parts.next().unwrap_or_default();
        let domain = parts.next();

        let is_valid = match domain {
            Some(domain) => {
                !local.is_empty()
                    && !domain.contains('@')
                    && domain
                        .split_once('.')
                        .map(|(head, tail)| !head.is_empty() && !tail.is_empty())
                        .unwrap_or(false)
            }
            None => false,
        };

        if !is_valid {
            return Err(format!("{} email is not valid", email));
        }

        Ok(Self(email))
    }

    /// The part before the '@', used as the seed for gift names.
    pub fn local_part(&self) -> &str {
        self.0
            .split_once('@')
            .map(|(local, _)| local)
            .unwrap_or_default()
    }
}

impl AsRef<str> for SubscriberEmail {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SubscriberEmail {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
