#[derive(Debug, PartialEq, Eq, serde::Serialize)]
pub enum SubscriberStatus {
    Pending,
    Confirmed,
}

impl SubscriberStatus {
    pub fn is_pending(&self) -> bool {
        matches!(self, SubscriberStatus::Pending)
    }

    pub fn is_confirmed(&self) -> bool {
        matches!(self, SubscriberStatus::Confirmed)
    }

    pub fn parse(status: String) -> Result<SubscriberStatus, String> {
        match status.as_str() {
            "pending" => Ok(SubscriberStatus::Pending),
            "confirmed" => Ok(SubscriberStatus::Confirmed),
            _ => Err(format!("{} is not a valid subscriber status", status)),
        }
    }
}

impl AsRef<str> for SubscriberStatus {
    fn as_ref(&self) -> &str {
        match self {
            SubscriberStatus::Pending => "pending",
            SubscriberStatus::Confirmed => "confirmed",
        }
    }
}
