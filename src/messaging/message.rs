use std::collections::HashMap;

/// The key every message must carry to name its target handler.
pub const JOB_KEY: &str = "job";

/// A flat string-to-string payload handed to a job handler. The wire shape is
/// deliberately schemaless; each handler validates the keys it needs.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct Message(HashMap<String, String>);

impl Message {
    pub fn new(job: impl Into<String>) -> Self {
        let mut fields = HashMap::new();
        fields.insert(JOB_KEY.to_string(), job.into());

        Self(fields)
    }

    /// Builder-style field insertion.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    /// The target job name, if the message carries one.
    pub fn job(&self) -> Option<&str> {
        self.get(JOB_KEY)
    }
}

impl FromIterator<(String, String)> for Message {
    fn from_iter<T: IntoIterator<Item = (String, String)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}
