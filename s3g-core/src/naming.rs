pub const DEFAULT_IMAGE_PREFIX: &str = "image";

/// ObjectNaming maps image ids to object keys: `{prefix}/{id}`.
#[derive(Debug, Clone)]
pub struct ObjectNaming {
    prefix: String,
}

impl ObjectNaming {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn key_for(&self, id: u64) -> String {
        format!("{}/{}", self.prefix, id)
    }
}

impl Default for ObjectNaming {
    fn default() -> Self {
        Self::new(DEFAULT_IMAGE_PREFIX)
    }
}
