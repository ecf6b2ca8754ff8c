use bytes::Bytes;

/// The stored unit: a numeric identifier plus the raw object bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageObject {
    pub id: u64,
    pub contents: Bytes,
}

impl ImageObject {
    pub fn new(id: u64, contents: impl Into<Bytes>) -> Self {
        Self {
            id,
            contents: contents.into(),
        }
    }

    pub fn size(&self) -> usize {
        self.contents.len()
    }
}
