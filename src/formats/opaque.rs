//! Sections whose structure is not interpreted (XLS, APL, LPS, MTR).

/// Raw section bytes, re-emitted exactly as read.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct OpaqueSection {
    pub bytes: Vec<u8>,
}

impl OpaqueSection {
    pub fn from_bytes(data: &[u8]) -> Self {
        OpaqueSection {
            bytes: data.to_vec(),
        }
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        self.bytes.clone()
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}
