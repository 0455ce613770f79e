use serde::{Deserialize, Serialize};

/// Acoustic modulation profile used for transmission.
///
/// A protocol selects carrier band and symbol speed independently of message
/// content. It affects `encode` only; the decoder recognizes all profiles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProtocolId {
    AudibleNormal,
    AudibleFast,
    AudibleFastest,
    UltrasoundNormal,
    UltrasoundFast,
    UltrasoundFastest,
}

impl ProtocolId {
    /// All supported protocols, in id order.
    pub const ALL: [ProtocolId; 6] = [
        Self::AudibleNormal,
        Self::AudibleFast,
        Self::AudibleFastest,
        Self::UltrasoundNormal,
        Self::UltrasoundFast,
        Self::UltrasoundFastest,
    ];

    /// Resolve a raw protocol id, or `None` if outside the supported set.
    pub fn from_id(id: i32) -> Option<Self> {
        match id {
            0 => Some(Self::AudibleNormal),
            1 => Some(Self::AudibleFast),
            2 => Some(Self::AudibleFastest),
            3 => Some(Self::UltrasoundNormal),
            4 => Some(Self::UltrasoundFast),
            5 => Some(Self::UltrasoundFastest),
            _ => None,
        }
    }

    /// The raw id of this protocol.
    pub fn id(&self) -> i32 {
        match self {
            Self::AudibleNormal => 0,
            Self::AudibleFast => 1,
            Self::AudibleFastest => 2,
            Self::UltrasoundNormal => 3,
            Self::UltrasoundFast => 4,
            Self::UltrasoundFastest => 5,
        }
    }
}

impl Default for ProtocolId {
    /// Fast audible transfer, the recommended general-purpose profile.
    fn default() -> Self {
        Self::AudibleFast
    }
}
