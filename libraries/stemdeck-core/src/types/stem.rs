//! Stem layout: the four components of a separated mix

use super::MediaAddress;
use crate::error::{CoreError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Number of stems in a stem track
pub const NUM_STEMS: usize = 4;

/// Stem identifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[repr(usize)]
pub enum StemKind {
    Vocals = 0,
    Bass = 1,
    Drums = 2,
    Other = 3,
}

impl StemKind {
    /// All stems, leader first
    pub const ALL: [StemKind; NUM_STEMS] = [
        StemKind::Vocals,
        StemKind::Bass,
        StemKind::Drums,
        StemKind::Other,
    ];

    /// The stem whose clock every other stem follows
    pub const LEADER: StemKind = StemKind::Vocals;

    /// Position of this stem in `ALL`
    pub fn index(self) -> usize {
        self as usize
    }

    /// Lowercase name used by the UI
    pub fn name(self) -> &'static str {
        match self {
            StemKind::Vocals => "vocals",
            StemKind::Bass => "bass",
            StemKind::Drums => "drums",
            StemKind::Other => "other",
        }
    }

    /// Check if this is the leader stem
    pub fn is_leader(self) -> bool {
        self == Self::LEADER
    }
}

impl fmt::Display for StemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for StemKind {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "vocals" => Ok(StemKind::Vocals),
            "bass" => Ok(StemKind::Bass),
            "drums" => Ok(StemKind::Drums),
            "other" => Ok(StemKind::Other),
            _ => Err(CoreError::UnknownStem(s.to_string())),
        }
    }
}

/// Addresses of a complete stem set
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StemRefs {
    pub vocals: MediaAddress,
    pub bass: MediaAddress,
    pub drums: MediaAddress,
    pub other: MediaAddress,
}

impl StemRefs {
    /// Address of one stem
    pub fn get(&self, kind: StemKind) -> &MediaAddress {
        match kind {
            StemKind::Vocals => &self.vocals,
            StemKind::Bass => &self.bass,
            StemKind::Drums => &self.drums,
            StemKind::Other => &self.other,
        }
    }

    /// Iterate stems in `StemKind::ALL` order
    pub fn iter(&self) -> impl Iterator<Item = (StemKind, &MediaAddress)> {
        StemKind::ALL.into_iter().map(move |kind| (kind, self.get(kind)))
    }
}

/// Stem addresses as collected by an import form, any of which may be absent
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartialStems {
    pub vocals: Option<MediaAddress>,
    pub bass: Option<MediaAddress>,
    pub drums: Option<MediaAddress>,
    pub other: Option<MediaAddress>,
}

impl PartialStems {
    /// Create an empty stem set
    pub fn new() -> Self {
        Self::default()
    }

    /// Set one stem address (builder style)
    #[must_use]
    pub fn with(mut self, kind: StemKind, address: MediaAddress) -> Self {
        *self.slot_mut(kind) = Some(address);
        self
    }

    /// Stems that are absent or have a blank address
    pub fn missing(&self) -> Vec<StemKind> {
        StemKind::ALL
            .into_iter()
            .filter(|kind| self.slot(*kind).map_or(true, |addr| addr.is_missing()))
            .collect()
    }

    /// Convert into a complete set, failing if any stem is missing
    pub fn complete(self) -> Result<StemRefs> {
        let missing = self.missing();
        if !missing.is_empty() {
            return Err(CoreError::IncompleteStems(missing));
        }

        match (self.vocals, self.bass, self.drums, self.other) {
            (Some(vocals), Some(bass), Some(drums), Some(other)) => Ok(StemRefs {
                vocals,
                bass,
                drums,
                other,
            }),
            _ => Err(CoreError::IncompleteStems(StemKind::ALL.to_vec())),
        }
    }

    fn slot(&self, kind: StemKind) -> Option<&MediaAddress> {
        match kind {
            StemKind::Vocals => self.vocals.as_ref(),
            StemKind::Bass => self.bass.as_ref(),
            StemKind::Drums => self.drums.as_ref(),
            StemKind::Other => self.other.as_ref(),
        }
    }

    fn slot_mut(&mut self, kind: StemKind) -> &mut Option<MediaAddress> {
        match kind {
            StemKind::Vocals => &mut self.vocals,
            StemKind::Bass => &mut self.bass,
            StemKind::Drums => &mut self.drums,
            StemKind::Other => &mut self.other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full() -> PartialStems {
        StemKind::ALL.into_iter().fold(PartialStems::new(), |stems, kind| {
            stems.with(kind, MediaAddress::new(format!("{}.mp3", kind)))
        })
    }

    #[test]
    fn leader_is_vocals_and_first() {
        assert_eq!(StemKind::ALL[0], StemKind::LEADER);
        assert!(StemKind::Vocals.is_leader());
        assert!(!StemKind::Bass.is_leader());
    }

    #[test]
    fn index_matches_all_order() {
        for (i, kind) in StemKind::ALL.iter().enumerate() {
            assert_eq!(kind.index(), i);
        }
    }

    #[test]
    fn parse_is_case_insensitive() {
        assert_eq!("Bass".parse::<StemKind>().unwrap(), StemKind::Bass);
        assert_eq!(" drums ".parse::<StemKind>().unwrap(), StemKind::Drums);
        assert!(matches!(
            "guitar".parse::<StemKind>(),
            Err(CoreError::UnknownStem(name)) if name == "guitar"
        ));
    }

    #[test]
    fn complete_set_converts() {
        let refs = full().complete().unwrap();
        assert_eq!(refs.get(StemKind::Other).as_str(), "other.mp3");
        let order: Vec<_> = refs.iter().map(|(kind, _)| kind).collect();
        assert_eq!(order, StemKind::ALL.to_vec());
    }

    #[test]
    fn blank_stem_counts_as_missing() {
        let stems = full().with(StemKind::Drums, MediaAddress::new(""));
        assert_eq!(stems.missing(), vec![StemKind::Drums]);
        assert_eq!(
            stems.complete(),
            Err(CoreError::IncompleteStems(vec![StemKind::Drums]))
        );
    }

    #[test]
    fn serde_uses_lowercase_names() {
        let json = serde_json::to_string(&StemKind::Vocals).unwrap();
        assert_eq!(json, "\"vocals\"");
    }
}
