//! Practice drill catalog.
//!
//! Static lookup tables driving the three selection lists on the Practical
//! tab: a drill mode, its variants, and (where the mode has them) the
//! inversion/hand options for the third column.

/// Top-level drill modes, in display order.
pub const DRILL_MODES: [DrillMode; 6] = [
    DrillMode::Notes,
    DrillMode::Scales,
    DrillMode::Triads,
    DrillMode::Sevenths,
    DrillMode::Modes,
    DrillMode::Shells,
];

/// A category of practice material.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrillMode {
    Notes,
    Scales,
    Triads,
    Sevenths,
    Modes,
    Shells,
}

impl DrillMode {
    /// Display name for the mode list.
    pub fn name(&self) -> &'static str {
        match self {
            DrillMode::Notes => "Notes",
            DrillMode::Scales => "Scales",
            DrillMode::Triads => "Triads",
            DrillMode::Sevenths => "Sevenths",
            DrillMode::Modes => "Modes",
            DrillMode::Shells => "Shells",
        }
    }

    /// Variants shown in the second list for this mode.
    pub fn variants(&self) -> &'static [&'static str] {
        match self {
            DrillMode::Notes => &["Naturals", "Sharps", "Flats"],
            DrillMode::Scales => &["Major", "Minor", "Harmonic Minor", "Melodic Minor"],
            DrillMode::Triads => &["Major", "Minor"],
            DrillMode::Sevenths => &["Maj7", "Min7", "7", "Dim7", "m7f5"],
            DrillMode::Modes => &[
                "Ionian",
                "Dorian",
                "Phrygian",
                "Lydian",
                "Mixolydian",
                "Aeolian",
                "Locrian",
            ],
            DrillMode::Shells => &["Major", "Minor", "Dominant"],
        }
    }

    /// Options shown in the third list (inversions, hands, or voicings).
    /// Empty for modes that have no third dimension.
    pub fn options(&self) -> &'static [&'static str] {
        match self {
            DrillMode::Notes => &[],
            DrillMode::Scales => &["Right", "Left"],
            DrillMode::Triads => &["Root", "First", "Second"],
            DrillMode::Sevenths => &["Root", "First", "Second", "Third"],
            DrillMode::Modes => &[],
            DrillMode::Shells => &["3/7", "7/3"],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_mode_has_variants() {
        for mode in DRILL_MODES {
            assert!(!mode.variants().is_empty(), "{} has no variants", mode.name());
        }
    }

    #[test]
    fn test_seventh_inversions() {
        assert_eq!(
            DrillMode::Sevenths.options(),
            &["Root", "First", "Second", "Third"]
        );
    }

    #[test]
    fn test_modes_without_options() {
        assert!(DrillMode::Notes.options().is_empty());
        assert!(DrillMode::Modes.options().is_empty());
    }
}
