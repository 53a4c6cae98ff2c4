//! Activity labels and score mapping

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Number of activity classes the model distinguishes
pub const N_CLASSES: usize = 6;

/// Activity class
///
/// Discriminants match the model's output ordering and must not change
/// without retraining.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Label {
    Sitting = 0,
    Lying = 1,
    Standing = 2,
    Jumping = 3,
    Walking = 4,
    Running = 5,
}

impl Label {
    /// All labels in model output order
    pub const ALL: [Label; N_CLASSES] = [
        Label::Sitting,
        Label::Lying,
        Label::Standing,
        Label::Jumping,
        Label::Walking,
        Label::Running,
    ];

    /// Index in the model's score vector
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Label for a score index
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// Display name
    pub const fn name(self) -> &'static str {
        match self {
            Label::Sitting => "Sitting",
            Label::Lying => "Lying",
            Label::Standing => "Standing",
            Label::Jumping => "Jumping",
            Label::Walking => "Walking",
            Label::Running => "Running",
        }
    }

    /// Look up a label by display name (case-sensitive)
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|l| l.name() == name)
    }
}

/// Index of the highest score
///
/// Ties resolve to the lowest index. NaN scores never win. Returns `None`
/// for an empty slice or one containing only NaN.
pub fn arg_max(scores: &[f32]) -> Option<usize> {
    let mut best: Option<(usize, f32)> = None;

    for (i, &score) in scores.iter().enumerate() {
        if score.is_nan() {
            continue;
        }
        match best {
            Some((_, top)) if score <= top => {}
            _ => best = Some((i, score)),
        }
    }

    best.map(|(i, _)| i)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_label_indices_match_order() {
        for (i, label) in Label::ALL.iter().enumerate() {
            assert_eq!(label.index(), i);
            assert_eq!(Label::from_index(i), Some(*label));
        }
        assert_eq!(Label::from_index(N_CLASSES), None);
    }

    #[test]
    fn test_label_names() {
        assert_eq!(Label::Jumping.name(), "Jumping");
        assert_eq!(Label::from_name("Running"), Some(Label::Running));
        assert_eq!(Label::from_name("running"), None);
    }

    #[test]
    fn test_arg_max_basic() {
        assert_eq!(arg_max(&[0.1, 0.7, 0.2]), Some(1));
        assert_eq!(arg_max(&[-3.0, -1.0, -2.0]), Some(1));
        assert_eq!(arg_max(&[]), None);
    }

    #[test]
    fn test_arg_max_tie_prefers_lowest_index() {
        assert_eq!(arg_max(&[0.5, 0.5, 0.5]), Some(0));
        assert_eq!(arg_max(&[0.1, 0.4, 0.4]), Some(1));
    }

    #[test]
    fn test_arg_max_skips_nan() {
        assert_eq!(arg_max(&[f32::NAN, 0.2, 0.1]), Some(1));
        assert_eq!(arg_max(&[f32::NAN, f32::NAN]), None);
    }

    proptest! {
        #[test]
        fn prop_arg_max_is_first_maximum(scores in proptest::collection::vec(-100.0f32..100.0, 1..12)) {
            let idx = arg_max(&scores).unwrap();
            let top = scores[idx];
            prop_assert!(scores.iter().all(|&s| s <= top));
            prop_assert!(scores[..idx].iter().all(|&s| s < top));
        }
    }
}
