//! Fixed-precision version key encoding
//!
//! Pacman version strings ("6.6.21-1", "5.15.85.r2-3") don't sort
//! numerically as plain strings ("3.10" < "3.2"). The key extracts every
//! maximal digit run, pads the sequence out to a minimum number of groups
//! and each group to a fixed decimal width, then treats the concatenation
//! as one unsigned number.
//!
//! The two precisions behave asymmetrically: the general encoding caps the
//! sequence at its group count (runs past the twelfth are dropped), while
//! the kernel encoding only pads up to five groups and keeps every run
//! beyond that.
//!
//! The encoding is an internal detail: callers only ever see comparison
//! results and the raw version string.

use std::cmp::Ordering;

/// Group count / digit width pair for one package kind.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Precision {
    pub groups: usize,
    pub width: usize,
    /// Drop digit runs past `groups` instead of keeping them.
    pub truncate: bool,
}

/// General packages: 12 groups of 8 digits, extra groups truncated.
pub(crate) const GENERAL: Precision = Precision {
    groups: 12,
    width: 8,
    truncate: true,
};

/// Kernel image packages: coarser 3-digit groups, padded to at least 5
/// but never truncated.
pub(crate) const KERNEL: Precision = Precision {
    groups: 5,
    width: 3,
    truncate: false,
};

/// Derived ordering key for a version string.
///
/// Held as the concatenated fixed-width digit string with leading zeros
/// stripped (12 groups of 8 digits overflow any machine word), so
/// comparing length first and bytes second is exactly unsigned integer
/// comparison. Keys of different lengths — possible for the kernel
/// precision, which never truncates — therefore still compare by
/// numeric magnitude.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub(crate) struct VersionKey(String);

impl VersionKey {
    /// Encode a raw version string at the given precision.
    ///
    /// Missing groups are zero-filled on the right; truncating precisions
    /// drop runs past the group count. A run too wide for its group is
    /// capped at the group maximum so it cannot bleed into neighbouring
    /// positions.
    pub fn encode(version: &str, precision: Precision) -> Self {
        let cap = 10u64.pow(precision.width as u32) - 1;
        let mut groups = Vec::with_capacity(precision.groups);

        let mut run = String::new();
        for ch in version.chars().chain(std::iter::once('\0')) {
            if ch.is_ascii_digit() {
                run.push(ch);
                continue;
            }
            if !run.is_empty() {
                if precision.truncate && groups.len() == precision.groups {
                    break;
                }
                let value = run.parse::<u64>().unwrap_or(u64::MAX);
                groups.push(value.min(cap));
                run.clear();
            }
        }

        if groups.len() < precision.groups {
            groups.resize(precision.groups, 0);
        }

        let mut digits = String::with_capacity(groups.len() * precision.width);
        for group in groups {
            digits.push_str(&format!("{group:0width$}", width = precision.width));
        }

        let stripped = digits.trim_start_matches('0');
        VersionKey(if stripped.is_empty() {
            "0".to_string()
        } else {
            stripped.to_string()
        })
    }
}

impl Ord for VersionKey {
    fn cmp(&self, other: &Self) -> Ordering {
        // No leading zeros, so a longer digit string is a larger number.
        self.0
            .len()
            .cmp(&other.0.len())
            .then_with(|| self.0.cmp(&other.0))
    }
}

impl PartialOrd for VersionKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numeric_not_lexicographic() {
        let old = VersionKey::encode("3.2", GENERAL);
        let new = VersionKey::encode("3.10", GENERAL);
        assert!(old < new);
    }

    #[test]
    fn test_zero_padding_is_irrelevant() {
        assert_eq!(
            VersionKey::encode("1.02-1", GENERAL),
            VersionKey::encode("1.2-01", GENERAL)
        );
    }

    #[test]
    fn test_missing_groups_fill_with_zero() {
        assert_eq!(
            VersionKey::encode("6.6", GENERAL),
            VersionKey::encode("6.6.0.0", GENERAL)
        );
        assert!(VersionKey::encode("6.6", GENERAL) < VersionKey::encode("6.6.0.1", GENERAL));
    }

    #[test]
    fn test_general_truncates_past_group_count() {
        // Only the first 12 runs participate in the general key.
        let a = VersionKey::encode("1.2.3.4.5.6.7.8.9.10.11.12.13", GENERAL);
        let b = VersionKey::encode("1.2.3.4.5.6.7.8.9.10.11.12.99", GENERAL);
        assert_eq!(a, b);
    }

    #[test]
    fn test_kernel_keeps_runs_past_group_count() {
        // The kernel precision pads up to 5 groups but never drops runs,
        // so a sixth run still participates in the key.
        let a = VersionKey::encode("1.2.3.4.5.6", KERNEL);
        let b = VersionKey::encode("1.2.3.4.5.9", KERNEL);
        assert_ne!(a, b);
        assert!(a < b);
    }

    #[test]
    fn test_kernel_extra_group_extends_magnitude() {
        // Six 3-digit groups form an 18-digit number, which outweighs any
        // five-group (15-digit) key regardless of leading group values.
        let six = VersionKey::encode("6.6.0.0.0.3", KERNEL);
        let five = VersionKey::encode("7.0", KERNEL);
        assert!(six > five);
    }

    #[test]
    fn test_kernel_precision_is_coarser() {
        let key = VersionKey::encode("6.6.21-1", KERNEL);
        assert_eq!(key, VersionKey::encode("6.06.21.1", KERNEL));
        assert!(key < VersionKey::encode("6.7", KERNEL));
    }

    #[test]
    fn test_oversized_group_is_capped() {
        // 4 digits in a 3-digit kernel group saturates instead of
        // overflowing into the next position.
        let capped = VersionKey::encode("1.99999", KERNEL);
        assert_eq!(capped, VersionKey::encode("1.1000", KERNEL));
        assert!(VersionKey::encode("1.998", KERNEL) < capped);
    }

    #[test]
    fn test_no_digits_at_all() {
        assert_eq!(
            VersionKey::encode("latest", GENERAL),
            VersionKey::encode("", GENERAL)
        );
    }
}
