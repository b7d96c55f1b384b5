//! Release-dependent field sizes.

use encoding_rs::{Encoding, UTF_8, WINDOWS_1252};

use crate::error::{DtaError, Result};

/// Release written by [`crate::DtaWriter`].
pub const WRITE_RELEASE: u16 = 118;

/// Field widths for one format release.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Release(u16);

impl Release {
    pub fn new(number: u16) -> Result<Self> {
        match number {
            117..=119 => Ok(Self(number)),
            other => Err(DtaError::UnsupportedRelease {
                release: other.to_string(),
            }),
        }
    }

    pub fn number(self) -> u16 {
        self.0
    }

    /// Width of the variable count `K`.
    pub fn k_width(self) -> usize {
        if self.0 >= 119 { 4 } else { 2 }
    }

    /// Width of the observation count `N`.
    pub fn n_width(self) -> usize {
        if self.0 >= 118 { 8 } else { 4 }
    }

    /// Width of the dataset label length prefix.
    pub fn label_len_width(self) -> usize {
        if self.0 >= 118 { 2 } else { 1 }
    }

    /// Fixed width of variable and label-set names.
    pub fn name_len(self) -> usize {
        if self.0 >= 118 { 129 } else { 33 }
    }

    pub fn format_len(self) -> usize {
        if self.0 >= 118 { 57 } else { 49 }
    }

    pub fn variable_label_len(self) -> usize {
        if self.0 >= 118 { 321 } else { 81 }
    }

    pub fn sortlist_width(self) -> usize {
        if self.0 >= 119 { 4 } else { 2 }
    }

    /// Bytes of the variable part of a strL reference; the rest is the
    /// observation part.
    pub fn strl_v_width(self) -> usize {
        match self.0 {
            117 => 4,
            118 => 2,
            _ => 3,
        }
    }

    /// Width of the observation field in a GSO entry.
    pub fn gso_o_width(self) -> usize {
        if self.0 >= 118 { 8 } else { 4 }
    }

    /// Releases 118 and later store UTF-8; 117 uses Latin-1.
    pub fn encoding(self) -> &'static Encoding {
        if self.0 >= 118 { UTF_8 } else { WINDOWS_1252 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_release_bounds() {
        assert!(Release::new(116).is_err());
        assert!(Release::new(120).is_err());
        assert_eq!(Release::new(117).unwrap().name_len(), 33);
        assert_eq!(Release::new(118).unwrap().name_len(), 129);
        assert_eq!(Release::new(119).unwrap().k_width(), 4);
    }
}
