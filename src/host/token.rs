use std::fmt;

use strum::{Display, EnumIter};

/// The kind of symbol a token refers to.
///
/// Stored in the high byte of a [`SymbolToken`]; the tag values are stable
/// across image versions even when every name in the image changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter)]
pub enum SymbolKind {
    /// A class in the loaded image
    Class,
    /// A field declared on a class
    Field,
    /// A regular callable method
    Method,
    /// A constructor of a class
    Constructor,
}

impl SymbolKind {
    /// Returns the tag byte stored in a token's high byte for this kind
    #[must_use]
    pub fn tag(&self) -> u8 {
        match self {
            SymbolKind::Class => 0x02,
            SymbolKind::Field => 0x04,
            SymbolKind::Method => 0x06,
            SymbolKind::Constructor => 0x0B,
        }
    }

    /// Parses a tag byte back into a kind, `None` for unknown tags
    #[must_use]
    pub fn from_tag(tag: u8) -> Option<SymbolKind> {
        match tag {
            0x02 => Some(SymbolKind::Class),
            0x04 => Some(SymbolKind::Field),
            0x06 => Some(SymbolKind::Method),
            0x0B => Some(SymbolKind::Constructor),
            _ => None,
        }
    }

    /// Returns true if symbols of this kind are invokable
    #[must_use]
    pub fn is_callable(&self) -> bool {
        matches!(self, SymbolKind::Method | SymbolKind::Constructor)
    }
}

/// A token identifying one symbol within the currently loaded image.
///
/// Tokens consist of a 32-bit value where:
/// - The high byte (bits 24-31) indicates the symbol kind
/// - The low 24 bits (bits 0-23) indicate the row index within that kind
///
/// Tokens are only meaningful for the image that assigned them; after the
/// target binary changes (an app update), tokens must be re-derived by
/// resolving fingerprints against the new image.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SymbolToken(u32);

impl SymbolToken {
    /// Creates a new token for the given kind and row index.
    ///
    /// The row is truncated to 24 bits, matching the packed layout.
    #[must_use]
    pub fn new(kind: SymbolKind, row: u32) -> Self {
        SymbolToken((u32::from(kind.tag()) << 24) | (row & 0x00FF_FFFF))
    }

    /// Returns the raw token value
    #[must_use]
    pub fn value(&self) -> u32 {
        self.0
    }

    /// Extracts the symbol kind from the token (high byte)
    ///
    /// Returns `None` when the high byte is not a known kind tag, which can
    /// only happen for tokens not produced by this crate.
    #[must_use]
    pub fn kind(&self) -> Option<SymbolKind> {
        SymbolKind::from_tag((self.0 >> 24) as u8)
    }

    /// Extracts the row index from the token (low 24 bits)
    #[must_use]
    pub fn row(&self) -> u32 {
        self.0 & 0x00FF_FFFF
    }

    /// Returns true if this is a null token (value 0)
    #[must_use]
    pub fn is_null(&self) -> bool {
        self.0 == 0
    }
}

impl From<SymbolToken> for u32 {
    fn from(token: SymbolToken) -> Self {
        token.0
    }
}

impl fmt::Debug for SymbolToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "SymbolToken(0x{:08x}, kind: 0x{:02x}, row: {})",
            self.0,
            self.0 >> 24,
            self.row()
        )
    }
}

impl fmt::Display for SymbolToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:08x}", self.0)
    }
}
