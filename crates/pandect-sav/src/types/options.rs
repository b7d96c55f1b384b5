//! Reader and writer options.

use chrono::NaiveDateTime;

/// Case data compression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Compression {
    /// Raw 8-byte slots.
    None,
    /// Bytecode compression (header code 1).
    #[default]
    Bytecode,
}

impl Compression {
    pub fn code(self) -> i32 {
        match self {
            Self::None => 0,
            Self::Bytecode => 1,
        }
    }
}

/// Options for reading `.sav` files.
#[derive(Debug, Clone)]
pub struct SavReaderOptions {
    /// Replace user-defined missing values with nulls (default: true).
    pub user_missing_as_null: bool,
    /// Encoding label used when the file does not declare one.
    pub fallback_encoding: Option<String>,
}

impl Default for SavReaderOptions {
    fn default() -> Self {
        Self {
            user_missing_as_null: true,
            fallback_encoding: None,
        }
    }
}

impl SavReaderOptions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Keep user-missing values as ordinary data.
    #[must_use]
    pub fn keep_user_missing(mut self) -> Self {
        self.user_missing_as_null = false;
        self
    }

    #[must_use]
    pub fn with_fallback_encoding(mut self, label: impl Into<String>) -> Self {
        self.fallback_encoding = Some(label.into());
        self
    }
}

/// Options for writing `.sav` files. Output is always UTF-8 and little-endian.
#[derive(Debug, Clone)]
pub struct SavWriterOptions {
    pub compression: Compression,
    /// Product string in the file header (max 60 bytes after the prefix).
    pub product: String,
    /// Creation timestamp (default: current local time).
    pub created: Option<NaiveDateTime>,
}

impl Default for SavWriterOptions {
    fn default() -> Self {
        Self {
            compression: Compression::Bytecode,
            product: concat!("pandect ", env!("CARGO_PKG_VERSION")).to_string(),
            created: None,
        }
    }
}

impl SavWriterOptions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_compression(mut self, compression: Compression) -> Self {
        self.compression = compression;
        self
    }

    #[must_use]
    pub fn uncompressed(self) -> Self {
        self.with_compression(Compression::None)
    }

    #[must_use]
    pub fn with_product(mut self, product: impl Into<String>) -> Self {
        self.product = product.into();
        self
    }

    #[must_use]
    pub fn with_created(mut self, datetime: NaiveDateTime) -> Self {
        self.created = Some(datetime);
        self
    }
}
