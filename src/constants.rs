//! Shared field-size limits and catalog constants

/// Maximum length for names, titles and imprints
pub const CHAR_MAX_LEN: u64 = 200;

/// Maximum length for a book summary
pub const TEXT_MAX_LEN: u64 = 1000;

/// Maximum length for an ISBN (13-character form)
pub const ISBN_MAX_LEN: u64 = 13;

/// Books per page on the catalog book list
pub const CATALOG_PAGE_SIZE: i64 = 2;

/// Number of genre names joined into a book's display string
pub const GENRE_DISPLAY_LIMIT: usize = 3;
