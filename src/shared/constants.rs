/// Language used when the request names none or an unsupported one
pub const DEFAULT_LANGUAGE: &str = "uk";

/// Languages a category translation may be written in
pub const SUPPORTED_LANGUAGES: &[&str] = &["uk", "en"];

/// Display name for a category lacking a translation in the requested language
pub const NO_TRANSLATION_MARKER: &str = "[no translation]";

/// Maximum accepted image upload in bytes (10MB)
pub const MAX_IMAGE_SIZE: usize = 10 * 1024 * 1024;
