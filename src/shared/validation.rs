use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    /// Regex for validating category URL slugs
    /// Must be lowercase alphanumeric with single hyphens between segments
    /// - Valid: "tools", "hand-tools", "power-tools-2"
    /// - Invalid: "-tools", "tools-", "hand--tools", "Tools", "hand_tools"
    pub static ref SLUG_REGEX: Regex = Regex::new(r"^[a-z0-9]+(?:-[a-z0-9]+)*$").unwrap();
}
