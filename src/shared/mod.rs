pub mod constants;
pub mod language;
#[cfg(test)]
pub mod test_helpers;
pub mod types;
pub mod validation;
