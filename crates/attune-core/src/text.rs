//! Card text personalization.

use regex::Regex;

/// Replaces the generic "your partner" phrase with the secondary
/// participant's name.
#[derive(Debug, Clone)]
pub struct PartnerNameResolver {
    pattern: Regex,
}

impl PartnerNameResolver {
    pub fn new() -> Result<Self, regex::Error> {
        Ok(Self {
            pattern: Regex::new(r"(?i)\byour partner\b")?,
        })
    }

    pub fn resolve(&self, text: &str, partner_name: &str) -> String {
        let name = partner_name.trim();
        if name.is_empty() {
            return text.to_string();
        }
        self.pattern.replace_all(text, regex::NoExpand(name)).into_owned()
    }
}
