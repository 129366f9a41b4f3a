//! Keyword and sector rules applied while loading symbols.
//!
//! Configured under `[symbol_rules]`:
//!
//! ```ini
//! [symbol_rules]
//! exclude = اوراق:bond, حق:rights, اختیار:option
//! allow_sectors = Metals, Chemicals
//! ```

use crate::domain::error::MarketscanError;
use crate::ports::config_port::ConfigPort;
use crate::ports::data_port::SymbolInfo;

pub const SECTION: &str = "symbol_rules";
pub const SECTOR_CATEGORY: &str = "sector";

#[derive(Debug, Clone, PartialEq)]
pub struct Exclusion {
    pub pattern: String,
    pub category: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SymbolRuleSet {
    /// Checked in order; the first match wins.
    pub exclusions: Vec<Exclusion>,
    /// Empty means every sector is allowed.
    pub allowed_sectors: Vec<String>,
}

fn invalid(key: &str, reason: String) -> MarketscanError {
    MarketscanError::ConfigInvalid {
        section: SECTION.to_string(),
        key: key.to_string(),
        reason,
    }
}

impl SymbolRuleSet {
    pub fn from_config(config: &dyn ConfigPort) -> Result<Self, MarketscanError> {
        let mut rules = Self::default();

        if let Some(raw) = config.get_string(SECTION, "exclude") {
            for token in raw.split(',') {
                let (pattern, category) = token
                    .split_once(':')
                    .map(|(p, c)| (p.trim(), c.trim()))
                    .ok_or_else(|| {
                        invalid("exclude", format!("'{}' is not pattern:category", token.trim()))
                    })?;
                if pattern.is_empty() || category.is_empty() {
                    return Err(invalid(
                        "exclude",
                        format!("'{}' has an empty pattern or category", token.trim()),
                    ));
                }
                rules.exclusions.push(Exclusion {
                    pattern: pattern.to_string(),
                    category: category.to_string(),
                });
            }
        }

        if let Some(raw) = config.get_string(SECTION, "allow_sectors") {
            rules.allowed_sectors = raw
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect();
        }
        Ok(rules)
    }

    /// Category of the rule that excludes `info`, or `None` when it is kept.
    /// An unknown sector never fails the allow-list.
    pub fn exclusion_for(&self, info: &SymbolInfo) -> Option<&str> {
        let symbol = info.symbol.to_lowercase();
        let name = info.name.as_deref().map(str::to_lowercase);
        let hit = self.exclusions.iter().find(|rule| {
            let pattern = rule.pattern.to_lowercase();
            symbol.contains(&pattern) || name.as_deref().is_some_and(|n| n.contains(&pattern))
        });
        if let Some(rule) = hit {
            return Some(&rule.category);
        }

        match &info.sector {
            Some(sector)
                if !self.allowed_sectors.is_empty()
                    && !self
                        .allowed_sectors
                        .iter()
                        .any(|a| a.eq_ignore_ascii_case(sector)) =>
            {
                Some(SECTOR_CATEGORY)
            }
            _ => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.exclusions.is_empty() && self.allowed_sectors.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::file_config_adapter::FileConfigAdapter;

    fn info(symbol: &str, name: Option<&str>, sector: Option<&str>) -> SymbolInfo {
        SymbolInfo {
            symbol: symbol.to_string(),
            name: name.map(str::to_string),
            sector: sector.map(str::to_string),
        }
    }

    fn rules(content: &str) -> SymbolRuleSet {
        SymbolRuleSet::from_config(&FileConfigAdapter::from_string(content).unwrap()).unwrap()
    }

    #[test]
    fn parses_ordered_exclusions_and_sectors() {
        let r = rules("[symbol_rules]\nexclude = Bond:fixed, ETF:fund\nallow_sectors = Metals, Banks\n");
        assert_eq!(r.exclusions.len(), 2);
        assert_eq!(r.exclusions[1].pattern, "ETF");
        assert_eq!(r.allowed_sectors, vec!["Metals", "Banks"]);
    }

    #[test]
    fn first_matching_rule_wins() {
        let r = rules("[symbol_rules]\nexclude = gold:commodity, fund:fund\n");
        let gold_fund = info("X1", Some("Gold Fund"), None);
        assert_eq!(r.exclusion_for(&gold_fund), Some("commodity"));
    }

    #[test]
    fn matches_symbol_or_name_case_insensitively() {
        let r = rules("[symbol_rules]\nexclude = etf:fund\n");
        assert_eq!(r.exclusion_for(&info("KETF1", None, None)), Some("fund"));
        assert_eq!(r.exclusion_for(&info("K1", Some("Big ETF"), None)), Some("fund"));
        assert_eq!(r.exclusion_for(&info("FOLD", Some("Steel"), None)), None);
    }

    #[test]
    fn non_ascii_patterns_match_names() {
        let r = rules("[symbol_rules]\nexclude = اوراق:bond\n");
        assert_eq!(
            r.exclusion_for(&info("A1", Some("اوراق مرابحه"), None)),
            Some("bond")
        );
    }

    #[test]
    fn sector_allow_list_applies_to_known_sectors_only() {
        let r = rules("[symbol_rules]\nallow_sectors = Metals\n");
        assert_eq!(r.exclusion_for(&info("A", None, Some("metals"))), None);
        assert_eq!(
            r.exclusion_for(&info("B", None, Some("Banks"))),
            Some(SECTOR_CATEGORY)
        );
        assert_eq!(r.exclusion_for(&info("C", None, None)), None);
    }

    #[test]
    fn malformed_exclusion_is_rejected() {
        let config = FileConfigAdapter::from_string("[symbol_rules]\nexclude = bond\n").unwrap();
        let err = SymbolRuleSet::from_config(&config).unwrap_err();
        assert!(matches!(err, MarketscanError::ConfigInvalid { key, .. } if key == "exclude"));
    }

    #[test]
    fn empty_config_keeps_everything() {
        let r = rules("");
        assert!(r.is_empty());
        assert_eq!(r.exclusion_for(&info("ANY", Some("x"), Some("y"))), None);
    }
}
