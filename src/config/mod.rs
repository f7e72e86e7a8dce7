//! Export configuration: filter selection, account renames, category
//! mappings. Loaded from a JSON file and validated before any
//! transformation pass runs.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::errors::ExportError;
use crate::filter::Filter;

const CONFIG_FILE_NAME: &str = ".ynabexportrc";

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Configuration {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active_filter: Option<FilterRef>,
    #[serde(default)]
    pub filters: BTreeMap<String, serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,
    #[serde(default)]
    pub account_name_map: AccountNameMap,
    #[serde(default)]
    pub mappings: Vec<CategoryMapping>,
    #[serde(default)]
    pub meta_accounts: Vec<String>,
    #[serde(default = "default_beancount_tags")]
    pub beancount_tags: bool,
}

fn default_beancount_tags() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
/// Either the name of a configured filter or an inline expression.
pub enum FilterRef {
    Name(String),
    Inline(serde_json::Value),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchReplace {
    pub search: String,
    pub replace: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
/// Account rename table. The array form preserves rule order; the keyed
/// form is unordered, so its keys must be disjoint for the outcome to be
/// well defined (enforced by [`Configuration::validate`]).
pub enum AccountNameMap {
    Ordered(Vec<SearchReplace>),
    Keyed(BTreeMap<String, String>),
}

impl Default for AccountNameMap {
    fn default() -> Self {
        AccountNameMap::Ordered(Vec::new())
    }
}

impl AccountNameMap {
    /// Rules in application order.
    pub fn rules(&self) -> Vec<(&str, &str)> {
        match self {
            AccountNameMap::Ordered(rules) => rules
                .iter()
                .map(|r| (r.search.as_str(), r.replace.as_str()))
                .collect(),
            AccountNameMap::Keyed(map) => {
                map.iter().map(|(k, v)| (k.as_str(), v.as_str())).collect()
            }
        }
    }

    fn validate(&self) -> Result<(), ExportError> {
        let AccountNameMap::Keyed(map) = self else {
            return Ok(());
        };
        let keys: Vec<&String> = map.keys().collect();
        for (i, a) in keys.iter().enumerate() {
            for b in &keys[i + 1..] {
                if a.starts_with(b.as_str()) || b.starts_with(a.as_str()) {
                    return Err(ExportError::Config(format!(
                        "account_name_map keys `{a}` and `{b}` overlap; \
                         use the ordered array form to control precedence"
                    )));
                }
            }
        }
        Ok(())
    }
}

/// A rule `(matcher, target)`: the first matcher satisfied by an entry's
/// payee/memo rewrites an uncategorized split to the target path.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryMapping(pub TransactionMatcher, pub String);

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct TransactionMatcher {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payee: Option<ScalarOrSet>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub memo: Option<ScalarOrSet>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ScalarOrSet {
    One(String),
    Many(Vec<String>),
}

impl ScalarOrSet {
    fn admits(&self, value: Option<&str>) -> bool {
        match (self, value) {
            (ScalarOrSet::One(expected), Some(v)) => expected == v,
            (ScalarOrSet::Many(set), Some(v)) => set.iter().any(|e| e == v),
            (_, None) => false,
        }
    }
}

impl TransactionMatcher {
    /// A constraint left out of the matcher admits everything.
    pub fn matches(&self, payee: Option<&str>, memo: Option<&str>) -> bool {
        if let Some(m) = &self.payee {
            if !m.admits(payee) {
                return false;
            }
        }
        if let Some(m) = &self.memo {
            if !m.admits(memo) {
                return false;
            }
        }
        true
    }
}

impl Configuration {
    pub fn load(path: &Path) -> Result<Self, ExportError> {
        let data = fs::read_to_string(path)?;
        let config: Configuration = serde_json::from_str(&data)?;
        config.validate()?;
        Ok(config)
    }

    pub fn default_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(CONFIG_FILE_NAME)
    }

    /// Fatal checks that must pass before any transformation runs.
    pub fn validate(&self) -> Result<(), ExportError> {
        self.account_name_map.validate()?;
        self.resolve_filter()?;
        Ok(())
    }

    /// Resolves the active filter (named or inline) into a parsed
    /// expression. An unknown name or malformed expression is fatal.
    pub fn resolve_filter(&self) -> Result<Option<Filter>, ExportError> {
        let expression = match &self.active_filter {
            None => return Ok(None),
            Some(FilterRef::Inline(value)) => value,
            Some(FilterRef::Name(name)) => self.filters.get(name).ok_or_else(|| {
                ExportError::Config(format!("active_filter references unknown filter `{name}`"))
            })?,
        };
        Filter::parse(expression).map(Some)
    }
}
