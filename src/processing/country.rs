//! ISO 3166-1 country name to alpha-2 code lookup.

use serde::Deserialize;
use std::error::Error;

const COUNTRY_TABLE: &str = include_str!("../../data/countries.json");

#[derive(Deserialize, Debug, Clone)]
struct Country {
    alpha_2: String,
    name: String,
    common_name: Option<String>,
    official_name: Option<String>,
}

impl Country {
    fn names(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.name.as_str())
            .chain(self.common_name.as_deref())
            .chain(self.official_name.as_deref())
    }
}

/// The embedded ISO country table.
#[derive(Debug, Clone)]
pub struct CountryCodes {
    countries: Vec<Country>,
}

impl CountryCodes {
    /// Decode the table compiled into the binary.
    pub fn load() -> Result<Self, Box<dyn Error>> {
        let mut deserializer = serde_json::Deserializer::from_str(COUNTRY_TABLE);
        let countries: Vec<Country> = serde_path_to_error::deserialize(&mut deserializer)
            .map_err(|e| format!("Error parsing country table: path={} error={}", e.path(), e))?;
        log::debug!("CountryCodes::load() {} countries", countries.len());
        Ok(CountryCodes { countries })
    }

    /// Alpha-2 code for a country name.
    ///
    /// The ISO short name is tried exactly first, then any known name
    /// ignoring case and surrounding whitespace.
    pub fn alpha2(&self, name: &str) -> Option<&str> {
        if let Some(c) = self.countries.iter().find(|c| c.name == name) {
            return Some(&c.alpha_2);
        }
        let wanted = name.trim();
        if wanted.is_empty() {
            return None;
        }
        self.countries
            .iter()
            .find(|c| c.names().any(|n| n.eq_ignore_ascii_case(wanted)))
            .map(|c| c.alpha_2.as_str())
    }

    pub fn len(&self) -> usize {
        self.countries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.countries.is_empty()
    }
}
