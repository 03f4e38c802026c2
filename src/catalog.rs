//! Named anime lists and calendars, read once at start-up.

use anyhow::{Context, Result};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

use crate::calendar::Calendar;
use crate::config::Config;
use crate::schedule::FilterList;

#[derive(Debug, Default)]
pub struct Catalog {
    lists: HashMap<String, FilterList>,
    calendars: HashMap<String, Calendar>,
}

impl Catalog {
    pub fn load(config: &Config) -> Result<Self> {
        let lists = read_file(&config.lists_path)?;
        let calendars = read_file(&config.calendars_path)?;
        Self::from_json(&lists, &calendars)
    }

    pub fn from_json(lists_json: &str, calendars_json: &str) -> Result<Self> {
        let raw_lists: HashMap<String, Vec<String>> =
            serde_json::from_str(lists_json).context("anime lists must map names to titles")?;
        let calendars: HashMap<String, Calendar> = serde_json::from_str(calendars_json)
            .context("calendars must map names to month records")?;

        let lists = raw_lists
            .into_iter()
            .map(|(name, titles)| {
                let list = FilterList::new(name.clone(), titles);
                (name, list)
            })
            .collect();

        Ok(Self { lists, calendars })
    }

    pub fn list(&self, name: &str) -> Option<&FilterList> {
        self.lists.get(name)
    }

    pub fn calendars(&self) -> &HashMap<String, Calendar> {
        &self.calendars
    }

    pub fn list_count(&self) -> usize {
        self.lists.len()
    }

    pub fn calendar_count(&self) -> usize {
        self.calendars.len()
    }
}

fn read_file(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const LISTS: &str = r#"{ "watching": ["Dandadan", "Frieren: Beyond Journey's End"], "empty": [] }"#;
    const CALENDARS: &str = r#"{
        "school": [
            { "month": "October", "days": [{ "day": 18, "events": ["Open day"] }, { "day": 19 }] },
            { "month": "November" }
        ]
    }"#;

    #[test]
    fn parses_lists_and_calendars() {
        let catalog = Catalog::from_json(LISTS, CALENDARS).unwrap();
        assert_eq!(catalog.list_count(), 2);
        assert_eq!(catalog.calendar_count(), 1);

        let watching = catalog.list("watching").unwrap();
        assert_eq!(watching.name, "watching");
        assert!(watching.allows("Dandadan"));
        assert!(catalog.list("empty").unwrap().titles.is_empty());
        assert!(catalog.list("missing").is_none());

        let school = &catalog.calendars()["school"];
        assert_eq!(school[0].days[1].events, Vec::<String>::new());
        assert!(school[1].days.is_empty());
    }

    #[test]
    fn malformed_files_are_errors() {
        assert!(Catalog::from_json(r#"{ "watching": "Dandadan" }"#, CALENDARS).is_err());
        assert!(Catalog::from_json(LISTS, r#"{ "school": [{ "days": [] }] }"#).is_err());
        assert!(Catalog::from_json("not json", CALENDARS).is_err());
    }

    #[test]
    fn shipped_data_files_parse() {
        let lists = include_str!("../data/lists.json");
        let calendars = include_str!("../data/calendars.json");
        let catalog = Catalog::from_json(lists, calendars).unwrap();
        assert!(catalog.list_count() > 0);
        assert!(catalog.calendar_count() > 0);
    }
}
