//! Alias file: `{"gpio_mapping": {"gpio1": "/dev/r_gpio0", ...}}`.

use std::{collections::BTreeMap, fs, path::Path};

use anyhow::Context;
use serde::Deserialize;

#[derive(Debug, Default, Deserialize)]
pub struct Mapping {
    #[serde(default)]
    gpio_mapping: BTreeMap<String, String>,
}

impl Mapping {
    pub fn load(path: &Path) -> anyhow::Result<Mapping> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("reading mapping file {}", path.display()))?;
        Mapping::from_json(&text).with_context(|| format!("parsing mapping file {}", path.display()))
    }

    pub fn from_json(text: &str) -> Result<Mapping, serde_json::Error> {
        serde_json::from_str(text)
    }

    /// Node name for `target`: the mapped device if `target` is an alias, else `target`
    /// itself. A leading `/dev/` is dropped either way.
    pub fn resolve<'a>(&'a self, target: &'a str) -> &'a str {
        let node = self.gpio_mapping.get(target).map_or(target, String::as_str);
        node.strip_prefix("/dev/").unwrap_or(node)
    }

    pub fn len(&self) -> usize {
        self.gpio_mapping.len()
    }

    pub fn is_empty(&self) -> bool {
        self.gpio_mapping.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aliases_resolve_to_node_names() {
        let mapping =
            Mapping::from_json(r#"{"gpio_mapping": {"gpio1": "/dev/r_gpio0", "led": "r_gpio1"}}"#)
                .unwrap();
        assert_eq!(mapping.len(), 2);
        assert_eq!(mapping.resolve("gpio1"), "r_gpio0");
        assert_eq!(mapping.resolve("led"), "r_gpio1");
        assert_eq!(mapping.resolve("/dev/r_gpio3"), "r_gpio3");
        assert_eq!(mapping.resolve("r_gpio2"), "r_gpio2");
    }

    #[test]
    fn missing_table_is_empty() {
        assert!(Mapping::from_json("{}").unwrap().is_empty());
        assert!(Mapping::from_json(r#"{"gpio_mapping": 3}"#).is_err());
    }
}
