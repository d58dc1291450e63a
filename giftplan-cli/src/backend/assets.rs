//! Reference data loaded from a directory of JSON assets.
//!
//! Layout:
//!
//! ```text
//! <root>/student/<locale>.json
//! <root>/gift/sr/<locale>.json
//! <root>/gift/ssr/<locale>.json
//! <root>/bondExpTable.json
//! <root>/<config>.json          (optional)
//! ```

use giftplan_core::{BondExpTable, CharacterRoster, DataLoader, Gift, GiftCatalog, Rarity};
use serde::de::DeserializeOwned;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum AssetError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("failed to parse {path}: {source}")]
    Json {
        path: String,
        source: serde_json::Error,
    },
}

pub struct AssetLoader {
    root: PathBuf,
}

impl AssetLoader {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn read(&self, relative: &Path) -> Result<String, AssetError> {
        let path = self.root.join(relative);
        fs::read_to_string(&path).map_err(|source| AssetError::Io {
            path: path.display().to_string(),
            source,
        })
    }

    fn json_error(&self, relative: &Path, source: serde_json::Error) -> AssetError {
        AssetError::Json {
            path: self.root.join(relative).display().to_string(),
            source,
        }
    }
}

impl DataLoader for AssetLoader {
    type Error = AssetError;

    fn load_characters(&self, locale: &str) -> Result<CharacterRoster, Self::Error> {
        let relative = PathBuf::from("student").join(format!("{locale}.json"));
        let json = self.read(&relative)?;
        CharacterRoster::from_json(&json).map_err(|e| self.json_error(&relative, e))
    }

    fn load_gifts(&self, rarity: Rarity, locale: &str) -> Result<Vec<Gift>, Self::Error> {
        let relative = PathBuf::from("gift")
            .join(rarity.key())
            .join(format!("{locale}.json"));
        let json = self.read(&relative)?;
        GiftCatalog::parse_list(rarity, &json).map_err(|e| self.json_error(&relative, e))
    }

    fn load_bond_exp_table(&self) -> Result<BondExpTable, Self::Error> {
        let relative = PathBuf::from("bondExpTable.json");
        let json = self.read(&relative)?;
        BondExpTable::from_json(&json).map_err(|e| self.json_error(&relative, e))
    }

    fn load_config<T>(&self, config_name: &str) -> Result<T, Self::Error>
    where
        T: DeserializeOwned,
    {
        let relative = PathBuf::from(format!("{config_name}.json"));
        // A missing config file reads as JSON null so optional configs fall back.
        let json = if self.root.join(&relative).exists() {
            self.read(&relative)?
        } else {
            "null".to_string()
        };
        serde_json::from_str(&json).map_err(|e| self.json_error(&relative, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use giftplan_core::PlannerConfig;

    fn write(root: &Path, relative: &str, body: &str) {
        let path = root.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, body).unwrap();
    }

    #[test]
    fn loads_every_table_for_a_locale() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "student/en.json", r#"[{"id": 1, "favor": {}}]"#);
        write(dir.path(), "gift/sr/en.json", r#"[{"id": 1, "name": "Tea"}]"#);
        write(dir.path(), "gift/ssr/en.json", "[]");
        write(dir.path(), "bondExpTable.json", r#"[{"rank": 1, "exp": 15}]"#);

        let loader = AssetLoader::new(dir.path());
        assert_eq!(loader.load_characters("en").unwrap().len(), 1);
        assert_eq!(loader.load_gifts(Rarity::Sr, "en").unwrap()[0].name, "Tea");
        assert!(loader.load_gifts(Rarity::Ssr, "en").unwrap().is_empty());
        assert_eq!(loader.load_bond_exp_table().unwrap().exp_required(1), Some(15));
        assert!(matches!(
            loader.load_characters("ja"),
            Err(AssetError::Io { .. })
        ));
    }

    #[test]
    fn optional_config_falls_back_to_none() {
        let dir = tempfile::tempdir().unwrap();
        let loader = AssetLoader::new(dir.path());
        let config: Option<PlannerConfig> = loader.load_config("planner").unwrap();
        assert!(config.is_none());

        write(dir.path(), "planner.json", r#"{"locale": "en"}"#);
        let config: Option<PlannerConfig> = loader.load_config("planner").unwrap();
        assert_eq!(config.unwrap().locale, "en");
    }

    #[test]
    fn malformed_json_names_the_file() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "bondExpTable.json", "{not json");
        let err = AssetLoader::new(dir.path())
            .load_bond_exp_table()
            .unwrap_err();
        assert!(err.to_string().contains("bondExpTable.json"));
    }
}
