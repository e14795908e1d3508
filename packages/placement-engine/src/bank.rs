//! Immutable calibrated item pool, shared between sessions through `Arc`.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{EngineError, Result};
use crate::types::{Category, Item};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "Vec<Item>", into = "Vec<Item>")]
pub struct ItemBank {
    items: Vec<Item>,
    index: HashMap<String, usize>,
}

impl ItemBank {
    /// Validate every item and reject duplicate ids
    pub fn new(items: Vec<Item>) -> Result<Self> {
        let mut index = HashMap::with_capacity(items.len());
        for (pos, item) in items.iter().enumerate() {
            item.validate()?;
            if index.insert(item.id.clone(), pos).is_some() {
                return Err(EngineError::DuplicateItem(item.id.clone()));
            }
        }
        debug!(items = items.len(), "item bank loaded");
        Ok(Self { items, index })
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let items: Vec<Item> =
            serde_json::from_str(json).map_err(|e| EngineError::Config(e.to_string()))?;
        Self::new(items)
    }

    pub fn get(&self, id: &str) -> Option<&Item> {
        self.index.get(id).map(|&pos| &self.items[pos])
    }

    pub fn require(&self, id: &str) -> Result<&Item> {
        self.get(id)
            .ok_or_else(|| EngineError::UnknownItem(id.to_string()))
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn by_category(&self, category: Category) -> impl Iterator<Item = &Item> {
        self.items.iter().filter(move |item| item.category == category)
    }
}

impl TryFrom<Vec<Item>> for ItemBank {
    type Error = EngineError;

    fn try_from(items: Vec<Item>) -> Result<Self> {
        Self::new(items)
    }
}

impl From<ItemBank> for Vec<Item> {
    fn from(bank: ItemBank) -> Self {
        bank.items
    }
}
