use super::item_information;
use crate::error::{EngineError, Result};
use crate::types::Item;

/// Maximum-information selection. Ties keep the first candidate seen.
pub fn select_next_item<'a, I>(theta: f64, candidates: I) -> Result<&'a Item>
where
    I: IntoIterator<Item = &'a Item>,
{
    let mut best: Option<(&'a Item, f64)> = None;

    for item in candidates {
        let info = item_information(theta, item);
        match best {
            Some((_, best_info)) if info <= best_info => {}
            _ => best = Some((item, info)),
        }
    }

    best.map(|(item, _)| item).ok_or(EngineError::NoItemsAvailable)
}
