use std::collections::HashMap;

/// Working collection of mapped items in source order, addressable by uri.
///
/// Items sharing a uri are all kept so validation can report the duplicate; updates go
/// to the first of them.
#[derive(Debug)]
pub(crate) struct UriIdentifiedItems<T> {
    items: Vec<T>,
    positions: HashMap<String, usize>,
}

impl<T> UriIdentifiedItems<T> {
    pub fn new() -> Self {
        Self {
            items: Vec::new(),
            positions: HashMap::new(),
        }
    }

    pub fn push(&mut self, uri: &str, item: T) {
        self.positions
            .entry(uri.to_string())
            .or_insert(self.items.len());
        self.items.push(item);
    }

    /// Applies `update` to the item with `uri`; returns `false` when there is none.
    pub fn update(&mut self, uri: &str, update: impl FnOnce(&mut T)) -> bool {
        match self.positions.get(uri) {
            Some(&position) => {
                update(&mut self.items[position]);
                true
            }
            None => false,
        }
    }

    pub fn into_items(self) -> Vec<T> {
        self.items
    }
}
