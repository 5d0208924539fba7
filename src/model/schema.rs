use std::collections::BTreeMap;

use super::{Element, Selection};

pub const ROOT: &str = "$root";
pub const TEXT: &str = "$text";
pub const DEFAULT_BLOCK: &str = "paragraph";

/// Rules for one element name.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SchemaItem {
    pub allow_in: Vec<String>,
    pub allow_text: bool,
    pub is_limit: bool,
    pub is_block: bool,
    pub is_object: bool,
}

impl SchemaItem {
    /// A block that holds text, such as a paragraph or heading.
    pub fn text_block() -> Self {
        Self {
            allow_text: true,
            is_block: true,
            ..Self::default()
        }
    }

    /// A container for other blocks, such as a block quote.
    pub fn container() -> Self {
        Self::default()
    }

    /// A self-contained element that is selected and removed as a whole.
    pub fn object() -> Self {
        Self {
            is_block: true,
            is_object: true,
            is_limit: true,
            ..Self::default()
        }
    }

    pub fn limit(mut self) -> Self {
        self.is_limit = true;
        self
    }

    pub fn allow_in<I, S>(mut self, parents: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.allow_in.extend(parents.into_iter().map(Into::into));
        self
    }
}

/// Which elements may appear where, and which of them bound editing.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Schema {
    items: BTreeMap<String, SchemaItem>,
    default_block: String,
}

impl Schema {
    /// A schema that only knows the root.
    pub fn empty() -> Self {
        let mut items = BTreeMap::new();
        items.insert(ROOT.to_string(), SchemaItem::container().limit());
        Self {
            items,
            default_block: DEFAULT_BLOCK.to_string(),
        }
    }

    pub fn register(&mut self, name: impl Into<String>, item: SchemaItem) {
        self.items.insert(name.into(), item);
    }

    pub fn with(mut self, name: impl Into<String>, item: SchemaItem) -> Self {
        self.register(name, item);
        self
    }

    pub fn with_default_block(mut self, name: impl Into<String>) -> Self {
        self.default_block = name.into();
        self
    }

    pub fn item(&self, name: &str) -> Option<&SchemaItem> {
        self.items.get(name)
    }

    pub fn default_block(&self) -> &str {
        &self.default_block
    }

    /// Whether `child` (an element name or [`TEXT`]) may be placed directly
    /// inside an element named `parent`.
    pub fn check_child(&self, parent: &str, child: &str) -> bool {
        if child == TEXT {
            return self.item(parent).is_some_and(|item| item.allow_text);
        }
        self.item(child)
            .is_some_and(|item| item.allow_in.iter().any(|allowed| allowed == parent))
    }

    pub fn is_limit(&self, name: &str) -> bool {
        name == ROOT || self.item(name).is_some_and(|item| item.is_limit || item.is_object)
    }

    pub fn is_block(&self, name: &str) -> bool {
        self.item(name).is_some_and(|item| item.is_block)
    }

    pub fn is_object(&self, name: &str) -> bool {
        self.item(name).is_some_and(|item| item.is_object)
    }

    /// Path of the nearest limit element containing every range of the
    /// selection. The root is the outermost limit.
    pub fn limit_element(&self, root: &Element, selection: &Selection) -> Vec<usize> {
        let mut result: Option<Vec<usize>> = None;
        for range in selection.ranges() {
            let limit = self.limit_ancestor(root, range.common_ancestor());
            result = Some(match result {
                None => limit,
                Some(previous) => previous
                    .iter()
                    .zip(limit.iter())
                    .take_while(|(a, b)| a == b)
                    .map(|(a, _)| *a)
                    .collect(),
            });
        }
        self.limit_ancestor(root, result.unwrap_or_default())
    }

    fn limit_ancestor(&self, root: &Element, mut path: Vec<usize>) -> Vec<usize> {
        while !path.is_empty() {
            if root
                .descendant(&path)
                .is_some_and(|element| self.is_limit(element.name()))
            {
                break;
            }
            path.pop();
        }
        path
    }
}

impl Default for Schema {
    /// Block structure used by documents imported from `tdoc`, plus tables
    /// and horizontal lines.
    fn default() -> Self {
        const BLOCK_PARENTS: [&str; 3] = [ROOT, "blockQuote", "tableCell"];
        Schema::empty()
            .with(DEFAULT_BLOCK, SchemaItem::text_block().allow_in(BLOCK_PARENTS))
            .with("heading1", SchemaItem::text_block().allow_in([ROOT]))
            .with("heading2", SchemaItem::text_block().allow_in([ROOT]))
            .with("heading3", SchemaItem::text_block().allow_in([ROOT]))
            .with("codeBlock", SchemaItem::text_block().allow_in(BLOCK_PARENTS))
            .with("listItem", SchemaItem::text_block().allow_in(BLOCK_PARENTS))
            .with("blockQuote", SchemaItem::container().allow_in([ROOT]))
            .with("horizontalLine", SchemaItem::object().allow_in(BLOCK_PARENTS))
            .with("table", SchemaItem::object().allow_in([ROOT, "blockQuote"]))
            .with("tableRow", SchemaItem::container().limit().allow_in(["table"]))
            .with("tableCell", SchemaItem::container().limit().allow_in(["tableRow"]))
    }
}
