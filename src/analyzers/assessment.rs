//! The comparative statement attached to a course metric.
//!
//! Time and grade share one shape: a [`Category`], the sentence shown for it, and the
//! numeric deviation it was derived from. Each metric supplies its own [`Statements`].

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Warn,
    Neutral,
    Relax,
}

impl Category {
    /// Display color used by the report templates.
    pub fn color(self) -> &'static str {
        match self {
            Category::Warn => "red",
            Category::Neutral => "black",
            Category::Relax => "green",
        }
    }
}

/// Sentences for each category of one metric.
#[derive(Debug, Clone, Copy)]
pub struct Statements {
    pub warn: &'static str,
    pub neutral: &'static str,
    pub relax: &'static str,
}

impl Statements {
    pub fn for_category(&self, category: Category) -> &'static str {
        match category {
            Category::Warn => self.warn,
            Category::Neutral => self.neutral,
            Category::Relax => self.relax,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Assessment {
    pub category: Category,
    pub color: String,
    pub statement: String,
    pub deviation: f64,
}

impl Assessment {
    pub fn new(category: Category, statements: &Statements, deviation: f64) -> Self {
        Self {
            category,
            color: category.color().to_string(),
            statement: statements.for_category(category).to_string(),
            deviation,
        }
    }
}
