//! Shared structs for the drafting workflow.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Editorial rubric of the desk. Serialized as the display labels the
/// frontend and the export document use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Category {
    #[serde(rename = "Диеты")]
    Diets,
    #[serde(rename = "Продукты")]
    Products,
    #[serde(rename = "Рецепты")]
    Recipes,
    #[serde(rename = "Гороскопы")]
    Horoscopes,
    #[serde(rename = "Лайфстайл")]
    Lifestyle,
}

impl Category {
    pub fn label(&self) -> &'static str {
        match self {
            Category::Diets => "Диеты",
            Category::Products => "Продукты",
            Category::Recipes => "Рецепты",
            Category::Horoscopes => "Гороскопы",
            Category::Lifestyle => "Лайфстайл",
        }
    }
}

/// One of the five independent content slots of a draft.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SectionKind {
    Body,
    Lead,
    Title,
    Seo,
    Image,
}

impl SectionKind {
    /// How many candidates a single generation asks for.
    pub fn variant_count(&self) -> usize {
        match self {
            SectionKind::Body => 2,
            _ => 3,
        }
    }

    /// Id prefix of variants produced for this section.
    pub fn id_prefix(&self) -> &'static str {
        match self {
            SectionKind::Seo => "seo",
            SectionKind::Image => "img",
            _ => "v",
        }
    }
}

impl fmt::Display for SectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SectionKind::Body => "body",
            SectionKind::Lead => "lead",
            SectionKind::Title => "title",
            SectionKind::Seo => "seo",
            SectionKind::Image => "image",
        };
        f.write_str(name)
    }
}

/// A candidate carries an id unique within the session.
pub trait Variant {
    fn id(&self) -> &str;
}

/// Candidate for body, lead and title sections. For the body section the
/// `text` field holds an HTML fragment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextVariant {
    pub id: String,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeoVariant {
    pub id: String,
    pub title: String,
    pub description: String,
}

/// Candidate illustration; `image_data` is a base64 data URI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageVariant {
    pub id: String,
    pub image_data: String,
}

impl Variant for TextVariant {
    fn id(&self) -> &str {
        &self.id
    }
}

impl Variant for SeoVariant {
    fn id(&self) -> &str {
        &self.id
    }
}

impl Variant for ImageVariant {
    fn id(&self) -> &str {
        &self.id
    }
}

/// Per-section workflow state. A generation batch replaces `variants`
/// wholesale; it never appends.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SectionState<V> {
    pub variants: Vec<V>,
    pub selected_id: Option<String>,
    pub loading: bool,
    pub error: Option<String>,
}

impl<V> Default for SectionState<V> {
    fn default() -> Self {
        Self {
            variants: Vec::new(),
            selected_id: None,
            loading: false,
            error: None,
        }
    }
}

/// System-prompt settings with an edit-dialog draft alongside the committed
/// value used for requests.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    pub committed_system_prompt: String,
    pub draft_system_prompt: String,
}

impl Settings {
    pub fn new(default_system_prompt: String) -> Self {
        Self {
            draft_system_prompt: default_system_prompt.clone(),
            committed_system_prompt: default_system_prompt,
        }
    }
}
