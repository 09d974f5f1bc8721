//! Localized texts: section action descriptions, user-facing notices and the
//! default system prompt, embedded as TOML next to this module.

use crate::studio::types::SectionKind;
use anyhow::Context;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct Texts {
    pub notices: Notices,
    pub actions: Actions,
    pub prompts: Prompts,
}

/// Inline notices shown next to the triggering control.
#[derive(Debug, Clone, Deserialize)]
pub struct Notices {
    pub no_api_key: String,
    pub topic_required: String,
    pub generation_failed: String,
    pub export_incomplete: String,
}

/// Per-section action descriptions embedded into generation instructions.
#[derive(Debug, Clone, Deserialize)]
pub struct Actions {
    pub body: String,
    pub lead: String,
    pub title: String,
    pub seo: String,
    pub image: String,
    pub image_regenerate: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Prompts {
    pub fallback_category: String,
    pub regeneration_clause: String,
    pub default_system: String,
}

impl Texts {
    pub fn load() -> anyhow::Result<Self> {
        toml::from_str(include_str!("./texts.toml")).context("embedded texts.toml is malformed")
    }

    /// Action clause for a section. Only the image section words its
    /// regeneration differently.
    pub fn action_for(&self, section: SectionKind, regenerate: bool) -> &str {
        match section {
            SectionKind::Body => &self.actions.body,
            SectionKind::Lead => &self.actions.lead,
            SectionKind::Title => &self.actions.title,
            SectionKind::Seo => &self.actions.seo,
            SectionKind::Image if regenerate => &self.actions.image_regenerate,
            SectionKind::Image => &self.actions.image,
        }
    }

    pub fn default_system_prompt(&self) -> String {
        self.prompts.default_system.trim().to_string()
    }
}
