//! Assembly of the natural-language instruction sent with every generation
//! request: topic, category (or the generic fallback), the section action,
//! and the explicit difference clause on regeneration.

use crate::studio::types::{Category, SectionKind};
use crate::texts::Texts;

pub fn build_instruction(
    texts: &Texts,
    topic: &str,
    category: Option<Category>,
    section: SectionKind,
    regenerate: bool,
) -> String {
    let category_label = category
        .map(|c| c.label())
        .unwrap_or(texts.prompts.fallback_category.as_str());
    let action = texts.action_for(section, regenerate);

    let mut instruction = format!(
        "Тема: \"{}\". Категория: {}. Действие: {}.",
        topic, category_label, action
    );
    if regenerate {
        instruction.push(' ');
        instruction.push_str(&texts.prompts.regeneration_clause);
    }
    instruction
}
