//! Export document assembly and filename derivation.

use crate::studio::state::StudioState;
use crate::studio::types::Category;
use chrono::Utc;
use regex::Regex;
use serde::Serialize;
use std::sync::OnceLock;

const FILENAME_PREFIX: &str = "chiia_article_";
const FALLBACK_BASENAME: &str = "export";

/// The selected SEO pair, exactly as chosen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SeoSelection {
    pub title: String,
    pub description: String,
}

/// The assembled selection set. Fields are `null` when a section has no
/// resolved selection; the readiness gate keeps that from happening on the
/// export path, but the builder itself stays total.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportDocument {
    pub category: Option<Category>,
    pub topic: String,
    pub article_html_content: String,
    pub lead_paragraph: Option<String>,
    pub article_title: Option<String>,
    pub seo: Option<SeoSelection>,
    pub image_data: Option<String>,
    pub generated_at: String,
}

/// What the frontend receives: a deterministic filename plus the rendered
/// JSON to save.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportArtifact {
    pub filename: String,
    pub json: String,
}

pub fn build_document(state: &StudioState) -> ExportDocument {
    ExportDocument {
        category: state.category,
        topic: state.topic.clone(),
        article_html_content: state.final_article_content.clone(),
        lead_paragraph: state.lead.selected().map(|v| v.text.clone()),
        article_title: state.title.selected().map(|v| v.text.clone()),
        seo: state.seo.selected().map(|v| SeoSelection {
            title: v.title.clone(),
            description: v.description.clone(),
        }),
        image_data: state.image.selected().map(|v| v.image_data.clone()),
        generated_at: Utc::now().to_rfc3339(),
    }
}

pub fn build_artifact(state: &StudioState) -> Result<ExportArtifact, serde_json::Error> {
    let document = build_document(state);
    Ok(ExportArtifact {
        filename: export_filename(&state.topic),
        json: serde_json::to_string_pretty(&document)?,
    })
}

pub fn export_filename(topic: &str) -> String {
    format!("{}{}.json", FILENAME_PREFIX, sanitize_topic(topic))
}

/// Lower-case, transliterate Cyrillic, collapse everything else to single
/// underscores. An empty result falls back to a default basename.
fn sanitize_topic(topic: &str) -> String {
    static SEPARATORS: OnceLock<Regex> = OnceLock::new();
    let separators = SEPARATORS.get_or_init(|| Regex::new("[^a-z0-9]+").unwrap());

    let mut raw = String::with_capacity(topic.len());
    for ch in topic.to_lowercase().chars() {
        match transliterate(ch) {
            Some(tr) => raw.push_str(tr),
            None => raw.push(ch),
        }
    }

    let collapsed = separators.replace_all(&raw, "_");
    let trimmed = collapsed.trim_matches('_');
    if trimmed.is_empty() {
        FALLBACK_BASENAME.to_string()
    } else {
        trimmed.to_string()
    }
}

/// Lower-case Cyrillic to Latin. Returns `None` for anything else.
fn transliterate(ch: char) -> Option<&'static str> {
    let tr = match ch {
        'а' => "a",
        'б' => "b",
        'в' => "v",
        'г' => "g",
        'д' => "d",
        'е' | 'ё' | 'э' => "e",
        'ж' => "zh",
        'з' => "z",
        'и' | 'й' => "i",
        'к' => "k",
        'л' => "l",
        'м' => "m",
        'н' => "n",
        'о' => "o",
        'п' => "p",
        'р' => "r",
        'с' => "s",
        'т' => "t",
        'у' => "u",
        'ф' => "f",
        'х' => "h",
        'ц' => "ts",
        'ч' => "ch",
        'ш' => "sh",
        'щ' => "shch",
        'ъ' | 'ь' => "",
        'ы' => "y",
        'ю' => "yu",
        'я' => "ya",
        _ => return None,
    };
    Some(tr)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cyrillic_topic_is_transliterated() {
        assert_eq!(export_filename("детокс"), "chiia_article_detoks.json");
    }

    #[test]
    fn mixed_topic_is_lowercased_and_collapsed() {
        assert_eq!(
            export_filename("Detox: 10 дней!"),
            "chiia_article_detox_10_dnei.json"
        );
    }

    #[test]
    fn unsanitizable_topic_falls_back() {
        assert_eq!(export_filename("!!!"), "chiia_article_export.json");
        assert_eq!(export_filename(""), "chiia_article_export.json");
    }
}
