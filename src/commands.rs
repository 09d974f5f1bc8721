use crate::studio::export::ExportArtifact;
use crate::studio::{Category, SectionKind, Studio, StudioSnapshot};
use tauri::command;

/// Managed state: the controller owns everything mutable.
pub struct AppState {
    pub studio: Studio,
}

/* ---------- 1.  SETTERS ---------- */

#[command]
pub async fn set_category(
    category: Option<Category>,
    state: tauri::State<'_, AppState>,
) -> Result<StudioSnapshot, String> {
    state.studio.set_category(category).await;
    Ok(state.studio.snapshot().await)
}

#[command]
pub async fn set_topic(
    topic: String,
    state: tauri::State<'_, AppState>,
) -> Result<StudioSnapshot, String> {
    state.studio.set_topic(topic).await;
    Ok(state.studio.snapshot().await)
}

/* ---------- 2.  GENERATION & SELECTION ---------- */

#[command]
pub async fn generate_section(
    section: SectionKind,
    regenerate: bool,
    state: tauri::State<'_, AppState>,
) -> Result<StudioSnapshot, String> {
    state
        .studio
        .generate(section, regenerate)
        .await
        .map_err(|e| e.to_string())?;
    Ok(state.studio.snapshot().await)
}

#[command]
pub async fn select_variant(
    section: SectionKind,
    variant_id: String,
    state: tauri::State<'_, AppState>,
) -> Result<StudioSnapshot, String> {
    state.studio.select_variant(section, &variant_id).await;
    Ok(state.studio.snapshot().await)
}

/* ---------- 3.  SETTINGS ---------- */

#[command]
pub async fn update_system_prompt_draft(
    draft: String,
    state: tauri::State<'_, AppState>,
) -> Result<StudioSnapshot, String> {
    state.studio.update_system_prompt_draft(draft).await;
    Ok(state.studio.snapshot().await)
}

#[command]
pub async fn save_system_prompt(
    state: tauri::State<'_, AppState>,
) -> Result<StudioSnapshot, String> {
    state.studio.commit_system_prompt().await;
    Ok(state.studio.snapshot().await)
}

#[command]
pub async fn cancel_system_prompt_edit(
    state: tauri::State<'_, AppState>,
) -> Result<StudioSnapshot, String> {
    state.studio.cancel_system_prompt_edit().await;
    Ok(state.studio.snapshot().await)
}

/* ---------- 4.  QUERIES & EXPORT ---------- */

#[command]
pub async fn get_state(state: tauri::State<'_, AppState>) -> Result<StudioSnapshot, String> {
    Ok(state.studio.snapshot().await)
}

#[command]
pub async fn export_article(
    state: tauri::State<'_, AppState>,
) -> Result<ExportArtifact, String> {
    state.studio.export().await.map_err(|e| e.to_string())
}
