// Learn more about Tauri commands at https://tauri.app/develop/calling-rust/

mod commands;
pub mod config;
pub mod genai;
pub mod studio;
pub mod texts;

use crate::commands::*;
use crate::config::Config;
use crate::genai::{GeminiClient, GenerationService};
use crate::studio::Studio;
use crate::texts::Texts;
use std::sync::Arc;
use tracing::warn;

#[cfg_attr(mobile, tauri::mobile_entry_point)]
pub fn run() {
    dotenv::dotenv().ok();
    tracing_subscriber::fmt::init();

    let config = Config::from_env();
    let texts = Arc::new(Texts::load().expect("embedded texts must parse"));

    let service: Option<Arc<dyn GenerationService>> = match GeminiClient::new(&config) {
        Ok(client) => Some(Arc::new(client)),
        Err(e) => {
            warn!(error = %e, "generation service unavailable, drafting actions disabled");
            None
        }
    };

    let studio = Studio::new(service, texts);

    tauri::Builder::default()
        .plugin(tauri_plugin_opener::init())
        .manage(AppState { studio })
        .invoke_handler(tauri::generate_handler![
            set_category,
            set_topic,
            generate_section,
            select_variant,
            update_system_prompt_draft,
            save_system_prompt,
            cancel_system_prompt_edit,
            get_state,
            export_article
        ])
        .run(tauri::generate_context!())
        .expect("error while running tauri application")
}
