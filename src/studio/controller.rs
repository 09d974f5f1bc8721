//! The workflow controller: owns the session state and drives generation,
//! selection, settings and export on top of it.

use crate::genai::instruction::build_instruction;
use crate::genai::{GenAiError, GenerationService, SeoIdea};
use crate::studio::export::{self, ExportArtifact};
use crate::studio::state::{StudioState, VariantBatch};
use crate::studio::types::{Category, ImageVariant, SectionKind, SeoVariant, TextVariant};
use crate::texts::Texts;
use chrono::Utc;
use serde::Serialize;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::{error, info, warn};

#[derive(Debug, Error)]
pub enum StudioError {
    #[error("{0}")]
    Validation(String),
    #[error("generation already in flight for section '{0}'")]
    GenerationInFlight(SectionKind),
    #[error("failed to render export document: {0}")]
    Export(#[from] serde_json::Error),
}

/// Serializable view of the session handed to the frontend after every
/// operation.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StudioSnapshot {
    /// False when no credential was configured; the frontend degrades every
    /// generate control and shows the standing banner.
    pub service_available: bool,
    /// Computed gate for the export button.
    pub export_ready: bool,
    #[serde(flatten)]
    pub state: StudioState,
}

/// Everything a dispatched generation needs, captured under the lock so the
/// service call itself runs without holding it.
struct PlannedRequest {
    topic: String,
    instruction: String,
    count: usize,
    system_prompt: String,
}

pub struct Studio {
    state: Arc<RwLock<StudioState>>,
    service: Option<Arc<dyn GenerationService>>,
    texts: Arc<Texts>,
}

impl Studio {
    /// `service` is `None` when no credential is configured; every generate
    /// action then degrades to the standing notice.
    pub fn new(service: Option<Arc<dyn GenerationService>>, texts: Arc<Texts>) -> Self {
        let state = StudioState::new(texts.default_system_prompt());
        Self {
            state: Arc::new(RwLock::new(state)),
            service,
            texts,
        }
    }

    pub async fn snapshot(&self) -> StudioSnapshot {
        let state = self.state.read().await.clone();
        StudioSnapshot {
            service_available: self.service.is_some(),
            export_ready: state.export_ready(),
            state,
        }
    }

    pub async fn set_category(&self, category: Option<Category>) {
        self.state.write().await.category = category;
    }

    pub async fn set_topic(&self, topic: String) {
        self.state.write().await.topic = topic;
    }

    /// Request a fresh candidate batch for a section. Validation failures are
    /// recorded on the section itself, mirroring how the UI reports them; an
    /// `Err` means the call violated the workflow contract.
    pub async fn generate(
        &self,
        section: SectionKind,
        regenerate: bool,
    ) -> Result<(), StudioError> {
        let service = match &self.service {
            Some(service) => Arc::clone(service),
            None => {
                warn!(%section, "generation requested without a credential");
                let mut state = self.state.write().await;
                state.record_section_error(section, &self.texts.notices.no_api_key);
                return Ok(());
            }
        };

        let request = {
            let mut state = self.state.write().await;
            if state.topic.trim().is_empty() {
                state.record_section_error(section, &self.texts.notices.topic_required);
                return Ok(());
            }
            if state.section_loading(section) {
                return Err(StudioError::GenerationInFlight(section));
            }
            state.begin_generation(section);
            PlannedRequest {
                topic: state.topic.clone(),
                instruction: build_instruction(
                    &self.texts,
                    &state.topic,
                    state.category,
                    section,
                    regenerate,
                ),
                count: section.variant_count(),
                system_prompt: state.settings.committed_system_prompt.clone(),
            }
        };

        info!(%section, regenerate, count = request.count, "dispatching generation request");
        let outcome = call_service(service.as_ref(), section, &request).await;

        let mut state = self.state.write().await;
        match outcome {
            Ok(batch) => {
                info!(%section, produced = batch.len(), "generation succeeded");
                state.complete_generation(batch);
            }
            Err(e) => {
                error!(%section, error = %e, "generation failed");
                state.fail_generation(section, &self.texts.notices.generation_failed);
            }
        }
        Ok(())
    }

    pub async fn select_variant(&self, section: SectionKind, variant_id: &str) {
        self.state.write().await.select_variant(section, variant_id);
    }

    pub async fn export_readiness(&self) -> bool {
        self.state.read().await.export_ready()
    }

    pub async fn export(&self) -> Result<ExportArtifact, StudioError> {
        let state = self.state.read().await;
        if !state.export_ready() {
            return Err(StudioError::Validation(
                self.texts.notices.export_incomplete.clone(),
            ));
        }
        let artifact = export::build_artifact(&state)?;
        info!(filename = %artifact.filename, "export document assembled");
        Ok(artifact)
    }

    pub async fn update_system_prompt_draft(&self, draft: String) {
        self.state.write().await.settings.draft_system_prompt = draft;
    }

    /// Promote the draft to the value used by all subsequent requests.
    pub async fn commit_system_prompt(&self) {
        let mut state = self.state.write().await;
        state.settings.committed_system_prompt = state.settings.draft_system_prompt.clone();
    }

    /// Discard the draft, resetting it to the committed value.
    pub async fn cancel_system_prompt_edit(&self) {
        let mut state = self.state.write().await;
        state.settings.draft_system_prompt = state.settings.committed_system_prompt.clone();
    }
}

async fn call_service(
    service: &dyn GenerationService,
    section: SectionKind,
    request: &PlannedRequest,
) -> Result<VariantBatch, GenAiError> {
    let prefix = section.id_prefix();
    match section {
        SectionKind::Body => {
            let raw = service
                .html_snippets(&request.instruction, request.count, &request.system_prompt)
                .await?;
            Ok(VariantBatch::Body(wrap_text(prefix, raw)))
        }
        SectionKind::Lead => {
            let raw = service
                .text_variants(&request.instruction, request.count, &request.system_prompt)
                .await?;
            Ok(VariantBatch::Lead(wrap_text(prefix, raw)))
        }
        SectionKind::Title => {
            let raw = service
                .text_variants(&request.instruction, request.count, &request.system_prompt)
                .await?;
            Ok(VariantBatch::Title(wrap_text(prefix, raw)))
        }
        // SEO requests carry the raw topic, not the composed instruction.
        SectionKind::Seo => {
            let raw = service
                .seo_variants(&request.topic, request.count, &request.system_prompt)
                .await?;
            Ok(VariantBatch::Seo(wrap_seo(prefix, raw)))
        }
        SectionKind::Image => {
            let raw = service
                .image_variants(&request.instruction, request.count, &request.system_prompt)
                .await?;
            Ok(VariantBatch::Image(wrap_images(prefix, raw)))
        }
    }
}

fn batch_stamp() -> i64 {
    Utc::now().timestamp_millis()
}

fn wrap_text(prefix: &str, raw: Vec<String>) -> Vec<TextVariant> {
    let stamp = batch_stamp();
    raw.into_iter()
        .enumerate()
        .map(|(index, text)| TextVariant {
            id: format!("{}{}-{}", prefix, index, stamp),
            text,
        })
        .collect()
}

fn wrap_seo(prefix: &str, raw: Vec<SeoIdea>) -> Vec<SeoVariant> {
    let stamp = batch_stamp();
    raw.into_iter()
        .enumerate()
        .map(|(index, idea)| SeoVariant {
            id: format!("{}{}-{}", prefix, index, stamp),
            title: idea.title,
            description: idea.description,
        })
        .collect()
}

fn wrap_images(prefix: &str, raw: Vec<String>) -> Vec<ImageVariant> {
    let stamp = batch_stamp();
    raw.into_iter()
        .enumerate()
        .map(|(index, image_data)| ImageVariant {
            id: format!("{}{}-{}", prefix, index, stamp),
            image_data,
        })
        .collect()
}
