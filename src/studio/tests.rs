//! Unit tests for the workflow controller: generation, selection, readiness,
//! settings and export.

use crate::genai::{GenAiError, GenerationService, SeoIdea};
use crate::studio::state::{SectionEvent, StudioState};
use crate::studio::types::{Category, SectionKind, SectionState, TextVariant};
use crate::studio::{export, Studio};
use crate::texts::Texts;
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::Semaphore;

const ALL_SECTIONS: [SectionKind; 5] = [
    SectionKind::Body,
    SectionKind::Lead,
    SectionKind::Title,
    SectionKind::Seo,
    SectionKind::Image,
];

/// Deterministic backend: `count` canned results per call, optionally
/// failing, optionally parked on a semaphore to keep a request in flight.
#[derive(Default)]
struct StubService {
    calls: AtomicUsize,
    fail: AtomicBool,
    gate: Option<Arc<Semaphore>>,
}

impl StubService {
    fn gated(gate: Arc<Semaphore>) -> Self {
        Self {
            gate: Some(gate),
            ..Self::default()
        }
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn set_failing(&self, failing: bool) {
        self.fail.store(failing, Ordering::SeqCst);
    }

    async fn enter(&self) -> Result<(), GenAiError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(gate) = &self.gate {
            let permit = gate
                .acquire()
                .await
                .map_err(|e| GenAiError::Network(e.to_string()))?;
            permit.forget();
        }
        if self.fail.load(Ordering::SeqCst) {
            return Err(GenAiError::Empty);
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl GenerationService for StubService {
    async fn text_variants(
        &self,
        _instruction: &str,
        count: usize,
        _system_prompt: &str,
    ) -> Result<Vec<String>, GenAiError> {
        self.enter().await?;
        Ok((0..count).map(|i| format!("вариант {}", i)).collect())
    }

    async fn html_snippets(
        &self,
        _instruction: &str,
        count: usize,
        _system_prompt: &str,
    ) -> Result<Vec<String>, GenAiError> {
        self.enter().await?;
        Ok((0..count).map(|i| format!("<p>абзац {}</p>", i)).collect())
    }

    async fn seo_variants(
        &self,
        _topic: &str,
        count: usize,
        _system_prompt: &str,
    ) -> Result<Vec<SeoIdea>, GenAiError> {
        self.enter().await?;
        Ok((0..count)
            .map(|i| SeoIdea {
                title: format!("seo-заголовок {}", i),
                description: format!("seo-описание {}", i),
            })
            .collect())
    }

    async fn image_variants(
        &self,
        _instruction: &str,
        count: usize,
        _system_prompt: &str,
    ) -> Result<Vec<String>, GenAiError> {
        self.enter().await?;
        Ok((0..count)
            .map(|i| format!("data:image/png;base64,QUJD{}", i))
            .collect())
    }
}

fn texts() -> Arc<Texts> {
    Arc::new(Texts::load().unwrap())
}

fn studio_with(service: Arc<StubService>) -> Studio {
    Studio::new(Some(service), texts())
}

async fn select_first(studio: &Studio, section: SectionKind) {
    let state = studio.snapshot().await.state;
    let id = match section {
        SectionKind::Body => state.body.variants[0].id.clone(),
        SectionKind::Lead => state.lead.variants[0].id.clone(),
        SectionKind::Title => state.title.variants[0].id.clone(),
        SectionKind::Seo => state.seo.variants[0].id.clone(),
        SectionKind::Image => state.image.variants[0].id.clone(),
    };
    studio.select_variant(section, &id).await;
}

/// Topic + category set, all five sections generated and selected.
async fn fully_drafted_studio(service: Arc<StubService>) -> Studio {
    let studio = studio_with(service);
    studio.set_topic("детокс".to_string()).await;
    studio.set_category(Some(Category::Diets)).await;
    for section in ALL_SECTIONS {
        studio.generate(section, false).await.unwrap();
        select_first(&studio, section).await;
    }
    studio
}

#[tokio::test]
async fn body_generation_yields_two_unselected_variants() {
    let service = Arc::new(StubService::default());
    let studio = studio_with(Arc::clone(&service));
    studio.set_topic("детокс".to_string()).await;
    studio.set_category(Some(Category::Diets)).await;

    studio.generate(SectionKind::Body, false).await.unwrap();

    let state = studio.snapshot().await.state;
    assert_eq!(state.body.variants.len(), 2);
    assert!(state.body.selected_id.is_none());
    assert!(!state.body.loading);
    assert!(state.body.error.is_none());
    assert_eq!(service.calls(), 1);
}

#[tokio::test]
async fn every_section_gets_requested_count_with_unique_ids() {
    let service = Arc::new(StubService::default());
    let studio = studio_with(service);
    studio.set_topic("сон".to_string()).await;

    for section in ALL_SECTIONS {
        studio.generate(section, false).await.unwrap();
    }

    let state = studio.snapshot().await.state;
    let mut ids = HashSet::new();
    for v in &state.body.variants {
        assert!(ids.insert(v.id.clone()));
    }
    for v in &state.lead.variants {
        assert!(ids.insert(v.id.clone()));
    }
    for v in &state.title.variants {
        assert!(ids.insert(v.id.clone()));
    }
    for v in &state.seo.variants {
        assert!(ids.insert(v.id.clone()));
    }
    for v in &state.image.variants {
        assert!(ids.insert(v.id.clone()));
    }
    assert_eq!(state.body.variants.len(), 2);
    assert_eq!(state.lead.variants.len(), 3);
    assert_eq!(state.title.variants.len(), 3);
    assert_eq!(state.seo.variants.len(), 3);
    assert_eq!(state.image.variants.len(), 3);
}

#[tokio::test]
async fn missing_credential_sets_notice_without_calling_service() {
    let studio = Studio::new(None, texts());
    studio.set_topic("детокс".to_string()).await;

    studio.generate(SectionKind::Lead, false).await.unwrap();

    let snapshot = studio.snapshot().await;
    assert!(!snapshot.service_available);
    assert_eq!(
        snapshot.state.lead.error.as_deref(),
        Some(texts().notices.no_api_key.as_str())
    );
    assert!(snapshot.state.lead.variants.is_empty());
}

#[tokio::test]
async fn blank_topic_records_validation_notice() {
    let service = Arc::new(StubService::default());
    let studio = studio_with(Arc::clone(&service));
    studio.set_topic("   ".to_string()).await;

    studio.generate(SectionKind::Title, false).await.unwrap();

    let state = studio.snapshot().await.state;
    assert_eq!(
        state.title.error.as_deref(),
        Some(texts().notices.topic_required.as_str())
    );
    assert_eq!(service.calls(), 0);
}

#[tokio::test]
async fn regeneration_clears_prior_selection() {
    let service = Arc::new(StubService::default());
    let studio = studio_with(service);
    studio.set_topic("детокс".to_string()).await;

    studio.generate(SectionKind::Lead, false).await.unwrap();
    select_first(&studio, SectionKind::Lead).await;
    assert!(studio.snapshot().await.state.lead.selected_id.is_some());

    studio.generate(SectionKind::Lead, true).await.unwrap();
    assert!(studio.snapshot().await.state.lead.selected_id.is_none());
}

#[tokio::test]
async fn body_regeneration_drops_final_content_snapshot() {
    let service = Arc::new(StubService::default());
    let studio = studio_with(service);
    studio.set_topic("детокс".to_string()).await;

    studio.generate(SectionKind::Body, false).await.unwrap();
    select_first(&studio, SectionKind::Body).await;
    let state = studio.snapshot().await.state;
    assert_eq!(state.final_article_content, state.body.variants[0].text);

    studio.generate(SectionKind::Body, true).await.unwrap();
    assert!(studio
        .snapshot()
        .await
        .state
        .final_article_content
        .is_empty());
}

#[tokio::test]
async fn failed_generation_clears_candidates_and_sets_error() {
    let service = Arc::new(StubService::default());
    let studio = studio_with(Arc::clone(&service));
    studio.set_topic("детокс".to_string()).await;

    studio.generate(SectionKind::Seo, false).await.unwrap();
    assert_eq!(studio.snapshot().await.state.seo.variants.len(), 3);

    service.set_failing(true);
    studio.generate(SectionKind::Seo, false).await.unwrap();

    let state = studio.snapshot().await.state;
    assert!(state.seo.variants.is_empty());
    assert!(!state.seo.loading);
    assert_eq!(
        state.seo.error.as_deref(),
        Some(texts().notices.generation_failed.as_str())
    );
}

#[tokio::test]
async fn overlapping_generation_for_same_section_is_rejected() {
    let gate = Arc::new(Semaphore::new(0));
    let service = Arc::new(StubService::gated(Arc::clone(&gate)));
    let studio = Arc::new(studio_with(service));
    studio.set_topic("детокс".to_string()).await;

    let background = {
        let studio = Arc::clone(&studio);
        tokio::spawn(async move { studio.generate(SectionKind::Image, false).await })
    };
    tokio::time::sleep(std::time::Duration::from_millis(20)).await;

    let second = studio.generate(SectionKind::Image, false).await;
    assert!(matches!(
        second,
        Err(crate::studio::StudioError::GenerationInFlight(
            SectionKind::Image
        ))
    ));

    gate.add_permits(1);
    background.await.unwrap().unwrap();
    assert_eq!(studio.snapshot().await.state.image.variants.len(), 3);
}

#[tokio::test]
async fn orphaned_selection_leaves_readiness_false() {
    let service = Arc::new(StubService::default());
    let studio = fully_drafted_studio(service).await;
    assert!(studio.export_readiness().await);

    studio.select_variant(SectionKind::Seo, "seo-нет-такого").await;
    assert!(!studio.export_readiness().await);
}

#[tokio::test]
async fn readiness_requires_topic_and_every_selection() {
    let service = Arc::new(StubService::default());

    for missing in ALL_SECTIONS {
        let studio = studio_with(Arc::clone(&service));
        studio.set_topic("детокс".to_string()).await;
        for section in ALL_SECTIONS {
            studio.generate(section, false).await.unwrap();
            if section != missing {
                select_first(&studio, section).await;
            }
        }
        assert!(
            !studio.export_readiness().await,
            "readiness must be false without a {} selection",
            missing
        );
    }

    let studio = fully_drafted_studio(Arc::clone(&service)).await;
    assert!(studio.export_readiness().await);

    studio.set_topic("  ".to_string()).await;
    assert!(!studio.export_readiness().await);
}

#[tokio::test]
async fn export_rejected_while_incomplete() {
    let service = Arc::new(StubService::default());
    let studio = studio_with(service);
    studio.set_topic("детокс".to_string()).await;

    let result = studio.export().await;
    match result {
        Err(crate::studio::StudioError::Validation(message)) => {
            assert_eq!(message, texts().notices.export_incomplete);
        }
        other => panic!("expected validation error, got {:?}", other.map(|_| ())),
    }
}

#[tokio::test]
async fn export_document_carries_the_exact_selections() {
    let service = Arc::new(StubService::default());
    let studio = fully_drafted_studio(service).await;
    assert!(studio.snapshot().await.export_ready);

    let artifact = studio.export().await.unwrap();
    assert_eq!(artifact.filename, "chiia_article_detoks.json");

    let document: serde_json::Value = serde_json::from_str(&artifact.json).unwrap();
    assert_eq!(document["topic"], "детокс");
    assert_eq!(document["category"], "Диеты");
    assert_eq!(document["articleHtmlContent"], "<p>абзац 0</p>");
    assert_eq!(document["leadParagraph"], "вариант 0");
    assert_eq!(document["articleTitle"], "вариант 0");
    assert_eq!(document["seo"]["title"], "seo-заголовок 0");
    assert_eq!(document["seo"]["description"], "seo-описание 0");
    assert_eq!(document["imageData"], "data:image/png;base64,QUJD0");
    assert!(document["generatedAt"].as_str().unwrap().contains('T'));
}

#[tokio::test]
async fn seo_field_is_null_exactly_when_unselected() {
    let service = Arc::new(StubService::default());
    let studio = studio_with(service);
    studio.set_topic("детокс".to_string()).await;
    studio.generate(SectionKind::Seo, false).await.unwrap();

    let unselected = export::build_document(&studio.snapshot().await.state);
    assert!(unselected.seo.is_none());

    select_first(&studio, SectionKind::Seo).await;
    let state = studio.snapshot().await.state;
    let selected = export::build_document(&state);
    let picked = state.seo.variants[0].clone();
    let seo = selected.seo.unwrap();
    assert_eq!(seo.title, picked.title);
    assert_eq!(seo.description, picked.description);
}

#[tokio::test]
async fn system_prompt_draft_commit_and_cancel() {
    let service = Arc::new(StubService::default());
    let studio = studio_with(service);
    let initial = studio
        .snapshot()
        .await
        .state
        .settings
        .committed_system_prompt
        .clone();

    studio
        .update_system_prompt_draft("пиши строже".to_string())
        .await;
    let settings = studio.snapshot().await.state.settings;
    assert_eq!(settings.draft_system_prompt, "пиши строже");
    assert_eq!(settings.committed_system_prompt, initial);

    studio.cancel_system_prompt_edit().await;
    let settings = studio.snapshot().await.state.settings;
    assert_eq!(settings.draft_system_prompt, initial);

    studio
        .update_system_prompt_draft("пиши мягче".to_string())
        .await;
    studio.commit_system_prompt().await;
    let settings = studio.snapshot().await.state.settings;
    assert_eq!(settings.committed_system_prompt, "пиши мягче");
    assert_eq!(settings.draft_system_prompt, "пиши мягче");
}

#[test]
fn generation_start_clears_error_and_selection() {
    let mut section: SectionState<TextVariant> = SectionState::default();
    section.apply(SectionEvent::GenerationSucceeded(vec![TextVariant {
        id: "v0-1".to_string(),
        text: "старый".to_string(),
    }]));
    section.apply(SectionEvent::VariantSelected("v0-1".to_string()));
    section.apply(SectionEvent::GenerationFailed("ошибка".to_string()));
    assert!(section.error.is_some());

    section.apply(SectionEvent::GenerationStarted);
    assert!(section.loading);
    assert!(section.error.is_none());
    assert!(section.selected_id.is_none());
}

#[test]
fn fresh_state_is_empty_and_not_ready() {
    let state = StudioState::new("подсказка".to_string());
    assert!(state.topic.is_empty());
    assert!(state.category.is_none());
    assert!(!state.export_ready());
    assert_eq!(state.settings.committed_system_prompt, "подсказка");
}
