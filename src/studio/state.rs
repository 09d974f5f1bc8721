//! Pure state transitions: every mutation of the draft is an event applied
//! to `StudioState`, with no I/O involved.

use crate::studio::types::{
    Category, ImageVariant, SectionKind, SectionState, SeoVariant, Settings, TextVariant, Variant,
};
use serde::Serialize;

/// Events a single section understands.
#[derive(Debug, Clone)]
pub enum SectionEvent<V> {
    /// A generation request was dispatched. Clears error and selection,
    /// raises the loading flag.
    GenerationStarted,
    /// The service answered; the batch replaces the prior list wholesale.
    GenerationSucceeded(Vec<V>),
    /// The service failed; stale candidates are dropped and the localized
    /// message is kept for display.
    GenerationFailed(String),
    /// The user picked a candidate. Not validated against the list here;
    /// an orphaned id simply never resolves (see `selected`).
    VariantSelected(String),
}

impl<V: Variant> SectionState<V> {
    pub fn apply(&mut self, event: SectionEvent<V>) {
        match event {
            SectionEvent::GenerationStarted => {
                self.loading = true;
                self.error = None;
                self.selected_id = None;
            }
            SectionEvent::GenerationSucceeded(batch) => {
                self.variants = batch;
                self.loading = false;
            }
            SectionEvent::GenerationFailed(message) => {
                self.variants.clear();
                self.loading = false;
                self.error = Some(message);
            }
            SectionEvent::VariantSelected(id) => {
                self.selected_id = Some(id);
            }
        }
    }

    /// Resolve the selected id against the current list.
    pub fn selected(&self) -> Option<&V> {
        let id = self.selected_id.as_deref()?;
        self.variants.iter().find(|v| v.id() == id)
    }

    /// A selection counts only when it resolves to a live variant.
    pub fn has_resolved_selection(&self) -> bool {
        self.selected().is_some()
    }
}

/// A finished generation batch, tagged with the section it belongs to.
#[derive(Debug, Clone)]
pub enum VariantBatch {
    Body(Vec<TextVariant>),
    Lead(Vec<TextVariant>),
    Title(Vec<TextVariant>),
    Seo(Vec<SeoVariant>),
    Image(Vec<ImageVariant>),
}

impl VariantBatch {
    pub fn len(&self) -> usize {
        match self {
            VariantBatch::Body(v) | VariantBatch::Lead(v) | VariantBatch::Title(v) => v.len(),
            VariantBatch::Seo(v) => v.len(),
            VariantBatch::Image(v) => v.len(),
        }
    }
}

/// The whole in-memory session: category, topic, five sections, settings.
/// Created empty at session start, discarded when the app closes.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StudioState {
    pub category: Option<Category>,
    pub topic: String,
    pub body: SectionState<TextVariant>,
    pub lead: SectionState<TextVariant>,
    pub title: SectionState<TextVariant>,
    pub seo: SectionState<SeoVariant>,
    pub image: SectionState<ImageVariant>,
    /// Snapshot of the chosen body variant, decoupled from later list
    /// replacement. Cleared when a new body generation starts.
    pub final_article_content: String,
    pub settings: Settings,
}

impl StudioState {
    pub fn new(default_system_prompt: String) -> Self {
        Self {
            category: None,
            topic: String::new(),
            body: SectionState::default(),
            lead: SectionState::default(),
            title: SectionState::default(),
            seo: SectionState::default(),
            image: SectionState::default(),
            final_article_content: String::new(),
            settings: Settings::new(default_system_prompt),
        }
    }

    pub fn section_loading(&self, section: SectionKind) -> bool {
        match section {
            SectionKind::Body => self.body.loading,
            SectionKind::Lead => self.lead.loading,
            SectionKind::Title => self.title.loading,
            SectionKind::Seo => self.seo.loading,
            SectionKind::Image => self.image.loading,
        }
    }

    /// Record a validation/availability notice on a section without touching
    /// its candidates.
    pub fn record_section_error(&mut self, section: SectionKind, message: &str) {
        let slot = match section {
            SectionKind::Body => &mut self.body.error,
            SectionKind::Lead => &mut self.lead.error,
            SectionKind::Title => &mut self.title.error,
            SectionKind::Seo => &mut self.seo.error,
            SectionKind::Image => &mut self.image.error,
        };
        *slot = Some(message.to_string());
    }

    /// Enter the loading state for a section. The body section also drops
    /// its final-content snapshot.
    pub fn begin_generation(&mut self, section: SectionKind) {
        match section {
            SectionKind::Body => {
                self.body.apply(SectionEvent::GenerationStarted);
                self.final_article_content.clear();
            }
            SectionKind::Lead => self.lead.apply(SectionEvent::GenerationStarted),
            SectionKind::Title => self.title.apply(SectionEvent::GenerationStarted),
            SectionKind::Seo => self.seo.apply(SectionEvent::GenerationStarted),
            SectionKind::Image => self.image.apply(SectionEvent::GenerationStarted),
        }
    }

    pub fn complete_generation(&mut self, batch: VariantBatch) {
        match batch {
            VariantBatch::Body(v) => self.body.apply(SectionEvent::GenerationSucceeded(v)),
            VariantBatch::Lead(v) => self.lead.apply(SectionEvent::GenerationSucceeded(v)),
            VariantBatch::Title(v) => self.title.apply(SectionEvent::GenerationSucceeded(v)),
            VariantBatch::Seo(v) => self.seo.apply(SectionEvent::GenerationSucceeded(v)),
            VariantBatch::Image(v) => self.image.apply(SectionEvent::GenerationSucceeded(v)),
        }
    }

    pub fn fail_generation(&mut self, section: SectionKind, message: &str) {
        let event_message = message.to_string();
        match section {
            SectionKind::Body => self
                .body
                .apply(SectionEvent::GenerationFailed(event_message)),
            SectionKind::Lead => self
                .lead
                .apply(SectionEvent::GenerationFailed(event_message)),
            SectionKind::Title => self
                .title
                .apply(SectionEvent::GenerationFailed(event_message)),
            SectionKind::Seo => self.seo.apply(SectionEvent::GenerationFailed(event_message)),
            SectionKind::Image => self
                .image
                .apply(SectionEvent::GenerationFailed(event_message)),
        }
    }

    /// Select a candidate. The body section snapshots the resolved text into
    /// `final_article_content`; an id that does not resolve leaves the
    /// snapshot empty, matching the unselected-for-export semantics.
    pub fn select_variant(&mut self, section: SectionKind, variant_id: &str) {
        let id = variant_id.to_string();
        match section {
            SectionKind::Body => {
                self.body.apply(SectionEvent::VariantSelected(id));
                self.final_article_content = self
                    .body
                    .selected()
                    .map(|v| v.text.clone())
                    .unwrap_or_default();
            }
            SectionKind::Lead => self.lead.apply(SectionEvent::VariantSelected(id)),
            SectionKind::Title => self.title.apply(SectionEvent::VariantSelected(id)),
            SectionKind::Seo => self.seo.apply(SectionEvent::VariantSelected(id)),
            SectionKind::Image => self.image.apply(SectionEvent::VariantSelected(id)),
        }
    }

    /// Export is permitted only when the topic is non-empty and every
    /// section's selection resolves to a live candidate.
    pub fn export_ready(&self) -> bool {
        !self.topic.trim().is_empty()
            && self.body.has_resolved_selection()
            && self.lead.has_resolved_selection()
            && self.title.has_resolved_selection()
            && self.seo.has_resolved_selection()
            && self.image.has_resolved_selection()
    }
}
