//! Conversation engine.
//!
//! A small per-session state machine that collects the two search keys
//! (alarm number, reporting element), resolves them against the current
//! catalog snapshot and answers with a formatted result. Search and reply
//! formatting are pure functions of the snapshot and the query; the only
//! side effect of a transition is the session record itself.

use crate::cache::CatalogCache;
use crate::config::DaemonConfig;
use crate::search::{Lookup, MatchKind, SearchEngine, SearchQuery};
use crate::sessions::{ConvState, ConversationSession, SessionStore, Speaker};
use alarma_common::record::{AlarmRecord, AlarmRecordView, CatalogSnapshot};
use alarma_common::{CanonicalField, CatalogError, SENTINEL};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// Main menu, re-offered whenever the machine is idle and the input is not
/// a recognized option.
pub const MENU: &str = "Buen día, hablemos de nuestras plataformas de Core. \
¿Qué te gustaría consultar hoy?\n\n\
1. Alarmas de plataformas.\n\
2. Documentación de las plataformas.\n\
3. Incidentes activos de las plataformas.\n\
4. Estado operativo de las plataformas.\n\
5. Cambios activos en las plataformas.\n\
6. Hablar con el administrador de la plataforma.";

const PROMPT_ALARM_NUMBER: &str =
    "Perfecto. Indícame el número de la alarma que quieres consultar.";
const PROMPT_ELEMENT_NAME: &str = "¿Qué elemento reporta la alarma?";
const PROMPT_NUMERIC_ONLY: &str =
    "El número de alarma debe contener solo dígitos. Intenta nuevamente.";
const CATALOG_LOADING: &str = "⏳ La base de alarmas todavía se está cargando. \
Intenta nuevamente en unos segundos.";

/// One turn of the conversation: the text to show, the state the session
/// landed in, and the structured record when a lookup succeeded.
#[derive(Debug, Clone, Serialize)]
pub struct Reply {
    pub text: String,
    pub state: ConvState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payload: Option<AlarmRecordView>,
}

impl Reply {
    fn new(text: impl Into<String>, state: ConvState) -> Self {
        Self {
            text: text.into(),
            state,
            payload: None,
        }
    }
}

pub struct ConversationEngine {
    cache: Arc<CatalogCache>,
    sessions: SessionStore,
    search: SearchEngine,
    require_numeric_alarm: bool,
}

impl ConversationEngine {
    pub fn new(cache: Arc<CatalogCache>, config: &DaemonConfig) -> Self {
        Self {
            cache,
            sessions: SessionStore::new(
                config.sessions.capacity,
                Duration::from_secs(config.sessions.ttl_secs),
            ),
            search: SearchEngine::new(config.search.clone()),
            require_numeric_alarm: config.conversation.require_numeric_alarm,
        }
    }

    /// Drop sessions idle past their TTL. Called from the daemon's
    /// periodic maintenance tick.
    pub async fn prune_sessions(&self) {
        self.sessions.prune_expired().await;
    }

    /// Canonical query interface for the transport layer, bypassing the
    /// conversation flow. Distinguishes "not loaded yet" from a normal
    /// no-match result.
    pub async fn lookup(
        &self,
        alarm_number: &str,
        element_name: &str,
    ) -> Result<Lookup, CatalogError> {
        let snapshot = self
            .cache
            .get()
            .await
            .ok_or(CatalogError::CatalogNotReady)?;
        Ok(self.search.lookup(alarm_number, element_name, &snapshot))
    }

    /// Advance the session `session_id` with one user message.
    pub async fn advance(&self, session_id: &str, message: &str) -> Reply {
        let snapshot = self.cache.get().await;
        let message = message.trim().to_string();

        self.sessions
            .update(session_id, |session| {
                session.record(Speaker::User, &message);
                let reply = self.step(session, &message, snapshot.as_deref());
                session.record(Speaker::Assistant, &reply.text);
                reply
            })
            .await
    }

    fn step(
        &self,
        session: &mut ConversationSession,
        message: &str,
        snapshot: Option<&CatalogSnapshot>,
    ) -> Reply {
        match session.state {
            ConvState::Idle => self.step_idle(session, message),
            ConvState::AwaitingAlarmNumber => self.step_alarm_number(session, message),
            ConvState::AwaitingElementName => {
                self.step_element_name(session, message, snapshot)
            }
        }
    }

    fn step_idle(&self, session: &mut ConversationSession, message: &str) -> Reply {
        match message {
            "1" => {
                session.state = ConvState::AwaitingAlarmNumber;
                Reply::new(PROMPT_ALARM_NUMBER, ConvState::AwaitingAlarmNumber)
            }
            "2" => Reply::new(
                "La documentación de las plataformas está disponible en el portal \
                 de conocimiento del área. Escribe 1 si quieres consultar una alarma.",
                ConvState::Idle,
            ),
            "3" => Reply::new(
                "No tengo incidentes activos registrados en este momento.",
                ConvState::Idle,
            ),
            "4" => Reply::new(
                "Las plataformas de Core se encuentran operativas.",
                ConvState::Idle,
            ),
            "5" => Reply::new(
                "No hay cambios activos programados sobre las plataformas.",
                ConvState::Idle,
            ),
            "6" => Reply::new(
                "Puedes contactar al administrador de la plataforma por los \
                 canales internos del área.",
                ConvState::Idle,
            ),
            _ => Reply::new(MENU, ConvState::Idle),
        }
    }

    fn step_alarm_number(
        &self,
        session: &mut ConversationSession,
        message: &str,
    ) -> Reply {
        if message.is_empty() {
            return Reply::new(PROMPT_ALARM_NUMBER, ConvState::AwaitingAlarmNumber);
        }
        if self.require_numeric_alarm && !message.chars().all(|c| c.is_ascii_digit()) {
            // Validation failure re-prompts without changing state.
            return Reply::new(PROMPT_NUMERIC_ONLY, ConvState::AwaitingAlarmNumber);
        }
        session.pending_alarm_number = Some(message.to_string());
        session.state = ConvState::AwaitingElementName;
        Reply::new(PROMPT_ELEMENT_NAME, ConvState::AwaitingElementName)
    }

    fn step_element_name(
        &self,
        session: &mut ConversationSession,
        message: &str,
        snapshot: Option<&CatalogSnapshot>,
    ) -> Reply {
        if message.is_empty() {
            return Reply::new(PROMPT_ELEMENT_NAME, ConvState::AwaitingElementName);
        }

        // No snapshot yet: report loading and stay put so the user can
        // simply resubmit.
        let Some(snapshot) = snapshot else {
            return Reply::new(CATALOG_LOADING, ConvState::AwaitingElementName);
        };

        let query = SearchQuery {
            alarm_number: session.pending_alarm_number.clone(),
            element_name: Some(message.to_string()),
        };
        let result = self.search.search(&query, snapshot);
        info!(
            "Lookup number={:?} element={:?} -> {} matches ({:?})",
            query.alarm_number,
            query.element_name,
            result.records.len(),
            result.match_kind
        );

        // Success or failure, the flow terminates here.
        session.pending_alarm_number = None;
        session.state = ConvState::Idle;

        match result.records.first() {
            Some(record) => {
                let view = record.view();
                let text = format_found(record, result.match_kind, result.resolved_element.as_deref());
                Reply {
                    text,
                    state: ConvState::Idle,
                    payload: Some(view),
                }
            }
            None => Reply::new(
                format!(
                    "Lo siento, no encontré resultados para esa alarma. \
                     Verifica el número y el elemento e intenta de nuevo.\n\n{MENU}"
                ),
                ConvState::Idle,
            ),
        }
    }
}

/// Structured, operator-facing rendering of a found record. Sentinel-only
/// fields are omitted rather than shown as placeholders.
fn format_found(
    record: &AlarmRecord,
    match_kind: MatchKind,
    resolved_element: Option<&str>,
) -> String {
    let mut lines = vec![format!(
        "✅ Alarma {} ({})",
        record.get(CanonicalField::AlarmNumber),
        record.get(CanonicalField::ElementName)
    )];
    if match_kind == MatchKind::Fuzzy {
        if let Some(resolved) = resolved_element {
            lines.push(format!("(Interpreté el elemento como «{resolved}».)"));
        }
    }
    for field in [
        CanonicalField::Severity,
        CanonicalField::Significance,
        CanonicalField::Description,
        CanonicalField::RecommendedActions,
        CanonicalField::Manufacturer,
        CanonicalField::InstructionTitle,
    ] {
        let value = record.get(field);
        if value != SENTINEL {
            lines.push(format!("{}: {}", field.label(), value));
        }
    }
    lines.join("\n")
}
