// Clone sessions - Extracted source dashboard plus the operator's pending edits
use crate::application::bundle_extractor::ExtractedBundle;
use crate::application::clone_service::CloneRequest;
use crate::application::config_editor::ConfigEditor;
use crate::domain::clone_spec::CloneSpecEntry;
use crate::domain::dashboard::DashboardManifest;
use crate::domain::ids::DashboardId;
use serde::Serialize;
use std::collections::HashMap;
use tokio::sync::RwLock;

#[derive(Debug, Clone)]
pub struct CloneSession {
    pub source_dashboard_id: DashboardId,
    pub source_title: String,
    pub manifest: DashboardManifest,
    pub editor: ConfigEditor,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionView {
    pub source_dashboard_id: DashboardId,
    pub source_title: String,
    pub entries: Vec<CloneSpecEntry>,
    /// Keys of rows with an uncommitted draft
    pub editing: Vec<String>,
}

impl CloneSession {
    pub fn new(source_dashboard_id: DashboardId, bundle: ExtractedBundle) -> Self {
        Self {
            source_dashboard_id,
            source_title: bundle.source_title,
            manifest: bundle.manifest,
            editor: ConfigEditor::new(bundle.entries),
        }
    }

    pub fn view(&self) -> SessionView {
        let entries = self.editor.entries().to_vec();
        let editing = entries
            .iter()
            .filter(|entry| self.editor.is_editing(&entry.uuid))
            .map(|entry| entry.uuid.clone())
            .collect();

        SessionView {
            source_dashboard_id: self.source_dashboard_id,
            source_title: self.source_title.clone(),
            entries,
            editing,
        }
    }

    pub fn into_request(self, destination_title: String) -> CloneRequest {
        CloneRequest {
            source_title: self.source_title,
            destination_title,
            manifest: self.manifest,
            entries: self.editor.into_entries(),
        }
    }
}

/// Sessions keyed by source dashboard id; opening a session again replaces it
#[derive(Default)]
pub struct SessionStore {
    sessions: RwLock<HashMap<DashboardId, CloneSession>>,
}

impl SessionStore {
    pub async fn insert(&self, session: CloneSession) -> SessionView {
        let view = session.view();
        self.sessions
            .write()
            .await
            .insert(session.source_dashboard_id, session);
        view
    }

    pub async fn view(&self, id: DashboardId) -> Option<SessionView> {
        self.sessions.read().await.get(&id).map(CloneSession::view)
    }

    /// Run `edit` against the session's editor
    pub async fn edit<R>(&self, id: DashboardId, edit: impl FnOnce(&mut ConfigEditor) -> R) -> Option<R> {
        let mut sessions = self.sessions.write().await;
        sessions.get_mut(&id).map(|session| edit(&mut session.editor))
    }

    /// Remove the session for submission
    pub async fn take(&self, id: DashboardId) -> Option<CloneSession> {
        self.sessions.write().await.remove(&id)
    }
}
