pub mod session;

use std::sync::Arc;

use dashmap::DashMap;

use crate::{
    config::AppConfig,
    dao::{
        doc_store::DocStore, lobby::LobbyRepository, quizzes::QuizRepository,
        results::ResultRepository,
    },
    state::session::QuizSession,
};

pub use self::session::{Round1Outcome, Round2Outcome, SessionError, SessionPhase};

/// Shared handle to the application state, cloned into every handler.
pub type SharedState = Arc<AppState>;

/// Central application state: the document store handle plus the registry of
/// in-flight quiz sessions keyed by participant email.
pub struct AppState {
    config: AppConfig,
    store: Arc<dyn DocStore>,
    sessions: DashMap<String, QuizSession>,
}

impl AppState {
    /// Construct the state wrapped in an [`Arc`] so it can be cloned cheaply.
    pub fn new(config: AppConfig, store: Arc<dyn DocStore>) -> SharedState {
        Arc::new(Self {
            config,
            store,
            sessions: DashMap::new(),
        })
    }

    /// Handle to the document store backing all repositories.
    pub fn store(&self) -> Arc<dyn DocStore> {
        Arc::clone(&self.store)
    }

    /// Registry of active quiz sessions keyed by participant email.
    pub fn sessions(&self) -> &DashMap<String, QuizSession> {
        &self.sessions
    }

    /// Repository over the lobby document and participant collection.
    pub fn lobby_repository(&self) -> LobbyRepository {
        LobbyRepository::new(self.store(), self.config.lobby_id())
    }

    /// Repository over quiz definitions.
    pub fn quiz_repository(&self) -> QuizRepository {
        QuizRepository::new(self.store())
    }

    /// Repository over quiz results.
    pub fn result_repository(&self) -> ResultRepository {
        ResultRepository::new(self.store())
    }
}
