use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use thiserror::Error;
use uuid::Uuid;

use crate::domain::a001_sales_record::Dataset;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Session {0} not found")]
    NotFound(Uuid),
}

/// Сессий в памяти по умолчанию
pub const DEFAULT_MAX_SESSIONS: usize = 256;

/// Датасеты в памяти по id сессии.
///
/// Датасет сессии создается один раз, целиком заменяется при новой загрузке
/// или перегенерации и выдается только на чтение как `Arc<Dataset>`.
/// Хранится не больше `max_sessions`: новая сессия вытесняет ту, чей датасет
/// загружен раньше всех.
#[derive(Clone)]
pub struct SessionStore {
    sessions: Arc<RwLock<HashMap<Uuid, Arc<Dataset>>>>,
    max_sessions: usize,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_SESSIONS)
    }
}

impl SessionStore {
    pub fn new(max_sessions: usize) -> Self {
        Self {
            sessions: Arc::default(),
            max_sessions: max_sessions.max(1),
        }
    }

    pub fn create(&self, dataset: Dataset) -> Uuid {
        let id = Uuid::new_v4();
        let mut sessions = self
            .sessions
            .write()
            .unwrap_or_else(PoisonError::into_inner);

        while sessions.len() >= self.max_sessions {
            let oldest = sessions
                .iter()
                .min_by_key(|(_, dataset)| dataset.loaded_at())
                .map(|(id, _)| *id);
            match oldest {
                Some(oldest) => {
                    sessions.remove(&oldest);
                    tracing::info!("Session {} evicted, store is full", oldest);
                }
                None => break,
            }
        }

        sessions.insert(id, Arc::new(dataset));
        id
    }

    /// Замена датасета существующей сессии
    pub fn replace(&self, id: Uuid, dataset: Dataset) -> Result<Arc<Dataset>, SessionError> {
        let mut sessions = self
            .sessions
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        let slot = sessions.get_mut(&id).ok_or(SessionError::NotFound(id))?;
        *slot = Arc::new(dataset);
        Ok(Arc::clone(slot))
    }

    pub fn get(&self, id: Uuid) -> Result<Arc<Dataset>, SessionError> {
        self.sessions
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&id)
            .cloned()
            .ok_or(SessionError::NotFound(id))
    }

    /// Удаляет сессию; датасет освобождается, когда его больше никто не читает
    pub fn remove(&self, id: Uuid) -> Result<(), SessionError> {
        self.sessions
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&id)
            .map(|_| ())
            .ok_or(SessionError::NotFound(id))
    }

    pub fn len(&self) -> usize {
        self.sessions
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
