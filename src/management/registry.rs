use std::{
    collections::HashMap,
    sync::{Arc, Mutex, MutexGuard},
};

use crate::{management::Session, transport::VoiceTransport, types::GuildId};

/// Builds the transport for a newly joined session.
pub type TransportFactory = Arc<dyn Fn(&GuildId) -> Box<dyn VoiceTransport> + Send + Sync>;

/// Live sessions keyed by guild.
///
/// Sessions are independent; the map lock is only held to look up, insert
/// or remove an entry.
pub struct SessionRegistry {
    sessions: Mutex<HashMap<GuildId, Arc<Session>>>,
    max_queue_size: usize,
    transports: TransportFactory,
}

impl SessionRegistry {
    pub fn new(max_queue_size: usize, transports: TransportFactory) -> Self {
        Self {
            sessions: Mutex::new(HashMap::new()),
            max_queue_size,
            transports,
        }
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<GuildId, Arc<Session>>> {
        self.sessions.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Returns the session for `id`, creating it on first join.
    pub fn join(&self, id: &GuildId) -> Arc<Session> {
        let mut sessions = self.lock();
        if let Some(session) = sessions.get(id) {
            return Arc::clone(session);
        }

        tracing::info!(guild = %id, "joining session");
        let transport = (self.transports)(id);
        let session = Arc::new(Session::spawn(id.clone(), self.max_queue_size, transport));
        sessions.insert(id.clone(), Arc::clone(&session));
        session
    }

    pub fn get(&self, id: &GuildId) -> Option<Arc<Session>> {
        self.lock().get(id).cloned()
    }

    /// Tears the session down. Returns `false` if it did not exist.
    pub async fn leave(&self, id: &GuildId) -> bool {
        let session = self.lock().remove(id);
        match session {
            Some(session) => {
                tracing::info!(guild = %id, "leaving session");
                session.shutdown().await;
                true
            }
            None => false,
        }
    }

    pub fn list(&self) -> Vec<GuildId> {
        let mut ids: Vec<GuildId> = self.lock().keys().cloned().collect();
        ids.sort();
        ids
    }

    pub async fn shutdown(&self) {
        let sessions: Vec<Arc<Session>> = self.lock().drain().map(|(_, s)| s).collect();
        for session in sessions {
            session.shutdown().await;
        }
    }
}
