mod auth;
mod player;
mod queue;
mod registry;
mod session;

pub use auth::TokenManager;
pub use player::PlaybackController;
pub use player::PlaybackStatus;
pub use queue::Enqueued;
pub use queue::QueueEntry;
pub use queue::QueueStore;
pub use queue::QueueView;
pub use registry::SessionRegistry;
pub use registry::TransportFactory;
pub use session::Session;
pub use session::SessionStatus;
