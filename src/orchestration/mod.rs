pub mod cache;
pub mod guard;
pub mod recommender;

pub use cache::{SnapshotCache, SymbolSnapshot, DEFAULT_CACHE_CAPACITY};
pub use guard::{InputFingerprint, SelectionGuard};
pub use recommender::{RecommendationService, RecommendationSet, ServiceError};
