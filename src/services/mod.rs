mod cache;
mod provisioning;
mod refresh;
mod subscriptions;
mod suggestions;

pub use cache::{MemoryCache, SummaryCache};
pub use provisioning::UserProvisioner;
pub use refresh::{refresh_channel, refresh_summary, RefreshQueue, RefreshTrigger, RefreshWorker};
pub use subscriptions::SubscriptionManager;
pub use suggestions::FeedSuggester;
