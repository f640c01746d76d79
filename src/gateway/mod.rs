pub mod dispatcher;
pub mod orchestrator;
pub mod publisher;
pub mod rewards;

pub use dispatcher::ChannelDispatcher;
pub use orchestrator::GatewayOrchestrator;
pub use publisher::RewardPublisher;
pub use rewards::RewardEventBuilder;
