pub mod config;
pub mod gateway;
pub mod room;
pub mod roster;
pub mod stage;
pub mod subscriptions;
pub mod view;

pub use config::ClientConfig;
pub use gateway::{GatewayError, HttpStageGateway, StageGateway};
pub use room::{ParticipantView, RoomHandle, Subscription};
pub use roster::{Roster, RosterEntry};
pub use stage::{ActionState, MembershipObserver, StageAction, StageController};
pub use subscriptions::{StageSubscriptionManager, TrackSubscriber};
pub use view::StageView;
