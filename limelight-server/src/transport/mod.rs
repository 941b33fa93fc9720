mod memory;
mod room_service;

pub use memory::InMemoryRoomService;
pub use room_service::{ParticipantRecord, RoomService, ServiceError};
