use limelight_core::Identity;

use crate::room::RoomHandle;
use crate::stage::{ActionState, MembershipObserver, StageController};

const GUEST_NAME: &str = "Guest";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RosterEntry {
    pub identity: Identity,
    pub display_name: String,
    pub action: ActionState,
}

/// Remote participants split by stage membership, each list in join order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Roster {
    pub on_stage: Vec<RosterEntry>,
    pub backstage: Vec<RosterEntry>,
}

impl Roster {
    pub fn build(
        room: &RoomHandle,
        observer: &MembershipObserver,
        controller: Option<&StageController>,
    ) -> Self {
        let mut roster = Self::default();

        for participant in room.remote_participants() {
            let display_name = match participant.display_name.trim() {
                "" => GUEST_NAME.to_string(),
                name => name.to_string(),
            };
            let action = controller
                .map(|c| c.state(&participant.identity))
                .unwrap_or_default();
            let on_stage = observer.is_on_stage(&participant.identity);
            let entry = RosterEntry {
                identity: participant.identity,
                display_name,
                action,
            };

            if on_stage {
                roster.on_stage.push(entry);
            } else {
                roster.backstage.push(entry);
            }
        }

        roster
    }
}
