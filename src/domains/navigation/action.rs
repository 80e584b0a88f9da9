use serde::{Deserialize, Serialize};

/// Look speed (pixels per frame) sent with turning actions.
pub const LOOK_SPEED: i32 = 20;

/// Discrete motion commands understood by the simulator layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    TurnLeft,
    TurnRight,
    Forward,
    TurnLeftForward,
    TurnRightForward,
}

impl Action {
    pub const ALL: [Action; 5] = [
        Action::TurnLeft,
        Action::TurnRight,
        Action::Forward,
        Action::TurnLeftForward,
        Action::TurnRightForward,
    ];

    /// Label stored with recorded frames.
    pub fn index(self) -> u8 {
        match self {
            Action::TurnLeft => 0,
            Action::TurnRight => 1,
            Action::Forward => 2,
            Action::TurnLeftForward => 3,
            Action::TurnRightForward => 4,
        }
    }

    pub fn from_index(index: u8) -> Option<Self> {
        Self::ALL.get(index as usize).copied()
    }

    pub fn name(self) -> &'static str {
        match self {
            Action::TurnLeft => "turn_left",
            Action::TurnRight => "turn_right",
            Action::Forward => "forward",
            Action::TurnLeftForward => "turn_left_forward",
            Action::TurnRightForward => "turn_right_forward",
        }
    }

    /// Seven-axis control vector: look left/right, look up/down,
    /// strafe, move forward/back, fire, jump, crouch. A positive look
    /// lowers simulator yaw, so yaw-increasing turns send a negative look.
    pub fn to_vector(self) -> [i32; 7] {
        let look = -LOOK_SPEED * i32::from(self.turn_sign());
        let forward = i32::from(self.moves_forward());
        [look, 0, 0, forward, 0, 0, 0]
    }

    /// Sign of the yaw change: +1 for right turns, -1 for left, 0 otherwise.
    pub fn turn_sign(self) -> i8 {
        match self {
            Action::TurnRight | Action::TurnRightForward => 1,
            Action::TurnLeft | Action::TurnLeftForward => -1,
            Action::Forward => 0,
        }
    }

    pub fn moves_forward(self) -> bool {
        matches!(
            self,
            Action::Forward | Action::TurnLeftForward | Action::TurnRightForward
        )
    }
}
