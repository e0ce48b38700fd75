//! Turtle state, the branch stack and the command set the turtle understands.

use crate::error::{Error, Result};
use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

/// The position and orientation of the drawing turtle.
///
/// The canonical frame is right = +X, forward = +Y, up = +Z. Orientation is
/// stored as a quaternion; the three axes are derived from it and therefore
/// always orthonormal.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct TurtleState {
    /// Current world-space position of the turtle.
    pub position: Vec3,

    /// Current world-space orientation.
    pub rotation: Quat,
}

impl Default for TurtleState {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
        }
    }
}

impl TurtleState {
    /// Returns the turtle's heading (local Y axis) in world space.
    pub fn forward(&self) -> Vec3 {
        self.rotation * Vec3::Y
    }

    /// Returns the turtle's local up direction (Z axis) in world space.
    pub fn up(&self) -> Vec3 {
        self.rotation * Vec3::Z
    }

    /// Returns the turtle's local right direction (X axis) in world space.
    pub fn right(&self) -> Vec3 {
        self.rotation * Vec3::X
    }

    /// Moves the turtle `distance` along its heading.
    pub fn advance(&mut self, distance: f32) {
        self.position += self.forward() * distance;
    }

    /// Rotates about the local up axis. Positive angles turn left
    /// (counter-clockwise seen from above).
    pub fn yaw(&mut self, angle: f32) {
        self.rotation *= Quat::from_axis_angle(Vec3::Z, angle);
    }

    /// Rotates about the local right axis. Positive angles lift the heading.
    pub fn pitch(&mut self, angle: f32) {
        self.rotation *= Quat::from_axis_angle(Vec3::X, angle);
    }

    /// Rotates about the heading.
    pub fn roll(&mut self, angle: f32) {
        self.rotation *= Quat::from_axis_angle(Vec3::Y, angle);
    }
}

/// Open-branch limit used when none is configured.
pub const DEFAULT_MAX_STACK_DEPTH: usize = 1024;

/// Saved turtle states for bracketed branches.
///
/// States are stored by value: a snapshot never aliases the live turtle.
#[derive(Clone, Debug)]
pub struct TurtleStack {
    states: Vec<TurtleState>,
    max_depth: usize,
}

impl Default for TurtleStack {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_STACK_DEPTH)
    }
}

impl TurtleStack {
    pub fn new(max_depth: usize) -> Self {
        Self {
            states: Vec::new(),
            max_depth,
        }
    }

    /// Saves `state`. `position` is the module index, used for error reporting.
    pub fn push(&mut self, state: TurtleState, position: usize) -> Result<()> {
        if self.states.len() >= self.max_depth {
            return Err(Error::StackOverflow {
                position,
                max: self.max_depth,
            });
        }
        self.states.push(state);
        Ok(())
    }

    pub fn pop(&mut self, position: usize) -> Result<TurtleState> {
        self.states.pop().ok_or(Error::StackUnderflow { position })
    }

    pub fn depth(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }
}

/// Operations an interpretation rule can bind a symbol to.
///
/// Resolved from the command name once, when the script is parsed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Command {
    // --- Motion ---
    /// Move without marking the segment as geometry of its own.
    MoveForward,
    /// Move and draw a line segment.
    DrawLine,
    /// Move and draw a segment that ends in a leaf.
    DrawLeaf,

    // --- Rotation ---
    /// Rotate about the up axis.
    Yaw,
    /// Rotate about the right axis.
    Pitch,
    /// Rotate about the forward axis.
    Roll,
    /// Positive yaw.
    RotateLeft,
    /// Negative yaw.
    RotateRight,
    /// Yaw by half a turn.
    TurnAround,

    // --- Branching ---
    PushStack,
    StartBranch,
    PopStack,
    EndBranch,

    // --- Polygons ---
    StartPolygon,
    RecordPolygonVertex,
    EndPolygon,

    /// Symbol has a registered meaning of "do nothing".
    Ignore,
}

impl Command {
    pub const ALL: [Command; 17] = [
        Command::MoveForward,
        Command::DrawLine,
        Command::DrawLeaf,
        Command::Yaw,
        Command::Pitch,
        Command::Roll,
        Command::RotateLeft,
        Command::RotateRight,
        Command::TurnAround,
        Command::PushStack,
        Command::StartBranch,
        Command::PopStack,
        Command::EndBranch,
        Command::StartPolygon,
        Command::RecordPolygonVertex,
        Command::EndPolygon,
        Command::Ignore,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Command::MoveForward => "MoveForward",
            Command::DrawLine => "DrawLine",
            Command::DrawLeaf => "DrawLeaf",
            Command::Yaw => "Yaw",
            Command::Pitch => "Pitch",
            Command::Roll => "Roll",
            Command::RotateLeft => "RotateLeft",
            Command::RotateRight => "RotateRight",
            Command::TurnAround => "TurnAround",
            Command::PushStack => "PushStack",
            Command::StartBranch => "StartBranch",
            Command::PopStack => "PopStack",
            Command::EndBranch => "EndBranch",
            Command::StartPolygon => "StartPolygon",
            Command::RecordPolygonVertex => "RecordPolygonVertex",
            Command::EndPolygon => "EndPolygon",
            Command::Ignore => "Ignore",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.name() == name)
    }

    /// Maximum number of arguments the command accepts.
    ///
    /// Motion and rotation take an optional magnitude; everything else takes none.
    pub fn max_args(self) -> usize {
        match self {
            Command::MoveForward
            | Command::DrawLine
            | Command::DrawLeaf
            | Command::Yaw
            | Command::Pitch
            | Command::Roll
            | Command::RotateLeft
            | Command::RotateRight => 1,
            _ => 0,
        }
    }
}
