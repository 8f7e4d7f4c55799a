use crate::geometry::Point;

/// Mouse buttons as reported by `MouseEvent::button()`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PointerButton {
	Primary,
	Middle,
	Other,
}

impl From<i16> for PointerButton {
	fn from(button: i16) -> Self {
		match button {
			0 => PointerButton::Primary,
			1 => PointerButton::Middle,
			_ => PointerButton::Other,
		}
	}
}

/// What lies under the pointer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum HitTarget {
	ConnectHandle(String),
	Node(String),
	Edge(String),
	Background,
}

/// The gesture in progress. Exactly one at a time.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum Interaction {
	#[default]
	Idle,
	DraggingNode {
		node_id: String,
		/// Pointer position minus node position, in canvas space.
		grab_offset: Point,
		moved: bool,
	},
	Connecting {
		source_id: String,
		/// Current pointer position, in canvas space.
		pointer: Point,
	},
	Panning {
		/// Last pointer position, in screen space.
		last: Point,
		moved: bool,
		from_background: bool,
	},
}

impl Interaction {
	pub fn is_idle(&self) -> bool {
		matches!(self, Interaction::Idle)
	}

	pub fn dragged_node(&self) -> Option<&str> {
		match self {
			Interaction::DraggingNode { node_id, .. } => Some(node_id),
			_ => None,
		}
	}

	/// CSS cursor for the canvas while this gesture runs.
	pub fn cursor(&self) -> &'static str {
		match self {
			Interaction::Idle => "default",
			Interaction::DraggingNode { .. } | Interaction::Panning { .. } => "grabbing",
			Interaction::Connecting { .. } => "crosshair",
		}
	}
}

/// Selection lives beside the gesture, not inside it.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum Selection {
	#[default]
	None,
	Node(String),
	Edge(String),
}

/// Side effects a finished gesture asks the editor to carry out.
#[derive(Clone, Debug, PartialEq)]
pub enum GestureOutcome {
	/// Fire-and-forget position write with whole-unit coordinates.
	SavePosition { person_id: String, x: f64, y: f64 },
	/// Open the relationship dialog for a new edge.
	ConnectRequest { source_id: String, target_id: String },
}
