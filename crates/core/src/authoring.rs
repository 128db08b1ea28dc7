//! Authoring state: an explicit `{zone -> PlacementState}` map driven by a
//! pure reducer.
//!
//! Every zone supports the same actions, including reset and undo, so there
//! is no per-zone setter code. [`AuthoringSession::freeze`] produces the
//! immutable [`CustomizationRecord`] that goes onto an order item.

use std::collections::{BTreeMap, VecDeque};

use crate::customization::{CustomizationRecord, ImageLayer, PlacementEntry, Position, TextLayer};
use crate::zone::{PlacementZone, IMAGE_SCALE_RANGE, TEXT_SCALE_RANGE};

/// Maximum undo depth kept per zone.
pub const UNDO_DEPTH: usize = 50;

// ---------------------------------------------------------------------------
// State
// ---------------------------------------------------------------------------

/// Live editing state for one zone. All parameters are always present.
#[derive(Debug, Clone, PartialEq)]
pub struct PlacementState {
    pub image: Option<ImageLayer>,
    pub text: Option<TextLayer>,
    pub position: Position,
    pub scale: f64,
    /// Degrees, kept within `[-180, 180]`.
    pub rotation: f64,
}

impl PlacementState {
    /// Fresh state for `zone`: no layers, zone-default scale, centered.
    pub fn initial(zone: PlacementZone) -> Self {
        Self {
            image: None,
            text: None,
            position: Position::ORIGIN,
            scale: zone.calibration().default_scale,
            rotation: 0.0,
        }
    }

    fn from_entry(zone: PlacementZone, entry: &PlacementEntry) -> Self {
        let resolved = entry.resolve(zone);
        Self {
            image: entry.image.clone(),
            text: entry.text.clone(),
            position: resolved.position,
            scale: resolved.scale,
            rotation: resolved.rotation,
        }
    }

    pub fn is_unused(&self) -> bool {
        self.image.is_none() && self.text.is_none()
    }

    /// Entry for the frozen record, or `None` when the zone is unused.
    pub fn to_entry(&self) -> Option<PlacementEntry> {
        if self.is_unused() {
            return None;
        }
        Some(PlacementEntry {
            image: self.image.clone(),
            text: self.text.clone(),
            position: Some(self.position),
            scale: Some(self.scale),
            rotation: Some(self.rotation),
        })
    }

    fn scale_range(&self) -> (f64, f64) {
        if self.image.is_some() {
            IMAGE_SCALE_RANGE
        } else {
            TEXT_SCALE_RANGE
        }
    }

    fn clamp_scale(&mut self) {
        let (min, max) = self.scale_range();
        self.scale = self.scale.clamp(min, max);
    }
}

/// Wrap an angle in degrees into `[-180, 180]`.
pub fn wrap_degrees(degrees: f64) -> f64 {
    if (-180.0..=180.0).contains(&degrees) {
        return degrees;
    }
    let wrapped = (degrees + 180.0).rem_euclid(360.0) - 180.0;
    if wrapped == -180.0 && degrees > 0.0 {
        180.0
    } else {
        wrapped
    }
}

// ---------------------------------------------------------------------------
// Actions
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub enum AuthoringAction {
    SetImage { zone: PlacementZone, image: ImageLayer },
    ClearImage { zone: PlacementZone },
    SetText { zone: PlacementZone, text: TextLayer },
    ClearText { zone: PlacementZone },
    Move { zone: PlacementZone, position: Position },
    Scale { zone: PlacementZone, scale: f64 },
    Rotate { zone: PlacementZone, degrees: f64 },
    ResetZone { zone: PlacementZone },
    Undo { zone: PlacementZone },
}

impl AuthoringAction {
    pub fn zone(&self) -> PlacementZone {
        match self {
            Self::SetImage { zone, .. }
            | Self::ClearImage { zone }
            | Self::SetText { zone, .. }
            | Self::ClearText { zone }
            | Self::Move { zone, .. }
            | Self::Scale { zone, .. }
            | Self::Rotate { zone, .. }
            | Self::ResetZone { zone }
            | Self::Undo { zone } => *zone,
        }
    }
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

/// All four zones' editing state plus per-zone undo history.
#[derive(Debug, Clone, PartialEq)]
pub struct AuthoringSession {
    zones: BTreeMap<PlacementZone, PlacementState>,
    history: BTreeMap<PlacementZone, VecDeque<PlacementState>>,
}

impl Default for AuthoringSession {
    fn default() -> Self {
        Self::new()
    }
}

impl AuthoringSession {
    pub fn new() -> Self {
        let zones = PlacementZone::ALL
            .into_iter()
            .map(|zone| (zone, PlacementState::initial(zone)))
            .collect();
        Self {
            zones,
            history: BTreeMap::new(),
        }
    }

    /// Resume editing from an existing record (e.g. "order again").
    pub fn from_record(record: &CustomizationRecord) -> Self {
        let mut session = Self::new();
        for (zone, entry) in record.used_zones() {
            session.zones.insert(zone, PlacementState::from_entry(zone, entry));
        }
        session
    }

    pub fn state(&self, zone: PlacementZone) -> &PlacementState {
        // Every zone is inserted in `new`.
        &self.zones[&zone]
    }

    pub fn can_undo(&self, zone: PlacementZone) -> bool {
        self.history.get(&zone).is_some_and(|h| !h.is_empty())
    }

    /// Snapshot the session into an immutable record.
    pub fn freeze(&self) -> CustomizationRecord {
        let mut record = CustomizationRecord::default();
        for (zone, state) in &self.zones {
            record.set(*zone, state.to_entry());
        }
        record
    }
}

/// Apply one action. Pure: the input session is consumed and a new one
/// returned; no other state is touched.
pub fn reduce(mut session: AuthoringSession, action: AuthoringAction) -> AuthoringSession {
    let zone = action.zone();

    if let AuthoringAction::Undo { .. } = action {
        if let Some(previous) = session.history.get_mut(&zone).and_then(VecDeque::pop_back) {
            session.zones.insert(zone, previous);
        }
        return session;
    }

    let current = session.state(zone).clone();
    let mut next = current.clone();
    let range = zone.calibration().position_range;

    match action {
        AuthoringAction::SetImage { image, .. } => {
            next.image = Some(image);
            next.clamp_scale();
        }
        AuthoringAction::ClearImage { .. } => next.image = None,
        AuthoringAction::SetText { text, .. } => next.text = Some(text),
        AuthoringAction::ClearText { .. } => next.text = None,
        AuthoringAction::Move { position, .. } => {
            if position.x.is_finite() && position.y.is_finite() {
                let (x, y) = range.clamp(position.x, position.y);
                next.position = Position::new(x, y);
            }
        }
        AuthoringAction::Scale { scale, .. } => {
            if scale.is_finite() {
                next.scale = scale;
                next.clamp_scale();
            }
        }
        AuthoringAction::Rotate { degrees, .. } => {
            if degrees.is_finite() {
                next.rotation = wrap_degrees(degrees);
            }
        }
        AuthoringAction::ResetZone { .. } => next = PlacementState::initial(zone),
        AuthoringAction::Undo { .. } => unreachable!("handled above"),
    }

    if next != current {
        let history = session.history.entry(zone).or_default();
        if history.len() == UNDO_DEPTH {
            history.pop_front();
        }
        history.push_back(current);
        session.zones.insert(zone, next);
    }

    session
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn image() -> ImageLayer {
        ImageLayer {
            url: "https://cdn.example.com/logo.png".into(),
            asset_id: None,
        }
    }

    fn text() -> TextLayer {
        TextLayer {
            value: "Hello".into(),
            font: "Inter".into(),
            color: "#112233".into(),
        }
    }

    fn apply(session: AuthoringSession, actions: Vec<AuthoringAction>) -> AuthoringSession {
        actions.into_iter().fold(session, reduce)
    }

    #[test]
    fn new_session_freezes_to_empty_record() {
        assert!(AuthoringSession::new().freeze().is_empty());
    }

    #[test]
    fn moves_are_clamped_to_zone_range() {
        let zone = PlacementZone::LeftShoulder;
        let s = reduce(
            AuthoringSession::new(),
            AuthoringAction::Move {
                zone,
                position: Position::new(0.5, -0.5),
            },
        );
        assert_eq!(s.state(zone).position, Position::new(0.05, -0.05));
    }

    #[test]
    fn non_finite_input_is_ignored() {
        let zone = PlacementZone::Back;
        let s = apply(
            AuthoringSession::new(),
            vec![
                AuthoringAction::Move {
                    zone,
                    position: Position::new(f64::NAN, 0.0),
                },
                AuthoringAction::Move {
                    zone,
                    position: Position::new(0.0, f64::INFINITY),
                },
                AuthoringAction::Scale {
                    zone,
                    scale: f64::NAN,
                },
                AuthoringAction::Rotate {
                    zone,
                    degrees: f64::NEG_INFINITY,
                },
            ],
        );
        assert_eq!(s.state(zone), &PlacementState::initial(zone));
        assert!(!s.can_undo(zone));
    }

    #[test]
    fn adding_an_image_tightens_scale() {
        let zone = PlacementZone::Front;
        let s = apply(
            AuthoringSession::new(),
            vec![
                AuthoringAction::SetText { zone, text: text() },
                AuthoringAction::Scale { zone, scale: 1.8 },
                AuthoringAction::SetImage {
                    zone,
                    image: image(),
                },
            ],
        );
        assert_eq!(s.state(zone).scale, 1.0);
    }

    #[test]
    fn rotation_wraps() {
        assert_eq!(wrap_degrees(190.0), -170.0);
        assert_eq!(wrap_degrees(-190.0), 170.0);
        assert_eq!(wrap_degrees(180.0), 180.0);
        assert_eq!(wrap_degrees(540.0), 180.0);
        assert_eq!(wrap_degrees(45.0), 45.0);
    }

    #[test]
    fn undo_restores_previous_state_per_zone() {
        let s = apply(
            AuthoringSession::new(),
            vec![
                AuthoringAction::SetImage {
                    zone: PlacementZone::Front,
                    image: image(),
                },
                AuthoringAction::Rotate {
                    zone: PlacementZone::Front,
                    degrees: 30.0,
                },
                AuthoringAction::SetText {
                    zone: PlacementZone::Back,
                    text: text(),
                },
                AuthoringAction::Undo {
                    zone: PlacementZone::Front,
                },
            ],
        );
        assert_eq!(s.state(PlacementZone::Front).rotation, 0.0);
        assert!(s.state(PlacementZone::Front).image.is_some());
        assert!(s.state(PlacementZone::Back).text.is_some());
    }

    #[test]
    fn undo_with_empty_history_is_a_no_op() {
        let s = AuthoringSession::new();
        let undo = AuthoringAction::Undo {
            zone: PlacementZone::Back,
        };
        let after = reduce(s.clone(), undo);
        assert_eq!(s, after);
    }

    #[test]
    fn no_op_actions_do_not_grow_history() {
        let zone = PlacementZone::Back;
        let s = reduce(AuthoringSession::new(), AuthoringAction::Rotate { zone, degrees: 0.0 });
        assert!(!s.can_undo(zone));
    }

    #[test]
    fn reset_is_undoable() {
        let zone = PlacementZone::RightShoulder;
        let s = apply(
            AuthoringSession::new(),
            vec![
                AuthoringAction::SetImage {
                    zone,
                    image: image(),
                },
                AuthoringAction::ResetZone { zone },
            ],
        );
        assert!(s.state(zone).is_unused());
        let s = reduce(s, AuthoringAction::Undo { zone });
        assert!(s.state(zone).image.is_some());
    }

    #[test]
    fn history_is_bounded() {
        let zone = PlacementZone::Front;
        let set_image = AuthoringAction::SetImage {
            zone,
            image: image(),
        };
        let mut s = reduce(AuthoringSession::new(), set_image);
        for i in 0..(UNDO_DEPTH + 10) {
            let degrees = (i + 1) as f64;
            s = reduce(s, AuthoringAction::Rotate { zone, degrees });
        }
        let mut undos = 0;
        while s.can_undo(zone) {
            s = reduce(s, AuthoringAction::Undo { zone });
            undos += 1;
        }
        assert_eq!(undos, UNDO_DEPTH);
    }

    #[test]
    fn freeze_contains_only_used_zones_and_validates() {
        let s = apply(
            AuthoringSession::new(),
            vec![
                AuthoringAction::SetImage {
                    zone: PlacementZone::Front,
                    image: image(),
                },
                AuthoringAction::Move {
                    zone: PlacementZone::Front,
                    position: Position::new(0.02, 0.01),
                },
                AuthoringAction::Move {
                    zone: PlacementZone::Back,
                    position: Position::new(0.02, 0.01),
                },
            ],
        );
        let record = s.freeze();
        assert!(record.front.is_some());
        assert!(record.back.is_none());
        assert!(record.validate().is_ok());
    }

    #[test]
    fn round_trips_through_record() {
        let s = apply(
            AuthoringSession::new(),
            vec![
                AuthoringAction::SetText {
                    zone: PlacementZone::LeftShoulder,
                    text: text(),
                },
                AuthoringAction::Scale {
                    zone: PlacementZone::LeftShoulder,
                    scale: 1.2,
                },
            ],
        );
        let record = s.freeze();
        let resumed = AuthoringSession::from_record(&record);
        assert_eq!(resumed.freeze(), record);
    }
}
