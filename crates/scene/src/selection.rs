use catalog::StationPoint;
use clustering::{Cluster, DrillDownPlan, plan_drill_down};
use foundation::math::GeoPoint;
use serde::{Deserialize, Serialize};

/// What the viewer currently focuses on.
///
/// Drill-down artifacts exist exactly while the state is `ClusterSelected`;
/// the plan that describes them lives inside that variant.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum SelectionState {
    #[default]
    NoSelection,
    StationSelected { station: StationPoint },
    ClusterSelected { cluster: Cluster, plan: DrillDownPlan },
}

impl SelectionState {
    pub fn drill_down(&self) -> Option<&DrillDownPlan> {
        match self {
            SelectionState::ClusterSelected { plan, .. } => Some(plan),
            _ => None,
        }
    }

    pub fn selected_station(&self) -> Option<&StationPoint> {
        match self {
            SelectionState::StationSelected { station } => Some(station),
            _ => None,
        }
    }

    pub fn selected_cluster(&self) -> Option<&Cluster> {
        match self {
            SelectionState::ClusterSelected { cluster, .. } => Some(cluster),
            _ => None,
        }
    }
}

/// Pick/dismiss events coming from the host UI.
///
/// Unrecognized event tags deserialize to `Unknown`, which never changes state.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SelectionEvent {
    PickStation { station: StationPoint },
    PickCluster { cluster: Cluster },
    PickEmpty,
    Close,
    #[serde(other)]
    Unknown,
}

/// Instructions for the rendering and camera collaborators, in order.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "effect", rename_all = "snake_case")]
pub enum SideEffect {
    /// Remove the drill-down circle and radial labels.
    TeardownDrillDown,
    /// Draw the circle and radial members described by the plan.
    SetupDrillDown { plan: DrillDownPlan },
    /// Move the camera above `target` at `distance_m`.
    FlyTo { target: GeoPoint, distance_m: f64 },
}

/// State owned outside this engine that gates transitions.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub struct TransitionContext {
    /// Set by the player while a station's playback is pinned; blocks `PickEmpty`.
    pub station_locked: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    pub state: SelectionState,
    pub effects: Vec<SideEffect>,
}

impl Transition {
    fn unchanged(state: SelectionState) -> Self {
        Self {
            state,
            effects: Vec::new(),
        }
    }
}

/// Pure selection transition.
///
/// - `PickStation` always selects the station.
/// - `PickCluster` always selects the cluster and plans its drill-down.
/// - `PickEmpty` clears the selection unless the station is locked.
/// - `Close` always clears the selection.
/// - `Unknown` is a no-op.
///
/// `TeardownDrillDown` is emitted whenever a `ClusterSelected` state is left,
/// before any setup for the next state.
pub fn transition(state: SelectionState, event: SelectionEvent, ctx: TransitionContext) -> Transition {
    let had_drill_down = state.drill_down().is_some();
    let mut effects = Vec::new();

    let next = match event {
        SelectionEvent::Unknown => return Transition::unchanged(state),
        SelectionEvent::PickEmpty if ctx.station_locked => return Transition::unchanged(state),
        SelectionEvent::PickStation { station } => SelectionState::StationSelected { station },
        SelectionEvent::PickCluster { cluster } => {
            let plan = plan_drill_down(&cluster);
            SelectionState::ClusterSelected { cluster, plan }
        }
        SelectionEvent::PickEmpty | SelectionEvent::Close => SelectionState::NoSelection,
    };

    if had_drill_down {
        effects.push(SideEffect::TeardownDrillDown);
    }
    if let Some(plan) = next.drill_down() {
        effects.push(SideEffect::SetupDrillDown { plan: plan.clone() });
        effects.push(SideEffect::FlyTo {
            target: plan.circle_center,
            distance_m: plan.camera_distance_m,
        });
    }

    Transition { state: next, effects }
}

/// Mutable holder for hosts that keep the selection in one place.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct SelectionController {
    state: SelectionState,
}

impl SelectionController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &SelectionState {
        &self.state
    }

    pub fn drill_down(&self) -> Option<&DrillDownPlan> {
        self.state.drill_down()
    }

    /// Applies `event` and returns the side effects to execute.
    pub fn apply(&mut self, event: SelectionEvent, ctx: TransitionContext) -> Vec<SideEffect> {
        let current = std::mem::take(&mut self.state);
        let Transition { state, effects } = transition(current, event, ctx);
        self.state = state;
        effects
    }
}
