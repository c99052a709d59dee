//! Per-frame session controller
//!
//! Owns the cursor store, projector, smoothing engine, terrain model and
//! session bridge. The frame clock calls [`SessionController::update`] once
//! per display refresh; everything a renderer needs comes back in the
//! returned [`FrameOutput`].

use crate::bridge::{BridgeEvent, SessionBridge};
use crate::config::SessionConfig;
use crate::palette::random_color;
use crate::smoothing::SmoothingEngine;
use crate::store::CursorStateStore;
use contour_core::{Camera, PointerInput, PointerTracker, Projector, Viewport};
use contour_network::{NetworkResult, PeerId, SessionStatus, SessionTransport};
use contour_terrain::{
    build_markers, DisplayMode, InfluenceField, Marker, MarkerInput, TerrainModel, TerrainUniforms,
};
use glam::Vec2;

/// Inputs gathered since the previous frame
#[derive(Debug, Clone, Copy)]
pub struct FrameInputs {
    /// Latest pointer event, if any
    pub pointer: Option<PointerInput>,
    pub viewport: Viewport,
    pub display_mode: DisplayMode,
    /// Camera for this frame when it moved
    pub camera: Option<Camera>,
}

impl FrameInputs {
    pub fn idle(viewport: Viewport, display_mode: DisplayMode) -> Self {
        Self {
            pointer: None,
            viewport,
            display_mode,
            camera: None,
        }
    }

    pub fn with_pointer(mut self, pointer: PointerInput) -> Self {
        self.pointer = Some(pointer);
        self
    }
}

/// Everything the renderer consumes for one frame
#[derive(Debug, Clone)]
pub struct FrameOutput {
    /// Elapsed session time in seconds
    pub time: f32,
    pub influence: InfluenceField,
    pub uniforms: TerrainUniforms,
    pub markers: Vec<Marker>,
    pub status: SessionStatus,
    pub peer_count: usize,
    /// Local surface position broadcast this frame
    pub sent: Option<Vec2>,
    /// Store changes applied from the transport this frame
    pub events: Vec<BridgeEvent>,
}

pub struct SessionController<T: SessionTransport> {
    config: SessionConfig,
    store: CursorStateStore,
    smoothing: SmoothingEngine,
    projector: Projector,
    tracker: PointerTracker,
    model: TerrainModel,
    bridge: SessionBridge<T>,
    elapsed: f32,
}

impl<T: SessionTransport> SessionController<T> {
    /// Controller with a random palette color for the local peer
    pub fn new(config: SessionConfig, transport: T) -> NetworkResult<Self> {
        Self::with_color(config, transport, random_color())
    }

    pub fn with_color(
        config: SessionConfig,
        transport: T,
        color: impl Into<String>,
    ) -> NetworkResult<Self> {
        let color = color.into();
        let bridge = SessionBridge::new(transport, color.clone())?;

        Ok(Self {
            store: CursorStateStore::new(color),
            smoothing: config.smoothing_engine(),
            projector: config.projector(),
            tracker: PointerTracker::new(),
            model: TerrainModel::new(config.terrain),
            bridge,
            elapsed: 0.0,
            config,
        })
    }

    /// Join the configured room, registering peers already present
    pub async fn join(&mut self) -> NetworkResult<Vec<PeerId>> {
        self.bridge.join(&self.config.room, &mut self.store).await
    }

    /// Advance one frame
    ///
    /// Order: pointer projection and broadcast, transport events into the
    /// store, smoothing, then influence field, uniforms and markers.
    pub fn update(&mut self, dt: f32, inputs: &FrameInputs) -> FrameOutput {
        let dt = if dt.is_finite() { dt.max(0.0) } else { 0.0 };
        self.elapsed += dt;

        if let Some(camera) = inputs.camera {
            self.projector.set_camera(camera);
        }

        let sent = inputs
            .pointer
            .and_then(|pointer| self.tracker.track(pointer))
            .and_then(|pixel| self.projector.project(pixel, inputs.viewport));
        if let Some(surface) = sent {
            self.store.set_local(surface);
            self.bridge.send_local_position(surface);
        }

        let events = self.bridge.pump(&mut self.store);
        self.smoothing.step(&mut self.store, dt);

        let influence = InfluenceField::from_points(self.store.influence_points());
        let uniforms = TerrainUniforms::new(
            self.elapsed,
            &influence,
            self.model.params(),
            &self.config.contour,
            inputs.display_mode,
        );
        let markers = build_markers(
            self.store.iter().filter_map(|entry| {
                entry.position.map(|position| MarkerInput {
                    id: entry.id.as_str(),
                    label: &entry.label,
                    color: &entry.color,
                    surface: position.avatar,
                    is_local: entry.is_local(),
                })
            }),
            self.projector.frame(),
            &self.model,
            self.elapsed,
            &influence,
        );

        FrameOutput {
            time: self.elapsed,
            influence,
            uniforms,
            markers,
            status: self.bridge.status(),
            peer_count: self.bridge.active_peer_count(),
            sent,
            events,
        }
    }

    /// Tear down the session; the store keeps only the local entry
    pub async fn close(&mut self) -> NetworkResult<()> {
        self.bridge.close(&mut self.store).await
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn store(&self) -> &CursorStateStore {
        &self.store
    }

    pub fn bridge(&self) -> &SessionBridge<T> {
        &self.bridge
    }

    pub fn model(&self) -> &TerrainModel {
        &self.model
    }

    pub fn projector(&self) -> &Projector {
        &self.projector
    }

    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contour_core::ProjectionMode;
    use contour_network::LoopbackHub;

    fn screen_config() -> SessionConfig {
        let mut config = SessionConfig::default();
        config.projection.mode = ProjectionMode::Screen;
        config
    }

    #[tokio::test]
    async fn test_pointer_move_updates_local_and_broadcasts() {
        let hub = LoopbackHub::new();
        let mut a = SessionController::with_color(screen_config(), hub.connect(), "#FF5733").unwrap();
        let mut b = SessionController::with_color(screen_config(), hub.connect(), "#33FF57").unwrap();
        a.join().await.unwrap();
        b.join().await.unwrap();

        let viewport = Viewport::new(200.0, 100.0);
        let inputs = FrameInputs::idle(viewport, DisplayMode::Dark)
            .with_pointer(PointerInput::Moved { x: 50.0, y: 25.0 });
        let out = a.update(1.0 / 60.0, &inputs);

        assert_eq!(out.sent, Some(Vec2::new(0.25, 0.25)));
        assert_eq!(out.peer_count, 2);
        assert_eq!(out.influence.len(), 1);
        assert_eq!(out.markers.len(), 1);
        assert!(out.markers[0].is_local);

        let out_b = b.update(1.0 / 60.0, &FrameInputs::idle(viewport, DisplayMode::Dark));
        assert!(out_b.events.iter().any(|e| matches!(
            e,
            BridgeEvent::RemoteUpdate { position, .. } if *position == Vec2::new(0.25, 0.25)
        )));
        assert_eq!(out_b.influence.as_slice(), &[Vec2::new(0.25, 0.25)]);
    }

    #[tokio::test]
    async fn test_join_failure_keeps_rendering() {
        let hub = LoopbackHub::new();
        let transport = hub.connect();
        hub.disconnect(transport.local_peer_id());

        let mut controller = SessionController::new(screen_config(), transport).unwrap();
        assert!(controller.join().await.is_err());

        let viewport = Viewport::new(100.0, 100.0);
        let out = controller.update(
            0.1,
            &FrameInputs::idle(viewport, DisplayMode::Light)
                .with_pointer(PointerInput::Moved { x: 10.0, y: 90.0 }),
        );
        assert_eq!(out.status, SessionStatus::Error);
        assert_eq!(out.status.label(), "Error");
        assert!(out.sent.is_some());
        assert_eq!(out.influence.len(), 1);
        assert_eq!(out.uniforms.dark_mode, 0);
        assert_eq!(controller.bridge().info().messages_sent, 0);
    }

    #[tokio::test]
    async fn test_scroll_replays_last_pointer() {
        let hub = LoopbackHub::new();
        let mut controller =
            SessionController::with_color(SessionConfig::default(), hub.connect(), "#FF5733").unwrap();
        controller.join().await.unwrap();
        let viewport = Viewport::new(800.0, 600.0);

        // Pointer at the center hits the plane ahead of the default camera
        let moved = FrameInputs::idle(viewport, DisplayMode::Dark)
            .with_pointer(PointerInput::Moved { x: 400.0, y: 300.0 });
        assert!(controller.update(0.016, &moved).sent.is_some());

        // Stationary pointer, camera slid sideways under it
        let mut camera = *controller.projector().camera();
        camera.position.x += 1.0;
        let scrolled = FrameInputs {
            camera: Some(camera),
            ..FrameInputs::idle(viewport, DisplayMode::Dark).with_pointer(PointerInput::Scrolled)
        };
        let out = controller.update(0.016, &scrolled);
        assert!(out.sent.is_some());
        assert_eq!(out.time, 0.032);
    }
}
