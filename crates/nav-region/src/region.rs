//! Navigation region state
//!
//! A region binds a navigation mesh and a transform to a map. Configuration
//! changes only mark the region dirty; [`Region::sync`] rebuilds the polygon
//! list from scratch when needed.

use crate::builder::build_polygons;
use crate::context::SyncContext;
use crate::map::NavMap;
use crate::polygon::{Connection, InstanceId, Polygon, PolygonRef, RegionId};
use glam::{Affine3A, Vec3};
use navmesh_common::{Error, GeometrySource, Result};
use std::fmt;
use std::sync::Arc;

/// Whether the polygon list reflects the current configuration
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize)
)]
pub enum SyncState {
    Clean,
    /// Configuration changed since the last rebuild
    #[default]
    Dirty,
}

impl SyncState {
    pub fn is_dirty(&self) -> bool {
        *self == SyncState::Dirty
    }
}

/// Counts describing a region, for debugging and statistics
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegionSummary {
    pub polygon_count: usize,
    pub point_count: usize,
    /// Connections stored in edge slots across all polygons
    pub edge_connection_count: usize,
    pub connection_count: usize,
    pub state: SyncState,
}

/// A piece of navigable surface with its own transform, mesh and polygons
pub struct Region {
    pub(crate) id: RegionId,
    pub(crate) instance: InstanceId,
    pub(crate) map: Option<Arc<dyn NavMap>>,
    pub(crate) navigation_layers: u32,
    pub(crate) transform: Affine3A,
    pub(crate) mesh: Option<Arc<dyn GeometrySource>>,
    pub(crate) enter_cost: f32,
    pub(crate) travel_cost: f32,
    pub(crate) state: SyncState,
    /// Bumped by every mutation that dirties the region
    pub(crate) generation: u64,
    pub(crate) polygons: Vec<Polygon>,
    pub(crate) connections: Vec<Connection>,
    /// Edge slots pointing at other instances, dropped when this value was duplicated
    pub(crate) dropped_edge_connections: usize,
}

impl Default for Region {
    fn default() -> Self {
        Self::new()
    }
}

impl Region {
    /// Creates an unbound region with no mesh and no polygons
    pub fn new() -> Self {
        Self::with_id(RegionId::next())
    }

    /// Creates a region with a caller-assigned identity
    pub fn with_id(id: RegionId) -> Self {
        Self {
            id,
            instance: InstanceId::next(),
            map: None,
            navigation_layers: 1,
            transform: Affine3A::IDENTITY,
            mesh: None,
            enter_cost: 0.0,
            travel_cost: 1.0,
            state: SyncState::Dirty,
            generation: 0,
            polygons: Vec::new(),
            connections: Vec::new(),
            dropped_edge_connections: 0,
        }
    }

    pub fn id(&self) -> RegionId {
        self.id
    }

    /// Identity of this particular value; differs between a region and its duplicates
    pub fn instance(&self) -> InstanceId {
        self.instance
    }

    fn mark_dirty(&mut self) {
        self.state = SyncState::Dirty;
        self.generation += 1;
    }

    /// Binds the region to a map, or unbinds it with `None`.
    ///
    /// Always invalidates the polygons. Unbinding also drops every connection.
    pub fn set_map(&mut self, map: Option<Arc<dyn NavMap>>) {
        self.map = map;
        self.mark_dirty();
        if self.map.is_none() {
            self.connections.clear();
        }
    }

    pub fn map(&self) -> Option<&Arc<dyn NavMap>> {
        self.map.as_ref()
    }

    pub fn is_bound(&self) -> bool {
        self.map.is_some()
    }

    pub fn set_transform(&mut self, transform: Affine3A) {
        self.transform = transform;
        self.mark_dirty();
    }

    pub fn transform(&self) -> &Affine3A {
        &self.transform
    }

    pub fn set_mesh(&mut self, mesh: Option<Arc<dyn GeometrySource>>) {
        self.mesh = mesh;
        self.mark_dirty();
    }

    pub fn mesh(&self) -> Option<&Arc<dyn GeometrySource>> {
        self.mesh.as_ref()
    }

    pub fn set_navigation_layers(&mut self, navigation_layers: u32) {
        self.navigation_layers = navigation_layers;
    }

    pub fn navigation_layers(&self) -> u32 {
        self.navigation_layers
    }

    pub fn set_enter_cost(&mut self, enter_cost: f32) {
        self.enter_cost = enter_cost.max(0.0);
    }

    pub fn enter_cost(&self) -> f32 {
        self.enter_cost
    }

    pub fn set_travel_cost(&mut self, travel_cost: f32) {
        self.travel_cost = travel_cost.max(0.0);
    }

    pub fn travel_cost(&self) -> f32 {
        self.travel_cost
    }

    pub fn set_costs(&mut self, enter_cost: f32, travel_cost: f32) {
        self.set_enter_cost(enter_cost);
        self.set_travel_cost(travel_cost);
    }

    pub fn sync_state(&self) -> SyncState {
        self.state
    }

    pub fn is_dirty(&self) -> bool {
        self.state.is_dirty()
    }

    /// Configuration generation, bumped by every dirtying mutation
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn polygons(&self) -> &[Polygon] {
        &self.polygons
    }

    pub fn polygon(&self, index: usize) -> Option<&Polygon> {
        self.polygons.get(index)
    }

    /// Reference to polygon `index` of this instance, for use in connections
    pub fn polygon_ref(&self, index: usize) -> Result<PolygonRef> {
        if index >= self.polygons.len() {
            return Err(Error::PolygonOutOfBounds {
                index,
                count: self.polygons.len(),
            });
        }
        Ok(PolygonRef::new(self.instance, index))
    }

    /// Number of connections to other regions; zero while unbound
    pub fn connection_count(&self) -> usize {
        if self.map.is_none() {
            return 0;
        }
        self.connections.len()
    }

    pub fn connections(&self) -> &[Connection] {
        &self.connections
    }

    /// Edge connections to other regions that were not carried over when this
    /// region was created by [`duplicate_for_sync`](Self::duplicate_for_sync)
    pub fn dropped_edge_connections(&self) -> usize {
        self.dropped_edge_connections
    }

    /// Pathway endpoints of connection `index`
    pub fn connection_pathway(&self, index: usize) -> Result<(Vec3, Vec3)> {
        let connection = self.connection(index)?;
        Ok((connection.pathway_start, connection.pathway_end))
    }

    pub fn connection_pathway_start(&self, index: usize) -> Result<Vec3> {
        self.connection(index).map(|c| c.pathway_start)
    }

    pub fn connection_pathway_end(&self, index: usize) -> Result<Vec3> {
        self.connection(index).map(|c| c.pathway_end)
    }

    fn connection(&self, index: usize) -> Result<&Connection> {
        if self.map.is_none() {
            return Err(Error::Unbound);
        }
        self.connections
            .get(index)
            .ok_or(Error::ConnectionOutOfBounds {
                index,
                count: self.connections.len(),
            })
    }

    /// Records a connection discovered by the map
    pub fn add_connection(&mut self, connection: Connection) -> Result<()> {
        if self.map.is_none() {
            return Err(Error::Unbound);
        }
        self.connections.push(connection);
        Ok(())
    }

    pub fn clear_connections(&mut self) {
        self.connections.clear();
    }

    /// Fills a connection slot on edge `edge` of polygon `polygon`
    pub fn add_edge_connection(
        &mut self,
        polygon: usize,
        edge: usize,
        connection: Connection,
    ) -> Result<()> {
        let count = self.polygons.len();
        let target = self
            .polygons
            .get_mut(polygon)
            .ok_or(Error::PolygonOutOfBounds {
                index: polygon,
                count,
            })?;

        let edge_count = target.edges.len();
        target
            .edges
            .get_mut(edge)
            .ok_or(Error::EdgeOutOfBounds {
                polygon,
                index: edge,
                count: edge_count,
            })?
            .connections
            .push(connection);
        Ok(())
    }

    /// Rebuilds the polygons if the region is dirty.
    ///
    /// Returns whether a rebuild happened. The region is always clean afterwards.
    pub fn sync(&mut self) -> bool {
        let mut context = SyncContext::new();
        self.sync_with_context(&mut context)
    }

    /// Same as [`sync`](Self::sync), recording diagnostics into `context`
    pub fn sync_with_context(&mut self, context: &mut SyncContext) -> bool {
        let something_changed = self.state.is_dirty();
        self.update_polygons(context);
        something_changed
    }

    fn update_polygons(&mut self, context: &mut SyncContext) {
        if !self.state.is_dirty() {
            return;
        }
        self.polygons.clear();
        self.state = SyncState::Clean;

        let (Some(map), Some(mesh)) = (self.map.as_deref(), self.mesh.as_deref()) else {
            log::debug!("Region {:?} has no map or mesh, nothing to build", self.id);
            return;
        };

        if mesh.vertex_count() == 0 {
            return;
        }

        self.polygons = build_polygons(self.instance, &self.transform, mesh, map, context);
    }

    /// Summarizes the region's contents
    pub fn summary(&self) -> RegionSummary {
        RegionSummary {
            polygon_count: self.polygons.len(),
            point_count: self.polygons.iter().map(|p| p.points().len()).sum(),
            edge_connection_count: self
                .polygons
                .iter()
                .flat_map(|p| p.edges())
                .map(|e| e.connections.len())
                .sum(),
            connection_count: self.connections.len(),
            state: self.state,
        }
    }
}

impl fmt::Debug for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Region")
            .field("id", &self.id)
            .field("instance", &self.instance)
            .field("bound", &self.map.is_some())
            .field("mesh", &self.mesh.is_some())
            .field("navigation_layers", &self.navigation_layers)
            .field("transform", &self.transform)
            .field("enter_cost", &self.enter_cost)
            .field("travel_cost", &self.travel_cost)
            .field("state", &self.state)
            .field("polygons", &format!("[{} polygon(s)]", self.polygons.len()))
            .field(
                "connections",
                &format!("[{} connection(s)]", self.connections.len()),
            )
            .finish()
    }
}
