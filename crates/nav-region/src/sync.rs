//! Snapshot and merge of region polygon data
//!
//! A rebuild can run on a duplicate of a region while the original keeps
//! serving queries. [`Region::duplicate_for_sync`] takes the snapshot and
//! [`Region::copy_polygons_and_connections`] folds the rebuilt polygons back,
//! rewriting every polygon reference through a [`RemapTable`] so that nothing
//! in the destination points at the duplicate afterwards.

use crate::polygon::{Connection, Edge, InstanceId, Polygon, PolygonRef};
use crate::region::Region;
use navmesh_common::{Error, Result};
use std::collections::HashMap;

/// Mapping from source polygon references to destination references
///
/// Built for a single merge and dropped with it.
#[derive(Debug, Default)]
pub struct RemapTable {
    mappings: HashMap<PolygonRef, PolygonRef>,
}

impl RemapTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Maps polygon `i` of `source` onto polygon `i` of `destination` for every `i < count`
    pub fn positional(source: InstanceId, destination: InstanceId, count: usize) -> Self {
        let mut table = Self {
            mappings: HashMap::with_capacity(count),
        };
        for index in 0..count {
            table.record(
                PolygonRef::new(source, index),
                PolygonRef::new(destination, index),
            );
        }
        table
    }

    pub fn record(&mut self, from: PolygonRef, to: PolygonRef) {
        self.mappings.insert(from, to);
    }

    /// Looks up the destination of `reference`; a miss is a protocol violation
    pub fn resolve(&self, reference: PolygonRef) -> Result<PolygonRef> {
        self.mappings
            .get(&reference)
            .copied()
            .ok_or(Error::UnmappedPolygon {
                owner: reference.owner.raw(),
                index: reference.index,
            })
    }

    pub fn len(&self) -> usize {
        self.mappings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mappings.is_empty()
    }
}

impl Connection {
    fn remapped(&self, table: &RemapTable) -> Result<Connection> {
        Ok(Connection {
            polygon: table.resolve(self.polygon)?,
            ..*self
        })
    }
}

impl Polygon {
    /// Copy of this polygon owned by `owner`, with edge slots rewritten through `table`
    fn remapped(&self, owner: InstanceId, table: &RemapTable) -> Result<Polygon> {
        let edges = self
            .edges
            .iter()
            .map(|edge| {
                let connections = edge
                    .connections
                    .iter()
                    .map(|c| c.remapped(table))
                    .collect::<Result<Vec<_>>>()?;
                Ok(Edge { connections })
            })
            .collect::<Result<Vec<_>>>()?;

        let mut polygon = self.clone();
        polygon.owner = owner;
        polygon.edges = edges;
        Ok(polygon)
    }
}

impl Region {
    /// Creates an independent snapshot for rebuilding off the critical path.
    ///
    /// The duplicate shares the region id, map, transform, mesh, layers,
    /// costs and sync state. It is a new instance: its polygons are deep
    /// copies owned by it, edge slots that referenced the source's own
    /// polygons now reference the duplicate's, and slots pointing at other
    /// regions are dropped. Region connections are not carried over; they are
    /// regenerated by the map after a rebuild.
    pub fn duplicate_for_sync(&self) -> Region {
        let mut duplicate = Region::with_id(self.id);
        duplicate.map = self.map.clone();
        duplicate.transform = self.transform;
        duplicate.mesh = self.mesh.clone();
        duplicate.navigation_layers = self.navigation_layers;
        duplicate.enter_cost = self.enter_cost;
        duplicate.travel_cost = self.travel_cost;
        duplicate.state = self.state;
        duplicate.generation = self.generation;

        let source = self.instance;
        let owner = duplicate.instance;
        let mut dropped = 0;
        duplicate.polygons = self
            .polygons
            .iter()
            .map(|polygon| {
                let mut copy = polygon.clone();
                copy.owner = owner;
                for edge in &mut copy.edges {
                    let before = edge.connections.len();
                    edge.connections.retain(|c| c.polygon.owner == source);
                    dropped += before - edge.connections.len();
                    for connection in &mut edge.connections {
                        connection.polygon.owner = owner;
                    }
                }
                copy
            })
            .collect();

        log::debug!(
            "Duplicated region {:?} (instance {} -> {}) with {} polygons",
            self.id,
            source,
            owner,
            duplicate.polygons.len()
        );
        if dropped > 0 {
            log::debug!(
                "Dropped {} edge connection(s) from region {:?} that point outside instance {}",
                dropped,
                self.id,
                source
            );
        }
        duplicate.dropped_edge_connections = dropped;
        duplicate
    }

    /// Merges polygons and connections rebuilt in `source` into this region.
    ///
    /// Replaces the polygon list, sync state and connections with `source`'s,
    /// rewriting owners and every polygon reference to point into `self`.
    ///
    /// # Panics
    ///
    /// Panics if `source` references a polygon it does not hold itself. That
    /// means a cross-region reference leaked across the merge boundary and the
    /// caller's bookkeeping is broken. Use
    /// [`try_copy_polygons_and_connections`](Self::try_copy_polygons_and_connections)
    /// to handle that case instead.
    pub fn copy_polygons_and_connections(&mut self, source: &Region) {
        if let Err(err) = self.try_copy_polygons_and_connections(source) {
            panic!("region merge broke the polygon reference invariant: {err}");
        }
    }

    /// Fallible form of [`copy_polygons_and_connections`](Self::copy_polygons_and_connections).
    ///
    /// On error nothing in `self` is modified.
    pub fn try_copy_polygons_and_connections(&mut self, source: &Region) -> Result<()> {
        let table = RemapTable::positional(source.instance, self.instance, source.polygons.len());

        let polygons = source
            .polygons
            .iter()
            .map(|polygon| polygon.remapped(self.instance, &table))
            .collect::<Result<Vec<_>>>()?;

        let connections = source
            .connections
            .iter()
            .map(|connection| connection.remapped(&table))
            .collect::<Result<Vec<_>>>()?;

        self.state = source.state;
        self.polygons = polygons;
        self.connections = connections;

        log::debug!(
            "Merged {} polygons and {} connections from instance {} into region {:?}",
            self.polygons.len(),
            self.connections.len(),
            source.instance,
            self.id
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::region::SyncState;
    use crate::test_helpers::*;
    use glam::Vec3;

    #[test]
    fn test_remap_table_positional() {
        let a = InstanceId::next();
        let b = InstanceId::next();
        let table = RemapTable::positional(a, b, 3);

        assert_eq!(table.len(), 3);
        assert_eq!(
            table.resolve(PolygonRef::new(a, 2)).unwrap(),
            PolygonRef::new(b, 2)
        );
        assert!(matches!(
            table.resolve(PolygonRef::new(a, 3)),
            Err(Error::UnmappedPolygon { index: 3, .. })
        ));
        assert!(table.resolve(PolygonRef::new(b, 0)).is_err());
        assert!(RemapTable::new().is_empty());
    }

    #[test]
    fn test_duplicate_copies_configuration() {
        let mut region = bound_region(quad_strip_mesh());
        region.set_navigation_layers(0b110);
        region.set_costs(1.5, 2.5);
        region.sync();

        let duplicate = region.duplicate_for_sync();

        assert_eq!(duplicate.id(), region.id());
        assert_ne!(duplicate.instance(), region.instance());
        assert_eq!(duplicate.navigation_layers(), 0b110);
        assert_eq!(duplicate.enter_cost(), 1.5);
        assert_eq!(duplicate.travel_cost(), 2.5);
        assert_eq!(duplicate.sync_state(), SyncState::Clean);
        assert_eq!(duplicate.generation(), region.generation());
        assert!(duplicate.is_bound());
        assert!(std::sync::Arc::ptr_eq(
            duplicate.mesh().unwrap(),
            region.mesh().unwrap()
        ));
    }

    #[test]
    fn test_duplicate_rewrites_owned_references() {
        let mut region = bound_region(quad_strip_mesh());
        region.sync();
        connect_shared_edges(&mut region);
        let foreign = PolygonRef::new(InstanceId::next(), 0);
        region.add_edge_connection(0, 0, Connection::new(foreign, 1)).unwrap();
        region
            .add_connection(Connection::new(region.polygon_ref(0).unwrap(), 2))
            .unwrap();

        let duplicate = region.duplicate_for_sync();

        assert!(duplicate.connections().is_empty());
        for (copy, original) in duplicate.polygons().iter().zip(region.polygons()) {
            assert_eq!(copy.owner(), duplicate.instance());
            assert!(copy.same_geometry(original));
            assert!(copy
                .connection_targets()
                .all(|target| target.owner == duplicate.instance()));
        }
        assert_eq!(duplicate.summary().edge_connection_count, 2);
        assert_eq!(duplicate.dropped_edge_connections(), 1);
        assert_eq!(region.dropped_edge_connections(), 0);
        // Source is untouched
        assert_eq!(region.summary().edge_connection_count, 3);
        assert_eq!(region.connection_count(), 1);
    }

    #[test]
    fn test_merge_rewrites_into_destination() {
        let mut live = bound_region(quad_strip_mesh());
        live.sync();

        let mut rebuilt = live.duplicate_for_sync();
        rebuilt.set_transform(glam::Affine3A::from_translation(Vec3::new(0.0, 1.0, 0.0)));
        rebuilt.sync();
        connect_shared_edges(&mut rebuilt);
        rebuilt
            .add_connection(
                Connection::new(rebuilt.polygon_ref(1).unwrap(), 2)
                    .with_pathway(Vec3::new(1.0, 1.0, 0.0), Vec3::new(1.0, 1.0, 1.0)),
            )
            .unwrap();

        live.copy_polygons_and_connections(&rebuilt);

        assert_eq!(live.polygons().len(), 2);
        assert_eq!(live.sync_state(), SyncState::Clean);
        for polygon in live.polygons() {
            assert_eq!(polygon.owner(), live.instance());
            assert!(polygon
                .connection_targets()
                .all(|target| target.owner == live.instance()));
        }
        assert_eq!(live.connections()[0].polygon, live.polygon_ref(1).unwrap());
        assert_eq!(
            live.connection_pathway(0).unwrap(),
            (Vec3::new(1.0, 1.0, 0.0), Vec3::new(1.0, 1.0, 1.0))
        );
        assert_eq!(live.polygons()[0].points()[0].position.y, 1.0);
    }

    #[test]
    fn test_merge_copies_dirty_state() {
        let mut live = bound_region(quad_strip_mesh());
        live.sync();
        let mut source = live.duplicate_for_sync();
        source.set_mesh(None);

        live.copy_polygons_and_connections(&source);

        assert!(live.is_dirty());
        assert_eq!(live.polygons().len(), 2);
    }

    #[test]
    fn test_try_merge_rejects_foreign_references_without_mutation() {
        let mut live = bound_region(quad_strip_mesh());
        live.sync();
        let before: Vec<_> = live.polygons().to_vec();

        let mut source = live.duplicate_for_sync();
        let foreign = PolygonRef::new(InstanceId::next(), 0);
        source.add_edge_connection(1, 0, Connection::new(foreign, 0)).unwrap();
        source.set_mesh(None);

        let result = live.try_copy_polygons_and_connections(&source);

        assert!(matches!(result, Err(Error::UnmappedPolygon { index: 0, .. })));
        assert_eq!(live.polygons(), before.as_slice());
        assert!(!live.is_dirty());
    }

    #[test]
    fn test_try_merge_rejects_dangling_region_connection() {
        let mut live = bound_region(quad_strip_mesh());
        live.sync();
        let mut source = live.duplicate_for_sync();
        let dangling = PolygonRef::new(source.instance(), 9);
        source.add_connection(Connection::new(dangling, 0)).unwrap();

        assert!(matches!(
            live.try_copy_polygons_and_connections(&source),
            Err(Error::UnmappedPolygon { index: 9, .. })
        ));
    }

    #[test]
    #[should_panic(expected = "polygon reference invariant")]
    fn test_merge_panics_on_unmapped_reference() {
        let mut live = bound_region(quad_strip_mesh());
        live.sync();
        let mut source = live.duplicate_for_sync();
        let foreign = PolygonRef::new(live.instance(), 0);
        source.add_edge_connection(0, 1, Connection::new(foreign, 0)).unwrap();

        live.copy_polygons_and_connections(&source);
    }
}
