//! Rebuilding regions away from the thread that serves queries

use crate::context::{SyncContext, TimerCategory};
use crate::region::Region;
use navmesh_common::{Error, Result};
use rayon::prelude::*;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Rebuilds a shared region on the blocking thread pool.
///
/// The region is only read-locked while the snapshot is taken and
/// write-locked for the merge, so readers keep seeing the previous polygons
/// during the build. The result is stale, and discarded, if the region's
/// configuration changed while the build ran (the region stays dirty for the
/// next rebuild) or if the region was synced in the meantime (its polygons
/// and any connections added since are kept).
///
/// Duplicate, build and merge timings, build statistics and builder
/// diagnostics are recorded into `context`.
///
/// Returns whether rebuilt polygons were merged into the region.
pub async fn rebuild_detached(
    region: &Arc<RwLock<Region>>,
    context: &mut SyncContext,
) -> Result<bool> {
    let (snapshot, generation) = {
        let guard = region.read().await;
        if !guard.is_dirty() {
            return Ok(false);
        }
        context.start_timer(TimerCategory::Duplicate);
        let snapshot = guard.duplicate_for_sync();
        context.stop_timer(TimerCategory::Duplicate);
        (snapshot, guard.generation())
    };

    let region_id = snapshot.id();
    log::info!("Starting detached rebuild for region {:?}", region_id);

    let mut build_context = std::mem::take(context);
    let (snapshot, build_context) = tokio::task::spawn_blocking(move || {
        let mut snapshot = snapshot;
        snapshot.sync_with_context(&mut build_context);
        (snapshot, build_context)
    })
    .await
    .map_err(|e| Error::Rebuild(format!("build task for region {:?} failed: {}", region_id, e)))?;
    *context = build_context;

    let mut guard = region.write().await;
    if guard.generation() != generation {
        log::debug!(
            "Region {:?} changed during rebuild (generation {} -> {}), discarding result",
            region_id,
            generation,
            guard.generation()
        );
        return Ok(false);
    }
    if !guard.is_dirty() {
        log::debug!("Region {:?} was synced during rebuild, discarding result", region_id);
        return Ok(false);
    }

    context.start_timer(TimerCategory::Merge);
    guard.try_copy_polygons_and_connections(&snapshot)?;
    context.stop_timer(TimerCategory::Merge);

    log::info!(
        "Detached rebuild for region {:?} merged {} polygons",
        region_id,
        context.stats().polygons
    );
    Ok(true)
}

/// Rebuilds every dirty region in `regions`; returns how many were rebuilt.
///
/// Dirty regions are duplicated, the duplicates are built in parallel, and
/// the results are merged back one region at a time. Timings and builder
/// diagnostics from every build are gathered into `context`, whose build
/// statistics become the totals for the batch.
pub fn sync_regions(regions: &mut [Region], context: &mut SyncContext) -> usize {
    context.start_timer(TimerCategory::Duplicate);
    let mut snapshots: Vec<(usize, Region)> = regions
        .iter()
        .enumerate()
        .filter(|(_, region)| region.is_dirty())
        .map(|(index, region)| (index, region.duplicate_for_sync()))
        .collect();
    context.stop_timer(TimerCategory::Duplicate);

    let build_contexts: Vec<SyncContext> = snapshots
        .par_iter_mut()
        .map(|(_, snapshot)| {
            let mut build_context = SyncContext::new();
            snapshot.sync_with_context(&mut build_context);
            build_context
        })
        .collect();
    context.absorb(build_contexts);

    context.start_timer(TimerCategory::Merge);
    for (index, snapshot) in &snapshots {
        regions[*index].copy_polygons_and_connections(snapshot);
    }
    context.stop_timer(TimerCategory::Merge);

    log::debug!("Synced {} regions, {} rebuilt", regions.len(), snapshots.len());
    snapshots.len()
}
