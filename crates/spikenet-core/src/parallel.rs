//! Data-parallel epoch execution
//!
//! The costly part of an epoch is walking every firing node's links and
//! scaling their weights. That work only reads the arena, so it is computed
//! concurrently for the whole batch of nodes dequeued before the next epoch
//! boundary. Writes stay serial and in queue order: each node is re-checked
//! against its current excitation, its deliveries are applied, then its
//! post-fire state. Results are identical to [`Network::run_epoch`].
//!
//! Deliveries made earlier in the batch can only raise excitation, so a node
//! that looked suppressed in the snapshot may still fire; its deliveries are
//! then computed on the spot.

use rayon::prelude::*;

use crate::{
    error::*,
    network::{EpochSummary, Network, QueueEntry},
    node::{Epoch, Link, NodeId},
};

type Deliveries = Vec<(NodeId, f64)>;

fn planned_deliveries(links: &[Link], strength: f64) -> Deliveries {
    links
        .iter()
        .map(|link| (link.target, f64::from(link.weight) * strength))
        .collect()
}

impl Network {
    /// Run one epoch, evaluating the queued batch with rayon
    pub fn run_epoch_parallel(&mut self) -> Result<EpochSummary> {
        let epoch = self.current_epoch();

        let mut summary = EpochSummary::default();
        let mut reached_boundary = false;

        // Without a boundary the queue is drained, including nodes queued on the way
        while !reached_boundary && self.firing_queue_size() > 0 {
            let mut batch = Vec::new();
            let queue = self.firing_queue_mut();
            while let Some(entry) = queue.pop_front() {
                match entry {
                    QueueEntry::Fire(id) => batch.push(id),
                    QueueEntry::EpochBoundary => {
                        reached_boundary = true;
                        break;
                    }
                }
            }
            self.fire_batch(&batch, epoch, &mut summary)?;
        }

        if reached_boundary {
            self.advance_epoch();
            log::debug!(
                "parallel epoch done: {} fired, {} suppressed, now at epoch {}",
                summary.fired,
                summary.suppressed,
                self.current_epoch()
            );
        }
        Ok(summary)
    }

    fn fire_batch(
        &mut self,
        batch: &[NodeId],
        epoch: Epoch,
        summary: &mut EpochSummary,
    ) -> Result<()> {
        let nodes = self.nodes_slice();
        let plans: Vec<Option<Deliveries>> = batch
            .par_iter()
            .map(|id| {
                let node = &nodes[id.index()];
                node.fire_decision(epoch)
                    .map(|strength| planned_deliveries(node.links(), strength))
            })
            .collect();

        for (&id, plan) in batch.iter().zip(plans) {
            let node = &mut self.nodes_slice_mut()[id.index()];
            node.refresh(epoch);

            let Some(strength) = node.fire_decision(epoch) else {
                node.clear_queued();
                summary.suppressed += 1;
                continue;
            };

            let deliveries = match plan {
                Some(deliveries) => deliveries,
                None => planned_deliveries(node.links(), strength),
            };
            for (target, strength) in deliveries {
                self.incoming(target, strength)?;
            }

            self.nodes_slice_mut()[id.index()].complete_fire();
            self.add_fires(1);
            summary.fired += 1;
        }
        Ok(())
    }
}
