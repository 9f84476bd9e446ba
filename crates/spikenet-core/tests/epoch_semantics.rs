use spikenet_core::{
    EpochSummary, Network, NodeId, NodeParams, QueueEntry, StepOutcome, INITIAL_FIRE_THRESHOLD,
};

const EPS: f64 = 1e-9;

fn advance(network: &mut Network, epochs: u64) {
    for _ in 0..epochs {
        network.start_new_epoch();
        network.run_epoch().unwrap();
    }
}

fn queued_nodes(network: &Network) -> Vec<NodeId> {
    network
        .nodes()
        .filter(|(_, n)| n.is_queued_to_fire())
        .map(|(id, _)| id)
        .collect()
}

#[test]
fn chain_fires_one_hop_per_epoch() {
    let mut net = Network::new();
    let a = net.add_node();
    let b = net.add_node();
    let c = net.add_node();
    net.link(a, b, 50.0).unwrap();
    net.link(b, c, 50.0).unwrap();

    net.incoming(a, 2.0).unwrap();
    assert!((net.excitation(a, false).unwrap() - 3.0f64.ln()).abs() < EPS);
    assert_eq!(net.firing_queue_size(), 1);

    net.start_new_epoch();
    let first = net.run_epoch().unwrap();
    assert_eq!(first, EpochSummary { fired: 1, suppressed: 0 });
    assert_eq!(net.current_epoch(), 1);
    {
        let node_a = net.node(a).unwrap();
        assert!((node_a.raw_excitation() - 0.2).abs() < EPS);
        assert!((node_a.fire_threshold() - 1.001).abs() < EPS);
    }
    assert_eq!(queued_nodes(&net), vec![b]);
    assert!(!net.node(b).unwrap().has_fired_at_least_once());

    net.start_new_epoch();
    net.run_epoch().unwrap();
    assert_eq!(queued_nodes(&net), vec![c]);
    assert!(net.node(b).unwrap().has_fired_at_least_once());
    assert!(!net.node(c).unwrap().has_fired_at_least_once());

    net.start_new_epoch();
    net.run_epoch().unwrap();
    assert_eq!(net.fire_count(), 3);
    assert_eq!(net.current_epoch(), 3);
    for id in [a, b, c] {
        let node = net.node(id).unwrap();
        assert!(node.has_fired_at_least_once());
        assert_eq!(node.fire_count(), 1);
    }
    assert_eq!(net.firing_queue_size(), 0);
}

#[test]
fn no_same_epoch_cascade_in_cycle() {
    let mut net = Network::new();
    let a = net.add_node();
    let b = net.add_node();
    net.link(a, b, 50.0).unwrap();
    net.link(b, a, 50.0).unwrap();

    net.incoming(a, 2.0).unwrap();
    net.start_new_epoch();
    net.run_epoch().unwrap();

    assert_eq!(net.fire_count(), 1);
    assert_eq!(net.node(b).unwrap().fire_count(), 0);
    // b sits behind the consumed boundary, waiting for the next epoch
    assert_eq!(net.peek_firing_queue(), Some(QueueEntry::Fire(b)));
}

#[test]
fn delayed_firing_needs_a_new_boundary() {
    let mut net = Network::new();
    let a = net.add_node();
    let b = net.add_node();
    net.link(a, b, 50.0).unwrap();

    net.incoming(a, 2.0).unwrap();
    net.start_new_epoch();
    net.run_epoch().unwrap();

    // Without a fresh boundary the epoch drains the queue and stops on empty
    let summary = net.run_epoch().unwrap();
    assert_eq!(summary.fired, 1);
    assert_eq!(net.current_epoch(), 1);
    assert_eq!(net.run_one_step().unwrap(), StepOutcome::Idle);
}

#[test]
fn suppressed_fire_after_decay() {
    let params = NodeParams::new(0.5, 0.2, 1.001).unwrap();
    let mut net = Network::new();
    let a = net.add_node_with_params(params).unwrap();

    net.start_new_epoch();
    net.incoming(a, 2.0).unwrap();
    assert_eq!(
        net.peek_firing_queue(),
        Some(QueueEntry::EpochBoundary)
    );

    net.run_epoch().unwrap();
    assert!(net.node(a).unwrap().is_queued_to_fire());

    let summary = net.run_epoch().unwrap();
    assert_eq!(summary, EpochSummary { fired: 0, suppressed: 1 });
    assert_eq!(net.fire_count(), 0);

    let node = net.node(a).unwrap();
    assert!(!node.is_queued_to_fire());
    assert!(!node.has_fired_at_least_once());
    assert_eq!(node.fire_threshold(), INITIAL_FIRE_THRESHOLD);
}

#[test]
fn inhibitory_weight_still_adds_magnitude() {
    let mut net = Network::new();
    let a = net.add_node();
    let b = net.add_node();
    net.link(a, b, -50.0).unwrap();

    net.incoming(a, 2.0).unwrap();
    net.start_new_epoch();
    net.run_epoch().unwrap();

    let strength = net.node(a).unwrap().fire_strength();
    let expected = (50.0 * strength).ln_1p();
    assert!((net.excitation(b, false).unwrap() - expected).abs() < EPS);
    assert!(net.node(b).unwrap().is_queued_to_fire());
}

#[test]
fn duplicate_links_accumulate() {
    let mut single = Network::new();
    let a1 = single.add_node();
    let b1 = single.add_node();
    single.link(a1, b1, 1.0).unwrap();

    let mut double = Network::new();
    let a2 = double.add_node();
    let b2 = double.add_node();
    double.link(a2, b2, 1.0).unwrap();
    double.link(a2, b2, 1.0).unwrap();

    for (net, a) in [(&mut single, a1), (&mut double, a2)] {
        net.incoming(a, 2.0).unwrap();
        net.start_new_epoch();
        net.run_epoch().unwrap();
    }

    let once = single.excitation(b1, false).unwrap();
    let twice = double.excitation(b2, false).unwrap();
    assert!((twice - 2.0 * once).abs() < EPS);
}

#[test]
fn zero_weight_is_inert() {
    let mut net = Network::new();
    let a = net.add_node();
    let b = net.add_node();
    net.link(a, b, 0.0).unwrap();

    net.incoming(a, 2.0).unwrap();
    net.start_new_epoch();
    net.run_epoch().unwrap();

    assert_eq!(net.fire_count(), 1);
    assert_eq!(net.excitation(b, false).unwrap(), 0.0);
}

#[test]
fn decay_is_independent_of_intermediate_reads() {
    let mut touched = Network::new();
    let mut untouched = Network::new();
    let t = touched.add_node();
    let u = untouched.add_node();
    touched.incoming(t, 0.5).unwrap();
    untouched.incoming(u, 0.5).unwrap();
    let start = touched.excitation(t, false).unwrap();

    for _ in 0..37 {
        advance(&mut touched, 1);
        touched.excitation(t, true).unwrap();
    }
    advance(&mut untouched, 37);

    let expected = start * 0.99f64.powi(37);
    assert!((touched.excitation(t, false).unwrap() - expected).abs() < EPS);
    assert!((untouched.excitation(u, false).unwrap() - expected).abs() < EPS);
}

#[test]
fn reset_epochs_preserves_excitation() {
    let mut net = Network::new();
    let ids: Vec<_> = (0..4).map(|_| net.add_node()).collect();
    for (i, &id) in ids.iter().enumerate() {
        net.incoming(id, 0.1 * (i + 1) as f64).unwrap();
        advance(&mut net, 3);
    }

    let before: Vec<f64> = ids.iter().map(|&id| net.excitation(id, false).unwrap()).collect();
    net.reset_epochs();
    assert_eq!(net.current_epoch(), 0);
    for (&id, old) in ids.iter().zip(before) {
        assert!((net.excitation(id, false).unwrap() - old).abs() < EPS);
        assert_eq!(net.node(id).unwrap().last_updated_epoch(), 0);
    }

    // Decay continues from the rebased value
    let rebased = net.excitation(ids[0], false).unwrap();
    advance(&mut net, 2);
    let after = net.excitation(ids[0], false).unwrap();
    assert!((after - rebased * 0.99 * 0.99).abs() < EPS);
}

#[test]
fn stimulus_reset_does_not_duplicate_queue_entry() {
    let mut net = Network::new();
    let s = net.add_node();

    net.incoming(s, 2.0).unwrap();
    net.reset_node(s).unwrap();
    net.incoming(s, 2.0).unwrap();

    assert_eq!(net.firing_queue_size(), 1);
    net.start_new_epoch();
    assert_eq!(net.run_epoch().unwrap().fired, 1);
}
