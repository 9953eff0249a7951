// This file is Copyright its original authors, visible in version control
// history.
//
// This file is licensed under the Apache License, Version 2.0 <LICENSE-APACHE
// or http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your option.
// You may not use this file except in accordance with one or both of these
// licenses.

//! Graph scaffolding shared by the routing tests.

use crate::routing::graph::{ChannelUpdate, NetworkGraph, NodeId, RoutingFees};

use bitcoin::secp256k1::{All, PublicKey, Secp256k1, SecretKey};

pub(crate) fn get_nodes(secp_ctx: &Secp256k1<All>) -> (SecretKey, PublicKey, Vec<SecretKey>, Vec<PublicKey>) {
	let privkeys: Vec<SecretKey> = (2..24).map(|i| {
		SecretKey::from_slice(&hex::decode(format!("{:02x}", i).repeat(32)).unwrap()[..]).unwrap()
	}).collect();

	let pubkeys = privkeys.iter().map(|secret| PublicKey::from_secret_key(&secp_ctx, secret)).collect();

	let our_privkey = SecretKey::from_slice(&hex::decode("01".repeat(32)).unwrap()[..]).unwrap();
	let our_id = PublicKey::from_secret_key(&secp_ctx, &our_privkey);

	(our_privkey, our_id, privkeys, pubkeys)
}

pub(crate) fn id(pubkey: &PublicKey) -> NodeId {
	NodeId::from_pubkey(pubkey)
}

pub(crate) fn fees(base_msat: u32, proportional_millionths: u32) -> RoutingFees {
	RoutingFees { base_msat, proportional_millionths }
}

pub(crate) fn add_channel(
	graph: &NetworkGraph, short_channel_id: u64, node_a: &PublicKey, node_b: &PublicKey,
	capacity_msat: u64,
) {
	graph.add_channel(short_channel_id, id(node_a), id(node_b), capacity_msat);
}

/// Sets the policy the given node advertises for forwarding over the channel, the way a
/// channel_update signed by that node would.
pub(crate) fn update_channel(
	graph: &NetworkGraph, short_channel_id: u64, advertiser: &PublicKey, disabled: bool,
	cltv_expiry_delta: u16, htlc_minimum_msat: u64, routing_fees: RoutingFees,
) {
	let direction = {
		let view = graph.read_only();
		let chan = view.channel(short_channel_id).unwrap();
		if id(advertiser) == chan.node_one { 0 } else { 1 }
	};
	let flags = direction | if disabled { 2 } else { 0 };
	graph.update_channel(&ChannelUpdate {
		short_channel_id,
		flags,
		cltv_expiry_delta,
		htlc_minimum_msat,
		fees: routing_fees,
	}).unwrap();
}

/// Adds a channel with both directions enabled under the same terms.
pub(crate) fn add_bidirectional_channel(
	graph: &NetworkGraph, short_channel_id: u64, node_a: &PublicKey, node_b: &PublicKey,
	capacity_msat: u64, cltv_expiry_delta: u16, routing_fees: RoutingFees,
) {
	add_channel(graph, short_channel_id, node_a, node_b, capacity_msat);
	update_channel(graph, short_channel_id, node_a, false, cltv_expiry_delta, 0, routing_fees);
	update_channel(graph, short_channel_id, node_b, false, cltv_expiry_delta, 0, routing_fees);
}

/// Builds a graph with three edge-disjoint routes of two, three and four hops between our node
/// and node6:
///
///   our_id -1(1)2- node0 --------------2(2)7--------------
///          \                                              \
///           -1(3)2- node1 -2(4)3- node2 ---------3(5)7---- node6
///          \                                              /
///           -1(6)2- node3 -2(7)3- node4 -3(8)4- node5 -4(9)7-
///
/// Every policy is enabled in both directions with a 40 block CLTV delta, a 1000 msat base fee
/// and no proportional fee, over 100_000_000_000 msat of capacity.
pub(crate) fn build_graph() -> (NetworkGraph, PublicKey, Vec<PublicKey>) {
	let secp_ctx = Secp256k1::new();
	let (_, our_id, _, pubkeys) = get_nodes(&secp_ctx);
	let graph = NetworkGraph::new();

	let cap = 100_000_000_000;
	let delta = 40;
	let base_fee = fees(1000, 0);

	add_bidirectional_channel(&graph, 1, &our_id, &pubkeys[0], cap, delta, base_fee);
	add_bidirectional_channel(&graph, 2, &pubkeys[0], &pubkeys[6], cap, delta, base_fee);

	add_bidirectional_channel(&graph, 3, &our_id, &pubkeys[1], cap, delta, base_fee);
	add_bidirectional_channel(&graph, 4, &pubkeys[1], &pubkeys[2], cap, delta, base_fee);
	add_bidirectional_channel(&graph, 5, &pubkeys[2], &pubkeys[6], cap, delta, base_fee);

	add_bidirectional_channel(&graph, 6, &our_id, &pubkeys[3], cap, delta, base_fee);
	add_bidirectional_channel(&graph, 7, &pubkeys[3], &pubkeys[4], cap, delta, base_fee);
	add_bidirectional_channel(&graph, 8, &pubkeys[4], &pubkeys[5], cap, delta, base_fee);
	add_bidirectional_channel(&graph, 9, &pubkeys[5], &pubkeys[6], cap, delta, base_fee);

	(graph, our_id, pubkeys)
}

/// Builds a single chain of the given hop count from our node through the first `hops` keyed
/// nodes, channel i connecting node i-1 to node i:
///
///   our_id -1(1)2- node0 -1(2)2- node1 - ... - node(hops-1)
///
/// Every policy is enabled in both directions with a 40 block CLTV delta and no fees.
pub(crate) fn build_line_graph(hops: usize) -> (NetworkGraph, PublicKey, Vec<PublicKey>) {
	let secp_ctx = Secp256k1::new();
	let (_, our_id, _, pubkeys) = get_nodes(&secp_ctx);
	let graph = NetworkGraph::new();

	let mut prev = our_id;
	for i in 0..hops {
		add_bidirectional_channel(&graph, (i + 1) as u64, &prev, &pubkeys[i], 100_000_000_000, 40, fees(0, 0));
		prev = pubkeys[i];
	}

	(graph, our_id, pubkeys)
}
