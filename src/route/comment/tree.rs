use std::collections::HashMap;

use super::model::{CommentNode, CommentView};

/// Arranges a flat list of comments into reply trees.
///
/// Comments without a parent become roots. Replies are attached to their
/// parent when it is in the list and dropped otherwise, along with anything
/// that never leads back to a root (such as a reply cycle). Roots and replies
/// keep the order of the input.
pub fn build_tree(comments: Vec<CommentView>) -> Vec<CommentNode> {
	let index = comments
		.iter()
		.enumerate()
		.map(|(i, comment)| (comment.comment.id, i))
		.collect::<HashMap<_, _>>();

	let mut children = vec![Vec::new(); comments.len()];
	let mut roots = Vec::new();

	for (i, comment) in comments.iter().enumerate() {
		match comment.comment.parent_id {
			None => roots.push(i),
			Some(parent) => {
				if let Some(&parent) = index.get(&parent) {
					children[parent].push(i);
				}
			}
		}
	}

	// pre-order walk from the roots, without recursion so deep threads are fine
	let mut order = Vec::with_capacity(comments.len());
	let mut stack = roots.iter().rev().copied().collect::<Vec<_>>();

	while let Some(i) = stack.pop() {
		order.push(i);
		stack.extend(children[i].iter().rev());
	}

	let mut comments = comments.into_iter().map(Some).collect::<Vec<_>>();
	let mut nodes = (0..comments.len()).map(|_| None).collect::<Vec<Option<CommentNode>>>();

	// children come after their parent in `order`, so walking it backwards
	// builds every reply before the comment it belongs to
	for &i in order.iter().rev() {
		let replies = children[i]
			.iter()
			.filter_map(|&child| nodes[child].take())
			.collect();

		if let Some(comment) = comments[i].take() {
			nodes[i] = Some(CommentNode { comment, replies });
		}
	}

	roots
		.into_iter()
		.filter_map(|root| nodes[root].take())
		.collect()
}
