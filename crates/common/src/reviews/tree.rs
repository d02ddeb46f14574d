//! Adjacency-list to tree construction for review replies
//!
//! Replies carry a nullable self-referential `parent_reply_id`. A reply
//! whose parent is present in the fetched set becomes that parent's child;
//! any other reply is a root under its review. Soft-deleted replies are
//! filtered out before this runs, so descendants of a deleted parent are
//! promoted to roots rather than dropped.

use super::ReplyRow;
use serde::Serialize;
use std::collections::HashMap;
use uuid::Uuid;

/// A reply with its nested children
#[derive(Debug, Clone, Serialize)]
pub struct ReplyNode {
    #[serde(flatten)]
    pub reply: ReplyRow,
    pub children: Vec<ReplyNode>,
}

/// Partition replies into per-review forests.
///
/// Input order (created-at ascending) is preserved among siblings. Each
/// reply appears exactly once: the arena hands out every row a single time,
/// which also makes corrupt parent cycles degrade to dropped rows instead
/// of infinite recursion.
pub fn build_reply_forests(replies: Vec<ReplyRow>) -> HashMap<Uuid, Vec<ReplyNode>> {
    // Arena of rows, indexed by reply id
    let mut arena: Vec<Option<ReplyRow>> = replies.into_iter().map(Some).collect();

    let index_by_id: HashMap<Uuid, usize> = arena
        .iter()
        .enumerate()
        .filter_map(|(i, r)| r.as_ref().map(|r| (r.id, i)))
        .collect();

    let mut children: Vec<Vec<usize>> = vec![Vec::new(); arena.len()];
    let mut roots: Vec<usize> = Vec::new();

    for i in 0..arena.len() {
        let Some((parent_id, review_id)) =
            arena[i].as_ref().map(|r| (r.parent_reply_id, r.review_id))
        else {
            continue;
        };

        // A parent only counts if it was fetched and belongs to the same
        // review; everything else roots under the reply's own review.
        let parent_idx = parent_id
            .and_then(|pid| index_by_id.get(&pid).copied())
            .filter(|&p| {
                p != i
                    && arena[p]
                        .as_ref()
                        .map(|parent| parent.review_id == review_id)
                        .unwrap_or(false)
            });

        match parent_idx {
            Some(p) => children[p].push(i),
            None => roots.push(i),
        }
    }

    let mut forests: HashMap<Uuid, Vec<ReplyNode>> = HashMap::new();
    for root in roots {
        if let Some(node) = take_subtree(root, &mut arena, &children) {
            forests
                .entry(node.reply.review_id)
                .or_default()
                .push(node);
        }
    }

    forests
}

fn take_subtree(
    idx: usize,
    arena: &mut Vec<Option<ReplyRow>>,
    children: &[Vec<usize>],
) -> Option<ReplyNode> {
    let reply = arena[idx].take()?;

    let child_nodes = children[idx]
        .iter()
        .filter_map(|&c| take_subtree(c, arena, children))
        .collect();

    Some(ReplyNode {
        reply,
        children: child_nodes,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn reply(id: u128, review: u128, parent: Option<u128>, minute: u32) -> ReplyRow {
        ReplyRow {
            id: Uuid::from_u128(id),
            review_id: Uuid::from_u128(review),
            user_id: Uuid::from_u128(900),
            username: "qari".to_string(),
            avatar_url: None,
            parent_reply_id: parent.map(Uuid::from_u128),
            comment: format!("reply {}", id),
            created_at: Utc.with_ymd_and_hms(2026, 3, 1, 12, minute, 0).unwrap(),
        }
    }

    #[test]
    fn test_empty_input() {
        assert!(build_reply_forests(Vec::new()).is_empty());
    }

    #[test]
    fn test_roots_and_children() {
        // review 1: r1 (root) <- r2, r3; r4 root
        let forests = build_reply_forests(vec![
            reply(1, 100, None, 0),
            reply(2, 100, Some(1), 1),
            reply(3, 100, Some(1), 2),
            reply(4, 100, None, 3),
        ]);

        let roots = &forests[&Uuid::from_u128(100)];
        assert_eq!(roots.len(), 2);
        assert_eq!(roots[0].reply.id, Uuid::from_u128(1));
        assert_eq!(roots[0].children.len(), 2);
        assert_eq!(roots[0].children[0].reply.id, Uuid::from_u128(2));
        assert_eq!(roots[0].children[1].reply.id, Uuid::from_u128(3));
        assert_eq!(roots[1].reply.id, Uuid::from_u128(4));
    }

    #[test]
    fn test_deep_nesting() {
        let forests = build_reply_forests(vec![
            reply(1, 100, None, 0),
            reply(2, 100, Some(1), 1),
            reply(3, 100, Some(2), 2),
        ]);

        let roots = &forests[&Uuid::from_u128(100)];
        assert_eq!(roots.len(), 1);
        assert_eq!(roots[0].children[0].children[0].reply.id, Uuid::from_u128(3));
    }

    #[test]
    fn test_orphan_promoted_to_root() {
        // Parent 9 was soft-deleted and is not in the fetched set
        let forests = build_reply_forests(vec![
            reply(1, 100, Some(9), 0),
            reply(2, 100, Some(1), 1),
        ]);

        let roots = &forests[&Uuid::from_u128(100)];
        assert_eq!(roots.len(), 1);
        assert_eq!(roots[0].reply.id, Uuid::from_u128(1));
        assert_eq!(roots[0].children.len(), 1);
    }

    #[test]
    fn test_cross_review_parent_ignored() {
        // Reply 2 claims a parent in another review; it must root under
        // its own review, not nest across reviews
        let forests = build_reply_forests(vec![
            reply(1, 100, None, 0),
            reply(2, 200, Some(1), 1),
        ]);

        assert_eq!(forests[&Uuid::from_u128(100)].len(), 1);
        let other = &forests[&Uuid::from_u128(200)];
        assert_eq!(other.len(), 1);
        assert!(other[0].children.is_empty());
    }

    #[test]
    fn test_no_duplicates_across_partition() {
        let forests = build_reply_forests(vec![
            reply(1, 100, None, 0),
            reply(2, 100, Some(1), 1),
            reply(3, 100, Some(1), 2),
            reply(4, 100, Some(3), 3),
            reply(5, 100, None, 4),
        ]);

        fn count(nodes: &[ReplyNode]) -> usize {
            nodes.iter().map(|n| 1 + count(&n.children)).sum()
        }
        assert_eq!(count(&forests[&Uuid::from_u128(100)]), 5);
    }

    #[test]
    fn test_self_parent_becomes_root() {
        let forests = build_reply_forests(vec![reply(1, 100, Some(1), 0)]);
        let roots = &forests[&Uuid::from_u128(100)];
        assert_eq!(roots.len(), 1);
        assert!(roots[0].children.is_empty());
    }
}
