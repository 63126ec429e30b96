//! Rebuilding comment threads from the flat lists the server sends.
//!
//! The server stores every comment and reply as an independent record that only knows
//! its parent's id. Both the blog comment section and the recipe review section need
//! them nested, with slightly different ordering rules, so the ordering is a parameter.
//!
//! Nesting is capped at `MAX_DEPTH`: replies below that are listed, in reading order,
//! under their deepest ancestor that is still shown. Every tree operation here walks
//! with an explicit stack, so arbitrarily long reply chains are fine.

use std::{cmp::Reverse, collections::HashMap};

use crate::api::{Comment, CommentId, Time};

/// Deepest nesting level of a forest, roots being at depth 0
pub const MAX_DEPTH: usize = 8;

/// A record that can be placed in a thread
pub trait Threaded {
    fn id(&self) -> CommentId;
    fn parent_id(&self) -> Option<CommentId>;
    fn created_at(&self) -> Time;
}

impl Threaded for Comment {
    fn id(&self) -> CommentId {
        self.id
    }

    fn parent_id(&self) -> Option<CommentId> {
        self.parent_id
    }

    fn created_at(&self) -> Time {
        self.created_at
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Direction {
    Asc,
    Desc,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SortOrder {
    /// Keep the order in which the records were received
    Source,
    CreatedAt(Direction),
}

impl SortOrder {
    // Sorts are stable, so records with equal timestamps keep their source order
    fn sort<R: Threaded>(&self, indices: &mut [usize], records: &[R]) {
        match self {
            SortOrder::Source => (),
            SortOrder::CreatedAt(Direction::Asc) => {
                indices.sort_by_key(|&i| records[i].created_at())
            }
            SortOrder::CreatedAt(Direction::Desc) => {
                indices.sort_by_key(|&i| Reverse(records[i].created_at()))
            }
        }
    }
}

/// How to order the top-level records and the replies below them
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct ThreadOrder {
    pub roots: SortOrder,
    pub children: SortOrder,
}

impl ThreadOrder {
    /// Newest comments first, replies in the order they were posted
    pub fn blog_comments() -> ThreadOrder {
        ThreadOrder {
            roots: SortOrder::CreatedAt(Direction::Desc),
            children: SortOrder::Source,
        }
    }

    /// Reviews as the server lists them
    pub fn recipe_reviews() -> ThreadOrder {
        ThreadOrder {
            roots: SortOrder::Source,
            children: SortOrder::Source,
        }
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ThreadNode<R> {
    pub record: R,
    pub children: Vec<ThreadNode<R>>,
}

impl<R> ThreadNode<R> {
    /// Number of records in this subtree, including this one
    pub fn len(&self) -> usize {
        self.depth_first().count()
    }

    pub fn depth_first(&self) -> DepthFirst<'_, R> {
        DepthFirst {
            stack: vec![(0, self)],
        }
    }
}

pub fn count_nodes<R>(forest: &[ThreadNode<R>]) -> usize {
    depth_first(forest).count()
}

/// Iterates over a whole forest in display order, along with each node's nesting depth
pub fn depth_first<R>(forest: &[ThreadNode<R>]) -> DepthFirst<'_, R> {
    DepthFirst {
        stack: forest.iter().rev().map(|n| (0, n)).collect(),
    }
}

pub struct DepthFirst<'a, R> {
    stack: Vec<(usize, &'a ThreadNode<R>)>,
}

impl<'a, R> Iterator for DepthFirst<'a, R> {
    type Item = (usize, &'a ThreadNode<R>);

    fn next(&mut self) -> Option<Self::Item> {
        let (depth, node) = self.stack.pop()?;
        self.stack
            .extend(node.children.iter().rev().map(|c| (depth + 1, c)));
        Some((depth, node))
    }
}

pub fn find_in<'a, R: Threaded>(
    forest: &'a [ThreadNode<R>],
    id: &CommentId,
) -> Option<&'a ThreadNode<R>> {
    depth_first(forest)
        .map(|(_, n)| n)
        .find(|n| n.record.id() == *id)
}

/// Nests `records` into a forest.
///
/// Records whose parent is missing, is themselves, or would close a cycle are shown
/// top-level, so that every input record appears exactly once in the output. Records
/// nested deeper than `MAX_DEPTH` are attached to their ancestor at depth
/// `MAX_DEPTH - 1`, in depth-first order. The input is left untouched.
pub fn build_forest<R: Threaded + Clone>(records: &[R], order: &ThreadOrder) -> Vec<ThreadNode<R>> {
    let mut index = HashMap::with_capacity(records.len());
    for (i, r) in records.iter().enumerate() {
        // with duplicate ids, replies attach to the first occurrence
        index.entry(r.id()).or_insert(i);
    }

    let mut parents = records
        .iter()
        .map(|r| {
            let parent_id = r.parent_id()?;
            if parent_id == r.id() {
                tracing::debug!(id = ?r.id(), "comment is its own parent, showing it top-level");
                return None;
            }
            let parent = index.get(&parent_id).copied();
            if parent.is_none() {
                tracing::debug!(id = ?r.id(), ?parent_id, "comment parent not found, showing it top-level");
            }
            parent
        })
        .collect::<Vec<_>>();
    break_cycles(&mut parents);

    let mut children = vec![Vec::new(); records.len()];
    let mut roots = Vec::new();
    for (i, p) in parents.iter().enumerate() {
        match p {
            Some(p) => children[*p].push(i),
            None => roots.push(i),
        }
    }
    order.roots.sort(&mut roots, records);
    for c in children.iter_mut() {
        order.children.sort(c, records);
    }

    // Pre-order walk deciding under which record each one is shown. Past the depth
    // cap, replies go to the same parent as the record they answer.
    let mut shown_children = vec![Vec::new(); records.len()];
    let mut shown_roots = Vec::with_capacity(roots.len());
    let mut preorder = Vec::with_capacity(records.len());
    let mut stack = roots
        .iter()
        .rev()
        .map(|&r| (r, 0, None))
        .collect::<Vec<(usize, usize, Option<usize>)>>();
    while let Some((i, depth, shown_parent)) = stack.pop() {
        preorder.push(i);
        match shown_parent {
            None => shown_roots.push(i),
            Some(p) => shown_children[p].push(i),
        }
        let (child_depth, child_parent) = match (depth < MAX_DEPTH, shown_parent) {
            (false, Some(p)) => (depth, p),
            _ => (depth + 1, i),
        };
        stack.extend(
            children[i]
                .iter()
                .rev()
                .map(|&c| (c, child_depth, Some(child_parent))),
        );
    }
    if preorder.len() != records.len() {
        tracing::error!(
            shown = preorder.len(),
            total = records.len(),
            "some comments are unreachable from the roots"
        );
    }

    // Descendants come after their ancestors in pre-order, so walking it backwards
    // builds every node after all of its children
    let mut built: Vec<Option<ThreadNode<R>>> = (0..records.len()).map(|_| None).collect();
    for &i in preorder.iter().rev() {
        let children = shown_children[i]
            .iter()
            .filter_map(|&c| built[c].take())
            .collect();
        built[i] = Some(ThreadNode {
            record: records[i].clone(),
            children,
        });
    }
    shown_roots
        .into_iter()
        .filter_map(|r| built[r].take())
        .collect()
}

/// Cuts parent links so that following them always ends on a root. In each cycle, the
/// record that came first in the input becomes a root.
fn break_cycles(parents: &mut [Option<usize>]) {
    #[derive(Clone, Copy, PartialEq)]
    enum Mark {
        Unvisited,
        OnPath,
        Done,
    }

    let mut marks = vec![Mark::Unvisited; parents.len()];
    let mut path = Vec::new();
    for start in 0..parents.len() {
        let mut cur = start;
        loop {
            match marks[cur] {
                Mark::Done => break,
                Mark::OnPath => {
                    if let Some(pos) = path.iter().position(|&n| n == cur) {
                        if let Some(&demoted) = path[pos..].iter().min() {
                            tracing::warn!(
                                cycle_len = path.len() - pos,
                                "comment parents form a cycle, showing one of them top-level"
                            );
                            parents[demoted] = None;
                        }
                    }
                    break;
                }
                Mark::Unvisited => {
                    marks[cur] = Mark::OnPath;
                    path.push(cur);
                    match parents[cur] {
                        Some(p) => cur = p,
                        None => break,
                    }
                }
            }
        }
        for n in path.drain(..) {
            marks[n] = Mark::Done;
        }
    }
}
