//! Search tree stored in a single arena. Nodes refer to their parent and
//! children by index, so the whole tree is released at once when the search
//! that built it is done.

use std::fmt;
use std::ops::Index;

use itertools::Itertools;

use crate::environment::{GameState, Player};

/// Position of a node in the arena.
pub type NodeIndex = usize;
// This is a special value that is used to indicate that the node has no parent.
const TOMBSTONE_PARENT: NodeIndex = usize::MAX;

/// Vertex of the search tree with the statistics of all iterations that went
/// through it.
#[derive(Clone, Debug)]
pub struct Node<M> {
    parent: NodeIndex,
    last_move: Option<M>,
    /// Expanded moves and the nodes they lead to, in the order of expansion.
    children: Vec<(M, NodeIndex)>,
    untried_moves: Vec<M>,
    player_just_moved: Player,
    visits: u32,
    /// Accumulated results from the perspective of `player_just_moved`.
    wins: f64,
}

impl<M: Copy> Node<M> {
    fn new<S: GameState<Move = M>>(parent: NodeIndex, last_move: Option<M>, state: &S) -> Self {
        Self {
            parent,
            last_move,
            children: Vec::new(),
            untried_moves: state.generate_moves().to_vec(),
            player_just_moved: state.player_just_moved(),
            visits: 0,
            wins: 0.0,
        }
    }

    /// Returns the parent node or `None` for the root.
    #[must_use]
    pub const fn parent(&self) -> Option<NodeIndex> {
        if self.parent == TOMBSTONE_PARENT {
            None
        } else {
            Some(self.parent)
        }
    }

    /// The move that produced this node, `None` for the root.
    #[must_use]
    pub const fn last_move(&self) -> Option<M> {
        self.last_move
    }

    #[allow(missing_docs)]
    #[must_use]
    pub fn children(&self) -> &[(M, NodeIndex)] {
        &self.children
    }

    /// Legal moves that do not have a child yet.
    #[must_use]
    pub fn untried_moves(&self) -> &[M] {
        &self.untried_moves
    }

    /// The player who made [`Node::last_move`]. Wins are counted from this
    /// player's perspective.
    #[must_use]
    pub const fn player_just_moved(&self) -> Player {
        self.player_just_moved
    }

    #[allow(missing_docs)]
    #[must_use]
    pub const fn visits(&self) -> u32 {
        self.visits
    }

    #[allow(missing_docs)]
    #[must_use]
    pub const fn wins(&self) -> f64 {
        self.wins
    }

    /// Every legal move has a child.
    #[must_use]
    pub fn is_fully_expanded(&self) -> bool {
        self.untried_moves.is_empty()
    }

    /// The position has no legal moves.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        self.untried_moves.is_empty() && self.children.is_empty()
    }
}

impl<M: fmt::Display> fmt::Display for Node<M> {
    /// Prints statistics as `[M:<move> W/V:<wins>/<visits> U:[<untried>]]`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.last_move {
            Some(last_move) => write!(f, "[M:{last_move}")?,
            None => write!(f, "[M:None")?,
        }
        write!(
            f,
            " W/V:{}/{} U:[{}]]",
            self.wins,
            self.visits,
            self.untried_moves.iter().join(", ")
        )
    }
}

/// The search tree. The root is always at index [`Tree::ROOT`].
#[derive(Clone, Debug)]
pub struct Tree<M> {
    nodes: Vec<Node<M>>,
}

impl<M: Copy + PartialEq + fmt::Display> Tree<M> {
    /// Index of the root node.
    pub const ROOT: NodeIndex = 0;

    /// Creates a tree with a single unvisited root for `state`.
    #[must_use]
    pub fn new<S: GameState<Move = M>>(state: &S) -> Self {
        Self {
            nodes: vec![Node::new(TOMBSTONE_PARENT, None, state)],
        }
    }

    /// Total number of nodes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Always `false`: the root is created with the tree.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// All nodes in the order of creation.
    #[must_use]
    pub fn nodes(&self) -> &[Node<M>] {
        &self.nodes
    }

    /// Picks the child maximizing the UCB1 score
    /// `wins / visits + exploration * sqrt(2 * ln(parent visits) / visits)`.
    /// Ties go to the child expanded first.
    ///
    /// # Panics
    ///
    /// Panics if the node is not fully expanded, has no children or any of
    /// its children has not been visited.
    #[must_use]
    pub fn select_child(&self, index: NodeIndex, exploration: f64) -> (M, NodeIndex) {
        let node = &self[index];
        assert!(
            node.is_fully_expanded() && !node.children.is_empty(),
            "node {index} can not select a child: {node}"
        );
        let log_visits = f64::from(node.visits).ln();
        let mut best = node.children[0];
        let mut best_score = f64::NEG_INFINITY;
        for &(next_move, child) in &node.children {
            let child_node = &self[child];
            assert!(
                child_node.visits > 0,
                "child {child} of node {index} was never visited"
            );
            let visits = f64::from(child_node.visits);
            let score = exploration.mul_add(
                (2.0 * log_visits / visits).sqrt(),
                child_node.wins / visits,
            );
            if score > best_score {
                best = (next_move, child);
                best_score = score;
            }
        }
        best
    }

    /// Consumes `next_move` from the untried moves of the node and appends a
    /// child for the `state` it leads to.
    ///
    /// # Panics
    ///
    /// Panics if `next_move` is not among the untried moves.
    pub fn expand<S: GameState<Move = M>>(
        &mut self,
        index: NodeIndex,
        next_move: M,
        state: &S,
    ) -> NodeIndex {
        let Some(position) = self.nodes[index]
            .untried_moves
            .iter()
            .position(|&m| m == next_move)
        else {
            panic!("move {next_move} is not an untried move of node {index}");
        };
        let _ = self.nodes[index].untried_moves.remove(position);
        let child = self.nodes.len();
        self.nodes.push(Node::new(index, Some(next_move), state));
        self.nodes[index].children.push((next_move, child));
        child
    }

    /// Records one more visit with the given result. The result has to be
    /// from the perspective of the node's [`Node::player_just_moved`].
    pub fn update(&mut self, index: NodeIndex, result: f64) {
        let node = &mut self.nodes[index];
        node.visits += 1;
        node.wins += result;
    }

    /// Updates `leaf` and all of its ancestors with the result of the
    /// terminal `state`, each from the perspective of its own player.
    pub fn backpropagate<S: GameState<Move = M>>(&mut self, leaf: NodeIndex, state: &S) {
        let mut index = leaf;
        while index != TOMBSTONE_PARENT {
            let result = state.result(self.nodes[index].player_just_moved);
            self.update(index, result);
            index = self.nodes[index].parent;
        }
    }

    /// Returns the move leading to the most visited child of the root. Ties
    /// go to the child expanded first.
    #[must_use]
    pub fn best_move(&self) -> Option<M> {
        let mut best: Option<(M, u32)> = None;
        for &(next_move, child) in &self[Self::ROOT].children {
            let visits = self[child].visits;
            if best.map_or(true, |(_, most)| visits > most) {
                best = Some((next_move, visits));
            }
        }
        best.map(|(next_move, _)| next_move)
    }

    /// Formats the root's children, one per line.
    #[must_use]
    pub fn root_children(&self) -> impl fmt::Display + '_ {
        RootChildren(self)
    }

    fn write_subtree(
        &self,
        f: &mut fmt::Formatter<'_>,
        index: NodeIndex,
        depth: usize,
    ) -> fmt::Result {
        writeln!(f, "{}{}", "| ".repeat(depth), self[index])?;
        for &(_, child) in &self[index].children {
            self.write_subtree(f, child, depth + 1)?;
        }
        Ok(())
    }
}

impl<M> Index<NodeIndex> for Tree<M> {
    type Output = Node<M>;

    fn index(&self, index: NodeIndex) -> &Node<M> {
        &self.nodes[index]
    }
}

impl<M: Copy + PartialEq + fmt::Display> fmt::Display for Tree<M> {
    /// Prints every node on its own line, indented by its depth.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write_subtree(f, Self::ROOT, 0)
    }
}

struct RootChildren<'a, M>(&'a Tree<M>);

impl<M: Copy + PartialEq + fmt::Display> fmt::Display for RootChildren<'_, M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tree = self.0;
        for &(_, child) in tree[Tree::<M>::ROOT].children() {
            writeln!(f, "{}", tree[child])?;
        }
        Ok(())
    }
}
