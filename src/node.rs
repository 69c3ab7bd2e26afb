//! The quadtree's node type: a tagged sum of `Leaf(countryId)` and
//! `Internal([NW,NE,SW,SE])`, per §3/§9 "Tagged-variant node".

/// Country identifier. `0` is reserved for "no country / ocean".
pub type CountryId = u16;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Leaf(CountryId),
    /// Children in fixed NW, NE, SW, SE order. Degenerate-axis rectangles
    /// (§4.2) have only two logical children; this is represented as a
    /// two-element vector rather than padding to four, so the serializer
    /// never needs to special-case "empty" slots.
    Internal(Vec<Node>),
}

impl Node {
    /// If every child of this node is a leaf carrying the same id, collapse
    /// it into a single leaf (§4.3 step 5 canonicalization, applied eagerly
    /// per the Open Question decision recorded in `SPEC_FULL.md` §9).
    pub fn collapse_if_uniform(self) -> Node {
        match &self {
            Node::Internal(children) => match children.first() {
                Some(Node::Leaf(first_id))
                    if children
                        .iter()
                        .all(|c| matches!(c, Node::Leaf(id) if id == first_id)) =>
                {
                    Node::Leaf(*first_id)
                }
                _ => self,
            },
            Node::Leaf(_) => self,
        }
    }

    pub fn leaf_count(&self) -> usize {
        match self {
            Node::Leaf(_) => 1,
            Node::Internal(children) => children.iter().map(Node::leaf_count).sum(),
        }
    }

    pub fn internal_count(&self) -> usize {
        match self {
            Node::Leaf(_) => 0,
            Node::Internal(children) => {
                1 + children.iter().map(Node::internal_count).sum::<usize>()
            }
        }
    }

    /// §8 property 8: no internal node has every child a leaf sharing one id.
    pub fn is_canonical(&self) -> bool {
        match self {
            Node::Leaf(_) => true,
            Node::Internal(children) => {
                let all_same_leaf = children
                    .first()
                    .and_then(|first| match first {
                        Node::Leaf(id) => Some(*id),
                        Node::Internal(_) => None,
                    })
                    .map(|first_id| {
                        children
                            .iter()
                            .all(|c| matches!(c, Node::Leaf(id) if *id == first_id))
                    })
                    .unwrap_or(false);
                !all_same_leaf && children.iter().all(Node::is_canonical)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collapses_uniform_leaf_children() {
        let node = Node::Internal(vec![Node::Leaf(3), Node::Leaf(3), Node::Leaf(3), Node::Leaf(3)]);
        assert_eq!(node.collapse_if_uniform(), Node::Leaf(3));
    }

    #[test]
    fn does_not_collapse_mixed_children() {
        let node = Node::Internal(vec![Node::Leaf(3), Node::Leaf(4)]);
        let collapsed = node.clone().collapse_if_uniform();
        assert_eq!(collapsed, node);
    }

    #[test]
    fn canonical_check_detects_collapsible_node() {
        let node = Node::Internal(vec![Node::Leaf(1), Node::Leaf(1)]);
        assert!(!node.is_canonical());
        assert!(node.collapse_if_uniform().is_canonical());
    }
}
