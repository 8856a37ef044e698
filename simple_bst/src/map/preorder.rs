use std::iter::FusedIterator;

use super::Node;

pub struct IterPreorder<'a, K, V> {
    /// Visited nodes whose right subtree is still unexplored
    to_visit: Vec<&'a Node<K, V>>,
    spine: Option<&'a Node<K, V>>,
}

impl<'a, K, V> IterPreorder<'a, K, V> {
    pub(super) fn new(root: Option<&'a Node<K, V>>) -> Self {
        Self {
            to_visit: Vec::new(),
            spine: root,
        }
    }
}

impl<'a, K, V> Iterator for IterPreorder<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(node) = self.spine {
                self.to_visit.push(node);
                self.spine = node.left();
                return Some((node.key(), node.value()));
            }

            self.spine = self.to_visit.pop()?.right();
        }
    }
}

impl<'a, K, V> FusedIterator for IterPreorder<'a, K, V> {}
