use std::iter::FusedIterator;

use super::Node;

pub struct IterInorder<'a, K, V> {
    to_visit: Vec<&'a Node<K, V>>,
    spine: Option<&'a Node<K, V>>,
}

impl<'a, K, V> IterInorder<'a, K, V> {
    pub(super) fn new(root: Option<&'a Node<K, V>>) -> Self {
        Self {
            to_visit: Vec::new(),
            spine: root,
        }
    }
}

impl<'a, K, V> Iterator for IterInorder<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(node) = self.spine {
            self.to_visit.push(node);
            self.spine = node.left();
        }

        let node = self.to_visit.pop()?;
        self.spine = node.right();

        Some((node.key(), node.value()))
    }
}

impl<'a, K, V> FusedIterator for IterInorder<'a, K, V> {}
