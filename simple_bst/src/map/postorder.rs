use std::iter::FusedIterator;

use super::Node;

pub struct IterPostorder<'a, K, V> {
    /// Each pending node, paired with `true` until its right subtree has been entered
    to_visit: Vec<(&'a Node<K, V>, bool)>,
    spine: Option<&'a Node<K, V>>,
}

impl<'a, K, V> IterPostorder<'a, K, V> {
    pub(super) fn new(root: Option<&'a Node<K, V>>) -> Self {
        Self {
            to_visit: Vec::new(),
            spine: root,
        }
    }
}

impl<'a, K, V> Iterator for IterPostorder<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            while let Some(node) = self.spine {
                self.to_visit.push((node, true));
                self.spine = node.left();
            }

            let (node, first_visit) = self.to_visit.last_mut()?;
            let node = *node;
            if *first_visit {
                *first_visit = false;
                self.spine = node.right();
            } else {
                self.to_visit.pop();
                return Some((node.key(), node.value()));
            }
        }
    }
}

impl<'a, K, V> FusedIterator for IterPostorder<'a, K, V> {}
