//! Stacking order of the clients on a single tag.
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A layer within a [ClientStack].
///
/// Layers are ordered from the top of the stack to the bottom: anything in the
/// fullscreen layer is stacked above everything that is only in the normal
/// layer.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Layer {
    /// Clients that are currently fullscreen
    Fullscreen,
    /// Every client is a member of the normal layer
    Normal,
}

impl Layer {
    fn index(&self) -> usize {
        match self {
            Layer::Fullscreen => 0,
            Layer::Normal => 1,
        }
    }
}

/// The z-order of the clients on a tag.
///
/// Elements are identifiers rather than the clients themselves: the stack never
/// owns what it orders. Every element is a member of [Layer::Normal] and may
/// additionally be a member of higher layers, in which case it is stacked at its
/// highest position.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientStack<T> {
    // index 0 is the top layer, each layer is ordered top first
    layers: [Vec<T>; 2],
}

impl<T> Default for ClientStack<T> {
    fn default() -> Self {
        Self {
            layers: [Vec::new(), Vec::new()],
        }
    }
}

impl<T> ClientStack<T>
where
    T: Copy + PartialEq,
{
    /// Create a new empty stack
    pub fn new() -> Self {
        Self::default()
    }

    /// The number of distinct elements in this stack
    pub fn len(&self) -> usize {
        self.layers[Layer::Normal.index()].len()
    }

    /// Whether or not this stack has any elements
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Check whether `t` is in this stack
    pub fn contains(&self, t: &T) -> bool {
        self.layers[Layer::Normal.index()].contains(t)
    }

    /// Check whether `t` is a member of the given layer
    pub fn in_layer(&self, t: &T, layer: Layer) -> bool {
        self.layers[layer.index()].contains(t)
    }

    /// Insert a new element at the top of the normal layer.
    ///
    /// Inserting an element that is already present is a no-op.
    pub fn insert(&mut self, t: T) {
        if !self.contains(&t) {
            self.layers[Layer::Normal.index()].insert(0, t);
        }
    }

    /// Remove an element from every layer, returning whether it was present.
    pub fn remove(&mut self, t: &T) -> bool {
        let present = self.contains(t);
        for layer in self.layers.iter_mut() {
            layer.retain(|e| e != t);
        }

        present
    }

    /// Move an element to the top of every layer it is a member of.
    pub fn raise(&mut self, t: &T) {
        for layer in self.layers.iter_mut() {
            if let Some(ix) = layer.iter().position(|e| e == t) {
                let e = layer.remove(ix);
                layer.insert(0, e);
            }
        }
    }

    /// Add an existing element to an additional layer, placing it at the top of
    /// that layer. Unknown elements are ignored.
    pub fn add_layer(&mut self, t: &T, layer: Layer) {
        if !self.contains(t) || self.in_layer(t, layer) {
            return;
        }

        self.layers[layer.index()].insert(0, *t);
    }

    /// Remove an element from a layer. Elements can not be removed from the
    /// normal layer this way: use [ClientStack::remove] instead.
    pub fn remove_layer(&mut self, t: &T, layer: Layer) {
        if layer == Layer::Normal {
            return;
        }

        self.layers[layer.index()].retain(|e| e != t);
    }

    /// The elements of this stack from top to bottom, each appearing once at its
    /// highest position.
    pub fn order(&self) -> Vec<T> {
        let mut order: Vec<T> = Vec::with_capacity(self.len());
        for t in self.layers.iter().flatten() {
            if !order.contains(t) {
                order.push(*t);
            }
        }

        order
    }
}
