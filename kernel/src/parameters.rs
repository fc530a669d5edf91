use std::ops::Index;

/// Maps the flat parameter vector into named slots.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParameterLayout {
    names: Vec<&'static str>,
}

impl ParameterLayout {
    /// Creates a new `ParameterLayout`.
    ///
    /// # Arguments
    /// * `names` - The parameter names in vector order, scale and background excluded.
    pub fn new<I>(names: I) -> Self
    where
        I: IntoIterator<Item = &'static str>,
    {
        Self {
            names: names.into_iter().collect(),
        }
    }

    /// Returns the amount of parameters.
    #[inline]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Returns the position of a named parameter.
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.names.iter().position(|&n| n == name)
    }

    /// Returns the name at a position.
    pub fn name(&self, index: usize) -> Option<&'static str> {
        self.names.get(index).copied()
    }

    pub fn names(&self) -> &[&'static str] {
        &self.names
    }
}

/// The working copy of the model parameters for the current grid point.
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterBlock {
    values: Box<[f64]>,
}

impl ParameterBlock {
    /// Creates a new `ParameterBlock` seeded from the nominal parameters.
    pub fn new(nominal: &[f64]) -> Self {
        Self {
            values: nominal.into(),
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    #[inline]
    pub fn get(&self, index: usize) -> f64 {
        self.values[index]
    }

    #[inline]
    pub fn set(&mut self, index: usize, value: f64) {
        self.values[index] = value;
    }

    /// Overwrites every value with the ones in `other`, which must have the same length.
    #[inline]
    pub fn copy_from(&mut self, other: &ParameterBlock) {
        self.values.copy_from_slice(&other.values);
    }

    /// Returns the read-only view handed to the shape model.
    #[inline]
    pub fn table<'a>(&'a self, layout: &'a ParameterLayout) -> ParameterTable<'a> {
        ParameterTable::new(&self.values, layout)
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.values
    }
}

/// A read-only named view over a parameter block.
///
/// The view does not own the values, it interprets them through a `ParameterLayout`.
#[derive(Debug, Clone, Copy)]
pub struct ParameterTable<'a> {
    values: &'a [f64],
    layout: &'a ParameterLayout,
}

impl<'a> ParameterTable<'a> {
    pub fn new(values: &'a [f64], layout: &'a ParameterLayout) -> Self {
        debug_assert!(values.len() >= layout.len());
        Self { values, layout }
    }

    #[inline]
    pub fn get(&self, index: usize) -> f64 {
        self.values[index]
    }

    /// Looks a parameter up by name.
    ///
    /// This is a linear scan; hot paths should resolve indices once through
    /// `ParameterLayout::index_of` and use `get`.
    pub fn by_name(&self, name: &str) -> Option<f64> {
        self.layout.index_of(name).map(|i| self.values[i])
    }

    #[inline]
    pub fn as_slice(&self) -> &'a [f64] {
        self.values
    }

    #[inline]
    pub fn layout(&self) -> &'a ParameterLayout {
        self.layout
    }
}

impl Index<usize> for ParameterTable<'_> {
    type Output = f64;

    #[inline]
    fn index(&self, index: usize) -> &f64 {
        &self.values[index]
    }
}
