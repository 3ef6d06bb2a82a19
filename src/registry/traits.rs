//! Common trait for registries that store named converters.

/// Common trait for registries that map a kind name to a converter.
///
/// Both the symbol and renderer registries implement it, so callers (and the
/// `kinds` command) can inspect them uniformly.
///
/// # Type Parameters
///
/// * `V` - The type of value stored in the registry
///
/// # Example
///
/// ```
/// use esri2sld::registry::Registry;
/// use esri2sld::symbols::{ConvertOptions, SymbolRegistry};
///
/// let registry = SymbolRegistry::with_defaults(ConvertOptions::default());
///
/// assert!(registry.contains("SimpleFillSymbol"));
/// assert!(!registry.contains("ThreeDChartSymbol"));
/// assert!(!registry.is_empty());
/// ```
pub trait Registry<V: ?Sized> {
    /// Check if a converter with the given kind name exists.
    fn contains(&self, name: &str) -> bool;

    /// Get a converter by kind name.
    ///
    /// Returns `None` if no converter with the given name exists.
    fn get(&self, name: &str) -> Option<&V>;

    /// Get the number of converters in the registry.
    fn len(&self) -> usize;

    /// Check if the registry is empty.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Get an iterator over all kind names, in lookup order.
    fn names(&self) -> Box<dyn Iterator<Item = &'static str> + '_>;
}
