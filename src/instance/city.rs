//! City identifiers and coordinates.

/// A city with an identifier and planar coordinates.
///
/// The identifier is used only to label the final tour; the coordinates
/// are used only to build a Euclidean distance matrix.
///
/// # Examples
///
/// ```
/// use u_satsp::instance::City;
///
/// let a = City::new(1, 0.0, 0.0);
/// let b = City::new(2, 3.0, 4.0);
/// assert!((a.distance_to(&b) - 5.0).abs() < 1e-10);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct City {
    /// Caller-chosen identifier.
    pub id: usize,
    /// X coordinate.
    pub x: f64,
    /// Y coordinate.
    pub y: f64,
}

impl City {
    /// Creates a city.
    pub fn new(id: usize, x: f64, y: f64) -> Self {
        Self { id, x, y }
    }

    /// Euclidean distance to another city.
    pub fn distance_to(&self, other: &City) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}
