//! Order-preserving set insertion over `Vec`

/// Where new items are placed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Placement {
    /// Append at the end
    #[default]
    Back,
    /// Prepend, one item at a time
    Front,
}

/// Adds each item not already present (by value equality) to `set`.
///
/// With [`Placement::Front`] items are prepended one at a time, so several
/// new items end up in reverse order ahead of the existing ones. Returns the
/// same collection for chaining.
pub fn add_to_set<T, I>(set: &mut Vec<T>, placement: Placement, items: I) -> &mut Vec<T>
where
    T: PartialEq,
    I: IntoIterator<Item = T>,
{
    for item in items {
        if set.contains(&item) {
            continue;
        }
        match placement {
            Placement::Back => set.push(item),
            Placement::Front => set.insert(0, item),
        }
    }
    set
}
