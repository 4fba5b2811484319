use smol_str::SmolStr;

/// Supplies the column list for a base table by dotted name.
///
/// Expected to be a pure, idempotent function of its input: the collectors in
/// this crate may call it more than once for the same table within a single
/// pass.
pub trait SchemaResolver {
    fn columns(&self, table: &[SmolStr]) -> Option<Vec<SmolStr>>;
}

impl<F> SchemaResolver for F
where
    F: Fn(&[SmolStr]) -> Option<Vec<SmolStr>>,
{
    fn columns(&self, table: &[SmolStr]) -> Option<Vec<SmolStr>> {
        self(table)
    }
}
