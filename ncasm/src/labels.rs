use std::collections::HashMap;

/// Symbol table built during the layout pass: label name to byte address
/// relative to the start of the output.
pub type LabelMap<'i> = HashMap<&'i str, u32>;
