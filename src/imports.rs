use std::collections::BTreeSet;

/// Module an implicit import is resolved from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ImportOrigin {
    /// Scene runtime types (nodes, materials, math).
    Core,
    Gui,
    /// Binding runtime and the view object library.
    Runtime,
    Utility,
}

impl ImportOrigin {
    pub const ORDER: [ImportOrigin; 4] = [
        ImportOrigin::Core,
        ImportOrigin::Gui,
        ImportOrigin::Runtime,
        ImportOrigin::Utility,
    ];
}

/// Implicit imports collected while translating. Deduplicated and sorted.
#[derive(Debug, Clone, Default)]
pub struct ImportTracker {
    core: BTreeSet<String>,
    gui: BTreeSet<String>,
    runtime: BTreeSet<String>,
    utility: BTreeSet<String>,
}

impl ImportTracker {
    pub fn new() -> Self {
        Self::default()
    }

    fn group_mut(&mut self, origin: ImportOrigin) -> &mut BTreeSet<String> {
        match origin {
            ImportOrigin::Core => &mut self.core,
            ImportOrigin::Gui => &mut self.gui,
            ImportOrigin::Runtime => &mut self.runtime,
            ImportOrigin::Utility => &mut self.utility,
        }
    }

    pub fn group(&self, origin: ImportOrigin) -> &BTreeSet<String> {
        match origin {
            ImportOrigin::Core => &self.core,
            ImportOrigin::Gui => &self.gui,
            ImportOrigin::Runtime => &self.runtime,
            ImportOrigin::Utility => &self.utility,
        }
    }

    pub fn add(&mut self, origin: ImportOrigin, name: &str) {
        self.group_mut(origin).insert(name.to_string());
    }

    pub fn contains(&self, origin: ImportOrigin, name: &str) -> bool {
        self.group(origin).contains(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_groups_dedupe_and_sort() {
        let mut imports = ImportTracker::new();
        imports.add(ImportOrigin::Core, "Vector3");
        imports.add(ImportOrigin::Core, "Color3");
        imports.add(ImportOrigin::Core, "Vector3");
        imports.add(ImportOrigin::Utility, "isEqual");

        let core: Vec<&str> = imports.group(ImportOrigin::Core).iter().map(String::as_str).collect();
        assert_eq!(core, vec!["Color3", "Vector3"]);
        assert!(imports.contains(ImportOrigin::Utility, "isEqual"));
        assert!(imports.group(ImportOrigin::Gui).is_empty());
    }
}
