use crate::domain::{Region, RegionId};

/// Seed data for the built-in region catalog.
///
/// Base load figures are the reference operating point each optimization
/// starts from; reseeding the registry is the only way they change.
struct RegionSeed {
    id: &'static str,
    display_name: &'static str,
    base_demand_mw: f64,
    base_supply_mw: f64,
}

const BUILTIN_REGIONS: &[RegionSeed] = &[
    RegionSeed {
        id: "us-west",
        display_name: "US West",
        base_demand_mw: 1000.0,
        base_supply_mw: 1100.0,
    },
    RegionSeed {
        id: "us-east",
        display_name: "US East",
        base_demand_mw: 1500.0,
        base_supply_mw: 1550.0,
    },
    RegionSeed {
        id: "us-central",
        display_name: "US Central",
        base_demand_mw: 800.0,
        base_supply_mw: 850.0,
    },
    RegionSeed {
        id: "pgae",
        display_name: "PG&E",
        base_demand_mw: 1200.0,
        base_supply_mw: 1250.0,
    },
];

/// Read-only catalog of valid regions, shared by all callers.
#[derive(Debug, Clone)]
pub struct RegionRegistry {
    regions: Vec<Region>,
}

impl RegionRegistry {
    /// Registry seeded with the built-in region catalog.
    pub fn builtin() -> Self {
        let regions = BUILTIN_REGIONS
            .iter()
            .map(|seed| Region {
                id: RegionId::new(seed.id),
                display_name: seed.display_name.to_string(),
                base_demand_mw: seed.base_demand_mw,
                base_supply_mw: seed.base_supply_mw,
            })
            .collect();
        Self { regions }
    }

    /// Reseed with an explicit catalog (tests, alternate deployments).
    pub fn from_regions(regions: Vec<Region>) -> Self {
        Self { regions }
    }

    pub fn contains(&self, id: &str) -> bool {
        self.regions.iter().any(|r| r.id.as_str() == id)
    }

    pub fn get(&self, id: &RegionId) -> Option<&Region> {
        self.regions.iter().find(|r| &r.id == id)
    }

    pub fn all(&self) -> &[Region] {
        &self.regions
    }
}

impl Default for RegionRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_catalog() {
        let registry = RegionRegistry::builtin();
        assert_eq!(registry.all().len(), 4);
        assert!(registry.contains("us-west"));
        assert!(registry.contains("us-east"));
        assert!(registry.contains("us-central"));
        assert!(registry.contains("pgae"));
        assert!(!registry.contains("atlantis"));
    }

    #[test]
    fn test_base_load_parameters() {
        let registry = RegionRegistry::builtin();
        let id = RegionId::new("us-west");
        let region = registry.get(&id).unwrap();
        assert_eq!(region.base_demand_mw, 1000.0);
        assert_eq!(region.base_supply_mw, 1100.0);
        assert_eq!(region.display_name, "US West");
    }

    #[test]
    fn test_reseed_replaces_catalog() {
        let registry = RegionRegistry::from_regions(vec![Region {
            id: RegionId::new("test-region"),
            display_name: "Test Region".to_string(),
            base_demand_mw: 100.0,
            base_supply_mw: 120.0,
        }]);
        assert!(registry.contains("test-region"));
        assert!(!registry.contains("us-west"));
    }
}
