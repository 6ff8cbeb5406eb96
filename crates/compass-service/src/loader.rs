//! Catalog and evaluation plan loading
//!
//! Everything here runs once at startup. Any failure is a configuration
//! error and aborts startup.

use compass_core::{AssessmentPlan, Catalog, Error, EvaluationPlan, Result};
use compass_mapper::{mapper_by_id, Mapper, MapperId, MapperSet, Scope};
use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::config::CompassConfig;

/// Load catalog files into a scope keyed by each catalog's own ID
pub fn scope_from_catalog_paths<P: AsRef<Path>>(paths: &[P]) -> Result<Scope> {
    let mut scope = Scope::new();

    for path in paths {
        let path = path.as_ref();
        let catalog = Catalog::from_file(path)?;
        let catalog_id = catalog.id().to_string();

        if catalog_id.is_empty() {
            return Err(Error::catalog(format!(
                "catalog {} has no metadata.id",
                path.display()
            )));
        }
        if scope.contains(&catalog_id) {
            return Err(Error::config(format!(
                "duplicate catalog ID {} in {}",
                catalog_id,
                path.display()
            )));
        }

        info!(
            catalog_id = %catalog_id,
            path = %path.display(),
            controls = catalog.controls().count(),
            "Loaded catalog"
        );
        scope.insert(catalog);
    }

    Ok(scope)
}

/// Read every `*.yaml` / `*.yml` file under `dir`, in sorted path order
pub fn load_plans(dir: &Path) -> Result<Vec<AssessmentPlan>> {
    if !dir.exists() {
        return Err(Error::config(format!(
            "evaluations directory {} not found",
            dir.display()
        )));
    }
    if !dir.is_dir() {
        return Err(Error::config(format!(
            "evaluations path {} is not a directory",
            dir.display()
        )));
    }

    let mut plans = Vec::new();

    for entry in WalkDir::new(dir).sort_by_file_name() {
        let entry = entry
            .map_err(|e| Error::config(format!("failed to walk {}: {}", dir.display(), e)))?;

        if !entry.file_type().is_file() || !is_yaml(entry.path()) {
            continue;
        }

        let document = EvaluationPlan::from_file(entry.path())?;
        debug!(
            path = %entry.path().display(),
            plans = document.plans.len(),
            "Read evaluation plan"
        );
        plans.extend(document.plans);
    }

    Ok(plans)
}

fn is_yaml(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|ext| ext.to_str()),
        Some("yaml") | Some("yml")
    )
}

/// Build a mapper for `id` holding every plan found under `dir`
///
/// Plans are attached to the catalog named by their control's
/// `reference-id`; plans without one are skipped.
pub fn mapper_from_dir(id: &MapperId, dir: &Path) -> Result<Box<dyn Mapper>> {
    let mut by_catalog: BTreeMap<String, Vec<AssessmentPlan>> = BTreeMap::new();

    for plan in load_plans(dir)? {
        if plan.catalog_id().is_empty() {
            warn!(
                mapper = %id,
                control_id = %plan.control_id(),
                "Skipping plan without catalog reference"
            );
            continue;
        }
        by_catalog
            .entry(plan.catalog_id().to_string())
            .or_default()
            .push(plan);
    }

    let mut mapper = mapper_by_id(id);
    for (catalog_id, plans) in by_catalog {
        debug!(mapper = %id, catalog_id = %catalog_id, plans = plans.len(), "Adding plans");
        mapper.add_evaluation_plan(&catalog_id, plans);
    }

    for shared in shared_procedures(mapper.as_ref()) {
        warn!(
            mapper = %id,
            policy_rule_id = %shared.procedure_id,
            catalog_id = %shared.catalog_id,
            resolved_catalog_id = %shared.resolved_catalog_id,
            "Procedure appears under several catalogs"
        );
    }
    Ok(mapper)
}

/// A procedure ID repeated under a later catalog
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct SharedProcedure {
    pub procedure_id: String,
    pub catalog_id: String,
    pub resolved_catalog_id: String,
}

/// Procedure IDs present under several catalogs resolve to the first catalog only
pub(crate) fn shared_procedures(mapper: &dyn Mapper) -> Vec<SharedProcedure> {
    let mut first_seen: HashMap<&str, &str> = HashMap::new();
    let mut shared = Vec::new();

    for (catalog_id, plans) in mapper.plans() {
        for plan in plans {
            for (_, procedure) in plan.procedures() {
                let owner = *first_seen.entry(procedure.id.as_str()).or_insert(catalog_id);
                if owner != catalog_id.as_str() {
                    shared.push(SharedProcedure {
                        procedure_id: procedure.id.clone(),
                        catalog_id: catalog_id.clone(),
                        resolved_catalog_id: owner.to_string(),
                    });
                }
            }
        }
    }

    shared
}

/// Build the mapper registry described by the configuration
pub fn mapper_set_from_config(config: &CompassConfig) -> Result<MapperSet> {
    let mut set = MapperSet::new();

    for plugin in &config.plugins {
        if plugin.evaluations_dir.as_os_str().is_empty() {
            info!(mapper = %plugin.id, "No evaluations directory, skipping plugin");
            continue;
        }

        let mapper = mapper_from_dir(&plugin.id, &plugin.evaluations_dir)?;
        info!(
            mapper = %plugin.id,
            catalogs = mapper.plans().len(),
            "Loaded mapper"
        );

        if set.insert(Arc::from(mapper)).is_some() {
            warn!(mapper = %plugin.id, "Plugin configured twice, keeping the last entry");
        }
    }

    Ok(set)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    const PLAN: &str = r#"
plans:
  - control:
      reference-id: cat-1
      entry-id: AC-1
    assessments:
      - requirement:
          reference-id: cat-1
          entry-id: AC-1-REQ
        procedures:
          - id: proc-1
"#;

    #[test]
    fn test_is_yaml() {
        assert!(is_yaml(Path::new("plan.yaml")));
        assert!(is_yaml(Path::new("nested/plan.yml")));
        assert!(!is_yaml(Path::new("plan.json")));
        assert!(!is_yaml(Path::new("README")));
    }

    #[test]
    fn test_load_plans_walks_nested_dirs() {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("nested")).unwrap();
        fs::write(dir.path().join("a.yaml"), PLAN).unwrap();
        fs::write(dir.path().join("nested/b.yml"), PLAN).unwrap();
        fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let plans = load_plans(dir.path()).unwrap();
        assert_eq!(plans.len(), 2);
    }

    #[test]
    fn test_load_plans_rejects_file_path() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("plan.yaml");
        fs::write(&file, PLAN).unwrap();

        let err = load_plans(&file).unwrap_err();
        assert!(err.to_string().contains("not a directory"));
    }

    #[test]
    fn test_plans_without_catalog_are_skipped() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("plan.yaml"),
            "plans:\n  - control:\n      entry-id: AC-9\n",
        )
        .unwrap();

        let mapper = mapper_from_dir(&MapperId::from("opa"), dir.path()).unwrap();
        assert!(mapper.plans().is_empty());
    }

    #[test]
    fn test_procedure_shared_across_catalogs_resolves_to_first() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("a.yaml"), PLAN.replace("cat-1", "cat-2")).unwrap();
        fs::write(dir.path().join("b.yaml"), PLAN).unwrap();

        let mapper = mapper_from_dir(&MapperId::from("opa"), dir.path()).unwrap();
        let catalogs: Vec<&str> = mapper.plans().keys().map(String::as_str).collect();
        assert_eq!(catalogs, vec!["cat-1", "cat-2"]);

        assert_eq!(
            shared_procedures(mapper.as_ref()),
            vec![SharedProcedure {
                procedure_id: "proc-1".to_string(),
                catalog_id: "cat-2".to_string(),
                resolved_catalog_id: "cat-1".to_string(),
            }]
        );
    }

    #[test]
    fn test_distinct_procedures_are_not_shared() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("a.yaml"), PLAN).unwrap();
        fs::write(
            dir.path().join("b.yaml"),
            PLAN.replace("cat-1", "cat-2").replace("proc-1", "proc-2"),
        )
        .unwrap();

        let mapper = mapper_from_dir(&MapperId::from("opa"), dir.path()).unwrap();
        assert_eq!(mapper.plans().len(), 2);
        assert!(shared_procedures(mapper.as_ref()).is_empty());
    }
}
