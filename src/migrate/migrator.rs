//! Version-tagged migration.
//!
//! A [`Migrator`] is an ordered registry of `(from, to, transform)` steps.
//! Migrating reads the document's tag, applies the step registered for that
//! exact tag, writes the step's `to` tag, and repeats until the tag is
//! current. The loop runs at most `registry.len()` times.
//!
//! Work happens on a copy; the caller's document is replaced only when the
//! whole chain succeeds.

use tracing::{debug, info};

use super::error::MigrationError;
use crate::store::StoreError;

/// A document carrying a format version tag.
pub trait Versioned: Clone {
    fn version(&self) -> &str;
    fn set_version(&mut self, version: &str);
}

/// One transform. Receives the document still tagged with `from`.
pub type Transform<D> = fn(&mut D) -> Result<(), StoreError>;

struct MigrationStep<D> {
    from: String,
    to: String,
    transform: Transform<D>,
}

/// Outcome of a successful migration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MigrationReport {
    /// Tag the document carried before migrating.
    pub from: String,
    /// Tag it carries now.
    pub to: String,
    /// Transforms applied.
    pub steps: usize,
}

impl MigrationReport {
    /// Did anything change? Callers re-save when this is true.
    #[must_use]
    pub fn migrated(&self) -> bool {
        self.steps > 0
    }
}

/// Ordered registry of format transforms.
pub struct Migrator<D> {
    current: String,
    steps: Vec<MigrationStep<D>>,
}

impl<D: Versioned> Migrator<D> {
    /// Create an empty registry whose target is `current`.
    #[must_use]
    pub fn new(current: impl Into<String>) -> Self {
        Self {
            current: current.into(),
            steps: Vec::new(),
        }
    }

    /// Register a transform (builder pattern).
    #[must_use]
    pub fn step(mut self, from: &str, to: &str, transform: Transform<D>) -> Self {
        self.steps.push(MigrationStep {
            from: from.to_string(),
            to: to.to_string(),
            transform,
        });
        self
    }

    #[must_use]
    pub fn current(&self) -> &str {
        &self.current
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Every version the registry knows, oldest first.
    pub fn versions(&self) -> impl Iterator<Item = &str> {
        self.steps
            .iter()
            .map(|s| s.from.as_str())
            .chain(std::iter::once(self.current.as_str()))
    }

    #[must_use]
    pub fn needs_migration(&self, doc: &D) -> bool {
        doc.version() != self.current
    }

    /// Bring `doc` to the current version.
    pub fn migrate(&self, doc: &mut D) -> Result<MigrationReport, MigrationError> {
        let from = doc.version().to_string();
        if from == self.current {
            return Ok(MigrationReport {
                to: from.clone(),
                from,
                steps: 0,
            });
        }

        let mut work = doc.clone();
        let mut applied = 0;
        while work.version() != self.current {
            if applied >= self.steps.len() {
                return Err(MigrationError::IterationLimit {
                    version: work.version().to_string(),
                    limit: self.steps.len(),
                });
            }
            let tag = work.version().to_string();
            let step = self
                .steps
                .iter()
                .find(|s| s.from == tag)
                .ok_or_else(|| MigrationError::UnknownVersion(tag.clone()))?;

            (step.transform)(&mut work).map_err(|source| MigrationError::Store {
                from: tag.clone(),
                source,
            })?;
            work.set_version(&step.to);
            applied += 1;
            debug!(from = %tag, to = %step.to, "applied migration step");
        }

        info!(from = %from, to = %self.current, steps = applied, "migrated document");
        *doc = work;
        Ok(MigrationReport {
            from,
            to: self.current.clone(),
            steps: applied,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone, Debug, PartialEq)]
    struct Tagged {
        tag: String,
        log: Vec<&'static str>,
    }

    impl Versioned for Tagged {
        fn version(&self) -> &str {
            &self.tag
        }
        fn set_version(&mut self, version: &str) {
            self.tag = version.to_string();
        }
    }

    fn doc(tag: &str) -> Tagged {
        Tagged { tag: tag.to_string(), log: Vec::new() }
    }

    fn chain() -> Migrator<Tagged> {
        Migrator::<Tagged>::new("3")
            .step("1", "2", |d| {
                d.log.push("1->2");
                Ok(())
            })
            .step("2", "3", |d| {
                d.log.push("2->3");
                Ok(())
            })
    }

    #[test]
    fn test_full_chain() {
        let mut d = doc("1");
        let report = chain().migrate(&mut d).unwrap();
        assert_eq!(report.steps, 2);
        assert!(report.migrated());
        assert_eq!(d.tag, "3");
        assert_eq!(d.log, ["1->2", "2->3"]);
    }

    #[test]
    fn test_current_is_noop() {
        let mut d = doc("3");
        let report = chain().migrate(&mut d).unwrap();
        assert!(!report.migrated());
        assert!(d.log.is_empty());
    }

    #[test]
    fn test_unknown_version_leaves_document_untouched() {
        let mut d = doc("0.9");
        let err = chain().migrate(&mut d).unwrap_err();
        assert_eq!(err, MigrationError::UnknownVersion("0.9".into()));
        assert_eq!(d, doc("0.9"));
    }

    #[test]
    fn test_cycle_hits_iteration_limit() {
        let looping = Migrator::<Tagged>::new("9")
            .step("1", "2", |_| Ok(()))
            .step("2", "1", |_| Ok(()));
        let mut d = doc("1");
        let err = looping.migrate(&mut d).unwrap_err();
        assert!(matches!(err, MigrationError::IterationLimit { limit: 2, .. }));
        assert_eq!(d.tag, "1");
    }

    #[test]
    fn test_failed_transform_is_not_committed() {
        let failing = Migrator::<Tagged>::new("3")
            .step("1", "2", |d| {
                d.log.push("1->2");
                Ok(())
            })
            .step("2", "3", |_| Err(StoreError::BlockExists("x".into())));
        let mut d = doc("1");
        assert!(matches!(failing.migrate(&mut d), Err(MigrationError::Store { .. })));
        assert_eq!(d, doc("1"));
    }

    #[test]
    fn test_versions_listing() {
        let versions: Vec<_> = chain().versions().map(str::to_string).collect();
        assert_eq!(versions, ["1", "2", "3"]);
    }
}
