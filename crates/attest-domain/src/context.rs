//! Document context frames (edition, region, version, product, deployment)

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// How a fact obtained its context
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InheritanceMode {
    /// Taken unchanged from the document
    #[default]
    Inherited,
    /// Stated by the source itself
    Asserted,
    /// Document frame with local overrides
    Mixed,
}

/// Context a document (or a fact within it) applies to
///
/// Regions are a set: order is irrelevant and duplicates collapse.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ContextFrame {
    /// Product edition (e.g. "enterprise")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub edition: Option<String>,

    /// Regions the statement applies to
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub regions: BTreeSet<String>,

    /// Product version the document describes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,

    /// Product name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product: Option<String>,

    /// Deployment mode (e.g. "saas", "on_premise")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deployment: Option<String>,

    /// Inheritance mode
    #[serde(default)]
    pub inheritance: InheritanceMode,
}

/// Field-level overrides a fact may carry on top of its document frame
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ContextOverrides {
    /// Edition override
    #[serde(default)]
    pub edition: Option<String>,
    /// Region override (replaces the whole set)
    #[serde(default)]
    pub regions: Option<BTreeSet<String>>,
    /// Version override
    #[serde(default)]
    pub version: Option<String>,
    /// Product override
    #[serde(default)]
    pub product: Option<String>,
    /// Deployment override
    #[serde(default)]
    pub deployment: Option<String>,
}

impl ContextOverrides {
    /// True when no field is overridden
    pub fn is_empty(&self) -> bool {
        self.edition.is_none()
            && self.regions.is_none()
            && self.version.is_none()
            && self.product.is_none()
            && self.deployment.is_none()
    }
}

impl ContextFrame {
    /// Create an empty, unscoped frame
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the edition
    pub fn with_edition(mut self, edition: impl Into<String>) -> Self {
        self.edition = Some(normalize_field(edition.into()));
        self
    }

    /// Add a region
    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.regions.insert(normalize_field(region.into()));
        self
    }

    /// Set the version
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(normalize_field(version.into()));
        self
    }

    /// Set the product
    pub fn with_product(mut self, product: impl Into<String>) -> Self {
        self.product = Some(normalize_field(product.into()));
        self
    }

    /// Set the deployment mode
    pub fn with_deployment(mut self, deployment: impl Into<String>) -> Self {
        self.deployment = Some(normalize_field(deployment.into()));
        self
    }

    /// Set the inheritance mode
    pub fn with_inheritance(mut self, inheritance: InheritanceMode) -> Self {
        self.inheritance = inheritance;
        self
    }

    /// True when no scoping field is set
    pub fn is_unscoped(&self) -> bool {
        self.edition.is_none()
            && self.regions.is_empty()
            && self.version.is_none()
            && self.product.is_none()
            && self.deployment.is_none()
    }

    /// Apply local overrides, returning a new frame
    ///
    /// The receiver (the document's frame) is never mutated. Any effective
    /// override flips the result to [`InheritanceMode::Mixed`].
    pub fn with_overrides(&self, overrides: &ContextOverrides) -> ContextFrame {
        if overrides.is_empty() {
            return self.clone();
        }

        let mut frame = self.clone();
        if let Some(edition) = &overrides.edition {
            frame.edition = Some(normalize_field(edition.clone()));
        }
        if let Some(regions) = &overrides.regions {
            frame.regions = regions.iter().cloned().map(normalize_field).collect();
        }
        if let Some(version) = &overrides.version {
            frame.version = Some(normalize_field(version.clone()));
        }
        if let Some(product) = &overrides.product {
            frame.product = Some(normalize_field(product.clone()));
        }
        if let Some(deployment) = &overrides.deployment {
            frame.deployment = Some(normalize_field(deployment.clone()));
        }
        frame.inheritance = InheritanceMode::Mixed;
        frame
    }

    /// Deterministic key used in fingerprints
    ///
    /// Inheritance mode is not part of the key: the same scope reached by
    /// inheritance or by override is the same scope.
    pub fn context_key(&self) -> String {
        let regions = self
            .regions
            .iter()
            .map(|r| normalize_field(r.clone()))
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect::<Vec<_>>()
            .join(",");

        format!(
            "edition={};region={};version={};product={};deployment={}",
            key_part(&self.edition),
            regions,
            key_part(&self.version),
            key_part(&self.product),
            key_part(&self.deployment),
        )
    }

    /// Whether two frames can describe the same situation
    ///
    /// An unset field is a wildcard. Two set fields must agree; two
    /// non-empty region sets must intersect.
    pub fn overlaps(&self, other: &ContextFrame) -> bool {
        fn agree(a: &Option<String>, b: &Option<String>) -> bool {
            match (a, b) {
                (Some(a), Some(b)) => a.eq_ignore_ascii_case(b),
                _ => true,
            }
        }

        let regions_agree = self.regions.is_empty()
            || other.regions.is_empty()
            || self
                .regions
                .iter()
                .any(|r| other.regions.iter().any(|o| o.eq_ignore_ascii_case(r)));

        agree(&self.edition, &other.edition)
            && regions_agree
            && agree(&self.version, &other.version)
            && agree(&self.product, &other.product)
            && agree(&self.deployment, &other.deployment)
    }

    /// Look up a field by placeholder name (`product`, `edition`, ...)
    pub fn field(&self, name: &str) -> Option<String> {
        match name {
            "edition" => self.edition.clone(),
            "version" => self.version.clone(),
            "product" => self.product.clone(),
            "deployment" => self.deployment.clone(),
            "region" if self.regions.len() == 1 => self.regions.iter().next().cloned(),
            _ => None,
        }
    }
}

fn normalize_field(value: String) -> String {
    value.trim().to_lowercase()
}

fn key_part(value: &Option<String>) -> &str {
    value.as_deref().unwrap_or("*")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_context_key_is_region_order_independent() {
        let a = ContextFrame::new().with_region("EU").with_region("us");
        let b = ContextFrame::new().with_region("US").with_region("eu");
        assert_eq!(a.context_key(), b.context_key());
    }

    #[test]
    fn test_overrides_do_not_mutate_document_frame() {
        let document = ContextFrame::new().with_edition("standard").with_product("vault");
        let overrides = ContextOverrides {
            edition: Some("Enterprise".to_string()),
            ..Default::default()
        };

        let fact_frame = document.with_overrides(&overrides);

        assert_eq!(document.edition.as_deref(), Some("standard"));
        assert_eq!(document.inheritance, InheritanceMode::Inherited);
        assert_eq!(fact_frame.edition.as_deref(), Some("enterprise"));
        assert_eq!(fact_frame.product.as_deref(), Some("vault"));
        assert_eq!(fact_frame.inheritance, InheritanceMode::Mixed);
    }

    #[test]
    fn test_empty_overrides_keep_inheritance() {
        let document = ContextFrame::new().with_edition("standard");
        let frame = document.with_overrides(&ContextOverrides::default());
        assert_eq!(frame, document);
    }

    #[test]
    fn test_overlap_wildcards_and_conflicts() {
        let unscoped = ContextFrame::new();
        let enterprise = ContextFrame::new().with_edition("enterprise");
        let standard = ContextFrame::new().with_edition("standard");

        assert!(unscoped.overlaps(&enterprise));
        assert!(enterprise.overlaps(&enterprise.clone()));
        assert!(!enterprise.overlaps(&standard));
    }

    #[test]
    fn test_region_overlap_requires_intersection() {
        let eu = ContextFrame::new().with_region("eu");
        let eu_us = ContextFrame::new().with_region("eu").with_region("us");
        let apac = ContextFrame::new().with_region("apac");

        assert!(eu.overlaps(&eu_us));
        assert!(!eu.overlaps(&apac));
    }
}
