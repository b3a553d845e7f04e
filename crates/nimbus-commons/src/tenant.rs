//! Tenant identity and namespace derivation.
//!
//! Datastore isolates tenants through namespaces. The mapping from a tenant
//! identifier to a namespace is a pure function of the multitenancy flag, an
//! optional explicit single-tenant override, and the tenant identifier
//! itself. The same tenant always yields the same namespace within one
//! configuration.
//!
//! Tenant context is always an explicit parameter here. There is no ambient
//! "current tenant" global; the caller that owns the request context passes
//! the tenant into every namespace-resolving call.

use crate::errors::{NimbusError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A tenant identifier.
///
/// The variant records which representation the hosting application uses for
/// the tenant: a plain opaque value, an email address, or an internet domain.
/// The variant participates in namespace derivation so that a `Value` tenant
/// named `acme` and a `Domain` tenant named `acme` never share a namespace.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TenantId {
    Value(String),
    Email(String),
    Domain(String),
}

impl TenantId {
    /// Returns the raw identifier string.
    pub fn as_str(&self) -> &str {
        match self {
            TenantId::Value(s) | TenantId::Email(s) | TenantId::Domain(s) => s,
        }
    }

    /// One-character discriminator tied to the identifier variant, prefixed
    /// onto multitenant namespaces to keep them collision-free across
    /// variants.
    fn discriminator(&self) -> char {
        match self {
            TenantId::Value(_) => 'V',
            TenantId::Email(_) => 'E',
            TenantId::Domain(_) => 'D',
        }
    }
}

impl fmt::Display for TenantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A Datastore namespace scoping all keys of one tenant.
///
/// The empty namespace is the Datastore default and is what single-tenant
/// deployments use unless they configure an explicit override.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Namespace(String);

impl Namespace {
    /// Creates a validated namespace. Like kinds, namespaces must not use
    /// the reserved `__` prefix.
    pub fn new(value: impl Into<String>) -> Result<Self> {
        let value = value.into();
        if value.starts_with(crate::kind::RESERVED_KIND_PREFIX) {
            return Err(NimbusError::invalid_argument(format!(
                "namespace '{}' starts with the reserved prefix '{}'",
                value,
                crate::kind::RESERVED_KIND_PREFIX
            )));
        }
        Ok(Self(value))
    }

    /// The default (empty) namespace.
    pub fn default_namespace() -> Self {
        Self(String::new())
    }

    /// Returns the namespace as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True for the Datastore default namespace.
    pub fn is_default(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Derives the namespace for a tenant.
///
/// Stateless and safe to share across threads. Two modes:
///
/// - **single-tenant**: every tenant maps to the same namespace — the
///   configured override, or the empty default;
/// - **multitenant**: each tenant maps to `{discriminator}{tenant-id}`,
///   where the discriminator is one character per identifier variant.
///
/// ## Example
///
/// ```
/// use nimbus_commons::{NamespaceSupplier, TenantId};
///
/// let supplier = NamespaceSupplier::multitenant();
/// let ns = supplier.namespace_for(&TenantId::Domain("acme.io".into()));
/// assert_eq!(ns.as_str(), "Dacme.io");
///
/// let single = NamespaceSupplier::single_tenant();
/// assert!(single.namespace_for(&TenantId::Value("anything".into())).is_default());
/// ```
#[derive(Debug, Clone)]
pub struct NamespaceSupplier {
    multitenant: bool,
    default_namespace: Namespace,
}

impl NamespaceSupplier {
    /// Single-tenant mode with the empty default namespace.
    pub fn single_tenant() -> Self {
        Self {
            multitenant: false,
            default_namespace: Namespace::default_namespace(),
        }
    }

    /// Single-tenant mode with an explicit namespace override.
    pub fn single_tenant_with_namespace(namespace: Namespace) -> Self {
        Self {
            multitenant: false,
            default_namespace: namespace,
        }
    }

    /// Multitenant mode; namespaces are derived per tenant.
    pub fn multitenant() -> Self {
        Self {
            multitenant: true,
            default_namespace: Namespace::default_namespace(),
        }
    }

    /// True when operating in multitenant mode.
    pub fn is_multitenant(&self) -> bool {
        self.multitenant
    }

    /// Derives the namespace for the given tenant.
    pub fn namespace_for(&self, tenant: &TenantId) -> Namespace {
        if !self.multitenant {
            return self.default_namespace.clone();
        }
        let mut value = String::with_capacity(1 + tenant.as_str().len());
        value.push(tenant.discriminator());
        value.push_str(tenant.as_str());
        Namespace(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_tenant_always_yields_default() {
        let supplier = NamespaceSupplier::single_tenant();
        for tenant in [
            TenantId::Value("a".into()),
            TenantId::Email("a@b.c".into()),
            TenantId::Domain("b.c".into()),
        ] {
            assert!(supplier.namespace_for(&tenant).is_default());
        }
    }

    #[test]
    fn test_single_tenant_override() {
        let ns = Namespace::new("staging").unwrap();
        let supplier = NamespaceSupplier::single_tenant_with_namespace(ns.clone());
        assert_eq!(
            supplier.namespace_for(&TenantId::Value("ignored".into())),
            ns
        );
    }

    #[test]
    fn test_multitenant_is_deterministic() {
        let supplier = NamespaceSupplier::multitenant();
        let tenant = TenantId::Email("ops@acme.io".into());
        assert_eq!(
            supplier.namespace_for(&tenant),
            supplier.namespace_for(&tenant)
        );
    }

    #[test]
    fn test_variants_with_equal_values_do_not_collide() {
        let supplier = NamespaceSupplier::multitenant();
        let value = supplier.namespace_for(&TenantId::Value("acme".into()));
        let email = supplier.namespace_for(&TenantId::Email("acme".into()));
        let domain = supplier.namespace_for(&TenantId::Domain("acme".into()));
        assert_ne!(value, email);
        assert_ne!(value, domain);
        assert_ne!(email, domain);
    }

    #[test]
    fn test_namespace_rejects_reserved_prefix() {
        assert!(Namespace::new("__meta").is_err());
        assert!(Namespace::new("meta").is_ok());
        assert!(Namespace::new("").is_ok());
    }
}
