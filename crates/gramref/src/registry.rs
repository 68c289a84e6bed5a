//! Documentation domain registry.
//!
//! Binds merged grammars to named documentation domains for the host. The
//! registry is pure data: the application handle is generic and passed
//! through uninterpreted, and all environment-specific wiring (directive
//! registration, markup emission, link resolution) stays in the host
//! adapter.

use crate::merge::MergedGrammar;

/// Opaque handle returned by [`DomainRegistry::register`].
///
/// The host keeps it to find the registration again during its later
/// rendering and link-resolution passes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RegistrationHandle(usize);

/// One registered documentation domain.
#[derive(Debug)]
pub struct Registration<H> {
    app: H,
    domain: String,
    file_label: String,
    placeholder_node_type: String,
    grammar: MergedGrammar,
}

impl<H> Registration<H> {
    /// The host application handle, exactly as registered.
    pub fn app(&self) -> &H {
        &self.app
    }

    /// The documentation domain name.
    pub fn domain(&self) -> &str {
        &self.domain
    }

    /// The source file label the domain documents.
    pub fn file_label(&self) -> &str {
        &self.file_label
    }

    /// The host-side node type used for placeholders in this domain.
    pub fn placeholder_node_type(&self) -> &str {
        &self.placeholder_node_type
    }

    /// The merged grammar bound to this domain.
    pub fn grammar(&self) -> &MergedGrammar {
        &self.grammar
    }
}

/// Registry of documentation domains for one build.
///
/// Constructed fresh per build invocation; never a process-wide singleton.
#[derive(Debug, Default)]
pub struct DomainRegistry<H> {
    registrations: Vec<Registration<H>>,
}

impl<H> DomainRegistry<H> {
    pub fn new() -> Self {
        Self {
            registrations: Vec::new(),
        }
    }

    /// Bind a merged grammar to a named documentation domain.
    ///
    /// `app` is not interpreted by this core; it is stored and handed back
    /// with the registration.
    pub fn register(
        &mut self,
        app: H,
        domain: impl Into<String>,
        file_label: impl Into<String>,
        placeholder_node_type: impl Into<String>,
        grammar: MergedGrammar,
    ) -> RegistrationHandle {
        let handle = RegistrationHandle(self.registrations.len());
        self.registrations.push(Registration {
            app,
            domain: domain.into(),
            file_label: file_label.into(),
            placeholder_node_type: placeholder_node_type.into(),
            grammar,
        });
        handle
    }

    /// Look up a registration by handle.
    pub fn get(&self, handle: RegistrationHandle) -> Option<&Registration<H>> {
        self.registrations.get(handle.0)
    }

    /// Iterate registrations in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &Registration<H>> {
        self.registrations.iter()
    }

    /// Number of registered domains.
    pub fn len(&self) -> usize {
        self.registrations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.registrations.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::merge::combine_fragments;

    fn empty_grammar() -> MergedGrammar {
        combine_fragments(Vec::new()).unwrap()
    }

    #[test]
    fn register_and_look_up() {
        let mut registry = DomainRegistry::new();

        let handle = registry.register(
            "app-token",
            "namedconf",
            "named.conf",
            "grammar-placeholder",
            empty_grammar(),
        );

        let registration = registry.get(handle).expect("registration");
        assert_eq!(*registration.app(), "app-token");
        assert_eq!(registration.domain(), "namedconf");
        assert_eq!(registration.file_label(), "named.conf");
        assert_eq!(registration.placeholder_node_type(), "grammar-placeholder");
        assert!(registration.grammar().is_empty());
    }

    #[test]
    fn handles_are_distinct_per_registration() {
        let mut registry = DomainRegistry::new();

        let first = registry.register((), "main", "named.conf", "node", empty_grammar());
        let second = registry.register((), "control", "rndc.conf", "node", empty_grammar());

        assert_ne!(first, second);
        assert_eq!(registry.len(), 2);
        assert_eq!(registry.get(second).unwrap().domain(), "control");
    }
}
