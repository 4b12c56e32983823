//! Dependency graph and boot ordering for service extensions.
//!
//! An extension depends on every extension providing a service type it
//! requires. The graph is checked for unsatisfiable requirements and cycles
//! when it is built and sorted, before any extension code runs, and yields
//! the containers in boot order: providers before the extensions that
//! require them.
//!
//! Default providers do not create edges. They are attached to the
//! injection points whose type no extension provides and only run if the
//! context still lacks the service at injection time.
//!
//! # Example
//!
//! ```
//! use boot_spi::{Config, ErrorCause, Inject, InjectionPoint, Monitor, ProviderMethod};
//! use boot_spi::{ServiceExtension, ServiceExtensionContext};
//! use boot_system::dependency::DependencyGraph;
//! use std::sync::Arc;
//!
//! struct Catalog;
//!
//! struct CatalogExtension;
//!
//! impl ServiceExtension for CatalogExtension {
//!     fn name(&self) -> &str { "catalog" }
//!     fn provider_methods(&self) -> Vec<ProviderMethod> {
//!         vec![ProviderMethod::new(|_| Ok(Arc::new(Catalog)))]
//!     }
//! }
//!
//! struct ApiExtension { catalog: Inject<Catalog> }
//!
//! impl ServiceExtension for ApiExtension {
//!     fn name(&self) -> &str { "api" }
//!     fn injection_points(&self) -> Vec<InjectionPoint> { vec![self.catalog.point()] }
//! }
//!
//! struct Quiet;
//!
//! impl Monitor for Quiet {
//!     fn severe(&self, _: &str, _: &[ErrorCause<'_>]) {}
//!     fn warning(&self, _: &str, _: &[ErrorCause<'_>]) {}
//!     fn info(&self, _: &str, _: &[ErrorCause<'_>]) {}
//!     fn debug(&self, _: &str, _: &[ErrorCause<'_>]) {}
//! }
//!
//! let context = ServiceExtensionContext::new(Arc::new(Quiet), Config::default());
//! let extensions: Vec<Box<dyn ServiceExtension>> = vec![
//!     Box::new(ApiExtension { catalog: Inject::required() }),
//!     Box::new(CatalogExtension),
//! ];
//!
//! let order = DependencyGraph::of(extensions, &context).unwrap();
//! assert_eq!(order[0].name(), "catalog");
//! assert_eq!(order[1].name(), "api");
//! ```

use std::collections::{BTreeSet, HashMap, HashSet};

use boot_spi::{ServiceExtension, ServiceExtensionContext, ServiceProvider, ServiceType};

use crate::error::{Error, Result};
use crate::injection::InjectionContainer;

/// Requires/provides graph over one boot's containers.
///
/// Nodes are indexed in discovery order. `edges[a]` holds every node `a`
/// depends on.
#[derive(Debug)]
pub struct DependencyGraph {
    containers: Vec<InjectionContainer>,
    edges: Vec<BTreeSet<usize>>,
}

impl DependencyGraph {
    /// Build the graph for `extensions` and return them in boot order.
    ///
    /// # Errors
    ///
    /// See [`DependencyGraph::build`] and [`DependencyGraph::topological_sort`].
    pub fn of(
        extensions: Vec<Box<dyn ServiceExtension>>,
        context: &ServiceExtensionContext,
    ) -> Result<Vec<InjectionContainer>> {
        Self::build(extensions, context)?.topological_sort()
    }

    /// Build the graph, attaching default providers to injection points
    /// nobody else satisfies.
    ///
    /// Services already registered in `context` satisfy requirements
    /// without creating edges.
    ///
    /// # Errors
    ///
    /// - `Error::DuplicateExtension` if two extensions share a name
    /// - `Error::UnsatisfiableDependency` listing every required injection
    ///   point without a provider, default provider or context service
    pub fn build(
        extensions: Vec<Box<dyn ServiceExtension>>,
        context: &ServiceExtensionContext,
    ) -> Result<Self> {
        let mut seen: HashSet<String> = HashSet::new();
        for extension in &extensions {
            if !seen.insert(extension.name().to_string()) {
                return Err(Error::DuplicateExtension {
                    name: extension.name().to_string(),
                });
            }
        }

        let mut containers: Vec<InjectionContainer> =
            extensions.into_iter().map(InjectionContainer::new).collect();

        // Service type -> indices of the extensions providing it
        let mut providers: HashMap<ServiceType, Vec<usize>> = HashMap::new();
        for (index, container) in containers.iter().enumerate() {
            for service_type in container.provided_types() {
                providers.entry(*service_type).or_default().push(index);
            }
        }

        // First default provider per type wins, in discovery order
        let mut defaults: HashMap<ServiceType, ServiceProvider> = HashMap::new();
        for container in &containers {
            for provider in container.default_providers() {
                defaults
                    .entry(provider.produced_type())
                    .or_insert_with(|| provider.clone());
            }
        }

        let mut edges = vec![BTreeSet::new(); containers.len()];
        let mut unsatisfied: Vec<String> = Vec::new();

        for (index, container) in containers.iter_mut().enumerate() {
            for point in container.injection_points_mut() {
                let service_type = point.service_type();
                if let Some(dependencies) = providers.get(&service_type) {
                    if dependencies.len() > 1 {
                        tracing::debug!(
                            service = service_type.name(),
                            count = dependencies.len(),
                            "Service type has several providers"
                        );
                    }
                    edges[index].extend(dependencies.iter().copied());
                } else if let Some(default) = defaults.get(&service_type) {
                    point.set_default_provider(default.clone());
                } else if point.is_required() && !context.has_service(service_type) {
                    unsatisfied.push(point.to_string());
                }
            }
        }

        if !unsatisfied.is_empty() {
            return Err(Error::UnsatisfiableDependency {
                points: unsatisfied,
            });
        }

        Ok(Self { containers, edges })
    }

    /// Return the number of nodes.
    pub fn node_count(&self) -> usize {
        self.containers.len()
    }

    /// Extension names in discovery order.
    pub fn node_names(&self) -> impl Iterator<Item = &str> {
        self.containers.iter().map(InjectionContainer::name)
    }

    /// Return the number of edges.
    pub fn edge_count(&self) -> usize {
        self.edges.iter().map(BTreeSet::len).sum()
    }

    /// Names of the extensions `name` directly depends on, in discovery
    /// order.
    pub fn dependencies_of(&self, name: &str) -> Vec<&str> {
        self.containers
            .iter()
            .position(|container| container.name() == name)
            .map(|index| {
                self.edges[index]
                    .iter()
                    .map(|&dep| self.containers[dep].name())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Perform a topological sort using Kahn's algorithm.
    ///
    /// Returns containers in dependency-first order. Among extensions that
    /// are ready at the same time, the one discovered first boots first, so
    /// identical discovery results always give identical boot orders.
    ///
    /// # Errors
    ///
    /// Returns `Error::CyclicDependency` naming the members of every cycle.
    /// An extension requiring a type only it provides is a cycle of one.
    pub fn topological_sort(self) -> Result<Vec<InjectionContainer>> {
        let count = self.containers.len();

        let mut pending: Vec<usize> = self.edges.iter().map(BTreeSet::len).collect();
        let mut dependents: Vec<Vec<usize>> = vec![Vec::new(); count];
        for (from, deps) in self.edges.iter().enumerate() {
            for &to in deps {
                dependents[to].push(from);
            }
        }

        let mut ready: BTreeSet<usize> = (0..count).filter(|&i| pending[i] == 0).collect();
        let mut order: Vec<usize> = Vec::with_capacity(count);

        while let Some(current) = ready.pop_first() {
            order.push(current);
            for &dependent in &dependents[current] {
                pending[dependent] -= 1;
                if pending[dependent] == 0 {
                    ready.insert(dependent);
                }
            }
        }

        if order.len() != count {
            let sorted: HashSet<usize> = order.iter().copied().collect();
            let participants: Vec<String> = cycle_members(&self.edges, &sorted)
                .into_iter()
                .map(|index| self.containers[index].name().to_string())
                .collect();
            return Err(Error::CyclicDependency { participants });
        }

        let mut slots: Vec<Option<InjectionContainer>> =
            self.containers.into_iter().map(Some).collect();
        Ok(order
            .into_iter()
            .filter_map(|index| slots[index].take())
            .collect())
    }
}

/// Nodes lying on a cycle, in discovery order.
///
/// Runs Tarjan's strongly connected components over the nodes Kahn's
/// algorithm could not place. Nodes that merely depend on a cycle are left
/// out.
fn cycle_members(edges: &[BTreeSet<usize>], sorted: &HashSet<usize>) -> Vec<usize> {
    struct Tarjan<'a> {
        edges: &'a [BTreeSet<usize>],
        sorted: &'a HashSet<usize>,
        next_index: usize,
        index: Vec<Option<usize>>,
        lowlink: Vec<usize>,
        stack: Vec<usize>,
        on_stack: Vec<bool>,
        members: Vec<usize>,
    }

    impl Tarjan<'_> {
        fn visit(&mut self, node: usize) {
            self.index[node] = Some(self.next_index);
            self.lowlink[node] = self.next_index;
            self.next_index += 1;
            self.stack.push(node);
            self.on_stack[node] = true;

            for &next in &self.edges[node] {
                if self.sorted.contains(&next) {
                    continue;
                }
                match self.index[next] {
                    None => {
                        self.visit(next);
                        self.lowlink[node] = self.lowlink[node].min(self.lowlink[next]);
                    }
                    Some(next_index) if self.on_stack[next] => {
                        self.lowlink[node] = self.lowlink[node].min(next_index);
                    }
                    Some(_) => {}
                }
            }

            if Some(self.lowlink[node]) == self.index[node] {
                let mut component = Vec::new();
                while let Some(member) = self.stack.pop() {
                    self.on_stack[member] = false;
                    component.push(member);
                    if member == node {
                        break;
                    }
                }
                let self_loop = self.edges[node].contains(&node);
                if component.len() > 1 || self_loop {
                    self.members.extend(component);
                }
            }
        }
    }

    let count = edges.len();
    let mut tarjan = Tarjan {
        edges,
        sorted,
        next_index: 0,
        index: vec![None; count],
        lowlink: vec![0; count],
        stack: Vec::new(),
        on_stack: vec![false; count],
        members: Vec::new(),
    };

    for node in 0..count {
        if !sorted.contains(&node) && tarjan.index[node].is_none() {
            tarjan.visit(node);
        }
    }

    let mut members = tarjan.members;
    members.sort_unstable();
    members
}

#[cfg(test)]
mod tests {
    use super::*;

    fn edges(list: &[&[usize]]) -> Vec<BTreeSet<usize>> {
        list.iter().map(|deps| deps.iter().copied().collect()).collect()
    }

    #[test]
    fn test_cycle_members_excludes_dependents_of_cycle() {
        // 0 <-> 1, 2 depends on 0
        let graph = edges(&[&[1], &[0], &[0]]);
        let members = cycle_members(&graph, &HashSet::new());
        assert_eq!(members, vec![0, 1]);
    }

    #[test]
    fn test_cycle_members_reports_self_loop() {
        let graph = edges(&[&[], &[1]]);
        let sorted: HashSet<usize> = [0].into_iter().collect();
        assert_eq!(cycle_members(&graph, &sorted), vec![1]);
    }

    #[test]
    fn test_cycle_members_finds_disjoint_cycles() {
        // 0 -> 1 -> 2 -> 0 and 3 <-> 4
        let graph = edges(&[&[1], &[2], &[0], &[4], &[3]]);
        let members = cycle_members(&graph, &HashSet::new());
        assert_eq!(members, vec![0, 1, 2, 3, 4]);
    }
}
