use std::collections::{BTreeMap, BTreeSet, VecDeque};
use derive_more::Deref;
use log::trace;
use crate::error::{RenderGraphError, Result};
use crate::graph::RenderGraph;
use crate::interface::{EntryKind, OperationEntryTypes};
use crate::node::{OperationId, RenderOperation};

/// Name-ordered set of operations returned by the traversal queries.
#[derive(Debug, Clone, Default, Deref)]
pub struct RenderOperationSet<'g>(BTreeMap<&'g str, &'g RenderOperation>);

impl<'g> RenderOperationSet<'g> {
    pub fn contains(&self, op_name: &str) -> bool {
        self.0.contains_key(op_name)
    }

    pub fn names(&self) -> Vec<&'g str> {
        self.0.keys().copied().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &'g RenderOperation> + '_ {
        self.0.values().copied()
    }
}

impl<'g> FromIterator<&'g RenderOperation> for RenderOperationSet<'g> {
    fn from_iter<T: IntoIterator<Item = &'g RenderOperation>>(iter: T) -> Self {
        Self(iter.into_iter().map(|operation| (operation.name(), operation)).collect())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Direction {
    Previous,
    Next,
}

impl RenderGraph {
    /// Operations without a real predecessor, the candidates to execute first.
    pub fn initial_operations(&self) -> Result<RenderOperationSet<'_>> {
        self.ensure_complete()?;
        Ok(self.operations_without(Direction::Previous))
    }

    /// Operations whose outputs feed no other operation, the candidates to execute last.
    pub fn final_operations(&self) -> Result<RenderOperationSet<'_>> {
        self.ensure_complete()?;
        Ok(self.operations_without(Direction::Next))
    }

    pub fn previous_operations(&self, op_name: &str) -> Result<RenderOperationSet<'_>> {
        self.ensure_complete()?;
        let id = self.lookup_operation(op_name)?;
        Ok(self.collect_set(self.neighbours(id, Direction::Previous)))
    }

    pub fn next_operations(&self, op_name: &str) -> Result<RenderOperationSet<'_>> {
        self.ensure_complete()?;
        let id = self.lookup_operation(op_name)?;
        Ok(self.collect_set(self.neighbours(id, Direction::Next)))
    }

    /// Every operation `op_name` transitively depends on.
    pub fn all_previous_operations(&self, op_name: &str) -> Result<RenderOperationSet<'_>> {
        self.ensure_complete()?;
        let id = self.lookup_operation(op_name)?;
        let reached = self.closure(id, Direction::Previous)?;
        Ok(self.collect_set(reached))
    }

    /// Every operation transitively depending on `op_name`.
    pub fn all_next_operations(&self, op_name: &str) -> Result<RenderOperationSet<'_>> {
        self.ensure_complete()?;
        let id = self.lookup_operation(op_name)?;
        let reached = self.closure(id, Direction::Next)?;
        Ok(self.collect_set(reached))
    }

    /// Structural checks that do not depend on completion: resolve references, tid groups naming a
    /// single resource and the absence of dependency cycles.
    pub fn validate(&self) -> Result<()> {
        self.validate_resolve_sources()?;
        self.validate_tid_groups()?;
        self.validate_acyclic()
    }

    fn operation_ids(&self) -> impl Iterator<Item = OperationId> + '_ {
        self.operation_lookup.values().copied()
    }

    fn collect_set(&self, ids: impl IntoIterator<Item = OperationId>) -> RenderOperationSet<'_> {
        ids.into_iter().map(|id| self.operation_by_id(id)).collect()
    }

    fn operations_without(&self, direction: Direction) -> RenderOperationSet<'_> {
        self.collect_set(
            self.operation_ids()
                .filter(|id| self.neighbours(*id, direction).is_empty()),
        )
    }

    /// Direct neighbours found by matching tids of the operation's entries against entries of the
    /// opposite role in other operations.
    fn neighbours(&self, id: OperationId, direction: Direction) -> BTreeSet<OperationId> {
        let (own, other) = match direction {
            Direction::Previous => (OperationEntryTypes::ALL_INPUTS, OperationEntryTypes::ALL_OUTPUTS),
            Direction::Next => (OperationEntryTypes::ALL_OUTPUTS, OperationEntryTypes::ALL_INPUTS),
        };

        self.operation_io_by_id(id, own)
            .flat_map(|transition| self.transition_io_iter(transition.tid(), other))
            .map(|transition| transition.transition().operation_id())
            .filter(|neighbour| *neighbour != id)
            .collect()
    }

    /// Level by level expansion. An acyclic graph runs out of levels before the depth exceeds the
    /// number of operations, a cycle never does.
    fn closure(&self, seed: OperationId, direction: Direction) -> Result<BTreeSet<OperationId>> {
        let bound = self.operations.len();
        let mut reached = BTreeSet::new();
        let mut frontier = self.neighbours(seed, direction);
        let mut depth = 0;

        while !frontier.is_empty() {
            depth += 1;
            if depth > bound {
                return Err(RenderGraphError::CyclicGraph {
                    graph: self.name().to_owned(),
                    operations: self.names_of(frontier),
                });
            }

            reached.extend(frontier.iter().copied());
            frontier = frontier
                .iter()
                .flat_map(|id| self.neighbours(*id, direction))
                .collect();
        }

        trace!(
            "Render graph[{}] closure of {} ({direction:?}) reached {} operations in {depth} levels",
            self.name(),
            self.operation_by_id(seed).name(),
            reached.len()
        );
        Ok(reached)
    }

    fn names_of(&self, ids: impl IntoIterator<Item = OperationId>) -> Vec<String> {
        ids.into_iter()
            .map(|id| self.operation_by_id(id).name().to_owned())
            .collect()
    }

    fn validate_resolve_sources(&self) -> Result<()> {
        for operation in self.render_operations() {
            for (_, entry_name, entry) in operation.entries() {
                if entry.kind() != EntryKind::AttachmentResolveOutput {
                    continue;
                }
                let Some(source) = entry.resolve_source_entry_name() else {
                    continue;
                };
                if operation.entry(source).is_none() {
                    return Err(RenderGraphError::DanglingResolve {
                        operation: operation.name().to_owned(),
                        entry: entry_name.to_owned(),
                        source_entry: source.to_owned(),
                    });
                }
            }
        }
        Ok(())
    }

    fn validate_tid_groups(&self) -> Result<()> {
        let strict = self.config().strict_resource_shapes;
        let mut tids: Vec<_> = self.tid_members.keys().copied().collect();
        tids.sort_unstable();

        for tid in tids {
            let mut members = self.transition_io_iter(tid, OperationEntryTypes::ALL_INPUTS_OUTPUTS);
            let Some(first) = members.next() else {
                continue;
            };
            for other in members {
                if !first
                    .entry()
                    .resource_definition()
                    .same_resource(other.entry().resource_definition(), strict)
                {
                    return Err(RenderGraphError::ResourceConflict {
                        first_operation: first.operation_name().to_owned(),
                        first_entry: first.entry_name().to_owned(),
                        second_operation: other.operation_name().to_owned(),
                        second_entry: other.entry_name().to_owned(),
                    });
                }
            }
        }
        Ok(())
    }

    fn validate_acyclic(&self) -> Result<()> {
        let count = self.operations.len();
        let mut in_degree = vec![0usize; count];
        let mut successors = vec![BTreeSet::new(); count];

        for id in self.operation_ids() {
            let next = self.neighbours(id, Direction::Next);
            for successor in &next {
                in_degree[successor.index()] += 1;
            }
            successors[id.index()] = next;
        }

        let mut queue: VecDeque<OperationId> = self
            .operation_ids()
            .filter(|id| in_degree[id.index()] == 0)
            .collect();
        let mut visited = 0;

        while let Some(id) = queue.pop_front() {
            visited += 1;
            for successor in &successors[id.index()] {
                in_degree[successor.index()] -= 1;
                if in_degree[successor.index()] == 0 {
                    queue.push_back(*successor);
                }
            }
        }

        if visited == count {
            return Ok(());
        }

        Err(RenderGraphError::CyclicGraph {
            graph: self.name().to_owned(),
            operations: self.names_of(self.operation_ids().filter(|id| in_degree[id.index()] > 0)),
        })
    }
}
