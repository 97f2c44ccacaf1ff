// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! In-process coordination store
//!
//! A shared hierarchical namespace with per-session ephemeral ownership and
//! one-shot watches. Every [`MemoryStore`] handle is bound to one session;
//! [`MemoryStore::connect`] opens another session on the same namespace, which
//! is how independent members are modelled inside one process.
//!
//! Watches are collected while the namespace lock is held and delivered after
//! it is released, so a watcher may call back into the store.

use super::{
    CoordinationStore, CreateMode, CreateOutcome, DeleteOutcome, NodePath, StoreError,
    WatchEvent, WatchEventKind, WatchHandle,
};
use async_trait::async_trait;
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet, VecDeque};
use std::fmt;
use std::sync::{Arc, Mutex};

/// Identifier of a client session
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SessionId(pub u64);

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "session-{}", self.0)
    }
}

/// Recorded store call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreCall {
    Create { path: NodePath, mode: CreateMode },
    DeleteIfEmpty { path: NodePath },
    GetChildren { path: NodePath, watch: bool },
    Exists { path: NodePath, watch: bool },
}

impl StoreCall {
    pub fn path(&self) -> &NodePath {
        match self {
            StoreCall::Create { path, .. }
            | StoreCall::DeleteIfEmpty { path }
            | StoreCall::GetChildren { path, .. }
            | StoreCall::Exists { path, .. } => path,
        }
    }
}

#[derive(Debug)]
struct Node {
    mode: CreateMode,
    owner: SessionId,
    children: BTreeSet<String>,
}

type Notification = (WatchHandle, WatchEvent);

struct Namespace {
    nodes: BTreeMap<NodePath, Node>,
    child_watches: HashMap<NodePath, Vec<WatchHandle>>,
    exist_watches: HashMap<NodePath, Vec<WatchHandle>>,
    next_session: u64,
    closed: HashSet<SessionId>,
    faults: HashMap<SessionId, VecDeque<StoreError>>,
    calls: Vec<(SessionId, StoreCall)>,
    record_calls: bool,
    suppress_watches: bool,
}

impl Namespace {
    fn new() -> Self {
        let mut nodes = BTreeMap::new();
        nodes.insert(
            NodePath::root(),
            Node {
                mode: CreateMode::Persistent,
                owner: SessionId(0),
                children: BTreeSet::new(),
            },
        );
        Self {
            nodes,
            child_watches: HashMap::new(),
            exist_watches: HashMap::new(),
            next_session: 1,
            closed: HashSet::new(),
            faults: HashMap::new(),
            calls: Vec::new(),
            record_calls: true,
            suppress_watches: false,
        }
    }

    fn open_session(&mut self) -> SessionId {
        let id = SessionId(self.next_session);
        self.next_session += 1;
        id
    }

    /// Record the call and apply session checks and injected faults
    fn begin(&mut self, session: SessionId, call: StoreCall) -> Result<(), StoreError> {
        if self.record_calls {
            self.calls.push((session, call));
        }
        if self.closed.contains(&session) {
            return Err(StoreError::SessionExpired);
        }
        if let Some(err) = self.faults.get_mut(&session).and_then(|q| q.pop_front()) {
            return Err(err);
        }
        Ok(())
    }

    fn register(
        watches: &mut HashMap<NodePath, Vec<WatchHandle>>,
        path: &NodePath,
        watch: WatchHandle,
    ) {
        let registered = watches.entry(path.clone()).or_default();
        // The same watcher object is only notified once per registration
        let already = registered
            .iter()
            .any(|w| Arc::as_ptr(w) as *const () == Arc::as_ptr(&watch) as *const ());
        if !already {
            registered.push(watch);
        }
    }

    fn fire(
        &mut self,
        watches: WatchKind,
        path: &NodePath,
        kind: WatchEventKind,
        out: &mut Vec<Notification>,
    ) {
        let table = match watches {
            WatchKind::Children => &mut self.child_watches,
            WatchKind::Exists => &mut self.exist_watches,
        };
        let Some(fired) = table.remove(path) else {
            return;
        };
        if self.suppress_watches {
            return;
        }
        out.extend(fired.into_iter().map(|w| {
            (
                w,
                WatchEvent {
                    kind,
                    path: path.clone(),
                },
            )
        }));
    }

    fn create(
        &mut self,
        session: SessionId,
        path: &NodePath,
        mode: CreateMode,
        out: &mut Vec<Notification>,
    ) -> Result<CreateOutcome, StoreError> {
        if self.nodes.contains_key(path) {
            return Ok(CreateOutcome::AlreadyExists);
        }
        let Some(parent) = path.parent() else {
            return Ok(CreateOutcome::AlreadyExists);
        };
        match self.nodes.get_mut(&parent) {
            Some(node) => {
                node.children.insert(path.name().to_string());
            }
            None => return Err(StoreError::NoNode(parent)),
        }
        self.nodes.insert(
            path.clone(),
            Node {
                mode,
                owner: session,
                children: BTreeSet::new(),
            },
        );
        self.fire(WatchKind::Exists, path, WatchEventKind::NodeCreated, out);
        self.fire(
            WatchKind::Children,
            &parent,
            WatchEventKind::ChildrenChanged,
            out,
        );
        Ok(CreateOutcome::Created(path.clone()))
    }

    fn delete_if_empty(
        &mut self,
        path: &NodePath,
        out: &mut Vec<Notification>,
    ) -> Result<DeleteOutcome, StoreError> {
        if path.is_root() {
            return Err(StoreError::InvalidPath("the root node cannot be deleted".into()));
        }
        match self.nodes.get(path) {
            None => return Ok(DeleteOutcome::NotFound),
            Some(node) if !node.children.is_empty() => return Ok(DeleteOutcome::NotEmpty),
            Some(_) => {}
        }
        self.remove(path, out);
        Ok(DeleteOutcome::Deleted)
    }

    /// Remove `path` and everything beneath it, firing watches bottom-up
    fn remove(&mut self, path: &NodePath, out: &mut Vec<Notification>) {
        let mut doomed: Vec<NodePath> = self
            .nodes
            .keys()
            .filter(|p| *p == path || p.is_descendant_of(path))
            .cloned()
            .collect();
        doomed.sort_by_key(|p| std::cmp::Reverse(p.as_str().matches('/').count()));

        for victim in &doomed {
            self.nodes.remove(victim);
            self.fire(WatchKind::Exists, victim, WatchEventKind::NodeDeleted, out);
            self.fire(WatchKind::Children, victim, WatchEventKind::NodeDeleted, out);
            if let Some(parent) = victim.parent() {
                if let Some(node) = self.nodes.get_mut(&parent) {
                    node.children.remove(victim.name());
                }
                self.fire(
                    WatchKind::Children,
                    &parent,
                    WatchEventKind::ChildrenChanged,
                    out,
                );
            }
        }
    }

    fn close(&mut self, session: SessionId, out: &mut Vec<Notification>) {
        if !self.closed.insert(session) {
            return;
        }
        let owned: Vec<NodePath> = self
            .nodes
            .iter()
            .filter(|(_, n)| n.owner == session && n.mode == CreateMode::Ephemeral)
            .map(|(p, _)| p.clone())
            .collect();
        for path in owned {
            // May already be gone if an ancestor was removed first
            if self.nodes.contains_key(&path) {
                self.remove(&path, out);
            }
        }
        self.faults.remove(&session);
    }
}

#[derive(Clone, Copy)]
enum WatchKind {
    Children,
    Exists,
}

/// In-memory [`CoordinationStore`] bound to a single session
#[derive(Clone)]
pub struct MemoryStore {
    namespace: Arc<Mutex<Namespace>>,
    session: SessionId,
}

impl MemoryStore {
    /// Create a fresh namespace and open its first session
    pub fn new() -> Self {
        let mut namespace = Namespace::new();
        let session = namespace.open_session();
        Self {
            namespace: Arc::new(Mutex::new(namespace)),
            session,
        }
    }

    /// Open a new session on the same namespace
    pub fn connect(&self) -> Self {
        let session = self.lock().open_session();
        Self {
            namespace: Arc::clone(&self.namespace),
            session,
        }
    }

    pub fn session_id(&self) -> SessionId {
        self.session
    }

    /// End this session, removing its ephemeral nodes.
    ///
    /// Later calls through any handle of this session fail with
    /// [`StoreError::SessionExpired`].
    pub fn close(&self) {
        let mut out = Vec::new();
        self.lock().close(self.session, &mut out);
        deliver(out);
    }

    pub fn is_closed(&self) -> bool {
        self.lock().closed.contains(&self.session)
    }

    /// Make the next call on this session fail with `err`
    pub fn fail_next(&self, err: StoreError) {
        self.lock()
            .faults
            .entry(self.session)
            .or_default()
            .push_back(err);
    }

    /// Consume fired watches without delivering them (simulates lost notifications)
    pub fn suppress_watches(&self, suppress: bool) {
        self.lock().suppress_watches = suppress;
    }

    /// Turn the shared call log on or off; turning it off also clears it.
    ///
    /// Long-running harnesses disable it so re-polling waiters do not grow it
    /// without bound.
    pub fn record_calls(&self, record: bool) {
        let mut ns = self.lock();
        ns.record_calls = record;
        if !record {
            ns.calls = Vec::new();
        }
    }

    /// Calls made through this session
    pub fn calls(&self) -> Vec<StoreCall> {
        self.lock()
            .calls
            .iter()
            .filter(|(s, _)| *s == self.session)
            .map(|(_, c)| c.clone())
            .collect()
    }

    /// Calls made through every session on the namespace
    pub fn all_calls(&self) -> Vec<(SessionId, StoreCall)> {
        self.lock().calls.clone()
    }

    /// All node paths currently in the namespace, excluding the root
    pub fn snapshot(&self) -> Vec<NodePath> {
        self.lock()
            .nodes
            .keys()
            .filter(|p| !p.is_root())
            .cloned()
            .collect()
    }

    /// Mode and owner of a node, if present
    pub fn node_info(&self, path: &NodePath) -> Option<(CreateMode, SessionId)> {
        self.lock().nodes.get(path).map(|n| (n.mode, n.owner))
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Namespace> {
        self.namespace.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn with_namespace<T>(
        &self,
        call: StoreCall,
        op: impl FnOnce(&mut Namespace, &mut Vec<Notification>) -> Result<T, StoreError>,
    ) -> Result<T, StoreError> {
        let mut out = Vec::new();
        let result = {
            let mut ns = self.lock();
            match ns.begin(self.session, call) {
                Ok(()) => op(&mut *ns, &mut out),
                Err(err) => Err(err),
            }
        };
        deliver(out);
        result
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for MemoryStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoryStore")
            .field("session", &self.session)
            .finish_non_exhaustive()
    }
}

fn deliver(notifications: Vec<Notification>) {
    for (watcher, event) in notifications {
        watcher.process(event);
    }
}

#[async_trait]
impl CoordinationStore for MemoryStore {
    async fn create(
        &self,
        path: &NodePath,
        mode: CreateMode,
    ) -> Result<CreateOutcome, StoreError> {
        let session = self.session;
        self.with_namespace(
            StoreCall::Create {
                path: path.clone(),
                mode,
            },
            |ns, out| ns.create(session, path, mode, out),
        )
    }

    async fn delete_if_empty(&self, path: &NodePath) -> Result<DeleteOutcome, StoreError> {
        self.with_namespace(
            StoreCall::DeleteIfEmpty { path: path.clone() },
            |ns, out| ns.delete_if_empty(path, out),
        )
    }

    async fn get_children(
        &self,
        path: &NodePath,
        watch: Option<WatchHandle>,
    ) -> Result<Vec<String>, StoreError> {
        self.with_namespace(
            StoreCall::GetChildren {
                path: path.clone(),
                watch: watch.is_some(),
            },
            |ns, _| {
                let children = match ns.nodes.get(path) {
                    Some(node) => node.children.iter().cloned().collect(),
                    None => return Err(StoreError::NoNode(path.clone())),
                };
                if let Some(watch) = watch {
                    Namespace::register(&mut ns.child_watches, path, watch);
                }
                Ok(children)
            },
        )
    }

    async fn exists(
        &self,
        path: &NodePath,
        watch: Option<WatchHandle>,
    ) -> Result<bool, StoreError> {
        self.with_namespace(
            StoreCall::Exists {
                path: path.clone(),
                watch: watch.is_some(),
            },
            |ns, _| {
                if let Some(watch) = watch {
                    Namespace::register(&mut ns.exist_watches, path, watch);
                }
                Ok(ns.nodes.contains_key(path))
            },
        )
    }
}

#[cfg(test)]
#[path = "memory_tests.rs"]
mod tests;
