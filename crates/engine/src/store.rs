// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-agent job storage.
//!
//! Holds at most one job per (agent, kind) and refuses any kind that
//! conflicts with one already active for the same agent.

use crate::jobs::{Job, JobError};
use std::collections::BTreeMap;
use tw_core::{AgentId, JobKind};

#[derive(Debug, Default)]
pub struct JobStore {
    agents: BTreeMap<AgentId, BTreeMap<JobKind, Job>>,
}

impl JobStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// First active kind that conflicts with `requested`, if any.
    pub fn conflict(&self, agent: &AgentId, requested: JobKind) -> Option<JobKind> {
        self.agents.get(agent)?.keys().copied().find(|active| requested.conflicts_with(*active))
    }

    /// Fail with `ConcurrentJob` if `requested` cannot start for `agent` now.
    pub fn check(&self, agent: &AgentId, requested: JobKind) -> Result<(), JobError> {
        match self.conflict(agent, requested) {
            Some(active) => Err(JobError::ConcurrentJob { agent: agent.clone(), requested, active }),
            None => Ok(()),
        }
    }

    /// Insert a job. The existing job, if any, is left untouched on error.
    pub fn insert(&mut self, job: Job) -> Result<(), JobError> {
        let meta = job.meta();
        self.check(&meta.agent_id, meta.kind)?;
        let agent = meta.agent_id.clone();
        let kind = meta.kind;
        self.agents.entry(agent).or_default().insert(kind, job);
        Ok(())
    }

    pub fn get(&self, agent: &AgentId, kind: JobKind) -> Option<&Job> {
        self.agents.get(agent)?.get(&kind)
    }

    pub fn get_mut(&mut self, agent: &AgentId, kind: JobKind) -> Option<&mut Job> {
        self.agents.get_mut(agent)?.get_mut(&kind)
    }

    pub fn remove(&mut self, agent: &AgentId, kind: JobKind) -> Option<Job> {
        let jobs = self.agents.get_mut(agent)?;
        let job = jobs.remove(&kind);
        if jobs.is_empty() {
            self.agents.remove(agent);
        }
        job
    }

    /// Every (agent, kind) with an active job, agents in order, kinds in
    /// declaration order.
    pub fn keys(&self) -> Vec<(AgentId, JobKind)> {
        self.agents
            .iter()
            .flat_map(|(agent, jobs)| jobs.keys().map(move |kind| (agent.clone(), *kind)))
            .collect()
    }

    pub fn active_kinds(&self, agent: &AgentId) -> Vec<JobKind> {
        self.agents.get(agent).map(|jobs| jobs.keys().copied().collect()).unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.agents.values().map(BTreeMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }
}

#[cfg(test)]
#[path = "store_tests.rs"]
mod tests;
