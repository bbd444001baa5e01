use super::IWorkflowRepo;
use crate::repos::shared::inmemory_repo::*;
use chime_domain::{Workflow, ID};
use std::sync::Mutex;

#[derive(Debug, Clone, PartialEq)]
struct EventTypeLink {
    workflow_id: ID,
    event_type_id: i64,
}

#[derive(Debug, Clone, PartialEq)]
struct TeamLink {
    workflow_id: ID,
    team_id: ID,
}

#[derive(Debug, Clone, PartialEq)]
struct TeamMember {
    team_id: ID,
    user_id: ID,
    accepted: bool,
}

pub struct InMemoryWorkflowRepo {
    workflows: Mutex<Vec<Workflow>>,
    event_type_links: Mutex<Vec<EventTypeLink>>,
    team_links: Mutex<Vec<TeamLink>>,
    team_members: Mutex<Vec<TeamMember>>,
}

impl InMemoryWorkflowRepo {
    pub fn new() -> Self {
        Self {
            workflows: Mutex::new(Vec::new()),
            event_type_links: Mutex::new(Vec::new()),
            team_links: Mutex::new(Vec::new()),
            team_members: Mutex::new(Vec::new()),
        }
    }

    fn workflows_by_ids(&self, workflow_ids: &[ID]) -> Vec<Workflow> {
        find_by(&self.workflows, |w: &Workflow| {
            workflow_ids.contains(&w.id)
        })
    }
}

#[async_trait::async_trait]
impl IWorkflowRepo for InMemoryWorkflowRepo {
    async fn insert(&self, workflow: &Workflow) -> anyhow::Result<()> {
        insert(workflow, &self.workflows);
        Ok(())
    }

    async fn find(&self, workflow_id: &ID) -> Option<Workflow> {
        find(workflow_id, &self.workflows)
    }

    async fn delete(&self, workflow_id: &ID) -> Option<Workflow> {
        delete_by(&self.event_type_links, |l: &EventTypeLink| {
            l.workflow_id == *workflow_id
        });
        delete_by(&self.team_links, |l: &TeamLink| {
            l.workflow_id == *workflow_id
        });
        delete(workflow_id, &self.workflows)
    }

    async fn link_to_event_type(
        &self,
        workflow_id: &ID,
        event_type_id: i64,
    ) -> anyhow::Result<()> {
        let link = EventTypeLink {
            workflow_id: workflow_id.clone(),
            event_type_id,
        };
        if find_by(&self.event_type_links, |l: &EventTypeLink| *l == link).is_empty() {
            insert(&link, &self.event_type_links);
        }
        Ok(())
    }

    async fn link_to_team(&self, workflow_id: &ID, team_id: &ID) -> anyhow::Result<()> {
        let link = TeamLink {
            workflow_id: workflow_id.clone(),
            team_id: team_id.clone(),
        };
        if find_by(&self.team_links, |l: &TeamLink| *l == link).is_empty() {
            insert(&link, &self.team_links);
        }
        Ok(())
    }

    async fn add_team_member(
        &self,
        team_id: &ID,
        user_id: &ID,
        accepted: bool,
    ) -> anyhow::Result<()> {
        let mut members = self.team_members.lock().unwrap();
        for member in members.iter_mut() {
            if member.team_id == *team_id && member.user_id == *user_id {
                member.accepted = accepted;
                return Ok(());
            }
        }
        members.push(TeamMember {
            team_id: team_id.clone(),
            user_id: user_id.clone(),
            accepted,
        });
        Ok(())
    }

    async fn find_by_event_type(&self, event_type_id: i64) -> Vec<Workflow> {
        let workflow_ids = find_by(&self.event_type_links, |l: &EventTypeLink| {
            l.event_type_id == event_type_id
        })
        .into_iter()
        .map(|l| l.workflow_id)
        .collect::<Vec<_>>();
        self.workflows_by_ids(&workflow_ids)
    }

    async fn find_by_team_links(&self, team_id: &ID) -> Vec<Workflow> {
        let workflow_ids = find_by(&self.team_links, |l: &TeamLink| l.team_id == *team_id)
            .into_iter()
            .map(|l| l.workflow_id)
            .collect::<Vec<_>>();
        self.workflows_by_ids(&workflow_ids)
    }

    async fn find_by_user_memberships(&self, user_id: &ID) -> Vec<Workflow> {
        let team_ids = find_by(&self.team_members, |m: &TeamMember| {
            m.user_id == *user_id && m.accepted
        })
        .into_iter()
        .map(|m| m.team_id)
        .collect::<Vec<_>>();

        let workflow_ids = find_by(&self.team_links, |l: &TeamLink| {
            team_ids.contains(&l.team_id)
        })
        .into_iter()
        .map(|l| l.workflow_id)
        .collect::<Vec<_>>();
        self.workflows_by_ids(&workflow_ids)
    }

    async fn find_active_on_all_for_team(&self, team_id: &ID) -> Vec<Workflow> {
        find_by(&self.workflows, |w: &Workflow| {
            w.team_id.as_ref() == Some(team_id) && w.is_active_on_all
        })
    }

    async fn find_active_on_all_personal(&self, user_id: &ID) -> Vec<Workflow> {
        find_by(&self.workflows, |w: &Workflow| {
            w.user_id.as_ref() == Some(user_id) && w.team_id.is_none() && w.is_active_on_all
        })
    }
}
