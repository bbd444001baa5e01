use chime_domain::{Workflow, ID};
use chime_infra::ChimeContext;
use std::collections::HashSet;

fn remove_duplicate_workflows(workflows: Vec<Workflow>) -> Vec<Workflow> {
    let mut processed_ids: HashSet<ID> = HashSet::new();
    workflows
        .into_iter()
        .filter(|workflow| processed_ids.insert(workflow.id.clone()))
        .collect()
}

/// Collects the union of all workflows applicable to a booking: the
/// ones attached to its event type, the organization scope, the team
/// scope and, unless locked, the user's personal active-on-all
/// workflows. De-duplicated by workflow id, first seen wins.
///
/// Absent scope ids simply contribute nothing, there are no error
/// paths here.
pub async fn resolve_workflows(
    event_type_workflows: Vec<Workflow>,
    user_id: Option<&ID>,
    team_id: Option<&ID>,
    org_id: Option<&ID>,
    workflows_locked_for_user: bool,
    ctx: &ChimeContext,
) -> Vec<Workflow> {
    let mut combined_workflows = event_type_workflows;

    if let Some(org_id) = org_id {
        if let Some(team_id) = team_id {
            combined_workflows.extend(ctx.repos.workflows.find_by_team_links(team_id).await);
        } else if let Some(user_id) = user_id {
            combined_workflows
                .extend(ctx.repos.workflows.find_by_user_memberships(user_id).await);
        }

        combined_workflows.extend(ctx.repos.workflows.find_active_on_all_for_team(org_id).await);
    }

    if let Some(team_id) = team_id {
        combined_workflows
            .extend(ctx.repos.workflows.find_active_on_all_for_team(team_id).await);
    }

    let include_personal_workflows = team_id.is_none() || !workflows_locked_for_user;
    if include_personal_workflows {
        if let Some(user_id) = user_id {
            combined_workflows
                .extend(ctx.repos.workflows.find_active_on_all_personal(user_id).await);
        }
    }

    remove_duplicate_workflows(combined_workflows)
}
