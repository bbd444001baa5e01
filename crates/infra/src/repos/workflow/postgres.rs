use super::IWorkflowRepo;

use chime_domain::{
    TimeUnit, TriggerOffset, Workflow, WorkflowAction, WorkflowStep, WorkflowTemplate,
    WorkflowTrigger, ID,
};
use sqlx::{types::Uuid, FromRow, PgPool};
use std::collections::HashMap;
use std::str::FromStr;
use tracing::error;

pub struct PostgresWorkflowRepo {
    pool: PgPool,
}

impl PostgresWorkflowRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Loads the steps for the given workflow rows and assembles the
    /// full domain entities, preserving step order.
    async fn with_steps(&self, workflows: Vec<WorkflowRaw>) -> Vec<Workflow> {
        if workflows.is_empty() {
            return Vec::new();
        }
        let workflow_uids = workflows
            .iter()
            .map(|w| w.workflow_uid)
            .collect::<Vec<_>>();

        let steps = sqlx::query_as::<_, WorkflowStepRaw>(
            r#"
            SELECT * FROM workflow_steps
            WHERE workflow_uid = ANY($1)
            ORDER BY step_order ASC
            "#,
        )
        .bind(&workflow_uids)
        .fetch_all(&self.pool)
        .await
        .unwrap_or_else(|e| {
            error!("Unable to fetch workflow steps. DB error: {:?}", e);
            Vec::new()
        });

        let mut steps_by_workflow: HashMap<Uuid, Vec<WorkflowStep>> = HashMap::new();
        for step in steps {
            steps_by_workflow
                .entry(step.workflow_uid)
                .or_insert_with(Vec::new)
                .push(step.into());
        }

        workflows
            .into_iter()
            .map(|raw| {
                let steps = steps_by_workflow
                    .remove(&raw.workflow_uid)
                    .unwrap_or_default();
                raw.into_workflow(steps)
            })
            .collect()
    }
}

fn log_fetch_error(e: sqlx::Error) -> Vec<WorkflowRaw> {
    error!("Unable to fetch workflows. DB error: {:?}", e);
    Vec::new()
}

#[derive(Debug, FromRow)]
struct WorkflowRaw {
    workflow_uid: Uuid,
    name: String,
    user_uid: Option<Uuid>,
    team_uid: Option<Uuid>,
    trigger: String,
    time: Option<i64>,
    time_unit: Option<String>,
    is_active_on_all: bool,
}

impl WorkflowRaw {
    fn into_workflow(self, steps: Vec<WorkflowStep>) -> Workflow {
        let time = match (self.time, self.time_unit) {
            (Some(time), Some(unit)) => TimeUnit::from_str(&unit)
                .ok()
                .map(|unit| TriggerOffset { time, unit }),
            _ => None,
        };
        Workflow {
            id: ID::from(self.workflow_uid),
            name: self.name,
            user_id: self.user_uid.map(ID::from),
            team_id: self.team_uid.map(ID::from),
            trigger: WorkflowTrigger::from_str(&self.trigger)
                .unwrap_or(WorkflowTrigger::BeforeEvent),
            time,
            is_active_on_all: self.is_active_on_all,
            steps,
        }
    }
}

#[derive(Debug, FromRow)]
struct WorkflowStepRaw {
    step_uid: Uuid,
    workflow_uid: Uuid,
    action: String,
    template: String,
    send_to: Option<String>,
    email_subject: Option<String>,
    reminder_body: Option<String>,
    sender: Option<String>,
    include_calendar_event: bool,
    number_verification_pending: bool,
    disable_on_mark_no_show: bool,
}

impl Into<WorkflowStep> for WorkflowStepRaw {
    fn into(self) -> WorkflowStep {
        WorkflowStep {
            id: ID::from(self.step_uid),
            workflow_id: ID::from(self.workflow_uid),
            action: WorkflowAction::from_str(&self.action)
                .unwrap_or(WorkflowAction::EmailAttendee),
            template: WorkflowTemplate::from_str(&self.template)
                .unwrap_or(WorkflowTemplate::Reminder),
            send_to: self.send_to,
            email_subject: self.email_subject,
            reminder_body: self.reminder_body,
            sender: self.sender,
            include_calendar_event: self.include_calendar_event,
            number_verification_pending: self.number_verification_pending,
            disable_on_mark_no_show: self.disable_on_mark_no_show,
        }
    }
}

#[async_trait::async_trait]
impl IWorkflowRepo for PostgresWorkflowRepo {
    async fn insert(&self, workflow: &Workflow) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            INSERT INTO workflows
            (workflow_uid, name, user_uid, team_uid, trigger, time, time_unit, is_active_on_all)
            VALUES($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(workflow.id.inner_ref())
        .bind(&workflow.name)
        .bind(workflow.user_id.as_ref().map(|id| *id.inner_ref()))
        .bind(workflow.team_id.as_ref().map(|id| *id.inner_ref()))
        .bind(workflow.trigger.as_str())
        .bind(workflow.time.as_ref().map(|t| t.time))
        .bind(workflow.time.as_ref().map(|t| t.unit.as_str()))
        .bind(workflow.is_active_on_all)
        .execute(&self.pool)
        .await?;

        for (position, step) in workflow.steps.iter().enumerate() {
            sqlx::query(
                r#"
                INSERT INTO workflow_steps
                (step_uid, workflow_uid, step_order, action, template, send_to, email_subject, reminder_body, sender, include_calendar_event, number_verification_pending, disable_on_mark_no_show)
                VALUES($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
                "#,
            )
            .bind(step.id.inner_ref())
            .bind(workflow.id.inner_ref())
            .bind(position as i64)
            .bind(step.action.as_str())
            .bind(step.template.as_str())
            .bind(&step.send_to)
            .bind(&step.email_subject)
            .bind(&step.reminder_body)
            .bind(&step.sender)
            .bind(step.include_calendar_event)
            .bind(step.number_verification_pending)
            .bind(step.disable_on_mark_no_show)
            .execute(&self.pool)
            .await?;
        }

        Ok(())
    }

    async fn find(&self, workflow_id: &ID) -> Option<Workflow> {
        let workflow = sqlx::query_as::<_, WorkflowRaw>(
            r#"
            SELECT * FROM workflows
            WHERE workflow_uid = $1
            "#,
        )
        .bind(workflow_id.inner_ref())
        .fetch_optional(&self.pool)
        .await
        .unwrap_or_else(|e| {
            error!("Unable to find workflow {}. DB error: {:?}", workflow_id, e);
            None
        })?;

        self.with_steps(vec![workflow]).await.into_iter().next()
    }

    async fn delete(&self, workflow_id: &ID) -> Option<Workflow> {
        // Steps and links are removed by the cascading foreign keys
        let workflow = self.find(workflow_id).await?;
        match sqlx::query(
            r#"
            DELETE FROM workflows
            WHERE workflow_uid = $1
            "#,
        )
        .bind(workflow_id.inner_ref())
        .execute(&self.pool)
        .await
        {
            Ok(_) => Some(workflow),
            Err(e) => {
                error!(
                    "Unable to delete workflow {}. DB error: {:?}",
                    workflow_id, e
                );
                None
            }
        }
    }

    async fn link_to_event_type(
        &self,
        workflow_id: &ID,
        event_type_id: i64,
    ) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            INSERT INTO workflow_event_type_links
            (workflow_uid, event_type_id)
            VALUES($1, $2)
            ON CONFLICT DO NOTHING
            "#,
        )
        .bind(workflow_id.inner_ref())
        .bind(event_type_id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn link_to_team(&self, workflow_id: &ID, team_id: &ID) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            INSERT INTO workflow_team_links
            (workflow_uid, team_uid)
            VALUES($1, $2)
            ON CONFLICT DO NOTHING
            "#,
        )
        .bind(workflow_id.inner_ref())
        .bind(team_id.inner_ref())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn add_team_member(
        &self,
        team_id: &ID,
        user_id: &ID,
        accepted: bool,
    ) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            INSERT INTO team_members
            (team_uid, user_uid, accepted)
            VALUES($1, $2, $3)
            ON CONFLICT (team_uid, user_uid) DO UPDATE SET accepted = $3
            "#,
        )
        .bind(team_id.inner_ref())
        .bind(user_id.inner_ref())
        .bind(accepted)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn find_by_event_type(&self, event_type_id: i64) -> Vec<Workflow> {
        let rows = sqlx::query_as::<_, WorkflowRaw>(
            r#"
            SELECT w.* FROM workflows AS w
            INNER JOIN workflow_event_type_links AS l
            ON l.workflow_uid = w.workflow_uid
            WHERE l.event_type_id = $1
            "#,
        )
        .bind(event_type_id)
        .fetch_all(&self.pool)
        .await
        .unwrap_or_else(log_fetch_error);
        self.with_steps(rows).await
    }

    async fn find_by_team_links(&self, team_id: &ID) -> Vec<Workflow> {
        let rows = sqlx::query_as::<_, WorkflowRaw>(
            r#"
            SELECT w.* FROM workflows AS w
            INNER JOIN workflow_team_links AS l
            ON l.workflow_uid = w.workflow_uid
            WHERE l.team_uid = $1
            "#,
        )
        .bind(*team_id.inner_ref())
        .fetch_all(&self.pool)
        .await
        .unwrap_or_else(log_fetch_error);
        self.with_steps(rows).await
    }

    async fn find_by_user_memberships(&self, user_id: &ID) -> Vec<Workflow> {
        let rows = sqlx::query_as::<_, WorkflowRaw>(
            r#"
            SELECT DISTINCT w.* FROM workflows AS w
            INNER JOIN workflow_team_links AS l
            ON l.workflow_uid = w.workflow_uid
            INNER JOIN team_members AS m
            ON m.team_uid = l.team_uid
            WHERE m.user_uid = $1 AND m.accepted = TRUE
            "#,
        )
        .bind(*user_id.inner_ref())
        .fetch_all(&self.pool)
        .await
        .unwrap_or_else(log_fetch_error);
        self.with_steps(rows).await
    }

    async fn find_active_on_all_for_team(&self, team_id: &ID) -> Vec<Workflow> {
        let rows = sqlx::query_as::<_, WorkflowRaw>(
            r#"
            SELECT * FROM workflows
            WHERE team_uid = $1 AND is_active_on_all = TRUE
            "#,
        )
        .bind(*team_id.inner_ref())
        .fetch_all(&self.pool)
        .await
        .unwrap_or_else(log_fetch_error);
        self.with_steps(rows).await
    }

    async fn find_active_on_all_personal(&self, user_id: &ID) -> Vec<Workflow> {
        let rows = sqlx::query_as::<_, WorkflowRaw>(
            r#"
            SELECT * FROM workflows
            WHERE user_uid = $1 AND team_uid IS NULL AND is_active_on_all = TRUE
            "#,
        )
        .bind(*user_id.inner_ref())
        .fetch_all(&self.pool)
        .await
        .unwrap_or_else(log_fetch_error);
        self.with_steps(rows).await
    }
}
