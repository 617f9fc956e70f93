//! 任务操作入口
//!
//! 表单提交与机器人回调都经由这里进入同一个状态机，保证不变量
//! 只在一处维护。创建任务时同步完成重复任务的展开。

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{info, warn};

use petcare_domain::entities::{RemindBefore, Task, TaskStatus};
use petcare_domain::messaging::{CallbackAction, TaskCallbackMessage};
use petcare_domain::recurrence;
use petcare_domain::repositories::{PetRepository, TaskRepository, UserRepository};
use petcare_errors::{PetcareError, PetcareResult};

use crate::caretaker::CaretakerNotifier;

/// 创建任务的入参
#[derive(Debug, Clone)]
pub struct CreateTaskRequest {
    pub pet_id: i64,
    pub title: String,
    pub due_datetime: Option<DateTime<Utc>>,
    pub remind_me: bool,
    pub remind_before: Option<RemindBefore>,
    pub recurring: bool,
    pub recurring_days: i32,
    pub created_by: i64,
}

/// 重复任务展开的上限，超过一年的重复计划按输入错误拒绝
const MAX_RECURRING_DAYS: i32 = 365;

pub struct TaskController {
    task_repo: Arc<dyn TaskRepository>,
    pet_repo: Arc<dyn PetRepository>,
    user_repo: Arc<dyn UserRepository>,
    caretaker_notifier: Arc<CaretakerNotifier>,
}

impl TaskController {
    pub fn new(
        task_repo: Arc<dyn TaskRepository>,
        pet_repo: Arc<dyn PetRepository>,
        user_repo: Arc<dyn UserRepository>,
        caretaker_notifier: Arc<CaretakerNotifier>,
    ) -> Self {
        Self {
            task_repo,
            pet_repo,
            user_repo,
            caretaker_notifier,
        }
    }

    /// 创建任务，重复任务在此一次性展开为具体任务
    pub async fn create_task(&self, request: CreateTaskRequest) -> PetcareResult<Task> {
        // 上限在这里校验，展开本身保持永不报错
        if request.recurring && request.recurring_days > MAX_RECURRING_DAYS {
            return Err(PetcareError::validation_error(format!(
                "recurring_days 不能超过 {MAX_RECURRING_DAYS}: {}",
                request.recurring_days
            )));
        }

        self.pet_repo
            .get_by_id(request.pet_id)
            .await?
            .ok_or(PetcareError::PetNotFound { id: request.pet_id })?;

        let mut task = Task::new(request.pet_id, request.title, request.created_by);
        task.due_datetime = request.due_datetime;
        task.remind_me = request.remind_me;
        task.remind_before = request.remind_before;
        task.recurring = request.recurring;
        task.recurring_days = request.recurring_days;

        let created = self.task_repo.create(&task).await?;

        let occurrences = recurrence::expand(&created);
        for occurrence in &occurrences {
            self.task_repo.create(occurrence).await?;
        }
        if !occurrences.is_empty() {
            info!(
                "任务 {} 展开出 {} 个额外的重复任务",
                created.id,
                occurrences.len()
            );
        }

        Ok(created)
    }

    /// 任务状态变更，两个调用方（编辑表单、机器人回调）共用
    ///
    /// 只允许变更到 done/skipped；终态或已删除任务的变更被拒绝，
    /// 错误原样抛给调用方展示。
    pub async fn update_task_status(
        &self,
        task_id: i64,
        new_status: TaskStatus,
        actor_id: i64,
    ) -> PetcareResult<Task> {
        let mut task = self
            .task_repo
            .get_by_id(task_id)
            .await?
            .ok_or(PetcareError::TaskNotFound { id: task_id })?;

        match new_status {
            TaskStatus::Done => task.mark_as_done(actor_id)?,
            TaskStatus::Skipped => task.mark_as_skipped(actor_id)?,
            other => {
                return Err(PetcareError::validation_error(format!(
                    "不支持的目标状态: {}",
                    other.as_str()
                )))
            }
        }

        self.task_repo.update(&task).await?;
        info!(
            "用户 {} 将任务 {} 标记为 {}",
            actor_id,
            task.id,
            task.status.as_str()
        );

        self.notify_owner_if_caretaker(&task, actor_id).await;

        Ok(task)
    }

    /// 机器人交互回调入口，映射到同一个状态变更操作
    pub async fn handle_callback(
        &self,
        message: &TaskCallbackMessage,
        actor_id: i64,
    ) -> PetcareResult<Task> {
        let new_status = match message.action {
            CallbackAction::Done => TaskStatus::Done,
            CallbackAction::Skip => TaskStatus::Skipped,
        };
        self.update_task_status(message.task_id, new_status, actor_id).await
    }

    /// 照护人（非主人）完成状态变更后通知主人。
    /// 通知失败只记日志，不影响已完成的状态变更。
    async fn notify_owner_if_caretaker(&self, task: &Task, actor_id: i64) {
        let result = self.try_notify_owner(task, actor_id).await;
        if let Err(e) = result {
            warn!("任务 {} 的主人通知发送失败: {}", task.id, e);
        }
    }

    async fn try_notify_owner(&self, task: &Task, actor_id: i64) -> PetcareResult<()> {
        let pet = self
            .pet_repo
            .get_by_id(task.pet_id)
            .await?
            .ok_or(PetcareError::PetNotFound { id: task.pet_id })?;

        // 只在操作者是照护人且不是主人本人时触发
        if pet.caregiver_id != Some(actor_id) || actor_id == pet.owner_id {
            return Ok(());
        }

        let actor = self
            .user_repo
            .get_by_id(actor_id)
            .await?
            .ok_or(PetcareError::UserNotFound { id: actor_id })?;
        let owner = self
            .user_repo
            .get_by_id(pet.owner_id)
            .await?
            .ok_or(PetcareError::UserNotFound { id: pet.owner_id })?;

        self.caretaker_notifier
            .notify_owner_after_update(task, &pet, &actor, &owner)
            .await?;
        Ok(())
    }
}
