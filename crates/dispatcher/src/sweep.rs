//! 周期性提醒扫描
//!
//! 每个tick全量扫描候选任务，逐个判断是否进入提醒窗口并分发。
//! 发送前先原子认领 reminder_sent，认领失败说明并发扫描已处理；
//! 发送确认失败则释放认领，下一轮自动重试。单个任务的失败只记录
//! 日志，不中断本轮其余任务。

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, error, info, warn};

use petcare_domain::reminder_window;
use petcare_domain::repositories::{PetRepository, TaskRepository, UserRepository};
use petcare_domain::Task;
use petcare_errors::{PetcareError, PetcareResult};

use crate::notifier::NotificationDispatcher;

/// 一轮扫描的统计结果
#[derive(Debug, Default, Clone, Copy)]
pub struct SweepOutcome {
    /// 候选任务数（通过持久层过滤，未做窗口判断）
    pub candidates: usize,
    /// 本轮确认发送的提醒数
    pub sent: usize,
    /// 失败数（通道失败、接收人不可达等，下一轮重试）
    pub failed: usize,
}

pub struct ReminderSweep {
    task_repo: Arc<dyn TaskRepository>,
    pet_repo: Arc<dyn PetRepository>,
    user_repo: Arc<dyn UserRepository>,
    dispatcher: Arc<NotificationDispatcher>,
}

impl ReminderSweep {
    pub fn new(
        task_repo: Arc<dyn TaskRepository>,
        pet_repo: Arc<dyn PetRepository>,
        user_repo: Arc<dyn UserRepository>,
        dispatcher: Arc<NotificationDispatcher>,
    ) -> Self {
        Self {
            task_repo,
            pet_repo,
            user_repo,
            dispatcher,
        }
    }

    /// 以当前时刻执行一轮扫描
    pub async fn run_reminder_sweep(&self) -> PetcareResult<SweepOutcome> {
        self.sweep_at(Utc::now()).await
    }

    /// 以给定时刻执行一轮扫描（窗口判断用同一个 now，便于测试边界）
    pub async fn sweep_at(&self, now: DateTime<Utc>) -> PetcareResult<SweepOutcome> {
        let candidates = self.task_repo.find_reminder_candidates().await?;
        debug!("提醒扫描开始，候选任务 {} 个", candidates.len());

        let mut outcome = SweepOutcome {
            candidates: candidates.len(),
            ..SweepOutcome::default()
        };

        for task in &candidates {
            match self.remind_if_due(task, now).await {
                Ok(true) => outcome.sent += 1,
                Ok(false) => {}
                Err(e) => {
                    // 单个任务失败不影响本轮其余任务
                    warn!("任务 {} 的提醒处理失败: {}", task.id, e);
                    outcome.failed += 1;
                }
            }
        }

        if outcome.sent > 0 || outcome.failed > 0 {
            info!(
                "提醒扫描完成: 候选 {} 个, 发送 {} 个, 失败 {} 个",
                outcome.candidates, outcome.sent, outcome.failed
            );
        }
        Ok(outcome)
    }

    async fn remind_if_due(&self, task: &Task, now: DateTime<Utc>) -> PetcareResult<bool> {
        if !reminder_window::is_in_reminder_window(task, now) {
            return Ok(false);
        }

        let pet = self
            .pet_repo
            .get_by_id(task.pet_id)
            .await?
            .ok_or(PetcareError::PetNotFound { id: task.pet_id })?;
        let recipient_id = pet.reminder_recipient_id();
        let recipient = self
            .user_repo
            .get_by_id(recipient_id)
            .await?
            .ok_or(PetcareError::UserNotFound { id: recipient_id })?;

        // 先解析通道再认领，认领写入的通道标签与实际发送一致
        let channel = self.dispatcher.resolve_channel(&recipient)?;

        if !self
            .task_repo
            .claim_reminder(task.id, channel, now)
            .await?
        {
            debug!("任务 {} 的提醒已被其他扫描认领，跳过", task.id);
            return Ok(false);
        }

        match self
            .dispatcher
            .send_task_reminder(&recipient, &pet, task)
            .await
        {
            Ok(receipt) => {
                info!(
                    "任务 {} 的提醒已通过 {} 发送给用户 {}",
                    task.id,
                    receipt.channel.as_str(),
                    recipient.id
                );
                Ok(true)
            }
            Err(e) => {
                // 发送未确认，释放认领让下一轮重试
                if let Err(release_err) = self.task_repo.release_reminder_claim(task.id).await {
                    error!(
                        "释放任务 {} 的提醒认领失败: {}",
                        task.id, release_err
                    );
                }
                Err(e)
            }
        }
    }
}
