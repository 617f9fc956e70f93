//! 领域仓储抽象
//!
//! 定义数据访问的抽象接口，遵循依赖倒置原则。
//! Pet/User 对本引擎是只读协作方，Task 是唯一的可变共享资源。

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use petcare_errors::PetcareResult;

use crate::entities::{Pet, ReminderChannel, Task, User};

/// 任务仓储抽象
#[async_trait]
pub trait TaskRepository: Send + Sync {
    async fn create(&self, task: &Task) -> PetcareResult<Task>;
    async fn get_by_id(&self, id: i64) -> PetcareResult<Option<Task>>;
    async fn update(&self, task: &Task) -> PetcareResult<()>;

    /// 提醒扫描候选集：remind_me 且未发送、有到期时间、
    /// 状态活跃且未软删除。时间窗口判断留给调用方。
    async fn find_reminder_candidates(&self) -> PetcareResult<Vec<Task>>;

    /// 原子认领提醒：仅当 reminder_sent 仍为 false 时置位并记录
    /// 通道与时间，返回是否认领成功。并发扫描下只有一方会成功，
    /// 以此保证至多一次发送。
    async fn claim_reminder(
        &self,
        task_id: i64,
        channel: ReminderChannel,
        sent_at: DateTime<Utc>,
    ) -> PetcareResult<bool>;

    /// 发送确认失败时回滚认领，任务重新进入下一轮扫描
    async fn release_reminder_claim(&self, task_id: i64) -> PetcareResult<()>;
}

/// 宠物仓储抽象（只读）
#[async_trait]
pub trait PetRepository: Send + Sync {
    async fn get_by_id(&self, id: i64) -> PetcareResult<Option<Pet>>;
}

/// 用户仓储抽象（只读）
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn get_by_id(&self, id: i64) -> PetcareResult<Option<User>>;
}
